//! # tronabi-core
//!
//! Shared building blocks for the tronabi contract ABI codec: the type
//! grammar, the value model, 32-byte word primitives, the address
//! translation hook and the error type. The encoder and decoder engines in
//! `tronabi-abi` are built on top of these.

pub mod address;
pub mod error;
pub mod types;
pub mod value;
pub mod word;

pub use address::{
    default_translator, install_default_translator, AddressTranslator, HexAddressTranslator,
};
pub use error::{AbiError, AbiResult};
pub use types::ParamType;
pub use value::AbiValue;

pub use alloy_primitives::{I256, U256};

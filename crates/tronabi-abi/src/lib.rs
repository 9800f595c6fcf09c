//! # tronabi-abi
//!
//! Contract ABI codec for TRON and EVM chains.
//!
//! - [`encoder`] / [`decoder`]: head/tail ABI engines over a [`ParamType`] tree
//! - [`interface`]: JSON ABI → methods, events, constructor
//! - [`event`]: log decoding (topics + data)
//! - [`tron`]: TRON address translation (`41…` / Base58Check)
//!
//! ```ignore
//! use tronabi_abi::{Interface, TronAddressTranslator};
//!
//! let iface = Interface::parse_with(abi_json, Arc::new(TronAddressTranslator))?;
//! let calldata = iface.method("transfer")?.encode_call(&["T...".into(), 1_000u64.into()])?;
//! ```

pub mod decoder;
pub mod encoder;
pub mod event;
pub mod fingerprint;
pub mod generic;
pub mod interface;
pub mod tron;

pub use decoder::{decode_value, ArgumentDecoder, DecodeContext};
pub use encoder::{encode_value, ArgumentEncoder, EncodeContext};
pub use event::{DecodedLog, Event, EventDecoder, EventInput, RawLog};
pub use fingerprint::{event_selector, function_selector, keccak256, signature};
pub use generic::{decode_values, decode_values_with, encode_values, encode_values_with};
pub use interface::{Constructor, Interface, Method, Param};
pub use tron::TronAddressTranslator;

pub use tronabi_core::{
    default_translator, install_default_translator, AbiError, AbiResult, AbiValue,
    AddressTranslator, HexAddressTranslator, ParamType, I256, U256,
};

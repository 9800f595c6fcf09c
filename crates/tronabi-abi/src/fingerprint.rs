//! Selector computation.
//!
//! A method selector is the first 4 bytes of keccak256 of the canonical
//! signature, an event selector (topic 0) is the full 32-byte hash:
//!   keccak256("transfer(address,uint256)")[..4] → a9059cbb
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef

use tiny_keccak::{Hasher, Keccak};
use tronabi_core::ParamType;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// Canonical signature `name(t1,t2,...)` built from parsed types, so bare
/// `uint`/`int` widen and tuple components are spelled out.
pub fn signature(name: &str, types: &[ParamType]) -> String {
    let args: Vec<String> = types.iter().map(ToString::to_string).collect();
    format!("{name}({})", args.join(","))
}

pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn event_selector(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_method_selector() {
        assert_eq!(
            hex::encode(function_selector("transfer(address,uint256)")),
            "a9059cbb"
        );
        assert_eq!(hex::encode(function_selector("balanceOf(address)")), "70a08231");
    }

    #[test]
    fn erc20_transfer_event_selector() {
        assert_eq!(
            hex::encode(event_selector("Transfer(address,address,uint256)")),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn signature_uses_canonical_types() {
        let types = vec![
            ParamType::parse("uint").unwrap(),
            ParamType::parse("tuple(address,int)[]").unwrap(),
        ];
        assert_eq!(signature("f", &types), "f(uint256,(address,int256)[])");
        assert_eq!(signature("totalSupply", &[]), "totalSupply()");
    }
}

//! Golden fixture integration tests.
//!
//! Encoding vectors, a TRC-20 ABI, a USDT transfer call and a Transfer log
//! are loaded from `fixtures/abi/` and checked byte-for-byte / field-by-field.

use std::sync::Arc;
use tronabi_abi::tron::{from_base58, to_base58};
use tronabi_abi::{
    AbiValue, AddressTranslator, ArgumentDecoder, ArgumentEncoder, HexAddressTranslator,
    Interface, ParamType, RawLog, TronAddressTranslator, U256,
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn hex_to_bytes(s: &str) -> Vec<u8> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).unwrap_or_else(|e| panic!("bad hex '{s}': {e}"))
}

/// The fixtures live two levels above the crate root.
fn fixture_path(name: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures/abi");
    p.push(name);
    p
}

fn load_json(name: &str) -> serde_json::Value {
    let text = std::fs::read_to_string(fixture_path(name)).expect("fixture not found");
    serde_json::from_str(&text).expect("invalid fixture JSON")
}

fn tron() -> Arc<dyn AddressTranslator> {
    Arc::new(TronAddressTranslator)
}

fn trc20() -> Interface {
    let abi = std::fs::read_to_string(fixture_path("trc20.abi.json")).expect("fixture not found");
    Interface::parse_with(&abi, tron()).expect("TRC-20 ABI should parse")
}

// ─── Encoding vectors ─────────────────────────────────────────────────────────

#[test]
fn encode_vectors_golden() {
    let vectors = load_json("encode-vectors.json");
    let translator: Arc<dyn AddressTranslator> = Arc::new(HexAddressTranslator);

    for case in vectors.as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let types: Vec<ParamType> = case["types"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| ParamType::parse(t.as_str().unwrap()).unwrap())
            .collect();
        let values: Vec<AbiValue> = types
            .iter()
            .zip(case["values"].as_array().unwrap())
            .map(|(ty, v)| AbiValue::from_json(ty, v).unwrap())
            .collect();
        let expected = hex_to_bytes(case["encoded"].as_str().unwrap());

        let encoder = ArgumentEncoder::with_translator(types.clone(), translator.clone());
        let encoded = encoder.encode_all(&values).unwrap();
        assert_eq!(
            hex::encode(&encoded),
            hex::encode(&expected),
            "encoding mismatch for '{name}'"
        );

        let decoder = ArgumentDecoder::with_translator(types, translator.clone());
        let decoded = decoder.decode_all(&expected).unwrap();
        assert_eq!(decoded, values, "decoding mismatch for '{name}'");
    }
}

// ─── TRC-20 interface ─────────────────────────────────────────────────────────

#[test]
fn trc20_interface_shape() {
    let iface = trc20();
    assert_eq!(iface.methods().len(), 9);
    assert_eq!(iface.events().len(), 2);

    let selectors = [
        ("name", "06fdde03"),
        ("symbol", "95d89b41"),
        ("decimals", "313ce567"),
        ("totalSupply", "18160ddd"),
        ("balanceOf", "70a08231"),
        ("allowance", "dd62ed3e"),
        ("transfer", "a9059cbb"),
        ("approve", "095ea7b3"),
        ("transferFrom", "23b872dd"),
    ];
    for (name, selector) in selectors {
        assert_eq!(iface.method(name).unwrap().selector_hex(), selector, "{name}");
    }

    assert!(iface.method("balanceOf").unwrap().constant);
    assert!(!iface.method("transfer").unwrap().constant);

    let approval = iface.event("Approval").unwrap();
    assert_eq!(
        hex::encode(approval.selector().unwrap()),
        "8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925"
    );
}

#[test]
fn trc20_transfer_call_golden() {
    let fixture = load_json("trc20-transfer-call.json");
    let iface = trc20();
    let method = iface.method(fixture["function"].as_str().unwrap()).unwrap();

    let args: Vec<AbiValue> = method
        .inputs
        .iter()
        .zip(fixture["args"].as_array().unwrap())
        .map(|(p, v)| AbiValue::from_json(&p.ty, v).unwrap())
        .collect();
    let calldata = method.encode_call(&args).unwrap();
    let expected = hex_to_bytes(fixture["calldata"].as_str().unwrap());
    assert_eq!(hex::encode(&calldata), hex::encode(&expected));

    let (decoded_method, decoded) = iface.decode_call(&expected).unwrap();
    assert_eq!(decoded_method.name, "transfer");
    let to = decoded[0].as_bytes().unwrap();
    assert_eq!(to_base58(to).unwrap(), "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t");
    assert_eq!(decoded[1], AbiValue::Uint(U256::from(1_000_000u64)));
}

#[test]
fn trc20_transfer_log_golden() {
    let fixture = load_json("trc20-transfer.json");
    let topics: Vec<&str> = fixture["topics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    let log = RawLog::from_hex(
        fixture["contractAddress"].as_str().unwrap(),
        &topics,
        fixture["data"].as_str().unwrap(),
    )
    .unwrap();

    let iface = trc20();
    let decoded = iface.decode_log(&log).unwrap().expect("Transfer should match");
    let expected = &fixture["expected"];

    assert_eq!(decoded.event, expected["event"].as_str().unwrap());
    assert_eq!(
        decoded.address.as_bytes().unwrap(),
        &hex_to_bytes(fixture["contractAddress"].as_str().unwrap())[..]
    );
    assert_eq!(
        to_base58(decoded.address.as_bytes().unwrap()).unwrap(),
        fixture["contractBase58"].as_str().unwrap()
    );

    for (field, base58) in [("from", "fromBase58"), ("to", "toBase58")] {
        let value = decoded.field(field).unwrap().as_bytes().unwrap();
        assert_eq!(hex::encode(value), expected[field].as_str().unwrap(), "{field}");
        assert_eq!(to_base58(value).unwrap(), expected[base58].as_str().unwrap());
        assert_eq!(from_base58(expected[base58].as_str().unwrap()).unwrap(), value);
    }

    let value = decoded.field("value").unwrap().as_uint().unwrap();
    assert_eq!(value.to_string(), expected["value"].as_str().unwrap());
}

#[test]
fn scan_skips_foreign_logs() {
    let fixture = load_json("trc20-transfer.json");
    let topics: Vec<&str> = fixture["topics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    let transfer = RawLog::from_hex(
        fixture["contractAddress"].as_str().unwrap(),
        &topics,
        fixture["data"].as_str().unwrap(),
    )
    .unwrap();
    let mut foreign = transfer.clone();
    foreign.topics[0] = [0x55; 32];

    let iface = trc20();
    let logs = vec![foreign.clone(), transfer.clone(), foreign];
    let decoded = iface.scan_logs(&logs).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].event, "Transfer");
    assert_eq!(iface.par_scan_logs(&logs).unwrap(), decoded);
}

#[test]
fn constructor_args_round_trip() {
    let iface = trc20();
    let ctor = iface.constructor().expect("constructor declared");
    let args = vec![
        AbiValue::from("Tether USD"),
        AbiValue::from("USDT"),
        AbiValue::from(6u8),
    ];
    let data = ctor.encode_args(&args).unwrap();
    assert_eq!(data.len(), 3 * 32 + 2 * 64);
    assert_eq!(ctor.decode_args(&data).unwrap(), args);
}

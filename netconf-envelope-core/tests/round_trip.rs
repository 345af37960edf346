use std::fs;
use std::path::PathBuf;

use netconf_envelope_core::envelope::{pack, unpack, MessageKind};
use netconf_envelope_core::{parse_file, parse_str, write_file};
use pretty_assertions::assert_eq;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn fixture_text(path: &str) -> String {
    fs::read_to_string(fixture(path)).expect("fixture should be readable")
}

#[test]
fn edit_config_pack_unpack_round_trip() {
    let fragment = fixture_text("fixtures/edit-config-payload.xml");

    let envelope = pack(&MessageKind::EditConfig, &fragment).expect("pack should succeed");
    let recovered = unpack(&MessageKind::EditConfig, &envelope).expect("unpack should succeed");

    let original = parse_str(&fragment).expect("fragment should parse");
    let round_tripped = parse_str(&recovered).expect("recovered fragment should parse");
    assert_eq!(original, round_tripped);
}

#[test]
fn edit_config_round_trip_keeps_nested_operation_binding() {
    // Deletion payloads declare xmlns:nc on the element carrying the
    // operation attribute, not on the envelope root.
    let fragment = "<config>\
         <interfaces xmlns=\"urn:ietf:params:xml:ns:yang:ietf-interfaces\">\
         <interface><name>eth0</name>\
         <ipv4 xmlns=\"urn:ietf:params:xml:ns:yang:ietf-ip\">\
         <address xmlns:nc=\"urn:ietf:params:xml:ns:netconf:base:1.0\" nc:operation=\"delete\">\
         <ip>192.0.2.2</ip><prefix-length>32</prefix-length>\
         </address></ipv4></interface></interfaces></config>";

    let envelope = pack(&MessageKind::EditConfig, fragment).expect("pack should succeed");
    let recovered = unpack(&MessageKind::EditConfig, &envelope).expect("unpack should succeed");

    let original = parse_str(fragment).expect("fragment should parse");
    let round_tripped = parse_str(&recovered).expect("recovered fragment should parse");
    assert_eq!(original, round_tripped);
}

#[test]
fn get_config_pack_unpack_round_trip() {
    let fragment = fixture_text("fixtures/get-filter.xml");

    let envelope = pack(&MessageKind::GetConfig, &fragment).expect("pack should succeed");
    let recovered = unpack(&MessageKind::GetConfig, &envelope).expect("unpack should succeed");

    let original = parse_str(&fragment).expect("fragment should parse");
    let round_tripped = parse_str(&recovered).expect("recovered fragment should parse");
    assert_eq!(original, round_tripped);
}

#[test]
fn get_round_trip_uses_get_config_shape() {
    let fragment = fixture_text("fixtures/get-filter.xml");

    let envelope = pack(&MessageKind::Get, &fragment).expect("pack should succeed");
    // A get envelope is extractable as get-config and vice versa.
    let recovered = unpack(&MessageKind::GetConfig, &envelope).expect("unpack should succeed");

    let original = parse_str(&fragment).expect("fragment should parse");
    let round_tripped = parse_str(&recovered).expect("recovered fragment should parse");
    assert_eq!(original, round_tripped);
}

#[test]
fn rpc_reply_data_survives_pack_then_unpack() {
    let fragment = "<data><interfaces xmlns=\"urn:example:interfaces\"><interface><name>eth0</name></interface></interfaces></data>";

    let envelope = pack(&MessageKind::RpcReply, fragment).expect("pack should succeed");
    let recovered = unpack(&MessageKind::RpcReply, &envelope).expect("unpack should succeed");

    let original = parse_str(fragment).expect("fragment should parse");
    let round_tripped = parse_str(&recovered).expect("recovered fragment should parse");
    assert_eq!(original, round_tripped);
}

#[test]
fn parse_and_write_file_round_trip() {
    let source_path = fixture("fixtures/rpc-reply.xml");
    let out_dir = tempfile::tempdir().expect("tempdir should be created");
    let out_path = out_dir.path().join("roundtrip.xml");

    let node = parse_file(&source_path).expect("parse should succeed");
    write_file(&node, &out_path).expect("write_file should succeed");

    let reparsed = parse_file(&out_path).expect("parse_file should succeed");
    assert_eq!(node, reparsed);
}

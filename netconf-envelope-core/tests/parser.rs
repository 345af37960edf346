use std::path::PathBuf;

use netconf_envelope_core::parser::ParseError;
use netconf_envelope_core::{parse_file, parse_str};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parses_attributes_and_nested_elements() {
    let node =
        parse_file(&fixture("fixtures/edit-config-payload.xml")).expect("parse should succeed");
    assert_eq!(node.tag, "config");

    let interfaces = node
        .get_child("interfaces")
        .expect("interfaces should exist");
    assert_eq!(
        interfaces.attributes.get("xmlns"),
        Some(&"urn:example:interfaces".to_string())
    );

    let entries = interfaces.get_children("interface");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].get_text(&["name"]), Some("eth0"));
    assert_eq!(entries[1].get_text(&["mtu"]), Some("9000"));
}

#[test]
fn parses_reply_envelope_and_drops_declaration() {
    let node = parse_file(&fixture("fixtures/rpc-reply.xml")).expect("parse should succeed");
    assert_eq!(node.tag, "rpc-reply");
    assert_eq!(node.attributes.get("message-id"), Some(&"101".to_string()));
    assert!(node.get_child("data").is_some());
}

#[test]
fn drops_comments_and_processing_instructions() {
    let node = parse_str(
        "<?xml version=\"1.0\"?><!-- device reply --><data><ok/><?keep out?></data>",
    )
    .expect("parse should succeed");
    assert_eq!(node.tag, "data");
    assert_eq!(node.children.len(), 1);
    assert!(node.text.is_none());
}

#[test]
fn whitespace_only_text_is_dropped() {
    let node = parse_str("<config>\n  <top>\n    <a>1</a>\n  </top>\n</config>")
        .expect("parse should succeed");
    assert!(node.text.is_none());
    let top = node.get_child("top").expect("top should exist");
    assert!(top.text.is_none());
    assert_eq!(top.get_text(&["a"]), Some("1"));
}

#[test]
fn cdata_text_is_preserved() {
    let node = parse_str("<banner><![CDATA[a < b]]></banner>").expect("parse should succeed");
    assert_eq!(node.text.as_deref(), Some("a < b"));
}

#[test]
fn rejects_multiple_top_level_elements() {
    let err = parse_str("<config/><config/>").expect_err("parse should fail");
    assert!(matches!(err, ParseError::Malformed(_)));
}

#[test]
fn rejects_stray_closing_tag() {
    assert!(parse_str("</config>").is_err());
}

#[test]
fn rejects_unclosed_element() {
    assert!(parse_str("<config><top>").is_err());
}

#[test]
fn rejects_empty_document() {
    let err = parse_str("").expect_err("parse should fail");
    assert!(matches!(err, ParseError::Malformed(_)));
}

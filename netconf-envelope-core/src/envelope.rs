//! NETCONF rpc envelope packing and payload extraction.
//!
//! Automation callers work with bare payload fragments: a `<config>` subtree
//! for edit-config, a `<filter>` subtree for get/get-config, a `<data>`
//! subtree for replies. The wire and the mediator translation service both
//! expect complete NETCONF PDUs. [`pack`] wraps a fragment into an `<rpc>` or
//! `<rpc-reply>` envelope with the fixed `message-id` and base namespace;
//! [`unpack`] locates the payload element inside such an envelope and hands
//! it back, with redundant base-namespace declarations stripped so the
//! fragment can be spliced into a context that already declares them.
//!
//! Fragments are parsed and inserted as child elements, never concatenated
//! as strings, so malformed input fails here instead of producing a broken
//! PDU downstream.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::parser::{self, ParseError};
use crate::tree::XmlNode;
use crate::writer::{self, WriteError};

/// The NETCONF 1.0 base namespace carried by every envelope.
pub const NETCONF_BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Fixed message-id stamped on generated envelopes.
///
/// The mediator matches request and reply by HTTP exchange, not by
/// message-id, so a constant value is sufficient.
pub const MESSAGE_ID: &str = "101";

/// Message kinds the codec understands.
///
/// The set is closed: `pack`/`unpack` match over every variant, and anything
/// that is not a recognized NETCONF operation rides along as [`Other`].
/// `Other` is rejected at this layer; passing such messages through verbatim
/// is a decision the translation client makes one level up.
///
/// [`Other`]: MessageKind::Other
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `<edit-config>` request carrying a `<config>` subtree.
    EditConfig,
    /// `<get-config>` request carrying a `<filter>` subtree.
    GetConfig,
    /// `<get>` request; packed and unpacked with the `get-config` shape.
    Get,
    /// `<rpc-reply>` carrying a `<data>` subtree.
    RpcReply,
    /// Anything else; not translatable.
    Other(String),
}

impl MessageKind {
    /// Wire name of the kind (`edit-config`, `get-config`, `get`,
    /// `rpc-reply`, or the original string for unrecognized kinds).
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::EditConfig => "edit-config",
            MessageKind::GetConfig => "get-config",
            MessageKind::Get => "get",
            MessageKind::RpcReply => "rpc-reply",
            MessageKind::Other(name) => name,
        }
    }

    /// Whether this kind has an envelope shape the codec can build.
    pub fn is_translatable(&self) -> bool {
        !matches!(self, MessageKind::Other(_))
    }
}

impl From<&str> for MessageKind {
    fn from(value: &str) -> Self {
        match value {
            "edit-config" => MessageKind::EditConfig,
            "get-config" => MessageKind::GetConfig,
            "get" => MessageKind::Get,
            "rpc-reply" => MessageKind::RpcReply,
            other => MessageKind::Other(other.to_string()),
        }
    }
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NETCONF `default-operation` values for edit-config envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultOperation {
    /// Merge configuration data into the datastore (protocol default).
    Merge,
    /// Replace matched subtrees in the datastore.
    Replace,
    /// Apply only explicitly tagged operations.
    None,
}

impl DefaultOperation {
    /// Wire value of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultOperation::Merge => "merge",
            DefaultOperation::Replace => "replace",
            DefaultOperation::None => "none",
        }
    }
}

impl Display for DefaultOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope construction options.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// `<default-operation>` child emitted on edit-config envelopes.
    /// `Option::None` omits the element entirely.
    pub default_operation: Option<DefaultOperation>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            default_operation: Some(DefaultOperation::Merge),
        }
    }
}

/// Errors produced while packing or unpacking envelopes.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Fragment or envelope was not well-formed XML.
    #[error("malformed XML payload: {0}")]
    Parse(#[from] ParseError),
    /// Envelope tree could not be serialized.
    #[error("failed to serialize envelope: {0}")]
    Write(#[from] WriteError),
    /// Kind has no envelope shape.
    #[error("unsupported message kind: {0}")]
    UnsupportedKind(String),
    /// Expected payload element was absent from the envelope.
    #[error("no <{element}> element found under <{parent}>")]
    MissingElement { parent: String, element: String },
}

/// Wrap a payload fragment in a NETCONF envelope with default options.
pub fn pack(kind: &MessageKind, fragment: &str) -> Result<String, EnvelopeError> {
    pack_with_options(kind, fragment, &PackOptions::default())
}

/// Wrap a payload fragment in a NETCONF envelope for the given kind.
///
/// The fragment must be a single well-formed element; a leading XML
/// declaration is dropped. `edit-config` envelopes target the `running`
/// datastore, `get`/`get-config` read from it, and `rpc-reply` wraps the
/// fragment directly.
pub fn pack_with_options(
    kind: &MessageKind,
    fragment: &str,
    options: &PackOptions,
) -> Result<String, EnvelopeError> {
    let envelope = match kind {
        MessageKind::EditConfig => {
            let payload = parser::parse_str(fragment)?;
            edit_config_envelope(payload, options)
        }
        MessageKind::GetConfig | MessageKind::Get => {
            let payload = parser::parse_str(fragment)?;
            get_config_envelope(payload)
        }
        MessageKind::RpcReply => {
            let payload = parser::parse_str(fragment)?;
            rpc_root("rpc-reply").with_child(payload)
        }
        MessageKind::Other(name) => {
            return Err(EnvelopeError::UnsupportedKind(name.clone()));
        }
    };
    Ok(writer::write_string(&envelope)?)
}

/// Extract the payload fragment from a NETCONF envelope of the given kind.
///
/// Elements are located by local name scoped to the NETCONF base namespace;
/// default and prefixed declarations both resolve, and unqualified envelopes
/// (some mediator replies omit `xmlns` entirely) are tolerated. The returned
/// fragment has base-namespace declarations removed and base-namespace tag
/// prefixes localized. A prefix declaration that attributes (such as
/// `nc:operation`) still resolve through stays on its element, and prefixes
/// bound only by the envelope are re-declared on the fragment root so it
/// stays complete.
pub fn unpack(kind: &MessageKind, envelope: &str) -> Result<String, EnvelopeError> {
    let root = parser::parse_str(envelope)?;
    let root_scope = ScopeBindings::new();

    let payload = match kind {
        MessageKind::EditConfig => nested_payload(&root, &root_scope, "edit-config", "config")?,
        MessageKind::GetConfig | MessageKind::Get => {
            nested_payload(&root, &root_scope, "get-config", "filter")?
        }
        MessageKind::RpcReply => {
            let (data, scope) = find_base_child(&root, &root_scope, "data").ok_or_else(|| {
                EnvelopeError::MissingElement {
                    parent: root.tag.clone(),
                    element: "data".to_string(),
                }
            })?;
            detach_fragment(data, &scope)
        }
        MessageKind::Other(name) => {
            return Err(EnvelopeError::UnsupportedKind(name.clone()));
        }
    };
    Ok(writer::write_string(&payload)?)
}

fn rpc_root(tag: &str) -> XmlNode {
    XmlNode::new(tag)
        .with_attribute("message-id", MESSAGE_ID)
        .with_attribute("xmlns", NETCONF_BASE_NS)
}

fn edit_config_envelope(payload: XmlNode, options: &PackOptions) -> XmlNode {
    let mut edit = XmlNode::new("edit-config")
        .with_child(XmlNode::new("target").with_child(XmlNode::new("running")));
    if let Some(operation) = options.default_operation {
        edit = edit.with_child(XmlNode::new("default-operation").with_text(operation.as_str()));
    }
    rpc_root("rpc").with_child(edit.with_child(payload))
}

fn get_config_envelope(payload: XmlNode) -> XmlNode {
    let get = XmlNode::new("get-config")
        .with_child(XmlNode::new("source").with_child(XmlNode::new("running")))
        .with_child(payload);
    rpc_root("rpc").with_child(get)
}

/// Locate `<operation>/<payload>` under the envelope root and detach the
/// payload element.
fn nested_payload(
    root: &XmlNode,
    root_scope: &ScopeBindings,
    operation: &str,
    payload: &str,
) -> Result<XmlNode, EnvelopeError> {
    let (operation_node, operation_scope) =
        find_base_child(root, root_scope, operation).ok_or_else(|| {
            EnvelopeError::MissingElement {
                parent: root.tag.clone(),
                element: operation.to_string(),
            }
        })?;
    let (payload_node, payload_scope) = find_base_child(operation_node, &operation_scope, payload)
        .ok_or_else(|| EnvelopeError::MissingElement {
            parent: operation_node.tag.clone(),
            element: payload.to_string(),
        })?;
    Ok(detach_fragment(payload_node, &payload_scope))
}

/// Namespace bindings in scope: prefix (or `None` for the default namespace)
/// to namespace URI.
type ScopeBindings = BTreeMap<Option<String>, String>;

/// Bindings in effect inside `node`: the inherited scope plus the node's own
/// `xmlns`/`xmlns:p` declarations.
fn scope_with_declarations(node: &XmlNode, inherited: &ScopeBindings) -> ScopeBindings {
    let mut scope = inherited.clone();
    for (key, value) in &node.attributes {
        if key == "xmlns" {
            scope.insert(None, value.clone());
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.insert(Some(prefix.to_string()), value.clone());
        }
    }
    scope
}

/// Namespace URI the element's tag resolves to under `scope`, if any.
fn element_namespace<'a>(node: &XmlNode, scope: &'a ScopeBindings) -> Option<&'a str> {
    match node.prefix() {
        Some(prefix) => scope.get(&Some(prefix.to_string())).map(String::as_str),
        None => scope.get(&None).map(String::as_str),
    }
}

/// Find a direct child with the given local name in the base namespace.
///
/// Children that resolve to no namespace at all also match. Returns the
/// child together with the bindings in effect at the parent's children, the
/// scope a later [`detach_fragment`] call needs as its inherited scope.
fn find_base_child<'a>(
    parent: &'a XmlNode,
    inherited: &ScopeBindings,
    local: &str,
) -> Option<(&'a XmlNode, ScopeBindings)> {
    let scope = scope_with_declarations(parent, inherited);
    let found = parent.children.iter().find(|child| {
        if child.local_name() != local {
            return false;
        }
        let child_scope = scope_with_declarations(child, &scope);
        match element_namespace(child, &child_scope) {
            Some(ns) => ns == NETCONF_BASE_NS,
            None => true,
        }
    })?;
    Some((found, scope))
}

/// Detach `node` from its envelope so it can stand alone as a fragment.
///
/// Base-namespace `xmlns` declarations are dropped unless an attribute below
/// still resolves through them, and tags whose prefix resolves to the base
/// namespace are localized. Prefixes whose only declaration sat outside the
/// fragment are re-bound on the fragment root from the envelope scope.
fn detach_fragment(node: &XmlNode, inherited: &ScopeBindings) -> XmlNode {
    let mut detached = strip_base_bindings(node, inherited);

    let mut unbound = BTreeSet::new();
    collect_unbound_prefixes(&detached, &BTreeSet::new(), &mut unbound);

    let scope_at_node = scope_with_declarations(node, inherited);
    for prefix in unbound {
        if let Some(uri) = scope_at_node.get(&Some(prefix.clone())) {
            detached
                .attributes
                .insert(format!("xmlns:{prefix}"), uri.clone());
        }
    }
    detached
}

fn strip_base_bindings(node: &XmlNode, inherited: &ScopeBindings) -> XmlNode {
    let scope = scope_with_declarations(node, inherited);

    let tag = if node.prefix().is_some() && element_namespace(node, &scope) == Some(NETCONF_BASE_NS)
    {
        node.local_name().to_string()
    } else {
        node.tag.clone()
    };

    let mut out = XmlNode::new(tag);
    out.text = node.text.clone();
    for (key, value) in &node.attributes {
        if value == NETCONF_BASE_NS {
            if key == "xmlns" {
                continue;
            }
            // Localization removes the prefix from tags but never from
            // attributes, so the declaration stays while an attribute
            // below still resolves through it.
            if let Some(prefix) = key.strip_prefix("xmlns:") {
                if !attribute_uses_prefix(node, prefix) {
                    continue;
                }
            }
        }
        out.attributes.insert(key.clone(), value.clone());
    }
    for child in &node.children {
        out.children.push(strip_base_bindings(child, &scope));
    }
    out
}

/// Whether any attribute on `node` or below it resolves its prefix through
/// a declaration on `node`, stopping where a child redeclares the prefix.
fn attribute_uses_prefix(node: &XmlNode, prefix: &str) -> bool {
    let uses_here = node.attributes.keys().any(|key| {
        if key == "xmlns" || key.starts_with("xmlns:") {
            return false;
        }
        matches!(key.split_once(':'), Some((candidate, _)) if candidate == prefix)
    });
    if uses_here {
        return true;
    }
    let shadow = format!("xmlns:{prefix}");
    node.children
        .iter()
        .filter(|child| !child.attributes.contains_key(&shadow))
        .any(|child| attribute_uses_prefix(child, prefix))
}

/// Collect prefixes used by tags or attributes without a declaration in
/// scope within the fragment itself.
fn collect_unbound_prefixes(
    node: &XmlNode,
    declared: &BTreeSet<String>,
    unbound: &mut BTreeSet<String>,
) {
    let mut declared = declared.clone();
    for key in node.attributes.keys() {
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            declared.insert(prefix.to_string());
        }
    }

    if let Some(prefix) = node.prefix() {
        if prefix != "xml" && !declared.contains(prefix) {
            unbound.insert(prefix.to_string());
        }
    }
    for key in node.attributes.keys() {
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        if let Some((prefix, _)) = key.split_once(':') {
            if prefix != "xml" && !declared.contains(prefix) {
                unbound.insert(prefix.to_string());
            }
        }
    }

    for child in &node.children {
        collect_unbound_prefixes(child, &declared, unbound);
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultOperation, MessageKind};

    #[test]
    fn kind_round_trips_through_wire_names() {
        for name in ["edit-config", "get-config", "get", "rpc-reply"] {
            let kind = MessageKind::from(name);
            assert!(kind.is_translatable());
            assert_eq!(kind.as_str(), name);
        }
    }

    #[test]
    fn unrecognized_kind_maps_to_other() {
        let kind = MessageKind::from("notification");
        assert_eq!(kind, MessageKind::Other("notification".to_string()));
        assert!(!kind.is_translatable());
        assert_eq!(kind.as_str(), "notification");
    }

    #[test]
    fn default_operation_wire_values() {
        assert_eq!(DefaultOperation::Merge.as_str(), "merge");
        assert_eq!(DefaultOperation::Replace.as_str(), "replace");
        assert_eq!(DefaultOperation::None.as_str(), "none");
    }
}

//! NETCONF envelope packing and payload extraction primitives.
//!
//! The crate holds the protocol-neutral half of the mediator shim: a small
//! XML tree model ([`tree`]), a parser and writer over it ([`parser`],
//! [`writer`]), and the envelope codec ([`envelope`]) that wraps payload
//! fragments into complete NETCONF PDUs and unwraps them again. Nothing in
//! here performs I/O beyond reading and writing local files on request;
//! talking to the mediator service is the `netconf-mediate` crate's job.

pub mod envelope;
pub mod parser;
pub mod tree;
pub mod writer;

pub use envelope::{
    pack, pack_with_options, unpack, DefaultOperation, EnvelopeError, MessageKind, PackOptions,
    MESSAGE_ID, NETCONF_BASE_NS,
};
pub use parser::{parse, parse_file, parse_str, ParseError};
pub use tree::XmlNode;
pub use writer::{write, write_file, write_string, WriteError};

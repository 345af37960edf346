//! Mediator-backed NETCONF message translation.
//!
//! Network automation code produces bare payload fragments (a `<config>`
//! subtree to apply, a `<filter>` to query with) while devices and the
//! mediator translation service exchange complete NETCONF PDUs. This crate
//! bridges the two: it resolves the mediator's address from plugin
//! configuration, wraps fragments into envelopes (via
//! `netconf-envelope-core`), sends them through the translation service with
//! safe fallback to the untranslated message, and pushes applied
//! configuration state to the datastore service.
//!
//! # Modules
//!
//! - [`config`] — plugin configuration discovery and address resolution
//! - [`target`] — network element identification from module parameters
//! - [`translate`] — the mediator translation client
//! - [`datastore`] — fire-and-forget datastore notifications
//! - [`diagnostics`] — optional per-stage message capture

pub mod config;
pub mod datastore;
pub mod diagnostics;
pub mod target;
pub mod translate;

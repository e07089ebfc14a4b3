//! retsite-core
//!
//! Core library for locating the return sites of a named function inside an
//! ELF executable, so an external uprobe attacher can hook every exit path.
//!
//! This crate defines the data model, the structured error taxonomy, probe
//! configuration, and the services that validate a binary, resolve symbols,
//! slice function bytes and scan them with per-architecture decoders.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends (the `retsite` CLI, an eBPF loader, etc.).

pub mod config;
pub mod error;
pub mod model;
pub mod services;

pub use error::{DecodeError, ResolveError};
pub use model::{Arch, ResolvedFunction, ReturnOffsets, Section, Symbol, SymbolTable};
pub use services::resolver::{find_return_offsets, ReturnSiteResolver};

/// Version of `retsite-core`; the CLI reports this from `--version`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

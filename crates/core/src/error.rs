//! Structured error types for the resolver.
//!
//! Every failure is a deterministic function of the binary's bytes, so none
//! of these are retried internally.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Arch;

/// A byte sequence that does not decode as one instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{arch} decode failed: {reason}")]
pub struct DecodeError {
    pub arch: Arch,
    pub reason: String,
}

impl DecodeError {
    pub fn new(arch: Arch, reason: impl Into<String>) -> Self {
        Self { arch, reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Binary not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path} as ELF: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Unsupported CPU architecture {detected} (expected {expected})")]
    UnsupportedArchitecture { detected: String, expected: String },

    #[error("Binary architecture does not match, want: {expected}, have: {actual}")]
    ArchitectureMismatch { expected: Arch, actual: Arch },

    #[error("No symbols found")]
    NoSymbolsFound,

    #[error("Symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("Symbol {symbol} refers to invalid section index {index} ({count} sections)")]
    InvalidSection { symbol: String, index: usize, count: usize },

    #[error("Failed to read data of section {section}: {reason}")]
    SectionReadError { section: String, reason: String },

    #[error(
        "Symbol {symbol} range 0x{address:X}+0x{size:X} does not fit section {section} \
         (0x{section_address:X}+0x{section_size:X})"
    )]
    CorruptSymbolRange {
        symbol: String,
        address: u64,
        size: u64,
        section: String,
        section_address: u64,
        section_size: u64,
    },

    #[error("Invalid instruction at offset 0x{offset:X}: {source}")]
    Decode {
        offset: usize,
        #[source]
        source: DecodeError,
    },

    #[error("No RET instructions found")]
    NoReturnFound,

    #[error("Failed to initialize {arch} decoder: {reason}")]
    DecoderInit { arch: Arch, reason: String },
}

impl ResolveError {
    /// True when the failure is specific to one symbol rather than to the
    /// binary as a whole, so a caller may skip that hook and keep going.
    pub fn is_symbol_level(&self) -> bool {
        matches!(
            self,
            ResolveError::SymbolNotFound { .. }
                | ResolveError::InvalidSection { .. }
                | ResolveError::SectionReadError { .. }
                | ResolveError::CorruptSymbolRange { .. }
                | ResolveError::Decode { .. }
                | ResolveError::NoReturnFound
        )
    }
}

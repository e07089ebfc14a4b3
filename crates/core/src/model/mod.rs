//! Core data model for binaries, symbols, sections and return sites.
//!
//! Everything here is a read-only value: symbols and sections are copied out
//! of a parsed [`BinaryImage`](crate::services::image::BinaryImage) and never
//! mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CPU architectures the resolver can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    /// Architecture of the running host, if it is one we can probe.
    pub fn host() -> Option<Arch> {
        Self::from_rust_arch(std::env::consts::ARCH)
    }

    /// Map a Rust target arch name (`std::env::consts::ARCH`) to an [`Arch`].
    pub fn from_rust_arch(name: &str) -> Option<Arch> {
        match name {
            "x86_64" => Some(Arch::Amd64),
            "aarch64" => Some(Arch::Arm64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" => Ok(Arch::Amd64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            other => Err(format!("unsupported architecture '{other}' (expected amd64 or arm64)")),
        }
    }
}

/// Which ELF table a symbol was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolTable {
    Static,
    Dynamic,
}

/// A named entry from `.symtab` or `.dynsym`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    /// Virtual address (`st_value`).
    pub address: u64,
    /// Byte size (`st_size`).
    pub size: u64,
    /// Owning section index (`st_shndx`).
    pub section_index: usize,
    pub table: SymbolTable,
}

/// A section header, with enough information to locate its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    /// Virtual address (`sh_addr`).
    pub address: u64,
    /// Offset of the section's data within the file (`sh_offset`).
    pub file_offset: u64,
    /// Size in bytes (`sh_size`).
    pub size: u64,
    /// False for `SHT_NOBITS` sections, which occupy no file space.
    pub has_data: bool,
}

/// One decoded instruction, positioned relative to the function start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub offset: usize,
    pub len: usize,
    pub is_return: bool,
}

/// Strictly ascending, non-empty list of return-instruction offsets
/// relative to a function's first byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnOffsets(Vec<usize>);

impl ReturnOffsets {
    /// Wraps offsets collected by a scan. Returns `None` for an empty list.
    pub(crate) fn from_scan(offsets: Vec<usize>) -> Option<Self> {
        debug_assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        if offsets.is_empty() {
            None
        } else {
            Some(Self(offsets))
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl PartialEq<[usize]> for ReturnOffsets {
    fn eq(&self, other: &[usize]) -> bool {
        self.0 == other
    }
}

impl PartialEq<Vec<usize>> for ReturnOffsets {
    fn eq(&self, other: &Vec<usize>) -> bool {
        &self.0 == other
    }
}

/// Outcome of resolving one symbol: where it lives and where it returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFunction {
    pub symbol: Symbol,
    pub offsets: ReturnOffsets,
}

impl ResolvedFunction {
    /// Absolute virtual addresses of every return instruction
    /// (`symbol.address + offset`), ready for hook placement.
    pub fn return_addresses(&self) -> Vec<u64> {
        self.offsets.iter().map(|off| self.symbol.address + off as u64).collect()
    }
}

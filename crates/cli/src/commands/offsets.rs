use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::debug;
use retsite_core::{Arch, ResolvedFunction, ReturnSiteResolver};
use serde::Serialize;

use crate::sha256_file;

/// JSON report for the `offsets` command.
#[derive(Debug, Serialize)]
pub struct OffsetsReport {
    pub path: PathBuf,
    pub sha256: String,
    pub arch: Arch,
    pub functions: Vec<FunctionReport>,
}

#[derive(Debug, Serialize)]
pub struct FunctionReport {
    pub name: String,
    pub address: u64,
    pub size: u64,
    pub offsets: Vec<usize>,
    pub return_addresses: Vec<u64>,
}

impl From<&ResolvedFunction> for FunctionReport {
    fn from(resolved: &ResolvedFunction) -> Self {
        Self {
            name: resolved.symbol.name.clone(),
            address: resolved.symbol.address,
            size: resolved.symbol.size,
            offsets: resolved.offsets.as_slice().to_vec(),
            return_addresses: resolved.return_addresses(),
        }
    }
}

/// Parse `--arch`, defaulting to the host architecture.
pub fn expected_arch(arch: Option<&str>) -> Result<Arch> {
    match arch {
        Some(name) => name.parse::<Arch>().map_err(|e| anyhow!(e)),
        None => Arch::host().ok_or_else(|| {
            anyhow!("Host architecture {} is not supported; pass --arch", std::env::consts::ARCH)
        }),
    }
}

/// Resolve the return sites of each symbol in the binary at `path`.
pub fn build_offsets_report(
    path: &Path,
    symbols: &[String],
    arch: Option<&str>,
) -> Result<OffsetsReport> {
    if symbols.is_empty() {
        return Err(anyhow!("At least one --symbol is required"));
    }
    let expected = expected_arch(arch)?;
    debug!("resolving {} symbol(s) in {} as {expected}", symbols.len(), path.display());
    let resolver = ReturnSiteResolver::open(path, expected)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut functions = Vec::with_capacity(symbols.len());
    for (name, result) in symbols.iter().zip(resolver.resolve_all(symbols)) {
        let resolved =
            result.with_context(|| format!("Failed to resolve return sites of {name}"))?;
        debug!("{name}: {} return site(s)", resolved.offsets.len());
        functions.push(FunctionReport::from(&resolved));
    }

    Ok(OffsetsReport {
        path: path.to_path_buf(),
        sha256: sha256_file(path)?,
        arch: resolver.arch(),
        functions,
    })
}

/// Print return-site offsets for each symbol.
pub fn offsets_command(path: &str, symbols: &[String], arch: Option<&str>, json: bool) -> Result<()> {
    let report = build_offsets_report(Path::new(path), symbols, arch)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Binary: {} ({})", report.path.display(), report.arch);
    println!("SHA-256: {}", report.sha256);
    for func in &report.functions {
        println!("- {} @ 0x{:X} (size 0x{:X})", func.name, func.address, func.size);
        let offsets: Vec<String> = func.offsets.iter().map(|o| format!("0x{o:X}")).collect();
        println!("  return offsets: {}", offsets.join(", "));
    }

    Ok(())
}

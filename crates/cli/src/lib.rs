pub mod commands;

use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use retsite_core::config::ProbeConfig;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of a file and return it as a hex string.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open binary for hashing: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("Failed to read binary for hashing: {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(format!("{:x}", digest))
}

/// Load a probe config from JSON (`.json`) or YAML (`.yaml` / `.yml`).
pub fn load_probe_config(path: &Path) -> Result<ProbeConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read probe config at {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
    match ext.as_str() {
        "json" => serde_json::from_str(&contents).context("Failed to parse probe config JSON"),
        "yaml" | "yml" => {
            serde_yaml::from_str(&contents).context("Failed to parse probe config YAML")
        }
        other => Err(anyhow!(
            "Unsupported probe config extension '{other}' for {} (expected .json, .yaml or .yml)",
            path.display()
        )),
    }
}

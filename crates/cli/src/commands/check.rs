use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::load_probe_config;

/// Load a probe config, validate it and resolve all of its symbols.
pub fn check_command(config_path: &str, json: bool) -> Result<()> {
    let config = load_probe_config(Path::new(config_path))?;
    debug!(
        "loaded probe config {config_path}: binary {}, {} symbol(s)",
        config.path.display(),
        config.symbols.len()
    );
    let setup = config.check().with_context(|| {
        format!("Probe check failed for {}", config.path.display())
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&setup)?);
        return Ok(());
    }

    println!("Probe setup:");
    println!("  Binary: {}", setup.path.display());
    println!("  Arch: {}", setup.arch);
    println!("  Mode: {:?}", setup.mode);
    println!("  Functions ({}):", setup.functions.len());
    for func in &setup.functions {
        let addrs: Vec<String> =
            func.return_addresses().iter().map(|a| format!("0x{a:X}")).collect();
        println!("  - {} @ 0x{:X}: {}", func.symbol.name, func.symbol.address, addrs.join(", "));
    }

    Ok(())
}

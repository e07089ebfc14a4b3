use anyhow::Result;

/// Print the host architecture as the resolver names it.
pub fn host_arch_command() -> Result<()> {
    match retsite_core::Arch::host() {
        Some(arch) => println!("{arch}"),
        None => println!("{} (unsupported)", std::env::consts::ARCH),
    }
    Ok(())
}

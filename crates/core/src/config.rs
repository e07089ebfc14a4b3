//! Probe configuration: which binary to inspect, how traffic will be
//! captured, and which functions need return hooks.
//!
//! Frontends deserialize a [`ProbeConfig`] (JSON or YAML) and call
//! [`ProbeConfig::check`] before any probe is attached.

use std::path::PathBuf;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ResolveError;
use crate::model::{Arch, ResolvedFunction};
use crate::services::resolver::ReturnSiteResolver;

/// Read path of Go's `crypto/tls` connection; the usual return-hook target.
pub const GO_TLS_READ_FUNC: &str = "crypto/tls.(*Conn).Read";

/// How captured plaintext is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Text,
    Pcap,
    Keylog,
}

impl CaptureMode {
    /// Map a user-supplied model name. Unknown and empty names fall back to
    /// text output.
    pub fn from_model(model: &str) -> CaptureMode {
        match model.trim().to_lowercase().as_str() {
            "keylog" | "key" => CaptureMode::Keylog,
            "pcap" | "pcapng" => CaptureMode::Pcap,
            _ => CaptureMode::Text,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No target binary path configured")]
    MissingPath,
    #[error("'pcap' model requires a network interface name (ifname)")]
    MissingInterface,
    #[error("Host architecture {0} cannot be probed (supported: amd64, arm64)")]
    UnsupportedHost(String),
    #[error("No symbols configured")]
    NoSymbols,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{symbol}: {source}")]
    Symbol {
        symbol: String,
        #[source]
        source: ResolveError,
    },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

fn default_symbols() -> Vec<String> {
    vec![GO_TLS_READ_FUNC.to_string()]
}

/// Serializable probe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Path to the target executable.
    #[serde(default)]
    pub path: PathBuf,
    /// Capture model name: text, pcap/pcapng, key/keylog.
    #[serde(default)]
    pub model: String,
    /// Network interface; required for the pcap model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifname: Option<String>,
    /// Functions whose return sites should be hooked.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Architecture the probes will run on. Defaults to the host's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_arch: Option<Arch>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            model: String::new(),
            ifname: None,
            symbols: default_symbols(),
            expected_arch: None,
        }
    }
}

/// Everything the attacher needs, produced by [`ProbeConfig::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSetup {
    pub path: PathBuf,
    pub mode: CaptureMode,
    pub arch: Arch,
    pub functions: Vec<ResolvedFunction>,
}

impl ProbeConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    /// Resolve the capture mode, enforcing the pcap interface requirement.
    pub fn check_model(&self) -> Result<CaptureMode, ConfigError> {
        let mode = CaptureMode::from_model(&self.model);
        if mode == CaptureMode::Pcap
            && self.ifname.as_deref().map_or(true, |name| name.trim().is_empty())
        {
            return Err(ConfigError::MissingInterface);
        }
        Ok(mode)
    }

    /// The configured architecture, or the host's.
    pub fn expected_arch(&self) -> Result<Arch, ConfigError> {
        match self.expected_arch {
            Some(arch) => Ok(arch),
            None => Arch::host()
                .ok_or_else(|| ConfigError::UnsupportedHost(std::env::consts::ARCH.to_string())),
        }
    }

    /// Validate the configuration and the binary, then resolve every
    /// configured symbol. Any failure aborts the whole setup.
    pub fn check(&self) -> Result<ProbeSetup, ProbeError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath.into());
        }
        let mode = self.check_model()?;
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols.into());
        }
        let expected = self.expected_arch()?;

        let resolver = ReturnSiteResolver::open(&self.path, expected)?;
        let functions = resolver
            .resolve_all(self.symbols.as_slice())
            .into_iter()
            .zip(&self.symbols)
            .map(|(result, symbol)| {
                result.map_err(|source| ProbeError::Symbol { symbol: symbol.clone(), source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "probe setup for {} ({expected}, {mode:?}): {} function(s), {} return site(s)",
            self.path.display(),
            functions.len(),
            functions.iter().map(|f| f.offsets.len()).sum::<usize>()
        );
        Ok(ProbeSetup { path: self.path.clone(), mode, arch: expected, functions })
    }
}

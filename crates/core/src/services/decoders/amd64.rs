use capstone::arch::x86::{ArchMode, X86Insn};
use capstone::prelude::*;
use capstone::Capstone;

use super::{Decoded, InstructionDecoder};
use crate::error::{DecodeError, ResolveError};
use crate::model::Arch;

/// Architectural upper bound on an x86 instruction's length.
pub const MAX_INSN_LEN: usize = 15;

/// x86-64 decoder (variable length, 1..=15 bytes).
///
/// Only the near return (`C3`, `C2 iw`) counts as a return; far returns
/// (`CB`, `CA iw`) switch code segments and are never emitted for the
/// functions this is used on.
pub struct Amd64Decoder {
    cs: Capstone,
}

impl Amd64Decoder {
    pub fn new() -> Result<Self, ResolveError> {
        let cs = Capstone::new().x86().mode(ArchMode::Mode64).build().map_err(|e| {
            ResolveError::DecoderInit { arch: Arch::Amd64, reason: format!("capstone init failed: {e}") }
        })?;
        Ok(Self { cs })
    }
}

impl InstructionDecoder for Amd64Decoder {
    fn arch(&self) -> Arch {
        Arch::Amd64
    }

    fn decode_one(&self, bytes: &[u8]) -> Result<Decoded, DecodeError> {
        let window = &bytes[..bytes.len().min(MAX_INSN_LEN)];
        let insns = self
            .cs
            .disasm_count(window, 0, 1)
            .map_err(|e| DecodeError::new(Arch::Amd64, e.to_string()))?;
        let insn = insns.iter().next().ok_or_else(|| {
            DecodeError::new(
                Arch::Amd64,
                format!("invalid or truncated instruction at bytes {}", hex_preview(window)),
            )
        })?;

        Ok(Decoded {
            len: insn.bytes().len(),
            is_return: insn.id().0 == X86Insn::X86_INS_RET as u32,
        })
    }
}

pub(crate) fn hex_preview(bytes: &[u8]) -> String {
    let shown: Vec<String> = bytes.iter().take(8).map(|b| format!("{b:02X}")).collect();
    if bytes.len() > 8 {
        format!("[{} ..]", shown.join(" "))
    } else {
        format!("[{}]", shown.join(" "))
    }
}

use capstone::arch::arm64::{Arm64Insn, ArchMode};
use capstone::prelude::*;
use capstone::Capstone;

use super::amd64::hex_preview;
use super::{Decoded, InstructionDecoder};
use crate::error::{DecodeError, ResolveError};
use crate::model::Arch;

/// Every A64 instruction is one 32-bit little-endian word.
pub const INSN_LEN: usize = 4;

/// AArch64 decoder. `RET` with any link register counts as a return;
/// the pointer-authenticated `RETAA`/`RETAB` forms do not.
pub struct Arm64Decoder {
    cs: Capstone,
}

impl Arm64Decoder {
    pub fn new() -> Result<Self, ResolveError> {
        let cs = Capstone::new().arm64().mode(ArchMode::Arm).build().map_err(|e| {
            ResolveError::DecoderInit { arch: Arch::Arm64, reason: format!("capstone init failed: {e}") }
        })?;
        Ok(Self { cs })
    }
}

impl InstructionDecoder for Arm64Decoder {
    fn arch(&self) -> Arch {
        Arch::Arm64
    }

    fn decode_one(&self, bytes: &[u8]) -> Result<Decoded, DecodeError> {
        let Some(word) = bytes.get(..INSN_LEN) else {
            return Err(DecodeError::new(
                Arch::Arm64,
                format!("truncated instruction: {} of {INSN_LEN} bytes {}", bytes.len(), hex_preview(bytes)),
            ));
        };

        let insns = self
            .cs
            .disasm_count(word, 0, 1)
            .map_err(|e| DecodeError::new(Arch::Arm64, e.to_string()))?;
        let insn = insns.iter().next().ok_or_else(|| {
            let raw = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            DecodeError::new(Arch::Arm64, format!("unrecognized encoding 0x{raw:08X}"))
        })?;

        Ok(Decoded { len: INSN_LEN, is_return: insn.id().0 == Arm64Insn::ARM64_INS_RET as u32 })
    }
}

//! Per-architecture single-instruction decoders.
//!
//! Both variants are backed by Capstone. A decoder is chosen once per image
//! via [`Arch::decoder`] and then driven by the scanner; it only classifies
//! the opcode and never evaluates operands.

pub mod amd64;
pub mod arm64;

pub use amd64::Amd64Decoder;
pub use arm64::Arm64Decoder;

use crate::error::{DecodeError, ResolveError};
use crate::model::Arch;

/// Length and classification of one decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub len: usize,
    pub is_return: bool,
}

/// Decodes exactly one instruction from the start of a byte slice.
///
/// `bytes` must begin on an instruction boundary. Implementations hold no
/// state that changes between calls.
pub trait InstructionDecoder {
    fn arch(&self) -> Arch;
    fn decode_one(&self, bytes: &[u8]) -> Result<Decoded, DecodeError>;
}

impl Arch {
    /// Build the decoder for this architecture.
    pub fn decoder(self) -> Result<Box<dyn InstructionDecoder>, ResolveError> {
        let decoder: Box<dyn InstructionDecoder> = match self {
            Arch::Amd64 => Box::new(Amd64Decoder::new()?),
            Arch::Arm64 => Box::new(Arm64Decoder::new()?),
        };
        Ok(decoder)
    }
}

/// Decode a single instruction without keeping the decoder around.
pub fn decode_one(bytes: &[u8], arch: Arch) -> Result<Decoded, ResolveError> {
    arch.decoder()?
        .decode_one(bytes)
        .map_err(|source| ResolveError::Decode { offset: 0, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_reports_its_arch() {
        assert_eq!(Arch::Amd64.decoder().unwrap().arch(), Arch::Amd64);
        assert_eq!(Arch::Arm64.decoder().unwrap().arch(), Arch::Arm64);
    }

    #[test]
    fn one_shot_decode_wraps_failures_at_offset_zero() {
        let err = decode_one(&[0x90], Arch::Arm64).unwrap_err();
        assert!(matches!(err, ResolveError::Decode { offset: 0, .. }), "{err}");
        assert_eq!(decode_one(&[0xC3], Arch::Amd64).unwrap(), Decoded { len: 1, is_return: true });
    }
}

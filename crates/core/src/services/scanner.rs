use log::{debug, trace};

use crate::error::{DecodeError, ResolveError};
use crate::model::{Arch, Instruction, ReturnOffsets};
use crate::services::decoders::InstructionDecoder;

/// Scan `bytes` as `arch` code and return the offsets of every return.
pub fn scan(bytes: &[u8], arch: Arch) -> Result<ReturnOffsets, ResolveError> {
    let decoder = arch.decoder()?;
    scan_with(bytes, decoder.as_ref())
}

/// Linearly decode `bytes` from offset 0 with `decoder`.
///
/// Any decode failure aborts the whole scan: after one bad decode the cursor
/// is no longer on an instruction boundary, so later offsets can't be
/// trusted. Finishing without a single return is `NoReturnFound`.
pub fn scan_with(
    bytes: &[u8],
    decoder: &dyn InstructionDecoder,
) -> Result<ReturnOffsets, ResolveError> {
    let mut offsets = Vec::new();
    let mut count = 0usize;
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        let decoded = decoder
            .decode_one(&bytes[cursor..])
            .map_err(|source| ResolveError::Decode { offset: cursor, source })?;
        if decoded.len == 0 {
            return Err(ResolveError::Decode {
                offset: cursor,
                source: DecodeError::new(decoder.arch(), "decoder reported a zero-length instruction"),
            });
        }

        let insn = Instruction { offset: cursor, len: decoded.len, is_return: decoded.is_return };
        trace!("{:#06x} len={} ret={}", insn.offset, insn.len, insn.is_return);
        if insn.is_return {
            offsets.push(insn.offset);
        }
        count += 1;
        cursor += insn.len;
    }

    debug!(
        "scanned {} {} bytes: {count} instructions, {} returns",
        bytes.len(),
        decoder.arch(),
        offsets.len()
    );
    ReturnOffsets::from_scan(offsets).ok_or(ResolveError::NoReturnFound)
}

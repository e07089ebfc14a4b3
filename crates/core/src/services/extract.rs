use log::debug;

use crate::error::ResolveError;
use crate::model::Symbol;
use crate::services::image::BinaryImage;

/// SHN_UNDEF: the symbol is defined in another object.
const SHN_UNDEF: usize = 0;

/// Borrow exactly the bytes of `symbol`'s body from its owning section.
///
/// The range is `[address - section.address, + size)` within the section's
/// raw data; an inconsistent address/size pair is `CorruptSymbolRange`.
pub fn function_bytes<'a>(
    image: &'a BinaryImage,
    symbol: &Symbol,
) -> Result<&'a [u8], ResolveError> {
    let sections = image.sections();
    let section = sections
        .get(symbol.section_index)
        .filter(|_| symbol.section_index != SHN_UNDEF)
        .ok_or_else(|| ResolveError::InvalidSection {
            symbol: symbol.name.clone(),
            index: symbol.section_index,
            count: sections.len(),
        })?;

    let data = image.section_data(section)?;

    let corrupt = || ResolveError::CorruptSymbolRange {
        symbol: symbol.name.clone(),
        address: symbol.address,
        size: symbol.size,
        section: section.name.clone(),
        section_address: section.address,
        section_size: data.len() as u64,
    };

    let start = symbol.address.checked_sub(section.address).ok_or_else(corrupt)?;
    let end = start.checked_add(symbol.size).ok_or_else(corrupt)?;
    if end > data.len() as u64 {
        return Err(corrupt());
    }

    // Both bounds are <= data.len(), so they fit in usize.
    let (start, end) = (start as usize, end as usize);
    debug!(
        "{}: {} bytes at {}+0x{start:X} (file offset 0x{:X})",
        symbol.name,
        end - start,
        section.name,
        section.file_offset + start as u64
    );
    Ok(&data[start..end])
}

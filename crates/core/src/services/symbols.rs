use log::{debug, warn};

use crate::error::ResolveError;
use crate::model::Symbol;
use crate::services::image::BinaryImage;

/// Find `name` in the image's static table, then its dynamic table.
///
/// Matching is exact and case-sensitive; the first hit in that order wins.
/// If the same name shows up again at a different address, a warning is
/// logged, since hooking the wrong copy silently captures nothing.
pub fn resolve(image: &BinaryImage, name: &str) -> Result<Symbol, ResolveError> {
    let mut all = image.symbols().iter().chain(image.dynamic_symbols()).peekable();
    if all.peek().is_none() {
        return Err(ResolveError::NoSymbolsFound);
    }

    let mut matches = all.filter(|sym| sym.name == name);
    let Some(found) = matches.next() else {
        return Err(ResolveError::SymbolNotFound { symbol: name.to_string() });
    };

    for dup in matches.filter(|sym| sym.address != found.address) {
        warn!(
            "symbol {name} appears more than once with different addresses: using {:?} entry at \
             0x{:X}, ignoring {:?} entry at 0x{:X}",
            found.table, found.address, dup.table, dup.address
        );
    }

    debug!(
        "resolved {name} in {:?} table: address=0x{:X} size=0x{:X} section={}",
        found.table, found.address, found.size, found.section_index
    );
    Ok(found.clone())
}

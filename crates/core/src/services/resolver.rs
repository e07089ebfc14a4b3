use std::path::Path;
use std::thread;

use log::debug;

use crate::error::ResolveError;
use crate::model::{Arch, ResolvedFunction};
use crate::services::image::BinaryImage;
use crate::services::{extract, scanner, symbols};

/// Resolves return sites for any number of symbols in one validated binary.
///
/// The image is parsed once and only read afterwards, so symbols can be
/// resolved concurrently (see [`ReturnSiteResolver::resolve_all`]).
#[derive(Debug, Clone)]
pub struct ReturnSiteResolver {
    image: BinaryImage,
}

impl ReturnSiteResolver {
    /// Validate the binary at `path` against `expected` and keep it open.
    pub fn open(path: impl AsRef<Path>, expected: Arch) -> Result<Self, ResolveError> {
        Ok(Self { image: BinaryImage::validate(path, expected)? })
    }

    pub fn from_image(image: BinaryImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &BinaryImage {
        &self.image
    }

    pub fn arch(&self) -> Arch {
        self.image.arch()
    }

    /// symbol lookup -> byte-range extraction -> return-site scan.
    pub fn resolve(&self, name: &str) -> Result<ResolvedFunction, ResolveError> {
        let symbol = symbols::resolve(&self.image, name)?;
        let bytes = extract::function_bytes(&self.image, &symbol)?;
        let offsets = scanner::scan(bytes, self.image.arch())?;
        debug!("{name}: {} return site(s) at {:?}", offsets.len(), offsets.as_slice());
        Ok(ResolvedFunction { symbol, offsets })
    }

    /// Resolve every name on its own scoped thread. Results come back in
    /// the same order as `names`; each one succeeds or fails independently.
    pub fn resolve_all<S: AsRef<str> + Sync>(
        &self,
        names: &[S],
    ) -> Vec<Result<ResolvedFunction, ResolveError>> {
        thread::scope(|scope| {
            let handles: Vec<_> = names
                .iter()
                .map(|name| scope.spawn(move || self.resolve(name.as_ref())))
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

/// One-shot helper: validate `path`, then resolve `symbol`'s return sites.
pub fn find_return_offsets(
    path: impl AsRef<Path>,
    expected: Arch,
    symbol: &str,
) -> Result<ResolvedFunction, ResolveError> {
    ReturnSiteResolver::open(path, expected)?.resolve(symbol)
}

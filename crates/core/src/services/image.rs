use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use goblin::container::{Container, Ctx, Endian};
use goblin::elf::header::{machine_to_str, EM_AARCH64, EM_X86_64};
use goblin::elf::section_header::{SHT_DYNSYM, SHT_NOBITS};
use goblin::elf::sym::{Sym, Symtab};
use goblin::elf::Elf;
use goblin::strtab::Strtab;
use log::debug;

use crate::error::ResolveError;
use crate::model::{Arch, Section, Symbol, SymbolTable};

/// A parsed, read-only ELF executable.
///
/// Owns the file contents plus owned copies of the section table and both
/// symbol tables, so it can be shared across threads while several symbols
/// are resolved against it.
#[derive(Debug, Clone)]
pub struct BinaryImage {
    path: PathBuf,
    arch: Arch,
    data: Vec<u8>,
    sections: Vec<Section>,
    symbols: Vec<Symbol>,
    dynamic_symbols: Vec<Symbol>,
}

fn classify_machine(e_machine: u16) -> Option<Arch> {
    match e_machine {
        EM_X86_64 => Some(Arch::Amd64),
        EM_AARCH64 => Some(Arch::Arm64),
        _ => None,
    }
}

fn load_bytes(path: &Path) -> Result<Vec<u8>, ResolveError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(ResolveError::NotFound(path.to_path_buf()))
        }
        Err(source) => Err(ResolveError::Read { path: path.to_path_buf(), source }),
    }
}

// Index 0 of every ELF symbol table is the reserved null entry.
fn collect_symbols(syms: &Symtab<'_>, strtab: &Strtab<'_>, table: SymbolTable) -> Vec<Symbol> {
    syms.iter()
        .skip(1)
        .map(|sym| Symbol {
            name: strtab.get_at(sym.st_name).unwrap_or("").to_string(),
            address: sym.st_value,
            size: sym.st_size,
            section_index: sym.st_shndx,
            table,
        })
        .collect()
}

/// Entries of the `SHT_DYNSYM` section, read through its section header.
///
/// goblin only fills `Elf::dynsyms` from the `PT_DYNAMIC` segment; that view
/// is used when no `SHT_DYNSYM` section header exists.
fn read_dynamic_symbols(elf: &Elf<'_>, data: &[u8]) -> goblin::error::Result<Vec<Symbol>> {
    let Some(shdr) = elf.section_headers.iter().find(|sh| sh.sh_type == SHT_DYNSYM) else {
        return Ok(collect_symbols(&elf.dynsyms, &elf.dynstrtab, SymbolTable::Dynamic));
    };

    let container = if elf.is_64 { Container::Big } else { Container::Little };
    let endian = if elf.little_endian { Endian::Little } else { Endian::Big };
    let entsize = match shdr.sh_entsize {
        0 => Sym::size(container) as u64,
        n => n,
    };
    let syms = Symtab::parse(
        data,
        shdr.sh_offset as usize,
        (shdr.sh_size / entsize) as usize,
        Ctx::new(container, endian),
    )?;
    let strtab = match elf.section_headers.get(shdr.sh_link as usize) {
        Some(link) => Strtab::parse(data, link.sh_offset as usize, link.sh_size as usize, 0)?,
        None => Strtab::default(),
    };
    Ok(collect_symbols(&syms, &strtab, SymbolTable::Dynamic))
}

impl BinaryImage {
    /// Open `path`, parse it, and require its machine to be `expected`.
    ///
    /// The architecture check happens before anything looks at symbols:
    /// offsets computed for the wrong instruction set are meaningless.
    pub fn validate(path: impl AsRef<Path>, expected: Arch) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        let data = load_bytes(path)?;
        let image = Self::parse_inner(path, data, expected.as_str())?;
        if image.arch != expected {
            return Err(ResolveError::ArchitectureMismatch { expected, actual: image.arch });
        }
        debug!(
            "validated {} ({}, {} sections, {} symbols, {} dynamic symbols)",
            path.display(),
            image.arch,
            image.sections.len(),
            image.symbols.len(),
            image.dynamic_symbols.len()
        );
        Ok(image)
    }

    /// Open and parse `path` without an architecture expectation.
    /// Unsupported machines are still rejected.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        let data = load_bytes(path)?;
        Self::parse(path, data)
    }

    /// Parse bytes that were already read from `path`.
    pub fn parse(path: impl AsRef<Path>, data: Vec<u8>) -> Result<Self, ResolveError> {
        Self::parse_inner(path.as_ref(), data, "amd64 or arm64")
    }

    fn parse_inner(path: &Path, data: Vec<u8>, expected: &str) -> Result<Self, ResolveError> {
        let (arch, sections, symbols, dynamic_symbols) = {
            let elf = Elf::parse(&data).map_err(|err| ResolveError::Parse {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;

            let machine = elf.header.e_machine;
            let arch = classify_machine(machine).ok_or_else(|| {
                ResolveError::UnsupportedArchitecture {
                    detected: machine_to_str(machine).to_string(),
                    expected: expected.to_string(),
                }
            })?;

            let sections = elf
                .section_headers
                .iter()
                .map(|sh| Section {
                    name: elf.shdr_strtab.get_at(sh.sh_name).unwrap_or("").to_string(),
                    address: sh.sh_addr,
                    file_offset: sh.sh_offset,
                    size: sh.sh_size,
                    has_data: sh.sh_type != SHT_NOBITS,
                })
                .collect();

            let symbols = collect_symbols(&elf.syms, &elf.strtab, SymbolTable::Static);
            let dynamic_symbols =
                read_dynamic_symbols(&elf, &data).map_err(|err| ResolveError::Parse {
                    path: path.to_path_buf(),
                    reason: format!("malformed .dynsym: {err}"),
                })?;
            (arch, sections, symbols, dynamic_symbols)
        };

        Ok(Self::from_parts(path, arch, data, sections, symbols, dynamic_symbols))
    }

    pub(crate) fn from_parts(
        path: impl Into<PathBuf>,
        arch: Arch,
        data: Vec<u8>,
        sections: Vec<Section>,
        symbols: Vec<Symbol>,
        dynamic_symbols: Vec<Symbol>,
    ) -> Self {
        Self { path: path.into(), arch, data, sections, symbols, dynamic_symbols }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Raw file contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Entries of `.symtab`, without the null entry.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Entries of `.dynsym`, without the null entry.
    pub fn dynamic_symbols(&self) -> &[Symbol] {
        &self.dynamic_symbols
    }

    /// Raw on-disk bytes of `section`.
    pub fn section_data(&self, section: &Section) -> Result<&[u8], ResolveError> {
        let read_error = |reason: String| ResolveError::SectionReadError {
            section: section.name.clone(),
            reason,
        };

        if !section.has_data {
            return Err(read_error("section occupies no file space (SHT_NOBITS)".into()));
        }
        let start = usize::try_from(section.file_offset)
            .map_err(|_| read_error(format!("file offset 0x{:X} too large", section.file_offset)))?;
        let len = usize::try_from(section.size)
            .map_err(|_| read_error(format!("size 0x{:X} too large", section.size)))?;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                read_error(format!(
                    "file range 0x{start:X}+0x{len:X} exceeds file length 0x{:X}",
                    self.data.len()
                ))
            })?;
        Ok(&self.data[start..end])
    }
}

//! ELF fixture builder shared by the integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use object::write::{Object, Symbol, SymbolSection};
use object::{
    Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope,
};
use tempfile::TempDir;

pub const ARM64_RET: [u8; 4] = 0xD65F_03C0u32.to_le_bytes();
pub const ARM64_NOP: [u8; 4] = 0xD503_201Fu32.to_le_bytes();
/// `b .` (branch to self).
pub const ARM64_SPIN: [u8; 4] = 0x1400_0000u32.to_le_bytes();

/// An ELF written into a temp dir that lives as long as this value.
pub struct ElfFixture {
    _dir: TempDir,
    pub path: PathBuf,
}

/// Write a relocatable ELF for `arch` whose `.text` holds `functions`
/// back to back, each with a sized `STT_FUNC` symbol.
pub fn write_elf(arch: Architecture, functions: &[(&str, &[u8])]) -> ElfFixture {
    let mut obj = Object::new(BinaryFormat::Elf, arch, Endianness::Little);

    // Something ahead of .text so section indices aren't trivially 1.
    let ro_id = obj.add_section(Vec::new(), b".rodata".to_vec(), SectionKind::ReadOnlyData);
    obj.append_section_data(ro_id, b"fixture\x00", 1);

    let text_id = obj.add_section(Vec::new(), b".text".to_vec(), SectionKind::Text);
    for (name, body) in functions {
        let value = obj.append_section_data(text_id, body, 16);
        obj.add_symbol(Symbol {
            name: name.as_bytes().to_vec(),
            value,
            size: body.len() as u64,
            kind: SymbolKind::Text,
            scope: SymbolScope::Linkage,
            weak: false,
            section: SymbolSection::Section(text_id),
            flags: SymbolFlags::None,
        });
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fixture.elf");
    std::fs::write(&path, obj.write().expect("write elf")).expect("write fixture");
    ElfFixture { _dir: dir, path }
}

/// `(name, address, size)` of one `STT_FUNC` symbol defined in `.text`.
pub type FuncSym<'a> = (&'a str, u64, u64);

const SHT_PROGBITS: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;
const SHT_DYNSYM: u32 = 11;
const SYM_SIZE: u64 = 24;

fn string_table(names: &[&str]) -> (Vec<u8>, Vec<u32>) {
    let mut table = vec![0u8];
    let mut offsets = Vec::with_capacity(names.len());
    for name in names {
        offsets.push(table.len() as u32);
        table.extend_from_slice(name.as_bytes());
        table.push(0);
    }
    (table, offsets)
}

// Null entry first, then one GLOBAL FUNC per symbol, all in section 1 (.text).
fn symbol_table(symbols: &[FuncSym<'_>]) -> (Vec<u8>, Vec<u8>) {
    let names: Vec<&str> = symbols.iter().map(|(name, _, _)| *name).collect();
    let (strtab, name_offsets) = string_table(&names);
    let mut table = vec![0u8; SYM_SIZE as usize];
    for ((_, address, size), name) in symbols.iter().zip(name_offsets) {
        table.extend_from_slice(&name.to_le_bytes());
        table.push(0x12);
        table.push(0);
        table.extend_from_slice(&1u16.to_le_bytes());
        table.extend_from_slice(&address.to_le_bytes());
        table.extend_from_slice(&size.to_le_bytes());
    }
    (table, strtab)
}

struct SectionHeader {
    name: u32,
    kind: u32,
    flags: u64,
    address: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    entsize: u64,
}

impl SectionHeader {
    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.name.to_le_bytes());
        out.extend_from_slice(&self.kind.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.address.to_le_bytes());
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.link.to_le_bytes());
        out.extend_from_slice(&self.info.to_le_bytes());
        out.extend_from_slice(&8u64.to_le_bytes());
        out.extend_from_slice(&self.entsize.to_le_bytes());
    }
}

/// Write a little-endian x86-64 `ET_DYN` ELF with both a `.symtab` and a
/// `.dynsym`, laid out as: header, `.text` at `text_address`, the two symbol
/// tables with their string tables, `.shstrtab`, then the section headers.
/// Built by hand: `object`'s high-level writer has no `.dynsym` support.
pub fn write_elf_with_dynsym(
    text_address: u64,
    text: &[u8],
    statics: &[FuncSym<'_>],
    dynamics: &[FuncSym<'_>],
) -> ElfFixture {
    let (symtab, strtab) = symbol_table(statics);
    let (dynsym, dynstr) = symbol_table(dynamics);
    let (shstrtab, names) =
        string_table(&[".text", ".symtab", ".strtab", ".dynsym", ".dynstr", ".shstrtab"]);

    let mut body = vec![0u8; 64];
    let mut place = |bytes: &[u8]| {
        while body.len() % 8 != 0 {
            body.push(0);
        }
        let offset = body.len() as u64;
        body.extend_from_slice(bytes);
        (offset, bytes.len() as u64)
    };
    let text_at = place(text);
    let symtab_at = place(&symtab);
    let strtab_at = place(&strtab);
    let dynsym_at = place(&dynsym);
    let dynstr_at = place(&dynstr);
    let shstrtab_at = place(&shstrtab);
    while body.len() % 8 != 0 {
        body.push(0);
    }
    let shoff = body.len() as u64;

    let section = |name: u32, kind: u32, (offset, size): (u64, u64)| SectionHeader {
        name,
        kind,
        flags: 0,
        address: 0,
        offset,
        size,
        link: 0,
        info: 0,
        entsize: 0,
    };
    let headers = [
        section(0, 0, (0, 0)),
        SectionHeader {
            flags: 0x6, // SHF_ALLOC | SHF_EXECINSTR
            address: text_address,
            ..section(names[0], SHT_PROGBITS, text_at)
        },
        SectionHeader { link: 3, info: 1, entsize: SYM_SIZE, ..section(names[1], SHT_SYMTAB, symtab_at) },
        section(names[2], SHT_STRTAB, strtab_at),
        SectionHeader { link: 5, info: 1, entsize: SYM_SIZE, ..section(names[3], SHT_DYNSYM, dynsym_at) },
        section(names[4], SHT_STRTAB, dynstr_at),
        section(names[5], SHT_STRTAB, shstrtab_at),
    ];
    for header in &headers {
        header.write(&mut body);
    }

    let mut ident = [0u8; 16];
    ident[..7].copy_from_slice(&[0x7F, b'E', b'L', b'F', 2, 1, 1]);
    let mut elf_header = Vec::with_capacity(64);
    elf_header.extend_from_slice(&ident);
    elf_header.extend_from_slice(&3u16.to_le_bytes()); // ET_DYN
    elf_header.extend_from_slice(&62u16.to_le_bytes()); // EM_X86_64
    elf_header.extend_from_slice(&1u32.to_le_bytes());
    elf_header.extend_from_slice(&0u64.to_le_bytes()); // e_entry
    elf_header.extend_from_slice(&0u64.to_le_bytes()); // e_phoff
    elf_header.extend_from_slice(&shoff.to_le_bytes());
    elf_header.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    elf_header.extend_from_slice(&64u16.to_le_bytes()); // e_ehsize
    elf_header.extend_from_slice(&56u16.to_le_bytes()); // e_phentsize
    elf_header.extend_from_slice(&0u16.to_le_bytes()); // e_phnum
    elf_header.extend_from_slice(&64u16.to_le_bytes()); // e_shentsize
    elf_header.extend_from_slice(&(headers.len() as u16).to_le_bytes());
    elf_header.extend_from_slice(&6u16.to_le_bytes()); // e_shstrndx
    body[..64].copy_from_slice(&elf_header);

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("dynsym.elf");
    std::fs::write(&path, body).expect("write fixture");
    ElfFixture { _dir: dir, path }
}

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use object::write::{Object, Symbol, SymbolSection};
use object::{
    Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope,
};

/// push rbp; mov rbp,rsp; test edi,edi; je +2; pop rbp; ret; xor eax,eax; pop rbp; ret
pub const AMD64_EARLY_RETURN: [u8; 14] = [
    0x55, 0x48, 0x89, 0xE5, 0x85, 0xFF, 0x74, 0x02, 0x5D, 0xC3, 0x31, 0xC0, 0x5D, 0xC3,
];

/// Write a small x86-64 ELF with the given sized functions into `dir`.
pub fn write_amd64_elf(dir: &Path, functions: &[(&str, &[u8])]) -> PathBuf {
    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
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
    let path = dir.join("target.elf");
    std::fs::write(&path, obj.write().expect("write elf")).expect("write fixture");
    path
}

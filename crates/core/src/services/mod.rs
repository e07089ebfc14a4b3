//! Services that turn an on-disk executable into return-site offsets.
//!
//! The stages run in order, each consuming the previous stage's immutable
//! output:
//! - [`image`]: open, parse and architecture-check the binary
//! - [`symbols`]: find the target symbol across `.symtab` and `.dynsym`
//! - [`extract`]: slice the function's bytes out of its section
//! - [`decoders`] / [`scanner`]: linearly decode those bytes, recording returns
//! - [`resolver`]: ties the stages together for one or many symbols

pub mod decoders;
pub mod extract;
pub mod image;
pub mod resolver;
pub mod scanner;
pub mod symbols;

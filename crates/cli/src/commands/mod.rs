pub mod arch;
pub mod check;
pub mod offsets;

pub use arch::*;
pub use check::*;
pub use offsets::*;

pub mod consts;
pub mod header;
pub mod string_table;

pub use header::WorldHeader;
pub use string_table::{StringTable, StringTableEntry};

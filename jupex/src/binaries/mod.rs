mod cursor;
#[cfg(test)]
mod writer;

pub use cursor::{cstring_at, ByteCursor};
#[cfg(test)]
pub(crate) use writer::Writer;

use crate::error::Result;

// Fixed layout records are copied straight out of the buffer, which is only
// correct when the host matches the little-endian file layout.
#[cfg(target_endian = "big")]
compile_error!("jupex only supports little-endian hosts");

/// Anything that can be decoded from the current cursor position without extra context.
pub trait BinaryData {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self>
    where
        Self: Sized;
}

impl<T: bytemuck::Pod> BinaryData for T {
    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        cursor.read::<T>()
    }
}

use std::mem;

use glam::{Vec2, Vec3, Vec4};

use crate::error::{JupexError, Result};

/// Bounds-checked read cursor over a byte slice. All reads are little-endian.
///
/// Cursors created with [`ByteCursor::sub_cursor`] remember where their slice started, so
/// error offsets are always relative to the outermost buffer.
#[derive(Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
        }
    }

    /// Position relative to the start of this cursor's slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Position relative to the outermost buffer, used for error reporting.
    pub fn absolute_position(&self) -> usize {
        self.base + self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(JupexError::TruncatedInput {
                offset: self.base + offset,
                need: 0,
                have: 0,
            });
        }
        self.pos = offset;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Borrow `len` bytes at `start` without moving the cursor.
    pub fn slice(&self, start: usize, len: usize) -> Result<&'a [u8]> {
        match start.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(&self.data[start..end]),
            _ => Err(JupexError::TruncatedInput {
                offset: self.base + start,
                need: len,
                have: self.data.len().saturating_sub(start),
            }),
        }
    }

    /// Consume `n` bytes and return a cursor over just those bytes.
    ///
    /// Whatever happens while decoding the sub cursor, this cursor has already moved past them.
    pub fn sub_cursor(&mut self, n: usize) -> Result<ByteCursor<'a>> {
        let base = self.absolute_position();
        let data = self.read_bytes(n)?;
        Ok(ByteCursor { data, pos: 0, base })
    }

    /// Cursor over `len` bytes at `start`, without moving this one.
    pub fn view(&self, start: usize, len: usize) -> Result<ByteCursor<'a>> {
        let data = self.slice(start, len)?;
        Ok(ByteCursor {
            data,
            pos: 0,
            base: self.base + start,
        })
    }

    /// Read a fixed layout record.
    ///
    /// Records are `#[repr(C, packed)]` so there is no padding to account for.
    pub fn read<T: bytemuck::Pod>(&mut self) -> Result<T> {
        let bytes = self.read_bytes(mem::size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    pub fn read_array<T: bytemuck::Pod, const N: usize>(&mut self) -> Result<[T; N]> {
        self.read::<[T; N]>()
    }

    pub fn read_magic(&mut self) -> Result<[u8; 4]> {
        self.read::<[u8; 4]>()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_bytes(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let bytes = self.read_bytes(2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.read_bytes(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_vec2(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    /// Three floats in stored order, no axis conversion.
    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec4(&mut self) -> Result<Vec4> {
        Ok(Vec4::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    /// u16 length followed by that many ASCII bytes, no terminator.
    ///
    /// The bytes are consumed even when they turn out not to be ASCII, so the
    /// caller can carry on from the next field.
    pub fn read_lt_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let offset = self.absolute_position();
        let bytes = self.read_bytes(len)?;
        ascii_string(bytes, offset)
    }

    /// Null terminated string starting at `offset` within this cursor's slice.
    pub fn read_cstring_at(&self, offset: usize) -> Result<String> {
        cstring_at(self.data, offset, "string").map_err(|e| rebase(e, self.base))
    }

    /// Check that `count` elements of `elem_size` bytes can still follow.
    pub fn ensure_count(&self, name: &'static str, count: u64, elem_size: u64) -> Result<usize> {
        let need = count.saturating_mul(elem_size);
        if need > self.remaining() as u64 {
            return Err(JupexError::ImplausibleCount {
                name,
                count,
                need,
                remaining: self.remaining(),
                offset: self.absolute_position(),
            });
        }
        Ok(count as usize)
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(JupexError::TruncatedInput {
                offset: self.absolute_position(),
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Null terminated string at `offset` inside `blob`.
///
/// A string running into the end of the blob without a terminator ends there.
pub fn cstring_at(blob: &[u8], offset: usize, context: &'static str) -> Result<String> {
    let Some(tail) = blob.get(offset..) else {
        return Err(JupexError::OffsetOutOfBounds {
            context,
            offset,
            len: 1,
            available: blob.len(),
        });
    };
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    ascii_string(&tail[..end], offset)
}

fn ascii_string(bytes: &[u8], offset: usize) -> Result<String> {
    if !bytes.is_ascii() {
        return Err(JupexError::InvalidEncoding { offset });
    }
    Ok(bytes.iter().map(|&b| b as char).collect())
}

fn rebase(e: JupexError, base: usize) -> JupexError {
    match e {
        JupexError::InvalidEncoding { offset } => JupexError::InvalidEncoding {
            offset: offset + base,
        },
        JupexError::OffsetOutOfBounds {
            context,
            offset,
            len,
            available,
        } => JupexError::OffsetOutOfBounds {
            context,
            offset: offset + base,
            len,
            available,
        },
        e => e,
    }
}

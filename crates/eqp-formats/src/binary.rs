//! Cursor-based binary reader and writer with per-instance endianness.

use crate::FormatError;

/// Initial buffer size of a [`BinaryWriter`], also its growth increment.
pub const DEFAULT_CAPACITY: usize = 65536;

/// Byte order of multi-byte fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

// ---------------------------------------------------------------------------
// BinaryReader: cursor over a byte slice
// ---------------------------------------------------------------------------

macro_rules! read_number {
    ($name:ident, $ty:ty, $size:literal) => {
        pub fn $name(&mut self) -> Result<$ty, FormatError> {
            let bytes = self.read_array::<$size>()?;
            Ok(match self.endian {
                Endian::Little => <$ty>::from_le_bytes(bytes),
                Endian::Big => <$ty>::from_be_bytes(bytes),
            })
        }
    };
}

/// Reader over an immutable byte slice. Every read advances the cursor.
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Move the cursor to an absolute position inside the buffer.
    pub fn seek(&mut self, position: i64) -> Result<(), FormatError> {
        match usize::try_from(position) {
            Ok(pos) if pos < self.data.len() => {
                self.pos = pos;
                Ok(())
            }
            _ => Err(FormatError::SeekOutOfRange {
                position,
                length: self.data.len(),
            }),
        }
    }

    /// Move the cursor relative to its current position.
    pub fn seek_offset(&mut self, offset: i64) -> Result<(), FormatError> {
        self.seek(self.pos as i64 + offset)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        let available = self.remaining();
        if n > available {
            return Err(FormatError::out_of_bounds(n, available));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, FormatError> {
        Ok(i8::from_le_bytes(self.read_array::<1>()?))
    }

    read_number!(read_u16, u16, 2);
    read_number!(read_i16, i16, 2);
    read_number!(read_u32, u32, 4);
    read_number!(read_i32, i32, 4);
    read_number!(read_u64, u64, 8);
    read_number!(read_i64, i64, 8);
    read_number!(read_f32, f32, 4);
    read_number!(read_f64, f64, 8);

    /// Fixed-length string; invalid UTF-8 is replaced.
    pub fn read_string(&mut self, n: usize) -> Result<String, FormatError> {
        Ok(String::from_utf8_lossy(self.read_bytes(n)?).into_owned())
    }

    /// String up to (and consuming) the next NUL byte.
    pub fn read_null_string(&mut self) -> Result<String, FormatError> {
        let rest = &self.data[self.pos..];
        match rest.iter().position(|&b| b == 0) {
            Some(len) => {
                let s = String::from_utf8_lossy(&rest[..len]).into_owned();
                self.pos += len + 1;
                Ok(s)
            }
            None => Err(FormatError::out_of_bounds(rest.len() + 1, rest.len())),
        }
    }
}

// ---------------------------------------------------------------------------
// BinaryWriter: growable output buffer
// ---------------------------------------------------------------------------

macro_rules! write_number {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self, value: $ty) {
            match self.endian {
                Endian::Little => self.write_bytes(&value.to_le_bytes()),
                Endian::Big => self.write_bytes(&value.to_be_bytes()),
            }
        }
    };
}

/// Writer over a preallocated buffer that grows in fixed increments.
///
/// `len()` tracks the furthest byte ever written, so seeking back and
/// overwriting never shrinks the output.
pub struct BinaryWriter {
    buf: Vec<u8>,
    growth: usize,
    position: usize,
    length: usize,
    endian: Endian,
}

impl BinaryWriter {
    pub fn new(endian: Endian) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, endian)
    }

    pub fn with_capacity(capacity: usize, endian: Endian) -> Self {
        let growth = capacity.max(1);
        Self {
            buf: vec![0; growth],
            growth,
            position: 0,
            length: 0,
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Size of the allocated buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Move the cursor to an absolute position inside the written range.
    pub fn seek(&mut self, position: i64) -> Result<(), FormatError> {
        match usize::try_from(position) {
            Ok(pos) if pos < self.length => {
                self.position = pos;
                Ok(())
            }
            _ => Err(FormatError::SeekOutOfRange {
                position,
                length: self.length,
            }),
        }
    }

    pub fn seek_offset(&mut self, offset: i64) -> Result<(), FormatError> {
        self.seek(self.position as i64 + offset)
    }

    fn reserve(&mut self, n: usize) {
        let required = self.position + n;
        if required <= self.buf.len() {
            return;
        }
        let mut size = self.buf.len();
        while size < required {
            size += self.growth;
        }
        self.buf.resize(size, 0);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.buf[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        self.length = self.length.max(self.position);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_le_bytes());
    }

    write_number!(write_u16, u16);
    write_number!(write_i16, i16);
    write_number!(write_u32, u32);
    write_number!(write_i32, i32);
    write_number!(write_u64, u64);
    write_number!(write_i64, i64);
    write_number!(write_f32, f32);
    write_number!(write_f64, f64);

    /// Raw UTF-8 bytes, no terminator.
    pub fn write_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Exactly `width` bytes: truncated, or zero-padded on the right.
    pub fn write_fixed_string(&mut self, s: &str, width: usize) {
        self.write_fixed_bytes(s.as_bytes(), width);
    }

    /// Exactly `width` bytes of raw field data.
    pub fn write_fixed_bytes(&mut self, bytes: &[u8], width: usize) {
        let n = bytes.len().min(width);
        self.write_bytes(&bytes[..n]);
        self.write_zeros(width - n);
    }

    pub fn write_null_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
        self.write_u8(0);
    }

    /// Text, a NUL terminator, then zeros up to `total` bytes.
    pub fn write_padded_string(&mut self, s: &str, total: usize) {
        self.write_null_string(s);
        self.write_zeros(total.saturating_sub(s.len() + 1));
    }

    fn write_zeros(&mut self, n: usize) {
        self.reserve(n);
        self.buf[self.position..self.position + n].fill(0);
        self.position += n;
        self.length = self.length.max(self.position);
    }

    /// The written prefix of the buffer.
    pub fn buffer(&self) -> &[u8] {
        &self.buf[..self.length]
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.length);
        self.buf
    }
}

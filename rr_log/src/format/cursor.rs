// Forward-only byte cursor with the fixed-width and length-prefixed readers
// used by the schema and value readers.

use std::io::{self, Read};

use byteorder::{BigEndian, ByteOrder};

use super::error::{DecodeError, Result};

/// How boolean bytes are mapped to `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolDecoding {
    /// Only `0` and `1` are accepted; any other byte is corruption.
    #[default]
    Strict,
    /// `1` is true, every other byte is false. Matches files written by
    /// loggers that never validated the byte.
    Lenient,
}

/// Big-endian reader over any byte source, tracking how many bytes it has
/// consumed so errors can point at an offset.
pub struct ByteCursor<R> {
    inner: R,
    position: u64,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        ByteCursor { inner, position: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read until `buf` is full or the source is exhausted. Returns the number
    /// of bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
        self.position += filled as u64;
        Ok(filled)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        let got = self.fill(&mut buf)?;
        if got < N {
            return Err(DecodeError::Truncated {
                needed: N,
                available: got,
                offset: self.position,
            });
        }
        Ok(buf)
    }

    /// Read at most `n` bytes; fewer only if the source runs out.
    pub fn read_up_to(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let got = (&mut self.inner)
            .take(n as u64)
            .read_to_end(&mut buf)
            .map_err(DecodeError::Io)?;
        self.position += got as u64;
        Ok(buf)
    }

    /// Read exactly `n` bytes.
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let buf = self.read_up_to(n)?;
        if buf.len() < n {
            return Err(DecodeError::Truncated {
                needed: n,
                available: buf.len(),
                offset: self.position,
            });
        }
        Ok(buf)
    }

    /// Read a big-endian `i32` that starts a new top-level entry.
    ///
    /// Returns `Ok(None)` only when the source is already exhausted. A partial
    /// tag is reported as [`DecodeError::Truncated`].
    pub fn read_i32_at_boundary(&mut self) -> Result<Option<i32>> {
        let mut buf = [0u8; 4];
        match self.fill(&mut buf)? {
            0 => Ok(None),
            4 => Ok(Some(BigEndian::read_i32(&buf))),
            got => Err(DecodeError::Truncated {
                needed: 4,
                available: got,
                offset: self.position,
            }),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_i16_be(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(&self.read_array::<2>()?))
    }

    pub fn read_i32_be(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(&self.read_array::<4>()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(&self.read_array::<4>()?))
    }

    pub fn read_i64_be(&mut self) -> Result<i64> {
        Ok(BigEndian::read_i64(&self.read_array::<8>()?))
    }

    pub fn read_f64_be(&mut self) -> Result<f64> {
        Ok(BigEndian::read_f64(&self.read_array::<8>()?))
    }

    /// Length-prefixed UTF-8 string: `u32` byte length, then the bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32_be()? as usize;
        let offset = self.position;
        let bytes = self.read_exact(len)?;
        String::from_utf8(bytes).map_err(|source| DecodeError::InvalidUtf8 { offset, source })
    }

    pub fn read_bool(&mut self, mode: BoolDecoding) -> Result<bool> {
        let offset = self.position;
        let byte = self.read_u8()?;
        match (mode, byte) {
            (_, 1) => Ok(true),
            (BoolDecoding::Lenient, _) | (BoolDecoding::Strict, 0) => Ok(false),
            (BoolDecoding::Strict, byte) => Err(DecodeError::InvalidBool { byte, offset }),
        }
    }
}

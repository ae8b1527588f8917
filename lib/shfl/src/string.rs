//! # Shared Folder Strings
//!
//! Every path and name crossing the guest/host boundary is a
//! length-prefixed byte string. The wire form is:
//!
//! ```text
//! ┌──────────┬──────────┬───────────────────────────────┐
//! │ size u16 │ len u16  │ bytes[size] (NUL padded)      │
//! └──────────┴──────────┴───────────────────────────────┘
//! ```
//!
//! `len` is authoritative; `size` always leaves room for a terminating NUL.

use alloc::vec::Vec;
use core::fmt;

/// Largest string length the 16-bit size field can describe (size = len + 1)
pub const SHFL_STRING_MAX: usize = 0xFFFE;

/// Size of the wire header (size + length)
pub const SHFL_STRING_HEADER: usize = 4;

/// String construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringError {
    /// Resulting length exceeds [`SHFL_STRING_MAX`]
    TooLong,
    /// Wire header inconsistent with the bytes that follow
    Malformed,
}

impl fmt::Display for StringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringError::TooLong => write!(f, "string exceeds {} bytes", SHFL_STRING_MAX),
            StringError::Malformed => write!(f, "malformed string header"),
        }
    }
}

/// Length-prefixed host string
#[derive(Clone, PartialEq, Eq)]
pub struct ShflString {
    /// Allocated size in bytes, including the terminator
    size: u16,
    /// Used length in bytes, excluding the terminator
    length: u16,
    /// Backing storage, always `size` bytes long
    data: Vec<u8>,
}

/// Number of bytes before the first NUL
fn c_len(bytes: &[u8]) -> usize {
    bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())
}

impl ShflString {
    /// Build a string from a C-style byte string (stops at the first NUL).
    pub fn new(bytes: &[u8]) -> Result<Self, StringError> {
        let len = c_len(bytes);
        Self::from_parts(&[&bytes[..len]])
    }

    /// Build a string by concatenating the given pieces.
    fn from_parts(parts: &[&[u8]]) -> Result<Self, StringError> {
        let len: usize = parts.iter().map(|p| p.len()).sum();
        if len > SHFL_STRING_MAX {
            return Err(StringError::TooLong);
        }

        let mut data = Vec::with_capacity(len + 1);
        for part in parts {
            data.extend_from_slice(part);
        }
        data.push(0);

        Ok(Self {
            size: (len + 1) as u16,
            length: len as u16,
            data,
        })
    }

    /// Used length in bytes
    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Allocated size in bytes
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// The used bytes, without terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.length as usize]
    }

    /// `self` followed by a C string
    pub fn concat_cstr(&self, tail: &[u8]) -> Result<Self, StringError> {
        Self::from_parts(&[self.as_bytes(), &tail[..c_len(tail)]])
    }

    /// A C string followed by `tail`
    pub fn prepend_cstr(head: &[u8], tail: &ShflString) -> Result<Self, StringError> {
        Self::from_parts(&[&head[..c_len(head)], tail.as_bytes()])
    }

    /// `dir + "/" + name`, or `None` when either part is missing or the
    /// result would not fit.
    pub fn build_path(dir: Option<&ShflString>, name: Option<&[u8]>) -> Option<Self> {
        let (dir, name) = (dir?, name?);
        Self::from_parts(&[dir.as_bytes(), b"/", &name[..c_len(name)]]).ok()
    }

    /// Number of bytes [`encode`](Self::encode) appends
    pub fn encoded_len(&self) -> usize {
        SHFL_STRING_HEADER + self.size as usize
    }

    /// Append the wire form to `out`
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
        out.extend_from_slice(&self.data);
    }

    /// Parse the wire form in place. Returns the used bytes and the number
    /// of bytes the string occupies.
    pub fn decode(bytes: &[u8]) -> Result<(&[u8], usize), StringError> {
        if bytes.len() < SHFL_STRING_HEADER {
            return Err(StringError::Malformed);
        }
        let size = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;
        let length = u16::from_le_bytes([bytes[2], bytes[3]]) as usize;
        let end = SHFL_STRING_HEADER + size;
        if length >= size || bytes.len() < end {
            return Err(StringError::Malformed);
        }

        Ok((&bytes[SHFL_STRING_HEADER..SHFL_STRING_HEADER + length], end))
    }
}

impl fmt::Debug for ShflString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShflString({:?})", BytesDisplay(self.as_bytes()))
    }
}

impl fmt::Display for ShflString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BytesDisplay(self.as_bytes()))
    }
}

/// Lossy rendering of raw name bytes for log output
pub struct BytesDisplay<'a>(pub &'a [u8]);

impl fmt::Display for BytesDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0 {
            if (0x20..0x7F).contains(&b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for BytesDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_new_uses_c_length() {
        let s = ShflString::new(b"abc\0def").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.size(), 4);
        assert_eq!(s.as_bytes(), b"abc");
    }

    #[test]
    fn test_new_length_bound() {
        let max = vec![b'x'; SHFL_STRING_MAX];
        let s = ShflString::new(&max).unwrap();
        assert_eq!(s.len(), SHFL_STRING_MAX);
        assert_eq!(s.size(), 0xFFFF);

        let over = vec![b'x'; SHFL_STRING_MAX + 1];
        assert_eq!(ShflString::new(&over), Err(StringError::TooLong));
    }

    #[test]
    fn test_empty() {
        let s = ShflString::new(b"").unwrap();
        assert!(s.is_empty());
        assert_eq!(s.size(), 1);
    }

    #[test]
    fn test_concat() {
        let a = ShflString::new(b"/share").unwrap();
        let joined = a.concat_cstr(b"/dir\0junk").unwrap();
        assert_eq!(joined.as_bytes(), b"/share/dir");
        assert_eq!(joined.len(), a.len() + 4);
        // Inputs untouched
        assert_eq!(a.as_bytes(), b"/share");

        let pre = ShflString::prepend_cstr(b"C:", &a).unwrap();
        assert_eq!(pre.as_bytes(), b"C:/share");
        assert_eq!(pre.size(), pre.len() + 1);
    }

    #[test]
    fn test_concat_overflow() {
        let big = ShflString::new(&vec![b'a'; SHFL_STRING_MAX - 1]).unwrap();
        assert!(big.concat_cstr(b"b").is_ok());
        assert_eq!(big.concat_cstr(b"bc"), Err(StringError::TooLong));
    }

    #[test]
    fn test_build_path() {
        let dir = ShflString::new(b"docs").unwrap();
        let p = ShflString::build_path(Some(&dir), Some(b"a.txt")).unwrap();
        assert_eq!(p.as_bytes(), b"docs/a.txt");

        assert!(ShflString::build_path(None, Some(b"a.txt")).is_none());
        assert!(ShflString::build_path(Some(&dir), None).is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let a = ShflString::new(b"name").unwrap();
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.as_bytes(), b"name");
    }

    #[test]
    fn test_wire_decode_rejects_bad_header() {
        // length >= size
        assert_eq!(
            ShflString::decode(&[2, 0, 2, 0, b'a', b'b']),
            Err(StringError::Malformed)
        );
        // size past end of buffer
        assert_eq!(
            ShflString::decode(&[8, 0, 1, 0, b'a']),
            Err(StringError::Malformed)
        );

        let mut wire = Vec::new();
        ShflString::new(b"hi").unwrap().encode(&mut wire);
        let (name, used) = ShflString::decode(&wire).unwrap();
        assert_eq!(name, b"hi");
        assert_eq!(used, wire.len());

        // Padding past the used length is not part of the name
        let (name, used) = ShflString::decode(&[6, 0, 2, 0, b'o', b'k', 0, b'x', b'y', b'z', 0xAA]).unwrap();
        assert_eq!(name, b"ok");
        assert_eq!(used, 10);
    }
}

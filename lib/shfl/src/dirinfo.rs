//! # Host Directory Records
//!
//! A directory listing reply is a run of variable-length records packed
//! back to back (little endian):
//!
//! ```text
//! offset  size  field
//!   0      8    object size
//!   8      8    allocated size
//!  16      8    access time
//!  24      8    modification time
//!  32      8    change time
//!  40      8    birth time
//!  48      4    mode
//!  52      4    reserved
//!  56      2    name size
//!  58      2    name length
//!  60   size    name bytes
//! ```
//!
//! The next record starts right after the name's allocated size. Records
//! are never trusted: [`DirInfo::decode`] checks every length against the
//! bytes actually present.

use alloc::vec::Vec;
use core::fmt;

use crate::mode::HostMode;
use crate::string::ShflString;
use crate::time::TimeSpec;

/// Fixed part of a record, up to the name bytes
pub const DIR_INFO_HEADER: usize = 60;

/// Offset of the name's size field
const NAME_OFFSET: usize = 56;

/// Record decode errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Record extends past the end of the buffer
    Truncated { offset: usize },
    /// Name length not below its allocated size
    BadName { offset: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated { offset } => write!(f, "truncated record at {}", offset),
            DecodeError::BadName { offset } => write!(f, "bad name header at {}", offset),
        }
    }
}

/// Object metadata as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjInfo {
    pub object_size: i64,
    pub allocated: i64,
    pub access_time: TimeSpec,
    pub modification_time: TimeSpec,
    pub change_time: TimeSpec,
    pub birth_time: TimeSpec,
    pub mode: u32,
}

impl ObjInfo {
    pub fn host_mode(&self) -> HostMode {
        HostMode::from_bits_retain(self.mode)
    }
}

/// One decoded directory record, borrowing its name from the reply buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirInfo<'a> {
    pub info: ObjInfo,
    /// Name bytes (length, not allocated size)
    pub name: &'a [u8],
    /// Bytes this record occupies in the buffer
    pub record_len: usize,
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(b)
}

fn read_i64(buf: &[u8], at: usize) -> i64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[at..at + 8]);
    i64::from_le_bytes(b)
}

impl<'a> DirInfo<'a> {
    /// Decode the record starting at `offset`.
    pub fn decode(buf: &'a [u8], offset: usize) -> Result<Self, DecodeError> {
        let rec = buf.get(offset..).ok_or(DecodeError::Truncated { offset })?;
        if rec.len() < DIR_INFO_HEADER {
            return Err(DecodeError::Truncated { offset });
        }

        let (name, name_used) = ShflString::decode(&rec[NAME_OFFSET..]).map_err(|_| {
            let name_size = read_u16(rec, NAME_OFFSET) as usize;
            if rec.len() < DIR_INFO_HEADER + name_size {
                DecodeError::Truncated { offset }
            } else {
                DecodeError::BadName { offset }
            }
        })?;
        let record_len = NAME_OFFSET + name_used;

        let info = ObjInfo {
            object_size: read_i64(rec, 0),
            allocated: read_i64(rec, 8),
            access_time: TimeSpec(read_i64(rec, 16)),
            modification_time: TimeSpec(read_i64(rec, 24)),
            change_time: TimeSpec(read_i64(rec, 32)),
            birth_time: TimeSpec(read_i64(rec, 40)),
            mode: read_u32(rec, 48),
        };

        Ok(Self {
            info,
            name,
            record_len,
        })
    }
}

/// Append one record in wire form to `out`
pub fn encode_dir_info(out: &mut Vec<u8>, info: &ObjInfo, name: &ShflString) {
    out.extend_from_slice(&info.object_size.to_le_bytes());
    out.extend_from_slice(&info.allocated.to_le_bytes());
    out.extend_from_slice(&info.access_time.0.to_le_bytes());
    out.extend_from_slice(&info.modification_time.0.to_le_bytes());
    out.extend_from_slice(&info.change_time.0.to_le_bytes());
    out.extend_from_slice(&info.birth_time.0.to_le_bytes());
    out.extend_from_slice(&info.mode.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    name.encode(out);
}

/// Bytes [`encode_dir_info`] appends for `name`
pub fn encoded_len(name: &ShflString) -> usize {
    NAME_OFFSET + name.encoded_len()
}

/// Walks the records of a reply buffer.
///
/// Stops after `count` records, at the end of the buffer, or after the
/// first decode error (which is yielded once).
pub struct DirInfoIter<'a> {
    buf: &'a [u8],
    pos: usize,
    remaining: u32,
    failed: bool,
}

impl<'a> DirInfoIter<'a> {
    pub fn new(buf: &'a [u8], count: u32) -> Self {
        Self::resume(buf, 0, count)
    }

    /// Continue a walk at `pos` with `remaining` records still expected
    pub fn resume(buf: &'a [u8], pos: usize, remaining: u32) -> Self {
        Self {
            buf,
            pos,
            remaining,
            failed: false,
        }
    }

    /// Offset of the next record
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for DirInfoIter<'a> {
    type Item = Result<DirInfo<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 || self.pos >= self.buf.len() {
            return None;
        }

        match DirInfo::decode(self.buf, self.pos) {
            Ok(entry) => {
                self.pos += entry.record_len;
                self.remaining -= 1;
                Some(Ok(entry))
            }
            Err(e) => {
                log::warn!("dir info: {} ({} records unread)", e, self.remaining);
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl core::iter::FusedIterator for DirInfoIter<'_> {}

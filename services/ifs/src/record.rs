//! # Find Record Layouts
//!
//! All six info levels share one layout family, so one packer handles
//! them all, driven by a [`RecordShape`]:
//!
//! ```text
//! ┌──────────────────────┬────────────┬──────┬──────────┬─────────┬─────┬──────┬─────┐
//! │ 3 x (FDATE, FTIME)   │ sizes      │ attr │ [cbList] │ [FEAs]  │ cch │ name │ NUL │
//! │ 12 bytes             │ 2x4 / 2x8  │ 2/4  │ 4        │ var     │ 1   │ cch  │ 1   │
//! └──────────────────────┴────────────┴──────┴──────────┴─────────┴─────┴──────┴─────┘
//! ```
//!
//! "L" levels use 64-bit sizes and a 32-bit attribute word.

use alloc::vec::Vec;

use vboxfs_shfl::ObjInfo;

use crate::attr::FileAttr;
use crate::datetime::dos_stamp;
use crate::ea::{build_empty_fea_list, GeaList, EAOP_SIZE, MIN_EA_SIZE};
use crate::error::Os2Error;

/// Date/time block (creation, last access, last write)
const STAMPS_LEN: usize = 12;

/// Name length byte plus terminator
const NAME_OVERHEAD: usize = 2;

/// Find info levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum InfoLevel {
    Standard = 1,
    QueryEaSize = 2,
    QueryEasFromList = 3,
    StandardL = 11,
    QueryEaSizeL = 12,
    QueryEasFromListL = 13,
}

impl TryFrom<u32> for InfoLevel {
    type Error = Os2Error;

    fn try_from(level: u32) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(InfoLevel::Standard),
            2 => Ok(InfoLevel::QueryEaSize),
            3 => Ok(InfoLevel::QueryEasFromList),
            11 => Ok(InfoLevel::StandardL),
            12 => Ok(InfoLevel::QueryEaSizeL),
            13 => Ok(InfoLevel::QueryEasFromListL),
            _ => Err(Os2Error::InvalidFunction),
        }
    }
}

impl InfoLevel {
    pub fn shape(self) -> RecordShape {
        let (large, ea_size, ea_list) = match self {
            InfoLevel::Standard => (false, false, false),
            InfoLevel::QueryEaSize => (false, true, false),
            InfoLevel::QueryEasFromList => (false, false, true),
            InfoLevel::StandardL => (true, false, false),
            InfoLevel::QueryEaSizeL => (true, true, false),
            InfoLevel::QueryEasFromListL => (true, false, true),
        };
        RecordShape {
            large,
            ea_size,
            ea_list,
        }
    }
}

/// Layout descriptor for one info level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordShape {
    /// 64-bit sizes and 32-bit attributes
    pub large: bool,
    /// Carries a cbList (EA size) field
    pub ea_size: bool,
    /// Carries an FEA list; buffer starts with an EAOP block
    pub ea_list: bool,
}

impl RecordShape {
    /// Bytes before the FEA list / name
    pub fn fixed_len(&self) -> usize {
        let body = if self.large { 8 + 8 + 4 } else { 4 + 4 + 2 };
        STAMPS_LEN + body + if self.ea_size { 4 } else { 0 }
    }

    /// Bytes reserved at the start of the caller's buffer
    pub fn prefix_len(&self) -> usize {
        if self.ea_list {
            EAOP_SIZE
        } else {
            0
        }
    }

    /// Smallest buffer that can hold one record with a one-character name
    pub fn min_buffer_len(&self) -> usize {
        let one = self.fixed_len() + NAME_OVERHEAD;
        if self.ea_list {
            EAOP_SIZE + one + MIN_EA_SIZE
        } else {
            one
        }
    }
}

/// One directory entry, ready to pack
#[derive(Debug, Clone, Copy)]
pub struct RecordSource<'a> {
    pub info: &'a ObjInfo,
    pub attr: FileAttr,
    /// Name in the guest code page, at most 255 bytes
    pub name: &'a [u8],
}

/// A packed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packed {
    pub bytes: Vec<u8>,
    /// FEA list was replaced by the "didn't fit" marker
    pub eas_didnt_fit: bool,
}

/// Pack `src` in the layout `shape` describes.
///
/// `room` is the space left in the caller's buffer; it bounds the FEA
/// list. The result may still exceed `room`, the caller checks the fit.
pub fn pack_record(
    shape: RecordShape,
    src: &RecordSource<'_>,
    gea: Option<&GeaList<'_>>,
    tz_offset_min: i16,
    room: usize,
) -> Result<Packed, Os2Error> {
    let name = &src.name[..src.name.len().min(u8::MAX as usize)];
    let mut out = Vec::with_capacity(shape.fixed_len() + name.len() + NAME_OVERHEAD);

    let info = src.info;
    for time in [info.birth_time, info.access_time, info.modification_time] {
        let (date, time) = dos_stamp(time, tz_offset_min);
        out.extend_from_slice(&date.0.to_le_bytes());
        out.extend_from_slice(&time.0.to_le_bytes());
    }

    if shape.large {
        out.extend_from_slice(&(info.object_size as u64).to_le_bytes());
        out.extend_from_slice(&(info.allocated as u64).to_le_bytes());
        out.extend_from_slice(&(src.attr.bits() as u32).to_le_bytes());
    } else {
        out.extend_from_slice(&(info.object_size as u32).to_le_bytes());
        out.extend_from_slice(&(info.allocated as u32).to_le_bytes());
        out.extend_from_slice(&src.attr.bits().to_le_bytes());
    }

    if shape.ea_size {
        // No EAs on shared folders
        out.extend_from_slice(&0u32.to_le_bytes());
    }

    let mut eas_didnt_fit = false;
    if shape.ea_list {
        let max = room.saturating_sub(out.len() + name.len() + NAME_OVERHEAD);
        let empty = GeaList::default();
        let (fea, didnt_fit) = build_empty_fea_list(gea.unwrap_or(&empty), max)?;
        out.extend_from_slice(&fea);
        eas_didnt_fit = didnt_fit;
    }

    out.push(name.len() as u8);
    out.extend_from_slice(name);
    out.push(0);

    Ok(Packed {
        bytes: out,
        eas_didnt_fit,
    })
}

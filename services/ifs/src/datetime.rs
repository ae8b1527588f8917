//! FDATE / FTIME packing.
//!
//! ```text
//! FDATE: | year-1980 (7) | month (4) | day (5) |
//! FTIME: | hours (5)     | minutes (6) | twosecs (5) |
//! ```

use vboxfs_shfl::TimeSpec;

/// First year an FDATE can hold
const DOS_EPOCH_YEAR: i32 = 1980;

/// Largest year offset the 7-bit field holds
const DOS_MAX_YEAR_OFFSET: i32 = 127;

/// Packed OS/2 date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FDate(pub u16);

/// Packed OS/2 time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FTime(pub u16);

impl FDate {
    pub fn new(year_offset: u16, month: u16, day: u16) -> Self {
        FDate(((year_offset & 0x7F) << 9) | ((month & 0x0F) << 5) | (day & 0x1F))
    }

    /// Years since 1980
    pub fn year(self) -> u16 {
        self.0 >> 9
    }

    pub fn month(self) -> u16 {
        (self.0 >> 5) & 0x0F
    }

    pub fn day(self) -> u16 {
        self.0 & 0x1F
    }
}

impl FTime {
    pub fn new(hours: u16, minutes: u16, twosecs: u16) -> Self {
        FTime(((hours & 0x1F) << 11) | ((minutes & 0x3F) << 5) | (twosecs & 0x1F))
    }

    pub fn hours(self) -> u16 {
        self.0 >> 11
    }

    pub fn minutes(self) -> u16 {
        (self.0 >> 5) & 0x3F
    }

    /// Seconds divided by two
    pub fn twosecs(self) -> u16 {
        self.0 & 0x1F
    }
}

/// Convert a host timestamp to guest local date and time.
///
/// `tz_offset_min` is the guest's offset from UTC in minutes (east
/// positive). Dates outside 1980..=2107 are clamped to the nearest end.
pub fn dos_stamp(time: TimeSpec, tz_offset_min: i16) -> (FDate, FTime) {
    let t = time.add_seconds(tz_offset_min as i64 * 60).explode();
    let offset = t.year - DOS_EPOCH_YEAR;

    if offset < 0 {
        return (FDate::new(0, 1, 1), FTime::new(0, 0, 0));
    }
    if offset > DOS_MAX_YEAR_OFFSET {
        return (
            FDate::new(DOS_MAX_YEAR_OFFSET as u16, 12, 31),
            FTime::new(23, 59, 29),
        );
    }

    (
        FDate::new(offset as u16, t.month as u16, t.day as u16),
        FTime::new(t.hour as u16, t.minute as u16, (t.second / 2) as u16),
    )
}

//! # Attribute Translation
//!
//! OS/2 file attributes live in the high half of the host mode word, one
//! bit to one bit:
//!
//! ```text
//! OS/2 FILE_*      host DOS_* (mode >> 16)
//! READONLY  0x01   0x01
//! HIDDEN    0x02   0x02
//! SYSTEM    0x04   0x04
//! DIRECTORY 0x10   0x10
//! ARCHIVED  0x20   0x20
//! ```
//!
//! Bits outside these five are dropped in both directions.

use bitflags::bitflags;
use vboxfs_shfl::HostMode;

bitflags! {
    /// OS/2 file attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileAttr: u16 {
        const READONLY = 0x01;
        const HIDDEN = 0x02;
        const SYSTEM = 0x04;
        const DIRECTORY = 0x10;
        const ARCHIVED = 0x20;
    }
}

/// Search attribute bit the kernel sets for non-8.3 aware callers
const FILE_NON83: u32 = 0x40;

/// Translate host mode bits to guest attributes
pub fn guest_attr_from_host_mode(mode: HostMode) -> FileAttr {
    let mut attr = FileAttr::empty();
    if mode.contains(HostMode::DOS_READONLY) {
        attr |= FileAttr::READONLY;
    }
    if mode.contains(HostMode::DOS_HIDDEN) {
        attr |= FileAttr::HIDDEN;
    }
    if mode.contains(HostMode::DOS_SYSTEM) {
        attr |= FileAttr::SYSTEM;
    }
    if mode.contains(HostMode::DOS_DIRECTORY) {
        attr |= FileAttr::DIRECTORY;
    }
    if mode.contains(HostMode::DOS_ARCHIVED) {
        attr |= FileAttr::ARCHIVED;
    }
    attr
}

/// Translate guest attributes to host mode bits
pub fn host_mode_from_guest_attr(attr: FileAttr) -> HostMode {
    let mut mode = HostMode::empty();
    if attr.contains(FileAttr::READONLY) {
        mode |= HostMode::DOS_READONLY;
    }
    if attr.contains(FileAttr::HIDDEN) {
        mode |= HostMode::DOS_HIDDEN;
    }
    if attr.contains(FileAttr::SYSTEM) {
        mode |= HostMode::DOS_SYSTEM;
    }
    if attr.contains(FileAttr::DIRECTORY) {
        mode |= HostMode::DOS_DIRECTORY;
    }
    if attr.contains(FileAttr::ARCHIVED) {
        mode |= HostMode::DOS_ARCHIVED;
    }
    mode
}

/// Which entries a search returns.
///
/// The search attribute word carries "may have" bits in the low byte and
/// "must have" bits in the high byte. Read-only and archived entries are
/// always allowed; hidden, system and directory entries only when asked
/// for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrFilter {
    /// Every one of these bits must be set
    pub required: FileAttr,
    /// None of these bits may be set
    pub excluded: FileAttr,
}

impl AttrFilter {
    /// Accept everything
    pub const ALL: AttrFilter = AttrFilter {
        required: FileAttr::empty(),
        excluded: FileAttr::empty(),
    };

    /// Build from the kernel's search attribute word
    pub fn from_search_attr(attr: u32) -> Self {
        let attr = attr & !FILE_NON83;
        let required = FileAttr::from_bits_truncate((attr >> 8) as u16);
        let allowed = FileAttr::from_bits_truncate(attr as u16)
            | FileAttr::READONLY
            | FileAttr::ARCHIVED
            | required;

        Self {
            required,
            excluded: FileAttr::all() - allowed,
        }
    }

    pub fn accepts(&self, attr: FileAttr) -> bool {
        attr.contains(self.required) && !attr.intersects(self.excluded)
    }
}

impl Default for AttrFilter {
    fn default() -> Self {
        Self::from_search_attr(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for bits in 0..=0x3Fu16 {
            let attr = FileAttr::from_bits_truncate(bits);
            assert_eq!(guest_attr_from_host_mode(host_mode_from_guest_attr(attr)), attr);
        }
    }

    #[test]
    fn test_unrecognised_bits_dropped() {
        let mode = HostMode::TYPE_FILE | HostMode::DOS_NT_TEMPORARY | HostMode::DOS_HIDDEN;
        assert_eq!(guest_attr_from_host_mode(mode), FileAttr::HIDDEN);
        assert_eq!(FileAttr::from_bits_truncate(0x48), FileAttr::empty());
    }

    #[test]
    fn test_normal_search_hides_special_entries() {
        let filter = AttrFilter::from_search_attr(0);
        assert!(filter.accepts(FileAttr::empty()));
        assert!(filter.accepts(FileAttr::READONLY | FileAttr::ARCHIVED));
        assert!(!filter.accepts(FileAttr::HIDDEN));
        assert!(!filter.accepts(FileAttr::DIRECTORY));
        assert!(!filter.accepts(FileAttr::SYSTEM | FileAttr::ARCHIVED));
    }

    #[test]
    fn test_may_have_bits() {
        let filter = AttrFilter::from_search_attr(0x16);
        assert!(filter.accepts(FileAttr::DIRECTORY));
        assert!(filter.accepts(FileAttr::HIDDEN | FileAttr::SYSTEM));
        assert!(filter.accepts(FileAttr::ARCHIVED));
    }

    #[test]
    fn test_must_have_bits() {
        // Must be a directory; NON83 bit ignored
        let filter = AttrFilter::from_search_attr(0x1040);
        assert_eq!(filter.required, FileAttr::DIRECTORY);
        assert!(filter.accepts(FileAttr::DIRECTORY));
        assert!(filter.accepts(FileAttr::DIRECTORY | FileAttr::ARCHIVED));
        assert!(!filter.accepts(FileAttr::ARCHIVED));
        assert!(!filter.accepts(FileAttr::DIRECTORY | FileAttr::HIDDEN));
    }
}

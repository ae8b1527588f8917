//! Host file mode word: Unix type bits in the low half, DOS attributes in
//! the high half.

use bitflags::bitflags;

bitflags! {
    /// Host mode bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HostMode: u32 {
        /// Directory object type
        const TYPE_DIRECTORY = 0o040000;
        /// Regular file object type
        const TYPE_FILE = 0o100000;
        /// Symbolic link object type
        const TYPE_SYMLINK = 0o120000;

        /// DOS read-only attribute
        const DOS_READONLY = 0x01 << 16;
        /// DOS hidden attribute
        const DOS_HIDDEN = 0x02 << 16;
        /// DOS system attribute
        const DOS_SYSTEM = 0x04 << 16;
        /// DOS directory attribute
        const DOS_DIRECTORY = 0x10 << 16;
        /// DOS archive attribute
        const DOS_ARCHIVED = 0x20 << 16;
        /// NT temporary attribute (no DOS counterpart)
        const DOS_NT_TEMPORARY = 0x0100 << 16;
        /// NT compressed attribute (no DOS counterpart)
        const DOS_NT_COMPRESSED = 0x0800 << 16;
    }
}

impl HostMode {
    /// Mask covering the object type bits
    pub const TYPE_MASK: u32 = 0o170000;

    /// True if the type bits say directory
    pub fn is_directory(self) -> bool {
        self.bits() & Self::TYPE_MASK == Self::TYPE_DIRECTORY.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_bits() {
        let dir = HostMode::TYPE_DIRECTORY | HostMode::DOS_DIRECTORY;
        assert!(dir.is_directory());
        assert!(!HostMode::TYPE_FILE.is_directory());
        // Symlink overlaps the file type bits
        assert!(!HostMode::TYPE_SYMLINK.is_directory());
        assert!(HostMode::TYPE_SYMLINK.contains(HostMode::TYPE_FILE));
    }
}

//! # IFS Configuration
//!
//! Settings fixed when the driver is loaded.

use crate::codec::CodePage;

/// Default host directory reply buffer
pub const DEFAULT_DIR_BUFFER_SIZE: usize = 16384;

/// Smallest reply buffer that still fits a maximal name record
pub const MIN_DIR_BUFFER_SIZE: usize = 1024;

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfsConfig {
    /// Guest code page for names
    pub codepage: CodePage,
    /// Bytes requested per host directory listing call
    pub dir_buffer_size: usize,
    /// Guest offset from UTC in minutes (east positive)
    pub tz_offset_min: i16,
}

impl Default for IfsConfig {
    fn default() -> Self {
        Self {
            codepage: CodePage::Cp437,
            dir_buffer_size: DEFAULT_DIR_BUFFER_SIZE,
            tz_offset_min: 0,
        }
    }
}

impl IfsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codepage(mut self, codepage: CodePage) -> Self {
        self.codepage = codepage;
        self
    }

    /// Clamped to [`MIN_DIR_BUFFER_SIZE`]
    pub fn with_dir_buffer_size(mut self, size: usize) -> Self {
        self.dir_buffer_size = size.max(MIN_DIR_BUFFER_SIZE);
        self
    }

    pub fn with_tz_offset(mut self, minutes: i16) -> Self {
        self.tz_offset_min = minutes;
        self
    }
}

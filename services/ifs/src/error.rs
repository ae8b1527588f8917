//! OS/2 error codes returned to the kernel.

use core::fmt;

use vboxfs_shfl::{HostError, StringError};

/// Native OS/2 return codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Os2Error {
    /// Unknown info level or request
    InvalidFunction = 1,
    /// File not found
    FileNotFound = 2,
    /// Path not found
    PathNotFound = 3,
    /// Access denied
    AccessDenied = 5,
    /// Out of memory
    NotEnoughMemory = 8,
    /// Drive is not attached
    InvalidDrive = 15,
    /// Search exhausted
    NoMoreFiles = 18,
    /// Unmapped host failure
    GenFailure = 31,
    /// Request not supported
    NotSupported = 50,
    /// Network name not recognised
    BadNetName = 67,
    /// Object already exists
    FileExists = 80,
    /// Invalid parameter
    InvalidParameter = 87,
    /// Output buffer too small
    BufferOverflow = 111,
    /// Malformed name
    InvalidName = 123,
    /// Name longer than the maximum path
    FilenameExcedRange = 206,
    /// GEA list does not parse
    EaListInconsistent = 255,
    /// GEA list over 64 KiB
    EaListTooLong = 256,
    /// Not all requested EAs fit in the buffer
    EasDidntFit = 275,
    /// Invalid buffer address
    InvalidAddress = 487,
    /// Share could not be mapped
    VolumeNotMounted = 0xEE00,
}

impl Os2Error {
    /// Numeric return code
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Conditions that still count as success once a record was returned
    pub fn is_soft(self) -> bool {
        matches!(
            self,
            Os2Error::NoMoreFiles | Os2Error::BufferOverflow | Os2Error::EasDidntFit
        )
    }
}

impl fmt::Display for Os2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Os2Error::InvalidFunction => "invalid function",
            Os2Error::FileNotFound => "file not found",
            Os2Error::PathNotFound => "path not found",
            Os2Error::AccessDenied => "access denied",
            Os2Error::NotEnoughMemory => "not enough memory",
            Os2Error::InvalidDrive => "invalid drive",
            Os2Error::NoMoreFiles => "no more files",
            Os2Error::GenFailure => "general failure",
            Os2Error::NotSupported => "not supported",
            Os2Error::BadNetName => "bad network name",
            Os2Error::FileExists => "file exists",
            Os2Error::InvalidParameter => "invalid parameter",
            Os2Error::BufferOverflow => "buffer overflow",
            Os2Error::InvalidName => "invalid name",
            Os2Error::FilenameExcedRange => "file name exceeds range",
            Os2Error::EaListInconsistent => "EA list inconsistent",
            Os2Error::EaListTooLong => "EA list too long",
            Os2Error::EasDidntFit => "EAs didn't fit",
            Os2Error::InvalidAddress => "invalid address",
            Os2Error::VolumeNotMounted => "volume not mounted",
        };
        write!(f, "{} ({})", msg, self.code())
    }
}

impl From<HostError> for Os2Error {
    fn from(err: HostError) -> Self {
        match err {
            HostError::InvalidPointer => Os2Error::InvalidAddress,
            HostError::InvalidParameter => Os2Error::InvalidParameter,
            HostError::PermissionDenied => Os2Error::AccessDenied,
            HostError::NotImplemented => Os2Error::NotSupported,
            HostError::FileNotFound | HostError::PathNotFound => Os2Error::FileNotFound,
            HostError::AlreadyExists => Os2Error::FileExists,
            HostError::NoMoreFiles => Os2Error::NoMoreFiles,
            HostError::NoMemory
            | HostError::BufferOverflow
            | HostError::ShareNotFound
            | HostError::Other(_) => Os2Error::GenFailure,
        }
    }
}

impl From<StringError> for Os2Error {
    fn from(err: StringError) -> Self {
        match err {
            // Host strings that cannot be built are an allocation failure
            StringError::TooLong => Os2Error::NotEnoughMemory,
            StringError::Malformed => Os2Error::InvalidParameter,
        }
    }
}

//! Host status codes.

use core::fmt;

/// Error returned by a host request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// A parameter was rejected
    InvalidParameter,
    /// A buffer or handle pointer was rejected
    InvalidPointer,
    /// Host ran out of memory
    NoMemory,
    /// Access to the object was refused
    PermissionDenied,
    /// Request not implemented by the host
    NotImplemented,
    /// Supplied buffer too small for even one record
    BufferOverflow,
    /// File does not exist
    FileNotFound,
    /// A path component does not exist
    PathNotFound,
    /// Enumeration has no further entries
    NoMoreFiles,
    /// Share name unknown to the host
    ShareNotFound,
    /// Object already exists
    AlreadyExists,
    /// Any other status code
    Other(i32),
}

impl HostError {
    /// Map a raw (negative) host status code
    pub fn from_code(code: i32) -> Self {
        match code {
            -2 => HostError::InvalidParameter,
            -6 => HostError::InvalidPointer,
            -8 => HostError::NoMemory,
            -10 => HostError::PermissionDenied,
            -12 => HostError::NotImplemented,
            -41 => HostError::BufferOverflow,
            -102 => HostError::FileNotFound,
            -103 => HostError::PathNotFound,
            -105 => HostError::AlreadyExists,
            -201 => HostError::NoMoreFiles,
            -1000 => HostError::ShareNotFound,
            other => HostError::Other(other),
        }
    }

    /// Raw host status code
    pub fn code(self) -> i32 {
        match self {
            HostError::InvalidParameter => -2,
            HostError::InvalidPointer => -6,
            HostError::NoMemory => -8,
            HostError::PermissionDenied => -10,
            HostError::NotImplemented => -12,
            HostError::BufferOverflow => -41,
            HostError::FileNotFound => -102,
            HostError::PathNotFound => -103,
            HostError::AlreadyExists => -105,
            HostError::NoMoreFiles => -201,
            HostError::ShareNotFound => -1000,
            HostError::Other(code) => code,
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host status {}", self.code())
    }
}

/// Outcome of a host `create` request, reported alongside the handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum CreateResult {
    /// Nothing reported
    #[default]
    None = 0,
    /// A directory on the path does not exist
    PathNotFound = 1,
    /// Last component does not exist
    FileNotFound = 2,
    /// Object exists and was opened
    FileExists = 3,
    /// Object was created
    FileCreated = 4,
    /// Object was replaced
    FileReplaced = 5,
}

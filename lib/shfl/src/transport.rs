//! Host request surface.
//!
//! The guest driver never talks to the hypervisor directly; it goes
//! through a [`HostTransport`]. Production builds wire this to the guest
//! device interface, tests use an in-memory host.

use bitflags::bitflags;

use crate::dirinfo::ObjInfo;
use crate::status::{CreateResult, HostError};
use crate::string::ShflString;

/// Mapped shared folder on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Root(pub u32);

/// Open object handle on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShflHandle(pub u64);

impl ShflHandle {
    /// No handle was opened
    pub const NIL: ShflHandle = ShflHandle(u64::MAX);

    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }
}

bitflags! {
    /// Flags for [`HostTransport::create`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CreateFlags: u32 {
        /// Only look the object up, do not open it
        const LOOKUP = 0x0000_0001;
        /// Open the parent directory of the path
        const OPEN_TARGET_DIRECTORY = 0x0000_0002;
        /// Object must be a directory
        const DIRECTORY = 0x0000_0004;
        /// Fail if the object exists
        const FAIL_IF_EXISTS = 0x0000_0010;
        /// Replace an existing object
        const REPLACE_IF_EXISTS = 0x0000_0020;
        /// Fail if the object does not exist
        const FAIL_IF_NEW = 0x0000_0100;
        /// Read access
        const ACCESS_READ = 0x0000_1000;
        /// Write access
        const ACCESS_WRITE = 0x0000_2000;
    }
}

bitflags! {
    /// Flags for [`HostTransport::dir_info`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirListFlags: u32 {
        /// Return at most one record
        const RETURN_ONE = 0x0000_0004;
    }
}

/// In/out parameters of [`HostTransport::create`]
#[derive(Debug, Clone, Copy)]
pub struct CreateParams {
    /// Opened handle, [`ShflHandle::NIL`] if nothing was opened
    pub handle: ShflHandle,
    /// What the host found or did
    pub result: CreateResult,
    pub flags: CreateFlags,
    /// Metadata of the object, valid when it exists
    pub info: ObjInfo,
}

impl CreateParams {
    pub fn new(flags: CreateFlags) -> Self {
        Self {
            handle: ShflHandle::NIL,
            result: CreateResult::None,
            flags,
            info: ObjInfo::default(),
        }
    }
}

/// Outcome of a successful [`HostTransport::dir_info`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirInfoReply {
    /// Bytes written to the caller's buffer
    pub bytes: usize,
    /// Records in those bytes
    pub count: u32,
}

/// Requests the guest driver issues to the host
pub trait HostTransport: Send {
    /// Map a shared folder by name
    fn map_folder(&mut self, share: &ShflString) -> Result<Root, HostError>;

    /// Release a mapping obtained from [`map_folder`](Self::map_folder)
    fn unmap_folder(&mut self, root: Root) -> Result<(), HostError>;

    /// Open (or look up) `path` below `root`.
    ///
    /// Lookup failures are reported through `params.result` with a NIL
    /// handle rather than as an error.
    fn create(
        &mut self,
        root: Root,
        path: &ShflString,
        params: &mut CreateParams,
    ) -> Result<(), HostError>;

    /// Close a handle returned by [`create`](Self::create)
    fn close(&mut self, root: Root, handle: ShflHandle) -> Result<(), HostError>;

    /// Fill `buf` with directory records matching `filter`, continuing
    /// the enumeration the host keeps per handle. `index` is the
    /// resume hint the guest keeps; hosts may ignore it.
    ///
    /// Returns [`HostError::NoMoreFiles`] when the enumeration is drained.
    fn dir_info(
        &mut self,
        root: Root,
        handle: ShflHandle,
        filter: Option<&ShflString>,
        flags: DirListFlags,
        index: u32,
        buf: &mut [u8],
    ) -> Result<DirInfoReply, HostError>;
}

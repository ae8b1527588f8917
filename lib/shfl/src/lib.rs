//! # Shared Folder Host Protocol
//!
//! Types shared between the guest file system driver and the host
//! shared-folder service:
//!
//! - [`ShflString`]: length-prefixed strings used for every path and name
//! - [`DirInfo`] / [`DirInfoIter`]: directory records as returned by the host
//! - [`HostMode`]: the host's file mode word (type + DOS attribute bits)
//! - [`HostError`]: host status codes
//! - [`HostTransport`]: the request surface the guest driver talks to
//!
//! ## Directory Listing Flow
//!
//! ```text
//! Guest IFS                            Host Service
//!    │                                      │
//!    │──── create(root, dir, DIRECTORY) ───>│
//!    │<─── CreateParams { handle } ─────────│
//!    │                                      │
//!    │──── dir_info(handle, "*.TXT") ──────>│
//!    │<─── [DirInfo][DirInfo]... (batch) ───│
//!    │                                      │
//!    │──── close(handle) ──────────────────>│
//! ```

#![no_std]

extern crate alloc;

pub mod dirinfo;
pub mod mode;
pub mod status;
pub mod string;
pub mod time;
pub mod transport;

pub use dirinfo::{encode_dir_info, DecodeError, DirInfo, DirInfoIter, ObjInfo};
pub use mode::HostMode;
pub use status::{CreateResult, HostError};
pub use string::{ShflString, StringError, SHFL_STRING_MAX};
pub use time::{ExplodedTime, TimeSpec};
pub use transport::{
    CreateFlags, CreateParams, DirInfoReply, DirListFlags, HostTransport, Root, ShflHandle,
};

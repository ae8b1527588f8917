//! # VBoxFS: Shared Folders IFS
//!
//! Guest side of the shared folders service for OS/2. This crate turns the
//! guest's directory search calls (FindFirst / FindNext / FindClose) into
//! host directory listing requests and packs the host's records into the
//! layouts the OS/2 kernel expects.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    OS/2 kernel (FS_FIND* calls)                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  VBoxFs (search lifecycle)                                      │
//! │    path resolution ──> drive table / temporary UNC mapping      │
//! │    SearchCursor::fill (find buffer state machine)               │
//! │      ├── AttrFilter      (attribute translator)                 │
//! │      ├── Codec           (UTF-8 <-> guest code page)            │
//! │      └── pack_record     (six info level layouts)               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                    HostTransport (vboxfs_shfl)                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let fs = VBoxFs::new(host, IfsConfig::default());
//! fs.attach(b'C', b"share")?;
//! let mut buf = [0u8; 4096];
//! let (mut cursor, n) = fs.find_first(b"C:\\DOCS\\*.TXT", 0, &mut buf, &FindRequest::new(InfoLevel::Standard))?;
//! let n = fs.find_next(&mut cursor, &mut buf, &FindRequest::new(InfoLevel::Standard))?;
//! fs.find_close(cursor)?;
//! ```

#![no_std]

extern crate alloc;

pub mod attr;
pub mod codec;
pub mod config;
pub mod datetime;
pub mod ea;
pub mod error;
pub mod find_buf;
pub mod ifs;
pub mod path;
pub mod record;
pub mod search;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use attr::{AttrFilter, FileAttr};
pub use codec::{CodePage, Codec, CodecContext, CodecError};
pub use config::IfsConfig;
pub use error::Os2Error;
pub use find_buf::{FindFlags, FindRequest, SearchCursor};
pub use ifs::VBoxFs;
pub use record::InfoLevel;

//! # Search Lifecycle
//!
//! FindFirst / FindNext / FindFromName / FindClose on top of
//! [`SearchCursor`].
//!
//! ```text
//! find_first ──> resolve path ──> open dir on host ──> fill ──┬─> (cursor, n)
//!                                                             └─> error: close
//! find_next  ──> fill
//! find_close ──> close handle, drop temporary mapping
//! ```

use core::sync::atomic::Ordering;

use vboxfs_shfl::string::BytesDisplay;
use vboxfs_shfl::{CreateFlags, CreateParams, CreateResult, HostTransport, Root, ShflHandle};

use crate::attr::AttrFilter;
use crate::error::Os2Error;
use crate::find_buf::{FindRequest, SearchCursor};
use crate::ifs::VBoxFs;
use crate::path::{parse_search_path, PathRoot};

/// Host folder a search runs in
struct SearchRoot {
    root: Root,
    /// Mapped for this search only
    temporary: bool,
}

impl<H: HostTransport> VBoxFs<H> {
    /// Start a search and return its first records.
    ///
    /// On any error the search is already closed.
    pub fn find_first(
        &self,
        path: &[u8],
        attr: u32,
        out: &mut [u8],
        req: &FindRequest<'_>,
    ) -> Result<(SearchCursor, u16), Os2Error> {
        log::debug!(
            "find_first({:?}, {:#x}, {:?}, {:?})",
            BytesDisplay(path),
            attr,
            req.level,
            req.flags
        );
        let result = self.begin_search(path, attr, out, req);
        match &result {
            Ok((_, n)) => log::debug!("find_first => 0, {} matches", n),
            Err(e) => log::debug!("find_first => {}", e),
        }
        result
    }

    /// Continue a search.
    pub fn find_next(
        &self,
        cursor: &mut SearchCursor,
        out: &mut [u8],
        req: &FindRequest<'_>,
    ) -> Result<u16, Os2Error> {
        log::debug!("find_next({:?}, {:?})", req.level, req.flags);
        let result = {
            let mut host = self.host.lock();
            cursor.fill(&mut *host, self.codec.as_ref(), &self.config, out, req)
        };
        match &result {
            Ok(n) => log::debug!("find_next => 0, {} matches", n),
            Err(e) => log::debug!("find_next => {}", e),
        }
        result
    }

    /// Continue a search after `name`.
    ///
    /// Resuming at an arbitrary entry is not supported: the position and
    /// name are logged and the search continues where it stands.
    pub fn find_from_name(
        &self,
        cursor: &mut SearchCursor,
        out: &mut [u8],
        req: &FindRequest<'_>,
        position: u32,
        name: &[u8],
    ) -> Result<u16, Os2Error> {
        log::debug!("find_from_name({}, {:?}): continuing as find_next", position, BytesDisplay(name));
        self.find_next(cursor, out, req)
    }

    /// End a search.
    pub fn find_close(&self, mut cursor: SearchCursor) -> Result<(), Os2Error> {
        log::debug!("find_close(root {})", cursor.root().0);
        let result = cursor.close(&mut *self.host.lock());
        if self
            .open_searches
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_err()
        {
            log::warn!("find_close: root {}: no open search was counted", cursor.root().0);
        }
        result
    }

    /// Change notification is not provided by shared folders.
    pub fn find_notify_first(&self, path: &[u8], attr: u32) -> Result<u16, Os2Error> {
        log::debug!("find_notify_first({:?}, {:#x}) => not supported", BytesDisplay(path), attr);
        Err(Os2Error::NotSupported)
    }

    pub fn find_notify_next(&self, handle: u16) -> Result<u16, Os2Error> {
        log::debug!("find_notify_next({}) => not supported", handle);
        Err(Os2Error::NotSupported)
    }

    pub fn find_notify_close(&self, handle: u16) -> Result<(), Os2Error> {
        log::debug!("find_notify_close({}) => not supported", handle);
        Err(Os2Error::NotSupported)
    }

    fn begin_search(
        &self,
        path: &[u8],
        attr: u32,
        out: &mut [u8],
        req: &FindRequest<'_>,
    ) -> Result<(SearchCursor, u16), Os2Error> {
        if out.len() < req.min_buffer_len() {
            return Err(Os2Error::BufferOverflow);
        }

        let parsed = parse_search_path(path)?;
        let (dir, pattern) = parsed.split();
        log::trace!("find_first: dir {:?}, pattern {:?}", BytesDisplay(dir), BytesDisplay(pattern));

        let dir_name = self.host_string(dir)?;
        let filter = self.host_string(parsed.rest)?;
        let root = self.search_root(parsed.root)?;

        let handle = match self.open_dir(root.root, &dir_name) {
            Ok(handle) => handle,
            Err(e) => {
                self.release_root(&root);
                return Err(e);
            }
        };

        let mut cursor = SearchCursor::new(
            root.root,
            root.temporary,
            handle,
            filter,
            AttrFilter::from_search_attr(attr),
        );
        self.open_searches.fetch_add(1, Ordering::Relaxed);

        let filled = {
            let mut host = self.host.lock();
            cursor.fill(&mut *host, self.codec.as_ref(), &self.config, out, req)
        };
        match filled {
            Ok(n) => Ok((cursor, n)),
            Err(e) => {
                if let Err(close_err) = self.find_close(cursor) {
                    log::warn!("find_first: close after {} failed: {}", e, close_err);
                }
                Err(e)
            }
        }
    }

    /// Host folder for a parsed path root
    fn search_root(&self, root: PathRoot<'_>) -> Result<SearchRoot, Os2Error> {
        match root {
            PathRoot::Drive(drive) => {
                let root = self.drive_root(drive).ok_or(Os2Error::InvalidDrive)?;
                Ok(SearchRoot {
                    root,
                    temporary: false,
                })
            }
            PathRoot::Unc { share } => {
                if let Some(root) = self.share_root(share) {
                    return Ok(SearchRoot {
                        root,
                        temporary: false,
                    });
                }
                let name = self.host_string(share)?;
                let root = self.host.lock().map_folder(&name).map_err(|e| {
                    log::warn!("find_first: map {} failed: {}", name, e);
                    Os2Error::BadNetName
                })?;
                Ok(SearchRoot {
                    root,
                    temporary: true,
                })
            }
        }
    }

    fn release_root(&self, root: &SearchRoot) {
        if root.temporary {
            if let Err(e) = self.host.lock().unmap_folder(root.root) {
                log::warn!("find_first: unmap root {} failed: {}", root.root.0, e);
            }
        }
    }

    /// Open `dir` for listing
    fn open_dir(&self, root: Root, dir: &vboxfs_shfl::ShflString) -> Result<ShflHandle, Os2Error> {
        let mut params = CreateParams::new(
            CreateFlags::DIRECTORY | CreateFlags::FAIL_IF_NEW | CreateFlags::ACCESS_READ,
        );
        self.host.lock().create(root, dir, &mut params)?;

        match params.result {
            CreateResult::PathNotFound => Err(Os2Error::PathNotFound),
            CreateResult::FileExists if params.handle.is_nil() => {
                log::warn!("find_first: {} is not a directory", dir);
                Err(Os2Error::PathNotFound)
            }
            CreateResult::FileExists => Ok(params.handle),
            _ => Err(Os2Error::FileNotFound),
        }
    }
}

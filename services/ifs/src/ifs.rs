//! # Shared Folders Driver
//!
//! [`VBoxFs`] owns the host transport, the guest code page codec and the
//! table of attached drives. Searches are implemented in
//! [`crate::search`].
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ VBoxFs                                        │
//! │   drives:  C: → Root(1) "share"               │
//! │            D: → Root(2) "tools"               │
//! │   codec:   CP437                              │
//! │   host:    Mutex<HostTransport>               │
//! └───────────────────────────────────────────────┘
//! ```

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;
use vboxfs_shfl::string::BytesDisplay;
use vboxfs_shfl::{HostTransport, Root, ShflString};

use crate::codec::{Codec, CodecContext};
use crate::config::IfsConfig;
use crate::error::Os2Error;

/// Prefix reported for attached drives
const ATTACH_PREFIX: &[u8] = b"\\\\vboxfs\\";

/// An attached drive
#[derive(Debug, Clone)]
struct Volume {
    /// Host mapping
    root: Root,
    /// Share name as given by the guest
    share: Vec<u8>,
}

/// Shared folders file system instance
pub struct VBoxFs<H: HostTransport> {
    /// Host connection
    pub(crate) host: Mutex<H>,
    /// Guest code page conversion
    pub(crate) codec: Box<dyn Codec>,
    pub(crate) config: IfsConfig,
    /// Drive letter → volume
    drives: Mutex<BTreeMap<u8, Volume>>,
    /// Searches started and not yet closed
    pub(crate) open_searches: AtomicUsize,
}

impl<H: HostTransport> VBoxFs<H> {
    /// Create a driver using the configured code page
    pub fn new(host: H, config: IfsConfig) -> Self {
        Self::with_codec(host, config, CodecContext::boxed(config.codepage))
    }

    /// Create a driver with an explicit codec
    pub fn with_codec(host: H, config: IfsConfig, codec: Box<dyn Codec>) -> Self {
        log::info!(
            "vboxfs: code page {}, dir buffer {} bytes, tz offset {} min",
            config.codepage.id(),
            config.dir_buffer_size,
            config.tz_offset_min
        );
        Self {
            host: Mutex::new(host),
            codec,
            config,
            drives: Mutex::new(BTreeMap::new()),
            open_searches: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &IfsConfig {
        &self.config
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// Run `f` with exclusive access to the host transport
    pub fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        let mut host = self.host.lock();
        f(&mut *host)
    }

    /// Number of searches not yet closed
    pub fn open_searches(&self) -> usize {
        self.open_searches.load(Ordering::Relaxed)
    }

    /// Convert a guest name to a host string
    pub(crate) fn host_string(&self, native: &[u8]) -> Result<ShflString, Os2Error> {
        let mut utf8 = Vec::with_capacity(native.len());
        if let Err(e) = self.codec.native_to_utf8(native, &mut utf8) {
            log::warn!("name {:?}: {}", BytesDisplay(native), e);
        }
        Ok(ShflString::new(&utf8)?)
    }

    /// Map `share` and attach it as `drive`.
    pub fn attach(&self, drive: u8, share: &[u8]) -> Result<(), Os2Error> {
        log::debug!("attach({}:, {:?})", drive as char, BytesDisplay(share));
        let drive = drive.to_ascii_uppercase();
        if !drive.is_ascii_uppercase() {
            return Err(Os2Error::InvalidDrive);
        }
        if share.is_empty() {
            return Err(Os2Error::BufferOverflow);
        }

        let mut drives = self.drives.lock();
        if drives.contains_key(&drive) {
            return Err(Os2Error::InvalidParameter);
        }

        let name = self.host_string(share)?;
        let root = self.host.lock().map_folder(&name).map_err(|e| {
            log::error!("attach: map {} failed: {}", name, e);
            Os2Error::VolumeNotMounted
        })?;

        drives.insert(
            drive,
            Volume {
                root,
                share: share.to_vec(),
            },
        );
        log::info!("vboxfs: {}: attached to {} (root {})", drive as char, name, root.0);
        Ok(())
    }

    /// Release the mapping of `drive`.
    pub fn detach(&self, drive: u8) -> Result<(), Os2Error> {
        log::debug!("detach({}:)", drive as char);
        let volume = self
            .drives
            .lock()
            .remove(&drive.to_ascii_uppercase())
            .ok_or(Os2Error::InvalidDrive)?;

        self.host.lock().unmap_folder(volume.root).map_err(|e| {
            log::warn!("detach: unmap root {} failed: {}", volume.root.0, e);
            Os2Error::from(e)
        })
    }

    /// Name the kernel reports for an attached drive: `\\vboxfs\<share>`
    pub fn attach_info(&self, drive: u8) -> Result<Vec<u8>, Os2Error> {
        let drives = self.drives.lock();
        let volume = drives
            .get(&drive.to_ascii_uppercase())
            .ok_or(Os2Error::InvalidDrive)?;

        let mut name = ATTACH_PREFIX.to_vec();
        name.extend_from_slice(&volume.share);
        Ok(name)
    }

    /// Attached drive letters
    pub fn drives(&self) -> Vec<u8> {
        self.drives.lock().keys().copied().collect()
    }

    /// Host root of an attached drive
    pub(crate) fn drive_root(&self, drive: u8) -> Option<Root> {
        self.drives.lock().get(&drive).map(|v| v.root)
    }

    /// Host root of an attached drive whose share is `share`
    pub(crate) fn share_root(&self, share: &[u8]) -> Option<Root> {
        self.drives
            .lock()
            .values()
            .find(|v| v.share.eq_ignore_ascii_case(share))
            .map(|v| v.root)
    }

    /// Detach every drive
    pub fn shutdown(&self) {
        let drives = core::mem::take(&mut *self.drives.lock());
        let mut host = self.host.lock();
        for (drive, volume) in drives {
            if let Err(e) = host.unmap_folder(volume.root) {
                log::warn!("shutdown: {}: unmap failed: {}", drive as char, e);
            }
        }
        let open = self.open_searches();
        if open > 0 {
            log::warn!("shutdown: {} searches still open", open);
        }
    }
}

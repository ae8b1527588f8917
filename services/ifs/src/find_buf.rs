//! # Find Buffer State Machine
//!
//! A [`SearchCursor`] holds everything one guest search needs between
//! calls: the host directory handle, the pattern, and the unconsumed part
//! of the last host reply. Each [`SearchCursor::fill`] harvests entries
//! into the caller's buffer:
//!
//! ```text
//!            ┌──────────────┐  no batch   ┌──────────────┐
//!   fill ──> │ next record  │ ──────────> │ host dir_info│ ── NoMoreFiles ──> drained
//!            └──────────────┘ <────────── └──────────────┘
//!                  │            new batch
//!                  ▼
//!            attribute filter ── rejected ──> consume, loop
//!                  │
//!                  ▼
//!            transcode + pack ── no room ──> stop (entry kept)
//!                  │
//!                  ▼
//!            consume + stage ──> loop until max matches
//! ```
//!
//! Staged records are written in one forward pass, so the optional
//! "offset to next entry" prefix is known before each record is emitted.

use alloc::vec;
use alloc::vec::Vec;

use bitflags::bitflags;
use vboxfs_shfl::string::BytesDisplay;
use vboxfs_shfl::{DirInfoIter, DirListFlags, HostError, HostTransport, Root, ShflHandle, ShflString};

use crate::attr::{guest_attr_from_host_mode, AttrFilter};
use crate::codec::{Codec, CCHMAXPATHCOMP};
use crate::config::IfsConfig;
use crate::ea::GeaList;
use crate::error::Os2Error;
use crate::record::{pack_record, InfoLevel, RecordSource};

/// Size of the per-record position prefix
const POS_PREFIX: usize = 4;

bitflags! {
    /// Find call flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FindFlags: u32 {
        /// Precede each record with the offset of the next one
        const GETPOS = 0x0001;
    }
}

/// Parameters of one find call
#[derive(Debug, Clone, Copy)]
pub struct FindRequest<'a> {
    pub level: InfoLevel,
    pub flags: FindFlags,
    /// Most records to return
    pub max_matches: u16,
    /// Requested EA names for the EA-list levels
    pub gea_list: Option<&'a [u8]>,
}

impl<'a> FindRequest<'a> {
    pub fn new(level: InfoLevel) -> Self {
        Self {
            level,
            flags: FindFlags::empty(),
            max_matches: u16::MAX,
            gea_list: None,
        }
    }

    pub fn with_flags(mut self, flags: FindFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_max_matches(mut self, max_matches: u16) -> Self {
        self.max_matches = max_matches;
        self
    }

    pub fn with_gea_list(mut self, gea_list: &'a [u8]) -> Self {
        self.gea_list = Some(gea_list);
        self
    }

    /// Smallest output buffer this request accepts
    pub fn min_buffer_len(&self) -> usize {
        let pos = if self.flags.contains(FindFlags::GETPOS) {
            POS_PREFIX
        } else {
            0
        };
        self.level.shape().min_buffer_len() + pos
    }
}

/// One host reply being consumed
struct Batch {
    data: Vec<u8>,
    /// Offset of the next record
    pos: usize,
    /// Records the host reported
    count: u32,
    /// Records consumed so far
    consumed: u32,
}

/// State of one guest search
pub struct SearchCursor {
    /// Host folder the search runs in
    root: Root,
    /// `root` was mapped for this search only
    temp_mapping: bool,
    /// Open directory handle, `None` once closed
    handle: Option<ShflHandle>,
    /// Host-side pattern (UTF-8)
    filter: ShflString,
    /// Unconsumed part of the last reply
    batch: Option<Batch>,
    /// Entries consumed since the last reset
    index: u32,
    /// Entry count of the last reply
    last_total: u32,
    /// False once the host reported the end; never set again
    has_more_files: bool,
    attrs: AttrFilter,
}

impl SearchCursor {
    pub fn new(
        root: Root,
        temp_mapping: bool,
        handle: ShflHandle,
        filter: ShflString,
        attrs: AttrFilter,
    ) -> Self {
        Self {
            root,
            temp_mapping,
            handle: Some(handle),
            filter,
            batch: None,
            index: 0,
            last_total: 0,
            has_more_files: true,
            attrs,
        }
    }

    pub fn root(&self) -> Root {
        self.root
    }

    pub fn is_temp_mapping(&self) -> bool {
        self.temp_mapping
    }

    pub fn handle(&self) -> Option<ShflHandle> {
        self.handle
    }

    pub fn filter(&self) -> &ShflString {
        &self.filter
    }

    pub fn attr_filter(&self) -> AttrFilter {
        self.attrs
    }

    pub fn has_more_files(&self) -> bool {
        self.has_more_files
    }

    /// Records left in the buffered reply
    pub fn buffered(&self) -> u32 {
        self.batch.as_ref().map_or(0, |b| b.count - b.consumed)
    }

    /// Fill `out` with as many matching records as fit.
    ///
    /// Returns the number of records written. Running out of entries,
    /// room, or EA space after at least one record is still success.
    pub fn fill<H: HostTransport + ?Sized>(
        &mut self,
        host: &mut H,
        codec: &dyn Codec,
        config: &IfsConfig,
        out: &mut [u8],
        req: &FindRequest<'_>,
    ) -> Result<u16, Os2Error> {
        let shape = req.level.shape();
        if out.len() < req.min_buffer_len() {
            return Err(Os2Error::BufferOverflow);
        }
        let gea = match (shape.ea_list, req.gea_list) {
            (true, Some(raw)) => Some(GeaList::parse(raw)?),
            _ => None,
        };

        // EAOP block stays, everything after it is cleared
        let prefix = shape.prefix_len();
        out[prefix..].fill(0);

        if !self.has_more_files {
            return Err(Os2Error::NoMoreFiles);
        }

        let pos_len = if req.flags.contains(FindFlags::GETPOS) {
            POS_PREFIX
        } else {
            0
        };
        let budget = out.len() - prefix;
        let mut used = 0;
        let mut staged: Vec<Vec<u8>> = Vec::new();
        let mut stop = None;
        let mut name = Vec::with_capacity(CCHMAXPATHCOMP);

        while staged.len() < req.max_matches as usize {
            if self.batch.is_none() {
                if let Err(e) = self.fetch(host, config) {
                    stop = Some(e);
                    break;
                }
            }

            let Some(batch) = self.batch.as_mut() else {
                break;
            };
            let mut records = DirInfoIter::resume(&batch.data, batch.pos, batch.count - batch.consumed);
            let entry = match records.next() {
                Some(Ok(entry)) => entry,
                // Count reached or the reply ran out of bytes
                None => {
                    self.batch = None;
                    continue;
                }
                Some(Err(_)) => {
                    let fresh = batch.consumed == 0;
                    self.batch = None;
                    if fresh {
                        // Nothing usable in this reply at all
                        stop = Some(Os2Error::GenFailure);
                        break;
                    }
                    continue;
                }
            };

            let info = entry.info;
            let record_len = entry.record_len;
            let attr = guest_attr_from_host_mode(info.host_mode());
            if !self.attrs.accepts(attr) {
                self.advance(record_len);
                continue;
            }

            if let Err(e) = codec.utf8_to_native(entry.name, &mut name, CCHMAXPATHCOMP) {
                log::warn!("fill: name {:?}: {}", BytesDisplay(entry.name), e);
            }

            let room = budget.saturating_sub(used + pos_len);
            let src = RecordSource {
                info: &info,
                attr,
                name: &name,
            };
            let packed = match pack_record(shape, &src, gea.as_ref(), config.tz_offset_min, room) {
                Ok(packed) => packed,
                Err(e) => {
                    stop = Some(e);
                    break;
                }
            };
            if pos_len + packed.bytes.len() > room {
                stop = Some(Os2Error::BufferOverflow);
                break;
            }
            if packed.eas_didnt_fit {
                stop = Some(Os2Error::EasDidntFit);
            }

            self.advance(record_len);
            used += pos_len + packed.bytes.len();
            staged.push(packed.bytes);
        }

        Self::emit(&mut out[prefix..], &staged, pos_len > 0);

        // Any record written turns the stop reason into success
        let count = staged.len() as u16;
        match stop {
            Some(e) if count == 0 => Err(e),
            Some(e) if !e.is_soft() => {
                log::warn!("fill: keeping {} records, stopped by {}", count, e);
                Ok(count)
            }
            _ => Ok(count),
        }
    }

    /// Release the host handle and a temporary mapping. Idempotent.
    pub fn close<H: HostTransport + ?Sized>(&mut self, host: &mut H) -> Result<(), Os2Error> {
        self.batch = None;
        let mut result = Ok(());

        if let Some(handle) = self.handle.take() {
            if let Err(e) = host.close(self.root, handle) {
                log::warn!("close: handle {:#x}: {}", handle.0, e);
                result = Err(e.into());
            }
        }
        if self.temp_mapping {
            self.temp_mapping = false;
            if let Err(e) = host.unmap_folder(self.root) {
                log::warn!("close: unmap root {}: {}", self.root.0, e);
                result = result.and(Err(e.into()));
            }
        }
        result
    }

    /// Request the next reply from the host.
    fn fetch<H: HostTransport + ?Sized>(
        &mut self,
        host: &mut H,
        config: &IfsConfig,
    ) -> Result<(), Os2Error> {
        let handle = self.handle.ok_or(Os2Error::InvalidParameter)?;
        if self.index >= self.last_total {
            self.index = 0;
            self.last_total = 0;
        }

        let mut data = vec![0u8; config.dir_buffer_size];
        let reply = host.dir_info(
            self.root,
            handle,
            Some(&self.filter),
            DirListFlags::empty(),
            self.index,
            &mut data,
        );

        match reply {
            Ok(reply) if reply.count > 0 => {
                log::trace!("fetch: {} records, {} bytes", reply.count, reply.bytes);
                data.truncate(reply.bytes.min(config.dir_buffer_size));
                self.last_total = reply.count;
                self.batch = Some(Batch {
                    data,
                    pos: 0,
                    count: reply.count,
                    consumed: 0,
                });
                Ok(())
            }
            Ok(_) | Err(HostError::NoMoreFiles) => {
                self.has_more_files = false;
                Err(Os2Error::NoMoreFiles)
            }
            Err(e) => {
                log::warn!("fetch: dir_info failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Consume the current record
    fn advance(&mut self, record_len: usize) {
        self.index += 1;
        let drained = match self.batch.as_mut() {
            Some(batch) => {
                batch.pos += record_len;
                batch.consumed += 1;
                batch.consumed >= batch.count
            }
            None => false,
        };
        if drained {
            self.batch = None;
        }
    }

    /// Write staged records, with next-entry offsets when asked
    fn emit(out: &mut [u8], staged: &[Vec<u8>], getpos: bool) {
        let mut at = 0;
        for (i, rec) in staged.iter().enumerate() {
            if getpos {
                let next = if i + 1 == staged.len() {
                    0
                } else {
                    (rec.len() + POS_PREFIX) as u32
                };
                out[at..at + POS_PREFIX].copy_from_slice(&next.to_le_bytes());
                at += POS_PREFIX;
            }
            out[at..at + rec.len()].copy_from_slice(rec);
            at += rec.len();
        }
    }
}

impl Drop for SearchCursor {
    fn drop(&mut self) {
        if let Some(handle) = self.handle {
            log::warn!("search cursor dropped with open handle {:#x}", handle.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::VecDeque;
    use vboxfs_shfl::{encode_dir_info, CreateParams, HostMode, ObjInfo, TimeSpec};

    use crate::attr::FileAttr;
    use crate::codec::{CodePage, CodecContext};
    use crate::ea::FEA_DIDNT_FIT;

    type Reply = Result<Vec<u8>, HostError>;

    /// Hands out canned replies, one per dir_info call
    struct ScriptedHost {
        replies: VecDeque<(Reply, u32)>,
        calls: usize,
        closed: usize,
        unmapped: usize,
    }

    impl ScriptedHost {
        fn new() -> Self {
            Self {
                replies: VecDeque::new(),
                calls: 0,
                closed: 0,
                unmapped: 0,
            }
        }

        fn batch(mut self, entries: &[(&str, HostMode)]) -> Self {
            let mut data = Vec::new();
            for (name, mode) in entries {
                encode_dir_info(&mut data, &file(*mode), &ShflString::new(name.as_bytes()).unwrap());
            }
            self.replies.push_back((Ok(data), entries.len() as u32));
            self
        }

        fn raw(mut self, data: Vec<u8>, count: u32) -> Self {
            self.replies.push_back((Ok(data), count));
            self
        }

        fn fail(mut self, err: HostError) -> Self {
            self.replies.push_back((Err(err), 0));
            self
        }
    }

    impl HostTransport for ScriptedHost {
        fn map_folder(&mut self, _share: &ShflString) -> Result<Root, HostError> {
            Ok(Root(1))
        }

        fn unmap_folder(&mut self, _root: Root) -> Result<(), HostError> {
            self.unmapped += 1;
            Ok(())
        }

        fn create(
            &mut self,
            _root: Root,
            _path: &ShflString,
            _params: &mut CreateParams,
        ) -> Result<(), HostError> {
            Err(HostError::NotImplemented)
        }

        fn close(&mut self, _root: Root, _handle: ShflHandle) -> Result<(), HostError> {
            self.closed += 1;
            Ok(())
        }

        fn dir_info(
            &mut self,
            _root: Root,
            _handle: ShflHandle,
            _filter: Option<&ShflString>,
            _flags: DirListFlags,
            _index: u32,
            buf: &mut [u8],
        ) -> Result<vboxfs_shfl::DirInfoReply, HostError> {
            self.calls += 1;
            match self.replies.pop_front() {
                Some((Ok(data), count)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(vboxfs_shfl::DirInfoReply {
                        bytes: data.len(),
                        count,
                    })
                }
                Some((Err(e), _)) => Err(e),
                None => Err(HostError::NoMoreFiles),
            }
        }
    }

    fn file(mode: HostMode) -> ObjInfo {
        ObjInfo {
            object_size: 100,
            allocated: 512,
            modification_time: TimeSpec::from_civil(2020, 1, 15, 8, 0, 0),
            mode: mode.bits(),
            ..ObjInfo::default()
        }
    }

    const FILE: HostMode = HostMode::TYPE_FILE;

    fn dir() -> HostMode {
        HostMode::TYPE_DIRECTORY | HostMode::DOS_DIRECTORY
    }

    fn cursor(attr: u32) -> SearchCursor {
        SearchCursor::new(
            Root(1),
            false,
            ShflHandle(7),
            ShflString::new(b"*").unwrap(),
            AttrFilter::from_search_attr(attr),
        )
    }

    /// Names of Standard-level records in `out`
    fn names(out: &[u8], count: u16, getpos: bool) -> Vec<Vec<u8>> {
        let mut at = 0;
        let mut result = Vec::new();
        for _ in 0..count {
            if getpos {
                at += 4;
            }
            let cch = out[at + 22] as usize;
            result.push(out[at + 23..at + 23 + cch].to_vec());
            at += 22 + 1 + cch + 1;
        }
        result
    }

    fn run(host: &mut ScriptedHost, cur: &mut SearchCursor, out: &mut [u8], req: &FindRequest<'_>) -> Result<u16, Os2Error> {
        let codec = CodecContext::new(CodePage::Cp437);
        cur.fill(host, &codec, &IfsConfig::default(), out, req)
    }

    #[test]
    fn test_partial_success_across_batches() {
        let mut host = ScriptedHost::new().batch(&[("a", FILE)]).batch(&[("b", FILE)]);
        let mut cur = cursor(0);
        let mut out = [0u8; 512];
        let req = FindRequest::new(InfoLevel::Standard);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(2));
        assert_eq!(names(&out, 2, false), vec![b"a".to_vec(), b"b".to_vec()]);
        assert!(!cur.has_more_files());
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_exhaustion_is_terminal() {
        let mut host = ScriptedHost::new().batch(&[("a", FILE)]);
        let mut cur = cursor(0);
        let mut out = [0u8; 256];
        let req = FindRequest::new(InfoLevel::Standard);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(1));
        assert_eq!(host.calls, 2);
        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Err(Os2Error::NoMoreFiles));
        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Err(Os2Error::NoMoreFiles));
        assert_eq!(host.calls, 2);
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_required_attribute() {
        let mut host = ScriptedHost::new().batch(&[("f1", FILE), ("sub", dir()), ("f2", FILE)]);
        // May and must have directory
        let mut cur = cursor(0x1010);
        let mut out = [0u8; 512];
        let req = FindRequest::new(InfoLevel::Standard);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(1));
        assert_eq!(names(&out, 1, false), vec![b"sub".to_vec()]);
        assert_eq!(u16::from_le_bytes([out[20], out[21]]), FileAttr::DIRECTORY.bits());
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_required_hidden() {
        let mut host = ScriptedHost::new().batch(&[
            ("ro", FILE | HostMode::DOS_READONLY),
            ("hid", FILE | HostMode::DOS_HIDDEN),
            ("sub", dir()),
        ]);
        // Must have hidden
        let mut cur = cursor(0x0200);
        let mut out = [0u8; 512];
        let req = FindRequest::new(InfoLevel::Standard);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(1));
        assert_eq!(names(&out, 1, false), vec![b"hid".to_vec()]);
        assert_eq!(u16::from_le_bytes([out[20], out[21]]), FileAttr::HIDDEN.bits());
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_max_matches_keeps_rest_buffered() {
        let mut host = ScriptedHost::new().batch(&[("a", FILE), ("b", FILE), ("c", FILE)]);
        let mut cur = cursor(0);
        let mut out = [0u8; 512];
        let req = FindRequest::new(InfoLevel::Standard).with_max_matches(2);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(2));
        assert_eq!(cur.buffered(), 1);
        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(1));
        assert_eq!(names(&out, 1, false), vec![b"c".to_vec()]);
        assert_eq!(host.calls, 2);
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_buffer_too_small_leaves_cursor() {
        let mut host = ScriptedHost::new().batch(&[("first.txt", FILE)]);
        let mut cur = cursor(0);
        let req = FindRequest::new(InfoLevel::Standard);

        let mut tiny = [0u8; 20];
        assert_eq!(run(&mut host, &mut cur, &mut tiny, &req), Err(Os2Error::BufferOverflow));
        assert_eq!(host.calls, 0);

        // Big enough for the level, too small for this name
        let mut small = [0u8; 26];
        assert_eq!(run(&mut host, &mut cur, &mut small, &req), Err(Os2Error::BufferOverflow));
        assert_eq!(cur.buffered(), 1);

        let mut out = [0u8; 256];
        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(1));
        assert_eq!(names(&out, 1, false), vec![b"first.txt".to_vec()]);
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_buffer_fills_up() {
        let mut host = ScriptedHost::new().batch(&[("aaaa", FILE), ("bbbb", FILE)]);
        let mut cur = cursor(0);
        let req = FindRequest::new(InfoLevel::Standard);

        // One 28-byte record fits, the second does not
        let mut out = [0u8; 40];
        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(1));
        assert_eq!(cur.buffered(), 1);
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_getpos_offsets() {
        let mut host = ScriptedHost::new().batch(&[("a", FILE), ("bb", FILE)]);
        let mut cur = cursor(0);
        let mut out = [0u8; 256];
        let req = FindRequest::new(InfoLevel::Standard).with_flags(FindFlags::GETPOS);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(2));
        let first = u32::from_le_bytes([out[0], out[1], out[2], out[3]]);
        assert_eq!(first as usize, 4 + 22 + 1 + 1 + 1);
        let at = first as usize;
        assert_eq!(&out[at..at + 4], &[0, 0, 0, 0]);
        assert_eq!(names(&out, 2, true), vec![b"a".to_vec(), b"bb".to_vec()]);
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_hard_error_without_records() {
        let mut host = ScriptedHost::new().fail(HostError::PermissionDenied);
        let mut cur = cursor(0);
        let mut out = [0u8; 256];
        let req = FindRequest::new(InfoLevel::Standard);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Err(Os2Error::AccessDenied));
        assert!(cur.has_more_files());
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_hard_error_after_records() {
        let mut host = ScriptedHost::new()
            .batch(&[("a", FILE)])
            .fail(HostError::Other(-50))
            .fail(HostError::Other(-50));
        let mut cur = cursor(0);
        let mut out = [0u8; 256];
        let req = FindRequest::new(InfoLevel::Standard);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(1));
        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Err(Os2Error::GenFailure));
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_count_beyond_data_is_truncated() {
        let mut data = Vec::new();
        encode_dir_info(&mut data, &file(FILE), &ShflString::new(b"only").unwrap());
        // Host claims three records but sent one
        let mut host = ScriptedHost::new().raw(data, 3).batch(&[("next", FILE)]);
        let mut cur = cursor(0);
        let mut out = [0u8; 256];
        let req = FindRequest::new(InfoLevel::Standard);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(2));
        assert_eq!(names(&out, 2, false), vec![b"only".to_vec(), b"next".to_vec()]);
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_garbage_reply() {
        let mut host = ScriptedHost::new().raw(vec![0xFF; 10], 1);
        let mut cur = cursor(0);
        let mut out = [0u8; 256];
        let req = FindRequest::new(InfoLevel::Standard);

        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Err(Os2Error::GenFailure));
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_ea_list_level() {
        let mut host = ScriptedHost::new().batch(&[("x", FILE)]);
        let mut cur = cursor(0);
        let gea = [11u8, 0, 0, 0, 5, b'.', b'T', b'Y', b'P', b'E', 0];
        let req = FindRequest::new(InfoLevel::QueryEasFromList).with_gea_list(&gea);

        let mut out = [0xAAu8; 256];
        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(1));
        // EAOP block untouched
        assert_eq!(&out[..12], &[0xAA; 12]);
        assert_eq!(&out[12 + 22..12 + 26], &14u32.to_le_bytes());
        assert_eq!(&out[12 + 26..12 + 32], &[0, 5, 0, 0, b'.', b'T']);
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_ea_list_didnt_fit_still_returns_record() {
        let mut host = ScriptedHost::new().batch(&[("x", FILE)]);
        let mut cur = cursor(0);
        let mut gea = vec![0u8; 4];
        for _ in 0..10 {
            gea.push(20);
            gea.extend_from_slice(&[b'E'; 20]);
            gea.push(0);
        }
        let len = gea.len() as u32;
        gea[..4].copy_from_slice(&len.to_le_bytes());
        let req = FindRequest::new(InfoLevel::QueryEasFromList).with_gea_list(&gea);

        let mut out = [0u8; 200];
        assert_eq!(run(&mut host, &mut cur, &mut out, &req), Ok(1));
        assert_eq!(&out[12 + 22..12 + 26], &FEA_DIDNT_FIT.to_le_bytes());
        cur.close(&mut host).unwrap();
    }

    #[test]
    fn test_close_once() {
        let mut host = ScriptedHost::new();
        let mut cur = SearchCursor::new(
            Root(3),
            true,
            ShflHandle(9),
            ShflString::new(b"*").unwrap(),
            AttrFilter::ALL,
        );
        cur.close(&mut host).unwrap();
        cur.close(&mut host).unwrap();
        assert_eq!(host.closed, 1);
        assert_eq!(host.unmapped, 1);
        assert_eq!(cur.handle(), None);
    }
}

//! # In-Memory Host
//!
//! A [`HostTransport`] backed by in-memory directory trees, for tests and
//! for exercising the driver without a hypervisor.
//!
//! Paths are case-insensitive, listings come back sorted by name, and the
//! enumeration position is kept per handle (the guest's resume index is
//! ignored, as real hosts do).

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use vboxfs_shfl::dirinfo::encoded_len;
use vboxfs_shfl::{
    encode_dir_info, CreateFlags, CreateParams, CreateResult, DirInfoReply, DirListFlags,
    HostError, HostMode, HostTransport, ObjInfo, Root, ShflHandle, ShflString, TimeSpec,
};

/// One file or directory
#[derive(Debug, Clone)]
struct Node {
    /// Name as created (case preserved)
    name: Vec<u8>,
    info: ObjInfo,
}

impl Node {
    fn is_dir(&self) -> bool {
        self.info.host_mode().is_directory()
    }
}

/// Directory tree of one share, keyed by lower-cased '/'-separated path
#[derive(Debug, Clone, Default)]
struct Share {
    nodes: BTreeMap<Vec<u8>, Node>,
}

/// An open handle
#[derive(Debug, Clone)]
struct OpenDir {
    root: Root,
    /// Lookup key of the directory
    dir: Vec<u8>,
    /// Entries already returned
    pos: usize,
}

/// In-memory shared folder host
#[derive(Debug, Default)]
pub struct MemoryHost {
    shares: BTreeMap<Vec<u8>, Share>,
    roots: BTreeMap<u32, Vec<u8>>,
    next_root: u32,
    handles: BTreeMap<u64, OpenDir>,
    next_handle: u64,
    /// Most records per dir_info reply
    batch_limit: Option<usize>,
    /// Error for the next dir_info call
    fail_next: Option<HostError>,
    dir_info_calls: usize,
}

/// Lower-case, '/'-separated, no leading or trailing separator
fn key(path: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = path
        .iter()
        .map(|&b| if b == b'\\' { b'/' } else { b.to_ascii_lowercase() })
        .collect();
    while out.last() == Some(&b'/') {
        out.pop();
    }
    let lead = out.iter().take_while(|&&b| b == b'/').count();
    out.drain(..lead);
    out
}

fn parent(key: &[u8]) -> &[u8] {
    match key.iter().rposition(|&b| b == b'/') {
        Some(i) => &key[..i],
        None => &key[..0],
    }
}

fn last_component(path: &[u8]) -> &[u8] {
    match path.iter().rposition(|&b| b == b'/' || b == b'\\') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Case-insensitive match with `*` and `?`
pub fn wildcard_match(pattern: &[u8], name: &[u8]) -> bool {
    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while n < name.len() {
        if p < pattern.len() && (pattern[p] == b'?' || pattern[p].eq_ignore_ascii_case(&name[n])) {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == b'*' {
            star = Some((p, n));
            p += 1;
        } else if let Some((sp, sn)) = star {
            p = sp + 1;
            n = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&b| b == b'*')
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            next_root: 1,
            next_handle: 0x100,
            ..Self::default()
        }
    }

    pub fn add_share(&mut self, name: &[u8]) {
        self.shares.entry(key(name)).or_default();
    }

    /// Add an object, creating missing parent directories
    pub fn add_entry(&mut self, share: &[u8], path: &[u8], info: ObjInfo) {
        let share = self.shares.entry(key(share)).or_default();
        let k = key(path);

        let mut dir = parent(&k).to_vec();
        while !dir.is_empty() && !share.nodes.contains_key(&dir) {
            let name = last_component(&dir).to_vec();
            share.nodes.insert(dir.clone(), Node { name, info: dir_info() });
            dir = parent(&dir).to_vec();
        }

        let name = last_component(path).to_vec();
        share.nodes.insert(k, Node { name, info });
    }

    pub fn add_file(&mut self, share: &[u8], path: &[u8], size: i64, modified: TimeSpec) {
        let info = ObjInfo {
            object_size: size,
            allocated: (size + 511) & !511,
            access_time: modified,
            modification_time: modified,
            change_time: modified,
            birth_time: modified,
            mode: (HostMode::TYPE_FILE | HostMode::DOS_ARCHIVED).bits(),
        };
        self.add_entry(share, path, info);
    }

    pub fn add_dir(&mut self, share: &[u8], path: &[u8]) {
        self.add_entry(share, path, dir_info());
    }

    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit.max(1));
        self
    }

    /// Make the next dir_info call fail with `err`
    pub fn fail_next_dir_info(&mut self, err: HostError) {
        self.fail_next = Some(err);
    }

    pub fn dir_info_calls(&self) -> usize {
        self.dir_info_calls
    }

    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    pub fn mapped_roots(&self) -> usize {
        self.roots.len()
    }

    fn share(&self, root: Root) -> Result<&Share, HostError> {
        self.roots
            .get(&root.0)
            .and_then(|name| self.shares.get(name))
            .ok_or(HostError::InvalidParameter)
    }
}

fn dir_info() -> ObjInfo {
    ObjInfo {
        mode: (HostMode::TYPE_DIRECTORY | HostMode::DOS_DIRECTORY).bits(),
        ..ObjInfo::default()
    }
}

impl HostTransport for MemoryHost {
    fn map_folder(&mut self, share: &ShflString) -> Result<Root, HostError> {
        let name = key(share.as_bytes());
        if !self.shares.contains_key(&name) {
            return Err(HostError::ShareNotFound);
        }
        let root = Root(self.next_root);
        self.next_root += 1;
        self.roots.insert(root.0, name);
        Ok(root)
    }

    fn unmap_folder(&mut self, root: Root) -> Result<(), HostError> {
        self.roots
            .remove(&root.0)
            .map(|_| ())
            .ok_or(HostError::InvalidParameter)
    }

    fn create(
        &mut self,
        root: Root,
        path: &ShflString,
        params: &mut CreateParams,
    ) -> Result<(), HostError> {
        let share = self.share(root)?;
        let k = key(path.as_bytes());
        params.handle = ShflHandle::NIL;

        let is_dir = if k.is_empty() {
            params.info = dir_info();
            true
        } else {
            match share.nodes.get(&k) {
                Some(node) => {
                    params.info = node.info;
                    node.is_dir()
                }
                None => {
                    let p = parent(&k);
                    params.result = if p.is_empty() || share.nodes.get(p).is_some_and(Node::is_dir) {
                        CreateResult::FileNotFound
                    } else {
                        CreateResult::PathNotFound
                    };
                    return Ok(());
                }
            }
        };

        params.result = CreateResult::FileExists;
        if params.flags.contains(CreateFlags::DIRECTORY) && !is_dir {
            return Ok(());
        }

        let handle = ShflHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle.0, OpenDir { root, dir: k, pos: 0 });
        params.handle = handle;
        Ok(())
    }

    fn close(&mut self, _root: Root, handle: ShflHandle) -> Result<(), HostError> {
        self.handles
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(HostError::InvalidParameter)
    }

    fn dir_info(
        &mut self,
        root: Root,
        handle: ShflHandle,
        filter: Option<&ShflString>,
        flags: DirListFlags,
        _index: u32,
        buf: &mut [u8],
    ) -> Result<DirInfoReply, HostError> {
        self.dir_info_calls += 1;
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }

        let open = self.handles.get(&handle.0).ok_or(HostError::InvalidParameter)?;
        if open.root != root {
            return Err(HostError::InvalidParameter);
        }
        let share = self.share(root)?;
        let pattern = filter.map_or(&b"*"[..], |f| last_component(f.as_bytes()));

        let matches: Vec<&Node> = share
            .nodes
            .iter()
            .filter(|(k, _)| !k.is_empty() && parent(k) == open.dir.as_slice())
            .map(|(_, node)| node)
            .filter(|node| wildcard_match(pattern, &node.name))
            .collect();

        let pending = matches.get(open.pos..).unwrap_or(&[]);
        if pending.is_empty() {
            return Err(HostError::NoMoreFiles);
        }

        let mut limit = self.batch_limit.unwrap_or(usize::MAX);
        if flags.contains(DirListFlags::RETURN_ONE) {
            limit = 1;
        }

        let mut data = Vec::new();
        let mut count = 0;
        for node in pending.iter().take(limit) {
            let name = ShflString::new(&node.name).map_err(|_| HostError::InvalidParameter)?;
            if data.len() + encoded_len(&name) > buf.len() {
                break;
            }
            encode_dir_info(&mut data, &node.info, &name);
            count += 1;
        }
        if count == 0 {
            return Err(HostError::BufferOverflow);
        }

        buf[..data.len()].copy_from_slice(&data);
        if let Some(open) = self.handles.get_mut(&handle.0) {
            open.pos += count;
        }
        Ok(DirInfoReply {
            bytes: data.len(),
            count: count as u32,
        })
    }
}

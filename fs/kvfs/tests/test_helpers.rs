// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Mock backends shared by the VFS integration tests.

#![allow(unused)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
};

use kvfs::{
    CreatePolicy, DirEntry, Filesystem, FilesystemOps, FixedClock, Inode, InodeId, NodePermission,
    NodeTree, NodeType, TnodeId, Vfs, VfsError, VfsResult,
};

/// Boot time used by every test VFS.
pub const BOOT_TIME: i64 = 1_700_000_000;
/// Uptime of the test clock, five seconds.
pub const UPTIME_NANOS: u64 = 5_000_000_000;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory backend keeping file bytes by inode ident.
pub struct MemFs {
    name: &'static str,
    files: Mutex<HashMap<u64, Vec<u8>>>,
    next_ident: AtomicU64,
    /// Entries reported by `getdent` for the mount root.
    pub listing: Mutex<Vec<DirEntry>>,
    pub syncs: AtomicUsize,
    pub removed: AtomicUsize,
    pub fail_io: AtomicBool,
}

impl MemFs {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            files: Mutex::new(HashMap::new()),
            next_ident: AtomicU64::new(1000),
            listing: Mutex::new(Vec::new()),
            syncs: AtomicUsize::new(0),
            removed: AtomicUsize::new(0),
            fail_io: AtomicBool::new(false),
        })
    }

    /// Stores `data` under `ident` and lists it in the root as `name`.
    pub fn seed(&self, name: &str, ident: u64, data: &[u8]) {
        self.files.lock().unwrap().insert(ident, data.to_vec());
        let mut entry = DirEntry::new(name, NodeType::RegularFile);
        entry.size = data.len() as u64;
        entry.ident = ident;
        self.listing.lock().unwrap().push(entry);
    }

    pub fn stored(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl FilesystemOps for MemFs {
    fn name(&self) -> &str {
        self.name
    }

    fn is_temporary(&self) -> bool {
        true
    }

    fn mount(&self, tree: &mut NodeTree, _device: Option<InodeId>) -> VfsResult<InodeId> {
        Ok(tree.alloc_inode(Inode::new(NodeType::Directory, NodePermission::RWX_ALL, 0)))
    }

    fn read(&self, inode: &Inode, offset: u64, buf: &mut [u8]) -> VfsResult<usize> {
        if self.fail_io.load(Ordering::SeqCst) {
            return Err(VfsError::BackendFailure);
        }
        let files = self.files.lock().unwrap();
        let data = files.get(&inode.ident).map(Vec::as_slice).unwrap_or(&[]);
        let start = (offset as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write(&self, inode: &mut Inode, offset: u64, buf: &[u8]) -> VfsResult<usize> {
        if self.fail_io.load(Ordering::SeqCst) {
            return Err(VfsError::BackendFailure);
        }
        if inode.ident == 0 {
            inode.ident = self.next_ident.fetch_add(1, Ordering::SeqCst);
        }
        let mut files = self.files.lock().unwrap();
        let data = files.entry(inode.ident).or_default();
        let start = offset as usize;
        let end = start + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn sync(&self, _inode: &Inode) {
        self.syncs.fetch_add(1, Ordering::SeqCst);
    }

    fn rmnode(&self, tree: &mut NodeTree, tnode: TnodeId) {
        let ident = tree.inode_of(tnode).ident;
        if tree.remove(tnode).is_ok() {
            self.files.lock().unwrap().remove(&ident);
            self.removed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn ioctl(&self, _inode: &Inode, request: u64, arg: u64) -> VfsResult<i64> {
        Ok((request + arg) as i64)
    }

    fn getdent(&self, inode: &Inode, index: usize) -> Option<DirEntry> {
        inode.mountpoint?;
        self.listing.lock().unwrap().get(index).cloned()
    }
}

/// Character-device backend that always has data to read.
pub struct EchoFs;

impl FilesystemOps for EchoFs {
    fn name(&self) -> &str {
        "echofs"
    }

    fn is_temporary(&self) -> bool {
        true
    }

    fn mount(&self, tree: &mut NodeTree, _device: Option<InodeId>) -> VfsResult<InodeId> {
        Ok(tree.alloc_inode(Inode::new(
            NodeType::CharacterDevice,
            NodePermission::default(),
            0,
        )))
    }

    fn open(&self, tree: &mut NodeTree, parent: InodeId, _path: &str) -> VfsResult<TnodeId> {
        tree.inode(parent).mountpoint.ok_or(VfsError::NotFound)
    }

    fn read(&self, _inode: &Inode, _offset: u64, buf: &mut [u8]) -> VfsResult<usize> {
        buf.fill(b'x');
        Ok(buf.len())
    }

    fn write(&self, _inode: &mut Inode, _offset: u64, buf: &[u8]) -> VfsResult<usize> {
        Ok(buf.len())
    }
}

/// Disk-backed backend that only records the device it was mounted from.
#[derive(Default)]
pub struct DiskFs {
    pub device: Mutex<Option<InodeId>>,
}

impl FilesystemOps for DiskFs {
    fn name(&self) -> &str {
        "diskfs"
    }

    fn is_temporary(&self) -> bool {
        false
    }

    fn mount(&self, tree: &mut NodeTree, device: Option<InodeId>) -> VfsResult<InodeId> {
        *self.device.lock().unwrap() = device;
        Ok(tree.alloc_inode(Inode::new(NodeType::Directory, NodePermission::RWX_ALL, 0)))
    }

    fn read(&self, _inode: &Inode, _offset: u64, _buf: &mut [u8]) -> VfsResult<usize> {
        Err(VfsError::Unsupported)
    }

    fn write(&self, _inode: &mut Inode, _offset: u64, _buf: &[u8]) -> VfsResult<usize> {
        Err(VfsError::Unsupported)
    }
}

/// Backend that materialises any path below its mount on open.
pub struct LazyFs;

impl FilesystemOps for LazyFs {
    fn name(&self) -> &str {
        "lazyfs"
    }

    fn is_temporary(&self) -> bool {
        true
    }

    fn mount(&self, tree: &mut NodeTree, _device: Option<InodeId>) -> VfsResult<InodeId> {
        Ok(tree.alloc_inode(Inode::new(NodeType::Directory, NodePermission::RWX_ALL, 0)))
    }

    fn open(&self, tree: &mut NodeTree, _parent: InodeId, path: &str) -> VfsResult<TnodeId> {
        tree.resolve(path, CreatePolicy::CREATE, NodeType::RegularFile)
    }

    fn read(&self, _inode: &Inode, _offset: u64, _buf: &mut [u8]) -> VfsResult<usize> {
        Ok(0)
    }

    fn write(&self, _inode: &mut Inode, _offset: u64, buf: &[u8]) -> VfsResult<usize> {
        Ok(buf.len())
    }
}

/// A VFS with a [`MemFs`] named "memfs" mounted at `/`.
pub fn setup_vfs() -> (Vfs, Arc<MemFs>) {
    init_logger();
    let vfs = Vfs::new(FixedClock::new(BOOT_TIME, UPTIME_NANOS));
    let memfs = MemFs::new("memfs");
    vfs.register(Filesystem::new(memfs.clone()));
    vfs.mount(None, "/", "memfs").expect("Failed to mount memfs at /");
    (vfs, memfs)
}

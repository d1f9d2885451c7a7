// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Filesystem backend traits, wrappers and the backend registry.

use alloc::{sync::Arc, vec::Vec};
use core::fmt;

use inherit_methods_macro::inherit_methods;

use crate::{DirEntry, Inode, InodeId, NodeTree, TnodeId, VfsError, VfsResult};

/// Number of name bytes compared when looking a backend up.
pub const FS_NAME_LEN: usize = 16;

/// Operation set implemented by a filesystem backend.
///
/// Every hook runs with the global VFS lock held and receives the part of the
/// tree it may touch. Optional hooks default to "not supported" or to a no-op.
pub trait FilesystemOps: Send + Sync {
    /// Gets the name the backend is registered under.
    fn name(&self) -> &str;

    /// Temporary backends need no block device to mount.
    fn is_temporary(&self) -> bool;

    /// Builds the root inode of a fresh mount.
    ///
    /// `device` is the block-device inode for disk-backed backends and `None`
    /// for temporary ones. The returned inode must not be linked anywhere yet.
    fn mount(&self, tree: &mut NodeTree, device: Option<InodeId>) -> VfsResult<InodeId>;

    /// Opens `path`, a node the tree does not know about (yet), below the
    /// closest existing ancestor whose inode is `parent`.
    ///
    /// Also consulted when `path` already resolves, in which case the backend
    /// may hand back a different tnode.
    fn open(&self, tree: &mut NodeTree, parent: InodeId, path: &str) -> VfsResult<TnodeId> {
        let _ = (tree, parent, path);
        Err(VfsError::Unsupported)
    }

    /// Reads up to `buf.len()` bytes at `offset`.
    fn read(&self, inode: &Inode, offset: u64, buf: &mut [u8]) -> VfsResult<usize>;

    /// Writes `buf` at `offset`.
    fn write(&self, inode: &mut Inode, offset: u64, buf: &[u8]) -> VfsResult<usize>;

    /// Persists inode metadata (size, permissions).
    fn sync(&self, inode: &Inode) {
        let _ = inode;
    }

    /// Reclaims a node whose last link and last handle are gone.
    ///
    /// Backends that keep per-node storage drop it here and then call
    /// [`NodeTree::remove`].
    fn rmnode(&self, tree: &mut NodeTree, tnode: TnodeId) {
        let _ = (tree, tnode);
    }

    /// Device-specific control request.
    fn ioctl(&self, inode: &Inode, request: u64, arg: u64) -> VfsResult<i64> {
        let _ = (inode, request, arg);
        Err(VfsError::Unsupported)
    }

    /// Re-reads backend state for a folder before it is enumerated.
    fn refresh(&self, inode: &mut Inode) {
        let _ = inode;
    }

    /// Returns the `index`-th entry of folder `inode`, `None` past the end.
    fn getdent(&self, inode: &Inode, index: usize) -> Option<DirEntry> {
        let _ = (inode, index);
        None
    }
}

/// A reference-counted filesystem wrapper.
#[derive(Clone)]
pub struct Filesystem {
    ops: Arc<dyn FilesystemOps>,
}

#[inherit_methods(from = "self.ops")]
impl Filesystem {
    pub fn name(&self) -> &str;

    pub fn is_temporary(&self) -> bool;

    pub fn mount(&self, tree: &mut NodeTree, device: Option<InodeId>) -> VfsResult<InodeId>;

    pub fn open(&self, tree: &mut NodeTree, parent: InodeId, path: &str) -> VfsResult<TnodeId>;

    pub fn read(&self, inode: &Inode, offset: u64, buf: &mut [u8]) -> VfsResult<usize>;

    pub fn write(&self, inode: &mut Inode, offset: u64, buf: &[u8]) -> VfsResult<usize>;

    pub fn sync(&self, inode: &Inode);

    pub fn rmnode(&self, tree: &mut NodeTree, tnode: TnodeId);

    pub fn ioctl(&self, inode: &Inode, request: u64, arg: u64) -> VfsResult<i64>;

    pub fn refresh(&self, inode: &mut Inode);

    pub fn getdent(&self, inode: &Inode, index: usize) -> Option<DirEntry>;
}

impl Filesystem {
    /// Create a new filesystem wrapper from an implementation object.
    pub fn new(ops: Arc<dyn FilesystemOps>) -> Self {
        Self { ops }
    }

    /// Returns `true` if both wrappers share the same backend object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ops, &other.ops)
    }

    /// Compares the backend name with `name` over [`FS_NAME_LEN`] bytes.
    pub fn name_matches(&self, name: &str) -> bool {
        fixed_name(self.name()) == fixed_name(name)
    }
}

impl fmt::Debug for Filesystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filesystem")
            .field("name", &self.name())
            .field("temporary", &self.is_temporary())
            .finish()
    }
}

fn fixed_name(name: &str) -> [u8; FS_NAME_LEN] {
    let mut buf = [0; FS_NAME_LEN];
    let len = name.len().min(FS_NAME_LEN);
    buf[..len].copy_from_slice(&name.as_bytes()[..len]);
    buf
}

/// Registered backends, in registration order.
#[derive(Debug, Default)]
pub struct Registry {
    backends: Vec<Filesystem>,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Appends `fs`. Registering the same name twice is allowed; the earlier
    /// registration keeps winning lookups.
    pub fn register(&mut self, fs: Filesystem) {
        info!("VFS: register filesystem {}", fs.name());
        self.backends.push(fs);
    }

    /// Finds the first backend whose name matches `name`.
    pub fn lookup(&self, name: &str) -> VfsResult<Filesystem> {
        self.backends
            .iter()
            .find(|fs| fs.name_matches(name))
            .cloned()
            .ok_or_else(|| {
                error!("VFS: unknown filesystem {name}");
                VfsError::UnknownFilesystem
            })
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

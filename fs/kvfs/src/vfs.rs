// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! The VFS context: tree, backend registry and open-file table under one
//! lock.

use alloc::{boxed::Box, sync::Arc};

use crate::{
    Clock, CreatePolicy, DirEntry, FileTable, Filesystem, Handle, IdAllocator, Mutex, NodeDesc,
    NodePermission, NodeTree, NodeType, OpenMode, Registry, SeekWhence, Stat, TnodeId, VfsError,
    VfsResult, path,
};

struct VfsInner {
    tree: NodeTree,
    registry: Registry,
    files: FileTable,
    /// Handle of the terminal stream, exempt from read truncation.
    stream: Option<Handle>,
}

/// A virtual filesystem instance.
///
/// Every operation takes the internal lock for its whole duration, including
/// the backend hooks it calls.
pub struct Vfs {
    inner: Mutex<VfsInner>,
    clock: Box<dyn Clock>,
}

impl Vfs {
    /// Creates a VFS holding only an unmounted root folder.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self::with_ids(clock, Arc::new(IdAllocator::new()))
    }

    /// Creates a VFS drawing device and node ids from `ids`.
    pub fn with_ids(clock: impl Clock + 'static, ids: Arc<IdAllocator>) -> Self {
        Self {
            inner: Mutex::new(VfsInner {
                tree: NodeTree::new(ids),
                registry: Registry::new(),
                files: FileTable::new(),
                stream: None,
            }),
            clock: Box::new(clock),
        }
    }

    /// Runs `f` with exclusive access to the node tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&mut NodeTree) -> R) -> R {
        f(&mut self.inner.lock().tree)
    }

    /// Makes `fs` available to [`Vfs::mount`].
    pub fn register(&self, fs: Filesystem) {
        self.inner.lock().registry.register(fs);
    }

    /// Finds a registered backend by name.
    pub fn lookup_fs(&self, name: &str) -> VfsResult<Filesystem> {
        self.inner.lock().registry.lookup(name)
    }

    /// Creates a node of `node_type` at `path`, creating missing folders on
    /// the way. Fails if the node already exists.
    pub fn create(&self, path: &str, node_type: NodeType) -> VfsResult<()> {
        debug!("VFS: create {path} as {node_type:?}");
        let mut inner = self.inner.lock();
        let tnode = inner.tree.resolve(
            path,
            CreatePolicy::CREATE | CreatePolicy::ERR_ON_EXIST,
            node_type,
        )?;

        let now = self.clock.file_time();
        let st = &mut inner.tree.tnode_mut(tnode).st;
        st.atime = now;
        st.mtime = now;
        st.ctime = now;
        Ok(())
    }

    /// Replaces the permission bits of the node behind `handle`.
    pub fn chmod(&self, handle: Handle, perm: NodePermission) -> VfsResult<()> {
        let mut inner = self.inner.lock();
        let VfsInner { tree, files, .. } = &mut *inner;
        let desc = files.get(handle)?;
        if !desc.mode.can_write() {
            error!("VFS: chmod on read-only handle {}", handle.raw());
            return Err(VfsError::ReadOnlyHandle);
        }

        let perm = perm & NodePermission::RWX_ALL;
        let st = &mut tree.tnode_mut(desc.tnode).st;
        st.mode = (st.mode & !(NodePermission::RWX_ALL.bits() as u32)) | perm.bits() as u32;
        let inode = tree.inode_mut(desc.inode);
        inode.perm = perm;
        if let Some(fs) = &inode.fs {
            fs.sync(inode);
        }
        Ok(())
    }

    /// Passes a device control request to the backend of `handle`.
    pub fn ioctl(&self, handle: Handle, request: u64, arg: u64) -> VfsResult<i64> {
        let inner = self.inner.lock();
        let desc = inner.files.get(handle)?;
        let inode = inner.tree.inode(desc.inode);
        match &inode.fs {
            Some(fs) => fs.ioctl(inode, request, arg),
            None => Err(VfsError::Unsupported),
        }
    }

    /// Mounts the backend registered as `fs_name` on the folder at `target`.
    ///
    /// `device` names the block-device node for disk-backed backends and is
    /// ignored by temporary ones.
    pub fn mount(&self, device: Option<&str>, target: &str, fs_name: &str) -> VfsResult<()> {
        let mut inner = self.inner.lock();
        let fs = inner.registry.lookup(fs_name)?;
        inner.tree.mount(&fs, device, target)?;
        Ok(())
    }

    /// Drops the only link of the node at `path`.
    ///
    /// The node is reclaimed right away when no handle refers to it or to
    /// anything below it, or on the last such [`Vfs::close`] otherwise. The
    /// root cannot be unlinked.
    pub fn unlink(&self, path: &str) -> VfsResult<()> {
        debug!("VFS: unlink {path}");
        let mut inner = self.inner.lock();
        let tree = &mut inner.tree;
        let tnode = tree.lookup(path)?;
        if tree.parent(tnode).is_none() {
            error!("VFS: cannot unlink the root");
            return Err(VfsError::Unsupported);
        }

        let st = &mut tree.tnode_mut(tnode).st;
        match st.nlink {
            0 => return Err(VfsError::AlreadyUnlinked),
            1 => st.nlink = 0,
            _ => {
                debug!("VFS: {path} has links which should be removed first");
                return Err(VfsError::LinksRemain);
            }
        }

        if tree.is_pinned(tnode) {
            debug!("VFS: {path} is still open, removal deferred");
        } else {
            reclaim(tree, tnode);
        }
        Ok(())
    }

    /// Opens `path` and returns a fresh handle.
    ///
    /// When `path` is not in the tree yet, the closest existing ancestor is
    /// searched for and its backend is asked to open the full path.
    pub fn open(&self, path: &str, mode: OpenMode) -> VfsResult<Handle> {
        debug!("VFS: open {path} with mode {mode:?}");
        let mut inner = self.inner.lock();
        let VfsInner { tree, files, .. } = &mut *inner;

        let tnode = match tree.lookup(path) {
            Ok(found) => open_existing(tree, found, path)?,
            Err(_) => open_below_ancestor(tree, path)?,
        };

        let inode_id = tree.tnode(tnode).inode;
        let inode = tree.inode_mut(inode_id);
        inode.refcount += 1;
        let size = inode.size;
        // TODO: resolve symlink targets so st_size reports the target's size.
        tree.tnode_mut(tnode).st.size = size;

        let handle = files.insert(NodeDesc::new(path, tnode, inode_id, mode));
        debug!("VFS: opened {path} as handle {}", handle.raw());
        Ok(handle)
    }

    /// Releases `handle`, reclaiming the node, or the unlinked folder above it,
    /// once nothing keeps it open.
    pub fn close(&self, handle: Handle) -> VfsResult<()> {
        trace!("VFS: close handle {}", handle.raw());
        let mut inner = self.inner.lock();
        let VfsInner {
            tree,
            files,
            stream,
            ..
        } = &mut *inner;
        let desc = files.remove(handle)?;
        if *stream == Some(handle) {
            *stream = None;
        }

        let inode = tree.inode_mut(desc.inode);
        inode.refcount = inode.refcount.saturating_sub(1);
        if let Some(unlinked) = tree
            .unlinked_ancestor(desc.tnode)
            .filter(|&unlinked| !tree.is_pinned(unlinked))
        {
            debug!("VFS: close {} and remove {}", desc.path, tree.path_of(unlinked));
            reclaim(tree, unlinked);
        }
        Ok(())
    }

    /// Reads from the cursor of `handle` into `buf`.
    ///
    /// Reads are capped at the end of the file, except on the terminal
    /// stream. A failing backend reads nothing.
    pub fn read(&self, handle: Handle, buf: &mut [u8]) -> VfsResult<usize> {
        let mut inner = self.inner.lock();
        let VfsInner {
            tree,
            files,
            stream,
            ..
        } = &mut *inner;
        let desc = files.get_mut(handle)?;
        let inode = tree.inode(desc.inode);

        let mut len = buf.len();
        if *stream != Some(handle) {
            len = len.min(inode.size.saturating_sub(desc.seek) as usize);
        }
        if len == 0 {
            return Ok(0);
        }

        let read = match &inode.fs {
            Some(fs) => fs.read(inode, desc.seek, &mut buf[..len]).unwrap_or_else(|err| {
                warn!("VFS: read {} failed: {err}", desc.path);
                0
            }),
            None => 0,
        };
        desc.seek += read as u64;
        Ok(read)
    }

    /// Writes `buf` at the cursor of `handle`, growing the file if needed.
    ///
    /// The cursor itself is left where it is.
    pub fn write(&self, handle: Handle, buf: &[u8]) -> VfsResult<usize> {
        let mut inner = self.inner.lock();
        let VfsInner { tree, files, .. } = &mut *inner;
        let desc = files.get(handle)?;
        if !desc.mode.can_write() {
            error!("VFS: handle {} is read only", handle.raw());
            return Err(VfsError::ReadOnlyHandle);
        }

        let inode = tree.inode_mut(desc.inode);
        let Some(fs) = inode.fs.clone() else {
            return Ok(0);
        };
        let end = desc.seek + buf.len() as u64;
        if end > inode.size {
            inode.size = end;
            fs.sync(inode);
        }
        let written = fs.write(inode, desc.seek, buf).unwrap_or_else(|err| {
            warn!("VFS: write {} failed: {err}", desc.path);
            0
        });

        let size = inode.size;
        tree.tnode_mut(desc.tnode).st.size = size;
        Ok(written)
    }

    /// Moves the cursor of `handle` and returns its new position.
    pub fn seek(&self, handle: Handle, whence: SeekWhence) -> VfsResult<u64> {
        let mut inner = self.inner.lock();
        let VfsInner { tree, files, .. } = &mut *inner;
        let desc = files.get_mut(handle)?;
        let size = tree.inode(desc.inode).size;

        let target = match whence {
            SeekWhence::Start(off) => Some(off),
            SeekWhence::Current(off) => (desc.seek as i64).checked_add(off),
            SeekWhence::End(off) => (size as i64).checked_sub(off),
        };
        match target {
            Some(pos) if pos >= 0 && pos as u64 <= size => {
                desc.seek = pos as u64;
                Ok(desc.seek)
            }
            _ => {
                debug!(
                    "VFS: seek {whence:?} out of bounds on {} (size {size}, cursor {})",
                    desc.path, desc.seek
                );
                Err(VfsError::OutOfBounds)
            }
        }
    }

    /// Size of the node behind `handle`, or 0 for an unknown handle.
    pub fn tell(&self, handle: Handle) -> u64 {
        let inner = self.inner.lock();
        inner
            .files
            .get(handle)
            .map_or(0, |desc| inner.tree.inode(desc.inode).size)
    }

    /// Loads the entries the backend knows for the folder behind `handle`
    /// into the tree. Existing children are updated, none are evicted.
    pub fn refresh(&self, handle: Handle) -> VfsResult<()> {
        let mut inner = self.inner.lock();
        let VfsInner { tree, files, .. } = &mut *inner;
        let desc = files.get(handle)?;
        let Some(fs) = tree.inode(desc.inode).fs.clone() else {
            return Ok(());
        };

        fs.refresh(tree.inode_mut(desc.inode));
        let mut index = 0;
        while let Some(entry) = fs.getdent(tree.inode(desc.inode), index) {
            let path = path::join(&desc.path, &entry.name);
            trace!("VFS: refresh {path}");
            let tnode = tree.resolve(&path, CreatePolicy::CREATE, entry.node_type)?;
            let inode = tree.inode_of_mut(tnode);
            inode.time = entry.time;
            inode.size = entry.size;
            inode.ident = entry.ident;
            let st = &mut tree.tnode_mut(tnode).st;
            st.size = entry.size;
            st.mtime = entry.time;
            index += 1;
        }
        Ok(())
    }

    /// Returns the next child of the folder behind `handle`, or `None` once
    /// every child has been listed.
    pub fn getdent(&self, handle: Handle) -> VfsResult<Option<DirEntry>> {
        let mut inner = self.inner.lock();
        let VfsInner { tree, files, .. } = &mut *inner;
        let desc = files.get_mut(handle)?;
        let inode = tree.inode(desc.inode);
        if !inode.is_traversable() {
            error!("VFS: {} is not traversable", desc.path);
            return Err(VfsError::NotTraversable);
        }

        let Some(&child) = inode.children.get(desc.seek as usize) else {
            return Ok(None);
        };
        let name = &tree.tnode(child).name;
        let child_inode = tree.inode_of(child);
        let entry = DirEntry {
            name: name.clone(),
            node_type: child_inode.node_type,
            size: child_inode.size,
            time: child_inode.time,
            ident: child_inode.ident,
        };
        desc.seek += 1;
        Ok(Some(entry))
    }

    /// Returns the stat record of the node at `path`.
    pub fn stat(&self, path: &str) -> VfsResult<Stat> {
        let inner = self.inner.lock();
        let tnode = inner.tree.lookup(path)?;
        Ok(inner.tree.tnode(tnode).st)
    }

    /// Returns the stat record of the node behind `handle`.
    pub fn fstat(&self, handle: Handle) -> VfsResult<Stat> {
        let inner = self.inner.lock();
        let desc = inner.files.get(handle)?;
        Ok(inner.tree.tnode(desc.tnode).st)
    }

    /// Registers `handle` as the terminal stream.
    pub fn set_stream_handle(&self, handle: Handle) -> VfsResult<()> {
        let mut inner = self.inner.lock();
        inner.files.get(handle)?;
        info!("VFS: terminal stream is handle {}", handle.raw());
        inner.stream = Some(handle);
        Ok(())
    }

    pub fn stream_handle(&self) -> Option<Handle> {
        self.inner.lock().stream
    }

    /// Number of open handles.
    pub fn open_handles(&self) -> usize {
        self.inner.lock().files.len()
    }

    /// Logs the whole tree at debug level.
    pub fn dump(&self) {
        let inner = self.inner.lock();
        inner.tree.dump();
        debug!("VFS: {} open handles", inner.files.len());
    }
}

/// Lets the backend of a node found by plain lookup substitute its own tnode.
fn open_existing(tree: &mut NodeTree, tnode: TnodeId, path: &str) -> VfsResult<TnodeId> {
    let inode = tree.tnode(tnode).inode;
    let Some(fs) = tree.inode(inode).fs.clone() else {
        return Ok(tnode);
    };
    trace!("VFS: {path} already exists, asking {}", fs.name());
    match fs.open(tree, inode, path) {
        Err(VfsError::Unsupported) => Ok(tnode),
        result => result,
    }
}

/// Walks up from `path` to the closest existing ancestor and asks its backend
/// to open `path`.
fn open_below_ancestor(tree: &mut NodeTree, path: &str) -> VfsResult<TnodeId> {
    let mut cur = path;
    let ancestor = loop {
        let Some((parent, _)) = path::parent_dir(cur) else {
            debug!("VFS: cannot find {path}");
            return Err(VfsError::NotFound);
        };
        if let Ok(found) = tree.lookup(parent) {
            break found;
        }
        cur = parent;
    };

    let inode = tree.tnode(ancestor).inode;
    let Some(fs) = tree.inode(inode).fs.clone() else {
        return Err(VfsError::NotFound);
    };
    debug!(
        "VFS: cannot open {path}, asking {} at {}",
        fs.name(),
        tree.path_of(ancestor)
    );
    fs.open(tree, inode, path).map_err(|_| VfsError::NotFound)
}

/// Hands a node with no links and no handles back to its backend.
fn reclaim(tree: &mut NodeTree, tnode: TnodeId) {
    match tree.inode_of(tnode).fs.clone() {
        Some(fs) => fs.rmnode(tree, tnode),
        None => {
            if let Err(err) = tree.remove(tnode) {
                warn!("VFS: cannot remove {}: {err}", tree.path_of(tnode));
            }
        }
    }
}

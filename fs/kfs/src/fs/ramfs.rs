// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! In-memory filesystem seeded from a boot image.
//!
//! The image is a table of entries built with [`RamFs::add_file`] and
//! [`RamFs::add_dir`] before mounting. The VFS learns about the entries through
//! `getdent` on refresh; every inode carries the slot of its entry as ident.
//! Nodes created through the VFS get a detached slot on their first write.

use alloc::{string::String, vec::Vec};

use kvfs::{
    DirEntry, FilesystemOps, Inode, InodeId, NodePermission, NodeTree, NodeType, TnodeId,
    Timespec, VfsError, VfsResult, path,
};
use slab::Slab;
use spin::Mutex;

use super::{ident_to_slot, slot_to_ident};

struct RamEntry {
    name: String,
    node_type: NodeType,
    parent: Option<usize>,
    children: Vec<usize>,
    data: Vec<u8>,
    time: Timespec,
}

impl RamEntry {
    fn new(name: &str, node_type: NodeType, parent: Option<usize>, time: Timespec) -> Self {
        Self {
            name: String::from(name),
            node_type,
            parent,
            children: Vec::new(),
            data: Vec::new(),
            time,
        }
    }
}

struct RamInner {
    entries: Slab<RamEntry>,
    root: usize,
    time: Timespec,
}

impl RamInner {
    fn child(&self, dir: usize, name: &str) -> Option<usize> {
        self.entries[dir]
            .children
            .iter()
            .copied()
            .find(|&c| self.entries[c].name == name)
    }

    /// Walks `path`, creating missing folders, and adds the leaf.
    fn insert(&mut self, path: &str, node_type: NodeType) -> VfsResult<usize> {
        let mut components: Vec<&str> = path::components(path).collect();
        // The root itself always exists.
        let name = components.pop().ok_or(VfsError::AlreadyExists)?;
        let mut dir = self.root;
        for component in components {
            if self.entries[dir].node_type != NodeType::Directory {
                return Err(VfsError::NotADirectory);
            }
            dir = match self.child(dir, component) {
                Some(c) => c,
                None => self.attach(dir, component, NodeType::Directory),
            };
        }
        if self.entries[dir].node_type != NodeType::Directory {
            return Err(VfsError::NotADirectory);
        }
        if self.child(dir, name).is_some() {
            return Err(VfsError::AlreadyExists);
        }
        Ok(self.attach(dir, name, node_type))
    }

    fn attach(&mut self, dir: usize, name: &str, node_type: NodeType) -> usize {
        let slot = self
            .entries
            .insert(RamEntry::new(name, node_type, Some(dir), self.time));
        self.entries[dir].children.push(slot);
        slot
    }

    fn release(&mut self, slot: usize) {
        let Some(entry) = self.entries.try_remove(slot) else {
            return;
        };
        if let Some(dir) = entry.parent.and_then(|p| self.entries.get_mut(p)) {
            dir.children.retain(|&c| c != slot);
        }
        for child in entry.children {
            self.release(child);
        }
    }
}

/// Memory-backed, temporary filesystem.
pub struct RamFs {
    inner: Mutex<RamInner>,
}

impl RamFs {
    /// Creates an empty image.
    pub fn new() -> Self {
        Self::with_time(Timespec::default())
    }

    /// Creates an empty image whose entries report `time` as modification
    /// time.
    pub fn with_time(time: Timespec) -> Self {
        let mut entries = Slab::new();
        let root = entries.insert(RamEntry::new("", NodeType::Directory, None, time));
        Self {
            inner: Mutex::new(RamInner {
                entries,
                root,
                time,
            }),
        }
    }

    /// Adds a regular file holding `data`, creating parent folders as needed.
    pub fn add_file(&self, path: &str, data: &[u8]) -> VfsResult<()> {
        let mut inner = self.inner.lock();
        let slot = inner.insert(path, NodeType::RegularFile)?;
        inner.entries[slot].data.extend_from_slice(data);
        Ok(())
    }

    /// Adds an empty folder, creating parent folders as needed.
    pub fn add_dir(&self, path: &str) -> VfsResult<()> {
        self.inner.lock().insert(path, NodeType::Directory).map(drop)
    }

    /// Number of entries with storage, the root included.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RamFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FilesystemOps for RamFs {
    fn name(&self) -> &str {
        "ramfs"
    }

    fn is_temporary(&self) -> bool {
        true
    }

    fn mount(&self, tree: &mut NodeTree, _device: Option<InodeId>) -> VfsResult<InodeId> {
        let inner = self.inner.lock();
        let mut root = Inode::new(NodeType::Directory, NodePermission::RWX_ALL, 0);
        root.ident = slot_to_ident(inner.root);
        root.time = inner.time;
        Ok(tree.alloc_inode(root))
    }

    fn read(&self, inode: &Inode, offset: u64, buf: &mut [u8]) -> VfsResult<usize> {
        let Some(slot) = ident_to_slot(inode.ident) else {
            return Ok(0);
        };
        let inner = self.inner.lock();
        let data = &inner
            .entries
            .get(slot)
            .ok_or(VfsError::BackendFailure)?
            .data;
        let start = (offset as usize).min(data.len());
        let len = buf.len().min(data.len() - start);
        buf[..len].copy_from_slice(&data[start..start + len]);
        Ok(len)
    }

    fn write(&self, inode: &mut Inode, offset: u64, buf: &[u8]) -> VfsResult<usize> {
        let mut inner = self.inner.lock();
        let slot = match ident_to_slot(inode.ident) {
            Some(slot) => slot,
            None => {
                let time = inner.time;
                let slot = inner
                    .entries
                    .insert(RamEntry::new("", inode.node_type, None, time));
                trace!("ramfs: allocate storage slot {slot}");
                inode.ident = slot_to_ident(slot);
                slot
            }
        };
        let data = &mut inner
            .entries
            .get_mut(slot)
            .ok_or(VfsError::BackendFailure)?
            .data;
        let start = offset as usize;
        let end = start + buf.len();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn rmnode(&self, tree: &mut NodeTree, tnode: TnodeId) {
        let slot = ident_to_slot(tree.inode_of(tnode).ident);
        let path = tree.path_of(tnode);
        if let Err(err) = tree.remove(tnode) {
            warn!("ramfs: cannot remove {path}: {err}");
            return;
        }
        debug!("ramfs: remove {path}");
        if let Some(slot) = slot {
            self.inner.lock().release(slot);
        }
    }

    fn getdent(&self, inode: &Inode, index: usize) -> Option<DirEntry> {
        let inner = self.inner.lock();
        let dir = inner.entries.get(ident_to_slot(inode.ident)?)?;
        let slot = *dir.children.get(index)?;
        let entry = &inner.entries[slot];
        Some(DirEntry {
            name: entry.name.clone(),
            node_type: entry.node_type,
            size: entry.data.len() as u64,
            time: entry.time,
            ident: slot_to_ident(slot),
        })
    }
}

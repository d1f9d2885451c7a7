// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Anonymous pipes.
//!
//! Opening any path below the mount creates a character-device node backed by
//! its own FIFO buffer, or returns the existing one.

use alloc::collections::VecDeque;

use kvfs::{
    CreatePolicy, FilesystemOps, Inode, InodeId, NodePermission, NodeTree, NodeType, TnodeId,
    VfsError, VfsResult, path,
};
use slab::Slab;
use spin::Mutex;

use super::{ident_to_slot, slot_to_ident};

/// Pipe-backed, temporary filesystem.
pub struct PipeFs {
    pipes: Mutex<Slab<VecDeque<u8>>>,
}

impl PipeFs {
    pub fn new() -> Self {
        Self {
            pipes: Mutex::new(Slab::new()),
        }
    }

    /// Returns `true` if the closest mounted folder above `path` is a pipefs
    /// root.
    fn owns(&self, tree: &NodeTree, path: &str) -> bool {
        let mut cur = path;
        while let Some((parent, _)) = path::parent_dir(cur) {
            if let Ok(tnode) = tree.lookup(parent) {
                let inode = tree.inode_of(tnode);
                if inode.mountpoint.is_some() {
                    return inode.fs.as_ref().is_some_and(|fs| fs.name() == self.name());
                }
            }
            cur = parent;
        }
        false
    }

    /// Number of live pipes.
    pub fn len(&self) -> usize {
        self.pipes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PipeFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FilesystemOps for PipeFs {
    fn name(&self) -> &str {
        "pipefs"
    }

    fn is_temporary(&self) -> bool {
        true
    }

    fn mount(&self, tree: &mut NodeTree, _device: Option<InodeId>) -> VfsResult<InodeId> {
        Ok(tree.alloc_inode(Inode::new(
            NodeType::Directory,
            NodePermission::RWX_ALL,
            0,
        )))
    }

    fn open(&self, tree: &mut NodeTree, _parent: InodeId, path: &str) -> VfsResult<TnodeId> {
        if let Ok(existing) = tree.lookup(path) {
            return Ok(existing);
        }
        if !self.owns(tree, path) {
            return Err(VfsError::NotFound);
        }

        let tnode = tree.resolve(path, CreatePolicy::CREATE, NodeType::CharacterDevice)?;
        let slot = self.pipes.lock().insert(VecDeque::new());
        tree.inode_of_mut(tnode).ident = slot_to_ident(slot);
        debug!("pipefs: new pipe {slot} at {path}");
        Ok(tnode)
    }

    fn read(&self, inode: &Inode, _offset: u64, buf: &mut [u8]) -> VfsResult<usize> {
        let slot = ident_to_slot(inode.ident).ok_or(VfsError::BackendFailure)?;
        let mut pipes = self.pipes.lock();
        let pipe = pipes.get_mut(slot).ok_or(VfsError::BackendFailure)?;
        let len = buf.len().min(pipe.len());
        for (dst, src) in buf.iter_mut().zip(pipe.drain(..len)) {
            *dst = src;
        }
        Ok(len)
    }

    fn write(&self, inode: &mut Inode, _offset: u64, buf: &[u8]) -> VfsResult<usize> {
        let slot = ident_to_slot(inode.ident).ok_or(VfsError::BackendFailure)?;
        let mut pipes = self.pipes.lock();
        let pipe = pipes.get_mut(slot).ok_or(VfsError::BackendFailure)?;
        pipe.extend(buf);
        Ok(buf.len())
    }

    fn rmnode(&self, tree: &mut NodeTree, tnode: TnodeId) {
        let slot = ident_to_slot(tree.inode_of(tnode).ident);
        if let Err(err) = tree.remove(tnode) {
            warn!("pipefs: cannot remove {}: {err}", tree.path_of(tnode));
            return;
        }
        if let Some(slot) = slot {
            self.pipes.lock().try_remove(slot);
        }
    }
}

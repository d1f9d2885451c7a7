// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Terminal stream backend.
//!
//! The terminal is a single character device. Bytes written to it are queued
//! and handed back by the next reads, like a line echoed by the console.

use alloc::collections::VecDeque;

use kvfs::{
    FilesystemOps, Inode, InodeId, NodePermission, NodeTree, NodeType, TnodeId, VfsError,
    VfsResult, path,
};
use spin::Mutex;

/// `ioctl` request: drop every queued byte.
pub const TTY_FLUSH: u64 = 1;
/// `ioctl` request: number of queued bytes.
pub const TTY_PENDING: u64 = 2;

/// Stream-backed, temporary filesystem.
pub struct TtyFs {
    queue: Mutex<VecDeque<u8>>,
}

impl TtyFs {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl Default for TtyFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FilesystemOps for TtyFs {
    fn name(&self) -> &str {
        "ttyfs"
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

    fn open(&self, tree: &mut NodeTree, parent: InodeId, path: &str) -> VfsResult<TnodeId> {
        let mountpoint = tree.inode(parent).mountpoint.ok_or(VfsError::NotFound)?;
        let mount_path = tree.path_of(mountpoint);
        if path::components(path).eq(path::components(&mount_path)) {
            Ok(mountpoint)
        } else {
            debug!("ttyfs: nothing to open at {path}");
            Err(VfsError::NotFound)
        }
    }

    fn read(&self, _inode: &Inode, _offset: u64, buf: &mut [u8]) -> VfsResult<usize> {
        let mut queue = self.queue.lock();
        let len = buf.len().min(queue.len());
        for (dst, src) in buf.iter_mut().zip(queue.drain(..len)) {
            *dst = src;
        }
        Ok(len)
    }

    fn write(&self, _inode: &mut Inode, _offset: u64, buf: &[u8]) -> VfsResult<usize> {
        self.queue.lock().extend(buf);
        Ok(buf.len())
    }

    fn ioctl(&self, _inode: &Inode, request: u64, _arg: u64) -> VfsResult<i64> {
        let mut queue = self.queue.lock();
        match request {
            TTY_FLUSH => {
                queue.clear();
                Ok(0)
            }
            TTY_PENDING => Ok(queue.len() as i64),
            _ => Err(VfsError::Unsupported),
        }
    }
}

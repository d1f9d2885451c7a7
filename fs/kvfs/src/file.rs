// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Open-file descriptors and the handle table.

use alloc::string::String;

use hashbrown::HashMap;

use crate::{Handle, InodeId, MIN_HANDLE, OpenMode, TnodeId, VfsError, VfsResult};

/// State behind one open handle.
#[derive(Debug, Clone)]
pub struct NodeDesc {
    /// Path the node was opened with.
    pub path: String,
    pub tnode: TnodeId,
    pub inode: InodeId,
    /// Byte offset for files, entry index for folders.
    pub seek: u64,
    pub mode: OpenMode,
}

impl NodeDesc {
    pub fn new(path: &str, tnode: TnodeId, inode: InodeId, mode: OpenMode) -> Self {
        Self {
            path: String::from(path),
            tnode,
            inode,
            seek: 0,
            mode,
        }
    }
}

/// Maps handles to descriptors. Handle values are never reused.
#[derive(Debug)]
pub struct FileTable {
    files: HashMap<Handle, NodeDesc>,
    next: i64,
}

impl FileTable {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            next: MIN_HANDLE,
        }
    }

    /// Registers `desc` under a fresh handle.
    pub fn insert(&mut self, desc: NodeDesc) -> Handle {
        let handle = Handle::from_raw(self.next);
        self.next += 1;
        self.files.insert(handle, desc);
        handle
    }

    pub fn get(&self, handle: Handle) -> VfsResult<&NodeDesc> {
        self.files.get(&handle).ok_or(VfsError::InvalidHandle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> VfsResult<&mut NodeDesc> {
        self.files.get_mut(&handle).ok_or(VfsError::InvalidHandle)
    }

    pub fn remove(&mut self, handle: Handle) -> VfsResult<NodeDesc> {
        self.files.remove(&handle).ok_or(VfsError::InvalidHandle)
    }

    /// Number of open handles.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}

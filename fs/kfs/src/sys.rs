// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Signed-status file calls.
//!
//! Every call returns a count, a position or a handle on success and a
//! negative errno on failure, with the exceptions noted on each call.
//! [`Syscalls`] works on any [`Vfs`]; the `sys_*` functions use [`ROOT_VFS`].

use kvfs::{
    DirEntry, Handle, INVALID_HANDLE, NodePermission, NodeType, OpenMode, SeekWhence, Vfs,
    VfsError, VfsResult,
};

use crate::ROOT_VFS;

pub const MODE_READ: i64 = 0;
pub const MODE_READWRITE: i64 = 1;

pub const SEEK_CUR: i64 = 1;
pub const SEEK_END: i64 = 2;
pub const SEEK_SET: i64 = 3;

fn status(result: VfsResult<()>) -> i64 {
    match result {
        Ok(()) => 0,
        Err(err) => err.as_status(),
    }
}

fn count(result: VfsResult<usize>) -> i64 {
    match result {
        Ok(n) => n as i64,
        Err(err) => err.as_status(),
    }
}

fn whence(code: i64, offset: i64) -> VfsResult<SeekWhence> {
    match code {
        SEEK_SET => Ok(SeekWhence::Start(offset)),
        SEEK_CUR => Ok(SeekWhence::Current(offset)),
        SEEK_END => Ok(SeekWhence::End(offset)),
        _ => Err(VfsError::OutOfBounds),
    }
}

/// Signed-status view of a [`Vfs`].
#[derive(Clone, Copy)]
pub struct Syscalls<'a> {
    vfs: &'a Vfs,
}

impl<'a> Syscalls<'a> {
    pub fn new(vfs: &'a Vfs) -> Self {
        Self { vfs }
    }

    /// `node_type` uses the `DT_*` codes.
    pub fn create(&self, path: &str, node_type: u8) -> i64 {
        status(self.vfs.create(path, NodeType::from(node_type)))
    }

    pub fn chmod(&self, handle: i64, perm: u32) -> i64 {
        let perm = NodePermission::from_bits_truncate(perm as u16 & 0o777);
        status(self.vfs.chmod(Handle::from_raw(handle), perm))
    }

    pub fn ioctl(&self, handle: i64, request: u64, arg: u64) -> i64 {
        match self.vfs.ioctl(Handle::from_raw(handle), request, arg) {
            Ok(ret) => ret,
            Err(err) => err.as_status(),
        }
    }

    pub fn mount(&self, device: Option<&str>, target: &str, fs_name: &str) -> i64 {
        status(self.vfs.mount(device, target, fs_name))
    }

    pub fn unlink(&self, path: &str) -> i64 {
        status(self.vfs.unlink(path))
    }

    /// Returns [`INVALID_HANDLE`] on any failure.
    pub fn open(&self, path: &str, mode: i64) -> i64 {
        OpenMode::try_from(mode)
            .and_then(|mode| self.vfs.open(path, mode))
            .map_or(INVALID_HANDLE, Handle::raw)
    }

    pub fn close(&self, handle: i64) -> i64 {
        status(self.vfs.close(Handle::from_raw(handle)))
    }

    pub fn read(&self, handle: i64, buf: &mut [u8]) -> i64 {
        count(self.vfs.read(Handle::from_raw(handle), buf))
    }

    /// A read-only handle writes nothing and reports 0.
    pub fn write(&self, handle: i64, buf: &[u8]) -> i64 {
        match self.vfs.write(Handle::from_raw(handle), buf) {
            Err(VfsError::ReadOnlyHandle) => 0,
            result => count(result),
        }
    }

    /// `whence` is one of [`SEEK_SET`], [`SEEK_CUR`] or [`SEEK_END`].
    pub fn seek(&self, handle: i64, offset: i64, whence_code: i64) -> i64 {
        match whence(whence_code, offset).and_then(|w| self.vfs.seek(Handle::from_raw(handle), w))
        {
            Ok(pos) => pos as i64,
            Err(err) => err.as_status(),
        }
    }

    /// Size of the node, 0 for an unknown handle.
    pub fn tell(&self, handle: i64) -> i64 {
        self.vfs.tell(Handle::from_raw(handle)) as i64
    }

    pub fn refresh(&self, handle: i64) -> i64 {
        status(self.vfs.refresh(Handle::from_raw(handle)))
    }

    /// Fills `dirent` and returns 1, or returns 0 once the folder is
    /// exhausted.
    pub fn getdent(&self, handle: i64, dirent: &mut DirEntry) -> i64 {
        match self.vfs.getdent(Handle::from_raw(handle)) {
            Ok(Some(entry)) => {
                *dirent = entry;
                1
            }
            Ok(None) => 0,
            Err(err) => err.as_status(),
        }
    }
}

fn root() -> Option<Syscalls<'static>> {
    let vfs = ROOT_VFS.get();
    if vfs.is_none() {
        error!("VFS: file call before init_filesystems");
    }
    vfs.map(Syscalls::new)
}

fn not_ready() -> i64 {
    VfsError::Unsupported.as_status()
}

pub fn sys_create(path: &str, node_type: u8) -> i64 {
    root().map_or_else(not_ready, |sys| sys.create(path, node_type))
}

pub fn sys_chmod(handle: i64, perm: u32) -> i64 {
    root().map_or_else(not_ready, |sys| sys.chmod(handle, perm))
}

pub fn sys_ioctl(handle: i64, request: u64, arg: u64) -> i64 {
    root().map_or_else(not_ready, |sys| sys.ioctl(handle, request, arg))
}

pub fn sys_mount(device: Option<&str>, target: &str, fs_name: &str) -> i64 {
    root().map_or_else(not_ready, |sys| sys.mount(device, target, fs_name))
}

pub fn sys_unlink(path: &str) -> i64 {
    root().map_or_else(not_ready, |sys| sys.unlink(path))
}

pub fn sys_open(path: &str, mode: i64) -> i64 {
    root().map_or(INVALID_HANDLE, |sys| sys.open(path, mode))
}

pub fn sys_close(handle: i64) -> i64 {
    root().map_or_else(not_ready, |sys| sys.close(handle))
}

pub fn sys_read(handle: i64, buf: &mut [u8]) -> i64 {
    root().map_or_else(not_ready, |sys| sys.read(handle, buf))
}

pub fn sys_write(handle: i64, buf: &[u8]) -> i64 {
    root().map_or_else(not_ready, |sys| sys.write(handle, buf))
}

pub fn sys_seek(handle: i64, offset: i64, whence: i64) -> i64 {
    root().map_or_else(not_ready, |sys| sys.seek(handle, offset, whence))
}

pub fn sys_tell(handle: i64) -> i64 {
    root().map_or(0, |sys| sys.tell(handle))
}

pub fn sys_refresh(handle: i64) -> i64 {
    root().map_or_else(not_ready, |sys| sys.refresh(handle))
}

pub fn sys_getdent(handle: i64, dirent: &mut DirEntry) -> i64 {
    root().map_or_else(not_ready, |sys| sys.getdent(handle, dirent))
}

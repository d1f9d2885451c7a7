// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Plain data types shared by the tree, the backends and the syscall surface.

use alloc::string::String;

use bitflags::bitflags;

use crate::{VfsError, VfsResult};

/// Node type.
///
/// Discriminants follow the Unix `DT_*` directory-entry numbering.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Unknown = 0o0,
    CharacterDevice = 0o2,
    Directory = 0o4,
    BlockDevice = 0o6,
    RegularFile = 0o10,
    Symlink = 0o12,
}

impl From<u8> for NodeType {
    fn from(value: u8) -> Self {
        match value {
            0o2 => Self::CharacterDevice,
            0o4 => Self::Directory,
            0o6 => Self::BlockDevice,
            0o10 => Self::RegularFile,
            0o12 => Self::Symlink,
            _ => Self::Unknown,
        }
    }
}

impl NodeType {
    /// Only folders may hold children.
    #[inline]
    pub const fn is_traversable(self) -> bool {
        matches!(self, Self::Directory)
    }

    /// File-type bits of `st_mode` (`S_IFMT` group).
    pub const fn mode_bits(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::CharacterDevice => S_IFCHR,
            Self::Directory => S_IFDIR,
            Self::BlockDevice => S_IFBLK,
            Self::RegularFile => S_IFREG,
            Self::Symlink => S_IFLNK,
        }
    }

    /// Permissions given to nodes created by path resolution.
    pub const fn default_permission(self) -> NodePermission {
        match self {
            Self::Directory => NodePermission::RWX_ALL,
            _ => NodePermission::from_bits_truncate(0o666),
        }
    }
}

pub const S_IFMT: u32 = 0o170000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IFBLK: u32 = 0o060000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFCHR: u32 = 0o020000;

bitflags! {
    /// Node permission mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodePermission: u16 {
        const OWNER_READ = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXEC = 0o100;

        const GROUP_READ = 0o40;
        const GROUP_WRITE = 0o20;
        const GROUP_EXEC = 0o10;

        const OTHER_READ = 0o4;
        const OTHER_WRITE = 0o2;
        const OTHER_EXEC = 0o1;

        /// Mask accepted by `chmod`.
        const RWX_ALL = 0o777;
    }
}

impl Default for NodePermission {
    fn default() -> Self {
        Self::from_bits_truncate(0o666)
    }
}

/// Access mode requested at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    ReadWrite,
}

impl OpenMode {
    pub const fn can_write(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// Origin of a seek.
///
/// `End(k)` lands `k` bytes *before* the end of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    Start(i64),
    Current(i64),
    End(i64),
}

/// A point in time, seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timespec {
    pub sec: i64,
    pub nsec: u32,
}

impl Timespec {
    pub const fn from_secs(sec: i64) -> Self {
        Self { sec, nsec: 0 }
    }
}

/// Stat record kept on every tnode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub dev: u64,
    pub ino: u64,
    pub nlink: u32,
    pub mode: u32,
    pub atime: Timespec,
    pub mtime: Timespec,
    pub ctime: Timespec,
    pub size: u64,
}

impl Stat {
    /// Permission part of `mode`.
    pub fn permission(&self) -> NodePermission {
        NodePermission::from_bits_truncate((self.mode & 0o7777) as u16)
    }

    /// Node type encoded in `mode`.
    pub fn node_type(&self) -> NodeType {
        match self.mode & S_IFMT {
            S_IFCHR => NodeType::CharacterDevice,
            S_IFDIR => NodeType::Directory,
            S_IFBLK => NodeType::BlockDevice,
            S_IFREG => NodeType::RegularFile,
            S_IFLNK => NodeType::Symlink,
            _ => NodeType::Unknown,
        }
    }
}

/// A directory entry, either enumerated by a backend or returned by
/// [`Vfs::getdent`](crate::Vfs::getdent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub node_type: NodeType,
    pub size: u64,
    pub time: Timespec,
    /// Backend-private identifier copied into the inode on refresh.
    pub ident: u64,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            size: 0,
            time: Timespec::default(),
            ident: 0,
        }
    }
}

impl Default for DirEntry {
    fn default() -> Self {
        Self::new(String::new(), NodeType::Unknown)
    }
}

/// Opaque handle to an open-file descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(i64);

/// First handle value issued; lower values belong to the standard streams.
pub const MIN_HANDLE: i64 = 3;

/// Sentinel returned across the syscall boundary when `open` fails.
pub const INVALID_HANDLE: i64 = -1;

impl Handle {
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for OpenMode {
    type Error = VfsError;

    fn try_from(value: i64) -> VfsResult<Self> {
        match value {
            0 => Ok(Self::Read),
            1 => Ok(Self::ReadWrite),
            _ => Err(VfsError::Unsupported),
        }
    }
}

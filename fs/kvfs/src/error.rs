// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! VFS error kinds.

use linux_raw_sys::errno;
use strum::Display;

/// Failure kinds reported by VFS operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum VfsError {
    /// A path component does not exist.
    #[strum(to_string = "no such file or directory")]
    NotFound,
    /// The leaf exists and creation asked to fail on existing entries.
    #[strum(to_string = "file exists")]
    AlreadyExists,
    /// An intermediate path component is not a folder.
    #[strum(to_string = "not a directory")]
    NotADirectory,
    /// Directory enumeration on a node that is not a folder.
    #[strum(to_string = "node is not traversable")]
    NotTraversable,
    /// The mount source is not a block device.
    #[strum(to_string = "block device required")]
    NotABlockDevice,
    /// The mount target is missing, not a folder, non-empty or busy.
    #[strum(to_string = "invalid mount target")]
    MountTargetInvalid,
    /// No filesystem is registered under the requested name.
    #[strum(to_string = "unknown filesystem")]
    UnknownFilesystem,
    /// The mount source path does not exist.
    #[strum(to_string = "no such device")]
    DeviceNotFound,
    /// The handle is not in the open-file table.
    #[strum(to_string = "bad file handle")]
    InvalidHandle,
    /// The handle was opened read-only.
    #[strum(to_string = "handle is read-only")]
    ReadOnlyHandle,
    /// A seek target lies outside the file.
    #[strum(to_string = "offset out of bounds")]
    OutOfBounds,
    /// The node still has additional hard links.
    #[strum(to_string = "node has remaining links")]
    LinksRemain,
    /// The node was already unlinked.
    #[strum(to_string = "node already unlinked")]
    AlreadyUnlinked,
    /// A backend hook reported failure.
    #[strum(to_string = "filesystem backend failure")]
    BackendFailure,
    /// The backend does not implement the requested hook.
    #[strum(to_string = "operation not supported")]
    Unsupported,
}

impl VfsError {
    /// Linux errno value for this error kind.
    pub const fn errno(self) -> i32 {
        let code = match self {
            Self::NotFound | Self::AlreadyUnlinked => errno::ENOENT,
            Self::AlreadyExists => errno::EEXIST,
            Self::NotADirectory | Self::NotTraversable => errno::ENOTDIR,
            Self::NotABlockDevice => errno::ENOTBLK,
            Self::MountTargetInvalid => errno::EBUSY,
            Self::UnknownFilesystem => errno::ENODEV,
            Self::DeviceNotFound => errno::ENXIO,
            Self::InvalidHandle => errno::EBADF,
            Self::ReadOnlyHandle => errno::EACCES,
            Self::OutOfBounds => errno::EINVAL,
            Self::LinksRemain => errno::EMLINK,
            Self::BackendFailure => errno::EIO,
            Self::Unsupported => errno::EOPNOTSUPP,
        };
        code as i32
    }

    /// Negative status as returned across the syscall boundary.
    pub const fn as_status(self) -> i64 {
        -(self.errno() as i64)
    }
}

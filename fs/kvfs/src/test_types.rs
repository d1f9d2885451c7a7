// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

#![cfg(test)]

use crate::{
    Handle, NodePermission, NodeType, OpenMode, S_IFCHR, S_IFDIR, Stat, VfsError,
    types::{INVALID_HANDLE, MIN_HANDLE},
};

#[test]
fn test_node_type_conversion() {
    // Test NodeType from u8 conversion
    assert_eq!(NodeType::from(0o2), NodeType::CharacterDevice);
    assert_eq!(NodeType::from(0o4), NodeType::Directory);
    assert_eq!(NodeType::from(0o6), NodeType::BlockDevice);
    assert_eq!(NodeType::from(0o10), NodeType::RegularFile);
    assert_eq!(NodeType::from(0o12), NodeType::Symlink);

    // Test unknown/invalid values
    assert_eq!(NodeType::from(0o0), NodeType::Unknown);
    assert_eq!(NodeType::from(0o77), NodeType::Unknown);

    // Only folders are traversable
    assert!(NodeType::Directory.is_traversable());
    assert!(!NodeType::RegularFile.is_traversable());
    assert!(!NodeType::CharacterDevice.is_traversable());
}

#[test]
fn test_node_permission_bitflags() {
    let rwx = NodePermission::OWNER_READ | NodePermission::OWNER_WRITE | NodePermission::OWNER_EXEC;
    assert_eq!(rwx.bits(), 0o700);
    assert!(!rwx.contains(NodePermission::GROUP_READ));

    // Test default permissions (0o666)
    let default = NodePermission::default();
    assert_eq!(default.bits(), 0o666);
    assert!(!default.contains(NodePermission::OWNER_EXEC));

    assert_eq!(NodeType::Directory.default_permission().bits(), 0o777);
    assert_eq!(NodeType::RegularFile.default_permission().bits(), 0o666);

    // Bits outside rwx are dropped
    assert_eq!(NodePermission::from_bits_truncate(0o4755).bits(), 0o755);
}

#[test]
fn test_stat_mode_split() {
    let st = Stat {
        mode: S_IFDIR | 0o755,
        ..Default::default()
    };
    assert_eq!(st.node_type(), NodeType::Directory);
    assert_eq!(st.permission().bits(), 0o755);

    let st = Stat {
        mode: NodeType::CharacterDevice.mode_bits() | 0o666,
        ..Default::default()
    };
    assert_eq!(st.mode & S_IFCHR, S_IFCHR);
    assert_eq!(st.node_type(), NodeType::CharacterDevice);
}

#[test]
fn test_open_mode_codes() {
    assert_eq!(OpenMode::try_from(0), Ok(OpenMode::Read));
    assert_eq!(OpenMode::try_from(1), Ok(OpenMode::ReadWrite));
    assert_eq!(OpenMode::try_from(7), Err(VfsError::Unsupported));
    assert!(!OpenMode::Read.can_write());
    assert!(OpenMode::ReadWrite.can_write());
}

#[test]
fn test_handle_constants() {
    assert_eq!(Handle::from_raw(MIN_HANDLE).raw(), 3);
    assert!(INVALID_HANDLE < MIN_HANDLE);
}

#[test]
fn test_error_codes() {
    assert_eq!(VfsError::NotFound.as_status(), -2);
    assert_eq!(VfsError::InvalidHandle.as_status(), -9);
    assert_eq!(VfsError::AlreadyExists.as_status(), -17);
    assert!(VfsError::BackendFailure.errno() > 0);
    assert_eq!(VfsError::AlreadyExists.to_string(), "file exists");
}

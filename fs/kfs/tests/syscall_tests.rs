// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Tests for the signed-status file calls


use kfs::{
    ROOT_VFS, init_filesystems,
    sys::{self, MODE_READ, MODE_READWRITE, SEEK_CUR, SEEK_END, SEEK_SET, Syscalls},
};
use kvfs::{DirEntry, INVALID_HANDLE, MIN_HANDLE, NodeType, VfsError};
use test_helpers::*;

const DT_REG: u8 = 0o10;
const DT_DIR: u8 = 0o4;

#[test]
fn test_open_failure_returns_invalid_handle() {
    let vfs = setup_booted_vfs();
    let sys = Syscalls::new(&vfs);

    assert_eq!(sys.open("/missing", MODE_READ), INVALID_HANDLE);
    // Unknown open mode
    assert_eq!(sys.open("/HELLOWLD.TXT", 7), INVALID_HANDLE);
    assert!(sys.open("/HELLOWLD.TXT", MODE_READ) >= MIN_HANDLE);
}

#[test]
fn test_failures_are_negative_errno() {
    let vfs = setup_booted_vfs();
    let sys = Syscalls::new(&vfs);

    assert_eq!(sys.create("/disk", DT_DIR), VfsError::AlreadyExists.as_status());
    assert_eq!(sys.unlink("/missing"), VfsError::NotFound.as_status());
    assert_eq!(sys.close(999), VfsError::InvalidHandle.as_status());
    assert_eq!(
        sys.mount(None, "/disk", "fat32"),
        VfsError::UnknownFilesystem.as_status()
    );
    assert_eq!(sys.refresh(999), VfsError::InvalidHandle.as_status());
    assert!(sys.read(999, &mut [0u8; 4]) < 0);
}

#[test]
fn test_file_round_trip_through_calls() {
    let vfs = setup_booted_vfs();
    let sys = Syscalls::new(&vfs);

    // Arrange
    assert_eq!(sys.create("/disk/log.txt", DT_REG), 0);
    let fh = sys.open("/disk/log.txt", MODE_READWRITE);
    assert!(fh >= MIN_HANDLE);

    // Act
    assert_eq!(sys.write(fh, b"0123456789"), 10);
    assert_eq!(sys.tell(fh), 10);
    assert_eq!(sys.seek(fh, 4, SEEK_SET), 4);
    assert_eq!(sys.seek(fh, 2, SEEK_CUR), 6);
    assert_eq!(sys.seek(fh, 3, SEEK_END), 7);
    let mut buf = [0u8; 8];
    let n = sys.read(fh, &mut buf);

    // Assert
    assert_eq!(n, 3);
    assert_eq!(&buf[..3], b"789");
    assert_eq!(sys.seek(fh, 11, SEEK_SET), VfsError::OutOfBounds.as_status());
    assert_eq!(sys.seek(fh, 0, 0), VfsError::OutOfBounds.as_status());
    assert_eq!(sys.close(fh), 0);
    assert_eq!(sys.tell(fh), 0);
}

#[test]
fn test_read_only_write_reports_zero() {
    let vfs = setup_booted_vfs();
    let sys = Syscalls::new(&vfs);
    let fh = sys.open("/HELLOWLD.TXT", MODE_READ);

    assert_eq!(sys.write(fh, b"nope"), 0);
    assert_eq!(sys.chmod(fh, 0o600), VfsError::ReadOnlyHandle.as_status());
    assert_eq!(sys.tell(fh), HELLO.len() as i64);
}

#[test]
fn test_chmod_masks_bits() {
    let vfs = setup_booted_vfs();
    let sys = Syscalls::new(&vfs);
    let fh = sys.open("/HELLOWLD.TXT", MODE_READWRITE);

    assert_eq!(sys.chmod(fh, 0o104_640), 0);

    let st = vfs.stat("/HELLOWLD.TXT").unwrap();
    assert_eq!(st.permission().bits(), 0o640);
    assert_eq!(st.node_type(), NodeType::RegularFile);
}

#[test]
fn test_getdent_codes() {
    let vfs = setup_booted_vfs();
    let sys = Syscalls::new(&vfs);
    let fh = sys.open("/dev", MODE_READ);
    let mut dirent = DirEntry::default();

    assert_eq!(sys.getdent(fh, &mut dirent), 1);
    assert_eq!(dirent.name, "tty");
    assert_eq!(dirent.node_type, NodeType::CharacterDevice);
    assert_eq!(sys.getdent(fh, &mut dirent), 1);
    assert_eq!(dirent.name, "pipe");
    assert_eq!(sys.getdent(fh, &mut dirent), 0);
    assert_eq!(sys.getdent(fh, &mut dirent), 0);

    let file = sys.open("/HELLOWLD.TXT", MODE_READ);
    assert_eq!(
        sys.getdent(file, &mut dirent),
        VfsError::NotTraversable.as_status()
    );
}

#[test]
fn test_global_vfs() {
    init_logger();

    // Act: the first call builds, the second returns the same instance
    let first = init_filesystems(test_config()).unwrap();
    let second = init_filesystems(test_config()).unwrap();

    // Assert
    assert!(core::ptr::eq(first, second));
    assert!(ROOT_VFS.get().is_some());

    let fh = sys::sys_open("/HELLOWLD.TXT", MODE_READ);
    assert!(fh >= MIN_HANDLE);
    let mut buf = [0u8; 64];
    assert_eq!(sys::sys_read(fh, &mut buf), HELLO.len() as i64);
    assert_eq!(sys::sys_tell(fh), HELLO.len() as i64);
    assert_eq!(sys::sys_close(fh), 0);
    assert_eq!(sys::sys_tell(fh), 0);

    let tty = sys::sys_open("/dev/tty", MODE_READWRITE);
    assert_eq!(sys::sys_write(tty, b"hi"), 2);
    assert_eq!(sys::sys_ioctl(tty, kfs::TTY_PENDING, 0), 2);
}

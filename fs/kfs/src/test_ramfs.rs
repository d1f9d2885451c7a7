// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Unit tests for the ramfs image table.

#![cfg(test)]

use alloc::{sync::Arc, vec::Vec};

use kvfs::{FilesystemOps, IdAllocator, Inode, NodePermission, NodeTree, NodeType, VfsError};

use crate::RamFs;

fn mounted(fs: &RamFs) -> (NodeTree, Inode) {
    let mut tree = NodeTree::new(Arc::new(IdAllocator::new()));
    let id = fs.mount(&mut tree, None).unwrap();
    let root = tree.free_inode(id).unwrap();
    (tree, root)
}

fn names(fs: &RamFs, dir: &Inode) -> Vec<alloc::string::String> {
    (0..)
        .map_while(|i| fs.getdent(dir, i))
        .map(|e| e.name)
        .collect()
}

#[test]
fn test_image_builds_folders() {
    let fs = RamFs::new();
    fs.add_file("/etc/motd", b"hi").unwrap();
    fs.add_file("/etc/hosts", b"").unwrap();
    fs.add_dir("/tmp").unwrap();

    let (_tree, root) = mounted(&fs);
    assert_eq!(root.node_type, NodeType::Directory);
    assert_eq!(names(&fs, &root), ["etc", "tmp"]);

    let etc = fs.getdent(&root, 0).unwrap();
    assert_eq!(etc.node_type, NodeType::Directory);
    let mut etc_inode = Inode::new(NodeType::Directory, NodePermission::RWX_ALL, 0);
    etc_inode.ident = etc.ident;
    assert_eq!(names(&fs, &etc_inode), ["motd", "hosts"]);
    assert_eq!(fs.getdent(&etc_inode, 0).unwrap().size, 2);
}

#[test]
fn test_image_rejects_conflicts() {
    let fs = RamFs::new();
    fs.add_file("/a", b"x").unwrap();

    assert_eq!(fs.add_file("/a", b"y"), Err(VfsError::AlreadyExists));
    assert_eq!(fs.add_file("/a/b", b"y"), Err(VfsError::NotADirectory));
    assert_eq!(fs.add_dir("/"), Err(VfsError::AlreadyExists));
}

#[test]
fn test_storage_is_allocated_on_first_write() {
    let fs = RamFs::new();
    let before = fs.len();
    let mut inode = Inode::new(NodeType::RegularFile, NodePermission::default(), 0);

    // Nothing to read before the first write
    let mut buf = [0u8; 4];
    assert_eq!(fs.read(&inode, 0, &mut buf).unwrap(), 0);

    fs.write(&mut inode, 2, b"ab").unwrap();
    assert_ne!(inode.ident, 0);
    assert_eq!(fs.len(), before + 1);
    assert_eq!(fs.read(&inode, 0, &mut buf).unwrap(), 4);
    assert_eq!(&buf, b"\0\0ab");
}

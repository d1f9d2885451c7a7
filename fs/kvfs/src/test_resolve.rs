// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Unit tests for the node tree and the path resolver.

#![cfg(test)]

use alloc::sync::Arc;

use crate::{CreatePolicy, IdAllocator, NodeTree, NodeType, VfsError};

fn tree() -> NodeTree {
    NodeTree::new(Arc::new(IdAllocator::new()))
}

#[test]
fn test_create_then_lookup_same_node() {
    let mut tree = tree();

    // Act: create with intermediates, then resolve without creating
    let created = tree
        .resolve("/a/b/c", CreatePolicy::CREATE, NodeType::RegularFile)
        .unwrap();
    let found = tree.lookup("/a/b/c").unwrap();

    // Assert
    assert_eq!(created, found);
    assert_eq!(tree.inode_of(found).node_type, NodeType::RegularFile);
    let b = tree.lookup("/a/b").unwrap();
    assert_eq!(tree.inode_of(b).node_type, NodeType::Directory);
    assert_eq!(tree.path_of(found), "/a/b/c");
}

#[test]
fn test_new_nodes_inherit_device_and_get_fresh_ino() {
    let mut tree = tree();
    let root_dev = tree.tnode(tree.root()).st.dev;

    let a = tree
        .resolve("/a", CreatePolicy::CREATE, NodeType::Directory)
        .unwrap();
    let f = tree
        .resolve("/a/f", CreatePolicy::CREATE, NodeType::RegularFile)
        .unwrap();

    let (sa, sf) = (tree.tnode(a).st, tree.tnode(f).st);
    assert_eq!(sa.dev, root_dev);
    assert_eq!(sf.dev, root_dev);
    assert!(sf.ino > sa.ino);
    assert_eq!(sf.nlink, 1);
    assert_eq!(sa.permission().bits(), 0o777);
    assert_eq!(sf.permission().bits(), 0o666);
    assert_eq!(sf.node_type(), NodeType::RegularFile);
}

#[test]
fn test_lookup_missing_is_not_found() {
    let mut tree = tree();
    tree.resolve("/a", CreatePolicy::CREATE, NodeType::Directory)
        .unwrap();

    assert_eq!(tree.lookup("/a/missing"), Err(VfsError::NotFound));
    assert_eq!(
        tree.resolve("/missing/x", CreatePolicy::NO_CREATE, NodeType::Unknown),
        Err(VfsError::NotFound)
    );
    // Nothing was created by the failed lookups
    assert_eq!(tree.len(), 2);
}

#[test]
fn test_err_on_exist() {
    let mut tree = tree();
    let policy = CreatePolicy::CREATE | CreatePolicy::ERR_ON_EXIST;

    tree.resolve("/f", policy, NodeType::RegularFile).unwrap();
    assert_eq!(
        tree.resolve("/f", policy, NodeType::RegularFile),
        Err(VfsError::AlreadyExists)
    );

    // Plain CREATE returns the existing node
    let again = tree
        .resolve("/f", CreatePolicy::CREATE, NodeType::RegularFile)
        .unwrap();
    assert_eq!(again, tree.lookup("/f").unwrap());
}

#[test]
fn test_descend_through_file_fails() {
    let mut tree = tree();
    tree.resolve("/f", CreatePolicy::CREATE, NodeType::RegularFile)
        .unwrap();

    assert_eq!(tree.lookup("/f/x"), Err(VfsError::NotADirectory));
    assert_eq!(
        tree.resolve("/f/x", CreatePolicy::CREATE, NodeType::RegularFile),
        Err(VfsError::NotADirectory)
    );
}

#[test]
fn test_dot_and_dotdot() {
    let mut tree = tree();
    let b = tree
        .resolve("/a/b", CreatePolicy::CREATE, NodeType::Directory)
        .unwrap();
    let a = tree.lookup("/a").unwrap();

    assert_eq!(tree.lookup("/a/./b").unwrap(), b);
    assert_eq!(tree.lookup("/a/b/..").unwrap(), a);
    // The root is its own parent
    assert_eq!(tree.lookup("/../..").unwrap(), tree.root());
    assert_eq!(tree.lookup("//a//b/").unwrap(), b);
}

#[test]
fn test_children_keep_creation_order() {
    let mut tree = tree();
    for name in ["/z", "/a", "/m"] {
        tree.resolve(name, CreatePolicy::CREATE, NodeType::RegularFile)
            .unwrap();
    }

    let root = tree.root();
    let names: alloc::vec::Vec<_> = tree
        .inode_of(root)
        .children
        .iter()
        .map(|&c| tree.tnode(c).name.clone())
        .collect();
    assert_eq!(names, ["z", "a", "m"]);
}

#[test]
fn test_remove_frees_subtree() {
    let mut tree = tree();
    tree.resolve("/a/b/c", CreatePolicy::CREATE, NodeType::RegularFile)
        .unwrap();
    let a = tree.lookup("/a").unwrap();
    let c = tree.lookup("/a/b/c").unwrap();

    tree.remove(a).unwrap();

    assert_eq!(tree.len(), 1);
    assert!(!tree.contains(c));
    assert_eq!(tree.lookup("/a"), Err(VfsError::NotFound));
    assert!(tree.inode_of(tree.root()).children.is_empty());

    // The root cannot be removed
    assert_eq!(tree.remove(tree.root()), Err(VfsError::Unsupported));
}

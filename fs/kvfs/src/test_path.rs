// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Unit tests for path splitting.

#![cfg(test)]

use alloc::vec::Vec;

use crate::path::{components, join, parent_dir};

#[test]
fn test_components_skip_empty() {
    // Repeated, leading and trailing separators vanish
    let parts: Vec<_> = components("//dev///tty/").collect();
    assert_eq!(parts, ["dev", "tty"]);

    assert_eq!(components("/").count(), 0);
    assert_eq!(components("").count(), 0);

    // Dots are kept for the resolver to interpret
    let parts: Vec<_> = components("/a/./b/..").collect();
    assert_eq!(parts, ["a", ".", "b", ".."]);
}

#[test]
fn test_components_bidirectional() {
    for path in ["/foo/bar/baz", "relative/path", "/", "a//b"] {
        let forward: Vec<_> = components(path).collect();
        let mut backward: Vec<_> = components(path).rev().collect();
        backward.reverse();
        assert_eq!(forward, backward, "Failed for path: {path}");
    }
}

#[test]
fn test_parent_dir() {
    assert_eq!(parent_dir("/dev/pipe/p0"), Some(("/dev/pipe", "p0")));
    assert_eq!(parent_dir("/disk"), Some(("/", "disk")));

    // Trailing and doubled separators
    assert_eq!(parent_dir("/dev/tty//"), Some(("/dev", "tty")));
    assert_eq!(parent_dir("/dev//tty"), Some(("/dev", "tty")));
    assert_eq!(parent_dir("//disk"), Some(("/", "disk")));
}

#[test]
fn test_parent_dir_without_parent() {
    assert_eq!(parent_dir("/"), None);
    assert_eq!(parent_dir("///"), None);
    assert_eq!(parent_dir(""), None);
    assert_eq!(parent_dir("file"), None);
}

#[test]
fn test_parent_dir_walk_terminates() {
    // Walking up from any path reaches "no parent" in a bounded number of steps
    let mut cur = "/a/b/c/d";
    let mut seen = Vec::new();
    while let Some((parent, _)) = parent_dir(cur) {
        seen.push(parent);
        cur = parent;
    }
    assert_eq!(seen, ["/a/b/c", "/a/b", "/a", "/"]);
}

#[test]
fn test_join() {
    assert_eq!(join("/", "disk"), "/disk");
    assert_eq!(join("/dev", "tty"), "/dev/tty");
    assert_eq!(join("/dev/", "/tty"), "/dev/tty");
}

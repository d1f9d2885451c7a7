// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Path splitting helpers.

use alloc::string::String;

/// Path separator.
pub const SEPARATOR: char = '/';
/// Current directory component.
pub const DOT: &str = ".";
/// Parent directory component.
pub const DOTDOT: &str = "..";

/// Iterates over the non-empty components of `path`.
///
/// Repeated, leading and trailing separators are ignored, so `"//a/b/"` yields
/// `"a"` then `"b"`.
pub fn components(path: &str) -> impl DoubleEndedIterator<Item = &str> {
    path.split(SEPARATOR).filter(|c| !c.is_empty())
}

/// Splits `path` into its parent directory and its last component.
///
/// Trailing separators are ignored. Returns `None` when there is no parent:
/// the root path, an empty path, or a single name without any separator.
///
/// ```
/// use kvfs::path::parent_dir;
///
/// assert_eq!(parent_dir("/dev/tty/"), Some(("/dev", "tty")));
/// assert_eq!(parent_dir("/dev"), Some(("/", "dev")));
/// assert_eq!(parent_dir("/"), None);
/// ```
pub fn parent_dir(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_end_matches(SEPARATOR);
    let idx = trimmed.rfind(SEPARATOR)?;
    let current = &trimmed[idx + 1..];
    let parent = trimmed[..idx].trim_end_matches(SEPARATOR);
    if parent.is_empty() {
        Some(("/", current))
    } else {
        Some((parent, current))
    }
}

/// Joins a directory path and an entry name with exactly one separator.
pub fn join(dir: &str, name: &str) -> String {
    let mut path = String::with_capacity(dir.len() + name.len() + 1);
    path.push_str(dir.trim_end_matches(SEPARATOR));
    path.push(SEPARATOR);
    path.push_str(name.trim_start_matches(SEPARATOR));
    path
}

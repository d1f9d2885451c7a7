// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Core of the kernel virtual filesystem.
//!
//! The VFS keeps one in-memory namespace (a tree of [`Tnode`]s owning
//! [`Inode`]s), resolves paths against it, dispatches to registered
//! filesystem backends through [`FilesystemOps`], and maps opaque
//! [`Handle`]s to open-file descriptors. All of it lives in a [`Vfs`] value
//! guarded by a single lock.
#![cfg_attr(not(test), no_std)]
#![allow(rustdoc::broken_intra_doc_links)]

extern crate alloc;

#[macro_use]
extern crate log;

mod error;
mod file;
mod fs;
mod ids;
mod mount;
mod node;
pub mod path;
mod resolve;
mod time;
mod types;
mod vfs;

mod test_path;
mod test_resolve;
mod test_types;

pub use error::*;
pub use file::*;
pub use fs::*;
pub use ids::*;
pub use node::*;
pub use resolve::*;
pub use time::*;
pub use types::*;
pub use vfs::*;

pub type VfsResult<T> = Result<T, VfsError>;

use spin::Mutex;

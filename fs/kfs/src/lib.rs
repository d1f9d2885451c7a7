// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Kernel filesystem initialization and the syscall-facing API.
#![cfg_attr(all(not(test), not(doc)), no_std)]

extern crate alloc;

#[macro_use]
extern crate log;

mod test_ramfs;
mod test_time;

pub(crate) mod fs;
pub mod sys;
pub mod time;

use alloc::{boxed::Box, sync::Arc};

use kvfs::{
    Clock, CreatePolicy, Filesystem, FixedClock, NodeType, OpenMode, Vfs, VfsResult,
};
use spin::Once;

pub use fs::{PipeFs, RamFs, TTY_FLUSH, TTY_PENDING, TtyFs};

/// The kernel-wide VFS, set up by [`init_filesystems`].
pub static ROOT_VFS: Once<Vfs> = Once::new();

/// Choices made when building the default tree.
pub struct InitConfig {
    /// Image mounted at `/`.
    pub ramfs: RamFs,
    pub clock: Box<dyn Clock>,
    /// Mount the terminal at `/dev/tty` and make it the stream handle.
    pub mount_tty: bool,
    /// Mount the pipe backend at `/dev/pipe`.
    pub mount_pipe: bool,
}

impl InitConfig {
    pub fn new(ramfs: RamFs, clock: impl Clock + 'static) -> Self {
        Self {
            ramfs,
            clock: Box::new(clock),
            mount_tty: true,
            mount_pipe: true,
        }
    }
}

impl Default for InitConfig {
    fn default() -> Self {
        Self::new(RamFs::new(), FixedClock::default())
    }
}

/// Initialize the filesystem subsystem and mount the root filesystem.
///
/// Only the first call builds anything; later calls return the same
/// instance and drop `config`.
pub fn init_filesystems(config: InitConfig) -> VfsResult<&'static Vfs> {
    ROOT_VFS.try_call_once(|| build_vfs(config))
}

/// Builds the default tree as an owned value:
///
/// ```text
/// /           ramfs, loaded from the image
/// ├── disk
/// └── dev
///     ├── tty   ttyfs, terminal stream
///     └── pipe  pipefs
/// ```
pub fn build_vfs(config: InitConfig) -> VfsResult<Vfs> {
    info!("Initialize filesystem subsystem...");
    let vfs = Vfs::new(config.clock);

    vfs.register(Filesystem::new(Arc::new(config.ramfs)));
    vfs.register(Filesystem::new(Arc::new(TtyFs::new())));
    vfs.register(Filesystem::new(Arc::new(PipeFs::new())));

    vfs.mount(None, "/", "ramfs")?;
    let root = vfs.open("/", OpenMode::ReadWrite)?;
    vfs.refresh(root)?;
    vfs.close(root)?;

    mkdir(&vfs, "/disk")?;
    mkdir(&vfs, "/dev")?;

    if config.mount_tty {
        mkdir(&vfs, "/dev/tty")?;
        vfs.mount(Some("tty"), "/dev/tty", "ttyfs")?;
        let tty = vfs.open("/dev/tty", OpenMode::ReadWrite)?;
        vfs.set_stream_handle(tty)?;
    }
    if config.mount_pipe {
        mkdir(&vfs, "/dev/pipe")?;
        vfs.mount(Some("pipe"), "/dev/pipe", "pipefs")?;
    }

    vfs.dump();
    info!("VFS initialization finished");
    Ok(vfs)
}

fn mkdir(vfs: &Vfs, path: &str) -> VfsResult<()> {
    vfs.with_tree(|tree| {
        tree.resolve(path, CreatePolicy::CREATE, NodeType::Directory)
            .map(drop)
    })
}

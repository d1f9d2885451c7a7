// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Filesystem backends built into the kernel.
mod pipefs;
mod ramfs;
mod ttyfs;

pub use pipefs::PipeFs;
pub use ramfs::RamFs;
pub use ttyfs::{TTY_FLUSH, TTY_PENDING, TtyFs};

/// Maps a backend storage slot to an inode ident. Ident 0 means "no storage".
const fn slot_to_ident(slot: usize) -> u64 {
    slot as u64 + 1
}

const fn ident_to_slot(ident: u64) -> Option<usize> {
    match ident {
        0 => None,
        _ => Some(ident as usize - 1),
    }
}

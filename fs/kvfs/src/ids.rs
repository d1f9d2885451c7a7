// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Device and node identifier allocators.

use crate::Mutex;

/// Issues `st_dev` and `st_ino` values.
///
/// Each counter has its own lock, held only for one increment, so ids can be
/// taken without touching the global VFS lock.
#[derive(Debug)]
pub struct IdAllocator {
    next_dev: Mutex<u64>,
    next_ino: Mutex<u64>,
}

impl IdAllocator {
    pub const fn new() -> Self {
        Self {
            next_dev: Mutex::new(1),
            next_ino: Mutex::new(1),
        }
    }

    /// Returns a fresh device id.
    pub fn new_dev_id(&self) -> u64 {
        let mut next = self.next_dev.lock();
        let id = *next;
        *next += 1;
        id
    }

    /// Returns a fresh node id.
    pub fn new_ino_id(&self) -> u64 {
        let mut next = self.next_ino.lock();
        let id = *next;
        *next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

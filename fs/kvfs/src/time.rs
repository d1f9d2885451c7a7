// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Time source used to stamp created nodes.

use alloc::boxed::Box;

use crate::Timespec;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Wall-clock source provided by the platform.
pub trait Clock: Send + Sync {
    /// Nanoseconds elapsed since boot.
    fn nanos_since_boot(&self) -> u64;

    /// Boot time in seconds since the Unix epoch.
    fn boot_time(&self) -> i64;

    /// Timestamp for file metadata. Whole seconds only.
    fn file_time(&self) -> Timespec {
        let now_sec = (self.nanos_since_boot() / NANOS_PER_SEC) as i64;
        Timespec::from_secs(now_sec + self.boot_time())
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn nanos_since_boot(&self) -> u64 {
        (**self).nanos_since_boot()
    }

    fn boot_time(&self) -> i64 {
        (**self).boot_time()
    }
}

/// A clock frozen at a given boot time, for early boot and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock {
    pub boot_time: i64,
    pub nanos_since_boot: u64,
}

impl FixedClock {
    pub const fn new(boot_time: i64, nanos_since_boot: u64) -> Self {
        Self {
            boot_time,
            nanos_since_boot,
        }
    }
}

impl Clock for FixedClock {
    fn nanos_since_boot(&self) -> u64 {
        self.nanos_since_boot
    }

    fn boot_time(&self) -> i64 {
        self.boot_time
    }
}

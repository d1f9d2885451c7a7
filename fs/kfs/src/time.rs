// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Wall-clock time for file metadata.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use kvfs::{Clock, Timespec};

pub use kvfs::FixedClock;

/// Broken-down calendar time as read from the real-time clock, in UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtcTime {
    pub year: i32,
    /// 1..=12
    pub month: u32,
    /// 1..=31
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl RtcTime {
    /// Decodes the BCD-encoded registers of a CMOS clock.
    ///
    /// `century` is the century register, or `None` on machines without one,
    /// in which case years 00..=69 are taken as 20xx.
    pub fn from_bcd(
        year: u8,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        century: Option<u8>,
    ) -> Self {
        let year = bcd(year) as i32;
        let century = match century {
            Some(c) => bcd(c) as i32,
            None if year < 70 => 20,
            None => 19,
        };
        Self {
            year: century * 100 + year,
            month: bcd(month),
            day: bcd(day),
            hour: bcd(hour),
            minute: bcd(minute),
            second: bcd(second),
        }
    }

    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }

    /// Seconds since the Unix epoch, `None` if the registers hold an invalid
    /// date.
    pub fn to_unix(&self) -> Option<i64> {
        Some(self.to_datetime()?.and_utc().timestamp())
    }
}

const fn bcd(v: u8) -> u32 {
    ((v >> 4) * 10 + (v & 0x0f)) as u32
}

/// Converts a file timestamp to calendar time, for listings.
pub fn to_datetime(ts: Timespec) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(ts.sec, ts.nsec).map(|dt| dt.naive_utc())
}

/// Clock combining a monotonic nanosecond counter with the boot time read from
/// the real-time clock.
pub struct BootClock<F> {
    boot_time: i64,
    nanos: F,
}

impl<F: Fn() -> u64 + Send + Sync> BootClock<F> {
    /// `rtc` is the calendar time read at boot, `nanos` the counter.
    pub fn new(rtc: RtcTime, nanos: F) -> Self {
        let boot_time = rtc.to_unix().unwrap_or_else(|| {
            warn!("RTC holds an invalid date {rtc:?}, using the epoch");
            0
        });
        info!("boot time: {boot_time}");
        Self { boot_time, nanos }
    }
}

impl<F: Fn() -> u64 + Send + Sync> Clock for BootClock<F> {
    fn nanos_since_boot(&self) -> u64 {
        (self.nanos)()
    }

    fn boot_time(&self) -> i64 {
        self.boot_time
    }
}

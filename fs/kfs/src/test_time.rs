// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

#![cfg(test)]

use chrono::NaiveDate;
use kvfs::{Clock, Timespec};

use crate::time::{BootClock, RtcTime, to_datetime};

#[test]
fn test_rtc_to_unix() {
    let rtc = RtcTime {
        year: 2024,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };
    assert_eq!(rtc.to_unix(), Some(1_704_067_200));

    let bad = RtcTime {
        month: 13,
        ..rtc
    };
    assert_eq!(bad.to_unix(), None);
}

#[test]
fn test_rtc_from_bcd() {
    let rtc = RtcTime::from_bcd(0x24, 0x12, 0x31, 0x23, 0x59, 0x58, None);
    assert_eq!(rtc.year, 2024);
    assert_eq!((rtc.month, rtc.day), (12, 31));
    assert_eq!((rtc.hour, rtc.minute, rtc.second), (23, 59, 58));

    let old = RtcTime::from_bcd(0x99, 0x01, 0x01, 0, 0, 0, None);
    assert_eq!(old.year, 1999);
    let explicit = RtcTime::from_bcd(0x05, 0x01, 0x01, 0, 0, 0, Some(0x21));
    assert_eq!(explicit.year, 2105);
}

#[test]
fn test_boot_clock_file_time() {
    let rtc = RtcTime {
        year: 1970,
        month: 1,
        day: 2,
        ..Default::default()
    };
    let clock = BootClock::new(rtc, || 3_500_000_000);

    assert_eq!(clock.boot_time(), 86_400);
    // Whole seconds only
    assert_eq!(clock.file_time(), Timespec::from_secs(86_403));
}

#[test]
fn test_invalid_rtc_falls_back_to_epoch() {
    let clock = BootClock::new(RtcTime::default(), || 0);
    assert_eq!(clock.boot_time(), 0);
}

#[test]
fn test_to_datetime() {
    let dt = to_datetime(Timespec::from_secs(1_704_067_200)).unwrap();
    let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    assert_eq!(dt, expected);
}

//! Conversion between C# `DateTime.Ticks` (100ns units since `0001-01-01
//! 00:00:00`) and [`chrono::NaiveDateTime`].
//!
//! Grounded on `original_source/Tools.py`'s `_CSHARP_EPOCH` and
//! `csharp_ticks_to_datetime`/`datetime_to_csharp_ticks` functions.
use chrono::{Duration, NaiveDate, NaiveDateTime};

const TICKS_PER_SECOND: i64 = 10_000_000;

fn csharp_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .expect("year 1 is a valid proleptic Gregorian date")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
}

/// Convert C# ticks into a calendar timestamp. Sub-second precision within
/// a tick's 100ns resolution that does not divide evenly into nanoseconds
/// is preserved by `chrono::Duration`'s nanosecond granularity.
pub fn csharp_to_datetime(ticks: i64) -> NaiveDateTime {
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * 100;
    let seconds = ticks.div_euclid(TICKS_PER_SECOND);
    csharp_epoch() + Duration::seconds(seconds) + Duration::nanoseconds(nanos)
}

/// Convert a calendar timestamp back into C# ticks, truncating to whole
/// seconds — matching the original source, which never reconstructs
/// sub-second ticks from a `datetime.datetime` (its resolution is
/// microseconds, not the game's own round trip).
pub fn datetime_to_csharp(datetime: NaiveDateTime) -> i64 {
    let delta = datetime - csharp_epoch();
    delta.num_seconds() * TICKS_PER_SECOND
}

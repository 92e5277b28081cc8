//! Helpers for turning a booking's market-local wall clock (`start_date` +
//! `start_time` + IANA zone) into `DateTime<Utc>` instants.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::helper_model::DriveshareError;
use crate::model::Booking;

/// Attach the market's IANA zone to a local date + time and convert to UTC.
/// DST fall-back makes some wall clocks ambiguous; we take the earliest
/// instant. Spring-forward gaps have no valid reading and are rejected.
pub fn local_to_utc(
    date: NaiveDate,
    time: NaiveTime,
    tz_name: &str,
) -> Result<DateTime<Utc>, DriveshareError> {
    let tz: Tz = tz_name
        .parse()
        .map_err(|_| DriveshareError::UnknownTimezone(tz_name.to_string()))?;
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)), // pick earliest
        LocalResult::None => Err(DriveshareError::InvalidLocalTime(format!(
            "{} {} in {}",
            date, time, tz_name
        ))),
    }
}

pub fn pickup_instant(booking: &Booking) -> Result<DateTime<Utc>, DriveshareError> {
    local_to_utc(
        booking.start_date,
        booking.start_time,
        &booking.pickup_timezone,
    )
}

pub fn drop_off_instant(booking: &Booking) -> Result<DateTime<Utc>, DriveshareError> {
    local_to_utc(booking.end_date, booking.end_time, &booking.pickup_timezone)
}

/// Signed hours from `now` to `target`; negative once the target has passed.
pub fn hours_until(target: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (target - now).num_minutes() as f64 / 60.0
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn chicago_winter_is_six_hours_behind() {
        let t = local_to_utc(date(2026, 1, 15), time(10, 0), "America/Chicago").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-01-15T16:00:00+00:00");
    }

    #[test]
    fn chicago_summer_is_five_hours_behind() {
        let t = local_to_utc(date(2026, 7, 15), time(10, 0), "America/Chicago").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-07-15T15:00:00+00:00");
    }

    #[test]
    fn fall_back_ambiguity_takes_the_earliest_instant() {
        // 2026-11-01 01:30 happens twice in Chicago; earliest is CDT (UTC-5)
        let t = local_to_utc(date(2026, 11, 1), time(1, 30), "America/Chicago").unwrap();
        assert_eq!(t.to_rfc3339(), "2026-11-01T06:30:00+00:00");
    }

    #[test]
    fn spring_forward_gap_is_rejected() {
        // 2026-03-08 02:30 does not exist in Chicago
        let err = local_to_utc(date(2026, 3, 8), time(2, 30), "America/Chicago").unwrap_err();
        assert!(err.to_string().contains("02:30"));
    }

    #[test]
    fn unknown_zone_name_is_rejected() {
        let err = local_to_utc(date(2026, 1, 15), time(10, 0), "Mars/Olympus").unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn hours_until_goes_negative_after_the_target() {
        let target = DateTime::parse_from_rfc3339("2026-03-10T16:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let before = target - chrono::Duration::hours(30);
        let after = target + chrono::Duration::minutes(90);
        assert_eq!(hours_until(target, before), 30.0);
        assert_eq!(hours_until(target, after), -1.5);
    }
}

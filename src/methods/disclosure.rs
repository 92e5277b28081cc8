use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::helper_model::{DriveshareError, GuestBookingView};
use crate::methods::booking_state::{display_tier, effective_state};
use crate::methods::timestamps;
use crate::model::{Booking, Host, LifecycleStatus, Vehicle};

pub const ACCESS_CODES_CUTOFF_HOURS: f64 = 1.0;
pub const FULL_DETAILS_CUTOFF_HOURS: f64 = 24.0;
pub const HOST_INTRO_CUTOFF_HOURS: f64 = 168.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressiveInfoLevel {
    Basic,
    HostIntro,
    FullDetails,
    AccessCodes,
    General,
}

impl ProgressiveInfoLevel {
    pub fn reveals_host_intro(&self) -> bool {
        matches!(
            self,
            ProgressiveInfoLevel::HostIntro
                | ProgressiveInfoLevel::FullDetails
                | ProgressiveInfoLevel::AccessCodes
        )
    }

    pub fn reveals_address(&self) -> bool {
        matches!(
            self,
            ProgressiveInfoLevel::FullDetails | ProgressiveInfoLevel::AccessCodes
        )
    }

    pub fn reveals_access_codes(&self) -> bool {
        matches!(self, ProgressiveInfoLevel::AccessCodes)
    }
}

/// What a guest may see right now, as a function of lifecycle status and
/// time to pickup. Anything not confirmed stays at basic: no host contact,
/// no exact address, regardless of how close pickup is.
pub fn info_level(
    booking: &Booking,
    now: DateTime<Utc>,
) -> Result<ProgressiveInfoLevel, DriveshareError> {
    if booking.status != LifecycleStatus::Confirmed {
        return Ok(ProgressiveInfoLevel::Basic);
    }
    let pickup = timestamps::pickup_instant(booking)?;
    let hours = timestamps::hours_until(pickup, now);
    if hours <= ACCESS_CODES_CUTOFF_HOURS && booking.has_keybox {
        Ok(ProgressiveInfoLevel::AccessCodes)
    } else if hours <= FULL_DETAILS_CUTOFF_HOURS {
        Ok(ProgressiveInfoLevel::FullDetails)
    } else if hours <= HOST_INTRO_CUTOFF_HOURS {
        Ok(ProgressiveInfoLevel::HostIntro)
    } else {
        Ok(ProgressiveInfoLevel::General)
    }
}

/// The only constructor of `GuestBookingView`. The sensitive fields are
/// dropped here, at the boundary that produces the view-model, so nothing a
/// rendering layer receives can leak them. This is a data-minimization
/// contract, not a UI nicety.
pub fn redact(
    booking: &Booking,
    host: &Host,
    vehicle: &Vehicle,
    has_open_dispute: bool,
    level: ProgressiveInfoLevel,
) -> GuestBookingView {
    let state = effective_state(booking);
    let tier = display_tier(&state);

    GuestBookingView {
        booking_code: booking.booking_code.clone(),
        status: booking.status,
        effective_state: state,
        display_tier: tier,
        info_level: level,

        start_date: booking.start_date,
        start_time: booking.start_time,
        end_date: booking.end_date,
        end_time: booking.end_time,
        pickup_timezone: booking.pickup_timezone.clone(),
        pickup_type: booking.pickup_type,
        trip_started_at: booking.trip_started_at,
        trip_ended_at: booking.trip_ended_at,

        vehicle_name: vehicle.name.clone(),
        vehicle_type: vehicle.vehicle_type.clone(),
        transmission: vehicle.transmission.clone(),
        seats: vehicle.seats,
        vehicle_image_link: vehicle.image_link.clone(),

        daily_rate: booking.daily_rate,
        number_of_days: booking.number_of_days,
        subtotal: booking.subtotal,
        service_fee: booking.service_fee,
        delivery_fee: booking.delivery_fee,
        insurance_fee: booking.insurance_fee,
        taxes: booking.taxes,
        deposit_amount: booking.deposit_amount,
        total_amount: booking.total_amount,
        insurance_source: booking.insurance_source,

        host_name: level
            .reveals_host_intro()
            .then(|| host.display_name.clone()),
        host_rating: level.reveals_host_intro().then(|| host.rating),
        host_response_minutes: level.reveals_host_intro().then(|| host.response_minutes),
        can_message_host: level.reveals_host_intro(),

        host_email: level.reveals_address().then(|| host.contact_email.clone()),
        host_phone: level.reveals_address().then(|| host.contact_phone.clone()),
        exact_address: if level.reveals_address() {
            booking.exact_address.clone()
        } else {
            None
        },
        parking_instructions: if level.reveals_address() {
            booking.parking_instructions.clone()
        } else {
            None
        },

        has_keybox: booking.has_keybox,
        keybox_code: if level.reveals_access_codes() {
            booking.keybox_code.clone()
        } else {
            None
        },

        has_open_dispute,
    }
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_fixtures::{sample_booking, sample_host, sample_vehicle};
    use chrono::Duration;

    // fixture pickup is 2026-03-10 10:00 America/Chicago (CDT) = 15:00Z
    fn pickup() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-10T15:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn unconfirmed_bookings_stay_basic_even_at_pickup_time() {
        let mut booking = sample_booking();
        booking.status = LifecycleStatus::Pending;
        let level = info_level(&booking, pickup()).unwrap();
        assert_eq!(level, ProgressiveInfoLevel::Basic);
    }

    #[test]
    fn twelve_hours_out_reveals_full_details() {
        let booking = sample_booking();
        let now = pickup() - Duration::hours(12);
        assert_eq!(
            info_level(&booking, now).unwrap(),
            ProgressiveInfoLevel::FullDetails
        );
    }

    #[test]
    fn thirty_minutes_out_with_keybox_reveals_access_codes() {
        let booking = sample_booking();
        let now = pickup() - Duration::minutes(30);
        assert_eq!(
            info_level(&booking, now).unwrap(),
            ProgressiveInfoLevel::AccessCodes
        );
    }

    #[test]
    fn thirty_minutes_out_without_keybox_stays_full_details() {
        let mut booking = sample_booking();
        booking.has_keybox = false;
        booking.keybox_code = None;
        let now = pickup() - Duration::minutes(30);
        assert_eq!(
            info_level(&booking, now).unwrap(),
            ProgressiveInfoLevel::FullDetails
        );
    }

    #[test]
    fn three_days_out_is_host_intro_ten_days_out_is_general() {
        let booking = sample_booking();
        assert_eq!(
            info_level(&booking, pickup() - Duration::days(3)).unwrap(),
            ProgressiveInfoLevel::HostIntro
        );
        assert_eq!(
            info_level(&booking, pickup() - Duration::days(10)).unwrap(),
            ProgressiveInfoLevel::General
        );
    }

    #[test]
    fn basic_and_host_intro_never_leak_sensitive_fields() {
        let booking = sample_booking();
        let host = sample_host();
        let vehicle = sample_vehicle();
        for level in [
            ProgressiveInfoLevel::Basic,
            ProgressiveInfoLevel::HostIntro,
            ProgressiveInfoLevel::General,
        ] {
            let view = redact(&booking, &host, &vehicle, false, level);
            assert!(view.exact_address.is_none(), "{:?} leaked address", level);
            assert!(
                view.parking_instructions.is_none(),
                "{:?} leaked parking instructions",
                level
            );
            assert!(view.keybox_code.is_none(), "{:?} leaked keybox code", level);
        }
    }

    #[test]
    fn host_intro_reveals_the_host_but_not_the_address() {
        let view = redact(
            &sample_booking(),
            &sample_host(),
            &sample_vehicle(),
            false,
            ProgressiveInfoLevel::HostIntro,
        );
        assert!(view.host_name.is_some());
        assert!(view.can_message_host);
        assert!(view.host_email.is_none());
        assert!(view.exact_address.is_none());
    }

    #[test]
    fn full_details_reveals_address_but_not_keybox_code() {
        let view = redact(
            &sample_booking(),
            &sample_host(),
            &sample_vehicle(),
            false,
            ProgressiveInfoLevel::FullDetails,
        );
        assert!(view.exact_address.is_some());
        assert!(view.parking_instructions.is_some());
        assert!(view.host_email.is_some());
        assert!(view.keybox_code.is_none());
    }

    #[test]
    fn access_codes_reveals_everything_gated() {
        let view = redact(
            &sample_booking(),
            &sample_host(),
            &sample_vehicle(),
            false,
            ProgressiveInfoLevel::AccessCodes,
        );
        assert_eq!(view.keybox_code.as_deref(), Some("4417"));
        assert!(view.exact_address.is_some());
    }
}

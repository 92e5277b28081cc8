use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::result::Error;
use rand::Rng;

use crate::helper_model::DriveshareError;
use crate::methods::booking_state::effective_state;
use crate::model::{Booking, LifecycleStatus, PaymentStatus, TripStatus, VerificationStatus};
use crate::POOL;

pub fn generate_unique_booking_code() -> String {
    // Digits 0-9 and uppercase A-Z, eight characters, human-facing.
    let charset: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::rng();

    loop {
        let code: String = (0..8)
            .map(|_| {
                let idx = rng.random_range(0..charset.len());
                charset[idx] as char
            })
            .collect();

        let exists = {
            let mut conn = POOL.get().expect("Failed to get DB connection");

            // Treat a query error as "exists" so we retry instead of
            // handing out a possibly colliding code.
            diesel::select(diesel::dsl::exists(
                crate::schema::bookings::table
                    .filter(crate::schema::bookings::booking_code.eq(&code)),
            ))
            .get_result::<bool>(&mut conn)
            .unwrap_or_else(|e| {
                eprintln!("Database error checking booking code: {:?}", e);
                true
            })
        };

        if !exists {
            return code;
        }
    }
}

/// Overlap check against every booking that still occupies the vehicle.
/// Cancelled rows never block; completed rows are bounded by their window
/// anyway. A 15 minute buffer on both ends keeps back-to-back handoffs from
/// colliding at the curb.
pub fn dates_available(
    vehicle: i32,
    pickup: DateTime<Utc>,
    drop_off: DateTime<Utc>,
    exclude_booking: Option<i32>,
) -> Result<bool, DriveshareError> {
    use crate::schema::bookings::dsl as b_q;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;

    let pickup_buffered = pickup - Duration::minutes(15);
    let drop_off_buffered = drop_off + Duration::minutes(15);
    let blocking = vec![
        LifecycleStatus::Pending,
        LifecycleStatus::Confirmed,
        LifecycleStatus::Active,
    ];

    let conflict = match exclude_booking {
        Some(excluded) => diesel::select(diesel::dsl::exists(
            b_q::bookings
                .filter(b_q::vehicle_id.eq(vehicle))
                .filter(b_q::status.eq_any(blocking))
                .filter(b_q::pickup_at.lt(drop_off_buffered))
                .filter(b_q::drop_off_at.gt(pickup_buffered))
                .filter(b_q::id.ne(excluded)),
        ))
        .get_result::<bool>(&mut pool),
        None => diesel::select(diesel::dsl::exists(
            b_q::bookings
                .filter(b_q::vehicle_id.eq(vehicle))
                .filter(b_q::status.eq_any(blocking))
                .filter(b_q::pickup_at.lt(drop_off_buffered))
                .filter(b_q::drop_off_at.gt(pickup_buffered)),
        ))
        .get_result::<bool>(&mut pool),
    }
    .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    Ok(!conflict)
}

fn transition_error(e: Error, what: &str) -> DriveshareError {
    match e {
        Error::NotFound => DriveshareError::InvalidStateTransition(what.to_string()),
        other => DriveshareError::Internal(other.to_string()),
    }
}

/// Pending -> Confirmed, only once verification is approved and payment has
/// cleared. Returns None when the booking is not yet eligible; webhooks call
/// this opportunistically after every sub-state update.
pub fn try_confirm(booking_id: i32) -> Result<Option<Booking>, DriveshareError> {
    use crate::schema::bookings::dsl as b_q;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    diesel::update(
        b_q::bookings
            .filter(b_q::id.eq(booking_id))
            .filter(b_q::status.eq(LifecycleStatus::Pending))
            .filter(b_q::verification_status.eq(VerificationStatus::Approved))
            .filter(b_q::payment_status.eq(PaymentStatus::Paid))
            .filter(b_q::trip_ended_at.is_null()),
    )
    .set(b_q::status.eq(LifecycleStatus::Confirmed))
    .get_result::<Booking>(&mut pool)
    .optional()
    .map_err(|e| DriveshareError::Internal(e.to_string()))
}

/// Confirmed -> Active. The single conditional UPDATE is what settles the
/// cancellation race: once this lands, a concurrent cancel sees
/// trip_started_at set and loses.
pub fn start_trip(booking_id: i32, now: DateTime<Utc>) -> Result<Booking, DriveshareError> {
    use crate::schema::bookings::dsl as b_q;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    diesel::update(
        b_q::bookings
            .filter(b_q::id.eq(booking_id))
            .filter(b_q::status.eq(LifecycleStatus::Confirmed))
            .filter(b_q::trip_started_at.is_null()),
    )
    .set((
        b_q::status.eq(LifecycleStatus::Active),
        b_q::trip_status.eq(Some(TripStatus::Active)),
        b_q::trip_started_at.eq(Some(now)),
    ))
    .get_result::<Booking>(&mut pool)
    .map_err(|e| transition_error(e, "only a confirmed booking with no started trip can start"))
}

/// Active -> Completed, stamping trip_ended_at.
pub fn end_trip(booking_id: i32, now: DateTime<Utc>) -> Result<Booking, DriveshareError> {
    use crate::schema::bookings::dsl as b_q;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    diesel::update(
        b_q::bookings
            .filter(b_q::id.eq(booking_id))
            .filter(b_q::status.eq(LifecycleStatus::Active))
            .filter(b_q::trip_ended_at.is_null()),
    )
    .set((
        b_q::status.eq(LifecycleStatus::Completed),
        b_q::trip_status.eq(Some(TripStatus::Completed)),
        b_q::trip_ended_at.eq(Some(now)),
    ))
    .get_result::<Booking>(&mut pool)
    .map_err(|e| transition_error(e, "only an active trip can end"))
}

/// Pending/Confirmed -> Cancelled. Guarded on the trip not having started,
/// so trip-start wins when both arrive at once; a finished trip can only
/// accrue a post-trip charge, never cancel.
pub fn cancel(booking_id: i32) -> Result<Booking, DriveshareError> {
    use crate::schema::bookings::dsl as b_q;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    diesel::update(
        b_q::bookings
            .filter(b_q::id.eq(booking_id))
            .filter(b_q::status.eq_any(vec![
                LifecycleStatus::Pending,
                LifecycleStatus::Confirmed,
            ]))
            .filter(b_q::trip_started_at.is_null())
            .filter(b_q::trip_ended_at.is_null()),
    )
    .set(b_q::status.eq(LifecycleStatus::Cancelled))
    .get_result::<Booking>(&mut pool)
    .map_err(|e| transition_error(e, "booking is past the point of cancellation"))
}

/// Completed -> Pending with trip_ended_at intact: the pending-charges
/// state. Returns None if the booking is already re-opened.
pub fn reopen_for_charges(booking_id: i32) -> Result<Option<Booking>, DriveshareError> {
    use crate::schema::bookings::dsl as b_q;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    diesel::update(
        b_q::bookings
            .filter(b_q::id.eq(booking_id))
            .filter(b_q::status.eq(LifecycleStatus::Completed))
            .filter(b_q::trip_ended_at.is_not_null()),
    )
    .set(b_q::status.eq(LifecycleStatus::Pending))
    .get_result::<Booking>(&mut pool)
    .optional()
    .map_err(|e| DriveshareError::Internal(e.to_string()))
}

/// Pending-charges -> Completed, but only when no unsettled charges remain.
/// The NOT EXISTS lives inside the UPDATE so a charge added concurrently
/// keeps the booking open.
pub fn close_settled(booking_id: i32) -> Result<Option<Booking>, DriveshareError> {
    use crate::schema::bookings::dsl as b_q;
    use crate::schema::charges::dsl as c_q;
    let mut pool = POOL
        .get()
        .map_err(|e| DriveshareError::Internal(e.to_string()))?;
    let unsettled = c_q::charges
        .filter(c_q::booking_id.eq(booking_id))
        .filter(c_q::settled.eq(false));
    diesel::update(
        b_q::bookings
            .filter(b_q::id.eq(booking_id))
            .filter(b_q::status.eq(LifecycleStatus::Pending))
            .filter(b_q::trip_ended_at.is_not_null())
            .filter(diesel::dsl::not(diesel::dsl::exists(unsettled))),
    )
    .set(b_q::status.eq(LifecycleStatus::Completed))
    .get_result::<Booking>(&mut pool)
    .optional()
    .map_err(|e| DriveshareError::Internal(e.to_string()))
}

/// Pre-quote guard shared by the refund preview and the cancel endpoint.
/// Rejects anything already cancelled, started, finished, or sitting in
/// post-trip settlement.
pub fn ensure_cancellable(booking: &Booking) -> Result<(), DriveshareError> {
    if booking.status == LifecycleStatus::Cancelled {
        return Err(DriveshareError::InvalidStateTransition(String::from(
            "booking is already cancelled",
        )));
    }
    let state = effective_state(booking);
    if state.is_active || state.is_completed {
        return Err(DriveshareError::InvalidStateTransition(String::from(
            "booking is past the point of cancellation",
        )));
    }
    Ok(())
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_fixtures::sample_booking;
    use chrono::Utc;

    #[test]
    fn pending_and_confirmed_bookings_are_cancellable() {
        let mut booking = sample_booking();
        assert!(ensure_cancellable(&booking).is_ok());
        booking.status = LifecycleStatus::Pending;
        booking.verification_status = VerificationStatus::Pending;
        booking.payment_status = PaymentStatus::Pending;
        assert!(ensure_cancellable(&booking).is_ok());
    }

    #[test]
    fn started_finished_and_cancelled_bookings_are_not() {
        let mut started = sample_booking();
        started.trip_started_at = Some(Utc::now());
        assert!(ensure_cancellable(&started).is_err());

        let mut finished = sample_booking();
        finished.status = LifecycleStatus::Completed;
        finished.trip_ended_at = Some(Utc::now());
        assert!(ensure_cancellable(&finished).is_err());

        let mut cancelled = sample_booking();
        cancelled.status = LifecycleStatus::Cancelled;
        assert!(ensure_cancellable(&cancelled).is_err());
    }

    #[test]
    fn pending_charges_bookings_cannot_cancel() {
        let mut booking = sample_booking();
        booking.status = LifecycleStatus::Pending;
        booking.trip_started_at = Some(Utc::now());
        booking.trip_ended_at = Some(Utc::now());
        assert!(ensure_cancellable(&booking).is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::model::{Booking, LifecycleStatus, PaymentStatus, TripStatus, VerificationStatus};

/// The resolved booleans derived from lifecycle, verification, payment and
/// trip sub-states. They are informative, not mutually exclusive; consumers
/// that need a single answer go through `display_tier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveState {
    pub is_verified: bool,
    pub is_confirmed_paid: bool,
    pub is_active: bool,
    pub is_completed: bool,
    pub has_pending_charges: bool,
    pub payment_failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayTier {
    PendingCharges,
    Completed,
    Active,
    Confirmed,
    PaymentFailed,
    Requested,
}

/// The one place these booleans are derived. Every call site that used to
/// re-derive "is this trip active" ad hoc goes through here.
pub fn effective_state(booking: &Booking) -> EffectiveState {
    let is_verified = booking.verification_status == VerificationStatus::Approved;
    let is_confirmed_paid = booking.status == LifecycleStatus::Confirmed
        && booking.payment_status == PaymentStatus::Paid;
    let is_completed = booking.status == LifecycleStatus::Completed
        || booking.trip_status == Some(TripStatus::Completed)
        || booking.trip_ended_at.is_some();
    // A finished trip still carries trip_started_at; it must never read as
    // active once any completion marker is present.
    let is_active = !is_completed
        && (booking.status == LifecycleStatus::Active
            || booking.trip_status == Some(TripStatus::Active)
            || booking.trip_started_at.is_some());
    // Post-trip settlement in progress: the trip ended but the lifecycle was
    // re-opened to Pending while extra charges are computed. Distinguished
    // from a never-started pre-trip Pending by trip_ended_at.
    let has_pending_charges = is_completed && booking.status == LifecycleStatus::Pending;
    let payment_failed = is_verified && booking.payment_status == PaymentStatus::Failed;
    EffectiveState {
        is_verified,
        is_confirmed_paid,
        is_active,
        is_completed,
        has_pending_charges,
        payment_failed,
    }
}

/// Strict priority, first match wins. Ordering matters: a completed trip
/// with a pending surcharge must not render as active or confirmed.
pub fn display_tier(state: &EffectiveState) -> DisplayTier {
    if state.has_pending_charges {
        DisplayTier::PendingCharges
    } else if state.is_completed {
        DisplayTier::Completed
    } else if state.is_active {
        DisplayTier::Active
    } else if state.is_confirmed_paid {
        DisplayTier::Confirmed
    } else if state.payment_failed {
        DisplayTier::PaymentFailed
    } else {
        DisplayTier::Requested
    }
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
    fn confirmed_and_paid_resolves_to_confirmed_tier() {
        let booking = sample_booking();
        let state = effective_state(&booking);
        assert!(state.is_verified);
        assert!(state.is_confirmed_paid);
        assert!(!state.is_active);
        assert_eq!(display_tier(&state), DisplayTier::Confirmed);
    }

    #[test]
    fn pending_with_ended_trip_is_pending_charges_not_active() {
        let mut booking = sample_booking();
        booking.status = LifecycleStatus::Pending;
        booking.trip_started_at = Some(Utc::now());
        booking.trip_ended_at = Some(Utc::now());
        let state = effective_state(&booking);
        assert!(state.has_pending_charges);
        assert!(state.is_completed);
        assert!(!state.is_active, "a finished trip must not read as active");
        assert_eq!(display_tier(&state), DisplayTier::PendingCharges);
    }

    #[test]
    fn pre_trip_pending_is_not_pending_charges() {
        let mut booking = sample_booking();
        booking.status = LifecycleStatus::Pending;
        booking.verification_status = VerificationStatus::Pending;
        booking.payment_status = PaymentStatus::Pending;
        let state = effective_state(&booking);
        assert!(!state.has_pending_charges);
        assert!(!state.is_completed);
        assert_eq!(display_tier(&state), DisplayTier::Requested);
    }

    #[test]
    fn running_trip_resolves_to_active_tier() {
        let mut booking = sample_booking();
        booking.status = LifecycleStatus::Active;
        booking.trip_status = Some(TripStatus::Active);
        booking.trip_started_at = Some(Utc::now());
        let state = effective_state(&booking);
        assert!(state.is_active);
        assert_eq!(display_tier(&state), DisplayTier::Active);
    }

    #[test]
    fn completed_outranks_active_markers() {
        let mut booking = sample_booking();
        booking.status = LifecycleStatus::Completed;
        booking.trip_status = Some(TripStatus::Completed);
        booking.trip_started_at = Some(Utc::now());
        booking.trip_ended_at = Some(Utc::now());
        let state = effective_state(&booking);
        assert!(state.is_completed);
        assert!(!state.is_active);
        assert_eq!(display_tier(&state), DisplayTier::Completed);
    }

    #[test]
    fn payment_failed_requires_verification() {
        let mut booking = sample_booking();
        booking.status = LifecycleStatus::Pending;
        booking.payment_status = PaymentStatus::Failed;
        let state = effective_state(&booking);
        assert!(state.payment_failed);
        assert_eq!(display_tier(&state), DisplayTier::PaymentFailed);

        booking.verification_status = VerificationStatus::Submitted;
        let state = effective_state(&booking);
        assert!(!state.payment_failed);
        assert_eq!(display_tier(&state), DisplayTier::Requested);
    }
}

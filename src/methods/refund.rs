use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::helper_model::DriveshareError;
use crate::methods::money::{require_non_negative, round_money};
use crate::methods::timestamps;
use crate::model::Booking;

/// At or past this threshold the guest gets the booking total back in full.
pub const FULL_REFUND_CUTOFF_HOURS: f64 = 24.0;
/// The service fee follows a stricter threshold: refunded only when the
/// cancellation lands a full 7 days (inclusive) before pickup.
pub const SERVICE_FEE_REFUND_CUTOFF_HOURS: f64 = 168.0;

const HALF_DAY: Decimal = Decimal::from_parts(5, 0, 0, false, 1); // 0.5

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundQuote {
    pub refund_amount: Decimal,
    pub service_fee_refund: Decimal,
    pub total_refund: Decimal,
    pub refund_percentage: i32,
    pub penalty_amount: Option<Decimal>,
    pub penalty_days: Option<Decimal>,
    pub label: String,
}

/// Single decision point over hours-until-pickup. Pure and idempotent:
/// guests preview the quote before confirming, and the confirm step calls
/// it again with the same inputs. State guards (already cancelled, trip
/// started or finished) belong to the caller; this is a quoting tool, not
/// a cancellation executor.
pub fn quote_refund(
    total_amount: Decimal,
    service_fee: Decimal,
    trip_days: i32,
    hours_until_pickup: f64,
) -> Result<RefundQuote, DriveshareError> {
    require_non_negative(total_amount, "total amount")?;
    require_non_negative(service_fee, "service fee")?;
    if !hours_until_pickup.is_finite() {
        return Err(DriveshareError::InvalidAmount(format!(
            "hours until pickup must be finite, got {}",
            hours_until_pickup
        )));
    }
    // Same-day bookings divide by one, never by zero.
    let trip_days = trip_days.max(1);

    if hours_until_pickup >= FULL_REFUND_CUTOFF_HOURS {
        let service_fee_refund = if hours_until_pickup >= SERVICE_FEE_REFUND_CUTOFF_HOURS {
            service_fee
        } else {
            Decimal::ZERO
        };
        let label = if service_fee_refund > Decimal::ZERO {
            String::from("Full refund including service fee")
        } else {
            String::from("Full refund, service fee retained")
        };
        return Ok(RefundQuote {
            refund_amount: total_amount,
            service_fee_refund,
            total_refund: total_amount + service_fee_refund,
            refund_percentage: 100,
            penalty_amount: None,
            penalty_days: None,
            label,
        });
    }

    let penalty_days = if trip_days > 2 { Decimal::ONE } else { HALF_DAY };
    let penalty_amount = round_money(total_amount / Decimal::from(trip_days) * penalty_days);
    let refund_amount = (total_amount - penalty_amount).max(Decimal::ZERO);
    let refund_percentage = if total_amount > Decimal::ZERO {
        (refund_amount / total_amount * Decimal::ONE_HUNDRED)
            .round()
            .to_i32()
            .unwrap_or(0)
    } else {
        0
    };
    Ok(RefundQuote {
        refund_amount,
        service_fee_refund: Decimal::ZERO,
        total_refund: refund_amount,
        refund_percentage,
        penalty_amount: Some(penalty_amount),
        penalty_days: Some(penalty_days),
        label: String::from("Late cancellation, penalty applied"),
    })
}

/// Booking-level wrapper: derives hours-until-pickup from the booking's
/// market-local pickup wall clock and the explicit `now`.
pub fn quote_refund_for_booking(
    booking: &Booking,
    now: DateTime<Utc>,
) -> Result<RefundQuote, DriveshareError> {
    let pickup = timestamps::pickup_instant(booking)?;
    let hours_until_pickup = timestamps::hours_until(pickup, now);
    quote_refund(
        booking.total_amount,
        booking.service_fee,
        booking.number_of_days,
        hours_until_pickup,
    )
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    fn four_hundred() -> Decimal {
        Decimal::new(40000, 2)
    }

    #[test]
    fn scenario_a_full_refund_without_service_fee() {
        // $400 total, 4-day trip, 30h out: full refund, fee retained (30 < 168)
        let quote = quote_refund(four_hundred(), Decimal::new(4000, 2), 4, 30.0).unwrap();
        assert_eq!(quote.refund_amount, four_hundred());
        assert_eq!(quote.service_fee_refund, Decimal::ZERO);
        assert_eq!(quote.total_refund, four_hundred());
        assert_eq!(quote.refund_percentage, 100);
        assert!(quote.penalty_amount.is_none());
    }

    #[test]
    fn scenario_b_one_penalty_day_inside_24_hours() {
        // $400 / 4 days * 1 day = $100 penalty, $300 back
        let quote = quote_refund(four_hundred(), Decimal::new(4000, 2), 4, 10.0).unwrap();
        assert_eq!(quote.penalty_days, Some(Decimal::ONE));
        assert_eq!(quote.penalty_amount, Some(Decimal::new(10000, 2)));
        assert_eq!(quote.refund_amount, Decimal::new(30000, 2));
        assert_eq!(quote.service_fee_refund, Decimal::ZERO);
        assert_eq!(quote.refund_percentage, 75);
    }

    #[test]
    fn scenario_c_short_trips_take_a_half_day_penalty() {
        let quote = quote_refund(four_hundred(), Decimal::ZERO, 1, 5.0).unwrap();
        assert_eq!(quote.penalty_days, Some(Decimal::new(5, 1)));
        assert_eq!(quote.penalty_amount, Some(Decimal::new(20000, 2)));
        assert_eq!(quote.refund_amount, Decimal::new(20000, 2));
    }

    #[test]
    fn exactly_two_day_trips_take_the_half_day_penalty() {
        let quote = quote_refund(four_hundred(), Decimal::ZERO, 2, 3.0).unwrap();
        assert_eq!(quote.penalty_days, Some(Decimal::new(5, 1)));
        assert_eq!(quote.penalty_amount, Some(Decimal::new(10000, 2)));
    }

    #[test]
    fn service_fee_threshold_is_inclusive_at_168_hours() {
        let fee = Decimal::new(4000, 2);
        let at_threshold = quote_refund(four_hundred(), fee, 4, 168.0).unwrap();
        assert_eq!(at_threshold.service_fee_refund, fee);
        let just_under = quote_refund(four_hundred(), fee, 4, 167.9).unwrap();
        assert_eq!(just_under.service_fee_refund, Decimal::ZERO);
    }

    #[test]
    fn refund_never_increases_as_pickup_approaches() {
        let fee = Decimal::new(4000, 2);
        let hours = [200.0, 168.0, 167.9, 24.0, 23.9, 10.0, 1.0];
        let mut previous: Option<Decimal> = None;
        for h in hours {
            let quote = quote_refund(four_hundred(), fee, 4, h).unwrap();
            if let Some(prev) = previous {
                assert!(
                    quote.total_refund <= prev,
                    "refund rose from {} to {} at {}h",
                    prev,
                    quote.total_refund,
                    h
                );
            }
            previous = Some(quote.total_refund);
        }
    }

    #[test]
    fn quoting_twice_yields_identical_output() {
        let first = quote_refund(four_hundred(), Decimal::new(4000, 2), 4, 10.0).unwrap();
        let second = quote_refund(four_hundred(), Decimal::new(4000, 2), 4, 10.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_day_count_is_clamped_not_divided() {
        let quote = quote_refund(four_hundred(), Decimal::ZERO, 0, 2.0).unwrap();
        assert_eq!(quote.penalty_amount, Some(Decimal::new(20000, 2)));
    }

    #[test]
    fn penalty_never_produces_a_negative_refund() {
        // 1-day trip: penalty is half the total, but a pathological rate
        // table cannot push the refund below zero
        let quote = quote_refund(Decimal::new(100, 2), Decimal::ZERO, 1, 0.5).unwrap();
        assert!(quote.refund_amount >= Decimal::ZERO);
    }

    #[test]
    fn negative_money_is_rejected() {
        assert!(quote_refund(Decimal::new(-1, 2), Decimal::ZERO, 4, 30.0).is_err());
        assert!(quote_refund(four_hundred(), Decimal::new(-1, 2), 4, 30.0).is_err());
        assert!(quote_refund(four_hundred(), Decimal::ZERO, 4, f64::NAN).is_err());
    }
}

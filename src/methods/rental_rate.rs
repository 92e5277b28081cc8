use chrono::TimeDelta;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::helper_model::DriveshareError;
use crate::methods::money::{require_non_negative, round_money};

/// Discount floor multipliers used when a partner leaves the weekly or
/// monthly rate blank on their rate card.
const WEEKLY_DEFAULT_MULTIPLIER: Decimal = Decimal::from_parts(65, 0, 0, false, 1); // 6.5
const MONTHLY_DEFAULT_MULTIPLIER: Decimal = Decimal::from_parts(25, 0, 0, false, 0); // 25

const DAYS_PER_MONTH_BLOCK: i32 = 28;
const DAYS_PER_WEEK_BLOCK: i32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCard {
    pub daily_rate: Decimal,
    pub weekly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub min_trip_duration_days: i32,
}

impl RateCard {
    pub fn weekly_or_default(&self) -> Decimal {
        self.weekly_rate
            .unwrap_or_else(|| round_money(self.daily_rate * WEEKLY_DEFAULT_MULTIPLIER))
    }

    pub fn monthly_or_default(&self) -> Decimal {
        self.monthly_rate
            .unwrap_or_else(|| round_money(self.daily_rate * MONTHLY_DEFAULT_MULTIPLIER))
    }
}

/// Whole billable days for a rental window: ceiling of the raw duration,
/// never below one. A window that does not end after it starts is rejected,
/// so same-day returns cannot be priced.
pub fn rental_days(raw_duration: TimeDelta) -> Result<i32, DriveshareError> {
    if raw_duration <= TimeDelta::zero() {
        return Err(DriveshareError::InvalidAmount(String::from(
            "rental period must end after it starts",
        )));
    }
    let duration_hours = raw_duration.num_minutes() as f64 / 60.0;
    let days = (duration_hours / 24.0).ceil() as i32;
    Ok(days.max(1))
}

/// Greedy tier packing: full 28-day blocks at the monthly rate, then full
/// 7-day blocks at the weekly rate, then single days. Monthly before weekly
/// before daily guarantees the guest never pays more than the daily-rate
/// equivalent for any block of 7 days or longer.
///
/// Minimum-duration enforcement is deliberately not here; rejecting a trip
/// shorter than the partner's floor is a booking-creation concern.
pub fn rental_subtotal(days: i32, rate_card: &RateCard) -> Result<Decimal, DriveshareError> {
    if days < 1 {
        return Err(DriveshareError::InvalidAmount(format!(
            "day count must be at least 1, got {}",
            days
        )));
    }
    require_non_negative(rate_card.daily_rate, "daily rate")?;
    let weekly_rate = rate_card.weekly_or_default();
    let monthly_rate = rate_card.monthly_or_default();
    require_non_negative(weekly_rate, "weekly rate")?;
    require_non_negative(monthly_rate, "monthly rate")?;

    let month_blocks = days / DAYS_PER_MONTH_BLOCK;
    let after_months = days % DAYS_PER_MONTH_BLOCK;
    let week_blocks = after_months / DAYS_PER_WEEK_BLOCK;
    let single_days = after_months % DAYS_PER_WEEK_BLOCK;

    let month_charge = round_money(monthly_rate * Decimal::from(month_blocks));
    let week_charge = round_money(weekly_rate * Decimal::from(week_blocks));
    let day_charge = round_money(rate_card.daily_rate * Decimal::from(single_days));

    Ok(month_charge + week_charge + day_charge)
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn daily_only(rate_cents: i64) -> RateCard {
        RateCard {
            daily_rate: Decimal::new(rate_cents, 2),
            weekly_rate: None,
            monthly_rate: None,
            min_trip_duration_days: 1,
        }
    }

    #[test]
    fn day_count_is_ceiling_with_floor_of_one() {
        assert_eq!(rental_days(Duration::hours(6)).unwrap(), 1);
        assert_eq!(rental_days(Duration::hours(24)).unwrap(), 1);
        assert_eq!(rental_days(Duration::hours(25)).unwrap(), 2);
        assert_eq!(rental_days(Duration::days(10)).unwrap(), 10);
    }

    #[test]
    fn zero_or_reversed_window_is_rejected() {
        assert!(rental_days(Duration::zero()).is_err());
        assert!(rental_days(Duration::hours(-4)).is_err());
    }

    #[test]
    fn ten_days_at_fifty_uses_defaulted_weekly_rate() {
        // weekly defaults to 50 * 6.5 = 325; 1 week + 3 days = 325 + 150
        let subtotal = rental_subtotal(10, &daily_only(5000)).unwrap();
        assert_eq!(subtotal, Decimal::new(47500, 2));
    }

    #[test]
    fn monthly_blocks_pack_before_weekly_before_daily() {
        // 35 days = 28 + 7: monthly default 1250 + weekly default 325
        let subtotal = rental_subtotal(35, &daily_only(5000)).unwrap();
        assert_eq!(subtotal, Decimal::new(157500, 2));
        // and never worse than the straight daily equivalent
        assert!(subtotal < Decimal::new(5000 * 35, 2));
    }

    #[test]
    fn explicit_tier_rates_win_over_defaults() {
        let card = RateCard {
            daily_rate: Decimal::new(5000, 2),
            weekly_rate: Some(Decimal::new(30000, 2)),
            monthly_rate: Some(Decimal::new(100000, 2)),
            min_trip_duration_days: 1,
        };
        // 30 days = 1 month block + 2 days
        let subtotal = rental_subtotal(30, &card).unwrap();
        assert_eq!(subtotal, Decimal::new(110000, 2));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut card = daily_only(5000);
        card.daily_rate = Decimal::new(-5000, 2);
        assert!(rental_subtotal(3, &card).is_err());
    }
}

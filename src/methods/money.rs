use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::helper_model::DriveshareError;

/// Round to 2 decimal places, half-up. Applied after every compound step,
/// never once at the end: the state/county/city/surcharge taxes are each
/// computed off the same base and rounded on their own before summing, which
/// matches how the historical settlement reports were produced.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn require_non_negative(amount: Decimal, field: &str) -> Result<(), DriveshareError> {
    if amount < Decimal::ZERO {
        return Err(DriveshareError::InvalidAmount(format!(
            "{} must be non-negative, got {}",
            field, amount
        )));
    }
    Ok(())
}

/// Convert an f64 coming off the wire into money. NaN/infinity and negative
/// values are rejected here so nothing downstream has to clamp.
pub fn money_from_f64(value: f64, field: &str) -> Result<Decimal, DriveshareError> {
    if !value.is_finite() {
        return Err(DriveshareError::InvalidAmount(format!(
            "{} must be a finite number, got {}",
            field, value
        )));
    }
    let amount = Decimal::from_f64(value).ok_or_else(|| {
        DriveshareError::InvalidAmount(format!("{} is not representable, got {}", field, value))
    })?;
    require_non_negative(amount, field)?;
    Ok(round_money(amount))
}

pub fn apply_percent(base: Decimal, rate: Decimal) -> Decimal {
    round_money(base * rate)
}

/// The fixed set of named jurisdiction rates for a market. The taxable base
/// is rental subtotal plus service fee; the delivery fee never enters it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxStack {
    pub state_rate: Decimal,
    pub county_rate: Decimal,
    pub city_rate: Decimal,
    pub rental_surcharge_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub state_tax: Decimal,
    pub county_tax: Decimal,
    pub city_tax: Decimal,
    pub rental_surcharge: Decimal,
    pub total_taxes: Decimal,
}

impl TaxStack {
    pub fn stack_on(&self, taxable: Decimal) -> Result<TaxBreakdown, DriveshareError> {
        require_non_negative(taxable, "taxable base")?;
        for (rate, name) in [
            (self.state_rate, "state tax rate"),
            (self.county_rate, "county tax rate"),
            (self.city_rate, "city tax rate"),
            (self.rental_surcharge_rate, "rental surcharge rate"),
        ] {
            require_non_negative(rate, name)?;
        }
        // Each jurisdiction computes off the same base, rounded independently.
        let state_tax = apply_percent(taxable, self.state_rate);
        let county_tax = apply_percent(taxable, self.county_rate);
        let city_tax = apply_percent(taxable, self.city_rate);
        let rental_surcharge = apply_percent(taxable, self.rental_surcharge_rate);
        let total_taxes = state_tax + county_tax + city_tax + rental_surcharge;
        Ok(TaxBreakdown {
            state_tax,
            county_tax,
            city_tax,
            rental_surcharge,
            total_taxes,
        })
    }
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    fn austin_stack() -> TaxStack {
        TaxStack {
            state_rate: Decimal::new(625, 4),
            county_rate: Decimal::new(100, 4),
            city_rate: Decimal::new(125, 4),
            rental_surcharge_rate: Decimal::new(500, 4),
        }
    }

    #[test]
    fn rounds_half_up_at_two_places() {
        assert_eq!(round_money(Decimal::new(2005, 3)), Decimal::new(201, 2));
        assert_eq!(round_money(Decimal::new(2004, 3)), Decimal::new(200, 2));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let err = require_non_negative(Decimal::new(-1, 2), "subtotal").unwrap_err();
        assert!(err.to_string().contains("subtotal"));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        assert!(money_from_f64(f64::NAN, "total").is_err());
        assert!(money_from_f64(f64::INFINITY, "total").is_err());
        assert!(money_from_f64(-5.0, "total").is_err());
        assert_eq!(
            money_from_f64(129.999, "total").unwrap(),
            Decimal::new(13000, 2)
        );
    }

    #[test]
    fn each_jurisdiction_rounds_before_the_sum() {
        // 220.10 * 6.25% = 13.75625 -> 13.76, * 1% = 2.201 -> 2.20,
        // * 1.25% = 2.75125 -> 2.75, * 5% = 11.005 -> 11.01
        let breakdown = austin_stack().stack_on(Decimal::new(22010, 2)).unwrap();
        assert_eq!(breakdown.state_tax, Decimal::new(1376, 2));
        assert_eq!(breakdown.county_tax, Decimal::new(220, 2));
        assert_eq!(breakdown.city_tax, Decimal::new(275, 2));
        assert_eq!(breakdown.rental_surcharge, Decimal::new(1101, 2));
        assert_eq!(breakdown.total_taxes, Decimal::new(2972, 2));
        // A single rounding at the end would have produced 29.71.
        let single_pass = round_money(Decimal::new(22010, 2) * Decimal::new(1350, 4));
        assert_eq!(single_pass, Decimal::new(2971, 2));
    }

    #[test]
    fn negative_taxable_base_is_rejected() {
        assert!(austin_stack().stack_on(Decimal::new(-100, 2)).is_err());
    }
}

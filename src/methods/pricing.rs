use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::helper_model::DriveshareError;
use crate::methods::money::{apply_percent, require_non_negative, round_money, TaxBreakdown};
use crate::methods::rental_rate::{rental_days, rental_subtotal, RateCard};
use crate::model::{Booking, InsuranceSelection, InsuranceSource, Market, PartnerTier, PickupType};

/// Platform-wide fallback applied when a partner tier exists but carries no
/// commission rate. Defaulting to zero would silently hand the platform's
/// whole margin to the partner, so the fallback is the top-tier rate.
pub const DEFAULT_COMMISSION_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2); // 0.25

/// Guest-facing projection of a rental. `total` is always the exact sum of
/// the itemized components; `check_itemized_total` re-asserts that before a
/// quote is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub days: i32,
    pub daily_rate: Decimal,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub service_fee: Decimal,
    pub insurance_fee: Decimal,
    pub taxes: TaxBreakdown,
    pub total: Decimal,
}

impl PriceBreakdown {
    /// Fold a partner-authored insurance fee into the quote. Guest quotes
    /// carry zero here; only self-authored partner bookings set it.
    pub fn with_insurance_fee(mut self, fee: Decimal) -> Result<Self, DriveshareError> {
        require_non_negative(fee, "insurance fee")?;
        self.insurance_fee = round_money(fee);
        self.total = self.subtotal
            + self.delivery_fee
            + self.service_fee
            + self.insurance_fee
            + self.taxes.total_taxes;
        Ok(self)
    }

    pub fn check_itemized_total(&self) -> Result<(), DriveshareError> {
        let itemized = self.subtotal
            + self.delivery_fee
            + self.service_fee
            + self.insurance_fee
            + self.taxes.total_taxes;
        if itemized != self.total {
            return Err(DriveshareError::InvalidAmount(format!(
                "itemized components sum to {} but total is {}",
                itemized, self.total
            )));
        }
        Ok(())
    }
}

/// Partner-facing projection of the same rental. Commission bites only the
/// rental subtotal; delivery and airport fees pass through to the partner in
/// full, and taxes are tracked as pass-through for settlement reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutBreakdown {
    pub subtotal: Decimal,
    pub commission_rate: Decimal,
    pub platform_commission: Decimal,
    pub delivery_fee: Decimal,
    pub partner_payout: Decimal,
    pub tax_passthrough: Decimal,
    pub platform_retained: Decimal,
    pub coverage_source: InsuranceSource,
    pub compliance_warning: Option<String>,
}

pub fn quote_price(
    rate_card: &RateCard,
    pickup: DateTime<Utc>,
    drop_off: DateTime<Utc>,
    pickup_type: PickupType,
    market: &Market,
) -> Result<PriceBreakdown, DriveshareError> {
    let days = rental_days(drop_off - pickup)?;
    let subtotal = rental_subtotal(days, rate_card)?;
    let delivery_fee = market.delivery_fee_for(pickup_type);
    require_non_negative(delivery_fee, "delivery fee")?;
    require_non_negative(market.service_fee_percent, "service fee percent")?;
    let service_fee = apply_percent(subtotal, market.service_fee_percent);
    // Service fee is taxed, delivery fee is not.
    let taxes = market.tax_stack().stack_on(subtotal + service_fee)?;
    let total = subtotal + delivery_fee + service_fee + taxes.total_taxes;
    Ok(PriceBreakdown {
        days,
        daily_rate: rate_card.daily_rate,
        subtotal,
        delivery_fee,
        service_fee,
        insurance_fee: Decimal::ZERO,
        taxes,
        total,
    })
}

/// Rebuild the guest-side breakdown from a persisted booking snapshot. The
/// tax split is recomputed off the booked taxable base; if the market's
/// stack no longer reproduces the booked tax total, the quote is stale and
/// must be re-run rather than silently reconciled.
pub fn breakdown_from_booking(
    booking: &Booking,
    market: &Market,
) -> Result<PriceBreakdown, DriveshareError> {
    let taxes = market
        .tax_stack()
        .stack_on(booking.subtotal + booking.service_fee)?;
    if taxes.total_taxes != booking.taxes {
        return Err(DriveshareError::InvalidAmount(format!(
            "market tax rates changed since booking {} was quoted",
            booking.booking_code
        )));
    }
    let price = PriceBreakdown {
        days: booking.number_of_days,
        daily_rate: booking.daily_rate,
        subtotal: booking.subtotal,
        delivery_fee: booking.delivery_fee,
        service_fee: booking.service_fee,
        insurance_fee: booking.insurance_fee,
        taxes,
        total: booking.total_amount,
    };
    price.check_itemized_total()?;
    Ok(price)
}

pub fn quote_partner_payout(
    price: &PriceBreakdown,
    tier: Option<&PartnerTier>,
    insurance: &InsuranceSelection,
) -> Result<PayoutBreakdown, DriveshareError> {
    let tier = tier.ok_or(DriveshareError::MissingCommissionRate)?;
    let commission_rate = tier.commission_rate.unwrap_or(DEFAULT_COMMISSION_RATE);
    if commission_rate <= Decimal::ZERO || commission_rate >= Decimal::ONE {
        return Err(DriveshareError::InvalidAmount(format!(
            "commission rate must be between 0 and 1, got {}",
            commission_rate
        )));
    }
    let platform_commission = apply_percent(price.subtotal, commission_rate);
    let partner_payout = price.subtotal - platform_commission + price.delivery_fee;
    let tax_passthrough = price.taxes.total_taxes;
    let platform_retained = price.service_fee + platform_commission + tax_passthrough;
    let compliance_warning = match insurance.source {
        InsuranceSource::None => Some(String::from(
            "No insurance coverage is attached to this booking. The partner is responsible for state minimum coverage.",
        )),
        _ => None,
    };
    Ok(PayoutBreakdown {
        subtotal: price.subtotal,
        commission_rate,
        platform_commission,
        delivery_fee: price.delivery_fee,
        partner_payout,
        tax_passthrough,
        platform_retained,
        coverage_source: insurance.source,
        compliance_warning,
    })
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_fixtures::sample_market;
    use chrono::TimeZone;

    fn card() -> RateCard {
        RateCard {
            daily_rate: Decimal::new(5000, 2),
            weekly_rate: None,
            monthly_rate: None,
            min_trip_duration_days: 1,
        }
    }

    fn window(days: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let pickup = Utc.with_ymd_and_hms(2026, 3, 10, 16, 0, 0).unwrap();
        (pickup, pickup + chrono::Duration::days(days))
    }

    fn guest_insurance() -> InsuranceSelection {
        InsuranceSelection {
            source: InsuranceSource::Guest,
            provider: Some(String::from("Acme Mutual")),
            policy_number: Some(String::from("PN-2231")),
        }
    }

    fn tier(rate: Option<Decimal>) -> PartnerTier {
        PartnerTier {
            id: 2,
            name: String::from("Fleet"),
            commission_rate: rate,
            fleet_size: 12,
        }
    }

    #[test]
    fn guest_total_is_the_exact_itemized_sum() {
        let (pickup, drop_off) = window(4);
        let price = quote_price(&card(), pickup, drop_off, PickupType::Delivery, &sample_market())
            .unwrap();
        assert_eq!(price.days, 4);
        assert_eq!(price.subtotal, Decimal::new(20000, 2));
        assert_eq!(price.delivery_fee, Decimal::new(4500, 2));
        assert_eq!(price.service_fee, Decimal::new(2000, 2));
        // taxable base 220.00, delivery excluded
        assert_eq!(price.taxes.total_taxes, Decimal::new(2970, 2));
        assert_eq!(
            price.total,
            price.subtotal + price.delivery_fee + price.service_fee + price.taxes.total_taxes
        );
        price.check_itemized_total().unwrap();
    }

    #[test]
    fn payout_plus_commission_equals_subtotal_plus_delivery() {
        let (pickup, drop_off) = window(4);
        let price = quote_price(&card(), pickup, drop_off, PickupType::Airport, &sample_market())
            .unwrap();
        let payout = quote_partner_payout(
            &price,
            Some(&tier(Some(Decimal::new(18, 2)))),
            &guest_insurance(),
        )
        .unwrap();
        assert_eq!(
            payout.partner_payout + payout.platform_commission,
            price.subtotal + price.delivery_fee
        );
        // full guest total reconciles: total - payout - retained = insurance fee (zero)
        assert_eq!(
            price.total - payout.partner_payout - payout.platform_retained,
            Decimal::ZERO
        );
    }

    #[test]
    fn missing_tier_is_fatal_not_zero() {
        let (pickup, drop_off) = window(3);
        let price = quote_price(
            &card(),
            pickup,
            drop_off,
            PickupType::PartnerLocation,
            &sample_market(),
        )
        .unwrap();
        let err = quote_partner_payout(&price, None, &guest_insurance()).unwrap_err();
        assert_eq!(err, DriveshareError::MissingCommissionRate);
    }

    #[test]
    fn tier_without_rate_falls_back_to_platform_default() {
        let (pickup, drop_off) = window(3);
        let price = quote_price(
            &card(),
            pickup,
            drop_off,
            PickupType::PartnerLocation,
            &sample_market(),
        )
        .unwrap();
        let payout = quote_partner_payout(&price, Some(&tier(None)), &guest_insurance()).unwrap();
        assert_eq!(payout.commission_rate, DEFAULT_COMMISSION_RATE);
        assert!(payout.platform_commission > Decimal::ZERO);
    }

    #[test]
    fn out_of_range_commission_rate_is_rejected() {
        let (pickup, drop_off) = window(3);
        let price = quote_price(
            &card(),
            pickup,
            drop_off,
            PickupType::PartnerLocation,
            &sample_market(),
        )
        .unwrap();
        assert!(
            quote_partner_payout(&price, Some(&tier(Some(Decimal::ZERO))), &guest_insurance())
                .is_err()
        );
        assert!(
            quote_partner_payout(&price, Some(&tier(Some(Decimal::ONE))), &guest_insurance())
                .is_err()
        );
    }

    #[test]
    fn uninsured_booking_carries_a_compliance_warning() {
        let (pickup, drop_off) = window(3);
        let price = quote_price(
            &card(),
            pickup,
            drop_off,
            PickupType::PartnerLocation,
            &sample_market(),
        )
        .unwrap();
        let none = InsuranceSelection {
            source: InsuranceSource::None,
            provider: None,
            policy_number: None,
        };
        let payout =
            quote_partner_payout(&price, Some(&tier(Some(Decimal::new(20, 2)))), &none).unwrap();
        assert_eq!(payout.coverage_source, InsuranceSource::None);
        assert!(payout.compliance_warning.is_some());
    }

    #[test]
    fn insurance_fee_reflows_into_the_total() {
        let (pickup, drop_off) = window(2);
        let price = quote_price(
            &card(),
            pickup,
            drop_off,
            PickupType::PartnerLocation,
            &sample_market(),
        )
        .unwrap()
        .with_insurance_fee(Decimal::new(3500, 2))
        .unwrap();
        assert_eq!(price.insurance_fee, Decimal::new(3500, 2));
        price.check_itemized_total().unwrap();
        // the insurance arrangement does not change the taxable base
        assert_eq!(
            price.taxes.total_taxes,
            sample_market()
                .tax_stack()
                .stack_on(price.subtotal + price.service_fee)
                .unwrap()
                .total_taxes
        );
    }
}

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

use crate::methods::booking_state::{DisplayTier, EffectiveState};
use crate::methods::disclosure::ProgressiveInfoLevel;
use crate::model;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ErrorResponse {
    pub title: String,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriveshareError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("the requested dates are no longer available")]
    DatesUnavailable,
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),
    #[error("partner tier has no commission rate configured")]
    MissingCommissionRate,
    #[error("unrecognized status token: {0}")]
    UnknownStatusToken(String),
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("{0} is not a valid local time")]
    InvalidLocalTime(String),
    #[error("token is not valid hex")]
    TokenFormatError,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Everything a guest is allowed to see about their booking at the current
/// moment. Built exclusively by `methods::disclosure::redact`; endpoints must
/// never serialize a `model::Booking` to a guest directly.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GuestBookingView {
    pub booking_code: String,
    pub status: model::LifecycleStatus,
    pub effective_state: EffectiveState,
    pub display_tier: DisplayTier,
    pub info_level: ProgressiveInfoLevel,

    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub pickup_timezone: String,
    pub pickup_type: model::PickupType,
    pub trip_started_at: Option<DateTime<Utc>>,
    pub trip_ended_at: Option<DateTime<Utc>>,

    pub vehicle_name: String,
    pub vehicle_type: String,
    pub transmission: String,
    pub seats: i32,
    pub vehicle_image_link: Option<String>,

    pub daily_rate: Decimal,
    pub number_of_days: i32,
    pub subtotal: Decimal,
    pub service_fee: Decimal,
    pub delivery_fee: Decimal,
    pub insurance_fee: Decimal,
    pub taxes: Decimal,
    pub deposit_amount: Decimal,
    pub total_amount: Decimal,
    pub insurance_source: model::InsuranceSource,

    // host_intro and above
    pub host_name: Option<String>,
    pub host_rating: Option<Decimal>,
    pub host_response_minutes: Option<i32>,
    pub can_message_host: bool,
    // full_details and above
    pub host_email: Option<String>,
    pub host_phone: Option<String>,
    pub exact_address: Option<String>,
    pub parking_instructions: Option<String>,
    // access_codes only
    pub has_keybox: bool,
    pub keybox_code: Option<String>,

    pub has_open_dispute: bool,
}

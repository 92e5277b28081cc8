use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Diesel requires us to define a custom mapping between the Rust enum
// and the database type, if we are not using string.
use crate::helper_model::DriveshareError;
use crate::schema::*;
use diesel::deserialize::{self, FromSql};
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, Output, ToSql};
use diesel::{AsExpression, FromSqlRow};
use std::io::Write;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::LifecycleStatusEnum)]
pub enum LifecycleStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::VerificationStatusEnum)]
pub enum VerificationStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::PaymentStatusEnum)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::TripStatusEnum)]
pub enum TripStatus {
    Active,
    Completed,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::PickupTypeEnum)]
pub enum PickupType {
    PartnerLocation,
    Delivery,
    Airport,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::InsuranceSourceEnum)]
pub enum InsuranceSource {
    Vehicle,
    Partner,
    Guest,
    None,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::UserRoleEnum)]
pub enum UserRole {
    Guest,
    Partner,
    Admin,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::PaymentTypeEnum)]
pub enum PaymentType {
    Charge,
    Refund,
}

// Historical records carried these tokens in whatever casing the old stack
// produced ("CONFIRMED", "Paid", "captured", "verified"). Every path into the
// engine funnels through from_legacy so business logic only ever compares
// enum values, never raw strings.
impl LifecycleStatus {
    pub fn from_legacy(raw: &str) -> Result<Self, DriveshareError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(LifecycleStatus::Pending),
            "confirmed" => Ok(LifecycleStatus::Confirmed),
            "active" => Ok(LifecycleStatus::Active),
            "completed" => Ok(LifecycleStatus::Completed),
            "cancelled" | "canceled" => Ok(LifecycleStatus::Cancelled),
            _ => Err(DriveshareError::UnknownStatusToken(raw.to_string())),
        }
    }
}

impl VerificationStatus {
    pub fn from_legacy(raw: &str) -> Result<Self, DriveshareError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(VerificationStatus::Pending),
            "submitted" => Ok(VerificationStatus::Submitted),
            // "verified" was the pre-migration synonym for approved
            "approved" | "verified" => Ok(VerificationStatus::Approved),
            "rejected" => Ok(VerificationStatus::Rejected),
            _ => Err(DriveshareError::UnknownStatusToken(raw.to_string())),
        }
    }
}

impl PaymentStatus {
    pub fn from_legacy(raw: &str) -> Result<Self, DriveshareError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" | "captured" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(DriveshareError::UnknownStatusToken(raw.to_string())),
        }
    }
}

impl TripStatus {
    pub fn from_legacy(raw: &str) -> Result<Self, DriveshareError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(TripStatus::Active),
            "completed" => Ok(TripStatus::Completed),
            _ => Err(DriveshareError::UnknownStatusToken(raw.to_string())),
        }
    }
}

impl PickupType {
    pub fn from_legacy(raw: &str) -> Result<Self, DriveshareError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "partnerlocation" | "partner-location" | "partner_location" => {
                Ok(PickupType::PartnerLocation)
            }
            "delivery" => Ok(PickupType::Delivery),
            "airport" => Ok(PickupType::Airport),
            _ => Err(DriveshareError::UnknownStatusToken(raw.to_string())),
        }
    }
}

impl InsuranceSource {
    pub fn from_legacy(raw: &str) -> Result<Self, DriveshareError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vehicle" => Ok(InsuranceSource::Vehicle),
            "partner" => Ok(InsuranceSource::Partner),
            "guest" => Ok(InsuranceSource::Guest),
            "none" => Ok(InsuranceSource::None),
            _ => Err(DriveshareError::UnknownStatusToken(raw.to_string())),
        }
    }
}

impl UserRole {
    pub fn from_legacy(raw: &str) -> Result<Self, DriveshareError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "guest" => Ok(UserRole::Guest),
            "partner" => Ok(UserRole::Partner),
            "admin" => Ok(UserRole::Admin),
            _ => Err(DriveshareError::UnknownStatusToken(raw.to_string())),
        }
    }
}

impl PaymentType {
    pub fn from_legacy(raw: &str) -> Result<Self, DriveshareError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "charge" => Ok(PaymentType::Charge),
            "refund" => Ok(PaymentType::Refund),
            _ => Err(DriveshareError::UnknownStatusToken(raw.to_string())),
        }
    }
}

//This is for postgres. For other databases the type might be different.
impl ToSql<sql_types::LifecycleStatusEnum, Pg> for LifecycleStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            LifecycleStatus::Pending => out.write_all(b"Pending")?,
            LifecycleStatus::Confirmed => out.write_all(b"Confirmed")?,
            LifecycleStatus::Active => out.write_all(b"Active")?,
            LifecycleStatus::Completed => out.write_all(b"Completed")?,
            LifecycleStatus::Cancelled => out.write_all(b"Cancelled")?,
        }
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<sql_types::LifecycleStatusEnum, Pg> for LifecycleStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(LifecycleStatus::from_legacy(raw)?)
    }
}
// The following is the traits implementation for other Enums.
impl ToSql<sql_types::VerificationStatusEnum, Pg> for VerificationStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            VerificationStatus::Pending => out.write_all(b"Pending")?,
            VerificationStatus::Submitted => out.write_all(b"Submitted")?,
            VerificationStatus::Approved => out.write_all(b"Approved")?,
            VerificationStatus::Rejected => out.write_all(b"Rejected")?,
        }
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<sql_types::VerificationStatusEnum, Pg> for VerificationStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(VerificationStatus::from_legacy(raw)?)
    }
}

impl ToSql<sql_types::PaymentStatusEnum, Pg> for PaymentStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            PaymentStatus::Pending => out.write_all(b"Pending")?,
            PaymentStatus::Paid => out.write_all(b"Paid")?,
            PaymentStatus::Failed => out.write_all(b"Failed")?,
        }
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<sql_types::PaymentStatusEnum, Pg> for PaymentStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(PaymentStatus::from_legacy(raw)?)
    }
}

impl ToSql<sql_types::TripStatusEnum, Pg> for TripStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            TripStatus::Active => out.write_all(b"Active")?,
            TripStatus::Completed => out.write_all(b"Completed")?,
        }
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<sql_types::TripStatusEnum, Pg> for TripStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(TripStatus::from_legacy(raw)?)
    }
}

impl ToSql<sql_types::PickupTypeEnum, Pg> for PickupType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            PickupType::PartnerLocation => out.write_all(b"PartnerLocation")?,
            PickupType::Delivery => out.write_all(b"Delivery")?,
            PickupType::Airport => out.write_all(b"Airport")?,
        }
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<sql_types::PickupTypeEnum, Pg> for PickupType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(PickupType::from_legacy(raw)?)
    }
}

impl ToSql<sql_types::InsuranceSourceEnum, Pg> for InsuranceSource {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            InsuranceSource::Vehicle => out.write_all(b"Vehicle")?,
            InsuranceSource::Partner => out.write_all(b"Partner")?,
            InsuranceSource::Guest => out.write_all(b"Guest")?,
            InsuranceSource::None => out.write_all(b"None")?,
        }
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<sql_types::InsuranceSourceEnum, Pg> for InsuranceSource {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(InsuranceSource::from_legacy(raw)?)
    }
}

impl ToSql<sql_types::UserRoleEnum, Pg> for UserRole {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            UserRole::Guest => out.write_all(b"Guest")?,
            UserRole::Partner => out.write_all(b"Partner")?,
            UserRole::Admin => out.write_all(b"Admin")?,
        }
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<sql_types::UserRoleEnum, Pg> for UserRole {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(UserRole::from_legacy(raw)?)
    }
}

impl ToSql<sql_types::PaymentTypeEnum, Pg> for PaymentType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            PaymentType::Charge => out.write_all(b"Charge")?,
            PaymentType::Refund => out.write_all(b"Refund")?,
        }
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<sql_types::PaymentTypeEnum, Pg> for PaymentType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = std::str::from_utf8(bytes.as_bytes())?;
        Ok(PaymentType::from_legacy(raw)?)
    }
}

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String, // Hashed!
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn to_publish_user(&self) -> PublishUser {
        PublishUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }

    pub fn is_partner(&self) -> bool {
        matches!(self.role, UserRole::Partner | UserRole::Admin)
    }
}

#[derive(Insertable, Debug, Clone, Deserialize, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String, // Hash this before inserting!
    pub phone: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(belongs_to(User))]
#[diesel(table_name = access_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccessToken {
    pub id: i32,
    pub user_id: i32,
    pub token: Vec<u8>,
    pub exp: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = access_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccessToken {
    pub user_id: i32,
    pub token: Vec<u8>,
    pub exp: DateTime<Utc>,
}

impl AccessToken {
    pub fn to_publish_access_token(&self) -> PublishAccessToken {
        let token_string = hex::encode(self.token.clone());
        PublishAccessToken {
            token: token_string,
            exp: self.exp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishAccessToken {
    pub token: String,
    pub exp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
    pub user_id: i32,
    pub token: String,
}

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = markets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Market {
    pub id: i32,
    pub name: String,
    pub timezone: String,
    pub state_tax_rate: Decimal,
    pub county_tax_rate: Decimal,
    pub city_tax_rate: Decimal,
    pub rental_surcharge_rate: Decimal,
    pub service_fee_percent: Decimal,
    pub delivery_fee: Decimal,
    pub airport_fee: Decimal,
    pub is_operating: bool,
}

impl Market {
    pub fn tax_stack(&self) -> crate::methods::money::TaxStack {
        crate::methods::money::TaxStack {
            state_rate: self.state_tax_rate,
            county_rate: self.county_tax_rate,
            city_rate: self.city_tax_rate,
            rental_surcharge_rate: self.rental_surcharge_rate,
        }
    }

    pub fn delivery_fee_for(&self, pickup_type: PickupType) -> Decimal {
        match pickup_type {
            PickupType::PartnerLocation => Decimal::ZERO,
            PickupType::Delivery => self.delivery_fee,
            PickupType::Airport => self.airport_fee,
        }
    }
}

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = partner_tiers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PartnerTier {
    pub id: i32,
    pub name: String,
    pub commission_rate: Option<Decimal>,
    pub fleet_size: i32,
}

#[derive(
    Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize,
)]
#[diesel(belongs_to(Market))]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(PartnerTier))]
#[diesel(table_name = hosts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Host {
    pub id: i32,
    pub display_name: String,
    pub rating: Decimal,
    pub response_minutes: i32,
    pub contact_email: String,
    pub contact_phone: String,
    pub user_id: i32,
    pub market_id: i32,
    pub partner_tier_id: Option<i32>,
}

#[derive(
    Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize,
)]
#[diesel(belongs_to(Host))]
#[diesel(belongs_to(Market))]
#[diesel(table_name = vehicles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Vehicle {
    pub id: i32,
    pub name: String,
    pub make: String,
    pub model: String,
    pub year: String,
    pub vehicle_type: String,
    pub transmission: String,
    pub seats: i32,
    pub image_link: Option<String>,
    pub available: bool,
    pub daily_rate: Decimal,
    pub weekly_rate: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub min_trip_duration_days: i32,
    pub deposit_amount: Decimal,
    pub exact_address: String,
    pub parking_instructions: Option<String>,
    pub keybox_code: Option<String>,
    pub has_keybox: bool,
    pub host_id: i32,
    pub market_id: i32,
}

impl Vehicle {
    pub fn rate_card(&self) -> crate::methods::rental_rate::RateCard {
        crate::methods::rental_rate::RateCard {
            daily_rate: self.daily_rate,
            weekly_rate: self.weekly_rate,
            monthly_rate: self.monthly_rate,
            min_trip_duration_days: self.min_trip_duration_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceSelection {
    pub source: InsuranceSource,
    pub provider: Option<String>,
    pub policy_number: Option<String>,
}

#[derive(
    Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize,
)]
#[diesel(belongs_to(Host))]
#[diesel(belongs_to(Vehicle))]
#[diesel(belongs_to(Market))]
#[diesel(belongs_to(User, foreign_key = guest_id))]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Booking {
    pub id: i32,
    pub booking_code: String,
    pub status: LifecycleStatus,
    pub verification_status: VerificationStatus,
    pub payment_status: PaymentStatus,
    pub trip_status: Option<TripStatus>,
    pub trip_started_at: Option<DateTime<Utc>>,
    pub trip_ended_at: Option<DateTime<Utc>>,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub pickup_timezone: String,
    pub pickup_at: DateTime<Utc>,
    pub drop_off_at: DateTime<Utc>,
    pub pickup_type: PickupType,
    pub daily_rate: Decimal,
    pub number_of_days: i32,
    pub subtotal: Decimal,
    pub service_fee: Decimal,
    pub delivery_fee: Decimal,
    pub insurance_fee: Decimal,
    pub taxes: Decimal,
    pub deposit_amount: Decimal,
    pub total_amount: Decimal,
    pub exact_address: Option<String>,
    pub parking_instructions: Option<String>,
    pub keybox_code: Option<String>,
    pub has_keybox: bool,
    pub insurance_source: InsuranceSource,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub guest_id: i32,
    pub host_id: i32,
    pub vehicle_id: i32,
    pub market_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn insurance_selection(&self) -> InsuranceSelection {
        InsuranceSelection {
            source: self.insurance_source,
            provider: self.insurance_provider.clone(),
            policy_number: self.insurance_policy_number.clone(),
        }
    }
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Host))]
#[diesel(belongs_to(Vehicle))]
#[diesel(belongs_to(Market))]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBooking {
    pub booking_code: String,
    pub status: LifecycleStatus,
    pub verification_status: VerificationStatus,
    pub payment_status: PaymentStatus,
    pub trip_status: Option<TripStatus>,
    pub trip_started_at: Option<DateTime<Utc>>,
    pub trip_ended_at: Option<DateTime<Utc>>,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub pickup_timezone: String,
    pub pickup_at: DateTime<Utc>,
    pub drop_off_at: DateTime<Utc>,
    pub pickup_type: PickupType,
    pub daily_rate: Decimal,
    pub number_of_days: i32,
    pub subtotal: Decimal,
    pub service_fee: Decimal,
    pub delivery_fee: Decimal,
    pub insurance_fee: Decimal,
    pub taxes: Decimal,
    pub deposit_amount: Decimal,
    pub total_amount: Decimal,
    pub exact_address: Option<String>,
    pub parking_instructions: Option<String>,
    pub keybox_code: Option<String>,
    pub has_keybox: bool,
    pub insurance_source: InsuranceSource,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub guest_id: i32,
    pub host_id: i32,
    pub vehicle_id: i32,
    pub market_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize,
)]
#[diesel(belongs_to(Booking))]
#[diesel(table_name = charges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Charge {
    pub id: i32,
    pub name: String,
    pub time: DateTime<Utc>,
    pub amount: Decimal,
    pub note: Option<String>,
    pub settled: bool,
    pub booking_id: i32,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Booking))]
#[diesel(table_name = charges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCharge {
    pub name: String,
    pub time: DateTime<Utc>,
    pub amount: Decimal,
    pub note: Option<String>,
    pub settled: bool,
    pub booking_id: i32,
}

#[derive(
    Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize,
)]
#[diesel(belongs_to(Booking))]
#[diesel(belongs_to(User))]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Payment {
    pub id: i32,
    pub payment_type: PaymentType,
    pub time: DateTime<Utc>,
    pub amount: Decimal,
    pub note: Option<String>,
    pub reference_number: Option<String>,
    pub booking_id: i32,
    pub user_id: i32,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(belongs_to(Booking))]
#[diesel(belongs_to(User))]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPayment {
    pub payment_type: PaymentType,
    pub time: DateTime<Utc>,
    pub amount: Decimal,
    pub note: Option<String>,
    pub reference_number: Option<String>,
    pub booking_id: i32,
    pub user_id: i32,
}

#[derive(
    Queryable, Identifiable, Associations, Debug, Clone, PartialEq, Serialize, Deserialize,
)]
#[diesel(belongs_to(Booking))]
#[diesel(table_name = disputes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Dispute {
    pub id: i32,
    pub reason: String,
    pub opened_by: i32,
    pub opened_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub booking_id: i32,
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_tokens_normalize_regardless_of_case() {
        assert_eq!(
            LifecycleStatus::from_legacy("CONFIRMED").unwrap(),
            LifecycleStatus::Confirmed
        );
        assert_eq!(
            LifecycleStatus::from_legacy("pending").unwrap(),
            LifecycleStatus::Pending
        );
        assert_eq!(
            LifecycleStatus::from_legacy("Canceled").unwrap(),
            LifecycleStatus::Cancelled
        );
    }

    #[test]
    fn verified_is_a_synonym_for_approved() {
        assert_eq!(
            VerificationStatus::from_legacy("verified").unwrap(),
            VerificationStatus::Approved
        );
        assert_eq!(
            VerificationStatus::from_legacy("APPROVED").unwrap(),
            VerificationStatus::Approved
        );
    }

    #[test]
    fn captured_is_a_synonym_for_paid() {
        assert_eq!(
            PaymentStatus::from_legacy("Captured").unwrap(),
            PaymentStatus::Paid
        );
        assert_eq!(
            PaymentStatus::from_legacy("paid").unwrap(),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn unknown_token_is_an_error() {
        let err = LifecycleStatus::from_legacy("archived").unwrap_err();
        assert!(err.to_string().contains("archived"));
    }
}

#[cfg(test)]
pub mod test_fixtures {
    use super::*;
    use rust_decimal::Decimal;

    pub fn sample_market() -> Market {
        Market {
            id: 1,
            name: String::from("Austin"),
            timezone: String::from("America/Chicago"),
            state_tax_rate: Decimal::new(625, 4),        // 6.25%
            county_tax_rate: Decimal::new(100, 4),       // 1.00%
            city_tax_rate: Decimal::new(125, 4),         // 1.25%
            rental_surcharge_rate: Decimal::new(500, 4), // 5.00%
            service_fee_percent: Decimal::new(10, 2),    // 10%
            delivery_fee: Decimal::new(4500, 2),
            airport_fee: Decimal::new(6500, 2),
            is_operating: true,
        }
    }

    pub fn sample_host() -> Host {
        Host {
            id: 7,
            display_name: String::from("Morgan's Garage"),
            rating: Decimal::new(480, 2),
            response_minutes: 25,
            contact_email: String::from("morgan@example.com"),
            contact_phone: String::from("5125550143"),
            user_id: 42,
            market_id: 1,
            partner_tier_id: Some(2),
        }
    }

    pub fn sample_vehicle() -> Vehicle {
        Vehicle {
            id: 11,
            name: String::from("Blue Crosstrek"),
            make: String::from("Subaru"),
            model: String::from("Crosstrek"),
            year: String::from("2023"),
            vehicle_type: String::from("SUV"),
            transmission: String::from("Automatic"),
            seats: 5,
            image_link: None,
            available: true,
            daily_rate: Decimal::new(5000, 2),
            weekly_rate: None,
            monthly_rate: None,
            min_trip_duration_days: 1,
            deposit_amount: Decimal::new(20000, 2),
            exact_address: String::from("808 Rio Grande St, Austin, TX 78701"),
            parking_instructions: Some(String::from("Spot 14 behind the gate")),
            keybox_code: Some(String::from("4417")),
            has_keybox: true,
            host_id: 7,
            market_id: 1,
        }
    }

    pub fn sample_booking() -> Booking {
        let start_date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let end_date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let start_time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let end_time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        Booking {
            id: 99,
            booking_code: String::from("Q7RK2M8D"),
            status: LifecycleStatus::Confirmed,
            verification_status: VerificationStatus::Approved,
            payment_status: PaymentStatus::Paid,
            trip_status: None,
            trip_started_at: None,
            trip_ended_at: None,
            start_date,
            start_time,
            end_date,
            end_time,
            pickup_timezone: String::from("America/Chicago"),
            pickup_at: DateTime::parse_from_rfc3339("2026-03-10T15:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            drop_off_at: DateTime::parse_from_rfc3339("2026-03-14T15:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            pickup_type: PickupType::PartnerLocation,
            daily_rate: Decimal::new(5000, 2),
            number_of_days: 4,
            subtotal: Decimal::new(20000, 2),
            service_fee: Decimal::new(2000, 2),
            delivery_fee: Decimal::ZERO,
            insurance_fee: Decimal::ZERO,
            taxes: Decimal::new(2970, 2),
            deposit_amount: Decimal::new(20000, 2),
            total_amount: Decimal::new(24970, 2),
            exact_address: Some(String::from("808 Rio Grande St, Austin, TX 78701")),
            parking_instructions: Some(String::from("Spot 14 behind the gate")),
            keybox_code: Some(String::from("4417")),
            has_keybox: true,
            insurance_source: InsuranceSource::Vehicle,
            insurance_provider: None,
            insurance_policy_number: None,
            guest_id: 3,
            host_id: 7,
            vehicle_id: 11,
            market_id: 1,
            created_at: DateTime::parse_from_rfc3339("2026-02-20T18:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }
}

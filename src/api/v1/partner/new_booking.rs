use crate::helper_model::DriveshareError;
use crate::{methods, model, POOL};
use chrono::{NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
struct PartnerBookingRequestBodyData {
    vehicle_id: i32,
    guest_email: String,
    start_date: NaiveDate,
    start_time: NaiveTime,
    end_date: NaiveDate,
    end_time: NaiveTime,
    pickup_type: String,
    custom_daily_rate: Option<f64>,
    insurance_source: String,
    insurance_provider: Option<String>,
    insurance_policy_number: Option<String>,
    insurance_fee: Option<f64>,
}

/// Partners can author bookings for their own vehicles with custom pricing
/// and their own insurance arrangement. The booking still starts Pending and
/// walks the same verification and payment gates as a guest-created one.
pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("new-booking")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method,
                        body: PartnerBookingRequestBodyData,
                        auth: String,
                        user_agent: String| {
                if method != Method::POST {
                    return methods::standard_replies::method_not_allowed_response();
                }

                let token_and_id = auth.split("$").collect::<Vec<&str>>();
                if token_and_id.len() != 2 {
                    return methods::tokens::token_invalid_return();
                }
                let user_id = match token_and_id[1].parse::<i32>() {
                    Ok(int) => int,
                    Err(_) => {
                        return methods::tokens::token_invalid_return();
                    }
                };
                let access_token = model::RequestToken {
                    user_id,
                    token: String::from(token_and_id[0]),
                };
                let token_row = match methods::tokens::verify_user_token(
                    &access_token.user_id,
                    &access_token.token,
                ) {
                    Err(DriveshareError::TokenFormatError) => {
                        return methods::tokens::token_not_hex_warp_return();
                    }
                    Err(DriveshareError::InvalidToken) => {
                        return methods::tokens::token_invalid_return();
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from(
                                "partner/new-booking: Token verification unexpected error",
                            ),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/new-booking: Token extension error"),
                    );
                }

                let Ok(partner_user) = methods::user::get_user_by_id(&access_token.user_id) else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/new-booking: Database error loading user"),
                    );
                };
                if !partner_user.is_partner() {
                    return methods::standard_replies::user_not_partner();
                }
                let host = match methods::user::get_host_for_user(&access_token.user_id) {
                    Ok(Some(host)) => host,
                    Ok(None) => {
                        return methods::standard_replies::user_not_partner();
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("partner/new-booking: Database error loading host"),
                        );
                    }
                };

                let pickup_type = match model::PickupType::from_legacy(&body.pickup_type) {
                    Ok(parsed) => parsed,
                    Err(_) => {
                        return methods::standard_replies::bad_request("Unrecognized pickup type");
                    }
                };
                let insurance_source =
                    match model::InsuranceSource::from_legacy(&body.insurance_source) {
                        Ok(parsed) => parsed,
                        Err(_) => {
                            return methods::standard_replies::bad_request(
                                "Unrecognized insurance source",
                            );
                        }
                    };

                let mut pool = POOL.get().unwrap();
                use crate::schema::markets::dsl as m_q;
                use crate::schema::vehicles::dsl as v_q;
                let vehicle_result = v_q::vehicles
                    .find(&body.vehicle_id)
                    .get_result::<model::Vehicle>(&mut pool);
                let Ok(vehicle) = vehicle_result else {
                    return methods::standard_replies::bad_request("Vehicle invalid");
                };
                if vehicle.host_id != host.id {
                    return methods::standard_replies::booking_not_allowed_response();
                }
                let Ok(market) = m_q::markets
                    .find(&vehicle.market_id)
                    .get_result::<model::Market>(&mut pool)
                else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/new-booking: Database error loading market"),
                    );
                };
                if !market.is_operating {
                    return methods::standard_replies::market_not_operational();
                }

                let Ok(Some(guest)) = methods::user::get_user_by_email(&body.guest_email) else {
                    return methods::standard_replies::bad_request(
                        "No guest account exists for that email",
                    );
                };

                let pickup_at = match methods::timestamps::local_to_utc(
                    body.start_date,
                    body.start_time,
                    &market.timezone,
                ) {
                    Ok(instant) => instant,
                    Err(_) => {
                        return methods::standard_replies::bad_request(
                            "Pickup time is not valid in the market timezone",
                        );
                    }
                };
                let drop_off_at = match methods::timestamps::local_to_utc(
                    body.end_date,
                    body.end_time,
                    &market.timezone,
                ) {
                    Ok(instant) => instant,
                    Err(_) => {
                        return methods::standard_replies::bad_request(
                            "Return time is not valid in the market timezone",
                        );
                    }
                };
                let days = match methods::rental_rate::rental_days(drop_off_at - pickup_at) {
                    Ok(days) => days,
                    Err(_) => {
                        return methods::standard_replies::bad_request(
                            "Return must come after pickup; same-day returns are not offered",
                        );
                    }
                };
                if days < vehicle.min_trip_duration_days {
                    return methods::standard_replies::bad_request(
                        "Trip is shorter than the vehicle's minimum duration",
                    );
                }

                match methods::booking::dates_available(vehicle.id, pickup_at, drop_off_at, None) {
                    Ok(true) => {}
                    Ok(false) => {
                        return methods::standard_replies::dates_unavailable_response();
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from(
                                "partner/new-booking: Database error checking availability",
                            ),
                        );
                    }
                }

                // custom pricing: the partner's daily rate override re-derives
                // the weekly/monthly discount floors
                let mut rate_card = vehicle.rate_card();
                if let Some(rate_override) = body.custom_daily_rate {
                    let parsed = match methods::money::money_from_f64(rate_override, "daily rate") {
                        Ok(parsed) => parsed,
                        Err(DriveshareError::InvalidAmount(detail)) => {
                            return methods::standard_replies::bad_request(&detail);
                        }
                        Err(_) => {
                            return methods::standard_replies::internal_server_error_response(
                                String::from("partner/new-booking: Rate parse error"),
                            );
                        }
                    };
                    rate_card = methods::rental_rate::RateCard {
                        daily_rate: parsed,
                        weekly_rate: None,
                        monthly_rate: None,
                        min_trip_duration_days: rate_card.min_trip_duration_days,
                    };
                }
                let insurance_fee = match body.insurance_fee {
                    Some(fee) => match methods::money::money_from_f64(fee, "insurance fee") {
                        Ok(parsed) => parsed,
                        Err(DriveshareError::InvalidAmount(detail)) => {
                            return methods::standard_replies::bad_request(&detail);
                        }
                        Err(_) => {
                            return methods::standard_replies::internal_server_error_response(
                                String::from("partner/new-booking: Fee parse error"),
                            );
                        }
                    },
                    None => Decimal::ZERO,
                };

                let price = match methods::pricing::quote_price(
                    &rate_card,
                    pickup_at,
                    drop_off_at,
                    pickup_type,
                    &market,
                )
                .and_then(|price| price.with_insurance_fee(insurance_fee))
                {
                    Ok(price) => price,
                    Err(DriveshareError::InvalidAmount(detail)) => {
                        return methods::standard_replies::bad_request(&detail);
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("partner/new-booking: Pricing error"),
                        );
                    }
                };
                if price.check_itemized_total().is_err() {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/new-booking: Quote failed the itemized total check"),
                    );
                }

                let compliance_warning = match insurance_source {
                    model::InsuranceSource::None => Some(String::from(
                        "No insurance coverage is attached to this booking. The partner is responsible for state minimum coverage.",
                    )),
                    _ => None,
                };

                let new_booking = model::NewBooking {
                    booking_code: methods::booking::generate_unique_booking_code(),
                    status: model::LifecycleStatus::Pending,
                    verification_status: model::VerificationStatus::Pending,
                    payment_status: model::PaymentStatus::Pending,
                    trip_status: None,
                    trip_started_at: None,
                    trip_ended_at: None,
                    start_date: body.start_date,
                    start_time: body.start_time,
                    end_date: body.end_date,
                    end_time: body.end_time,
                    pickup_timezone: market.timezone.clone(),
                    pickup_at,
                    drop_off_at,
                    pickup_type,
                    daily_rate: rate_card.daily_rate,
                    number_of_days: days,
                    subtotal: price.subtotal,
                    service_fee: price.service_fee,
                    delivery_fee: price.delivery_fee,
                    insurance_fee: price.insurance_fee,
                    taxes: price.taxes.total_taxes,
                    deposit_amount: vehicle.deposit_amount,
                    total_amount: price.total,
                    exact_address: Some(vehicle.exact_address.clone()),
                    parking_instructions: vehicle.parking_instructions.clone(),
                    keybox_code: vehicle.keybox_code.clone(),
                    has_keybox: vehicle.has_keybox,
                    insurance_source,
                    insurance_provider: body.insurance_provider.clone(),
                    insurance_policy_number: body.insurance_policy_number.clone(),
                    guest_id: guest.id,
                    host_id: host.id,
                    vehicle_id: vehicle.id,
                    market_id: market.id,
                    created_at: Utc::now(),
                };
                use crate::schema::bookings::dsl as b_q;
                let inserted = diesel::insert_into(b_q::bookings)
                    .values(&new_booking)
                    .get_result::<model::Booking>(&mut pool);
                let Ok(booking) = inserted else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/new-booking: SQL error inserting booking"),
                    );
                };

                let reply = serde_json::json!({
                    "booking_code": booking.booking_code,
                    "status": booking.status,
                    "price": price,
                    "insurance_source": booking.insurance_source,
                    "compliance_warning": compliance_warning,
                });
                methods::standard_replies::response_with_obj(reply, StatusCode::CREATED)
            },
        )
}

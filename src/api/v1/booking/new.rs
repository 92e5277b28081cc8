use crate::helper_model::DriveshareError;
use crate::{helper_model, methods, model, POOL};
use chrono::{NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct NewBookingRequestBodyData {
    vehicle_id: i32,
    start_date: NaiveDate,
    start_time: NaiveTime,
    end_date: NaiveDate,
    end_time: NaiveTime,
    pickup_type: String,
    insurance_provider: Option<String>,
    insurance_policy_number: Option<String>,
}

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("new")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method,
                        body: NewBookingRequestBodyData,
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
                            String::from("booking/new: Token verification unexpected error"),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/new: Token extension error"),
                    );
                }

                // 0. normalize the pickup type token from the wire
                let pickup_type = match model::PickupType::from_legacy(&body.pickup_type) {
                    Ok(parsed) => parsed,
                    Err(_) => {
                        return methods::standard_replies::bad_request(
                            "Unrecognized pickup type",
                        );
                    }
                };

                let mut pool = POOL.get().unwrap();

                // 1. vehicle, host and market must all be bookable
                use crate::schema::hosts::dsl as h_q;
                use crate::schema::markets::dsl as m_q;
                use crate::schema::vehicles::dsl as v_q;
                let vehicle_result = v_q::vehicles
                    .find(&body.vehicle_id)
                    .get_result::<model::Vehicle>(&mut pool);
                let Ok(vehicle) = vehicle_result else {
                    return methods::standard_replies::bad_request("Vehicle invalid");
                };
                if !vehicle.available {
                    return methods::standard_replies::dates_unavailable_response();
                }
                let market_result = m_q::markets
                    .find(&vehicle.market_id)
                    .get_result::<model::Market>(&mut pool);
                let Ok(market) = market_result else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/new: Database error loading market"),
                    );
                };
                if !market.is_operating {
                    return methods::standard_replies::market_not_operational();
                }
                let host_result = h_q::hosts
                    .find(&vehicle.host_id)
                    .get_result::<model::Host>(&mut pool);
                let Ok(host) = host_result else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/new: Database error loading host"),
                    );
                };

                // 2. the requested window, on the market's wall clock
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
                if pickup_at <= Utc::now() {
                    return methods::standard_replies::bad_request(
                        "Pickup time must be in the future",
                    );
                }
                let days = match methods::rental_rate::rental_days(drop_off_at - pickup_at) {
                    Ok(days) => days,
                    Err(_) => {
                        return methods::standard_replies::bad_request(
                            "Return must come after pickup; same-day returns are not offered",
                        );
                    }
                };
                // minimum-duration is enforced here, not inside the calculator
                if days < vehicle.min_trip_duration_days {
                    return methods::standard_replies::bad_request(
                        "Trip is shorter than the vehicle's minimum duration",
                    );
                }

                // 3. availability, then price
                match methods::booking::dates_available(vehicle.id, pickup_at, drop_off_at, None) {
                    Ok(true) => {}
                    Ok(false) => {
                        return methods::standard_replies::dates_unavailable_response();
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("booking/new: Database error checking availability"),
                        );
                    }
                }
                let price = match methods::pricing::quote_price(
                    &vehicle.rate_card(),
                    pickup_at,
                    drop_off_at,
                    pickup_type,
                    &market,
                ) {
                    Ok(price) => price,
                    Err(DriveshareError::InvalidAmount(detail)) => {
                        return methods::standard_replies::bad_request(&detail);
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("booking/new: Pricing error"),
                        );
                    }
                };
                if price.check_itemized_total().is_err() {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/new: Quote failed the itemized total check"),
                    );
                }

                // 4. persist the Pending booking with the quote snapshot
                let insurance_source = if body.insurance_provider.is_some() {
                    model::InsuranceSource::Guest
                } else {
                    model::InsuranceSource::Vehicle
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
                    daily_rate: vehicle.daily_rate,
                    number_of_days: days,
                    subtotal: price.subtotal,
                    service_fee: price.service_fee,
                    delivery_fee: price.delivery_fee,
                    insurance_fee: Decimal::ZERO,
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
                    guest_id: access_token.user_id,
                    host_id: vehicle.host_id,
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
                        String::from("booking/new: SQL error inserting booking"),
                    );
                };

                // A fresh Pending booking always renders at the basic level.
                let view: helper_model::GuestBookingView = methods::disclosure::redact(
                    &booking,
                    &host,
                    &vehicle,
                    false,
                    methods::disclosure::ProgressiveInfoLevel::Basic,
                );
                let reply = serde_json::json!({"booking": view, "price": price});
                methods::standard_replies::response_with_obj(reply, StatusCode::CREATED)
            },
        )
}

use crate::helper_model::DriveshareError;
use crate::{methods, model, POOL};
use chrono::Utc;
use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
struct AddChargeRequestBodyData {
    booking_id: i32,
    name: String,
    amount: f64,
    note: Option<String>,
}

/// Post-trip settlement line: extra mileage, fuel, damage. Only a finished
/// trip can accrue one, and adding it re-opens the booking to the
/// pending-charges state until everything is settled.
pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("add-charge")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method,
                        body: AddChargeRequestBodyData,
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
                            String::from("partner/add-charge: Token verification unexpected error"),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/add-charge: Token extension error"),
                    );
                }

                let Ok(partner_user) = methods::user::get_user_by_id(&access_token.user_id) else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/add-charge: Database error loading user"),
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
                            String::from("partner/add-charge: Database error loading host"),
                        );
                    }
                };

                let amount = match methods::money::money_from_f64(body.amount, "charge amount") {
                    Ok(amount) => amount,
                    Err(DriveshareError::InvalidAmount(detail)) => {
                        return methods::standard_replies::bad_request(&detail);
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("partner/add-charge: Amount parse error"),
                        );
                    }
                };

                let mut pool = POOL.get().unwrap();
                use crate::schema::bookings::dsl as b_q;
                let booking_result = b_q::bookings
                    .filter(b_q::id.eq(&body.booking_id))
                    .filter(b_q::host_id.eq(&host.id))
                    .get_result::<model::Booking>(&mut pool);
                let Ok(booking) = booking_result else {
                    return methods::standard_replies::booking_not_allowed_response();
                };

                let state = methods::booking_state::effective_state(&booking);
                if !state.is_completed {
                    return methods::standard_replies::invalid_state_response(
                        "post-trip charges require a finished trip",
                    );
                }

                use crate::schema::charges::dsl as c_q;
                let new_charge = model::NewCharge {
                    name: body.name.clone(),
                    time: Utc::now(),
                    amount,
                    note: body.note.clone(),
                    settled: false,
                    booking_id: booking.id,
                };
                let inserted = diesel::insert_into(c_q::charges)
                    .values(&new_charge)
                    .get_result::<model::Charge>(&mut pool);
                let Ok(charge) = inserted else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/add-charge: SQL error inserting charge"),
                    );
                };

                // Completed -> Pending with trip_ended_at intact. A booking
                // already sitting in pending-charges just keeps the state.
                let reopened = match methods::booking::reopen_for_charges(booking.id) {
                    Ok(Some(updated)) => updated,
                    Ok(None) => booking,
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("partner/add-charge: SQL error re-opening booking"),
                        );
                    }
                };

                let reply = serde_json::json!({
                    "charge": charge,
                    "booking_code": reopened.booking_code,
                    "status": reopened.status,
                });
                methods::standard_replies::response_with_obj(reply, StatusCode::CREATED)
            },
        )
}

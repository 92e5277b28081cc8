use crate::helper_model::DriveshareError;
use crate::{integration, methods, model, POOL};
use chrono::Utc;
use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct StartTripRequestBodyData {
    booking_id: i32,
}

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("start-trip")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method,
                        body: StartTripRequestBodyData,
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
                            String::from("booking/start-trip: Token verification unexpected error"),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/start-trip: Token extension error"),
                    );
                }

                let mut pool = POOL.get().unwrap();
                use crate::schema::bookings::dsl as b_q;
                let booking_result = b_q::bookings
                    .filter(b_q::id.eq(&body.booking_id))
                    .filter(b_q::guest_id.eq(&access_token.user_id))
                    .get_result::<model::Booking>(&mut pool);
                let Ok(booking) = booking_result else {
                    return methods::standard_replies::booking_not_allowed_response();
                };
                match methods::timestamps::drop_off_instant(&booking) {
                    Ok(drop_off) => {
                        if Utc::now() > drop_off {
                            return methods::standard_replies::invalid_state_response(
                                "the booking window has already passed",
                            );
                        }
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("booking/start-trip: Timezone error on booking window"),
                        );
                    }
                }

                // Single atomic transition. Once this lands, any in-flight
                // cancellation request loses.
                let started = match methods::booking::start_trip(booking.id, Utc::now()) {
                    Ok(started) => started,
                    Err(DriveshareError::InvalidStateTransition(detail)) => {
                        return methods::standard_replies::invalid_state_response(&detail);
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("booking/start-trip: SQL error starting trip"),
                        );
                    }
                };

                use crate::schema::hosts::dsl as h_q;
                if let Ok(host) = h_q::hosts
                    .find(&started.host_id)
                    .get_result::<model::Host>(&mut pool)
                {
                    integration::sendgrid_driveshare::notify(
                        host.contact_email,
                        host.display_name,
                        format!("Trip started for booking {}", started.booking_code),
                        format!(
                            "The guest picked up the vehicle for booking {}.",
                            started.booking_code
                        ),
                    );
                }

                let reply = serde_json::json!({
                    "booking_code": started.booking_code,
                    "status": started.status,
                    "trip_started_at": started.trip_started_at,
                });
                methods::standard_replies::response_with_obj(reply, StatusCode::OK)
            },
        )
}

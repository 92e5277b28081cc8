use crate::helper_model::DriveshareError;
use crate::{methods, model, POOL};
use chrono::Utc;
use diesel::prelude::*;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("get")
        .and(warp::path::param::<i32>())
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |booking_id: i32, auth: String, user_agent: String| {
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
                            String::from("booking/get: Token verification unexpected error"),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/get: Token extension error"),
                    );
                }

                let mut pool = POOL.get().unwrap();

                use crate::schema::bookings::dsl as b_q;
                let booking_result = b_q::bookings
                    .filter(b_q::id.eq(&booking_id))
                    .filter(b_q::guest_id.eq(&access_token.user_id))
                    .get_result::<model::Booking>(&mut pool);
                let Ok(booking) = booking_result else {
                    return methods::standard_replies::booking_not_allowed_response();
                };

                use crate::schema::hosts::dsl as h_q;
                use crate::schema::vehicles::dsl as v_q;
                let host_result = h_q::hosts
                    .find(&booking.host_id)
                    .get_result::<model::Host>(&mut pool);
                let vehicle_result = v_q::vehicles
                    .find(&booking.vehicle_id)
                    .get_result::<model::Vehicle>(&mut pool);
                let (Ok(host), Ok(vehicle)) = (host_result, vehicle_result) else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/get: Database error loading host or vehicle"),
                    );
                };

                use crate::schema::disputes::dsl as d_q;
                let open_dispute = d_q::disputes
                    .filter(d_q::booking_id.eq(&booking.id))
                    .filter(d_q::resolved_at.is_null())
                    .first::<model::Dispute>(&mut pool)
                    .optional()
                    .unwrap_or(None);
                let has_open_dispute = open_dispute.is_some();

                let level = match methods::disclosure::info_level(&booking, Utc::now()) {
                    Ok(level) => level,
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("booking/get: Disclosure level error"),
                        );
                    }
                };
                let view =
                    methods::disclosure::redact(&booking, &host, &vehicle, has_open_dispute, level);
                methods::standard_replies::response_with_obj(view, StatusCode::OK)
            },
        )
}

use crate::helper_model::DriveshareError;
use crate::{methods, model, POOL};
use chrono::Utc;
use diesel::prelude::*;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Pure preview of what a cancellation would return right now. Guests call
/// this before confirming; the cancel endpoint runs the same calculator, so
/// previewing twice or previewing then cancelling yields the same numbers.
pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("refund-quote")
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
                            String::from(
                                "booking/refund-quote: Token verification unexpected error",
                            ),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/refund-quote: Token extension error"),
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

                // quoting tool only: reject anything not in a cancellable state
                if let Err(e) = methods::booking::ensure_cancellable(&booking) {
                    return methods::standard_replies::invalid_state_response(&e.to_string());
                }

                match methods::refund::quote_refund_for_booking(&booking, Utc::now()) {
                    Ok(quote) => {
                        methods::standard_replies::response_with_obj(quote, StatusCode::OK)
                    }
                    Err(DriveshareError::InvalidAmount(detail)) => {
                        methods::standard_replies::bad_request(&detail)
                    }
                    Err(_) => methods::standard_replies::internal_server_error_response(
                        String::from("booking/refund-quote: Refund calculation error"),
                    ),
                }
            },
        )
}

use crate::helper_model::DriveshareError;
use crate::{integration, methods, model, POOL};
use chrono::Utc;
use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct CancelRequestBodyData {
    booking_id: i32,
}

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("cancel")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method,
                        body: CancelRequestBodyData,
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
                            String::from("booking/cancel: Token verification unexpected error"),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/cancel: Token extension error"),
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
                if let Err(e) = methods::booking::ensure_cancellable(&booking) {
                    return methods::standard_replies::invalid_state_response(&e.to_string());
                }

                // 1. quote first; the quote that is shown is the quote that pays
                let quote = match methods::refund::quote_refund_for_booking(&booking, Utc::now()) {
                    Ok(quote) => quote,
                    Err(DriveshareError::InvalidAmount(detail)) => {
                        return methods::standard_replies::bad_request(&detail);
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("booking/cancel: Refund calculation error"),
                        );
                    }
                };

                // 2. the conditional update is the decision point; a
                // concurrent trip-start wins and this returns the state error
                let cancelled = match methods::booking::cancel(booking.id) {
                    Ok(cancelled) => cancelled,
                    Err(DriveshareError::InvalidStateTransition(detail)) => {
                        return methods::standard_replies::invalid_state_response(&detail);
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("booking/cancel: SQL error cancelling booking"),
                        );
                    }
                };

                // 3. ledger row for the refund that the mutation produced
                use crate::schema::payments::dsl as p_q;
                let refund_row = model::NewPayment {
                    payment_type: model::PaymentType::Refund,
                    time: Utc::now(),
                    amount: quote.total_refund,
                    note: Some(quote.label.clone()),
                    reference_number: None,
                    booking_id: cancelled.id,
                    user_id: cancelled.guest_id,
                };
                let payment_result = diesel::insert_into(p_q::payments)
                    .values(&refund_row)
                    .get_result::<model::Payment>(&mut pool);
                if payment_result.is_err() {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/cancel: SQL error inserting refund payment"),
                    );
                }

                if let Ok(guest) = methods::user::get_user_by_id(&cancelled.guest_id) {
                    integration::sendgrid_driveshare::notify(
                        guest.email,
                        guest.name,
                        format!("Booking {} cancelled", cancelled.booking_code),
                        format!(
                            "Your booking {} was cancelled. {}: {} will be returned to your payment method.",
                            cancelled.booking_code, quote.label, quote.total_refund
                        ),
                    );
                }

                let reply = serde_json::json!({
                    "booking_code": cancelled.booking_code,
                    "status": cancelled.status,
                    "refund": quote,
                });
                methods::standard_replies::response_with_obj(reply, StatusCode::OK)
            },
        )
}

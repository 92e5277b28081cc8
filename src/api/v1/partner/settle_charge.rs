use crate::helper_model::DriveshareError;
use crate::{methods, model, POOL};
use chrono::Utc;
use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct SettleChargeRequestBodyData {
    charge_id: i32,
    reference_number: Option<String>,
}

/// Marks a post-trip charge as collected. When the last unsettled charge on
/// a pending-charges booking settles, the booking closes back to Completed.
pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("settle-charge")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method,
                        body: SettleChargeRequestBodyData,
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
                                "partner/settle-charge: Token verification unexpected error",
                            ),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/settle-charge: Token extension error"),
                    );
                }

                let Ok(partner_user) = methods::user::get_user_by_id(&access_token.user_id) else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/settle-charge: Database error loading user"),
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
                            String::from("partner/settle-charge: Database error loading host"),
                        );
                    }
                };

                let mut pool = POOL.get().unwrap();
                use crate::schema::bookings::dsl as b_q;
                use crate::schema::charges::dsl as c_q;
                let charge_result = c_q::charges
                    .inner_join(b_q::bookings)
                    .filter(c_q::id.eq(&body.charge_id))
                    .filter(b_q::host_id.eq(&host.id))
                    .select((c_q::charges::all_columns(), b_q::bookings::all_columns()))
                    .get_result::<(model::Charge, model::Booking)>(&mut pool);
                let Ok((charge, booking)) = charge_result else {
                    return methods::standard_replies::booking_not_allowed_response();
                };
                if charge.settled {
                    return methods::standard_replies::invalid_state_response(
                        "charge is already settled",
                    );
                }

                let settled_charge = diesel::update(c_q::charges.find(&charge.id))
                    .set(c_q::settled.eq(true))
                    .get_result::<model::Charge>(&mut pool);
                let Ok(settled_charge) = settled_charge else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/settle-charge: SQL error settling charge"),
                    );
                };

                use crate::schema::payments::dsl as p_q;
                let charge_payment = model::NewPayment {
                    payment_type: model::PaymentType::Charge,
                    time: Utc::now(),
                    amount: settled_charge.amount,
                    note: Some(format!("Post-trip charge: {}", settled_charge.name)),
                    reference_number: body.reference_number.clone(),
                    booking_id: booking.id,
                    user_id: booking.guest_id,
                };
                if diesel::insert_into(p_q::payments)
                    .values(&charge_payment)
                    .get_result::<model::Payment>(&mut pool)
                    .is_err()
                {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/settle-charge: SQL error inserting payment"),
                    );
                }

                // Closes the pending-charges state when nothing is left open.
                let closed = match methods::booking::close_settled(booking.id) {
                    Ok(Some(updated)) => updated,
                    Ok(None) => booking,
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("partner/settle-charge: SQL error closing booking"),
                        );
                    }
                };

                let reply = serde_json::json!({
                    "charge": settled_charge,
                    "booking_code": closed.booking_code,
                    "status": closed.status,
                });
                methods::standard_replies::response_with_obj(reply, StatusCode::OK)
            },
        )
}

use crate::helper_model::DriveshareError;
use crate::{methods, model, POOL};
use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct PayoutQuoteRequestBodyData {
    booking_id: i32,
}

pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("payout-quote")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method,
                        body: PayoutQuoteRequestBodyData,
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
                                "partner/payout-quote: Token verification unexpected error",
                            ),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/payout-quote: Token extension error"),
                    );
                }

                let Ok(partner_user) = methods::user::get_user_by_id(&access_token.user_id) else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/payout-quote: Database error loading user"),
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
                            String::from("partner/payout-quote: Database error loading host"),
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

                use crate::schema::markets::dsl as m_q;
                let Ok(market) = m_q::markets
                    .find(&booking.market_id)
                    .get_result::<model::Market>(&mut pool)
                else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("partner/payout-quote: Database error loading market"),
                    );
                };

                let price = match methods::pricing::breakdown_from_booking(&booking, &market) {
                    Ok(price) => price,
                    Err(DriveshareError::InvalidAmount(detail)) => {
                        return methods::standard_replies::bad_request(&detail);
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("partner/payout-quote: Breakdown reconstruction error"),
                        );
                    }
                };

                // No tier configured for this host is a hard error, never a
                // silent zero-commission payout.
                let tier = match host.partner_tier_id {
                    Some(tier_id) => {
                        use crate::schema::partner_tiers::dsl as t_q;
                        match t_q::partner_tiers
                            .find(tier_id)
                            .get_result::<model::PartnerTier>(&mut pool)
                        {
                            Ok(tier) => Some(tier),
                            Err(_) => None,
                        }
                    }
                    None => None,
                };

                match methods::pricing::quote_partner_payout(
                    &price,
                    tier.as_ref(),
                    &booking.insurance_selection(),
                ) {
                    Ok(payout) => {
                        methods::standard_replies::response_with_obj(payout, StatusCode::OK)
                    }
                    Err(DriveshareError::MissingCommissionRate) => {
                        methods::standard_replies::invalid_state_response(
                            "no partner tier is configured for this host; payout cannot be quoted",
                        )
                    }
                    Err(DriveshareError::InvalidAmount(detail)) => {
                        methods::standard_replies::bad_request(&detail)
                    }
                    Err(_) => methods::standard_replies::internal_server_error_response(
                        String::from("partner/payout-quote: Payout calculation error"),
                    ),
                }
            },
        )
}

use crate::helper_model::DriveshareError;
use crate::{methods, model, POOL};
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct QuoteRequestBodyData {
    vehicle_id: i32,
    start_date: NaiveDate,
    start_time: NaiveTime,
    end_date: NaiveDate,
    end_time: NaiveTime,
    pickup_type: String,
}

/// Side-effect-free price preview. Nothing is persisted; the booking flows
/// re-run the engine at confirm time instead of trusting a stale preview.
pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("quote")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method,
                        body: QuoteRequestBodyData,
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
                            String::from("booking/quote: Token verification unexpected error"),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/quote: Token extension error"),
                    );
                }

                let pickup_type = match model::PickupType::from_legacy(&body.pickup_type) {
                    Ok(parsed) => parsed,
                    Err(_) => {
                        return methods::standard_replies::bad_request("Unrecognized pickup type");
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
                let market_result = m_q::markets
                    .find(&vehicle.market_id)
                    .get_result::<model::Market>(&mut pool);
                let Ok(market) = market_result else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/quote: Database error loading market"),
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

                match methods::pricing::quote_price(
                    &vehicle.rate_card(),
                    pickup_at,
                    drop_off_at,
                    pickup_type,
                    &market,
                ) {
                    Ok(price) => {
                        methods::standard_replies::response_with_obj(price, StatusCode::OK)
                    }
                    Err(DriveshareError::InvalidAmount(detail)) => {
                        methods::standard_replies::bad_request(&detail)
                    }
                    Err(_) => methods::standard_replies::internal_server_error_response(
                        String::from("booking/quote: Pricing error"),
                    ),
                }
            },
        )
}

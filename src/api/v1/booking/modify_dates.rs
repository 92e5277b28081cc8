use crate::helper_model::DriveshareError;
use crate::{methods, model, POOL};
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct ModifyDatesRequestBodyData {
    booking_id: i32,
    start_date: NaiveDate,
    start_time: NaiveTime,
    end_date: NaiveDate,
    end_time: NaiveTime,
}

/// The confirm half of the preview/confirm pair. The preview is
/// booking/quote; by the time the guest confirms, another guest may have
/// taken the window, so availability and pricing are both re-run against
/// current data and a lost race answers 409 instead of overwriting.
pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("modify-dates")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("auth"))
        .and(warp::header::<String>("user-agent"))
        .and_then(
            async move |method: Method,
                        body: ModifyDatesRequestBodyData,
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
                                "booking/modify-dates: Token verification unexpected error",
                            ),
                        );
                    }
                    Ok(row) => row,
                };
                if methods::tokens::extend_token(token_row, &user_agent) != Ok(true) {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/modify-dates: Token extension error"),
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
                    // same pre-trip window in which dates may still move
                    return methods::standard_replies::invalid_state_response(&e.to_string());
                }

                use crate::schema::markets::dsl as m_q;
                use crate::schema::vehicles::dsl as v_q;
                let vehicle_result = v_q::vehicles
                    .find(&booking.vehicle_id)
                    .get_result::<model::Vehicle>(&mut pool);
                let market_result = m_q::markets
                    .find(&booking.market_id)
                    .get_result::<model::Market>(&mut pool);
                let (Ok(vehicle), Ok(market)) = (vehicle_result, market_result) else {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/modify-dates: Database error loading vehicle or market"),
                    );
                };

                let pickup_at = match methods::timestamps::local_to_utc(
                    body.start_date,
                    body.start_time,
                    &booking.pickup_timezone,
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
                    &booking.pickup_timezone,
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

                // re-validate against current reservations, not the preview
                match methods::booking::dates_available(
                    booking.vehicle_id,
                    pickup_at,
                    drop_off_at,
                    Some(booking.id),
                ) {
                    Ok(true) => {}
                    Ok(false) => {
                        return methods::standard_replies::dates_unavailable_response();
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from(
                                "booking/modify-dates: Database error checking availability",
                            ),
                        );
                    }
                }

                let price = match methods::pricing::quote_price(
                    &vehicle.rate_card(),
                    pickup_at,
                    drop_off_at,
                    booking.pickup_type,
                    &market,
                )
                .and_then(|price| price.with_insurance_fee(booking.insurance_fee))
                {
                    Ok(price) => price,
                    Err(DriveshareError::InvalidAmount(detail)) => {
                        return methods::standard_replies::bad_request(&detail);
                    }
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("booking/modify-dates: Pricing error"),
                        );
                    }
                };
                if price.check_itemized_total().is_err() {
                    return methods::standard_replies::internal_server_error_response(
                        String::from("booking/modify-dates: Quote failed the itemized total check"),
                    );
                }

                // conditional update: the booking must still be in a movable
                // state when the write lands
                let updated = diesel::update(
                    b_q::bookings
                        .filter(b_q::id.eq(&booking.id))
                        .filter(b_q::status.eq_any(vec![
                            model::LifecycleStatus::Pending,
                            model::LifecycleStatus::Confirmed,
                        ]))
                        .filter(b_q::trip_started_at.is_null()),
                )
                .set((
                    b_q::start_date.eq(body.start_date),
                    b_q::start_time.eq(body.start_time),
                    b_q::end_date.eq(body.end_date),
                    b_q::end_time.eq(body.end_time),
                    b_q::pickup_at.eq(pickup_at),
                    b_q::drop_off_at.eq(drop_off_at),
                    b_q::number_of_days.eq(days),
                    b_q::daily_rate.eq(vehicle.daily_rate),
                    b_q::subtotal.eq(price.subtotal),
                    b_q::service_fee.eq(price.service_fee),
                    b_q::delivery_fee.eq(price.delivery_fee),
                    b_q::taxes.eq(price.taxes.total_taxes),
                    b_q::total_amount.eq(price.total),
                ))
                .get_result::<model::Booking>(&mut pool);

                match updated {
                    Ok(updated_booking) => {
                        let reply = serde_json::json!({
                            "booking_code": updated_booking.booking_code,
                            "status": updated_booking.status,
                            "price": price,
                        });
                        methods::standard_replies::response_with_obj(reply, StatusCode::OK)
                    }
                    Err(diesel::result::Error::NotFound) => {
                        methods::standard_replies::invalid_state_response(
                            "booking moved past the point of modification",
                        )
                    }
                    Err(_) => methods::standard_replies::internal_server_error_response(
                        String::from("booking/modify-dates: SQL error saving new dates"),
                    ),
                }
            },
        )
}

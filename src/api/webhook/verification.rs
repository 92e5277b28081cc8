use crate::{integration, methods, model, POOL};
use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};
use std::env;
use warp::http::{Method, StatusCode};
use warp::{Filter, Rejection, Reply};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct VerificationWebhookBodyData {
    booking_code: String,
    status: String,
}

/// The identity verification vendor reports document review outcomes here.
/// Vendor OCR details are out of scope; the tokens arrive in whatever casing
/// the vendor's pipeline produces, including the legacy "verified".
pub fn main() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("verification")
        .and(warp::path::end())
        .and(warp::method())
        .and(warp::body::json())
        .and(warp::header::<String>("x-webhook-secret"))
        .and_then(
            async move |method: Method, body: VerificationWebhookBodyData, secret: String| {
                if method != Method::POST {
                    return methods::standard_replies::method_not_allowed_response();
                }
                let expected = env::var("WEBHOOK_SHARED_SECRET").unwrap_or_default();
                if expected.is_empty() || secret != expected {
                    return methods::standard_replies::invalid_state_response(
                        "webhook secret mismatch",
                    );
                }

                let new_status = match model::VerificationStatus::from_legacy(&body.status) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        return methods::standard_replies::bad_request(&e.to_string());
                    }
                };

                let mut pool = POOL.get().unwrap();
                use crate::schema::bookings::dsl as b_q;
                let updated = diesel::update(
                    b_q::bookings.filter(b_q::booking_code.eq(&body.booking_code)),
                )
                .set(b_q::verification_status.eq(new_status))
                .get_result::<model::Booking>(&mut pool);
                let Ok(booking) = updated else {
                    return methods::standard_replies::bad_request("Unknown booking code");
                };

                let confirmed = match methods::booking::try_confirm(booking.id) {
                    Ok(confirmed) => confirmed,
                    Err(_) => {
                        return methods::standard_replies::internal_server_error_response(
                            String::from("webhook/verification: SQL error confirming booking"),
                        );
                    }
                };
                if let Some(confirmed) = &confirmed {
                    if let Ok(guest) = methods::user::get_user_by_id(&confirmed.guest_id) {
                        integration::sendgrid_driveshare::notify(
                            guest.email,
                            guest.name,
                            format!("Booking {} confirmed", confirmed.booking_code),
                            String::from(
                                "Your documents were approved and your booking is confirmed. Pickup details unlock as your trip approaches.",
                            ),
                        );
                    }
                }

                let reply = serde_json::json!({
                    "booking_code": booking.booking_code,
                    "verification_status": new_status,
                    "confirmed": confirmed.is_some(),
                });
                methods::standard_replies::response_with_obj(reply, StatusCode::OK)
            },
        )
}

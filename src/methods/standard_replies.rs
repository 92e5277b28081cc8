use crate::{helper_model, integration};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

pub fn bad_request(err_msg: &str) -> Result<(warp::reply::Response,), Rejection> {
    let msg: helper_model::ErrorResponse = helper_model::ErrorResponse {
        title: String::from("Bad Request"),
        message: err_msg.to_string(),
    };
    Ok::<_, Rejection>((warp::reply::with_status(
        warp::reply::json(&msg),
        StatusCode::BAD_REQUEST,
    )
    .into_response(),))
}

pub fn internal_server_error_response(msg: String) -> Result<(warp::reply::Response,), Rejection> {
    let _ = tokio::spawn(async move {
        let dev =
            integration::sendgrid_driveshare::make_email_obj("dev@driveshare.rent", "Dev Team");
        let _ = integration::sendgrid_driveshare::send_email(
            Option::from("Driveshare Server"),
            dev,
            "Internal Server Error",
            &msg,
            None,
            None,
        )
        .await;
    });
    let msg: helper_model::ErrorResponse = helper_model::ErrorResponse {
        title: String::from("Internal Server Error"),
        message: String::from("Please try again later. If issue present, contact us at dev@driveshare.rent "),
    };
    Ok::<_, Rejection>((warp::reply::with_status(
        warp::reply::json(&msg),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .into_response(),))
}

pub fn method_not_allowed_response() -> Result<(warp::reply::Response,), Rejection> {
    let msg: helper_model::ErrorResponse = helper_model::ErrorResponse {
        title: String::from("Method Not Allowed"),
        message: String::from("Using third party applications is not encouraged."),
    };
    Ok((warp::reply::with_status(
        warp::reply::json(&msg),
        StatusCode::METHOD_NOT_ALLOWED,
    )
    .into_response(),))
}

pub fn market_not_operational() -> Result<(warp::reply::Response,), Rejection> {
    let msg: helper_model::ErrorResponse = helper_model::ErrorResponse {
        title: String::from("Booking Not Allowed"),
        message: String::from("This market is not currently available for booking."),
    };
    Ok((warp::reply::with_status(warp::reply::json(&msg), StatusCode::FORBIDDEN).into_response(),))
}

pub fn dates_unavailable_response() -> Result<(warp::reply::Response,), Rejection> {
    let msg: helper_model::ErrorResponse = helper_model::ErrorResponse {
        title: String::from("Dates Unavailable"),
        message: String::from(
            "The vehicle is no longer available for the requested time. Please re-quote.",
        ),
    };
    Ok((warp::reply::with_status(warp::reply::json(&msg), StatusCode::CONFLICT).into_response(),))
}

pub fn invalid_state_response(detail: &str) -> Result<(warp::reply::Response,), Rejection> {
    let msg: helper_model::ErrorResponse = helper_model::ErrorResponse {
        title: String::from("Not Allowed In Current State"),
        message: detail.to_string(),
    };
    Ok((warp::reply::with_status(warp::reply::json(&msg), StatusCode::FORBIDDEN).into_response(),))
}

pub fn user_not_partner() -> Result<(warp::reply::Response,), Rejection> {
    let msg: helper_model::ErrorResponse = helper_model::ErrorResponse {
        title: String::from("Permission Denied"),
        message: String::from("You are not a partner account."),
    };
    Ok((warp::reply::with_status(warp::reply::json(&msg), StatusCode::FORBIDDEN).into_response(),))
}

pub fn booking_not_allowed_response() -> Result<(warp::reply::Response,), Rejection> {
    let msg: helper_model::ErrorResponse = helper_model::ErrorResponse {
        title: String::from("Access Booking Not Allowed"),
        message: String::from("Accessing this booking is not allowed. Please try another one."),
    };
    Ok((warp::reply::with_status(warp::reply::json(&msg), StatusCode::FORBIDDEN).into_response(),))
}

pub fn response_with_obj<T>(
    obj: T,
    status_code: StatusCode,
) -> Result<(warp::reply::Response,), Rejection>
where
    T: serde::Serialize,
{
    Ok((warp::reply::with_status(warp::reply::json(&obj), status_code).into_response(),))
}

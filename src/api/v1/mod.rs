mod booking;
mod partner;
mod user;

use warp::Filter;

pub fn api_v1() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("v1")
        .and(
            user::api_v1_user()
                .or(booking::api_v1_booking())
                .or(partner::api_v1_partner()),
        )
        .and(warp::path::end())
}

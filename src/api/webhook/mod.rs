mod payment;
mod verification;

use warp::Filter;

pub fn webhook() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("webhook").and(payment::main().or(verification::main()))
}

mod add_charge;
mod new_booking;
mod payout_quote;
mod settle_charge;

use warp::Filter;

pub fn api_v1_partner(
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("partner")
        .and(
            new_booking::main()
                .or(payout_quote::main())
                .or(add_charge::main())
                .or(settle_charge::main()),
        )
        .and(warp::path::end())
}

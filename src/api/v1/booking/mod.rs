mod cancel;
mod end_trip;
mod get;
mod modify_dates;
mod new;
mod quote;
mod refund_quote;
mod start_trip;

use warp::Filter;

pub fn api_v1_booking(
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("booking")
        .and(
            new::main()
                .or(get::main())
                .or(quote::main())
                .or(modify_dates::main())
                .or(refund_quote::main())
                .or(cancel::main())
                .or(start_trip::main())
                .or(end_trip::main()),
        )
        .and(warp::path::end())
}

use crate::{methods, model, POOL};
use chrono::{NaiveTime, Utc};
use diesel::prelude::*;
use std::time::Duration;

pub async fn nightly_task() {
    loop {
        let now = Utc::now();
        let midnight = now
            .date_naive()
            .succ_opt()
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        let duration_until_midnight = (midnight - now.naive_utc())
            .to_std()
            .unwrap_or_else(|_| Duration::from_secs(1));

        tokio::time::sleep(duration_until_midnight).await;

        println!("====== Running Daily Tasks ======");

        let mut pool = match POOL.get() {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("Nightly task could not get a DB connection: {:?}", e);
                continue;
            }
        };

        use crate::schema::bookings::dsl as b_q;

        // 1. Void pre-trip Pending bookings whose pickup has passed without
        // verification and payment ever clearing. The trip_ended_at guard
        // keeps pending-charges bookings out of the sweep.
        let stale = diesel::update(
            b_q::bookings
                .filter(b_q::status.eq(model::LifecycleStatus::Pending))
                .filter(b_q::trip_started_at.is_null())
                .filter(b_q::trip_ended_at.is_null())
                .filter(b_q::pickup_at.lt(Utc::now())),
        )
        .set(b_q::status.eq(model::LifecycleStatus::Cancelled))
        .get_results::<model::Booking>(&mut pool);

        match stale {
            Ok(voided) => {
                for booking in voided {
                    println!(
                        "Voided unconfirmed booking {} past its pickup time",
                        booking.booking_code
                    );
                }
            }
            Err(e) => {
                eprintln!("Nightly task error voiding stale bookings: {:?}", e);
            }
        }

        // 2. Close out pending-charges bookings whose charges all settled
        // but whose closing update was missed (crash between settle and
        // close, or charges settled out of band).
        let open_settlements = b_q::bookings
            .filter(b_q::status.eq(model::LifecycleStatus::Pending))
            .filter(b_q::trip_ended_at.is_not_null())
            .select(b_q::id)
            .get_results::<i32>(&mut pool);

        match open_settlements {
            Ok(ids) => {
                for booking_id in ids {
                    match methods::booking::close_settled(booking_id) {
                        Ok(Some(closed)) => {
                            println!(
                                "Closed settled booking {} back to Completed",
                                closed.booking_code
                            );
                        }
                        Ok(None) => {} // still has open charges
                        Err(e) => {
                            eprintln!(
                                "Nightly task error closing booking {}: {:?}",
                                booking_id, e
                            );
                        }
                    }
                }
            }
            Err(e) => {
                eprintln!("Nightly task error listing open settlements: {:?}", e);
            }
        }
    }
}

mod api;
mod db;
mod helper_model;
mod integration;
mod methods;
mod model;
mod scheduled_tasks;
mod schema;

use once_cell::sync::Lazy;
use warp::Filter;

pub static POOL: Lazy<db::PgPool> = Lazy::new(db::get_connection_pool);

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tokio::spawn(scheduled_tasks::nightly_task());
    // routing for the server
    let httpd = api::api().and(warp::path::end());
    warp::serve(httpd).run(([127, 0, 0, 1], 3030)).await;
}

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate rocket;

pub mod article;
pub mod comment;
pub mod config;
pub mod db;
pub mod topic;
pub mod types;
pub mod users;
pub mod utils;

use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::{Json, Value};
use rocket::{Build, Rocket};
use serde_json::json;
use tracing::error;

use db::Pool;

#[catch(404)]
fn not_found(_req: &Request) -> Json<Value> {
    Json(json!({ "msg": "path not found" }))
}

// Rocket answers 422 when a typed guard cannot parse the request; the API
// reports every malformed request the same way.
#[catch(422)]
fn unprocessable(_req: &Request) -> (Status, Json<Value>) {
    (Status::BadRequest, Json(json!({ "msg": "bad request" })))
}

#[catch(500)]
fn server_error(req: &Request) -> Json<Value> {
    error!(method = %req.method(), uri = %req.uri(), "unhandled server error");
    Json(json!({ "msg": "internal server error" }))
}

#[catch(default)]
fn fallback(status: Status, _req: &Request) -> (Status, Json<Value>) {
    let msg = status.reason().unwrap_or("request failed");
    (status, Json(json!({ "msg": msg })))
}

/// Assembles the application around an existing connection pool.
pub fn rocket(pool: Pool) -> Rocket<Build> {
    rocket::build()
        .manage(pool)
        .mount(
            "/api",
            routes![
                topic::list,
                article::list,
                article::get,
                article::update_votes,
                users::list,
                comment::list,
                comment::add,
                comment::delete,
            ],
        )
        .register("/", catchers![not_found, unprocessable, server_error, fallback])
}

use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;

use crate::db::schema::users;
use crate::db::{DbConnection, Pool};
use crate::types::ApiResult;

#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    users: Vec<User>,
}

#[get("/users")]
pub fn list(pool: &State<Pool>) -> ApiResult<UsersResponse> {
    let mut connection = DbConnection::checkout(pool)?;
    let users = users::table
        .select(User::as_select())
        .load::<User>(&mut *connection)?;
    Ok(Json(UsersResponse { users }))
}

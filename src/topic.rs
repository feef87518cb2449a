use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;

use crate::db::schema::topics;
use crate::db::{DbConnection, Pool};
use crate::types::ApiResult;

/// Topic slugs accepted by the `topic` filter of the article listing.
pub const KNOWN_TOPICS: &[&str] = &["mitch", "cats", "paper", "coding", "football", "cooking"];

pub fn is_known(slug: &str) -> bool {
    KNOWN_TOPICS.contains(&slug)
}

#[derive(Debug, Queryable, Selectable, Serialize)]
#[diesel(table_name = topics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    topics: Vec<Topic>,
}

#[get("/topics")]
pub fn list(pool: &State<Pool>) -> ApiResult<TopicsResponse> {
    let mut connection = DbConnection::checkout(pool)?;
    let topics = topics::table
        .select(Topic::as_select())
        .load::<Topic>(&mut *connection)?;
    Ok(Json(TopicsResponse { topics }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_topics_are_exact_matches() {
        assert!(is_known("cats"));
        assert!(is_known("football"));
        assert!(!is_known("Cats"));
        assert!(!is_known("dogs"));
        assert!(!is_known(""));
    }
}

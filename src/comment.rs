use chrono::NaiveDateTime;
use diesel::insert_into;
use diesel::prelude::*;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{self, Json};
use rocket::State;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::article;
use crate::db::schema::comments;
use crate::db::{DbConnection, Pool};
use crate::types::{ApiError, ApiResult, Validate};
use crate::utils::{parse_id, serialize_date};

#[derive(Debug, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = comments)]
struct NewComment<'a> {
    article_id: i32,
    author: &'a str,
    body: &'a str,
}

/// Request body of `POST /api/articles/<id>/comments`.
#[derive(Debug, Deserialize)]
pub struct CommentDetails {
    username: String,
    body: String,
}

impl Validate for CommentDetails {
    type Output = CommentDetails;

    fn validate(self) -> Result<CommentDetails, ApiError> {
        if self.username.trim().is_empty() || self.body.trim().is_empty() {
            return Err(ApiError::bad_request());
        }
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
pub struct CommentContainer {
    comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct CommentsContainer {
    comments: Vec<Comment>,
}

#[get("/articles/<article_id>/comments")]
pub fn list(pool: &State<Pool>, article_id: Result<i32, &str>) -> ApiResult<CommentsContainer> {
    let article_id = parse_id(article_id)?;
    let mut connection = DbConnection::checkout(pool)?;

    if !article::exists_by_id(article_id, &mut connection)? {
        return Err(article::not_found(article_id));
    }

    let comments = comments::table
        .filter(comments::article_id.eq(article_id))
        .order((comments::created_at.desc(), comments::comment_id.desc()))
        .select(Comment::as_select())
        .load::<Comment>(&mut *connection)?;

    Ok(Json(CommentsContainer { comments }))
}

#[post("/articles/<article_id>/comments", data = "<details>")]
pub fn add(
    pool: &State<Pool>,
    article_id: Result<i32, &str>,
    details: Result<Json<CommentDetails>, json::Error<'_>>,
) -> Result<status::Custom<Json<CommentContainer>>, ApiError> {
    let article_id = parse_id(article_id)?;
    let details = details?.into_inner().validate()?;

    let mut connection = DbConnection::checkout(pool)?;
    if !article::exists_by_id(article_id, &mut connection)? {
        return Err(article::not_found(article_id));
    }

    // an unknown username surfaces as a foreign key violation
    debug!(article_id, author = %details.username, "adding comment");
    let comment = insert_into(comments::table)
        .values(&NewComment {
            article_id,
            author: &details.username,
            body: &details.body,
        })
        .get_result::<Comment>(&mut *connection)?;

    Ok(status::Custom(
        Status::Created,
        Json(CommentContainer { comment }),
    ))
}

#[delete("/comments/<comment_id>")]
pub fn delete(pool: &State<Pool>, comment_id: Result<i32, &str>) -> Result<Status, ApiError> {
    let comment_id = parse_id(comment_id)?;
    let mut connection = DbConnection::checkout(pool)?;

    let deleted = diesel::delete(comments::table.find(comment_id)).execute(&mut *connection)?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!(
            "No comment found for comment_id: {}",
            comment_id
        )));
    }
    Ok(Status::NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(username: &str, body: &str) -> CommentDetails {
        CommentDetails {
            username: username.into(),
            body: body.into(),
        }
    }

    #[test]
    fn accepts_filled_in_comment() {
        let valid = details("butter_bridge", "nice article").validate().unwrap();
        assert_eq!(valid.username, "butter_bridge");
        assert_eq!(valid.body, "nice article");
    }

    #[test]
    fn blank_fields_are_bad_requests() {
        for (username, body) in &[("", "hello"), ("butter_bridge", "   "), (" ", "")] {
            let (status, msg) = details(username, body).validate().unwrap_err().to_parts();
            assert_eq!(status, Status::BadRequest);
            assert_eq!(msg, "bad request");
        }
    }

    #[test]
    fn missing_fields_fail_to_deserialize() {
        assert!(serde_json::from_str::<CommentDetails>(r#"{"username": "lurker"}"#).is_err());
        assert!(serde_json::from_str::<CommentDetails>(r#"{"username": 4, "body": "x"}"#).is_err());
    }
}

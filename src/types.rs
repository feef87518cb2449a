use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::{self, Json};
use serde_json::json;
use tracing::{debug, error};

pub trait Validate
where
    Self: Sized,
{
    type Output;
    fn validate(self) -> Result<Self::Output, ApiError>;
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Diesel(DieselError),
    Pool(r2d2::Error),
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl ApiError {
    pub fn bad_request() -> ApiError {
        ApiError::BadRequest("bad request".into())
    }

    /// The status and `msg` this error is reported with.
    pub fn to_parts(&self) -> (Status, String) {
        match self {
            ApiError::BadRequest(msg) => (Status::BadRequest, msg.clone()),
            ApiError::NotFound(msg) => (Status::NotFound, msg.clone()),
            ApiError::Diesel(error) => match error {
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    (Status::NotFound, "user not found".into())
                }
                DieselError::DatabaseError(DatabaseErrorKind::NotNullViolation, _)
                | DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
                    (Status::BadRequest, "bad request".into())
                }
                DieselError::NotFound => (Status::NotFound, "not found".into()),
                _ => (Status::InternalServerError, "internal server error".into()),
            },
            ApiError::Pool(_) => (Status::ServiceUnavailable, "database unavailable".into()),
        }
    }
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> ApiError {
        ApiError::Pool(err)
    }
}

impl<'a> From<json::Error<'a>> for ApiError {
    fn from(err: json::Error<'a>) -> ApiError {
        debug!(error = ?err, "rejected request body");
        ApiError::bad_request()
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let (status, msg) = self.to_parts();
        if status.code >= 500 {
            error!(error = ?self, method = %req.method(), uri = %req.uri(), "request failed");
        }
        (status, Json(json!({ "msg": msg }))).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_error(kind: DatabaseErrorKind) -> ApiError {
        ApiError::Diesel(DieselError::DatabaseError(
            kind,
            Box::new(String::from("violates constraint")),
        ))
    }

    #[test]
    fn explicit_status_and_message_pass_through() {
        let (status, msg) =
            ApiError::NotFound("No article found for article_id: 9".into()).to_parts();
        assert_eq!(status, Status::NotFound);
        assert_eq!(msg, "No article found for article_id: 9");

        let (status, msg) = ApiError::BadRequest("invalid order query".into()).to_parts();
        assert_eq!(status, Status::BadRequest);
        assert_eq!(msg, "invalid order query");
    }

    #[test]
    fn foreign_key_violation_is_a_missing_user() {
        let (status, msg) = database_error(DatabaseErrorKind::ForeignKeyViolation).to_parts();
        assert_eq!(status, Status::NotFound);
        assert_eq!(msg, "user not found");
    }

    #[test]
    fn constraint_violations_are_bad_requests() {
        for kind in vec![DatabaseErrorKind::NotNullViolation, DatabaseErrorKind::CheckViolation] {
            let (status, msg) = database_error(kind).to_parts();
            assert_eq!(status, Status::BadRequest);
            assert_eq!(msg, "bad request");
        }
    }

    #[test]
    fn unrecognised_errors_are_generic_500s() {
        let (status, msg) = database_error(DatabaseErrorKind::UniqueViolation).to_parts();
        assert_eq!(status, Status::InternalServerError);
        assert_eq!(msg, "internal server error");

        let (status, _) = ApiError::Diesel(DieselError::RollbackTransaction).to_parts();
        assert_eq!(status, Status::InternalServerError);
    }

    #[test]
    fn diesel_not_found_is_a_404() {
        let (status, _) = ApiError::Diesel(DieselError::NotFound).to_parts();
        assert_eq!(status, Status::NotFound);
    }
}

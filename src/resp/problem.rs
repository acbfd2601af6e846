use std::fmt::{Display, Formatter};
use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable machine-readable error codes exposed to clients alongside the
/// human-readable message.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InvalidTransition,
    Internal,
}

impl ErrorCode {
    pub fn default_status(self) -> Status {
        match self {
            ErrorCode::BadRequest => Status::BadRequest,
            ErrorCode::Unauthorized => Status::Unauthorized,
            ErrorCode::Forbidden => Status::Forbidden,
            ErrorCode::NotFound => Status::NotFound,
            ErrorCode::InvalidTransition => Status::Conflict,
            ErrorCode::Internal => Status::InternalServerError,
        }
    }
}

fn default_problem_status() -> Status {
    Status::InternalServerError
}

/// JSON error response carried through handlers as the failure type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(skip, default = "default_problem_status")]
    pub status: Status,
    pub code: ErrorCode,
    pub message: String,

    pub detail: Option<String>,

    pub body: Map<String, Value>,
}

impl Problem {
    pub fn new(code: ErrorCode, message: impl ToString) -> Problem {
        Problem {
            status: code.default_status(),
            code,
            message: message.to_string(),
            detail: None,
            body: Map::new(),
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut body = self.body.clone();

        body.insert(
            String::from("code"),
            serde_json::to_value(self.code).expect("ErrorCode must be JSON serializable"),
        );
        body.insert(String::from("message"), Value::from(self.message));
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), Value::from(detail));
        }
        body.insert(
            String::from("status"),
            Value::from(self.status.code),
        );

        let body_string = serde_json::to_string(&body)
            .expect("JSON map keys and values must be JSON serializable");

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use super::{ErrorCode, Problem};

    #[inline]
    pub fn unauthorized(detail: impl ToString) -> Problem {
        Problem::new(ErrorCode::Unauthorized, "Unable to authorize user.")
            .detail(detail)
            .clone()
    }

    #[inline]
    pub fn forbidden(detail: impl ToString) -> Problem {
        Problem::new(ErrorCode::Forbidden, "Operation not permitted.")
            .detail(detail)
            .clone()
    }

    #[inline]
    pub fn internal(detail: impl ToString) -> Problem {
        Problem::new(ErrorCode::Internal, "Server failed while processing request.")
            .detail(detail)
            .clone()
    }
}

impl From<mongodb::error::Error> for Problem {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        fn store_problem() -> Problem {
            Problem::new(
                ErrorCode::Internal,
                "MongoDB failed while processing request.",
            )
        }

        fn access_problem() -> Problem {
            Problem::new(ErrorCode::Internal, "Server was unable to access MongoDB.")
        }

        fn bad_db_request() -> Problem {
            Problem::new(
                ErrorCode::Internal,
                "MongoDB was unable to process bad server request.",
            )
        }

        fn bson_problem() -> Problem {
            Problem::new(
                ErrorCode::Internal,
                "There was a problem with handling MongoDB bson.",
            )
        }

        match e.kind.as_ref() {
            ErrorKind::InvalidArgument { .. } => bad_db_request(),
            ErrorKind::Authentication { .. } => access_problem(),
            ErrorKind::BsonDeserialization(_) => bson_problem(),
            ErrorKind::BsonSerialization(_) => bson_problem(),
            ErrorKind::BulkWrite(_) => bad_db_request(),
            ErrorKind::Command(_) => bad_db_request(),
            ErrorKind::DnsResolve { .. } => access_problem(),
            ErrorKind::Io(_) => store_problem()
                .detail("An IO error occurred. Submitted data might not be properly stored.")
                .clone(),
            ErrorKind::ServerSelection { .. } => access_problem(),
            ErrorKind::InvalidTlsConfig { .. } => access_problem(),
            ErrorKind::Write(_) => store_problem()
                .detail("A write error occurred. Submitted data might not be properly stored.")
                .clone(),
            _ => store_problem(),
        }
    }
}

impl From<bson::de::Error> for Problem {
    fn from(_: bson::de::Error) -> Self {
        Problem::new(
            ErrorCode::Internal,
            "An error occurred while processing BSON data.",
        )
    }
}

impl From<bson::ser::Error> for Problem {
    fn from(_: bson::ser::Error) -> Self {
        Problem::new(
            ErrorCode::Internal,
            "An error occurred while processing BSON data.",
        )
    }
}

impl From<serde_json::Error> for Problem {
    fn from(_: serde_json::Error) -> Self {
        Problem::new(
            ErrorCode::Internal,
            "An error occurred while processing JSON data.",
        )
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.into_kind() {
            ErrorKind::ExpiredSignature => {
                Problem::new(ErrorCode::Unauthorized, "Expired token signature.")
            }
            _ => Problem::new(ErrorCode::Unauthorized, "Error while handling token."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_value(ErrorCode::InvalidTransition).unwrap(),
            Value::String("invalid_transition".to_string())
        );
        assert_eq!(
            serde_json::to_value(ErrorCode::NotFound).unwrap(),
            Value::String("not_found".to_string())
        );
    }

    #[test]
    fn codes_map_to_expected_statuses() {
        assert_eq!(ErrorCode::Unauthorized.default_status(), Status::Unauthorized);
        assert_eq!(ErrorCode::Forbidden.default_status(), Status::Forbidden);
        assert_eq!(ErrorCode::NotFound.default_status(), Status::NotFound);
        assert_eq!(ErrorCode::InvalidTransition.default_status(), Status::Conflict);
        assert_eq!(
            ErrorCode::Internal.default_status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn problem_carries_code_and_detail() {
        let problem = problems::unauthorized("No credential cookie.");

        assert_eq!(problem.status, Status::Unauthorized);
        assert_eq!(problem.code, ErrorCode::Unauthorized);
        assert_eq!(problem.detail.as_deref(), Some("No credential cookie."));
    }

    #[test]
    fn expired_signature_maps_to_unauthorized() {
        let e = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        let problem = Problem::from(e);

        assert_eq!(problem.status, Status::Unauthorized);
        assert_eq!(problem.code, ErrorCode::Unauthorized);
    }
}

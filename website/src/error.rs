use axum::http::{self, StatusCode};
use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Config error: {}", msg))]
    Config { msg: String },

    #[snafu(display("{}", source))]
    Core { source: autovote::Error },

    #[snafu(display("Failed to render template: {}", source))]
    Template { source: askama::Error },

    #[snafu(display("Response builder error: {}", source))]
    ResponseBuilder { source: http::Error },

    #[snafu(display("Failed to serialize response: {}", source))]
    JsonOutput { source: serde_json::Error },

    #[snafu(display("Unable to bind to {}: {}", addr, source))]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[snafu(display("HTTP server error: {}", source))]
    Serve { source: std::io::Error },

    #[snafu(display("{}", msg))]
    Validation { msg: String },

    #[snafu(display("{}", msg))]
    NotFound { msg: String },

    #[snafu(display("{}", msg))]
    Conflict { msg: String },

    #[snafu(display("Stale form data. Refresh the page and try again."))]
    CsrfToken,

    #[snafu(display("{}", msg))]
    Whatever { msg: String },
}

// Allow string slices to be converted to Error
impl From<&str> for Error {
    fn from(val: &str) -> Self {
        Self::Whatever {
            msg: val.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(val: String) -> Self {
        Self::Whatever { msg: val }
    }
}

// Surface user facing core errors with their own status
impl From<autovote::Error> for Error {
    fn from(err: autovote::Error) -> Self {
        match err {
            autovote::Error::Validation { msg } => Self::Validation { msg },
            autovote::Error::IndexOutOfRange { .. } => Self::NotFound {
                msg: err.to_string(),
            },
            autovote::Error::RunInProgress => Self::Conflict {
                msg: err.to_string(),
            },
            _ => Self::Core { source: err },
        }
    }
}

/// Allow Error to be converted to StatusCode
impl From<&Error> for StatusCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::CsrfToken => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Allow errors to be rendered as response
impl IntoResponse for Error {
    fn into_response(self) -> Response<Body> {
        let info = ErrorInfo::from(&self);

        // Build a dummy response, the response mapper renders the page
        let mut res = Response::new(Body::empty());
        *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        res.extensions_mut().insert(info);

        res
    }
}

#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub status_code: StatusCode,
    pub title: String,
    pub message: String,
}

impl From<&Error> for ErrorInfo {
    fn from(e: &Error) -> Self {
        let status_code: StatusCode = e.into();
        Self {
            status_code,
            title: status_code
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_meaning() {
        let err: Error = autovote::Error::RunInProgress.into();
        assert_eq!(StatusCode::from(&err), StatusCode::CONFLICT);

        let err: Error = autovote::Error::IndexOutOfRange { index: 4, len: 2 }.into();
        assert_eq!(StatusCode::from(&err), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Token index 4 is out of range, 2 tokens stored");

        let err: Error = autovote::Error::Validation {
            msg: "No tokens entered.".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Validation { .. }));

        let err: Error = autovote::Error::from("disk full").into();
        assert_eq!(StatusCode::from(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_info() {
        let info = ErrorInfo::from(&Error::CsrfToken);
        assert_eq!(info.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(info.title, "Bad Request");
        assert_eq!(
            info.message,
            "Stale form data. Refresh the page and try again."
        );
    }
}

//! Error handling.

use std::backtrace::Backtrace;
use std::error::Error;
use std::time::Duration;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ndarray::ShapeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{event, Level};

/// BMI relay error type
///
/// This type encapsulates the various errors that may occur on either side of the relay.
/// On the server each variant results in a different API error response, on the client the
/// API error responses are turned back into one of these variants.
#[derive(Debug, Error)]
pub enum BmiError {
    /// Error raised by a model implementation
    #[error("{0}")]
    Model(Box<dyn Error + Send + Sync>),

    /// BMI method not supported by the model or the transport
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Model error raised on the server, carrying the server side stack trace
    #[error("{message}")]
    Remote {
        message: String,
        detail: String,
        stack_trace: Vec<String>,
    },

    /// Error response from the server without debug information
    #[error("{message}")]
    Rpc { status: StatusCode, message: String },

    /// Error communicating with the server
    #[error("failed to communicate with BMI server")]
    Transport(#[from] hyper::Error),

    /// Error building an HTTP request
    #[error("failed to build request")]
    Http(#[from] axum::http::Error),

    /// Error parsing a server URL
    #[error("invalid server URL")]
    InvalidUrl(#[from] url::ParseError),

    /// Error converting a server URL into a URI
    #[error("invalid server URL")]
    InvalidUri(#[from] axum::http::uri::InvalidUri),

    /// No response within the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Error (de)serialising JSON
    #[error("failed to (de)serialise JSON")]
    Json(#[from] serde_json::Error),

    /// Error converting from bytes to a type
    #[error("failed to convert from bytes to {type_name}")]
    FromBytes { type_name: &'static str },

    /// Number of received items does not match the destination buffer
    #[error("buffer holds {expected} items but {actual} were received")]
    BufferSize { expected: usize, actual: usize },

    /// Values of the wrong type
    #[error("expected {expected} values but got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Value type not supported by the relay
    #[error("unsupported value type {0}")]
    UnsupportedType(String),

    /// Error converting between integer types
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// Error creating ndarray Array from Shape
    #[error("failed to create array from shape")]
    ShapeInvalid(#[from] ShapeError),

    /// Error deserialising request data from JSON
    #[error("request data is not valid")]
    RequestDataJsonRejection(#[from] JsonRejection),

    /// Error deserialising request data from the query string
    #[error("request data is not valid")]
    RequestDataQueryRejection(#[from] QueryRejection),

    /// Error validating request data (single error)
    #[error("request data is not valid")]
    RequestDataValidationSingle(#[from] validator::ValidationError),

    /// Error validating request data (multiple errors)
    #[error("request data is not valid")]
    RequestDataValidation(#[from] validator::ValidationErrors),

    /// Response lacks a required header
    #[error("response is missing the {0} header")]
    MissingHeader(&'static str),

    /// I/O error, including missing directories
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Argument rejected before any work is done
    #[error("{0}")]
    InvalidArgument(String),

    /// A container engine or server process command failed
    #[error("{0}")]
    Launcher(String),

    /// A launched container or process exited before it became ready
    #[error("{message}")]
    DeadContainer {
        message: String,
        exit_code: i32,
        logs: String,
    },

    /// Container engine too old
    #[error("Unsupported version ({found}) of {program} found, supported versions >={supported}")]
    UnsupportedVersion {
        program: &'static str,
        found: String,
        supported: &'static str,
    },

    /// Error parsing a version string
    #[error("failed to parse version")]
    Version(#[from] semver::Error),

    /// Error reading model configuration
    #[error("failed to read model configuration")]
    Config(#[from] serde_yaml::Error),

    /// An earlier model call panicked while holding the model
    #[error("model state is poisoned by an earlier panic")]
    Poisoned,

    /// A model call panicked
    #[error("model call panicked: {0}")]
    Panic(String),
}

impl BmiError {
    /// Return a model error with the given message.
    ///
    /// Models use this to report failures with plain text.
    pub fn model<S: Into<String>>(message: S) -> Self {
        let message: String = message.into();
        Self::Model(message.into())
    }
}

impl IntoResponse for BmiError {
    /// Convert from a `BmiError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Debugging detail attached to error responses when the server runs in debug mode
///
/// Implements serde (de)serialise.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DebugInfo {
    /// Stack trace captured where the server caught the error, one entry per line
    pub stack_entries: Vec<String>,

    /// Debug representation of the error
    pub detail: String,
}

impl DebugInfo {
    /// Capture the current stack and describe `error`.
    pub fn capture<E: std::fmt::Debug>(error: &E) -> Self {
        let stack_entries = Backtrace::force_capture()
            .to_string()
            .lines()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        DebugInfo {
            stack_entries,
            detail: format!("{:?}", error),
        }
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    /// Main error message
    pub message: String,

    /// Optional list of causes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<Vec<String>>,

    /// Optional debugging detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugInfo>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut caused_by = None;
        let mut current = error.source();
        while let Some(source) = current {
            let mut causes: Vec<String> = caused_by.unwrap_or_default();
            causes.push(source.to_string());
            caused_by = Some(causes);
            current = source.source();
        }
        // Remove duplicate entries.
        if let Some(caused_by) = caused_by.as_mut() {
            caused_by.dedup()
        }
        ErrorBody {
            message,
            caused_by,
            debug_info: None,
        }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    pub status: StatusCode,

    /// Response body
    pub error: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        ErrorResponse {
            status,
            error: ErrorBody::new(error),
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 501 not implemented ErrorResponse
    fn not_implemented<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::NOT_IMPLEMENTED, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// Return an ErrorResponse for `error`, with debugging detail attached when `debug` is set.
    pub fn from_error(error: BmiError, debug: bool) -> Self {
        let debug_info = debug.then(|| DebugInfo::capture(&error));
        let mut response = Self::from(error);
        response.error.debug_info = debug_info;
        response
    }
}

impl From<BmiError> for ErrorResponse {
    /// Convert from a `BmiError` into an `ErrorResponse`.
    fn from(error: BmiError) -> Self {
        let response = match &error {
            // Bad request
            BmiError::FromBytes { type_name: _ }
            | BmiError::BufferSize {
                expected: _,
                actual: _,
            }
            | BmiError::TypeMismatch {
                expected: _,
                actual: _,
            }
            | BmiError::UnsupportedType(_)
            | BmiError::TryFromInt(_)
            | BmiError::ShapeInvalid(_)
            | BmiError::RequestDataJsonRejection(_)
            | BmiError::RequestDataQueryRejection(_)
            | BmiError::RequestDataValidationSingle(_)
            | BmiError::RequestDataValidation(_)
            | BmiError::MissingHeader(_)
            | BmiError::InvalidArgument(_) => Self::bad_request(&error),

            // Not implemented
            BmiError::NotImplemented(_) => Self::not_implemented(&error),

            // Internal server error
            BmiError::Model(_)
            | BmiError::Remote {
                message: _,
                detail: _,
                stack_trace: _,
            }
            | BmiError::Rpc {
                status: _,
                message: _,
            }
            | BmiError::Transport(_)
            | BmiError::Http(_)
            | BmiError::InvalidUrl(_)
            | BmiError::InvalidUri(_)
            | BmiError::Timeout(_)
            | BmiError::Json(_)
            | BmiError::Io(_)
            | BmiError::Launcher(_)
            | BmiError::DeadContainer {
                message: _,
                exit_code: _,
                logs: _,
            }
            | BmiError::UnsupportedVersion {
                program: _,
                found: _,
                supported: _,
            }
            | BmiError::Version(_)
            | BmiError::Config(_)
            | BmiError::Poisoned
            | BmiError::Panic(_) => Self::internal_server_error(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hyper::HeaderMap;

    // Jump through the hoops to get the body as a string.
    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    async fn error_response(response: Response) -> ErrorResponse {
        let mut headers = HeaderMap::new();
        headers.insert(&header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert_eq!(headers, *response.headers());
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    async fn test_bmi_error(
        error: BmiError,
        status: StatusCode,
        message: &str,
        caused_by: Option<Vec<&'static str>>,
    ) {
        let response = error.into_response();
        assert_eq!(status, response.status());
        let error_response = error_response(response).await;
        assert_eq!(message.to_string(), error_response.error.message);
        // Map Vec items from str to String
        let caused_by = caused_by.map(|cb| cb.iter().map(|s| s.to_string()).collect());
        assert_eq!(caused_by, error_response.error.caused_by);
        assert_eq!(None, error_response.error.debug_info);
    }

    #[tokio::test]
    async fn model_error() {
        let error = BmiError::model("Model went wrong");
        let message = "Model went wrong";
        test_bmi_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, None).await;
    }

    #[tokio::test]
    async fn model_error_with_source() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "no forcing file");
        let error = BmiError::Model(Box::new(io_error));
        let message = "no forcing file";
        test_bmi_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, None).await;
    }

    #[tokio::test]
    async fn not_implemented() {
        let error = BmiError::NotImplemented("get_grid_face_edges");
        let message = "get_grid_face_edges is not implemented";
        test_bmi_error(error, StatusCode::NOT_IMPLEMENTED, message, None).await;
    }

    #[tokio::test]
    async fn from_bytes_error() {
        let error = BmiError::FromBytes { type_name: "foo" };
        let message = "failed to convert from bytes to foo";
        test_bmi_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn buffer_size_error() {
        let error = BmiError::BufferSize {
            expected: 3,
            actual: 4,
        };
        let message = "buffer holds 3 items but 4 were received";
        test_bmi_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn type_mismatch_error() {
        let error = BmiError::TypeMismatch {
            expected: "int32".to_string(),
            actual: "float64".to_string(),
        };
        let message = "expected int32 values but got float64";
        test_bmi_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn request_data_validation_single() {
        let validation_error = validator::ValidationError::new("foo");
        let error = BmiError::RequestDataValidationSingle(validation_error);
        let message = "request data is not valid";
        let caused_by = Some(vec!["Validation error: foo [{}]"]);
        test_bmi_error(error, StatusCode::BAD_REQUEST, message, caused_by).await;
    }

    #[tokio::test]
    async fn request_data_validation() {
        let mut validation_errors = validator::ValidationErrors::new();
        let validation_error = validator::ValidationError::new("foo");
        validation_errors.add("bar", validation_error);
        let error = BmiError::RequestDataValidation(validation_errors);
        let message = "request data is not valid";
        let caused_by = Some(vec!["bar: Validation error: foo [{}]"]);
        test_bmi_error(error, StatusCode::BAD_REQUEST, message, caused_by).await;
    }

    #[tokio::test]
    async fn shape_error() {
        let error = BmiError::ShapeInvalid(ShapeError::from_kind(ndarray::ErrorKind::OutOfBounds));
        let message = "failed to create array from shape";
        let caused_by = Some(vec!["ShapeError/OutOfBounds: out of bounds indexing"]);
        test_bmi_error(error, StatusCode::BAD_REQUEST, message, caused_by).await;
    }

    #[tokio::test]
    async fn try_from_int_error() {
        let error = BmiError::TryFromInt(u8::try_from(-1_i8).unwrap_err());
        let message = "out of range integral type conversion attempted";
        test_bmi_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn poisoned() {
        let error = BmiError::Poisoned;
        let message = "model state is poisoned by an earlier panic";
        test_bmi_error(error, StatusCode::INTERNAL_SERVER_ERROR, message, None).await;
    }

    #[tokio::test]
    async fn debug_info_attached() {
        let error = BmiError::model("Model went wrong");
        let response = ErrorResponse::from_error(error, true).into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        let error_response = error_response(response).await;
        assert_eq!("Model went wrong", error_response.error.message);
        let debug_info = error_response.error.debug_info.unwrap();
        assert!(!debug_info.stack_entries.is_empty());
        assert!(
            debug_info.detail.contains("Model went wrong"),
            "detail: {}",
            debug_info.detail
        );
    }

    #[tokio::test]
    async fn debug_info_omitted() {
        let error = BmiError::model("Model went wrong");
        let response = ErrorResponse::from_error(error, false).into_response();
        let body = body_string(response).await;
        assert!(!body.contains("debug_info"), "body: {body}");
    }

    #[test]
    fn dead_container_display() {
        let error = BmiError::DeadContainer {
            message: "Failed to start Docker container with image foo".to_string(),
            exit_code: 25,
            logs: "bar".to_string(),
        };
        assert_eq!(
            "Failed to start Docker container with image foo",
            error.to_string()
        );
    }

    #[test]
    fn launcher_error() {
        let error = BmiError::Launcher("docker stop failed: no such container".to_string());
        assert_eq!("docker stop failed: no such container", error.to_string());
        let response = error.into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    }

    #[test]
    fn unsupported_version_display() {
        let error = BmiError::UnsupportedVersion {
            program: "apptainer",
            found: "apptainer version 0.1.0".to_string(),
            supported: "1.0.0-rc.2",
        };
        assert_eq!(
            "Unsupported version (apptainer version 0.1.0) of apptainer found, supported versions >=1.0.0-rc.2",
            error.to_string()
        );
    }
}

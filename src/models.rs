//! Wire messages and associated functions and methods

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::{Validate, ValidationError};

/// Default maximum size in bytes of a single request or response payload.
pub const MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Numerical data types used to carry variable values on the wire
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DType {
    /// [i32]
    Int32,
    /// [i64]
    Int64,
    /// [f32]
    Float32,
    /// [f64]
    Float64,
}

impl DType {
    /// Returns the size of the associated type in bytes.
    pub fn size_of(self) -> usize {
        match self {
            Self::Int32 => std::mem::size_of::<i32>(),
            Self::Int64 => std::mem::size_of::<i64>(),
            Self::Float32 => std::mem::size_of::<f32>(),
            Self::Float64 => std::mem::size_of::<f64>(),
        }
    }
}

/// Request data for `initialize`
#[derive(Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InitializeRequest {
    /// Path to the model configuration file, if any
    #[serde(default)]
    pub config_file: Option<String>,
}

/// Request data for `update_until`
#[derive(Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_update_until"))]
pub struct UpdateUntilRequest {
    /// Model time to advance to
    pub time: f64,
}

/// Request data for methods taking a variable name
#[derive(Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VarRequest {
    /// Variable name
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

/// Request data for methods taking a grid identifier
#[derive(Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GridRequest {
    /// Grid identifier
    #[validate(range(min = 0, message = "grid must not be negative"))]
    pub grid: i32,
}

/// Query parameters for `get_value_at_indices`
///
/// The request body holds the indices.
#[derive(Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct IndicesQuery {
    /// Variable name
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

/// Query parameters for `set_value`
///
/// The request body holds the values.
#[derive(Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SetValueQuery {
    /// Variable name
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    /// Wire data type of the values
    pub dtype: DType,
}

/// Query parameters for `set_value_at_indices`
///
/// The request body holds `count` indices followed by `count` values.
#[derive(Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SetValueAtIndicesQuery {
    /// Variable name
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    /// Wire data type of the values
    pub dtype: DType,
    /// Number of indices and values
    pub count: usize,
}

/// Validate update_until request data
fn validate_update_until(request: &UpdateUntilRequest) -> Result<(), ValidationError> {
    if !request.time.is_finite() {
        return Err(ValidationError::new("time must be finite"));
    }
    Ok(())
}

/// Response carrying a single scalar
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct ScalarResponse<T> {
    pub value: T,
}

/// Response carrying a list of variable names
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct NamesResponse {
    pub names: Vec<String>,
}

/// Response carrying a small array, such as grid shapes and coordinates
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct ArrayResponse<T> {
    pub values: Vec<T>,
}

/// Response for methods without a result
#[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct EmptyResponse {}

/// Response containing variable values in their wire representation.
pub struct ValuesResponse {
    /// Little endian encoded values
    pub body: Bytes,
    /// Data type of the values
    pub dtype: DType,
}

impl ValuesResponse {
    /// Return a ValuesResponse object
    pub fn new(body: Bytes, dtype: DType) -> ValuesResponse {
        ValuesResponse { body, dtype }
    }
}

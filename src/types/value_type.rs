use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::BmiError;
use crate::models::DType;

/// Numeric type of a model variable, as reported by `get_var_type`.
///
/// Parsing accepts the numpy names as well as the C type names models written against the C
/// BMI bindings tend to report.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ValueType {
    /// [i16]
    #[strum(to_string = "int16", serialize = "short")]
    Int16,
    /// [i32]
    #[strum(to_string = "int32", serialize = "int")]
    Int32,
    /// [i64]
    #[strum(to_string = "int64", serialize = "long")]
    Int64,
    /// [half::f16]
    #[strum(to_string = "float16", serialize = "half")]
    Float16,
    /// [f32]
    #[strum(to_string = "float32", serialize = "float")]
    Float32,
    /// [f64]
    #[strum(to_string = "float64", serialize = "double")]
    Float64,
}

impl ValueType {
    /// Parse a type name as returned by [crate::bmi::Bmi::get_var_type].
    pub fn from_type_name(name: &str) -> Result<Self, BmiError> {
        name.trim()
            .parse()
            .map_err(|_| BmiError::UnsupportedType(name.to_string()))
    }

    /// Returns the size of the associated type in bytes.
    pub fn size_of(self) -> usize {
        match self {
            Self::Int16 => std::mem::size_of::<i16>(),
            Self::Int32 => std::mem::size_of::<i32>(),
            Self::Int64 => std::mem::size_of::<i64>(),
            Self::Float16 => std::mem::size_of::<half::f16>(),
            Self::Float32 => std::mem::size_of::<f32>(),
            Self::Float64 => std::mem::size_of::<f64>(),
        }
    }

    /// Returns the representation used for values of this type on the wire.
    ///
    /// Types narrower than 32 bits are widened.
    pub fn wire_dtype(self) -> DType {
        match self {
            Self::Int16 | Self::Int32 => DType::Int32,
            Self::Int64 => DType::Int64,
            Self::Float16 | Self::Float32 => DType::Float32,
            Self::Float64 => DType::Float64,
        }
    }
}

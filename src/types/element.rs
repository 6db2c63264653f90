use half::f16;

use crate::types::{ValueType, Values, ValuesMut, ValuesRef};

/// Trait for array elements that can be carried by a [Values] array.
///
/// This is the entry point from a concrete Rust type into the runtime-typed value arrays.
pub trait Element: Clone + Copy + Default + std::fmt::Debug + PartialEq + Send + 'static {
    /// The value type corresponding to `Self`.
    const VALUE_TYPE: ValueType;

    /// Wrap a slice as a [ValuesRef].
    fn values_ref(data: &[Self]) -> ValuesRef<'_>;

    /// Wrap a mutable slice as a [ValuesMut].
    fn values_mut(data: &mut [Self]) -> ValuesMut<'_>;

    /// Unwrap an owned array, returning it unchanged if it holds another type.
    fn from_values(values: Values) -> Result<Vec<Self>, Values>;
}

impl Element for i16 {
    const VALUE_TYPE: ValueType = ValueType::Int16;

    fn values_ref(data: &[Self]) -> ValuesRef<'_> {
        ValuesRef::Int16(data)
    }

    fn values_mut(data: &mut [Self]) -> ValuesMut<'_> {
        ValuesMut::Int16(data)
    }

    fn from_values(values: Values) -> Result<Vec<Self>, Values> {
        match values {
            Values::Int16(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl Element for i32 {
    const VALUE_TYPE: ValueType = ValueType::Int32;

    fn values_ref(data: &[Self]) -> ValuesRef<'_> {
        ValuesRef::Int32(data)
    }

    fn values_mut(data: &mut [Self]) -> ValuesMut<'_> {
        ValuesMut::Int32(data)
    }

    fn from_values(values: Values) -> Result<Vec<Self>, Values> {
        match values {
            Values::Int32(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl Element for i64 {
    const VALUE_TYPE: ValueType = ValueType::Int64;

    fn values_ref(data: &[Self]) -> ValuesRef<'_> {
        ValuesRef::Int64(data)
    }

    fn values_mut(data: &mut [Self]) -> ValuesMut<'_> {
        ValuesMut::Int64(data)
    }

    fn from_values(values: Values) -> Result<Vec<Self>, Values> {
        match values {
            Values::Int64(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl Element for f16 {
    const VALUE_TYPE: ValueType = ValueType::Float16;

    fn values_ref(data: &[Self]) -> ValuesRef<'_> {
        ValuesRef::Float16(data)
    }

    fn values_mut(data: &mut [Self]) -> ValuesMut<'_> {
        ValuesMut::Float16(data)
    }

    fn from_values(values: Values) -> Result<Vec<Self>, Values> {
        match values {
            Values::Float16(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl Element for f32 {
    const VALUE_TYPE: ValueType = ValueType::Float32;

    fn values_ref(data: &[Self]) -> ValuesRef<'_> {
        ValuesRef::Float32(data)
    }

    fn values_mut(data: &mut [Self]) -> ValuesMut<'_> {
        ValuesMut::Float32(data)
    }

    fn from_values(values: Values) -> Result<Vec<Self>, Values> {
        match values {
            Values::Float32(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl Element for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float64;

    fn values_ref(data: &[Self]) -> ValuesRef<'_> {
        ValuesRef::Float64(data)
    }

    fn values_mut(data: &mut [Self]) -> ValuesMut<'_> {
        ValuesMut::Float64(data)
    }

    fn from_values(values: Values) -> Result<Vec<Self>, Values> {
        match values {
            Values::Float64(v) => Ok(v),
            other => Err(other),
        }
    }
}

use std::ops::Range;

use half::f16;

use crate::error::BmiError;
use crate::types::ValueType;

/// An owned, typed array of variable values.
#[derive(Clone, Debug, PartialEq)]
pub enum Values {
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// A borrowed, typed array of variable values, used as the source of `set_value` calls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValuesRef<'a> {
    Int16(&'a [i16]),
    Int32(&'a [i32]),
    Int64(&'a [i64]),
    Float16(&'a [f16]),
    Float32(&'a [f32]),
    Float64(&'a [f64]),
}

/// A mutably borrowed, typed array of variable values, used as the destination of `get_value`
/// calls.
#[derive(Debug, PartialEq)]
pub enum ValuesMut<'a> {
    Int16(&'a mut [i16]),
    Int32(&'a mut [i32]),
    Int64(&'a mut [i64]),
    Float16(&'a mut [f16]),
    Float32(&'a mut [f32]),
    Float64(&'a mut [f64]),
}

impl Values {
    /// Returns a zero-filled array of `len` items of type `value_type`.
    pub fn zeros(value_type: ValueType, len: usize) -> Self {
        match value_type {
            ValueType::Int16 => Self::Int16(vec![0; len]),
            ValueType::Int32 => Self::Int32(vec![0; len]),
            ValueType::Int64 => Self::Int64(vec![0; len]),
            ValueType::Float16 => Self::Float16(vec![f16::ZERO; len]),
            ValueType::Float32 => Self::Float32(vec![0.0; len]),
            ValueType::Float64 => Self::Float64(vec![0.0; len]),
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.as_ref().value_type()
    }

    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_ref(&self) -> ValuesRef<'_> {
        match self {
            Self::Int16(v) => ValuesRef::Int16(v),
            Self::Int32(v) => ValuesRef::Int32(v),
            Self::Int64(v) => ValuesRef::Int64(v),
            Self::Float16(v) => ValuesRef::Float16(v),
            Self::Float32(v) => ValuesRef::Float32(v),
            Self::Float64(v) => ValuesRef::Float64(v),
        }
    }

    pub fn as_mut(&mut self) -> ValuesMut<'_> {
        match self {
            Self::Int16(v) => ValuesMut::Int16(v),
            Self::Int32(v) => ValuesMut::Int32(v),
            Self::Int64(v) => ValuesMut::Int64(v),
            Self::Float16(v) => ValuesMut::Float16(v),
            Self::Float32(v) => ValuesMut::Float32(v),
            Self::Float64(v) => ValuesMut::Float64(v),
        }
    }
}

impl From<Vec<i16>> for Values {
    fn from(values: Vec<i16>) -> Self {
        Self::Int16(values)
    }
}

impl From<Vec<i32>> for Values {
    fn from(values: Vec<i32>) -> Self {
        Self::Int32(values)
    }
}

impl From<Vec<i64>> for Values {
    fn from(values: Vec<i64>) -> Self {
        Self::Int64(values)
    }
}

impl From<Vec<f16>> for Values {
    fn from(values: Vec<f16>) -> Self {
        Self::Float16(values)
    }
}

impl From<Vec<f32>> for Values {
    fn from(values: Vec<f32>) -> Self {
        Self::Float32(values)
    }
}

impl From<Vec<f64>> for Values {
    fn from(values: Vec<f64>) -> Self {
        Self::Float64(values)
    }
}

impl<'a> ValuesRef<'a> {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Int16(_) => ValueType::Int16,
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::Float16(_) => ValueType::Float16,
            Self::Float32(_) => ValueType::Float32,
            Self::Float64(_) => ValueType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float16(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the sub-array covering `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds, like slice indexing.
    pub fn slice(&self, range: Range<usize>) -> ValuesRef<'a> {
        match *self {
            Self::Int16(v) => Self::Int16(&v[range]),
            Self::Int32(v) => Self::Int32(&v[range]),
            Self::Int64(v) => Self::Int64(&v[range]),
            Self::Float16(v) => Self::Float16(&v[range]),
            Self::Float32(v) => Self::Float32(&v[range]),
            Self::Float64(v) => Self::Float64(&v[range]),
        }
    }

    pub fn to_owned(&self) -> Values {
        match self {
            Self::Int16(v) => Values::Int16(v.to_vec()),
            Self::Int32(v) => Values::Int32(v.to_vec()),
            Self::Int64(v) => Values::Int64(v.to_vec()),
            Self::Float16(v) => Values::Float16(v.to_vec()),
            Self::Float32(v) => Values::Float32(v.to_vec()),
            Self::Float64(v) => Values::Float64(v.to_vec()),
        }
    }
}

impl<'a> ValuesMut<'a> {
    pub fn value_type(&self) -> ValueType {
        self.as_ref().value_type()
    }

    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reborrow as a shared view.
    pub fn as_ref(&self) -> ValuesRef<'_> {
        match self {
            Self::Int16(v) => ValuesRef::Int16(v),
            Self::Int32(v) => ValuesRef::Int32(v),
            Self::Int64(v) => ValuesRef::Int64(v),
            Self::Float16(v) => ValuesRef::Float16(v),
            Self::Float32(v) => ValuesRef::Float32(v),
            Self::Float64(v) => ValuesRef::Float64(v),
        }
    }

    /// Returns the mutable sub-array covering `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds, like slice indexing.
    pub fn slice_mut(&mut self, range: Range<usize>) -> ValuesMut<'_> {
        match self {
            Self::Int16(v) => ValuesMut::Int16(&mut v[range]),
            Self::Int32(v) => ValuesMut::Int32(&mut v[range]),
            Self::Int64(v) => ValuesMut::Int64(&mut v[range]),
            Self::Float16(v) => ValuesMut::Float16(&mut v[range]),
            Self::Float32(v) => ValuesMut::Float32(&mut v[range]),
            Self::Float64(v) => ValuesMut::Float64(&mut v[range]),
        }
    }

    /// Copy `src` into this buffer.
    ///
    /// Both arrays must have the same type and length.
    pub fn copy_from(&mut self, src: ValuesRef<'_>) -> Result<(), BmiError> {
        if self.len() != src.len() {
            return Err(BmiError::BufferSize {
                expected: self.len(),
                actual: src.len(),
            });
        }
        match (self, src) {
            (Self::Int16(dest), ValuesRef::Int16(src)) => dest.copy_from_slice(src),
            (Self::Int32(dest), ValuesRef::Int32(src)) => dest.copy_from_slice(src),
            (Self::Int64(dest), ValuesRef::Int64(src)) => dest.copy_from_slice(src),
            (Self::Float16(dest), ValuesRef::Float16(src)) => dest.copy_from_slice(src),
            (Self::Float32(dest), ValuesRef::Float32(src)) => dest.copy_from_slice(src),
            (Self::Float64(dest), ValuesRef::Float64(src)) => dest.copy_from_slice(src),
            (dest, src) => {
                return Err(BmiError::TypeMismatch {
                    expected: dest.value_type().to_string(),
                    actual: src.value_type().to_string(),
                })
            }
        }
        Ok(())
    }
}

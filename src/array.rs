//! Functions and utilities for moving arrays across the wire.
//!
//! Values travel as little endian byte streams in one of the [DType] wire representations.
//! Indices travel as little endian [i32].

use std::ops::Range;

use axum::body::Bytes;
use half::f16;
use ndarray::prelude::*;
use zerocopy::byteorder::{LittleEndian, F32, F64, I32, I64};
use zerocopy::AsBytes;

use crate::error::BmiError;
use crate::models::DType;
use crate::types::{ValueType, Values, ValuesMut, ValuesRef};

/// Size in bytes of a single index on the wire.
pub const INDEX_SIZE: usize = std::mem::size_of::<i32>();

/// Convert from a byte slice to `&[T]`.
///
/// Zerocopy provides a mechanism for converting between types.
/// The byte order aware types used here have no alignment requirement.
///
/// # Arguments
///
/// * `data`: bytes containing data to convert.
fn from_bytes<T>(data: &[u8]) -> Result<&[T], BmiError>
where
    T: zerocopy::FromBytes + zerocopy::Unaligned,
{
    let layout = zerocopy::LayoutVerified::<_, [T]>::new_slice_unaligned(data).ok_or(
        BmiError::FromBytes {
            type_name: std::any::type_name::<T>(),
        },
    )?;
    Ok(layout.into_slice())
}

/// Collect wire items into a contiguous byte buffer.
fn to_bytes<T: AsBytes>(items: impl Iterator<Item = T>) -> Bytes {
    let items: Vec<T> = items.collect();
    Bytes::copy_from_slice(items.as_slice().as_bytes())
}

/// Convert wire items into `dest`, checking that the lengths agree.
fn convert_into<W, T, F>(src: &[W], dest: &mut [T], f: F) -> Result<(), BmiError>
where
    W: Copy,
    F: Fn(W) -> Result<T, BmiError>,
{
    if src.len() != dest.len() {
        return Err(BmiError::BufferSize {
            expected: dest.len(),
            actual: src.len(),
        });
    }
    for (d, s) in dest.iter_mut().zip(src) {
        *d = f(*s)?;
    }
    Ok(())
}

/// Encode values in their wire representation.
///
/// Returns the wire data type and the encoded bytes.
pub fn encode_values(values: ValuesRef<'_>) -> (DType, Bytes) {
    let dtype = values.value_type().wire_dtype();
    let bytes = match values {
        ValuesRef::Int16(v) => to_bytes(v.iter().map(|x| I32::<LittleEndian>::new(i32::from(*x)))),
        ValuesRef::Int32(v) => to_bytes(v.iter().map(|x| I32::<LittleEndian>::new(*x))),
        ValuesRef::Int64(v) => to_bytes(v.iter().map(|x| I64::<LittleEndian>::new(*x))),
        ValuesRef::Float16(v) => to_bytes(v.iter().map(|x| F32::<LittleEndian>::new(x.to_f32()))),
        ValuesRef::Float32(v) => to_bytes(v.iter().map(|x| F32::<LittleEndian>::new(*x))),
        ValuesRef::Float64(v) => to_bytes(v.iter().map(|x| F64::<LittleEndian>::new(*x))),
    };
    (dtype, bytes)
}

/// Decode wire values into a destination buffer.
///
/// The wire representation must be the one used for the destination's value type, and the
/// number of encoded values must equal the length of the destination.
///
/// # Arguments
///
/// * `dtype`: Wire data type of `data`
/// * `data`: Little endian encoded values
/// * `dest`: Buffer to receive the values
pub fn decode_values(dtype: DType, data: &[u8], dest: ValuesMut<'_>) -> Result<(), BmiError> {
    match (dtype, dest) {
        (DType::Int32, ValuesMut::Int16(dest)) => {
            convert_into(from_bytes::<I32<LittleEndian>>(data)?, dest, |x| {
                Ok(i16::try_from(x.get())?)
            })
        }
        (DType::Int32, ValuesMut::Int32(dest)) => {
            convert_into(from_bytes::<I32<LittleEndian>>(data)?, dest, |x| Ok(x.get()))
        }
        (DType::Int64, ValuesMut::Int64(dest)) => {
            convert_into(from_bytes::<I64<LittleEndian>>(data)?, dest, |x| Ok(x.get()))
        }
        (DType::Float32, ValuesMut::Float16(dest)) => {
            convert_into(from_bytes::<F32<LittleEndian>>(data)?, dest, |x| {
                Ok(f16::from_f32(x.get()))
            })
        }
        (DType::Float32, ValuesMut::Float32(dest)) => {
            convert_into(from_bytes::<F32<LittleEndian>>(data)?, dest, |x| Ok(x.get()))
        }
        (DType::Float64, ValuesMut::Float64(dest)) => {
            convert_into(from_bytes::<F64<LittleEndian>>(data)?, dest, |x| Ok(x.get()))
        }
        (dtype, dest) => Err(BmiError::TypeMismatch {
            expected: dest.value_type().wire_dtype().to_string(),
            actual: dtype.to_string(),
        }),
    }
}

/// Decode wire values into a newly allocated array of `value_type`.
pub fn decode_to_values(
    dtype: DType,
    data: &[u8],
    value_type: ValueType,
) -> Result<Values, BmiError> {
    let mut values = Values::zeros(value_type, data.len() / dtype.size_of());
    decode_values(dtype, data, values.as_mut())?;
    Ok(values)
}

/// Encode indices in their wire representation.
pub fn encode_indices(indices: &[i32]) -> Bytes {
    to_bytes(indices.iter().map(|i| I32::<LittleEndian>::new(*i)))
}

/// Decode indices from their wire representation.
pub fn decode_indices(data: &[u8]) -> Result<Vec<i32>, BmiError> {
    Ok(from_bytes::<I32<LittleEndian>>(data)?
        .iter()
        .map(|i| i.get())
        .collect())
}

/// Split the body of a `set_value_at_indices` request into indices and encoded values.
///
/// The body holds `count` indices followed by `count` values.
pub fn split_indexed_values(data: &[u8], count: usize) -> Result<(Vec<i32>, &[u8]), BmiError> {
    let split = count * INDEX_SIZE;
    if data.len() < split {
        return Err(BmiError::BufferSize {
            expected: count,
            actual: data.len() / INDEX_SIZE,
        });
    }
    let (indices, values) = data.split_at(split);
    Ok((decode_indices(indices)?, values))
}

/// Returns the number of items that fit in a message of `limit` bytes, at least one.
///
/// # Arguments
///
/// * `limit`: Maximum payload size in bytes
/// * `item_size`: Payload bytes needed for each item
pub fn chunk_len(limit: usize, item_size: usize) -> usize {
    std::cmp::max(limit / std::cmp::max(item_size, 1), 1)
}

/// Returns consecutive, non-overlapping windows of at most `chunk_len` items covering `0..len`.
pub fn chunk_ranges(len: usize, chunk_len: usize) -> impl Iterator<Item = Range<usize>> {
    let chunk_len = std::cmp::max(chunk_len, 1);
    (0..len)
        .step_by(chunk_len)
        .map(move |start| start..std::cmp::min(start + chunk_len, len))
}

/// Returns flat indices covering `range`.
pub fn range_indices(range: Range<usize>) -> Result<Vec<i32>, BmiError> {
    range
        .map(|i| i32::try_from(i).map_err(BmiError::from))
        .collect()
}

/// Build an [ndarray::ArrayD] from flat row-major data and a shape.
///
/// BMI grid shapes are `i32`, with the slowest varying dimension first.
///
/// # Arguments
///
/// * `data`: Flat data, ordered as the model stores it
/// * `shape`: Shape of the array
pub fn build_array<T>(data: Vec<T>, shape: &[i32]) -> Result<ArrayD<T>, BmiError> {
    let shape = shape
        .iter()
        .map(|dim| usize::try_from(*dim))
        .collect::<Result<Vec<usize>, _>>()?;
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}

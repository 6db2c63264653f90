//! Helpers to allocate buffers of the right type and size for [Bmi] output arguments.

use crate::bmi::{Bmi, BmiResult};
use crate::types::{ValueType, Values};

/// Grid types whose node coordinates follow from the grid shape.
const RECTILINEAR_GRID_TYPES: [&str; 2] = ["rectilinear", "uniform_rectilinear"];

fn to_len(count: i32) -> BmiResult<usize> {
    Ok(usize::try_from(count)?)
}

/// Returns a buffer that can hold all values of a variable.
///
/// The number of items is `nbytes / itemsize`, the type is that reported by `get_var_type`.
pub fn reserve_values<B: Bmi + ?Sized>(model: &B, name: &str) -> BmiResult<Values> {
    let value_type = ValueType::from_type_name(&model.get_var_type(name)?)?;
    let nbytes = to_len(model.get_var_nbytes(name)?)?;
    let itemsize = to_len(model.get_var_itemsize(name)?)?;
    let len = if itemsize == 0 { 0 } else { nbytes / itemsize };
    Ok(Values::zeros(value_type, len))
}

/// Returns a buffer that can hold the values of a variable at `indices`.
pub fn reserve_values_at_indices<B: Bmi + ?Sized>(
    model: &B,
    name: &str,
    indices: &[i32],
) -> BmiResult<Values> {
    let value_type = ValueType::from_type_name(&model.get_var_type(name)?)?;
    Ok(Values::zeros(value_type, indices.len()))
}

/// Returns a buffer that can hold the shape of a grid.
pub fn reserve_grid_shape<B: Bmi + ?Sized>(model: &B, grid: i32) -> BmiResult<Vec<i32>> {
    Ok(vec![0; to_len(model.get_grid_rank(grid)?)?])
}

/// Returns a buffer that can hold the spacing or origin of a grid.
pub fn reserve_grid_padding<B: Bmi + ?Sized>(model: &B, grid: i32) -> BmiResult<Vec<f64>> {
    Ok(vec![0.0; to_len(model.get_grid_rank(grid)?)?])
}

/// Returns a buffer that can hold the node coordinates of a grid along one dimension.
///
/// Rectilinear grids have one coordinate per node along the dimension, other grids have one
/// coordinate per node of the grid, as reported by `get_grid_size`.
///
/// # Arguments
///
/// * `model`: Model to query
/// * `grid`: Grid identifier
/// * `dim_index`: Dimension, 0 for x, 1 for y and 2 for z
pub fn reserve_grid_nodes<B: Bmi + ?Sized>(
    model: &B,
    grid: i32,
    dim_index: usize,
) -> BmiResult<Vec<f64>> {
    let grid_type = model.get_grid_type(grid)?;
    let len = if RECTILINEAR_GRID_TYPES.contains(&grid_type.as_str()) {
        let mut shape = reserve_grid_shape(model, grid)?;
        model.get_grid_shape(grid, &mut shape)?;
        // Shapes are ordered z, y, x.
        match shape.iter().rev().nth(dim_index) {
            Some(len) => to_len(*len)?,
            None => 0,
        }
    } else {
        to_len(model.get_grid_size(grid)?)?
    };
    Ok(vec![0.0; len])
}

/// Returns a buffer that can hold the edge-node connectivity of a grid.
pub fn reserve_grid_edge_nodes<B: Bmi + ?Sized>(model: &B, grid: i32) -> BmiResult<Vec<i32>> {
    Ok(vec![0; 2 * to_len(model.get_grid_edge_count(grid)?)?])
}

/// Returns a buffer that can hold the number of nodes of each face of a grid.
pub fn reserve_grid_nodes_per_face<B: Bmi + ?Sized>(
    model: &B,
    grid: i32,
) -> BmiResult<Vec<i32>> {
    Ok(vec![0; to_len(model.get_grid_face_count(grid)?)?])
}

/// Returns the total number of face-node (and face-edge) links of a grid.
fn face_links<B: Bmi + ?Sized>(model: &B, grid: i32) -> BmiResult<usize> {
    let mut nodes_per_face = reserve_grid_nodes_per_face(model, grid)?;
    model.get_grid_nodes_per_face(grid, &mut nodes_per_face)?;
    nodes_per_face.into_iter().map(to_len).sum()
}

/// Returns a buffer that can hold the face-edge connectivity of a grid.
pub fn reserve_grid_face_edges<B: Bmi + ?Sized>(model: &B, grid: i32) -> BmiResult<Vec<i32>> {
    Ok(vec![0; face_links(model, grid)?])
}

/// Returns a buffer that can hold the face-node connectivity of a grid.
pub fn reserve_grid_face_nodes<B: Bmi + ?Sized>(model: &B, grid: i32) -> BmiResult<Vec<i32>> {
    Ok(vec![0; face_links(model, grid)?])
}

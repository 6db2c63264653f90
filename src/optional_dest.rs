//! Allocating variants of the [Bmi] methods that write into caller supplied buffers.

use ndarray::prelude::*;

use crate::array::build_array;
use crate::bmi::{Bmi, BmiResult};
use crate::error::BmiError;
use crate::reserve;
use crate::types::{Element, Values};

/// Grid types whose variables can be reshaped to the grid shape.
const SHAPED_GRID_TYPES: [&str; 3] = [
    "rectilinear",
    "uniform_rectilinear",
    "structured_quadrilateral",
];

/// Extension trait that allocates output buffers on behalf of the caller.
///
/// Implemented for every [Bmi], including `dyn Bmi`.
pub trait OptionalDest: Bmi {
    /// Returns all values of a variable.
    fn value(&self, name: &str) -> BmiResult<Values> {
        let mut values = reserve::reserve_values(self, name)?;
        self.get_value(name, values.as_mut())?;
        Ok(values)
    }

    /// Returns the values of a variable at `indices`.
    fn value_at_indices(&self, name: &str, indices: &[i32]) -> BmiResult<Values> {
        let mut values = reserve::reserve_values_at_indices(self, name, indices)?;
        self.get_value_at_indices(name, values.as_mut(), indices)?;
        Ok(values)
    }

    /// Returns the values of a variable as an array of `T` in the shape of its grid.
    ///
    /// Variables on grids without a shape, such as unstructured grids, are returned as
    /// one-dimensional arrays.
    fn value_array<T: Element>(&self, name: &str) -> BmiResult<ArrayD<T>> {
        let values = T::from_values(self.value(name)?).map_err(|values| BmiError::TypeMismatch {
            expected: T::VALUE_TYPE.to_string(),
            actual: values.value_type().to_string(),
        })?;
        let grid = self.get_var_grid(name)?;
        let shape = if SHAPED_GRID_TYPES.contains(&self.get_grid_type(grid)?.as_str()) {
            self.grid_shape(grid)?
        } else {
            vec![i32::try_from(values.len())?]
        };
        build_array(values, &shape)
    }

    fn grid_shape(&self, grid: i32) -> BmiResult<Vec<i32>> {
        let mut shape = reserve::reserve_grid_shape(self, grid)?;
        self.get_grid_shape(grid, &mut shape)?;
        Ok(shape)
    }

    fn grid_spacing(&self, grid: i32) -> BmiResult<Vec<f64>> {
        let mut spacing = reserve::reserve_grid_padding(self, grid)?;
        self.get_grid_spacing(grid, &mut spacing)?;
        Ok(spacing)
    }

    fn grid_origin(&self, grid: i32) -> BmiResult<Vec<f64>> {
        let mut origin = reserve::reserve_grid_padding(self, grid)?;
        self.get_grid_origin(grid, &mut origin)?;
        Ok(origin)
    }

    fn grid_x(&self, grid: i32) -> BmiResult<Vec<f64>> {
        let mut x = reserve::reserve_grid_nodes(self, grid, 0)?;
        self.get_grid_x(grid, &mut x)?;
        Ok(x)
    }

    fn grid_y(&self, grid: i32) -> BmiResult<Vec<f64>> {
        let mut y = reserve::reserve_grid_nodes(self, grid, 1)?;
        self.get_grid_y(grid, &mut y)?;
        Ok(y)
    }

    fn grid_z(&self, grid: i32) -> BmiResult<Vec<f64>> {
        let mut z = reserve::reserve_grid_nodes(self, grid, 2)?;
        self.get_grid_z(grid, &mut z)?;
        Ok(z)
    }

    fn grid_edge_nodes(&self, grid: i32) -> BmiResult<Vec<i32>> {
        let mut edge_nodes = reserve::reserve_grid_edge_nodes(self, grid)?;
        self.get_grid_edge_nodes(grid, &mut edge_nodes)?;
        Ok(edge_nodes)
    }

    fn grid_face_edges(&self, grid: i32) -> BmiResult<Vec<i32>> {
        let mut face_edges = reserve::reserve_grid_face_edges(self, grid)?;
        self.get_grid_face_edges(grid, &mut face_edges)?;
        Ok(face_edges)
    }

    fn grid_face_nodes(&self, grid: i32) -> BmiResult<Vec<i32>> {
        let mut face_nodes = reserve::reserve_grid_face_nodes(self, grid)?;
        self.get_grid_face_nodes(grid, &mut face_nodes)?;
        Ok(face_nodes)
    }

    fn grid_nodes_per_face(&self, grid: i32) -> BmiResult<Vec<i32>> {
        let mut nodes_per_face = reserve::reserve_grid_nodes_per_face(self, grid)?;
        self.get_grid_nodes_per_face(grid, &mut nodes_per_face)?;
        Ok(nodes_per_face)
    }
}

impl<B: Bmi + ?Sized> OptionalDest for B {}

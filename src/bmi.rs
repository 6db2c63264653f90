//! The Basic Model Interface.
//!
//! [Bmi] is the call surface every model exposes, whether it lives in this process or behind a
//! [BmiClient](crate::client::BmiClient). Output arrays are written into caller supplied
//! buffers, and indices are flat, row-major offsets into a variable.

use crate::error::BmiError;
use crate::types::{ValuesMut, ValuesRef};

/// Result type of [Bmi] methods.
pub type BmiResult<T> = Result<T, BmiError>;

/// Basic Model Interface, version 2.0.
///
/// Methods that only make sense for some grid families have default implementations that
/// return [BmiError::NotImplemented].
pub trait Bmi {
    /// Perform startup tasks for the model.
    ///
    /// # Arguments
    ///
    /// * `config_file`: Path to the model configuration file, if the model needs one
    fn initialize(&mut self, config_file: Option<&str>) -> BmiResult<()>;

    /// Advance the model by a single time step.
    fn update(&mut self) -> BmiResult<()>;

    /// Advance the model until the given time.
    fn update_until(&mut self, time: f64) -> BmiResult<()>;

    /// Perform tear-down tasks for the model.
    fn finalize(&mut self) -> BmiResult<()>;

    fn get_component_name(&self) -> BmiResult<String>;

    fn get_input_item_count(&self) -> BmiResult<i32>;

    fn get_output_item_count(&self) -> BmiResult<i32>;

    fn get_input_var_names(&self) -> BmiResult<Vec<String>>;

    fn get_output_var_names(&self) -> BmiResult<Vec<String>>;

    /// Returns the identifier of the grid a variable is defined on.
    fn get_var_grid(&self, name: &str) -> BmiResult<i32>;

    /// Returns the type name of a variable, for example `float64`.
    fn get_var_type(&self, name: &str) -> BmiResult<String>;

    fn get_var_units(&self, name: &str) -> BmiResult<String>;

    /// Returns the size in bytes of a single item of a variable.
    fn get_var_itemsize(&self, name: &str) -> BmiResult<i32>;

    /// Returns the total size in bytes of a variable.
    fn get_var_nbytes(&self, name: &str) -> BmiResult<i32>;

    /// Returns where on the grid a variable is defined: `node`, `edge` or `face`.
    fn get_var_location(&self, _name: &str) -> BmiResult<String> {
        Err(BmiError::NotImplemented("get_var_location"))
    }

    fn get_current_time(&self) -> BmiResult<f64>;

    fn get_start_time(&self) -> BmiResult<f64>;

    fn get_end_time(&self) -> BmiResult<f64>;

    fn get_time_units(&self) -> BmiResult<String>;

    fn get_time_step(&self) -> BmiResult<f64>;

    /// Copy the values of a variable into `dest`.
    fn get_value(&self, name: &str, dest: ValuesMut<'_>) -> BmiResult<()>;

    /// Copy the values of a variable at the given flat indices into `dest`.
    fn get_value_at_indices(
        &self,
        name: &str,
        dest: ValuesMut<'_>,
        indices: &[i32],
    ) -> BmiResult<()>;

    /// Replace the values of a variable with `src`.
    fn set_value(&mut self, name: &str, src: ValuesRef<'_>) -> BmiResult<()>;

    /// Replace the values of a variable at the given flat indices with `src`.
    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[i32],
        src: ValuesRef<'_>,
    ) -> BmiResult<()>;

    fn get_grid_rank(&self, grid: i32) -> BmiResult<i32>;

    fn get_grid_size(&self, grid: i32) -> BmiResult<i32>;

    /// Returns the grid type, for example `uniform_rectilinear` or `unstructured`.
    fn get_grid_type(&self, grid: i32) -> BmiResult<String>;

    /// Copy the grid shape into `shape`, which holds `rank` items.
    fn get_grid_shape(&self, grid: i32, shape: &mut [i32]) -> BmiResult<()>;

    fn get_grid_spacing(&self, _grid: i32, _spacing: &mut [f64]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_spacing"))
    }

    fn get_grid_origin(&self, _grid: i32, _origin: &mut [f64]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_origin"))
    }

    fn get_grid_x(&self, _grid: i32, _x: &mut [f64]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_x"))
    }

    fn get_grid_y(&self, _grid: i32, _y: &mut [f64]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_y"))
    }

    fn get_grid_z(&self, _grid: i32, _z: &mut [f64]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_z"))
    }

    fn get_grid_node_count(&self, _grid: i32) -> BmiResult<i32> {
        Err(BmiError::NotImplemented("get_grid_node_count"))
    }

    fn get_grid_edge_count(&self, _grid: i32) -> BmiResult<i32> {
        Err(BmiError::NotImplemented("get_grid_edge_count"))
    }

    fn get_grid_face_count(&self, _grid: i32) -> BmiResult<i32> {
        Err(BmiError::NotImplemented("get_grid_face_count"))
    }

    /// Copy the node pairs of each edge into `edge_nodes`, which holds `2 * edge_count` items.
    fn get_grid_edge_nodes(&self, _grid: i32, _edge_nodes: &mut [i32]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_edge_nodes"))
    }

    fn get_grid_face_edges(&self, _grid: i32, _face_edges: &mut [i32]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_face_edges"))
    }

    fn get_grid_face_nodes(&self, _grid: i32, _face_nodes: &mut [i32]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_face_nodes"))
    }

    fn get_grid_nodes_per_face(&self, _grid: i32, _nodes_per_face: &mut [i32]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_nodes_per_face"))
    }
}

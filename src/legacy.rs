//! Support for models written against BMI 0.2.
//!
//! BMI 0.2 models return newly allocated arrays instead of filling caller supplied buffers, and
//! know nothing of variable locations or unstructured grids. [LegacyBmiAdapter] presents such a
//! model as a [Bmi], so it can be served like any other.

use crate::bmi::{Bmi, BmiResult};
use crate::error::BmiError;
use crate::types::{Values, ValuesMut, ValuesRef};

/// Basic Model Interface, version 0.2.
pub trait LegacyBmi {
    fn initialize(&mut self, config_file: Option<&str>) -> BmiResult<()>;
    fn update(&mut self) -> BmiResult<()>;
    fn update_until(&mut self, time: f64) -> BmiResult<()>;
    fn finalize(&mut self) -> BmiResult<()>;

    fn get_component_name(&self) -> BmiResult<String>;
    fn get_input_var_names(&self) -> BmiResult<Vec<String>>;
    fn get_output_var_names(&self) -> BmiResult<Vec<String>>;

    fn get_var_grid(&self, name: &str) -> BmiResult<i32>;
    fn get_var_type(&self, name: &str) -> BmiResult<String>;
    fn get_var_units(&self, name: &str) -> BmiResult<String>;
    fn get_var_itemsize(&self, name: &str) -> BmiResult<i32>;
    fn get_var_nbytes(&self, name: &str) -> BmiResult<i32>;

    fn get_current_time(&self) -> BmiResult<f64>;
    fn get_start_time(&self) -> BmiResult<f64>;
    fn get_end_time(&self) -> BmiResult<f64>;
    fn get_time_units(&self) -> BmiResult<String>;
    fn get_time_step(&self) -> BmiResult<f64>;

    /// Returns a copy of all values of a variable.
    fn get_value(&self, name: &str) -> BmiResult<Values>;
    /// Returns a copy of the values of a variable at the given flat indices.
    fn get_value_at_indices(&self, name: &str, indices: &[i32]) -> BmiResult<Values>;
    fn set_value(&mut self, name: &str, src: ValuesRef<'_>) -> BmiResult<()>;
    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[i32],
        src: ValuesRef<'_>,
    ) -> BmiResult<()>;

    fn get_grid_rank(&self, grid: i32) -> BmiResult<i32>;
    fn get_grid_size(&self, grid: i32) -> BmiResult<i32>;
    fn get_grid_type(&self, grid: i32) -> BmiResult<String>;
    fn get_grid_shape(&self, grid: i32) -> BmiResult<Vec<i32>>;
    fn get_grid_spacing(&self, grid: i32) -> BmiResult<Vec<f64>>;
    fn get_grid_origin(&self, grid: i32) -> BmiResult<Vec<f64>>;
    fn get_grid_x(&self, grid: i32) -> BmiResult<Vec<f64>>;
    fn get_grid_y(&self, grid: i32) -> BmiResult<Vec<f64>>;
    fn get_grid_z(&self, grid: i32) -> BmiResult<Vec<f64>>;
}

/// Copy an allocated result into a destination buffer of the same length.
fn copy_result<T: Copy>(result: Vec<T>, dest: &mut [T]) -> BmiResult<()> {
    if result.len() != dest.len() {
        return Err(BmiError::BufferSize {
            expected: dest.len(),
            actual: result.len(),
        });
    }
    dest.copy_from_slice(&result);
    Ok(())
}

fn item_count(names: Vec<String>) -> BmiResult<i32> {
    Ok(i32::try_from(names.len())?)
}

/// A [Bmi] backed by a [LegacyBmi] model.
///
/// Item counts are derived from the variable names. Calls without a BMI 0.2 counterpart return
/// [BmiError::NotImplemented].
pub struct LegacyBmiAdapter<L: LegacyBmi> {
    inner: L,
}

impl<L: LegacyBmi> LegacyBmiAdapter<L> {
    pub fn new(inner: L) -> Self {
        LegacyBmiAdapter { inner }
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: LegacyBmi> Bmi for LegacyBmiAdapter<L> {
    fn initialize(&mut self, config_file: Option<&str>) -> BmiResult<()> {
        self.inner.initialize(config_file)
    }

    fn update(&mut self) -> BmiResult<()> {
        self.inner.update()
    }

    fn update_until(&mut self, time: f64) -> BmiResult<()> {
        self.inner.update_until(time)
    }

    fn finalize(&mut self) -> BmiResult<()> {
        self.inner.finalize()
    }

    fn get_component_name(&self) -> BmiResult<String> {
        self.inner.get_component_name()
    }

    fn get_input_item_count(&self) -> BmiResult<i32> {
        item_count(self.inner.get_input_var_names()?)
    }

    fn get_output_item_count(&self) -> BmiResult<i32> {
        item_count(self.inner.get_output_var_names()?)
    }

    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        self.inner.get_input_var_names()
    }

    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        self.inner.get_output_var_names()
    }

    fn get_var_grid(&self, name: &str) -> BmiResult<i32> {
        self.inner.get_var_grid(name)
    }

    fn get_var_type(&self, name: &str) -> BmiResult<String> {
        self.inner.get_var_type(name)
    }

    fn get_var_units(&self, name: &str) -> BmiResult<String> {
        self.inner.get_var_units(name)
    }

    fn get_var_itemsize(&self, name: &str) -> BmiResult<i32> {
        self.inner.get_var_itemsize(name)
    }

    fn get_var_nbytes(&self, name: &str) -> BmiResult<i32> {
        self.inner.get_var_nbytes(name)
    }

    fn get_current_time(&self) -> BmiResult<f64> {
        self.inner.get_current_time()
    }

    fn get_start_time(&self) -> BmiResult<f64> {
        self.inner.get_start_time()
    }

    fn get_end_time(&self) -> BmiResult<f64> {
        self.inner.get_end_time()
    }

    fn get_time_units(&self) -> BmiResult<String> {
        self.inner.get_time_units()
    }

    fn get_time_step(&self) -> BmiResult<f64> {
        self.inner.get_time_step()
    }

    fn get_value(&self, name: &str, mut dest: ValuesMut<'_>) -> BmiResult<()> {
        dest.copy_from(self.inner.get_value(name)?.as_ref())
    }

    fn get_value_at_indices(
        &self,
        name: &str,
        mut dest: ValuesMut<'_>,
        indices: &[i32],
    ) -> BmiResult<()> {
        dest.copy_from(self.inner.get_value_at_indices(name, indices)?.as_ref())
    }

    fn set_value(&mut self, name: &str, src: ValuesRef<'_>) -> BmiResult<()> {
        self.inner.set_value(name, src)
    }

    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[i32],
        src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        self.inner.set_value_at_indices(name, indices, src)
    }

    fn get_grid_rank(&self, grid: i32) -> BmiResult<i32> {
        self.inner.get_grid_rank(grid)
    }

    fn get_grid_size(&self, grid: i32) -> BmiResult<i32> {
        self.inner.get_grid_size(grid)
    }

    fn get_grid_type(&self, grid: i32) -> BmiResult<String> {
        self.inner.get_grid_type(grid)
    }

    fn get_grid_shape(&self, grid: i32, shape: &mut [i32]) -> BmiResult<()> {
        copy_result(self.inner.get_grid_shape(grid)?, shape)
    }

    fn get_grid_spacing(&self, grid: i32, spacing: &mut [f64]) -> BmiResult<()> {
        copy_result(self.inner.get_grid_spacing(grid)?, spacing)
    }

    fn get_grid_origin(&self, grid: i32, origin: &mut [f64]) -> BmiResult<()> {
        copy_result(self.inner.get_grid_origin(grid)?, origin)
    }

    fn get_grid_x(&self, grid: i32, x: &mut [f64]) -> BmiResult<()> {
        copy_result(self.inner.get_grid_x(grid)?, x)
    }

    fn get_grid_y(&self, grid: i32, y: &mut [f64]) -> BmiResult<()> {
        copy_result(self.inner.get_grid_y(grid)?, y)
    }

    fn get_grid_z(&self, grid: i32, z: &mut [f64]) -> BmiResult<()> {
        copy_result(self.inner.get_grid_z(grid)?, z)
    }
}

use std::sync::Arc;
use std::thread::JoinHandle;

use axum_server::Handle;
use half::f16;

use crate::app;
use crate::app_state::AppState;
use crate::bmi::{Bmi, BmiResult};
use crate::client::BmiClient;
use crate::error::BmiError;
use crate::legacy::LegacyBmi;
use crate::models::MAX_MESSAGE_SIZE;
use crate::server;
use crate::types::{Values, ValuesMut, ValuesRef};

/// Model where every method fails with the same message.
pub(crate) struct FailingModel {
    message: String,
}

impl FailingModel {
    pub(crate) fn new(message: &str) -> Self {
        FailingModel {
            message: message.to_string(),
        }
    }

    fn fail<T>(&self) -> BmiResult<T> {
        Err(BmiError::model(self.message.clone()))
    }
}

impl Bmi for FailingModel {
    fn initialize(&mut self, _config_file: Option<&str>) -> BmiResult<()> {
        self.fail()
    }
    fn update(&mut self) -> BmiResult<()> {
        self.fail()
    }
    fn update_until(&mut self, _time: f64) -> BmiResult<()> {
        self.fail()
    }
    fn finalize(&mut self) -> BmiResult<()> {
        self.fail()
    }
    fn get_component_name(&self) -> BmiResult<String> {
        self.fail()
    }
    fn get_input_item_count(&self) -> BmiResult<i32> {
        self.fail()
    }
    fn get_output_item_count(&self) -> BmiResult<i32> {
        self.fail()
    }
    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        self.fail()
    }
    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        self.fail()
    }
    fn get_var_grid(&self, _name: &str) -> BmiResult<i32> {
        self.fail()
    }
    fn get_var_type(&self, _name: &str) -> BmiResult<String> {
        self.fail()
    }
    fn get_var_units(&self, _name: &str) -> BmiResult<String> {
        self.fail()
    }
    fn get_var_itemsize(&self, _name: &str) -> BmiResult<i32> {
        self.fail()
    }
    fn get_var_nbytes(&self, _name: &str) -> BmiResult<i32> {
        self.fail()
    }
    fn get_var_location(&self, _name: &str) -> BmiResult<String> {
        self.fail()
    }
    fn get_current_time(&self) -> BmiResult<f64> {
        self.fail()
    }
    fn get_start_time(&self) -> BmiResult<f64> {
        self.fail()
    }
    fn get_end_time(&self) -> BmiResult<f64> {
        self.fail()
    }
    fn get_time_units(&self) -> BmiResult<String> {
        self.fail()
    }
    fn get_time_step(&self) -> BmiResult<f64> {
        self.fail()
    }
    fn get_value(&self, _name: &str, _dest: ValuesMut<'_>) -> BmiResult<()> {
        self.fail()
    }
    fn get_value_at_indices(
        &self,
        _name: &str,
        _dest: ValuesMut<'_>,
        _indices: &[i32],
    ) -> BmiResult<()> {
        self.fail()
    }
    fn set_value(&mut self, _name: &str, _src: ValuesRef<'_>) -> BmiResult<()> {
        self.fail()
    }
    fn set_value_at_indices(
        &mut self,
        _name: &str,
        _indices: &[i32],
        _src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_rank(&self, _grid: i32) -> BmiResult<i32> {
        self.fail()
    }
    fn get_grid_size(&self, _grid: i32) -> BmiResult<i32> {
        self.fail()
    }
    fn get_grid_type(&self, _grid: i32) -> BmiResult<String> {
        self.fail()
    }
    fn get_grid_shape(&self, _grid: i32, _shape: &mut [i32]) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_spacing(&self, _grid: i32, _spacing: &mut [f64]) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_origin(&self, _grid: i32, _origin: &mut [f64]) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_x(&self, _grid: i32, _x: &mut [f64]) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_y(&self, _grid: i32, _y: &mut [f64]) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_z(&self, _grid: i32, _z: &mut [f64]) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_node_count(&self, _grid: i32) -> BmiResult<i32> {
        self.fail()
    }
    fn get_grid_edge_count(&self, _grid: i32) -> BmiResult<i32> {
        self.fail()
    }
    fn get_grid_face_count(&self, _grid: i32) -> BmiResult<i32> {
        self.fail()
    }
    fn get_grid_edge_nodes(&self, _grid: i32, _edge_nodes: &mut [i32]) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_face_edges(&self, _grid: i32, _face_edges: &mut [i32]) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_face_nodes(&self, _grid: i32, _face_nodes: &mut [i32]) -> BmiResult<()> {
        self.fail()
    }
    fn get_grid_nodes_per_face(&self, _grid: i32, _nodes_per_face: &mut [i32]) -> BmiResult<()> {
        self.fail()
    }
}

/// Copy `src` into `dest`, failing when the lengths differ.
fn copy_into<T: Copy>(src: &[T], dest: &mut [T]) -> BmiResult<()> {
    if src.len() != dest.len() {
        return Err(BmiError::BufferSize {
            expected: dest.len(),
            actual: src.len(),
        });
    }
    dest.copy_from_slice(src);
    Ok(())
}

fn unknown_var<T>(name: &str) -> BmiResult<T> {
    Err(BmiError::model(format!("unknown variable {}", name)))
}

fn to_index(i: i32) -> BmiResult<usize> {
    Ok(usize::try_from(i)?)
}

/// Model with a single one-dimensional variable `myvar` of any value type.
pub(crate) struct DTypeModel {
    pub(crate) values: Values,
}

impl DTypeModel {
    pub(crate) fn new(values: Values) -> Self {
        DTypeModel { values }
    }

    pub(crate) fn int16() -> Self {
        Self::new(Values::Int16(vec![1, -2, 3]))
    }

    pub(crate) fn int32() -> Self {
        Self::new(Values::Int32(vec![1, -2, 3]))
    }

    pub(crate) fn int64() -> Self {
        Self::new(Values::Int64(vec![1, -2, 1 << 40]))
    }

    pub(crate) fn float16() -> Self {
        Self::new(Values::Float16(vec![
            f16::from_f32(1.1),
            f16::from_f32(2.2),
            f16::from_f32(3.3),
        ]))
    }

    pub(crate) fn float32() -> Self {
        Self::new(Values::Float32(vec![1.1, 2.2, 3.3]))
    }

    pub(crate) fn float64() -> Self {
        Self::new(Values::Float64(vec![1.1, 2.2, 3.3]))
    }

    /// Model whose variable holds `len` float64 values counting up from zero.
    ///
    /// Chunks that arrive out of order or at the wrong offset change the values.
    pub(crate) fn huge(len: usize) -> Self {
        Self::new(Values::Float64((0..len).map(|i| i as f64).collect()))
    }

    fn check(&self, name: &str) -> BmiResult<()> {
        if name == "myvar" {
            Ok(())
        } else {
            unknown_var(name)
        }
    }
}

impl Bmi for DTypeModel {
    fn initialize(&mut self, _config_file: Option<&str>) -> BmiResult<()> {
        Ok(())
    }
    fn update(&mut self) -> BmiResult<()> {
        Ok(())
    }
    fn update_until(&mut self, _time: f64) -> BmiResult<()> {
        Ok(())
    }
    fn finalize(&mut self) -> BmiResult<()> {
        Ok(())
    }
    fn get_component_name(&self) -> BmiResult<String> {
        Ok("dtype model".to_string())
    }
    fn get_input_item_count(&self) -> BmiResult<i32> {
        Ok(1)
    }
    fn get_output_item_count(&self) -> BmiResult<i32> {
        Ok(1)
    }
    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec!["myvar".to_string()])
    }
    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec!["myvar".to_string()])
    }
    fn get_var_grid(&self, name: &str) -> BmiResult<i32> {
        self.check(name)?;
        Ok(0)
    }
    fn get_var_type(&self, name: &str) -> BmiResult<String> {
        self.check(name)?;
        Ok(self.values.value_type().to_string())
    }
    fn get_var_units(&self, name: &str) -> BmiResult<String> {
        self.check(name)?;
        Ok("1".to_string())
    }
    fn get_var_itemsize(&self, name: &str) -> BmiResult<i32> {
        self.check(name)?;
        Ok(i32::try_from(self.values.value_type().size_of())?)
    }
    fn get_var_nbytes(&self, name: &str) -> BmiResult<i32> {
        self.check(name)?;
        Ok(i32::try_from(
            self.values.value_type().size_of() * self.values.len(),
        )?)
    }
    fn get_var_location(&self, name: &str) -> BmiResult<String> {
        self.check(name)?;
        Ok("node".to_string())
    }
    fn get_current_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_start_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_end_time(&self) -> BmiResult<f64> {
        Ok(1.0)
    }
    fn get_time_units(&self) -> BmiResult<String> {
        Ok("s".to_string())
    }
    fn get_time_step(&self) -> BmiResult<f64> {
        Ok(1.0)
    }
    fn get_value(&self, name: &str, mut dest: ValuesMut<'_>) -> BmiResult<()> {
        self.check(name)?;
        dest.copy_from(self.values.as_ref())
    }
    fn get_value_at_indices(
        &self,
        name: &str,
        mut dest: ValuesMut<'_>,
        indices: &[i32],
    ) -> BmiResult<()> {
        self.check(name)?;
        if dest.len() != indices.len() {
            return Err(BmiError::BufferSize {
                expected: dest.len(),
                actual: indices.len(),
            });
        }
        let src = self.values.as_ref();
        for (i, index) in indices.iter().enumerate() {
            let index = to_index(*index)?;
            dest.slice_mut(i..i + 1)
                .copy_from(src.slice(index..index + 1))?;
        }
        Ok(())
    }
    fn set_value(&mut self, name: &str, src: ValuesRef<'_>) -> BmiResult<()> {
        self.check(name)?;
        self.values.as_mut().copy_from(src)
    }
    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[i32],
        src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        self.check(name)?;
        let mut dest = self.values.as_mut();
        for (i, index) in indices.iter().enumerate() {
            let index = to_index(*index)?;
            dest.slice_mut(index..index + 1)
                .copy_from(src.slice(i..i + 1))?;
        }
        Ok(())
    }
    fn get_grid_rank(&self, _grid: i32) -> BmiResult<i32> {
        Ok(1)
    }
    fn get_grid_size(&self, _grid: i32) -> BmiResult<i32> {
        Ok(i32::try_from(self.values.len())?)
    }
    fn get_grid_type(&self, _grid: i32) -> BmiResult<String> {
        Ok("points".to_string())
    }
    fn get_grid_shape(&self, _grid: i32, shape: &mut [i32]) -> BmiResult<()> {
        copy_into(&[i32::try_from(self.values.len())?], shape)
    }
    fn get_grid_node_count(&self, grid: i32) -> BmiResult<i32> {
        self.get_grid_size(grid)
    }
}

/// Model with a single three-dimensional rectilinear grid.
#[derive(Default)]
pub(crate) struct RectGridModel;

impl RectGridModel {
    fn not_used<T>(&self) -> BmiResult<T> {
        Err(BmiError::model("not used"))
    }
}

impl Bmi for RectGridModel {
    fn initialize(&mut self, _config_file: Option<&str>) -> BmiResult<()> {
        Ok(())
    }
    fn update(&mut self) -> BmiResult<()> {
        self.not_used()
    }
    fn update_until(&mut self, _time: f64) -> BmiResult<()> {
        self.not_used()
    }
    fn finalize(&mut self) -> BmiResult<()> {
        Ok(())
    }
    fn get_component_name(&self) -> BmiResult<String> {
        Ok("rectilinear grid model".to_string())
    }
    fn get_input_item_count(&self) -> BmiResult<i32> {
        Ok(0)
    }
    fn get_output_item_count(&self) -> BmiResult<i32> {
        Ok(1)
    }
    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec![])
    }
    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec!["plate_surface__temperature".to_string()])
    }
    fn get_var_grid(&self, _name: &str) -> BmiResult<i32> {
        Ok(0)
    }
    fn get_var_type(&self, _name: &str) -> BmiResult<String> {
        Ok("float64".to_string())
    }
    fn get_var_units(&self, _name: &str) -> BmiResult<String> {
        Ok("K".to_string())
    }
    fn get_var_itemsize(&self, _name: &str) -> BmiResult<i32> {
        Ok(8)
    }
    fn get_var_nbytes(&self, _name: &str) -> BmiResult<i32> {
        Ok(8 * 24)
    }
    fn get_current_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_start_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_end_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_time_units(&self) -> BmiResult<String> {
        Ok("s".to_string())
    }
    fn get_time_step(&self) -> BmiResult<f64> {
        Ok(1.0)
    }
    fn get_value(&self, _name: &str, mut dest: ValuesMut<'_>) -> BmiResult<()> {
        let values: Vec<f64> = (0..24).map(f64::from).collect();
        dest.copy_from(ValuesRef::Float64(&values))
    }
    fn get_value_at_indices(
        &self,
        _name: &str,
        _dest: ValuesMut<'_>,
        _indices: &[i32],
    ) -> BmiResult<()> {
        self.not_used()
    }
    fn set_value(&mut self, _name: &str, _src: ValuesRef<'_>) -> BmiResult<()> {
        self.not_used()
    }
    fn set_value_at_indices(
        &mut self,
        _name: &str,
        _indices: &[i32],
        _src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        self.not_used()
    }
    fn get_grid_rank(&self, _grid: i32) -> BmiResult<i32> {
        Ok(3)
    }
    fn get_grid_size(&self, _grid: i32) -> BmiResult<i32> {
        Ok(24)
    }
    fn get_grid_type(&self, _grid: i32) -> BmiResult<String> {
        Ok("rectilinear".to_string())
    }
    fn get_grid_shape(&self, _grid: i32, shape: &mut [i32]) -> BmiResult<()> {
        copy_into(&[2, 3, 4], shape)
    }
    fn get_grid_x(&self, _grid: i32, x: &mut [f64]) -> BmiResult<()> {
        copy_into(&[0.1, 0.2, 0.3, 0.4], x)
    }
    fn get_grid_y(&self, _grid: i32, y: &mut [f64]) -> BmiResult<()> {
        copy_into(&[1.1, 1.2, 1.3], y)
    }
    fn get_grid_z(&self, _grid: i32, z: &mut [f64]) -> BmiResult<()> {
        copy_into(&[2.1, 2.2], z)
    }
}

/// Model with a single unstructured grid of two triangles.
///
/// ```text
///     0
///    /|\
///   / | \
///  3  |  1
///   \ | /
///    \|/
///     2
/// ```
pub(crate) struct UnstructuredGridModel;

impl Bmi for UnstructuredGridModel {
    fn initialize(&mut self, _config_file: Option<&str>) -> BmiResult<()> {
        Ok(())
    }
    fn update(&mut self) -> BmiResult<()> {
        Ok(())
    }
    fn update_until(&mut self, _time: f64) -> BmiResult<()> {
        Ok(())
    }
    fn finalize(&mut self) -> BmiResult<()> {
        Ok(())
    }
    fn get_component_name(&self) -> BmiResult<String> {
        Ok("unstructured grid model".to_string())
    }
    fn get_input_item_count(&self) -> BmiResult<i32> {
        Ok(0)
    }
    fn get_output_item_count(&self) -> BmiResult<i32> {
        Ok(1)
    }
    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec![])
    }
    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec!["plate_surface__temperature".to_string()])
    }
    fn get_var_grid(&self, _name: &str) -> BmiResult<i32> {
        Ok(0)
    }
    fn get_var_type(&self, _name: &str) -> BmiResult<String> {
        Ok("float64".to_string())
    }
    fn get_var_units(&self, _name: &str) -> BmiResult<String> {
        Ok("K".to_string())
    }
    fn get_var_itemsize(&self, _name: &str) -> BmiResult<i32> {
        Ok(8)
    }
    fn get_var_nbytes(&self, _name: &str) -> BmiResult<i32> {
        Ok(32)
    }
    fn get_var_location(&self, _name: &str) -> BmiResult<String> {
        Ok("node".to_string())
    }
    fn get_current_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_start_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_end_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_time_units(&self) -> BmiResult<String> {
        Ok("s".to_string())
    }
    fn get_time_step(&self) -> BmiResult<f64> {
        Ok(1.0)
    }
    fn get_value(&self, _name: &str, mut dest: ValuesMut<'_>) -> BmiResult<()> {
        dest.copy_from(ValuesRef::Float64(&[10.0, 11.0, 12.0, 13.0]))
    }
    fn get_value_at_indices(
        &self,
        _name: &str,
        _dest: ValuesMut<'_>,
        _indices: &[i32],
    ) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_value_at_indices"))
    }
    fn set_value(&mut self, _name: &str, _src: ValuesRef<'_>) -> BmiResult<()> {
        Err(BmiError::NotImplemented("set_value"))
    }
    fn set_value_at_indices(
        &mut self,
        _name: &str,
        _indices: &[i32],
        _src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        Err(BmiError::NotImplemented("set_value_at_indices"))
    }
    fn get_grid_rank(&self, _grid: i32) -> BmiResult<i32> {
        Ok(2)
    }
    fn get_grid_size(&self, _grid: i32) -> BmiResult<i32> {
        Ok(4)
    }
    fn get_grid_type(&self, _grid: i32) -> BmiResult<String> {
        Ok("unstructured".to_string())
    }
    fn get_grid_shape(&self, _grid: i32, _shape: &mut [i32]) -> BmiResult<()> {
        Err(BmiError::NotImplemented("get_grid_shape"))
    }
    fn get_grid_x(&self, _grid: i32, x: &mut [f64]) -> BmiResult<()> {
        copy_into(&[0.0, 1.0, 0.0, -1.0], x)
    }
    fn get_grid_y(&self, _grid: i32, y: &mut [f64]) -> BmiResult<()> {
        copy_into(&[1.0, 0.0, -1.0, 0.0], y)
    }
    fn get_grid_node_count(&self, _grid: i32) -> BmiResult<i32> {
        Ok(4)
    }
    fn get_grid_edge_count(&self, _grid: i32) -> BmiResult<i32> {
        Ok(5)
    }
    fn get_grid_face_count(&self, _grid: i32) -> BmiResult<i32> {
        Ok(2)
    }
    fn get_grid_edge_nodes(&self, _grid: i32, edge_nodes: &mut [i32]) -> BmiResult<()> {
        copy_into(&[0, 3, 3, 2, 2, 1, 1, 0, 2, 0], edge_nodes)
    }
    fn get_grid_face_edges(&self, _grid: i32, face_edges: &mut [i32]) -> BmiResult<()> {
        copy_into(&[0, 1, 4, 4, 2, 3], face_edges)
    }
    fn get_grid_face_nodes(&self, _grid: i32, face_nodes: &mut [i32]) -> BmiResult<()> {
        copy_into(&[0, 3, 2, 0, 2, 1], face_nodes)
    }
    fn get_grid_nodes_per_face(&self, _grid: i32, nodes_per_face: &mut [i32]) -> BmiResult<()> {
        copy_into(&[3, 3], nodes_per_face)
    }
}

/// BMI 0.2 model with a single "points" grid of three nodes.
pub(crate) struct LegacyPointsModel;

impl LegacyBmi for LegacyPointsModel {
    fn initialize(&mut self, _config_file: Option<&str>) -> BmiResult<()> {
        Ok(())
    }
    fn update(&mut self) -> BmiResult<()> {
        Ok(())
    }
    fn update_until(&mut self, _time: f64) -> BmiResult<()> {
        Ok(())
    }
    fn finalize(&mut self) -> BmiResult<()> {
        Ok(())
    }
    fn get_component_name(&self) -> BmiResult<String> {
        Ok("legacy points model".to_string())
    }
    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec![])
    }
    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec!["depth".to_string()])
    }
    fn get_var_grid(&self, _name: &str) -> BmiResult<i32> {
        Ok(0)
    }
    fn get_var_type(&self, _name: &str) -> BmiResult<String> {
        Ok("float64".to_string())
    }
    fn get_var_units(&self, _name: &str) -> BmiResult<String> {
        Ok("m".to_string())
    }
    fn get_var_itemsize(&self, _name: &str) -> BmiResult<i32> {
        Ok(8)
    }
    fn get_var_nbytes(&self, _name: &str) -> BmiResult<i32> {
        Ok(24)
    }
    fn get_current_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_start_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }
    fn get_end_time(&self) -> BmiResult<f64> {
        Ok(1.0)
    }
    fn get_time_units(&self) -> BmiResult<String> {
        Ok("s".to_string())
    }
    fn get_time_step(&self) -> BmiResult<f64> {
        Ok(1.0)
    }
    fn get_value(&self, _name: &str) -> BmiResult<Values> {
        Ok(Values::Float64(vec![0.5, 1.5, 2.5]))
    }
    fn get_value_at_indices(&self, _name: &str, indices: &[i32]) -> BmiResult<Values> {
        Ok(Values::Float64(indices.iter().map(|i| *i as f64 + 0.5).collect()))
    }
    fn set_value(&mut self, _name: &str, _src: ValuesRef<'_>) -> BmiResult<()> {
        Err(BmiError::model("depth is read only"))
    }
    fn set_value_at_indices(
        &mut self,
        _name: &str,
        _indices: &[i32],
        _src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        Err(BmiError::model("depth is read only"))
    }
    fn get_grid_rank(&self, _grid: i32) -> BmiResult<i32> {
        Ok(2)
    }
    fn get_grid_size(&self, _grid: i32) -> BmiResult<i32> {
        Ok(3)
    }
    fn get_grid_type(&self, _grid: i32) -> BmiResult<String> {
        Ok("points".to_string())
    }
    fn get_grid_shape(&self, _grid: i32) -> BmiResult<Vec<i32>> {
        Err(BmiError::model("points grids have no shape"))
    }
    fn get_grid_spacing(&self, _grid: i32) -> BmiResult<Vec<f64>> {
        Err(BmiError::model("points grids have no spacing"))
    }
    fn get_grid_origin(&self, _grid: i32) -> BmiResult<Vec<f64>> {
        Err(BmiError::model("points grids have no origin"))
    }
    fn get_grid_x(&self, _grid: i32) -> BmiResult<Vec<f64>> {
        Ok(vec![1.0, 2.0, 3.0])
    }
    fn get_grid_y(&self, _grid: i32) -> BmiResult<Vec<f64>> {
        Ok(vec![4.0, 5.0, 6.0])
    }
    fn get_grid_z(&self, _grid: i32) -> BmiResult<Vec<f64>> {
        Err(BmiError::model("points grid is two dimensional"))
    }
}

/// A BMI server running on its own thread and runtime, listening on an OS chosen local port.
///
/// The server is shut down when dropped.
pub(crate) struct TestServer {
    pub(crate) port: u16,
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    pub(crate) fn spawn<M: Bmi + Send + 'static>(model: M) -> Self {
        Self::spawn_with(model, false, MAX_MESSAGE_SIZE)
    }

    pub(crate) fn spawn_with<M: Bmi + Send + 'static>(
        model: M,
        debug: bool,
        max_message_size: usize,
    ) -> Self {
        let listener = server::bind("127.0.0.1", 0).unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(AppState::new(Box::new(model), debug));
        let service = app::service(state, max_message_size);
        let handle = Handle::new();
        let server_handle = handle.clone();
        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            runtime
                .block_on(server::serve(listener, service, server_handle))
                .unwrap();
        });
        TestServer {
            port,
            handle,
            thread: Some(thread),
        }
    }

    /// Returns a client connected to this server.
    pub(crate) fn client(&self) -> BmiClient {
        BmiClient::connect("127.0.0.1", self.port).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.shutdown();
        if let Some(thread) = self.thread.take() {
            thread.join().unwrap();
        }
    }
}

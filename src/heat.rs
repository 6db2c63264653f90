//! Reference model: the two dimensional heat equation.
//!
//! Temperatures live on the nodes of a uniform rectilinear grid and diffuse with an explicit
//! five point stencil. Boundary nodes are held fixed.
//!
//! The model reads an optional YAML configuration:
//!
//! ```yaml
//! shape: [10, 20]
//! spacing: [1.0, 1.0]
//! origin: [0.0, 0.0]
//! alpha: 1.0
//! seed: 0
//! initial_temperature: ~/forcing/plate.yaml
//! ```
//!
//! `initial_temperature` names a YAML file holding one list of temperatures per row. Without
//! it the plate starts at seeded random temperatures. Relative paths are resolved against the
//! working directory of the model.

use std::fs::File;

use expanduser::expanduser;
use ndarray::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{event, Level};
use validator::{Validate, ValidationError};

use crate::bmi::{Bmi, BmiResult};
use crate::error::BmiError;
use crate::legacy::LegacyBmi;
use crate::optional_dest::OptionalDest;
use crate::types::{Values, ValuesMut, ValuesRef};

/// Name of the only variable.
pub const TEMPERATURE: &str = "plate_surface__temperature";

/// Largest number of time steps a single `update_until` call may take.
pub const MAX_STEPS_PER_UPDATE: u64 = 1_000_000;

/// Heat model configuration
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_heat_config"))]
pub struct HeatConfig {
    /// Number of rows and columns
    pub shape: [usize; 2],
    /// Distance between rows and between columns
    pub spacing: [f64; 2],
    /// Coordinates of the first node
    pub origin: [f64; 2],
    /// Thermal diffusivity
    pub alpha: f64,
    /// Seed of the random initial temperatures
    pub seed: u64,
    /// File with the initial temperatures, one list per row
    pub initial_temperature: Option<String>,
}

impl Default for HeatConfig {
    fn default() -> Self {
        HeatConfig {
            shape: [10, 20],
            spacing: [1.0, 1.0],
            origin: [0.0, 0.0],
            alpha: 1.0,
            seed: 0,
            initial_temperature: None,
        }
    }
}

fn validate_heat_config(config: &HeatConfig) -> Result<(), ValidationError> {
    if config.shape.contains(&0) {
        return Err(ValidationError::new("shape must not contain zero"));
    }
    if config.spacing.iter().any(|spacing| *spacing <= 0.0) {
        return Err(ValidationError::new("spacing must be positive"));
    }
    if config.alpha <= 0.0 {
        return Err(ValidationError::new("alpha must be positive"));
    }
    Ok(())
}

impl HeatConfig {
    /// Read a configuration file.
    pub fn from_file(path: &str) -> BmiResult<Self> {
        let config: HeatConfig = serde_yaml::from_reader(File::open(expanduser(path)?)?)?;
        config.validate().map_err(|err| {
            BmiError::InvalidArgument(format!("invalid heat configuration: {}", err))
        })?;
        Ok(config)
    }
}

/// Read initial temperatures of the given shape from a YAML file.
fn read_temperature(path: &str, shape: [usize; 2]) -> BmiResult<Array2<f64>> {
    let rows: Vec<Vec<f64>> = serde_yaml::from_reader(File::open(expanduser(path)?)?)?;
    if rows.len() != shape[0] || rows.iter().any(|row| row.len() != shape[1]) {
        return Err(BmiError::InvalidArgument(format!(
            "initial temperature file {} does not match shape {:?}",
            path, shape
        )));
    }
    let values = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec(shape, values)?)
}

/// The 2D heat equation as a [Bmi] model.
pub struct BmiHeat {
    config: HeatConfig,
    temperature: Array2<f64>,
    time: f64,
    time_step: f64,
}

impl Default for BmiHeat {
    fn default() -> Self {
        Self::new(HeatConfig::default())
    }
}

impl BmiHeat {
    pub fn new(config: HeatConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let temperature = Array2::from_shape_simple_fn(config.shape, || rng.gen::<f64>());
        let min_spacing = config.spacing[0].min(config.spacing[1]);
        let time_step = min_spacing * min_spacing / (4.0 * config.alpha);
        BmiHeat {
            config,
            temperature,
            time: 0.0,
            time_step,
        }
    }

    /// Create a model, reading initial temperatures if the configuration names a file.
    pub fn from_config(config: HeatConfig) -> BmiResult<Self> {
        let temperature = match &config.initial_temperature {
            Some(path) => Some(read_temperature(path, config.shape)?),
            None => None,
        };
        let mut model = Self::new(config);
        if let Some(temperature) = temperature {
            model.temperature = temperature;
        }
        Ok(model)
    }

    /// Returns the temperatures in grid layout.
    pub fn temperature(&self) -> ArrayView2<'_, f64> {
        self.temperature.view()
    }

    /// Advance by `dt` seconds.
    fn step(&mut self, dt: f64) {
        let (rows, cols) = self.temperature.dim();
        if rows > 2 && cols > 2 {
            let dy2 = self.config.spacing[0] * self.config.spacing[0];
            let dx2 = self.config.spacing[1] * self.config.spacing[1];
            let z = &self.temperature;
            let up = z.slice(s![..-2, 1..-1]);
            let down = z.slice(s![2.., 1..-1]);
            let left = z.slice(s![1..-1, ..-2]);
            let right = z.slice(s![1..-1, 2..]);
            let center = z.slice(s![1..-1, 1..-1]);
            let delta = ((&up + &down) * dy2 + (&left + &right) * dx2
                - &center * (2.0 * (dx2 + dy2)))
                * (self.config.alpha * dt / (2.0 * dx2 * dy2));
            let mut interior = self.temperature.slice_mut(s![1..-1, 1..-1]);
            interior += &delta;
        }
        self.time += dt;
    }

    fn check_var(&self, name: &str) -> BmiResult<()> {
        if name == TEMPERATURE {
            Ok(())
        } else {
            Err(BmiError::model(format!("unknown variable {}", name)))
        }
    }

    fn check_grid(&self, grid: i32) -> BmiResult<()> {
        if grid == 0 {
            Ok(())
        } else {
            Err(BmiError::model(format!("unknown grid {}", grid)))
        }
    }

    fn values(&self) -> BmiResult<&[f64]> {
        self.temperature
            .as_slice()
            .ok_or_else(|| BmiError::model("temperature array is not contiguous"))
    }

    fn values_mut(&mut self) -> BmiResult<&mut [f64]> {
        self.temperature
            .as_slice_mut()
            .ok_or_else(|| BmiError::model("temperature array is not contiguous"))
    }

    fn flat_index(&self, index: i32) -> BmiResult<usize> {
        let index = usize::try_from(index)?;
        if index >= self.temperature.len() {
            return Err(BmiError::model(format!(
                "index {} is out of bounds for {} values",
                index,
                self.temperature.len()
            )));
        }
        Ok(index)
    }

    fn copy_grid<T: Copy>(&self, grid: i32, src: &[T], dest: &mut [T]) -> BmiResult<()> {
        self.check_grid(grid)?;
        if src.len() != dest.len() {
            return Err(BmiError::BufferSize {
                expected: dest.len(),
                actual: src.len(),
            });
        }
        dest.copy_from_slice(src);
        Ok(())
    }

    /// Node coordinates along dimension `dim` of the shape.
    fn coordinates(&self, dim: usize) -> Vec<f64> {
        (0..self.config.shape[dim])
            .map(|i| self.config.origin[dim] + self.config.spacing[dim] * i as f64)
            .collect()
    }
}

impl Bmi for BmiHeat {
    fn initialize(&mut self, config_file: Option<&str>) -> BmiResult<()> {
        let config = match config_file {
            Some(path) if !path.is_empty() => HeatConfig::from_file(path)?,
            _ => HeatConfig::default(),
        };
        event!(Level::DEBUG, ?config, "initialising heat model");
        *self = Self::from_config(config)?;
        Ok(())
    }

    fn update(&mut self) -> BmiResult<()> {
        self.step(self.time_step);
        Ok(())
    }

    fn update_until(&mut self, time: f64) -> BmiResult<()> {
        let steps = (time - self.time) / self.time_step;
        if steps.is_nan() || steps <= 0.0 {
            return Ok(());
        }
        if steps > MAX_STEPS_PER_UPDATE as f64 {
            return Err(BmiError::model(format!(
                "cannot update from time {} until {}: more than {} time steps of {}",
                self.time, time, MAX_STEPS_PER_UPDATE, self.time_step
            )));
        }
        let whole = steps.floor();
        for _ in 0..whole as u64 {
            self.step(self.time_step);
        }
        let fraction = steps - whole;
        if fraction > 0.0 {
            self.step(fraction * self.time_step);
        }
        Ok(())
    }

    fn finalize(&mut self) -> BmiResult<()> {
        Ok(())
    }

    fn get_component_name(&self) -> BmiResult<String> {
        Ok("The 2D Heat Equation".to_string())
    }

    fn get_input_item_count(&self) -> BmiResult<i32> {
        Ok(1)
    }

    fn get_output_item_count(&self) -> BmiResult<i32> {
        Ok(1)
    }

    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec![TEMPERATURE.to_string()])
    }

    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(vec![TEMPERATURE.to_string()])
    }

    fn get_var_grid(&self, name: &str) -> BmiResult<i32> {
        self.check_var(name)?;
        Ok(0)
    }

    fn get_var_type(&self, name: &str) -> BmiResult<String> {
        self.check_var(name)?;
        Ok("float64".to_string())
    }

    fn get_var_units(&self, name: &str) -> BmiResult<String> {
        self.check_var(name)?;
        Ok("K".to_string())
    }

    fn get_var_itemsize(&self, name: &str) -> BmiResult<i32> {
        self.check_var(name)?;
        Ok(i32::try_from(std::mem::size_of::<f64>())?)
    }

    fn get_var_nbytes(&self, name: &str) -> BmiResult<i32> {
        self.check_var(name)?;
        Ok(i32::try_from(
            std::mem::size_of::<f64>() * self.temperature.len(),
        )?)
    }

    fn get_var_location(&self, name: &str) -> BmiResult<String> {
        self.check_var(name)?;
        Ok("node".to_string())
    }

    fn get_current_time(&self) -> BmiResult<f64> {
        Ok(self.time)
    }

    fn get_start_time(&self) -> BmiResult<f64> {
        Ok(0.0)
    }

    fn get_end_time(&self) -> BmiResult<f64> {
        Ok(f64::MAX)
    }

    fn get_time_units(&self) -> BmiResult<String> {
        Ok("s".to_string())
    }

    fn get_time_step(&self) -> BmiResult<f64> {
        Ok(self.time_step)
    }

    fn get_value(&self, name: &str, mut dest: ValuesMut<'_>) -> BmiResult<()> {
        self.check_var(name)?;
        dest.copy_from(ValuesRef::Float64(self.values()?))
    }

    fn get_value_at_indices(
        &self,
        name: &str,
        mut dest: ValuesMut<'_>,
        indices: &[i32],
    ) -> BmiResult<()> {
        self.check_var(name)?;
        let values = self.values()?;
        let selected = indices
            .iter()
            .map(|index| Ok(values[self.flat_index(*index)?]))
            .collect::<BmiResult<Vec<f64>>>()?;
        dest.copy_from(ValuesRef::Float64(&selected))
    }

    fn set_value(&mut self, name: &str, src: ValuesRef<'_>) -> BmiResult<()> {
        self.check_var(name)?;
        ValuesMut::Float64(self.values_mut()?).copy_from(src)
    }

    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[i32],
        src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        self.check_var(name)?;
        let src = match src {
            ValuesRef::Float64(src) => src,
            other => {
                return Err(BmiError::TypeMismatch {
                    expected: "float64".to_string(),
                    actual: other.value_type().to_string(),
                })
            }
        };
        if src.len() != indices.len() {
            return Err(BmiError::BufferSize {
                expected: indices.len(),
                actual: src.len(),
            });
        }
        let indices = indices
            .iter()
            .map(|index| self.flat_index(*index))
            .collect::<BmiResult<Vec<usize>>>()?;
        let values = self.values_mut()?;
        for (index, value) in indices.into_iter().zip(src) {
            values[index] = *value;
        }
        Ok(())
    }

    fn get_grid_rank(&self, grid: i32) -> BmiResult<i32> {
        self.check_grid(grid)?;
        Ok(2)
    }

    fn get_grid_size(&self, grid: i32) -> BmiResult<i32> {
        self.check_grid(grid)?;
        Ok(i32::try_from(self.temperature.len())?)
    }

    fn get_grid_type(&self, grid: i32) -> BmiResult<String> {
        self.check_grid(grid)?;
        Ok("uniform_rectilinear".to_string())
    }

    fn get_grid_shape(&self, grid: i32, shape: &mut [i32]) -> BmiResult<()> {
        let src = [
            i32::try_from(self.config.shape[0])?,
            i32::try_from(self.config.shape[1])?,
        ];
        self.copy_grid(grid, &src, shape)
    }

    fn get_grid_spacing(&self, grid: i32, spacing: &mut [f64]) -> BmiResult<()> {
        self.copy_grid(grid, &self.config.spacing, spacing)
    }

    fn get_grid_origin(&self, grid: i32, origin: &mut [f64]) -> BmiResult<()> {
        self.copy_grid(grid, &self.config.origin, origin)
    }

    fn get_grid_x(&self, grid: i32, x: &mut [f64]) -> BmiResult<()> {
        self.copy_grid(grid, &self.coordinates(1), x)
    }

    fn get_grid_y(&self, grid: i32, y: &mut [f64]) -> BmiResult<()> {
        self.copy_grid(grid, &self.coordinates(0), y)
    }

    fn get_grid_node_count(&self, grid: i32) -> BmiResult<i32> {
        self.get_grid_size(grid)
    }
}

/// [BmiHeat] behind the BMI 0.2 interface.
#[derive(Default)]
pub struct LegacyBmiHeat {
    heat: BmiHeat,
}

impl LegacyBmi for LegacyBmiHeat {
    fn initialize(&mut self, config_file: Option<&str>) -> BmiResult<()> {
        self.heat.initialize(config_file)
    }

    fn update(&mut self) -> BmiResult<()> {
        self.heat.update()
    }

    fn update_until(&mut self, time: f64) -> BmiResult<()> {
        self.heat.update_until(time)
    }

    fn finalize(&mut self) -> BmiResult<()> {
        self.heat.finalize()
    }

    fn get_component_name(&self) -> BmiResult<String> {
        self.heat.get_component_name()
    }

    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        self.heat.get_input_var_names()
    }

    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        self.heat.get_output_var_names()
    }

    fn get_var_grid(&self, name: &str) -> BmiResult<i32> {
        self.heat.get_var_grid(name)
    }

    fn get_var_type(&self, name: &str) -> BmiResult<String> {
        self.heat.get_var_type(name)
    }

    fn get_var_units(&self, name: &str) -> BmiResult<String> {
        self.heat.get_var_units(name)
    }

    fn get_var_itemsize(&self, name: &str) -> BmiResult<i32> {
        self.heat.get_var_itemsize(name)
    }

    fn get_var_nbytes(&self, name: &str) -> BmiResult<i32> {
        self.heat.get_var_nbytes(name)
    }

    fn get_current_time(&self) -> BmiResult<f64> {
        self.heat.get_current_time()
    }

    fn get_start_time(&self) -> BmiResult<f64> {
        self.heat.get_start_time()
    }

    fn get_end_time(&self) -> BmiResult<f64> {
        self.heat.get_end_time()
    }

    fn get_time_units(&self) -> BmiResult<String> {
        self.heat.get_time_units()
    }

    fn get_time_step(&self) -> BmiResult<f64> {
        self.heat.get_time_step()
    }

    fn get_value(&self, name: &str) -> BmiResult<Values> {
        self.heat.value(name)
    }

    fn get_value_at_indices(&self, name: &str, indices: &[i32]) -> BmiResult<Values> {
        self.heat.value_at_indices(name, indices)
    }

    fn set_value(&mut self, name: &str, src: ValuesRef<'_>) -> BmiResult<()> {
        self.heat.set_value(name, src)
    }

    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[i32],
        src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        self.heat.set_value_at_indices(name, indices, src)
    }

    fn get_grid_rank(&self, grid: i32) -> BmiResult<i32> {
        self.heat.get_grid_rank(grid)
    }

    fn get_grid_size(&self, grid: i32) -> BmiResult<i32> {
        self.heat.get_grid_size(grid)
    }

    fn get_grid_type(&self, grid: i32) -> BmiResult<String> {
        self.heat.get_grid_type(grid)
    }

    fn get_grid_shape(&self, grid: i32) -> BmiResult<Vec<i32>> {
        self.heat.grid_shape(grid)
    }

    fn get_grid_spacing(&self, grid: i32) -> BmiResult<Vec<f64>> {
        self.heat.grid_spacing(grid)
    }

    fn get_grid_origin(&self, grid: i32) -> BmiResult<Vec<f64>> {
        self.heat.grid_origin(grid)
    }

    fn get_grid_x(&self, grid: i32) -> BmiResult<Vec<f64>> {
        self.heat.grid_x(grid)
    }

    fn get_grid_y(&self, grid: i32) -> BmiResult<Vec<f64>> {
        self.heat.grid_y(grid)
    }

    fn get_grid_z(&self, grid: i32) -> BmiResult<Vec<f64>> {
        self.heat.grid_z(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::path::PathBuf;

    use uuid::Uuid;

    fn write_config(text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("heat-{}.yaml", Uuid::new_v4()));
        File::create(&path)
            .unwrap()
            .write_all(text.as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn defaults() {
        let model = BmiHeat::default();
        assert_eq!("The 2D Heat Equation", model.get_component_name().unwrap());
        assert_eq!(200, model.get_grid_size(0).unwrap());
        assert_eq!(1600, model.get_var_nbytes(TEMPERATURE).unwrap());
        assert_eq!(8, model.get_var_itemsize(TEMPERATURE).unwrap());
        assert_eq!(0.25, model.get_time_step().unwrap());
        assert_eq!(f64::MAX, model.get_end_time().unwrap());
        assert_eq!(vec![10, 20], model.grid_shape(0).unwrap());
        assert_eq!("uniform_rectilinear", model.get_grid_type(0).unwrap());
    }

    #[test]
    fn seeded_initial_values() {
        let a = BmiHeat::default().value(TEMPERATURE).unwrap();
        let b = BmiHeat::default().value(TEMPERATURE).unwrap();
        assert_eq!(a, b);
        let c = BmiHeat::new(HeatConfig {
            seed: 1,
            ..HeatConfig::default()
        })
        .value(TEMPERATURE)
        .unwrap();
        assert_ne!(a, c);
        assert!(BmiHeat::default()
            .temperature()
            .iter()
            .all(|t| (0.0..1.0).contains(t)));
    }

    #[test]
    fn hot_spot_diffuses() {
        let mut model = BmiHeat::new(HeatConfig {
            shape: [5, 5],
            ..HeatConfig::default()
        });
        model
            .set_value(TEMPERATURE, ValuesRef::Float64(&[0.0; 25]))
            .unwrap();
        model
            .set_value_at_indices(TEMPERATURE, &[12], ValuesRef::Float64(&[1.0]))
            .unwrap();
        model.update().unwrap();
        let temperature = model.temperature();
        assert_eq!(0.5, temperature[[2, 2]]);
        assert_eq!(0.125, temperature[[1, 2]]);
        assert_eq!(0.125, temperature[[2, 3]]);
        assert_eq!(0.0, temperature[[1, 1]]);
        assert_eq!(0.25, model.get_current_time().unwrap());
    }

    #[test]
    fn boundary_fixed() {
        let mut model = BmiHeat::default();
        let before = model.temperature().to_owned();
        model.update().unwrap();
        let after = model.temperature();
        assert_eq!(before.row(0), after.row(0));
        assert_eq!(before.row(9), after.row(9));
        assert_eq!(before.column(0), after.column(0));
        assert_eq!(before.column(19), after.column(19));
        assert_ne!(before, after);
    }

    #[test]
    fn update_until_fraction() {
        let mut model = BmiHeat::default();
        model.update_until(1.1).unwrap();
        assert!((model.get_current_time().unwrap() - 1.1).abs() < 1e-12);
        model.update_until(0.5).unwrap();
        assert!((model.get_current_time().unwrap() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn update_until_end_time() {
        let mut model = BmiHeat::default();
        model.update().unwrap();
        let before = model.temperature().to_owned();
        let end = model.get_end_time().unwrap();
        let err = model.update_until(end).unwrap_err();
        assert!(err.to_string().starts_with("cannot update from time 0.25"), "{}", err);
        assert_eq!(0.25, model.get_current_time().unwrap());
        assert_eq!(before, model.temperature());
        assert!(model.update_until(f64::INFINITY).is_err());
        assert!(model.update_until(f64::NAN).is_ok());
    }

    #[test]
    fn initialize_from_file() {
        let path = write_config("shape: [4, 3]\nspacing: [2.0, 0.5]\norigin: [1.0, -1.0]\n");
        let mut model = BmiHeat::default();
        model.initialize(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(vec![4, 3], model.grid_shape(0).unwrap());
        assert_eq!(0.0625, model.get_time_step().unwrap());
        assert_eq!(vec![-1.0, -0.5, 0.0], model.grid_x(0).unwrap());
        assert_eq!(vec![1.0, 3.0, 5.0, 7.0], model.grid_y(0).unwrap());
        assert_eq!(vec![1.0, -1.0], model.grid_origin(0).unwrap());
    }

    #[test]
    fn initialize_with_initial_temperature() {
        let plate = write_config("- [1.0, 2.0, 3.0]\n- [4.0, 5.0, 6.0]\n");
        let config = format!(
            "shape: [2, 3]\ninitial_temperature: {}\n",
            plate.display()
        );
        let path = write_config(&config);
        let mut model = BmiHeat::default();
        model.initialize(path.to_str()).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(&plate).unwrap();

        assert_eq!(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], model.temperature());
        assert_eq!(
            Values::Float64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            model.value(TEMPERATURE).unwrap()
        );
    }

    #[test]
    fn initial_temperature_wrong_shape() {
        let plate = write_config("- [1.0, 2.0]\n- [4.0, 5.0]\n");
        let config = format!(
            "shape: [2, 3]\ninitial_temperature: {}\n",
            plate.display()
        );
        let path = write_config(&config);
        let mut model = BmiHeat::default();
        let err = model.initialize(path.to_str()).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(&plate).unwrap();
        assert!(matches!(err, BmiError::InvalidArgument(_)), "{:?}", err);
        assert!(err.to_string().ends_with("does not match shape [2, 3]"), "{}", err);
        assert_eq!(vec![10, 20], model.grid_shape(0).unwrap());
    }

    #[test]
    fn initialize_invalid_config() {
        let path = write_config("alpha: -1.0\n");
        let mut model = BmiHeat::default();
        let err = model.initialize(path.to_str()).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(
            err.to_string().starts_with("invalid heat configuration"),
            "{}",
            err
        );
    }

    #[test]
    fn initialize_missing_file() {
        let mut model = BmiHeat::default();
        let err = model.initialize(Some("/does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, BmiError::Io(_)), "{:?}", err);
    }

    #[test]
    fn unknown_variable() {
        let model = BmiHeat::default();
        let err = model.get_var_units("foo").unwrap_err();
        assert_eq!("unknown variable foo", err.to_string());
    }

    #[test]
    fn index_out_of_bounds() {
        let model = BmiHeat::default();
        let mut dest = [0.0; 1];
        let err = model
            .get_value_at_indices(TEMPERATURE, ValuesMut::Float64(&mut dest), &[200])
            .unwrap_err();
        assert_eq!("index 200 is out of bounds for 200 values", err.to_string());
    }

    #[test]
    fn set_value_wrong_type() {
        let mut model = BmiHeat::default();
        let err = model
            .set_value_at_indices(TEMPERATURE, &[0], ValuesRef::Float32(&[1.0]))
            .unwrap_err();
        assert_eq!("expected float64 values but got float32", err.to_string());
    }

    #[test]
    fn legacy_matches() {
        let heat = BmiHeat::default();
        let legacy = LegacyBmiHeat::default();
        assert_eq!(
            heat.value(TEMPERATURE).unwrap(),
            LegacyBmi::get_value(&legacy, TEMPERATURE).unwrap()
        );
        assert_eq!(
            vec![10, 20],
            LegacyBmi::get_grid_shape(&legacy, 0).unwrap()
        );
        assert!(LegacyBmi::get_grid_z(&legacy, 0).is_err());
    }
}

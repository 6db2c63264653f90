//! Caching wrapper for models whose metadata does not change.
//!
//! Remote models pay a round trip for every call. [MemoizedBmi] remembers the results of calls
//! that only describe the model, so repeated queries for names, types, units and grids stay
//! local.

use std::sync::Mutex;

use hashbrown::HashMap;

use crate::bmi::{Bmi, BmiResult};
use crate::error::BmiError;
use crate::types::{ValuesMut, ValuesRef};

/// A cached call result.
#[derive(Clone, Debug, PartialEq)]
enum Cached {
    Str(String),
    Int(i32),
    Float(f64),
    Names(Vec<String>),
    Ints(Vec<i32>),
    Floats(Vec<f64>),
}

/// Conversion between call results and [Cached].
trait CacheValue: Clone + Sized {
    fn into_cached(self) -> Cached;
    fn from_cached(cached: &Cached) -> Option<Self>;
}

macro_rules! impl_cache_value {
    ($type:ty, $variant:ident) => {
        impl CacheValue for $type {
            fn into_cached(self) -> Cached {
                Cached::$variant(self)
            }

            fn from_cached(cached: &Cached) -> Option<Self> {
                match cached {
                    Cached::$variant(value) => Some(value.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_cache_value!(String, Str);
impl_cache_value!(i32, Int);
impl_cache_value!(f64, Float);
impl_cache_value!(Vec<String>, Names);
impl_cache_value!(Vec<i32>, Ints);
impl_cache_value!(Vec<f64>, Floats);

/// Cache key: method name and the variable name or grid identifier, if any.
type Key = (&'static str, Option<String>);

/// Wrapper around a model that caches results of calls describing the model.
///
/// The following calls always reach the wrapped model: `initialize`, `update`, `update_until`,
/// `finalize`, `get_current_time` and the `get_value*` and `set_value*` families.
/// `initialize` also empties the cache.
pub struct MemoizedBmi<B: Bmi> {
    inner: B,
    cache: Mutex<HashMap<Key, Cached>>,
}

impl<B: Bmi> MemoizedBmi<B> {
    /// Wrap `inner`.
    pub fn new(inner: B) -> Self {
        MemoizedBmi {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the wrapped model.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Returns the wrapped model mutably. The cache is kept.
    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    /// Unwrap the model, dropping the cache.
    pub fn into_inner(self) -> B {
        self.inner
    }

    fn memoize<T, F>(&self, method: &'static str, arg: Option<String>, compute: F) -> BmiResult<T>
    where
        T: CacheValue,
        F: FnOnce(&B) -> BmiResult<T>,
    {
        let key = (method, arg);
        let hit = self
            .cache
            .lock()
            .map_err(|_| BmiError::Poisoned)?
            .get(&key)
            .and_then(T::from_cached);
        if let Some(value) = hit {
            return Ok(value);
        }
        let value = compute(&self.inner)?;
        self.cache
            .lock()
            .map_err(|_| BmiError::Poisoned)?
            .insert(key, value.clone().into_cached());
        Ok(value)
    }

    /// Memoize a grid call that writes into a destination buffer.
    fn memoize_grid<T, F>(
        &self,
        method: &'static str,
        grid: i32,
        dest: &mut [T],
        fetch: F,
    ) -> BmiResult<()>
    where
        T: Copy,
        Vec<T>: CacheValue,
        F: FnOnce(&B, &mut [T]) -> BmiResult<()>,
    {
        let values: Vec<T> = self.memoize(method, Some(grid.to_string()), |inner| {
            let mut values = dest.to_vec();
            fetch(inner, &mut values)?;
            Ok(values)
        })?;
        if values.len() != dest.len() {
            return Err(BmiError::BufferSize {
                expected: dest.len(),
                actual: values.len(),
            });
        }
        dest.copy_from_slice(&values);
        Ok(())
    }
}

impl<B: Bmi> Bmi for MemoizedBmi<B> {
    fn initialize(&mut self, config_file: Option<&str>) -> BmiResult<()> {
        self.cache
            .get_mut()
            .map_err(|_| BmiError::Poisoned)?
            .clear();
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
        self.memoize("get_component_name", None, |inner| inner.get_component_name())
    }

    fn get_input_item_count(&self) -> BmiResult<i32> {
        self.memoize("get_input_item_count", None, |inner| {
            inner.get_input_item_count()
        })
    }

    fn get_output_item_count(&self) -> BmiResult<i32> {
        self.memoize("get_output_item_count", None, |inner| {
            inner.get_output_item_count()
        })
    }

    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        self.memoize("get_input_var_names", None, |inner| {
            inner.get_input_var_names()
        })
    }

    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        self.memoize("get_output_var_names", None, |inner| {
            inner.get_output_var_names()
        })
    }

    fn get_var_grid(&self, name: &str) -> BmiResult<i32> {
        self.memoize("get_var_grid", Some(name.into()), |inner| {
            inner.get_var_grid(name)
        })
    }

    fn get_var_type(&self, name: &str) -> BmiResult<String> {
        self.memoize("get_var_type", Some(name.into()), |inner| {
            inner.get_var_type(name)
        })
    }

    fn get_var_units(&self, name: &str) -> BmiResult<String> {
        self.memoize("get_var_units", Some(name.into()), |inner| {
            inner.get_var_units(name)
        })
    }

    fn get_var_itemsize(&self, name: &str) -> BmiResult<i32> {
        self.memoize("get_var_itemsize", Some(name.into()), |inner| {
            inner.get_var_itemsize(name)
        })
    }

    fn get_var_nbytes(&self, name: &str) -> BmiResult<i32> {
        self.memoize("get_var_nbytes", Some(name.into()), |inner| {
            inner.get_var_nbytes(name)
        })
    }

    fn get_var_location(&self, name: &str) -> BmiResult<String> {
        self.memoize("get_var_location", Some(name.into()), |inner| {
            inner.get_var_location(name)
        })
    }

    fn get_current_time(&self) -> BmiResult<f64> {
        self.inner.get_current_time()
    }

    fn get_start_time(&self) -> BmiResult<f64> {
        self.memoize("get_start_time", None, |inner| inner.get_start_time())
    }

    fn get_end_time(&self) -> BmiResult<f64> {
        self.memoize("get_end_time", None, |inner| inner.get_end_time())
    }

    fn get_time_units(&self) -> BmiResult<String> {
        self.memoize("get_time_units", None, |inner| inner.get_time_units())
    }

    fn get_time_step(&self) -> BmiResult<f64> {
        self.memoize("get_time_step", None, |inner| inner.get_time_step())
    }

    fn get_value(&self, name: &str, dest: ValuesMut<'_>) -> BmiResult<()> {
        self.inner.get_value(name, dest)
    }

    fn get_value_at_indices(
        &self,
        name: &str,
        dest: ValuesMut<'_>,
        indices: &[i32],
    ) -> BmiResult<()> {
        self.inner.get_value_at_indices(name, dest, indices)
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
        self.memoize("get_grid_rank", Some(grid.to_string()), |inner| {
            inner.get_grid_rank(grid)
        })
    }

    fn get_grid_size(&self, grid: i32) -> BmiResult<i32> {
        self.memoize("get_grid_size", Some(grid.to_string()), |inner| {
            inner.get_grid_size(grid)
        })
    }

    fn get_grid_type(&self, grid: i32) -> BmiResult<String> {
        self.memoize("get_grid_type", Some(grid.to_string()), |inner| {
            inner.get_grid_type(grid)
        })
    }

    fn get_grid_shape(&self, grid: i32, shape: &mut [i32]) -> BmiResult<()> {
        self.memoize_grid("get_grid_shape", grid, shape, |inner, dest| {
            inner.get_grid_shape(grid, dest)
        })
    }

    fn get_grid_spacing(&self, grid: i32, spacing: &mut [f64]) -> BmiResult<()> {
        self.memoize_grid("get_grid_spacing", grid, spacing, |inner, dest| {
            inner.get_grid_spacing(grid, dest)
        })
    }

    fn get_grid_origin(&self, grid: i32, origin: &mut [f64]) -> BmiResult<()> {
        self.memoize_grid("get_grid_origin", grid, origin, |inner, dest| {
            inner.get_grid_origin(grid, dest)
        })
    }

    fn get_grid_x(&self, grid: i32, x: &mut [f64]) -> BmiResult<()> {
        self.memoize_grid("get_grid_x", grid, x, |inner, dest| {
            inner.get_grid_x(grid, dest)
        })
    }

    fn get_grid_y(&self, grid: i32, y: &mut [f64]) -> BmiResult<()> {
        self.memoize_grid("get_grid_y", grid, y, |inner, dest| {
            inner.get_grid_y(grid, dest)
        })
    }

    fn get_grid_z(&self, grid: i32, z: &mut [f64]) -> BmiResult<()> {
        self.memoize_grid("get_grid_z", grid, z, |inner, dest| {
            inner.get_grid_z(grid, dest)
        })
    }

    fn get_grid_node_count(&self, grid: i32) -> BmiResult<i32> {
        self.memoize("get_grid_node_count", Some(grid.to_string()), |inner| {
            inner.get_grid_node_count(grid)
        })
    }

    fn get_grid_edge_count(&self, grid: i32) -> BmiResult<i32> {
        self.memoize("get_grid_edge_count", Some(grid.to_string()), |inner| {
            inner.get_grid_edge_count(grid)
        })
    }

    fn get_grid_face_count(&self, grid: i32) -> BmiResult<i32> {
        self.memoize("get_grid_face_count", Some(grid.to_string()), |inner| {
            inner.get_grid_face_count(grid)
        })
    }

    fn get_grid_edge_nodes(&self, grid: i32, edge_nodes: &mut [i32]) -> BmiResult<()> {
        self.memoize_grid("get_grid_edge_nodes", grid, edge_nodes, |inner, dest| {
            inner.get_grid_edge_nodes(grid, dest)
        })
    }

    fn get_grid_face_edges(&self, grid: i32, face_edges: &mut [i32]) -> BmiResult<()> {
        self.memoize_grid("get_grid_face_edges", grid, face_edges, |inner, dest| {
            inner.get_grid_face_edges(grid, dest)
        })
    }

    fn get_grid_face_nodes(&self, grid: i32, face_nodes: &mut [i32]) -> BmiResult<()> {
        self.memoize_grid("get_grid_face_nodes", grid, face_nodes, |inner, dest| {
            inner.get_grid_face_nodes(grid, dest)
        })
    }

    fn get_grid_nodes_per_face(&self, grid: i32, nodes_per_face: &mut [i32]) -> BmiResult<()> {
        self.memoize_grid(
            "get_grid_nodes_per_face",
            grid,
            nodes_per_face,
            |inner, dest| inner.get_grid_nodes_per_face(grid, dest),
        )
    }
}

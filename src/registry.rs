//! Resolution of model names to model implementations.
//!
//! Models are named `module.Class`. Either part may instead come from the `BMI_MODULE` and
//! `BMI_CLASS` environment variables.

use clap::ValueEnum;
use tracing::{event, Level};

use crate::bmi::Bmi;
use crate::error::BmiError;
use crate::heat::{BmiHeat, LegacyBmiHeat};
use crate::legacy::LegacyBmiAdapter;

pub const ENV_BMI_PACKAGE: &str = "BMI_PACKAGE";
pub const ENV_BMI_MODULE: &str = "BMI_MODULE";
pub const ENV_BMI_CLASS: &str = "BMI_CLASS";

/// Version of the BMI convention a model implements
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum BmiVersion {
    #[value(name = "2.0", alias = "1.0.0")]
    V2,
    #[value(name = "0.2")]
    V0_2,
}

/// A model served by the relay.
pub type BoxedBmi = Box<dyn Bmi + Send>;

/// Module and class of a model implementation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModelName {
    pub module: String,
    pub class: String,
}

impl ModelName {
    /// Resolve a `module.Class` name, filling in missing parts with `lookup`.
    ///
    /// # Arguments
    ///
    /// * `name`: Name given on the command line, if any
    /// * `lookup`: Returns the value of an environment variable
    pub fn resolve<F>(name: Option<&str>, lookup: F) -> Result<Self, BmiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parts: Vec<&str> = name.map(|name| name.split('.').collect()).unwrap_or_default();
        let display_name = name.unwrap_or("None");

        let class = parts
            .last()
            .filter(|class| !class.is_empty())
            .map(|class| class.to_string())
            .or_else(|| lookup(ENV_BMI_CLASS).filter(|class| !class.is_empty()))
            .ok_or_else(|| {
                BmiError::InvalidArgument(format!(
                    "Missing bmi implementation: class could not be derived from name input {} or environment variable {}",
                    display_name, ENV_BMI_CLASS
                ))
            })?;

        let module = Some(parts.len())
            .filter(|len| *len > 1)
            .map(|len| parts[..len - 1].join("."))
            .or_else(|| lookup(ENV_BMI_MODULE).filter(|module| !module.is_empty()))
            .ok_or_else(|| {
                BmiError::InvalidArgument(format!(
                    "Missing module name: module could not be derived from name input {} or environment variable {}",
                    display_name, ENV_BMI_MODULE
                ))
            })?;

        let module = match lookup(ENV_BMI_PACKAGE) {
            Some(package) if !package.is_empty() => module
                .strip_prefix(&format!("{}.", package))
                .map(str::to_string)
                .unwrap_or(module),
            _ => module,
        };

        Ok(ModelName { module, class })
    }
}

/// Build the model registered under `name`.
pub fn build_model(name: &ModelName, version: BmiVersion) -> Result<BoxedBmi, BmiError> {
    let model: BoxedBmi = match (name.module.as_str(), name.class.as_str(), version) {
        ("heat", "BmiHeat", BmiVersion::V2) => Box::new(BmiHeat::default()),
        ("heat", "BmiHeat" | "LegacyBmiHeat", BmiVersion::V0_2) => {
            Box::new(LegacyBmiAdapter::new(LegacyBmiHeat::default()))
        }
        (module, class, _) => {
            return Err(BmiError::InvalidArgument(format!(
                "Unknown bmi implementation {}.{} for BMI version {:?}",
                module, class, version
            )))
        }
    };
    event!(Level::INFO, module = %name.module, class = %name.class, ?version, "built model");
    Ok(model)
}

/// Resolve `name` against the process environment and build the model.
pub fn build(name: Option<&str>, version: BmiVersion) -> Result<BoxedBmi, BmiError> {
    let name = ModelName::resolve(name, |key| std::env::var(key).ok())?;
    build_model(&name, version)
}

//! This crate relays the Basic Model Interface (BMI) across process and machine boundaries.
//! A numerical model implementing [bmi::Bmi] is served over HTTP by the `run-bmi-server`
//! binary, and [client::BmiClient] implements the same trait by forwarding every call to such a
//! server. Launchers in [launcher] start the server in a Docker, Apptainer or Singularity
//! container, or as a subprocess, and stop it again when the client is dropped.
//!
//! Metadata travels as JSON, variable values as raw little-endian arrays. Arrays larger than
//! the maximum message size are transferred in chunks.
//!
//! The relay is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of JSON request and response data.
//! * [ndarray] provides [NumPy](https://numpy.org)-like n-dimensional arrays used to reshape
//!   variables to their grids.

pub mod app;
pub mod app_state;
pub mod array;
pub mod bmi;
pub mod cli;
pub mod client;
pub mod error;
pub mod heat;
pub mod launcher;
pub mod legacy;
pub mod memoized;
pub mod metrics;
pub mod models;
pub mod optional_dest;
pub mod registry;
pub mod reserve;
pub mod server;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod types;
pub mod validated_json;

use crate::bmi::{Bmi, BmiResult};
use crate::error::{BmiError, ErrorResponse};
use crate::metrics::MODEL_CALLS;

use std::sync::{Arc, Mutex};

use tracing::{event, span, Level};

/// Shared application state passed to each BMI request handler.
pub struct AppState {
    /// The served model.
    ///
    /// Calls are serialised, a model only ever sees one call at a time.
    model: Arc<Mutex<Box<dyn Bmi + Send>>>,

    /// Whether error responses carry debugging detail.
    pub debug: bool,
}

impl AppState {
    /// Create and return an [AppState].
    pub fn new(model: Box<dyn Bmi + Send>, debug: bool) -> Self {
        Self {
            model: Arc::new(Mutex::new(model)),
            debug,
        }
    }

    /// Run a single call against the model on the blocking thread pool.
    ///
    /// Errors, including panics inside the model, are converted into error responses.
    ///
    /// # Arguments
    ///
    /// * `method`: Name of the BMI method, used for logging and metrics
    /// * `call`: Closure performing the call
    pub async fn call<T, F>(&self, method: &'static str, call: F) -> Result<T, ErrorResponse>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn Bmi) -> BmiResult<T> + Send + 'static,
    {
        MODEL_CALLS.with_label_values(&[method]).inc();
        event!(Level::DEBUG, method, "calling model");
        let model = Arc::clone(&self.model);
        let result = tokio::task::spawn_blocking(move || {
            let mut model = model.lock().map_err(|_| BmiError::Poisoned)?;
            call(model.as_mut())
        })
        .await
        .unwrap_or_else(|err| Err(BmiError::Panic(err.to_string())));
        // Errors are logged while building the response, within the span of the method.
        result.map_err(|err| {
            span!(Level::ERROR, "model_call", method)
                .in_scope(|| ErrorResponse::from_error(err, self.debug))
        })
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;

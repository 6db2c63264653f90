//! Routes and handlers exposing a [Bmi] model over HTTP.
//!
//! Every BMI method is served at `POST /v1/<method>`. Scalars, names and grid arrays travel as
//! JSON. Variable values travel as little endian octet streams, with their wire data type in
//! the `x-bmi-dtype` header and any other arguments in the query string.

use crate::app_state::SharedAppState;
use crate::array;
use crate::bmi::{Bmi, BmiResult};
use crate::error::{BmiError, ErrorResponse};
use crate::metrics;
use crate::models::{
    self, ArrayResponse, EmptyResponse, NamesResponse, ScalarResponse, ValuesResponse,
};
use crate::reserve;
use crate::types::ValueType;
use crate::validated_json::{ValidatedJson, ValidatedQuery};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower::Layer;
use tower::ServiceBuilder;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Response header carrying the wire data type of variable values.
pub static HEADER_DTYPE: header::HeaderName = header::HeaderName::from_static("x-bmi-dtype");

/// The BMI service, with trailing slashes removed from request paths.
pub type Service = NormalizePath<Router>;

impl IntoResponse for ValuesResponse {
    fn into_response(self) -> Response {
        (
            [
                (
                    &header::CONTENT_TYPE,
                    mime::APPLICATION_OCTET_STREAM.to_string(),
                ),
                (&HEADER_DTYPE, self.dtype.to_string()),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Returns a [Router] serving `state`'s model.
///
/// # Arguments
///
/// * `state`: Shared state holding the model
/// * `max_message_size`: Maximum accepted request body size in bytes
pub fn router(state: SharedAppState, max_message_size: usize) -> Router {
    fn v1() -> Router<SharedAppState> {
        Router::new()
            .route("/initialize", post(initialize))
            .route("/update", post(update))
            .route("/update_until", post(update_until))
            .route("/finalize", post(finalize))
            .route("/get_component_name", post(get_component_name))
            .route("/get_input_item_count", post(get_input_item_count))
            .route("/get_output_item_count", post(get_output_item_count))
            .route("/get_input_var_names", post(get_input_var_names))
            .route("/get_output_var_names", post(get_output_var_names))
            .route("/get_var_grid", post(get_var_grid))
            .route("/get_var_type", post(get_var_type))
            .route("/get_var_units", post(get_var_units))
            .route("/get_var_itemsize", post(get_var_itemsize))
            .route("/get_var_nbytes", post(get_var_nbytes))
            .route("/get_var_location", post(get_var_location))
            .route("/get_current_time", post(get_current_time))
            .route("/get_start_time", post(get_start_time))
            .route("/get_end_time", post(get_end_time))
            .route("/get_time_units", post(get_time_units))
            .route("/get_time_step", post(get_time_step))
            .route("/get_value", post(get_value))
            .route("/get_value_at_indices", post(get_value_at_indices))
            .route("/set_value", post(set_value))
            .route("/set_value_at_indices", post(set_value_at_indices))
            .route("/get_grid_rank", post(get_grid_rank))
            .route("/get_grid_size", post(get_grid_size))
            .route("/get_grid_type", post(get_grid_type))
            .route("/get_grid_shape", post(get_grid_shape))
            .route("/get_grid_spacing", post(get_grid_spacing))
            .route("/get_grid_origin", post(get_grid_origin))
            .route("/get_grid_x", post(get_grid_x))
            .route("/get_grid_y", post(get_grid_y))
            .route("/get_grid_z", post(get_grid_z))
            .route("/get_grid_node_count", post(get_grid_node_count))
            .route("/get_grid_edge_count", post(get_grid_edge_count))
            .route("/get_grid_face_count", post(get_grid_face_count))
            .route("/get_grid_edge_nodes", post(get_grid_edge_nodes))
            .route("/get_grid_face_edges", post(get_grid_face_edges))
            .route("/get_grid_face_nodes", post(get_grid_face_nodes))
            .route("/get_grid_nodes_per_face", post(get_grid_nodes_per_face))
    }

    Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/v1", v1())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .on_request(metrics::request_counter)
                        .on_response(metrics::record_response_metrics),
                )
                .layer(DefaultBodyLimit::max(max_message_size)),
        )
        .with_state(state)
}

/// Returns a [Service] serving `state`'s model.
pub fn service(state: SharedAppState, max_message_size: usize) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, max_message_size))
}

type JsonResult<T> = Result<Json<T>, ErrorResponse>;

async fn empty<F>(state: &SharedAppState, method: &'static str, call: F) -> JsonResult<EmptyResponse>
where
    F: FnOnce(&mut dyn Bmi) -> BmiResult<()> + Send + 'static,
{
    state.call(method, call).await?;
    Ok(Json(EmptyResponse {}))
}

async fn scalar<T, F>(
    state: &SharedAppState,
    method: &'static str,
    call: F,
) -> JsonResult<ScalarResponse<T>>
where
    T: Send + 'static,
    F: FnOnce(&mut dyn Bmi) -> BmiResult<T> + Send + 'static,
{
    let value = state.call(method, call).await?;
    Ok(Json(ScalarResponse { value }))
}

async fn names<F>(state: &SharedAppState, method: &'static str, call: F) -> JsonResult<NamesResponse>
where
    F: FnOnce(&mut dyn Bmi) -> BmiResult<Vec<String>> + Send + 'static,
{
    let names = state.call(method, call).await?;
    Ok(Json(NamesResponse { names }))
}

async fn grid_array<T, F>(
    state: &SharedAppState,
    method: &'static str,
    call: F,
) -> JsonResult<ArrayResponse<T>>
where
    T: Send + 'static,
    F: FnOnce(&mut dyn Bmi) -> BmiResult<Vec<T>> + Send + 'static,
{
    let values = state.call(method, call).await?;
    Ok(Json(ArrayResponse { values }))
}

async fn initialize(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::InitializeRequest>,
) -> JsonResult<EmptyResponse> {
    empty(&state, "initialize", move |model| {
        model.initialize(request.config_file.as_deref())
    })
    .await
}

async fn update(State(state): State<SharedAppState>) -> JsonResult<EmptyResponse> {
    empty(&state, "update", |model| model.update()).await
}

async fn update_until(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::UpdateUntilRequest>,
) -> JsonResult<EmptyResponse> {
    empty(&state, "update_until", move |model| {
        model.update_until(request.time)
    })
    .await
}

async fn finalize(State(state): State<SharedAppState>) -> JsonResult<EmptyResponse> {
    empty(&state, "finalize", |model| model.finalize()).await
}

async fn get_component_name(
    State(state): State<SharedAppState>,
) -> JsonResult<ScalarResponse<String>> {
    scalar(&state, "get_component_name", |model| {
        model.get_component_name()
    })
    .await
}

async fn get_input_item_count(
    State(state): State<SharedAppState>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_input_item_count", |model| {
        model.get_input_item_count()
    })
    .await
}

async fn get_output_item_count(
    State(state): State<SharedAppState>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_output_item_count", |model| {
        model.get_output_item_count()
    })
    .await
}

async fn get_input_var_names(State(state): State<SharedAppState>) -> JsonResult<NamesResponse> {
    names(&state, "get_input_var_names", |model| {
        model.get_input_var_names()
    })
    .await
}

async fn get_output_var_names(State(state): State<SharedAppState>) -> JsonResult<NamesResponse> {
    names(&state, "get_output_var_names", |model| {
        model.get_output_var_names()
    })
    .await
}

async fn get_var_grid(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::VarRequest>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_var_grid", move |model| {
        model.get_var_grid(&request.name)
    })
    .await
}

async fn get_var_type(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::VarRequest>,
) -> JsonResult<ScalarResponse<String>> {
    scalar(&state, "get_var_type", move |model| {
        model.get_var_type(&request.name)
    })
    .await
}

async fn get_var_units(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::VarRequest>,
) -> JsonResult<ScalarResponse<String>> {
    scalar(&state, "get_var_units", move |model| {
        model.get_var_units(&request.name)
    })
    .await
}

async fn get_var_itemsize(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::VarRequest>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_var_itemsize", move |model| {
        model.get_var_itemsize(&request.name)
    })
    .await
}

async fn get_var_nbytes(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::VarRequest>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_var_nbytes", move |model| {
        model.get_var_nbytes(&request.name)
    })
    .await
}

async fn get_var_location(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::VarRequest>,
) -> JsonResult<ScalarResponse<String>> {
    scalar(&state, "get_var_location", move |model| {
        model.get_var_location(&request.name)
    })
    .await
}

async fn get_current_time(State(state): State<SharedAppState>) -> JsonResult<ScalarResponse<f64>> {
    scalar(&state, "get_current_time", |model| model.get_current_time()).await
}

async fn get_start_time(State(state): State<SharedAppState>) -> JsonResult<ScalarResponse<f64>> {
    scalar(&state, "get_start_time", |model| model.get_start_time()).await
}

async fn get_end_time(State(state): State<SharedAppState>) -> JsonResult<ScalarResponse<f64>> {
    scalar(&state, "get_end_time", |model| model.get_end_time()).await
}

async fn get_time_units(State(state): State<SharedAppState>) -> JsonResult<ScalarResponse<String>> {
    scalar(&state, "get_time_units", |model| model.get_time_units()).await
}

async fn get_time_step(State(state): State<SharedAppState>) -> JsonResult<ScalarResponse<f64>> {
    scalar(&state, "get_time_step", |model| model.get_time_step()).await
}

async fn get_value(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::VarRequest>,
) -> Result<ValuesResponse, ErrorResponse> {
    let (dtype, body) = state
        .call("get_value", move |model| {
            let mut values = reserve::reserve_values(&*model, &request.name)?;
            model.get_value(&request.name, values.as_mut())?;
            Ok(array::encode_values(values.as_ref()))
        })
        .await?;
    Ok(ValuesResponse::new(body, dtype))
}

async fn get_value_at_indices(
    State(state): State<SharedAppState>,
    ValidatedQuery(query): ValidatedQuery<models::IndicesQuery>,
    body: Bytes,
) -> Result<ValuesResponse, ErrorResponse> {
    let (dtype, body) = state
        .call("get_value_at_indices", move |model| {
            let indices = array::decode_indices(&body)?;
            let mut values = reserve::reserve_values_at_indices(&*model, &query.name, &indices)?;
            model.get_value_at_indices(&query.name, values.as_mut(), &indices)?;
            Ok(array::encode_values(values.as_ref()))
        })
        .await?;
    Ok(ValuesResponse::new(body, dtype))
}

async fn set_value(
    State(state): State<SharedAppState>,
    ValidatedQuery(query): ValidatedQuery<models::SetValueQuery>,
    body: Bytes,
) -> JsonResult<EmptyResponse> {
    empty(&state, "set_value", move |model| {
        let value_type = ValueType::from_type_name(&model.get_var_type(&query.name)?)?;
        let values = array::decode_to_values(query.dtype, &body, value_type)?;
        model.set_value(&query.name, values.as_ref())
    })
    .await
}

async fn set_value_at_indices(
    State(state): State<SharedAppState>,
    ValidatedQuery(query): ValidatedQuery<models::SetValueAtIndicesQuery>,
    body: Bytes,
) -> JsonResult<EmptyResponse> {
    empty(&state, "set_value_at_indices", move |model| {
        let (indices, data) = array::split_indexed_values(&body, query.count)?;
        let value_type = ValueType::from_type_name(&model.get_var_type(&query.name)?)?;
        let values = array::decode_to_values(query.dtype, data, value_type)?;
        if values.len() != indices.len() {
            return Err(BmiError::BufferSize {
                expected: indices.len(),
                actual: values.len(),
            });
        }
        model.set_value_at_indices(&query.name, &indices, values.as_ref())
    })
    .await
}

async fn get_grid_rank(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_grid_rank", move |model| {
        model.get_grid_rank(request.grid)
    })
    .await
}

async fn get_grid_size(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_grid_size", move |model| {
        model.get_grid_size(request.grid)
    })
    .await
}

async fn get_grid_type(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ScalarResponse<String>> {
    scalar(&state, "get_grid_type", move |model| {
        model.get_grid_type(request.grid)
    })
    .await
}

async fn get_grid_shape(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<i32>> {
    grid_array(&state, "get_grid_shape", move |model| {
        let mut shape = reserve::reserve_grid_shape(&*model, request.grid)?;
        model.get_grid_shape(request.grid, &mut shape)?;
        Ok(shape)
    })
    .await
}

async fn get_grid_spacing(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<f64>> {
    grid_array(&state, "get_grid_spacing", move |model| {
        let mut spacing = reserve::reserve_grid_padding(&*model, request.grid)?;
        model.get_grid_spacing(request.grid, &mut spacing)?;
        Ok(spacing)
    })
    .await
}

async fn get_grid_origin(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<f64>> {
    grid_array(&state, "get_grid_origin", move |model| {
        let mut origin = reserve::reserve_grid_padding(&*model, request.grid)?;
        model.get_grid_origin(request.grid, &mut origin)?;
        Ok(origin)
    })
    .await
}

async fn get_grid_x(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<f64>> {
    grid_array(&state, "get_grid_x", move |model| {
        let mut x = reserve::reserve_grid_nodes(&*model, request.grid, 0)?;
        model.get_grid_x(request.grid, &mut x)?;
        Ok(x)
    })
    .await
}

async fn get_grid_y(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<f64>> {
    grid_array(&state, "get_grid_y", move |model| {
        let mut y = reserve::reserve_grid_nodes(&*model, request.grid, 1)?;
        model.get_grid_y(request.grid, &mut y)?;
        Ok(y)
    })
    .await
}

async fn get_grid_z(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<f64>> {
    grid_array(&state, "get_grid_z", move |model| {
        let mut z = reserve::reserve_grid_nodes(&*model, request.grid, 2)?;
        model.get_grid_z(request.grid, &mut z)?;
        Ok(z)
    })
    .await
}

async fn get_grid_node_count(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_grid_node_count", move |model| {
        model.get_grid_node_count(request.grid)
    })
    .await
}

async fn get_grid_edge_count(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_grid_edge_count", move |model| {
        model.get_grid_edge_count(request.grid)
    })
    .await
}

async fn get_grid_face_count(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ScalarResponse<i32>> {
    scalar(&state, "get_grid_face_count", move |model| {
        model.get_grid_face_count(request.grid)
    })
    .await
}

async fn get_grid_edge_nodes(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<i32>> {
    grid_array(&state, "get_grid_edge_nodes", move |model| {
        let mut edge_nodes = reserve::reserve_grid_edge_nodes(&*model, request.grid)?;
        model.get_grid_edge_nodes(request.grid, &mut edge_nodes)?;
        Ok(edge_nodes)
    })
    .await
}

async fn get_grid_face_edges(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<i32>> {
    grid_array(&state, "get_grid_face_edges", move |model| {
        let mut face_edges = reserve::reserve_grid_face_edges(&*model, request.grid)?;
        model.get_grid_face_edges(request.grid, &mut face_edges)?;
        Ok(face_edges)
    })
    .await
}

async fn get_grid_face_nodes(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<i32>> {
    grid_array(&state, "get_grid_face_nodes", move |model| {
        let mut face_nodes = reserve::reserve_grid_face_nodes(&*model, request.grid)?;
        model.get_grid_face_nodes(request.grid, &mut face_nodes)?;
        Ok(face_nodes)
    })
    .await
}

async fn get_grid_nodes_per_face(
    State(state): State<SharedAppState>,
    ValidatedJson(request): ValidatedJson<models::GridRequest>,
) -> JsonResult<ArrayResponse<i32>> {
    grid_array(&state, "get_grid_nodes_per_face", move |model| {
        let mut nodes_per_face = reserve::reserve_grid_nodes_per_face(&*model, request.grid)?;
        model.get_grid_nodes_per_face(request.grid, &mut nodes_per_face)?;
        Ok(nodes_per_face)
    })
    .await
}

//! Client side of the relay.
//!
//! [AsyncBmiClient] forwards BMI calls to a BMI server from async code. [BmiClient] implements
//! [Bmi] on top of it: calls block the caller while the client's own Tokio runtime drives the
//! HTTP connections. A [BmiClient] must not be used from within a Tokio runtime, use an
//! [AsyncBmiClient] there.
//!
//! Variable values larger than the maximum message size are moved in windows of consecutive
//! indices, using the `*_at_indices` methods. If one window fails the whole call fails.

use crate::app::HEADER_DTYPE;
use crate::array::{self, INDEX_SIZE};
use crate::bmi::{Bmi, BmiResult};
use crate::error::{BmiError, ErrorResponse};
use crate::models::{
    ArrayResponse, DType, EmptyResponse, GridRequest, InitializeRequest, NamesResponse,
    ScalarResponse, UpdateUntilRequest, VarRequest, MAX_MESSAGE_SIZE,
};
use crate::types::{ValuesMut, ValuesRef};

use std::net::TcpListener;
use std::time::Duration;

use axum::http::{header, Method, Request, StatusCode, Uri};
use bytes::{Bytes, BytesMut};
use hyper::client::HttpConnector;
use hyper::{Body, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Runtime;
use tracing::{event, Level};
use url::Url;

/// Client settings
#[derive(Clone, Debug)]
pub struct ClientSettings {
    /// Maximum size in bytes of a single request or response payload.
    ///
    /// Must not exceed the limit of the server.
    pub max_message_size: usize,

    /// Maximum time to wait for each response, if any.
    pub timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            max_message_size: MAX_MESSAGE_SIZE,
            timeout: None,
        }
    }
}

/// Calls a remote model over HTTP from async code.
///
/// Offers the methods of [Bmi] as async functions taking `&self`. Requests are driven by the
/// Tokio runtime the futures run on.
#[derive(Clone, Debug)]
pub struct AsyncBmiClient {
    client: Client<HttpConnector>,
    base_url: Url,
    settings: ClientSettings,
}

impl AsyncBmiClient {
    /// Create a client for the server at `url`, for example `http://localhost:50051`.
    pub fn new(url: &str, settings: ClientSettings) -> BmiResult<Self> {
        let mut base_url = Url::parse(url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(AsyncBmiClient {
            client: Client::new(),
            base_url,
            settings,
        })
    }

    /// Create a client with default settings for the server listening at `host` and `port`.
    pub fn connect(host: &str, port: u16) -> BmiResult<Self> {
        Self::connect_with(host, port, ClientSettings::default())
    }

    /// Create a client for the server listening at `host` and `port`.
    pub fn connect_with(host: &str, port: u16, settings: ClientSettings) -> BmiResult<Self> {
        Self::new(&format!("http://{}:{}", host, port), settings)
    }

    /// Returns the client settings.
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn uri(&self, method: &str, query: &[(&str, String)]) -> BmiResult<Uri> {
        let mut url = self.base_url.join(&format!("v1/{}", method))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.as_str().parse::<Uri>()?)
    }

    async fn send(&self, request: Request<Body>) -> BmiResult<(header::HeaderMap, Bytes)> {
        let response = self.client.request(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = hyper::body::to_bytes(response.into_body()).await?;
        if !status.is_success() {
            return Err(remote_error(status, &body));
        }
        Ok((headers, body))
    }

    /// Send a request and wait for the response.
    async fn execute(&self, request: Request<Body>) -> BmiResult<(header::HeaderMap, Bytes)> {
        event!(Level::DEBUG, uri = %request.uri(), "sending BMI request");
        match self.settings.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.send(request))
                .await
                .map_err(|_| BmiError::Timeout(timeout))?,
            None => self.send(request).await,
        }
    }

    fn json_request<Req: Serialize>(
        &self,
        method: &str,
        request: &Req,
    ) -> BmiResult<Request<Body>> {
        Ok(Request::builder()
            .method(Method::POST)
            .uri(self.uri(method, &[])?)
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_vec(request)?))?)
    }

    async fn call_json<Req, Resp>(&self, method: &str, request: &Req) -> BmiResult<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let request = self.json_request(method, request)?;
        let (_, body) = self.execute(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn call_empty<Req: Serialize>(&self, method: &str, request: &Req) -> BmiResult<()> {
        let _: EmptyResponse = self.call_json(method, request).await?;
        Ok(())
    }

    async fn call_scalar<Req, T>(&self, method: &str, request: &Req) -> BmiResult<T>
    where
        Req: Serialize,
        T: DeserializeOwned,
    {
        let response: ScalarResponse<T> = self.call_json(method, request).await?;
        Ok(response.value)
    }

    async fn call_names(&self, method: &str) -> BmiResult<Vec<String>> {
        let response: NamesResponse = self.call_json(method, &EmptyResponse {}).await?;
        Ok(response.names)
    }

    async fn call_grid_array<T>(&self, method: &str, grid: i32, dest: &mut [T]) -> BmiResult<()>
    where
        T: DeserializeOwned + Copy,
    {
        let response: ArrayResponse<T> = self.call_json(method, &GridRequest { grid }).await?;
        if response.values.len() != dest.len() {
            return Err(BmiError::BufferSize {
                expected: dest.len(),
                actual: response.values.len(),
            });
        }
        dest.copy_from_slice(&response.values);
        Ok(())
    }

    /// Send an octet stream request and return the encoded values of the response.
    async fn call_values(
        &self,
        method: &str,
        query: &[(&str, String)],
        body: Bytes,
    ) -> BmiResult<(DType, Bytes)> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.uri(method, query)?)
            .header(header::CONTENT_TYPE, mime::APPLICATION_OCTET_STREAM.as_ref())
            .body(Body::from(body))?;
        let (headers, body) = self.execute(request).await?;
        Ok((response_dtype(&headers)?, body))
    }

    async fn fetch_at_indices(
        &self,
        name: &str,
        indices: &[i32],
        dest: ValuesMut<'_>,
    ) -> BmiResult<()> {
        let (dtype, body) = self
            .call_values(
                "get_value_at_indices",
                &[("name", name.to_string())],
                array::encode_indices(indices),
            )
            .await?;
        array::decode_values(dtype, &body, dest)
    }

    async fn store_at_indices(
        &self,
        name: &str,
        indices: &[i32],
        src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        let (dtype, values) = array::encode_values(src);
        let mut body = BytesMut::with_capacity(indices.len() * INDEX_SIZE + values.len());
        body.extend_from_slice(&array::encode_indices(indices));
        body.extend_from_slice(&values);
        self.call_values(
            "set_value_at_indices",
            &[
                ("name", name.to_string()),
                ("dtype", dtype.to_string()),
                ("count", indices.len().to_string()),
            ],
            body.freeze(),
        )
        .await?;
        Ok(())
    }

    /// Number of items per window when reading values.
    fn get_chunk_len(&self, dtype: DType) -> usize {
        // Requests carry one index per item, responses one value.
        array::chunk_len(
            self.settings.max_message_size,
            std::cmp::max(dtype.size_of(), INDEX_SIZE),
        )
    }

    /// Number of items per window when writing values.
    fn set_chunk_len(&self, dtype: DType) -> usize {
        array::chunk_len(
            self.settings.max_message_size,
            dtype.size_of() + INDEX_SIZE,
        )
    }

    pub async fn initialize(&self, config_file: Option<&str>) -> BmiResult<()> {
        let request = InitializeRequest {
            config_file: config_file.map(str::to_string),
        };
        self.call_empty("initialize", &request).await
    }

    pub async fn update(&self) -> BmiResult<()> {
        self.call_empty("update", &EmptyResponse {}).await
    }

    pub async fn update_until(&self, time: f64) -> BmiResult<()> {
        self.call_empty("update_until", &UpdateUntilRequest { time })
            .await
    }

    pub async fn finalize(&self) -> BmiResult<()> {
        self.call_empty("finalize", &EmptyResponse {}).await
    }

    pub async fn get_component_name(&self) -> BmiResult<String> {
        self.call_scalar("get_component_name", &EmptyResponse {})
            .await
    }

    pub async fn get_input_item_count(&self) -> BmiResult<i32> {
        self.call_scalar("get_input_item_count", &EmptyResponse {})
            .await
    }

    pub async fn get_output_item_count(&self) -> BmiResult<i32> {
        self.call_scalar("get_output_item_count", &EmptyResponse {})
            .await
    }

    pub async fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        self.call_names("get_input_var_names").await
    }

    pub async fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        self.call_names("get_output_var_names").await
    }

    pub async fn get_var_grid(&self, name: &str) -> BmiResult<i32> {
        self.call_scalar("get_var_grid", &VarRequest { name: name.into() })
            .await
    }

    pub async fn get_var_type(&self, name: &str) -> BmiResult<String> {
        self.call_scalar("get_var_type", &VarRequest { name: name.into() })
            .await
    }

    pub async fn get_var_units(&self, name: &str) -> BmiResult<String> {
        self.call_scalar("get_var_units", &VarRequest { name: name.into() })
            .await
    }

    pub async fn get_var_itemsize(&self, name: &str) -> BmiResult<i32> {
        self.call_scalar("get_var_itemsize", &VarRequest { name: name.into() })
            .await
    }

    pub async fn get_var_nbytes(&self, name: &str) -> BmiResult<i32> {
        self.call_scalar("get_var_nbytes", &VarRequest { name: name.into() })
            .await
    }

    pub async fn get_var_location(&self, name: &str) -> BmiResult<String> {
        self.call_scalar("get_var_location", &VarRequest { name: name.into() })
            .await
    }

    pub async fn get_current_time(&self) -> BmiResult<f64> {
        self.call_scalar("get_current_time", &EmptyResponse {})
            .await
    }

    pub async fn get_start_time(&self) -> BmiResult<f64> {
        self.call_scalar("get_start_time", &EmptyResponse {}).await
    }

    pub async fn get_end_time(&self) -> BmiResult<f64> {
        self.call_scalar("get_end_time", &EmptyResponse {}).await
    }

    pub async fn get_time_units(&self) -> BmiResult<String> {
        self.call_scalar("get_time_units", &EmptyResponse {}).await
    }

    pub async fn get_time_step(&self) -> BmiResult<f64> {
        self.call_scalar("get_time_step", &EmptyResponse {}).await
    }

    /// Copy all values of a variable into `dest`, in windows if they exceed the message size.
    pub async fn get_value(&self, name: &str, mut dest: ValuesMut<'_>) -> BmiResult<()> {
        let dtype = dest.value_type().wire_dtype();
        if dest.len() * dtype.size_of() <= self.settings.max_message_size {
            let request = self.json_request("get_value", &VarRequest { name: name.into() })?;
            let (headers, body) = self.execute(request).await?;
            return array::decode_values(response_dtype(&headers)?, &body, dest);
        }
        for range in array::chunk_ranges(dest.len(), self.get_chunk_len(dtype)) {
            let indices = array::range_indices(range.clone())?;
            self.fetch_at_indices(name, &indices, dest.slice_mut(range))
                .await?;
        }
        Ok(())
    }

    pub async fn get_value_at_indices(
        &self,
        name: &str,
        mut dest: ValuesMut<'_>,
        indices: &[i32],
    ) -> BmiResult<()> {
        if dest.len() != indices.len() {
            return Err(BmiError::BufferSize {
                expected: dest.len(),
                actual: indices.len(),
            });
        }
        let dtype = dest.value_type().wire_dtype();
        for range in array::chunk_ranges(indices.len(), self.get_chunk_len(dtype)) {
            self.fetch_at_indices(name, &indices[range.clone()], dest.slice_mut(range))
                .await?;
        }
        Ok(())
    }

    pub async fn set_value(&self, name: &str, src: ValuesRef<'_>) -> BmiResult<()> {
        let dtype = src.value_type().wire_dtype();
        if src.len() * dtype.size_of() <= self.settings.max_message_size {
            let (dtype, body) = array::encode_values(src);
            self.call_values(
                "set_value",
                &[("name", name.to_string()), ("dtype", dtype.to_string())],
                body,
            )
            .await?;
            return Ok(());
        }
        for range in array::chunk_ranges(src.len(), self.set_chunk_len(dtype)) {
            let indices = array::range_indices(range.clone())?;
            self.store_at_indices(name, &indices, src.slice(range))
                .await?;
        }
        Ok(())
    }

    pub async fn set_value_at_indices(
        &self,
        name: &str,
        indices: &[i32],
        src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        if src.len() != indices.len() {
            return Err(BmiError::BufferSize {
                expected: indices.len(),
                actual: src.len(),
            });
        }
        let dtype = src.value_type().wire_dtype();
        for range in array::chunk_ranges(indices.len(), self.set_chunk_len(dtype)) {
            self.store_at_indices(name, &indices[range.clone()], src.slice(range))
                .await?;
        }
        Ok(())
    }

    pub async fn get_grid_rank(&self, grid: i32) -> BmiResult<i32> {
        self.call_scalar("get_grid_rank", &GridRequest { grid }).await
    }

    pub async fn get_grid_size(&self, grid: i32) -> BmiResult<i32> {
        self.call_scalar("get_grid_size", &GridRequest { grid }).await
    }

    pub async fn get_grid_type(&self, grid: i32) -> BmiResult<String> {
        self.call_scalar("get_grid_type", &GridRequest { grid }).await
    }

    pub async fn get_grid_shape(&self, grid: i32, shape: &mut [i32]) -> BmiResult<()> {
        self.call_grid_array("get_grid_shape", grid, shape).await
    }

    pub async fn get_grid_spacing(&self, grid: i32, spacing: &mut [f64]) -> BmiResult<()> {
        self.call_grid_array("get_grid_spacing", grid, spacing)
            .await
    }

    pub async fn get_grid_origin(&self, grid: i32, origin: &mut [f64]) -> BmiResult<()> {
        self.call_grid_array("get_grid_origin", grid, origin).await
    }

    pub async fn get_grid_x(&self, grid: i32, x: &mut [f64]) -> BmiResult<()> {
        self.call_grid_array("get_grid_x", grid, x).await
    }

    pub async fn get_grid_y(&self, grid: i32, y: &mut [f64]) -> BmiResult<()> {
        self.call_grid_array("get_grid_y", grid, y).await
    }

    pub async fn get_grid_z(&self, grid: i32, z: &mut [f64]) -> BmiResult<()> {
        self.call_grid_array("get_grid_z", grid, z).await
    }

    pub async fn get_grid_node_count(&self, grid: i32) -> BmiResult<i32> {
        self.call_scalar("get_grid_node_count", &GridRequest { grid })
            .await
    }

    pub async fn get_grid_edge_count(&self, grid: i32) -> BmiResult<i32> {
        self.call_scalar("get_grid_edge_count", &GridRequest { grid })
            .await
    }

    pub async fn get_grid_face_count(&self, grid: i32) -> BmiResult<i32> {
        self.call_scalar("get_grid_face_count", &GridRequest { grid })
            .await
    }

    pub async fn get_grid_edge_nodes(&self, grid: i32, edge_nodes: &mut [i32]) -> BmiResult<()> {
        self.call_grid_array("get_grid_edge_nodes", grid, edge_nodes)
            .await
    }

    pub async fn get_grid_face_edges(&self, grid: i32, face_edges: &mut [i32]) -> BmiResult<()> {
        self.call_grid_array("get_grid_face_edges", grid, face_edges)
            .await
    }

    pub async fn get_grid_face_nodes(&self, grid: i32, face_nodes: &mut [i32]) -> BmiResult<()> {
        self.call_grid_array("get_grid_face_nodes", grid, face_nodes)
            .await
    }

    pub async fn get_grid_nodes_per_face(
        &self,
        grid: i32,
        nodes_per_face: &mut [i32],
    ) -> BmiResult<()> {
        self.call_grid_array("get_grid_nodes_per_face", grid, nodes_per_face)
            .await
    }
}

/// A [Bmi] implementation that calls a remote model over HTTP.
///
/// Each call blocks on an [AsyncBmiClient] future using the client's own runtime.
pub struct BmiClient {
    runtime: Runtime,
    inner: AsyncBmiClient,
}

impl BmiClient {
    /// Create a client for the server at `url`, for example `http://localhost:50051`.
    pub fn new(url: &str, settings: ClientSettings) -> BmiResult<Self> {
        Ok(BmiClient {
            runtime: Runtime::new()?,
            inner: AsyncBmiClient::new(url, settings)?,
        })
    }

    /// Create a client with default settings for the server listening at `host` and `port`.
    pub fn connect(host: &str, port: u16) -> BmiResult<Self> {
        Self::connect_with(host, port, ClientSettings::default())
    }

    /// Create a client for the server listening at `host` and `port`.
    pub fn connect_with(host: &str, port: u16, settings: ClientSettings) -> BmiResult<Self> {
        Self::new(&format!("http://{}:{}", host, port), settings)
    }

    /// Returns the client settings.
    pub fn settings(&self) -> &ClientSettings {
        self.inner.settings()
    }

    /// Returns the async client this client blocks on.
    pub fn as_async(&self) -> &AsyncBmiClient {
        &self.inner
    }
}

/// Returns the wire data type of a values response.
fn response_dtype(headers: &header::HeaderMap) -> BmiResult<DType> {
    let value = headers
        .get(&HEADER_DTYPE)
        .ok_or(BmiError::MissingHeader("x-bmi-dtype"))?;
    let dtype = String::from_utf8_lossy(value.as_bytes());
    dtype
        .parse::<DType>()
        .map_err(|_| BmiError::UnsupportedType(dtype.to_string()))
}

/// Convert an error response from the server into a [BmiError].
///
/// Responses with debugging detail become [BmiError::Remote], others [BmiError::Rpc].
fn remote_error(status: StatusCode, body: &[u8]) -> BmiError {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(response) => {
            let mut message = response.error.message;
            if let Some(caused_by) = response.error.caused_by {
                for cause in caused_by {
                    message = format!("{}: {}", message, cause);
                }
            }
            match response.error.debug_info {
                Some(debug_info) => BmiError::Remote {
                    message,
                    detail: debug_info.detail,
                    stack_trace: debug_info.stack_entries,
                },
                None => BmiError::Rpc { status, message },
            }
        }
        Err(_) => {
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                String::from_utf8_lossy(body).to_string()
            };
            BmiError::Rpc { status, message }
        }
    }
}

/// Returns a TCP port on `host` that is currently free.
///
/// The port is released before returning, so another process may take it first.
pub fn free_port(host: &str) -> std::io::Result<u16> {
    let listener = TcpListener::bind((host, 0))?;
    Ok(listener.local_addr()?.port())
}

impl Bmi for BmiClient {
    fn initialize(&mut self, config_file: Option<&str>) -> BmiResult<()> {
        self.runtime.block_on(self.inner.initialize(config_file))
    }

    fn update(&mut self) -> BmiResult<()> {
        self.runtime.block_on(self.inner.update())
    }

    fn update_until(&mut self, time: f64) -> BmiResult<()> {
        self.runtime.block_on(self.inner.update_until(time))
    }

    fn finalize(&mut self) -> BmiResult<()> {
        self.runtime.block_on(self.inner.finalize())
    }

    fn get_component_name(&self) -> BmiResult<String> {
        self.runtime.block_on(self.inner.get_component_name())
    }

    fn get_input_item_count(&self) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_input_item_count())
    }

    fn get_output_item_count(&self) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_output_item_count())
    }

    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        self.runtime.block_on(self.inner.get_input_var_names())
    }

    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        self.runtime.block_on(self.inner.get_output_var_names())
    }

    fn get_var_grid(&self, name: &str) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_var_grid(name))
    }

    fn get_var_type(&self, name: &str) -> BmiResult<String> {
        self.runtime.block_on(self.inner.get_var_type(name))
    }

    fn get_var_units(&self, name: &str) -> BmiResult<String> {
        self.runtime.block_on(self.inner.get_var_units(name))
    }

    fn get_var_itemsize(&self, name: &str) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_var_itemsize(name))
    }

    fn get_var_nbytes(&self, name: &str) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_var_nbytes(name))
    }

    fn get_var_location(&self, name: &str) -> BmiResult<String> {
        self.runtime.block_on(self.inner.get_var_location(name))
    }

    fn get_current_time(&self) -> BmiResult<f64> {
        self.runtime.block_on(self.inner.get_current_time())
    }

    fn get_start_time(&self) -> BmiResult<f64> {
        self.runtime.block_on(self.inner.get_start_time())
    }

    fn get_end_time(&self) -> BmiResult<f64> {
        self.runtime.block_on(self.inner.get_end_time())
    }

    fn get_time_units(&self) -> BmiResult<String> {
        self.runtime.block_on(self.inner.get_time_units())
    }

    fn get_time_step(&self) -> BmiResult<f64> {
        self.runtime.block_on(self.inner.get_time_step())
    }

    fn get_value(&self, name: &str, dest: ValuesMut<'_>) -> BmiResult<()> {
        self.runtime.block_on(self.inner.get_value(name, dest))
    }

    fn get_value_at_indices(
        &self,
        name: &str,
        dest: ValuesMut<'_>,
        indices: &[i32],
    ) -> BmiResult<()> {
        self.runtime
            .block_on(self.inner.get_value_at_indices(name, dest, indices))
    }

    fn set_value(&mut self, name: &str, src: ValuesRef<'_>) -> BmiResult<()> {
        self.runtime.block_on(self.inner.set_value(name, src))
    }

    fn set_value_at_indices(
        &mut self,
        name: &str,
        indices: &[i32],
        src: ValuesRef<'_>,
    ) -> BmiResult<()> {
        self.runtime
            .block_on(self.inner.set_value_at_indices(name, indices, src))
    }

    fn get_grid_rank(&self, grid: i32) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_grid_rank(grid))
    }

    fn get_grid_size(&self, grid: i32) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_grid_size(grid))
    }

    fn get_grid_type(&self, grid: i32) -> BmiResult<String> {
        self.runtime.block_on(self.inner.get_grid_type(grid))
    }

    fn get_grid_shape(&self, grid: i32, shape: &mut [i32]) -> BmiResult<()> {
        self.runtime.block_on(self.inner.get_grid_shape(grid, shape))
    }

    fn get_grid_spacing(&self, grid: i32, spacing: &mut [f64]) -> BmiResult<()> {
        self.runtime
            .block_on(self.inner.get_grid_spacing(grid, spacing))
    }

    fn get_grid_origin(&self, grid: i32, origin: &mut [f64]) -> BmiResult<()> {
        self.runtime.block_on(self.inner.get_grid_origin(grid, origin))
    }

    fn get_grid_x(&self, grid: i32, x: &mut [f64]) -> BmiResult<()> {
        self.runtime.block_on(self.inner.get_grid_x(grid, x))
    }

    fn get_grid_y(&self, grid: i32, y: &mut [f64]) -> BmiResult<()> {
        self.runtime.block_on(self.inner.get_grid_y(grid, y))
    }

    fn get_grid_z(&self, grid: i32, z: &mut [f64]) -> BmiResult<()> {
        self.runtime.block_on(self.inner.get_grid_z(grid, z))
    }

    fn get_grid_node_count(&self, grid: i32) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_grid_node_count(grid))
    }

    fn get_grid_edge_count(&self, grid: i32) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_grid_edge_count(grid))
    }

    fn get_grid_face_count(&self, grid: i32) -> BmiResult<i32> {
        self.runtime.block_on(self.inner.get_grid_face_count(grid))
    }

    fn get_grid_edge_nodes(&self, grid: i32, edge_nodes: &mut [i32]) -> BmiResult<()> {
        self.runtime
            .block_on(self.inner.get_grid_edge_nodes(grid, edge_nodes))
    }

    fn get_grid_face_edges(&self, grid: i32, face_edges: &mut [i32]) -> BmiResult<()> {
        self.runtime
            .block_on(self.inner.get_grid_face_edges(grid, face_edges))
    }

    fn get_grid_face_nodes(&self, grid: i32, face_nodes: &mut [i32]) -> BmiResult<()> {
        self.runtime
            .block_on(self.inner.get_grid_face_nodes(grid, face_nodes))
    }

    fn get_grid_nodes_per_face(&self, grid: i32, nodes_per_face: &mut [i32]) -> BmiResult<()> {
        self.runtime
            .block_on(self.inner.get_grid_nodes_per_face(grid, nodes_per_face))
    }
}

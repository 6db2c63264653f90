//! Axum extractors that deserialise and validate JSON bodies and query strings

use crate::error::BmiError;

use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Json, Query,
    },
    http::{request::Parts, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// An axum extractor based on the Json extractor that also performs validation using the validator
/// crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
    B: Send + 'static,
{
    type Rejection = BmiError;

    /// Extract a `ValidatedJson` from a `Request`.
    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string counterpart of [ValidatedJson].
///
/// Used by the value routes, whose body carries raw array data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BmiError;

    /// Extract a `ValidatedQuery` from the request URI.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err: QueryRejection| BmiError::from(err))?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::{SetValueQuery, VarRequest};

    use axum::{
        body::Body,
        http::{self, Request, StatusCode},
        response::Response,
        routing::post,
        Router,
    };
    use regex::Regex;
    use tower::ServiceExt; // for `oneshot`

    async fn var_handler(ValidatedJson(request): ValidatedJson<VarRequest>) -> String {
        format!("name: {}", request.name)
    }

    async fn set_value_handler(ValidatedQuery(query): ValidatedQuery<SetValueQuery>) -> String {
        format!("name: {} dtype: {}", query.name, query.dtype)
    }

    async fn oneshot(router: Router, uri: &str, content_type: &str, body: Body) -> Response {
        router
            .oneshot(
                Request::builder()
                    .method(http::Method::POST)
                    .uri(uri)
                    .header(http::header::CONTENT_TYPE, content_type)
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_request(body: &'static str) -> Response {
        let router = Router::new().route("/", post(var_handler));
        oneshot(router, "/", mime::APPLICATION_JSON.as_ref(), Body::from(body)).await
    }

    async fn query_request(query: &str) -> Response {
        let router = Router::new().route("/", post(set_value_handler));
        let uri = format!("/?{}", query);
        oneshot(
            router,
            &uri,
            mime::APPLICATION_OCTET_STREAM.as_ref(),
            Body::empty(),
        )
        .await
    }

    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    async fn assert_bad_request(response: Response, pattern: &str) {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        let re = Regex::new(r".*request data is not valid.*").unwrap();
        assert!(re.is_match(&body), "body: {body}");
        let re = Regex::new(pattern).unwrap();
        assert!(re.is_match(&body), "body: {body}");
    }

    #[tokio::test]
    async fn json_ok() {
        let response = json_request(r#"{"name": "plate_surface__temperature"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!("name: plate_surface__temperature", body_string(response).await);
    }

    #[tokio::test]
    async fn json_invalid() {
        let response = json_request("{\"").await;
        assert_bad_request(response, r"Failed to parse the request body as JSON").await;
    }

    #[tokio::test]
    async fn json_wrong_type() {
        let response = json_request(r#"{"name": 123}"#).await;
        assert_bad_request(response, r".*name: invalid type: integer `123`.*").await;
    }

    #[tokio::test]
    async fn json_unknown_field() {
        let response = json_request(r#"{"name": "a", "grid": 0}"#).await;
        assert_bad_request(response, r".*unknown field `grid`.*").await;
    }

    #[tokio::test]
    async fn json_empty_name() {
        let response = json_request(r#"{"name": ""}"#).await;
        assert_bad_request(response, r".*name: name must not be empty.*").await;
    }

    #[tokio::test]
    async fn query_ok() {
        let response = query_request("name=a+b&dtype=float32").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!("name: a b dtype: float32", body_string(response).await);
    }

    #[tokio::test]
    async fn query_missing_field() {
        let response = query_request("name=a").await;
        assert_bad_request(response, r".*missing field `dtype`.*").await;
    }

    #[tokio::test]
    async fn query_bad_dtype() {
        let response = query_request("name=a&dtype=complex128").await;
        assert_bad_request(response, r".*unknown variant `complex128`.*").await;
    }

    #[tokio::test]
    async fn query_empty_name() {
        let response = query_request("name=&dtype=int32").await;
        assert_bad_request(response, r".*name: name must not be empty.*").await;
    }
}

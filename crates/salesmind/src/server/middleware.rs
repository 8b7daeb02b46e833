//! Request context and middleware for the SalesMind API
//!
//! Every request gets a fresh id that is attached to its log lines and echoed
//! back in the `x-request-id` response header.

use axum::{
  extract::Request,
  http::{HeaderValue, Method, Uri},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request metadata injected into handlers as an extension
#[derive(Clone, Debug)]
pub struct RequestContext {
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri }
  }

  pub fn path(&self) -> &str {
    self.uri.path()
  }
}

/// Middleware to inject RequestContext into all requests
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
  let context = RequestContext::new(request.method().clone(), request.uri().clone());
  let start_time = Instant::now();

  tracing::debug!(request_id = %context.request_id, method = %context.method, path = context.path(), "request started");
  request.extensions_mut().insert(context.clone());

  let mut response = next.run(request).await;

  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  tracing::info!(
    request_id = %context.request_id,
    method = %context.method,
    path = context.path(),
    status = response.status().as_u16(),
    duration_ms,
    "request completed"
  );

  if let Ok(value) = HeaderValue::from_str(&context.request_id.to_string()) {
    response.headers_mut().insert(REQUEST_ID_HEADER, value);
  }
  response
}

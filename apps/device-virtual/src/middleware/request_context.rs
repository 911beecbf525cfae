//! 请求上下文中间件
//!
//! 为每个请求生成 request_id/trace_id，写入请求扩展、日志 span 与响应头。

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, debug, info_span};
use vdev_telemetry::new_request_ids;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");

pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    debug!(
        target: "vdev.api",
        request_id = %ids.request_id,
        status = response.status().as_u16(),
        "request_completed"
    );
    response
        .headers_mut()
        .insert(REQUEST_ID_HEADER, header_value(&ids.request_id));
    response
        .headers_mut()
        .insert(TRACE_ID_HEADER, header_value(&ids.trace_id));
    response
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static(""))
}

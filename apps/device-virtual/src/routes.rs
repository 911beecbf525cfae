//! 路由定义
//!
//! 所有路由同时挂在根路径和 `/api/v3` 前缀下：
//! - 通用接口：/ping, /version, /metrics
//! - 虚拟设备：/device/virtual/*

use super::AppState;
use super::handlers::*;
use crate::middleware::request_context;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/version", get(version))
        .route("/metrics", get(get_metrics))
        .route(
            "/device/virtual",
            get(list_virtual_devices).post(create_virtual_device),
        )
        .route(
            "/device/virtual/name/:name",
            get(get_virtual_device_by_name),
        )
        .route(
            "/device/virtual/:id",
            get(get_virtual_device)
                .put(update_virtual_device)
                .delete(delete_virtual_device),
        )
        .route("/device/virtual/:id/start", post(start_virtual_device))
        .route("/device/virtual/:id/stop", post(stop_virtual_device))
}

/// 组装完整应用：根路径 + `/api/v3`，并注入请求追踪中间件。
pub fn build_app(state: AppState) -> Router {
    let api = create_api_router();
    Router::new()
        .merge(api.clone())
        .nest("/api/v3", api)
        .with_state(state)
        .layer(middleware::from_fn(request_context))
}

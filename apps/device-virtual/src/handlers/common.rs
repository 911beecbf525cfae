//! 通用接口
//!
//! - GET /ping
//! - GET /version
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto, PingDto, VersionDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::{API_VERSION, DEVICE_VIRTUAL_SERVICE_KEY, now_epoch_ms};
use vdev_telemetry::metrics;

pub async fn ping() -> Response {
    let data = PingDto {
        api_version: API_VERSION.to_string(),
        timestamp: now_epoch_ms(),
        service_name: DEVICE_VIRTUAL_SERVICE_KEY.to_string(),
    };
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

pub async fn version() -> Response {
    let data = VersionDto {
        version: env!("CARGO_PKG_VERSION").to_string(),
        service_name: DEVICE_VIRTUAL_SERVICE_KEY.to_string(),
    };
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 模拟指标快照（进程内累计）。
pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            readings_generated: snapshot.readings_generated,
            readings_published: snapshot.readings_published,
            publish_failures: snapshot.publish_failures,
            readings_skipped_locked: snapshot.readings_skipped_locked,
            loops_attached: snapshot.loops_attached,
            loops_detached: snapshot.loops_detached,
        })),
    )
        .into_response()
}

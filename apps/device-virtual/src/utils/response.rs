//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, not_found_error, internal_error, lifecycle_error
//! - DTO 转换：device_to_dto
//!
//! 所有错误返回统一的 ApiResponse 格式，HTTP 状态码与错误码一一对应。

use api_contract::{ApiResponse, VirtualDeviceDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;
use vdev_lifecycle::LifecycleError;
use vdev_storage::DeviceRecord;

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 内部错误响应
pub fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message.into())),
    )
        .into_response()
}

/// 生命周期错误映射：NotFound -> 404，InvalidArgument -> 400，其余 -> 500
pub fn lifecycle_error(err: LifecycleError) -> Response {
    match err {
        LifecycleError::NotFound(_) => not_found_error(),
        LifecycleError::InvalidArgument(message) => bad_request_error(message),
        LifecycleError::Registry(err) => {
            warn!(target: "vdev.api", error = %err, "registry_error");
            internal_error(err.to_string())
        }
        LifecycleError::Interrupted(message) => {
            warn!(target: "vdev.api", error = %message, "lifecycle_task_interrupted");
            internal_error(message)
        }
    }
}

/// DeviceRecord 转 VirtualDeviceDto
pub fn device_to_dto(record: DeviceRecord) -> VirtualDeviceDto {
    VirtualDeviceDto {
        id: record.id,
        name: record.name,
        description: record.description,
        profile_name: record.profile_name,
        service_name: record.service_name,
        kind: record.kind,
        admin_state: record.admin_state,
        operating_state: record.operating_state,
        protocols: record.protocols,
        is_running: record.is_running,
        last_reading_at: record.last_reading_at,
        created: record.created,
        modified: record.modified,
    }
}

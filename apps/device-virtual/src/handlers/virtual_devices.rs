//! 虚拟设备 handlers
//!
//! - GET /device/virtual - 列出设备
//! - POST /device/virtual - 创建设备（201，返回 id）
//! - GET /device/virtual/{id} - 获取设备详情
//! - GET /device/virtual/name/{name} - 按名称查询
//! - PUT /device/virtual/{id} - 更新设备描述
//! - DELETE /device/virtual/{id} - 删除设备（运行中会先停止模拟循环），返回被删除的记录
//! - POST /device/virtual/{id}/start - 启动模拟
//! - POST /device/virtual/{id}/stop - 停止模拟
//!
//! 错误：设备不存在 404，请求体非法 400。

use crate::AppState;
use crate::utils::response::{bad_request_error, device_to_dto, lifecycle_error};
use api_contract::{
    ApiResponse, CreateVirtualDeviceRequest, CreatedIdDto, UpdateVirtualDeviceRequest,
    VirtualDeviceDto,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use vdev_lifecycle::DeviceDescriptor;

fn request_to_descriptor(req: CreateVirtualDeviceRequest) -> DeviceDescriptor {
    DeviceDescriptor {
        name: req.name,
        description: req.description,
        profile_name: req.profile_name,
        admin_state: req.admin_state,
        operating_state: req.operating_state,
        kind: req.kind,
        protocols: req.protocols,
    }
}

fn device_response(status: StatusCode, record: vdev_storage::DeviceRecord) -> Response {
    (status, Json(ApiResponse::success(device_to_dto(record)))).into_response()
}

pub async fn list_virtual_devices(State(state): State<AppState>) -> Response {
    match state.controller.list().await {
        Ok(items) => {
            let data: Vec<VirtualDeviceDto> = items.into_iter().map(device_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => lifecycle_error(err),
    }
}

/// 创建设备
///
/// `name` 必填；`kind` 缺省时取 `protocols.type`，再缺省为 generic。
/// 新设备处于停止状态，需要显式 start。
pub async fn create_virtual_device(
    State(state): State<AppState>,
    payload: Result<Json<CreateVirtualDeviceRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request_error(rejection.body_text()),
    };
    match state.controller.create(request_to_descriptor(req)).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(CreatedIdDto { id })),
        )
            .into_response(),
        Err(err) => lifecycle_error(err),
    }
}

pub async fn get_virtual_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.controller.get(&id).await {
        Ok(record) => device_response(StatusCode::OK, record),
        Err(err) => lifecycle_error(err),
    }
}

pub async fn get_virtual_device_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.controller.get_by_name(&name).await {
        Ok(record) => device_response(StatusCode::OK, record),
        Err(err) => lifecycle_error(err),
    }
}

/// 更新设备
///
/// 整体替换描述字段，id、创建时间与运行状态保持不变。
pub async fn update_virtual_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateVirtualDeviceRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request_error(rejection.body_text()),
    };
    match state.controller.update(&id, request_to_descriptor(req)).await {
        Ok(record) => device_response(StatusCode::OK, record),
        Err(err) => lifecycle_error(err),
    }
}

pub async fn delete_virtual_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.controller.delete(&id).await {
        Ok(removed) => device_response(StatusCode::OK, removed),
        Err(err) => lifecycle_error(err),
    }
}

pub async fn start_virtual_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.controller.start(&id).await {
        Ok(record) => device_response(StatusCode::OK, record),
        Err(err) => lifecycle_error(err),
    }
}

pub async fn stop_virtual_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.controller.stop(&id).await {
        Ok(record) => device_response(StatusCode::OK, record),
        Err(err) => lifecycle_error(err),
    }
}

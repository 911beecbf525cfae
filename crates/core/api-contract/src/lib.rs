//! 稳定的 DTO 与 API 响应契约。

use domain::{AdminState, DeviceKind, OperatingState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 虚拟设备创建请求体。
///
/// 状态字段保留为字符串，由生命周期控制器解析并在非法时返回 InvalidArgument。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVirtualDeviceRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub profile_name: Option<String>,
    pub admin_state: Option<String>,
    pub operating_state: Option<String>,
    #[serde(default)]
    pub protocols: HashMap<String, String>,
    pub kind: Option<String>,
}

/// 虚拟设备更新请求体（整体替换描述字段）。
pub type UpdateVirtualDeviceRequest = CreateVirtualDeviceRequest;

/// 虚拟设备返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualDeviceDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub profile_name: String,
    pub service_name: String,
    pub kind: DeviceKind,
    pub admin_state: AdminState,
    pub operating_state: OperatingState,
    pub protocols: HashMap<String, String>,
    pub is_running: bool,
    pub last_reading_at: Option<i64>,
    pub created: i64,
    pub modified: i64,
}

/// 创建成功返回的 ID。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIdDto {
    pub id: String,
}

/// ping 返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingDto {
    pub api_version: String,
    pub timestamp: i64,
    pub service_name: String,
}

/// version 返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDto {
    pub version: String,
    pub service_name: String,
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub readings_generated: u64,
    pub readings_published: u64,
    pub publish_failures: u64,
    pub readings_skipped_locked: u64,
    pub loops_attached: u64,
    pub loops_detached: u64,
}

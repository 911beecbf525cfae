//! 虚拟设备领域模型：设备类型、管理/运行状态与模拟读数。

pub mod data;
pub mod device;

pub use data::{Reading, VALUE_TYPE_FLOAT64};
pub use device::{AdminState, DeviceKind, OperatingState, ParseStateError};

/// 虚拟设备服务名（所有虚拟设备的 `serviceName`）。
pub const DEVICE_VIRTUAL_SERVICE_KEY: &str = "device-virtual";

/// 对外 API 版本号。
pub const API_VERSION: &str = "v3";

/// 当前 Unix 时间戳（毫秒）。
pub fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}

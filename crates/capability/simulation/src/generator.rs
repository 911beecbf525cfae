//! 读数生成器
//!
//! 无共享状态，线程安全。各类型取值区间（左闭右开）：
//!
//! | 类型 | 区间 | 单位 | 资源名 |
//! |---|---|---|---|
//! | temperature | [20.0, 35.0) | Celsius | Temperature |
//! | humidity | [30.0, 70.0) | Percent | Humidity |
//! | pressure | [1013.0, 1033.0) | hPa | Pressure |
//! | generic | [0.0, 100.0) | Units | GenericSensor |

use domain::{DeviceKind, Reading, VALUE_TYPE_FLOAT64, now_epoch_ms};
use rand::Rng;

/// 某类型读数的取值区间、单位与资源名。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingProfile {
    pub min: f64,
    pub max: f64,
    pub units: &'static str,
    pub resource_name: &'static str,
}

pub fn reading_profile(kind: DeviceKind) -> ReadingProfile {
    match kind {
        DeviceKind::Temperature => ReadingProfile {
            min: 20.0,
            max: 35.0,
            units: "Celsius",
            resource_name: "Temperature",
        },
        DeviceKind::Humidity => ReadingProfile {
            min: 30.0,
            max: 70.0,
            units: "Percent",
            resource_name: "Humidity",
        },
        DeviceKind::Pressure => ReadingProfile {
            min: 1013.0,
            max: 1033.0,
            units: "hPa",
            resource_name: "Pressure",
        },
        DeviceKind::Generic => ReadingProfile {
            min: 0.0,
            max: 100.0,
            units: "Units",
            resource_name: "GenericSensor",
        },
    }
}

/// 为一个设备生成一条模拟读数。总是成功。
pub fn generate(kind: DeviceKind, device_name: &str, profile_name: &str) -> Reading {
    let profile = reading_profile(kind);
    let raw = rand::rng().random_range(profile.min..profile.max);
    Reading {
        id: uuid::Uuid::new_v4().to_string(),
        origin: now_epoch_ms(),
        device_name: device_name.to_string(),
        profile_name: profile_name.to_string(),
        resource_name: profile.resource_name.to_string(),
        value_type: VALUE_TYPE_FLOAT64.to_string(),
        value: format_value(raw),
        units: profile.units.to_string(),
    }
}

/// 截断（而非四舍五入）到两位小数，保证格式化结果不越过区间上界。
fn format_value(value: f64) -> String {
    format!("{:.2}", (value * 100.0).floor() / 100.0)
}

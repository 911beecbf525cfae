//! 设备类型与状态枚举。
//!
//! 状态在 JSON 中使用大写字符串（`LOCKED`/`UNLOCKED`、`UP`/`DOWN`/`UNKNOWN`），
//! 设备类型使用小写字符串（`temperature`/`humidity`/`pressure`/`generic`）。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 协议元数据中表示设备类型的键。
pub const PROTOCOL_TYPE_KEY: &str = "type";

/// 状态字符串解析失败。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStateError {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for ParseStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.value)
    }
}

impl std::error::Error for ParseStateError {}

/// 传感器类型，决定读数生成的取值范围与单位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Temperature,
    Humidity,
    Pressure,
    #[default]
    Generic,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Generic => "generic",
        }
    }

    /// 宽松解析：未知类型一律视为 `Generic`。
    pub fn from_type_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "temperature" => Self::Temperature,
            "humidity" => Self::Humidity,
            "pressure" => Self::Pressure,
            _ => Self::Generic,
        }
    }

    /// 从协议元数据的 `type` 键推导设备类型。
    pub fn from_protocols(protocols: &HashMap<String, String>) -> Self {
        protocols
            .get(PROTOCOL_TYPE_KEY)
            .map(|value| Self::from_type_str(value))
            .unwrap_or_default()
    }

    /// 该类型的默认 profile 名。
    pub fn default_profile_name(&self) -> &'static str {
        match self {
            Self::Temperature => "TemperatureSensorProfile",
            Self::Humidity => "HumiditySensorProfile",
            Self::Pressure => "PressureSensorProfile",
            Self::Generic => "GenericSensorProfile",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 管理状态（启用/禁用），与模拟循环是否运行相互独立。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdminState {
    Locked,
    #[default]
    Unlocked,
}

impl AdminState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "LOCKED",
            Self::Unlocked => "UNLOCKED",
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOCKED" => Ok(Self::Locked),
            "UNLOCKED" => Ok(Self::Unlocked),
            _ => Err(ParseStateError {
                field: "adminState",
                value: s.to_string(),
            }),
        }
    }
}

/// 运行健康状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatingState {
    #[default]
    Up,
    Down,
    Unknown,
}

impl OperatingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatingState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Ok(Self::Up),
            "DOWN" => Ok(Self::Down),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(ParseStateError {
                field: "operatingState",
                value: s.to_string(),
            }),
        }
    }
}

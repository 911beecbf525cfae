use serde::{Deserialize, Serialize};

/// 模拟读数的值类型（均为浮点）。
pub const VALUE_TYPE_FLOAT64: &str = "Float64";

/// 单条模拟读数（simple reading）。
///
/// `value` 为保留两位小数的字符串，与下游 simple reading 的表示一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: String,
    pub origin: i64,
    pub device_name: String,
    pub profile_name: String,
    pub resource_name: String,
    pub value_type: String,
    pub value: String,
    pub units: String,
}

impl Reading {
    /// 解析读数值为 f64。
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.parse::<f64>().ok()
    }
}

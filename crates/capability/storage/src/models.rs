//! 注册表数据模型。

use domain::{AdminState, DeviceKind, OperatingState};
use serde::Serialize;
use std::collections::HashMap;

/// 单个虚拟传感器的描述与运行状态。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub profile_name: String,
    pub service_name: String,
    pub kind: DeviceKind,
    pub admin_state: AdminState,
    pub operating_state: OperatingState,
    /// 模拟参数（例如 `{"type": "temperature"}`）
    pub protocols: HashMap<String, String>,
    /// 当且仅当存在一个挂载中的模拟循环时为 true
    pub is_running: bool,
    /// 最近一次生成读数的时间（毫秒），从未运行时为空
    pub last_reading_at: Option<i64>,
    pub created: i64,
    pub modified: i64,
}

impl DeviceRecord {
    /// 是否允许产生读数（管理状态为 UNLOCKED）。
    pub fn is_unlocked(&self) -> bool {
        self.admin_state == AdminState::Unlocked
    }
}

//! 设备描述（create/update 的输入）与字段解析。

use domain::device::PROTOCOL_TYPE_KEY;
use domain::{AdminState, DeviceKind, OperatingState};
use std::collections::HashMap;

use crate::error::LifecycleError;

/// 调用方提供的设备描述。
#[derive(Debug, Clone, Default)]
pub struct DeviceDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub profile_name: Option<String>,
    pub admin_state: Option<String>,
    pub operating_state: Option<String>,
    /// 显式类型；为空时回退到 `protocols["type"]`
    pub kind: Option<String>,
    pub protocols: HashMap<String, String>,
}

/// 校验并归一化后的描述字段。
#[derive(Debug, Clone)]
pub(crate) struct ResolvedDescriptor {
    pub name: String,
    pub description: String,
    pub profile_name: String,
    pub kind: DeviceKind,
    pub admin_state: Option<AdminState>,
    pub operating_state: Option<OperatingState>,
    pub protocols: HashMap<String, String>,
}

impl DeviceDescriptor {
    pub fn new(name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind.as_str().to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn resolve(self) -> Result<ResolvedDescriptor, LifecycleError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(LifecycleError::InvalidArgument("name required".to_string()));
        }
        let admin_state = parse_optional::<AdminState>(self.admin_state)?;
        let operating_state = parse_optional::<OperatingState>(self.operating_state)?;

        let kind = match non_empty(self.kind) {
            Some(value) => DeviceKind::from_type_str(&value),
            None => DeviceKind::from_protocols(&self.protocols),
        };
        let mut protocols = self.protocols;
        protocols.insert(PROTOCOL_TYPE_KEY.to_string(), kind.as_str().to_string());

        let profile_name = non_empty(self.profile_name)
            .unwrap_or_else(|| kind.default_profile_name().to_string());

        Ok(ResolvedDescriptor {
            name,
            description: self.description.unwrap_or_default(),
            profile_name,
            kind,
            admin_state,
            operating_state,
            protocols,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
}

fn parse_optional<T>(value: Option<String>) -> Result<Option<T>, LifecycleError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(value) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|err| LifecycleError::InvalidArgument(err.to_string())),
        None => Ok(None),
    }
}

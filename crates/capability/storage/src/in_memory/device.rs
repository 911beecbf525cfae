//! 设备内存注册表实现
//!
//! 功能：
//! - 设备 CRUD 操作
//! - 按名称查询
//! - 更新时保持 id 不变

use crate::error::RegistryError;
use crate::models::DeviceRecord;
use crate::traits::{DeviceMutator, DeviceRegistry};
use std::collections::HashMap;
use std::sync::RwLock;

/// 设备内存注册表
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryDeviceRegistry {
    devices: RwLock<HashMap<String, DeviceRecord>>,
}

impl InMemoryDeviceRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DeviceRegistry for InMemoryDeviceRegistry {
    async fn insert(&self, record: DeviceRecord) -> Result<DeviceRecord, RegistryError> {
        let mut map = self.devices.write().map_err(|_| RegistryError::Lock)?;
        if map.contains_key(&record.id) {
            return Err(RegistryError::AlreadyExists(record.id));
        }
        map.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<DeviceRecord, RegistryError> {
        let map = self.devices.read().map_err(|_| RegistryError::Lock)?;
        map.get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    async fn get_by_name(&self, name: &str) -> Result<DeviceRecord, RegistryError> {
        let map = self.devices.read().map_err(|_| RegistryError::Lock)?;
        map.values()
            .find(|item| item.name == name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<DeviceRecord>, RegistryError> {
        let map = self.devices.read().map_err(|_| RegistryError::Lock)?;
        Ok(map.values().cloned().collect())
    }

    async fn update(&self, id: &str, mutate: DeviceMutator) -> Result<DeviceRecord, RegistryError> {
        let mut map = self.devices.write().map_err(|_| RegistryError::Lock)?;
        let device = match map.get_mut(id) {
            Some(device) => device,
            None => return Err(RegistryError::NotFound(id.to_string())),
        };
        mutate(device);
        // id 不可变
        device.id = id.to_string();
        Ok(device.clone())
    }

    async fn remove(&self, id: &str) -> Result<DeviceRecord, RegistryError> {
        let mut map = self.devices.write().map_err(|_| RegistryError::Lock)?;
        map.remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }
}

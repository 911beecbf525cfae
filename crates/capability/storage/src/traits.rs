//! 注册表接口 Trait 定义
//!
//! 设计原则：
//! - 所有接口返回 RegistryError
//! - 使用 async_trait 支持动态分发（`Arc<dyn DeviceRegistry>`）

use crate::error::RegistryError;
use crate::models::DeviceRecord;
use async_trait::async_trait;

/// 在写锁内对单条记录执行的修改。
pub type DeviceMutator = Box<dyn FnOnce(&mut DeviceRecord) + Send>;

/// 设备注册表接口
///
/// 所有方法可并发调用。
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// 插入新记录，id 已存在时返回 `AlreadyExists`
    async fn insert(&self, record: DeviceRecord) -> Result<DeviceRecord, RegistryError>;

    /// 按 id 查询
    async fn get(&self, id: &str) -> Result<DeviceRecord, RegistryError>;

    /// 按名称查询（名称不保证唯一，返回任意一条匹配记录）
    async fn get_by_name(&self, name: &str) -> Result<DeviceRecord, RegistryError>;

    /// 列出全部记录（快照，顺序无保证）
    async fn list_all(&self) -> Result<Vec<DeviceRecord>, RegistryError>;

    /// 在独占写锁内修改记录，返回修改后的副本
    async fn update(&self, id: &str, mutate: DeviceMutator) -> Result<DeviceRecord, RegistryError>;

    /// 删除记录，返回被删除的记录
    async fn remove(&self, id: &str) -> Result<DeviceRecord, RegistryError>;
}

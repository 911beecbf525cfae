//! # 虚拟设备注册表
//!
//! 本模块持有 id → 设备记录（[`DeviceRecord`]）的权威映射。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：[`DeviceRegistry`] 异步 Trait
//! 2. **数据模型层** (`models.rs`)：设备记录
//! 3. **错误处理层** (`error.rs`)：统一的注册表错误类型
//! 4. **实现层** (`in_memory/`)：`RwLock<HashMap>` 内存实现
//!
//! ## 并发约定
//!
//! - 读操作可并行；写操作独占整张表（单一读写锁，无逐记录锁）
//! - 读取返回记录副本，是临界区那一刻的一致快照，而非实时视图
//! - 记录 `id` 只在创建时分配，`update` 不会改动它
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use vdev_storage::{DeviceRegistry, InMemoryDeviceRegistry};
//!
//! let registry = InMemoryDeviceRegistry::new();
//! let record = registry.insert(record).await?;
//! let found = registry.get(&record.id).await?;
//! ```

pub mod error;
pub mod in_memory;
pub mod models;
pub mod traits;

pub use error::RegistryError;
pub use in_memory::*;
pub use models::DeviceRecord;
pub use traits::{DeviceMutator, DeviceRegistry};

//! 注册表错误类型
//!
//! - NotFound：按 id / name 查询不到设备，调用方需转换为领域层的 404 语义
//! - AlreadyExists：插入了重复 id
//! - Lock：内存锁中毒

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("device not found: {0}")]
    NotFound(String),
    #[error("device exists: {0}")]
    AlreadyExists(String),
    #[error("lock failed")]
    Lock,
}

use vdev_storage::RegistryError;

/// 生命周期操作错误。
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("device not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("registry error: {0}")]
    Registry(RegistryError),
    #[error("lifecycle task interrupted: {0}")]
    Interrupted(String),
}

impl From<RegistryError> for LifecycleError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => Self::NotFound(id),
            other => Self::Registry(other),
        }
    }
}

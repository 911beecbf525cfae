//! 内存注册表实现模块
//!
//! 包含以下实现：
//! - DeviceRegistry: InMemoryDeviceRegistry

pub mod device;

pub use device::*;

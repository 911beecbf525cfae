//! 虚拟设备生命周期控制
//!
//! 对外提供 create/list/get/update/delete/start/stop，协调注册表与模拟循环管理器。

pub mod controller;
pub mod defaults;
pub mod descriptor;
pub mod error;

pub use controller::{LifecycleController, LoopCensus};
pub use defaults::{default_descriptors, seed_default_devices};
pub use descriptor::DeviceDescriptor;
pub use error::LifecycleError;

//! Handlers 模块

pub mod common;
pub mod virtual_devices;

pub use common::*;
pub use virtual_devices::*;

//! 虚拟设备模拟：读数生成、下游 sink 与逐设备的模拟循环。
//!
//! - [`generator`]：纯函数，按设备类型生成一条读数
//! - [`sink`]：读数下游抽象（尽力而为，失败只记日志）
//! - [`manager`]：每个运行中设备一个可取消的后台任务

pub mod generator;
pub mod manager;
pub mod sink;

pub use generator::generate;
pub use manager::{LoopConfig, LoopHandle, SimulationLoopManager};
pub use sink::{LogSink, MqttReadingSink, MqttSinkConfig, ReadingSink, SinkError};

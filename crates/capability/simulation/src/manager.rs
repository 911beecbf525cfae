//! 模拟循环管理器
//!
//! 每个运行中的设备对应一个 tokio 任务：
//!
//! 1. 休眠固定间隔（默认 5 秒）
//! 2. 从注册表读取设备当前记录，按类型生成读数
//! 3. 将读数交给 sink（单次尝试受超时约束，失败只记日志）
//! 4. 回写设备的 `last_reading_at`
//! 5. 重复，直到收到取消信号
//!
//! 取消只在休眠边界被观察：一次 tick 一旦开始就会完整执行，
//! 因此不会出现半条读数。[`SimulationLoopManager::detach`] 会等待任务退出后才返回，
//! 返回之后该设备不会再有任何读数发出。
//!
//! 状态机：`STOPPED -(attach)-> RUNNING -(detach)-> STOPPED`。
//! `detach` 消费 [`LoopHandle`]，同一句柄无法被卸载两次；
//! 同一设备重复 `attach` 属于调用方错误，由生命周期控制器的互斥区排除。

use crate::generator::generate;
use crate::sink::{ReadingSink, SinkError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vdev_storage::{DeviceRecord, DeviceRegistry, RegistryError};
use vdev_telemetry::{
    record_loop_attached, record_loop_detached, record_publish_failure, record_reading_generated,
    record_reading_published, record_reading_skipped_locked,
};

/// 模拟循环参数。
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// 两次读数之间的休眠间隔
    pub interval: Duration,
    /// 单次 sink 发布的最长等待
    pub publish_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            publish_timeout: Duration::from_secs(1),
        }
    }
}

impl LoopConfig {
    pub fn from_millis(interval_ms: u64, publish_timeout_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            publish_timeout: Duration::from_millis(publish_timeout_ms),
        }
        .sanitized()
    }

    fn sanitized(mut self) -> Self {
        if self.interval.is_zero() {
            self.interval = Duration::from_millis(1);
        }
        if self.publish_timeout.is_zero() {
            self.publish_timeout = self.interval;
        }
        self
    }
}

/// 已挂载模拟循环的句柄。
pub struct LoopHandle {
    device_id: String,
    cancellation_token: CancellationToken,
    join_handle: JoinHandle<()>,
}

impl LoopHandle {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// 任务是否已经退出（正常情况下只有 detach 之后才会为 true）
    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}

struct LoopContext {
    device_id: String,
    registry: Arc<dyn DeviceRegistry>,
    sink: Arc<dyn ReadingSink>,
    config: LoopConfig,
}

/// 模拟循环管理器。
#[derive(Clone)]
pub struct SimulationLoopManager {
    registry: Arc<dyn DeviceRegistry>,
    sink: Arc<dyn ReadingSink>,
    config: LoopConfig,
}

impl SimulationLoopManager {
    pub fn new(registry: Arc<dyn DeviceRegistry>, sink: Arc<dyn ReadingSink>) -> Self {
        Self::with_config(registry, sink, LoopConfig::default())
    }

    pub fn with_config(
        registry: Arc<dyn DeviceRegistry>,
        sink: Arc<dyn ReadingSink>,
        config: LoopConfig,
    ) -> Self {
        Self {
            registry,
            sink,
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// 为设备启动模拟循环。必须在 tokio 运行时内调用。
    pub fn attach(&self, record: &DeviceRecord) -> LoopHandle {
        let cancellation_token = CancellationToken::new();
        let context = LoopContext {
            device_id: record.id.clone(),
            registry: self.registry.clone(),
            sink: self.sink.clone(),
            config: self.config.clone(),
        };
        let join_handle = tokio::spawn(run_loop(context, cancellation_token.clone()));
        record_loop_attached();
        info!(
            target: "vdev.simulation",
            device_id = %record.id,
            device_name = %record.name,
            interval_ms = self.config.interval.as_millis() as u64,
            "loop_attached"
        );
        LoopHandle {
            device_id: record.id.clone(),
            cancellation_token,
            join_handle,
        }
    }

    /// 取消模拟循环，并等待任务完全退出后返回。
    pub async fn detach(&self, handle: LoopHandle) {
        let LoopHandle {
            device_id,
            cancellation_token,
            join_handle,
        } = handle;
        cancellation_token.cancel();
        match join_handle.await {
            Ok(()) => {
                debug!(target: "vdev.simulation", device_id = %device_id, "loop_stopped");
            }
            Err(err) => {
                error!(
                    target: "vdev.simulation",
                    device_id = %device_id,
                    error = %err,
                    "loop_panicked"
                );
            }
        }
        record_loop_detached();
        info!(target: "vdev.simulation", device_id = %device_id, "loop_detached");
    }
}

async fn run_loop(context: LoopContext, cancellation_token: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => break,
            _ = tokio::time::sleep(context.config.interval) => {}
        }
        if !tick(&context).await {
            break;
        }
    }
    debug!(target: "vdev.simulation", device_id = %context.device_id, "loop_exited");
}

/// 执行一次读数生成与发布。返回 false 表示循环应退出。
async fn tick(context: &LoopContext) -> bool {
    let device = match context.registry.get(&context.device_id).await {
        Ok(device) => device,
        Err(RegistryError::NotFound(_)) => {
            warn!(
                target: "vdev.simulation",
                device_id = %context.device_id,
                "loop_device_missing"
            );
            return false;
        }
        Err(err) => {
            warn!(
                target: "vdev.simulation",
                device_id = %context.device_id,
                error = %err,
                "loop_registry_read_failed"
            );
            return true;
        }
    };
    if !device.is_unlocked() {
        record_reading_skipped_locked();
        debug!(
            target: "vdev.simulation",
            device_id = %device.id,
            device_name = %device.name,
            "reading_skipped_locked"
        );
        return true;
    }

    let reading = generate(device.kind, &device.name, &device.profile_name);
    record_reading_generated();

    let timeout_ms = context.config.publish_timeout.as_millis() as u64;
    let published =
        match tokio::time::timeout(context.config.publish_timeout, context.sink.publish(&reading))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout(timeout_ms)),
        };
    match published {
        Ok(()) => {
            record_reading_published();
            debug!(
                target: "vdev.simulation",
                device_id = %device.id,
                device_name = %device.name,
                value = %reading.value,
                units = %reading.units,
                "reading_published"
            );
        }
        Err(err) => {
            record_publish_failure();
            warn!(
                target: "vdev.simulation",
                device_id = %device.id,
                device_name = %device.name,
                error = %err,
                "reading_publish_failed"
            );
        }
    }

    let origin = reading.origin;
    if let Err(err) = context
        .registry
        .update(
            &context.device_id,
            Box::new(move |record: &mut DeviceRecord| record.last_reading_at = Some(origin)),
        )
        .await
    {
        warn!(
            target: "vdev.simulation",
            device_id = %context.device_id,
            error = %err,
            "last_reading_update_failed"
        );
    }
    true
}

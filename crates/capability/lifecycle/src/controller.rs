//! 生命周期控制器
//!
//! 已挂载循环表（device id -> [`LoopHandle`]）由一把异步互斥锁保护，
//! start/stop/delete/shutdown 都在该锁内完成"改 isRunning + 挂载/卸载循环"，
//! 读操作（get/list/get_by_name/loop_census）也经过同一把锁，
//! 因此外部观察者看到的两者始终一致：
//!
//! - 挂载句柄数 == `is_running == true` 的记录数
//! - 同一设备最多一个循环
//!
//! 改变循环表的操作在独立的 tokio 任务中执行：调用方（例如断开连接的 HTTP 请求）
//! 放弃等待时，临界区仍会完整执行到底。

use domain::{AdminState, DEVICE_VIRTUAL_SERVICE_KEY, OperatingState, now_epoch_ms};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vdev_simulation::{LoopHandle, SimulationLoopManager};
use vdev_storage::{DeviceRecord, DeviceRegistry, RegistryError};

use crate::descriptor::DeviceDescriptor;
use crate::error::LifecycleError;

/// 循环表与注册表的一致性快照。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopCensus {
    /// 当前挂载的循环句柄数
    pub attached: usize,
    /// `is_running == true` 的记录数
    pub running_records: usize,
}

pub struct LifecycleController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    registry: Arc<dyn DeviceRegistry>,
    loops: SimulationLoopManager,
    attached: Mutex<HashMap<String, LoopHandle>>,
}

impl LifecycleController {
    pub fn new(registry: Arc<dyn DeviceRegistry>, loops: SimulationLoopManager) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                registry,
                loops,
                attached: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub async fn create(&self, descriptor: DeviceDescriptor) -> Result<String, LifecycleError> {
        let resolved = descriptor.resolve()?;
        let now = now_epoch_ms();
        let record = DeviceRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: resolved.name,
            description: resolved.description,
            profile_name: resolved.profile_name,
            service_name: DEVICE_VIRTUAL_SERVICE_KEY.to_string(),
            kind: resolved.kind,
            admin_state: resolved.admin_state.unwrap_or(AdminState::Unlocked),
            operating_state: resolved.operating_state.unwrap_or(OperatingState::Up),
            protocols: resolved.protocols,
            is_running: false,
            last_reading_at: None,
            created: now,
            modified: now,
        };
        let record = self.inner.registry.insert(record).await?;
        info!(
            target: "vdev.lifecycle",
            device_id = %record.id,
            device_name = %record.name,
            kind = %record.kind,
            "device_created"
        );
        Ok(record.id)
    }

    pub async fn list(&self) -> Result<Vec<DeviceRecord>, LifecycleError> {
        let _attached = self.inner.attached.lock().await;
        Ok(self.inner.registry.list_all().await?)
    }

    pub async fn get(&self, id: &str) -> Result<DeviceRecord, LifecycleError> {
        let _attached = self.inner.attached.lock().await;
        Ok(self.inner.registry.get(id).await?)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<DeviceRecord, LifecycleError> {
        let _attached = self.inner.attached.lock().await;
        Ok(self.inner.registry.get_by_name(name).await?)
    }

    /// 替换描述字段；id、created、is_running、last_reading_at 保持不变。
    /// 请求未给出的 adminState/operatingState 沿用当前值。
    pub async fn update(
        &self,
        id: &str,
        descriptor: DeviceDescriptor,
    ) -> Result<DeviceRecord, LifecycleError> {
        let resolved = descriptor.resolve()?;
        let now = now_epoch_ms();
        let record = self
            .inner
            .registry
            .update(
                id,
                Box::new(move |record: &mut DeviceRecord| {
                    record.name = resolved.name;
                    record.description = resolved.description;
                    record.profile_name = resolved.profile_name;
                    record.kind = resolved.kind;
                    record.protocols = resolved.protocols;
                    if let Some(admin_state) = resolved.admin_state {
                        record.admin_state = admin_state;
                    }
                    if let Some(operating_state) = resolved.operating_state {
                        record.operating_state = operating_state;
                    }
                    record.modified = now;
                }),
            )
            .await?;
        info!(
            target: "vdev.lifecycle",
            device_id = %record.id,
            device_name = %record.name,
            "device_updated"
        );
        Ok(record)
    }

    /// 先卸载循环（等待其退出）再删除记录，返回被删除的记录。
    pub async fn delete(&self, id: &str) -> Result<DeviceRecord, LifecycleError> {
        let inner = self.inner.clone();
        let id = id.to_string();
        run_detached(async move { inner.delete(&id).await }).await
    }

    /// 已在运行时为无操作。
    pub async fn start(&self, id: &str) -> Result<DeviceRecord, LifecycleError> {
        let inner = self.inner.clone();
        let id = id.to_string();
        run_detached(async move { inner.start(&id).await }).await
    }

    /// 已停止时为无操作。返回时该设备不会再发出读数。
    pub async fn stop(&self, id: &str) -> Result<DeviceRecord, LifecycleError> {
        let inner = self.inner.clone();
        let id = id.to_string();
        run_detached(async move { inner.stop(&id).await }).await
    }

    /// 在循环表锁内统计，两项应始终相等。
    pub async fn loop_census(&self) -> Result<LoopCensus, LifecycleError> {
        let attached = self.inner.attached.lock().await;
        let running_records = self
            .inner
            .registry
            .list_all()
            .await?
            .iter()
            .filter(|record| record.is_running)
            .count();
        Ok(LoopCensus {
            attached: attached.len(),
            running_records,
        })
    }

    /// 卸载全部循环（停机时调用）。
    pub async fn shutdown(&self) {
        let inner = self.inner.clone();
        let result = run_detached(async move {
            inner.shutdown().await;
            Ok(())
        })
        .await;
        if let Err(err) = result {
            warn!(target: "vdev.lifecycle", error = %err, "lifecycle_shutdown_failed");
        }
    }
}

/// 在独立任务中执行临界区，调用方被丢弃时任务仍会跑完。
async fn run_detached<T, F>(section: F) -> Result<T, LifecycleError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, LifecycleError>> + Send + 'static,
{
    tokio::spawn(section)
        .await
        .map_err(|err| LifecycleError::Interrupted(err.to_string()))?
}

impl ControllerInner {
    async fn delete(&self, id: &str) -> Result<DeviceRecord, LifecycleError> {
        let mut attached = self.attached.lock().await;
        self.registry.get(id).await?;
        if let Some(handle) = attached.remove(id) {
            self.loops.detach(handle).await;
            self.registry
                .update(id, Box::new(|record: &mut DeviceRecord| record.is_running = false))
                .await?;
        }
        let removed = self.registry.remove(id).await?;
        info!(
            target: "vdev.lifecycle",
            device_id = %removed.id,
            device_name = %removed.name,
            "device_deleted"
        );
        Ok(removed)
    }

    async fn start(&self, id: &str) -> Result<DeviceRecord, LifecycleError> {
        let mut attached = self.attached.lock().await;
        let current = self.registry.get(id).await?;
        if attached.contains_key(id) {
            debug!(target: "vdev.lifecycle", device_id = %id, "device_already_running");
            return Ok(current);
        }
        let record = self
            .registry
            .update(id, Box::new(|record: &mut DeviceRecord| record.is_running = true))
            .await?;
        let handle = self.loops.attach(&record);
        attached.insert(record.id.clone(), handle);
        info!(
            target: "vdev.lifecycle",
            device_id = %record.id,
            device_name = %record.name,
            "device_started"
        );
        Ok(record)
    }

    async fn stop(&self, id: &str) -> Result<DeviceRecord, LifecycleError> {
        let mut attached = self.attached.lock().await;
        let current = self.registry.get(id).await?;
        let Some(handle) = attached.remove(id) else {
            debug!(target: "vdev.lifecycle", device_id = %id, "device_already_stopped");
            return Ok(current);
        };
        self.loops.detach(handle).await;
        let record = self
            .registry
            .update(id, Box::new(|record: &mut DeviceRecord| record.is_running = false))
            .await?;
        info!(
            target: "vdev.lifecycle",
            device_id = %record.id,
            device_name = %record.name,
            "device_stopped"
        );
        Ok(record)
    }

    async fn shutdown(&self) {
        let mut attached = self.attached.lock().await;
        let handles: Vec<(String, LoopHandle)> = attached.drain().collect();
        let count = handles.len();
        for (id, handle) in handles {
            self.loops.detach(handle).await;
            match self
                .registry
                .update(&id, Box::new(|record: &mut DeviceRecord| record.is_running = false))
                .await
            {
                Ok(_) | Err(RegistryError::NotFound(_)) => {}
                Err(err) => {
                    warn!(
                        target: "vdev.lifecycle",
                        device_id = %id,
                        error = %err,
                        "shutdown_mark_stopped_failed"
                    );
                }
            }
        }
        info!(target: "vdev.lifecycle", loops = count, "lifecycle_shutdown");
    }
}

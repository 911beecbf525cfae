use async_trait::async_trait;
use domain::{AdminState, DeviceKind, OperatingState, Reading};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vdev_lifecycle::{
    DeviceDescriptor, LifecycleController, LifecycleError, LoopCensus, default_descriptors,
    seed_default_devices,
};
use vdev_simulation::{LoopConfig, ReadingSink, SimulationLoopManager, SinkError};
use vdev_storage::InMemoryDeviceRegistry;

#[derive(Default)]
struct RecordingSink {
    readings: Mutex<Vec<Reading>>,
}

impl RecordingSink {
    fn count(&self) -> usize {
        self.readings.lock().unwrap().len()
    }

    fn count_for(&self, device_name: &str) -> usize {
        self.readings
            .lock()
            .unwrap()
            .iter()
            .filter(|reading| reading.device_name == device_name)
            .count()
    }

    fn snapshot(&self) -> Vec<Reading> {
        self.readings.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReadingSink for RecordingSink {
    async fn publish(&self, reading: &Reading) -> Result<(), SinkError> {
        self.readings.lock().unwrap().push(reading.clone());
        Ok(())
    }
}

fn controller_with_interval(interval_ms: u64) -> (Arc<LifecycleController>, Arc<RecordingSink>) {
    let registry = Arc::new(InMemoryDeviceRegistry::new());
    let sink = Arc::new(RecordingSink::default());
    let loops = SimulationLoopManager::with_config(
        registry.clone(),
        sink.clone(),
        LoopConfig::from_millis(interval_ms, 200),
    );
    (Arc::new(LifecycleController::new(registry, loops)), sink)
}

fn controller() -> (Arc<LifecycleController>, Arc<RecordingSink>) {
    controller_with_interval(20)
}

/// 每次发布都要等待固定时长的 sink，用来让 detach 停在进行中的 tick 上。
struct SlowSink {
    delay: Duration,
}

#[async_trait]
impl ReadingSink for SlowSink {
    async fn publish(&self, _reading: &Reading) -> Result<(), SinkError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

fn controller_with_slow_sink() -> Arc<LifecycleController> {
    let registry = Arc::new(InMemoryDeviceRegistry::new());
    let loops = SimulationLoopManager::with_config(
        registry.clone(),
        Arc::new(SlowSink {
            delay: Duration::from_millis(300),
        }),
        LoopConfig::from_millis(20, 1000),
    );
    Arc::new(LifecycleController::new(registry, loops))
}

async fn started_slow_device(controller: &LifecycleController) -> String {
    let id = controller
        .create(DeviceDescriptor::new("Slow-1", DeviceKind::Temperature))
        .await
        .unwrap();
    controller.start(&id).await.unwrap();
    // 让第一次 tick 进入发布
    tokio::time::sleep(Duration::from_millis(40)).await;
    id
}

async fn assert_census_balanced(controller: &LifecycleController, expected: usize) {
    let census = controller.loop_census().await.unwrap();
    assert_eq!(
        census,
        LoopCensus {
            attached: expected,
            running_records: expected,
        }
    );
}

#[tokio::test]
async fn create_applies_defaults_and_is_not_running() {
    let (controller, _) = controller();
    let descriptor = DeviceDescriptor {
        admin_state: Some("unlocked".to_string()),
        ..DeviceDescriptor::new("T1", DeviceKind::Temperature)
    };
    let id = controller.create(descriptor).await.unwrap();
    let record = controller.get(&id).await.unwrap();

    assert_eq!(record.id, id);
    assert_eq!(record.name, "T1");
    assert!(!record.is_running);
    assert_eq!(record.last_reading_at, None);
    assert_eq!(record.admin_state, AdminState::Unlocked);
    assert_eq!(record.operating_state, OperatingState::Up);
    assert_eq!(record.service_name, "device-virtual");
    assert_eq!(record.profile_name, "TemperatureSensorProfile");
    assert_eq!(record.protocols.get("type").map(String::as_str), Some("temperature"));
    assert_eq!(record.created, record.modified);
}

#[tokio::test]
async fn created_devices_are_never_running_even_when_locked() {
    let (controller, _) = controller();
    let descriptor = DeviceDescriptor {
        admin_state: Some("LOCKED".to_string()),
        operating_state: Some("DOWN".to_string()),
        ..DeviceDescriptor::new("P1", DeviceKind::Pressure)
    };
    let id = controller.create(descriptor).await.unwrap();
    let record = controller.get(&id).await.unwrap();
    assert!(!record.is_running);
    assert_eq!(record.admin_state, AdminState::Locked);
    assert_eq!(record.operating_state, OperatingState::Down);
}

#[tokio::test]
async fn create_rejects_malformed_descriptor() {
    let (controller, _) = controller();
    let err = controller
        .create(DeviceDescriptor::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidArgument(_)));

    let err = controller
        .create(DeviceDescriptor {
            operating_state: Some("SIDEWAYS".to_string()),
            ..DeviceDescriptor::new("T1", DeviceKind::Temperature)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidArgument(_)));
    assert!(controller.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn ids_are_unique_and_names_may_repeat() {
    let (controller, _) = controller();
    let first = controller
        .create(DeviceDescriptor::new("Same", DeviceKind::Humidity))
        .await
        .unwrap();
    let second = controller
        .create(DeviceDescriptor::new("Same", DeviceKind::Humidity))
        .await
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(controller.list().await.unwrap().len(), 2);
    let found = controller.get_by_name("Same").await.unwrap();
    assert!(found.id == first || found.id == second);
}

#[tokio::test]
async fn missing_device_is_not_found_everywhere() {
    let (controller, _) = controller();
    let id = "nonexistent-id";
    assert!(matches!(
        controller.get(id).await,
        Err(LifecycleError::NotFound(_))
    ));
    assert!(matches!(
        controller.get_by_name("nobody").await,
        Err(LifecycleError::NotFound(_))
    ));
    assert!(matches!(
        controller
            .update(id, DeviceDescriptor::new("X", DeviceKind::Generic))
            .await,
        Err(LifecycleError::NotFound(_))
    ));
    assert!(matches!(
        controller.delete(id).await,
        Err(LifecycleError::NotFound(_))
    ));
    assert!(matches!(
        controller.start(id).await,
        Err(LifecycleError::NotFound(_))
    ));
    assert!(matches!(
        controller.stop(id).await,
        Err(LifecycleError::NotFound(_))
    ));
    assert_census_balanced(&controller, 0).await;
}

#[tokio::test]
async fn temperature_device_scenario() {
    let (controller, sink) = controller();
    let id = controller
        .create(DeviceDescriptor::new("T1", DeviceKind::Temperature))
        .await
        .unwrap();
    assert!(!controller.get(&id).await.unwrap().is_running);

    let started = controller.start(&id).await.unwrap();
    assert!(started.is_running);
    tokio::time::sleep(Duration::from_millis(150)).await;

    let readings = sink.snapshot();
    assert!(!readings.is_empty());
    for reading in &readings {
        assert_eq!(reading.device_name, "T1");
        assert_eq!(reading.units, "Celsius");
        let value = reading.numeric_value().unwrap();
        assert!((20.0..35.0).contains(&value));
    }

    let stopped = controller.stop(&id).await.unwrap();
    assert!(!stopped.is_running);
    assert!(stopped.last_reading_at.is_some());
    let after_stop = sink.count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.count(), after_stop);

    controller.delete(&id).await.unwrap();
    assert!(matches!(
        controller.get(&id).await,
        Err(LifecycleError::NotFound(_))
    ));
}

#[tokio::test]
async fn repeated_start_stop_leaves_no_loops() {
    let (controller, _) = controller();
    let id = controller
        .create(DeviceDescriptor::new("H1", DeviceKind::Humidity))
        .await
        .unwrap();

    for _ in 0..5 {
        controller.start(&id).await.unwrap();
        assert_census_balanced(&controller, 1).await;
        controller.stop(&id).await.unwrap();
        assert_census_balanced(&controller, 0).await;
    }
    assert!(!controller.get(&id).await.unwrap().is_running);
}

#[tokio::test]
async fn double_start_and_double_stop_are_noops() {
    let (controller, _) = controller();
    let id = controller
        .create(DeviceDescriptor::new("T1", DeviceKind::Temperature))
        .await
        .unwrap();

    controller.start(&id).await.unwrap();
    let second = controller.start(&id).await.unwrap();
    assert!(second.is_running);
    assert_census_balanced(&controller, 1).await;

    controller.stop(&id).await.unwrap();
    let second = controller.stop(&id).await.unwrap();
    assert!(!second.is_running);
    assert_census_balanced(&controller, 0).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_starts_attach_exactly_one_loop() {
    let (controller, _) = controller_with_interval(1000);
    let id = controller
        .create(DeviceDescriptor::new("T1", DeviceKind::Temperature))
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let controller = controller.clone();
        let id = id.clone();
        tasks.push(tokio::spawn(async move { controller.start(&id).await }));
    }
    for task in tasks {
        assert!(task.await.unwrap().unwrap().is_running);
    }
    assert_census_balanced(&controller, 1).await;
    controller.shutdown().await;
    assert_census_balanced(&controller, 0).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn census_stays_balanced_under_mixed_operations() {
    let (controller, _) = controller();
    let mut ids = Vec::new();
    for index in 0..4 {
        ids.push(
            controller
                .create(DeviceDescriptor::new(
                    format!("Dev-{index}"),
                    DeviceKind::Generic,
                ))
                .await
                .unwrap(),
        );
    }

    let mut tasks = Vec::new();
    for round in 0..8 {
        for id in &ids {
            let controller = controller.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move {
                if round % 2 == 0 {
                    controller.start(&id).await.map(|_| ())
                } else {
                    controller.stop(&id).await.map(|_| ())
                }
            }));
        }
        let census = controller.loop_census().await.unwrap();
        assert_eq!(census.attached, census.running_records);
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    let census = controller.loop_census().await.unwrap();
    assert_eq!(census.attached, census.running_records);
    controller.shutdown().await;
    assert_census_balanced(&controller, 0).await;
}

#[tokio::test]
async fn delete_running_device_stops_emissions() {
    let (controller, sink) = controller();
    let id = controller
        .create(DeviceDescriptor::new("P1", DeviceKind::Pressure))
        .await
        .unwrap();
    controller.start(&id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;

    let removed = controller.delete(&id).await.unwrap();
    assert_eq!(removed.id, id);
    assert!(!removed.is_running);
    let after_delete = sink.count_for("P1");
    assert!(after_delete > 0);
    assert_census_balanced(&controller, 0).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.count_for("P1"), after_delete);
    assert!(matches!(
        controller.get(&id).await,
        Err(LifecycleError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_preserves_identity_and_running_state() {
    let (controller, _) = controller();
    let id = controller
        .create(DeviceDescriptor::new("T1", DeviceKind::Temperature))
        .await
        .unwrap();
    let created = controller.get(&id).await.unwrap();
    controller.start(&id).await.unwrap();

    let updated = controller
        .update(
            &id,
            DeviceDescriptor {
                name: "T1-renamed".to_string(),
                description: Some("relabelled".to_string()),
                admin_state: Some("LOCKED".to_string()),
                protocols: HashMap::from([("type".to_string(), "humidity".to_string())]),
                ..DeviceDescriptor::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, id);
    assert_eq!(updated.created, created.created);
    assert!(updated.is_running);
    assert_eq!(updated.name, "T1-renamed");
    assert_eq!(updated.description, "relabelled");
    assert_eq!(updated.kind, DeviceKind::Humidity);
    assert_eq!(updated.profile_name, "HumiditySensorProfile");
    assert_eq!(updated.admin_state, AdminState::Locked);
    assert_eq!(updated.operating_state, OperatingState::Up);
    assert!(updated.modified >= created.modified);
    assert_census_balanced(&controller, 1).await;
    controller.shutdown().await;
}

#[tokio::test]
async fn locked_running_device_emits_nothing_until_unlocked() {
    let (controller, sink) = controller();
    let id = controller
        .create(DeviceDescriptor {
            admin_state: Some("LOCKED".to_string()),
            ..DeviceDescriptor::new("T1", DeviceKind::Temperature)
        })
        .await
        .unwrap();
    controller.start(&id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.count(), 0);

    controller
        .update(
            &id,
            DeviceDescriptor {
                admin_state: Some("UNLOCKED".to_string()),
                ..DeviceDescriptor::new("T1", DeviceKind::Temperature)
            },
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(sink.count() > 0);
    controller.shutdown().await;
}

#[tokio::test]
async fn shutdown_detaches_every_loop() {
    let (controller, sink) = controller();
    let ids = seed_default_devices(&controller, true).await.unwrap();
    assert_eq!(ids.len(), 3);
    assert_census_balanced(&controller, 3).await;
    tokio::time::sleep(Duration::from_millis(80)).await;

    controller.shutdown().await;
    assert_census_balanced(&controller, 0).await;
    let after_shutdown = sink.count();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.count(), after_shutdown);
    for id in &ids {
        assert!(!controller.get(id).await.unwrap().is_running);
    }
}

#[tokio::test]
async fn default_devices_cover_three_kinds() {
    let descriptors = default_descriptors();
    let names: Vec<&str> = descriptors.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Virtual-Temperature-Sensor-01",
            "Virtual-Humidity-Sensor-01",
            "Virtual-Pressure-Sensor-01",
        ]
    );

    let (controller, _) = controller();
    seed_default_devices(&controller, false).await.unwrap();
    let pressure = controller
        .get_by_name("Virtual-Pressure-Sensor-01")
        .await
        .unwrap();
    assert_eq!(pressure.kind, DeviceKind::Pressure);
    assert_eq!(pressure.profile_name, "PressureSensorProfile");
    assert_eq!(
        pressure.protocols.get("virtual").map(String::as_str),
        Some("true")
    );
    assert!(!pressure.is_running);
    assert_census_balanced(&controller, 0).await;
}

#[tokio::test]
async fn abandoned_stop_still_completes() {
    let controller = controller_with_slow_sink();
    let id = started_slow_device(&controller).await;

    let abandoned = tokio::time::timeout(Duration::from_millis(20), controller.stop(&id)).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_census_balanced(&controller, 0).await;
    assert!(!controller.get(&id).await.unwrap().is_running);

    let again = controller.stop(&id).await.unwrap();
    assert!(!again.is_running);
    assert_census_balanced(&controller, 0).await;
}

#[tokio::test]
async fn abandoned_delete_still_removes_device() {
    let controller = controller_with_slow_sink();
    let id = started_slow_device(&controller).await;

    let abandoned = tokio::time::timeout(Duration::from_millis(20), controller.delete(&id)).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_census_balanced(&controller, 0).await;
    assert!(matches!(
        controller.get(&id).await,
        Err(LifecycleError::NotFound(_))
    ));
}

#[tokio::test]
async fn reads_during_stop_see_settled_state() {
    let controller = controller_with_slow_sink();
    let id = started_slow_device(&controller).await;

    let stopping = {
        let controller = controller.clone();
        let id = id.clone();
        tokio::spawn(async move { controller.stop(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    // 读操作等待进行中的 stop 完成，不会看到已卸载却仍标记运行的记录
    let record = controller.get(&id).await.unwrap();
    assert!(!record.is_running);
    let listed = controller.list().await.unwrap();
    assert!(listed.iter().all(|item| !item.is_running));

    assert!(!stopping.await.unwrap().unwrap().is_running);
    assert_census_balanced(&controller, 0).await;
}

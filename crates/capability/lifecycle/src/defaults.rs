//! 启动时预置的示例设备。

use domain::DeviceKind;
use std::collections::HashMap;
use tracing::info;

use crate::controller::LifecycleController;
use crate::descriptor::DeviceDescriptor;
use crate::error::LifecycleError;

const DEFAULT_DEVICES: [(&str, DeviceKind, &str); 3] = [
    (
        "Virtual-Temperature-Sensor-01",
        DeviceKind::Temperature,
        "Virtual temperature sensor",
    ),
    (
        "Virtual-Humidity-Sensor-01",
        DeviceKind::Humidity,
        "Virtual humidity sensor",
    ),
    (
        "Virtual-Pressure-Sensor-01",
        DeviceKind::Pressure,
        "Virtual pressure sensor",
    ),
];

pub fn default_descriptors() -> Vec<DeviceDescriptor> {
    DEFAULT_DEVICES
        .iter()
        .map(|(name, kind, description)| DeviceDescriptor {
            name: (*name).to_string(),
            description: Some((*description).to_string()),
            profile_name: Some(kind.default_profile_name().to_string()),
            kind: Some(kind.as_str().to_string()),
            protocols: HashMap::from([
                ("virtual".to_string(), "true".to_string()),
                ("type".to_string(), kind.as_str().to_string()),
            ]),
            ..DeviceDescriptor::default()
        })
        .collect()
}

/// 创建示例设备，`autostart` 为 true 时逐个启动。返回新设备 id。
pub async fn seed_default_devices(
    controller: &LifecycleController,
    autostart: bool,
) -> Result<Vec<String>, LifecycleError> {
    let mut ids = Vec::new();
    for descriptor in default_descriptors() {
        let id = controller.create(descriptor).await?;
        if autostart {
            controller.start(&id).await?;
        }
        ids.push(id);
    }
    info!(
        target: "vdev.lifecycle",
        count = ids.len(),
        autostart,
        "default_devices_seeded"
    );
    Ok(ids)
}

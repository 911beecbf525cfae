//! 读数下游（sink）抽象。
//!
//! 发布是尽力而为的：不要求确认、不重试。失败由模拟循环记录日志后丢弃，
//! 宁可丢数据也不让整个设备集群停顿。

use async_trait::async_trait;
use domain::Reading;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 下游发布错误。
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),
    #[error("sink timeout after {0}ms")]
    Timeout(u64),
    #[error("payload error: {0}")]
    Payload(String),
}

/// 接收单个设备的一条读数。
#[async_trait]
pub trait ReadingSink: Send + Sync {
    async fn publish(&self, reading: &Reading) -> Result<(), SinkError>;
}

/// 日志 sink（默认）：只记录读数，不向外发布。
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl ReadingSink for LogSink {
    async fn publish(&self, reading: &Reading) -> Result<(), SinkError> {
        debug!(
            target: "vdev.simulation",
            device_name = %reading.device_name,
            resource_name = %reading.resource_name,
            value = %reading.value,
            units = %reading.units,
            "reading_generated"
        );
        Ok(())
    }
}

/// MQTT sink 配置。
#[derive(Debug, Clone)]
pub struct MqttSinkConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 读数 topic 前缀：`{prefix}/{deviceName}/{resourceName}`
    pub topic_prefix: String,
    pub qos: u8,
}

/// MQTT sink：将读数以 JSON 发布给下游事件接入方。
#[derive(Clone)]
pub struct MqttReadingSink {
    client: AsyncClient,
    topic_prefix: String,
    qos: QoS,
}

impl MqttReadingSink {
    /// 建立客户端并启动事件循环任务。
    pub fn connect(config: MqttSinkConfig) -> (Self, tokio::task::JoinHandle<()>) {
        let client_id = format!("device-virtual-{}", uuid::Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) = (config.username, config.password) {
            options.set_credentials(username, password);
        }
        let (client, mut eventloop) = AsyncClient::new(options, 64);
        let handle = tokio::spawn(async move {
            loop {
                if let Err(err) = eventloop.poll().await {
                    warn!(target: "vdev.simulation", "mqtt sink eventloop error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });
        info!(
            target: "vdev.simulation",
            host = %config.host,
            port = config.port,
            topic_prefix = %config.topic_prefix,
            "mqtt_sink_connected"
        );
        (
            Self {
                client,
                topic_prefix: config.topic_prefix,
                qos: qos_from_u8(config.qos),
            },
            handle,
        )
    }

    fn topic_for(&self, reading: &Reading) -> String {
        topic_for(&self.topic_prefix, reading)
    }
}

#[async_trait]
impl ReadingSink for MqttReadingSink {
    async fn publish(&self, reading: &Reading) -> Result<(), SinkError> {
        let topic = self.topic_for(reading);
        let payload =
            serde_json::to_vec(reading).map_err(|err| SinkError::Payload(err.to_string()))?;
        self.client
            .publish(topic, self.qos, false, payload)
            .await
            .map_err(|err| SinkError::Unavailable(err.to_string()))
    }
}

fn topic_for(prefix: &str, reading: &Reading) -> String {
    format!(
        "{}/{}/{}",
        prefix.trim_end_matches('/'),
        reading.device_name,
        reading.resource_name
    )
}

fn qos_from_u8(value: u8) -> QoS {
    match value {
        1 => QoS::AtLeastOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtMostOnce,
    }
}

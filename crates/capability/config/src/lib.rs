//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 读数下游 sink 类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// 仅记录日志（默认）。
    Log,
    /// 通过 MQTT 发布给下游事件接入方。
    Mqtt,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub reading_interval_ms: u64,
    pub sink_publish_timeout_ms: u64,
    pub seed_default_devices: bool,
    pub autostart: bool,
    pub sink: SinkKind,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_topic_prefix: String,
    pub mqtt_qos: u8,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr = env::var("VDEV_HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:59900".to_string());
        let reading_interval_ms = read_u64_with_default("VDEV_READING_INTERVAL_MS", 5000)?;
        if reading_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "VDEV_READING_INTERVAL_MS".to_string(),
                "0".to_string(),
            ));
        }
        let sink_publish_timeout_ms = read_u64_with_default("VDEV_SINK_PUBLISH_TIMEOUT_MS", 1000)?;
        let seed_default_devices = read_bool_with_default("VDEV_SEED_DEFAULT_DEVICES", true);
        let autostart = read_bool_with_default("VDEV_AUTOSTART", false);
        let sink = read_sink_kind("VDEV_SINK")?;
        let mqtt_host = env::var("VDEV_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("VDEV_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("VDEV_MQTT_USERNAME");
        let mqtt_password = read_optional("VDEV_MQTT_PASSWORD");
        let mqtt_topic_prefix = env::var("VDEV_MQTT_TOPIC_PREFIX")
            .unwrap_or_else(|_| "edgex/events/device".to_string());
        let mqtt_qos = read_u8_with_default("VDEV_MQTT_QOS", 0)?;

        Ok(Self {
            http_addr,
            reading_interval_ms,
            sink_publish_timeout_ms,
            seed_default_devices,
            autostart,
            sink,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_topic_prefix,
            mqtt_qos,
        })
    }
}

fn read_sink_kind(key: &str) -> Result<SinkKind, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(SinkKind::Log),
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "log" => Ok(SinkKind::Log),
        "mqtt" => Ok(SinkKind::Mqtt),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u8_with_default(key: &str, default: u8) -> Result<u8, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u8>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}

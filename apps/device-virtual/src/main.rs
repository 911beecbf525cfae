//! 虚拟设备服务：模拟传感器集群并通过 HTTP 控制每个设备的生命周期。

mod handlers;
mod middleware;
mod routes;
mod utils;

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;
use vdev_config::{AppConfig, SinkKind};
use vdev_lifecycle::{LifecycleController, seed_default_devices};
use vdev_simulation::{
    LogSink, LoopConfig, MqttReadingSink, MqttSinkConfig, ReadingSink, SimulationLoopManager,
};
use vdev_storage::{DeviceRegistry, InMemoryDeviceRegistry};
use vdev_telemetry::init_tracing;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<LifecycleController>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let (sink, sink_task) = build_sink(&config);
    let registry: Arc<dyn DeviceRegistry> = Arc::new(InMemoryDeviceRegistry::new());
    let loops = SimulationLoopManager::with_config(
        registry.clone(),
        sink,
        LoopConfig::from_millis(config.reading_interval_ms, config.sink_publish_timeout_ms),
    );
    let controller = Arc::new(LifecycleController::new(registry, loops));

    if config.seed_default_devices {
        seed_default_devices(&controller, config.autostart).await?;
    }

    let app = routes::build_app(AppState {
        controller: controller.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "vdev.api", addr = %config.http_addr, "http_listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // HTTP 已停止接收请求，卸载全部模拟循环
    controller.shutdown().await;
    if let Some(task) = sink_task {
        task.abort();
    }
    info!(target: "vdev.api", "service_stopped");
    Ok(())
}

fn build_sink(config: &AppConfig) -> (Arc<dyn ReadingSink>, Option<JoinHandle<()>>) {
    match config.sink {
        SinkKind::Log => (Arc::new(LogSink), None),
        SinkKind::Mqtt => {
            let (sink, task) = MqttReadingSink::connect(MqttSinkConfig {
                host: config.mqtt_host.clone(),
                port: config.mqtt_port,
                username: config.mqtt_username.clone(),
                password: config.mqtt_password.clone(),
                topic_prefix: config.mqtt_topic_prefix.clone(),
                qos: config.mqtt_qos,
            });
            (Arc::new(sink), Some(task))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(target: "vdev.api", error = %err, "ctrl_c_listener_failed");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(target: "vdev.api", error = %err, "sigterm_listener_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(target: "vdev.api", "shutdown_signal_received");
}

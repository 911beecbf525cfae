//! 追踪、请求 ID 生成与模拟指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 模拟指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub readings_generated: u64,
    pub readings_published: u64,
    pub publish_failures: u64,
    pub readings_skipped_locked: u64,
    pub loops_attached: u64,
    pub loops_detached: u64,
}

/// 模拟指标（进程内累计计数）。
pub struct TelemetryMetrics {
    readings_generated: AtomicU64,
    readings_published: AtomicU64,
    publish_failures: AtomicU64,
    readings_skipped_locked: AtomicU64,
    loops_attached: AtomicU64,
    loops_detached: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            readings_generated: AtomicU64::new(0),
            readings_published: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
            readings_skipped_locked: AtomicU64::new(0),
            loops_attached: AtomicU64::new(0),
            loops_detached: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings_generated: self.readings_generated.load(Ordering::Relaxed),
            readings_published: self.readings_published.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            readings_skipped_locked: self.readings_skipped_locked.load(Ordering::Relaxed),
            loops_attached: self.loops_attached.load(Ordering::Relaxed),
            loops_detached: self.loops_detached.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录生成的读数次数。
pub fn record_reading_generated() {
    metrics().readings_generated.fetch_add(1, Ordering::Relaxed);
}

/// 记录成功交给 sink 的读数次数。
pub fn record_reading_published() {
    metrics().readings_published.fetch_add(1, Ordering::Relaxed);
}

/// 记录 sink 发布失败（含超时）次数。
pub fn record_publish_failure() {
    metrics().publish_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录因设备 LOCKED 而跳过的 tick 次数。
pub fn record_reading_skipped_locked() {
    metrics()
        .readings_skipped_locked
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录模拟循环挂载次数。
pub fn record_loop_attached() {
    metrics().loops_attached.fetch_add(1, Ordering::Relaxed);
}

/// 记录模拟循环卸载次数。
pub fn record_loop_detached() {
    metrics().loops_detached.fetch_add(1, Ordering::Relaxed);
}

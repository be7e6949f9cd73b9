use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::{Mutex, OnceLock};

static INIT_LOCK: Mutex<()> = Mutex::new(());

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// Metrics
pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();
pub static MAINTENANCE_MODE_ENABLED: OnceLock<IntGauge> = OnceLock::new();
pub static GUARD_DECISIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static INTERACTION_STATUS_TRANSITIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Register every collector. Calling it again is a no-op.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _init = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )?;
    let request_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path", "status"],
    )?;
    let maintenance = IntGauge::new(
        "maintenance_mode_enabled",
        "1 while maintenance mode is on, 0 otherwise",
    )?;
    let guard_decisions = IntCounterVec::new(
        Opts::new("guard_decisions_total", "Route guard decisions by outcome"),
        &["decision"],
    )?;
    let transitions = IntCounterVec::new(
        Opts::new(
            "interaction_status_transitions_total",
            "Interaction statuses changed by the scheduler",
        ),
        &["status"],
    )?;

    registry.register(Box::new(requests_total.clone()))?;
    registry.register(Box::new(request_duration.clone()))?;
    registry.register(Box::new(maintenance.clone()))?;
    registry.register(Box::new(guard_decisions.clone()))?;
    registry.register(Box::new(transitions.clone()))?;

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(request_duration);
    let _ = MAINTENANCE_MODE_ENABLED.set(maintenance);
    let _ = GUARD_DECISIONS_TOTAL.set(guard_decisions);
    let _ = INTERACTION_STATUS_TRANSITIONS_TOTAL.set(transitions);

    Ok(())
}

pub fn set_maintenance_enabled(enabled: bool) {
    if let Some(gauge) = MAINTENANCE_MODE_ENABLED.get() {
        gauge.set(i64::from(enabled));
    }
}

pub fn record_guard_decision(decision: &str) {
    if let Some(counter) = GUARD_DECISIONS_TOTAL.get() {
        counter.with_label_values(&[decision]).inc();
    }
}

pub fn record_status_transition(status: &str) {
    if let Some(counter) = INTERACTION_STATUS_TRANSITIONS_TOTAL.get() {
        counter.with_label_values(&[status]).inc();
    }
}

pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to convert metrics to UTF-8: {}", e);
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

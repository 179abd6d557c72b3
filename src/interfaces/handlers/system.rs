use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Serialize;
use std::{
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};
use sysinfo::System;

use crate::{constants::START_TIME, AppState};

/// Seconds a health report is served from cache.
const CACHE_SECONDS: i64 = 5;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = MIB * 1024.0;

#[derive(Serialize, Clone, Default)]
struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    database: String,
    storage: String,
    version: String,
    memory_usage: String,
    system: SystemInfo,
}

/// Last report and the unix second it was built at.
struct HealthCache {
    built_at: AtomicI64,
    report: RwLock<HealthCheckResponse>,
}

static CACHE: Lazy<HealthCache> = Lazy::new(|| HealthCache {
    built_at: AtomicI64::new(0),
    report: RwLock::new(HealthCheckResponse::default()),
});

fn host_info(sys: &System) -> SystemInfo {
    let unknown = || "Unknown".to_string();
    SystemInfo {
        os: System::name().unwrap_or_else(unknown),
        kernel: System::kernel_version().unwrap_or_else(unknown),
        hostname: System::host_name().unwrap_or_else(unknown),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / GIB),
    }
}

fn process_memory(sys: &System) -> String {
    sysinfo::get_current_pid()
        .ok()
        .and_then(|pid| sys.process(pid))
        .map_or_else(|| "Unknown".to_string(), |p| format!("{:.2} MB", p.memory() as f64 / MIB))
}

async fn database_reachable(state: &AppState) -> bool {
    match state.auth_handler.admin_repo.check_connection().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Health check database probe failed: {}", e);
            false
        }
    }
}

async fn build_report(state: &AppState) -> HealthCheckResponse {
    let now = Utc::now();
    let uptime = now.signed_duration_since(*START_TIME).num_seconds().max(0) as u64;
    let sys = System::new_all();
    let database_ok = database_reachable(state).await;

    HealthCheckResponse {
        status: if database_ok { "healthy" } else { "degraded" }.to_string(),
        uptime: format_duration(Duration::from_secs(uptime)).to_string(),
        timestamp: now.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        database: if database_ok { "OK" } else { "Unavailable" }.to_string(),
        storage: state.storage_backend().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_usage: process_memory(&sys),
        system: host_info(&sys),
    }
}

/// Liveness plus a database probe. Reports are reused for a few seconds so the
/// endpoint can be polled without hammering the pool.
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();

    if now - CACHE.built_at.load(Ordering::Relaxed) <= CACHE_SECONDS {
        return HttpResponse::Ok().json(CACHE.report.read().clone());
    }

    let report = build_report(&state).await;
    *CACHE.report.write() = report.clone();
    CACHE.built_at.store(now, Ordering::Relaxed);
    HttpResponse::Ok().json(report)
}

//! Logger module
//!
//! Provides logging utilities for the server:
//! - Server lifecycle logging
//! - Access logging in several formats
//! - Command execution logging
//! - Error and warning logging, optionally to files

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{Config, StoreConfig};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup. Before that, output goes
/// straight to stdout/stderr.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config.logging.level.to_ascii_lowercase();
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        matches!(level.as_str(), "warn" | "error"),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("docshell started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("  - GET  http://{addr}/      (console)"));
    write_info(&format!("  - POST http://{addr}/run   (command=...)"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info(&format!("Max body size: {} bytes", config.http.max_body_size));
    write_info("======================================\n");
}

/// The URI is not logged since it may carry credentials
pub fn log_store_configured(store: &StoreConfig) {
    write_info(&format!(
        "[STORE] Using collection {}.{}",
        store.database, store.collection
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

/// Log one executed command; `operation` is `-` when none was recognized
pub fn log_command(operation: &str, status: &str, elapsed_us: u64) {
    write_info(&format!("[RUN] {operation} -> {status} ({elapsed_us}us)"));
}

pub fn log_shutdown(active_connections: usize) {
    write_info(&format!(
        "\n[Shutdown] Stopped accepting connections ({active_connections} still active)"
    ));
}

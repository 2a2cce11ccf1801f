//! Wire-level debugging via the `PRICING_LOUD_WIRE` environment variable.
//!
//! When `PRICING_LOUD_WIRE` is set to any value, every request and response
//! exchanged with the back end is printed to stderr as colored JSON:
//!
//! ```bash
//! PRICING_LOUD_WIRE=1 cargo run --example dashboard
//! ```
//!
//! - Green `>>>` for outgoing requests
//! - Red `<<<` for incoming responses
//! - Timestamps and request IDs for correlation
//!
//! Passwords and tokens are replaced with `<redacted>` before printing; the
//! `Authorization` header is only ever reported as present or absent.

use super::error_helpers::truncate_for_context;
use colored::Colorize;
use serde_json::Value;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Environment variable that enables wire dumping.
pub const LOUD_WIRE_ENV: &str = "PRICING_LOUD_WIRE";

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(1);

static ENABLED: OnceLock<bool> = OnceLock::new();

/// Field names whose values are never printed.
const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "password2",
    "access",
    "refresh",
    "access_token",
    "refresh_token",
];

/// Non-JSON bodies are cut at this many bytes.
const RAW_BODY_PREVIEW_LENGTH: usize = 500;

/// Whether wire dumping is on. Cached after the first call, so the variable
/// must be set before the first request.
#[must_use]
pub fn is_enabled() -> bool {
    *ENABLED.get_or_init(|| std::env::var(LOUD_WIRE_ENV).is_ok())
}

/// Get the next request ID for correlation.
#[must_use]
pub fn next_request_id() -> usize {
    REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Replaces the values of sensitive fields, at any depth, with `<redacted>`.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if SENSITIVE_FIELDS.contains(&key.as_str()) && !val.is_object() {
                    *val = Value::String("<redacted>".to_string());
                } else {
                    redact(val);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

fn prefix(request_id: usize) -> String {
    let ts = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .dimmed();
    format!(
        "{} {} {}",
        "[LOUD_WIRE]".bold(),
        ts,
        format!("[REQ#{request_id}]").cyan()
    )
}

fn print_json(prefix: &str, label: colored::ColoredString, value: &Value) {
    let mut value = value.clone();
    redact(&mut value);
    eprintln!("{prefix} {label}:");
    let rendered = colored_json::to_colored_json_auto(&value)
        .ok()
        .or_else(|| serde_json::to_string_pretty(&value).ok());
    if let Some(rendered) = rendered {
        for line in rendered.lines() {
            eprintln!("{prefix} {line}");
        }
    }
}

/// Log an outgoing HTTP request.
pub fn log_request(request_id: usize, method: &str, url: &str, body: Option<&Value>, authorized: bool) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = ">>>".green().bold();
    let auth = if authorized { "bearer" } else { "anonymous" };
    eprintln!("{prefix} {direction} {method} {url} ({auth})");

    if let Some(body) = body {
        print_json(&prefix, "Body".green(), body);
    }
}

/// Log an incoming HTTP response status.
pub fn log_response_status(request_id: usize, status: u16) {
    if !is_enabled() {
        return;
    }

    let prefix = prefix(request_id);
    let direction = "<<<".red().bold();
    let status_text = if status < 300 {
        status.to_string().green()
    } else if status < 500 {
        status.to_string().yellow()
    } else {
        status.to_string().red()
    };
    eprintln!("{prefix} {direction} HTTP {status_text}");
}

/// Log an incoming response body.
pub fn log_response_body(request_id: usize, body: &str) {
    if !is_enabled() || body.is_empty() {
        return;
    }

    let prefix = prefix(request_id);
    match serde_json::from_str::<Value>(body) {
        Ok(parsed) => print_json(&prefix, "Response".red(), &parsed),
        Err(_) => {
            let truncated = truncate_for_context(body, RAW_BODY_PREVIEW_LENGTH);
            eprintln!("{prefix} {}: {truncated}", "Response".red());
        }
    }
}

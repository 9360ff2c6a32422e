// src/logging.rs

use crate::constants::API_CALL_LOG_TARGET;
use crate::errors::{ClientError, ClientResult};
use crate::models::ApiCallLog;
use flexi_logger::{FileSpec, Logger, LoggerHandle};
use std::path::Path;

/// Starts file logging. The terminal belongs to the UI, so nothing goes to stderr.
/// Keep the returned handle alive for as long as logs should be written.
pub fn init_logging(level: &str, directory: &Path) -> ClientResult<LoggerHandle> {
    Logger::try_with_str(level)
        .map_err(|e| ClientError::config_error(format!("Invalid log level '{}': {}", level, e)))?
        .log_to_file(FileSpec::default().directory(directory).basename("webchat"))
        .append()
        .format(flexi_logger::detailed_format)
        .start()
        .map_err(|e| ClientError::config_error(format!("Failed to start logger: {}", e)))
}

pub fn format_api_call(log: &ApiCallLog) -> String {
    format!(
        "[{}] {} - {} - Status: {} - Time: {}ms",
        log.timestamp.to_rfc3339(),
        log.endpoint,
        log.request_summary,
        log.response_status,
        log.response_time_ms
    )
}

/// Logs an API call under the `api_calls` target.
pub fn log_api_call(log: &ApiCallLog) {
    log::info!(target: API_CALL_LOG_TARGET, "{}", format_api_call(log));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_api_call() {
        let entry = ApiCallLog {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            endpoint: "http://127.0.0.1:5000/login".to_string(),
            request_summary: "POST /login".to_string(),
            response_status: 401,
            response_time_ms: 12,
        };
        assert_eq!(
            format_api_call(&entry),
            "[2024-05-01T12:00:00+00:00] http://127.0.0.1:5000/login - POST /login - Status: 401 - Time: 12ms"
        );
    }
}

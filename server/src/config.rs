use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BOUNDARY_SOURCE: &str =
    "https://raw.githubusercontent.com/gregoiredavid/france-geojson/master/departements.geojson";

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_STATIC_DIR: &str = "server/static";

// Export
pub const EXPORT_WIDTH: u32 = 1200;
pub const EXPORT_HEIGHT: u32 = 1000;
pub const EXPORT_FILENAME: &str = "carte-territoires.png";

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

/// URL or local path of the department boundary GeoJSON.
pub fn boundary_source() -> String {
    std::env::var("BOUNDARY_SOURCE")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BOUNDARY_SOURCE.to_owned())
}

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

pub fn max_upload_bytes() -> usize {
    std::env::var("MAX_UPLOAD_BYTES")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
}

pub fn static_dir() -> PathBuf {
    std::env::var("STATIC_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        temp_env::with_vars_unset(
            ["PORT", "BOUNDARY_SOURCE", "MAX_UPLOAD_BYTES", "UPSTREAM_HTTP_TIMEOUT_SECS"],
            || {
                assert_eq!(server_port(), DEFAULT_SERVER_PORT);
                assert_eq!(boundary_source(), DEFAULT_BOUNDARY_SOURCE);
                assert_eq!(max_upload_bytes(), DEFAULT_MAX_UPLOAD_BYTES);
                assert_eq!(
                    upstream_http_timeout(),
                    Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS)
                );
            },
        );
    }

    #[test]
    fn invalid_and_zero_values_fall_back_to_defaults() {
        temp_env::with_vars(
            [
                ("PORT", Some("0")),
                ("MAX_UPLOAD_BYTES", Some("lots")),
                ("BOUNDARY_SOURCE", Some("   ")),
                ("UPSTREAM_CONNECT_TIMEOUT_SECS", Some("-3")),
            ],
            || {
                assert_eq!(server_port(), DEFAULT_SERVER_PORT);
                assert_eq!(max_upload_bytes(), DEFAULT_MAX_UPLOAD_BYTES);
                assert_eq!(boundary_source(), DEFAULT_BOUNDARY_SOURCE);
                assert_eq!(
                    upstream_connect_timeout(),
                    Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS)
                );
            },
        );
    }

    #[test]
    fn explicit_values_are_used() {
        temp_env::with_vars(
            [
                ("PORT", Some("8080")),
                ("BOUNDARY_SOURCE", Some(" ./data/departements.geojson ")),
                ("STATIC_DIR", Some("/srv/static")),
            ],
            || {
                assert_eq!(server_port(), 8080);
                assert_eq!(boundary_source(), "./data/departements.geojson");
                assert_eq!(static_dir(), PathBuf::from("/srv/static"));
            },
        );
    }
}

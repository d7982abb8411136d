//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Environment variables, when the required ones are present
//! 2. Otherwise a config file, searched for in standard locations
//!
//! Either way the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `WAKELINK_VIN` (required): VIN of the tracked vehicle
//! - `WAKELINK_REFRESH_TOKEN` (required): long-lived OAuth refresh token
//! - `WAKELINK_REGION`: `global` (default) or `china`
//! - `WAKELINK_WAIT_MINUTES`: wake budget in minutes
//! - `WAKELINK_LATITUDE` / `WAKELINK_LONGITUDE`: HomeLink location
//! - `WAKELINK_TOKEN_URL` / `WAKELINK_API_BASE_URL`: endpoint overrides,
//!   both required when either is set
//!
//! ## File Locations
//! `./wakelink.toml`, `./wakelink.json`, `./config.toml`, `./config.json`,
//! then the same names one directory up.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use wakelink_domain::{Endpoints, Region, Result, VehicleConfig, VehicleError};

const FILE_NAMES: [&str; 4] = ["wakelink.toml", "wakelink.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `VehicleError::Config` when neither source yields a valid
/// configuration.
pub fn load() -> Result<VehicleConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `WAKELINK_*` environment variables
///
/// # Errors
/// Returns `VehicleError::Config` if a required variable is missing or a
/// value does not parse.
pub fn load_from_env() -> Result<VehicleConfig> {
    let vin = env_var("WAKELINK_VIN")?;
    let refresh_token = env_var("WAKELINK_REFRESH_TOKEN")?;
    let mut config = VehicleConfig::new(vin, refresh_token);

    if let Some(region) = env_opt("WAKELINK_REGION") {
        config.region = Region::from_str(&region)?;
    }
    if let Some(minutes) = env_parse::<u64>("WAKELINK_WAIT_MINUTES")? {
        config.wait_minutes = minutes;
    }
    config.latitude = env_parse::<f64>("WAKELINK_LATITUDE")?;
    config.longitude = env_parse::<f64>("WAKELINK_LONGITUDE")?;

    match (env_opt("WAKELINK_TOKEN_URL"), env_opt("WAKELINK_API_BASE_URL")) {
        (Some(token_url), Some(api_base_url)) => {
            config.endpoints = Some(Endpoints { token_url, api_base_url });
        }
        (None, None) => {}
        _ => {
            return Err(VehicleError::Config(
                "WAKELINK_TOKEN_URL and WAKELINK_API_BASE_URL must be set together".to_string(),
            ))
        }
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations.
///
/// # Errors
/// Returns `VehicleError::Config` if the file is missing, malformed, or
/// fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<VehicleConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(VehicleError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            VehicleError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| VehicleError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse by extension; anything that is not `.json` is read as TOML
fn parse_config(contents: &str, path: &Path) -> Result<VehicleConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "json" => serde_json::from_str(contents)
            .map_err(|e| VehicleError::Config(format!("Invalid JSON format: {e}"))),
        "toml" => toml::from_str(contents)
            .map_err(|e| VehicleError::Config(format!("Invalid TOML format: {e}"))),
        _ => Err(VehicleError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in the current or parent directory
pub fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    search_from(&cwd)
}

fn search_from(dir: &Path) -> Option<PathBuf> {
    let parent = dir.join("..");
    let found = [dir, parent.as_path()]
        .into_iter()
        .flat_map(|base| FILE_NAMES.iter().map(move |name| base.join(name)))
        .find(|path| path.is_file());
    found
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key)
        .ok_or_else(|| VehicleError::Config(format!("Missing required environment variable: {key}")))
}

/// Set and non-blank
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| VehicleError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::{Builder, TempDir};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 8] = [
        "WAKELINK_VIN",
        "WAKELINK_REFRESH_TOKEN",
        "WAKELINK_REGION",
        "WAKELINK_WAIT_MINUTES",
        "WAKELINK_LATITUDE",
        "WAKELINK_LONGITUDE",
        "WAKELINK_TOKEN_URL",
        "WAKELINK_API_BASE_URL",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("WAKELINK_VIN", "5YJ3E1EA0KF000001");
        std::env::set_var("WAKELINK_REFRESH_TOKEN", "rt");
        std::env::set_var("WAKELINK_REGION", "cn");
        std::env::set_var("WAKELINK_WAIT_MINUTES", "3");
        std::env::set_var("WAKELINK_LATITUDE", "52.52");
        std::env::set_var("WAKELINK_LONGITUDE", "13.40");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.vin, "5YJ3E1EA0KF000001");
        assert_eq!(config.region, Region::China);
        assert_eq!(config.wait_minutes, 3);
        assert_eq!(config.homelink_location(), Some((52.52, 13.40)));
        assert!(config.endpoints.is_none());
    }

    #[test]
    fn test_load_from_env_missing_required() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("WAKELINK_VIN", "VIN");

        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("WAKELINK_REFRESH_TOKEN"));
    }

    #[test]
    fn test_load_from_env_rejects_bad_number_and_half_endpoints() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("WAKELINK_VIN", "VIN");
        std::env::set_var("WAKELINK_REFRESH_TOKEN", "rt");
        std::env::set_var("WAKELINK_WAIT_MINUTES", "soon");
        let bad_number = load_from_env();

        std::env::remove_var("WAKELINK_WAIT_MINUTES");
        std::env::set_var("WAKELINK_TOKEN_URL", "http://localhost/token");
        let half_endpoints = load_from_env();
        clear_env();

        assert!(matches!(bad_number, Err(VehicleError::Config(ref m)) if m.contains("WAKELINK_WAIT_MINUTES")));
        assert!(matches!(half_endpoints, Err(VehicleError::Config(_))));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
vin = "VIN"
refresh_token = "rt"
region = "china"
wait_minutes = 2

[endpoints]
token_url = "http://localhost:9000/token"
api_base_url = "http://localhost:9000"
"#
        )
        .unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.region, Region::China);
        assert_eq!(config.wait_minutes, 2);
        assert_eq!(config.resolved_endpoints().api_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_load_from_json_file_applies_defaults() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"vin": "VIN", "refresh_token": "rt"}}"#).unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.region, Region::Global);
        assert_eq!(config.wait_minutes, wakelink_domain::constants::DEFAULT_WAIT_MINUTES);
    }

    #[test]
    fn test_load_from_file_validates() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "vin = \"\"\nrefresh_token = \"rt\"").unwrap();

        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("vin"));
    }

    #[test]
    fn test_load_from_file_missing_path() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/wakelink.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse_config("", Path::new("wakelink.yaml")).unwrap_err();
        assert!(err.to_string().contains("Unsupported config format"));
    }

    #[test]
    fn test_search_prefers_current_directory() {
        let root = TempDir::new().unwrap();
        let child = root.path().join("child");
        std::fs::create_dir(&child).unwrap();
        std::fs::write(root.path().join("config.toml"), "").unwrap();
        assert_eq!(search_from(&child), Some(child.join("..").join("config.toml")));

        std::fs::write(child.join("wakelink.json"), "{}").unwrap();
        assert_eq!(search_from(&child), Some(child.join("wakelink.json")));
        assert_eq!(search_from(&root.path().join("missing")), None);
    }
}

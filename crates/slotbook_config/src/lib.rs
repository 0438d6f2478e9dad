use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use tracing::debug;
pub mod models;
pub use models::*;

const SECRET_MARKER: &str = "secret_from_env";

/// Loads the application configuration.
///
/// Sources, later ones winning:
/// 1. `<config dir>/default.*`
/// 2. `<config dir>/<RUN_ENV>.*` (RUN_ENV defaults to `debug`)
/// 3. environment variables prefixed with `SLOTBOOK` (or `PREFIX`), nested with `__`
///
/// String values equal to `secret_from_env` are then resolved from the environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config_dir = env::var("SLOTBOOK_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));
    load_config_from(config_dir)
}

/// Same as [`load_config`] with an explicit configuration directory.
pub fn load_config_from(config_dir: PathBuf) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "SLOTBOOK".to_string());

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator("__")
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    let config = apply_env_overrides_from_marker(raw_config)?;
    config.validate().map_err(ConfigError::Message)?;
    Ok(config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values.
///
/// The variable name is the value's path joined with `_` and upper-cased, so
/// `admin.password` reads `ADMIN_PASSWORD`. Returns the names that could not be resolved.
fn inject_env_secrets(value: &mut Value) -> Vec<String> {
    fn walk(path: &mut Vec<String>, obj: &mut Value, missing: &mut Vec<String>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.to_string());
                    walk(path, v, missing);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let env_key = path.join("_").to_uppercase();
                match env::var(&env_key) {
                    Ok(env_val) => *obj = Value::String(env_val),
                    Err(_) => missing.push(env_key),
                }
            }
            _ => {}
        }
    }

    let mut missing = Vec::new();
    walk(&mut Vec::new(), value, &mut missing);
    missing
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|e| ConfigError::Message(format!("config is not serializable: {}", e)))?;
    let missing = inject_env_secrets(&mut json);
    if !missing.is_empty() {
        return Err(ConfigError::Message(format!(
            "environment variables required by secret_from_env are not set: {}",
            missing.join(", ")
        )));
    }
    serde_json::from_value(json)
        .map_err(|e| ConfigError::Message(format!("config changed shape after secret injection: {}", e)))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// The path is taken from `DOTENV_OVERRIDE`, then from a first command line argument
/// starting with `.env`, and defaults to `.env`. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PhenoscribeConfig;
use super::secret::secret_string_opt;
use crate::domain::errors::PhenoscribeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PhenoscribeConfig
/// 4. Applies environment variable overrides (PHENOSCRIBE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use phenoscribe::config::loader::load_config;
///
/// let config = load_config("phenoscribe.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PhenoscribeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PhenoscribeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PhenoscribeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PhenoscribeConfig = toml::from_str(&contents)
        .map_err(|e| PhenoscribeError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PhenoscribeError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Resolves the effective configuration
///
/// With a path, behaves like [`load_config`]. Without one, starts from the
/// documented defaults and applies environment overrides, so the tool runs
/// with no config file at all.
pub fn resolve_config(path: Option<&str>) -> Result<PhenoscribeConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = PhenoscribeConfig::default();
            apply_env_overrides(&mut config)?;
            config.validate().map_err(|e| {
                PhenoscribeError::Configuration(format!("Configuration validation failed: {}", e))
            })?;
            Ok(config)
        }
    }
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PhenoscribeError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PhenoscribeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using PHENOSCRIBE_* prefix
///
/// Environment variables follow the pattern: PHENOSCRIBE_<SECTION>_<KEY>
/// For example: PHENOSCRIBE_ANALYSIS_MODEL, PHENOSCRIBE_OUTPUT_DIR
fn apply_env_overrides(config: &mut PhenoscribeConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PHENOSCRIBE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Analysis overrides
    if let Ok(val) = std::env::var("PHENOSCRIBE_ANALYSIS_MODEL") {
        config.analysis.model = val;
    }
    if let Ok(val) = std::env::var("PHENOSCRIBE_ANALYSIS_TEMPERATURE") {
        config.analysis.temperature = val.parse().map_err(|_| {
            PhenoscribeError::Configuration(format!(
                "PHENOSCRIBE_ANALYSIS_TEMPERATURE must be a number, got '{val}'"
            ))
        })?;
    }
    if let Ok(val) = std::env::var("PHENOSCRIBE_ANALYSIS_MAX_TOKENS") {
        if let Ok(max_tokens) = val.parse() {
            config.analysis.max_tokens = max_tokens;
        }
    }
    if let Ok(val) = std::env::var("PHENOSCRIBE_ANALYSIS_BASE_URL") {
        config.analysis.base_url = val;
    }
    if let Ok(val) = std::env::var("PHENOSCRIBE_ANALYSIS_API_KEY") {
        config.analysis.api_key = secret_string_opt(Some(val));
    }
    if let Ok(val) = std::env::var("PHENOSCRIBE_ANALYSIS_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.analysis.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("PHENOSCRIBE_ANALYSIS_RETRY_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.analysis.retry.max_attempts = attempts;
        }
    }

    // Input overrides
    if let Ok(val) = std::env::var("PHENOSCRIBE_INPUT_FILE") {
        config.input.file = val;
    }

    // Output overrides
    if let Ok(val) = std::env::var("PHENOSCRIBE_OUTPUT_DIR") {
        config.output.dir = val;
    }
    if let Ok(val) = std::env::var("PHENOSCRIBE_OUTPUT_RESUME") {
        config.output.resume = val.parse().unwrap_or(true);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PHENOSCRIBE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PHENOSCRIBE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

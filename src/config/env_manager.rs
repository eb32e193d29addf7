use std::path::PathBuf;
use super::Config;

/// Reads an environment variable, treating an empty value as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Overlays environment variables onto `config`
pub(crate) fn apply_env(config: &mut Config) {
    if let Some(dir) = get_env_value("PROJECTS_DIR") {
        config.projects_dir = PathBuf::from(dir);
    }
    if let Some(dir) = get_env_value("STATIC_DIR") {
        config.static_dir = PathBuf::from(dir);
    }
    if let Some(addr) = get_env_value("BIND_ADDR") {
        config.bind_addr = addr;
    }

    if let Some(base) = get_env_value("GITHUB_API_BASE_URL") {
        config.github.api_base = base;
    }
    if let Some(base) = get_env_value("GITHUB_RAW_BASE_URL") {
        config.github.raw_base = base;
    }
    if let Some(token) = get_env_value("GITHUB_TOKEN") {
        config.github.token = Some(token);
    }

    if let Some(key) = get_env_value("OPENAI_API_KEY") {
        config.openai.api_key = Some(key);
    }
    if let Some(base) = get_env_value("OPENAI_API_BASE") {
        config.openai.api_base = Some(base);
    }
    if let Some(model) = get_env_value("OPENAI_MODEL") {
        config.openai.default_model = model;
    }

    if let Some(limit) = get_env_value("MAX_CONCURRENT_DOWNLOADS").and_then(|v| v.parse().ok()) {
        config.processing.max_concurrent_downloads = limit;
    }
}

use anyhow::{Context, Result};
use clinicase_runtime_config::{ClientConfig, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/clinicase/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("clinicase"))
}

/// Canonical config file path.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Read config from `path`. A missing or unparsable file yields defaults.
pub fn load_config_from(path: &Path) -> Result<ClientConfig> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        toml::from_str::<ClientConfig>(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring unparsable config at {}: {e}", path.display());
            ClientConfig::default()
        })
    } else {
        ClientConfig::default()
    };
    config.apply_compat_fallbacks();
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &ClientConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config dir at {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config at {}", path.display()))?;
    Ok(())
}

/// Effective config: file values, then environment overrides.
pub fn load_config() -> Result<ClientConfig> {
    let mut config = load_config_from(&config_path()?)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

fn print_config(path: &Path, config: &ClientConfig) {
    println!("Config file: {}", path.display());
    println!();
    println!("[server]");
    println!("  url          = {}", config.server.url);
    println!("  timeout_secs = {}", config.server.timeout_secs);
    println!();
    println!("[workbench]");
    println!("  page_size         = {}", config.workbench.page_size);
    println!("  redirect_delay_ms = {}", config.workbench.redirect_delay_ms);
}

/// Print current config.
pub fn show_config() -> Result<()> {
    let path = config_path()?;
    let config = load_config_from(&path)?;
    print_config(&path, &config);
    Ok(())
}

/// Apply the provided values to the config at `path`.
pub fn update_config_at(
    path: &Path,
    server_url: Option<String>,
    timeout_secs: Option<u64>,
    page_size: Option<usize>,
) -> Result<ClientConfig> {
    let mut config = load_config_from(path)?;
    if let Some(url) = server_url {
        config.server.url = url;
    }
    if let Some(secs) = timeout_secs {
        config.server.timeout_secs = secs;
    }
    if let Some(size) = page_size {
        config.workbench.page_size = size;
    }
    config.apply_compat_fallbacks();
    save_config_to(path, &config)?;
    Ok(config)
}

/// Update config with provided values.
pub fn set_config(
    server_url: Option<String>,
    timeout_secs: Option<u64>,
    page_size: Option<usize>,
) -> Result<()> {
    let path = config_path()?;
    let config = update_config_at(&path, server_url, timeout_secs, page_size)?;
    println!("Configuration updated.");
    print_config(&path, &config);
    Ok(())
}

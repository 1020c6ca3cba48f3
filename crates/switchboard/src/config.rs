use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rotary::dial::{ActionKind, ActionTag, DialAction, DialLayout, DialNumber, DialTable};
use rotary::gaze::{EyeAnchor, GazeOffsetMapper};
use rotary::gesture::GestureTiming;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DialConfig {
    pub number: DialNumber,
    #[serde(default)]
    pub label: String,
    pub tag: Option<ActionTag>,
    pub kind: Option<ActionKind>,
    pub href: Option<String>,
}

impl DialConfig {
    fn action(&self) -> Option<DialAction> {
        let Some(tag) = &self.tag else {
            if self.kind.is_some() || self.href.is_some() {
                log::warn!("Dial {} has an action but no tag; leaving it unassigned", self.number);
            }
            return None;
        };

        Some(DialAction {
            tag: tag.clone(),
            kind: self.kind.unwrap_or(ActionKind::Link),
            href: self.href.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub settle_delay_ms: u64,
    pub status_display_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let timing = GestureTiming::default();
        Self {
            settle_delay_ms: timing.settle_delay.as_millis() as u64,
            status_display_ms: timing.status_display.as_millis() as u64,
        }
    }
}

impl From<TimingConfig> for GestureTiming {
    fn from(cfg: TimingConfig) -> Self {
        Self {
            settle_delay: Duration::from_millis(cfg.settle_delay_ms),
            status_display: Duration::from_millis(cfg.status_display_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EyesConfig {
    pub left: EyeAnchor,
    pub right: EyeAnchor,
}

impl Default for EyesConfig {
    fn default() -> Self {
        Self {
            left: EyeAnchor::LEFT,
            right: EyeAnchor::RIGHT,
        }
    }
}

impl From<EyesConfig> for GazeOffsetMapper {
    fn from(cfg: EyesConfig) -> Self {
        GazeOffsetMapper::new(cfg.left, cfg.right)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_dials")]
    pub dials: Vec<DialConfig>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub layout: DialLayout,
    #[serde(default)]
    pub eyes: EyesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dials: default_dials(),
            timing: TimingConfig::default(),
            layout: DialLayout::default(),
            eyes: EyesConfig::default(),
        }
    }
}

fn default_dials() -> Vec<DialConfig> {
    let dial = |number, label: &str, tag: &str, kind, href: Option<&str>| DialConfig {
        number,
        label: label.to_string(),
        tag: Some(ActionTag::new(tag)),
        kind: Some(kind),
        href: href.map(str::to_string),
    };

    vec![
        dial(DialNumber::One, "EMAIL", "email", ActionKind::Email, None),
        dial(
            DialNumber::Two,
            "GITHUB",
            "github-link",
            ActionKind::Link,
            Some("https://github.com"),
        ),
        dial(
            DialNumber::Three,
            "LINKEDIN",
            "linkedin-link",
            ActionKind::Link,
            Some("https://www.linkedin.com"),
        ),
        dial(DialNumber::Four, "PHONE", "phone", ActionKind::Phone, None),
    ]
}

impl Config {
    pub fn dial_table(&self) -> Result<DialTable, ConfigError> {
        let mut seen = HashSet::new();
        let mut table = DialTable::default();

        for cfg in &self.dials {
            if !seen.insert(cfg.number) {
                return Err(ConfigError::DuplicateDial(cfg.number));
            }
            table.assign(cfg.number, cfg.label.clone(), cfg.action());
        }
        Ok(table)
    }

    pub fn timing(&self) -> GestureTiming {
        self.timing.into()
    }

    pub fn gaze_mapper(&self) -> GazeOffsetMapper {
        self.eyes.into()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Dial {0} is assigned more than once")]
    DuplicateDial(DialNumber),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("dev", "portfolio", "switchboard")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Explicit path from the command line, else the platform config location.
/// Always absolute, so the watcher and its event paths agree.
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let path = explicit.map_or_else(get_config_path, Ok)?;
    Ok(std::path::absolute(path)?)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(
            config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix("SWITCHBOARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = s.try_deserialize()?;
    config.dial_table()?;
    Ok(config)
}

pub fn load_or_default(path: &Path) -> Config {
    match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config from {}: {}", path.display(), e);
            Config::default()
        }
    }
}

pub fn write_default_config(path: &Path) -> std::io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(path, DEFAULT_CONFIG)?;
    }
    Ok(path.to_path_buf())
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Directory to watch and the absolute config file inside it.
fn watch_target(config_path: &Path) -> Result<(PathBuf, PathBuf), ConfigError> {
    let file = std::path::absolute(config_path)?;
    let dir = file
        .parent()
        .map(Path::to_path_buf)
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok((dir, file))
}

fn is_reload_trigger(event: &notify::Event, config_file: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_file)
}

/// Posts [`AppEvent::ConfigReload`] whenever the config file changes.
pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let (config_dir, config_file) = match watch_target(&config_path) {
        Ok(target) => target,
        Err(e) => {
            log::error!("Cannot watch {}: {}", config_path.display(), e);
            return;
        }
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )
    .and_then(|mut w| w.watch(&config_dir, RecursiveMode::NonRecursive).map(|_| w));

    // keep the watcher alive for the lifetime of the loop
    let _watcher = match watcher {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to watch {}: {}", config_dir.display(), ConfigError::from(e));
            return;
        }
    };
    log::debug!("Watching {}", config_file.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if is_reload_trigger(&event, &config_file) => {
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

//! Reads and writes `~/.stowbot/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use stowbot_runtime::LogFormat;
use stowbot_types::{CarryRule, WorkspaceConfig};

/// Persisted CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Console log layout.  `STOWBOT_LOG_FORMAT` takes precedence.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Room, storage bay, objects and robot body.
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Return the path to `~/.stowbot/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".stowbot").join("config.toml")
}

/// Where a loaded [`Config`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    File,
    /// No file on disk; built-in defaults were used.
    Defaults,
}

/// Load the config, falling back to the defaults when the file does not
/// exist.  `STOWBOT_*` overrides are applied in both cases.
pub fn load() -> Result<(Config, Source), String> {
    load_with(&config_path(), |name| std::env::var(name).ok())
}

/// The defaults with `STOWBOT_*` overrides applied.
pub fn defaults() -> Config {
    let mut cfg = Config::default();
    apply_env_overrides(&mut cfg);
    cfg
}

pub(crate) fn load_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(Config, Source), String> {
    let (mut cfg, source) = match load_from(path)? {
        Some(cfg) => (cfg, Source::File),
        None => (Config::default(), Source::Defaults),
    };
    apply_overrides(&mut cfg, lookup);
    Ok((cfg, source))
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    toml::from_str(&raw)
        .map(Some)
        .map_err(|e| format!("Failed to parse config: {}", e))
}

/// Apply `STOWBOT_*` environment overrides.  Unparseable values are ignored.
///
/// | Variable | Field |
/// |---|---|
/// | `STOWBOT_ROOM_WIDTH` | `workspace.room_width` |
/// | `STOWBOT_ROOM_LENGTH` | `workspace.room_length` |
/// | `STOWBOT_STORAGE_X` | `workspace.storage_x` |
/// | `STOWBOT_STORAGE_Y` | `workspace.storage_y` |
/// | `STOWBOT_CARRY_RULE` | `workspace.carry_rule` |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |name| std::env::var(name).ok());
}

fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let number = |name: &str| {
        lookup(name)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    };
    let ws = &mut cfg.workspace;
    if let Some(v) = number("STOWBOT_ROOM_WIDTH").filter(|v| *v > 0.0) {
        ws.room_width = v;
    }
    if let Some(v) = number("STOWBOT_ROOM_LENGTH").filter(|v| *v > 0.0) {
        ws.room_length = v;
    }
    if let Some(v) = number("STOWBOT_STORAGE_X").filter(|v| *v >= 0.0) {
        ws.storage_x = v;
    }
    if let Some(v) = number("STOWBOT_STORAGE_Y").filter(|v| *v >= 0.0) {
        ws.storage_y = v;
    }
    if let Some(rule) = lookup("STOWBOT_CARRY_RULE").and_then(|v| v.parse::<CarryRule>().ok()) {
        ws.carry_rule = rule;
    }
}

/// Save the config, creating `~/.stowbot/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowbot_types::ObjectSeed;

    fn temp_path() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        (dir, path)
    }

    #[test]
    fn config_path_points_to_stowbot_dir() {
        let p = config_path_for_home("/home/operator");
        assert!(p.to_string_lossy().contains(".stowbot"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let (_dir, path) = temp_path();
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn missing_file_uses_defaults_with_overrides() {
        let (_dir, path) = temp_path();
        let lookup = |name: &str| match name {
            "STOWBOT_ROOM_WIDTH" => Some("1500".to_string()),
            "STOWBOT_CARRY_RULE" => Some("holding".to_string()),
            _ => None,
        };
        let (cfg, source) = load_with(&path, lookup).expect("load ok");
        assert_eq!(source, Source::Defaults);
        assert!((cfg.workspace.room_width - 1500.0).abs() < f64::EPSILON);
        assert_eq!(cfg.workspace.carry_rule, CarryRule::Holding);
        assert!(!path.exists());
    }

    #[test]
    fn existing_file_gets_overrides_too() {
        let (_dir, path) = temp_path();
        save_to(&Config::default(), &path).expect("save");
        let lookup = |name: &str| (name == "STOWBOT_STORAGE_X").then(|| "42".to_string());
        let (cfg, source) = load_with(&path, lookup).expect("load ok");
        assert_eq!(source, Source::File);
        assert!((cfg.workspace.storage_x - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn roundtrip_custom_config() {
        let (_dir, path) = temp_path();
        let mut cfg = Config::default();
        cfg.log_format = LogFormat::Json;
        cfg.workspace.carry_rule = CarryRule::Holding;
        cfg.workspace.objects = vec![ObjectSeed { id: 7, x: 120.0, y: 640.0 }];

        save_to(&cfg, &path).expect("save");
        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let (_dir, path) = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[workspace]\nroom_width = 1500.0\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.log_format, LogFormat::Compact);
        assert!((loaded.workspace.room_width - 1500.0).abs() < f64::EPSILON);
        assert!((loaded.workspace.room_length - 1000.0).abs() < f64::EPSILON);
        assert_eq!(loaded.workspace.objects.len(), 3);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let (_dir, path) = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "workspace = 12").unwrap();
        assert!(load_from(&path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, path) = temp_path();
        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = std::fs::metadata(path.parent().unwrap()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o700);
    }

    // Each test below owns its variable, so they can run in parallel.

    #[test]
    fn env_overrides_room_width() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("STOWBOT_ROOM_WIDTH", "1200") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.workspace.room_width - 1200.0).abs() < f64::EPSILON);
        unsafe { std::env::remove_var("STOWBOT_ROOM_WIDTH") };
    }

    #[test]
    fn env_overrides_ignore_invalid_length() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("STOWBOT_ROOM_LENGTH", "-5") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.workspace.room_length - 1000.0).abs() < f64::EPSILON);
        unsafe { std::env::set_var("STOWBOT_ROOM_LENGTH", "wide") };
        apply_env_overrides(&mut cfg);
        assert!((cfg.workspace.room_length - 1000.0).abs() < f64::EPSILON);
        unsafe { std::env::remove_var("STOWBOT_ROOM_LENGTH") };
    }

    #[test]
    fn env_overrides_storage_bay() {
        // SAFETY: no other test touches these variables.
        unsafe {
            std::env::set_var("STOWBOT_STORAGE_X", "900");
            std::env::set_var("STOWBOT_STORAGE_Y", "150.5");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.workspace.storage_x - 900.0).abs() < f64::EPSILON);
        assert!((cfg.workspace.storage_y - 150.5).abs() < f64::EPSILON);
        unsafe {
            std::env::remove_var("STOWBOT_STORAGE_X");
            std::env::remove_var("STOWBOT_STORAGE_Y");
        }
    }

    #[test]
    fn env_overrides_carry_rule() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("STOWBOT_CARRY_RULE", "holding") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.workspace.carry_rule, CarryRule::Holding);
        unsafe { std::env::set_var("STOWBOT_CARRY_RULE", "whenever") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.workspace.carry_rule, CarryRule::AnyUnstored);
        unsafe { std::env::remove_var("STOWBOT_CARRY_RULE") };
    }
}

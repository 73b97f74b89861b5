use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default depth of the editor's native undo stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Flags as written on the command line or in a `.collabrc` file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_native_undo: bool,
    pub trace_ops: bool,
    pub history_limit: Option<usize>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_native_undo: self.no_native_undo || other.no_native_undo,
            trace_ops: self.trace_ops || other.trace_ops,
            history_limit: other.history_limit.or(self.history_limit),
        }
    }
}

/// Behavior switches for the reference editor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Run the widget's own undo/redo when the engine installed no override.
    pub native_undo: bool,
    /// Maximum number of local edits kept for native undo.
    pub history_limit: usize,
    /// Log every operation crossing the boundary at debug level.
    pub trace_operations: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            native_undo: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            trace_operations: false,
        }
    }
}

impl From<&ConfigFlags> for AdapterConfig {
    fn from(flags: &ConfigFlags) -> Self {
        Self {
            native_undo: !flags.no_native_undo,
            history_limit: flags.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            trace_operations: flags.trace_ops,
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("collab-adapter").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("collab-adapter")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("collab-adapter").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("collab-adapter")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".collabrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# collab-adapter defaults (saved with --save)".to_string());
    if flags.no_native_undo {
        lines.push("--no-native-undo".to_string());
    }
    if let Some(limit) = flags.history_limit {
        lines.push(format!("--history-limit {limit}"));
    }
    if flags.trace_ops {
        lines.push("--trace-ops".to_string());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list; anything else is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--no-native-undo" {
            flags.no_native_undo = true;
        } else if token == "--trace-ops" {
            flags.trace_ops = true;
        } else if token == "--history-limit" {
            if let Some(next) = tokens.get(i + 1) {
                flags.history_limit = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--history-limit=") {
            flags.history_limit = value.parse().ok();
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "collab-adapter".to_string(),
            "--no-native-undo".to_string(),
            "--history-limit".to_string(),
            "25".to_string(),
            "--trace-ops".to_string(),
            "ops.json".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.no_native_undo);
        assert!(flags.trace_ops);
        assert_eq!(flags.history_limit, Some(25));
    }

    #[test]
    fn test_bad_history_limit_is_dropped() {
        let args = vec!["--history-limit=lots".to_string()];
        assert_eq!(parse_flag_tokens(&args).history_limit, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            no_native_undo: true,
            history_limit: Some(10),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            trace_ops: true,
            history_limit: Some(50),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.no_native_undo);
        assert!(merged.trace_ops);
        assert_eq!(merged.history_limit, Some(50));
    }

    #[test]
    fn test_adapter_config_from_flags() {
        let config = AdapterConfig::from(&ConfigFlags::default());
        assert_eq!(config, AdapterConfig::default());

        let config = AdapterConfig::from(&ConfigFlags {
            no_native_undo: true,
            trace_ops: true,
            history_limit: Some(3),
        });
        assert!(!config.native_undo);
        assert!(config.trace_operations);
        assert_eq!(config.history_limit, 3);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".collabrc");
        let flags = ConfigFlags {
            no_native_undo: true,
            trace_ops: true,
            history_limit: Some(7),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}

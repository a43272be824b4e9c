/// Config file loading and creation for the perfest CLI.
///
/// Config lives at $XDG_CONFIG_HOME/perfest/config.toml, falling back to
/// ~/.config/perfest/config.toml.
/// Every key is optional and CLI flags override it.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PerfestConfig {
    pub seed: Option<u64>,
    pub min_bot_pool: Option<usize>,
    pub max_refinement_rounds: Option<usize>,
    pub penalty_second: Option<i64>,
    pub show_bots: Option<bool>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# perfest configuration
# All values here can be overridden by CLI flags.

# Seed of the bot simulation. Same seed, same contest: same performances.
# seed = 27431043160368498

# Bots to simulate before refinement stops
# min_bot_pool = 400

# Upper bound on refinement rounds
# max_refinement_rounds = 400

# Penalty per wrong submission in seconds; overrides the contest file
# penalty_second = 300

# Show simulated bots in the standings table
# show_bots = false
";

/// `$XDG_CONFIG_HOME/perfest/config.toml`, else `$HOME/.config/perfest/config.toml`.
/// Empty variables count as unset.
pub fn resolve_config_path(xdg_config_home: Option<&str>, home: Option<&str>) -> Option<PathBuf> {
    let base = match (xdg_config_home.filter(|v| !v.is_empty()), home.filter(|v| !v.is_empty())) {
        (Some(xdg), _) => PathBuf::from(xdg),
        (None, Some(home)) => PathBuf::from(home).join(".config"),
        (None, None) => return None,
    };
    Some(base.join("perfest").join("config.toml"))
}

pub fn config_path() -> PathBuf {
    let xdg = std::env::var("XDG_CONFIG_HOME").ok();
    let home = std::env::var("HOME").ok();
    resolve_config_path(xdg.as_deref(), home.as_deref())
        .unwrap_or_else(|| bail("Neither XDG_CONFIG_HOME nor HOME is set; pass --config"))
}

pub fn parse_config(content: &str) -> Result<PerfestConfig, toml::de::Error> {
    toml::from_str(content)
}

/// A missing file is an empty config; anything unreadable is fatal.
pub fn load_config(path: &Path) -> PerfestConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return PerfestConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    };
    parse_config(&content).unwrap_or_else(|e| bail(format!("Invalid config at {}: {e}", path.display())))
}

/// Write the commented template to `path`. Refuses to replace an existing
/// file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "config file already exists (use --force to overwrite)",
        ));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses_to_empty_config() {
        assert_eq!(parse_config(DEFAULT_CONFIG_TEMPLATE).unwrap(), PerfestConfig::default());
    }

    #[test]
    fn test_parse_all_keys() {
        let config = parse_config(
            "seed = 9\nmin_bot_pool = 120\nmax_refinement_rounds = 30\npenalty_second = 0\nshow_bots = true\n",
        )
        .unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.min_bot_pool, Some(120));
        assert_eq!(config.max_refinement_rounds, Some(30));
        assert_eq!(config.penalty_second, Some(0));
        assert_eq!(config.show_bots, Some(true));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_config("rounds = 10\n").is_err());
    }

    #[test]
    fn test_resolve_config_path() {
        assert_eq!(
            resolve_config_path(Some("/xdg"), Some("/home/u")),
            Some(PathBuf::from("/xdg/perfest/config.toml"))
        );
        assert_eq!(
            resolve_config_path(Some(""), Some("/home/u")),
            Some(PathBuf::from("/home/u/.config/perfest/config.toml"))
        );
        assert_eq!(resolve_config_path(None, None), None);
    }

    #[test]
    fn test_write_default_config_respects_force() {
        let dir = std::env::temp_dir().join(format!("perfest-config-test-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");
        let _ = std::fs::remove_dir_all(&dir);

        write_default_config(&path, false).unwrap();
        assert_eq!(load_config(&path), PerfestConfig::default());

        let err = write_default_config(&path, false).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);

        std::fs::write(&path, "seed = 3\n").unwrap();
        write_default_config(&path, true).unwrap();
        assert_eq!(load_config(&path).seed, None);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("perfest-config-that-does-not-exist.toml");
        assert_eq!(load_config(&path), PerfestConfig::default());
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::instructions;
use crate::modes::{registry, Mode, ReasoningEffort};
use crate::utils::{atomic_write, KitError};

pub const CONFIG_VERSION: &str = "1.0";

/// Languages the response-language prefix supports. English is the default
/// and carries no prefix; everything else prepends an explicit directive.
const LANGUAGE_PREFIXES: &[(&str, &str)] = &[
    ("en", ""),
    ("de", "IMPORTANT: Always respond in German (Swiss High German without \u{df}).\n\n"),
    ("fr", "IMPORTANT: Always respond in French.\n\n"),
    ("es", "IMPORTANT: Always respond in Spanish.\n\n"),
    ("it", "IMPORTANT: Always respond in Italian.\n\n"),
    ("pt", "IMPORTANT: Always respond in Portuguese.\n\n"),
    ("nl", "IMPORTANT: Always respond in Dutch.\n\n"),
];

/// Map a configured language code to its response-language directive.
/// Unknown codes are surfaced, never silently defaulted, so a typo in the
/// config file is visible instead of quietly producing English replies.
pub fn language_prefix(code: &str) -> Result<&'static str, KitError> {
    let lower = code.to_ascii_lowercase();
    LANGUAGE_PREFIXES
        .iter()
        .find(|(c, _)| *c == lower)
        .map(|(_, prefix)| *prefix)
        .ok_or(KitError::UnsupportedLanguage(code.to_string()))
}

/// Per-mode user overrides as they appear in the config file. Every field
/// is optional; missing fields fall back to the registry defaults. Fields
/// are kept loosely typed where a bad value should degrade to the default
/// with a warning instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
}

/// The persisted configuration document. Unknown top-level keys are carried
/// in `extra` so a round trip through an older kiterm never drops fields a
/// newer version wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub modes: BTreeMap<String, ModeOverrides>,
    #[serde(default = "default_security_domains")]
    pub security_domains: Vec<String>,
    // Field name preserved from the historical on-disk format.
    #[serde(rename = "securityNewsPromt", default, skip_serializing_if = "Option::is_none")]
    pub security_news_prompt: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_security_domains() -> Vec<String> {
    registry::DEFAULT_SECURITY_DOMAINS
        .iter()
        .map(|d| d.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            language: default_language(),
            modes: BTreeMap::new(),
            security_domains: default_security_domains(),
            security_news_prompt: None,
            extra: BTreeMap::new(),
        }
    }
}

/// A fully resolved parameter set for one invocation of a mode. Every field
/// is populated; resolution never fails for a known mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeConfig {
    pub mode: Mode,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub reasoning_effort: ReasoningEffort,
}

impl Config {
    /// Three-layer merge: registry defaults, persisted overrides, then an
    /// optional invocation-time override. Out-of-range persisted values are
    /// rejected here with a warning rather than propagated.
    pub fn resolve_mode(&self, mode: Mode, invocation: Option<&ModeOverrides>) -> ModeConfig {
        let def = registry::definition(mode);
        let mut resolved = ModeConfig {
            mode,
            model: def.default_model.to_string(),
            temperature: def.default_temperature,
            max_tokens: def.default_max_tokens,
            reasoning_effort: def.default_reasoning_effort,
        };
        if let Some(persisted) = self.modes.get(mode.as_str()) {
            apply_overrides(&mut resolved, persisted);
        }
        if let Some(explicit) = invocation {
            apply_overrides(&mut resolved, explicit);
        }
        resolved
    }

    /// The effective security-news task prompt: user override or built-in.
    pub fn security_news_prompt(&self) -> &str {
        self.security_news_prompt
            .as_deref()
            .unwrap_or(registry::DEFAULT_SECURITY_NEWS_PROMPT)
    }
}

fn apply_overrides(resolved: &mut ModeConfig, overrides: &ModeOverrides) {
    if let Some(model) = &overrides.model {
        if model.trim().is_empty() {
            warn!(mode = %resolved.mode, "ignoring empty model override");
        } else {
            resolved.model = model.clone();
        }
    }
    if let Some(temperature) = overrides.temperature {
        if (0.0..=2.0).contains(&temperature) {
            resolved.temperature = temperature;
        } else {
            warn!(mode = %resolved.mode, temperature, "ignoring out-of-range temperature override");
        }
    }
    if let Some(max_tokens) = overrides.max_tokens {
        match u32::try_from(max_tokens) {
            Ok(n) if n > 0 => resolved.max_tokens = n,
            _ => warn!(mode = %resolved.mode, max_tokens, "ignoring non-positive max_tokens override"),
        }
    }
    if let Some(effort) = &overrides.reasoning_effort {
        match ReasoningEffort::from_str(effort) {
            Ok(parsed) => resolved.reasoning_effort = parsed,
            Err(()) => warn!(mode = %resolved.mode, effort, "ignoring unknown reasoning_effort override"),
        }
    }
}

/// Loads, merges, and persists the configuration document and the per-mode
/// instruction files. All paths live under one config directory
/// (`~/.config/kiterm` or the platform equivalent).
pub struct ConfigStore {
    config_dir: PathBuf,
    instructions_dir: PathBuf,
}

impl ConfigStore {
    /// Open the store at the user's config directory, creating it if absent.
    pub fn open() -> Result<Self, KitError> {
        Self::at(default_config_dir()?)
    }

    /// Open the store at an explicit directory. Used by tests and by the
    /// default path above.
    pub fn at(config_dir: PathBuf) -> Result<Self, KitError> {
        let instructions_dir = config_dir.join("instructions");
        fs::create_dir_all(&instructions_dir)?;
        Ok(Self {
            config_dir,
            instructions_dir,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the (possibly not yet seeded) instruction file for a mode.
    pub fn instruction_path(&self, mode: Mode) -> PathBuf {
        self.instructions_dir
            .join(registry::definition(mode).instruction_file)
    }

    /// Load the persisted document. A missing file yields defaults (and
    /// seeds the file); a malformed file is `ConfigCorrupt`.
    pub fn load(&self) -> Result<Config, KitError> {
        let path = self.config_path();
        if !path.exists() {
            let config = Config::default();
            self.save(&config)?;
            return Ok(config);
        }
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|e| KitError::ConfigCorrupt(e.to_string()))
    }

    /// Load with the recovery policy: on corruption, back up the bad file to
    /// `config.json.bak` and fall back to defaults rather than abort.
    pub fn load_or_recover(&self) -> Result<Config, KitError> {
        match self.load() {
            Ok(config) => Ok(config),
            Err(KitError::ConfigCorrupt(detail)) => {
                let path = self.config_path();
                let backup = path.with_extension("json.bak");
                warn!(%detail, backup = %backup.display(), "config file corrupt, backing up and using defaults");
                fs::rename(&path, &backup).map_err(KitError::ConfigWrite)?;
                let config = Config::default();
                self.save(&config)?;
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// Persist the document atomically. A crash mid-save never leaves a
    /// half-written config behind.
    pub fn save(&self, config: &Config) -> Result<(), KitError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| KitError::ConfigCorrupt(e.to_string()))?;
        atomic_write(&self.config_path(), json.as_bytes()).map_err(KitError::ConfigWrite)
    }

    /// Overwrite the persisted document with registry-derived defaults and
    /// re-seed missing instruction files. Idempotent.
    pub fn reset_to_defaults(&self) -> Result<Config, KitError> {
        let config = Config::default();
        self.save(&config)?;
        self.seed_instructions()?;
        Ok(config)
    }

    /// Create any missing instruction files from the built-in defaults.
    /// Existing (possibly user-edited) files are left untouched.
    pub fn seed_instructions(&self) -> Result<(), KitError> {
        for def in registry::all() {
            let path = self.instruction_path(def.mode);
            if !path.exists() {
                atomic_write(&path, instructions::default_text(def.mode).as_bytes())
                    .map_err(KitError::ConfigWrite)?;
            }
        }
        Ok(())
    }

    /// Effective instruction text for a mode: the user's file if present,
    /// else the built-in default (seeded to disk for future edits).
    /// `MissingInstructions` is a defensive invariant check; with a complete
    /// registry it is unreachable.
    pub fn resolve_instructions(&self, mode: Mode) -> Result<String, KitError> {
        let path = self.instruction_path(mode);
        if path.exists() {
            return fs::read_to_string(&path).map_err(KitError::Io);
        }
        let builtin = instructions::default_text(mode);
        if builtin.trim().is_empty() {
            return Err(KitError::MissingInstructions(mode));
        }
        if let Err(e) = atomic_write(&path, builtin.as_bytes()) {
            warn!(mode = %mode, error = %e, "could not seed instruction file");
        }
        Ok(builtin.to_string())
    }
}

fn default_config_dir() -> Result<PathBuf, KitError> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "kiterm") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }
    // Fallback for environments without a resolvable home profile
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| {
            KitError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine home directory",
            ))
        })?;
    Ok(PathBuf::from(home).join(".config").join("kiterm"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("kiterm")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_resolve_mode_fully_populated_with_empty_config() {
        let config = Config::default();
        for def in registry::all() {
            let resolved = config.resolve_mode(def.mode, None);
            assert_eq!(resolved.model, def.default_model);
            assert_eq!(resolved.temperature, def.default_temperature);
            assert_eq!(resolved.max_tokens, def.default_max_tokens);
            assert_eq!(resolved.reasoning_effort, def.default_reasoning_effort);
        }
    }

    #[test]
    fn test_persisted_overrides_win_over_defaults() {
        let mut config = Config::default();
        config.modes.insert(
            "codex".to_string(),
            ModeOverrides {
                model: Some("gpt-5.2-codex".to_string()),
                temperature: Some(0.2),
                max_tokens: Some(4000),
                reasoning_effort: Some("high".to_string()),
            },
        );
        let resolved = config.resolve_mode(Mode::Codex, None);
        assert_eq!(resolved.model, "gpt-5.2-codex");
        assert_eq!(resolved.temperature, 0.2);
        assert_eq!(resolved.max_tokens, 4000);
        assert_eq!(resolved.reasoning_effort, ReasoningEffort::High);
    }

    #[test]
    fn test_invocation_override_wins_over_persisted() {
        let mut config = Config::default();
        config.modes.insert(
            "normal".to_string(),
            ModeOverrides {
                model: Some("persisted".to_string()),
                ..Default::default()
            },
        );
        let invocation = ModeOverrides {
            model: Some("explicit".to_string()),
            ..Default::default()
        };
        let resolved = config.resolve_mode(Mode::Normal, Some(&invocation));
        assert_eq!(resolved.model, "explicit");
    }

    #[test]
    fn test_out_of_range_values_fall_back_to_defaults() {
        let mut config = Config::default();
        config.modes.insert(
            "normal".to_string(),
            ModeOverrides {
                model: None,
                temperature: Some(7.5),
                max_tokens: Some(-100),
                reasoning_effort: Some("frantic".to_string()),
            },
        );
        let resolved = config.resolve_mode(Mode::Normal, None);
        let def = registry::definition(Mode::Normal);
        assert_eq!(resolved.temperature, def.default_temperature);
        assert_eq!(resolved.max_tokens, def.default_max_tokens);
        assert_eq!(resolved.reasoning_effort, def.default_reasoning_effort);
    }

    #[test]
    fn test_save_load_round_trip_is_idempotent() {
        let (_dir, store) = store();
        let mut config = Config::default();
        config.language = "de".to_string();
        config.modes.insert(
            "translate".to_string(),
            ModeOverrides {
                max_tokens: Some(2000),
                ..Default::default()
            },
        );
        store.save(&config).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, config);
        for def in registry::all() {
            assert_eq!(
                loaded.resolve_mode(def.mode, None),
                config.resolve_mode(def.mode, None)
            );
        }
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let (_dir, store) = store();
        let raw = r#"{"language": "fr", "futureFeature": {"enabled": true}}"#;
        fs::write(store.config_path(), raw).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.language, "fr");
        assert!(loaded.extra.contains_key("futureFeature"));

        store.save(&loaded).unwrap();
        let again = store.load().unwrap();
        assert_eq!(again.extra["futureFeature"]["enabled"], true);
    }

    #[test]
    fn test_missing_file_seeds_defaults() {
        let (_dir, store) = store();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, Config::default());
        assert!(store.config_path().exists());
    }

    #[test]
    fn test_corrupt_file_reported_and_recovered() {
        let (_dir, store) = store();
        fs::write(store.config_path(), "{not json").unwrap();

        match store.load() {
            Err(KitError::ConfigCorrupt(_)) => {}
            other => panic!("expected ConfigCorrupt, got {:?}", other.map(|_| ())),
        }

        let recovered = store.load_or_recover().unwrap();
        assert_eq!(recovered, Config::default());
        assert!(store.config_path().with_extension("json.bak").exists());
    }

    #[test]
    fn test_reset_to_defaults_restores_registry_values() {
        let (_dir, store) = store();
        let mut config = Config::default();
        config.modes.insert(
            "normal".to_string(),
            ModeOverrides {
                model: Some("something-else".to_string()),
                ..Default::default()
            },
        );
        store.save(&config).unwrap();

        let reset = store.reset_to_defaults().unwrap();
        for def in registry::all() {
            let resolved = reset.resolve_mode(def.mode, None);
            assert_eq!(resolved.model, def.default_model);
        }
        // Idempotent
        assert_eq!(store.reset_to_defaults().unwrap(), reset);
    }

    #[test]
    fn test_resolve_instructions_prefers_user_file() {
        let (_dir, store) = store();
        fs::write(store.instruction_path(Mode::Mail), "my own mail rules").unwrap();
        assert_eq!(
            store.resolve_instructions(Mode::Mail).unwrap(),
            "my own mail rules"
        );
        // Unedited mode falls back to the built-in and seeds it
        let text = store.resolve_instructions(Mode::Translate).unwrap();
        assert!(text.contains("Translate"));
        assert!(store.instruction_path(Mode::Translate).exists());
    }

    #[test]
    fn test_language_prefix() {
        assert_eq!(language_prefix("en").unwrap(), "");
        assert!(language_prefix("de").unwrap().contains("German"));
        assert!(language_prefix("FR").unwrap().contains("French"));
        match language_prefix("tlh") {
            Err(KitError::UnsupportedLanguage(code)) => assert_eq!(code, "tlh"),
            other => panic!("expected UnsupportedLanguage, got {:?}", other),
        }
    }

    #[test]
    fn test_security_news_prompt_override() {
        let mut config = Config::default();
        assert_eq!(
            config.security_news_prompt(),
            registry::DEFAULT_SECURITY_NEWS_PROMPT
        );
        config.security_news_prompt = Some("only kernel CVEs".to_string());
        assert_eq!(config.security_news_prompt(), "only kernel CVEs");
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::KitError;

/// The fixed set of chat modes. Every other part of the program refers to
/// modes through this enum; the string forms below are the CLI spelling and
/// the on-disk directory/key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Codex,
    Websearch,
    Security,
    Mail,
    Translate,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Codex => "codex",
            Mode::Websearch => "websearch",
            Mode::Security => "security",
            Mode::Mail => "mail",
            Mode::Translate => "translate",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "codex" => Ok(Mode::Codex),
            "websearch" => Ok(Mode::Websearch),
            "security" => Ok(Mode::Security),
            "mail" => Ok(Mode::Mail),
            "translate" => Ok(Mode::Translate),
            other => Err(KitError::UnknownMode(other.to_string())),
        }
    }
}

/// Reasoning effort requested from the model. `None` omits the reasoning
/// block from the request entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    None,
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::None => "none",
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl FromStr for ReasoningEffort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ReasoningEffort::None),
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            _ => Err(()),
        }
    }
}

/// Static definition of one mode: its built-in defaults and provider wiring.
/// These are the values every configuration merge falls back on.
#[derive(Debug, Clone, Copy)]
pub struct ModeDefinition {
    pub mode: Mode,
    pub default_model: &'static str,
    pub default_temperature: f64,
    pub default_max_tokens: u32,
    pub default_reasoning_effort: ReasoningEffort,
    /// Filename under `<config>/instructions/`
    pub instruction_file: &'static str,
    /// Whether requests for this mode attach the web-search tool
    pub web_search: bool,
}

/// Built-in whitelist of hostnames the security mode's web search is
/// restricted to. Users override this via `security_domains` in the config.
pub const DEFAULT_SECURITY_DOMAINS: &[&str] = &[
    "msrc.microsoft.com",
    "learn.microsoft.com",
    "support.microsoft.com",
    "techcommunity.microsoft.com",
    "cloudblogs.microsoft.com",
    "nvd.nist.gov",
    "cisa.gov",
    "bleepingcomputer.com",
    "qualys.com",
    "threatprotect.qualys.com",
];

/// Default task prompt for the security mode, overridable via
/// `securityNewsPromt` in the config file.
pub const DEFAULT_SECURITY_NEWS_PROMPT: &str = "Research the following topics: \
Exchange on-premises zero days, Windows 11 from 23H2, Office 365, \
Entra ID, Intune, Teams, SharePoint. Always security.";

static MODES: &[ModeDefinition] = &[
    ModeDefinition {
        mode: Mode::Normal,
        default_model: "gpt-5.1",
        default_temperature: 0.7,
        default_max_tokens: 1000,
        default_reasoning_effort: ReasoningEffort::None,
        instruction_file: "normalchat.txt",
        web_search: false,
    },
    ModeDefinition {
        mode: Mode::Codex,
        default_model: "gpt-5.1-codex",
        default_temperature: 0.7,
        default_max_tokens: 1000,
        default_reasoning_effort: ReasoningEffort::Low,
        instruction_file: "codex.txt",
        web_search: false,
    },
    ModeDefinition {
        mode: Mode::Websearch,
        default_model: "gpt-5.1",
        default_temperature: 0.7,
        default_max_tokens: 1000,
        default_reasoning_effort: ReasoningEffort::Low,
        instruction_file: "websearch.txt",
        web_search: true,
    },
    ModeDefinition {
        mode: Mode::Security,
        default_model: "gpt-5.1",
        default_temperature: 0.7,
        default_max_tokens: 1000,
        default_reasoning_effort: ReasoningEffort::Medium,
        instruction_file: "securitynews.txt",
        web_search: true,
    },
    ModeDefinition {
        mode: Mode::Mail,
        default_model: "gpt-5.1",
        default_temperature: 0.7,
        default_max_tokens: 1000,
        default_reasoning_effort: ReasoningEffort::None,
        instruction_file: "email.txt",
        web_search: false,
    },
    ModeDefinition {
        mode: Mode::Translate,
        default_model: "gpt-5.1",
        default_temperature: 0.7,
        default_max_tokens: 1000,
        default_reasoning_effort: ReasoningEffort::None,
        instruction_file: "translate.txt",
        web_search: false,
    },
];

/// Look up a mode definition by its CLI identifier.
pub fn get(identifier: &str) -> Result<&'static ModeDefinition, KitError> {
    let mode = Mode::from_str(identifier)?;
    Ok(definition(mode))
}

/// Look up the definition for an already-validated mode. Infallible: the
/// table below covers every `Mode` variant.
pub fn definition(mode: Mode) -> &'static ModeDefinition {
    MODES
        .iter()
        .find(|d| d.mode == mode)
        .expect("registry covers every mode variant")
}

/// All known mode definitions, for listing and setup UIs.
pub fn all() -> &'static [ModeDefinition] {
    MODES
}

use clap::Parser;

/// CLI surface. Every mode flag maps to a single session invocation with a
/// resolved mode identifier, a resume flag, and optional literal input.
#[derive(Parser, Debug)]
#[command(name = "kit")]
#[command(version)]
#[command(about = "AI-powered CLI assistant with multiple modes for chat, coding, translation, and more")]
#[command(after_help = "\
Examples:
  kit                      Start normal chat mode
  kit -c                   Start the Codex programming assistant
  kit -c \"explain this\"    Ask Codex a quick question
  kit -w                   Start web search mode
  kit -m                   Proofread email text from the clipboard
  kit -t \"Hello World\"     Translate text
  kit -r -w                Resume a previous web search chat
  kit --setup              Open the configuration file
  kit -e codex             Edit the instructions for codex mode

Instruction files live in the 'instructions' directory next to the
configuration file. OPENAI_API_KEY must be set to use this tool.")]
pub struct Cli {
    /// Codex programming assistant (interactive, or a quick question)
    #[arg(short, long, value_name = "TEXT", num_args = 0..=1, group = "mode")]
    pub codex: Option<Option<String>>,

    /// Search the internet using web search
    #[arg(short, long, group = "mode")]
    pub websearch: bool,

    /// Get the latest IT security news (domain whitelist from config)
    #[arg(long = "security-news", group = "mode")]
    pub security_news: bool,

    /// Translate text (from clipboard or provided TEXT)
    #[arg(short, long, value_name = "TEXT", num_args = 0..=1, group = "mode")]
    pub translate: Option<Option<String>>,

    /// Proofread and correct email text (from clipboard or provided TEXT)
    #[arg(short, long, value_name = "TEXT", num_args = 0..=1, group = "mode")]
    pub mail: Option<Option<String>>,

    /// Resume a previous chat (normal, websearch, and codex modes)
    #[arg(short, long)]
    pub resume: bool,

    /// Open the configuration file with the default editor
    #[arg(short, long, group = "mode")]
    pub setup: bool,

    /// Reset the configuration file to default settings
    #[arg(short, long, group = "mode")]
    pub init: bool,

    /// Edit the instruction file for a mode
    #[arg(short = 'e', long, value_name = "MODE", group = "mode")]
    pub edit_instructions: Option<String>,

    /// Verbose logging
    #[arg(long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_flags_are_exclusive() {
        assert!(Cli::try_parse_from(["kit", "-c", "-w"]).is_err());
        assert!(Cli::try_parse_from(["kit", "--setup", "--init"]).is_err());
    }

    #[test]
    fn test_optional_inline_text() {
        let cli = Cli::try_parse_from(["kit", "-t", "Hello World"]).unwrap();
        assert_eq!(cli.translate, Some(Some("Hello World".to_string())));

        let cli = Cli::try_parse_from(["kit", "-t"]).unwrap();
        assert_eq!(cli.translate, Some(None));

        let cli = Cli::try_parse_from(["kit"]).unwrap();
        assert_eq!(cli.translate, None);
    }

    #[test]
    fn test_resume_combines_with_mode_flags() {
        let cli = Cli::try_parse_from(["kit", "-r", "-w"]).unwrap();
        assert!(cli.resume);
        assert!(cli.websearch);
    }
}

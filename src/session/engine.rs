use tracing::debug;

use crate::app::{language_prefix, Config, ConfigStore, ModeConfig};
use crate::app::instructions;
use crate::models::types::{ChatRequest, WebSearchOptions};
use crate::models::ChatProvider;
use crate::modes::{registry, Mode};
use crate::session::history::HistoryStore;
use crate::session::selector::{InteractiveMenu, MenuChoice};
use crate::session::transcript::{Transcript, Turn};
use crate::utils::{ClipboardSource, KitError};

/// One resolved, running conversation: the mode's merged parameters, the
/// assembled system directive, and the transcript turns accumulate into.
pub struct Session {
    pub mode: Mode,
    pub params: ModeConfig,
    pub directive: String,
    pub transcript: Transcript,
    pub resumed: bool,
}

/// Orchestrates one invocation. Each phase can fail; nothing is committed
/// to history until the provider call has succeeded, so a failed or
/// interrupted turn leaves the transcript exactly as it was.
pub struct SessionEngine<'a> {
    store: &'a ConfigStore,
    config: &'a Config,
    history: &'a HistoryStore,
    provider: &'a dyn ChatProvider,
}

impl<'a> SessionEngine<'a> {
    pub fn new(
        store: &'a ConfigStore,
        config: &'a Config,
        history: &'a HistoryStore,
        provider: &'a dyn ChatProvider,
    ) -> Self {
        Self {
            store,
            config,
            history,
            provider,
        }
    }

    /// Validate the requested mode, assemble its system directive, and
    /// resolve the transcript to use: a freshly created one, or, when
    /// resume is requested, one chosen from the mode's saved history.
    ///
    /// Resume with no saved history is `NoHistoryAvailable`; no transcript
    /// file is created in that case.
    pub fn start(
        &self,
        mode_identifier: &str,
        resume: bool,
        menu: &dyn InteractiveMenu,
    ) -> Result<Session, KitError> {
        let definition = registry::get(mode_identifier)?;
        let mode = definition.mode;
        debug!(%mode, resume, "mode selected");

        let params = self.config.resolve_mode(mode, None);
        let directive = self.build_directive(mode)?;

        let (transcript, resumed) = if resume {
            let summaries = self.history.list(mode)?;
            if summaries.is_empty() {
                return Err(KitError::NoHistoryAvailable(mode));
            }
            match menu.select(&summaries)? {
                MenuChoice::Resume(id) => (self.history.load(mode, &id)?, true),
                MenuChoice::StartNew => (self.history.create(mode), false),
            }
        } else {
            (self.history.create(mode), false)
        };
        debug!(%mode, id = %transcript.id, resumed, "transcript resolved");

        Ok(Session {
            mode,
            params,
            directive,
            transcript,
            resumed,
        })
    }

    /// Run one request/response exchange: resolve the user content (literal
    /// argument, else clipboard), call the provider, and on success commit
    /// the user turn followed by the assistant turn. Provider failure
    /// commits nothing and is surfaced verbatim; there is no retry here.
    pub async fn run_turn(
        &self,
        session: &mut Session,
        input: Option<String>,
        clipboard: &dyn ClipboardSource,
    ) -> Result<String, KitError> {
        let user_content = match input {
            Some(text) if !text.trim().is_empty() => text,
            _ => clipboard.read()?,
        };
        if user_content.trim().is_empty() {
            return Err(KitError::EmptyInput);
        }

        let definition = registry::definition(session.mode);
        let web_search = definition.web_search.then(|| WebSearchOptions {
            allowed_domains: (session.mode == Mode::Security)
                .then(|| self.config.security_domains.clone()),
        });

        let request = ChatRequest {
            model: session.params.model.clone(),
            system_directive: session.directive.clone(),
            prior_turns: session.transcript.turns.clone(),
            user_content: user_content.clone(),
            temperature: session.params.temperature,
            max_tokens: session.params.max_tokens,
            reasoning_effort: session.params.reasoning_effort,
            web_search,
        };

        debug!(mode = %session.mode, turns = request.prior_turns.len(), "awaiting provider");
        let reply = self.provider.send(request).await?;

        self.history
            .append(&mut session.transcript, Turn::user(user_content))?;
        self.history
            .append(&mut session.transcript, Turn::assistant(reply.clone()))?;
        debug!(mode = %session.mode, id = %session.transcript.id, "turn committed");

        Ok(reply)
    }

    /// The system-level directive: language prefix, then the mode's
    /// instruction text. Codex gets its host placeholders filled; the
    /// security mode additionally carries its domain whitelist and task
    /// prompt.
    fn build_directive(&self, mode: Mode) -> Result<String, KitError> {
        let prefix = language_prefix(&self.config.language)?;
        let mut text = self.store.resolve_instructions(mode)?;
        if mode == Mode::Codex {
            text = instructions::fill_platform_placeholders(&text);
        }

        let mut directive = format!("{}{}", prefix, text);
        if mode == Mode::Security {
            directive.push_str("\n\nRestrict research to these domains:\n");
            for domain in &self.config.security_domains {
                directive.push_str(&format!("- {}\n", domain));
            }
            directive.push_str("\nTask:\n");
            directive.push_str(self.config.security_news_prompt());
        }
        Ok(directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ConfigStore;
    use crate::models::traits::MockChatProvider;
    use crate::session::selector::{InteractiveMenu, MenuChoice};
    use crate::session::transcript::{Role, TranscriptSummary};
    use crate::utils::{ClipboardSource, ProviderError};

    struct StaticClipboard(&'static str);

    impl ClipboardSource for StaticClipboard {
        fn read(&self) -> Result<String, KitError> {
            Ok(self.0.to_string())
        }
        fn write(&self, _text: &str) -> Result<(), KitError> {
            Ok(())
        }
    }

    struct PickNewest;

    impl InteractiveMenu for PickNewest {
        fn select(&self, summaries: &[TranscriptSummary]) -> Result<MenuChoice, KitError> {
            Ok(MenuChoice::Resume(summaries[0].id.clone()))
        }
    }

    struct NeverShown;

    impl InteractiveMenu for NeverShown {
        fn select(&self, _summaries: &[TranscriptSummary]) -> Result<MenuChoice, KitError> {
            panic!("menu must not be shown");
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: ConfigStore,
        config: Config,
        history: HistoryStore,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config")).unwrap();
        let history = HistoryStore::new(dir.path().join("chats"));
        Fixture {
            _dir: dir,
            store,
            config: Config::default(),
            history,
        }
    }

    #[tokio::test]
    async fn test_translate_clipboard_scenario() {
        let mut fx = fixture();
        fx.config.language = "de".to_string();
        let provider = {
            let mut mock = MockChatProvider::new();
            mock.expect_send()
                .withf(|req| {
                    req.system_directive.contains("German")
                        && req.system_directive.contains("Translate")
                        && req.user_content == "Hello, how are you?"
                        && req.prior_turns.is_empty()
                        && req.web_search.is_none()
                })
                .times(1)
                .returning(|_| Ok("Hallo, wie geht es dir?".to_string()));
            mock
        };

        let engine = SessionEngine::new(&fx.store, &fx.config, &fx.history, &provider);
        let mut session = engine.start("translate", false, &NeverShown).unwrap();
        let reply = engine
            .run_turn(&mut session, None, &StaticClipboard("Hello, how are you?"))
            .await
            .unwrap();

        assert_eq!(reply, "Hallo, wie geht es dir?");
        assert_eq!(session.transcript.turns.len(), 2);
        assert_eq!(session.transcript.turns[0].role, Role::User);
        assert_eq!(session.transcript.turns[1].role, Role::Assistant);

        let listed = fx.history.list(Mode::Translate).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].turn_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_mode_fails_before_anything_else() {
        let fx = fixture();
        let provider = MockChatProvider::new();
        let engine = SessionEngine::new(&fx.store, &fx.config, &fx.history, &provider);
        assert!(matches!(
            engine.start("poetry", false, &NeverShown),
            Err(KitError::UnknownMode(_))
        ));
    }

    #[tokio::test]
    async fn test_resume_with_no_history_is_reported_and_creates_nothing() {
        let fx = fixture();
        let provider = MockChatProvider::new();
        let engine = SessionEngine::new(&fx.store, &fx.config, &fx.history, &provider);

        match engine.start("codex", true, &NeverShown) {
            Err(KitError::NoHistoryAvailable(mode)) => assert_eq!(mode, Mode::Codex),
            other => panic!("expected NoHistoryAvailable, got {:?}", other.map(|_| ())),
        }
        assert!(fx.history.list(Mode::Codex).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_commits_nothing() {
        let fx = fixture();
        let provider = {
            let mut mock = MockChatProvider::new();
            mock.expect_send()
                .times(1)
                .returning(|_| Err(ProviderError::RateLimited("slow down".to_string())));
            mock
        };
        let engine = SessionEngine::new(&fx.store, &fx.config, &fx.history, &provider);
        let mut session = engine.start("normal", false, &NeverShown).unwrap();

        let result = engine
            .run_turn(&mut session, Some("hi".to_string()), &StaticClipboard(""))
            .await;
        assert!(matches!(
            result,
            Err(KitError::Provider(ProviderError::RateLimited(_)))
        ));
        assert!(session.transcript.turns.is_empty());
        assert!(fx.history.list(Mode::Normal).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_fails_before_provider_call() {
        let fx = fixture();
        let provider = MockChatProvider::new(); // send never expected
        let engine = SessionEngine::new(&fx.store, &fx.config, &fx.history, &provider);
        let mut session = engine.start("normal", false, &NeverShown).unwrap();

        let result = engine
            .run_turn(&mut session, Some("   ".to_string()), &StaticClipboard("  "))
            .await;
        assert!(matches!(result, Err(KitError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_resume_carries_prior_turns_into_request() {
        let fx = fixture();
        let mut seed = fx.history.create(Mode::Normal);
        fx.history.append(&mut seed, Turn::user("first question")).unwrap();
        fx.history.append(&mut seed, Turn::assistant("first answer")).unwrap();

        let provider = {
            let mut mock = MockChatProvider::new();
            mock.expect_send()
                .withf(|req| {
                    req.prior_turns.len() == 2
                        && req.prior_turns[0].content == "first question"
                        && req.user_content == "second question"
                })
                .times(1)
                .returning(|_| Ok("second answer".to_string()));
            mock
        };
        let engine = SessionEngine::new(&fx.store, &fx.config, &fx.history, &provider);
        let mut session = engine.start("normal", true, &PickNewest).unwrap();
        assert!(session.resumed);
        assert_eq!(session.transcript.id, seed.id);

        engine
            .run_turn(&mut session, Some("second question".to_string()), &StaticClipboard(""))
            .await
            .unwrap();

        let loaded = fx.history.load(Mode::Normal, &seed.id).unwrap();
        assert_eq!(loaded.turns.len(), 4);
    }

    #[tokio::test]
    async fn test_security_directive_carries_domains_and_task_prompt() {
        let mut fx = fixture();
        fx.config.security_domains = vec!["cisa.gov".to_string(), "nvd.nist.gov".to_string()];
        fx.config.security_news_prompt = Some("Only kernel CVEs.".to_string());

        let provider = {
            let mut mock = MockChatProvider::new();
            mock.expect_send()
                .withf(|req| {
                    req.system_directive.contains("- cisa.gov")
                        && req.system_directive.contains("Only kernel CVEs.")
                        && req
                            .web_search
                            .as_ref()
                            .and_then(|w| w.allowed_domains.as_ref())
                            .map(|d| d.contains(&"cisa.gov".to_string()))
                            == Some(true)
                })
                .times(1)
                .returning(|_| Ok("No critical news in the last 10 days.".to_string()));
            mock
        };
        let engine = SessionEngine::new(&fx.store, &fx.config, &fx.history, &provider);
        let mut session = engine.start("security", false, &NeverShown).unwrap();
        engine
            .run_turn(
                &mut session,
                Some("What is the latest security news?".to_string()),
                &StaticClipboard(""),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unsupported_language_is_surfaced() {
        let mut fx = fixture();
        fx.config.language = "xx".to_string();
        let provider = MockChatProvider::new();
        let engine = SessionEngine::new(&fx.store, &fx.config, &fx.history, &provider);
        assert!(matches!(
            engine.start("normal", false, &NeverShown),
            Err(KitError::UnsupportedLanguage(_))
        ));
    }
}

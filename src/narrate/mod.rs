//! Language-model narration of a [`MetricsReport`].
//!
//! ```text
//!   MetricsReport ──> prompt ──> SummaryCache? ──hit──> text
//!                                     │ miss
//!                                     ▼
//!                          ChatBackend (with retries)
//!                                     │ failure
//!                                     ▼
//!                        last good summary, if any
//! ```

pub mod cache;
pub mod client;
pub mod prompt;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use cache::{content_hash, key_fingerprint, SummaryCache};
pub use client::{ChatBackend, ChatMessage, HttpBackend};

use crate::config::Settings;
use crate::error::NarrateError;
use crate::metrics::MetricsReport;

/// Where a summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    Fresh,
    Cached,
    /// A previous success for the same metrics, served after a failure.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub text: String,
    pub source: SummarySource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    pub summary_text: String,
    pub key_points: Vec<String>,
    pub caveats: Vec<String>,
}

impl StructuredSummary {
    /// Parse a model reply, wrapping free text when it is not the expected JSON.
    pub fn from_reply(reply: &str, uses_proxy: bool) -> Self {
        let body = strip_code_fence(reply);
        match serde_json::from_str::<StructuredSummary>(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::debug!("structured reply is not JSON ({e}); wrapping text");
                let caveats = if uses_proxy {
                    vec![prompt::PROXY_CAVEAT.to_string()]
                } else {
                    Vec::new()
                };
                Self {
                    summary_text: reply.trim().to_string(),
                    key_points: Vec::new(),
                    caveats,
                }
            }
        }
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub struct Narrator<B: ChatBackend> {
    backend: B,
    cache: SummaryCache,
    max_attempts: u32,
    backoff: Duration,
}

impl<B: ChatBackend> Narrator<B> {
    pub fn new(backend: B, cache: SummaryCache, max_attempts: u32) -> Self {
        Self {
            backend,
            cache,
            max_attempts: max_attempts.max(1),
            backoff: Duration::from_secs(2),
        }
    }

    /// Base back-off; attempt `k` (1-based) waits `k` times this long.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Markdown summary of the report, served from cache when possible.
    pub fn summarize(&mut self, report: &MetricsReport) -> Result<Summary, NarrateError> {
        let hash = content_hash(&prompt::normalized_json(report));
        self.cached_or_fetch(&hash, || prompt::summary_messages(report))
    }

    pub fn summarize_structured(
        &mut self,
        report: &MetricsReport,
    ) -> Result<StructuredSummary, NarrateError> {
        let payload = format!("structured\n{}", prompt::normalized_json(report));
        let hash = content_hash(&payload);
        let summary = self.cached_or_fetch(&hash, || prompt::structured_messages(report))?;
        Ok(StructuredSummary::from_reply(&summary.text, report.uses_sugar_proxy()))
    }

    /// Answer a free-form question from the report alone. Never cached.
    pub fn answer(&self, report: &MetricsReport, question: &str) -> Result<String, NarrateError> {
        self.complete_with_retry(&prompt::question_messages(report, question))
    }

    fn cached_or_fetch(
        &mut self,
        hash: &str,
        messages: impl FnOnce() -> Vec<ChatMessage>,
    ) -> Result<Summary, NarrateError> {
        if let Some(text) = self.cache.get(hash) {
            log::info!("summary cache hit");
            return Ok(Summary {
                text: text.to_string(),
                source: SummarySource::Cached,
            });
        }

        match self.complete_with_retry(&messages()) {
            Ok(text) => {
                if let Err(e) = self.cache.insert(hash, &text) {
                    log::warn!("{e}");
                }
                Ok(Summary {
                    text,
                    source: SummarySource::Fresh,
                })
            }
            Err(err) => match self.cache.last_good(hash) {
                Some(text) => {
                    log::warn!("narration failed ({err}); serving last good summary");
                    Ok(Summary {
                        text: text.to_string(),
                        source: SummarySource::Stale,
                    })
                }
                None => Err(err),
            },
        }
    }

    fn complete_with_retry(&self, messages: &[ChatMessage]) -> Result<String, NarrateError> {
        let mut attempt = 1;
        loop {
            match self.backend.complete(messages) {
                Ok(text) if text.trim().is_empty() => {
                    return Err(NarrateError::InvalidResponse("empty reply".into()))
                }
                Ok(text) => return Ok(text),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let wait = self.backoff * attempt;
                    log::warn!(
                        "attempt {attempt}/{} failed: {err}; retrying in {wait:?}",
                        self.max_attempts
                    );
                    std::thread::sleep(wait);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Narrator<HttpBackend> {
    /// HTTP narrator with the on-disk cache scoped to the configured key.
    pub fn from_settings(settings: &Settings) -> Result<Self, NarrateError> {
        let api_key = settings
            .api_key()
            .ok_or_else(|| NarrateError::MissingApiKey(settings.llm.api_key_env.clone()))?;
        let cache = SummaryCache::open(&settings.cache_path(), key_fingerprint(&api_key))?;
        log::debug!("summary cache holds {} entries for this key", cache.len());
        let backend = HttpBackend::new(&settings.llm, api_key)?;
        Ok(Self::new(backend, cache, settings.llm.max_attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{MenuItem, MenuTable, Nutrient};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays scripted replies and counts calls.
    struct ScriptedBackend {
        replies: RefCell<VecDeque<Result<String, NarrateError>>>,
        calls: RefCell<usize>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, NarrateError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::new(0),
            }
        }
    }

    impl ChatBackend for &ScriptedBackend {
        fn complete(&self, _messages: &[ChatMessage]) -> Result<String, NarrateError> {
            *self.calls.borrow_mut() += 1;
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(NarrateError::Transport("script exhausted".into())))
        }
    }

    fn report() -> MetricsReport {
        let drinks = MenuTable::from_items(vec![MenuItem::new("Mocha").with(Nutrient::Calories, 250.0)]);
        let food = MenuTable::from_items(vec![MenuItem::new("Bagel")
            .with(Nutrient::Calories, 280.0)
            .with(Nutrient::CarbsG, 56.0)]);
        MetricsReport::build(&drinks, &food, 5)
    }

    fn narrator(backend: &ScriptedBackend) -> Narrator<&ScriptedBackend> {
        Narrator::new(backend, SummaryCache::in_memory("fp"), 3).with_backoff(Duration::ZERO)
    }

    fn server_error() -> NarrateError {
        NarrateError::Status {
            status: 503,
            body: String::new(),
        }
    }

    #[test]
    fn retries_transient_failures() {
        let backend = ScriptedBackend::new(vec![
            Err(server_error()),
            Err(NarrateError::Transport("reset".into())),
            Ok("summary".into()),
        ]);
        let summary = narrator(&backend).summarize(&report()).unwrap();
        assert_eq!(summary.text, "summary");
        assert_eq!(summary.source, SummarySource::Fresh);
        assert_eq!(*backend.calls.borrow(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let backend = ScriptedBackend::new(vec![Err(server_error()), Err(server_error()), Err(server_error())]);
        let err = narrator(&backend).summarize(&report()).unwrap_err();
        assert!(matches!(err, NarrateError::Status { status: 503, .. }));
        assert_eq!(*backend.calls.borrow(), 3);
    }

    #[test]
    fn client_errors_are_not_retried() {
        let backend = ScriptedBackend::new(vec![Err(NarrateError::Status {
            status: 401,
            body: "bad key".into(),
        })]);
        assert!(narrator(&backend).summarize(&report()).is_err());
        assert_eq!(*backend.calls.borrow(), 1);
    }

    #[test]
    fn second_call_is_a_cache_hit() {
        let backend = ScriptedBackend::new(vec![Ok("summary".into())]);
        let mut narrator = narrator(&backend);
        narrator.summarize(&report()).unwrap();
        let again = narrator.summarize(&report()).unwrap();
        assert_eq!(again.source, SummarySource::Cached);
        assert_eq!(*backend.calls.borrow(), 1);
    }

    #[test]
    fn failure_after_key_change_serves_stale_summary() {
        let backend = ScriptedBackend::new(vec![Ok("summary".into())]);
        let mut narrator = narrator(&backend);
        narrator.summarize(&report()).unwrap();

        narrator.cache.set_fingerprint("other-key");
        let stale = narrator.summarize(&report()).unwrap();
        assert_eq!(stale.source, SummarySource::Stale);
        assert_eq!(stale.text, "summary");
    }

    #[test]
    fn empty_reply_is_an_error() {
        let backend = ScriptedBackend::new(vec![Ok("   ".into())]);
        let err = narrator(&backend).answer(&report(), "why?").unwrap_err();
        assert!(matches!(err, NarrateError::InvalidResponse(_)));
    }

    #[test]
    fn structured_reply_parses_json_or_wraps_text() {
        let json = "```json\n{\"summary_text\":\"s\",\"key_points\":[\"k\"],\"caveats\":[]}\n```";
        let parsed = StructuredSummary::from_reply(json, true);
        assert_eq!(parsed.key_points, vec!["k".to_string()]);
        assert!(parsed.caveats.is_empty());

        let wrapped = StructuredSummary::from_reply("plain words", true);
        assert_eq!(wrapped.summary_text, "plain words");
        assert_eq!(wrapped.caveats, vec![prompt::PROXY_CAVEAT.to_string()]);
    }

    #[test]
    fn structured_summary_through_narrator() {
        let backend = ScriptedBackend::new(vec![Ok("not json".into())]);
        let summary = narrator(&backend).summarize_structured(&report()).unwrap();
        assert_eq!(summary.summary_text, "not json");
        assert_eq!(summary.caveats.len(), 1);
    }
}

//! Intent Classifier
//!
//! Decides which learning style a student is asking for. The keyword
//! classifier is the baseline policy; the LLM classifier asks a model only when
//! the utterance carries no explicit signal and falls back to keywords on any
//! model failure.

use crate::{
    context::render_transcript,
    error::OrchestratorError,
    llm_client::{ChatMessage, LLMClient},
    prompts,
    state::{Turn, TurnRole},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// The pedagogical mode a student wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Simple,
    Exam,
    Unclear,
}

impl Intent {
    /// Whether a responder can be selected for this intent.
    pub fn is_selectable(self) -> bool {
        !matches!(self, Intent::Unclear)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Simple => write!(f, "simple"),
            Intent::Exam => write!(f, "exam"),
            Intent::Unclear => write!(f, "unclear"),
        }
    }
}

const SIMPLE_SIGNALS: &[&str] = &[
    "explain simply",
    "simply",
    "simple",
    "don't understand",
    "dont understand",
    "do not understand",
    "like i'm 5",
    "like im 5",
    "like i'm five",
    "like a 5 year old",
    "eli5",
    "from basics",
    "from the basics",
    "basic",
    "basics",
    "confused",
    "easy words",
    "layman",
];

const EXAM_SIGNALS: &[&str] = &[
    "exam",
    "exams",
    "marks",
    "mark",
    "16 marks",
    "university",
    "notes",
    "revision",
    "revise",
    "important questions",
    "competitive",
    "long answer",
    "detailed answer",
    "in detail",
    "in depth",
    "deep understanding",
    "semester",
    "syllabus",
];

/// Lowercases, unifies apostrophes and turns punctuation into single spaces.
fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '\'' => '\'',
            c if c.is_alphanumeric() => c,
            _ => ' ',
        })
        .collect();
    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn contains_any(padded: &str, phrases: &[&str]) -> bool {
    phrases
        .iter()
        .any(|phrase| padded.contains(&format!(" {} ", phrase)))
}

/// The explicit intent signalled by `text`, if any. Exam wins a tie.
pub fn detect_signal(text: &str) -> Option<Intent> {
    let padded = normalize(text);
    let exam = contains_any(&padded, EXAM_SIGNALS);
    let simple = contains_any(&padded, SIMPLE_SIGNALS);
    match (simple, exam) {
        (_, true) => Some(Intent::Exam),
        (true, false) => Some(Intent::Simple),
        (false, false) => None,
    }
}

fn validate(utterance: &str) -> Result<(), OrchestratorError> {
    if utterance.trim().is_empty() {
        return Err(OrchestratorError::InvalidInput(
            "utterance must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Defines the contract for deciding a turn's intent.
///
/// `recent_turns` is already bounded by the caller and may include the turn
/// being classified. `current_intent` is the intent carried by the session.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(
        &self,
        utterance: &str,
        recent_turns: &[Turn],
        current_intent: Option<Intent>,
    ) -> Result<Intent, OrchestratorError>;
}

/// Phrase-matching classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Resolves an utterance without an explicit signal: the session's intent
    /// first, then the newest signalled user turn in the window.
    fn continue_from(recent_turns: &[Turn], current_intent: Option<Intent>) -> Intent {
        if let Some(intent) = current_intent.filter(|i| i.is_selectable()) {
            return intent;
        }
        recent_turns
            .iter()
            .rev()
            .filter(|t| t.role == TurnRole::User)
            .find_map(|t| detect_signal(&t.content))
            .unwrap_or(Intent::Unclear)
    }

    pub fn classify_now(
        &self,
        utterance: &str,
        recent_turns: &[Turn],
        current_intent: Option<Intent>,
    ) -> Result<Intent, OrchestratorError> {
        validate(utterance)?;
        Ok(detect_signal(utterance)
            .unwrap_or_else(|| Self::continue_from(recent_turns, current_intent)))
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(
        &self,
        utterance: &str,
        recent_turns: &[Turn],
        current_intent: Option<Intent>,
    ) -> Result<Intent, OrchestratorError> {
        self.classify_now(utterance, recent_turns, current_intent)
    }
}

/// Classifier that consults a model for utterances without explicit signals.
pub struct LlmIntentClassifier {
    llm: Arc<dyn LLMClient>,
    template: String,
    fallback: KeywordClassifier,
}

impl LlmIntentClassifier {
    pub fn new(llm: Arc<dyn LLMClient>, template: String) -> Self {
        Self {
            llm,
            template,
            fallback: KeywordClassifier,
        }
    }

    fn parse_answer(answer: &str) -> Option<Intent> {
        let word = answer
            .split_whitespace()
            .next()?
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        match word.as_str() {
            "simple" => Some(Intent::Simple),
            "exam" => Some(Intent::Exam),
            "unclear" => Some(Intent::Unclear),
            _ => None,
        }
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(
        &self,
        utterance: &str,
        recent_turns: &[Turn],
        current_intent: Option<Intent>,
    ) -> Result<Intent, OrchestratorError> {
        validate(utterance)?;
        if let Some(intent) = detect_signal(utterance) {
            return Ok(intent);
        }
        // Without an explicit signal the session keeps its learning style.
        if let Some(intent) = current_intent.filter(|i| i.is_selectable()) {
            return Ok(intent);
        }

        let system = prompts::render(&self.template, &render_transcript(recent_turns));
        let messages = [ChatMessage::User(utterance.to_string())];
        match self.llm.generate(&system, &messages).await {
            Ok(answer) => match Self::parse_answer(&answer) {
                Some(intent) if intent.is_selectable() => {
                    debug!(%intent, "Model classified intent");
                    Ok(intent)
                }
                Some(_) => self.fallback.classify_now(utterance, recent_turns, current_intent),
                None => {
                    warn!(%answer, "Unrecognized classifier answer, using keyword policy");
                    self.fallback.classify_now(utterance, recent_turns, current_intent)
                }
            },
            Err(e) => {
                warn!(error = %e, "Intent model unavailable, using keyword policy");
                self.fallback.classify_now(utterance, recent_turns, current_intent)
            }
        }
    }
}

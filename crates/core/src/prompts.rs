//! Prompt templates used by the classifier and responders.
//!
//! Templates may contain a `{context}` placeholder that is replaced with the
//! rendered conversation transcript for each call.

use std::collections::HashMap;

pub const SIMPLE_EXPLAIN_KEY: &str = "simple_explain";
pub const EXAM_DETAILED_KEY: &str = "exam_detailed";
pub const INTENT_CLASSIFIER_KEY: &str = "intent_classifier";
pub const CLARIFYING_QUESTION_KEY: &str = "clarifying_question";

const DEFAULT_SIMPLE_EXPLAIN: &str = "\
You are a friendly, patient teacher explaining things to a complete beginner.
Use very simple language, short sentences and one everyday example.
Keep the answer under 150 words and end with an invitation to ask more.

Conversation so far:
{context}";

const DEFAULT_EXAM_DETAILED: &str = "\
You are an exam training expert helping university students write long answers.
First explain the concept in depth, then give a structured exam-ready answer with
an introduction, core principles, a main body under sub-headings with bullet
points, a described diagram where relevant, and a conclusion.
Use the search tool only when the topic needs enrichment beyond standard
textbook knowledge. Never paste retrieved text verbatim.

Conversation so far:
{context}";

const DEFAULT_INTENT_CLASSIFIER: &str = "\
Decide which learning style the student wants for their latest message.
Reply with exactly one word:
- simple: they want an easy, beginner-friendly explanation
- exam: they want exam-focused, detailed answers, notes or revision material
- unclear: the message does not say

Conversation so far:
{context}";

const DEFAULT_CLARIFYING_QUESTION: &str =
    "Would you like a simple explanation or an exam-focused detailed answer?";

/// The full set of templates, keyed like the prompt files they come from.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub simple_explain: String,
    pub exam_detailed: String,
    pub intent_classifier: String,
    pub clarifying_question: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            simple_explain: DEFAULT_SIMPLE_EXPLAIN.to_string(),
            exam_detailed: DEFAULT_EXAM_DETAILED.to_string(),
            intent_classifier: DEFAULT_INTENT_CLASSIFIER.to_string(),
            clarifying_question: DEFAULT_CLARIFYING_QUESTION.to_string(),
        }
    }
}

impl PromptSet {
    /// Builds a set from loaded templates, keeping defaults for missing keys.
    pub fn from_map(prompts: &HashMap<String, String>) -> Self {
        let pick = |key: &str, default: &str| {
            prompts
                .get(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            simple_explain: pick(SIMPLE_EXPLAIN_KEY, DEFAULT_SIMPLE_EXPLAIN),
            exam_detailed: pick(EXAM_DETAILED_KEY, DEFAULT_EXAM_DETAILED),
            intent_classifier: pick(INTENT_CLASSIFIER_KEY, DEFAULT_INTENT_CLASSIFIER),
            clarifying_question: pick(CLARIFYING_QUESTION_KEY, DEFAULT_CLARIFYING_QUESTION),
        }
    }
}

/// Substitutes the conversation transcript into a template.
pub fn render(template: &str, context: &str) -> String {
    let context = if context.is_empty() {
        "(no previous messages)"
    } else {
        context
    };
    template.replace("{context}", context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_map_overrides_and_defaults() {
        let mut prompts = HashMap::new();
        prompts.insert(SIMPLE_EXPLAIN_KEY.to_string(), "Be kind. {context}\n".to_string());
        prompts.insert(EXAM_DETAILED_KEY.to_string(), "   ".to_string());

        let set = PromptSet::from_map(&prompts);
        assert_eq!(set.simple_explain, "Be kind. {context}");
        assert_eq!(set.exam_detailed, DEFAULT_EXAM_DETAILED);
        assert_eq!(set.clarifying_question, DEFAULT_CLARIFYING_QUESTION);
    }

    #[test]
    fn test_render_substitutes_context() {
        assert_eq!(render("Ctx: {context}", "user: hi"), "Ctx: user: hi");
        assert_eq!(render("Ctx: {context}", ""), "Ctx: (no previous messages)");
    }
}

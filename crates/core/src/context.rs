//! Bounded conversation context handed to the classifier and responders.

use crate::state::Turn;

/// Caps how much history is fed to downstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    pub max_turns: usize,
    pub max_chars: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self {
            max_turns: 10,
            max_chars: 8_000,
        }
    }
}

impl ContextWindow {
    pub fn new(max_turns: usize, max_chars: usize) -> Self {
        Self {
            max_turns,
            max_chars,
        }
    }

    /// The newest turns that fit both limits, in chronological order.
    ///
    /// The window is always a contiguous suffix of the history: the first
    /// turn that does not fit closes it, even if older turns would. A newest
    /// turn longer than `max_chars` therefore yields an empty window. Callers
    /// pass the current utterance separately, so nothing is lost for routing.
    pub fn recent<'a>(&self, turns: &'a [Turn]) -> &'a [Turn] {
        let mut budget = self.max_chars;
        let mut start = turns.len();
        for turn in turns.iter().rev().take(self.max_turns) {
            let cost = turn.content.chars().count();
            if cost > budget {
                break;
            }
            budget -= cost;
            start -= 1;
        }
        &turns[start..]
    }
}

/// The context a responder receives alongside the query.
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    /// Recent turns rendered as a plain transcript.
    pub transcript: String,
    pub recent_turns: Vec<Turn>,
}

impl TurnContext {
    pub fn from_turns(turns: &[Turn]) -> Self {
        Self {
            transcript: render_transcript(turns),
            recent_turns: turns.to_vec(),
        }
    }
}

/// Renders turns as `role: content` lines.
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role, t.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("question {}", i))
                } else {
                    Turn::system(format!("answer {}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_recent_caps_turn_count() {
        let history = turns(25);
        let window = ContextWindow::new(4, 10_000);
        let recent = window.recent(&history);
        assert_eq!(recent.len(), 4);
        assert_eq!(recent[3].content, "question 24");
        assert_eq!(recent[0].content, "answer 21");
    }

    #[test]
    fn test_recent_caps_characters() {
        let history = vec![
            Turn::user("a".repeat(50)),
            Turn::system("b".repeat(50)),
            Turn::user("c".repeat(10)),
        ];
        let window = ContextWindow::new(10, 65);
        let recent = window.recent(&history);
        assert_eq!(recent.len(), 2);
        assert!(recent[0].content.starts_with('b'));
    }

    #[test]
    fn test_oversized_newest_turn_closes_the_window() {
        let history = vec![
            Turn::user("short question"),
            Turn::system("short answer"),
            Turn::user("x".repeat(200)),
        ];
        let window = ContextWindow::new(10, 100);
        assert!(window.recent(&history).is_empty());

        // A gap is never skipped to reach older turns.
        let history = vec![
            Turn::user("short question"),
            Turn::system("y".repeat(200)),
            Turn::user("follow-up"),
        ];
        let recent = window.recent(&history);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "follow-up");
    }

    #[test]
    fn test_recent_on_empty_history() {
        let window = ContextWindow::default();
        assert!(window.recent(&[]).is_empty());
    }

    #[test]
    fn test_render_transcript() {
        let history = vec![Turn::user("what is a loop?"), Turn::system("A loop repeats.")];
        assert_eq!(
            render_transcript(&history),
            "user: what is a loop?\nsystem: A loop repeats."
        );
    }
}

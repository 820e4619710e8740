pub mod prompts;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::llm::Content;
use crate::synonyms::synonym_hint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// A visible transcript entry.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// What the caller must do to answer a question.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPlan {
    /// Answered locally, already recorded.
    Canned(String),
    /// Forward this prompt to the model, then call [`ChatSession::finish_turn`].
    Generate(String),
}

/// Visible transcript limits.
#[derive(Debug, Clone, Copy)]
pub struct HistoryLimits {
    /// Question/answer pairs kept after trimming (plus one leading turn).
    pub max_pairs: usize,
    /// Turns shown when rendering history.
    pub render_limit: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            max_pairs: 8,
            render_limit: 20,
        }
    }
}

/// One conversation about the loaded document.
///
/// `history` is what the model sees: the document is seeded once as the
/// opening exchange and stays there for the life of the session.
/// `transcript` is what users see, and is trimmed independently.
pub struct ChatSession {
    history: Vec<Content>,
    transcript: Vec<Turn>,
    limits: HistoryLimits,
}

impl ChatSession {
    pub fn new(document_text: &str, limits: HistoryLimits) -> Self {
        let history = vec![
            Content::model(prompts::SEED_ACK),
            Content::user(format!("{}{}", prompts::SEED_DOCUMENT_PREFIX, document_text)),
        ];
        Self {
            history,
            transcript: vec![Turn::new(Role::Model, prompts::GREETING)],
            limits,
        }
    }

    #[cfg(test)]
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// The last `limit` transcript turns, oldest first.
    pub fn recent(&self, limit: Option<usize>) -> &[Turn] {
        let limit = limit.unwrap_or(self.limits.render_limit);
        let start = self.transcript.len().saturating_sub(limit);
        &self.transcript[start..]
    }

    /// Record a question and decide how it gets answered.
    pub fn begin_turn(&mut self, user_text: &str) -> TurnPlan {
        self.transcript.push(Turn::new(Role::User, user_text));

        if is_feedback(user_text) {
            debug!("feedback message, answering locally");
            self.record_answer(prompts::FEEDBACK_REPLY.to_string());
            return TurnPlan::Canned(prompts::FEEDBACK_REPLY.to_string());
        }

        TurnPlan::Generate(build_prompt(user_text))
    }

    /// Engine history followed by the new prompt.
    pub fn contents_for(&self, prompt: &str) -> Vec<Content> {
        let mut contents = self.history.clone();
        contents.push(Content::user(prompt));
        contents
    }

    /// Record the outcome of a generation and return the text to show.
    ///
    /// A failed call or an empty reply leaves engine history untouched so
    /// the next question starts from the last good exchange.
    pub fn finish_turn(&mut self, prompt: &str, result: anyhow::Result<String>) -> String {
        let answer = match result {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    // The endpoint rejects requests carrying an empty part.
                    prompts::EMPTY_REPLY.to_string()
                } else {
                    self.history.push(Content::user(prompt));
                    self.history.push(Content::model(trimmed));
                    trimmed.to_string()
                }
            }
            Err(e) => format!("{}{:#}", prompts::ERROR_PREFIX, e),
        };
        self.record_answer(answer.clone());
        answer
    }

    fn record_answer(&mut self, answer: String) {
        self.transcript.push(Turn::new(Role::Model, answer));
        self.trim_history();
    }

    /// Keep at most `2 * max_pairs + 1` visible turns.
    pub fn trim_history(&mut self) {
        let keep = 2 * self.limits.max_pairs + 1;
        if self.transcript.len() > keep {
            let excess = self.transcript.len() - keep;
            self.transcript.drain(..excess);
        }
    }
}

/// Messages that start or end with "add" are suggestions, not questions.
pub fn is_feedback(user_text: &str) -> bool {
    let lower = user_text.to_lowercase();
    lower.starts_with("add") || lower.ends_with("add")
}

/// Question, synonym hint, then the answering rules.
pub fn build_prompt(user_text: &str) -> String {
    format!(
        "{}{}\n\n{}",
        user_text,
        synonym_hint(user_text),
        prompts::ANSWER_RULES
    )
}

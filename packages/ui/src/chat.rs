use std::sync::atomic::{AtomicBool, Ordering};

use api::client::{Language, LawAssistant};
use api::models::ChatMessage;
use tokio::sync::watch;

/// Assistant text when the API returns no answer.
pub const NO_ANSWER: &str = "No answer received.";
/// Comparison text when the API returns no answer.
pub const NO_COMPARISON: &str = "Comparison failed.";

/// AI legal chat and section comparison.
pub struct ChatViewModel<A> {
    assistant: A,
    messages: watch::Sender<Vec<ChatMessage>>,
    is_loading: watch::Sender<bool>,
    comparison: watch::Sender<Option<String>>,
    hindi: AtomicBool,
}

impl<A: LawAssistant> ChatViewModel<A> {
    pub fn new(assistant: A) -> Self {
        Self {
            assistant,
            messages: watch::Sender::new(Vec::new()),
            is_loading: watch::Sender::new(false),
            comparison: watch::Sender::new(None),
            hindi: AtomicBool::new(false),
        }
    }

    pub fn messages(&self) -> watch::Receiver<Vec<ChatMessage>> {
        self.messages.subscribe()
    }

    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.is_loading.subscribe()
    }

    pub fn comparison_result(&self) -> watch::Receiver<Option<String>> {
        self.comparison.subscribe()
    }

    pub fn set_hindi_mode(&self, enabled: bool) {
        self.hindi.store(enabled, Ordering::Relaxed);
    }

    pub fn language(&self) -> Language {
        if self.hindi.load(Ordering::Relaxed) {
            Language::Hindi
        } else {
            Language::English
        }
    }

    /// Ask the assistant. The reply, or the error, is appended as an assistant message.
    pub async fn send_message(&self, query: &str) {
        if query.trim().is_empty() {
            return;
        }
        self.messages
            .send_modify(|m| m.push(ChatMessage::user(query)));
        self.is_loading.send_replace(true);

        let reply = match self.assistant.ask(query, self.language()).await {
            Ok(response) => {
                let sources = response
                    .retrieved_sources
                    .unwrap_or_default()
                    .iter()
                    .map(|s| format!("Source {}", s.source_number))
                    .collect();
                let text = response
                    .formatted_answer
                    .unwrap_or_else(|| NO_ANSWER.to_string());
                ChatMessage::assistant(text, sources)
            }
            Err(e) => {
                tracing::warn!(error = %e, "ask failed");
                ChatMessage::assistant(format!("Error: {e}"), Vec::new())
            }
        };
        self.messages.send_modify(|m| m.push(reply));
        self.is_loading.send_replace(false);
    }

    pub async fn compare_sections(&self, section1: &str, section2: &str) {
        if section1.trim().is_empty() || section2.trim().is_empty() {
            return;
        }
        self.comparison.send_replace(None);
        self.is_loading.send_replace(true);

        let result = match self.assistant.compare(section1, section2).await {
            Ok(response) => response
                .formatted_answer
                .unwrap_or_else(|| NO_COMPARISON.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "compare failed");
                format!("Comparison Error: {e}")
            }
        };
        self.comparison.send_replace(Some(result));
        self.is_loading.send_replace(false);
    }

    pub fn clear_comparison(&self) {
        self.comparison.send_replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeAssistant;

    #[tokio::test]
    async fn test_send_message_appends_question_and_answer() {
        let assistant = FakeAssistant {
            answer: Some("Theft is punishable under Section 303.".into()),
            ..FakeAssistant::default()
        };
        let vm = ChatViewModel::new(assistant.clone());
        let messages = vm.messages();

        vm.send_message("What is the punishment for theft?").await;

        let messages = messages.borrow();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user);
        assert_eq!(messages[1].text, "Theft is punishable under Section 303.");
        assert_eq!(messages[1].sources, vec!["Source 1", "Source 4"]);
        assert!(!*vm.is_loading().borrow());
        assert_eq!(assistant.asked.lock().unwrap()[0].1, Language::English);
    }

    #[tokio::test]
    async fn test_blank_query_is_ignored() {
        let vm = ChatViewModel::new(FakeAssistant::default());
        vm.send_message("   ").await;
        assert!(vm.messages().borrow().is_empty());
    }

    #[tokio::test]
    async fn test_missing_answer_and_errors() {
        let vm = ChatViewModel::new(FakeAssistant::default());
        vm.send_message("hello").await;
        assert_eq!(vm.messages().borrow()[1].text, NO_ANSWER);

        let failing = ChatViewModel::new(FakeAssistant {
            fail: true,
            ..FakeAssistant::default()
        });
        failing.send_message("hello").await;
        let messages = failing.messages();
        let messages = messages.borrow();
        assert!(messages[1].text.starts_with("Error: "));
        assert!(!messages[1].is_user);
    }

    #[tokio::test]
    async fn test_hindi_mode_changes_language() {
        let assistant = FakeAssistant::default();
        let vm = ChatViewModel::new(assistant.clone());
        vm.set_hindi_mode(true);
        vm.send_message("chori ki saza?").await;
        assert_eq!(assistant.asked.lock().unwrap()[0].1, Language::Hindi);
    }

    #[tokio::test]
    async fn test_compare_sections() {
        let vm = ChatViewModel::new(FakeAssistant {
            answer: Some("IPC 302 maps to BNS 103.".into()),
            ..FakeAssistant::default()
        });
        vm.compare_sections("IPC 302", " ").await;
        assert!(vm.comparison_result().borrow().is_none());

        vm.compare_sections("IPC 302", "BNS 103").await;
        assert_eq!(
            vm.comparison_result().borrow().as_deref(),
            Some("IPC 302 maps to BNS 103.")
        );
        vm.clear_comparison();
        assert!(vm.comparison_result().borrow().is_none());

        let empty = ChatViewModel::new(FakeAssistant::default());
        empty.compare_sections("a", "b").await;
        assert_eq!(empty.comparison_result().borrow().as_deref(), Some(NO_COMPARISON));

        let failing = ChatViewModel::new(FakeAssistant {
            fail: true,
            ..FakeAssistant::default()
        });
        failing.compare_sections("a", "b").await;
        assert!(failing
            .comparison_result()
            .borrow()
            .as_deref()
            .unwrap()
            .starts_with("Comparison Error: "));
    }
}

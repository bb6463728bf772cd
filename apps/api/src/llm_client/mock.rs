//! Scripted `ChatProvider` for tests. Replies are consumed in order; every
//! request is recorded so tests can assert on what was sent.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::{
    ChatProvider, ChatRequest, ChatResponse, Choice, LlmError, ResponseMessage,
};

pub enum Reply {
    Content(String),
    NoChoices,
    Fail(LlmError),
    /// Sleeps before answering; used to trip caller timeouts.
    Slow(Duration, String),
}

#[derive(Default)]
pub struct MockChatProvider {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ChatRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockChatProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: &str) -> Self {
        let mock = Self::new();
        mock.push(Reply::Content(content.to_string()));
        mock
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Most calls that were ever running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

fn response_with(content: Option<String>) -> ChatResponse {
    ChatResponse {
        choices: content
            .map(|c| {
                vec![Choice {
                    message: ResponseMessage { content: Some(c) },
                }]
            })
            .unwrap_or_default(),
        usage: None,
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let result = match reply {
            Some(Reply::Content(c)) => Ok(response_with(Some(c))),
            Some(Reply::NoChoices) => Ok(response_with(None)),
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Slow(delay, c)) => {
                tokio::time::sleep(delay).await;
                Ok(response_with(Some(c)))
            }
            None => Err(LlmError::Api {
                status: 500,
                message: "mock provider has no reply scripted".to_string(),
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

//
// Fixtures
//

/// Model payload for "Looking for a Senior Golang Developer, remote, $120k-150k, Docker/K8s a plus".
pub fn golang_vacancy_payload() -> &'static str {
    r#"{
        "isVacancy": true,
        "title": "Senior Golang Developer",
        "company": "",
        "salaryMin": 120000,
        "salaryMax": 150000,
        "currency": "USD",
        "skills": ["Golang", "Docker", "Kubernetes"],
        "isRemote": true,
        "grade": "Senior",
        "location": "",
        "description": "Senior Go developer, remote, containerised infrastructure"
    }"#
}

pub fn not_a_vacancy_payload() -> &'static str {
    r#"{
        "isVacancy": false,
        "title": "",
        "company": "",
        "salaryMin": 0,
        "salaryMax": 0,
        "currency": "",
        "skills": [],
        "isRemote": false,
        "grade": "",
        "location": "",
        "description": ""
    }"#
}

/// Same as the Golang payload but without `skills`.
pub fn missing_field_payload() -> &'static str {
    r#"{
        "isVacancy": true,
        "title": "Senior Golang Developer",
        "company": "",
        "salaryMin": 120000,
        "salaryMax": 150000,
        "currency": "USD",
        "isRemote": true,
        "grade": "Senior",
        "location": "",
        "description": ""
    }"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::ChatMessage;

    fn request() -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            response_format: None,
        }
    }

    #[tokio::test]
    async fn test_replies_in_order_and_records_requests() {
        let mock = MockChatProvider::new();
        mock.push(Reply::Content("one".to_string()));
        mock.push(Reply::NoChoices);

        let first = mock.chat(&request()).await.unwrap();
        assert_eq!(first.first_content(), Some("one"));
        let second = mock.chat(&request()).await.unwrap();
        assert!(second.choices.is_empty());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unscripted_call_fails() {
        let mock = MockChatProvider::new();
        assert!(mock.chat(&request()).await.is_err());
    }

    #[test]
    fn test_fixtures_are_json() {
        for payload in [
            golang_vacancy_payload(),
            not_a_vacancy_payload(),
            missing_field_payload(),
        ] {
            serde_json::from_str::<serde_json::Value>(payload).unwrap();
        }
    }
}

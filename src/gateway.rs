use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

use crate::config::Config;
use crate::error::RequestError;
use crate::model::Message;
use crate::prompt::Instruction;
use crate::providers;

/// One solve call: the problem text plus the labels of the selected modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveRequest {
    pub input: String,
    pub problem_type: String,
    pub answer_mode: String,
}

impl SolveRequest {
    pub fn new(
        input: impl Into<String>,
        problem_type: impl Into<String>,
        answer_mode: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            problem_type: problem_type.into(),
            answer_mode: answer_mode.into(),
        }
    }
}

pub type AnswerFuture<'a> = Pin<Box<dyn Future<Output = Result<String, RequestError>> + 'a>>;

pub trait AnswerGateway {
    fn answer<'a>(&'a self, request: &'a SolveRequest) -> AnswerFuture<'a>;
}

type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, RequestError>> + 'a>>;

trait ChatBackend {
    fn chat<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        messages: &'a [Message],
    ) -> ChatFuture<'a>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderChatBackend;

impl ChatBackend for ProviderChatBackend {
    fn chat<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        messages: &'a [Message],
    ) -> ChatFuture<'a> {
        Box::pin(async move { providers::chat_completions::chat(client, cfg, messages).await })
    }
}

/// Answers requests through the configured chat-completion endpoint.
pub struct HostAnswerGateway<'a, B = ProviderChatBackend> {
    client: &'a Client,
    cfg: &'a Config,
    backend: B,
}

impl<'a> HostAnswerGateway<'a, ProviderChatBackend> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self {
            client,
            cfg,
            backend: ProviderChatBackend,
        }
    }
}

impl<'a, B> HostAnswerGateway<'a, B> {
    #[cfg(test)]
    fn with_backend(client: &'a Client, cfg: &'a Config, backend: B) -> Self {
        Self {
            client,
            cfg,
            backend,
        }
    }
}

impl<'a, B> AnswerGateway for HostAnswerGateway<'a, B>
where
    B: ChatBackend,
{
    fn answer<'b>(&'b self, request: &'b SolveRequest) -> AnswerFuture<'b> {
        Box::pin(async move {
            if request.input.trim().is_empty() {
                debug!("skipping solve for blank input");
                return Ok(String::new());
            }

            let instruction = Instruction::select(&request.problem_type, &request.answer_mode);
            debug!(
                instruction = instruction.as_str(),
                problem_type = %request.problem_type,
                answer_mode = %request.answer_mode,
                "solving problem"
            );
            let messages = instruction.messages(&request.input);
            let content = self
                .backend
                .chat(self.client, self.cfg, &messages)
                .await?;
            Ok(content.trim().to_string())
        })
    }
}

/// Solves a single problem: blank input returns an empty answer without a request.
pub async fn solve(
    client: &Client,
    cfg: &Config,
    input: &str,
    problem_type: &str,
    answer_mode: &str,
) -> Result<String, RequestError> {
    let request = SolveRequest::new(input, problem_type, answer_mode);
    HostAnswerGateway::new(client, cfg).answer(&request).await
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;
    use std::cell::RefCell;

    use super::{AnswerGateway, ChatBackend, ChatFuture, HostAnswerGateway, SolveRequest, solve};
    use crate::config::{Config, SamplingParams};
    use crate::error::RequestError;
    use crate::model::{Message, MessageRole};

    #[derive(Debug)]
    enum StubOutcome {
        Ok(String),
        Status(u16),
    }

    #[derive(Debug)]
    struct StubBackend {
        calls: RefCell<Vec<Vec<Message>>>,
        outcome: StubOutcome,
    }

    impl StubBackend {
        fn ok(content: impl Into<String>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                outcome: StubOutcome::Ok(content.into()),
            }
        }

        fn status(status: u16) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                outcome: StubOutcome::Status(status),
            }
        }
    }

    impl ChatBackend for StubBackend {
        fn chat<'a>(
            &'a self,
            _client: &'a reqwest::Client,
            _cfg: &'a Config,
            messages: &'a [Message],
        ) -> ChatFuture<'a> {
            self.calls.borrow_mut().push(messages.to_vec());
            let result = match &self.outcome {
                StubOutcome::Ok(content) => Ok(content.clone()),
                StubOutcome::Status(status) => Err(RequestError::Status {
                    status: *status,
                    body: "stub failure".to_string(),
                }),
            };
            Box::pin(async move { result })
        }
    }

    fn test_config() -> Config {
        Config {
            model: "openai/gpt-oss-120b".to_string(),
            model_base_url: "http://localhost:9".to_string(),
            api_key: Some("test-key".to_string()),
            model_timeout_secs: 60,
            sampling: SamplingParams::default(),
            problem_type: "auto",
            answer_mode: "concise",
        }
    }

    #[tokio::test]
    async fn blank_input_returns_empty_answer_without_calling_backend() {
        let client = reqwest::Client::new();
        let cfg = test_config();
        let gateway = HostAnswerGateway::with_backend(&client, &cfg, StubBackend::ok("unused"));

        for input in ["", "   ", "\n\t "] {
            let answer = gateway
                .answer(&SolveRequest::new(input, "Kinetics", "English"))
                .await
                .expect("blank input is not an error");
            assert_eq!(answer, "");
        }
        assert!(gateway.backend.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn stoichiometry_problem_is_sent_with_solver_instruction() {
        let client = reqwest::Client::new();
        let cfg = test_config();
        let gateway = HostAnswerGateway::with_backend(
            &client,
            &cfg,
            StubBackend::ok("  H2 is the limiting reagent.\n"),
        );
        let problem = "What is the limiting reagent when 2 mol H2 reacts with 1 mol O2?";

        let answer = gateway
            .answer(&SolveRequest::new(problem, "Stoichiometry", "English"))
            .await
            .expect("solve should succeed");

        assert_eq!(answer, "H2 is the limiting reagent.");
        let calls = gateway.backend.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 2);
        assert_eq!(calls[0][0].role, MessageRole::System);
        assert!(calls[0][0].content.contains("Stoichiometry"));
        assert!(calls[0][0].content.contains("LESS THAN 50 WORDS"));
        assert_eq!(calls[0][1].role, MessageRole::User);
        assert_eq!(calls[0][1].content, problem);
    }

    #[tokio::test]
    async fn translate_mode_sends_translation_instruction() {
        let client = reqwest::Client::new();
        let cfg = test_config();
        let gateway = HostAnswerGateway::with_backend(&client, &cfg, StubBackend::ok("Xin chào"));

        gateway
            .answer(&SolveRequest::new("Hello", "Stoichiometry", "Vietnamese"))
            .await
            .expect("translate should succeed");

        let calls = gateway.backend.calls.borrow();
        assert!(calls[0][0].content.contains("professional translator"));
        assert!(!calls[0][0].content.contains("Stoichiometry"));
    }

    #[tokio::test]
    async fn backend_errors_are_returned_unchanged() {
        let client = reqwest::Client::new();
        let cfg = test_config();
        let gateway = HostAnswerGateway::with_backend(&client, &cfg, StubBackend::status(503));

        let err = gateway
            .answer(&SolveRequest::new("pH of 0.1 M HCl?", "Equilibrium", "English"))
            .await
            .expect_err("solve should fail");

        assert_eq!(err.status(), Some(503));
        assert_eq!(gateway.backend.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn solve_trims_the_provider_answer() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"choices": [{"message": {"content": "\n 1.0 M \n"}}]}));
            })
            .await;
        let mut cfg = test_config();
        cfg.model_base_url = server.base_url();

        let answer = solve(
            &reqwest::Client::new(),
            &cfg,
            "Molarity of 1 mol NaCl in 1 L?",
            "Detect language",
            "English",
        )
        .await
        .expect("solve should succeed");

        mock.assert_async().await;
        assert_eq!(answer, "1.0 M");
    }
}

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::RequestError;
use crate::model::Message;
use crate::providers::http_errors::model_api_request_error;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_first_content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

fn chat_url(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
}

fn request_body<'a>(cfg: &'a Config, messages: &'a [Message]) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model: &cfg.model,
        messages: messages
            .iter()
            .map(|msg| ChatMessage {
                role: msg.role.as_str(),
                content: &msg.content,
            })
            .collect(),
        temperature: cfg.sampling.temperature,
        max_tokens: cfg.sampling.max_tokens,
        top_p: cfg.sampling.top_p,
        stream: false,
    }
}

/// Sends one non-streaming chat completion and returns the first choice's content.
///
/// Missing `choices`, `message` or `content` yield an empty string rather than an error.
pub async fn chat(
    client: &Client,
    cfg: &Config,
    messages: &[Message],
) -> Result<String, RequestError> {
    let api_url = chat_url(&cfg.model_base_url);
    let body = request_body(cfg, messages);
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        message_count = messages.len(),
        "sending chat completion request"
    );

    let mut request = client.post(&api_url).json(&body);
    if let Some(api_key) = cfg.api_key.as_deref() {
        request = request.bearer_auth(api_key);
    }

    let response = request.send().await.map_err(|err| {
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            error = %err,
            "chat completion request failed"
        );
        model_api_request_error(err, &api_url, cfg.model_timeout_secs)
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response.text().await.map_err(|err| {
            warn!(
                api_url = %api_url,
                status = %status,
                error = %err,
                "failed to read chat completion error body"
            );
            model_api_request_error(err, &api_url, cfg.model_timeout_secs)
        })?;
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "chat completion returned non-success status"
        );
        return Err(RequestError::Status {
            status: status.as_u16(),
            body: response_body,
        });
    }

    let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
        if err.is_decode() {
            warn!(model = %cfg.model, error = %err, "chat completion response was malformed");
            return RequestError::Decode(err);
        }
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            error = %err,
            "failed to read chat completion response body"
        );
        model_api_request_error(err, &api_url, cfg.model_timeout_secs)
    })?;
    let content = parsed.into_first_content();
    debug!(
        model = %cfg.model,
        response_len = content.len(),
        "received chat completion response"
    );
    Ok(content)
}

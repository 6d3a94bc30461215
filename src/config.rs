use std::env;

use crate::modes::ModeKind;

const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
const DEFAULT_MODEL_BASE_URL: &str = "https://api.groq.com/openai";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TEMPERATURE: f32 = 1.0;
const DEFAULT_MAX_TOKENS: u32 = 4098;
const DEFAULT_TOP_P: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub model: String,
    pub model_base_url: String,
    pub api_key: Option<String>,
    pub model_timeout_secs: u64,
    pub sampling: SamplingParams,
    pub problem_type: &'static str,
    pub answer_mode: &'static str,
}

// Debug output must never contain the credential.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.model)
            .field("model_base_url", &self.model_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("sampling", &self.sampling)
            .field("problem_type", &self.problem_type)
            .field("answer_mode", &self.answer_mode)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let api_key =
            non_empty(get_var("MODEL_API_KEY")).or_else(|| non_empty(get_var("GROQ_API_KEY")));
        let sampling = SamplingParams {
            temperature: parse_temperature(get_var("MODEL_TEMPERATURE").as_deref()),
            max_tokens: parse_max_tokens(get_var("MODEL_MAX_TOKENS").as_deref()),
            top_p: parse_top_p(get_var("MODEL_TOP_P").as_deref()),
        };

        Self {
            model: non_empty(get_var("MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            model_base_url: non_empty(get_var("MODEL_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string()),
            api_key,
            model_timeout_secs: parse_model_timeout_secs(
                get_var("MODEL_TIMEOUT_SECS").as_deref(),
            ),
            sampling,
            problem_type: parse_mode_code(
                ModeKind::ProblemType,
                get_var("PROBLEM_TYPE").as_deref(),
            ),
            answer_mode: parse_mode_code(ModeKind::AnswerMode, get_var("ANSWER_MODE").as_deref()),
        }
    }

    /// The hosted endpoint needs a key; a custom base URL may be a relay that holds it.
    pub fn missing_required_api_key(&self) -> bool {
        self.api_key.is_none()
            && self.model_base_url.trim_end_matches('/') == DEFAULT_MODEL_BASE_URL
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_model_timeout_secs(raw: Option<&str>) -> u64 {
    parse_positive_u64(raw, DEFAULT_MODEL_TIMEOUT_SECS)
}

fn parse_max_tokens(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_TOKENS)
}

fn parse_f32_in(raw: Option<&str>, default: f32, accept: impl Fn(f32) -> bool) -> f32 {
    raw.and_then(|value| value.trim().parse::<f32>().ok())
        .filter(|value| value.is_finite() && accept(*value))
        .unwrap_or(default)
}

fn parse_temperature(raw: Option<&str>) -> f32 {
    parse_f32_in(raw, DEFAULT_TEMPERATURE, |value| (0.0..=2.0).contains(&value))
}

fn parse_top_p(raw: Option<&str>) -> f32 {
    parse_f32_in(raw, DEFAULT_TOP_P, |value| value > 0.0 && value <= 1.0)
}

fn parse_mode_code(kind: ModeKind, raw: Option<&str>) -> &'static str {
    raw.and_then(|value| kind.find(value).ok())
        .unwrap_or_else(|| kind.default_mode())
        .code
}

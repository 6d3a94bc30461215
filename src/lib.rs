pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod history;
pub mod logging;
pub mod model;
pub mod modes;
pub mod prompt;
pub mod providers;
pub mod repl;
pub mod session;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use std::env;
use std::time::Duration;
use tracing::info;

use clipboard::SystemClipboard;
use config::Config;
use controller::{SessionController, SolveOutcome};
use gateway::HostAnswerGateway;
use modes::ModeKind;
use repl::run_repl;
use session::Session;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cfg = Config::from_env();
    info!(
        model = %cfg.model,
        model_base_url = %cfg.model_base_url,
        model_timeout_secs = cfg.model_timeout_secs,
        api_key_present = cfg.api_key.is_some(),
        problem_type = cfg.problem_type,
        answer_mode = cfg.answer_mode,
        "loaded runtime configuration"
    );
    if cfg.missing_required_api_key() {
        bail!(
            "MODEL_API_KEY is not set. Export MODEL_API_KEY (or GROQ_API_KEY), \
             or point MODEL_BASE_URL at a relay that holds the credential."
        );
    }

    let client = build_client(&cfg)?;
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        run_repl(&client, &cfg).await
    } else {
        solve_once(&client, &cfg, &args.join(" ")).await
    }
}

fn build_client(cfg: &Config) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.model_timeout_secs))
        .user_agent(concat!("reagent/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to initialize HTTP client")
}

/// Builds a session with the configured default modes.
pub fn session_from_config(cfg: &Config) -> Session {
    let problem_type = ModeKind::ProblemType
        .find(cfg.problem_type)
        .unwrap_or_else(|_| ModeKind::ProblemType.default_mode());
    let answer_mode = ModeKind::AnswerMode
        .find(cfg.answer_mode)
        .unwrap_or_else(|_| ModeKind::AnswerMode.default_mode());
    Session::new(problem_type, answer_mode)
}

async fn solve_once(client: &Client, cfg: &Config, problem: &str) -> Result<()> {
    let mut controller = SessionController::new(
        session_from_config(cfg),
        HostAnswerGateway::new(client, cfg),
        SystemClipboard,
    );
    controller.session_mut().edit(problem);

    match controller.solve().await {
        SolveOutcome::Solved(answer) => {
            println!("{answer}");
            Ok(())
        }
        SolveOutcome::Failed(err) => Err(err).context("Failed to process request"),
        SolveOutcome::Skipped(_) => Ok(()),
    }
}

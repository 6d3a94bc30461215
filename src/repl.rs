use anyhow::{Context, Result};
use reqwest::Client;
use std::io::{self, BufRead, Write};
use std::thread;
use tokio::sync::mpsc;

use crate::clipboard::{Clipboard, SystemClipboard};
use crate::config::Config;
use crate::controller::{SessionController, SolveOutcome};
use crate::gateway::{AnswerGateway, HostAnswerGateway};
use crate::history::HistoryEntry;
use crate::modes::{Mode, ModeKind};
use crate::session::{MAX_INPUT_CHARS, SkipReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command<'a> {
    Exit,
    Help,
    Types,
    Modes,
    SetType(&'a str),
    SetMode(&'a str),
    Copy,
    Clear,
    History,
    Save,
    Saved,
    Status,
    Solve(&'a str),
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return Some(Command::Exit);
    }
    if !trimmed.starts_with('/') {
        return Some(Command::Solve(trimmed));
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (trimmed, ""),
    };
    let command = match name.to_ascii_lowercase().as_str() {
        "/help" => Command::Help,
        "/types" => Command::Types,
        "/modes" => Command::Modes,
        "/type" if !arg.is_empty() => Command::SetType(arg),
        "/mode" if !arg.is_empty() => Command::SetMode(arg),
        "/type" => Command::Types,
        "/mode" => Command::Modes,
        "/copy" => Command::Copy,
        "/clear" => Command::Clear,
        "/history" => Command::History,
        "/save" => Command::Save,
        "/saved" => Command::Saved,
        "/status" => Command::Status,
        _ => Command::Help,
    };
    Some(command)
}

pub async fn run_repl(client: &Client, cfg: &Config) -> Result<()> {
    let mut controller = SessionController::new(
        crate::session_from_config(cfg),
        HostAnswerGateway::new(client, cfg),
        SystemClipboard,
    );

    println!("reagent chemistry solver");
    println!("model: {}", cfg.model);
    print_selection(&controller);
    println!("type a problem, '/help' for commands, or 'exit' to quit");

    let mut lines = spawn_line_reader();
    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let line = tokio::select! {
            line = lines.recv() => line,
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                println!();
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let input = line.context("Failed to read stdin")?;

        let Some(command) = parse_command(&input) else {
            continue;
        };
        match command {
            Command::Exit => break,
            Command::Help => print_help(),
            Command::Types => {
                print_modes(ModeKind::ProblemType, controller.session().problem_type())
            }
            Command::Modes => {
                print_modes(ModeKind::AnswerMode, controller.session().answer_mode())
            }
            Command::SetType(code) => match controller.session_mut().select_problem_type(code) {
                Ok(mode) => println!("problem type: {}\n", mode.name),
                Err(err) => println!("{err}; see /types\n"),
            },
            Command::SetMode(code) => match controller.session_mut().select_answer_mode(code) {
                Ok(mode) => println!("answer mode: {}\n", mode.name),
                Err(err) => println!("{err}; see /modes\n"),
            },
            Command::Copy => match controller.copy_output() {
                Ok(true) => println!("answer copied\n"),
                Ok(false) => println!("(nothing to copy)\n"),
                Err(err) => println!("copy failed: {err:#}\n"),
            },
            Command::Clear => {
                controller.clear();
                println!("session cleared\n");
            }
            Command::History => print_entries(controller.session().history().entries()),
            Command::Save => match controller.session_mut().history_mut().save_latest() {
                Some(entry) => println!("saved #{}\n", entry.id),
                None => println!("(nothing to save)\n"),
            },
            Command::Saved => print_entries(controller.session().history().saved()),
            Command::Status => print_selection(&controller),
            Command::Solve(problem) => {
                controller.session_mut().edit(problem);
                solve_interruptibly(&mut controller).await?;
            }
        }
    }

    Ok(())
}

/// Reads stdin on its own thread; a blocking read there never holds up runtime shutdown.
fn spawn_line_reader() -> mpsc::UnboundedReceiver<io::Result<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

async fn solve_interruptibly<G, C>(controller: &mut SessionController<G, C>) -> Result<()>
where
    G: AnswerGateway,
    C: Clipboard,
{
    let outcome = tokio::select! {
        outcome = controller.solve() => Some(outcome),
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            None
        }
    };

    match outcome {
        Some(SolveOutcome::Solved(answer)) => println!("{answer}\n"),
        Some(SolveOutcome::Failed(_)) => println!("request failed; try again\n"),
        Some(SolveOutcome::Skipped(SkipReason::Busy)) => println!("(still solving)\n"),
        Some(SolveOutcome::Skipped(SkipReason::EmptyInput)) => {}
        None => {
            controller.cancel();
            println!("\n(cancelled)\n");
        }
    }
    Ok(())
}

fn print_help() {
    println!("/types            list problem types");
    println!("/modes            list answer modes");
    println!("/type <code>      select a problem type");
    println!("/mode <code>      select an answer mode");
    println!("/copy             copy the last answer to the clipboard");
    println!("/clear            reset input, answer and status");
    println!("/history          list answers from this session");
    println!("/save             save the latest answer");
    println!("/saved            list saved answers");
    println!("/status           show the current selection");
    println!("exit | quit       leave (Ctrl-C at the prompt also exits)\n");
}

fn print_modes(kind: ModeKind, selected: &Mode) {
    for mode in kind.options() {
        let marker = if mode.code == selected.code { '*' } else { ' ' };
        println!("{marker} {:<8} {}", mode.code, mode.name);
    }
    println!();
}

fn print_selection<G, C>(controller: &SessionController<G, C>)
where
    G: AnswerGateway,
    C: Clipboard,
{
    let session = controller.session();
    println!(
        "problem type: {} | answer mode: {} | status: {} | {}/{} chars",
        session.problem_type().name,
        session.answer_mode().name,
        session.status().as_str(),
        session.char_count(),
        MAX_INPUT_CHARS
    );
}

fn print_entries(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("(nothing yet)\n");
        return;
    }

    for entry in entries {
        println!(
            "[{}] {} {}/{}: {}",
            entry.id,
            entry.solved_at.format("%H:%M:%S"),
            entry.problem_type,
            entry.answer_mode,
            entry.input
        );
        println!("    {}", entry.output);
    }
    println!();
}

use anyhow::Result;
use tracing::{info, warn};

use crate::clipboard::Clipboard;
use crate::error::RequestError;
use crate::gateway::AnswerGateway;
use crate::session::{Session, Settlement, SkipReason};

#[derive(Debug)]
pub enum SolveOutcome {
    Skipped(SkipReason),
    Solved(String),
    Failed(RequestError),
}

/// Drives a [`Session`] through one gateway and one clipboard.
pub struct SessionController<G, C> {
    session: Session,
    gateway: G,
    clipboard: C,
}

impl<G, C> SessionController<G, C>
where
    G: AnswerGateway,
    C: Clipboard,
{
    pub fn new(session: Session, gateway: G, clipboard: C) -> Self {
        Self {
            session,
            gateway,
            clipboard,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub async fn solve(&mut self) -> SolveOutcome {
        let ticket = match self.session.begin_solve() {
            Ok(ticket) => ticket,
            Err(reason) => return SolveOutcome::Skipped(reason),
        };

        // `self` stays borrowed until settlement, so the ticket is always current here.
        // Interrupting a solve means dropping this future and calling `cancel`.
        match self.gateway.answer(&ticket.request).await {
            Ok(answer) => {
                let settlement = self.session.settle_success(&ticket, answer);
                debug_assert_eq!(settlement, Settlement::Applied);
                info!(
                    problem_type = %ticket.request.problem_type,
                    answer_mode = %ticket.request.answer_mode,
                    answer_len = self.session.output().len(),
                    "problem solved"
                );
                SolveOutcome::Solved(self.session.output().to_string())
            }
            Err(err) => {
                let settlement = self.session.settle_failure(&ticket);
                debug_assert_eq!(settlement, Settlement::Applied);
                warn!(
                    error = %err,
                    status = ?err.status(),
                    timed_out = err.is_timeout(),
                    "solve failed"
                );
                SolveOutcome::Failed(err)
            }
        }
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    pub fn cancel(&mut self) -> bool {
        let cancelled = self.session.cancel();
        if cancelled {
            info!("in-flight solve cancelled");
        }
        cancelled
    }

    /// Copies the current output. Returns `false` when there is nothing to copy.
    pub fn copy_output(&mut self) -> Result<bool> {
        let output = self.session.output();
        if output.is_empty() {
            return Ok(false);
        }
        self.clipboard.set_text(output)?;
        Ok(true)
    }
}

use tracing::debug;

use crate::gateway::SolveRequest;
use crate::history::History;
use crate::modes::{Mode, ModeKind, UnknownMode};

/// Input length shown next to the counter; informational only.
pub const MAX_INPUT_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyInput,
    Busy,
}

/// Proof that a request was dispatched; only the matching generation may settle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveTicket {
    generation: u64,
    pub request: SolveRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    Stale,
}

/// The complete visible state of one interaction.
#[derive(Debug)]
pub struct Session {
    input: String,
    output: String,
    problem_type: &'static Mode,
    answer_mode: &'static Mode,
    status: Status,
    generation: u64,
    history: History,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(
            ModeKind::ProblemType.default_mode(),
            ModeKind::AnswerMode.default_mode(),
        )
    }
}

impl Session {
    pub fn new(problem_type: &'static Mode, answer_mode: &'static Mode) -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            problem_type,
            answer_mode,
            status: Status::Idle,
            generation: 0,
            history: History::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn problem_type(&self) -> &'static Mode {
        self.problem_type
    }

    pub fn answer_mode(&self) -> &'static Mode {
        self.answer_mode
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    pub fn edit(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn select_problem_type(&mut self, code: &str) -> Result<&'static Mode, UnknownMode> {
        let mode = ModeKind::ProblemType.find(code)?;
        self.problem_type = mode;
        Ok(mode)
    }

    pub fn select_answer_mode(&mut self, code: &str) -> Result<&'static Mode, UnknownMode> {
        let mode = ModeKind::AnswerMode.find(code)?;
        self.answer_mode = mode;
        Ok(mode)
    }

    /// Moves to `Loading` and hands out a ticket, unless the input is blank or a
    /// request is already in flight.
    pub fn begin_solve(&mut self) -> Result<SolveTicket, SkipReason> {
        if self.input.trim().is_empty() {
            return Err(SkipReason::EmptyInput);
        }
        if self.status == Status::Loading {
            return Err(SkipReason::Busy);
        }

        self.status = Status::Loading;
        self.generation += 1;
        debug!(
            generation = self.generation,
            problem_type = self.problem_type.code,
            answer_mode = self.answer_mode.code,
            "solve dispatched"
        );
        Ok(SolveTicket {
            generation: self.generation,
            request: SolveRequest::new(
                self.input.clone(),
                self.problem_type.name,
                self.answer_mode.name,
            ),
        })
    }

    /// Records a successful answer. Ignored if the session was cleared or
    /// cancelled after `ticket` was issued.
    pub fn settle_success(&mut self, ticket: &SolveTicket, answer: String) -> Settlement {
        if !self.accepts(ticket) {
            return Settlement::Stale;
        }
        self.history.record(
            self.problem_type.code,
            self.answer_mode.code,
            &ticket.request.input,
            &answer,
        );
        self.output = answer;
        self.status = Status::Success;
        Settlement::Applied
    }

    /// Records a failure; the previous output stays visible.
    pub fn settle_failure(&mut self, ticket: &SolveTicket) -> Settlement {
        if !self.accepts(ticket) {
            return Settlement::Stale;
        }
        self.status = Status::Error;
        Settlement::Applied
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.output.clear();
        self.status = Status::Idle;
        self.generation += 1;
    }

    /// Abandons an in-flight request, keeping input and output.
    pub fn cancel(&mut self) -> bool {
        if self.status != Status::Loading {
            return false;
        }
        self.status = Status::Idle;
        self.generation += 1;
        true
    }

    fn accepts(&self, ticket: &SolveTicket) -> bool {
        self.status == Status::Loading && ticket.generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, Settlement, SkipReason, Status};

    const PROBLEM: &str = "What is the limiting reagent when 2 mol H2 reacts with 1 mol O2?";

    fn session_with_input(input: &str) -> Session {
        let mut session = Session::default();
        session.edit(input);
        session
    }

    #[test]
    fn new_session_starts_idle_with_default_modes() {
        let session = Session::default();
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.problem_type().code, "auto");
        assert_eq!(session.answer_mode().code, "concise");
        assert_eq!(session.input(), "");
        assert_eq!(session.output(), "");
    }

    #[test]
    fn blank_input_is_skipped_without_changing_status() {
        let mut session = session_with_input("   \n");
        assert_eq!(session.begin_solve(), Err(SkipReason::EmptyInput));
        assert_eq!(session.status(), Status::Idle);
    }

    #[test]
    fn begin_solve_uses_mode_labels() {
        let mut session = session_with_input(PROBLEM);
        session.select_problem_type("sto").expect("known code");

        let ticket = session.begin_solve().expect("solve should start");

        assert_eq!(session.status(), Status::Loading);
        assert_eq!(ticket.request.input, PROBLEM);
        assert_eq!(ticket.request.problem_type, "Stoichiometry");
        assert_eq!(ticket.request.answer_mode, "English");
    }

    #[test]
    fn second_solve_while_loading_is_rejected() {
        let mut session = session_with_input(PROBLEM);
        session.begin_solve().expect("first solve should start");
        assert_eq!(session.begin_solve(), Err(SkipReason::Busy));
    }

    #[test]
    fn success_sets_output_and_records_history() {
        let mut session = session_with_input(PROBLEM);
        let ticket = session.begin_solve().expect("solve should start");

        let settled = session.settle_success(&ticket, "H2".to_string());

        assert_eq!(settled, Settlement::Applied);
        assert_eq!(session.status(), Status::Success);
        assert_eq!(session.output(), "H2");
        assert_eq!(session.history().entries().len(), 1);
        assert_eq!(session.history().entries()[0].problem_type, "auto");
    }

    #[test]
    fn failure_keeps_previous_output() {
        let mut session = session_with_input(PROBLEM);
        let ticket = session.begin_solve().expect("solve should start");
        session.settle_success(&ticket, "H2".to_string());

        session.edit("Balance Fe + O2 -> Fe2O3");
        let ticket = session.begin_solve().expect("solve should start");
        session.settle_failure(&ticket);

        assert_eq!(session.status(), Status::Error);
        assert_eq!(session.output(), "H2");
    }

    #[test]
    fn edit_does_not_reset_status() {
        let mut session = session_with_input(PROBLEM);
        let ticket = session.begin_solve().expect("solve should start");
        session.settle_failure(&ticket);

        session.edit("another problem");
        assert_eq!(session.status(), Status::Error);
    }

    #[test]
    fn clear_resets_everything_from_any_state() {
        for settle in [None, Some(true), Some(false)] {
            let mut session = session_with_input(PROBLEM);
            let ticket = session.begin_solve().expect("solve should start");
            match settle {
                Some(true) => {
                    session.settle_success(&ticket, "H2".to_string());
                }
                Some(false) => {
                    session.settle_failure(&ticket);
                }
                None => {}
            }

            session.clear();

            assert_eq!(session.input(), "");
            assert_eq!(session.output(), "");
            assert_eq!(session.status(), Status::Idle);
        }
    }

    #[test]
    fn settlement_after_clear_is_discarded() {
        let mut session = session_with_input(PROBLEM);
        let ticket = session.begin_solve().expect("solve should start");
        session.clear();

        assert_eq!(
            session.settle_success(&ticket, "late".to_string()),
            Settlement::Stale
        );
        assert_eq!(session.output(), "");
        assert_eq!(session.status(), Status::Idle);
        assert!(session.history().entries().is_empty());
    }

    #[test]
    fn cancel_only_applies_while_loading() {
        let mut session = session_with_input(PROBLEM);
        assert!(!session.cancel());

        let ticket = session.begin_solve().expect("solve should start");
        assert!(session.cancel());
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.input(), PROBLEM);
        assert_eq!(session.settle_failure(&ticket), Settlement::Stale);
        assert_eq!(session.status(), Status::Idle);
    }

    #[test]
    fn stale_ticket_cannot_settle_a_newer_request() {
        let mut session = session_with_input(PROBLEM);
        let stale = session.begin_solve().expect("solve should start");
        session.cancel();
        let fresh = session.begin_solve().expect("solve should restart");

        assert_eq!(
            session.settle_success(&stale, "old".to_string()),
            Settlement::Stale
        );
        assert_eq!(session.status(), Status::Loading);
        assert_eq!(
            session.settle_success(&fresh, "new".to_string()),
            Settlement::Applied
        );
        assert_eq!(session.output(), "new");
    }

    #[test]
    fn unknown_mode_leaves_selection_unchanged() {
        let mut session = Session::default();
        session.select_answer_mode("explain").expect("known code");

        assert!(session.select_answer_mode("poetic").is_err());
        assert!(session.select_problem_type("alchemy").is_err());
        assert_eq!(session.answer_mode().code, "explain");
        assert_eq!(session.problem_type().code, "auto");
    }

    #[test]
    fn char_count_counts_unicode_scalars() {
        let session = session_with_input("ΔH° = −285.8 kJ");
        assert_eq!(session.char_count(), 15);
    }
}

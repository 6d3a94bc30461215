use thiserror::Error;

/// A selectable option. `name` doubles as the label sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub code: &'static str,
    pub name: &'static str,
}

impl Mode {
    const fn new(code: &'static str, name: &'static str) -> Self {
        Self { code, name }
    }
}

/// Answer mode label that switches the solver into translation.
pub const TRANSLATE_LABEL: &str = "Vietnamese";

pub const PROBLEM_TYPES: &[Mode] = &[
    Mode::new("auto", "Detect language"),
    Mode::new("gen", "English"),
    Mode::new("org", "Vietnamese"),
    Mode::new("inorg", "Japanese"),
    Mode::new("sto", "Stoichiometry"),
    Mode::new("thermo", "Thermodynamics"),
    Mode::new("kin", "Kinetics"),
    Mode::new("equi", "Equilibrium"),
    Mode::new("nuc", "Nuclear Chemistry"),
];

pub const ANSWER_MODES: &[Mode] = &[
    Mode::new("concise", "English"),
    Mode::new("explain", TRANSLATE_LABEL),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    ProblemType,
    AnswerMode,
}

impl ModeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProblemType => "problem type",
            Self::AnswerMode => "answer mode",
        }
    }

    pub fn options(&self) -> &'static [Mode] {
        match self {
            Self::ProblemType => PROBLEM_TYPES,
            Self::AnswerMode => ANSWER_MODES,
        }
    }

    pub fn default_mode(&self) -> &'static Mode {
        &self.options()[0]
    }

    pub fn find(&self, code: &str) -> Result<&'static Mode, UnknownMode> {
        let wanted = code.trim();
        self.options()
            .iter()
            .find(|mode| mode.code.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMode {
                kind: *self,
                code: wanted.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {} '{code}'", .kind.as_str())]
pub struct UnknownMode {
    pub kind: ModeKind,
    pub code: String,
}

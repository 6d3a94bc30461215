use crate::model::Message;
use crate::modes::TRANSLATE_LABEL;

/// Word ceiling the solver instruction asks the model to stay under.
pub const ANSWER_WORD_LIMIT: usize = 50;

/// System instruction chosen from the selected modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Translate { target: String },
    Solve { problem_type: String },
}

impl Instruction {
    /// Translation when the answer mode is the translate label, solving otherwise.
    pub fn select(problem_type: &str, answer_mode: &str) -> Self {
        if answer_mode == TRANSLATE_LABEL {
            Self::Translate {
                target: answer_mode.to_string(),
            }
        } else {
            Self::Solve {
                problem_type: problem_type.to_string(),
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Translate { .. } => "translate",
            Self::Solve { .. } => "solve",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::Translate { target } => format!(
                "You are a professional translator. Translate the user input from English to \
                 {target}. Output only the translation."
            ),
            Self::Solve { problem_type } => format!(
                "You are an expert Chemistry Professor and Problem Solver.\n\
                 \n\
                 Task: Solve the following chemistry problem or answer the chemistry question.\n\
                 Problem Type: {problem_type}\n\
                 \n\
                 Constraints:\n\
                 1. Think carefully about the chemical principles, stoichiometry, molecular \
                 structure, and reaction mechanisms involved.\n\
                 2. Provide the FINAL ANSWER ONLY.\n\
                 3. The final response MUST be LESS THAN {ANSWER_WORD_LIMIT} WORDS.\n\
                 4. Do not include your internal monologue or step-by-step derivation in the \
                 final output, just the result and key reasoning if space permits."
            ),
        }
    }

    /// The two-message exchange: this instruction first, then the raw input.
    pub fn messages(&self, input: &str) -> Vec<Message> {
        vec![Message::system(self.text()), Message::user(input)]
    }
}

pub fn build_messages(input: &str, problem_type: &str, answer_mode: &str) -> Vec<Message> {
    Instruction::select(problem_type, answer_mode).messages(input)
}

use chrono::{DateTime, Utc};

const MAX_HISTORY_ENTRIES: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: u64,
    pub problem_type: &'static str,
    pub answer_mode: &'static str,
    pub input: String,
    pub output: String,
    pub solved_at: DateTime<Utc>,
}

/// Answers solved in this session. Lives only as long as the process.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    saved: Vec<HistoryEntry>,
    next_id: u64,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        problem_type: &'static str,
        answer_mode: &'static str,
        input: &str,
        output: &str,
    ) -> &HistoryEntry {
        self.next_id += 1;
        self.entries.push(HistoryEntry {
            id: self.next_id,
            problem_type,
            answer_mode,
            input: input.to_string(),
            output: output.to_string(),
            solved_at: Utc::now(),
        });
        self.trim();
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn saved(&self) -> &[HistoryEntry] {
        &self.saved
    }

    /// Saves the most recent entry. Returns `None` when there is nothing to save.
    pub fn save_latest(&mut self) -> Option<&HistoryEntry> {
        let latest = self.entries.last()?;
        if !self.saved.iter().any(|entry| entry.id == latest.id) {
            self.saved.push(latest.clone());
        }
        self.saved.iter().find(|entry| entry.id == latest.id)
    }

    fn trim(&mut self) {
        if self.entries.len() <= MAX_HISTORY_ENTRIES {
            return;
        }
        let excess = self.entries.len() - MAX_HISTORY_ENTRIES;
        self.entries.drain(..excess);
    }
}

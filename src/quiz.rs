use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::time::SystemTime;

use chrono::Local;

use crate::api::{AnswerCheck, Question};
use crate::error::VocquizError;
use crate::mistakes::MistakeLog;
use crate::stats::StatsTracker;
use crate::util::{percentage, strip_symbols};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    Endless,
    /// Finish after answering this many questions.
    Fixed(usize),
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizMode::Endless => write!(f, "endless"),
            QuizMode::Fixed(n) => write!(f, "fixed-{n}"),
        }
    }
}

/// Where questions for a session come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum QuestionSource {
    /// Backend question pool for a difficulty level.
    Level,
    /// The logged-in user's personal vocabulary library.
    Library,
    /// Offline practice built from the local mistake log.
    Practice,
}

#[derive(Debug, Clone)]
struct ActiveQuestion {
    question: Question,
    shown_at: SystemTime,
}

/// One quiz run: the score/total counters, the question currently on screen,
/// and per-question timing. Answer outcomes are fed through [`QuizSession::apply`],
/// which updates the stats tracker and mistake log as a unit.
#[derive(Debug)]
pub struct QuizSession {
    pub level: String,
    pub mode: QuizMode,
    pub source: QuestionSource,
    pub score: usize,
    pub total: usize,
    sum_time: f64,
    current: Option<ActiveQuestion>,
}

impl QuizSession {
    pub fn new(level: impl Into<String>, mode: QuizMode, source: QuestionSource) -> Self {
        Self {
            level: level.into(),
            mode,
            source,
            score: 0,
            total: 0,
            sum_time: 0.0,
            current: None,
        }
    }

    /// Put a freshly fetched question on screen and start its timer.
    pub fn present(&mut self, question: Question) {
        self.current = Some(ActiveQuestion {
            question,
            shown_at: SystemTime::now(),
        });
    }

    pub fn current(&self) -> Option<&Question> {
        self.current.as_ref().map(|a| &a.question)
    }

    /// Seconds since the current question was presented.
    pub fn elapsed_secs(&self) -> f64 {
        self.current
            .as_ref()
            .and_then(|a| a.shown_at.elapsed().ok())
            .map_or(0.0, |d| d.as_secs_f64())
    }

    /// Consume the current question with the backend's verdict: bump the
    /// session counters, record the answer in the stats tracker, and log the
    /// miss when the answer was wrong.
    pub fn apply(
        &mut self,
        verdict: &AnswerCheck,
        time_spent_secs: f64,
        stats: &mut StatsTracker,
        mistakes: &mut MistakeLog,
    ) -> Result<(), VocquizError> {
        let active = self.current.take().ok_or_else(|| {
            VocquizError::InvalidArgument("no question is awaiting an answer".into())
        })?;

        self.total += 1;
        if verdict.correct {
            self.score += 1;
        }
        self.sum_time += time_spent_secs;

        stats.record_answer(&self.level, verdict.correct, time_spent_secs)?;

        if !verdict.correct {
            let stripped = strip_symbols(&active.question.word);
            let word = if stripped.is_empty() {
                active.question.word.as_str()
            } else {
                stripped
            };
            mistakes.add(word, &verdict.correct_translation, &self.level)?;
        }

        Ok(())
    }

    /// True once a fixed-count session has used up its questions. Endless
    /// sessions never finish on their own.
    pub fn has_finished(&self) -> bool {
        match self.mode {
            QuizMode::Endless => false,
            QuizMode::Fixed(n) => self.total >= n,
        }
    }

    pub fn remaining(&self) -> Option<usize> {
        match self.mode {
            QuizMode::Endless => None,
            QuizMode::Fixed(n) => Some(n.saturating_sub(self.total)),
        }
    }

    /// Percent of answered questions that were correct, for this session
    /// only.
    pub fn accuracy(&self) -> f64 {
        percentage(self.score as u64, self.total as u64)
    }

    /// Average seconds per answer for this session only.
    pub fn average_time_secs(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.sum_time / self.total as f64
    }

    /// Append one summary row for this session to the CSV log at `path`.
    pub fn append_log(&self, path: &Path) -> Result<(), VocquizError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !path.exists();

        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record([
                "date", "source", "level", "mode", "questions", "correct", "accuracy", "avg_secs",
            ])?;
        }

        writer.write_record([
            Local::now().format("%c").to_string(),
            self.source.to_string(),
            self.level.clone(),
            self.mode.to_string(),
            self.total.to_string(),
            self.score.to_string(),
            format!("{:.1}", self.accuracy()),
            format!("{:.2}", self.average_time_secs()),
        ])?;

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn stores() -> (StatsTracker, MistakeLog) {
        (
            StatsTracker::with_store(Box::new(MemoryStore::new())),
            MistakeLog::with_store(Box::new(MemoryStore::new())),
        )
    }

    fn question(word: &str) -> Question {
        Question {
            word: word.to_string(),
            options: vec!["貓".into(), "狗".into(), "鳥".into(), "魚".into()],
        }
    }

    fn correct() -> AnswerCheck {
        AnswerCheck {
            correct: true,
            correct_translation: "貓".into(),
        }
    }

    fn wrong() -> AnswerCheck {
        AnswerCheck {
            correct: false,
            correct_translation: "貓".into(),
        }
    }

    #[test]
    fn new_session_is_blank() {
        let session = QuizSession::new("LEVEL1", QuizMode::Endless, QuestionSource::Level);
        assert_eq!(session.score, 0);
        assert_eq!(session.total, 0);
        assert!(session.current().is_none());
        assert_eq!(session.elapsed_secs(), 0.0);
        assert!(!session.has_finished());
    }

    #[test]
    fn apply_updates_counters_and_stats() {
        let (mut stats, mut mistakes) = stores();
        let mut session = QuizSession::new("LEVEL1", QuizMode::Endless, QuestionSource::Level);

        session.present(question("cat"));
        session.apply(&correct(), 3.0, &mut stats, &mut mistakes).unwrap();
        session.present(question("cat"));
        session.apply(&wrong(), 5.0, &mut stats, &mut mistakes).unwrap();

        assert_eq!(session.score, 1);
        assert_eq!(session.total, 2);
        assert_eq!(session.accuracy(), 50.0);
        assert_eq!(session.average_time_secs(), 4.0);
        assert_eq!(stats.attempted("LEVEL1"), 2);
        assert_eq!(stats.correction_rate("LEVEL1"), 50.0);
        assert_eq!(stats.average_time("LEVEL1"), 4.0);
    }

    #[test]
    fn wrong_answer_logs_the_mistake_with_correct_translation() {
        let (mut stats, mut mistakes) = stores();
        let mut session = QuizSession::new("LEVEL1", QuizMode::Endless, QuestionSource::Level);

        session.present(question("cat"));
        session.apply(&wrong(), 2.0, &mut stats, &mut mistakes).unwrap();

        assert_eq!(mistakes.len(), 1);
        let entry = &mistakes.entries()[0];
        assert_eq!(entry.word, "cat");
        assert_eq!(entry.translation, "貓");
        assert_eq!(entry.level, "LEVEL1");
    }

    #[test]
    fn correct_answer_leaves_mistake_log_alone() {
        let (mut stats, mut mistakes) = stores();
        let mut session = QuizSession::new("LEVEL1", QuizMode::Endless, QuestionSource::Level);

        session.present(question("cat"));
        session.apply(&correct(), 2.0, &mut stats, &mut mistakes).unwrap();

        assert!(mistakes.is_empty());
    }

    #[test]
    fn mistake_word_is_symbol_stripped() {
        let (mut stats, mut mistakes) = stores();
        let mut session = QuizSession::new("LEVEL1", QuizMode::Endless, QuestionSource::Level);

        session.present(question("cat!"));
        session.apply(&wrong(), 2.0, &mut stats, &mut mistakes).unwrap();

        assert_eq!(mistakes.entries()[0].word, "cat");
    }

    #[test]
    fn apply_without_a_question_is_an_error() {
        let (mut stats, mut mistakes) = stores();
        let mut session = QuizSession::new("LEVEL1", QuizMode::Endless, QuestionSource::Level);

        assert_matches!(
            session.apply(&correct(), 1.0, &mut stats, &mut mistakes),
            Err(VocquizError::InvalidArgument(_))
        );
        assert_eq!(session.total, 0);
    }

    #[test]
    fn answering_consumes_the_question() {
        let (mut stats, mut mistakes) = stores();
        let mut session = QuizSession::new("LEVEL1", QuizMode::Endless, QuestionSource::Level);

        session.present(question("cat"));
        session.apply(&correct(), 1.0, &mut stats, &mut mistakes).unwrap();

        assert!(session.current().is_none());
        assert_matches!(
            session.apply(&correct(), 1.0, &mut stats, &mut mistakes),
            Err(VocquizError::InvalidArgument(_))
        );
    }

    #[test]
    fn fixed_mode_finishes_after_count() {
        let (mut stats, mut mistakes) = stores();
        let mut session = QuizSession::new("LEVEL1", QuizMode::Fixed(3), QuestionSource::Level);

        for i in 0..3 {
            assert!(!session.has_finished());
            assert_eq!(session.remaining(), Some(3 - i));
            session.present(question("cat"));
            session.apply(&correct(), 1.0, &mut stats, &mut mistakes).unwrap();
        }

        assert!(session.has_finished());
        assert_eq!(session.remaining(), Some(0));
    }

    #[test]
    fn endless_mode_never_finishes() {
        let (mut stats, mut mistakes) = stores();
        let mut session = QuizSession::new("LEVEL1", QuizMode::Endless, QuestionSource::Level);

        for _ in 0..50 {
            session.present(question("cat"));
            session.apply(&correct(), 0.5, &mut stats, &mut mistakes).unwrap();
        }

        assert!(!session.has_finished());
        assert_eq!(session.remaining(), None);
    }

    #[test]
    fn mode_and_source_display() {
        assert_eq!(QuizMode::Endless.to_string(), "endless");
        assert_eq!(QuizMode::Fixed(20).to_string(), "fixed-20");
        assert_eq!(QuestionSource::Library.to_string(), "library");
    }

    #[test]
    fn session_log_gets_one_header_and_one_row_per_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.csv");
        let (mut stats, mut mistakes) = stores();

        for _ in 0..2 {
            let mut session = QuizSession::new("LEVEL1", QuizMode::Fixed(1), QuestionSource::Level);
            session.present(question("cat"));
            session.apply(&correct(), 1.0, &mut stats, &mut mistakes).unwrap();
            session.append_log(&path).unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,"));
        assert!(lines[1].contains("fixed-1"));
        assert!(lines[2].contains("100.0"));
    }
}

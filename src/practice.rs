use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::api::{AnswerCheck, Question};
use crate::mistakes::{MistakeEntry, MistakeLog};

/// Minimum pool size to build a 4-option question from, same rule the
/// backend applies to the vocabulary library.
pub const MIN_POOL: usize = 4;

/// Offline question source built from the mistake log: practice the words
/// you keep missing without a backend round-trip.
///
/// Questions are assembled the way the backend does it — pick a word, sample
/// three wrong translations from the rest of the pool, shuffle — and answers
/// are checked locally by translation match.
pub struct PracticeDeck {
    pool: Vec<MistakeEntry>,
}

impl PracticeDeck {
    /// Build a deck from the log, optionally restricted to one level.
    /// Returns None when there are too few entries to form four options.
    pub fn from_log(log: &MistakeLog, level: Option<&str>) -> Option<Self> {
        let pool: Vec<MistakeEntry> = log.for_level(level).into_iter().cloned().collect();
        if pool.len() < MIN_POOL {
            return None;
        }
        Some(Self { pool })
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Draw a random question: one pool word plus three distinct wrong
    /// translations, options shuffled.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Question {
        let entry = &self.pool[rng.gen_range(0..self.pool.len())];

        let mut wrong: Vec<&str> = self
            .pool
            .iter()
            .filter(|e| e.translation != entry.translation)
            .map(|e| e.translation.as_str())
            .unique()
            .collect();
        wrong.shuffle(rng);

        let mut options: Vec<String> = wrong
            .into_iter()
            .take(MIN_POOL - 1)
            .map(String::from)
            .collect();
        options.push(entry.translation.clone());
        options.shuffle(rng);

        Question {
            word: entry.word.clone(),
            options,
        }
    }

    /// Local answer check with the backend's comparison rule: trimmed,
    /// case-insensitive translation match.
    pub fn check(&self, word: &str, selected: &str) -> AnswerCheck {
        let candidates: Vec<&MistakeEntry> =
            self.pool.iter().filter(|e| e.word == word).collect();
        let correct = candidates
            .iter()
            .any(|e| normalized_eq(&e.translation, selected));
        let correct_translation = candidates
            .first()
            .map(|e| e.translation.clone())
            .unwrap_or_default();
        AnswerCheck {
            correct,
            correct_translation,
        }
    }
}

fn normalized_eq(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

//! Question bank access.
//!
//! The engine only reads through [`QuestionRepository`]; administrative writes
//! live on the concrete stores.

pub mod sqlite;

use std::{
    fs,
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    error::StoreError,
    models::question::{fold_topic_counts, Question, QuestionFilter, QuestionPack, TopicCount},
};

pub use sqlite::SqliteQuestionRepository;

pub trait QuestionRepository: Send + Sync {
    /// Topics with their subtopics and active question counts.
    fn list_topics(&self) -> Result<Vec<TopicCount>, StoreError>;

    /// Every active question matching `filter`, in a stable order.
    fn sample_candidates(&self, filter: &QuestionFilter) -> Result<Vec<Question>, StoreError>;
}

/// Reads a JSON question pack from disk.
pub fn load_pack(path: impl AsRef<Path>) -> Result<QuestionPack, StoreError> {
    let data = fs::read_to_string(path)?;
    let pack: QuestionPack = serde_json::from_str(&data)?;
    Ok(pack)
}

#[derive(Default)]
pub struct InMemoryQuestionRepository {
    questions: Mutex<Vec<Question>>,
}

impl InMemoryQuestionRepository {
    pub fn new(questions: Vec<Question>) -> Self {
        InMemoryQuestionRepository {
            questions: Mutex::new(questions),
        }
    }

    fn questions(&self) -> MutexGuard<'_, Vec<Question>> {
        self.questions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, question: Question) -> Result<(), StoreError> {
        question.validate()?;
        self.questions().push(question);
        Ok(())
    }

    pub fn set_active(&self, id: &str, active: bool) -> bool {
        match self.questions().iter_mut().find(|question| question.id == id) {
            Some(question) => {
                question.is_active = active;
                true
            }
            None => false,
        }
    }
}

impl QuestionRepository for InMemoryQuestionRepository {
    fn list_topics(&self) -> Result<Vec<TopicCount>, StoreError> {
        let questions = self.questions();
        let rows = questions
            .iter()
            .filter(|question| question.is_active)
            .map(|question| (question.topic, question.subtopic.clone(), 1));
        Ok(fold_topic_counts(rows))
    }

    fn sample_candidates(&self, filter: &QuestionFilter) -> Result<Vec<Question>, StoreError> {
        Ok(self
            .questions()
            .iter()
            .filter(|question| question.is_active && question.matches(filter))
            .cloned()
            .collect())
    }
}

//! Quiz engine: one learner's quiz attempts against a question bank.

use std::sync::Arc;

use log::{debug, info, warn};
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    error::QuizError,
    models::{
        progress::Streak,
        question::{OptionKey, QuestionFilter, TopicCount, TopicSummary},
        session::{
            Progression, QuizResult, QuizSession, SessionStatus, SessionView, TickOutcome,
            TimerTicket,
        },
    },
    progress::{Clock, ProgressStore},
    repository::QuestionRepository,
    sampling::sample,
};

pub const DEFAULT_QUESTION_SECONDS: u32 = 30;

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Countdown length of every question, in timer ticks.
    pub question_seconds: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            question_seconds: DEFAULT_QUESTION_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next(SessionView),
    Finished(QuizResult),
}

pub struct QuizEngine {
    repository: Arc<dyn QuestionRepository>,
    progress: Arc<dyn ProgressStore>,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
    rng: Box<dyn RngCore + Send>,
    session: Option<QuizSession>,
}

impl QuizEngine {
    pub fn new(
        repository: Arc<dyn QuestionRepository>,
        progress: Arc<dyn ProgressStore>,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
    ) -> Self {
        QuizEngine {
            repository,
            progress,
            clock,
            settings,
            rng: Box::new(StdRng::from_entropy()),
            session: None,
        }
    }

    /// Replaces the random source used for sampling.
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = rng;
        self
    }

    pub fn status(&self) -> SessionStatus {
        self.session
            .as_ref()
            .map_or(SessionStatus::NotStarted, QuizSession::status)
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn view(&self) -> Option<SessionView> {
        self.in_progress().map(QuizSession::view)
    }

    fn in_progress(&self) -> Option<&QuizSession> {
        self.session
            .as_ref()
            .filter(|session| session.status() == SessionStatus::InProgress)
    }

    fn in_progress_mut(&mut self) -> Result<&mut QuizSession, QuizError> {
        self.session
            .as_mut()
            .filter(|session| session.status() == SessionStatus::InProgress)
            .ok_or(QuizError::NoActiveSession)
    }

    pub fn list_topics(&self) -> Result<Vec<TopicCount>, QuizError> {
        self.repository
            .list_topics()
            .map_err(QuizError::RepositoryUnavailable)
    }

    /// Per-topic counts alongside the best score of the topic-wide quiz.
    pub fn topic_summary(&self) -> Result<Vec<TopicSummary>, QuizError> {
        let topics = self.list_topics()?;
        Ok(topics
            .into_iter()
            .map(|entry| {
                let key = QuestionFilter::topic(entry.topic).signature();
                let best_score = self.progress.get_best(&key).unwrap_or_else(|error| {
                    warn!("Could not read best score for {}: {}", key, error);
                    0
                });
                TopicSummary {
                    topic: entry.topic,
                    subtopic_count: entry.subtopics.len() as u32,
                    question_count: entry.count,
                    best_score,
                }
            })
            .collect())
    }

    pub fn start_quiz(
        &mut self,
        filter: QuestionFilter,
        count: usize,
    ) -> Result<SessionView, QuizError> {
        if self.in_progress().is_some() {
            return Err(QuizError::SessionAlreadyActive);
        }
        if count == 0 {
            return Err(QuizError::InvalidQuestionCount);
        }

        let candidates = self
            .repository
            .sample_candidates(&filter)
            .map_err(QuizError::RepositoryUnavailable)?;
        let available = candidates.len();
        let questions = sample(candidates, count, &mut *self.rng);

        let session = QuizSession::begin(filter, questions, self.settings.question_seconds)?;
        info!(
            "Quiz {} started for {} with {} of {} questions",
            session.id(),
            session.filter().signature(),
            session.questions().len(),
            available
        );

        let view = session.view();
        self.session = Some(session);
        Ok(view)
    }

    /// Records an answer for the current question. `None` counts as a skip.
    ///
    /// A repeated answer for the same question leaves the session as it was
    /// and returns the current view.
    pub fn submit_answer(&mut self, option: Option<&str>) -> Result<SessionView, QuizError> {
        let selected = option
            .map(|raw| {
                raw.parse::<OptionKey>()
                    .map_err(QuizError::InvalidAnswerOption)
            })
            .transpose()?;

        let session = self.in_progress_mut()?;
        match session.record_answer(selected) {
            Ok(()) => {}
            Err(QuizError::AnswerAlreadyRecorded) => {
                debug!(
                    "Ignoring repeated answer for question {} of quiz {}",
                    session.current_index(),
                    session.id()
                );
            }
            Err(error) => return Err(error),
        }
        Ok(session.view())
    }

    /// One countdown step for the question named by `ticket`.
    pub fn tick(&mut self, ticket: &TimerTicket) -> TickOutcome {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return TickOutcome::Stale,
        };

        let outcome = session.tick(ticket);
        if let TickOutcome::Expired(_) = outcome {
            info!(
                "Question {} of quiz {} timed out",
                ticket.question_index, ticket.session_id
            );
        }
        outcome
    }

    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        let session = self.in_progress_mut()?;
        match session.advance()? {
            Progression::Next(view) => Ok(Advance::Next(view)),
            Progression::Finished => {
                let session = self.session.as_ref().ok_or(QuizError::NoActiveSession)?;
                Ok(Advance::Finished(self.complete(session)))
            }
        }
    }

    /// Throws away the session in progress without recording progress.
    /// Returns whether there was one.
    pub fn abort(&mut self) -> bool {
        match self.session.take() {
            Some(session) if session.status() == SessionStatus::InProgress => {
                info!(
                    "Quiz {} aborted after {} answers",
                    session.id(),
                    session.answers().len()
                );
                true
            }
            _ => false,
        }
    }

    pub fn best_score(&self, key: &str) -> Result<u32, QuizError> {
        self.progress
            .get_best(key)
            .map_err(QuizError::ProgressUnavailable)
    }

    pub fn streak(&self) -> Result<Streak, QuizError> {
        self.progress
            .get_streak()
            .map_err(QuizError::ProgressUnavailable)
    }

    /// Records progress for a session that just completed. Store failures
    /// are logged and leave the matching result fields empty.
    fn complete(&self, session: &QuizSession) -> QuizResult {
        let key = session.filter().signature();
        let score = session.score();
        let total = session.questions().len() as u32;

        let previous_best = match self.progress.get_best(&key) {
            Ok(best) => Some(best),
            Err(error) => {
                warn!("Could not read best score for {}: {}", key, error);
                None
            }
        };
        let best_score = match self.progress.set_best_if_higher(&key, score) {
            Ok(()) => previous_best.map(|best| best.max(score)),
            Err(error) => {
                warn!("Could not save best score for {}: {}", key, error);
                None
            }
        };
        let streak = match self.progress.record_completion_today(self.clock.today()) {
            Ok(count) => Some(count),
            Err(error) => {
                warn!("Could not record streak: {}", error);
                None
            }
        };

        info!(
            "Quiz {} completed for {} with score {}/{}",
            session.id(),
            key,
            score,
            total
        );

        QuizResult {
            session_id: session.id().to_string(),
            new_best: best_score.is_some() && previous_best.map_or(false, |best| score > best),
            key,
            score,
            total,
            percentage: if total == 0 { 0 } else { score * 100 / total },
            answers: session.answers().to_vec(),
            best_score,
            streak,
        }
    }
}

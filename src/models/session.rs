use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::QuizError,
    models::question::{Difficulty, OptionKey, Question, QuestionFilter, QuestionOptions, Topic},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: String,
    pub selected: Option<OptionKey>,
    pub is_correct: bool,
}

/// Identifies the countdown of one question of one session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct TimerTicket {
    pub session_id: String,
    pub question_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining: u32 },
    Expired(SessionView),
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progression {
    Next(SessionView),
    Finished,
}

/// Question as shown while it is unanswered. Carries no correct option.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub options: QuestionOptions,
    pub topic: Topic,
    pub subtopic: String,
    pub difficulty: Difficulty,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        QuestionView {
            id: question.id.clone(),
            text: question.text.clone(),
            options: question.options.clone(),
            topic: question.topic,
            subtopic: question.subtopic.clone(),
            difficulty: question.difficulty,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub selected: Option<OptionKey>,
    pub correct_option: OptionKey,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub status: SessionStatus,
    pub index: usize,
    pub total: usize,
    pub question: QuestionView,
    pub remaining: u32,
    pub feedback: Option<AnswerFeedback>,
    pub score: u32,
}

impl SessionView {
    pub fn ticket(&self) -> TimerTicket {
        TimerTicket {
            session_id: self.session_id.clone(),
            question_index: self.index,
        }
    }
}

/// Summary of a completed session. `best_score` and `streak` are absent when
/// the progress store could not be updated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub session_id: String,
    pub key: String,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub answers: Vec<AnswerRecord>,
    pub best_score: Option<u32>,
    pub new_best: bool,
    pub streak: Option<u32>,
}

#[derive(Debug, Clone)]
struct QuestionTimer {
    remaining: u32,
    running: bool,
}

impl QuestionTimer {
    fn start(duration: u32) -> Self {
        QuestionTimer {
            remaining: duration,
            running: true,
        }
    }

    /// Counts down one unit; true once the countdown hits zero.
    fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            return true;
        }
        false
    }

    fn freeze(&mut self) {
        self.running = false;
    }
}

/// One attempt at a quiz, from start until it completes or is thrown away.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: String,
    filter: QuestionFilter,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<AnswerRecord>,
    status: SessionStatus,
    question_seconds: u32,
    timer: QuestionTimer,
}

impl QuizSession {
    pub fn begin(
        filter: QuestionFilter,
        questions: Vec<Question>,
        question_seconds: u32,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestionsAvailable);
        }

        Ok(QuizSession {
            id: Uuid::new_v4().to_string(),
            filter,
            questions,
            current_index: 0,
            answers: Vec::new(),
            status: SessionStatus::InProgress,
            question_seconds,
            timer: QuestionTimer::start(question_seconds),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn filter(&self) -> &QuestionFilter {
        &self.filter
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.answers.iter().filter(|answer| answer.is_correct).count() as u32
    }

    pub fn is_answered(&self) -> bool {
        self.answers.len() > self.current_index
    }

    pub fn remaining(&self) -> u32 {
        self.timer.remaining
    }

    pub fn ticket(&self) -> TimerTicket {
        TimerTicket {
            session_id: self.id.clone(),
            question_index: self.current_index,
        }
    }

    fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    /// Records the first answer for the current question and freezes its timer.
    pub fn record_answer(&mut self, selected: Option<OptionKey>) -> Result<(), QuizError> {
        if self.status != SessionStatus::InProgress {
            return Err(QuizError::NoActiveSession);
        }
        if self.is_answered() {
            return Err(QuizError::AnswerAlreadyRecorded);
        }

        let question = self.current_question();
        let record = AnswerRecord {
            question_id: question.id.clone(),
            selected,
            is_correct: question.is_correct(selected),
        };
        self.answers.push(record);
        self.timer.freeze();
        Ok(())
    }

    pub fn tick(&mut self, ticket: &TimerTicket) -> TickOutcome {
        if self.status != SessionStatus::InProgress
            || ticket.session_id != self.id
            || ticket.question_index != self.current_index
            || self.is_answered()
        {
            return TickOutcome::Stale;
        }

        if !self.timer.tick() {
            return TickOutcome::Running {
                remaining: self.timer.remaining,
            };
        }

        match self.record_answer(None) {
            Ok(()) => TickOutcome::Expired(self.view()),
            Err(_) => TickOutcome::Stale,
        }
    }

    pub fn advance(&mut self) -> Result<Progression, QuizError> {
        if self.status != SessionStatus::InProgress {
            return Err(QuizError::NoActiveSession);
        }
        if !self.is_answered() {
            return Err(QuizError::AnswerNotRecorded);
        }

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.timer = QuestionTimer::start(self.question_seconds);
            Ok(Progression::Next(self.view()))
        } else {
            self.status = SessionStatus::Completed;
            Ok(Progression::Finished)
        }
    }

    pub fn view(&self) -> SessionView {
        let question = self.current_question();
        let feedback = self.answers.get(self.current_index).map(|answer| AnswerFeedback {
            selected: answer.selected,
            correct_option: question.correct_option,
            is_correct: answer.is_correct,
            explanation: question.explanation.clone(),
        });

        SessionView {
            session_id: self.id.clone(),
            status: self.status,
            index: self.current_index,
            total: self.questions.len(),
            question: QuestionView::from(question),
            remaining: self.timer.remaining,
            feedback,
            score: self.score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::test_question;

    fn two_question_session(seconds: u32) -> QuizSession {
        QuizSession::begin(
            QuestionFilter::default(),
            vec![
                test_question("q0", Topic::Quantitative, OptionKey::A),
                test_question("q1", Topic::Quantitative, OptionKey::B),
            ],
            seconds,
        )
        .unwrap()
    }

    #[test]
    fn empty_question_list_cannot_begin() {
        let result = QuizSession::begin(QuestionFilter::default(), Vec::new(), 30);
        assert!(matches!(result, Err(QuizError::NoQuestionsAvailable)));
    }

    #[test]
    fn unanswered_view_hides_feedback() {
        let session = two_question_session(30);
        let view = session.view();

        assert_eq!(view.status, SessionStatus::InProgress);
        assert_eq!(view.index, 0);
        assert_eq!(view.total, 2);
        assert_eq!(view.remaining, 30);
        assert!(view.feedback.is_none());
    }

    #[test]
    fn second_answer_is_rejected() {
        let mut session = two_question_session(30);
        session.record_answer(Some(OptionKey::A)).unwrap();

        let again = session.record_answer(Some(OptionKey::C));
        assert!(matches!(again, Err(QuizError::AnswerAlreadyRecorded)));
        assert_eq!(session.answers().len(), 1);
        assert!(session.answers()[0].is_correct);
    }

    #[test]
    fn answer_reveals_explanation_and_freezes_timer() {
        let mut session = two_question_session(30);
        let ticket = session.ticket();
        session.tick(&ticket);
        session.record_answer(Some(OptionKey::D)).unwrap();

        let view = session.view();
        let feedback = view.feedback.unwrap();
        assert_eq!(feedback.correct_option, OptionKey::A);
        assert!(!feedback.is_correct);
        assert_eq!(feedback.explanation, "Because q0 is A");
        assert_eq!(view.remaining, 29);

        assert_eq!(session.tick(&ticket), TickOutcome::Stale);
        assert_eq!(session.remaining(), 29);
    }

    #[test]
    fn countdown_expiry_records_null_answer() {
        let mut session = two_question_session(3);
        let ticket = session.ticket();

        assert_eq!(session.tick(&ticket), TickOutcome::Running { remaining: 2 });
        assert_eq!(session.tick(&ticket), TickOutcome::Running { remaining: 1 });
        match session.tick(&ticket) {
            TickOutcome::Expired(view) => {
                let feedback = view.feedback.unwrap();
                assert_eq!(feedback.selected, None);
                assert!(!feedback.is_correct);
            }
            other => panic!("expected expiry, got {:?}", other),
        }
        assert_eq!(session.tick(&ticket), TickOutcome::Stale);
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn advance_requires_answer() {
        let mut session = two_question_session(30);
        assert!(matches!(session.advance(), Err(QuizError::AnswerNotRecorded)));
    }

    #[test]
    fn advance_restarts_timer_and_invalidates_old_ticket() {
        let mut session = two_question_session(5);
        let first_ticket = session.ticket();
        session.tick(&first_ticket);
        session.record_answer(None).unwrap();

        match session.advance().unwrap() {
            Progression::Next(view) => {
                assert_eq!(view.index, 1);
                assert_eq!(view.remaining, 5);
                assert!(view.feedback.is_none());
            }
            Progression::Finished => panic!("session ended early"),
        }

        assert_eq!(session.tick(&first_ticket), TickOutcome::Stale);
        assert_eq!(session.remaining(), 5);
    }

    #[test]
    fn scores_and_completes() {
        let mut session = two_question_session(30);
        session.record_answer(Some(OptionKey::A)).unwrap();
        session.advance().unwrap();
        session.record_answer(Some(OptionKey::C)).unwrap();

        assert_eq!(session.advance().unwrap(), Progression::Finished);
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.score(), 1);
        let correctness: Vec<bool> = session.answers().iter().map(|a| a.is_correct).collect();
        assert_eq!(correctness, vec![true, false]);

        assert!(matches!(session.advance(), Err(QuizError::NoActiveSession)));
        assert!(matches!(
            session.record_answer(Some(OptionKey::A)),
            Err(QuizError::NoActiveSession)
        ));
    }
}

use serde::{Deserialize, Serialize};

use super::{
    progress::Streak,
    question::{Difficulty, QuestionFilter, Topic, TopicCount, TopicSummary},
    session::{QuizResult, SessionView},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "response", content = "data", rename_all = "camelCase")]
pub enum Response {
    TopicsResponse {
        topics: Vec<TopicCount>,
    },
    TopicSummaryResponse {
        summary: Vec<TopicSummary>,
    },
    QuestionResponse {
        view: SessionView,
    },
    TimerResponse {
        remaining: u32,
    },
    AnswerResponse {
        view: SessionView,
    },
    ResultResponse {
        result: QuizResult,
    },
    AbortResponse {
        discarded: bool,
    },
    BestScoreResponse {
        key: String,
        #[serde(rename = "bestScore")]
        best_score: u32,
    },
    StreakResponse {
        streak: Streak,
    },
    ErrorResponse {
        #[serde(rename = "errorText")]
        error_text: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    ListTopics {},
    TopicSummary {},
    StartQuiz {
        #[serde(default)]
        topic: Option<Topic>,
        #[serde(default)]
        subtopic: Option<String>,
        #[serde(default)]
        difficulty: Option<Difficulty>,
        #[serde(default)]
        count: Option<usize>,
    },
    SubmitAnswer {
        #[serde(default)]
        option: Option<String>,
    },
    Advance {},
    Abort {},
    GetBestScore {
        key: String,
    },
    GetStreak {},
    Heartbeat {},
}

impl Command {
    /// Filter carried by a `startQuiz` command.
    pub fn filter(&self) -> Option<QuestionFilter> {
        match self {
            Command::StartQuiz {
                topic,
                subtopic,
                difficulty,
                ..
            } => Some(QuestionFilter {
                topic: *topic,
                subtopic: subtopic.clone(),
                difficulty: *difficulty,
            }),
            _ => None,
        }
    }
}

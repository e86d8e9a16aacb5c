use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::QuestionError;

/// Label of one of the four answer choices.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::A => "A",
            OptionKey::B => "B",
            OptionKey::C => "C",
            OptionKey::D => "D",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(OptionKey::A),
            "B" => Ok(OptionKey::B),
            "C" => Ok(OptionKey::C),
            "D" => Ok(OptionKey::D),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    Quantitative,
    Logical,
    Verbal,
}

const QUANTITATIVE_SUBTOPICS: &[&str] = &[
    "Number System",
    "Percentages",
    "Profit and Loss",
    "Simple Interest",
    "Compound Interest",
    "Ratio and Proportion",
    "Averages",
    "Time and Work",
    "Time Speed Distance",
    "Probability",
];

const LOGICAL_SUBTOPICS: &[&str] = &[
    "Number Series",
    "Coding-Decoding",
    "Blood Relations",
    "Direction Sense",
    "Syllogism",
    "Seating Arrangement",
    "Puzzles",
];

const VERBAL_SUBTOPICS: &[&str] = &[
    "Synonyms",
    "Antonyms",
    "Reading Comprehension",
    "Sentence Correction",
    "Fill in the Blanks",
    "Idioms and Phrases",
];

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Quantitative, Topic::Logical, Topic::Verbal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Quantitative => "Quantitative",
            Topic::Logical => "Logical",
            Topic::Verbal => "Verbal",
        }
    }

    /// The fixed subtopic vocabulary of this topic.
    pub fn subtopics(&self) -> &'static [&'static str] {
        match self {
            Topic::Quantitative => QUANTITATIVE_SUBTOPICS,
            Topic::Logical => LOGICAL_SUBTOPICS,
            Topic::Verbal => VERBAL_SUBTOPICS,
        }
    }

    pub fn has_subtopic(&self, subtopic: &str) -> bool {
        self.subtopics().contains(&subtopic)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EASY" => Ok(Difficulty::Easy),
            "MEDIUM" => Ok(Difficulty::Medium),
            "HARD" => Ok(Difficulty::Hard),
            other => Err(other.to_string()),
        }
    }
}

/// The four answer choices of a question.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestionOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl QuestionOptions {
    pub fn get(&self, key: OptionKey) -> &str {
        match key {
            OptionKey::A => &self.a,
            OptionKey::B => &self.b,
            OptionKey::C => &self.c,
            OptionKey::D => &self.d,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: QuestionOptions,
    pub correct_option: OptionKey,
    #[serde(default)]
    pub explanation: String,
    pub topic: Topic,
    pub subtopic: String,
    pub difficulty: Difficulty,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Question {
    pub fn is_correct(&self, selected: Option<OptionKey>) -> bool {
        selected == Some(self.correct_option)
    }

    pub fn matches(&self, filter: &QuestionFilter) -> bool {
        filter.topic.map_or(true, |topic| topic == self.topic)
            && filter
                .subtopic
                .as_deref()
                .map_or(true, |subtopic| subtopic == self.subtopic)
            && filter
                .difficulty
                .map_or(true, |difficulty| difficulty == self.difficulty)
    }

    /// Checks the authoring rules every stored question must satisfy.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if let Some(key) = OptionKey::ALL
            .into_iter()
            .find(|key| self.options.get(*key).trim().is_empty())
        {
            return Err(QuestionError::EmptyOption(key));
        }
        if !self.topic.has_subtopic(&self.subtopic) {
            return Err(QuestionError::UnknownSubtopic {
                topic: self.topic,
                subtopic: self.subtopic.clone(),
            });
        }
        Ok(())
    }
}

/// Question as authored by an administrator, before it gets an id.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    pub options: QuestionOptions,
    pub correct_option: OptionKey,
    #[serde(default)]
    pub explanation: String,
    pub topic: Topic,
    pub subtopic: String,
    pub difficulty: Difficulty,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewQuestion {
    pub fn into_question(self) -> Question {
        Question {
            id: self
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            text: self.text,
            options: self.options,
            correct_option: self.correct_option,
            explanation: self.explanation,
            topic: self.topic,
            subtopic: self.subtopic,
            difficulty: self.difficulty,
            is_active: self.is_active,
        }
    }
}

/// A named batch of questions for bulk import.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuestionPack {
    pub name: String,
    pub questions: Vec<NewQuestion>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    #[serde(default)]
    pub topic: Option<Topic>,
    #[serde(default)]
    pub subtopic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl QuestionFilter {
    pub fn topic(topic: Topic) -> Self {
        QuestionFilter {
            topic: Some(topic),
            ..Default::default()
        }
    }

    /// Key under which progress for this filter is recorded.
    pub fn signature(&self) -> String {
        let parts: Vec<&str> = [
            self.topic.map(|topic| topic.as_str()),
            self.subtopic.as_deref(),
            self.difficulty.map(|difficulty| difficulty.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            "mixed".to_string()
        } else {
            parts.join("|")
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TopicCount {
    pub topic: Topic,
    pub subtopics: Vec<String>,
    pub count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub topic: Topic,
    pub subtopic_count: u32,
    pub question_count: u32,
    pub best_score: u32,
}

/// Folds per-subtopic counts of active questions into per-topic entries.
pub fn fold_topic_counts<I>(rows: I) -> Vec<TopicCount>
where
    I: IntoIterator<Item = (Topic, String, u32)>,
{
    let mut grouped = std::collections::BTreeMap::<Topic, (Vec<String>, u32)>::new();
    for (topic, subtopic, count) in rows {
        let entry = grouped.entry(topic).or_default();
        if !entry.0.contains(&subtopic) {
            entry.0.push(subtopic);
        }
        entry.1 += count;
    }

    grouped
        .into_iter()
        .map(|(topic, (mut subtopics, count))| {
            subtopics.sort();
            TopicCount {
                topic,
                subtopics,
                count,
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn test_question(id: &str, topic: Topic, correct: OptionKey) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {}?", id),
        options: QuestionOptions {
            a: "one".to_string(),
            b: "two".to_string(),
            c: "three".to_string(),
            d: "four".to_string(),
        },
        correct_option: correct,
        explanation: format!("Because {} is {}", id, correct),
        topic,
        subtopic: topic.subtopics()[0].to_string(),
        difficulty: Difficulty::Easy,
        is_active: true,
    }
}

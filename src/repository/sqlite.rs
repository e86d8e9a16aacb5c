use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};

use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::{
    error::StoreError,
    models::question::{
        fold_topic_counts, Difficulty, NewQuestion, OptionKey, Question, QuestionFilter,
        QuestionOptions, QuestionPack, Topic, TopicCount,
    },
    repository::QuestionRepository,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS questions (
    id             TEXT PRIMARY KEY,
    text           TEXT NOT NULL,
    option_a       TEXT NOT NULL,
    option_b       TEXT NOT NULL,
    option_c       TEXT NOT NULL,
    option_d       TEXT NOT NULL,
    correct_option TEXT NOT NULL,
    explanation    TEXT NOT NULL DEFAULT '',
    topic          TEXT NOT NULL,
    subtopic       TEXT NOT NULL,
    difficulty     TEXT NOT NULL,
    is_active      INTEGER NOT NULL DEFAULT 1
);
CREATE INDEX IF NOT EXISTS questions_filter
    ON questions (is_active, topic, subtopic, difficulty);
";

const COLUMNS: &str = "id, text, option_a, option_b, option_c, option_d, correct_option, \
                       explanation, topic, subtopic, difficulty, is_active";

/// Question bank stored in a single SQLite table.
pub struct SqliteQuestionRepository {
    conn: Mutex<Connection>,
}

struct QuestionRow {
    id: String,
    text: String,
    options: [String; 4],
    correct_option: String,
    explanation: String,
    topic: String,
    subtopic: String,
    difficulty: String,
    is_active: bool,
}

impl QuestionRow {
    fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(QuestionRow {
            id: row.get(0)?,
            text: row.get(1)?,
            options: [row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?],
            correct_option: row.get(6)?,
            explanation: row.get(7)?,
            topic: row.get(8)?,
            subtopic: row.get(9)?,
            difficulty: row.get(10)?,
            is_active: row.get(11)?,
        })
    }

    fn into_question(self) -> Result<Question, StoreError> {
        let corrupt = |field: &str, value: String| {
            StoreError::Corrupt(format!("question {}: bad {} {:?}", self.id, field, value))
        };
        let correct_option = self
            .correct_option
            .parse::<OptionKey>()
            .map_err(|value| corrupt("correct option", value))?;
        let topic = self.topic.parse::<Topic>().map_err(|value| corrupt("topic", value))?;
        let difficulty = self
            .difficulty
            .parse::<Difficulty>()
            .map_err(|value| corrupt("difficulty", value))?;
        let [a, b, c, d] = self.options;

        Ok(Question {
            id: self.id,
            text: self.text,
            options: QuestionOptions { a, b, c, d },
            correct_option,
            explanation: self.explanation,
            topic,
            subtopic: self.subtopic,
            difficulty,
            is_active: self.is_active,
        })
    }
}

fn insert(conn: &Connection, question: &Question) -> Result<(), StoreError> {
    question.validate()?;
    conn.execute(
        &format!(
            "INSERT INTO questions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            COLUMNS
        ),
        params![
            question.id,
            question.text,
            question.options.a,
            question.options.b,
            question.options.c,
            question.options.d,
            question.correct_option.as_str(),
            question.explanation,
            question.topic.as_str(),
            question.subtopic,
            question.difficulty.as_str(),
            question.is_active,
        ],
    )?;
    Ok(())
}

impl SqliteQuestionRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        info!("Question bank opened at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteQuestionRepository {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("question bank lock poisoned".to_string()))
    }

    /// Number of stored questions, active or not.
    pub fn question_count(&self) -> Result<u32, StoreError> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn insert_question(&self, new_question: NewQuestion) -> Result<Question, StoreError> {
        let question = new_question.into_question();
        insert(&*self.conn()?, &question)?;
        Ok(question)
    }

    /// Imports every question of the pack, or none of them.
    pub fn import_pack(&self, pack: QuestionPack) -> Result<usize, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut imported = 0;
        for new_question in pack.questions {
            insert(&tx, &new_question.into_question())?;
            imported += 1;
        }
        tx.commit()?;

        info!("Imported {} questions from pack {:?}", imported, pack.name);
        Ok(imported)
    }

    /// Replaces the authored content of a question, keeping its id and active flag.
    pub fn update_question(&self, id: &str, edit: NewQuestion) -> Result<bool, StoreError> {
        let mut question = edit.into_question();
        question.id = id.to_string();
        question.validate()?;

        let changed = self.conn()?.execute(
            "UPDATE questions SET text = ?2, option_a = ?3, option_b = ?4, option_c = ?5, \
             option_d = ?6, correct_option = ?7, explanation = ?8, topic = ?9, subtopic = ?10, \
             difficulty = ?11 WHERE id = ?1",
            params![
                question.id,
                question.text,
                question.options.a,
                question.options.b,
                question.options.c,
                question.options.d,
                question.correct_option.as_str(),
                question.explanation,
                question.topic.as_str(),
                question.subtopic,
                question.difficulty.as_str(),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn set_active(&self, id: &str, active: bool) -> Result<bool, StoreError> {
        let changed = self.conn()?.execute(
            "UPDATE questions SET is_active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_question(&self, id: &str) -> Result<bool, StoreError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    pub fn get_question(&self, id: &str) -> Result<Option<Question>, StoreError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM questions WHERE id = ?1", COLUMNS),
                params![id],
                QuestionRow::read,
            )
            .optional()?;
        row.map(QuestionRow::into_question).transpose()
    }
}

impl QuestionRepository for SqliteQuestionRepository {
    fn list_topics(&self) -> Result<Vec<TopicCount>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT topic, subtopic, COUNT(*) FROM questions \
             WHERE is_active = 1 GROUP BY topic, subtopic",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut parsed = Vec::with_capacity(rows.len());
        for (topic, subtopic, count) in rows {
            let topic = topic
                .parse::<Topic>()
                .map_err(|value| StoreError::Corrupt(format!("unknown topic {:?}", value)))?;
            parsed.push((topic, subtopic, count));
        }
        Ok(fold_topic_counts(parsed))
    }

    fn sample_candidates(&self, filter: &QuestionFilter) -> Result<Vec<Question>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM questions WHERE is_active = 1 \
             AND (?1 IS NULL OR topic = ?1) \
             AND (?2 IS NULL OR subtopic = ?2) \
             AND (?3 IS NULL OR difficulty = ?3) \
             ORDER BY id",
            COLUMNS
        ))?;
        let rows = stmt
            .query_map(
                params![
                    filter.topic.map(|topic| topic.as_str()),
                    filter.subtopic.as_deref(),
                    filter.difficulty.map(|difficulty| difficulty.as_str()),
                ],
                QuestionRow::read,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(QuestionRow::into_question).collect()
    }
}

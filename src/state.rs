use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use futures_channel::mpsc::UnboundedSender;
use log::debug;
use tungstenite::protocol::Message;

use crate::{
    engine::{EngineSettings, QuizEngine},
    progress::{Clock, ProgressStore},
    repository::QuestionRepository,
};

pub type Tx = UnboundedSender<Message>;
pub type TimerCancel = UnboundedSender<bool>;
pub type SharedEngine = Arc<Mutex<QuizEngine>>;

/// Collaborators shared by every connection.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn QuestionRepository>,
    pub progress: Arc<dyn ProgressStore>,
    pub clock: Arc<dyn Clock>,
    pub settings: EngineSettings,
    pub tick_interval: Duration,
    pub default_count: usize,
}

impl AppState {
    pub fn new_engine(&self) -> QuizEngine {
        QuizEngine::new(
            self.repository.clone(),
            self.progress.clone(),
            self.clock.clone(),
            self.settings,
        )
    }
}

/// One client: its outgoing channel, its engine and its question timer.
#[derive(Clone)]
pub struct Connection {
    pub id: String,
    pub tx: Tx,
    pub engine: SharedEngine,
    pub timer: Arc<Mutex<Option<TimerCancel>>>,
    pub tick_interval: Duration,
    pub default_count: usize,
}

impl Connection {
    pub fn new(id: String, tx: Tx, state: &AppState) -> Self {
        Connection {
            id,
            tx,
            engine: Arc::new(Mutex::new(state.new_engine())),
            timer: Arc::new(Mutex::new(None)),
            tick_interval: state.tick_interval,
            default_count: state.default_count,
        }
    }

    pub fn engine(&self) -> MutexGuard<'_, QuizEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs the cancel handle of a new timer, stopping the previous one.
    pub fn replace_timer(&self, cancel: TimerCancel) {
        let previous = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(cancel);
        if let Some(previous) = previous {
            stop_timer(previous);
        }
    }

    pub fn cancel_timer(&self) {
        let previous = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            stop_timer(previous);
        }
    }
}

fn stop_timer(cancel: TimerCancel) {
    if cancel.unbounded_send(true).is_err() {
        debug!("Timer already finished");
    }
}

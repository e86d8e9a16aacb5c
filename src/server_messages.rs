use std::fmt::Display;

use log::warn;
use tungstenite::protocol::Message;

use crate::{models::communication::Response, state::Tx};

pub fn send_message(response: Response, tx: &Tx, connection_id: &str) {
    let text = match serde_json::to_string(&response) {
        Ok(text) => text,
        Err(error) => {
            warn!("Could not encode response for {}: {}", connection_id, error);
            return;
        }
    };

    if let Err(error) = tx.unbounded_send(Message::Text(text)) {
        warn!("Could not queue message for {}: {}", connection_id, error);
    }
}

pub fn send_error(error: impl Display, tx: &Tx, connection_id: &str) {
    warn!("Error for {}: {}", connection_id, error);
    let response = Response::ErrorResponse {
        error_text: error.to_string(),
    };
    send_message(response, tx, connection_id);
}

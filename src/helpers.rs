use tungstenite::Message;

use crate::models::communication::Command;

pub fn parse_command(msg: &Message) -> Result<Command, serde_json::Error> {
    serde_json::from_str(&msg.to_string())
}

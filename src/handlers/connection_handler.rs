use futures_channel::mpsc::unbounded;
use futures_util::{future, pin_mut, StreamExt, TryStreamExt};
use log::{info, warn};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

use crate::{
    handlers::command_handler::execute_command,
    helpers::parse_command,
    server_messages::send_error,
    state::{AppState, Connection},
};

/// Accepts websocket clients until the listener fails.
pub async fn run_server(listener: TcpListener, state: AppState) {
    while let Ok((stream, addr)) = listener.accept().await {
        tokio::spawn(handle_connection(state.clone(), stream, addr));
    }
}

pub async fn handle_connection(state: AppState, raw_stream: TcpStream, addr: SocketAddr) {
    info!("Incoming TCP connection from: {}", &addr);

    let ws_stream = match tokio_tungstenite::accept_async(raw_stream).await {
        Ok(stream) => stream,
        Err(error) => {
            warn!("Handshake with {} error: {}", addr, error);
            return;
        }
    };
    info!("WebSocket connection established: {}", &addr);

    let (tx, rx) = unbounded();
    let connection = Connection::new(Uuid::new_v4().to_string(), tx, &state);

    let (outgoing, incoming) = ws_stream.split();

    let handle_incoming = incoming.try_for_each(|msg| {
        if msg.is_text() {
            match parse_command(&msg) {
                Ok(command) => execute_command(command, &connection),
                Err(error) => send_error(
                    format!("Error parsing command: {}", error),
                    &connection.tx,
                    &connection.id,
                ),
            }
        }

        future::ok(())
    });

    let receive_from_engine = rx.map(Ok).forward(outgoing);

    pin_mut!(handle_incoming, receive_from_engine);
    future::select(handle_incoming, receive_from_engine).await;

    info!("{} disconnected", &addr);

    connection.cancel_timer();
    if connection.engine().abort() {
        info!("Discarded unfinished quiz of {}", &addr);
    }
}

use futures_channel::mpsc::{unbounded, UnboundedReceiver};
use futures_timer::Delay;
use futures_util::{future, pin_mut, StreamExt};
use log::debug;

use crate::{
    models::{communication::Response, session::TickOutcome, session::TimerTicket},
    server_messages::send_message,
    state::Connection,
};

/// Starts the countdown for the question named by `ticket`, replacing any
/// countdown still running on this connection.
pub fn start_question_timer(connection: &Connection, ticket: TimerTicket) {
    let (cancel_tx, cancel_rx) = unbounded();
    connection.replace_timer(cancel_tx);
    tokio::spawn(handle_question_timer(connection.clone(), ticket, cancel_rx));
}

pub async fn handle_question_timer(
    connection: Connection,
    ticket: TimerTicket,
    mut cancel_rx: UnboundedReceiver<bool>,
) {
    loop {
        let delay = Delay::new(connection.tick_interval);
        pin_mut!(delay);

        match future::select(delay, cancel_rx.next()).await {
            future::Either::Left(_) => (),
            future::Either::Right(_) => {
                debug!(
                    "Timer for question {} of quiz {} stopped",
                    ticket.question_index, ticket.session_id
                );
                return;
            }
        }

        let outcome = connection.engine().tick(&ticket);
        match outcome {
            TickOutcome::Running { remaining } => {
                send_message(
                    Response::TimerResponse { remaining },
                    &connection.tx,
                    &connection.id,
                );
            }
            TickOutcome::Expired(view) => {
                send_message(Response::AnswerResponse { view }, &connection.tx, &connection.id);
                return;
            }
            TickOutcome::Stale => return,
        }
    }
}

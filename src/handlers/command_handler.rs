use log::info;

use crate::{
    engine::Advance,
    handlers::timer_handler::start_question_timer,
    models::communication::{Command, Response},
    server_messages::{send_error, send_message},
    state::Connection,
};

pub fn execute_command(command: Command, connection: &Connection) {
    let tx = &connection.tx;
    let id = connection.id.as_str();

    match &command {
        Command::ListTopics {} => {
            info!("List topics request from: {}", id);

            let result = connection.engine().list_topics();
            match result {
                Ok(topics) => send_message(Response::TopicsResponse { topics }, tx, id),
                Err(error) => send_error(error, tx, id),
            }
        }
        Command::TopicSummary {} => {
            info!("Topic summary request from: {}", id);

            let result = connection.engine().topic_summary();
            match result {
                Ok(summary) => send_message(Response::TopicSummaryResponse { summary }, tx, id),
                Err(error) => send_error(error, tx, id),
            }
        }
        Command::StartQuiz { count, .. } => {
            info!("Start quiz request from: {}", id);

            let filter = command.filter().unwrap_or_default();
            let count = count.unwrap_or(connection.default_count);
            let result = connection.engine().start_quiz(filter, count);
            match result {
                Ok(view) => {
                    start_question_timer(connection, view.ticket());
                    send_message(Response::QuestionResponse { view }, tx, id);
                }
                Err(error) => send_error(error, tx, id),
            }
        }
        Command::SubmitAnswer { option } => {
            let result = connection.engine().submit_answer(option.as_deref());
            match result {
                Ok(view) => {
                    connection.cancel_timer();
                    send_message(Response::AnswerResponse { view }, tx, id);
                }
                Err(error) => send_error(error, tx, id),
            }
        }
        Command::Advance {} => {
            let result = connection.engine().advance();
            match result {
                Ok(Advance::Next(view)) => {
                    start_question_timer(connection, view.ticket());
                    send_message(Response::QuestionResponse { view }, tx, id);
                }
                Ok(Advance::Finished(result)) => {
                    connection.cancel_timer();
                    send_message(Response::ResultResponse { result }, tx, id);
                }
                Err(error) => send_error(error, tx, id),
            }
        }
        Command::Abort {} => {
            info!("Abort request from: {}", id);

            connection.cancel_timer();
            let discarded = connection.engine().abort();
            send_message(Response::AbortResponse { discarded }, tx, id);
        }
        Command::GetBestScore { key } => {
            let result = connection.engine().best_score(key);
            match result {
                Ok(best_score) => send_message(
                    Response::BestScoreResponse {
                        key: key.clone(),
                        best_score,
                    },
                    tx,
                    id,
                ),
                Err(error) => send_error(error, tx, id),
            }
        }
        Command::GetStreak {} => {
            let result = connection.engine().streak();
            match result {
                Ok(streak) => send_message(Response::StreakResponse { streak }, tx, id),
                Err(error) => send_error(error, tx, id),
            }
        }
        Command::Heartbeat {} => {
            info!("Heartbeat from: {}", id);
        }
    }
}

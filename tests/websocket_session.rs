use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use futures_util::{SinkExt, StreamExt};
use inscovia_quiz::{
    engine::EngineSettings,
    handlers::connection_handler::run_server,
    models::question::{
        Difficulty, NewQuestion, OptionKey, QuestionOptions, QuestionPack, Topic,
    },
    progress::{FixedClock, InMemoryProgressStore},
    repository::SqliteQuestionRepository,
    state::AppState,
};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tungstenite::Message;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn pack() -> QuestionPack {
    let questions = (0..4)
        .map(|i| NewQuestion {
            id: Some(format!("quant-{}", i)),
            text: format!("What is {}0% of 100?", i + 1),
            options: QuestionOptions {
                a: format!("{}0", i + 1),
                b: "5".to_string(),
                c: "1".to_string(),
                d: "0".to_string(),
            },
            correct_option: OptionKey::A,
            explanation: "Percent means per hundred".to_string(),
            topic: Topic::Quantitative,
            subtopic: "Percentages".to_string(),
            difficulty: Difficulty::Easy,
            is_active: true,
        })
        .collect();
    QuestionPack {
        name: "percentages".to_string(),
        questions,
    }
}

async fn start_server(question_seconds: u32, tick_interval: Duration) -> String {
    let repository = SqliteQuestionRepository::open_in_memory().unwrap();
    repository.import_pack(pack()).unwrap();

    let state = AppState {
        repository: Arc::new(repository),
        progress: Arc::new(InMemoryProgressStore::new()),
        clock: Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())),
        settings: EngineSettings { question_seconds },
        tick_interval,
        default_count: 3,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(run_server(listener, state));
    format!("ws://{}", addr)
}

async fn connect(url: &str) -> Client {
    let (client, _) = connect_async(url).await.unwrap();
    client
}

async fn send(client: &mut Client, command: Value) {
    client
        .send(Message::Text(command.to_string()))
        .await
        .unwrap();
}

/// Next response other than a timer tick.
async fn receive(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("no response in time")
            .expect("connection closed")
            .unwrap();
        let value: Value = serde_json::from_str(msg.to_text().unwrap()).unwrap();
        if value["response"] != "timerResponse" {
            return value;
        }
    }
}

#[tokio::test]
async fn full_quiz_over_websocket() {
    let url = start_server(30, Duration::from_secs(1)).await;
    let mut client = connect(&url).await;

    send(&mut client, json!({"listTopics": {}})).await;
    let topics = receive(&mut client).await;
    assert_eq!(topics["response"], "topicsResponse");
    assert_eq!(topics["data"]["topics"][0]["topic"], "Quantitative");
    assert_eq!(topics["data"]["topics"][0]["count"], 4);

    send(&mut client, json!({"startQuiz": {"topic": "Quantitative"}})).await;
    let question = receive(&mut client).await;
    assert_eq!(question["response"], "questionResponse");
    assert_eq!(question["data"]["view"]["total"], 3);
    assert_eq!(question["data"]["view"]["remaining"], 30);
    assert!(question["data"]["view"]["question"].get("correctOption").is_none());

    send(&mut client, json!({"startQuiz": {}})).await;
    let busy = receive(&mut client).await;
    assert_eq!(busy["response"], "errorResponse");
    assert_eq!(busy["data"]["errorText"], "A quiz session is already in progress");

    for index in 0..3 {
        let pick = if index == 1 { "B" } else { "A" };
        send(&mut client, json!({"submitAnswer": {"option": pick}})).await;
        let answered = receive(&mut client).await;
        assert_eq!(answered["response"], "answerResponse");
        assert_eq!(answered["data"]["view"]["feedback"]["correctOption"], "A");

        send(&mut client, json!({"advance": {}})).await;
        let next = receive(&mut client).await;
        if index < 2 {
            assert_eq!(next["response"], "questionResponse");
            assert_eq!(next["data"]["view"]["index"], index + 1);
        } else {
            assert_eq!(next["response"], "resultResponse");
            assert_eq!(next["data"]["result"]["score"], 2);
            assert_eq!(next["data"]["result"]["key"], "Quantitative");
            assert_eq!(next["data"]["result"]["streak"], 1);
        }
    }

    send(&mut client, json!({"getBestScore": {"key": "Quantitative"}})).await;
    let best = receive(&mut client).await;
    assert_eq!(best["response"], "bestScoreResponse");
    assert_eq!(best["data"]["bestScore"], 2);

    send(&mut client, json!({"getStreak": {}})).await;
    let streak = receive(&mut client).await;
    assert_eq!(streak["data"]["streak"]["count"], 1);
    assert_eq!(streak["data"]["streak"]["lastDate"], "2024-01-15");
}

#[tokio::test]
async fn question_times_out_over_websocket() {
    let url = start_server(2, Duration::from_millis(20)).await;
    let mut client = connect(&url).await;

    send(&mut client, json!({"startQuiz": {"count": 2}})).await;
    let question = receive(&mut client).await;
    assert_eq!(question["response"], "questionResponse");

    let expired = receive(&mut client).await;
    assert_eq!(expired["response"], "answerResponse");
    assert_eq!(expired["data"]["view"]["feedback"]["selected"], Value::Null);
    assert_eq!(expired["data"]["view"]["feedback"]["isCorrect"], false);
    assert_eq!(expired["data"]["view"]["remaining"], 0);

    send(&mut client, json!({"advance": {}})).await;
    let next = receive(&mut client).await;
    assert_eq!(next["response"], "questionResponse");
    assert_eq!(next["data"]["view"]["index"], 1);
}

#[tokio::test]
async fn bad_input_and_abort() {
    let url = start_server(30, Duration::from_secs(1)).await;
    let mut client = connect(&url).await;

    send(&mut client, json!({"dance": {}})).await;
    let unknown = receive(&mut client).await;
    assert_eq!(unknown["response"], "errorResponse");

    send(&mut client, json!({"startQuiz": {"topic": "Verbal"}})).await;
    let empty = receive(&mut client).await;
    assert_eq!(
        empty["data"]["errorText"],
        "No questions available for this selection"
    );

    send(&mut client, json!({"startQuiz": {"count": 2}})).await;
    assert_eq!(receive(&mut client).await["response"], "questionResponse");

    send(&mut client, json!({"submitAnswer": {"option": "Z"}})).await;
    let invalid = receive(&mut client).await;
    assert_eq!(invalid["response"], "errorResponse");

    send(&mut client, json!({"abort": {}})).await;
    let aborted = receive(&mut client).await;
    assert_eq!(aborted["response"], "abortResponse");
    assert_eq!(aborted["data"]["discarded"], true);

    send(&mut client, json!({"advance": {}})).await;
    let idle = receive(&mut client).await;
    assert_eq!(idle["data"]["errorText"], "No quiz session is in progress");

    send(&mut client, json!({"getBestScore": {"key": "mixed"}})).await;
    let best = receive(&mut client).await;
    assert_eq!(best["data"]["bestScore"], 0);
}

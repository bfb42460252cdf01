use quiz_core::control::QuizControlPlane;
use quiz_core::store::MemoryQuizStore;
use quiz_mcp::{HEALTHZ_STATUS, QuizMcp};
use quiz_store::schema::DEFAULT_CREATOR_EMAIL;
use rmcp::model::{CallToolRequestParams, CallToolResult};
use rmcp::service::{RoleClient, RunningService};
use rmcp::ServiceExt;
use serde_json::{Value, json};

type Client = RunningService<RoleClient, ()>;

async fn connect(store: MemoryQuizStore) -> Client {
    let (server_transport, client_transport) = tokio::io::duplex(4096);
    let server = QuizMcp::new(QuizControlPlane::new(store));
    tokio::spawn(async move {
        if let Ok(running) = server.serve(server_transport).await {
            let _ = running.waiting().await;
        }
    });
    ().serve(client_transport)
        .await
        .expect("client should connect")
}

async fn seeded_client() -> Client {
    let store = MemoryQuizStore::new();
    store.seed_user(DEFAULT_CREATOR_EMAIL).await;
    connect(store).await
}

async fn call(client: &Client, name: &'static str, arguments: Value) -> CallToolResult {
    client
        .call_tool(CallToolRequestParams {
            meta: None,
            name: name.into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        })
        .await
        .expect("tool call should complete")
}

fn text(result: &CallToolResult) -> &str {
    result
        .content
        .first()
        .and_then(|content| content.raw.as_text())
        .map(|text| text.text.as_str())
        .expect("tool result should carry text")
}

fn body(result: &CallToolResult) -> Value {
    serde_json::from_str(text(result)).expect("tool result should be JSON")
}

fn math_quiz() -> Value {
    json!({
        "title": "Math Quiz",
        "description": "Basic math",
        "is_public": true,
        "questions": [
            {
                "question_type": "fill_blank",
                "question_text": "Complete the sentence",
                "question_data": {
                    "text_with_blanks": "The capital of Mexico is ____",
                    "blanks": ["Mexico City"]
                },
                "order_index": 0
            },
            {
                "question_type": "column_match",
                "question_text": "Match the following mathematical operations",
                "question_data": {
                    "left_column": ["3+1", "5-3", "2*4", "9/3"],
                    "right_column": ["3", "2", "8", "4"],
                    "correct_pairs": { "0": 3, "1": 1, "2": 2, "3": 0 }
                },
                "order_index": 1
            },
            {
                "question_type": "multiple_choice",
                "question_text": "What is 2+2?",
                "question_data": { "options": ["3", "4", "5", "6"], "correct_index": 1 },
                "order_index": 2
            }
        ]
    })
}

#[tokio::test]
async fn registers_every_tool() {
    let client = seeded_client().await;
    let mut names: Vec<String> = client
        .list_all_tools()
        .await
        .expect("tools should list")
        .into_iter()
        .map(|tool| tool.name.to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["create_quiz", "delete_quiz", "get_quiz", "healthz", "list_quizzes"]
    );
}

#[tokio::test]
async fn healthz_returns_status_literal() {
    let client = seeded_client().await;
    let result = call(&client, "healthz", json!({})).await;
    assert_eq!(text(&result), HEALTHZ_STATUS);
}

#[tokio::test]
async fn create_get_list_delete_round_trip() {
    let client = seeded_client().await;

    let created = body(&call(&client, "create_quiz", math_quiz()).await);
    assert_eq!(created["success"], true);
    assert_eq!(created["questions_created"], 3);
    let quiz_id = created["quiz_id"].as_str().expect("quiz id").to_string();
    assert!(!quiz_id.is_empty());

    let fetched = body(&call(&client, "get_quiz", json!({ "quiz_id": quiz_id })).await);
    assert_eq!(fetched["success"], true);
    assert_eq!(fetched["quiz"]["title"], "Math Quiz");
    let questions = fetched["questions"].as_array().expect("questions array");
    assert_eq!(questions.len(), 3);
    let sent = math_quiz();
    for (stored, given) in questions.iter().zip(sent["questions"].as_array().expect("sent")) {
        for field in ["question_type", "question_text", "question_data", "order_index"] {
            assert_eq!(stored[field], given[field], "{field} should round-trip");
        }
    }

    let listed = body(&call(&client, "list_quizzes", json!({})).await);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["id"], quiz_id.as_str());

    let deleted = body(&call(&client, "delete_quiz", json!({ "quiz_id": quiz_id })).await);
    assert_eq!(
        deleted,
        json!({
            "success": true,
            "message": format!("Quiz {quiz_id} and all related data have been deleted")
        })
    );

    let missing = body(&call(&client, "get_quiz", json!({ "quiz_id": quiz_id })).await);
    assert_eq!(missing, json!({ "success": false, "error": "Quiz not found" }));
}

#[tokio::test]
async fn missing_creator_is_reported_in_the_envelope() {
    let client = connect(MemoryQuizStore::new()).await;
    let result = call(&client, "create_quiz", math_quiz()).await;
    assert_ne!(result.is_error, Some(true));
    assert_eq!(
        body(&result),
        json!({ "success": false, "error": "User not found" })
    );
}

#[tokio::test]
async fn unknown_quiz_ids_are_not_found() {
    let client = seeded_client().await;
    let unknown = uuid::Uuid::new_v4().to_string();
    for quiz_id in [unknown.as_str(), "not-a-uuid"] {
        let deleted = body(&call(&client, "delete_quiz", json!({ "quiz_id": quiz_id })).await);
        assert_eq!(deleted, json!({ "success": false, "error": "Quiz not found" }));
    }
}

#[tokio::test]
async fn mismatched_question_payload_is_rejected_before_storage() {
    let store = MemoryQuizStore::new();
    store.seed_user(DEFAULT_CREATOR_EMAIL).await;
    let client = connect(store.clone()).await;

    let mut payload = math_quiz();
    payload["questions"][0]["question_data"] = json!({ "options": ["a"], "correct_index": 0 });
    let result = client
        .call_tool(CallToolRequestParams {
            meta: None,
            name: "create_quiz".into(),
            arguments: payload.as_object().cloned(),
            task: None,
        })
        .await;
    assert!(result.is_err());

    let listed = body(&call(&client, "list_quizzes", json!({})).await);
    assert_eq!(listed, json!([]));
    assert_eq!(store.question_count().await, 0);
}

use crate::fakes::{NeverBusy, Script, ScriptedProvider};
use chrono::{Duration, Utc};
use moodline::chat::{
    HistoryMessage, TurnOrchestrator, TurnRequest, TurnSettings, parse_cancel_typing,
};
use moodline::mood::filter::REPETITION_RESPONSES;
use moodline::mood::{FilterReason, Mood, MoodState, ResponseGrouping, Sender};
use std::sync::Arc;

fn orchestrator(provider: Arc<ScriptedProvider>) -> TurnOrchestrator {
    TurnOrchestrator::new(
        provider,
        TurnSettings::default(),
        Arc::new(NeverBusy { value: 17 }),
    )
    .unwrap()
}

#[tokio::test]
async fn apology_recovers_annoyed_mood_to_friendly() {
    let provider = Arc::new(ScriptedProvider::new(Script::Reply(
        "no worries\nwe're good",
    )));
    let engine = orchestrator(Arc::clone(&provider));

    let now = Utc::now();
    let mut state = MoodState::fresh(now - Duration::minutes(5));
    state.current_mood = Mood::Annoyed;
    state.mood_intensity = 2;

    let request = TurnRequest {
        mood_state: Some(state),
        ..TurnRequest::new("sorry about that")
    };
    let response = engine.run_turn_at(request, now).await.unwrap();

    assert!(!response.filtered);
    assert_eq!(response.mood_state.current_mood, Mood::Friendly);
    assert_eq!(response.mood_state.mood_intensity, 6);
    assert!(response.mood_state.conversation_context.user_apologized);
    assert_eq!(response.mood_state.last_mood_change_timestamp, now);

    let info = response.mood_info.unwrap();
    assert_eq!(info.previous_mood, Mood::Annoyed);
    assert_eq!(info.current_mood, Mood::Friendly);
    assert_eq!(info.intensity, 6);

    let texts: Vec<&str> = response.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["no worries", "we're good"]);
    assert!(response.messages.iter().all(|m| m.timestamp == now));

    let inputs = provider.inputs.lock().unwrap();
    assert_eq!(inputs.len(), 1);
    assert!(inputs[0].contains("Current mood: friendly (intensity: 6/10)"));
    assert!(inputs[0].ends_with("Human: sorry about that\nYou (respond with multiple separate messages):"));
    drop(inputs);

    let follow_up = TurnRequest {
        mood_state: Some(response.mood_state),
        ..TurnRequest::new("ok then")
    };
    let next = engine
        .run_turn_at(follow_up, now + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(next.mood_state.current_mood, Mood::Friendly);
    assert_eq!(
        next.mood_state.mood_intensity,
        Mood::Friendly.canonical_intensity()
    );
}

#[tokio::test]
async fn third_identical_message_is_filtered_as_repetitive() {
    let provider = Arc::new(ScriptedProvider::new(Script::Reply("sure thing")));
    let engine = orchestrator(Arc::clone(&provider));
    let start = Utc::now();

    let mut state = None;
    for i in 0..2 {
        let request = TurnRequest {
            mood_state: state.take(),
            ..TurnRequest::new("tell me a joke")
        };
        let response = engine
            .run_turn_at(request, start + Duration::minutes(i))
            .await
            .unwrap();
        assert!(!response.filtered, "send {i} should pass");
        state = Some(response.mood_state);
    }

    let before = state.clone().unwrap();
    let request = TurnRequest {
        mood_state: state,
        ..TurnRequest::new("Tell me a joke ")
    };
    let response = engine
        .run_turn_at(request, start + Duration::minutes(2))
        .await
        .unwrap();

    assert!(response.filtered);
    assert_eq!(response.filter_reason, Some(FilterReason::Repetitive));
    assert_eq!(response.messages.len(), 1);
    assert!(REPETITION_RESPONSES.contains(&response.messages[0].text.as_str()));
    assert!(response.mood_info.is_none());

    assert_eq!(response.mood_state.current_mood, before.current_mood);
    assert_eq!(response.mood_state.mood_intensity, before.mood_intensity);
    assert_eq!(response.mood_state.recent_messages.len(), 3);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn quota_failure_degrades_to_single_cancel_sentinel() {
    let provider = Arc::new(ScriptedProvider::new(Script::Quota));
    let engine = orchestrator(Arc::clone(&provider));
    let now = Utc::now();

    let request = TurnRequest {
        conversation_history: vec![HistoryMessage::user("hey"), HistoryMessage::ai("hi!")],
        ..TurnRequest::new("you are so annoying")
    };
    let response = engine.run_turn_at(request, now).await.unwrap();

    assert!(!response.filtered);
    assert_eq!(response.messages.len(), 1);
    let n = parse_cancel_typing(&response.messages[0].text).unwrap();
    assert!((10..=30).contains(&n));
    assert_eq!(n, 17);
    assert!(response.mood_info.is_none());

    let recent = &response.mood_state.recent_messages;
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].text, "you are so annoying");
    assert_eq!(recent[0].sender, Sender::User);
    assert_eq!(response.mood_state.current_mood, Mood::SlightlyAnnoyed);
}

#[tokio::test]
async fn grouping_modes_shape_the_bubbles() {
    let provider = Arc::new(ScriptedProvider::new(Script::Reply("one\ntwo\nthree")));
    let engine = orchestrator(provider);

    let single = engine
        .run_turn(TurnRequest {
            response_grouping_mode: Some(ResponseGrouping::Single),
            ..TurnRequest::new("hello")
        })
        .await
        .unwrap();
    assert_eq!(single.messages.len(), 1);
    assert_eq!(single.messages[0].text, "one two three");

    let two = engine
        .run_turn(TurnRequest {
            response_grouping_mode: Some(ResponseGrouping::TwoMax),
            ..TurnRequest::new("hello")
        })
        .await
        .unwrap();
    assert_eq!(two.messages.len(), 2);
}

#[tokio::test]
async fn legacy_request_fields_are_accepted() {
    let provider = Arc::new(ScriptedProvider::new(Script::Reply("hey you")));
    let engine = orchestrator(provider);

    let request: TurnRequest = serde_json::from_value(serde_json::json!({
        "message": "hi",
        "conversationHistory": [{ "text": "yo", "sender": "user" }],
        "aiResponseGrouping": "single",
        "customAIBehavior": "Talk like a pirate",
    }))
    .unwrap();
    assert_eq!(request.response_grouping_mode, Some(ResponseGrouping::Single));

    let response = engine.run_turn(request).await.unwrap();
    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("moodState").is_some());
    assert!(json.get("filterReason").is_none());
    assert_eq!(json["moodInfo"]["currentMood"], "friendly");
}

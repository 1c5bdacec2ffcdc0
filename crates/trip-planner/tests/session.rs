use serde_json::json;
use trip_planner::SessionBuilder;
use trip_planner::core::ReplyKind;
use trip_planner::core::conversation::Role;
use trip_planner_model::ToolCallRequest;
use trip_planner_test_model::{PresetEvent, PresetResponse, TestModelProvider};

fn call(id: &str, name: &str, arguments: serde_json::Value) -> PresetEvent {
    PresetEvent::ToolCall(ToolCallRequest {
        id: id.to_owned(),
        name: name.to_owned(),
        arguments,
    })
}

#[tokio::test]
async fn test_plans_with_all_tools() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_user_input_step();
    model_provider.add_model_response_step(PresetResponse::with_events([
        PresetEvent::MessageDelta("Let me look that up.".to_owned()),
        call(
            "call_0",
            "get_weather_forecast",
            json!({ "city": "Paris", "days": 2 }),
        ),
        call(
            "call_1",
            "search_tourist_attractions",
            json!({ "city": "Paris", "category": "museum" }),
        ),
        call(
            "call_2",
            "optimize_budget",
            json!({
                "destinations": ["Paris"],
                "total_budget": 1500,
                "days_per_destination": [3],
            }),
        ),
        call(
            "call_3",
            "search_flights_hotels",
            json!({
                "origin": "London",
                "destination": "Paris",
                "departure_date": "2026-05-01",
            }),
        ),
    ]));
    for _ in 0..4 {
        model_provider.add_tool_result_step();
    }
    model_provider.add_model_response_step(PresetResponse::with_text(
        "Day 1: Louvre. Day 2: Eiffel Tower. Day 3: rest.",
    ));

    let mut session =
        SessionBuilder::with_model_provider(model_provider.clone()).build();
    let reply = session
        .ask("Plan a 3-day trip to Paris with a budget of $1500.")
        .await
        .unwrap();

    assert_eq!(reply.kind, ReplyKind::Answer);
    assert_eq!(reply.text, "Day 1: Louvre. Day 2: Eiffel Tower. Day 3: rest.");
    assert_eq!(model_provider.request_count(), 2);

    let tool_outputs: Vec<_> = session
        .conversation()
        .iter()
        .filter(|item| item.role() == Role::ToolResult)
        .map(|item| item.transcript().to_owned())
        .collect();
    assert_eq!(tool_outputs.len(), 4);
    assert_eq!(
        tool_outputs[0],
        "Weather forecast for Paris:\n\
         Day 1: 22°C, Sunny, Humidity: 65%\n\
         Day 2: 24°C, Partly Cloudy, Humidity: 70%\n"
    );
    assert_eq!(
        tool_outputs[1],
        "Tourist attractions in Paris:\n\
         1. Louvre Museum (museum) - Rating: 4.9/5, Price: €17\n"
    );
    assert!(tool_outputs[2].starts_with("Budget Optimization for 1500.0 USD:\n"));
    assert!(tool_outputs[2].contains("Estimated cost: $450.00 ($150/day)"));
    assert!(tool_outputs[3].contains("Departure: 2026-05-01 (One-way)"));
}

#[tokio::test]
async fn test_bad_arguments_reach_the_model() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_user_input_step();
    model_provider.add_model_response_step(PresetResponse::with_events([
        call(
            "call_0",
            "optimize_budget",
            json!({
                "destinations": ["Paris"],
                "total_budget": 1500,
                "days_per_destination": [0],
            }),
        ),
    ]));
    model_provider.add_tool_result_step();
    model_provider.add_model_response_step(PresetResponse::with_text(
        "How many days will you stay?",
    ));

    let mut session =
        SessionBuilder::with_model_provider(model_provider).build();
    let reply = session.ask("Budget for Paris").await.unwrap();

    assert_eq!(reply.text, "How many days will you stay?");
    let tool_item = session.conversation().iter().nth(2).unwrap();
    assert_eq!(
        tool_item.transcript(),
        "Error: total number of days must be greater than zero"
    );
}

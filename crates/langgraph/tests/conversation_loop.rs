//! End-to-end runs of ReactAgent: model ⇄ tools loop, iteration cap, failures.

use std::sync::Arc;

use langgraph::{
    AgentError, LlmError, LlmResponse, Message, MockLlm, MockToolSource, ReactAgent, StopReason,
};

fn tools() -> Arc<MockToolSource> {
    Arc::new(
        MockToolSource::new()
            .with_tool("search_movie_info", "query", "- Heath Ledger as Joker")
            .with_tool("calculator", "expression", "4"),
    )
}

#[tokio::test]
async fn tool_round_then_final_answer() {
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::tool_call("search_movie_info", r#"{"query":"The Dark Knight cast"}"#),
        LlmResponse::text("Joker -> Heath Ledger"),
    ]));
    let agent = ReactAgent::new(llm.clone(), tools(), 5).await.unwrap();
    let out = agent.run("sys", "Who is in The Dark Knight?").await.unwrap();

    assert_eq!(out.final_answer(), Some("Joker -> Heath Ledger"));
    assert_eq!(out.model_calls, 2);
    assert_eq!(llm.calls(), 2);
    // The second model call saw the tool answer.
    let second = &llm.requests()[1];
    assert!(matches!(second.last(), Some(Message::Tool(r)) if r.content.contains("Heath Ledger")));
}

#[tokio::test]
async fn every_request_gets_exactly_one_tool_message() {
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::default().with_tool_calls(vec![
            langgraph::ToolCall::new("calculator", r#"{"expression":"2+2"}"#),
            langgraph::ToolCall::new("unknown_tool", "{}"),
        ]),
        LlmResponse::text("done"),
    ]));
    let agent = ReactAgent::new(llm, tools(), 5).await.unwrap();
    let out = agent.run("sys", "q").await.unwrap();
    let results: Vec<_> = out.tool_results().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].success);
    assert!(!results[1].success);
    assert_eq!(out.final_answer(), Some("done"));
}

#[tokio::test]
async fn model_that_never_stops_hits_iteration_cap() {
    let llm = Arc::new(MockLlm::always(LlmResponse::tool_call(
        "calculator",
        r#"{"expression":"1+1"}"#,
    )));
    let agent = ReactAgent::new(llm.clone(), tools(), 3).await.unwrap();
    let out = agent.run("sys", "loop forever").await.unwrap();

    assert_eq!(llm.calls(), 3);
    assert_eq!(out.model_calls, 3);
    assert_eq!(out.stop_reason, Some(StopReason::IterationLimitExceeded { limit: 3 }));
    assert!(out.final_answer().is_none());
    assert_eq!(out.tool_results().count(), 3);
}

#[tokio::test]
async fn single_iteration_allows_one_model_call() {
    let llm = Arc::new(MockLlm::always(LlmResponse::tool_call(
        "calculator",
        r#"{"expression":"1+1"}"#,
    )));
    let agent = ReactAgent::new(llm.clone(), tools(), 1).await.unwrap();
    let out = agent.run("sys", "q").await.unwrap();
    assert_eq!(llm.calls(), 1);
    assert!(out.hit_iteration_limit());
}

#[tokio::test]
async fn model_failure_fails_the_run() {
    let llm = Arc::new(MockLlm::failing(LlmError::Network("refused".into())));
    let agent = ReactAgent::new(llm, tools(), 3).await.unwrap();
    let err = agent.run("sys", "q").await.unwrap_err();
    assert!(matches!(err, AgentError::Llm(LlmError::Network(_))));
}

#[tokio::test]
async fn agent_exposes_tools_and_graph() {
    let agent = ReactAgent::new(Arc::new(MockLlm::with_no_tool_calls("x")), tools(), 4)
        .await
        .unwrap();
    assert_eq!(agent.tools().len(), 2);
    assert_eq!(agent.max_iterations(), 4);
    assert_eq!(agent.graph().recursion_limit(), 10);
    let mermaid = agent.graph().draw_mermaid();
    assert!(mermaid.contains("model -.-> tools;"));
    assert!(mermaid.contains("tools --> model;"));
}

#[tokio::test]
async fn huge_iteration_cap_saturates_recursion_limit() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("done"));
    let agent = ReactAgent::new(llm, tools(), usize::MAX).await.unwrap();
    assert_eq!(agent.graph().recursion_limit(), usize::MAX);
    let out = agent.run("sys", "q").await.unwrap();
    assert_eq!(out.final_answer(), Some("done"));
}

//! Goal answers from the checker's JSON.
//!
//! The plain-goal request answers `{ goals: string[], rendered: string }` or `null`. When the
//! goal method is pointed at `textDocument/hover` instead, the answer is hover-shaped
//! (`{ contents }`). Both map onto [`QueryAnswer`].

use livecheck::QueryAnswer;
use serde_json::Value;

/// Extract the goal text from a goal-request result.
///
/// `goals` wins (joined by a blank line), then `rendered`, then hover `contents`. `null`, an
/// empty goal list, or anything unrecognised is an absent answer.
pub fn extract_goal_state(result: &Value) -> QueryAnswer {
    if let Some(goals) = result.get("goals").and_then(Value::as_array) {
        let goals: Vec<&str> = goals.iter().filter_map(Value::as_str).collect();
        if goals.is_empty() {
            return QueryAnswer::absent();
        }
        return QueryAnswer::with_state(goals.join("\n\n"));
    }

    if let Some(rendered) = result.get("rendered").and_then(Value::as_str) {
        return QueryAnswer::with_state(rendered);
    }

    if let Some(contents) = result.get("contents") {
        let parts = hover_parts(contents);
        if parts.is_empty() {
            return QueryAnswer::absent();
        }
        return QueryAnswer::with_state(parts.join("\n\n"));
    }

    QueryAnswer::absent()
}

fn hover_parts(contents: &Value) -> Vec<String> {
    match contents {
        Value::String(s) => vec![s.clone()],
        // MarkupContent `{ kind, value }` or MarkedString `{ language, value }`.
        Value::Object(obj) => obj
            .get("value")
            .and_then(Value::as_str)
            .map(|s| vec![s.to_string()])
            .unwrap_or_default(),
        Value::Array(items) => items.iter().flat_map(hover_parts).collect(),
        _ => Vec::new(),
    }
}

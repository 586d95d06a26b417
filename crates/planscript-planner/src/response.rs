//! Parsing planner responses into checked programs.

use planscript_core::Program;
use planscript_eval::{check_program, PlanningError, PlanningRequest};

/// Parses a planner's JSON text into a program and checks it against the
/// request.
///
/// Markdown code fences around the JSON are tolerated. Malformed JSON or a
/// document that is not a program gives [`PlanningError::InvalidResponse`];
/// a program that fails checking gives [`PlanningError::InvalidProgram`].
pub fn parse_program_response(raw: &str, request: &PlanningRequest) -> Result<Program, PlanningError> {
    let text = strip_code_fence(raw);
    let value: serde_json::Value = serde_json::from_str(text).map_err(|err| PlanningError::InvalidResponse {
        reason: format!("not valid JSON: {}", err),
    })?;
    let program: Program = serde_json::from_value(value).map_err(|err| PlanningError::InvalidResponse {
        reason: format!("JSON is not a program: {}", err),
    })?;
    check_program(&program, request).map_err(|issues| PlanningError::InvalidProgram { issues })?;
    Ok(program)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

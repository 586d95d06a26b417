//! Deterministic planner prompts.
//!
//! The prompt lists the instructions, the program's inputs and expected
//! outputs, and every offered tool with its signature and invocation schema.
//! Retries append the diagnostics of the previous attempt.

use planscript_core::PlaceholderContract;
use planscript_eval::PlanningRequest;
use serde::Serialize;

/// Diagnostics from a rejected attempt, fed back into the next prompt.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RepairContext {
    pub attempt: u32,
    pub max_attempts: u32,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

pub fn build_planning_prompt(request: &PlanningRequest, repair: Option<&RepairContext>) -> String {
    let tools = if request.tools.is_empty() {
        "No tools are available.".to_string()
    } else {
        request
            .tools
            .iter()
            .map(|tool| {
                let schema = tool
                    .template
                    .to_json_schema()
                    .ok()
                    .and_then(|s| serde_json::to_string(&s).ok())
                    .unwrap_or_default();
                format!(
                    "- {}\n  {}\n  invocation schema: {}",
                    tool.definition,
                    tool.definition.description,
                    schema
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let repair_block = repair
        .and_then(|context| serde_json::to_string_pretty(context).ok())
        .map(|raw| {
            format!(
                "\n\nYour previous program was rejected. Fix every issue below.\nLatest diagnostics:\n{}",
                raw
            )
        })
        .unwrap_or_default();

    format!(
        "You write programs in a small assignment language.\n\
Return only JSON with no markdown and no surrounding text.\n\
{}\n\
\n\
Instructions:\n{}\n\
\n\
Inputs (variables in scope at the start):\n{}\n\
\n\
Expected outputs (the return statement must produce exactly these):\n{}\n\
\n\
Tools:\n{}{}",
        PROGRAM_GUIDE,
        request.instructions,
        render_contract(&request.inputs),
        render_contract(&request.outputs),
        tools,
        repair_block
    )
}

fn render_contract(contract: &PlaceholderContract) -> String {
    let mut lines: Vec<String> = contract
        .placeholders
        .iter()
        .map(|(name, slot)| {
            if slot.description.is_empty() {
                format!("- {}: {}", name, slot.dtype)
            } else {
                format!("- {}: {} ({})", name, slot.dtype, slot.description)
            }
        })
        .collect();
    if let Some(extras) = &contract.extras {
        lines.push(format!("- any other name: {}", extras.dtype));
    }
    if lines.is_empty() {
        "(none)".to_string()
    } else {
        lines.join("\n")
    }
}

const PROGRAM_GUIDE: &str = r#"Program format:
{
  "statements": [
    {
      "assignments": {"<local name>": "<name returned by the tool>"},
      "rhs_expression": {"expr_type": "invocation", "name": "<tool>", "arguments": {"<arg>": <expression>}}
    }
  ],
  "return_statement": {"return_values": {"<output name>": <expression>}}
}
Expressions:
- {"expr_type": "variable", "name": "<input or assigned local>"}
- {"expr_type": "literal", "value": <string, number or boolean>}
- {"expr_type": "invocation", ...} only as an assignment right-hand side.
Rules:
- Statements run in order; a variable must be an input or assigned earlier.
- Each assignment right-hand side is one tool invocation.
- Tool arguments are expressions, never bare values."#;

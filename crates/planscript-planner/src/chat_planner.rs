//! A [`Planner`] backed by a chat-completions model.

use planscript_core::Program;
use planscript_eval::{Planner, PlanningError, PlanningRequest};
use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::error::ProviderError;
use crate::llm_provider::{ChatTransport, OpenAiCompatibleClient};
use crate::prompt::{build_planning_prompt, RepairContext};
use crate::response::parse_program_response;

/// Plans programs by prompting a language model, retrying with the previous
/// attempt's diagnostics until a program checks or attempts run out.
#[derive(Debug, Clone)]
pub struct ChatPlanner<T = OpenAiCompatibleClient> {
    transport: T,
    max_attempts: u32,
}

impl ChatPlanner<OpenAiCompatibleClient> {
    pub fn from_config(config: PlannerConfig) -> Result<Self, ProviderError> {
        let max_attempts = config.max_attempts;
        Ok(ChatPlanner::new(OpenAiCompatibleClient::new(config)?, max_attempts))
    }

    /// Configures a planner from `PLANSCRIPT_PLANNER_*` variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_config(PlannerConfig::from_env())
    }
}

impl<T: ChatTransport> ChatPlanner<T> {
    pub fn new(transport: T, max_attempts: u32) -> Self {
        ChatPlanner {
            transport,
            max_attempts: max_attempts.max(1),
        }
    }
}

impl<T: ChatTransport> Planner for ChatPlanner<T> {
    fn plan(&self, request: &PlanningRequest) -> Result<Program, PlanningError> {
        let mut repair: Option<RepairContext> = None;
        let mut last = None;

        for attempt in 1..=self.max_attempts {
            let prompt = build_planning_prompt(request, repair.as_ref());
            info!(attempt, max_attempts = self.max_attempts, "requesting program from planner");

            let error = match self.transport.complete_json(&prompt) {
                Ok(raw) => match parse_program_response(&raw, request) {
                    Ok(program) => return Ok(program),
                    Err(err) => err,
                },
                Err(err) if !err.is_retryable() => return Err(err.into()),
                Err(err) => err.into(),
            };

            warn!(attempt, %error, "planner attempt rejected");
            repair = Some(RepairContext {
                attempt,
                max_attempts: self.max_attempts,
                summary: error.to_string(),
                diagnostics: diagnostics(&error),
            });
            last = Some(error);
        }

        Err(PlanningError::Exhausted {
            attempts: self.max_attempts,
            last: Box::new(last.unwrap_or(PlanningError::Unavailable {
                reason: "no attempt was made".to_string(),
            })),
        })
    }
}

fn diagnostics(error: &PlanningError) -> Vec<String> {
    match error {
        PlanningError::InvalidProgram { issues } => issues.iter().map(ToString::to_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Scripted {
        replies: RefCell<Vec<Result<String, ProviderError>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl ChatTransport for &Scripted {
        fn complete_json(&self, user_message: &str) -> Result<String, ProviderError> {
            self.prompts.borrow_mut().push(user_message.to_string());
            self.replies.borrow_mut().remove(0)
        }
    }

    fn request() -> PlanningRequest {
        PlanningRequest::new(
            "noop",
            Default::default(),
            Default::default(),
            &planscript_eval::stdlib::callables(),
        )
        .unwrap()
    }

    const EMPTY_PROGRAM: &str = r#"{"statements": [], "return_statement": {"return_values": {}}}"#;

    #[test]
    fn non_retryable_provider_error_stops_immediately() {
        let script = Scripted {
            replies: RefCell::new(vec![Err(ProviderError::Unconfigured { reason: "x".into() })]),
            prompts: RefCell::new(vec![]),
        };
        let err = ChatPlanner::new(&script, 3).plan(&request()).unwrap_err();
        assert!(matches!(err, PlanningError::Unavailable { .. }));
        assert_eq!(script.prompts.borrow().len(), 1);
    }

    #[test]
    fn retries_after_bad_json() {
        let script = Scripted {
            replies: RefCell::new(vec![Ok("not json".into()), Ok(EMPTY_PROGRAM.into())]),
            prompts: RefCell::new(vec![]),
        };
        let program = ChatPlanner::new(&script, 3).plan(&request()).unwrap();
        assert!(program.statements.is_empty());
        let prompts = script.prompts.borrow();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("not valid JSON"));
    }
}

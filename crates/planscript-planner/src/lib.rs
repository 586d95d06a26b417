//! Language-model planning for self-planned callables.
//!
//! [`ChatPlanner`] implements [`planscript_eval::Planner`] over an
//! OpenAI-compatible chat-completions API. Responses are parsed into
//! programs and checked before they are returned; rejected attempts are
//! retried with their diagnostics in the prompt.
//!
//! # Modules
//!
//! - [`config`]: PlannerConfig read from `PLANSCRIPT_PLANNER_*` variables
//! - [`llm_provider`]: blocking chat client and the ChatTransport seam
//! - [`prompt`]: deterministic prompt construction
//! - [`response`]: response parsing and checking
//! - [`chat_planner`]: the retrying planner

pub mod chat_planner;
pub mod config;
pub mod error;
pub mod llm_provider;
pub mod prompt;
pub mod response;

pub use chat_planner::ChatPlanner;
pub use config::PlannerConfig;
pub use error::ProviderError;
pub use llm_provider::{ChatTransport, OpenAiCompatibleClient};
pub use prompt::{build_planning_prompt, RepairContext};
pub use response::parse_program_response;

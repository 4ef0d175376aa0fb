//! Shared State domain.
//!
//! - [`key::StateKey`]: validated state key
//! - [`shared_state::SharedState`]: the per-run key-value context
//! - [`template::InstructionTemplate`]: instruction text bound to state keys

pub mod key;
pub mod shared_state;
pub mod template;

/// Well-known keys used by the runners and the think tank coordinator.
pub mod keys {
    pub const USER_NAME: &str = "user_name";
    pub const USER_EMAIL: &str = "user_email";
    pub const TODAYS_DATE: &str = "todays_date";
    pub const USER_LANGUAGE: &str = "user_language";
    pub const USER_PREFERENCES: &str = "user_preferences";
    pub const USER_REQUEST: &str = "user_request";
    pub const CLARIFICATION_OUTPUT: &str = "clarification_output";
    pub const CLARIFICATION_QUESTIONS: &str = "clarification_questions";
    pub const CLARIFICATION_ANSWERS: &str = "clarification_answers";
    pub const SYNTHESIS_OUTPUT: &str = "synthesis_output";
    pub const FINAL_REPORT: &str = "final_report";
    pub const EMAIL: &str = "email";
}

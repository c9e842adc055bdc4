// src/session/mod.rs

pub mod machine;
pub mod registry;

pub use machine::{
    AdvanceOutcome, SessionError, SessionQuestion, SessionState, TestConfig, TestSession,
    final_score_percent, is_correct_answer,
};
pub use registry::SessionRegistry;

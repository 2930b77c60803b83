pub mod company;
pub mod task;
pub mod user;

pub use company::{Company, CompanyInput, CompanyMode};
pub use task::{Task, TaskInput, TaskPriority, TaskStatus};
pub use user::{User, UserInput};

/// A stored enum code that does not map to any known variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} code: {code}")]
pub struct UnknownCode {
    kind: &'static str,
    code: String,
}

impl UnknownCode {
    fn new(kind: &'static str, code: String) -> Self {
        Self { kind, code }
    }
}

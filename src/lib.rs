// Drill core shared by the binary and the integration tests.
// Terminal rendering lives in the binary only.
pub mod answer_pad;
pub mod app_dirs;
pub mod config;
pub mod logging;
pub mod question;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod util;

pub use question::{generate_many, generate_one, Operation, Question};
pub use scoring::{calculate_score, check_answer, Review};
pub use session::{PhaseKind, SessionController, Shortfall, StartOutcome, TestConfig};

//! CLI command handlers, one file per command.

mod apply;
mod command;
mod completions;
mod ensure;

pub use apply::run_apply;
pub use command::run_command;
pub use completions::{run_completions, run_man};
pub use ensure::{run_ensure, EnsureArgs};

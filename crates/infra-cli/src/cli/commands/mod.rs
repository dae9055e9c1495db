//! CLI command handlers, one file per subcommand.

mod create;
mod layout;
mod prompt;
mod tools;

pub use create::{run_create, ToolsChoice};
pub use layout::run_layout;
pub use tools::run_tools;

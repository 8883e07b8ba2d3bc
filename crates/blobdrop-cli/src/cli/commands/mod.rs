//! CLI command handlers, one per file.

mod checksum;
mod closest;
mod completions;
mod save;

pub use checksum::run_checksum;
pub use closest::run_closest;
pub use completions::{run_completions, run_manpage};
pub use save::run_save;

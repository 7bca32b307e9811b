//! CLI commands: resolve the configuration, run one use case and print its report.

mod link;
mod list;
mod revert;
mod status;
mod unlink;

pub use link::link;
pub use list::list;
pub use revert::revert;
pub use status::status;
pub use unlink::unlink;

/// Program name used in follow-up hints.
pub(crate) const PROGRAM: &str = "modlink";

pub(crate) fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
}

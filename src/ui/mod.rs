//! Terminal output helpers
//!
//! Status lines go to stderr so page content can be piped from stdout.
//! Interactive terminals get a spinner and symbols; CI and pipes get plain
//! bracketed prefixes.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{step_ok_detail, step_warn_hint};
pub use progress::TaskSpinner;

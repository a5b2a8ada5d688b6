mod apply_action;
mod finish_match;
mod match_view;
mod start_match;

pub use apply_action::*;
pub use finish_match::*;
pub use match_view::*;
pub use start_match::*;

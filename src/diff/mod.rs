//! Change detection - decides which sources need copying this cycle

mod compare;

pub use compare::{should_copy, source_state, SourceState};

//! Rule-table grammar model
//!
//! The TJP grammar is a table of named rules built once per process and
//! shared read-only. Appends made by `extend` live in the parse context.

pub mod error;
pub mod rule;
pub mod symbol;
pub mod table;
pub mod value;

pub use error::GrammarError;
pub use rule::{Action, Pattern, Rule};
pub use symbol::{RuleId, Symbol, Terminal};
pub use table::{GrammarBuilder, GrammarTable, RuleBuilder};
pub use value::{IntervalEnd, MatchedValue, Value, Values};

use std::sync::{Arc, OnceLock};

static TJP_GRAMMAR: OnceLock<Result<Arc<GrammarTable>, GrammarError>> = OnceLock::new();

/// The TJP grammar, built and validated on first use
pub fn tjp_grammar() -> Result<Arc<GrammarTable>, GrammarError> {
    TJP_GRAMMAR
        .get_or_init(|| crate::rules::build_grammar().map(Arc::new))
        .clone()
}

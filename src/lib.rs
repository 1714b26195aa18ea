//! `qrawlr` is a self-describing grammar engine: it compiles a rule set
//! out of matcher primitives (literals, ranges, sequences, alternations,
//! rule references, stack references) and applies it to input text via
//! recursive backtracking, producing a parse tree.
//!
//! There is no textual grammar DSL here — rule sets are built directly
//! in Rust using [`Matcher`] and [`Rule`] constructors (see `macros.rs`
//! for the `rule!`/`matcher!` convenience layer). Parsing a textual
//! grammar description, rendering a parse tree to a file, or driving a
//! CLI test harness over many cases are all out of scope; see
//! `src/main.rs` for a minimal interactive demo instead.
//!
//! # Example
//!
//! ```
//! use qrawlr::{Matcher, Rule, RuleSet, apply, Options};
//!
//! let mut rules = RuleSet::new();
//! rules.insert(Rule::new("Greeting", vec![vec![Matcher::exact("hi"), Matcher::exact("!")]]));
//!
//! let outcome = apply(&rules, "hi!", "Greeting", "<input>", &Options::default()).unwrap();
//! assert_eq!(outcome.tree.unwrap().to_matched_string(), "hi!");
//! ```

#[macro_use]
mod macros;
mod api;
mod engine;

pub use api::{ApplyOutcome, Options, apply};
pub use engine::{
    Action, ActionArg, ActionTable, ApplyMetrics, GrammarError, Leaf, MatchRepl, Matcher, MatcherKind, ParseTree, Position,
    Rule, RuleSet, TreeNode,
};

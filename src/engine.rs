//! Grammar-matching engine.
//!
//! This module is the *public entry point* for the engine. It is split
//! into focused submodules under `src/engine/`, each owning one concern
//! of spec §4's component design.
//!
//! ## How the parts work together
//!
//! Applying a rule set to an input string is a single recursive walk,
//! not a saturation pipeline:
//!
//! ```text
//! RuleSet + entry rule name  ──┐
//!                              │
//! input text ── ParseState::new (state.rs)
//!                              │
//!                              v
//!                    Rule::match_rule (ruleset.rs)
//!                      - try each option in order
//!                      - each option funnels through the shared driver
//!                              │
//!                              v
//!              Matcher::match_with_modifiers (driver.rs)
//!                - checkpoint stacks
//!                - loop: Matcher::match_specific (matcher.rs)
//!                - apply inversion / look-ahead / omission / replacement
//!                - dispatch onMatch / onFail actions (actions.rs)
//!                              │
//!                              v
//!                         ParseTree (tree.rs)
//! ```
//!
//! Unlike a saturating engine, a grammar here has exactly one entry
//! point and one attempt: there is no fixpoint iteration, no stash of
//! candidate nodes, and no dimension-specific resolution pass. Failure
//! is not an error — it is `Ok((None, _))` all the way up (spec §7).
//!
//! ## Responsibilities by module
//!
//! - `position.rs`: newline-offset cache, byte index → line/column.
//! - `tree.rs`: `ParseTree`/`TreeNode`/`Leaf`, splice/omit/fuse.
//! - `error.rs`: `GrammarError`, the only fatal (non-parse-failure) error.
//! - `state.rs`: `ParseState`, effect stacks, checkpoint/restore, recursion depth.
//! - `actions.rs`: the four built-in actions (`push`/`pop`/`message`/`fail`).
//! - `matcher.rs`: the seven matcher variants' bare, unmodified attempts.
//! - `driver.rs`: the single modifier-aware wrapper every matcher call goes through.
//! - `ruleset.rs`: `Rule`/`RuleSet`, a rule as an alternation of option sequences.
//! - `metrics.rs`: minimal timing for `apply` calls.
//!
//! ## Debugging
//!
//! Set `RUST_LOG=qrawlr=trace` (or similar) to see `message` actions and
//! any other `log` output an embedding application chooses to surface.

pub mod actions;
pub mod driver;
pub mod error;
pub mod matcher;
pub mod metrics;
pub mod position;
pub mod ruleset;
pub mod state;
pub mod tree;

pub use actions::{Action, ActionArg, ActionTable};
pub use error::GrammarError;
pub use matcher::{MatchRepl, Matcher, MatcherKind};
pub use metrics::ApplyMetrics;
pub use position::Position;
pub use ruleset::{Rule, RuleSet};
pub use state::ParseState;
pub use tree::{Leaf, ParseTree, TreeNode};

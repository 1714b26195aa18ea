//! Parse state.
//!
//! One [`ParseState`] is created per [`crate::api::apply`] call and
//! discarded when it returns (spec §3, "Lifecycle"). It owns the input
//! text, the rule set it resolves `RuleRef`/`StackRef` matchers against,
//! every named effect stack plus its rollback history, the farthest-match
//! cursor used for diagnostics, and the recursion-depth counter that
//! backs the guard described in spec §5.

use std::collections::HashMap;

use crate::engine::error::GrammarError;
use crate::engine::position::{Position, PositionIndex};
use crate::engine::ruleset::RuleSet;

/// One recorded stack mutation, used to reverse it during
/// [`ParseState::restore_checkpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StackOp {
    Push(String),
    Pop(String),
}

/// A snapshot of every live stack's history length, taken before a match
/// attempt so it can be rolled back to on failure.
#[derive(Debug, Clone, Default)]
pub struct Checkpoint {
    lengths: HashMap<String, usize>,
}

/// Recursion depth at which `engine::driver` raises an integrity error
/// instead of risking host stack exhaustion (spec §5), unless overridden
/// by `Options::max_depth` at `apply` time.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

pub struct ParseState<'a> {
    text: &'a str,
    filename: &'a str,
    rules: &'a RuleSet,
    stacks: HashMap<String, Vec<String>>,
    stack_histories: HashMap<String, Vec<StackOp>>,
    farthest_match_index: usize,
    positions: PositionIndex,
    /// Current recursion depth through `engine::driver::match_with_modifiers`.
    pub(crate) depth: usize,
    max_depth: usize,
    cancelled: Option<&'a (dyn Fn() -> bool + Send + Sync)>,
}

impl<'a> ParseState<'a> {
    pub fn new(text: &'a str, filename: &'a str, rules: &'a RuleSet) -> Self {
        ParseState {
            text,
            filename,
            rules,
            stacks: HashMap::new(),
            stack_histories: HashMap::new(),
            farthest_match_index: 0,
            positions: PositionIndex::build(text),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            cancelled: None,
        }
    }

    /// Override the recursion-depth guard (spec §5's `Options.max_depth`).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Install an optional cancellation callback (spec §5), checked once
    /// per `engine::driver::match_with_modifiers` invocation.
    pub fn with_cancellation(mut self, cancelled: Option<&'a (dyn Fn() -> bool + Send + Sync)>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether the host has asked this parse to abort (spec §5).
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.map(|f| f()).unwrap_or(false)
    }

    pub fn filename(&self) -> &str {
        self.filename
    }

    pub fn farthest_match_index(&self) -> usize {
        self.farthest_match_index
    }

    /// Raise `farthest_match_index` to `index` if it is further along
    /// than what has been seen so far (spec §4.3 step 5, §8).
    pub(crate) fn note_reached(&mut self, index: usize) {
        if self.farthest_match_index < index {
            self.farthest_match_index = index;
        }
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains(name)
    }

    pub fn get_rule(&self, name: &str) -> Result<&'a crate::engine::ruleset::Rule, GrammarError> {
        self.rules.get(name).map_err(|e| e.with_location(self.filename, self.get_position(0)))
    }

    pub fn eof(&self, index: usize) -> bool {
        index >= self.text.len()
    }

    pub fn startswith(&self, value: &str, index: usize) -> bool {
        self.text.get(index..).map(|rest| rest.starts_with(value)).unwrap_or(value.is_empty())
    }

    /// The byte at `index`, as a single-character `&str`, or `None` at EOF.
    pub fn char_at(&self, index: usize) -> Option<&'a str> {
        if self.eof(index) { None } else { self.text.get(index..)?.get(..self.char_len_at(index)?) }
    }

    fn char_len_at(&self, index: usize) -> Option<usize> {
        self.text.get(index..)?.chars().next().map(|c| c.len_utf8())
    }

    pub fn get_position(&self, index: usize) -> Position {
        self.positions.get_position(index)
    }

    /// Lazily create `name`'s stack (and its parallel history) on first
    /// access, exactly like `ParseData.get_stack` in the original.
    fn ensure_stack(&mut self, name: &str) {
        if !self.stacks.contains_key(name) {
            self.stacks.insert(name.to_string(), Vec::new());
            self.stack_histories.insert(name.to_string(), Vec::new());
        }
    }

    pub fn stack(&mut self, name: &str) -> &Vec<String> {
        self.ensure_stack(name);
        &self.stacks[name]
    }

    pub(crate) fn push_stack(&mut self, name: &str, value: String) {
        self.ensure_stack(name);
        self.stack_histories.get_mut(name).unwrap().push(StackOp::Push(value.clone()));
        self.stacks.get_mut(name).unwrap().push(value);
    }

    pub(crate) fn pop_stack(&mut self, name: &str) -> Result<String, GrammarError> {
        self.ensure_stack(name);
        let value = self
            .stacks
            .get_mut(name)
            .unwrap()
            .pop()
            .ok_or_else(|| GrammarError::integrity(format!("cannot pop from empty stack '{name}'")))?;
        self.stack_histories.get_mut(name).unwrap().push(StackOp::Pop(value.clone()));
        Ok(value)
    }

    pub fn get_checkpoint(&self) -> Checkpoint {
        Checkpoint { lengths: self.stack_histories.iter().map(|(k, v)| (k.clone(), v.len())).collect() }
    }

    /// Undo every stack mutation recorded since `checkpoint` was taken,
    /// in LIFO order (spec §4.4, §9).
    ///
    /// Rolls back *every currently-live stack*, not just the ones named in
    /// `checkpoint`: a stack created after the checkpoint was taken (lazy
    /// creation, §4.4) is absent from `checkpoint.lengths` and must be
    /// unwound all the way to empty, not left untouched.
    pub(crate) fn restore_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), GrammarError> {
        let names: Vec<String> = self.stack_histories.keys().cloned().collect();
        for name in names {
            let target_len = checkpoint.lengths.get(&name).copied().unwrap_or(0);
            let history = self.stack_histories.get_mut(&name).expect("name came from stack_histories' own keys");
            let stack = self.stacks.get_mut(&name).expect("stacks and stack_histories stay parallel");
            while history.len() > target_len {
                match history.pop().expect("loop condition guarantees a popped entry") {
                    StackOp::Push(_) => {
                        stack.pop().ok_or_else(|| {
                            GrammarError::integrity(format!("rollback desync: stack '{name}' unexpectedly empty"))
                        })?;
                    }
                    StackOp::Pop(value) => stack.push(value),
                }
            }
        }
        Ok(())
    }

    pub fn stacks_are_empty(&self) -> bool {
        self.stacks.values().all(|s| s.is_empty())
    }

    /// Names of every stack that still holds values, for diagnostics
    /// (spec §4.8 step 5).
    pub fn nonempty_stack_names(&self) -> Vec<&str> {
        self.stacks.iter().filter(|(_, v)| !v.is_empty()).map(|(k, _)| k.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ruleset::RuleSet;

    fn state(text: &'static str) -> ParseState<'static> {
        let rules: &'static RuleSet = Box::leak(Box::new(RuleSet::new()));
        ParseState::new(text, "test.qrl", rules)
    }

    #[test]
    fn checkpoint_restore_reverses_push_and_pop() {
        let mut st = state("");
        st.push_stack("tags", "b".to_string());
        let cp = st.get_checkpoint();
        st.push_stack("tags", "i".to_string());
        st.pop_stack("tags").unwrap();
        st.push_stack("tags", "em".to_string());

        st.restore_checkpoint(&cp).unwrap();
        assert_eq!(st.stack("tags").clone(), vec!["b".to_string()]);
    }

    #[test]
    fn restore_checkpoint_clears_a_stack_created_after_the_checkpoint() {
        // The checkpoint is taken before `tags` exists (lazy creation), so
        // it is absent from `checkpoint.lengths` entirely. Restoring must
        // still unwind it to empty, not leave it untouched.
        let mut st = state("");
        let cp = st.get_checkpoint();
        st.push_stack("tags", "b".to_string());

        st.restore_checkpoint(&cp).unwrap();
        assert!(st.stacks_are_empty());
    }

    #[test]
    fn stacks_are_empty_true_when_nothing_pushed() {
        let mut st = state("");
        assert!(st.stacks_are_empty());
        st.push_stack("x", "v".to_string());
        assert!(!st.stacks_are_empty());
        st.pop_stack("x").unwrap();
        assert!(st.stacks_are_empty());
    }

    #[test]
    fn pop_from_empty_stack_is_integrity_error() {
        let mut st = state("");
        assert!(matches!(st.pop_stack("missing"), Err(GrammarError::Integrity { .. })));
    }

    #[test]
    fn startswith_empty_value_is_always_true() {
        let st = state("hello");
        assert!(st.startswith("", 5));
        assert!(st.startswith("", 0));
    }
}

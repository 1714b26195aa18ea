//! Match driver.
//!
//! [`Matcher::match_with_modifiers`] is the one function every matcher
//! invocation funnels through (spec §2, §4.3). It owns everything that
//! is *not* specific to a single variant: checkpointing and rollback,
//! the quantifier loop, inversion, look-ahead's index reset, action
//! dispatch, and match replacement. Variant-specific behavior is
//! delegated to [`Matcher::match_specific`] (`engine::matcher`), called
//! once per quantifier iteration.
//!
//! Steps below are numbered to match spec §4.3 exactly.

use crate::engine::actions::{Trigger, dispatch};
use crate::engine::error::GrammarError;
use crate::engine::matcher::{MatchRepl, Matcher};
use crate::engine::state::ParseState;
use crate::engine::tree::{Leaf, ParseTree, TreeNode};

impl Matcher {
    /// Run this matcher against `state` at `index`, applying every
    /// modifier (spec §4.3). Returns `Ok((None, index))` for ordinary
    /// parse failure — never an `Err` — per spec §7's propagation policy.
    pub fn match_with_modifiers(&self, state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
        state.depth += 1;
        let result = self.match_with_modifiers_inner(state, index);
        state.depth -= 1;
        result
    }

    fn match_with_modifiers_inner(&self, state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
        let max_depth = state.max_depth();
        if state.depth > max_depth {
            let pos = state.get_position(index);
            return Err(GrammarError::integrity(format!("recursion depth exceeded {max_depth} grammar-frames"))
                .with_location(state.filename(), pos));
        }
        // Cancellation aborts exactly like an ordinary parse failure: no
        // fatal error, no partial effects beyond the standard rollback.
        if state.is_cancelled() {
            return Ok((None, index));
        }

        // Step 1: checkpoint.
        let old_index = index;
        let mut cursor = index;
        let mut match_count: u32 = 0;
        let checkpoint = state.get_checkpoint();

        // Step 2: fresh node.
        let mut node = TreeNode::new(state.get_position(index));

        // Step 3: quantifier loop.
        loop {
            let (sub, sub_index) = self.match_specific(state, cursor)?;
            let (sub, sub_index) = self.apply_inversion(state, cursor, sub, sub_index);

            let Some(sub_tree) = sub else {
                break;
            };

            let consumed_zero_width = sub_index == cursor;
            node.add_child(sub_tree, self.omit_match);
            cursor = sub_index;
            match_count += 1;

            if Some(match_count) == self.count_max {
                break;
            }
            // §9: an unbounded (or not-yet-exhausted) quantifier around a
            // zero-width success must not spin forever — count it once
            // and stop, per the zero-width literal design note.
            if consumed_zero_width {
                break;
            }
        }

        // Step 4: count_min not satisfied.
        if match_count < self.count_min {
            dispatch(&self.actions, Trigger::OnFail, None, state, old_index)?;
            state.restore_checkpoint(&checkpoint)?;
            return Ok((None, old_index));
        }

        // Step 5: farthest match, recorded *before* the look-ahead reset
        // (spec §9's resolved open question).
        state.note_reached(cursor);

        // Step 6: look-ahead resets the index but keeps effects applied.
        if self.look_ahead {
            cursor = old_index;
        }

        // Step 7: onMatch actions, dispatched after the look-ahead reset
        // (so a successful look-ahead can still push to a stack — §9).
        let mut tree = Some(ParseTree::Node(node));
        dispatch(&self.actions, Trigger::OnMatch, tree.as_ref(), state, old_index)?;

        // Step 8: match replacement.
        self.apply_match_replacement(state, cursor, &mut tree);

        // Step 9.
        Ok((tree, cursor))
    }

    /// Step 3's inversion rule: a bare failure becomes a one-character
    /// leaf (consuming one code unit; EOF still fails); a bare success
    /// becomes a failure with no consumption.
    fn apply_inversion(
        &self,
        state: &mut ParseState,
        old_index: usize,
        sub: Option<ParseTree>,
        sub_index: usize,
    ) -> (Option<ParseTree>, usize) {
        if !self.inverted {
            return (sub, sub_index);
        }

        match sub {
            None => match state.char_at(old_index) {
                Some(c) => {
                    let next = old_index + c.len();
                    (Some(ParseTree::Leaf(Leaf::new(c, state.get_position(old_index), state.get_position(next)))), next)
                }
                None => (None, old_index),
            },
            Some(_) => (None, old_index),
        }
    }

    fn apply_match_replacement(&self, state: &mut ParseState, index: usize, tree: &mut Option<ParseTree>) {
        let Some(repl) = &self.match_repl else {
            return;
        };

        match repl {
            MatchRepl::String(value) => {
                *tree = Some(ParseTree::Leaf(Leaf::new(value.clone(), state.get_position(index), state.get_position(index))));
            }
            MatchRepl::Stack { stack, index: stack_index } => {
                let values = state.stack(stack);
                let value =
                    if *stack_index < values.len() { values[values.len() - stack_index - 1].clone() } else { String::new() };
                *tree = Some(ParseTree::Leaf(Leaf::new(value, state.get_position(index), state.get_position(index))));
            }
            MatchRepl::Identifier(name) => {
                if let Some(t) = tree {
                    t.set_name(name.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actions::{Action, ActionArg};
    use crate::engine::ruleset::RuleSet;

    fn state(text: &'static str) -> ParseState<'static> {
        let rules: &'static RuleSet = Box::leak(Box::new(RuleSet::new()));
        ParseState::new(text, "t.qrl", rules)
    }

    #[test]
    fn failure_never_consumes_and_restores_stacks() {
        let mut st = state("x");
        st.push_stack("before", "v".into());
        let m = Matcher::exact("a").repeat(1, Some(1));
        let (tree, next) = m.match_with_modifiers(&mut st, 0).unwrap();
        assert!(tree.is_none());
        assert_eq!(next, 0);
        assert_eq!(st.stack("before").clone(), vec!["v".to_string()]);
    }

    #[test]
    fn inversion_of_zero_width_match_fails() {
        // !(Exact("")) must fail: inversion requires one consumable char,
        // but Exact("") always "succeeds", so its inversion always fails.
        let mut st = state("");
        let m = Matcher::exact("").inverted();
        let (tree, next) = m.match_with_modifiers(&mut st, 0).unwrap();
        assert!(tree.is_none());
        assert_eq!(next, 0);
    }

    #[test]
    fn inversion_matches_any_other_char() {
        let mut st = state("x");
        let m = Matcher::exact("\"").inverted();
        let (tree, next) = m.match_with_modifiers(&mut st, 0).unwrap();
        assert_eq!(tree.unwrap().to_matched_string(), "x");
        assert_eq!(next, 1);

        let mut st2 = state("\"");
        let (tree2, _) = m.match_with_modifiers(&mut st2, 0).unwrap();
        assert!(tree2.is_none());
    }

    #[test]
    fn unbounded_quantifier_over_zero_width_terminates() {
        let mut st = state("abc");
        let m = Matcher::exact("").zero_or_more();
        let (tree, next) = m.match_with_modifiers(&mut st, 0).unwrap();
        assert!(tree.is_some());
        assert_eq!(next, 0);
    }

    #[test]
    fn quantifier_rollback_preserves_farthest_match() {
        // Rule `("a"+ "b")` on "aaac" fails overall; farthest_match_index
        // should still be 3 (the "a"s consumed before "b" failed).
        let mut st = state("aaac");
        let seq = Matcher::all(vec![Matcher::exact("a").one_or_more(), Matcher::exact("b")]);
        let (tree, next) = seq.match_with_modifiers(&mut st, 0).unwrap();
        assert!(tree.is_none());
        assert_eq!(next, 0);
        assert_eq!(st.farthest_match_index(), 3);
    }

    #[test]
    fn look_ahead_does_not_consume_but_keeps_effects() {
        let mut st = state("b");
        let push = vec![Action::new("push", vec![ActionArg::String("b".into()), ActionArg::Identifier("tags".into())])];
        let m = Matcher::exact("b").look_ahead().on_match(push);
        let (tree, next) = m.match_with_modifiers(&mut st, 0).unwrap();
        assert!(tree.is_some());
        assert_eq!(next, 0);
        assert_eq!(st.stack("tags").clone(), vec!["b".to_string()]);
    }

    #[test]
    fn look_ahead_then_actual_match_consumes_once() {
        // rule: ("a"~ "a") on "a" succeeds, consumes length 1.
        let mut st = state("a");
        let seq = Matcher::all(vec![Matcher::exact("a").look_ahead(), Matcher::exact("a")]);
        let (tree, next) = seq.match_with_modifiers(&mut st, 0).unwrap();
        assert!(tree.is_some());
        assert_eq!(next, 1);
    }

    #[test]
    fn deep_recursion_raises_integrity_error() {
        let mut st = state("a").with_max_depth(0);
        let m = Matcher::exact("a");
        let err = m.match_with_modifiers(&mut st, 0).unwrap_err();
        assert!(matches!(err, GrammarError::Integrity { .. }));
    }
}

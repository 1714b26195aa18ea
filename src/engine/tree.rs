//! Parse tree construction.
//!
//! A [`ParseTree`] is either a labelled (or anonymous) [`TreeNode`] with
//! children, or a [`Leaf`] holding the literally matched text. Every
//! driver invocation (`engine::driver`) builds one `TreeNode` and feeds
//! matched children into it through [`TreeNode::add_child`], which is
//! where the splice/omit rules from spec §4.6 live. `fuse_children` is a
//! separate post-pass applied once per successful rule match (see
//! `engine::ruleset::Rule::match_rule`), not something `add_child` does
//! incrementally — the original `Rule.__fuse_children` also runs as a
//! single pass over the finished tree.

use crate::engine::position::Position;

/// One node of the parse tree produced by `apply`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    Node(TreeNode),
    Leaf(Leaf),
}

impl ParseTree {
    pub fn position_begin(&self) -> Position {
        match self {
            ParseTree::Node(n) => n.position_begin,
            ParseTree::Leaf(l) => l.position_begin,
        }
    }

    pub fn position_end(&self) -> Position {
        match self {
            ParseTree::Node(n) => n.position_end,
            ParseTree::Leaf(l) => l.position_end,
        }
    }

    fn set_position_end(&mut self, position: Position) {
        match self {
            ParseTree::Node(n) => n.position_end = position,
            ParseTree::Leaf(l) => l.position_end = position,
        }
    }

    /// Name of this node, if it is a named `Node`. Leaves never have a name.
    pub fn name(&self) -> Option<&str> {
        match self {
            ParseTree::Node(n) => n.name.as_deref(),
            ParseTree::Leaf(_) => None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        if let ParseTree::Node(n) = self {
            n.name = Some(name.into());
        }
    }

    /// Concatenation of all descendant leaf values in tree order — the
    /// `tree.toString()` of spec §6, also used to resolve `MATCH` action
    /// arguments (spec §4.5).
    pub fn to_matched_string(&self) -> String {
        let mut out = String::new();
        self.write_matched_string(&mut out);
        out
    }

    fn write_matched_string(&self, out: &mut String) {
        match self {
            ParseTree::Leaf(l) => out.push_str(&l.value),
            ParseTree::Node(n) => {
                for child in &n.children {
                    child.write_matched_string(out);
                }
            }
        }
    }
}

/// A named-or-anonymous interior node.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// `None` means this node is anonymous: when it becomes a child of
    /// another node, its own children are spliced in instead of the node
    /// itself (spec §4.6).
    pub name: Option<String>,
    pub children: Vec<ParseTree>,
    pub position_begin: Position,
    pub position_end: Position,
}

impl TreeNode {
    pub fn new(position_begin: Position) -> Self {
        TreeNode { name: None, children: Vec::new(), position_begin, position_end: position_begin }
    }

    /// Add `child` to this node, applying the splice/omit rules of spec
    /// §4.6:
    ///
    /// - If `omit_match` is set, the child is discarded, but its span
    ///   still extends `position_end` (its consumption still happened).
    /// - Otherwise, an anonymous `Node` child is spliced: its own
    ///   children are appended in its place.
    /// - Otherwise, the child is appended directly.
    pub fn add_child(&mut self, child: ParseTree, omit_match: bool) {
        let child_end = child.position_end();
        if !omit_match {
            match child {
                ParseTree::Node(node) if node.name.is_none() => self.children.extend(node.children),
                other => self.children.push(other),
            }
        }
        if self.position_end.index < child_end.index {
            self.position_end = child_end;
        }
    }
}

/// A leaf holding literally matched text.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub value: String,
    pub position_begin: Position,
    pub position_end: Position,
}

impl Leaf {
    pub fn new(value: impl Into<String>, position_begin: Position, position_end: Position) -> Self {
        Leaf { value: value.into(), position_begin, position_end }
    }
}

/// Fuse consecutive leaf children of `tree` into a single leaf (spec
/// §4.6 / §8: "fuse applied twice is idempotent").
///
/// Scans left to right; every run of adjacent leaves collapses into the
/// first leaf of the run, concatenating values and extending its
/// `position_end`. Any non-leaf child resets the run. No-op on leaves
/// and on nodes with fewer than two children.
pub fn fuse_children(tree: &mut ParseTree) {
    let ParseTree::Node(node) = tree else { return };

    let mut fused: Vec<ParseTree> = Vec::with_capacity(node.children.len());
    for child in node.children.drain(..) {
        match (fused.last_mut(), &child) {
            (Some(ParseTree::Leaf(last)), ParseTree::Leaf(next)) => {
                last.value.push_str(&next.value);
                if last.position_end.index < next.position_end.index {
                    last.position_end = next.position_end;
                }
            }
            _ => fused.push(child),
        }
    }
    node.children = fused;
}

//! Which dependency relations make a node a semantic predicate or argument.
//!
//! Relations are matched on their base (the part before the first `:` or
//! `@`), except for the explicitly listed subtypes.

use crate::components::{Node, NodeId};
use crate::SyntaxTree;

/// Base relations whose dependents are arguments of their head.
pub const ARGUMENT_RELATIONS: &[&str] = &[
    "nsubj", "obj", "iobj", "csubj", "ccomp", "xcomp", "obl", "advcl", "advmod", "nmod",
    "nummod", "acl", "amod", "compound", "orphan",
];

/// Subtyped relations that are arguments although their base is not.
pub const ARGUMENT_SUBTYPES: &[&str] = &["det:poss"];

/// Base relations that make a predicate without making an argument.
pub const PREDICATE_ONLY_RELATIONS: &[&str] = &[
    "root", "conj", "parataxis", "list", "reparandum", "dep", "vocative", "dislocated",
];

/// Relations that glue a multi-word expression together.
pub const MULTIWORD_RELATIONS: &[&str] = &["fixed", "flat", "mwe", "appos", "goeswith"];

pub const COORDINATION: &str = "conj";
pub const APPOSITION: &str = "appos";
/// Verb particles are arguments of their verb but never predicates.
pub const PARTICLE: &str = "compound:prt";

pub fn base_relation(deprel: &str) -> &str {
    deprel.split([':', '@']).next().unwrap_or(deprel)
}

pub fn is_coordination(node: &Node) -> bool {
    base_relation(&node.deprel) == COORDINATION
}

pub fn is_multiword(node: &Node) -> bool {
    MULTIWORD_RELATIONS.contains(&base_relation(&node.deprel))
}

pub fn is_apposition(node: &Node) -> bool {
    base_relation(&node.deprel) == APPOSITION
}

fn is_argument_relation(deprel: &str) -> bool {
    ARGUMENT_RELATIONS.contains(&base_relation(deprel)) || ARGUMENT_SUBTYPES.contains(&deprel)
}

impl SyntaxTree {
    pub fn is_semantic_predicate(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if node.deprel == PARTICLE {
            return false;
        }
        let base = base_relation(&node.deprel);
        if !is_argument_relation(&node.deprel) && !PREDICATE_ONLY_RELATIONS.contains(&base) {
            return false;
        }
        if base == COORDINATION {
            // Conjuncts of function words are not predicates.
            return node.parent.is_some_and(|p| self.is_semantic_predicate(p));
        }
        true
    }

    pub fn is_semantic_dependent(&self, id: NodeId) -> bool {
        is_argument_relation(&self.node(id).deprel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::TokenRow;
    use cusf_protocol::TokenRef;

    fn tree(rows: &[TokenRow]) -> SyntaxTree {
        SyntaxTree::build(rows).unwrap()
    }

    fn at(tree: &SyntaxTree, id: &str) -> NodeId {
        tree.find(&TokenRef::from(id)).unwrap()
    }

    #[test]
    fn test_base_relation() {
        assert_eq!(base_relation("nsubj:pass"), "nsubj");
        assert_eq!(base_relation("comp@obj"), "comp");
        assert_eq!(base_relation("obj"), "obj");
    }

    #[test]
    fn test_predicates_and_dependents() {
        let tree = crate::tests::loves();
        for id in ["1", "2", "3", "5"] {
            assert!(tree.is_semantic_predicate(at(&tree, id)), "{id}");
        }
        assert!(!tree.is_semantic_predicate(at(&tree, "4")));
        assert!(!tree.is_semantic_predicate(at(&tree, "6")));

        assert!(tree.is_semantic_dependent(at(&tree, "1")));
        assert!(tree.is_semantic_dependent(at(&tree, "3")));
        assert!(!tree.is_semantic_dependent(at(&tree, "2")));
        assert!(!tree.is_semantic_dependent(at(&tree, "5")));
    }

    #[test]
    fn test_conjunct_of_function_word() {
        // "in and out": the conjunct hangs off a case marker.
        let tree = tree(&[
            TokenRow::word("1", "went", "0", "root"),
            TokenRow::word("2", "in", "1", "case"),
            TokenRow::word("3", "and", "4", "cc"),
            TokenRow::word("4", "out", "2", "conj"),
        ]);
        assert!(!tree.is_semantic_predicate(at(&tree, "4")));
    }

    #[test]
    fn test_particles_and_subtypes() {
        let tree = tree(&[
            TokenRow::word("1", "his", "3", "det:poss"),
            TokenRow::word("2", "the", "3", "det"),
            TokenRow::word("3", "gave", "0", "root"),
            TokenRow::word("4", "up", "3", "compound:prt"),
            TokenRow::word("5", "Kim", "3", "nsubj:pass"),
        ]);
        assert!(tree.is_semantic_dependent(at(&tree, "1")));
        assert!(tree.is_semantic_predicate(at(&tree, "1")));
        assert!(!tree.is_semantic_dependent(at(&tree, "2")));
        assert!(!tree.is_semantic_predicate(at(&tree, "4")));
        assert!(tree.is_semantic_dependent(at(&tree, "4")));
        assert!(tree.is_semantic_dependent(at(&tree, "5")));
    }
}

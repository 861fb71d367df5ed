use std::fmt;

use cusf_protocol::TokenRef;

/// Placeholder for unset CoNLL-U columns.
pub const UNSET: &str = "_";

/// One token row of a CoNLL-U block, all ten columns kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRow {
    pub id: TokenRef,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub feats: String,
    pub head: String,
    pub deprel: String,
    pub deps: String,
    pub misc: String,
}

impl TokenRow {
    /// A word row with only id, form, head and relation set.
    pub fn word(id: &str, form: &str, head: &str, deprel: &str) -> Self {
        Self {
            id: TokenRef::from(id),
            form: form.to_string(),
            lemma: UNSET.to_string(),
            upos: UNSET.to_string(),
            xpos: UNSET.to_string(),
            feats: UNSET.to_string(),
            head: head.to_string(),
            deprel: deprel.to_string(),
            deps: UNSET.to_string(),
            misc: UNSET.to_string(),
        }
    }
}

impl fmt::Display for TokenRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.id,
            self.form,
            self.lemma,
            self.upos,
            self.xpos,
            self.feats,
            self.head,
            self.deprel,
            self.deps,
            self.misc
        )
    }
}

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A word of the dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: TokenRef,
    pub form: String,
    pub deprel: String,
    /// Lookup only; the tree owns every node.
    pub parent: Option<NodeId>,
    /// In ascending token order.
    pub children: Vec<NodeId>,
}

pub mod components;
pub mod systems;

use std::collections::HashMap;

use cusf_protocol::TokenRef;
use thiserror::Error;

use components::{Node, NodeId, TokenRow};

pub use systems::yields::Subtrees;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("sentence has no root token")]
    NoRoot,
    #[error("token {0} appears more than once")]
    DuplicateToken(TokenRef),
    #[error("token {token} has malformed head '{head}'")]
    BadHead { token: TokenRef, head: String },
    #[error("token {token} points at missing head {head}")]
    DanglingHead { token: TokenRef, head: TokenRef },
    #[error("token {0} is not connected to a root")]
    Cycle(TokenRef),
}

/// A dependency forest over the words of one sentence. Multi-word ranges and
/// empty nodes are not part of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    index: HashMap<TokenRef, NodeId>,
}

impl SyntaxTree {
    /// Builds the tree from token rows, rejecting anything that is not a
    /// forest rooted at head `0`.
    pub fn build<'a, I>(rows: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = &'a TokenRow>,
    {
        let words: Vec<&TokenRow> = rows.into_iter().filter(|r| r.id.is_word()).collect();

        let mut index = HashMap::with_capacity(words.len());
        let mut nodes = Vec::with_capacity(words.len());
        for row in &words {
            let id = NodeId(nodes.len());
            if index.insert(row.id.clone(), id).is_some() {
                return Err(TreeError::DuplicateToken(row.id.clone()));
            }
            nodes.push(Node {
                id: row.id.clone(),
                form: row.form.clone(),
                deprel: row.deprel.clone(),
                parent: None,
                children: Vec::new(),
            });
        }

        let mut roots = Vec::new();
        for (i, row) in words.iter().enumerate() {
            let head = TokenRef::from(row.head.as_str());
            if head.as_str() == "0" {
                roots.push(NodeId(i));
                continue;
            }
            if !head.is_word() {
                return Err(TreeError::BadHead {
                    token: row.id.clone(),
                    head: row.head.clone(),
                });
            }
            let parent = *index.get(&head).ok_or_else(|| TreeError::DanglingHead {
                token: row.id.clone(),
                head: head.clone(),
            })?;
            nodes[i].parent = Some(parent);
            nodes[parent.0].children.push(NodeId(i));
        }
        if roots.is_empty() {
            return Err(TreeError::NoRoot);
        }

        let mut tree = Self { nodes, roots, index };
        tree.sort_children();
        tree.check_connected()?;
        Ok(tree)
    }

    fn sort_children(&mut self) {
        let order: Vec<TokenRef> = self.nodes.iter().map(|n| n.id.clone()).collect();
        self.roots.sort_by(|a, b| order[a.0].cmp(&order[b.0]));
        for node in &mut self.nodes {
            node.children.sort_by(|a, b| order[a.0].cmp(&order[b.0]));
        }
    }

    /// Every node must be reachable from a root; anything else sits on a cycle.
    fn check_connected(&self) -> Result<(), TreeError> {
        let mut reached = vec![false; self.nodes.len()];
        for id in self.traverse() {
            reached[id.0] = true;
        }
        match reached.iter().position(|r| !r) {
            Some(i) => Err(TreeError::Cycle(self.nodes[i].id.clone())),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn find(&self, token: &TokenRef) -> Option<NodeId> {
        self.index.get(token).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Every node, depth-first, roots in token order.
    pub fn traverse(&self) -> Subtrees<'_, fn(&Node) -> bool> {
        fn keep(_: &Node) -> bool {
            false
        }
        Subtrees::new(self, self.roots.iter().copied(), keep as fn(&Node) -> bool)
    }
}

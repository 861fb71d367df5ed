use crate::components::{Node, NodeId};
use crate::systems::relations::{is_coordination, is_multiword};
use crate::SyntaxTree;

/// Depth-first, pre-order walk. A child for which `exclude` holds is skipped
/// together with its whole subtree; the start nodes are always visited.
pub struct Subtrees<'t, F> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
    exclude: F,
}

impl<'t, F: Fn(&Node) -> bool> Subtrees<'t, F> {
    pub fn new(tree: &'t SyntaxTree, starts: impl IntoIterator<Item = NodeId>, exclude: F) -> Self {
        let mut stack: Vec<NodeId> = starts.into_iter().collect();
        stack.reverse();
        Self { tree, stack, exclude }
    }
}

impl<'t, F: Fn(&Node) -> bool> Iterator for Subtrees<'t, F> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let exclude = &self.exclude;
        self.stack.extend(
            tree.children(id)
                .iter()
                .rev()
                .copied()
                .filter(|c| !exclude(tree.node(*c))),
        );
        Some(id)
    }
}

impl SyntaxTree {
    pub fn subtrees<F: Fn(&Node) -> bool>(&self, id: NodeId, exclude: F) -> Subtrees<'_, F> {
        Subtrees::new(self, [id], exclude)
    }

    /// Surface text of a predicate: its subtree without the subtrees
    /// attached through multi-word-expression relations.
    pub fn form_for_predicate(&self, id: NodeId) -> String {
        let nodes: Vec<NodeId> = self.subtrees(id, is_multiword).collect();
        self.join_forms(nodes)
    }

    /// Nodes covered by an argument: the node itself plus the full subtree
    /// of every child that is not a conjunct, in token order.
    pub fn argument_yield(&self, id: NodeId) -> Vec<NodeId> {
        let mut nodes = vec![id];
        for &child in self.children(id) {
            if !is_coordination(self.node(child)) {
                nodes.extend(self.subtrees(child, |_| false));
            }
        }
        self.sort_by_token(&mut nodes);
        nodes
    }

    pub fn form_for_argument(&self, id: NodeId) -> String {
        self.join_forms(self.argument_yield(id))
    }

    fn sort_by_token(&self, nodes: &mut [NodeId]) {
        nodes.sort_by(|a, b| self.node(*a).id.cmp(&self.node(*b).id));
    }

    fn join_forms(&self, mut nodes: Vec<NodeId>) -> String {
        self.sort_by_token(&mut nodes);
        nodes
            .iter()
            .map(|n| self.node(*n).form.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

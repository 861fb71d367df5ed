use std::collections::HashMap;

use cusf_protocol::{Frame, TokenRef};
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Directed;

/// Links between frames of one sentence: an edge runs from a frame's head
/// to the head of each of its labelled arguments.
#[derive(Debug, Default)]
pub struct FrameGraph {
    graph: Graph<TokenRef, String, Directed>,
    index_map: HashMap<TokenRef, NodeIndex>,
}

impl FrameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames<'a, I: IntoIterator<Item = &'a Frame>>(frames: I) -> Self {
        let mut graph = Self::new();
        for frame in frames {
            graph.add_head(&frame.head);
            for arg in frame.args.iter().filter(|a| !a.label.is_empty()) {
                graph.add_link(&frame.head, &arg.head, &arg.label);
            }
        }
        graph
    }

    pub fn add_head(&mut self, head: &TokenRef) -> NodeIndex {
        if let Some(idx) = self.index_map.get(head) {
            return *idx;
        }
        let idx = self.graph.add_node(head.clone());
        self.index_map.insert(head.clone(), idx);
        idx
    }

    pub fn add_link(&mut self, from: &TokenRef, to: &TokenRef, label: &str) {
        let from_idx = self.add_head(from);
        let to_idx = self.add_head(to);
        self.graph.add_edge(from_idx, to_idx, label.to_string());
    }

    /// `head` followed by the heads it links to directly, first link first.
    pub fn traverse(&self, head: &TokenRef) -> Vec<TokenRef> {
        let mut reached = vec![head.clone()];
        let Some(idx) = self.index_map.get(head) else {
            return reached;
        };
        // petgraph lists outgoing edges newest first.
        let mut targets: Vec<&TokenRef> = self
            .graph
            .edges(*idx)
            .map(|edge| &self.graph[edge.target()])
            .collect();
        targets.reverse();
        for target in targets {
            if !reached.contains(target) {
                reached.push(target.clone());
            }
        }
        reached
    }

    /// `b` is `a` or one of its direct links.
    pub fn link_exists(&self, a: &TokenRef, b: &TokenRef) -> bool {
        self.traverse(a).contains(b)
    }

    /// `b` is within two links of `a`.
    pub fn deep_link_exists(&self, a: &TokenRef, b: &TokenRef) -> bool {
        self.traverse(a).iter().any(|x| self.link_exists(x, b))
    }
}

//! Inference of missing frames and arguments.
//!
//! Expected links come from the syntax (predicates and their semantic
//! dependents) and from SCENE and MESSAGE constructions in the existing
//! annotation. They are merged into the frames without touching anything an
//! annotator wrote.

use std::collections::{HashMap, HashSet};

use cusf_parser::{Document, FrameEntry, Sentence};
use cusf_protocol::{
    leading_frame, split_label, Argument, ExpectedLink, Frame, FrameKind, TokenRef,
};
use cusf_syntax::components::NodeId;
use cusf_syntax::systems::relations::is_coordination;
use cusf_syntax::SyntaxTree;
use tracing::debug;

use crate::graph::FrameGraph;

const SCENE_ROLES: &[&str] = &["initial-scene", "transitory-scene", "scene", "target-scene"];
const CONTENT_ROLES: &[&str] = &["initial-content", "transitory-content", "content", "target-content"];
const RECIPROCAL_ROLES: &[&str] = &["m-scene", "m-content"];

/// A construction whose anchor argument is expected to be linked from each
/// of the frame's carrier arguments.
struct Chain {
    kind: FrameKind,
    anchor: &'static str,
    carriers: &'static [&'static str],
}

const CHAINS: [Chain; 2] = [
    Chain {
        kind: FrameKind::Scene,
        anchor: "participant",
        carriers: SCENE_ROLES,
    },
    Chain {
        kind: FrameKind::Message,
        anchor: "topic",
        carriers: CONTENT_ROLES,
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    pub filled: usize,
    pub skipped: usize,
}

/// Expected links per predicate head, in the order they were found.
#[derive(Debug, Default)]
struct ExpectedLinks {
    links: HashMap<TokenRef, Vec<ExpectedLink>>,
    /// Heads that received links from the annotation rather than the syntax.
    propagated: HashSet<TokenRef>,
}

impl ExpectedLinks {
    fn get(&self, head: &TokenRef) -> &[ExpectedLink] {
        self.links.get(head).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn has_role(label: &str, roles: &[&str]) -> bool {
    split_label(label).iter().any(|part| roles.contains(part))
}

/// Arguments carrying one of `roles`, by head. Filling reorders arguments,
/// so links must not depend on their order.
fn with_role<'f>(frame: &'f Frame, roles: &[&str]) -> Vec<&'f Argument> {
    let mut args: Vec<&Argument> = frame
        .args
        .iter()
        .filter(|a| has_role(&a.label, roles))
        .collect();
    args.sort_by(|a, b| a.head.cmp(&b.head));
    args
}

fn link_to(tree: &SyntaxTree, id: NodeId) -> ExpectedLink {
    (tree.node(id).id.clone(), tree.form_for_argument(id))
}

/// Link text for `head`: its argument yield if the tree has it, else what
/// the annotation says.
fn link_text(tree: &SyntaxTree, head: &TokenRef, stored: &str) -> String {
    match tree.find(head) {
        Some(id) => tree.form_for_argument(id),
        None => stored.to_string(),
    }
}

fn syntactic_links(tree: &SyntaxTree) -> ExpectedLinks {
    let mut expected = ExpectedLinks::default();
    for id in tree.traverse() {
        if !tree.is_semantic_predicate(id) {
            continue;
        }
        let links = expected.links.entry(tree.node(id).id.clone()).or_default();
        for &child in tree.children(id) {
            if !tree.is_semantic_dependent(child) {
                continue;
            }
            links.push(link_to(tree, child));
            for &conj in tree.children(child) {
                if is_coordination(tree.node(conj)) {
                    links.push(link_to(tree, conj));
                }
            }
        }
    }
    expected
}

fn propagate<'a>(
    tree: &SyntaxTree,
    frames: impl Iterator<Item = &'a Frame> + Clone,
    expected: &mut ExpectedLinks,
) {
    let graph = FrameGraph::from_frames(frames.clone());
    let mut add = |from: &TokenRef, to: &TokenRef, stored: &str| {
        if graph.deep_link_exists(from, to) {
            return;
        }
        let text = link_text(tree, to, stored);
        expected
            .links
            .entry(from.clone())
            .or_default()
            .push((to.clone(), text));
        expected.propagated.insert(from.clone());
    };

    for frame in frames {
        let kind = leading_frame(&frame.label);
        for chain in CHAINS.iter().filter(|c| Some(c.kind) == kind) {
            let carriers = with_role(frame, chain.carriers);
            for anchor in with_role(frame, &[chain.anchor]) {
                for carrier in &carriers {
                    add(&carrier.head, &anchor.head, &anchor.text);
                }
            }
        }
        for arg in with_role(frame, RECIPROCAL_ROLES) {
            add(&arg.head, &frame.head, &frame.text);
        }
    }
}

fn position_of(frames: &[FrameEntry], head: &TokenRef) -> Option<usize> {
    frames
        .iter()
        .position(|e| e.as_frame().is_some_and(|f| &f.head == head))
}

fn merge(tree: &SyntaxTree, frames: &mut Vec<FrameEntry>, expected: &ExpectedLinks) {
    frames.retain(|e| !e.as_frame().is_some_and(Frame::is_empty));

    let mut cursor = 0;
    for id in tree.traverse() {
        let head = &tree.node(id).id;
        if !tree.is_semantic_predicate(id) && !expected.propagated.contains(head) {
            continue;
        }
        let links = expected.get(head);
        match position_of(frames, head) {
            Some(idx) => {
                if let Some(frame) = frames[idx].as_frame_mut() {
                    frame.fill_args(links);
                }
                cursor = idx + 1;
            }
            None => {
                let mut frame = Frame::new(head.clone(), tree.form_for_predicate(id), "");
                frame.fill_args(links);
                frames.insert(cursor, FrameEntry::Frame(frame));
                cursor += 1;
            }
        }
    }
}

/// Adds the frames and arguments the syntax and the annotated constructions
/// call for. Returns `false` if the sentence was left alone because a frame
/// block or the syntax is broken.
pub fn fill_sentence(sentence: &mut Sentence) -> bool {
    let Sentence { id, tree, frames, .. } = sentence;
    if frames.iter().any(FrameEntry::is_parse_failure) {
        debug!(sentence = %id, "not filling: a frame block does not parse");
        return false;
    }
    let tree = match tree.as_ref() {
        Ok(tree) => tree,
        Err(e) => {
            debug!(sentence = %id, "not filling: {}", e);
            return false;
        }
    };

    let mut expected = syntactic_links(tree);
    propagate(tree, frames.iter().filter_map(FrameEntry::as_frame), &mut expected);
    merge(tree, frames, &expected);
    true
}

pub fn fill_document(doc: &mut Document) -> FillStats {
    let mut stats = FillStats::default();
    for sentence in &mut doc.sentences {
        if fill_sentence(sentence) {
            stats.filled += 1;
        } else {
            stats.skipped += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use cusf_parser::read_str;
    use proptest::prelude::*;

    const KIM: &str = "\
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\tloves\t_\t_\t_\t_\t0\troot\t_\t_
3\tSandy\t_\t_\t_\t_\t2\tobj\t_\t_
4\t.\t_\t_\t_\t_\t2\tpunct\t_\t_

";

    fn filled(text: &str) -> String {
        let mut doc = read_str(text);
        fill_document(&mut doc);
        doc.render()
    }

    fn frame_at<'a>(sentence: &'a Sentence, head: &str) -> &'a Frame {
        sentence
            .frames()
            .find(|f| f.head.as_str() == head)
            .unwrap()
    }

    #[test]
    fn test_subject_and_object_become_arguments() {
        let mut doc = read_str(KIM);
        let stats = fill_document(&mut doc);
        assert_eq!(stats, FillStats { filled: 1, skipped: 0 });

        let sentence = &doc.sentences[0];
        let heads: Vec<&str> = sentence.frames().map(|f| f.head.as_str()).collect();
        assert_eq!(heads, vec!["2", "1", "3"]);

        let loves = frame_at(sentence, "2");
        assert_eq!(loves.text, "Kim loves Sandy .");
        assert_eq!(loves.label, "");
        let args: Vec<(&str, &str, &str)> = loves
            .args
            .iter()
            .map(|a| (a.head.as_str(), a.text.as_str(), a.label.as_str()))
            .collect();
        assert_eq!(args, vec![("1", "Kim", ""), ("3", "Sandy", "")]);
        assert!(frame_at(sentence, "1").args.is_empty());
    }

    #[test]
    fn test_conjuncts_of_arguments_are_arguments() {
        let text = "\
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\tloves\t_\t_\t_\t_\t0\troot\t_\t_
3\tSandy\t_\t_\t_\t_\t2\tobj\t_\t_
4\tand\t_\t_\t_\t_\t5\tcc\t_\t_
5\tPat\t_\t_\t_\t_\t3\tconj\t_\t_

";
        let mut doc = read_str(text);
        fill_document(&mut doc);
        let loves = frame_at(&doc.sentences[0], "2");
        let heads: Vec<&str> = loves.args.iter().map(|a| a.head.as_str()).collect();
        assert_eq!(heads, vec!["1", "3", "5"]);
        assert_eq!(loves.args[2].text, "and Pat");
        // Pat is a predicate because Sandy is.
        assert!(doc.sentences[0].frames().any(|f| f.head.as_str() == "5"));
    }

    #[test]
    fn test_annotation_is_kept_in_place() {
        let text = format!(
            "{KIM}[EXPERIENCE] loves (2)\n[experienced] Sandy (3)\n[m-time] then (9) # check\n\n"
        );
        let mut doc = read_str(&text);
        fill_document(&mut doc);
        let sentence = &doc.sentences[0];

        let heads: Vec<&str> = sentence.frames().map(|f| f.head.as_str()).collect();
        assert_eq!(heads, vec!["2", "1", "3"]);
        let loves = frame_at(sentence, "2");
        let args: Vec<(&str, &str)> = loves
            .args
            .iter()
            .map(|a| (a.head.as_str(), a.label.as_str()))
            .collect();
        assert_eq!(args, vec![("3", "experienced"), ("1", ""), ("9", "m-time")]);
    }

    #[test]
    fn test_unmatched_frames_keep_their_position() {
        // Existing frames keep their relative order, the empty one is
        // dropped, and new frames go after their traversal predecessor.
        let text = format!(
            "{KIM}[QUALITY] . (4)\n[has-quality] x (1)\n\n[] Kim (1)\n\n[EXPERIENCE] Sandy (3)\n\n"
        );
        let mut doc = read_str(&text);
        fill_document(&mut doc);
        let heads: Vec<&str> = doc.sentences[0].frames().map(|f| f.head.as_str()).collect();
        assert_eq!(heads, vec!["2", "1", "4", "3"]);
    }

    #[test]
    fn test_broken_sentences_pass_through() {
        let broken_frame = format!("{KIM}[] loves\n\n");
        assert_eq!(filled(&broken_frame), broken_frame);

        let broken_tree = "1\tKim\t_\t_\t_\t_\t5\tnsubj\t_\t_\n2\tsleeps\t_\t_\t_\t_\t0\troot\t_\t_\n\n";
        let mut doc = read_str(broken_tree);
        assert_eq!(fill_document(&mut doc), FillStats { filled: 0, skipped: 1 });
        assert_eq!(doc.render(), broken_tree);
    }

    #[test]
    fn test_scene_chain() {
        // "Kim (1) was at home (4) during the party (7)".
        let text = "\
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\twas\t_\t_\t_\t_\t0\troot\t_\t_
3\tat\t_\t_\t_\t_\t4\tcase\t_\t_
4\thome\t_\t_\t_\t_\t2\tobl\t_\t_
5\tduring\t_\t_\t_\t_\t7\tcase\t_\t_
6\tthe\t_\t_\t_\t_\t7\tdet\t_\t_
7\tparty\t_\t_\t_\t_\t2\tobl\t_\t_

[SCENE] was (2)
[participant] Kim (1)
[scene] party (7)
[m-location] at home (4)

";
        let mut doc = read_str(text);
        fill_document(&mut doc);
        let party = frame_at(&doc.sentences[0], "7");
        let heads: Vec<&str> = party.args.iter().map(|a| a.head.as_str()).collect();
        assert_eq!(heads, vec!["1"]);
        assert_eq!(party.args[0].text, "Kim");
        assert_eq!(party.text, "during the party");
    }

    #[test]
    fn test_scene_chain_is_guarded_by_existing_links() {
        let text = "\
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\twas\t_\t_\t_\t_\t0\troot\t_\t_
3\tthe\t_\t_\t_\t_\t4\tdet\t_\t_
4\tparty\t_\t_\t_\t_\t2\tobl\t_\t_

[SCENE] was (2)
[participant] Kim (1)
[scene] the party (4)

[STATE] the party (4)
[has-state] Kim (1)

";
        let mut doc = read_str(text);
        fill_document(&mut doc);
        let party = frame_at(&doc.sentences[0], "4");
        assert_eq!(party.args.len(), 1);
        assert_eq!(party.args[0].label, "has-state");
    }

    #[test]
    fn test_scene_chain_is_guarded_two_links_away() {
        // The party already reaches Kim through Pat's frame.
        let text = "\
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\twas\t_\t_\t_\t_\t0\troot\t_\t_
3\tthe\t_\t_\t_\t_\t4\tdet\t_\t_
4\tparty\t_\t_\t_\t_\t2\tobl\t_\t_
5\tPat\t_\t_\t_\t_\t4\tnmod\t_\t_

[SCENE] was (2)
[participant] Kim (1)
[scene] the party Pat (4)

[STATE] the party Pat (4)
[has-state] Pat (5)

[STATE] Pat (5)
[has-state] Kim (1)

";
        let mut doc = read_str(text);
        fill_document(&mut doc);
        let party = frame_at(&doc.sentences[0], "4");
        let heads: Vec<&str> = party.args.iter().map(|a| a.head.as_str()).collect();
        assert_eq!(heads, vec!["5"]);
    }

    #[test]
    fn test_message_chain() {
        // "Kim (1) was told (2) Pat (3) left (4)".
        let text = "\
1\tKim\t_\t_\t_\t_\t2\tnsubj:pass\t_\t_
2\ttold\t_\t_\t_\t_\t0\troot\t_\t_
3\tPat\t_\t_\t_\t_\t4\tnsubj\t_\t_
4\tleft\t_\t_\t_\t_\t2\tccomp\t_\t_

[MESSAGE] told (2)
[topic] Kim (1)
[content] Pat left (4)

";
        let mut doc = read_str(text);
        fill_document(&mut doc);
        let left = frame_at(&doc.sentences[0], "4");
        let args: Vec<(&str, &str)> = left
            .args
            .iter()
            .map(|a| (a.head.as_str(), a.text.as_str()))
            .collect();
        assert_eq!(args, vec![("3", "Pat"), ("1", "Kim")]);
        assert!(left.args.iter().all(|a| a.label.is_empty()));
    }

    #[test]
    fn test_m_scene_links_back() {
        // "Kim (1) slept (2) during the party (5)".
        let text = "\
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\tslept\t_\t_\t_\t_\t0\troot\t_\t_
3\tduring\t_\t_\t_\t_\t5\tcase\t_\t_
4\tthe\t_\t_\t_\t_\t5\tdet\t_\t_
5\tparty\t_\t_\t_\t_\t2\tobl\t_\t_

[STATE] slept (2)
[has-state] Kim (1)
[m-scene] during the party (5)

";
        let mut doc = read_str(text);
        fill_document(&mut doc);
        let party = frame_at(&doc.sentences[0], "5");
        assert_eq!(party.args.len(), 1);
        assert_eq!(party.args[0].head.as_str(), "2");
        assert_eq!(party.args[0].text, "Kim slept during the party");
    }

    #[test]
    fn test_verb_particle_is_an_argument() {
        // "Kim gave up": the particle is expected but gets no frame.
        let text = "\
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\tgave\t_\t_\t_\t_\t0\troot\t_\t_
3\tup\t_\t_\t_\t_\t2\tcompound:prt\t_\t_

";
        let mut doc = read_str(text);
        fill_document(&mut doc);
        let sentence = &doc.sentences[0];
        let gave = frame_at(sentence, "2");
        let args: Vec<(&str, &str)> = gave
            .args
            .iter()
            .map(|a| (a.head.as_str(), a.text.as_str()))
            .collect();
        assert_eq!(args, vec![("1", "Kim"), ("3", "up")]);
        assert!(sentence.frames().all(|f| f.head.as_str() != "3"));
    }

    #[test]
    fn test_reciprocal_links_reach_non_predicates() {
        // The m-content argument is a case marker: no predicate, yet it
        // gets a frame pointing back.
        let text = "\
1\tsaid\t_\t_\t_\t_\t0\troot\t_\t_
2\tso\t_\t_\t_\t_\t1\tmark\t_\t_

[MESSAGE] said (1)
[m-content] so (2)

";
        let mut doc = read_str(text);
        fill_document(&mut doc);
        let so = frame_at(&doc.sentences[0], "2");
        assert_eq!(so.text, "so");
        assert_eq!(so.args.len(), 1);
        assert_eq!(so.args[0].head.as_str(), "1");
        assert_eq!(so.args[0].text, "said so");
    }

    #[test]
    fn test_fill_is_a_fixed_point() {
        let text = format!("{KIM}[EXPERIENCE] loves (2)\n[experiencer] Kim (1)\n\n");
        let once = filled(&text);
        assert_eq!(filled(&once), once);
    }

    fn arb_annotated() -> impl Strategy<Value = String> {
        let arg = (
            prop::sample::select(vec!["1", "2", "3", "4", "7"]),
            prop::sample::select(vec!["", "", "participant", "scene", "m-scene", "experiencer"]),
            prop::sample::select(vec!["", "", "unsure"]),
        )
            .prop_map(|(head, label, comment)| {
                let comment = if comment.is_empty() { String::new() } else { format!(" # {comment}") };
                format!("[{label}] w ({head}){comment}")
            });
        let frame = (
            prop::sample::select(vec!["1", "2", "3", "4", "8"]),
            prop::sample::select(vec!["", "SCENE", "EXPERIENCE"]),
            prop::collection::vec(arg, 0..4),
        )
            .prop_map(|(head, label, args)| {
                let mut lines = vec![format!("[{label}] w ({head})")];
                lines.extend(args);
                lines.join("\n")
            });
        prop::collection::vec(frame, 0..4).prop_map(|frames| {
            let mut text = KIM.to_string();
            for frame in frames {
                text.push_str(&frame);
                text.push_str("\n\n");
            }
            text
        })
    }

    proptest! {
        #[test]
        fn test_fill_is_idempotent(text in arb_annotated()) {
            let once = filled(&text);
            prop_assert_eq!(filled(&once), once);
        }
    }
}

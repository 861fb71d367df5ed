//! Edge agreement between two annotators.
//!
//! Only predicates that both annotators annotated completely and correctly
//! are compared. Two labels agree when they share at least one part.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use cusf_parser::Sentence;
use cusf_protocol::{simplify, split_label, Frame, SentenceId, TokenRef};

use crate::check::{check_frame, FrameStatus};

pub type PredKey = (SentenceId, TokenRef);
/// Argument labels by argument head.
pub type HeadLabels = BTreeMap<TokenRef, String>;
pub type EdgeMap = BTreeMap<PredKey, HeadLabels>;

/// The argument labels of every completely and correctly annotated frame.
/// The first such frame of a head wins.
pub fn pred_edges<'a, I: IntoIterator<Item = &'a Sentence>>(sentences: I) -> EdgeMap {
    let mut edges = EdgeMap::new();
    for sentence in sentences {
        let Ok(tree) = &sentence.tree else {
            continue;
        };
        let frames: Vec<&Frame> = sentence.frames().collect();
        let mut heads: HashSet<&TokenRef> = HashSet::new();
        for frame in &frames {
            if heads.contains(&frame.head) || !frame.is_completely_annotated() {
                continue;
            }
            if check_frame(tree, frame, &frames).status != FrameStatus::Annotated {
                continue;
            }
            heads.insert(&frame.head);
            let labels = frame
                .args
                .iter()
                .map(|a| (a.head.clone(), a.label.clone()))
                .collect();
            edges.insert((sentence.id.clone(), frame.head.clone()), labels);
        }
    }
    edges
}

fn parts(label: &str, simplified: bool) -> BTreeSet<String> {
    split_label(label)
        .into_iter()
        .map(|p| if simplified { simplify(p) } else { p.to_string() })
        .collect()
}

/// Number of labelled edges in `a`, and how many of them `b` agrees with.
pub fn count_matches(a: &HeadLabels, b: &HeadLabels, simplified: bool) -> (usize, usize) {
    let mut edges = 0;
    let mut matches = 0;
    for (head, label) in a {
        let ours = parts(label, simplified);
        if ours.is_empty() {
            continue;
        }
        edges += 1;
        let theirs = parts(b.get(head).map(String::as_str).unwrap_or(""), simplified);
        if !ours.is_disjoint(&theirs) {
            matches += 1;
        }
    }
    (edges, matches)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgreementReport {
    pub common: usize,
    /// Edges of the first annotator and how many the second matched.
    pub edges1: usize,
    pub matches1: usize,
    pub edges2: usize,
    pub matches2: usize,
}

fn ratio(matches: usize, edges: usize) -> Option<f64> {
    (edges > 0).then(|| matches as f64 / edges as f64)
}

impl AgreementReport {
    pub fn ratio1(&self) -> Option<f64> {
        ratio(self.matches1, self.edges1)
    }

    pub fn ratio2(&self) -> Option<f64> {
        ratio(self.matches2, self.edges2)
    }
}

pub fn compare(first: &EdgeMap, second: &EdgeMap, ignore: &EdgeMap, simplified: bool) -> AgreementReport {
    let mut report = AgreementReport::default();
    for (key, ours) in first {
        let Some(theirs) = second.get(key) else {
            continue;
        };
        if ignore.contains_key(key) {
            continue;
        }
        report.common += 1;
        let (edges, matches) = count_matches(ours, theirs, simplified);
        report.edges1 += edges;
        report.matches1 += matches;
        let (edges, matches) = count_matches(theirs, ours, simplified);
        report.edges2 += edges;
        report.matches2 += matches;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use cusf_parser::read_str;

    const SYNTAX: &str = "\
# sent_id = s1
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\tsaw\t_\t_\t_\t_\t0\troot\t_\t_
3\tSandy\t_\t_\t_\t_\t2\tobj\t_\t_

";

    fn edges(frames: &str) -> EdgeMap {
        let doc = read_str(&format!("{SYNTAX}{frames}"));
        pred_edges(&doc.sentences)
    }

    fn labels(pairs: &[(&str, &str)]) -> HeadLabels {
        pairs
            .iter()
            .map(|(h, l)| (TokenRef::from(*h), l.to_string()))
            .collect()
    }

    #[test]
    fn test_pred_edges_skip_unfinished_frames() {
        let map = edges(
            "[EXPERIENCE] saw (2)\n[experiencer] Kim (1)\n[experienced] Sandy (3)\n\n\
             [EXPERIENCE] saw (2)\n[experiencer] Kim (1)\n\n\
             [STATE] Kim (1)\n[has-state] Sandy (3)\n[] x (9)\n\n\
             [QUALITY] Sandy (3)\n[bogus] Kim (1)\n\n",
        );
        assert_eq!(map.len(), 1);
        let saw = &map[&(SentenceId::from("s1"), TokenRef::from("2"))];
        assert_eq!(saw, &labels(&[("1", "experiencer"), ("3", "experienced")]));
    }

    #[test]
    fn test_later_complete_frame_counts() {
        let map = edges(
            "[EXPERIENCE] saw (2)\n[experiencer] Kim (1)\n[] Sandy (3)\n\n\
             [EXPERIENCE] saw (2)\n[experiencer] Kim (1)\n[experienced] Sandy (3)\n\n\
             [EXPERIENCE] saw (2)\n[m-time] Kim (1)\n\n",
        );
        let saw = &map[&(SentenceId::from("s1"), TokenRef::from("2"))];
        assert_eq!(saw, &labels(&[("1", "experiencer"), ("3", "experienced")]));
    }

    #[test]
    fn test_count_matches() {
        let a = labels(&[("1", "experiencer||m-time"), ("3", "experienced"), ("4", "")]);
        let b = labels(&[("1", "m-time"), ("3", "target-state")]);
        assert_eq!(count_matches(&a, &b, false), (2, 1));
        assert_eq!(count_matches(&b, &a, false), (2, 1));

        let a = labels(&[("1", "initial-location")]);
        let b = labels(&[("1", "m-location")]);
        assert_eq!(count_matches(&a, &b, false), (1, 0));
        assert_eq!(count_matches(&a, &b, true), (1, 1));
    }

    #[test]
    fn test_compare() {
        let first = edges("[EXPERIENCE] saw (2)\n[experiencer] Kim (1)\n[experienced] Sandy (3)\n\n");
        let second = edges("[EXPERIENCE] saw (2)\n[experiencer] Kim (1)\n[m-time] Sandy (3)\n\n");

        let report = compare(&first, &second, &EdgeMap::new(), false);
        assert_eq!(report.common, 1);
        assert_eq!((report.matches1, report.edges1), (1, 2));
        assert_eq!((report.matches2, report.edges2), (1, 2));
        assert_eq!(report.ratio1(), Some(0.5));

        let report = compare(&first, &second, &first, false);
        assert_eq!(report, AgreementReport::default());
        assert_eq!(report.ratio1(), None);
    }
}

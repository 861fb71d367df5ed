//! Validation of filled sentences: label grammar, argument references and
//! the depictive back-link constraint.

use std::collections::HashSet;
use std::fmt;
use std::ops::AddAssign;
use std::ptr;

use cusf_parser::{Document, FrameEntry, Sentence};
use cusf_protocol::{
    parse_frame_label, split_label, validate_dep_label, Frame, LabelError, SentenceId, TokenRef,
};
use cusf_syntax::systems::relations::is_apposition;
use cusf_syntax::{SyntaxTree, TreeError};
use thiserror::Error;
use tracing::warn;

const DEPICTIVE: &str = "m-depictive";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("syntax is not a tree: {0}")]
    InvalidSyntax(TreeError),
    #[error("cannot parse frame block starting with '{0}'")]
    ParseFailure(String),
    #[error("more than one frame for head {0}")]
    DuplicateFrame(TokenRef),
    #[error("frame {head}: {source}")]
    UnknownFrameLabel { head: TokenRef, source: LabelError },
    #[error("frame head {0} is not in the sentence")]
    UnresolvedFrameHead(TokenRef),
    #[error("frame {frame}: argument head {arg} is not in the sentence")]
    UnresolvedHead { frame: TokenRef, arg: TokenRef },
    #[error("frame {frame}: text of argument {arg} should be '{expected}', not '{stored}'")]
    StaleText {
        frame: TokenRef,
        arg: TokenRef,
        stored: String,
        expected: String,
    },
    #[error("frame {frame}: argument {arg} is an apposition and should not be annotated")]
    ShouldNotAnnotate { frame: TokenRef, arg: TokenRef },
    #[error("frame {frame}: argument {arg}: {source}")]
    UnknownRole {
        frame: TokenRef,
        arg: TokenRef,
        source: LabelError,
    },
    #[error("frame {frame}: depictive {arg} has no frame linking back to the other arguments")]
    MissingBacklink { frame: TokenRef, arg: TokenRef },
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::InvalidSyntax(_) => "invalid-syntax",
            Warning::ParseFailure(_) => "parse-failure",
            Warning::DuplicateFrame(_) => "duplicate-frame",
            Warning::UnknownFrameLabel { .. } => "unknown-frame-label",
            Warning::UnresolvedFrameHead(_) | Warning::UnresolvedHead { .. } => "unresolved-head",
            Warning::StaleText { .. } => "stale-text",
            Warning::ShouldNotAnnotate { .. } => "should-not-annotate",
            Warning::UnknownRole { .. } => "unknown-role",
            Warning::MissingBacklink { .. } => "missing-backlink",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub sentence: SentenceId,
    pub line: usize,
    pub warning: Warning,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sentence {}, line {}: {}", self.sentence, self.line, self.warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// No frame label yet.
    Unlabeled,
    /// Some argument has no label.
    Incomplete,
    Failed,
    Annotated,
}

/// Outcome for one frame; warnings carry their line offset in the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCheck {
    pub status: FrameStatus,
    pub warnings: Vec<(usize, Warning)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub predicates: usize,
    pub annotated: usize,
    pub warnings: Vec<Diagnostic>,
}

impl CheckReport {
    fn warn(&mut self, sentence: &SentenceId, line: usize, warning: Warning) {
        warn!(sentence = %sentence, line, kind = warning.kind(), "{}", warning);
        self.warnings.push(Diagnostic {
            sentence: sentence.clone(),
            line,
            warning,
        });
    }
}

impl AddAssign for CheckReport {
    fn add_assign(&mut self, other: CheckReport) {
        self.predicates += other.predicates;
        self.annotated += other.annotated;
        self.warnings.extend(other.warnings);
    }
}

/// Does some other frame headed at the depictive argument point into the
/// yield of one of the frame's remaining arguments?
fn has_backlink(tree: &SyntaxTree, frame: &Frame, depictive: usize, frames: &[&Frame]) -> bool {
    let targets: HashSet<&TokenRef> = frame
        .args
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != depictive)
        .filter_map(|(_, arg)| tree.find(&arg.head))
        .flat_map(|node| tree.argument_yield(node))
        .map(|node| &tree.node(node).id)
        .collect();
    let head = &frame.args[depictive].head;
    frames
        .iter()
        .filter(|other| !ptr::eq(**other, frame) && &other.head == head)
        .any(|other| other.args.iter().any(|a| targets.contains(&a.head)))
}

/// Checks one frame against the tree and the other frames of its sentence.
pub fn check_frame(tree: &SyntaxTree, frame: &Frame, frames: &[&Frame]) -> FrameCheck {
    let mut warnings = Vec::new();
    if frame.label.is_empty() {
        return FrameCheck {
            status: FrameStatus::Unlabeled,
            warnings,
        };
    }
    if let Err(source) = parse_frame_label(&frame.label) {
        warnings.push((
            0,
            Warning::UnknownFrameLabel {
                head: frame.head.clone(),
                source,
            },
        ));
        return FrameCheck {
            status: FrameStatus::Failed,
            warnings,
        };
    }

    let head = tree.find(&frame.head);
    let mut failed = head.is_none();
    if failed {
        warnings.push((0, Warning::UnresolvedFrameHead(frame.head.clone())));
    }
    let mut complete = true;
    for (i, arg) in frame.args.iter().enumerate() {
        let offset = i + 1;
        let Some(node) = tree.find(&arg.head) else {
            warnings.push((
                offset,
                Warning::UnresolvedHead {
                    frame: frame.head.clone(),
                    arg: arg.head.clone(),
                },
            ));
            failed = true;
            continue;
        };
        if head.is_some() && tree.parent(node) == head {
            let expected = tree.form_for_argument(node);
            if expected != arg.text {
                warnings.push((
                    offset,
                    Warning::StaleText {
                        frame: frame.head.clone(),
                        arg: arg.head.clone(),
                        stored: arg.text.clone(),
                        expected,
                    },
                ));
            }
            if is_apposition(tree.node(node)) {
                warnings.push((
                    offset,
                    Warning::ShouldNotAnnotate {
                        frame: frame.head.clone(),
                        arg: arg.head.clone(),
                    },
                ));
                failed = true;
            }
        }
        if arg.label.is_empty() {
            complete = false;
            continue;
        }
        if let Err(source) = validate_dep_label(&arg.label, &frame.label) {
            warnings.push((
                offset,
                Warning::UnknownRole {
                    frame: frame.head.clone(),
                    arg: arg.head.clone(),
                    source,
                },
            ));
            failed = true;
            continue;
        }
        if split_label(&arg.label).contains(&DEPICTIVE) && !has_backlink(tree, frame, i, frames) {
            warnings.push((
                offset,
                Warning::MissingBacklink {
                    frame: frame.head.clone(),
                    arg: arg.head.clone(),
                },
            ));
            failed = true;
        }
    }

    let status = if failed {
        FrameStatus::Failed
    } else if !complete {
        FrameStatus::Incomplete
    } else {
        FrameStatus::Annotated
    };
    FrameCheck { status, warnings }
}

/// First line of every frame entry, assuming the sentence is laid out the
/// way it is written.
fn entry_lines(sentence: &Sentence) -> Vec<usize> {
    let mut line = sentence.line + sentence.syntax.lines.len() + 1;
    sentence
        .frames
        .iter()
        .map(|entry| {
            let start = line;
            line += entry.lines().len() + 1;
            start
        })
        .collect()
}

pub fn check_sentence(sentence: &Sentence) -> CheckReport {
    let mut report = CheckReport::default();
    let tree = match &sentence.tree {
        Ok(tree) => tree,
        Err(e) => {
            report.warn(&sentence.id, sentence.line, Warning::InvalidSyntax(e.clone()));
            return report;
        }
    };

    let frames: Vec<&Frame> = sentence.frames().collect();
    let mut heads: HashSet<&TokenRef> = HashSet::new();
    for (entry, line) in sentence.frames.iter().zip(entry_lines(sentence)) {
        let frame = match entry {
            FrameEntry::Frame(frame) => frame,
            FrameEntry::Raw(block) => {
                if let Some(first) = block.lines.first() {
                    report.warn(&sentence.id, line, Warning::ParseFailure(first.clone()));
                }
                continue;
            }
        };
        if !heads.insert(&frame.head) {
            report.warn(&sentence.id, line, Warning::DuplicateFrame(frame.head.clone()));
            continue;
        }
        report.predicates += 1;
        let check = check_frame(tree, frame, &frames);
        for (offset, warning) in check.warnings {
            report.warn(&sentence.id, line + offset, warning);
        }
        if check.status == FrameStatus::Annotated {
            report.annotated += 1;
        }
    }
    report
}

pub fn check_document(doc: &Document) -> CheckReport {
    let mut report = CheckReport::default();
    for sentence in &doc.sentences {
        report += check_sentence(sentence);
    }
    report
}

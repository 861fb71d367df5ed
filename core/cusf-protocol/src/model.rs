use std::collections::HashSet;
use std::fmt;

use crate::ids::TokenRef;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// An expected argument link: the argument head and the text to use for a
/// fresh placeholder.
pub type ExpectedLink = (TokenRef, String);

/// One argument line of a frame block: `[label] text (head) # comment`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Argument {
    pub head: TokenRef,
    pub text: String,
    pub label: String,
    pub comment: String,
}

impl Argument {
    /// An unlabeled placeholder awaiting annotation.
    pub fn new(head: TokenRef, text: impl Into<String>) -> Self {
        Self {
            head,
            text: text.into(),
            label: String::new(),
            comment: String::new(),
        }
    }

    /// No label and no comment.
    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.comment.is_empty()
    }

    /// Arguments are the same link when head and label agree.
    pub fn same_identity(&self, other: &Argument) -> bool {
        self.head == other.head && self.label == other.label
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_line(f, &self.label, &self.text, &self.head, &self.comment)
    }
}

/// The first line of a frame block.
struct FrameLine<'a>(&'a Frame);

impl fmt::Display for FrameLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.0;
        write_line(f, &frame.label, &frame.text, &frame.head, &frame.comment)
    }
}

/// A predicate with its arguments. Serialized as one block: the frame line
/// followed by one line per argument.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub struct Frame {
    pub head: TokenRef,
    pub text: String,
    pub label: String,
    pub comment: String,
    pub args: Vec<Argument>,
}

impl Frame {
    pub fn new(head: TokenRef, text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            head,
            text: text.into(),
            label: label.into(),
            comment: String::new(),
            args: Vec::new(),
        }
    }

    /// No label, no comment and nothing but placeholder arguments.
    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.comment.is_empty() && self.args.iter().all(Argument::is_empty)
    }

    /// The frame and every one of its arguments carry a label.
    pub fn is_completely_annotated(&self) -> bool {
        !self.label.is_empty() && self.args.iter().all(|a| !a.label.is_empty())
    }

    /// Reconciles the argument list with the expected links.
    ///
    /// Arguments with a label or comment are always kept. The result holds
    /// the kept arguments for expected heads (in `expected` order), then a
    /// fresh placeholder for every expected head no kept argument covers,
    /// then the kept arguments for heads that are not expected at all.
    pub fn fill_args(&mut self, expected: &[ExpectedLink]) {
        let retained: Vec<Argument> = self.args.drain(..).filter(|a| !a.is_empty()).collect();

        let mut args = Vec::with_capacity(retained.len() + expected.len());
        let mut placeholders = Vec::new();
        let mut seen: HashSet<&TokenRef> = HashSet::new();

        for (head, text) in expected {
            if !seen.insert(head) {
                continue;
            }
            let before = args.len();
            args.extend(retained.iter().filter(|a| &a.head == head).cloned());
            if args.len() == before {
                placeholders.push(Argument::new(head.clone(), text.clone()));
            }
        }
        args.extend(placeholders);
        args.extend(retained.into_iter().filter(|a| !seen.contains(&a.head)));

        self.args = args;
    }

    /// The block lines of this frame.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.args.len() + 1);
        lines.push(FrameLine(self).to_string());
        lines.extend(self.args.iter().map(Argument::to_string));
        lines
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", FrameLine(self))?;
        for arg in &self.args {
            write!(f, "\n{arg}")?;
        }
        Ok(())
    }
}

fn write_line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    text: &str,
    head: &TokenRef,
    comment: &str,
) -> fmt::Result {
    write!(f, "[{label}] {text} ({head})")?;
    if !comment.is_empty() {
        write!(f, " # {comment}")?;
    }
    Ok(())
}

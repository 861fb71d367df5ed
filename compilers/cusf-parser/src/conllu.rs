//! CoNLL-U syntax blocks: `#` comment lines followed by ten-column,
//! tab-separated token rows.

use cusf_blocks::Block;
use cusf_protocol::TokenRef;
use cusf_syntax::components::TokenRow;
use cusf_syntax::{SyntaxTree, TreeError};
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, opt, recognize},
    multi::separated_list1,
    sequence::pair,
    Finish, IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConlluError {
    #[error("block has no token rows")]
    NoTokens,
    #[error("line {line}: expected 10 tab-separated columns, found {found}")]
    Columns { line: usize, found: usize },
    #[error("line {line}: malformed token id '{id}'")]
    TokenId { line: usize, id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConlluLine {
    Comment(String),
    Token(TokenRow),
}

/// A parsed syntax block, kept line by line so it serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConlluBlock {
    pub lines: Vec<ConlluLine>,
}

fn column(input: &str) -> IResult<&str, &str> {
    take_till1(|c| c == '\t')(input)
}

/// `7`, `7-8` or `7.1`.
fn token_id(input: &str) -> IResult<&str, &str> {
    recognize(pair(digit1, opt(pair(one_of("-."), digit1))))(input)
}

fn parse_row(line: &str, line_no: usize) -> Result<TokenRow, ConlluError> {
    let columns = match all_consuming(separated_list1(char('\t'), column))(line).finish() {
        Ok((_, columns)) => columns,
        // An empty column; count what the tabs suggest.
        Err(_) => return Err(ConlluError::Columns { line: line_no, found: line.split('\t').count() }),
    };
    let [id, form, lemma, upos, xpos, feats, head, deprel, deps, misc] = columns[..] else {
        return Err(ConlluError::Columns { line: line_no, found: columns.len() });
    };
    if all_consuming(token_id)(id).finish().is_err() {
        return Err(ConlluError::TokenId { line: line_no, id: id.to_string() });
    }
    Ok(TokenRow {
        id: TokenRef::from(id),
        form: form.to_string(),
        lemma: lemma.to_string(),
        upos: upos.to_string(),
        xpos: xpos.to_string(),
        feats: feats.to_string(),
        head: head.to_string(),
        deprel: deprel.to_string(),
        deps: deps.to_string(),
        misc: misc.to_string(),
    })
}

impl ConlluBlock {
    pub fn parse(block: &Block) -> Result<Self, ConlluError> {
        let mut lines = Vec::with_capacity(block.len());
        for (i, line) in block.lines.iter().enumerate() {
            if line.starts_with('#') {
                lines.push(ConlluLine::Comment(line.clone()));
            } else {
                lines.push(ConlluLine::Token(parse_row(line, block.line + i)?));
            }
        }
        let parsed = Self { lines };
        if parsed.rows().next().is_none() {
            return Err(ConlluError::NoTokens);
        }
        Ok(parsed)
    }

    pub fn rows(&self) -> impl Iterator<Item = &TokenRow> {
        self.lines.iter().filter_map(|l| match l {
            ConlluLine::Token(row) => Some(row),
            ConlluLine::Comment(_) => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|l| match l {
            ConlluLine::Comment(c) => Some(c.as_str()),
            ConlluLine::Token(_) => None,
        })
    }

    /// Value of a `# key = value` comment.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.comments().find_map(|c| {
            let (k, v) = c.trim_start_matches('#').split_once('=')?;
            (k.trim() == key).then(|| v.trim())
        })
    }

    pub fn sent_id(&self) -> Option<&str> {
        self.meta("sent_id")
    }

    /// The `# text` comment, or the word forms joined by spaces.
    pub fn text(&self) -> String {
        match self.meta("text") {
            Some(text) => text.to_string(),
            None => self
                .rows()
                .filter(|r| r.id.is_word())
                .map(|r| r.form.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn tree(&self) -> Result<SyntaxTree, TreeError> {
        SyntaxTree::build(self.rows())
    }

    pub fn to_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|l| match l {
                ConlluLine::Comment(c) => c.clone(),
                ConlluLine::Token(row) => row.to_string(),
            })
            .collect()
    }
}

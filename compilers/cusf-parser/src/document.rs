//! CUSF documents: each sentence is a CoNLL-U block followed by zero or more
//! frame blocks.

use std::io::{self, BufRead, Write};

use cusf_blocks::Block;
use cusf_protocol::{Frame, SentenceId};
use cusf_syntax::{SyntaxTree, TreeError};
use thiserror::Error;
use tracing::debug;

use crate::conllu::ConlluBlock;
use crate::frame::parse_frame;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read document: {0}")]
    Io(#[from] io::Error),
}

/// A frame block, or a block that did not parse and is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEntry {
    Frame(Frame),
    Raw(Block),
}

impl FrameEntry {
    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            FrameEntry::Frame(frame) => Some(frame),
            FrameEntry::Raw(_) => None,
        }
    }

    pub fn as_frame_mut(&mut self) -> Option<&mut Frame> {
        match self {
            FrameEntry::Frame(frame) => Some(frame),
            FrameEntry::Raw(_) => None,
        }
    }

    /// A nonempty block that is not a frame. Empty blocks (from doubled
    /// blank lines) are kept but are not failures.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, FrameEntry::Raw(block) if !block.is_empty())
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            FrameEntry::Frame(frame) => frame.lines(),
            FrameEntry::Raw(block) => block.lines.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sentence {
    pub id: SentenceId,
    /// Line number of the syntax block.
    pub line: usize,
    pub syntax: ConlluBlock,
    pub tree: Result<SyntaxTree, TreeError>,
    pub frames: Vec<FrameEntry>,
}

impl Sentence {
    /// `ordinal` names the sentence when its syntax has no `sent_id`.
    pub fn new(syntax: ConlluBlock, line: usize, ordinal: usize) -> Self {
        let id = match syntax.sent_id() {
            Some(id) => SentenceId::from(id),
            None => SentenceId::from(ordinal.to_string()),
        };
        let tree = syntax.tree();
        if let Err(e) = &tree {
            debug!(sentence = %id, line, "syntax block is not a tree: {}", e);
        }
        Self {
            id,
            line,
            syntax,
            tree,
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter_map(FrameEntry::as_frame)
    }

    pub fn has_parse_failures(&self) -> bool {
        self.frames.iter().any(FrameEntry::is_parse_failure)
    }

    /// Adds the next block of this sentence. Once a block failed to parse,
    /// the following blocks are kept verbatim as well.
    fn push_block(&mut self, block: Block) {
        if block.is_empty() || self.has_parse_failures() {
            self.frames.push(FrameEntry::Raw(block));
            return;
        }
        match parse_frame(&block) {
            Ok(frame) => self.frames.push(FrameEntry::Frame(frame)),
            Err(e) => {
                debug!(sentence = %self.id, "keeping block verbatim: {}", e);
                self.frames.push(FrameEntry::Raw(block));
            }
        }
    }

    pub fn blocks(&self) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(self.frames.len() + 1);
        blocks.push(Block::new(self.syntax.to_lines()));
        blocks.extend(self.frames.iter().map(|f| Block::new(f.lines())));
        blocks
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        cusf_blocks::write_all(&self.blocks(), writer)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Blocks before the first syntax block.
    pub leading: Vec<Block>,
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn from_blocks<I: IntoIterator<Item = Block>>(blocks: I) -> Self {
        let mut doc = Document::default();
        for block in blocks {
            doc.push_block(block);
        }
        doc
    }

    fn push_block(&mut self, block: Block) {
        if !block.is_empty() {
            if let Ok(syntax) = ConlluBlock::parse(&block) {
                let ordinal = self.sentences.len() + 1;
                self.sentences.push(Sentence::new(syntax, block.line, ordinal));
                return;
            }
        }
        match self.sentences.last_mut() {
            Some(sentence) => sentence.push_block(block),
            None => self.leading.push(block),
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        cusf_blocks::write_all(&self.leading, writer)?;
        for sentence in &self.sentences {
            sentence.write(writer)?;
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = cusf_blocks::render(&self.leading);
        for sentence in &self.sentences {
            out.push_str(&cusf_blocks::render(&sentence.blocks()));
        }
        out
    }
}

pub fn read<R: BufRead>(reader: R) -> Result<Document, DocumentError> {
    let blocks = cusf_blocks::read(reader).collect::<io::Result<Vec<_>>>()?;
    Ok(Document::from_blocks(blocks))
}

pub fn read_str(text: &str) -> Document {
    Document::from_blocks(cusf_blocks::read_str(text))
}

/// Prepends `# sent_id` and `# text` comments to a block of whitespace
/// separated token lines; the text joins each line's second field.
pub fn number_sentence(block: &Block, sent_id: usize) -> Block {
    let text = block
        .lines
        .iter()
        .filter_map(|l| l.split_whitespace().nth(1))
        .collect::<Vec<_>>()
        .join(" ");
    let mut lines = Vec::with_capacity(block.len() + 2);
    lines.push(format!("# sent_id = {sent_id}"));
    lines.push(format!("# text = {text}"));
    lines.extend(block.lines.iter().cloned());
    Block::new(lines)
}

/// Numbers every block from 1, see [`number_sentence`].
pub fn add_sentence_ids<I: IntoIterator<Item = Block>>(blocks: I) -> Vec<Block> {
    blocks
        .into_iter()
        .enumerate()
        .map(|(i, block)| number_sentence(&block, i + 1))
        .collect()
}

//! Files structured into blocks.
//!
//! A block is a maximal run of nonempty lines. It is terminated by an empty
//! line; the terminating empty line is optional at the end of the file. Two
//! or more consecutive empty lines mean one or more empty blocks in between.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// 1-based line number of the first line (of the terminating empty line
    /// for an empty block). Zero for blocks that were not read from a file.
    pub line: usize,
    pub lines: Vec<String>,
}

impl Block {
    pub fn new(lines: Vec<String>) -> Self {
        Self { line: 0, lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl From<Vec<String>> for Block {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}

/// Lazy block reader. Consumes the underlying reader; not seekable.
pub struct Blocks<R> {
    lines: io::Lines<R>,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> Iterator for Blocks<R> {
    type Item = io::Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut block = Block {
            line: self.line_no + 1,
            lines: Vec::new(),
        };
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.line_no += 1;
                    if line.is_empty() {
                        return Some(Ok(block));
                    }
                    block.lines.push(line);
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return (!block.is_empty()).then_some(Ok(block));
                }
            }
        }
    }
}

pub fn read<R: BufRead>(reader: R) -> Blocks<R> {
    Blocks {
        lines: reader.lines(),
        line_no: 0,
        done: false,
    }
}

pub fn read_str(text: &str) -> Vec<Block> {
    // Reading from a &str cannot fail.
    read(text.as_bytes()).filter_map(Result::ok).collect()
}

/// Writes the block's lines followed by exactly one empty line.
pub fn write<W: Write>(block: &Block, writer: &mut W) -> io::Result<()> {
    write_lines(&block.lines, writer)
}

pub fn write_lines<W: Write, S: AsRef<str>>(lines: &[S], writer: &mut W) -> io::Result<()> {
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
    }
    writeln!(writer)
}

pub fn write_all<'a, W, I>(blocks: I, writer: &mut W) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Block>,
{
    for block in blocks {
        write(block, writer)?;
    }
    Ok(())
}

pub fn render<'a, I: IntoIterator<Item = &'a Block>>(blocks: I) -> String {
    let mut out = String::new();
    for block in blocks {
        for line in &block.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Consecutive groups of `size` blocks; the last group may be shorter.
pub fn chunks(blocks: &[Block], size: usize) -> std::slice::Chunks<'_, Block> {
    blocks.chunks(size.max(1))
}

/// Name of the `index`-th chunk of a burst file: `base.ext` becomes
/// `base.NN.ext`. `None` if the file name has no extension.
pub fn chunk_path(path: &Path, index: usize) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let (base, ext) = name.split_once('.')?;
    Some(path.with_file_name(format!("{base}.{index:02}.{ext}")))
}

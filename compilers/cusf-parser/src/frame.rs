//! Frame blocks. Every line reads `[LABEL] TEXT (HEAD)`, optionally followed
//! by ` # COMMENT`; the first line is the frame, the others its arguments.

use cusf_blocks::Block;
use cusf_protocol::{Argument, Frame, TokenRef};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_till1},
    character::complete::{anychar, char},
    combinator::{eof, opt, peek, recognize, rest},
    multi::many_till,
    sequence::{delimited, preceded, terminated},
    Finish, IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: not a frame line: '{text}'")]
pub struct FrameParseError {
    pub line: usize,
    pub text: String,
}

struct LineParts<'a> {
    label: &'a str,
    text: &'a str,
    head: &'a str,
    comment: &'a str,
}

/// ` (HEAD)` at the end of the line or before ` # `.
fn head(input: &str) -> IResult<&str, &str> {
    terminated(
        delimited(
            tag(" ("),
            take_till1(|c: char| c == '(' || c == ')' || c.is_whitespace()),
            char(')'),
        ),
        peek(alt((eof, tag(" # ")))),
    )(input)
}

fn line_parts(input: &str) -> IResult<&str, LineParts<'_>> {
    let (input, label) = delimited(char('['), take_till(|c| c == ']'), char(']'))(input)?;
    let (input, _) = char(' ')(input)?;
    // The text runs up to the first head that can end the line.
    let (input, text) = recognize(many_till(anychar, peek(head)))(input)?;
    let (input, head) = head(input)?;
    let (input, comment) = opt(preceded(tag(" # "), rest))(input)?;
    Ok((
        input,
        LineParts {
            label,
            text,
            head,
            comment: comment.unwrap_or(""),
        },
    ))
}

fn parse_parts(line: &str, line_no: usize) -> Result<LineParts<'_>, FrameParseError> {
    line_parts(line)
        .finish()
        .map(|(_, parts)| parts)
        .map_err(|_| FrameParseError {
            line: line_no,
            text: line.to_string(),
        })
}

pub fn parse_argument(line: &str, line_no: usize) -> Result<Argument, FrameParseError> {
    let parts = parse_parts(line, line_no)?;
    Ok(Argument {
        head: TokenRef::from(parts.head),
        text: parts.text.to_string(),
        label: parts.label.to_string(),
        comment: parts.comment.to_string(),
    })
}

pub fn parse_frame(block: &Block) -> Result<Frame, FrameParseError> {
    let Some((first, rest)) = block.lines.split_first() else {
        return Err(FrameParseError {
            line: block.line,
            text: String::new(),
        });
    };
    let parts = parse_parts(first, block.line)?;
    let mut frame = Frame::new(TokenRef::from(parts.head), parts.text, parts.label);
    frame.comment = parts.comment.to_string();
    for (i, line) in rest.iter().enumerate() {
        frame.args.push(parse_argument(line, block.line + i + 1)?);
    }
    Ok(frame)
}

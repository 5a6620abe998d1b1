//! Splitting source text into classified lines.
//!
//! This is the only place comments and blank lines are dropped. Every later
//! stage counts positions in the sequence of lines this produces.
//!
//! ```
//! # use smali_analyzer::lex::{Lexer, LineType};
//! let source = ".method foo()V  # entry\n\n    goto :done\n:done\n.end method\n";
//! let lines = Lexer::new(source).collect::<Vec<_>>();
//! assert_eq!(lines.iter().map(|line| line.ty).collect::<Vec<_>>(),
//!     vec![LineType::Meta, LineType::Op, LineType::Label, LineType::Meta]);
//! assert_eq!(lines[0].text, ".method foo()V");
//! assert_eq!(lines[1].number, 3);
//! ```

use std::fmt::{Display, Formatter};
use std::str::Lines;

use regex::Regex;

/// The comment marker runs to end of line and cannot be escaped.
const COMMENT_PATTERN: &str = r"#.*$";

/// What a non-blank line holds, decided by its first character.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LineType {
    /// Starts with `.`.
    Meta,
    /// Starts with `:`.
    Label,
    /// Anything else.
    Op,
}

impl LineType {
    pub fn classify(text: &str) -> Self {
        match text.chars().next() {
            Some('.') => LineType::Meta,
            Some(':') => LineType::Label,
            _ => LineType::Op,
        }
    }
}

/// A comment-stripped, trimmed, non-blank line of source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Line<'input> {
    /// 1-based line number in the original text.
    pub number: usize,
    pub text: &'input str,
    pub ty: LineType,
}

impl<'input> Display for Line<'input> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:>4}: {}", self.number, self.text)
    }
}

pub struct Lexer<'input> {
    lines: std::iter::Enumerate<Lines<'input>>,
    comment: Regex,
}

impl<'input> Lexer<'input> {
    pub fn new(src: &'input str) -> Lexer<'input> {
        Lexer {
            lines: src.lines().enumerate(),
            comment: Regex::new(COMMENT_PATTERN).expect("Invalid regex"),
        }
    }

    fn strip_comment<'a>(&self, raw: &'a str) -> &'a str {
        match self.comment.find(raw) {
            Some(found) => &raw[..found.start()],
            None => raw,
        }
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Line<'input>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (i, raw) = self.lines.next()?;
            let text = self.strip_comment(raw).trim();
            if text.is_empty() {
                continue;
            }
            return Some(Line {
                number: i + 1,
                text,
                ty: LineType::classify(text),
            });
        }
    }
}

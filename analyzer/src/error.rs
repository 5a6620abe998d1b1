use std::fmt::{Display, Formatter};

use annotate_snippets::display_list::{DisplayList, FormatOptions};
use annotate_snippets::snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation};

use Error::*;

/// Reasons a single line can't be turned into a token.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LexError {
    /// A `.` with nothing after it.
    MissingDirectiveName,
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use LexError::*;
        match self {
            MissingDirectiveName => write!(f, "directive has no name"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UnbalancedMethodReason {
    /// `.method` while another method was still open.
    NestedStart { open_line: usize },
    /// `.end method` with no open method.
    UnmatchedEnd,
    /// `.method` never closed before end of input.
    Unclosed,
}

impl Display for UnbalancedMethodReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use UnbalancedMethodReason::*;
        match self {
            NestedStart { open_line } => write!(f, ".method before .end method of the method opened on line {}", open_line),
            UnmatchedEnd              => write!(f, ".end method without a matching .method"),
            Unclosed                  => write!(f, ".method is never closed by .end method"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("malformed line, {reason}")]
    Lex { line: usize, text: String, reason: LexError },
    #[error("branch references undefined label `:{label}`")]
    UnresolvedLabel { line: usize, text: String, label: String },
    #[error("label `:{label}` already defined on line {first_line}")]
    DuplicateLabel { line: usize, text: String, label: String, first_line: usize },
    #[error("unbalanced method, {reason}")]
    UnbalancedMethod { line: usize, text: String, reason: UnbalancedMethodReason },
    #[error("token {index} is not a label")]
    NotALabelRun { index: usize },
    #[error("range {start}..={end} is outside a stream of {len} tokens")]
    OutOfRange { start: usize, end: usize, len: usize },
}

impl Error {
    /// 1-based source line the error points at, if it points at one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Lex { line, .. }
            | UnresolvedLabel { line, .. }
            | DuplicateLabel { line, .. }
            | UnbalancedMethod { line, .. } => Some(*line),
            NotALabelRun { .. }
            | OutOfRange { .. } => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self {
            Lex { text, .. }
            | UnresolvedLabel { text, .. }
            | DuplicateLabel { text, .. }
            | UnbalancedMethod { text, .. } => Some(text),
            NotALabelRun { .. }
            | OutOfRange { .. } => None,
        }
    }

    fn annotation_label(&self) -> &'static str {
        match self {
            Lex { .. }                 => "malformed line here",
            UnresolvedLabel { .. }     => "referenced here",
            DuplicateLabel { .. }      => "redefined here",
            UnbalancedMethod { .. }    => "here",
            NotALabelRun { .. }
            | OutOfRange { .. }        => "",
        }
    }

    /// Renders the error as a source snippet pointing at the offending line.
    pub fn render(&self, origin: Option<&str>, color: bool) -> String {
        let message = self.to_string();
        let mut slices = Vec::new();
        if let (Some(line), Some(text)) = (self.line(), self.text()) {
            slices.push(Slice {
                source: text,
                line_start: line,
                origin,
                fold: false,
                annotations: vec![SourceAnnotation {
                    range: (0, text.len()),
                    label: self.annotation_label(),
                    annotation_type: AnnotationType::Error,
                }],
            });
        }
        let snippet = Snippet {
            title: Some(Annotation {
                label: Some(message.as_str()),
                id: None,
                annotation_type: AnnotationType::Error,
            }),
            footer: vec![],
            slices,
            opt: FormatOptions { color, ..Default::default() },
        };
        DisplayList::from(snippet).to_string()
    }
}

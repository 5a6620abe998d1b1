//! Finding the method regions of an analyzed stream.
//!
//! A method starts at a `.method` directive and ends at the next `.end method`,
//! both inclusive. Methods don't nest. Tokens outside of any method (class
//! headers, fields, trailing directives) aren't part of any slice.

use std::ops::RangeInclusive;

use log::debug;

use crate::analyze::AnalyzedStream;
use crate::error::{Error, UnbalancedMethodReason};
use crate::token::Token;

/// A view of one method's tokens within an [`AnalyzedStream`].
#[derive(Clone, Copy, Debug)]
pub struct MethodSlice<'a> {
    start: usize,
    end: usize,
    tokens: &'a [Token],
    signature: &'a str,
}

impl<'a> MethodSlice<'a> {
    /// Stream index of the `.method` directive.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Stream index of the `.end method` directive.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The last field of the `.method` line, e.g. `main([Ljava/lang/String;)V`.
    pub fn name(&self) -> &'a str {
        self.tokens[0].fields()
            .last()
            .map_or("", String::as_str)
    }

    /// This method's part of the stream signature.
    pub fn signature(&self) -> &'a str {
        self.signature
    }
}

/// Iterator over the methods of a stream, in order.
#[derive(Debug)]
pub struct MethodSlices<'a> {
    stream: &'a AnalyzedStream,
    ranges: std::vec::IntoIter<(usize, usize)>,
}

impl<'a> Iterator for MethodSlices<'a> {
    type Item = MethodSlice<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (start, end) = self.ranges.next()?;
        Some(MethodSlice {
            start,
            end,
            tokens: &self.stream.tokens()[start..=end],
            signature: &self.stream.signature()[start..=end],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ranges.size_hint()
    }
}

impl<'a> ExactSizeIterator for MethodSlices<'a> {}

fn is_method_start(token: &Token) -> bool {
    token.is_meta_named("method")
}

fn is_method_end(token: &Token) -> bool {
    token.is_meta_named("end")
        && token.fields().last().map_or(false, |field| field == "method")
}

fn unbalanced(token: &Token, reason: UnbalancedMethodReason) -> Error {
    Error::UnbalancedMethod {
        line: token.source_line(),
        text: format!(".{}", token.line()),
        reason,
    }
}

/// Checks that `.method` and `.end method` pair up, then iterates over the pairs.
///
/// Fails on the first unpaired directive, before any slice is produced.
pub fn split_methods(stream: &AnalyzedStream) -> Result<MethodSlices<'_>, Error> {
    let tokens = stream.tokens();
    let mut open: Option<usize> = None;
    let mut ranges = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        if is_method_start(token) {
            if let Some(start) = open {
                let open_line = tokens[start].source_line();
                return Err(unbalanced(token, UnbalancedMethodReason::NestedStart { open_line }));
            }
            open = Some(index);
        } else if is_method_end(token) {
            match open.take() {
                Some(start) => ranges.push((start, index)),
                None => return Err(unbalanced(token, UnbalancedMethodReason::UnmatchedEnd)),
            }
        }
    }
    if let Some(start) = open {
        return Err(unbalanced(&tokens[start], UnbalancedMethodReason::Unclosed));
    }

    debug!("found {} methods", ranges.len());

    Ok(MethodSlices { stream, ranges: ranges.into_iter() })
}

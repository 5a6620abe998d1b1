//! A front-end for smali-style register bytecode assembly.
//!
//! Source text goes through these stages, in order:
//!
//! 1. [Lexing](crate::lex): comments and blank lines are dropped, and each remaining
//!    line is classified as a directive (`.method`), a label (`:cond_0`) or an
//!    instruction (`move/from16 v0, v18`).
//! 2. [Parsing](crate::parse): each line becomes a [`Token`](token::Token). Directive
//!    names and mnemonics are interned in a [`TypeRegistry`](registry::TypeRegistry)
//!    and label definitions are collected.
//! 3. [Analysis](crate::analyze): tokens are indexed, branches are linked to their
//!    labels, and the stream's [signature](analyze::AnalyzedStream::signature) is computed.
//! 4. [Method splitting](crate::methods): the analyzed stream is cut into one slice
//!    per `.method` ... `.end method` region.
//!
//! ```
//! # use smali_analyzer::{analyze, parse, split_methods, signature};
//! let source = "
//! .class public LCounter;
//! .method public static countdown(I)V
//!     :loop
//!     if-lez p0, :done
//!     add-int/lit8 p0, p0, -0x1
//!     goto :loop
//!     :done
//!     return-void
//! .end method
//! ";
//! let stream = analyze(parse(source).unwrap()).unwrap();
//! assert_eq!(signature(&stream), "MMLBOBLOM");
//!
//! let methods = split_methods(&stream).unwrap().collect::<Vec<_>>();
//! assert_eq!(methods.len(), 1);
//! assert_eq!(methods[0].name(), "countdown(I)V");
//! ```

pub mod error;
pub mod registry;
pub mod lex;
pub mod token;
pub mod labels;
pub mod parse;
pub mod analyze;
pub mod methods;
pub mod rewrite;

use crate::analyze::AnalyzedStream;
use crate::error::Error;
use crate::methods::MethodSlices;
use crate::parse::{Parser, TokenStream};

/// How forgiving parsing is about input the legacy tooling silently accepted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LeniencyLevel {
    /// Labels defined more than once are reported as errors.
    Strict,
    /// Labels defined more than once are allowed; the last definition wins.
    Lenient,
}

impl LeniencyLevel {
    pub fn duplicate_labels_allowed(&self) -> bool {
        match self {
            LeniencyLevel::Lenient => true,
            LeniencyLevel::Strict => false
        }
    }
}

impl Default for LeniencyLevel {
    fn default() -> Self {
        LeniencyLevel::Strict
    }
}

/// Parses `text` with a fresh, strict [`Parser`].
pub fn parse(text: &str) -> Result<TokenStream, Vec<Error>> {
    Parser::default().parse(text)
}

/// Indexes a parsed stream, resolves its branches and computes its signature.
pub fn analyze(stream: TokenStream) -> Result<AnalyzedStream, Vec<Error>> {
    analyze::analyze(stream)
}

/// Iterates over the `.method` ... `.end method` regions of an analyzed stream.
pub fn split_methods(stream: &AnalyzedStream) -> Result<MethodSlices<'_>, Error> {
    methods::split_methods(stream)
}

/// One character per token: `B`ranch, `O`p, `M`eta or `L`abel.
pub fn signature(stream: &AnalyzedStream) -> &str {
    stream.signature()
}

/// Parses and analyzes `text` in one go.
pub fn parse_and_analyze(text: &str, leniency: LeniencyLevel) -> Result<AnalyzedStream, Vec<Error>> {
    let stream = Parser::new(leniency).parse(text)?;
    analyze::analyze(stream)
}

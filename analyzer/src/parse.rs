//! Turning source text into a [`TokenStream`].
//!
//! Parsing runs the [lexer](crate::lex) over the text and builds one [`Token`]
//! per classified line, interning directive and mnemonic names in the parser's
//! [`TypeRegistry`] and recording every label definition in a fresh [`LabelTable`]:
//!
//! ```
//! # use smali_analyzer::LeniencyLevel;
//! # use smali_analyzer::parse::Parser;
//! let parser = Parser::new(LeniencyLevel::Strict);
//! let stream = parser.parse(".method foo()V\n:loop\ngoto :loop\n.end method\n").unwrap();
//! assert_eq!(stream.len(), 4);
//! assert_eq!(stream.labels().get("loop"), Some(1));
//! ```
//!
//! The parser keeps its registry between calls, so names seen in one file keep
//! the same [`Kind`](crate::registry::Kind) in the next. Label tables are never shared.
//!
//! Parsing doesn't look at how tokens refer to each other; resolving branches
//! is left to [analysis](crate::analyze).

use std::sync::Arc;

use log::debug;

use crate::error::Error;
use crate::labels::LabelTable;
use crate::lex::Lexer;
use crate::registry::TypeRegistry;
use crate::token::{Token, TokenType};
use crate::LeniencyLevel;

/// The tokens of one source unit, in source order, plus where its labels are.
#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    pub(crate) tokens: Vec<Token>,
    pub(crate) labels: LabelTable,
}

impl TokenStream {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub struct Parser {
    registry: Arc<TypeRegistry>,
    leniency: LeniencyLevel,
}

impl Parser {
    /// A parser with a registry of its own.
    pub fn new(leniency: LeniencyLevel) -> Self {
        Self::with_registry(leniency, Arc::new(TypeRegistry::new()))
    }

    /// A parser interning into `registry`, which may be shared with other parsers.
    pub fn with_registry(leniency: LeniencyLevel, registry: Arc<TypeRegistry>) -> Self {
        Parser { registry, leniency }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn leniency(&self) -> &LeniencyLevel {
        &self.leniency
    }

    /// Parses `text` into a token stream.
    ///
    /// Text with no code in it gives an empty stream.
    /// All malformed lines and duplicate labels are reported together;
    /// nothing is returned alongside them.
    pub fn parse(&self, text: &str) -> Result<TokenStream, Vec<Error>> {
        let mut stream = TokenStream::default();
        let mut errors = Vec::new();

        for line in Lexer::new(text) {
            let token = match Token::from_line(&line, &self.registry) {
                Ok(token) => token,
                Err(error) => {
                    errors.push(error);
                    continue;
                }
            };
            if let TokenType::Label(label) = &token.ty {
                let position = stream.tokens.len();
                if let Err(error) = stream.labels.define(label.name(), position, line.number, line.text, &self.leniency) {
                    errors.push(error);
                }
            }
            stream.tokens.push(token);
        }

        debug!("{} lines of code, {} labels", stream.len(), stream.labels.len());

        if errors.is_empty() {
            Ok(stream)
        } else {
            Err(errors)
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new(Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use crate::error::LexError;

    const SOURCE: &str = "\
# a comment before anything
.class public LFoo;
.super Ljava/lang/Object;

.method public static abs(I)I
    .registers 2          # two registers

    if-gez p0, :cond_0
    neg-int p0, p0
    :cond_0
    return p0
.end method
";

    #[test]
    fn one_token_per_code_line() {
        let stream = Parser::default().parse(SOURCE).unwrap();
        let lines = stream.tokens().iter()
            .map(|token| (token.source_line(), token.line()))
            .collect::<Vec<_>>();
        assert_eq!(lines, vec![
            (2, "class public LFoo;".to_string()),
            (3, "super Ljava/lang/Object;".to_string()),
            (5, "method public static abs(I)I".to_string()),
            (6, "registers 2".to_string()),
            (8, "if-gez p0, :cond_0".to_string()),
            (9, "neg-int p0, p0".to_string()),
            (10, ":cond_0".to_string()),
            (11, "return p0".to_string()),
            (12, "end method".to_string()),
        ]);
        assert!(stream.tokens().iter().all(|token| token.index().is_none()));
    }

    #[test]
    fn labels_are_recorded() {
        let stream = Parser::default().parse(SOURCE).unwrap();
        assert_eq!(stream.labels().len(), 1);
        assert_eq!(stream.labels().get("cond_0"), Some(6));
        assert!(stream.tokens()[6].as_label().is_some());
    }

    #[test]
    fn empty_text_gives_empty_stream() {
        let stream = Parser::default().parse("   \n# only a comment\n").unwrap();
        assert!(stream.is_empty());
        assert!(stream.labels().is_empty());
    }

    #[test]
    fn duplicate_label_strict() {
        let errors = Parser::new(LeniencyLevel::Strict)
            .parse(":a\nnop\n:a\n")
            .unwrap_err();
        assert_eq!(errors, vec![Error::DuplicateLabel {
            line: 3,
            text: ":a".to_string(),
            label: "a".to_string(),
            first_line: 1,
        }]);
    }

    #[test]
    fn duplicate_label_lenient() {
        let stream = Parser::new(LeniencyLevel::Lenient)
            .parse(":a\nnop\n:a\n")
            .unwrap();
        assert_eq!(stream.labels().get("a"), Some(2));
    }

    #[test]
    fn reports_every_malformed_line() {
        let errors = Parser::default().parse(".\nnop\n:\n.\n").unwrap_err();
        let reasons = errors.iter()
            .map(|error| match error {
                Error::Lex { line, reason, .. } => (*line, *reason),
                other => panic!("unexpected error {:?}", other),
            })
            .collect::<Vec<_>>();
        assert_eq!(reasons, vec![
            (1, LexError::MissingDirectiveName),
            (4, LexError::MissingDirectiveName),
        ]);
    }

    #[test]
    fn registry_persists_across_parses() {
        let parser = Parser::default();
        let first = parser.parse("move v0, v1").unwrap();
        let second = parser.parse("move v2, v3").unwrap();
        let kind = |stream: &TokenStream| stream.tokens()[0].as_op().unwrap().kind().clone();
        assert!(kind(&first).is(&kind(&second)));
        assert_eq!(parser.registry().len(), 1);
    }

    #[test]
    fn shared_registry() {
        let registry = Arc::new(TypeRegistry::new());
        let a = Parser::with_registry(LeniencyLevel::Strict, Arc::clone(&registry));
        let b = Parser::with_registry(LeniencyLevel::Lenient, Arc::clone(&registry));
        let from_a = a.parse(".method x()V").unwrap();
        let from_b = b.parse(".method y()V").unwrap();
        assert!(from_a.tokens()[0].as_meta().unwrap().kind()
            .is(from_b.tokens()[0].as_meta().unwrap().kind()));
        assert_eq!(registry.len(), 1);
    }
}

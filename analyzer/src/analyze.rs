//! Semantic analysis of a parsed [`TokenStream`].
//!
//! Analysis gives every token its permanent index, links each branch instruction
//! to the label it jumps to (and the label back to the branch), and summarizes
//! the stream as a signature string with one character per token:
//!
//! | char | token                          |
//! |------|--------------------------------|
//! | `B`  | branch instruction             |
//! | `O`  | any other instruction          |
//! | `M`  | directive                      |
//! | `L`  | label                          |
//!
//! ```
//! # use smali_analyzer::{analyze, parse};
//! let stream = parse(".method f()V\n:top\nnop\ngoto :top\n.end method").unwrap();
//! let analyzed = analyze(stream).unwrap();
//! assert_eq!(analyzed.signature(), "MLOBM");
//!
//! let goto = &analyzed.tokens()[3];
//! let target = analyzed.jump_target(goto).unwrap();
//! assert_eq!(target.index(), Some(1));
//! assert_eq!(target.as_label().unwrap().name(), "top");
//! ```
//!
//! Each concern is a separate pass over the stream, written as a `Visitor`.
//! Passes only collect; the results are applied once every pass has finished
//! without errors, so a failed analysis never leaves a half-linked stream behind.

use log::debug;

use crate::error::Error;
use crate::labels::LabelTable;
use crate::parse::TokenStream;
use crate::token::{Op, Token, TokenType};

/// A token stream after indexing and branch resolution. Not mutated afterwards.
#[derive(Clone, Debug)]
pub struct AnalyzedStream {
    tokens: Vec<Token>,
    labels: LabelTable,
    signature: String,
}

impl AnalyzedStream {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// The Label token defining `name`.
    pub fn label(&self, name: &str) -> Option<&Token> {
        self.labels.get(name).and_then(|index| self.get(index))
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The Label token a branch jumps to. `None` for anything but a branch.
    pub fn jump_target(&self, token: &Token) -> Option<&Token> {
        token.as_op()
            .and_then(Op::jump_target)
            .and_then(|index| self.get(index))
    }

    /// The branch tokens jumping to a label, in stream order. Empty for anything but a label.
    pub fn referencing_branches<'a>(&'a self, token: &'a Token) -> impl Iterator<Item=&'a Token> + 'a {
        token.as_label()
            .into_iter()
            .flat_map(|label| label.referencing_branches().iter())
            .filter_map(move |index| self.get(*index))
    }
}

/// Indexes `stream`, resolves its branches and computes its signature.
pub fn analyze(stream: TokenStream) -> Result<AnalyzedStream, Vec<Error>> {
    let TokenStream { mut tokens, labels } = stream;

    let mut br = BranchResolutionAnalysis::new(&labels);
    visit(&mut br, &tokens);
    if !br.errors.is_empty() {
        return Err(br.errors);
    }

    let mut sig = SignatureAnalysis::new();
    visit(&mut sig, &tokens);

    for (index, token) in tokens.iter_mut().enumerate() {
        token.index = Some(index);
    }
    let edges = br.edges.len();
    for (op_index, label_index) in br.edges {
        if let Some(op) = tokens[op_index].as_op_mut() {
            op.jump_target = Some(label_index);
        }
        if let Some(label) = tokens[label_index].as_label_mut() {
            label.add_branch(op_index);
        }
    }

    debug!("analyzed {} tokens, resolved {} branches", tokens.len(), edges);

    Ok(AnalyzedStream { tokens, labels, signature: sig.signature })
}

struct BranchResolutionAnalysis<'a> {
    labels: &'a LabelTable,
    edges: Vec<(usize, usize)>,
    errors: Vec<Error>,
}

impl<'a> BranchResolutionAnalysis<'a> {
    fn new(labels: &'a LabelTable) -> Self {
        Self {
            labels,
            edges: Default::default(),
            errors: Default::default(),
        }
    }
}

impl<'a> Visitor for BranchResolutionAnalysis<'a> {
    fn enter_op(&mut self, op: &Op, token: &Token, index: usize) {
        if !op.is_branch() {
            return;
        }
        // A bare `goto` has only its mnemonic, which is then the reference.
        let reference = match token.fields().last() {
            Some(reference) => reference,
            None => return,
        };
        let name = reference.strip_prefix(':').unwrap_or(reference);
        match self.labels.get(name) {
            Some(label_index) => self.edges.push((index, label_index)),
            None => self.errors.push(Error::UnresolvedLabel {
                line: token.source_line(),
                text: token.line(),
                label: name.to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct SignatureAnalysis {
    signature: String,
}

impl SignatureAnalysis {
    fn new() -> Self {
        Default::default()
    }
}

impl Visitor for SignatureAnalysis {
    fn enter_token(&mut self, token: &Token, _index: usize) {
        self.signature.push(token.signature_char());
    }
}

fn visit(v: &mut impl Visitor, tokens: &[Token]) {
    for (index, token) in tokens.iter().enumerate() {
        v.enter_token(token, index);
        if let TokenType::Op(op) = &token.ty {
            v.enter_op(op, token, index);
        }
    }
}

trait Visitor {
    fn enter_token(&mut self, _token: &Token, _index: usize) {}
    fn enter_op(&mut self, _op: &Op, _token: &Token, _index: usize) {}
}

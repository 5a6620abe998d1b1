//! The typed tokens a source file is turned into, one per classified [`Line`].

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::error::{Error, LexError};
use crate::lex::{Line, LineType};
use crate::registry::{Category, Kind, TypeRegistry};

/// Mnemonics that transfer control to a label given as their last operand.
pub const BRANCHES: [&str; 13] = [
    "if-eq",  "if-ne",  "if-lt",  "if-ge",  "if-gt",  "if-le",
    "if-eqz", "if-nez", "if-ltz", "if-gez", "if-gtz", "if-lez",
    "goto",
];

/// A single directive, instruction, or label.
#[derive(Clone, Debug)]
pub struct Token {
    pub(crate) index: Option<usize>,
    pub(crate) source_line: usize,
    pub(crate) fields: Vec<String>,
    pub ty: TokenType,
}

#[derive(Clone, Debug)]
pub enum TokenType {
    Meta(Meta),
    Op(Op),
    Label(Label),
}

/// A directive such as `.method`, `.end` or `.registers`.
#[derive(Clone, Debug)]
pub struct Meta {
    pub(crate) kind: Kind,
}

/// An instruction such as `move/from16 v0, v18`.
#[derive(Clone, Debug)]
pub struct Op {
    pub(crate) kind: Kind,
    pub(crate) size: Option<String>,
    pub(crate) jump_target: Option<usize>,
}

/// A jump target such as `:cond_0`.
#[derive(Clone, Debug)]
pub struct Label {
    pub(crate) name: String,
    pub(crate) referencing_branches: BTreeSet<usize>,
}

impl Meta {
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }
}

impl Op {
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// The part of the mnemonic after `/`, e.g. `from16` in `move/from16`.
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn is_branch(&self) -> bool {
        BRANCHES.contains(&self.name())
    }

    /// Stream index of the label this branch jumps to. Set by analysis.
    pub fn jump_target(&self) -> Option<usize> {
        self.jump_target
    }
}

impl Label {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stream indices of the branches that jump here. Set by analysis.
    pub fn referencing_branches(&self) -> &BTreeSet<usize> {
        &self.referencing_branches
    }

    pub(crate) fn add_branch(&mut self, op_index: usize) {
        self.referencing_branches.insert(op_index);
    }
}

impl Token {
    /// Builds the token for a classified line, interning its name in `registry`.
    pub fn from_line(line: &Line, registry: &TypeRegistry) -> Result<Token, Error> {
        let (fields, ty) = match line.ty {
            LineType::Meta => build_meta(line, registry)?,
            LineType::Op => build_op(line, registry),
            LineType::Label => build_label(line),
        };
        Ok(Token {
            index: None,
            source_line: line.number,
            fields,
            ty,
        })
    }

    /// Position in the analyzed stream; `None` before analysis.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// 1-based line in the source text this token came from.
    pub fn source_line(&self) -> usize {
        self.source_line
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The token's fields joined back together with single spaces.
    pub fn line(&self) -> String {
        self.fields.iter().join(" ")
    }

    pub fn as_meta(&self) -> Option<&Meta> {
        match &self.ty {
            TokenType::Meta(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn as_op(&self) -> Option<&Op> {
        match &self.ty {
            TokenType::Op(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&Label> {
        match &self.ty {
            TokenType::Label(label) => Some(label),
            _ => None,
        }
    }

    pub(crate) fn as_op_mut(&mut self) -> Option<&mut Op> {
        match &mut self.ty {
            TokenType::Op(op) => Some(op),
            _ => None,
        }
    }

    pub(crate) fn as_label_mut(&mut self) -> Option<&mut Label> {
        match &mut self.ty {
            TokenType::Label(label) => Some(label),
            _ => None,
        }
    }

    pub fn is_branch(&self) -> bool {
        self.as_op().map_or(false, Op::is_branch)
    }

    /// `true` for a `.<name>` directive.
    pub fn is_meta_named(&self, name: &str) -> bool {
        self.as_meta().map_or(false, |meta| meta.name() == name)
    }

    /// One-character shape of the token: `B`ranch, `O`p, `M`eta or `L`abel.
    pub fn signature_char(&self) -> char {
        match &self.ty {
            TokenType::Op(op) if op.is_branch() => 'B',
            TokenType::Op(_) => 'O',
            TokenType::Meta(_) => 'M',
            TokenType::Label(_) => 'L',
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}: ", index)?,
            None => write!(f, "?: ")?,
        }
        match &self.ty {
            TokenType::Meta(meta) => write!(f, "Meta {}", meta.name()),
            TokenType::Op(op) => {
                write!(f, "Op {}", op.name())?;
                if let Some(size) = op.size() {
                    write!(f, ", size {}", size)?;
                }
                Ok(())
            }
            TokenType::Label(label) => write!(f, "Label '{}'", label.name()),
        }
    }
}

fn split_fields(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(str::to_string)
        .collect()
}

fn build_meta(line: &Line, registry: &TypeRegistry) -> Result<(Vec<String>, TokenType), Error> {
    let fields = split_fields(&line.text[1..]);
    let name = fields.first().ok_or_else(|| Error::Lex {
        line: line.number,
        text: line.text.to_string(),
        reason: LexError::MissingDirectiveName,
    })?;
    let kind = registry.intern(Category::Meta, name);
    Ok((fields, TokenType::Meta(Meta { kind })))
}

fn build_op(line: &Line, registry: &TypeRegistry) -> (Vec<String>, TokenType) {
    let fields = split_fields(line.text);
    // Classified lines are never blank, so there is always a mnemonic.
    let mnemonic = fields[0].as_str();
    let (name, size) = match mnemonic.split_once('/') {
        Some((name, size)) => (name, Some(size.to_string())),
        None => (mnemonic, None),
    };
    let kind = registry.intern(Category::Op, name);
    let op = Op { kind, size, jump_target: None };
    (fields, TokenType::Op(op))
}

/// The name is everything after the `:`, and may be empty.
fn build_label(line: &Line) -> (Vec<String>, TokenType) {
    let label = Label {
        name: line.text[1..].to_string(),
        referencing_branches: BTreeSet::new(),
    };
    (vec![line.text.to_string()], TokenType::Label(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn token(text: &str, registry: &TypeRegistry) -> Result<Token, Error> {
        let line = Line { number: 1, text, ty: LineType::classify(text) };
        Token::from_line(&line, registry)
    }

    #[test]
    fn meta() {
        let registry = TypeRegistry::new();
        let token = token(".method public static main([Ljava/lang/String;)V", &registry).unwrap();
        let meta = token.as_meta().unwrap();
        assert_eq!(meta.name(), "method");
        assert_eq!(meta.kind().category(), Category::Meta);
        assert_eq!(token.fields(), &["method", "public", "static", "main([Ljava/lang/String;)V"]);
        assert_eq!(token.signature_char(), 'M');
        assert!(token.is_meta_named("method"));
    }

    #[test]
    fn meta_with_space_after_dot() {
        let registry = TypeRegistry::new();
        let token = token(".   end   method", &registry).unwrap();
        assert_eq!(token.as_meta().unwrap().name(), "end");
        assert_eq!(token.line(), "end method");
    }

    #[test]
    fn bare_dot_is_a_lex_error() {
        let registry = TypeRegistry::new();
        let error = token(".", &registry).unwrap_err();
        assert_eq!(error, Error::Lex { line: 1, text: ".".to_string(), reason: LexError::MissingDirectiveName });
    }

    #[test]
    fn op_with_size() {
        let registry = TypeRegistry::new();
        let token = token("move/from16   v0,  v18", &registry).unwrap();
        let op = token.as_op().unwrap();
        assert_eq!(op.name(), "move");
        assert_eq!(op.size(), Some("from16"));
        assert!(!op.is_branch());
        assert_eq!(token.fields(), &["move/from16", "v0,", "v18"]);
        assert_eq!(token.line(), "move/from16 v0, v18");
        assert_eq!(token.signature_char(), 'O');
    }

    #[test]
    fn size_splits_once() {
        let registry = TypeRegistry::new();
        let token = token("const/high16/x v0, 0x7f", &registry).unwrap();
        let op = token.as_op().unwrap();
        assert_eq!(op.name(), "const");
        assert_eq!(op.size(), Some("high16/x"));
    }

    #[test]
    fn branches() {
        let registry = TypeRegistry::new();
        for mnemonic in BRANCHES.iter() {
            let token = token(&format!("{} v0, :cond_0", mnemonic), &registry).unwrap();
            assert!(token.is_branch(), "{} should branch", mnemonic);
            assert_eq!(token.signature_char(), 'B');
        }
        let goto16 = token("goto/16 :goto_3", &registry).unwrap();
        assert!(goto16.is_branch());
        assert!(!token("if-eqq v0, :cond_0", &registry).unwrap().is_branch());
        assert!(!token("invoke-virtual {p0}, LFoo;->goto()V", &registry).unwrap().is_branch());
    }

    #[test]
    fn label() {
        let registry = TypeRegistry::new();
        let token = token(":cond_0", &registry).unwrap();
        let label = token.as_label().unwrap();
        assert_eq!(label.name(), "cond_0");
        assert!(label.referencing_branches().is_empty());
        assert_eq!(token.fields(), &[":cond_0"]);
        assert_eq!(token.line(), ":cond_0");
        assert_eq!(token.signature_char(), 'L');
        assert!(registry.is_empty());
    }

    #[test]
    fn bare_colon_is_an_unnamed_label() {
        let registry = TypeRegistry::new();
        let token = token(":", &registry).unwrap();
        assert_eq!(token.as_label().unwrap().name(), "");
        assert_eq!(token.fields(), &[":"]);
        assert_eq!(token.signature_char(), 'L');
    }

    #[test]
    fn interning_is_shared_between_tokens() {
        let registry = TypeRegistry::new();
        let first = token("move v0, v1", &registry).unwrap();
        let second = token("move/16 v2, v3", &registry).unwrap();
        assert!(first.as_op().unwrap().kind().is(second.as_op().unwrap().kind()));
    }

    #[test]
    fn display() {
        let registry = TypeRegistry::new();
        let mut op = token("move/from16 v0, v18", &registry).unwrap();
        assert_eq!(op.to_string(), "?: Op move, size from16");
        op.index = Some(3);
        assert_eq!(op.to_string(), "3: Op move, size from16");
        let mut label = token(":cond_0", &registry).unwrap();
        label.index = Some(4);
        assert_eq!(label.to_string(), "4: Label 'cond_0'");
        let mut meta = token(".end method", &registry).unwrap();
        meta.index = Some(5);
        assert_eq!(meta.to_string(), "5: Meta end");
    }
}

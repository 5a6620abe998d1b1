//! Interning of directive and mnemonic names.
//!
//! Every distinct directive name (`method`, `end`, `class`, ...) and every distinct
//! instruction mnemonic (`move`, `goto`, `invoke-virtual`, ...) is given exactly one
//! [`Kind`] per [`TypeRegistry`]. Asking the registry for the same name twice hands
//! back the *same* kind, not merely an equal one:
//!
//! ```
//! # use smali_analyzer::registry::{Category, TypeRegistry};
//! let registry = TypeRegistry::new();
//! let first = registry.intern(Category::Op, "move");
//! let second = registry.intern(Category::Op, "move");
//! assert!(first.is(&second));
//!
//! // Directives and mnemonics live in separate namespaces.
//! let directive = registry.intern(Category::Meta, "move");
//! assert!(!first.is(&directive));
//! ```
//!
//! A registry is internally synchronized, so a single one can be shared
//! between parsers (and threads) behind an [`Arc`].

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use log::trace;

/// The namespace a name is interned in.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Category {
    /// Directive names (the word after a leading `.`).
    Meta,
    /// Instruction mnemonics, without any `/size` qualifier.
    Op,
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Meta => write!(f, "meta"),
            Category::Op   => write!(f, "op"),
        }
    }
}

#[derive(Debug)]
struct KindData {
    category: Category,
    id: usize,
    name: Box<str>,
}

/// An interned directive or mnemonic name.
///
/// Cloning is cheap. Two kinds compare equal only if they came from the same
/// interning, so equality is an identity check rather than a string comparison.
#[derive(Clone, Debug)]
pub struct Kind(Arc<KindData>);

impl Kind {
    fn new(category: Category, id: usize, name: &str) -> Self {
        Kind(Arc::new(KindData { category, id, name: name.into() }))
    }

    pub fn category(&self) -> Category {
        self.0.category
    }

    /// Registry-unique number, assigned in order of first appearance.
    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// `true` if both kinds are the very same interned record.
    pub fn is(&self, other: &Kind) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Kind {}

impl Hash for Kind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Maps `(category, name)` pairs to stable [`Kind`]s.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    metas: DashMap<String, Kind>,
    ops: DashMap<String, Kind>,
    next_id: AtomicUsize,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    fn table(&self, category: Category) -> &DashMap<String, Kind> {
        match category {
            Category::Meta => &self.metas,
            Category::Op   => &self.ops,
        }
    }

    /// Returns the kind for `name` in `category`, creating it on first sight.
    pub fn intern(&self, category: Category, name: &str) -> Kind {
        if let Some(kind) = self.lookup(category, name) {
            return kind;
        }
        let entry = self.table(category).entry(name.to_string())
            .or_insert_with(|| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                trace!("interned new {} kind `{}` as #{}", category, name, id);
                Kind::new(category, id, name)
            });
        entry.value().clone()
    }

    /// Returns the kind for `name` only if it has already been interned.
    pub fn lookup(&self, category: Category, name: &str) -> Option<Kind> {
        self.table(category).get(name)
            .map(|kind| kind.value().clone())
    }

    /// Number of distinct kinds across both namespaces.
    pub fn len(&self) -> usize {
        self.metas.len() + self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every interned name.
    ///
    /// Kinds handed out before the reset stay valid, and ids keep counting up,
    /// so a name interned again afterwards is never confused with its old kind.
    pub fn clear(&self) {
        self.metas.clear();
        self.ops.clear();
    }
}

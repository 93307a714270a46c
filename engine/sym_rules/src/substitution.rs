//! Capture bindings and structural substitution.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use sym_ir::{Expr, ExprKind, Head, Name};

/// An insertion-ordered map from capture names to bound subjects.
///
/// Insertion order is observable (it is the order captures first matched,
/// left to right) and round-trips through [`Substitution::iter`].
#[derive(Clone, Debug, Default)]
pub struct Substitution {
    map: IndexMap<Name, Expr>,
}

impl Substitution {
    /// Empty substitution.
    pub fn new() -> Self {
        Substitution {
            map: IndexMap::new(),
        }
    }

    /// Bind `name` to `subject`. Returns the previous binding, if any.
    pub fn bind(&mut self, name: Name, subject: Expr) -> Option<Expr> {
        self.map.insert(name, subject)
    }

    /// Look up a binding.
    pub fn get(&self, name: Name) -> Option<&Expr> {
        self.map.get(&name)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: Name) -> bool {
        self.map.contains_key(&name)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Name, &Expr)> {
        self.map.iter().map(|(name, expr)| (*name, expr))
    }

    /// Instantiate a replacement pattern: every symbol bound here is
    /// replaced by its subject. The result is generally non-canonical.
    pub fn apply(&self, pattern: &Expr) -> Expr {
        substitute(pattern, &|name| self.map.get(&name).cloned())
    }
}

impl<'a> IntoIterator for &'a Substitution {
    type Item = (&'a Name, &'a Expr);
    type IntoIter = indexmap::map::Iter<'a, Name, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

/// Structural substitution over a plain name map (the `subs` operation).
pub fn substitute_symbols(expr: &Expr, map: &FxHashMap<Name, Expr>) -> Expr {
    substitute(expr, &|name| map.get(&name).cloned())
}

fn substitute(expr: &Expr, lookup: &dyn Fn(Name) -> Option<Expr>) -> Expr {
    match expr.kind() {
        ExprKind::Symbol(name) => lookup(*name).unwrap_or_else(|| expr.clone()),
        ExprKind::Function { head, ops } => {
            let new_head = match head {
                Head::Symbol(name) => match lookup(*name) {
                    // A symbol image keeps the head symbolic; anything else
                    // becomes a compound head for later resolution.
                    Some(image) => match image.symbol_name() {
                        Some(symbol) => Head::Symbol(symbol),
                        None => Head::Expr(image),
                    },
                    None => Head::Symbol(*name),
                },
                Head::Expr(e) => Head::Expr(substitute(e, lookup)),
            };
            let new_ops = ops.iter().map(|op| substitute(op, lookup)).collect();
            Expr::apply(new_head, new_ops)
        }
        _ => expr.clone(),
    }
}

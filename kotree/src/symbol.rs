//! Qualified names of symbols.

use alloc::{rc::Rc, string::String};
use core::borrow::Borrow;
use core::fmt;

/// Qualified name of a symbol, such as `nat.plus`.
///
/// The components of a qualified name are separated by dots.
/// Cloning a symbol only increments a reference counter.
/// Contrary to pointer-based symbols, two symbols are equal
/// whenever their names are equal:
///
/// ~~~
/// # use kotree::Symbol;
/// let s1 = Symbol::new("nat.plus");
/// let s2 = Symbol::qualify("nat", "plus");
/// assert_eq!(s1, s2);
/// assert_eq!(s1.namespace(), "nat");
/// assert_eq!(s1.name(), "plus");
/// assert_eq!(Symbol::new("plus").namespace(), "");
/// ~~~
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    /// Prefix a name with a namespace, unless the namespace is empty.
    pub fn qualify(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            Self::new(name)
        } else {
            let mut s = String::from(namespace);
            s.push('.');
            s.push_str(name);
            Self::from(s)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace of the symbol, i.e. everything before the last dot.
    pub fn namespace(&self) -> &str {
        self.0.rsplit_once('.').map_or("", |(ns, _)| ns)
    }

    /// Unqualified name of the symbol.
    pub fn name(&self) -> &str {
        self.0.rsplit_once('.').map_or(&self.0, |(_, name)| name)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(Rc::from(s))
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

//! Typing contexts for bound variables.

use crate::term::{DeBruijn, Name, Term};
use alloc::{rc::Rc, vec::Vec};
use core::fmt;

/// Immutable list of bound variables with their optional types.
///
/// The variable `#0` is the one that was bound last.
/// Extending a context does not change it, but returns a new context
/// that shares all previous bindings.
#[derive(Clone, Debug, Default)]
pub struct Ctx(Option<Rc<Node>>);

#[derive(Debug)]
struct Node {
    name: Option<Name>,
    ty: Option<Term>,
    len: usize,
    tail: Ctx,
}

impl Ctx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a new variable `#0`, shifting all previous ones by one.
    pub fn bind(&self, name: Option<Name>, ty: Option<Term>) -> Self {
        let len = self.len() + 1;
        let tail = self.clone();
        Self(Some(Rc::new(Node { name, ty, len, tail })))
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |node| node.len)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    fn get(&self, n: DeBruijn) -> Option<&Node> {
        self.nodes().nth(n)
    }

    /// Return the type of the variable `#n`, valid in this context.
    ///
    /// ~~~
    /// # use kotree::{Ctx, Term};
    /// let ctx = Ctx::new()
    ///     .bind(Some("A".into()), Some(Term::Type))
    ///     .bind(Some("x".into()), Some(Term::bvar(0)));
    /// assert_eq!(ctx.get_type(0), Some(Term::bvar(1)));
    /// assert_eq!(ctx.get_type(1), Some(Term::Type));
    /// assert_eq!(ctx.get_type(2), None);
    /// ~~~
    pub fn get_type(&self, n: DeBruijn) -> Option<Term> {
        let ty = self.get(n)?.ty.clone()?;
        Some(ty << (n + 1))
    }

    pub fn get_name(&self, n: DeBruijn) -> Option<&Name> {
        self.get(n)?.name.as_ref()
    }

    fn nodes(&self) -> impl Iterator<Item = &Node> {
        let mut ctx = self;
        core::iter::from_fn(move || {
            let node = ctx.0.as_deref()?;
            ctx = &node.tail;
            Some(node)
        })
    }

    /// Iterate over the bindings, starting from the last bound variable.
    ///
    /// The types are returned as stored, i.e. without shifting.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&Name>, Option<&Term>)> {
        self.nodes().map(|n| (n.name.as_ref(), n.ty.as_ref()))
    }
}

impl fmt::Display for Ctx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[CONTEXT]")?;
        let bindings: Vec<_> = self.iter().collect();
        for (name, ty) in bindings.into_iter().rev() {
            match name {
                Some(name) => write!(f, "{}", name)?,
                None => write!(f, "*")?,
            }
            match ty {
                Some(ty) => writeln!(f, " : {}", ty)?,
                None => writeln!(f, " : ?")?,
            }
        }
        Ok(())
    }
}

#[test]
fn display() {
    use alloc::string::ToString;
    let ctx = Ctx::new()
        .bind(Some("A".into()), Some(Term::Type))
        .bind(None, None);
    assert_eq!(ctx.len(), 2);
    assert_eq!(ctx.get_name(0), None);
    assert_eq!(ctx.get_name(1).map(|n| &**n), Some("A"));
    assert_eq!(ctx.to_string(), "[CONTEXT]\nA : Type\n* : ?\n");
}

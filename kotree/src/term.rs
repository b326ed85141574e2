//! Terms for the lambda-Pi calculus.

use crate::{Miller, Symbol};
use alloc::{rc::Rc, vec::Vec};
use core::fmt::{self, Display};

/// De Bruijn variable.
pub type DeBruijn = usize;

/// Name of a bound variable, used only for printing.
pub type Name = Rc<str>;

/// Term for the lambda-Pi calculus.
///
/// Terms are immutable and share their subterms.
/// Equality of terms is syntactic equality modulo the names of bound variables.
#[derive(Clone, Debug)]
pub enum Term {
    Kind,
    Type,
    Symb(Symbol),
    /// bound variable, optionally carrying the name it was written with
    BVar(DeBruijn, Option<Name>),
    /// anonymous meta-variable, or a term to be inferred
    Joker,
    Comb(Rc<Comb>),
}

/// Combinator term.
#[derive(Clone, Debug)]
pub enum Comb {
    Appl(Term, Term),
    Prod(Option<Name>, Term, Term),
    Abst(Name, Option<Term>, Term),
    MVar(Option<Miller>, Vec<Term>),
}

impl From<Comb> for Term {
    fn from(c: Comb) -> Self {
        Self::Comb(Rc::new(c))
    }
}

impl Term {
    pub fn symb(s: impl Into<Symbol>) -> Self {
        Self::Symb(s.into())
    }

    pub fn bvar(x: DeBruijn) -> Self {
        Self::BVar(x, None)
    }

    pub fn appl(f: Self, a: Self) -> Self {
        Comb::Appl(f, a).into()
    }

    pub fn prod(id: Option<&str>, ty: Self, tm: Self) -> Self {
        Comb::Prod(id.map(Name::from), ty, tm).into()
    }

    /// Non-dependent product `ty -> tm`, where `tm` does not see the bound variable.
    pub fn arrow(ty: Self, tm: Self) -> Self {
        Self::prod(None, ty, tm << 1)
    }

    pub fn abst(id: &str, ty: Option<Self>, tm: Self) -> Self {
        Comb::Abst(id.into(), ty, tm).into()
    }

    pub fn mvar(m: Option<Miller>, args: Vec<Self>) -> Self {
        Comb::MVar(m, args).into()
    }

    /// Meta-variable with a user-given name.
    pub fn meta(name: &str, args: Vec<Self>) -> Self {
        Self::mvar(Some(Miller::from(name)), args)
    }

    /// Apply some terms to the term, from left to right.
    ///
    /// ~~~
    /// # use kotree::Term;
    /// let f = Term::symb("f");
    /// let (a, b) = (Term::symb("a"), Term::symb("b"));
    /// let app = f.clone().apply([a.clone(), b.clone()]);
    /// assert_eq!(app, Term::appl(Term::appl(f, a), b));
    /// ~~~
    pub fn apply(self, args: impl IntoIterator<Item = Self>) -> Self {
        args.into_iter().fold(self, Self::appl)
    }

    /// Decompose an application into its head and its arguments.
    ///
    /// The arguments are returned in *reverse* order,
    /// meaning that the last applied argument comes first:
    ///
    /// ~~~
    /// # use kotree::Term;
    /// let (f, a, b) = (Term::symb("f"), Term::symb("a"), Term::symb("b"));
    /// let (head, args) = f.clone().apply([a.clone(), b.clone()]).get_head();
    /// assert_eq!(head, f);
    /// assert_eq!(args, vec![b, a]);
    /// ~~~
    pub fn get_head(&self) -> (Self, Vec<Self>) {
        let mut args = Vec::new();
        let mut tm = self;
        while let Some(Comb::Appl(f, a)) = tm.get_comb() {
            args.push(a.clone());
            tm = f;
        }
        (tm.clone(), args)
    }

    pub fn get_comb(&self) -> Option<&Comb> {
        match self {
            Self::Comb(c) => Some(c),
            _ => None,
        }
    }

    pub fn get_prod(&self) -> Option<(&Option<Name>, &Self, &Self)> {
        match self.get_comb()? {
            Comb::Prod(id, ty, tm) => Some((id, ty, tm)),
            _ => None,
        }
    }

    /// Return the parts of an abstraction.
    ///
    /// An abstraction annotated with a joker counts as unannotated.
    pub fn get_abst(&self) -> Option<(&Name, Option<&Self>, &Self)> {
        match self.get_comb()? {
            Comb::Abst(id, ty, tm) => {
                let ty = ty.as_ref().filter(|ty| !matches!(ty, Self::Joker));
                Some((id, ty, tm))
            }
            _ => None,
        }
    }

    /// Return true for meta-variables and jokers.
    pub fn is_meta(&self) -> bool {
        matches!(self, Self::Joker) || matches!(self.get_comb(), Some(Comb::MVar(..)))
    }

    /// Compare the memory addresses of two terms.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Kind, Self::Kind) | (Self::Type, Self::Type) => true,
            (Self::Symb(s1), Self::Symb(s2)) => s1 == s2,
            (Self::BVar(x1, _), Self::BVar(x2, _)) => x1 == x2,
            (Self::Comb(c1), Self::Comb(c2)) => Rc::ptr_eq(c1, c2),
            _ => false,
        }
    }

    /// Return true if all variables are bound,
    /// assuming `depth` variables bound outside the term.
    pub fn is_closed_under(&self, depth: usize) -> bool {
        match self {
            Self::BVar(x, _) => *x < depth,
            Self::Comb(c) => match &**c {
                Comb::Appl(f, a) => f.is_closed_under(depth) && a.is_closed_under(depth),
                Comb::Prod(_, ty, tm) => ty.is_closed_under(depth) && tm.is_closed_under(depth + 1),
                Comb::Abst(_, ty, tm) => {
                    ty.iter().all(|ty| ty.is_closed_under(depth)) && tm.is_closed_under(depth + 1)
                }
                Comb::MVar(_, args) => args.iter().all(|a| a.is_closed_under(depth)),
            },
            Self::Kind | Self::Type | Self::Symb(_) | Self::Joker => true,
        }
    }

    /// Return true if the term contains no free variables.
    ///
    /// ~~~
    /// # use kotree::Term;
    /// assert!(Term::abst("x", None, Term::bvar(0)).is_closed());
    /// assert!(!Term::abst("x", None, Term::bvar(1)).is_closed());
    /// ~~~
    pub fn is_closed(&self) -> bool {
        self.is_closed_under(0)
    }

    /// Call a function on every meta-variable in the term.
    pub fn for_each_mvar<'a>(&'a self, f: &mut impl FnMut(&'a Option<Miller>, &'a [Self])) {
        if let Self::Comb(c) = self {
            match &**c {
                Comb::Appl(tm, arg) => {
                    tm.for_each_mvar(f);
                    arg.for_each_mvar(f)
                }
                Comb::Prod(_, ty, tm) => {
                    ty.for_each_mvar(f);
                    tm.for_each_mvar(f)
                }
                Comb::Abst(_, ty, tm) => {
                    ty.iter().for_each(|ty| ty.for_each_mvar(f));
                    tm.for_each_mvar(f)
                }
                Comb::MVar(m, args) => {
                    f(m, args);
                    args.iter().for_each(|a| a.for_each_mvar(f))
                }
            }
        }
    }

    /// Format the term, wrapping it in parentheses unless it is atomic.
    fn fmt_wp(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Comb(c) if !matches!(&**c, Comb::MVar(..)) => write!(f, "({})", self),
            _ => self.fmt(f),
        }
    }
}

impl core::ops::Shl<usize> for Term {
    type Output = Self;

    /// Shift all free variables of the term by the given amount.
    fn shl(self, rhs: usize) -> Self::Output {
        if rhs == 0 {
            self
        } else {
            self.shift(rhs, 0)
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Kind => write!(f, "Kind"),
            Self::Type => write!(f, "Type"),
            Self::Symb(s) => s.fmt(f),
            Self::BVar(_, Some(name)) => name.fmt(f),
            Self::BVar(x, None) => write!(f, "#{}", x),
            Self::Joker => write!(f, "*"),
            Self::Comb(c) => c.fmt(f),
        }
    }
}

impl Display for Comb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Appl(..) => {
                let (head, args) = Term::from(self.clone()).get_head();
                head.fmt_wp(f)?;
                args.iter().rev().try_for_each(|a| {
                    write!(f, " ")?;
                    a.fmt_wp(f)
                })
            }
            Self::Prod(Some(id), ty, tm) => write!(f, "({} : {}) -> {}", id, ty, tm),
            Self::Prod(None, ty, tm) => {
                ty.fmt_wp(f)?;
                write!(f, " -> {}", tm)
            }
            Self::Abst(id, None, tm) => write!(f, "{} => {}", id, tm),
            Self::Abst(id, Some(ty), tm) => write!(f, "({} : {}) => {}", id, ty, tm),
            Self::MVar(m, args) => {
                match m {
                    Some(m) => m.fmt(f)?,
                    None => write!(f, "_")?,
                }
                write!(f, "[")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    a.fmt(f)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[test]
fn display() {
    use alloc::string::ToString;
    let nat = Term::symb("nat");
    let succ = Term::symb("succ");
    let id = Term::abst("x", Some(nat.clone()), Term::BVar(0, Some("x".into())));
    assert_eq!(id.to_string(), "(x : nat) => x");
    assert_eq!(Term::arrow(nat.clone(), nat.clone()).to_string(), "nat -> nat");
    let app = succ.clone().apply([succ.apply([Term::symb("zero")])]);
    assert_eq!(app.to_string(), "succ (succ zero)");
    let m = Term::meta("F", Vec::from([Term::bvar(0)]));
    assert_eq!(m.to_string(), "F[#0]");
}

//! Rewrite rules.

use crate::term::{Comb, Term};
use crate::{Miller, Symbol};
use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt::{self, Display};

/// Rewrite rule `lhs --> rhs`, where the head of `lhs` is a symbol.
#[derive(Clone, Debug)]
pub struct Rule {
    pub name: String,
    /// head symbol of the left-hand side
    pub head: Symbol,
    /// arguments of the left-hand side, the last argument coming first
    pub stack: Vec<Term>,
    pub lhs: Term,
    pub rhs: Term,
}

/// Structural errors of rewrite rules.
#[derive(Clone, Debug)]
pub enum Error {
    /// the head of the left-hand side is not a symbol
    NotSymbolHeaded(Term),
    /// one side of the rule contains a free variable
    Open(Term),
    /// the right-hand side contains a meta-variable not bound in the left-hand side
    Unbound(Term),
    /// a meta-variable is used with different numbers of arguments
    ArityMismatch(Miller, usize, usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotSymbolHeaded(tm) => {
                write!(f, "Left-hand side head is not a symbol: {}", tm)
            }
            Self::Open(tm) => write!(f, "Rule side is not closed: {}", tm),
            Self::Unbound(tm) => {
                write!(f, "Meta-variable not bound by the left-hand side: {}", tm)
            }
            Self::ArityMismatch(m, expected, actual) => write!(
                f,
                "Meta-variable {} expects {} arguments, but is used with {}",
                m, expected, actual
            ),
        }
    }
}

/// Map every named meta-variable of a term to its number of arguments.
fn arities(tm: &Term, map: &mut BTreeMap<Miller, usize>) -> Result<(), Error> {
    let mut result = Ok(());
    tm.for_each_mvar(&mut |m, args| {
        let m = match m {
            Some(m) if result.is_ok() => m,
            _ => return,
        };
        match map.get(m) {
            Some(n) if *n != args.len() => {
                result = Err(Error::ArityMismatch(m.clone(), *n, args.len()))
            }
            Some(_) => (),
            None => {
                map.insert(m.clone(), args.len());
            }
        }
    });
    result
}

impl Rule {
    /// Construct a rule, verifying that
    /// the left-hand side is headed by a symbol,
    /// both sides are closed, and
    /// all meta-variables of the right-hand side are bound by the left-hand side
    /// with the same number of arguments.
    ///
    /// ~~~
    /// # use kotree::{Rule, Term};
    /// let lhs = Term::symb("f").apply([Term::meta("X", Vec::new())]);
    /// let rule = Rule::new("f_id".into(), lhs, Term::meta("X", Vec::new()))?;
    /// assert_eq!(rule.head.as_str(), "f");
    /// assert_eq!(rule.stack.len(), 1);
    ///
    /// let rhs = Term::meta("Y", Vec::new());
    /// assert!(Rule::new("f_y".into(), rule.lhs.clone(), rhs).is_err());
    /// # Ok::<_, kotree::rule::Error>(())
    /// ~~~
    pub fn new(name: String, lhs: Term, rhs: Term) -> Result<Self, Error> {
        let (head, stack) = lhs.get_head();
        let head = match head {
            Term::Symb(s) => s,
            _ => return Err(Error::NotSymbolHeaded(lhs)),
        };
        for side in [&lhs, &rhs] {
            if !side.is_closed() {
                return Err(Error::Open(side.clone()));
            }
        }

        let mut lhs_arities = BTreeMap::new();
        arities(&lhs, &mut lhs_arities)?;
        let mut unbound = None;
        let rhs_check = |tm: &Term| match tm.get_comb() {
            Some(Comb::MVar(Some(m), args)) => match lhs_arities.get(m) {
                Some(n) if *n != args.len() => Err(Error::ArityMismatch(m.clone(), *n, args.len())),
                Some(_) => Ok(()),
                None => Err(Error::Unbound(tm.clone())),
            },
            Some(Comb::MVar(None, _)) => Err(Error::Unbound(tm.clone())),
            _ if matches!(tm, Term::Joker) => Err(Error::Unbound(tm.clone())),
            _ => Ok(()),
        };
        for_each_subterm(&rhs, &mut |tm| {
            if unbound.is_none() {
                unbound = rhs_check(tm).err();
            }
        });
        match unbound {
            Some(e) => Err(e),
            None => Ok(Self {
                name,
                head,
                stack,
                lhs,
                rhs,
            }),
        }
    }

    /// Rule `s --> tm` that unfolds the definition of a symbol.
    pub fn definition(name: String, head: Symbol, tm: Term) -> Self {
        Self {
            name,
            head: head.clone(),
            stack: Vec::new(),
            lhs: Term::Symb(head),
            rhs: tm,
        }
    }
}

fn for_each_subterm(tm: &Term, f: &mut impl FnMut(&Term)) {
    f(tm);
    if let Some(c) = tm.get_comb() {
        match c {
            Comb::Appl(t1, t2) | Comb::Prod(_, t1, t2) => {
                for_each_subterm(t1, f);
                for_each_subterm(t2, f)
            }
            Comb::Abst(_, ty, t) => {
                ty.iter().for_each(|ty| for_each_subterm(ty, f));
                for_each_subterm(t, f)
            }
            Comb::MVar(_, args) => args.iter().for_each(|a| for_each_subterm(a, f)),
        }
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} --> {}", self.name, self.lhs, self.rhs)
    }
}

#[test]
fn ill_formed() {
    let x = || Term::meta("X", Vec::new());
    let f = || Term::symb("f");
    let lhs = f().apply([x()]);

    let bvar_head = Term::bvar(0).apply([x()]);
    let err = Rule::new("r".into(), bvar_head, x());
    assert!(matches!(err, Err(Error::NotSymbolHeaded(_))));

    let err = Rule::new("r".into(), lhs.clone(), Term::bvar(0));
    assert!(matches!(err, Err(Error::Open(_))));

    let err = Rule::new("r".into(), lhs.clone(), Term::Joker);
    assert!(matches!(err, Err(Error::Unbound(_))));

    let rhs = Term::meta("X", Vec::from([Term::symb("a")]));
    let err = Rule::new("r".into(), lhs, rhs);
    assert!(matches!(err, Err(Error::ArityMismatch(..))));

    let lhs = f().apply([x(), Term::abst("y", None, Term::meta("X", Vec::from([Term::bvar(0)])))]);
    let err = Rule::new("r".into(), lhs, Term::Type);
    assert!(matches!(err, Err(Error::ArityMismatch(..))));
}

//! Meta-variables of rewrite patterns.

use crate::term::{DeBruijn, Name, Term};
use alloc::{vec, vec::Vec};
use core::fmt::{self, Display};

/// Name of a meta-variable.
///
/// This refers to the variables appearing in a rewrite pattern.
/// A meta-variable may be applied to a list of distinct variables
/// bound inside the pattern, which is a restricted form of
/// higher-order pattern in the sense of Miller.
/// User-written meta-variables are named by a string,
/// whereas anonymous ones ("jokers") receive a fresh number at scoping.
///
/// Reference:
/// Dale Miller:
/// A Logic Programming Language with Lambda-Abstraction,
/// Function Variables, and Simple Unification.
/// J. Log. Comput. 1(4): 497-536 (1991).
/// doi: [10.1093/logcom/1.4.497](https://doi.org/10.1093/logcom/1.4.497)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Miller {
    Named(Name),
    Fresh(usize),
}

impl From<&str> for Miller {
    fn from(s: &str) -> Self {
        Self::Named(s.into())
    }
}

impl Display for Miller {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Named(name) => name.fmt(f),
            Self::Fresh(n) => write!(f, "*{}", n),
        }
    }
}

/// Reasons why the arguments of a meta-variable do not form a Miller pattern.
#[derive(Clone, Debug)]
pub enum Error {
    /// argument is not a variable bound inside the pattern
    NonLocal(Term),
    /// argument occurs more than once
    Repeated(Term),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NonLocal(tm) => write!(f, "Expected a locally bound variable, got: {}", tm),
            Self::Repeated(tm) => write!(f, "Expected distinct variables, got {} twice", tm),
        }
    }
}

/// For every variable bound inside a pattern at `depth`,
/// return the position at which it occurs in the meta-variable arguments.
///
/// The arguments must be distinct variables smaller than `depth`.
///
/// ~~~
/// # use kotree::{pattern::locals, Term};
/// let args = [Term::bvar(2), Term::bvar(0)];
/// assert_eq!(locals(&args, 3).unwrap(), vec![Some(1), None, Some(0)]);
/// assert!(locals(&args, 2).is_err());
/// assert!(locals(&[Term::bvar(0), Term::bvar(0)], 1).is_err());
/// ~~~
pub fn locals(args: &[Term], depth: usize) -> Result<Vec<Option<usize>>, Error> {
    let mut res = vec![None; depth];
    for (i, arg) in args.iter().enumerate() {
        let x: DeBruijn = match arg {
            Term::BVar(x, _) if *x < depth => *x,
            _ => return Err(Error::NonLocal(arg.clone())),
        };
        if res[x].replace(i).is_some() {
            return Err(Error::Repeated(arg.clone()));
        }
    }
    Ok(res)
}

/// Return true if the arguments are exactly the variables
/// `#0`, ..., `#(depth - 1)` in this order.
pub fn is_identity(args: &[Term], depth: usize) -> bool {
    args.len() == depth
        && args
            .iter()
            .enumerate()
            .all(|(i, arg)| matches!(arg, Term::BVar(x, _) if *x == i))
}

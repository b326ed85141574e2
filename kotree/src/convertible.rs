//! Convertibility checking.

use crate::equal::Pair;
use crate::term::Term;
use crate::GCtx;
use alloc::vec::Vec;

/// If both terms are applications of the same injective symbol
/// to the same number of arguments, compare their arguments.
fn injective_step(tm1: &Term, tm2: &Term, depth: usize, cns: &mut Vec<Pair>, gc: &GCtx) -> bool {
    let (head1, args1) = tm1.get_head();
    let (head2, args2) = tm2.get_head();
    match (&head1, &head2) {
        (Term::Symb(s1), Term::Symb(s2))
            if s1 == s2 && args1.len() == args2.len() && gc.is_injective(s1.as_str()) =>
        {
            let args = args1.into_iter().zip(args2);
            cns.extend(args.map(|(a1, a2)| (a1, a2, depth)));
            true
        }
        _ => false,
    }
}

/// If exactly one side of the constraint is an abstraction `x => t`,
/// compare `t` with the other side applied to `x`.
fn eta_step(tm1: &Term, tm2: &Term, depth: usize, cns: &mut Vec<Pair>) -> bool {
    let (t, u) = match (tm1.get_abst(), tm2.get_abst()) {
        (Some((_, _, t)), None) => (t, tm2),
        (None, Some((_, _, t))) => (t, tm1),
        _ => return false,
    };
    let app = Term::appl(u.clone() << 1, Term::bvar(0));
    cns.push((t.clone(), app, depth + 1));
    true
}

impl Term {
    /// Return true if the given terms have a common redex.
    ///
    /// ~~~
    /// # use kotree::{GCtx, Term};
    /// let gc = GCtx::new();
    /// let id = Term::abst("x", None, Term::bvar(0));
    /// let a = Term::symb("a");
    /// assert!(Term::convertible(id.apply([a.clone()]), a.clone(), &gc));
    /// assert!(!Term::convertible(a, Term::symb("b"), &gc));
    /// ~~~
    pub fn convertible(tm1: Self, tm2: Self, gc: &GCtx) -> bool {
        let mut cns = Vec::from([(tm1, tm2, 0)]);
        while let Some((cn1, cn2, depth)) = cns.pop() {
            trace!("convertible: {} ~? {}", cn1, cn2);
            if cn1.ptr_eq(&cn2) || cn1 == cn2 || injective_step(&cn1, &cn2, depth, &mut cns, gc) {
                continue;
            }
            let (cn1, cn2) = (cn1.whnf(gc), cn2.whnf(gc));
            if !cn1.same_head_with_depth(&cn2, depth, &mut cns)
                && !(gc.eta && eta_step(&cn1, &cn2, depth, &mut cns))
            {
                return false;
            }
        }
        true
    }
}

#[test]
fn eta() {
    let mut gc = GCtx::new();
    let f = Term::symb("f");
    let lam = Term::abst("x", None, f.clone().apply([Term::bvar(0)]));
    assert!(!Term::convertible(lam.clone(), f.clone(), &gc));
    gc.eta = true;
    assert!(Term::convertible(lam.clone(), f.clone(), &gc));
    assert!(Term::convertible(f, lam, &gc));
}

#[test]
fn reflexive() {
    let (f, a) = (Term::symb("f"), Term::symb("a"));
    let id = Term::abst("x", Some(Term::Type), Term::bvar(0));
    let samples = || {
        Vec::from([
            Term::Type,
            Term::Kind,
            f.clone().apply([a.clone(), Term::abst("x", None, Term::bvar(0))]),
            id.clone().apply([a.clone()]),
            Term::prod(Some("x"), Term::Type, f.clone().apply([Term::bvar(0)])),
            Term::abst("y", Some(Term::Joker), id.clone().apply([Term::bvar(0)])),
        ])
    };
    let mut gc = GCtx::new();
    for eta in [false, true] {
        gc.eta = eta;
        for (t1, t2) in samples().into_iter().zip(samples()) {
            assert!(Term::convertible(t1.clone(), t1.clone(), &gc));
            assert!(Term::convertible(t1, t2, &gc));
        }
    }
}

//! Substitution and shifting for terms.

use crate::term::{Comb, DeBruijn, Name, Term};
use alloc::vec::Vec;

impl Comb {
    /// Apply a substitution to the immediate subterms of a combinator.
    ///
    /// Return `None` if no subterm was changed.
    fn apply_subst<S>(&self, subst: &mut S, k: usize) -> Option<Self>
    where
        S: FnMut(DeBruijn, usize, &Option<Name>) -> Term,
    {
        match self {
            Self::Appl(f, a) => {
                let f2 = f.clone().apply_subst(subst, k);
                let a2 = a.clone().apply_subst(subst, k);
                (!f.ptr_eq(&f2) || !a.ptr_eq(&a2)).then(|| Self::Appl(f2, a2))
            }
            Self::Prod(id, ty, tm) => {
                let ty2 = ty.clone().apply_subst(subst, k);
                let tm2 = tm.clone().apply_subst(subst, k + 1);
                (!ty.ptr_eq(&ty2) || !tm.ptr_eq(&tm2)).then(|| Self::Prod(id.clone(), ty2, tm2))
            }
            Self::Abst(id, ty, tm) => {
                let ty2 = ty.clone().map(|ty| ty.apply_subst(subst, k));
                let tm2 = tm.clone().apply_subst(subst, k + 1);
                let ty_same = match (ty, &ty2) {
                    (Some(ty), Some(ty2)) => ty.ptr_eq(ty2),
                    _ => true,
                };
                (!ty_same || !tm.ptr_eq(&tm2)).then(|| Self::Abst(id.clone(), ty2, tm2))
            }
            Self::MVar(m, args) => {
                let args2: Vec<_> = args.iter().map(|a| a.clone().apply_subst(subst, k)).collect();
                let same = args.iter().zip(&args2).all(|(a, a2)| a.ptr_eq(a2));
                (!same).then(|| Self::MVar(m.clone(), args2))
            }
        }
    }
}

impl Term {
    /// Replace every variable `n` with `n >= k` by `subst(n, k, name)`,
    /// where `k` is incremented whenever a binder is entered.
    ///
    /// Subterms that are not changed by the substitution remain shared.
    pub fn apply_subst<S>(self, subst: &mut S, k: usize) -> Self
    where
        S: FnMut(DeBruijn, usize, &Option<Name>) -> Term,
    {
        let comb = match &self {
            Self::BVar(n, name) if *n >= k => return subst(*n, k, name),
            Self::Comb(c) => c.apply_subst(subst, k),
            _ => None,
        };
        comb.map_or(self, Self::from)
    }

    /// Add `inc` to all variables greater or equal to `depth`.
    ///
    /// ~~~
    /// # use kotree::Term;
    /// let tm = Term::abst("x", None, Term::bvar(0).apply([Term::bvar(1)]));
    /// let expected = Term::abst("x", None, Term::bvar(0).apply([Term::bvar(3)]));
    /// assert_eq!(tm.shift(2, 0), expected);
    /// ~~~
    pub fn shift(self, inc: usize, depth: usize) -> Self {
        if inc == 0 {
            return self;
        }
        self.apply_subst(&mut |n, _, name| Self::BVar(n + inc, name.clone()), depth)
    }

    /// Replace the variable `#0` by `u`, decrementing all other free variables.
    ///
    /// ~~~
    /// # use kotree::Term;
    /// let tm = Term::bvar(0).apply([Term::bvar(1)]);
    /// let u = Term::symb("u");
    /// assert_eq!(tm.subst(&u), u.apply([Term::bvar(0)]));
    /// ~~~
    pub fn subst(self, u: &Self) -> Self {
        self.subst_at(u, 0)
    }

    /// Replace the variable `depth` by `u`, decrementing all greater variables.
    ///
    /// The value `u` is shifted by the number of binders crossed;
    /// shifted versions of `u` are computed only once per binder depth.
    pub fn subst_at(self, u: &Self, depth: usize) -> Self {
        let mut shifted: Vec<Option<Self>> = Vec::new();
        self.apply_subst(
            &mut |n, k, name| {
                if n == k {
                    let crossed = k - depth;
                    if shifted.len() <= crossed {
                        shifted.resize(crossed + 1, None);
                    }
                    shifted[crossed]
                        .get_or_insert_with(|| u.clone() << crossed)
                        .clone()
                } else {
                    Self::BVar(n - 1, name.clone())
                }
            },
            depth,
        )
    }
}

#[cfg(test)]
fn samples() -> Vec<Term> {
    let (f, a) = (Term::symb("f"), Term::symb("a"));
    Vec::from([
        Term::bvar(0),
        Term::bvar(3).apply([Term::bvar(0), a.clone()]),
        Term::abst("x", Some(Term::bvar(0)), f.clone().apply([Term::bvar(0), Term::bvar(2)])),
        Term::prod(Some("x"), Term::Type, Term::prod(None, Term::bvar(0), Term::bvar(2))),
        Term::meta("X", Vec::from([Term::bvar(1), Term::bvar(0)])),
    ])
}

#[test]
fn subst_shift_inverse() {
    let v = Term::symb("v").apply([Term::bvar(1)]);
    for t in samples() {
        assert_eq!((t.clone() << 1).subst(&v), t);
    }
}

#[test]
fn shift_shift() {
    for t in samples() {
        for d in 0..3 {
            assert_eq!(t.clone().shift(2, d).shift(3, d), t.clone().shift(5, d));
        }
    }
}

#[test]
fn subst_under_binders() {
    // (x => #0 #1)[#0 := u] = x => #0 u
    let u = Term::symb("u").apply([Term::bvar(0)]);
    let tm = Term::abst("x", None, Term::bvar(0).apply([Term::bvar(1)]));
    let expected = Term::abst("x", None, Term::bvar(0).apply([u.clone() << 1]));
    assert_eq!(tm.subst(&u), expected);
}

#[test]
fn shift_preserves_sharing() {
    let tm = Term::abst("x", None, Term::symb("f").apply([Term::bvar(0)]));
    assert!(tm.clone().shift(4, 0).ptr_eq(&tm));
}

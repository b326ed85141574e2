//! Syntactic equality of terms.

use crate::term::{Comb, Term};
use alloc::vec::Vec;

/// Pair of terms to be compared, living under the given number of binders.
pub type Pair = (Term, Term, usize);

impl Term {
    /// Return true if the two terms have the same top constructor,
    /// and if so, push pairs of their immediate subterms.
    ///
    /// Every pushed pair carries the number of binders it lives under,
    /// starting from `depth`.
    /// Names of bound variables are ignored, as are
    /// type annotations of abstractions unless both are present.
    /// A joker annotation counts as absent.
    pub fn same_head_with_depth(&self, other: &Self, depth: usize, pairs: &mut Vec<Pair>) -> bool {
        use Comb::*;
        match (self, other) {
            (Self::Kind, Self::Kind) | (Self::Type, Self::Type) | (Self::Joker, Self::Joker) => true,
            (Self::Symb(s1), Self::Symb(s2)) => s1 == s2,
            (Self::BVar(x1, _), Self::BVar(x2, _)) => x1 == x2,
            (Self::Comb(c1), Self::Comb(c2)) => match (&**c1, &**c2) {
                (Appl(f1, a1), Appl(f2, a2)) => {
                    pairs.push((f1.clone(), f2.clone(), depth));
                    pairs.push((a1.clone(), a2.clone(), depth));
                    true
                }
                (Prod(_, ty1, tm1), Prod(_, ty2, tm2)) => {
                    pairs.push((ty1.clone(), ty2.clone(), depth));
                    pairs.push((tm1.clone(), tm2.clone(), depth + 1));
                    true
                }
                (Abst(_, ty1, tm1), Abst(_, ty2, tm2)) => {
                    let annot = |ty: &Option<Term>| {
                        ty.clone().filter(|ty| !matches!(ty, Self::Joker))
                    };
                    if let (Some(ty1), Some(ty2)) = (annot(ty1), annot(ty2)) {
                        pairs.push((ty1, ty2, depth));
                    }
                    pairs.push((tm1.clone(), tm2.clone(), depth + 1));
                    true
                }
                (MVar(m1, args1), MVar(m2, args2)) => {
                    if m1 != m2 || args1.len() != args2.len() {
                        return false;
                    }
                    let args = args1.iter().cloned().zip(args2.iter().cloned());
                    pairs.extend(args.map(|(a1, a2)| (a1, a2, depth)));
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Return true if the terms are syntactically equal modulo names of bound variables.
    ///
    /// ~~~
    /// # use kotree::Term;
    /// let x = Term::abst("x", None, Term::BVar(0, Some("x".into())));
    /// let y = Term::abst("y", None, Term::BVar(0, Some("y".into())));
    /// assert!(x.equals(&y));
    /// assert!(!x.equals(&Term::abst("x", None, Term::Type)));
    /// ~~~
    pub fn equals(&self, other: &Self) -> bool {
        let mut pairs = Vec::from([(self.clone(), other.clone(), 0)]);
        while let Some((tm1, tm2, depth)) = pairs.pop() {
            if !tm1.ptr_eq(&tm2) && !tm1.same_head_with_depth(&tm2, depth, &mut pairs) {
                return false;
            }
        }
        true
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Term {}

#[test]
fn reflexive_symmetric() {
    let (f, a) = (Term::symb("f"), Term::symb("a"));
    let terms = [
        Term::Type,
        f.clone().apply([a.clone(), Term::bvar(2)]),
        Term::prod(Some("x"), a.clone(), f.clone().apply([Term::bvar(0)])),
        Term::abst("x", Some(a.clone()), Term::bvar(0)),
        Term::meta("X", Vec::from([Term::bvar(0)])),
    ];
    for (i, t1) in terms.iter().enumerate() {
        assert!(t1.equals(t1));
        for (j, t2) in terms.iter().enumerate() {
            assert_eq!(t1.equals(t2), i == j);
            assert_eq!(t1.equals(t2), t2.equals(t1));
        }
    }
}

#[test]
fn depth_of_pairs() {
    let p1 = Term::prod(None, Term::Type, Term::bvar(0));
    let p2 = Term::prod(None, Term::Kind, Term::bvar(1));
    let mut pairs = Vec::new();
    assert!(p1.same_head_with_depth(&p2, 3, &mut pairs));
    let depths: Vec<_> = pairs.iter().map(|(_, _, d)| *d).collect();
    assert_eq!(depths, [3, 4]);
    assert!(!p1.equals(&p2));
}

#[test]
fn joker_annotation() {
    let (a, b) = (Term::symb("a"), Term::symb("b"));
    let joker = Term::abst("x", Some(Term::Joker), Term::bvar(0));
    let none = Term::abst("x", None, Term::bvar(0));
    let typed = Term::abst("x", Some(a), Term::bvar(0));
    assert!(joker.equals(&none));
    assert!(joker.equals(&typed));
    assert!(typed.equals(&joker));
    assert!(!typed.equals(&Term::abst("x", Some(b), Term::bvar(0))));
}

//! Reduction to weak head normal form (WHNF) and normal form, including rewriting.

use crate::term::{Comb, Term};
use crate::GCtx;

impl Term {
    /// Evaluate the term to its weak head normal form.
    ///
    /// This performs beta reduction and rewriting at the head of the term.
    /// If the term is already in weak head normal form,
    /// it is returned unchanged.
    ///
    /// ~~~
    /// # use kotree::{GCtx, Term};
    /// let gc = GCtx::new();
    /// let id = Term::abst("x", None, Term::bvar(0));
    /// let tm = id.clone().apply([id.clone(), Term::symb("a")]);
    /// assert_eq!(tm.whnf(&gc), Term::symb("a"));
    /// ~~~
    pub fn whnf(self, gc: &GCtx) -> Self {
        let (mut head, mut stack) = self.get_head();
        let mut changed = false;
        loop {
            trace!("whnf: {} applied to {} arguments", head, stack.len());
            match &head {
                Self::Comb(c) => match &**c {
                    Comb::Appl(..) => {
                        let (h, args) = head.get_head();
                        stack.extend(args);
                        head = h;
                    }
                    Comb::Abst(_, _, body) => match stack.pop() {
                        Some(arg) => {
                            head = body.clone().subst(&arg);
                            changed = true;
                        }
                        None => break,
                    },
                    Comb::Prod(..) | Comb::MVar(..) => break,
                },
                Self::Symb(s) => match gc.rewrite(s, &stack) {
                    Some((rhs, consumed)) => {
                        stack.truncate(stack.len() - consumed);
                        head = rhs;
                        changed = true;
                    }
                    None => break,
                },
                Self::Kind | Self::Type | Self::BVar(..) | Self::Joker => break,
            }
        }
        if changed {
            head.apply(stack.into_iter().rev())
        } else {
            self
        }
    }

    /// Evaluate the term to its normal form.
    pub fn nf(self, gc: &GCtx) -> Self {
        let (head, args) = self.whnf(gc).get_head();
        let head = match head.get_comb() {
            Some(Comb::Prod(id, ty, tm)) => {
                Comb::Prod(id.clone(), ty.clone().nf(gc), tm.clone().nf(gc)).into()
            }
            Some(Comb::Abst(id, ty, tm)) => {
                let ty = ty.clone().map(|ty| ty.nf(gc));
                Comb::Abst(id.clone(), ty, tm.clone().nf(gc)).into()
            }
            Some(Comb::MVar(m, margs)) => {
                let margs = margs.iter().map(|a| a.clone().nf(gc)).collect();
                Comb::MVar(m.clone(), margs).into()
            }
            _ => head,
        };
        head.apply(args.into_iter().rev().map(|a| a.nf(gc)))
    }
}

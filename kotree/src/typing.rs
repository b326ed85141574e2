//! Type checking and type inference for terms.

use crate::term::{Comb, Term};
use crate::{Ctx, GCtx};
use core::fmt;

/// Type errors, carrying the offending term and the context it lives in.
#[derive(Clone, Debug)]
pub enum Error {
    KindNotTypable,
    /// the domain of a product is not a type
    DomainNotType(Term, Ctx),
    /// the codomain of a product is neither a type nor a kind
    CodomainNotSort(Term, Ctx),
    /// the type of an abstraction is not given and cannot be inferred
    DomainFreeAbstraction(Term, Ctx),
    /// the body of an abstraction is a type of kind `Kind`
    UnexpectedKind(Term, Ctx),
    /// a term is applied to an argument, but its type is not a product
    ProductExpected(Term, Ctx),
    /// a variable is not bound in the context or a symbol is not declared
    TypeNotFound(Term, Ctx),
    MetaVariable(Term, Ctx),
    Joker(Ctx),
    /// the type annotation of an abstraction differs from the expected one
    IncompatibleAnnotation {
        term: Term,
        expected: Term,
        actual: Term,
        ctx: Ctx,
    },
    Unconvertible {
        term: Term,
        expected: Term,
        actual: Term,
        ctx: Ctx,
    },
    /// the declared type is neither a type nor a kind
    SortExpected(Term),
}

impl Error {
    pub fn title(&self) -> &'static str {
        match self {
            Self::IncompatibleAnnotation { .. } | Self::Unconvertible { .. } => "Check",
            Self::SortExpected(_) => "Declaration",
            _ => "Infer",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::KindNotTypable => write!(f, "Cannot infer the type of Kind !"),
            Self::DomainNotType(tm, ctx) => {
                write!(f, "Domain of forall is not a type: `{}`.\n{}", tm, ctx)
            }
            Self::CodomainNotSort(tm, ctx) => write!(
                f,
                "Codomain of forall is neither a type nor a kind: `{}`.\n{}",
                tm, ctx
            ),
            Self::DomainFreeAbstraction(tm, ctx) => {
                write!(f, "Can't infer non-annotated lambda `{}`.\n{}", tm, ctx)
            }
            Self::UnexpectedKind(tm, ctx) => {
                write!(f, "Abstraction body is a kind: `{}`.\n{}", tm, ctx)
            }
            Self::ProductExpected(tm, ctx) => {
                write!(f, "Non-function application on `{}`.\n{}", tm, ctx)
            }
            Self::TypeNotFound(tm, ctx) => {
                write!(f, "Cannot infer the type of free variable {}\n{}", tm, ctx)
            }
            Self::MetaVariable(tm, ctx) => write!(
                f,
                "Cannot infer the type of a meta-variable instance: {}\n{}",
                tm, ctx
            ),
            Self::Joker(ctx) => write!(f, "Cannot infer the type of a joker\n{}", ctx),
            Self::IncompatibleAnnotation {
                term,
                expected,
                actual,
                ctx,
            } => write!(
                f,
                "Incompatible annotation [{}].\n- Expect = {}\n- Actual = {}\n{}",
                term, expected, actual, ctx
            ),
            Self::Unconvertible {
                term,
                expected,
                actual,
                ctx,
            } => write!(
                f,
                "Type mismatch on {}\n- Expect = {}\n- Actual = {}\n{}",
                term, expected, actual, ctx
            ),
            Self::SortExpected(ty) => write!(f, "Declared type is not a sort: `{}`.", ty),
        }
    }
}

impl Term {
    /// Infer the type of a term using supplied types of bound variables.
    ///
    /// ~~~
    /// # use kotree::{Ctx, GCtx, Term};
    /// let mut gc = GCtx::new();
    /// gc.define("nat".into(), Term::Type, false)?;
    /// gc.define("zero".into(), Term::symb("nat"), false)?;
    /// let id = Term::abst("x", Some(Term::symb("nat")), Term::bvar(0));
    /// let ty = id.apply([Term::symb("zero")]).infer(&gc, &Ctx::new())?;
    /// assert_eq!(ty, Term::symb("nat"));
    /// # Ok::<_, kotree::Error>(())
    /// ~~~
    pub fn infer(&self, gc: &GCtx, ctx: &Ctx) -> Result<Term, Error> {
        debug!("infer type of {}", self);
        match self {
            Self::Kind => Err(Error::KindNotTypable),
            Self::Type => Ok(Self::Kind),
            Self::Symb(s) => match gc.get_type(s.as_str()) {
                Some(ty) => Ok(ty.clone()),
                None => Err(Error::TypeNotFound(self.clone(), ctx.clone())),
            },
            Self::BVar(x, _) => match ctx.get_type(*x) {
                Some(ty) => Ok(ty),
                None => Err(Error::TypeNotFound(self.clone(), ctx.clone())),
            },
            Self::Joker => Err(Error::Joker(ctx.clone())),
            Self::Comb(c) => match &**c {
                Comb::Appl(f, a) => match f.infer(gc, ctx)?.whnf(gc).get_prod() {
                    Some((_, dom, cod)) => {
                        a.check(gc, ctx, dom.clone())?;
                        Ok(cod.clone().subst(a))
                    }
                    None => Err(Error::ProductExpected(self.clone(), ctx.clone())),
                },
                Comb::Prod(id, dom, cod) => {
                    if !matches!(dom.infer(gc, ctx)?.whnf(gc), Self::Type) {
                        return Err(Error::DomainNotType(self.clone(), ctx.clone()));
                    }
                    let ctx2 = ctx.bind(id.clone(), Some(dom.clone()));
                    match cod.infer(gc, &ctx2)?.whnf(gc) {
                        sort @ (Self::Type | Self::Kind) => Ok(sort),
                        _ => Err(Error::CodomainNotSort(self.clone(), ctx.clone())),
                    }
                }
                Comb::Abst(..) => {
                    let (id, ty, tm) = match self.get_abst() {
                        Some((id, Some(ty), tm)) => (id, ty, tm),
                        _ => return Err(Error::DomainFreeAbstraction(self.clone(), ctx.clone())),
                    };
                    if !matches!(ty.infer(gc, ctx)?.whnf(gc), Self::Type) {
                        return Err(Error::DomainNotType(self.clone(), ctx.clone()));
                    }
                    let ctx2 = ctx.bind(Some(id.clone()), Some(ty.clone()));
                    match tm.infer(gc, &ctx2)? {
                        Self::Kind => Err(Error::UnexpectedKind(self.clone(), ctx.clone())),
                        tm_ty => Ok(Comb::Prod(Some(id.clone()), ty.clone(), tm_ty).into()),
                    }
                }
                Comb::MVar(..) => Err(Error::MetaVariable(self.clone(), ctx.clone())),
            },
        }
    }

    /// Check whether a term is of the given type, using supplied types of bound variables.
    ///
    /// Abstractions without type annotation can be checked,
    /// but not inferred.
    pub fn check(&self, gc: &GCtx, ctx: &Ctx, ty_exp: Term) -> Result<(), Error> {
        debug!("check {} is of type {} when {}", self, ty_exp, ctx);
        if let Some(Comb::MVar(..)) = self.get_comb() {
            return Err(Error::MetaVariable(self.clone(), ctx.clone()));
        }
        let ty_exp = ty_exp.whnf(gc);
        if let (Some((id, ty, tm)), Some((_, dom, cod))) = (self.get_abst(), ty_exp.get_prod()) {
            if let Some(ty) = ty {
                if !matches!(ty.infer(gc, ctx)?.whnf(gc), Self::Type) {
                    return Err(Error::DomainNotType(self.clone(), ctx.clone()));
                }
                if !Self::convertible(ty.clone(), dom.clone(), gc) {
                    return Err(Error::IncompatibleAnnotation {
                        term: self.clone(),
                        expected: dom.clone(),
                        actual: ty.clone(),
                        ctx: ctx.clone(),
                    });
                }
            }
            let ctx2 = ctx.bind(Some(id.clone()), Some(dom.clone()));
            return tm.check(gc, &ctx2, cod.clone());
        }
        let ty_inf = self.infer(gc, ctx)?;
        debug!("checking convertibility: {} ~ {}", ty_inf, ty_exp);
        if Self::convertible(ty_inf.clone(), ty_exp.clone(), gc) {
            Ok(())
        } else {
            Err(Error::Unconvertible {
                term: self.clone(),
                expected: ty_exp,
                actual: ty_inf,
                ctx: ctx.clone(),
            })
        }
    }

    /// Verify that a term is a type or a kind, returning its sort.
    pub fn sort(&self, gc: &GCtx) -> Result<Term, Error> {
        match self.infer(gc, &Ctx::new())?.whnf(gc) {
            sort @ (Self::Type | Self::Kind) => Ok(sort),
            _ => Err(Error::SortExpected(self.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gc() -> GCtx {
        let mut gc = GCtx::new();
        gc.define("A".into(), Term::Type, false).unwrap();
        gc.define("a".into(), Term::symb("A"), false).unwrap();
        gc
    }

    #[test]
    fn identity_instance() {
        let gc = gc();
        let a = Term::symb("A");
        let id = Term::abst("x", Some(a.clone()), Term::bvar(0));
        let ty = id.infer(&gc, &Ctx::new()).unwrap();
        assert_eq!(ty, Term::arrow(a.clone(), a.clone()));
        let ty = id.apply([Term::symb("a")]).infer(&gc, &Ctx::new()).unwrap();
        assert!(Term::convertible(ty, a, &gc));
    }

    #[test]
    fn unannotated() {
        let gc = gc();
        let a = Term::symb("A");
        let id = Term::abst("x", None, Term::bvar(0));
        let err = id.infer(&gc, &Ctx::new());
        assert!(matches!(err, Err(Error::DomainFreeAbstraction(..))));
        // checking adopts the domain of the expected type
        assert!(id.check(&gc, &Ctx::new(), Term::arrow(a.clone(), a.clone())).is_ok());
        // but fails if the expected type is not a product
        let err = id.check(&gc, &Ctx::new(), a);
        assert!(matches!(err, Err(Error::DomainFreeAbstraction(..))));
    }

    #[test]
    fn mismatch() {
        let gc = gc();
        let ctx = Ctx::new().bind(Some("y".into()), Some(Term::Type));
        let err = Term::symb("a").check(&gc, &ctx, Term::bvar(0));
        match err {
            Err(e @ Error::Unconvertible { .. }) => {
                use alloc::string::ToString;
                let msg = e.to_string();
                assert!(msg.starts_with("Type mismatch on a\n- Expect = #0\n- Actual = A\n"));
                assert!(msg.ends_with("[CONTEXT]\ny : Type\n"));
            }
            _ => panic!("type mismatch expected"),
        }
    }

    #[test]
    fn bad_products() {
        let gc = gc();
        let ctx = Ctx::new();
        let p = Term::prod(None, Term::symb("a"), Term::symb("A"));
        assert!(matches!(p.infer(&gc, &ctx), Err(Error::DomainNotType(..))));
        let p = Term::prod(None, Term::symb("A"), Term::symb("a"));
        assert!(matches!(p.infer(&gc, &ctx), Err(Error::CodomainNotSort(..))));
        let app = Term::symb("a").apply([Term::symb("a")]);
        assert!(matches!(app.infer(&gc, &ctx), Err(Error::ProductExpected(..))));
        assert!(matches!(Term::Kind.infer(&gc, &ctx), Err(Error::KindNotTypable)));
        assert!(matches!(Term::bvar(0).infer(&gc, &ctx), Err(Error::TypeNotFound(..))));
    }
}

//! Scoping of instructions into a namespace.
//!
//! Instructions refer to symbols by names that are
//! relative to the namespace of the module they are processed in.
//! Scoping qualifies the names of newly introduced symbols by the namespace and
//! resolves references to symbols of the namespace.
//! Furthermore, jokers in rule left-hand sides are replaced by fresh meta-variables.

use crate::instr::{Command, Decl};
use crate::pattern::Miller;
use crate::term::{Comb, Term};
use crate::{Ctx, GCtx, Symbol};
use alloc::{string::String, vec::Vec};

/// Rebuild a term bottom-up, replacing subterms for which `f` yields a term.
///
/// The function `f` receives the number of binders around the subterm.
fn map(tm: &Term, depth: usize, f: &mut impl FnMut(&Term, usize) -> Option<Term>) -> Term {
    if let Some(tm2) = f(tm, depth) {
        return tm2;
    }
    let comb = match tm.get_comb() {
        Some(comb) => comb,
        None => return tm.clone(),
    };
    match comb {
        Comb::Appl(t1, t2) => Term::appl(map(t1, depth, f), map(t2, depth, f)),
        Comb::Prod(id, ty, tm) => {
            Comb::Prod(id.clone(), map(ty, depth, f), map(tm, depth + 1, f)).into()
        }
        Comb::Abst(id, ty, tm) => {
            // joker annotations stand for missing ones
            let ty = ty.as_ref().filter(|ty| !matches!(ty, Term::Joker));
            let ty = ty.map(|ty| map(ty, depth, f));
            Comb::Abst(id.clone(), ty, map(tm, depth + 1, f)).into()
        }
        Comb::MVar(m, args) => {
            let args = args.iter().map(|a| map(a, depth, f)).collect();
            Comb::MVar(m.clone(), args).into()
        }
    }
}

/// Namespace in which instructions are scoped.
pub struct Scope<'a> {
    pub gc: &'a GCtx,
    pub namespace: &'a str,
}

impl<'a> Scope<'a> {
    pub fn new(gc: &'a GCtx, namespace: &'a str) -> Self {
        Self { gc, namespace }
    }

    /// Qualify the name of a newly introduced symbol.
    pub fn qualify(&self, name: &str) -> Symbol {
        Symbol::qualify(self.namespace, name)
    }

    /// Resolve a symbol to a symbol of the namespace if it exists there.
    ///
    /// ~~~
    /// # use kotree::{scope::Scope, GCtx, Symbol, Term};
    /// let mut gc = GCtx::new();
    /// gc.define("m.nat".into(), Term::Type, false)?;
    /// let scope = Scope::new(&gc, "m");
    /// assert_eq!(scope.resolve(&"nat".into()), Symbol::new("m.nat"));
    /// assert_eq!(scope.resolve(&"bool".into()), Symbol::new("bool"));
    /// # Ok::<_, kotree::Error>(())
    /// ~~~
    pub fn resolve(&self, sym: &Symbol) -> Symbol {
        if self.namespace.is_empty() {
            return sym.clone();
        }
        let qualified = self.qualify(sym.as_str());
        if self.gc.contains(qualified.as_str()) {
            qualified
        } else {
            sym.clone()
        }
    }

    pub fn term(&self, tm: &Term) -> Term {
        map(tm, 0, &mut |tm, _| match tm {
            Term::Symb(s) => Some(Term::Symb(self.resolve(s))),
            _ => None,
        })
    }

    /// Scope the left-hand side of a rule.
    ///
    /// Every joker is replaced by a fresh meta-variable
    /// that may depend on all variables bound around it.
    pub fn lhs(&self, tm: &Term, fresh: &mut usize) -> Term {
        map(tm, 0, &mut |tm, depth| match tm {
            Term::Symb(s) => Some(Term::Symb(self.resolve(s))),
            Term::Joker => {
                let m = Miller::Fresh(*fresh);
                *fresh += 1;
                Some(Term::mvar(Some(m), (0..depth).map(Term::bvar).collect()))
            }
            _ => None,
        })
    }

    pub fn ctx(&self, ctx: &Ctx) -> Ctx {
        let bindings: Vec<_> = ctx.iter().collect();
        let bind = |ctx: Ctx, (name, ty): (Option<&_>, Option<&Term>)| {
            ctx.bind(name.cloned(), ty.map(|ty| self.term(ty)))
        };
        bindings.into_iter().rev().fold(Ctx::new(), bind)
    }

    fn name(&self, name: &str) -> String {
        String::from(self.qualify(name).as_str())
    }

    /// Scope a command.
    pub fn command(&self, cmd: Command, fresh: &mut usize) -> Command {
        match cmd {
            Command::Decl(decl) => Command::Decl(Decl {
                name: self.name(&decl.name),
                ty: decl.ty.as_ref().map(|ty| self.term(ty)),
                def: decl.def.as_ref().map(|def| self.term(def)),
                ..decl
            }),
            Command::DeclConst(name) => Command::DeclConst(self.name(&name)),
            Command::DeclInj(name) => Command::DeclInj(self.name(&name)),
            Command::DTree(name) => Command::DTree(self.name(&name)),
            Command::Rule { name, lhs, rhs } => Command::Rule {
                name: self.name(&name),
                lhs: self.lhs(&lhs, fresh),
                rhs: self.term(&rhs),
            },
            Command::Eval { ctx, term } => Command::Eval {
                term: self.term(&term),
                ctx: self.ctx(&ctx),
            },
            Command::Infer { ctx, term } => Command::Infer {
                term: self.term(&term),
                ctx: self.ctx(&ctx),
            },
            Command::CheckType { ctx, term, ty } => Command::CheckType {
                term: self.term(&term),
                ty: self.term(&ty),
                ctx: self.ctx(&ctx),
            },
            Command::CheckConv {
                ctx,
                lhs,
                rhs,
                convertible,
            } => Command::CheckConv {
                lhs: self.term(&lhs),
                rhs: self.term(&rhs),
                ctx: self.ctx(&ctx),
                convertible,
            },
            Command::Print(tm) => Command::Print(self.term(&tm)),
            cmd @ (Command::Clock
            | Command::Require { .. }
            | Command::DebugOn
            | Command::DebugOff) => cmd,
        }
    }
}

#[test]
fn lhs_jokers() {
    let gc = GCtx::new();
    let scope = Scope::new(&gc, "");
    let lhs = Term::symb("f").apply([Term::Joker, Term::abst("x", None, Term::Joker)]);
    let mut fresh = 0;
    let lhs = scope.lhs(&lhs, &mut fresh);
    let expected = Term::symb("f").apply([
        Term::mvar(Some(Miller::Fresh(0)), Vec::new()),
        Term::abst("x", None, Term::mvar(Some(Miller::Fresh(1)), Vec::from([Term::bvar(0)]))),
    ]);
    assert_eq!(lhs, expected);
    assert_eq!(fresh, 2);
}

#[test]
fn namespaced() {
    let mut gc = GCtx::new();
    gc.define("m.a".into(), Term::Type, false).unwrap();
    let scope = Scope::new(&gc, "m");
    let cmd = Command::Decl(Decl::declare("b", Term::symb("a")));
    match scope.command(cmd, &mut 0) {
        Command::Decl(decl) => {
            assert_eq!(decl.name, "m.b");
            assert_eq!(decl.ty, Some(Term::symb("m.a")));
        }
        _ => panic!("declaration expected"),
    }
}

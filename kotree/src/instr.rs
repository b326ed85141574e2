//! Instructions processed by a checking session.

use crate::term::{Name, Term};
use crate::Ctx;
use alloc::{string::String, vec::Vec};

/// Introduction of a new symbol.
///
/// A declaration can have many shapes, such as
/// `x : A`, `x := t`, `x : A := t`, ...
#[derive(Clone, Debug)]
pub struct Decl {
    pub name: String,
    pub ty: Option<Term>,
    pub def: Option<Term>,
    /// the symbol is never unfolded by its definition or rewrite rules
    pub constant: bool,
    /// the symbol has to be proven in its namespace
    pub theorem: bool,
}

impl Decl {
    /// Declaration `name : ty` of a symbol that may receive rewrite rules later.
    pub fn declare(name: &str, ty: Term) -> Self {
        Self::define(name, Some(ty), None)
    }

    /// Declaration of a constant symbol `name : ty`.
    pub fn constant(name: &str, ty: Term) -> Self {
        Self {
            constant: true,
            ..Self::declare(name, ty)
        }
    }

    /// Definition of `name` by `def`, with an optional type.
    pub fn define(name: &str, ty: Option<Term>, def: Option<Term>) -> Self {
        Self {
            name: name.into(),
            ty,
            def,
            constant: false,
            theorem: false,
        }
    }

    /// Theorem `name : ty`, optionally with a proof.
    ///
    /// A theorem without proof has to be proven by a rewrite rule
    /// before the end of its namespace.
    pub fn theorem(name: &str, ty: Term, proof: Option<Term>) -> Self {
        Self {
            theorem: true,
            ..Self::define(name, Some(ty), proof)
        }
    }

    /// Abstract over parameters `(x1 : A1) ... (xn : An)`.
    ///
    /// The type becomes `(x1 : A1) -> ... -> (xn : An) -> ty` and
    /// the definition becomes `(x1 : A1) => ... => (xn : An) => def`,
    /// where every `Ai` may refer to the previous parameters.
    ///
    /// ~~~
    /// # use kotree::{Decl, Term};
    /// let nat = Term::symb("nat");
    /// let decl = Decl::define("id", Some(nat.clone()), Some(Term::bvar(0)));
    /// let decl = decl.with_params(Vec::from([("x".into(), nat.clone())]));
    /// assert_eq!(decl.ty, Some(Term::prod(Some("x"), nat.clone(), nat.clone())));
    /// assert_eq!(decl.def, Some(Term::abst("x", Some(nat), Term::bvar(0))));
    /// ~~~
    pub fn with_params(self, params: Vec<(Name, Term)>) -> Self {
        let ty = self.ty.map(|ty| {
            let prod = |tm, (x, ty): &(Name, Term)| Term::prod(Some(&**x), ty.clone(), tm);
            params.iter().rev().fold(ty, prod)
        });
        let def = self.def.map(|def| {
            let abst = |tm, (x, ty): &(Name, Term)| Term::abst(x, Some(ty.clone()), tm);
            params.iter().rev().fold(def, abst)
        });
        Self { ty, def, ..self }
    }
}

/// Command of a checking session.
#[derive(Clone, Debug)]
pub enum Command {
    Decl(Decl),
    /// make a symbol constant, even if it is not declared yet
    DeclConst(String),
    /// make a symbol injective, even if it is not declared yet
    DeclInj(String),
    Rule {
        name: String,
        lhs: Term,
        rhs: Term,
    },
    /// compute the normal form of a term
    Eval {
        ctx: Ctx,
        term: Term,
    },
    Infer {
        ctx: Ctx,
        term: Term,
    },
    CheckType {
        ctx: Ctx,
        term: Term,
        ty: Term,
    },
    /// assert that two terms are convertible or not
    CheckConv {
        ctx: Ctx,
        lhs: Term,
        rhs: Term,
        convertible: bool,
    },
    Print(Term),
    /// show the decision trees of a symbol
    DTree(String),
    Clock,
    /// check a module in the current namespace, extended by an optional alias
    Require {
        module: String,
        alias: Option<String>,
    },
    DebugOn,
    DebugOff,
}

/// Command with the line it was written on.
#[derive(Clone, Debug)]
pub struct Instruction {
    pub line: usize,
    pub command: Command,
}

impl Instruction {
    pub fn new(line: usize, command: Command) -> Self {
        Self { line, command }
    }

    /// Declaration with parameters, see [`Decl::with_params`].
    ///
    /// ~~~
    /// # use kotree::{Command, Decl, Instruction, Term};
    /// let nat = Term::symb("nat");
    /// let succ = Decl::declare("succ", nat.clone());
    /// let instr = Instruction::decl(3, succ, Vec::from([("n".into(), nat.clone())]));
    /// assert_eq!(instr.line, 3);
    /// match instr.command {
    ///     Command::Decl(decl) => assert_eq!(decl.ty, Some(Term::prod(Some("n"), nat.clone(), nat))),
    ///     _ => panic!("declaration expected"),
    /// }
    /// ~~~
    pub fn decl(line: usize, decl: Decl, params: Vec<(Name, Term)>) -> Self {
        Self::new(line, Command::Decl(decl.with_params(params)))
    }
}

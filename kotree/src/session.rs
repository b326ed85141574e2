//! Checking sessions, processing instructions one after the other.

use crate::error::Located;
use crate::instr::{Command, Decl, Instruction};
use crate::load::{self, Load};
use crate::message::{Frame, Message, Severity, Trail};
use crate::scope::Scope;
use crate::{Ctx, GCtx, Rule, Symbol, Term};
use alloc::{format, string::String, vec::Vec};
use core::fmt;

#[derive(Clone, Debug)]
pub enum Error {
    /// a declaration has neither a type nor a definition
    TypeAndTermEmpty(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TypeAndTermEmpty(name) => {
                write!(f, "Type and term cannot both be empty for `{}`.", name)
            }
        }
    }
}

/// State of a checking session.
///
/// ~~~
/// # use kotree::{Command, Decl, Instruction, Session, Term, load::NoLoad};
/// let nat = Term::symb("nat");
/// let cmds = [
///     Command::Decl(Decl::constant("nat", Term::Type)),
///     Command::Decl(Decl::declare("zero", nat.clone())),
///     Command::Infer { ctx: Default::default(), term: Term::symb("zero") },
/// ];
/// let instrs = cmds.into_iter().enumerate().map(|(i, c)| Instruction::new(i + 1, c));
///
/// let mut msgs = Vec::new();
/// Session::new().run(instrs, NoLoad, |msg| msgs.push(msg.to_string()))?;
/// assert_eq!(msgs[2], "line:3: [Infer] nat\n[CONTEXT]\n");
/// # Ok::<_, kotree::Located>(())
/// ~~~
pub struct Session {
    pub gc: GCtx,
    /// modules currently being loaded, outermost first
    loading: Vec<String>,
    /// log level before the last `DebugOn`
    level: Option<log::LevelFilter>,
    #[cfg(feature = "std")]
    clock: std::time::Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            gc: GCtx::new(),
            loading: Vec::new(),
            level: None,
            #[cfg(feature = "std")]
            clock: std::time::Instant::now(),
        }
    }

    /// Check instructions in the root namespace.
    pub fn run<L, F>(
        &mut self,
        instrs: impl IntoIterator<Item = Instruction>,
        mut load: L,
        mut emit: F,
    ) -> Result<(), Located>
    where
        L: Load,
        F: FnMut(Message),
    {
        let trail = Trail::default();
        self.check_instructions(instrs, "", &trail, &mut load, &mut emit)
    }

    /// Check instructions in a namespace, then
    /// verify that all theorems of the namespace were proven.
    pub fn check_instructions<L, F>(
        &mut self,
        instrs: impl IntoIterator<Item = Instruction>,
        namespace: &str,
        trail: &Trail,
        load: &mut L,
        emit: &mut F,
    ) -> Result<(), Located>
    where
        L: Load,
        F: FnMut(Message),
    {
        for instr in instrs {
            self.check_instruction(instr, namespace, trail, load, emit)?;
        }
        let located = |error: crate::gctx::Error| Located::new(error.into(), trail.clone());
        self.gc.all_proven(namespace).map_err(located)
    }

    /// Check a single instruction, reporting its messages to `emit`.
    pub fn check_instruction<L, F>(
        &mut self,
        instr: Instruction,
        namespace: &str,
        trail: &Trail,
        load: &mut L,
        emit: &mut F,
    ) -> Result<(), Located>
    where
        L: Load,
        F: FnMut(Message),
    {
        info!("check instruction on line {}", instr.line);
        let mut trail = trail.clone();
        trail.0.push(Frame {
            line: instr.line,
            module: None,
        });

        let command = Scope::new(&self.gc, namespace).command(instr.command, &mut 0);
        if let Command::Require { module, alias } = command {
            return self.require(module, alias, namespace, trail, load, emit);
        }
        match self.command(command) {
            Ok(msg) => {
                if let Some(mut msg) = msg {
                    msg.trail = trail;
                    emit(msg)
                }
                Ok(())
            }
            Err(error) => Err(Located::new(error, trail)),
        }
    }

    fn require<L, F>(
        &mut self,
        module: String,
        alias: Option<String>,
        namespace: &str,
        trail: Trail,
        load: &mut L,
        emit: &mut F,
    ) -> Result<(), Located>
    where
        L: Load,
        F: FnMut(Message),
    {
        if self.loading.contains(&module) {
            let mut cycle = self.loading.clone();
            cycle.push(module);
            return Err(Located::new(load::Error::Cyclic(cycle).into(), trail));
        }
        let instrs = match load.load(&module) {
            Ok(instrs) => instrs,
            Err(e) => return Err(Located::new(e.into(), trail)),
        };

        let namespace = match alias {
            Some(alias) if namespace.is_empty() => alias,
            Some(alias) => format!("{}.{}", namespace, alias),
            None => namespace.into(),
        };
        debug!("require module {} in namespace {}", module, namespace);

        let mut inner = trail.clone();
        if let Some(frame) = inner.0.last_mut() {
            frame.module = Some(module.clone());
        }
        self.loading.push(module.clone());
        let result = self.check_instructions(instrs, &namespace, &inner, load, emit);
        self.loading.pop();
        result?;

        let body = format!("Module [{}] successfully loaded.", module);
        let mut msg = Message::new(Severity::Ok, "Require", body);
        msg.trail = trail;
        emit(msg);
        Ok(())
    }

    fn command(&mut self, command: Command) -> Result<Option<Message>, crate::Error> {
        let ok = |title, body| Ok(Some(Message::new(Severity::Ok, title, body)));
        let info = |title, body| Ok(Some(Message::new(Severity::Info, title, body)));
        match command {
            Command::Decl(decl) => self.decl(decl).map(Some),
            Command::DeclConst(name) => {
                self.gc.declare_constant(Symbol::from(name.as_str()));
                ok("Symbol declared constant", format!("`{}`", name))
            }
            Command::DeclInj(name) => {
                self.gc.declare_injective(Symbol::from(name.as_str()));
                ok("Symbol declared injective", format!("`{}` (no check)", name))
            }
            Command::Rule { name, lhs, rhs } => self.rule(name, lhs, rhs).map(Some),
            Command::Eval { ctx, term } => {
                let nf = term.nf(&self.gc);
                info("Eval", format!("{}\n{}", nf, ctx))
            }
            Command::Infer { ctx, term } => {
                let ty = term.infer(&self.gc, &ctx)?;
                info("Infer", format!("{}\n{}", ty, ctx))
            }
            Command::CheckType { ctx, term, ty } => {
                term.check(&self.gc, &ctx, ty.clone())?;
                ok("CheckType", format!("{} has indeed type {}\n{}", term, ty, ctx))
            }
            Command::CheckConv {
                ctx: _,
                lhs,
                rhs,
                convertible,
            } => {
                let not = |b| if b { "" } else { "not " };
                let actual = Term::convertible(lhs.clone(), rhs.clone(), &self.gc);
                let (severity, indeed) = if actual == convertible {
                    (Severity::Ok, "indeed")
                } else {
                    warn!("convertibility of {} and {} is not as expected", lhs, rhs);
                    (Severity::Warning, "in fact")
                };
                let body = format!("{} is {} {}convertible with {}", lhs, indeed, not(actual), rhs);
                Ok(Some(Message::new(severity, "CheckConv", body)))
            }
            Command::Print(tm) => info("Show", format!("{}", tm)),
            Command::DTree(name) => {
                let forest = self.gc.forest(&name);
                let body = format!("Decision tree for symbol `{}`:\n{}", name, forest);
                info("DTree", body)
            }
            Command::Clock => info("Time", self.clock()),
            Command::Require { .. } => Err(load::Error::Unsupported.into()),
            Command::DebugOn => {
                self.level.get_or_insert_with(log::max_level);
                log::set_max_level(log::LevelFilter::Trace);
                Ok(None)
            }
            Command::DebugOff => {
                if let Some(level) = self.level.take() {
                    log::set_max_level(level)
                }
                Ok(None)
            }
        }
    }

    fn decl(&mut self, decl: Decl) -> Result<Message, crate::Error> {
        let gc = &self.gc;
        let ty = match (decl.ty, &decl.def) {
            (Some(ty), def) => {
                ty.sort(gc)?;
                if let Some(def) = def {
                    def.check(gc, &Ctx::new(), ty.clone())?;
                }
                ty
            }
            (None, Some(def)) => {
                let ty = def.infer(gc, &Ctx::new())?;
                ty.sort(gc)?;
                ty
            }
            (None, None) => return Err(Error::TypeAndTermEmpty(decl.name).into()),
        };

        let sym = Symbol::from(decl.name.as_str());
        let obligation = decl.theorem && decl.def.is_none();
        self.gc.define(sym.clone(), ty.clone(), obligation)?;

        let name = &decl.name;
        let (title, body) = if decl.constant {
            self.gc.declare_constant(sym);
            ("Constant symbol declared", format!("`{}` with type {}", name, ty))
        } else if let Some(def) = decl.def {
            let body = if decl.theorem {
                ("Theorem proven", format!("`{}` proves {}", name, ty))
            } else {
                ("Symbol defined", format!("`{}` as {}", name, def))
            };
            let rule = Rule::definition(format!("{}_def", name), sym, def);
            self.gc.add_rule(rule)?;
            body
        } else if decl.theorem {
            ("Proof required", format!("`{}` for theorem {}", name, ty))
        } else {
            ("Symbol declared", format!("`{}` with type {}", name, ty))
        };
        Ok(Message::new(Severity::Ok, title, body))
    }

    /// Add a rewrite rule.
    ///
    /// A rule rewriting a theorem without arguments proves the theorem,
    /// provided that its right-hand side has the type of the theorem.
    fn rule(&mut self, name: String, lhs: Term, rhs: Term) -> Result<Message, crate::Error> {
        let rule = Rule::new(name, lhs, rhs)?;
        let theorem = match self.gc.get(rule.head.as_str()) {
            Some(entry) if rule.stack.is_empty() && entry.obligation && !entry.proven => {
                rule.rhs.check(&self.gc, &Ctx::new(), entry.ty.clone())?;
                Some(rule.head.clone())
            }
            _ => None,
        };
        let body = format!("{} --> {}", rule.lhs, rule.rhs);
        self.gc.add_rule(rule)?;
        match theorem {
            Some(thm) => {
                self.gc.set_proven(&thm)?;
                Ok(Message::new(Severity::Ok, "Theorem proven", format!("`{}`", thm)))
            }
            None => Ok(Message::new(Severity::Ok, "Rewrite rule added", body)),
        }
    }

    /// Return the time since the last clock and reset the clock.
    #[cfg(feature = "std")]
    fn clock(&mut self) -> String {
        let now = std::time::Instant::now();
        let elapsed = now.duration_since(self.clock);
        self.clock = now;
        format!("{}ms since last clock", elapsed.as_millis())
    }

    #[cfg(not(feature = "std"))]
    fn clock(&mut self) -> String {
        "No clock available.".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gctx, typing, Message};
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn instrs(cmds: impl IntoIterator<Item = Command>) -> Vec<Instruction> {
        let cmds = cmds.into_iter().enumerate();
        cmds.map(|(i, c)| Instruction::new(i + 1, c)).collect()
    }

    fn run_with(
        session: &mut Session,
        cmds: impl IntoIterator<Item = Command>,
        load: impl Load,
    ) -> (Vec<Message>, Result<(), Located>) {
        init();
        let mut msgs = Vec::new();
        let result = session.run(instrs(cmds), load, |msg| msgs.push(msg));
        (msgs, result)
    }

    fn run(cmds: impl IntoIterator<Item = Command>) -> (Vec<Message>, Result<(), Located>) {
        run_with(&mut Session::new(), cmds, load::NoLoad)
    }

    fn sym(s: &str) -> Term {
        Term::symb(s)
    }

    fn meta(s: &str) -> Term {
        Term::meta(s, Vec::new())
    }

    fn decl(name: &str, ty: Term) -> Command {
        Command::Decl(Decl::declare(name, ty))
    }

    fn rule(name: &str, lhs: Term, rhs: Term) -> Command {
        let name = name.into();
        Command::Rule { name, lhs, rhs }
    }

    fn conv(lhs: Term, rhs: Term, convertible: bool) -> Command {
        let ctx = Ctx::new();
        Command::CheckConv {
            ctx,
            lhs,
            rhs,
            convertible,
        }
    }

    fn peano() -> Vec<Command> {
        let nat = sym("Nat");
        Vec::from([
            Command::Decl(Decl::constant("Nat", Term::Type)),
            decl("zero", nat.clone()),
            decl("succ", Term::arrow(nat.clone(), nat)),
        ])
    }

    fn plus() -> Vec<Command> {
        let nat = sym("Nat");
        let s = |tm: Term| sym("succ").apply([tm]);
        let plus = |x: Term, y: Term| sym("plus").apply([x, y]);
        let ty = Term::arrow(nat.clone(), Term::arrow(nat.clone(), nat));
        let mut cmds = peano();
        cmds.extend([
            decl("plus", ty),
            rule("plus_0", plus(sym("zero"), meta("y")), meta("y")),
            rule(
                "plus_s",
                plus(s(meta("x")), meta("y")),
                s(plus(meta("x"), meta("y"))),
            ),
        ]);
        cmds
    }

    fn severities(msgs: &[Message]) -> Vec<Severity> {
        msgs.iter().map(|m| m.severity).collect()
    }

    #[test]
    fn infer_successor() {
        let mut cmds = peano();
        let term = sym("succ").apply([sym("zero")]);
        cmds.push(Command::Infer {
            ctx: Ctx::new(),
            term,
        });
        let (msgs, result) = run(cmds);
        assert!(result.is_ok());
        let last = msgs.last().unwrap();
        assert_eq!(last.severity, Severity::Info);
        assert_eq!(last.body, "Nat\n[CONTEXT]\n");
        assert_eq!(msgs[0].title, "Constant symbol declared");
    }

    #[test]
    fn plus_by_rewriting() {
        let s = |tm: Term| sym("succ").apply([tm]);
        let one = || s(sym("zero"));
        let mut cmds = plus();
        cmds.push(conv(sym("plus").apply([one(), one()]), s(one()), true));
        cmds.push(conv(sym("plus").apply([one(), one()]), one(), false));
        cmds.push(conv(sym("plus").apply([one(), one()]), one(), true));
        let (msgs, result) = run(cmds);
        assert!(result.is_ok());
        let n = msgs.len();
        assert_eq!(msgs[n - 3].body, "plus (succ zero) (succ zero) is indeed convertible with succ (succ zero)");
        assert_eq!(msgs[n - 2].severity, Severity::Ok);
        assert_eq!(msgs[n - 2].body, "plus (succ zero) (succ zero) is indeed not convertible with succ zero");
        assert_eq!(msgs[n - 1].severity, Severity::Warning);
        assert_eq!(msgs[n - 1].body, "plus (succ zero) (succ zero) is in fact not convertible with succ zero");
    }

    #[test]
    fn eval_plus() {
        let s = |tm: Term| sym("succ").apply([tm]);
        let mut cmds = plus();
        let term = sym("plus").apply([s(sym("zero")), s(sym("zero"))]);
        cmds.push(Command::Eval {
            ctx: Ctx::new(),
            term,
        });
        let (msgs, result) = run(cmds);
        assert!(result.is_ok());
        assert_eq!(msgs.last().unwrap().body, "succ (succ zero)\n[CONTEXT]\n");
    }

    #[test]
    fn defined_identity() {
        let a = sym("A");
        let id = Term::abst("x", Some(a.clone()), Term::bvar(0));
        let def = Decl::define("id", Some(Term::arrow(a.clone(), a.clone())), Some(id));
        let ctx = Ctx::new().bind(Some("y".into()), Some(a));
        let cmds = [
            decl("A", Term::Type),
            Command::Decl(def),
            Command::CheckConv {
                ctx,
                lhs: sym("id").apply([Term::bvar(0)]),
                rhs: Term::bvar(0),
                convertible: true,
            },
        ];
        let (msgs, result) = run(cmds);
        assert!(result.is_ok());
        assert_eq!(msgs[1].title, "Symbol defined");
        assert_eq!(severities(&msgs)[2], Severity::Ok);
        assert_eq!(msgs[2].body, "id #0 is indeed convertible with #0");
    }

    #[test]
    fn unannotated_lambda() {
        let a = sym("A");
        let id = Term::abst("x", None, Term::bvar(0));
        let cmds = [
            decl("A", Term::Type),
            Command::CheckType {
                ctx: Ctx::new(),
                term: id,
                ty: a,
            },
        ];
        let (msgs, result) = run(cmds);
        assert_eq!(msgs.len(), 1);
        let err = result.unwrap_err();
        assert_eq!(err.trail.line(), Some(2));
        assert!(matches!(
            err.error,
            crate::Error::Typing(typing::Error::DomainFreeAbstraction(..))
        ));
        assert_eq!(err.error.title(), "Infer");
    }

    #[test]
    fn declaration_without_type() {
        let def = Decl::define("x", None, None);
        let (_, result) = run([Command::Decl(def)]);
        let err = result.unwrap_err();
        assert!(matches!(err.error, crate::Error::Session(_)));
        let def = Decl::define("B", None, Some(sym("A")));
        let (msgs, result) = run([decl("A", Term::Type), Command::Decl(def)]);
        assert!(result.is_ok());
        assert_eq!(msgs[1].body, "`B` as A");
    }

    #[test]
    fn higher_order_pattern() {
        // D (x => F[x]) --> F[zero], for a function argument
        let nat = sym("Nat");
        let ty = Term::arrow(Term::arrow(nat.clone(), nat.clone()), nat);
        let lhs = sym("D").apply([Term::abst("x", None, Term::meta("F", Vec::from([Term::bvar(0)])))]);
        let rhs = Term::meta("F", Vec::from([sym("zero")]));
        let arg = Term::abst("y", Some(sym("Nat")), sym("succ").apply([Term::bvar(0)]));
        let mut cmds = peano();
        cmds.extend([
            decl("D", ty),
            rule("d", lhs, rhs),
            conv(sym("D").apply([arg]), sym("succ").apply([sym("zero")]), true),
        ]);
        let (msgs, result) = run(cmds);
        assert!(result.is_ok());
        assert_eq!(msgs.last().unwrap().severity, Severity::Ok);
    }

    #[test]
    fn non_linear() {
        let nat = sym("Nat");
        let eq = |x: Term, y: Term| sym("eq").apply([x, y]);
        let mut cmds = peano();
        cmds.extend([
            decl("Bool", Term::Type),
            decl("true", sym("Bool")),
            decl("eq", Term::arrow(nat.clone(), Term::arrow(nat, sym("Bool")))),
            rule("refl", eq(meta("x"), meta("x")), sym("true")),
            conv(eq(sym("zero"), sym("zero")), sym("true"), true),
            conv(eq(sym("zero"), sym("succ").apply([sym("zero")])), sym("true"), false),
        ]);
        let (msgs, result) = run(cmds);
        assert!(result.is_ok());
        let n = msgs.len();
        assert_eq!(severities(&msgs[n - 2..]), [Severity::Ok, Severity::Ok]);
    }

    #[test]
    fn constant_and_injective() {
        let nat = sym("Nat");
        let ty = Term::arrow(nat.clone(), nat.clone());
        let f = |tm: Term| sym("f").apply([tm]);
        let mut cmds = peano();
        cmds.extend([
            decl("f", ty.clone()),
            decl("g", ty),
            // a constant symbol is never unfolded by its rules
            rule("f_zero", f(sym("zero")), sym("zero")),
            Command::DeclConst("f".into()),
            conv(f(sym("zero")), sym("zero"), false),
            // arguments of injective symbols are compared directly
            decl("n", nat.clone()),
            decl("m", nat),
            rule("g_any", sym("g").apply([meta("x")]), sym("zero")),
            Command::DeclInj("g".into()),
            conv(sym("g").apply([sym("n")]), sym("g").apply([sym("m")]), false),
        ]);
        let (msgs, result) = run(cmds);
        assert!(result.is_ok());
        assert!(severities(&msgs).iter().all(|s| *s == Severity::Ok));
        assert_eq!(msgs[6].body, "`f`");
        assert_eq!(msgs[11].body, "`g` (no check)");
    }

    #[test]
    fn theorems() {
        let a = sym("A");
        let thm = Decl::theorem("thm", a.clone(), None);
        let cmds = [
            decl("A", Term::Type),
            decl("a", a),
            Command::Decl(thm),
            rule("proof", sym("thm"), sym("a")),
        ];
        let (msgs, result) = run(cmds.clone());
        assert!(result.is_ok());
        assert_eq!(msgs[2].title, "Proof required");
        assert_eq!(msgs[3].title, "Theorem proven");
        assert_eq!(msgs[3].body, "`thm`");

        // without the proof, the theorem remains unproven
        let (_, result) = run(cmds.into_iter().take(3));
        let err = result.unwrap_err();
        assert!(matches!(err.error, crate::Error::GCtx(gctx::Error::Unproven(..))));
        assert_eq!(err.to_string(), "[Proof] No proof [thm] was provided for theorem: A");
    }

    #[test]
    fn wrong_proof() {
        let a = sym("A");
        let cmds = [
            decl("A", Term::Type),
            Command::Decl(Decl::theorem("thm", a, None)),
            rule("proof", sym("thm"), sym("A")),
        ];
        let (_, result) = run(cmds);
        let err = result.unwrap_err();
        assert!(matches!(err.error, crate::Error::Typing(typing::Error::Unconvertible { .. })));
        assert_eq!(err.trail.line(), Some(3));
    }

    #[test]
    fn require() {
        let mut modules: BTreeMap<String, _> = BTreeMap::new();
        let a = sym("A");
        modules.insert("base".into(), instrs([decl("A", Term::Type), decl("a", a)]));
        let require = |alias: Option<&str>| Command::Require {
            module: "base".into(),
            alias: alias.map(|a| a.into()),
        };
        let check = Command::CheckType {
            ctx: Ctx::new(),
            term: sym("a"),
            ty: sym("A"),
        };
        let mut session = Session::new();
        let check_b = Command::CheckType {
            ctx: Ctx::new(),
            term: sym("b.a"),
            ty: sym("b.A"),
        };
        let cmds = [require(Some("b")), check_b, check.clone()];
        let (msgs, result) = run_with(&mut session, cmds, &mut modules);
        assert!(session.gc.contains("b.A"));
        assert_eq!(msgs[0].to_string(), "In module [base]\nline:1: [Symbol declared] `b.A` with type Type");
        assert_eq!(msgs[2].to_string(), "line:1: [Require] Module [base] successfully loaded.");
        assert_eq!(msgs[3].to_string(), "line:2: [CheckType] b.a has indeed type b.A\n[CONTEXT]\n");
        // symbols of required modules are only visible under their namespace
        let err = result.unwrap_err();
        assert_eq!(err.trail.line(), Some(3));
        assert!(matches!(err.error, crate::Error::Typing(typing::Error::TypeNotFound(..))));

        let (_, result) = run_with(&mut Session::new(), [require(None), check], &mut modules);
        assert!(result.is_ok());

        // requiring without loader fails
        let (_, result) = run([require(None)]);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "line:1: [Require] Current setup does not support `#REQUIRE`.");
    }

    #[test]
    fn cyclic_require() {
        let require = |m: &str| Command::Require {
            module: m.into(),
            alias: None,
        };
        let mut modules: BTreeMap<String, _> = BTreeMap::new();
        modules.insert("a".into(), instrs([require("b")]));
        modules.insert("b".into(), instrs([require("a")]));
        let (_, result) = run_with(&mut Session::new(), [require("a")], modules);
        let err = result.unwrap_err();
        assert!(matches!(err.error, crate::Error::Load(load::Error::Cyclic(_))));
        let expected = "In module [a]\nIn module [b]\nline:1: [Require] ";
        assert!(err.to_string().starts_with(expected));
    }

    #[test]
    fn joker_annotation() {
        let joker = Term::abst("x", Some(Term::Joker), Term::bvar(0));
        let typed = Term::abst("x", Some(sym("A")), Term::bvar(0));
        let cmds = [decl("A", Term::Type), conv(joker, typed, true)];
        let body = "x => #0 is indeed convertible with (x : A) => #0";

        let (msgs, result) = run(cmds.clone());
        assert!(result.is_ok());
        assert_eq!(msgs[1].severity, Severity::Ok);
        assert!(msgs[1].body.starts_with(body));

        // the same instructions behave alike inside a module
        let mut modules: BTreeMap<String, _> = BTreeMap::new();
        modules.insert("m".into(), instrs(cmds));
        let require = Command::Require {
            module: "m".into(),
            alias: Some("M".into()),
        };
        let (msgs, result) = run_with(&mut Session::new(), [require], modules);
        assert!(result.is_ok());
        assert_eq!(severities(&msgs), [Severity::Ok; 3]);
        assert!(msgs[1].body.starts_with("x => #0 is indeed convertible with (x : M.A) => #0"));
    }

    #[test]
    fn first_match() {
        let nat = sym("Nat");
        let f = |tm: Term| sym("f").apply([tm]);
        let mut cmds = peano();
        cmds.extend([
            decl("f", Term::arrow(nat.clone(), nat)),
            rule("f_zero", f(sym("zero")), sym("zero")),
            rule("f_any", f(meta("x")), sym("succ").apply([sym("zero")])),
            conv(f(sym("zero")), sym("zero"), true),
        ]);
        let (msgs, result) = run(cmds);
        assert!(result.is_ok());
        assert_eq!(msgs.last().unwrap().severity, Severity::Ok);
    }

    #[test]
    fn dtree() {
        let mut cmds = plus();
        let s = |tm: Term| sym("succ").apply([tm]);
        cmds.push(conv(sym("plus").apply([s(sym("zero")), sym("zero")]), s(sym("zero")), true));
        cmds.push(Command::DTree("plus".into()));
        let (msgs, result) = run(cmds);
        assert!(result.is_ok());
        let body = &msgs.last().unwrap().body;
        assert!(body.starts_with("Decision tree for symbol `plus`:\nCount arguments:\n"));
        assert!(body.contains("> Fire rule `plus_s`"));
    }

    #[test]
    fn debug_toggle() {
        let before = log::max_level();
        let (msgs, result) = run([Command::DebugOn, Command::Clock, Command::DebugOff]);
        assert!(result.is_ok());
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].title, "Time");
        assert_eq!(log::max_level(), before);
    }
}

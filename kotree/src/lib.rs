#![no_std]
#![forbid(unsafe_code)]

//! Type checking for the lambda-Pi calculus modulo rewriting.
//!
//! This is a checking kernel that rewrites terms with the help of
//! decision trees compiled from the rewrite rules of every symbol.
//!
//! # Usage
//!
//! Users communicate with the kernel using *instructions*.
//! An instruction either
//! introduces a new symbol (by declaration, definition, or theorem),
//! adds a rewrite rule,
//! changes properties of a symbol (making it constant or injective),
//! requires another module, or
//! queries the current state, such as
//! inferring the type of a term or checking whether two terms are convertible.
//! The state of a checking session consists of
//! a global context [`GCtx`], recording types and rewrite rules attached to symbols.
//!
//! How is an instruction processed?
//! First, the names in the instruction are scoped into the current namespace.
//! Then, introduced symbols are type checked before they are added to the global context,
//! and rewrite rules are compiled to decision trees.
//! Every instruction yields at most one [`Message`],
//! and the first failing instruction stops the session with an [`Error`]
//! located at the instruction that caused it.
//!
//! The following example declares natural numbers with addition,
//! then checks that `1 + 1` is convertible with `2`.
//! (By the way, this example, just as all other code examples in this library,
//! can be executed by running `cargo test`.)
//!
//! ~~~
//! # use kotree::{Command, Ctx, Decl, Instruction, Located, Session, Severity, Term};
//! # use kotree::load::NoLoad;
//! let nat = Term::symb("nat");
//! let (zero, succ, plus) = (Term::symb("zero"), Term::symb("succ"), Term::symb("plus"));
//! let (x, y) = (Term::meta("x", Vec::new()), Term::meta("y", Vec::new()));
//! let one = succ.clone().apply([zero.clone()]);
//! let two = succ.clone().apply([one.clone()]);
//!
//! let cmds = [
//!     // declarations
//!     Command::Decl(Decl::constant("nat", Term::Type)),
//!     Command::Decl(Decl::constant("zero", nat.clone())),
//!     Command::Decl(Decl::constant("succ", Term::arrow(nat.clone(), nat.clone()))),
//!     Command::Decl(Decl::declare("plus", Term::arrow(nat.clone(), Term::arrow(nat.clone(), nat)))),
//!
//!     // rewrite rules
//!     Command::Rule {
//!         name: "plus_zero".into(),
//!         lhs: plus.clone().apply([zero, y.clone()]),
//!         rhs: y.clone(),
//!     },
//!     Command::Rule {
//!         name: "plus_succ".into(),
//!         lhs: plus.clone().apply([succ.clone().apply([x.clone()]), y.clone()]),
//!         rhs: succ.apply([plus.clone().apply([x, y])]),
//!     },
//!
//!     // query
//!     Command::CheckConv {
//!         ctx: Ctx::new(),
//!         lhs: plus.apply([one.clone(), one]),
//!         rhs: two,
//!         convertible: true,
//!     },
//! ];
//! let instrs = cmds.into_iter().enumerate().map(|(i, c)| Instruction::new(i + 1, c));
//!
//! let mut msgs = Vec::new();
//! Session::new().run(instrs, NoLoad, |msg| msgs.push(msg))?;
//! assert!(msgs.iter().all(|msg| msg.severity == Severity::Ok));
//! # Ok::<_, Located>(())
//! ~~~
//!
//! # Organisation
//!
//! Terms use De Bruijn indices for bound variables and
//! shared pointers for their compound parts.
//! The library is divided into several layers:
//! * terms, substitution, and syntactic equality,
//! * rewrite rules and their compilation to decision trees ([`dtree`]),
//! * reduction to weak head normal form and convertibility checking,
//! * type inference and checking ([`typing`]), and
//! * sessions processing instructions ([`Session`]).

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;
#[macro_use]
extern crate log;

mod convertible;
mod ctx;
pub mod dtree;
mod equal;
pub mod error;
pub mod gctx;
mod instr;
pub mod load;
mod matching;
pub mod message;
pub mod pattern;
mod reduce;
pub mod rule;
pub mod scope;
pub mod session;
mod subst;
mod symbol;
mod term;
pub mod typing;

pub use ctx::Ctx;
pub use error::{Error, Located};
pub use gctx::GCtx;
pub use instr::{Command, Decl, Instruction};
pub use message::{Message, Severity};
pub use pattern::Miller;
pub use rule::Rule;
pub use session::Session;
pub use symbol::Symbol;
pub use term::{Comb, DeBruijn, Name, Term};

use criterion::{criterion_group, criterion_main, Criterion};
use kotree::load::NoLoad;
use kotree::{Command, Ctx, Decl, Instruction, Located, Session, Term};

fn check(cmds: Vec<Command>) -> Result<(), Located> {
    let instrs = cmds.into_iter().enumerate();
    let instrs = instrs.map(|(i, c)| Instruction::new(i + 1, c));
    Session::new().run(instrs, NoLoad, |_| ())
}

fn symb(s: &str) -> Term {
    Term::symb(s)
}

fn meta(s: &str) -> Term {
    Term::meta(s, Vec::new())
}

fn succ(tm: Term) -> Term {
    symb("succ").apply([tm])
}

fn num(n: usize) -> Term {
    (0..n).fold(symb("zero"), |acc, _| succ(acc))
}

fn rule(name: &str, lhs: Term, rhs: Term) -> Command {
    let name = name.into();
    Command::Rule { name, lhs, rhs }
}

/// Natural numbers with addition, multiplication, and Fibonacci numbers.
fn nat() -> Vec<Command> {
    let nat = symb("nat");
    let un = Term::arrow(nat.clone(), nat.clone());
    let bin = Term::arrow(nat.clone(), un.clone());
    let app = |f: &str, args: Vec<Term>| symb(f).apply(args);
    let (x, y) = (meta("x"), meta("y"));
    Vec::from([
        Command::Decl(Decl::constant("nat", Term::Type)),
        Command::Decl(Decl::constant("zero", nat)),
        Command::Decl(Decl::constant("succ", un.clone())),
        Command::Decl(Decl::declare("plus", bin.clone())),
        Command::Decl(Decl::declare("mul", bin)),
        Command::Decl(Decl::declare("fib", un)),
        rule("plus_0", app("plus", vec![num(0), y.clone()]), y.clone()),
        rule(
            "plus_s",
            app("plus", vec![succ(x.clone()), y.clone()]),
            succ(app("plus", vec![x.clone(), y.clone()])),
        ),
        rule("mul_0", app("mul", vec![num(0), y.clone()]), num(0)),
        rule(
            "mul_s",
            app("mul", vec![succ(x.clone()), y.clone()]),
            app("plus", vec![y.clone(), app("mul", vec![x.clone(), y])]),
        ),
        rule("fib_0", app("fib", vec![num(0)]), num(0)),
        rule("fib_1", app("fib", vec![num(1)]), num(1)),
        rule(
            "fib_ss",
            app("fib", vec![succ(succ(x.clone()))]),
            app(
                "plus",
                vec![app("fib", vec![succ(x.clone())]), app("fib", vec![x])],
            ),
        ),
    ])
}

/// Check that `fib (2 * 4) = fib (4 * 2)` holds by computation.
fn fib8() -> Vec<Command> {
    let mul = |m, n| symb("mul").apply([num(m), num(n)]);
    let fib = |tm: Term| symb("fib").apply([tm]);
    let conv = Command::CheckConv {
        ctx: Ctx::new(),
        lhs: fib(mul(2, 4)),
        rhs: fib(mul(4, 2)),
        convertible: true,
    };
    [nat(), Vec::from([conv])].concat()
}

fn eval_fib(n: usize) -> Vec<Command> {
    let eval = Command::Eval {
        ctx: Ctx::new(),
        term: symb("fib").apply([num(n)]),
    };
    [nat(), Vec::from([eval])].concat()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let fib8 = fib8();
    let fib10 = eval_fib(10);
    let nat = nat();

    c.bench_function("nat", |b| b.iter(|| check(nat.clone()).unwrap()));
    c.bench_function("fib8", |b| b.iter(|| check(fib8.clone()).unwrap()));
    c.bench_function("fib10", |b| b.iter(|| check(fib10.clone()).unwrap()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

//! Decision trees for rewrite rules.
//!
//! A decision tree is compiled from a sequence of rules sharing the same head symbol.
//! It decides, given a stack of arguments applied to the head symbol,
//! which rule is the first to match the arguments.
//! To do so, it inspects the arguments ("columns") one after the other,
//! branching on their head shape, until only meta-variables remain to be matched.
//!
//! The compilation scheme follows the classical one for ML-style pattern matching,
//! extended with abstractions and higher-order meta-variables.
//!
//! Reference:
//! Luc Maranget:
//! Compiling pattern matching to good decision trees.
//! ML 2008: 35-46.
//! doi: [10.1145/1411304.1411311](https://doi.org/10.1145/1411304.1411311)

use crate::pattern::{self, Miller};
use crate::term::{Comb, DeBruijn, Term};
use crate::{Rule, Symbol};
use alloc::{boxed::Box, collections::BTreeMap, rc::Rc, string::String, vec, vec::Vec};
use core::fmt::{self, Display};
use core::iter::repeat;

/// Decision tree for rules applied to a given number of arguments.
#[derive(Debug)]
pub struct DTree {
    /// number of arguments inspected by the tree
    pub arity: usize,
    pub tree: Node,
}

#[derive(Debug)]
pub enum Node {
    Switch(Box<Switch>),
    Test(Box<Test>),
    Fail,
}

/// Branch on the head shape of a column.
#[derive(Debug)]
pub struct Switch {
    /// column to inspect
    pub index: usize,
    pub abst: Option<Node>,
    /// branches for bound variables applied to some number of arguments
    pub bvar: BTreeMap<(DeBruijn, usize), Node>,
    /// branches for symbols applied to some number of arguments
    pub symb: BTreeMap<(Symbol, usize), Node>,
    /// taken if no other branch applies
    pub default: Node,
}

/// Bind meta-variables to columns, then fire a rule.
#[derive(Debug)]
pub struct Test {
    pub matches: Vec<MetaMatch>,
    pub rule: Rc<Rule>,
    /// taken if the meta-variables cannot be bound
    pub default: Node,
}

/// Binding of a meta-variable `name[args]` to a column.
#[derive(Debug)]
pub struct MetaMatch {
    /// column that the meta-variable is bound to
    pub index: usize,
    pub name: Miller,
    /// for every variable bound in the pattern, its position in `args`
    pub subst: Vec<Option<usize>>,
    /// number of variables bound in the pattern around the column
    pub depth: usize,
    pub args: Vec<Term>,
    /// true if `args` are all variables bound in the pattern, in order
    pub joker: bool,
}

/// Errors occurring during decision tree compilation.
#[derive(Clone, Debug)]
pub enum Error {
    NoRules,
    HeadMismatch(Symbol, Symbol),
    /// a rule has more arguments than the tree inspects
    ArityTooSmall(String, usize),
    Pattern(pattern::Error),
    /// a pattern that no term in weak head normal form could match
    Unmatchable(Term),
}

impl From<pattern::Error> for Error {
    fn from(err: pattern::Error) -> Self {
        Self::Pattern(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoRules => write!(f, "Cannot compute decision tree for an empty set of rules."),
            Self::HeadMismatch(s1, s2) => {
                write!(f, "Head symbol mismatch found: [{}] != [{}].", s1, s2)
            }
            Self::ArityTooSmall(rule, arity) => {
                write!(f, "Rule `{}` has more than {} arguments.", rule, arity)
            }
            Self::Pattern(e) => e.fmt(f),
            Self::Unmatchable(tm) => write!(f, "Pattern can never be matched: {}", tm),
        }
    }
}

/// Head shape of a pattern.
#[derive(Clone, PartialEq, Eq)]
enum Key {
    Abst,
    BVar(DeBruijn, usize),
    Symb(Symbol, usize),
}

/// Return the head shape of a pattern along with the new columns it yields,
/// or `None` if the pattern is a meta-variable.
fn split(pat: &Term) -> Result<Option<(Key, Vec<Term>)>, Error> {
    if pat.is_meta() {
        return Ok(None);
    }
    if let Some(Comb::Abst(_, _, body)) = pat.get_comb() {
        return Ok(Some((Key::Abst, Vec::from([body.clone()]))));
    }
    let (head, args) = pat.get_head();
    let key = match head {
        Term::BVar(x, _) => Key::BVar(x, args.len()),
        Term::Symb(s) => Key::Symb(s, args.len()),
        _ => return Err(Error::Unmatchable(pat.clone())),
    };
    Ok(Some((key, args)))
}

struct Row {
    cols: Vec<Term>,
    rule: Rc<Rule>,
}

/// Pattern matrix, where every column has a depth,
/// namely the number of variables bound in the pattern around it.
struct Matrix {
    rows: Vec<Row>,
    depths: Vec<usize>,
}

impl Row {
    fn matches(&self, depths: &[usize]) -> Result<Vec<MetaMatch>, Error> {
        let mut matches = Vec::new();
        for (index, (col, depth)) in self.cols.iter().zip(depths).enumerate() {
            if let Some(Comb::MVar(Some(name), args)) = col.get_comb() {
                matches.push(MetaMatch {
                    index,
                    name: name.clone(),
                    subst: pattern::locals(args, *depth)?,
                    depth: *depth,
                    args: args.clone(),
                    joker: pattern::is_identity(args, *depth),
                })
            }
        }
        Ok(matches)
    }
}

impl Matrix {
    fn compile(self) -> Result<Node, Error> {
        let first = match self.rows.first() {
            None => return Ok(Node::Fail),
            Some(first) => first,
        };
        match first.cols.iter().position(|p| !p.is_meta()) {
            Some(j) => self.switch(j),
            None => {
                let matches = first.matches(&self.depths)?;
                let mut rows = self.rows.into_iter();
                let rule = rows.next().map(|row| row.rule);
                let rows = rows.collect();
                let default = Self { rows, depths: self.depths }.compile()?;
                Ok(match rule {
                    Some(rule) => Node::Test(Box::new(Test {
                        matches,
                        rule,
                        default,
                    })),
                    None => Node::Fail,
                })
            }
        }
    }

    fn switch(&self, j: usize) -> Result<Node, Error> {
        let mut sw = Switch {
            index: j,
            abst: None,
            bvar: BTreeMap::new(),
            symb: BTreeMap::new(),
            default: Node::Fail,
        };
        let mut meta = false;
        for row in &self.rows {
            match split(&row.cols[j])? {
                None => meta = true,
                Some((Key::Abst, _)) => {
                    if sw.abst.is_none() {
                        sw.abst = Some(self.specialize(j, &Key::Abst)?)
                    }
                }
                Some((Key::BVar(x, n), _)) => {
                    if !sw.bvar.contains_key(&(x, n)) {
                        let node = self.specialize(j, &Key::BVar(x, n))?;
                        sw.bvar.insert((x, n), node);
                    }
                }
                Some((Key::Symb(s, n), _)) => {
                    if !sw.symb.contains_key(&(s.clone(), n)) {
                        let node = self.specialize(j, &Key::Symb(s.clone(), n))?;
                        sw.symb.insert((s, n), node);
                    }
                }
            }
        }
        if meta {
            let rows = self.rows.iter().filter(|row| row.cols[j].is_meta());
            let rows = rows.map(|row| Row {
                cols: row.cols.clone(),
                rule: row.rule.clone(),
            });
            let depths = self.depths.clone();
            let rows = rows.collect();
            sw.default = Self { rows, depths }.compile()?;
        }
        Ok(Node::Switch(Box::new(sw)))
    }

    /// Compile the rows compatible with the given key at column `j`.
    ///
    /// Rows matching the key have their column `j` replaced by a joker and
    /// the subpatterns of the column appended, whereas
    /// rows with a meta-variable at column `j` are padded with jokers.
    fn specialize(&self, j: usize, key: &Key) -> Result<Node, Error> {
        let (extra, depth) = match key {
            Key::Abst => (1, self.depths[j] + 1),
            Key::BVar(_, n) | Key::Symb(_, n) => (*n, self.depths[j]),
        };
        let mut rows = Vec::new();
        for row in &self.rows {
            let cols = match split(&row.cols[j])? {
                None => {
                    let mut cols = row.cols.clone();
                    cols.extend(repeat(Term::Joker).take(extra));
                    cols
                }
                Some((k, sub)) if k == *key => {
                    let mut cols = row.cols.clone();
                    cols[j] = Term::Joker;
                    cols.extend(sub);
                    cols
                }
                Some(_) => continue,
            };
            let rule = row.rule.clone();
            rows.push(Row { cols, rule })
        }
        let mut depths = self.depths.clone();
        depths.extend(repeat(depth).take(extra));
        Self { rows, depths }.compile()
    }
}

impl DTree {
    /// Compile rules sharing the same head symbol to a decision tree
    /// that inspects `arity` arguments.
    ///
    /// The rules are tried in the given order.
    ///
    /// ~~~
    /// # use kotree::{dtree::DTree, Rule, Term};
    /// # use std::rc::Rc;
    /// let (zero, succ) = (Term::symb("zero"), Term::symb("succ"));
    /// let x = || Term::meta("x", Vec::new());
    /// let rules = [
    ///     Rule::new("even_zero".into(), Term::symb("even").apply([zero]), Term::symb("true"))?,
    ///     Rule::new("even_other".into(), Term::symb("even").apply([x()]), Term::symb("false"))?,
    /// ];
    /// let rules: Vec<_> = rules.into_iter().map(Rc::new).collect();
    /// let tree = DTree::compile(&rules, 1)?;
    /// assert_eq!(tree.to_string(), "\
    /// Look stack[0]:
    /// Case [zero](0 args):
    ///   Match:
    ///   > Fire rule `even_zero`: true
    ///   Default:
    ///     Match:
    ///     x[] = stack[0]
    ///     > Fire rule `even_other`: false
    ///     Default:
    ///       Fail
    /// Default:
    ///   Match:
    ///   x[] = stack[0]
    ///   > Fire rule `even_other`: false
    ///   Default:
    ///     Fail
    /// ");
    /// assert!(DTree::compile(&rules, 0).is_err());
    /// # Ok::<_, kotree::Error>(())
    /// ~~~
    pub fn compile(rules: &[Rc<Rule>], arity: usize) -> Result<Self, Error> {
        let head = &rules.first().ok_or(Error::NoRules)?.head;
        let mut rows = Vec::new();
        for rule in rules {
            if rule.head != *head {
                return Err(Error::HeadMismatch(rule.head.clone(), head.clone()));
            }
            let pad = arity
                .checked_sub(rule.stack.len())
                .ok_or_else(|| Error::ArityTooSmall(rule.name.clone(), arity))?;
            let cols = repeat(Term::Joker).take(pad).chain(rule.stack.iter().cloned());
            let cols = cols.collect();
            let rule = rule.clone();
            rows.push(Row { cols, rule })
        }
        let depths = vec![0; arity];
        let tree = Matrix { rows, depths }.compile()?;
        Ok(Self { arity, tree })
    }
}

struct Indent(usize);

impl Display for Indent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (0..self.0).try_for_each(|_| write!(f, "  "))
    }
}

impl Node {
    fn pp(&self, f: &mut fmt::Formatter, t: usize) -> fmt::Result {
        let i = Indent(t);
        match self {
            Self::Fail => return writeln!(f, "{}Fail", i),
            Self::Switch(sw) => {
                writeln!(f, "{}Look stack[{}]:", i, sw.index)?;
                if let Some(abst) = &sw.abst {
                    writeln!(f, "{}Case Lam:", i)?;
                    abst.pp(f, t + 1)?;
                }
                for ((s, n), node) in &sw.symb {
                    writeln!(f, "{}Case [{}]({} args):", i, s, n)?;
                    node.pp(f, t + 1)?;
                }
                for ((x, n), node) in &sw.bvar {
                    writeln!(f, "{}Case #{}({} args):", i, x, n)?;
                    node.pp(f, t + 1)?;
                }
            }
            Self::Test(test) => {
                writeln!(f, "{}Match:", i)?;
                for m in &test.matches {
                    write!(f, "{}{}[", i, m.name)?;
                    for (j, a) in m.args.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", a)?;
                    }
                    writeln!(f, "] = stack[{}]", m.index)?;
                }
                writeln!(f, "{}> Fire rule `{}`: {}", i, test.rule.name, test.rule.rhs)?;
            }
        }
        writeln!(f, "{}Default:", i)?;
        self.default().pp(f, t + 1)
    }

    fn default(&self) -> &Self {
        match self {
            Self::Switch(sw) => &sw.default,
            Self::Test(test) => &test.default,
            Self::Fail => self,
        }
    }
}

impl Display for DTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.tree.pp(f, 0)
    }
}

/// Decision trees of a symbol, indexed by their number of arguments.
///
/// A tree is `None` if it was not computed yet, and
/// `Some(None)` if there are no rules for its number of arguments.
pub struct Forest<'a>(pub Vec<Option<Option<&'a DTree>>>);

impl<'a> Display for Forest<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Count arguments:")?;
        for (i, tree) in self.0.iter().enumerate() {
            writeln!(f, "Case {}:", i)?;
            match tree {
                None => writeln!(f, "  not computed yet...")?,
                Some(None) => writeln!(f, "  Fail")?,
                Some(Some(tree)) => tree.tree.pp(f, 1)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GCtx;

    fn rule(name: &str, lhs: Term, rhs: Term) -> Rc<Rule> {
        Rc::new(Rule::new(name.into(), lhs, rhs).unwrap())
    }

    fn mvar(name: &str, args: &[usize]) -> Term {
        Term::meta(name, args.iter().map(|x| Term::bvar(*x)).collect())
    }

    #[test]
    fn abstraction() {
        // f (x => g x) --> a, f (x => Y[x]) --> Y[a]
        let (f, g, a) = (Term::symb("f"), Term::symb("g"), Term::symb("a"));
        let lam_g = Term::abst("x", None, g.apply([Term::bvar(0)]));
        let lam_y = Term::abst("x", None, mvar("Y", &[0]));
        let rules = [
            rule("r1", f.clone().apply([lam_g]), a.clone()),
            rule("r2", f.apply([lam_y]), Term::meta("Y", Vec::from([a]))),
        ];
        let tree = DTree::compile(&rules, 1).unwrap();
        let sw = match &tree.tree {
            Node::Switch(sw) => sw,
            _ => panic!("switch expected"),
        };
        assert!(matches!(sw.default, Node::Fail));
        let sw = match &sw.abst {
            Some(Node::Switch(sw)) => sw,
            _ => panic!("switch under abstraction expected"),
        };
        // the abstraction body is in column 1, living under one binder
        assert_eq!(sw.index, 1);
        let g_branch = &sw.symb[&(Symbol::new("g"), 1)];
        let sw_g = match g_branch {
            Node::Switch(sw_g) => sw_g,
            _ => panic!("switch on argument of g expected"),
        };
        assert_eq!(sw_g.index, 2);
        assert!(sw_g.bvar.contains_key(&(0, 0)));
        match &sw.default {
            Node::Test(test) => {
                assert_eq!(test.rule.name, "r2");
                assert_eq!(test.matches.len(), 1);
                assert_eq!(test.matches[0].index, 1);
                assert_eq!(test.matches[0].depth, 1);
                assert!(test.matches[0].joker);
            }
            _ => panic!("test expected"),
        }
    }

    #[test]
    fn miller_violation() {
        // f (x => Y[x, x]) is not a Miller pattern
        let lhs = Term::symb("f").apply([Term::abst("x", None, mvar("Y", &[0, 0]))]);
        let rules = [rule("r", lhs, Term::Type)];
        let err = DTree::compile(&rules, 1);
        assert!(matches!(err, Err(Error::Pattern(pattern::Error::Repeated(_)))));
    }

    #[test]
    fn unmatchable() {
        let rules = [rule("r", Term::symb("f").apply([Term::Type]), Term::Type)];
        assert!(matches!(DTree::compile(&rules, 1), Err(Error::Unmatchable(_))));
    }

    #[test]
    fn configuration() {
        assert!(matches!(DTree::compile(&[], 0), Err(Error::NoRules)));
        let rules = [
            rule("r1", Term::symb("f"), Term::Type),
            rule("r2", Term::symb("g"), Term::Type),
        ];
        assert!(matches!(DTree::compile(&rules, 0), Err(Error::HeadMismatch(..))));
    }

    #[test]
    fn deterministic() {
        // f zero Y --> Y, f (s X) Y --> s (f X Y), f X zero --> X
        let (f, s) = (Term::symb("f"), Term::symb("s"));
        let (zero, a) = (Term::symb("zero"), Term::symb("a"));
        let succ = |tm: Term| s.clone().apply([tm]);
        let (x, y) = (mvar("X", &[]), mvar("Y", &[]));
        let rules = [
            rule("r1", f.clone().apply([zero.clone(), y.clone()]), y.clone()),
            rule(
                "r2",
                f.clone().apply([succ(x.clone()), y.clone()]),
                succ(f.clone().apply([x.clone(), y])),
            ),
            rule("r3", f.clone().apply([x.clone(), zero.clone()]), x),
        ];
        // arguments in application order, the last one at the bottom of the stack
        let stacks = [
            ([zero.clone(), a.clone()], Some("r1")),
            ([succ(a.clone()), zero.clone()], Some("r2")),
            ([a.clone(), zero.clone()], Some("r3")),
            ([a.clone(), Term::symb("b")], None),
            ([succ(zero.clone()), succ(zero.clone())], Some("r2")),
        ];
        let gc = GCtx::new();
        let (t1, t2) = (DTree::compile(&rules, 2).unwrap(), DTree::compile(&rules, 2).unwrap());
        for (args, expected) in stacks {
            let cols: Vec<_> = args.into_iter().rev().collect();
            let found1 = t1.find(cols.clone(), &gc);
            let found2 = t2.find(cols, &gc);
            let fired = |found: &Option<(Rc<Rule>, _)>| found.as_ref().map(|(r, _)| r.name.clone());
            assert_eq!(fired(&found1).as_deref(), expected);
            assert_eq!(fired(&found1), fired(&found2));
            if let (Some((r1, b1)), Some((r2, b2))) = (found1, found2) {
                assert_eq!(r1.instantiate(&b1), r2.instantiate(&b2));
            }
        }
    }

    #[test]
    fn right_aligned() {
        // rules with fewer arguments are padded on the low-index side
        let (f, a) = (Term::symb("f"), Term::symb("a"));
        let rules = [rule("r", f.apply([a]), Term::Type)];
        let tree = DTree::compile(&rules, 3).unwrap();
        match &tree.tree {
            Node::Switch(sw) => assert_eq!(sw.index, 2),
            _ => panic!("switch expected"),
        }
    }
}

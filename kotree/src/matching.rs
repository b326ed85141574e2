//! Matching of terms against decision trees.

use crate::dtree::{DTree, MetaMatch, Node, Switch, Test};
use crate::pattern::Miller;
use crate::term::{Comb, Term};
use crate::{GCtx, Rule, Symbol};
use alloc::{collections::BTreeMap, rc::Rc, vec::Vec};

/// Term bound to a meta-variable `X[x_1, ..., x_m]`.
#[derive(Clone, Debug)]
pub struct Binding {
    /// matched term, possibly containing variables bound in the pattern
    term: Term,
    /// number of variables bound in the pattern around the term
    depth: usize,
    /// for every variable bound in the pattern, its position among `x_1, ..., x_m`
    subst: Vec<Option<usize>>,
}

pub type Bindings = BTreeMap<Miller, Binding>;

impl Binding {
    fn new(m: &MetaMatch, term: Term) -> Self {
        let (depth, subst) = (m.depth, m.subst.clone());
        Self { term, depth, subst }
    }

    /// Return true if the term only depends on pattern variables among `x_1, ..., x_m`.
    fn is_valid(&self) -> bool {
        let mut valid = true;
        self.term.clone().apply_subst(
            &mut |n, k, name| {
                let loc = n - k;
                if loc < self.depth && self.subst[loc].is_none() {
                    valid = false
                }
                Term::BVar(n, name.clone())
            },
            0,
        );
        valid
    }

    /// Instantiate `X[args]` under `c` binders of the right-hand side.
    pub fn instantiate(&self, args: &[Term], c: usize) -> Term {
        if self.depth == 0 {
            return self.term.clone() << c;
        }
        self.term.clone().apply_subst(
            &mut |n, k, name| {
                let loc = n - k;
                if loc < self.depth {
                    match self.subst[loc].and_then(|i| args.get(i)) {
                        Some(arg) => arg.clone() << k,
                        None => Term::BVar(n, name.clone()),
                    }
                } else {
                    Term::BVar(loc - self.depth + c + k, name.clone())
                }
            },
            0,
        )
    }

    /// Return true if two bindings of a meta-variable with `arity` arguments are convertible.
    fn convertible(&self, other: &Self, arity: usize, gc: &GCtx) -> bool {
        let args: Vec<_> = (0..arity).map(Term::bvar).collect();
        let tm1 = self.instantiate(&args, arity);
        let tm2 = other.instantiate(&args, arity);
        Term::convertible(tm1, tm2, gc)
    }
}

impl Switch {
    /// Return the branch for a column in weak head normal form,
    /// together with the new columns that the branch inspects.
    fn branch(&self, col: &Term) -> Option<(&Node, Vec<Term>)> {
        if let Some(Comb::Abst(_, _, body)) = col.get_comb() {
            return Some((self.abst.as_ref()?, Vec::from([body.clone()])));
        }
        let (head, args) = col.get_head();
        let node = match head {
            Term::BVar(x, _) => self.bvar.get(&(x, args.len()))?,
            Term::Symb(s) => self.symb.get(&(s, args.len()))?,
            _ => return None,
        };
        Some((node, args))
    }
}

impl Test {
    /// Bind the meta-variables of the rule to the columns.
    fn bind(&self, cols: &[(Term, bool)], gc: &GCtx) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        for m in &self.matches {
            let mut binding = Binding::new(m, cols[m.index].0.clone());
            if !m.joker && !binding.is_valid() {
                // variables that the term should not depend on might disappear
                binding.term = binding.term.nf(gc);
                if !binding.is_valid() {
                    trace!("{} cannot depend on {}", m.name, binding.term);
                    return None;
                }
            }
            match bindings.get(&m.name) {
                Some(prev) => {
                    if !prev.convertible(&binding, m.args.len(), gc) {
                        return None;
                    }
                }
                None => {
                    bindings.insert(m.name.clone(), binding);
                }
            }
        }
        Some(bindings)
    }
}

impl DTree {
    /// Find the first rule matching the columns, together with its bindings.
    ///
    /// Columns are reduced to weak head normal form when they are inspected.
    pub fn find(&self, columns: Vec<Term>, gc: &GCtx) -> Option<(Rc<Rule>, Bindings)> {
        let mut cols: Vec<_> = columns.into_iter().map(|c| (c, false)).collect();
        let mut node = &self.tree;
        loop {
            match node {
                Node::Fail => return None,
                Node::Switch(sw) => {
                    let (col, whnfed) = &mut cols[sw.index];
                    if !*whnfed {
                        *col = col.clone().whnf(gc);
                        *whnfed = true;
                    }
                    trace!("look at stack[{}]: {}", sw.index, col);
                    node = match sw.branch(col) {
                        Some((child, sub)) => {
                            cols.extend(sub.into_iter().map(|c| (c, false)));
                            child
                        }
                        None => &sw.default,
                    };
                }
                Node::Test(test) => match test.bind(&cols, gc) {
                    Some(bindings) => return Some((test.rule.clone(), bindings)),
                    None => node = &test.default,
                },
            }
        }
    }
}

impl Rule {
    /// Replace the meta-variables of the right-hand side by their bindings.
    pub fn instantiate(&self, bindings: &Bindings) -> Term {
        if bindings.is_empty() {
            self.rhs.clone()
        } else {
            instantiate(&self.rhs, bindings, 0)
        }
    }
}

fn instantiate(tm: &Term, bindings: &Bindings, c: usize) -> Term {
    let inst = |tm: &Term, c| instantiate(tm, bindings, c);
    let comb = match tm.get_comb() {
        Some(comb) => comb,
        None => return tm.clone(),
    };
    match comb {
        Comb::Appl(f, a) => Term::appl(inst(f, c), inst(a, c)),
        Comb::Prod(id, ty, tm) => Comb::Prod(id.clone(), inst(ty, c), inst(tm, c + 1)).into(),
        Comb::Abst(id, ty, tm) => {
            let ty = ty.as_ref().map(|ty| inst(ty, c));
            Comb::Abst(id.clone(), ty, inst(tm, c + 1)).into()
        }
        Comb::MVar(m, args) => {
            let args: Vec<_> = args.iter().map(|a| inst(a, c)).collect();
            match m.as_ref().and_then(|m| bindings.get(m)) {
                Some(binding) => binding.instantiate(&args, c),
                None => Comb::MVar(m.clone(), args).into(),
            }
        }
    }
}

impl GCtx {
    /// Rewrite a symbol applied to arguments, where the last argument comes first.
    ///
    /// On success, return the instantiated right-hand side of the first matching rule
    /// as well as the number of arguments consumed by the rule.
    pub fn rewrite(&self, head: &Symbol, stack: &[Term]) -> Option<(Term, usize)> {
        let tree = self.get_tree(head.as_str(), stack.len())?;
        let columns = stack[stack.len() - tree.arity..].to_vec();
        let (rule, bindings) = tree.find(columns, self)?;
        trace!("rewrite with {}", rule);
        Some((rule.instantiate(&bindings), rule.stack.len()))
    }
}

#[test]
fn extra_arguments() {
    // f X --> g, so f a b rewrites to g b
    let mut gc = GCtx::new();
    for s in ["f", "g", "a", "b"] {
        gc.define(s.into(), Term::Type, false).unwrap();
    }
    let lhs = Term::symb("f").apply([Term::meta("X", Vec::new())]);
    gc.add_rule(Rule::new("r".into(), lhs, Term::symb("g")).unwrap()).unwrap();
    let tm = Term::symb("f").apply([Term::symb("a"), Term::symb("b")]);
    assert_eq!(tm.whnf(&gc), Term::symb("g").apply([Term::symb("b")]));
}

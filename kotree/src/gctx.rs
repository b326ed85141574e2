//! Maps from symbols to their associated types and rewrite rules.

use crate::dtree::{self, DTree, Forest};
use crate::{Rule, Symbol, Term};
use alloc::{rc::Rc, vec::Vec};
use core::cell::OnceCell;
use core::fmt;

/// Immutable HashMap for fast cloning of global contexts.
type FnvHashMap<K, V> = im::hashmap::HashMap<K, V, fnv::FnvBuildHasher>;

#[derive(Clone, Debug)]
pub enum Error {
    Reintroduction(Symbol),
    Undefined(Symbol),
    /// a theorem of the namespace was not proven, carrying the theorem's type
    Unproven(Symbol, Term),
    DTree(dtree::Error),
}

impl From<dtree::Error> for Error {
    fn from(err: dtree::Error) -> Self {
        Self::DTree(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Reintroduction(s) => write!(f, "Already defined reference: [{}].", s),
            Self::Undefined(s) => write!(f, "Undefined reference: [{}].", s),
            Self::Unproven(s, ty) => {
                write!(f, "No proof [{}] was provided for theorem: {}", s, ty)
            }
            Self::DTree(e) => e.fmt(f),
        }
    }
}

impl Error {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Reintroduction(_) | Self::Undefined(_) => "Env",
            Self::Unproven(..) => "Proof",
            Self::DTree(_) => "DTree",
        }
    }
}

/// Information about a declared symbol.
#[derive(Clone, Debug)]
pub struct Entry {
    pub ty: Term,
    /// true if the symbol is a theorem that needs to be proven
    pub obligation: bool,
    pub proven: bool,
}

/// Rewrite rules for a symbol, together with their decision trees.
#[derive(Clone, Debug, Default)]
pub struct Rewrites {
    rules: Vec<Rc<Rule>>,
    constant: bool,
    injective: bool,
    /// decision trees indexed by the number of inspected arguments,
    /// computed on demand
    trees: Vec<OnceCell<Option<Rc<DTree>>>>,
}

impl Rewrites {
    pub fn rules(&self) -> &[Rc<Rule>] {
        &self.rules
    }

    /// Return the decision tree inspecting `arity` arguments,
    /// containing all rules with at most `arity` arguments.
    fn compile(&self, arity: usize) -> Result<Option<DTree>, dtree::Error> {
        let rules = self.rules.iter().filter(|r| r.stack.len() <= arity);
        let rules: Vec<_> = rules.cloned().collect();
        if rules.is_empty() {
            return Ok(None);
        }
        DTree::compile(&rules, arity).map(Some)
    }

    /// Return the decision tree to match `nargs` arguments with.
    fn tree(&self, nargs: usize) -> Option<&Rc<DTree>> {
        let arity = nargs.min(self.trees.len().checked_sub(1)?);
        let tree = self.trees[arity].get_or_init(|| {
            debug!("compile decision tree for {} arguments", arity);
            self.compile(arity)
                .unwrap_or_else(|e| {
                    warn!("decision tree compilation failed: {}", e);
                    None
                })
                .map(Rc::new)
        });
        tree.as_ref()
    }

    /// Add a rule, compiling the decision tree for its number of arguments.
    fn push(&mut self, rule: Rule) -> Result<(), dtree::Error> {
        let arity = rule.stack.len();
        self.rules.push(Rc::new(rule));
        let tree = match self.compile(arity) {
            Ok(tree) => tree,
            Err(e) => {
                self.rules.pop();
                return Err(e);
            }
        };
        let max = self.rules.iter().map(|r| r.stack.len()).max().unwrap_or(0);
        self.trees = (0..=max).map(|_| OnceCell::new()).collect();
        self.trees[arity] = OnceCell::from(tree.map(Rc::new));
        Ok(())
    }
}

/// Map from symbols to their associated types and rewrite rules.
///
/// Furthermore, set whether convertibility should be checked modulo eta.
#[derive(Clone, Default)]
pub struct GCtx {
    symbols: FnvHashMap<Symbol, Entry>,
    rewrites: FnvHashMap<Symbol, Rewrites>,
    pub eta: bool,
}

impl GCtx {
    /// Construct an empty global context without eta modularity.
    ///
    /// ~~~
    /// # use kotree::GCtx;
    /// let gc = GCtx::new();
    /// assert!(gc.eta == false);
    /// ~~~
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, sym: &str) -> Option<&Entry> {
        self.symbols.get(sym)
    }

    /// Return the type of a symbol.
    pub fn get_type(&self, sym: &str) -> Option<&Term> {
        Some(&self.get(sym)?.ty)
    }

    pub fn contains(&self, sym: &str) -> bool {
        self.symbols.contains_key(sym)
    }

    /// Introduce a new symbol with given type.
    ///
    /// If `obligation` is set, the symbol has to be proven
    /// before the end of its namespace.
    pub fn define(&mut self, sym: Symbol, ty: Term, obligation: bool) -> Result<(), Error> {
        if self.contains(sym.as_str()) {
            return Err(Error::Reintroduction(sym));
        }
        let proven = false;
        let entry = Entry {
            ty,
            obligation,
            proven,
        };
        self.symbols.insert(sym, entry);
        Ok(())
    }

    pub fn set_proven(&mut self, sym: &Symbol) -> Result<(), Error> {
        let entry = self.symbols.get_mut(sym);
        entry.ok_or_else(|| Error::Undefined(sym.clone()))?.proven = true;
        Ok(())
    }

    /// Verify that every theorem directly inside the namespace was proven.
    ///
    /// If several theorems were not proven,
    /// report the one with the smallest name.
    pub fn all_proven(&self, namespace: &str) -> Result<(), Error> {
        let unproven = self.symbols.iter().filter(|(sym, entry)| {
            entry.obligation && !entry.proven && sym.namespace() == namespace
        });
        match unproven.min_by(|(s1, _), (s2, _)| s1.cmp(s2)) {
            Some((sym, entry)) => Err(Error::Unproven(sym.clone(), entry.ty.clone())),
            None => Ok(()),
        }
    }

    /// Prevent a symbol from being unfolded by its rewrite rules.
    ///
    /// The symbol does not have to be declared yet.
    pub fn declare_constant(&mut self, sym: Symbol) {
        let mut rw = self.rewrites.get(&sym).cloned().unwrap_or_default();
        rw.constant = true;
        self.rewrites.insert(sym, rw);
    }

    /// Allow applications of a symbol to be compared argument-wise.
    ///
    /// The symbol does not have to be declared yet.
    pub fn declare_injective(&mut self, sym: Symbol) {
        let mut rw = self.rewrites.get(&sym).cloned().unwrap_or_default();
        rw.injective = true;
        self.rewrites.insert(sym, rw);
    }

    pub fn is_constant(&self, sym: &str) -> bool {
        self.rewrites.get(sym).map_or(false, |rw| rw.constant)
    }

    pub fn is_injective(&self, sym: &str) -> bool {
        self.rewrites.get(sym).map_or(false, |rw| rw.injective)
    }

    /// Add a rewrite rule to an existing symbol.
    ///
    /// This fails if the decision tree for the rule's number of arguments
    /// cannot be compiled, in which case the global context is not changed.
    pub fn add_rule(&mut self, rule: Rule) -> Result<(), Error> {
        if !self.contains(rule.head.as_str()) {
            return Err(Error::Undefined(rule.head));
        }
        let head = rule.head.clone();
        let mut rw = self.rewrites.get(&head).cloned().unwrap_or_default();
        rw.push(rule)?;
        self.rewrites.insert(head, rw);
        Ok(())
    }

    pub fn get_rewrites(&self, sym: &str) -> Option<&Rewrites> {
        self.rewrites.get(sym)
    }

    /// Return the decision tree to rewrite a symbol applied to `nargs` arguments,
    /// unless the symbol is constant or has no rules.
    pub fn get_tree(&self, sym: &str, nargs: usize) -> Option<&Rc<DTree>> {
        let rw = self.rewrites.get(sym)?;
        if rw.constant {
            return None;
        }
        rw.tree(nargs)
    }

    /// Return the decision trees of a symbol that were computed so far.
    pub fn forest(&self, sym: &str) -> Forest<'_> {
        let trees = self.rewrites.get(sym).map_or(&[][..], |rw| &rw.trees[..]);
        let trees = trees.iter().map(|t| t.get().map(|t| t.as_deref()));
        Forest(trees.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nat() -> GCtx {
        let mut gc = GCtx::new();
        gc.define("nat".into(), Term::Type, false).unwrap();
        gc.define("f".into(), Term::symb("nat"), false).unwrap();
        gc
    }

    #[test]
    fn reintroduction() {
        let mut gc = nat();
        let err = gc.define("nat".into(), Term::Type, false);
        assert!(matches!(err, Err(Error::Reintroduction(_))));
    }

    #[test]
    fn rule_for_undefined() {
        let mut gc = nat();
        let rule = Rule::definition("g_def".into(), "g".into(), Term::symb("nat"));
        assert!(matches!(gc.add_rule(rule), Err(Error::Undefined(_))));
    }

    #[test]
    fn failed_rule_leaves_context() {
        let mut gc = nat();
        let lhs = Term::symb("f").apply([Term::Type]);
        let rule = Rule::new("bad".into(), lhs, Term::Type).unwrap();
        assert!(matches!(gc.add_rule(rule), Err(Error::DTree(_))));
        assert!(gc.get_tree("f", 1).is_none());
    }

    #[test]
    fn trees_by_arity() {
        let mut gc = nat();
        let x = || Term::meta("x", Vec::new());
        let r1 = Rule::new("r1".into(), Term::symb("f").apply([x()]), x()).unwrap();
        let r2 = Rule::new("r2".into(), Term::symb("f").apply([x(), x()]), x()).unwrap();
        gc.add_rule(r1).unwrap();
        gc.add_rule(r2).unwrap();
        let names = gc.get_rewrites("f").unwrap().rules().iter().map(|r| r.name.as_str());
        assert_eq!(names.collect::<Vec<_>>(), ["r1", "r2"]);
        assert!(gc.get_rewrites("nat").is_none());
        assert!(gc.get_tree("f", 0).is_none());
        assert_eq!(gc.get_tree("f", 1).unwrap().arity, 1);
        // trees are limited by the maximal number of rule arguments
        assert_eq!(gc.get_tree("f", 5).unwrap().arity, 2);
        gc.declare_constant("f".into());
        assert!(gc.get_tree("f", 1).is_none());
    }

    #[test]
    fn proofs() {
        let mut gc = nat();
        gc.define("a.thm2".into(), Term::symb("nat"), true).unwrap();
        gc.define("a.thm1".into(), Term::symb("nat"), true).unwrap();
        assert!(gc.all_proven("").is_ok());
        match gc.all_proven("a") {
            Err(Error::Unproven(s, _)) => assert_eq!(s.as_str(), "a.thm1"),
            _ => panic!("unproven theorem expected"),
        }
        gc.set_proven(&"a.thm1".into()).unwrap();
        gc.set_proven(&"a.thm2".into()).unwrap();
        assert!(gc.all_proven("a").is_ok());
    }
}

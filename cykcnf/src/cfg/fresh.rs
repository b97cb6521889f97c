use rustc_hash::{FxHashMap, FxHashSet};

use crate::cfg::cfg::CFG;
use crate::cfg::variable::Variable;

/// Allocator for non-terminal names that do not clash with any symbol of a grammar.
///
/// One allocator lives for exactly one normalization run, so names generated for one
/// grammar never influence the names generated for another.
#[derive(Debug, Clone, Default)]
pub struct FreshNames {
    taken: FxHashSet<String>,
    counters: FxHashMap<String, usize>,
}

impl FreshNames {
    /// Seeds the allocator with every variable and terminal name of `cfg`
    pub fn for_grammar(cfg: &CFG) -> Self {
        let taken = cfg
            .variables
            .iter()
            .map(|v| v.name.clone())
            .chain(cfg.terminals.iter().map(|t| t.name.clone()))
            .collect();
        FreshNames {
            taken,
            counters: FxHashMap::default(),
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Returns `base` if it is free, otherwise the first free `base_1`, `base_2`, ...
    pub fn fresh(&mut self, base: &str) -> Variable {
        if self.taken.insert(base.to_string()) {
            return Variable::new(base);
        }
        let mut i = 1;
        loop {
            let candidate = format!("{}_{}", base, i);
            if self.taken.insert(candidate.clone()) {
                return Variable::from_string(candidate);
            }
            i += 1;
        }
    }

    /// Returns the next free name of the sequence `prefix0`, `prefix1`, ...
    pub fn numbered(&mut self, prefix: &str) -> Variable {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        loop {
            let candidate = format!("{}{}", prefix, counter);
            *counter += 1;
            if self.taken.insert(candidate.clone()) {
                return Variable::from_string(candidate);
            }
        }
    }
}

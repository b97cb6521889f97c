#![allow(dead_code)]

use hashbrown::HashSet;
use tracing_subscriber::EnvFilter;

use cykcnf::cfg::cfg::{SymbolIndex, CFG};

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// For every variable, all terminal strings of length at most `max_len` it derives.
///
/// Brute force fixpoint over the productions, works for any CFG (epsilon, unit cycles, ...).
pub fn derivable(cfg: &CFG, max_len: usize) -> Vec<HashSet<Vec<String>>> {
    let mut sets: Vec<HashSet<Vec<String>>> = vec![HashSet::new(); cfg.variables.len()];
    let mut changed = true;
    while changed {
        changed = false;
        for (head, bodies) in cfg.productions.iter().enumerate() {
            for body in bodies {
                let mut partial: HashSet<Vec<String>> = HashSet::from([vec![]]);
                for symbol in body {
                    let mut next = HashSet::new();
                    for prefix in &partial {
                        match symbol {
                            SymbolIndex::TerminalIndex(t) => {
                                if prefix.len() < max_len {
                                    let mut word = prefix.clone();
                                    word.push(cfg.terminals[*t].name.clone());
                                    next.insert(word);
                                }
                            }
                            SymbolIndex::VariableIndex(v) => {
                                for suffix in &sets[*v] {
                                    if prefix.len() + suffix.len() <= max_len {
                                        let mut word = prefix.clone();
                                        word.extend(suffix.iter().cloned());
                                        next.insert(word);
                                    }
                                }
                            }
                        }
                    }
                    partial = next;
                }
                for word in partial {
                    changed |= sets[head].insert(word);
                }
            }
        }
    }
    sets
}

/// The words of length at most `max_len` in the language of `cfg`.
pub fn language(cfg: &CFG, max_len: usize) -> HashSet<Vec<String>> {
    let mut words = derivable(cfg, max_len).swap_remove(cfg.start_symbol);
    if cfg.accepts_empty {
        words.insert(vec![]);
    }
    words
}

/// All non-empty words over `alphabet` of length at most `max_len`.
pub fn words(alphabet: &[String], max_len: usize) -> Vec<Vec<String>> {
    let mut all = Vec::new();
    let mut layer: Vec<Vec<String>> = vec![vec![]];
    for _ in 0..max_len {
        layer = layer
            .iter()
            .flat_map(|w| {
                alphabet.iter().map(move |a| {
                    let mut word = w.clone();
                    word.push(a.clone());
                    word
                })
            })
            .collect();
        all.extend(layer.iter().cloned());
    }
    all
}

pub fn alphabet(cfg: &CFG) -> Vec<String> {
    cfg.terminals.iter().map(|t| t.name.clone()).collect()
}

/// Whether the start symbol occurs in any body
pub fn start_on_rhs(cfg: &CFG) -> bool {
    cfg.productions
        .iter()
        .flatten()
        .flatten()
        .any(|s| *s == SymbolIndex::VariableIndex(cfg.start_symbol))
}

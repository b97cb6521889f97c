use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::cfg::cfg::{SymbolIndex, CFG};
use crate::cfg::fresh::FreshNames;
use crate::cfg::variable::Variable;
use crate::config::NormalFormConfig;
use crate::error::Result;

/// Converts `cfg` to Chomsky Normal Form using the default naming configuration.
pub fn normalize(cfg: &CFG) -> Result<CFG> {
    cfg.to_normal_form()
}

fn is_unit(body: &[SymbolIndex]) -> bool {
    matches!(body, [SymbolIndex::VariableIndex(_)])
}

/// Appends `body` to `bodies` unless it is already there.
fn push_unique(bodies: &mut Vec<Vec<SymbolIndex>>, body: Vec<SymbolIndex>) {
    if !bodies.contains(&body) {
        bodies.push(body);
    }
}

impl CFG {
    /// Converts the CFG to Chomsky Normal Form.
    ///
    /// Chosen order (START; TERM; BIN; DEL; UNIT; USELESS). DEL must come before UNIT, as
    /// dropping nullable symbols leaves new unit productions behind.
    ///
    /// Warnings
    /// --------
    /// A normal form does not generate the epsilon word. If this grammar generates it, the
    /// result records that in [`CFG::accepts_empty`] instead of keeping an epsilon production.
    pub fn to_normal_form(&self) -> Result<Self> {
        self.to_normal_form_with(&NormalFormConfig::default())
    }

    pub fn to_normal_form_with(&self, config: &NormalFormConfig) -> Result<Self> {
        self.validate()?;
        let mut names = FreshNames::for_grammar(self);

        let cfg = self.with_new_start(&mut names, config);
        debug!(variables = cfg.variables.len(), "START: introduced {}", cfg.get_start_symbol());
        let cfg = cfg.with_only_single_terminal_productions(&mut names, config);
        debug!(variables = cfg.variables.len(), productions = cfg.num_productions(), "TERM done");
        let cfg = cfg.with_decomposed_productions(&mut names, config);
        debug!(variables = cfg.variables.len(), productions = cfg.num_productions(), "BIN done");
        let cfg = cfg.without_epsilon();
        debug!(productions = cfg.num_productions(), accepts_empty = cfg.accepts_empty, "DEL done");
        let cfg = cfg.without_unit_productions();
        debug!(productions = cfg.num_productions(), "UNIT done");
        let cfg = cfg.without_useless_symbols();
        debug!(
            variables = cfg.variables.len(),
            productions = cfg.num_productions(),
            "USELESS done"
        );
        Ok(cfg)
    }

    /// Copies the alphabets and flags of this grammar around new productions.
    fn with_productions(
        &self,
        variables: Vec<Variable>,
        start_symbol: usize,
        productions: Vec<Vec<Vec<SymbolIndex>>>,
    ) -> Self {
        let mut cfg = CFG::from_parts(variables, self.terminals.clone(), start_symbol, productions);
        cfg.accepts_empty = self.accepts_empty;
        cfg
    }

    /// Returns a new CFG with a fresh start symbol `S0 -> S`, so that the start symbol
    /// never occurs on a right-hand side.
    pub fn with_new_start(&self, names: &mut FreshNames, config: &NormalFormConfig) -> Self {
        let mut variables = self.variables.clone();
        let mut productions = self.productions.clone();
        variables.push(names.fresh(&config.start_symbol));
        productions.push(vec![vec![SymbolIndex::VariableIndex(self.start_symbol)]]);
        self.with_productions(variables, productions.len() - 1, productions)
    }

    /// Ensures that terminals only occur in productions of the form `A -> a`.
    ///
    /// Every terminal `a` inside a longer body is replaced by a new variable `X_a -> a`.
    pub fn with_only_single_terminal_productions(
        &self,
        names: &mut FreshNames,
        config: &NormalFormConfig,
    ) -> Self {
        let mut variables = self.variables.clone();
        let mut productions_list: Vec<Vec<Vec<SymbolIndex>>> =
            Vec::with_capacity(self.productions.len());
        // keep track of which symbols needed to be introduced
        let mut added_non_terminals: Vec<Option<usize>> = vec![None; self.terminals.len()];
        let mut new_productions = Vec::new();

        for productions in &self.productions {
            let mut productions_list_head = Vec::with_capacity(productions.len());
            for production in productions {
                if production.len() < 2 {
                    productions_list_head.push(production.clone());
                    continue;
                }
                // replace the terminals with new variables
                let new_production = production
                    .iter()
                    .map(|symbol| match symbol {
                        SymbolIndex::TerminalIndex(index) => {
                            if let Some(new_index) = added_non_terminals[*index] {
                                return SymbolIndex::VariableIndex(new_index);
                            }
                            let new_index = variables.len();
                            let terminal = &self.terminals[*index];
                            variables.push(names.fresh(&format!(
                                "{}{}",
                                config.terminal_prefix,
                                terminal.get_name()
                            )));
                            added_non_terminals[*index] = Some(new_index);
                            new_productions.push(vec![vec![SymbolIndex::TerminalIndex(*index)]]);
                            SymbolIndex::VariableIndex(new_index)
                        }
                        _ => *symbol,
                    })
                    .collect::<Vec<_>>();
                productions_list_head.push(new_production);
            }
            productions_list.push(productions_list_head);
        }

        // add productions for the new variables
        productions_list.extend(new_productions);
        self.with_productions(variables, self.start_symbol, productions_list)
    }

    /// Decomposes productions of the form `A -> B C D E` into `A -> B X`, `X -> C Y` and `Y -> D E`.
    ///
    /// Equal suffixes of different bodies share the variable introduced for them.
    pub fn with_decomposed_productions(
        &self,
        names: &mut FreshNames,
        config: &NormalFormConfig,
    ) -> Self {
        let mut variables = self.variables.clone();
        let mut productions_list: Vec<Vec<Vec<SymbolIndex>>> = vec![vec![]; self.productions.len()];
        let mut done: HashMap<&[SymbolIndex], usize> = HashMap::new();

        // only iterate over the "old" productions
        for (head, productions) in self.productions.iter().enumerate() {
            for production in productions {
                let mut cur_head = head;
                let mut rest = production.as_slice();
                let mut shared = false;
                while rest.len() > 2 {
                    let suffix = &rest[1..];
                    if let Some(index) = done.get(suffix) {
                        push_unique(
                            &mut productions_list[cur_head],
                            vec![rest[0], SymbolIndex::VariableIndex(*index)],
                        );
                        shared = true;
                        break;
                    }
                    let new_index = variables.len();
                    variables.push(names.numbered(&config.binary_prefix));
                    productions_list.push(vec![]);
                    done.insert(suffix, new_index);
                    push_unique(
                        &mut productions_list[cur_head],
                        vec![rest[0], SymbolIndex::VariableIndex(new_index)],
                    );
                    cur_head = new_index;
                    rest = suffix;
                }
                if !shared {
                    push_unique(&mut productions_list[cur_head], rest.to_vec());
                }
            }
        }
        self.with_productions(variables, self.start_symbol, productions_list)
    }

    /// Computes the set of generating or nullable variables as a boolean array.
    ///
    /// Every body keeps a count of the symbols not yet known to be generating (nullable).
    /// When the count of a body drops to zero, its head is added to the worklist.
    fn _get_generating_symbols(&self, nullable: bool) -> Vec<bool> {
        let mut found = vec![false; self.productions.len()];
        let mut impacts: Vec<Vec<(usize, usize)>> = vec![vec![]; self.productions.len()];
        let mut remaining_lists: Vec<Vec<usize>> = Vec::with_capacity(self.productions.len());
        let mut to_process = vec![];

        for (head, productions) in self.productions.iter().enumerate() {
            let mut remaining = Vec::with_capacity(productions.len());
            for (body_index, body) in productions.iter().enumerate() {
                let has_terminal = body
                    .iter()
                    .any(|s| matches!(s, SymbolIndex::TerminalIndex(_)));
                if nullable && has_terminal {
                    // can never derive the empty word
                    remaining.push(usize::MAX);
                    continue;
                }
                let mut count = 0;
                for symbol in body {
                    if let SymbolIndex::VariableIndex(index) = symbol {
                        impacts[*index].push((head, body_index));
                        count += 1;
                    }
                }
                if count == 0 && !found[head] {
                    found[head] = true;
                    to_process.push(head);
                }
                remaining.push(count);
            }
            remaining_lists.push(remaining);
        }

        while let Some(symbol) = to_process.pop() {
            for &(head, body_index) in &impacts[symbol] {
                if found[head] {
                    continue;
                }
                remaining_lists[head][body_index] -= 1;
                if remaining_lists[head][body_index] == 0 {
                    found[head] = true;
                    to_process.push(head);
                }
            }
        }
        found
    }

    /// Variables that derive at least one terminal string (possibly the empty one)
    pub fn get_generating_symbols(&self) -> Vec<bool> {
        self._get_generating_symbols(false)
    }

    /// Variables that derive the empty string
    pub fn get_nullable_symbols(&self) -> Vec<bool> {
        self._get_generating_symbols(true)
    }

    /// Variables reachable from the start symbol
    pub fn get_reachable_symbols(&self) -> Vec<bool> {
        let mut reachable = vec![false; self.productions.len()];
        reachable[self.start_symbol] = true;
        let mut to_process = vec![self.start_symbol];
        while let Some(head) = to_process.pop() {
            for symbol in self.productions[head].iter().flatten() {
                if let SymbolIndex::VariableIndex(index) = symbol {
                    if !reachable[*index] {
                        reachable[*index] = true;
                        to_process.push(*index);
                    }
                }
            }
        }
        reachable
    }

    /// Checks if the CFG generates epsilon (the empty string).
    pub fn generates_epsilon(&self) -> bool {
        self.accepts_empty
            || self
                .get_nullable_symbols()
                .get(self.start_symbol)
                .copied()
                .unwrap_or(false)
    }

    /// Checks if the language of the CFG is empty
    pub fn is_empty(&self) -> bool {
        let start_is_generating = self
            .get_generating_symbols()
            .get(self.start_symbol)
            .copied()
            .unwrap_or(false);
        !start_is_generating && !self.accepts_empty
    }

    /// Returns a new CFG with only the variables marked in `keep`.
    ///
    /// Bodies mentioning a dropped variable are dropped as well. Terminals are kept.
    pub fn reduced_to_variables(&self, keep: &[bool]) -> Self {
        debug_assert!(keep[self.start_symbol], "must retain start symbol");
        let mut new_index = vec![None; self.productions.len()];
        let mut variables = Vec::with_capacity(self.variables.len());
        for (i, variable) in self.variables.iter().enumerate() {
            if keep[i] {
                new_index[i] = Some(variables.len());
                variables.push(variable.clone());
            }
        }

        let mut productions_list = Vec::with_capacity(variables.len());
        for (head, productions) in self.productions.iter().enumerate() {
            if !keep[head] {
                continue;
            }
            let new_productions = productions
                .iter()
                .filter_map(|body| {
                    body.iter()
                        .map(|symbol| match symbol {
                            SymbolIndex::VariableIndex(index) => {
                                new_index[*index].map(SymbolIndex::VariableIndex)
                            }
                            terminal => Some(*terminal),
                        })
                        .collect::<Option<Vec<_>>>()
                })
                .collect();
            productions_list.push(new_productions);
        }

        let start_symbol = new_index[self.start_symbol].unwrap_or_default();
        self.with_productions(variables, start_symbol, productions_list)
    }

    /// Removes non-generating and then unreachable variables, never the start symbol.
    pub fn without_useless_symbols(&self) -> Self {
        let mut generating = self.get_generating_symbols();
        generating[self.start_symbol] = true;
        let cfg_temp = self.reduced_to_variables(&generating);
        let reachable = cfg_temp.get_reachable_symbols();
        trace!(
            non_generating = generating.iter().filter(|g| !**g).count(),
            unreachable = reachable.iter().filter(|r| !**r).count(),
            "removing useless symbols"
        );
        cfg_temp.reduced_to_variables(&reachable)
    }

    /// Generates all production variants when removing nullable symbols.
    fn _production_without_nullable(
        production: &[SymbolIndex],
        nullable_symbols: &[bool],
    ) -> Vec<Vec<SymbolIndex>> {
        let is_nullable = |symbol: &SymbolIndex| match symbol {
            SymbolIndex::VariableIndex(index) => nullable_symbols[*index],
            SymbolIndex::TerminalIndex(_) => false,
        };
        let first_nullable_index = production.iter().position(is_nullable);
        match first_nullable_index {
            Some(index) => {
                let all_further_productions =
                    CFG::_production_without_nullable(&production[index + 1..], nullable_symbols);
                let mut all_productions = Vec::with_capacity(2 * all_further_productions.len());
                let mut all_up_to_index = production[..index].to_vec();
                // drop the symbol
                all_productions.extend(all_further_productions.iter().map(|x| {
                    let mut new_production = all_up_to_index.clone();
                    new_production.extend_from_slice(x);
                    new_production
                }));
                // keep the symbol
                all_up_to_index.push(production[index]);
                all_productions.extend(all_further_productions.iter().map(|x| {
                    let mut new_production = all_up_to_index.clone();
                    new_production.extend_from_slice(x);
                    new_production
                }));
                all_productions
            }
            None => vec![production.to_vec()],
        }
    }

    /// Removes epsilon productions from the CFG
    ///
    /// Every body is replaced by all its variants with nullable variables omitted, except the
    /// empty one. Whether the start symbol was nullable survives in `accepts_empty`.
    pub fn without_epsilon(&self) -> Self {
        let nullable_symbols = self.get_nullable_symbols();
        let mut new_productions: Vec<Vec<Vec<SymbolIndex>>> = vec![vec![]; self.productions.len()];
        for (head, productions) in self.productions.iter().enumerate() {
            for production in productions {
                for variant in CFG::_production_without_nullable(production, &nullable_symbols) {
                    if !variant.is_empty() {
                        push_unique(&mut new_productions[head], variant);
                    }
                }
            }
        }
        let mut cfg = self.with_productions(self.variables.clone(), self.start_symbol, new_productions);
        cfg.accepts_empty = self.accepts_empty || nullable_symbols[self.start_symbol];
        cfg
    }

    /// For every variable, the variables reachable through unit productions only.
    ///
    /// The list of `A` starts with `A` itself and follows discovery order, so cycles like
    /// `A -> B`, `B -> A` terminate once every member has been visited.
    pub fn get_unit_closures(&self) -> Vec<Vec<usize>> {
        let unit_productions: Vec<Vec<usize>> = self
            .productions
            .iter()
            .map(|productions| {
                productions
                    .iter()
                    .filter_map(|body| match body.as_slice() {
                        [SymbolIndex::VariableIndex(index)] => Some(*index),
                        _ => None,
                    })
                    .collect()
            })
            .collect();

        (0..self.productions.len())
            .map(|head| {
                let mut closure = vec![head];
                let mut seen: HashSet<usize> = HashSet::from([head]);
                let mut i = 0;
                while i < closure.len() {
                    for &next in &unit_productions[closure[i]] {
                        if seen.insert(next) {
                            closure.push(next);
                        }
                    }
                    i += 1;
                }
                closure
            })
            .collect()
    }

    /// Removes unit productions from the CFG
    ///
    /// For every unit chain `A ->* B` and non-unit production `B -> YYY`, add `A -> YYY`.
    pub fn without_unit_productions(&self) -> Self {
        let closures = self.get_unit_closures();
        let new_productions = closures
            .iter()
            .map(|closure| {
                let mut bodies = Vec::new();
                for &member in closure {
                    for body in &self.productions[member] {
                        if !is_unit(body) {
                            push_unique(&mut bodies, body.clone());
                        }
                    }
                }
                bodies
            })
            .collect();
        self.with_productions(self.variables.clone(), self.start_symbol, new_productions)
    }
}

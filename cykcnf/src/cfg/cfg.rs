use hashbrown::HashSet;
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};
use tracing::warn;

use crate::cfg::production::{Production, Symbol};
use crate::cfg::terminal::Terminal;
use crate::cfg::variable::Variable;
use crate::error::{Error, InvalidGrammar, Result};
use crate::cyk::recognize;
use crate::input_symbol::{is_epsilon_name, InputSymbol};
use crate::language::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolIndex {
    TerminalIndex(usize),
    VariableIndex(usize),
}

#[derive(Debug, Clone)]
pub struct CFG {
    terminal_map: OnceCell<FxHashMap<Terminal, usize>>, // Maps terminal symbols to indices
    variable_map: OnceCell<FxHashMap<Variable, usize>>, // Maps non-terminal symbols to indices

    pub terminals: Vec<Terminal>, // List of terminal symbols
    pub variables: Vec<Variable>, // List of non-terminal symbols

    pub start_symbol: usize,                     // Start symbol
    pub productions: Vec<Vec<Vec<SymbolIndex>>>, // Production rules (non-terminal -> list<body>)

    // Set once epsilon elimination dropped the empty word from a nullable start symbol
    pub accepts_empty: bool,

    _in_normal_form: OnceCell<bool>, // Flag to indicate if the CFG is in normal form
}

impl CFG {
    /// Assembles a CFG from its indexed parts without any checking, see [`CFG::validate`].
    pub fn from_parts(
        variables: Vec<Variable>,
        terminals: Vec<Terminal>,
        start_symbol: usize,
        productions: Vec<Vec<Vec<SymbolIndex>>>,
    ) -> Self {
        CFG {
            terminal_map: OnceCell::new(),
            variable_map: OnceCell::new(),
            terminals,
            variables,
            start_symbol,
            productions,
            accepts_empty: false,
            _in_normal_form: OnceCell::new(),
        }
    }

    /// Creates a new Context-Free Grammar from declared alphabets and a list of productions.
    ///
    /// Duplicate declarations and duplicate productions are dropped, keeping the first
    /// occurrence. A body made only of epsilon symbols (or no symbols at all) is an
    /// epsilon production.
    ///
    /// Fails if the start symbol is undeclared, if a name is both a terminal and a
    /// non-terminal, or if a production uses an undeclared symbol.
    pub fn new(
        start: Variable,
        variables: Vec<Variable>,
        terminals: Vec<Terminal>,
        productions: Vec<Production>,
    ) -> Result<Self> {
        let mut variable_map: FxHashMap<Variable, usize> = FxHashMap::default();
        let mut unique_variables = Vec::with_capacity(variables.len());
        for variable in variables {
            if !variable_map.contains_key(&variable) {
                variable_map.insert(variable.clone(), unique_variables.len());
                unique_variables.push(variable);
            }
        }

        let mut terminal_map: FxHashMap<Terminal, usize> = FxHashMap::default();
        let mut unique_terminals = Vec::with_capacity(terminals.len());
        for terminal in terminals {
            if terminal.is_epsilon() || terminal_map.contains_key(&terminal) {
                continue;
            }
            if variable_map.contains_key(&Variable::new(terminal.get_name())) {
                return Err(InvalidGrammar::OverlappingSymbol(terminal.name).into());
            }
            terminal_map.insert(terminal.clone(), unique_terminals.len());
            unique_terminals.push(terminal);
        }

        let start_symbol = *variable_map
            .get(&start)
            .ok_or_else(|| InvalidGrammar::UndeclaredStart(start.clone()))?;

        let mut bodies: Vec<Vec<Vec<SymbolIndex>>> = vec![vec![]; unique_variables.len()];
        for production in productions {
            let head = *variable_map
                .get(&production.head)
                .ok_or_else(|| InvalidGrammar::UndeclaredHead(production.head.clone()))?;
            let mut body = Vec::with_capacity(production.body.len());
            for symbol in &production.body {
                let index = match symbol {
                    _ if symbol.is_epsilon() => continue,
                    Symbol::V(var) => variable_map.get(var).map(|i| SymbolIndex::VariableIndex(*i)),
                    Symbol::T(term) => terminal_map.get(term).map(|i| SymbolIndex::TerminalIndex(*i)),
                };
                let index = index.ok_or_else(|| InvalidGrammar::UndeclaredSymbol {
                    head: production.head.clone(),
                    symbol: symbol.get_name().to_string(),
                })?;
                body.push(index);
            }
            if !bodies[head].contains(&body) {
                bodies[head].push(body);
            }
        }

        let mut cfg = CFG::from_parts(unique_variables, unique_terminals, start_symbol, bodies);
        cfg.terminal_map = OnceCell::with_value(terminal_map);
        cfg.variable_map = OnceCell::with_value(variable_map);
        Ok(cfg)
    }

    /// A convenience constructor that infers both alphabets from the productions.
    ///
    /// `start_variable` - The start symbol for the grammar.
    /// `productions` - Every rule of the grammar; heads and `Symbol::V` become non-terminals,
    /// `Symbol::T` (other than epsilon) become terminals.
    pub fn from_start_and_productions(
        start_variable: Variable,
        productions: Vec<Production>,
    ) -> Result<Self> {
        let mut variables = Vec::new();
        let mut terminals = Vec::new();
        for production in &productions {
            variables.push(production.head.clone());
            for symbol in &production.body {
                match symbol {
                    Symbol::V(var) => variables.push(var.clone()),
                    Symbol::T(term) => terminals.push(term.clone()),
                }
            }
        }
        CFG::new(start_variable, variables, terminals, productions)
    }

    /// Checks the structural consistency of the indexed representation, and that the
    /// terminal and non-terminal alphabets are disjoint.
    pub fn validate(&self) -> Result<()> {
        if self.productions.len() != self.variables.len() {
            return Err(InvalidGrammar::Inconsistent("production table does not match variables").into());
        }
        if self.start_symbol >= self.variables.len() {
            return Err(InvalidGrammar::Inconsistent("start symbol index out of range").into());
        }
        let variable_names: HashSet<&str> = self.variables.iter().map(|v| v.get_name()).collect();
        if variable_names.len() != self.variables.len() {
            return Err(InvalidGrammar::Inconsistent("duplicate non-terminal").into());
        }
        let terminal_names: HashSet<&str> = self.terminals.iter().map(|t| t.get_name()).collect();
        if terminal_names.len() != self.terminals.len() {
            return Err(InvalidGrammar::Inconsistent("duplicate terminal").into());
        }
        if let Some(name) = terminal_names.intersection(&variable_names).next() {
            return Err(InvalidGrammar::OverlappingSymbol(name.to_string()).into());
        }
        for (head, productions) in self.productions.iter().enumerate() {
            for symbol in productions.iter().flatten() {
                let in_range = match symbol {
                    SymbolIndex::TerminalIndex(index) => *index < self.terminals.len(),
                    SymbolIndex::VariableIndex(index) => *index < self.variables.len(),
                };
                if !in_range {
                    return Err(InvalidGrammar::UndeclaredSymbol {
                        head: self.variables[head].clone(),
                        symbol: format!("{:?}", symbol),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    pub fn get_variable_at(&self, index: usize) -> &Variable {
        &self.variables[index]
    }

    /// Returns the start symbol of the grammar
    pub fn get_start_symbol(&self) -> &Variable {
        self.get_variable_at(self.start_symbol)
    }

    pub fn get_terminal_map(&self) -> &FxHashMap<Terminal, usize> {
        self.terminal_map.get_or_init(|| {
            self.terminals
                .iter()
                .enumerate()
                .map(|(i, terminal)| (terminal.clone(), i))
                .collect()
        })
    }

    pub fn get_variable_map(&self) -> &FxHashMap<Variable, usize> {
        self.variable_map.get_or_init(|| {
            self.variables
                .iter()
                .enumerate()
                .map(|(i, variable)| (variable.clone(), i))
                .collect()
        })
    }

    pub fn get_symbol(&self, symbol: SymbolIndex) -> Symbol {
        match symbol {
            SymbolIndex::TerminalIndex(index) => Symbol::T(self.terminals[index].clone()),
            SymbolIndex::VariableIndex(index) => Symbol::V(self.variables[index].clone()),
        }
    }

    pub fn get_production(&self, head: usize, body: &[SymbolIndex]) -> Production {
        Production::new(
            self.variables[head].clone(),
            body.iter().map(|s| self.get_symbol(*s)).collect(),
        )
    }

    /// Returns the production rules for a given non-terminal symbol
    pub fn get_productions_of(&self, non_terminal: &Variable) -> Vec<Production> {
        match self.get_variable_map().get(non_terminal) {
            Some(&head) => self.productions[head]
                .iter()
                .map(|body| self.get_production(head, body))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns the production rules for the grammar, ordered by head
    pub fn get_productions(&self) -> Vec<Production> {
        self.productions
            .iter()
            .enumerate()
            .flat_map(|(head, bodies)| bodies.iter().map(move |body| (head, body)))
            .map(|(head, body)| self.get_production(head, body))
            .collect()
    }

    pub fn num_productions(&self) -> usize {
        self.productions.iter().map(Vec::len).sum()
    }

    /// Cached on first call; use [`CFG::check_normal_form`] after editing the public fields.
    pub fn is_normal_form(&self) -> bool {
        *self
            ._in_normal_form
            .get_or_init(|| self.check_normal_form().is_ok())
    }

    /// Returns the first production that is neither `A -> a` nor `A -> B C`
    pub fn check_normal_form(&self) -> Result<()> {
        for (head, productions) in self.productions.iter().enumerate() {
            for body in productions {
                match body.as_slice() {
                    [SymbolIndex::TerminalIndex(_)] => {}
                    [SymbolIndex::VariableIndex(_), SymbolIndex::VariableIndex(_)] => {}
                    _ => return Err(Error::NotInNormalForm(self.get_production(head, body))),
                }
            }
        }
        Ok(())
    }

    pub fn to_text(&self) -> String {
        let mut result = String::new();
        result.push_str("Start Symbol: ");
        result.push_str(self.get_start_symbol().get_name());
        result.push('\n');
        for (i, productions) in self.productions.iter().enumerate() {
            result.push_str(self.get_variable_at(i).get_name());
            result.push_str(" ->");
            for (n, production) in productions.iter().enumerate() {
                if n > 0 {
                    result.push_str(" |");
                }
                if production.is_empty() {
                    result.push_str(" ε");
                }
                for symbol in production {
                    result.push(' ');
                    result.push_str(self.get_symbol(*symbol).get_name());
                }
            }
            result.push('\n');
        }
        result.push_str("Terminals:");
        for terminal in &self.terminals {
            result.push(' ');
            result.push_str(terminal.get_name());
        }
        result
    }
}

impl CFG {
    /// Reads a context-free grammar from a string of text.
    ///
    /// Each rule in the grammar is represented as one line in the following format:
    ///   `head -> body1 | body2 | ... | bodyn`
    ///
    /// A line starting with `|` continues the alternatives of the previous head.
    /// Non-terminals should start with a capital letter, while terminals start with anything else.
    /// `"VAR:name"` and `"TER:name"` force the kind of a symbol.
    /// Special cases for epsilon symbols include `$`, `ε`, `ϵ`, `Є`, or `epsilon`.
    pub fn from_text(text: &str, start_symbol: Variable) -> Result<Self> {
        let mut productions = Vec::new();
        let mut current_head: Option<Variable> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(alternatives) = line.strip_prefix('|') {
                let head = current_head
                    .clone()
                    .ok_or_else(|| InvalidGrammar::MalformedRule(line.to_string()))?;
                CFG::read_alternatives(&head, alternatives, &mut productions)?;
            } else {
                current_head = Some(CFG::read_line(line, &mut productions)?);
            }
        }

        Self::from_start_and_productions(start_symbol, productions)
    }

    /// Splits one rule into its head and alternatives, returning the head.
    fn read_line(line: &str, productions: &mut Vec<Production>) -> Result<Variable> {
        let (head_s, body_s) = line
            .split_once("->")
            .ok_or_else(|| InvalidGrammar::MalformedRule(line.to_string()))?;
        let mut head_text = head_s.trim();
        if let Some(stripped) = head_text.strip_prefix("\"VAR:") {
            head_text = stripped
                .strip_suffix('"')
                .ok_or_else(|| InvalidGrammar::MalformedRule(line.to_string()))?;
        }
        if head_text.is_empty() || head_text.contains(char::is_whitespace) {
            return Err(InvalidGrammar::MalformedRule(line.to_string()).into());
        }
        let head = Variable::new(head_text);
        CFG::read_alternatives(&head, body_s, productions)?;
        Ok(head)
    }

    fn read_alternatives(
        head: &Variable,
        body_s: &str,
        productions: &mut Vec<Production>,
    ) -> Result<()> {
        for sub_body in body_s.split('|') {
            let mut body = Vec::new();
            for component in sub_body.split_whitespace() {
                // Epsilon productions are represented with empty bodies
                if is_epsilon_name(component) {
                    continue;
                }
                body.push(CFG::read_symbol(component)?);
            }
            productions.push(Production::new(head.clone(), body));
        }
        Ok(())
    }

    fn read_symbol(component: &str) -> Result<Symbol> {
        let malformed = || InvalidGrammar::MalformedRule(component.to_string());
        if let Some(variable) = component.strip_prefix("\"VAR:") {
            let name = variable.strip_suffix('"').ok_or_else(malformed)?;
            return Ok(Symbol::V(Variable::new(name)));
        }
        if let Some(terminal) = component.strip_prefix("\"TER:") {
            let name = terminal.strip_suffix('"').ok_or_else(malformed)?;
            return Ok(Symbol::T(Terminal::new(name)));
        }
        if component.chars().next().is_some_and(char::is_uppercase) {
            Ok(Symbol::V(Variable::new(component)))
        } else {
            Ok(Symbol::T(Terminal::new(component)))
        }
    }
}

impl Display for CFG {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl Language for CFG {
    fn accepts(&self, input: &[InputSymbol]) -> bool {
        // the fields are public, so the cached flag may be stale
        let result = if self.check_normal_form().is_ok() {
            recognize(self, input)
        } else {
            self.to_normal_form().and_then(|cfg| recognize(&cfg, input))
        };
        result.unwrap_or_else(|e| {
            warn!(error = %e, "cannot decide membership");
            false
        })
    }
}

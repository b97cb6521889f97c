pub mod forest;
pub mod table;

use tracing::{debug, trace};

use crate::cfg::cfg::{SymbolIndex, CFG};
use crate::cfg::terminal::Terminal;
use crate::error::Result;

use forest::ParseForest;
use table::{CykTable, Derivation};

/// CYK recognizer over a grammar in Chomsky Normal Form.
///
/// The rules are indexed once, so the same parser can be reused for many sentences.
#[derive(Debug, Clone)]
pub struct CykParser<'a> {
    cfg: &'a CFG,
    // terminal index -> heads of `A -> terminal`, ascending
    terminal_rules: Vec<Vec<usize>>,
    // (head, left, right) of every `A -> B C`, ordered by head and then by body
    binary_rules: Vec<(usize, usize, usize)>,
}

impl<'a> CykParser<'a> {
    /// Fails with [`crate::error::Error::NotInNormalForm`] on the first production that is
    /// neither `A -> a` nor `A -> B C`.
    pub fn new(cfg: &'a CFG) -> Result<Self> {
        cfg.validate()?;
        cfg.check_normal_form()?;

        let mut terminal_rules = vec![vec![]; cfg.terminals.len()];
        let mut binary_rules = Vec::new();
        for (head, productions) in cfg.productions.iter().enumerate() {
            for body in productions {
                match body.as_slice() {
                    [SymbolIndex::TerminalIndex(t)] => terminal_rules[*t].push(head),
                    [SymbolIndex::VariableIndex(l), SymbolIndex::VariableIndex(r)] => {
                        binary_rules.push((head, *l, *r))
                    }
                    _ => unreachable!("checked by check_normal_form"),
                }
            }
        }
        Ok(CykParser {
            cfg,
            terminal_rules,
            binary_rules,
        })
    }

    pub fn grammar(&self) -> &CFG {
        self.cfg
    }

    /// Fills the table for `tokens` by increasing span length.
    pub fn table(&self, tokens: &[Terminal]) -> CykTable {
        let n = tokens.len();
        let mut table = CykTable::new(n, self.cfg.variables.len());

        let terminal_map = self.cfg.get_terminal_map();
        for (i, token) in tokens.iter().enumerate() {
            match terminal_map.get(token) {
                Some(&t) => {
                    for &head in &self.terminal_rules[t] {
                        table.push(i, i, head, Derivation::Terminal(t));
                    }
                }
                None => trace!(position = i, token = %token, "token outside the terminal alphabet"),
            }
        }

        for len in 2..=n {
            for i in 0..=n - len {
                let j = i + len - 1;
                for k in i..j {
                    for (rule, &(head, left, right)) in self.binary_rules.iter().enumerate() {
                        if table.contains(i, k, left) && table.contains(k + 1, j, right) {
                            table.push(
                                i,
                                j,
                                head,
                                Derivation::Binary {
                                    split: k,
                                    rule,
                                    left,
                                    right,
                                },
                            );
                        }
                    }
                }
            }
        }
        table
    }

    fn accepted(&self, table: &CykTable) -> bool {
        match table.len() {
            0 => self.cfg.generates_epsilon(),
            n => table.contains(0, n - 1, self.cfg.start_symbol),
        }
    }

    /// Whether the start symbol derives `tokens`.
    ///
    /// The empty sentence is accepted iff the grammar generates epsilon, which for a normalized
    /// grammar is what [`CFG::accepts_empty`] recorded.
    pub fn recognize(&self, tokens: &[Terminal]) -> bool {
        let accepted = self.accepted(&self.table(tokens));
        debug!(tokens = tokens.len(), accepted, "CYK recognition");
        accepted
    }

    /// The parse forest of `tokens`, or `None` if the sentence is rejected.
    pub fn parse(&self, tokens: &[Terminal]) -> Option<ParseForest> {
        let table = self.table(tokens);
        let accepted = self.accepted(&table);
        debug!(tokens = tokens.len(), accepted, "CYK parse");
        accepted.then(|| {
            ParseForest::new(
                table,
                tokens.to_vec(),
                self.cfg.variables.clone(),
                self.cfg.start_symbol,
            )
        })
    }
}

/// Decides if `tokens` is derivable from `cfg`, which must be in Chomsky Normal Form.
pub fn recognize(cfg: &CFG, tokens: &[Terminal]) -> Result<bool> {
    Ok(CykParser::new(cfg)?.recognize(tokens))
}

/// Like [`recognize`], additionally returning every derivation of an accepted sentence.
pub fn parse(cfg: &CFG, tokens: &[Terminal]) -> Result<Option<ParseForest>> {
    Ok(CykParser::new(cfg)?.parse(tokens))
}

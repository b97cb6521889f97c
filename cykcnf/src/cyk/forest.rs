use std::fmt;

use hashbrown::HashMap;

use crate::cfg::terminal::Terminal;
use crate::cfg::variable::Variable;
use crate::cyk::table::{CykTable, Derivation};

/// One derivation tree of an accepted sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTree {
    /// The start symbol derives the empty sentence
    Empty(Variable),
    /// `variable -> terminal` at token `position`
    Leaf {
        variable: Variable,
        terminal: Terminal,
        position: usize,
    },
    /// `variable -> left right` over the inclusive token span
    Branch {
        variable: Variable,
        span: (usize, usize),
        left: Box<ParseTree>,
        right: Box<ParseTree>,
    },
}

impl ParseTree {
    pub fn variable(&self) -> &Variable {
        match self {
            ParseTree::Empty(variable) => variable,
            ParseTree::Leaf { variable, .. } => variable,
            ParseTree::Branch { variable, .. } => variable,
        }
    }

    /// Inclusive span of tokens covered by this tree, `None` for the empty tree
    pub fn span(&self) -> Option<(usize, usize)> {
        match self {
            ParseTree::Empty(_) => None,
            ParseTree::Leaf { position, .. } => Some((*position, *position)),
            ParseTree::Branch { span, .. } => Some(*span),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ParseTree::Leaf { .. })
    }

    /// The terminals at the leaves, left to right
    pub fn leaves(&self) -> Vec<&Terminal> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Terminal>) {
        match self {
            ParseTree::Empty(_) => {}
            ParseTree::Leaf { terminal, .. } => leaves.push(terminal),
            ParseTree::Branch { left, right, .. } => {
                left.collect_leaves(leaves);
                right.collect_leaves(leaves);
            }
        }
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTree::Empty(variable) => write!(f, "({} ε)", variable),
            ParseTree::Leaf {
                variable, terminal, ..
            } => write!(f, "({} {})", variable, terminal),
            ParseTree::Branch {
                variable,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", variable, left, right),
        }
    }
}

/// All derivations of an accepted sentence, packed in the CYK table they were found in.
#[derive(Debug, Clone)]
pub struct ParseForest {
    table: CykTable,
    tokens: Vec<Terminal>,
    variables: Vec<Variable>,
    start: usize,
}

impl ParseForest {
    pub(crate) fn new(
        table: CykTable,
        tokens: Vec<Terminal>,
        variables: Vec<Variable>,
        start: usize,
    ) -> Self {
        ParseForest {
            table,
            tokens,
            variables,
            start,
        }
    }

    pub fn table(&self) -> &CykTable {
        &self.table
    }

    pub fn tokens(&self) -> &[Terminal] {
        &self.tokens
    }

    pub fn start(&self) -> &Variable {
        &self.variables[self.start]
    }

    /// The canonical tree: at every node, the derivation with the smallest split point and
    /// then the smallest rule index.
    pub fn tree(&self) -> ParseTree {
        if self.tokens.is_empty() {
            return ParseTree::Empty(self.start().clone());
        }
        self.first_tree(0, self.tokens.len() - 1, self.start)
    }

    fn first_tree(&self, i: usize, j: usize, variable: usize) -> ParseTree {
        // the forest only exists for accepted sentences, every reachable cell has a derivation
        let derivation = self.table.derivations(i, j, variable)[0];
        self.build(i, j, variable, derivation, &mut |i, j, v| {
            vec![self.first_tree(i, j, v)]
        })
        .remove(0)
    }

    /// Every tree of the forest, in canonical order first.
    ///
    /// The number of trees can grow exponentially with the sentence length for ambiguous
    /// grammars; check [`ParseForest::count_trees`] first.
    pub fn trees(&self) -> Vec<ParseTree> {
        if self.tokens.is_empty() {
            return vec![ParseTree::Empty(self.start().clone())];
        }
        self.all_trees(0, self.tokens.len() - 1, self.start)
    }

    fn all_trees(&self, i: usize, j: usize, variable: usize) -> Vec<ParseTree> {
        self.table
            .derivations(i, j, variable)
            .iter()
            .flat_map(|derivation| {
                self.build(i, j, variable, *derivation, &mut |i, j, v| {
                    self.all_trees(i, j, v)
                })
            })
            .collect()
    }

    /// Expands one derivation, asking `subtrees` for the trees of each child.
    fn build(
        &self,
        i: usize,
        j: usize,
        variable: usize,
        derivation: Derivation,
        subtrees: &mut dyn FnMut(usize, usize, usize) -> Vec<ParseTree>,
    ) -> Vec<ParseTree> {
        let name = &self.variables[variable];
        match derivation {
            Derivation::Terminal(_) => vec![ParseTree::Leaf {
                variable: name.clone(),
                terminal: self.tokens[i].clone(),
                position: i,
            }],
            Derivation::Binary {
                split, left, right, ..
            } => {
                let lefts = subtrees(i, split, left);
                let rights = subtrees(split + 1, j, right);
                let mut trees = Vec::with_capacity(lefts.len() * rights.len());
                for l in &lefts {
                    for r in &rights {
                        trees.push(ParseTree::Branch {
                            variable: name.clone(),
                            span: (i, j),
                            left: Box::new(l.clone()),
                            right: Box::new(r.clone()),
                        });
                    }
                }
                trees
            }
        }
    }

    /// Number of distinct derivation trees (saturating)
    pub fn count_trees(&self) -> u128 {
        if self.tokens.is_empty() {
            return 1;
        }
        let mut memo = HashMap::new();
        self.count(0, self.tokens.len() - 1, self.start, &mut memo)
    }

    fn count(
        &self,
        i: usize,
        j: usize,
        variable: usize,
        memo: &mut HashMap<(usize, usize, usize), u128>,
    ) -> u128 {
        if let Some(count) = memo.get(&(i, j, variable)) {
            return *count;
        }
        let mut total: u128 = 0;
        for derivation in self.table.derivations(i, j, variable) {
            let count = match *derivation {
                Derivation::Terminal(_) => 1,
                Derivation::Binary {
                    split, left, right, ..
                } => self
                    .count(i, split, left, memo)
                    .saturating_mul(self.count(split + 1, j, right, memo)),
            };
            total = total.saturating_add(count);
        }
        memo.insert((i, j, variable), total);
        total
    }
}

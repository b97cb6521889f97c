use smallvec::SmallVec;

use crate::cfg::cfg::CFG;

/// A back-pointer explaining why a variable sits in a cell of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derivation {
    /// `A -> a` where `a` (a terminal index) is the token at this position
    Terminal(usize),
    /// `A -> B C` with `B` spanning `i..=split` and `C` spanning `split + 1..=j`.
    /// `rule` is the index of the binary rule in the parser's rule order.
    Binary {
        split: usize,
        rule: usize,
        left: usize,
        right: usize,
    },
}

pub type Derivations = SmallVec<[Derivation; 1]>;

/// The triangular CYK table of a sentence of `len()` tokens.
///
/// Cell `(i, j)` with `i <= j` holds, for every variable deriving `tokens[i..=j]`, all the
/// ways it was found, in discovery order (smallest split first, then smallest rule).
#[derive(Debug, Clone)]
pub struct CykTable {
    size: usize,
    num_variables: usize,
    cells: Vec<Derivations>,
}

impl CykTable {
    pub(crate) fn new(size: usize, num_variables: usize) -> Self {
        CykTable {
            size,
            num_variables,
            cells: vec![Derivations::new(); size * (size + 1) / 2 * num_variables],
        }
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn slot(&self, i: usize, j: usize, variable: usize) -> Option<usize> {
        if i <= j && j < self.size && variable < self.num_variables {
            // rows of the upper triangle are stored back to back, row i has size - i cells
            let row = i * (2 * self.size - i + 1) / 2;
            Some((row + j - i) * self.num_variables + variable)
        } else {
            None
        }
    }

    pub(crate) fn push(&mut self, i: usize, j: usize, variable: usize, derivation: Derivation) {
        if let Some(slot) = self.slot(i, j, variable) {
            self.cells[slot].push(derivation);
        }
    }

    /// Whether `variable` derives the span `i..=j`
    pub fn contains(&self, i: usize, j: usize, variable: usize) -> bool {
        !self.derivations(i, j, variable).is_empty()
    }

    /// All recorded derivations of `variable` over `i..=j`; empty if there are none
    pub fn derivations(&self, i: usize, j: usize, variable: usize) -> &[Derivation] {
        match self.slot(i, j, variable) {
            Some(slot) => &self.cells[slot],
            None => &[],
        }
    }

    /// The variables of cell `(i, j)` in ascending index order
    pub fn cell(&self, i: usize, j: usize) -> Vec<usize> {
        (0..self.num_variables)
            .filter(|v| self.contains(i, j, *v))
            .collect()
    }

    /// The names of the variables of cell `(i, j)`, resolved against `cfg`
    pub fn cell_names<'a>(&self, i: usize, j: usize, cfg: &'a CFG) -> Vec<&'a str> {
        self.cell(i, j)
            .into_iter()
            .map(|v| cfg.get_variable_at(v).get_name())
            .collect()
    }

    /// Row `i` lists the cells `(i, 0..n)`; cells below the diagonal and empty cells show `-`.
    pub fn to_text(&self, cfg: &CFG) -> String {
        let mut rows = Vec::with_capacity(self.size);
        for i in 0..self.size {
            let row: Vec<String> = (0..self.size)
                .map(|j| {
                    let names = self.cell_names(i, j, cfg);
                    if names.is_empty() {
                        "-".to_string()
                    } else {
                        names.join("|")
                    }
                })
                .collect();
            rows.push(row.join("\t"));
        }
        rows.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_triangle_is_packed() {
        let table = CykTable::new(4, 3);
        assert_eq!(table.cells.len(), 10 * 3);
        let mut slots: Vec<usize> = (0..4)
            .flat_map(|i| (i..4).flat_map(move |j| (0..3).map(move |v| (i, j, v))))
            .map(|(i, j, v)| table.slot(i, j, v).unwrap())
            .collect();
        slots.sort_unstable();
        assert_eq!(slots, (0..30).collect::<Vec<_>>());
        assert_eq!(table.slot(1, 0, 0), None);
        assert_eq!(table.slot(0, 4, 0), None);
        assert_eq!(table.slot(0, 0, 3), None);
    }
}

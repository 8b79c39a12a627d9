use std::fmt::Display;

use typed_index_collections::TiVec;

use crate::formula::{Clause, Cnf};

use super::assignment::Assignment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClauseIdx(usize);

impl From<usize> for ClauseIdx {
    fn from(index: usize) -> Self {
        ClauseIdx(index)
    }
}

impl From<ClauseIdx> for usize {
    fn from(index: ClauseIdx) -> Self {
        index.0
    }
}

impl Display for ClauseIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Clauses of the formula together with an active flag per clause.
///
/// Inactive clauses are satisfied by the current assignment and are skipped by
/// propagation, branching and conflict detection.
#[derive(Debug)]
pub struct ClauseDb {
    formula: Cnf,
    active: TiVec<ClauseIdx, bool>,
}

impl ClauseDb {
    pub fn new(formula: Cnf) -> Self {
        let active = TiVec::from(vec![true; formula.clauses().len()]);
        ClauseDb { formula, active }
    }

    pub fn into_formula(self) -> Cnf {
        self.formula
    }

    pub fn clause(&self, idx: ClauseIdx) -> &Clause {
        &self.formula.clauses()[usize::from(idx)]
    }

    pub fn num_active(&self) -> usize {
        self.active.iter().filter(|&&active| active).count()
    }

    /// Iterates over active clauses in ascending index order.
    pub fn iter_active(&self) -> impl Iterator<Item = (ClauseIdx, &Clause)> + '_ {
        self.active
            .iter_enumerated()
            .filter(|(_, active)| **active)
            .map(move |(idx, _)| (idx, self.clause(idx)))
    }

    /// Marks every active clause with a satisfied literal as inactive.
    /// Returns the number of clauses deactivated.
    pub fn deactivate_satisfied(&mut self, assignment: &Assignment) -> usize {
        let formula = &self.formula;
        let mut deactivated = 0;

        for (idx, active) in self.active.iter_mut_enumerated() {
            if *active
                && formula.clauses()[usize::from(idx)]
                    .iter()
                    .any(|literal| assignment.is_satisfied(literal))
            {
                *active = false;
                deactivated += 1;
            }
        }

        deactivated
    }

    /// Marks every clause active again.
    /// `deactivate_satisfied` has to follow to restore the invariant.
    pub fn reactivate_all(&mut self) {
        for active in self.active.iter_mut() {
            *active = true;
        }
    }

    pub fn all_inactive(&self) -> bool {
        self.active.iter().all(|&active| !active)
    }

    /// Finds the first active clause whose literals are all assigned and false.
    pub fn falsified_active(&self, assignment: &Assignment) -> Option<ClauseIdx> {
        self.iter_active()
            .find(|(_, clause)| {
                clause
                    .iter()
                    .all(|literal| assignment.literal_value(literal) == Some(false))
            })
            .map(|(idx, _)| idx)
    }

    pub fn has_falsified_active(&self, assignment: &Assignment) -> bool {
        self.falsified_active(assignment).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::super::assignment::VarIdx;
    use super::*;

    fn db(num_variables: usize, clauses: &[&[i64]]) -> ClauseDb {
        ClauseDb::new(Cnf::from_dimacs(num_variables, clauses))
    }

    #[test]
    fn deactivation_is_idempotent() {
        let mut clauses = db(3, &[&[1, 2], &[-1, 3], &[2, 3]]);
        let mut assignment = Assignment::new(3);

        assignment.assign(VarIdx::from(1), true);
        assert_eq!(clauses.deactivate_satisfied(&assignment), 2);
        assert_eq!(clauses.deactivate_satisfied(&assignment), 0);
        assert_eq!(
            clauses.iter_active().map(|(idx, _)| idx).collect::<Vec<_>>(),
            vec![ClauseIdx::from(1)]
        );
        assert!(!clauses.all_inactive());

        assignment.assign(VarIdx::from(0), false);
        clauses.deactivate_satisfied(&assignment);
        assert!(clauses.all_inactive());

        clauses.reactivate_all();
        assert_eq!(clauses.num_active(), 3);
    }

    #[test]
    fn falsified_requires_every_literal_assigned() {
        let clauses = db(2, &[&[1, 2]]);
        let mut assignment = Assignment::new(2);

        assignment.assign(VarIdx::from(0), false);
        assert!(!clauses.has_falsified_active(&assignment));

        assignment.assign(VarIdx::from(1), false);
        assert_eq!(
            clauses.falsified_active(&assignment),
            Some(ClauseIdx::from(0))
        );
    }
}

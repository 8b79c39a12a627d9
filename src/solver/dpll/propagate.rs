use typed_index_collections::TiVec;

use crate::formula::{Clause, Literal};

use super::{
    assignment::{Assignment, VarIdx},
    clauses::ClauseDb,
};

/// Assignments made while propagating to a fixpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Propagation {
    pub units: usize,
    pub pures: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct Occurrence {
    positive: usize,
    negative: usize,
}

/// Returns the single unassigned literal of `clause`, if there is exactly one.
///
/// Only unassigned literals are counted, so a clause satisfied earlier in the
/// same pass still yields its remaining literal.
fn unit_literal(clause: &Clause, assignment: &Assignment) -> Option<Literal> {
    let mut unit = None;

    for literal in clause.iter() {
        if assignment.literal_value(literal).is_none() {
            if unit.is_some() {
                // second unassigned literal
                return None;
            }
            unit = Some(literal);
        }
    }

    unit
}

/// One unit propagation pass over the active clauses in ascending order.
/// Returns the number of variables assigned.
pub fn unit_propagate(clauses: &ClauseDb, assignment: &mut Assignment) -> usize {
    let mut assigned = 0;

    for (idx, clause) in clauses.iter_active() {
        if let Some(literal) = unit_literal(clause, assignment) {
            let var = VarIdx::from(literal.variable());
            let rank = assignment.assign(var, literal.positive());
            trace!("Unit {} from clause {} at rank {}", literal, idx, rank);
            assigned += 1;
        }
    }

    assigned
}

/// One pure literal pass.
///
/// Polarities are tallied over the active clauses. An unassigned variable that
/// never occurs positively becomes false, otherwise one that never occurs
/// negatively becomes true. Variables absent from every active clause therefore
/// become false. Returns the number of variables assigned.
pub fn eliminate_pure(clauses: &ClauseDb, assignment: &mut Assignment) -> usize {
    let mut occurrences: TiVec<VarIdx, Occurrence> =
        TiVec::from(vec![Occurrence::default(); assignment.num_variables()]);

    for (_, clause) in clauses.iter_active() {
        for literal in clause.iter() {
            let occurrence = &mut occurrences[VarIdx::from(literal.variable())];
            if literal.positive() {
                occurrence.positive += 1;
            } else {
                occurrence.negative += 1;
            }
        }
    }

    let mut assigned = 0;

    for (var, occurrence) in occurrences.iter_enumerated() {
        if assignment.value(var).is_some() {
            continue;
        }

        let value = if occurrence.positive == 0 {
            false
        } else if occurrence.negative == 0 {
            true
        } else {
            continue;
        };

        let rank = assignment.assign(var, value);
        trace!("Pure {} = {} at rank {}", var, value, rank);
        assigned += 1;
    }

    assigned
}

/// Applies pure literal elimination and unit propagation, each to its own
/// fixpoint, until neither assigns anything. Satisfied clauses are deactivated
/// after every pass that changes the assignment.
pub fn propagate_to_fixpoint(clauses: &mut ClauseDb, assignment: &mut Assignment) -> Propagation {
    let mut total = Propagation::default();

    loop {
        let mut changed = false;

        loop {
            let pures = eliminate_pure(clauses, assignment);
            if pures == 0 {
                break;
            }
            total.pures += pures;
            changed = true;
            clauses.deactivate_satisfied(assignment);
        }

        loop {
            let units = unit_propagate(clauses, assignment);
            if units == 0 {
                break;
            }
            total.units += units;
            changed = true;
            clauses.deactivate_satisfied(assignment);
        }

        if !changed {
            break;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Cnf;

    fn db(num_variables: usize, clauses: &[&[i64]]) -> ClauseDb {
        ClauseDb::new(Cnf::from_dimacs(num_variables, clauses))
    }

    #[test]
    fn unit_clause_forces_value() {
        let mut clauses = db(3, &[&[1, -2, 3], &[-3]]);
        let mut assignment = Assignment::new(3);

        assert_eq!(unit_propagate(&clauses, &mut assignment), 1);
        assert_eq!(assignment.value(VarIdx::from(2)), Some(false));
        assert_eq!(assignment.order(VarIdx::from(2)), Some(1));
        clauses.deactivate_satisfied(&assignment);

        // two unassigned literals left
        assert_eq!(unit_propagate(&clauses, &mut assignment), 0);

        assignment.assign(VarIdx::from(0), false);
        assert_eq!(unit_propagate(&clauses, &mut assignment), 1);
        assert_eq!(assignment.value(VarIdx::from(1)), Some(false));
        assert_eq!(assignment.order(VarIdx::from(1)), Some(3));
    }

    #[test]
    fn unit_finds_literal_after_assigned_ones() {
        let clauses = db(3, &[&[1, 2, 3]]);
        let mut assignment = Assignment::new(3);
        assignment.assign(VarIdx::from(0), false);
        assignment.assign(VarIdx::from(1), false);

        assert_eq!(unit_propagate(&clauses, &mut assignment), 1);
        assert_eq!(assignment.value(VarIdx::from(2)), Some(true));
    }

    #[test]
    fn unit_counts_only_unassigned_literals() {
        // (x1 ∨ x2) is satisfied by the first unit but still active in the same pass
        let clauses = db(2, &[&[1], &[1, 2], &[-1, -2], &[-2, 1]]);
        let mut assignment = Assignment::new(2);

        assert_eq!(unit_propagate(&clauses, &mut assignment), 2);
        assert_eq!(assignment.value(VarIdx::from(0)), Some(true));
        assert_eq!(assignment.value(VarIdx::from(1)), Some(true));
        assert_eq!(assignment.order(VarIdx::from(1)), Some(2));
        assert!(clauses.has_falsified_active(&assignment));
    }

    #[test]
    fn pure_literals_take_their_polarity() {
        let clauses = db(4, &[&[1, -2], &[1, 3], &[-3, -2]]);
        let mut assignment = Assignment::new(4);

        assert_eq!(eliminate_pure(&clauses, &mut assignment), 3);
        assert_eq!(assignment.value(VarIdx::from(0)), Some(true));
        assert_eq!(assignment.value(VarIdx::from(1)), Some(false));
        // x3 occurs in both polarities
        assert_eq!(assignment.value(VarIdx::from(2)), None);
        // x4 occurs nowhere and defaults to false
        assert_eq!(assignment.value(VarIdx::from(3)), Some(false));
        assert!(assignment.ranks_are_dense());
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut clauses = db(3, &[&[1, 2], &[-1, 2], &[-2, 3], &[-3, -1], &[2]]);
        let mut assignment = Assignment::new(3);

        let first = propagate_to_fixpoint(&mut clauses, &mut assignment);
        assert!(first.units + first.pures > 0);

        assert_eq!(unit_propagate(&clauses, &mut assignment), 0);
        assert_eq!(eliminate_pure(&clauses, &mut assignment), 0);
        assert_eq!(
            propagate_to_fixpoint(&mut clauses, &mut assignment),
            Propagation::default()
        );
        assert!(assignment.ranks_are_dense());
    }
}

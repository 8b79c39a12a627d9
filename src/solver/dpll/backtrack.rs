use super::{
    assignment::{Assignment, VarIdx},
    clauses::ClauseDb,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backtrack {
    /// `variable` now holds its second value; `popped` exhausted ranks above it were unassigned.
    Resumed { variable: VarIdx, popped: usize },
    /// Both values of every rank, the first one included, have been refuted.
    Exhausted,
}

/// Chronological backtracking driven by assignment ranks.
///
/// The assignment order is rebuilt from the ranks of assigned variables and
/// walked from the most recent rank downwards. Flipped variables have had both
/// values refuted and are unassigned. The first unflipped variable takes its
/// other value and the search resumes from there. If the walk unassigns every
/// rank, the formula is unsatisfiable.
///
/// Precondition: ranks are dense (`Assignment::ranks_are_dense`).
pub fn backtrack(clauses: &mut ClauseDb, assignment: &mut Assignment) -> Backtrack {
    debug_assert!(assignment.ranks_are_dense());

    let sequence = assignment.decision_sequence();
    let mut popped = 0;

    for &var in sequence.iter().rev() {
        if !assignment.is_flipped(var) {
            assignment.flip(var);
            clauses.reactivate_all();
            clauses.deactivate_satisfied(assignment);

            return Backtrack::Resumed {
                variable: var,
                popped,
            };
        }

        assignment.unassign(var);
        popped += 1;
    }

    clauses.reactivate_all();
    Backtrack::Exhausted
}

use typed_index_collections::TiVec;

use super::{
    assignment::{Assignment, VarIdx},
    clauses::ClauseDb,
};

/// Picks the unassigned variable with the most positive occurrences in active
/// clauses (lowest index on ties), assigns it true and returns it.
///
/// Returns `None` when every variable is assigned.
pub fn choose_decision(clauses: &ClauseDb, assignment: &mut Assignment) -> Option<VarIdx> {
    let mut counts: TiVec<VarIdx, usize> = TiVec::from(vec![0; assignment.num_variables()]);

    for (_, clause) in clauses.iter_active() {
        for literal in clause.iter().filter(|literal| literal.positive()) {
            let var = VarIdx::from(literal.variable());
            if assignment.value(var).is_none() {
                counts[var] += 1;
            }
        }
    }

    let mut best: Option<(VarIdx, usize)> = None;
    for var in assignment.unassigned() {
        let count = counts[var];
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((var, count));
        }
    }

    let (var, count) = best?;
    let rank = assignment.assign(var, true);
    debug!(
        "Decide {} = true at rank {} ({} positive occurrences)",
        var, rank, count
    );

    Some(var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Cnf;

    #[test]
    fn counts_only_positive_occurrences() {
        let clauses = ClauseDb::new(Cnf::from_dimacs(
            3,
            &[&[-1, 2], &[-1, 3], &[-1, 3], &[2, 3], &[-2, -3]],
        ));
        let mut assignment = Assignment::new(3);

        assert_eq!(
            choose_decision(&clauses, &mut assignment),
            Some(VarIdx::from(2))
        );
        assert_eq!(assignment.value(VarIdx::from(2)), Some(true));
        assert_eq!(assignment.order(VarIdx::from(2)), Some(1));
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let clauses = ClauseDb::new(Cnf::from_dimacs(3, &[&[1, 2, 3], &[-1, -2, -3]]));
        let mut assignment = Assignment::new(3);
        assignment.assign(VarIdx::from(0), false);

        assert_eq!(
            choose_decision(&clauses, &mut assignment),
            Some(VarIdx::from(1))
        );
        assert_eq!(
            choose_decision(&clauses, &mut assignment),
            Some(VarIdx::from(2))
        );
        assert_eq!(choose_decision(&clauses, &mut assignment), None);
        assert_eq!(assignment.num_assigned(), 3);
    }
}

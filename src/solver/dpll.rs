use std::fmt::Display;

use crate::formula::{Cnf, Model};

use self::{
    assignment::Assignment,
    backtrack::{backtrack, Backtrack},
    branch::choose_decision,
    clauses::ClauseDb,
    propagate::propagate_to_fixpoint,
};

use super::Solver;

mod assignment;
mod backtrack;
mod branch;
mod clauses;
mod propagate;

/// Search statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Branching decisions made.
    pub decisions: usize,
    /// Falsified clauses hit.
    pub conflicts: usize,
    /// Ranks switched to their second value.
    pub flips: usize,
    /// Variables forced by unit propagation.
    pub unit_assignments: usize,
    /// Variables fixed by pure literal elimination.
    pub pure_assignments: usize,
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} decisions, {} conflicts, {} flips, {} unit and {} pure assignments",
            self.decisions,
            self.conflicts,
            self.flips,
            self.unit_assignments,
            self.pure_assignments
        )
    }
}

/// DPLL solver with chronological backtracking.
///
/// The solver keeps no decision stack. Every assigned variable carries its rank
/// in the assignment order and a flag telling whether its value was already
/// reversed, and backtracking rebuilds the order from those ranks.
#[derive(Debug)]
pub struct DpllSolver {
    clauses: ClauseDb,
    assignment: Assignment,
    stats: Stats,
}

impl DpllSolver {
    /// Solves the formula and returns the statistics of the search alongside the model.
    pub fn solve_with_stats(mut self) -> (Option<Model>, Stats) {
        let satisfiable = self.search();
        let stats = self.stats;

        let model = if satisfiable {
            let assignment = self.assignment.to_vec();
            Some(Model::new(self.clauses.into_formula(), assignment))
        } else {
            None
        };

        (model, stats)
    }

    /// Runs the search loop until the formula is satisfied or refuted.
    fn search(&mut self) -> bool {
        loop {
            let propagation = propagate_to_fixpoint(&mut self.clauses, &mut self.assignment);
            self.stats.unit_assignments += propagation.units;
            self.stats.pure_assignments += propagation.pures;

            if self.clauses.all_inactive() {
                debug!("All clauses satisfied");
                return true;
            }

            if choose_decision(&self.clauses, &mut self.assignment).is_some() {
                self.stats.decisions += 1;
                self.clauses.deactivate_satisfied(&self.assignment);

                if self.clauses.all_inactive() {
                    debug!("All clauses satisfied");
                    return true;
                }
            } else {
                // a total assignment leaves an active clause only if it is falsified
                debug_assert!(self.clauses.has_falsified_active(&self.assignment));
            }

            if let Some(clause) = self.clauses.falsified_active(&self.assignment) {
                self.stats.conflicts += 1;
                debug!(
                    "Conflict on clause {} {} with {} variables assigned and {} clauses active",
                    clause,
                    self.clauses.clause(clause),
                    self.assignment.num_assigned(),
                    self.clauses.num_active()
                );

                match backtrack(&mut self.clauses, &mut self.assignment) {
                    Backtrack::Resumed { variable, popped } => {
                        self.stats.flips += 1;
                        debug!(
                            "Backtrack: popped {} ranks, {} at rank {:?} flipped to {:?}",
                            popped,
                            variable,
                            self.assignment.order(variable),
                            self.assignment.value(variable)
                        );
                    }
                    Backtrack::Exhausted => {
                        debug!("Every rank exhausted");
                        return false;
                    }
                }
            }

            debug_assert!(self.assignment.ranks_are_dense());
        }
    }
}

impl Solver for DpllSolver {
    fn new(formula: Cnf) -> Self {
        let num_variables = formula.num_variables();

        DpllSolver {
            clauses: ClauseDb::new(formula),
            assignment: Assignment::new(num_variables),
            stats: Stats::default(),
        }
    }

    fn solve(self) -> Option<Model> {
        let (model, stats) = self.solve_with_stats();
        info!(
            "{}: {}",
            if model.is_some() { "SAT" } else { "UNSAT" },
            stats
        );
        model
    }
}

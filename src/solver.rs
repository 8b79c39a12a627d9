use crate::formula::{Cnf, Model};

mod dpll;

pub use dpll::{DpllSolver, Stats};

pub trait Solver {
    /// Creates a new solver instance that owns the formula for the whole search.
    fn new(formula: Cnf) -> Self;

    /// Solves a CNF SAT problem with the solver.
    /// Returns `Some(Model)` if satisfiable, `None` otherwise.
    fn solve(self) -> Option<Model>;
}

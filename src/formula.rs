/*!
A module to represent conjunctive normal form formula.
*/

use std::{convert::TryInto, fmt::Display, num::NonZeroU32, str::FromStr};

use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum LiteralParseError {
    #[snafu(display("Failed to parse literal '{}' as an integer", literal))]
    ParseIntError {
        literal: String,
        source: std::num::ParseIntError,
    },
    #[snafu(display(
        "Variable ID {} is out of range (must be within 1 to {})",
        num,
        Variable::MAX_VARIABLE_ID
    ))]
    RangeError { num: u64 },
}

#[derive(Debug, Snafu)]
pub enum FormulaError {
    #[snafu(display("Clause {} is empty", clause_index))]
    EmptyClause { clause_index: usize },
    #[snafu(display(
        "Clause {} mentions {}, but the formula only has {} variables",
        clause_index,
        variable,
        num_variables
    ))]
    VariableOutOfRange {
        clause_index: usize,
        variable: Variable,
        num_variables: usize,
    },
}

/// Newtype wrapper for variable ID.
/// Invariant: 0 < ID <= MAX_VARIABLE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(NonZeroU32);

impl Variable {
    pub const MAX_VARIABLE_ID: usize = std::u32::MAX as usize;
}

impl Variable {
    /// DIMACS ID of the variable, starting from 1.
    pub fn id(&self) -> u32 {
        self.0.get()
    }

    pub fn as_index(&self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Creates a variable from a raw index.
    /// Returns `None` if the index is invalid.
    pub fn from_index(index: usize) -> Option<Self> {
        let id = index.checked_add(1)?;
        if id > Variable::MAX_VARIABLE_ID {
            return None;
        }
        Some(Variable(NonZeroU32::new(id.try_into().ok()?)?))
    }

    /// Creates a variable from a DIMACS ID.
    /// Returns `None` for zero or an ID that does not fit.
    pub fn from_id(id: u64) -> Option<Self> {
        let id: u32 = id.try_into().ok()?;
        NonZeroU32::new(id).map(Variable)
    }
}

impl FromStr for Variable {
    type Err = LiteralParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let num = s
            .parse::<u64>()
            .context(ParseIntError { literal: s.to_owned() })?;
        Variable::from_id(num).context(RangeError { num })
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    id: Variable,
    positive: bool,
}

impl Literal {
    pub fn new(id: Variable, positive: bool) -> Self {
        Literal { id, positive }
    }

    pub fn variable(&self) -> Variable {
        self.id
    }

    pub fn positive(&self) -> bool {
        self.positive
    }

    /// Truth value of the literal when its variable takes `value`.
    pub fn evaluate(&self, value: bool) -> bool {
        value == self.positive
    }

    /// Signed DIMACS representation, e.g. `-3` for `¬x3`.
    pub fn to_dimacs(&self) -> i64 {
        let id = i64::from(self.id.id());
        if self.positive {
            id
        } else {
            -id
        }
    }
}

impl FromStr for Literal {
    type Err = LiteralParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (positive, id) = match s.strip_prefix('-') {
            Some(rest) => (false, rest.parse()?),
            None => (true, s.parse()?),
        };

        Ok(Literal { id, positive })
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", if self.positive { "" } else { "¬" }, self.id)
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal {
            id: self.id,
            positive: !self.positive,
        }
    }
}

/// Disjunction of literals
#[derive(Debug, Clone)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    pub fn num_literals(&self) -> usize {
        self.literals.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.iter().copied()
    }

    /// Returns true if any literal is satisfied by the total `assignment`.
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        self.iter()
            .any(|literal| literal.evaluate(assignment[literal.variable().as_index()]))
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;

        let mut iter = self.literals.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for literal in iter {
            write!(f, " ∨ {}", literal)?;
        }

        write!(f, ")")?;

        Ok(())
    }
}

/// Formula representation in Conjunctive Normal Form
#[derive(Debug, Clone)]
pub struct Cnf {
    num_variables: usize,
    clauses: Vec<Clause>,
}

impl Cnf {
    pub fn new(num_variables: usize) -> Self {
        assert!(num_variables <= Variable::MAX_VARIABLE_ID);

        Cnf {
            num_variables,
            clauses: Vec::new(),
        }
    }

    /// Builds a formula from signed DIMACS literals.
    ///
    /// # Panics
    ///
    /// Panics if a literal is zero or the resulting formula is invalid.
    #[cfg(test)]
    pub fn from_dimacs(num_variables: usize, clauses: &[&[i64]]) -> Self {
        let mut cnf = Cnf::new(num_variables);
        for raw in clauses {
            let literals = raw
                .iter()
                .map(|&num| {
                    let variable = Variable::from_id(num.unsigned_abs()).expect("zero literal");
                    Literal::new(variable, num > 0)
                })
                .collect();
            cnf.add_clause(Clause::new(literals))
                .expect("invalid clause");
        }
        cnf
    }

    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    pub fn clauses(&self) -> &Vec<Clause> {
        &self.clauses
    }

    /// Adds a clause after checking that it is non-empty and every variable is in range.
    pub fn add_clause(&mut self, clause: Clause) -> Result<(), FormulaError> {
        let clause_index = self.clauses.len();
        ensure!(clause.num_literals() > 0, EmptyClause { clause_index });

        if let Some(literal) = clause
            .iter()
            .find(|literal| literal.variable().as_index() >= self.num_variables)
        {
            return VariableOutOfRange {
                clause_index,
                variable: literal.variable(),
                num_variables: self.num_variables,
            }
            .fail();
        }

        self.clauses.push(clause);
        Ok(())
    }

    /// Returns true if every clause is satisfied by the total `assignment`.
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        assignment.len() == self.num_variables
            && self.clauses.iter().all(|clause| clause.is_satisfied_by(assignment))
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CNF with {} variables (", self.num_variables)?;

        let mut iter = self.clauses.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for clause in iter {
            write!(f, " ∧ {}", clause)?;
        }

        write!(f, ")")?;

        Ok(())
    }
}

/// Represents a satisfying assignment for a formula.
#[derive(Debug)]
pub struct Model {
    formula: Cnf,
    assignment: Vec<bool>,
}

impl Model {
    /// Creates a new model from a formula and an assignment.
    ///
    /// # Panics
    ///
    /// Panics when `assignment` is invalid (e.g., length mismatch, unsatisfying).
    pub fn new(formula: Cnf, assignment: Vec<bool>) -> Self {
        assert!(assignment.len() == formula.num_variables());
        assert!(
            formula.is_satisfied_by(&assignment),
            "assignment does not satisfy the formula"
        );

        Model {
            formula,
            assignment,
        }
    }

    pub fn formula(&self) -> &Cnf {
        &self.formula
    }

    pub fn assignment(&self) -> &[bool] {
        &self.assignment
    }

    pub fn value(&self, variable: Variable) -> bool {
        self.assignment[variable.as_index()]
    }

    /// Assignment as signed DIMACS literals in ascending variable order.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.assignment.iter().enumerate().filter_map(|(idx, &val)| {
            Variable::from_index(idx).map(|variable| Literal::new(variable, val))
        })
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model for {}\nAssignment:", self.formula)?;
        for variable in self.literals().map(|literal| literal.variable()) {
            write!(f, "\n  {}: {}", variable, self.value(variable))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_parsing() {
        let literal: Literal = "-3".parse().unwrap();
        assert_eq!(literal.variable().id(), 3);
        assert!(!literal.positive());
        assert_eq!(literal.to_dimacs(), -3);
        assert_eq!((!literal).to_dimacs(), 3);

        assert!(matches!(
            "0".parse::<Literal>(),
            Err(LiteralParseError::RangeError { num: 0 })
        ));
        assert!(matches!(
            "abc".parse::<Literal>(),
            Err(LiteralParseError::ParseIntError { .. })
        ));
    }

    #[test]
    fn add_clause_checks_range() {
        let mut cnf = Cnf::new(2);
        let x3 = Variable::from_id(3).unwrap();

        assert!(matches!(
            cnf.add_clause(Clause::new(vec![Literal::new(x3, true)])),
            Err(FormulaError::VariableOutOfRange { clause_index: 0, .. })
        ));
        assert!(matches!(
            cnf.add_clause(Clause::new(Vec::new())),
            Err(FormulaError::EmptyClause { clause_index: 0 })
        ));
        assert!(cnf.clauses().is_empty());
    }

    #[test]
    fn satisfaction_check() {
        let cnf = Cnf::from_dimacs(2, &[&[1, 2], &[-1, 2]]);

        assert!(cnf.is_satisfied_by(&[false, true]));
        assert!(!cnf.is_satisfied_by(&[true, false]));
        assert!(!cnf.is_satisfied_by(&[true]));
    }

    #[test]
    #[should_panic(expected = "assignment does not satisfy the formula")]
    fn model_rejects_unsatisfying_assignment() {
        let cnf = Cnf::from_dimacs(1, &[&[1]]);
        Model::new(cnf, vec![false]);
    }

    #[test]
    fn model_display_lists_values() {
        let model = Model::new(Cnf::from_dimacs(2, &[&[1, -2]]), vec![true, false]);

        assert!(model.value(Variable::from_id(1).unwrap()));
        assert_eq!(
            model.to_string(),
            "Model for CNF with 2 variables ((x1 ∨ ¬x2))\nAssignment:\n  x1: true\n  x2: false"
        );
    }
}

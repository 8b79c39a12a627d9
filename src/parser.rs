use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::formula::{Clause, Cnf, FormulaError, Literal, LiteralParseError, Variable};
use crate::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to open CNF file '{}'", path.display()))]
    OpenError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("I/O error occurred while reading line {}", line_number))]
    ReadError {
        line_number: usize,
        source: std::io::Error,
    },
    #[snafu(display("Invalid literal found in clause '{}' (line {})", clause, line_number))]
    MalformedLiteral {
        clause: String,
        line_number: usize,
        source: LiteralParseError,
    },
    #[snafu(display("Invalid clause ending on line {}", line_number))]
    InvalidClause {
        line_number: usize,
        source: FormulaError,
    },
    #[snafu(display("Clause found on line {} before the problem line", line_number))]
    ClauseBeforeProblemDefinition { line_number: usize },
    #[snafu(display("Problem line 'p cnf <num_variables> <num_clauses>' is not found"))]
    MissingProblemDefinition,
    #[snafu(display(
        "Problem line '{}' is malformed, expected 'p cnf <num_variables> <num_clauses>' with positive counts",
        line
    ))]
    MalformedProblemDefinition { line: String },
    #[snafu(display("Second problem line found on line {}", line_number))]
    DuplicateProblemDefinition { line_number: usize },
    #[snafu(display("The last clause is not terminated by 0"))]
    UnterminatedClause,
    #[snafu(display(
        "The number of clauses ({}) does not match the clauses number in the problem definition ({})",
        found,
        expected,
    ))]
    ClauseCountMismatch { expected: usize, found: usize },
}

/// Parses `p cnf <num_variables> <num_clauses>`.
fn parse_problem_line(line: &str) -> Result<(usize, usize), Error> {
    let splitted = line.split_whitespace().collect::<Vec<_>>();

    // We only support CNF DIMACS format
    ensure!(
        splitted.len() == 4 && splitted[0] == "p" && splitted[1] == "cnf",
        MalformedProblemDefinition { line }
    );

    match (splitted[2].parse::<usize>(), splitted[3].parse::<usize>()) {
        (Ok(num_variables), Ok(num_clauses))
            if num_variables > 0
                && num_variables <= Variable::MAX_VARIABLE_ID
                && num_clauses > 0 =>
        {
            Ok((num_variables, num_clauses))
        }
        _ => MalformedProblemDefinition { line }.fail(),
    }
}

/// Parses a CNF formula in DIMACS format.
///
/// Clauses are terminated by `0` and may span lines. A `%` line ends the input.
pub fn parse_reader(reader: impl BufRead) -> Result<Cnf, Error> {
    // formula under construction and the declared clause count
    let mut problem: Option<(Cnf, usize)> = None;
    let mut pending: Vec<Literal> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.context(ReadError { line_number })?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('c') {
            // empty line, comment
            continue;
        }
        if trimmed.starts_with('%') {
            break;
        }
        if trimmed.starts_with('p') {
            ensure!(
                problem.is_none(),
                DuplicateProblemDefinition { line_number }
            );
            let (num_variables, num_clauses) = parse_problem_line(trimmed)?;
            problem = Some((Cnf::new(num_variables), num_clauses));
            continue;
        }

        let (cnf, _) = problem
            .as_mut()
            .context(ClauseBeforeProblemDefinition { line_number })?;

        for token in trimmed.split_whitespace() {
            if token == "0" {
                let clause = Clause::new(std::mem::take(&mut pending));
                cnf.add_clause(clause)
                    .context(InvalidClause { line_number })?;
            } else {
                let literal = token.parse::<Literal>().context(MalformedLiteral {
                    clause: trimmed,
                    line_number,
                })?;
                pending.push(literal);
            }
        }
    }

    let (cnf, num_clauses) = problem.context(MissingProblemDefinition)?;

    ensure!(pending.is_empty(), UnterminatedClause);
    ensure!(
        cnf.clauses().len() == num_clauses,
        ClauseCountMismatch {
            found: cnf.clauses().len(),
            expected: num_clauses,
        }
    );

    debug!(
        "Parsed CNF with {} variables and {} clauses",
        cnf.num_variables(),
        num_clauses
    );

    Ok(cnf)
}

/// Parses CNF formula from a string
pub fn parse_str(text: &str) -> Result<Cnf, Error> {
    parse_reader(text.as_bytes())
}

/// Parses CNF formula from a file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf, Error> {
    let path = path.as_ref();
    let file = File::open(path).context(OpenError {
        path: path.to_owned(),
    })?;

    parse_reader(BufReader::new(file))
}

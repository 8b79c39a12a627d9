use std::{env::args, path::Path, process};

use pretty_env_logger::formatted_builder;
use rankdpll::{
    formula::Model,
    parser::{self, parse_file},
    prelude::*,
    report::Report,
    solver::{DpllSolver, Solver},
};

fn usage_string() -> String {
    format!(
        "Usage: {} <command> <file_name>

command:
    check <file_name> - solve the DIMACS CNF file and print the verdict with a 'v' model line
    model <file_name> - solve the DIMACS CNF file and print the verdict with a readable model",
        args().next().unwrap_or_else(|| "rankdpll".to_owned())
    )
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unknown command '{}'\n\n{}", name, usage_string()))]
    UnknownCommand { name: String },
    #[snafu(display("Failed to parse CNF"))]
    ParserError { source: parser::Error },
    #[snafu(display("Required argument does not exist\n\n{}", usage_string()))]
    MissingArgument,
}

impl Error {
    fn exit_code(&self) -> i32 {
        match self {
            Error::UnknownCommand { .. } | Error::MissingArgument => 1,
            Error::ParserError {
                source: parser::Error::OpenError { .. },
            } => 2,
            Error::ParserError { .. } => 3,
        }
    }
}

fn solve_path(path: &Path) -> Result<Option<Model>, Error> {
    let formula = parse_file(path).context(ParserError)?;
    let solver = DpllSolver::new(formula);
    Ok(solver.solve())
}

/// Prints the verdict in SAT competition style.
fn print_verdict(result: &Option<Model>, readable: bool) {
    match result {
        Some(model) => {
            println!("s SATISFIABLE");
            if readable {
                println!("{}", model);
            } else {
                let literals = model
                    .literals()
                    .map(|literal| literal.to_dimacs().to_string())
                    .collect::<Vec<_>>();
                println!("v {} 0", literals.join(" "));
            }
        }
        None => println!("s UNSATISFIABLE"),
    }
}

fn dispatch_command(args: Vec<String>) -> Result<(), Error> {
    match args.get(0).map(|s| s.as_str()) {
        Some(command @ "check") | Some(command @ "model") => {
            let path = args.get(1).context(MissingArgument)?;
            let result = solve_path(path.as_ref())?;
            print_verdict(&result, command == "model");
        }
        Some(name) => UnknownCommand {
            name: name.to_owned(),
        }
        .fail()?,
        None => {
            println!("{}", usage_string());
        }
    }

    Ok(())
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else if cfg!(debug_assertions) {
        builder.parse_filters("rankdpll=debug");
    } else {
        builder.parse_filters("rankdpll=warn");
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() {
    init_logger();

    // drop arg[0]
    let remaining: Vec<_> = args().skip(1).collect();

    if let Err(error) = dispatch_command(remaining) {
        let code = error.exit_code();
        let report = Report::new(error, code);
        eprint!("{}", report);
        process::exit(report.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankdpll::{parser::parse_str, prelude::*};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn usage_errors_exit_with_1() {
        let err = dispatch_command(args(&["solve", "a.cnf"])).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));
        assert_eq!(err.exit_code(), 1);

        let err = dispatch_command(args(&["check"])).unwrap_err();
        assert!(matches!(err, Error::MissingArgument));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn unreadable_file_exits_with_2() {
        let err = dispatch_command(args(&["check", "testcases/does_not_exist.cnf"])).unwrap_err();
        assert!(matches!(
            err,
            Error::ParserError {
                source: parser::Error::OpenError { .. }
            }
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn malformed_input_exits_with_3() {
        let err = parse_str("p cnf 1 1\n2 0\n")
            .context(ParserError)
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let err = parse_str("p cnf 1 2\n1 0\n")
            .context(ParserError)
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}

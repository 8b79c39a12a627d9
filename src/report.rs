/*!
Error report for the command line front end.

Snafu errors nest their causes through `source()`, so the report prints the
top-level message followed by every cause in order.
*/

use std::{error::Error as StdError, fmt};

pub struct Report {
    error: Box<dyn StdError>,
    exit_code: i32,
}

impl Report {
    pub fn new(error: impl Into<Box<dyn StdError>>, exit_code: i32) -> Self {
        Report {
            error: error.into(),
            exit_code,
        }
    }

    /// Process exit code associated with the failure.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Iterates over the causes of the reported error, outermost first.
    pub fn causes(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        std::iter::successors(self.error.source(), |&e| e.source())
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.error)?;

        let mut causes = self.causes().peekable();
        if causes.peek().is_some() {
            writeln!(f, "\nCaused by:")?;
            for (i, cause) in causes.enumerate() {
                writeln!(f, "  {}: {}", i, cause)?;
            }
        }

        Ok(())
    }
}

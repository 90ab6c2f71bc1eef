use std::error::Error;

use super::exit_code::ExitCode;

pub struct CliResult<T, E: Error> {
    inner: Result<T, E>,
}

impl<T, E> CliResult<T, E>
where
    E: Error,
    for<'a> &'a E: Into<ExitCode>,
{
    pub fn new(inner: Result<T, E>) -> Self {
        CliResult { inner }
    }

    /// Prints the error and exits the process with its code. Returns the
    /// success value otherwise.
    pub fn exit_on_error(self) -> T {
        match self.inner {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Error: {}", e);
                let exit_code: ExitCode = (&e).into();
                std::process::exit(exit_code as i32);
            }
        }
    }
}

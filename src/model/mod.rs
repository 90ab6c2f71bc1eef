pub mod cli_error;
pub mod cli_output;
pub mod config;
pub mod exit_code;
pub mod outcome;
pub mod platform;

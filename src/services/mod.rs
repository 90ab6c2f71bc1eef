pub mod aws_cli;
pub mod download;
pub mod host;
pub mod process;

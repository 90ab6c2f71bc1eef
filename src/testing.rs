//! In-memory stand-ins for the host, the network and the `aws` executable.

use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    model::{cli_error::CliError, platform::PlatformTarget},
    services::{
        download::Fetcher,
        host::Host,
        process::{CommandOutput, CommandRunner, Invocation},
    },
};

struct Rule {
    needle: String,
    code: i32,
    output: String,
}

/// Records every invocation. Calls succeed with empty output unless a rule
/// matches one of their arguments.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<Invocation>>,
    rules: Mutex<Vec<Rule>>,
}

impl FakeRunner {
    pub fn fail_when(&self, needle: &str, code: i32, output: &str) {
        self.respond_when(needle, code, output);
    }

    pub fn respond_when(&self, needle: &str, code: i32, output: &str) {
        self.rules.lock().unwrap().push(Rule {
            needle: needle.to_owned(),
            code,
            output: output.to_owned(),
        });
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Each call as `program arg arg ..` with secrets in the clear.
    pub fn arg_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| {
                std::iter::once(c.program.display().to_string())
                    .chain(c.args.iter().cloned())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        let rules = self.rules.lock().unwrap();
        let rule = rules
            .iter()
            .find(|r| invocation.args.iter().any(|a| a == &r.needle));
        Ok(match rule {
            Some(rule) => CommandOutput {
                code: Some(rule.code),
                output: rule.output.clone(),
            },
            None => CommandOutput {
                code: Some(0),
                output: String::new(),
            },
        })
    }
}

pub struct FakeHost {
    pub platform: PlatformTarget,
    pub installed: Option<PathBuf>,
    pub sudo: bool,
    pub prepended: Mutex<Vec<PathBuf>>,
    lookups: AtomicUsize,
}

impl FakeHost {
    pub fn new(os: &str, arch: &str) -> Self {
        FakeHost {
            platform: PlatformTarget::new(os, arch),
            installed: None,
            sudo: false,
            prepended: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_aws(mut self, path: &str) -> Self {
        self.installed = Some(PathBuf::from(path));
        self
    }

    pub fn with_sudo(mut self) -> Self {
        self.sudo = true;
        self
    }

    pub fn prepended(&self) -> Vec<PathBuf> {
        self.prepended.lock().unwrap().clone()
    }

    /// How often the platform was asked for.
    pub fn platform_lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Host for FakeHost {
    fn platform(&self) -> PlatformTarget {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.platform.clone()
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        match name {
            "aws" => self.installed.clone(),
            "sudo" if self.sudo => Some(PathBuf::from("/usr/bin/sudo")),
            _ => None,
        }
    }

    fn prepend_to_path(&self, dir: &Path) -> Result<(), CliError> {
        self.prepended.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }
}

/// Serves a fixed body for every URL and remembers what was requested.
pub struct FakeFetcher {
    body: Vec<u8>,
    fail: bool,
    pub requests: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeFetcher {
    pub fn serving(body: Vec<u8>) -> Self {
        FakeFetcher {
            body,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serves a zip laid out like the official Linux bundle.
    pub fn serving_linux_bundle() -> Self {
        Self::serving(linux_bundle())
    }

    pub fn failing() -> Self {
        FakeFetcher {
            body: Vec::new(),
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, PathBuf)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, CliError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_owned(), dest.to_path_buf()));
        if self.fail {
            return Err(CliError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        std::fs::write(dest, &self.body)?;
        Ok(self.body.len() as u64)
    }
}

fn linux_bundle() -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        zip.add_directory("aws/", options).unwrap();
        zip.start_file("aws/install", options).unwrap();
        zip.write_all(b"#!/bin/sh\nexit 0\n").unwrap();
        zip.finish().unwrap();
    }
    buf.into_inner()
}

//! Launcher for a local `run-bmi-server` process.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use tracing::{event, Level};

use super::{connect, ChildProcess, LaunchedBmiClient, LOCALHOST};
use crate::bmi::BmiResult;
use crate::client::{free_port, ClientSettings};

/// Name of the server executable.
pub const RUN_BMI_SERVER: &str = "run-bmi-server";

/// Options for launching a BMI server as a subprocess
#[derive(Clone, Debug)]
pub struct SubProcessLauncher {
    /// Model name, `module.Class`
    pub name: String,
    /// Server executable
    pub program: PathBuf,
    /// Directory the server works in
    pub path: Option<PathBuf>,
    /// Extra arguments passed to the server
    pub args: Vec<String>,
    /// Collect the server output for [LaunchedBmiClient::logs]
    pub capture_logs: bool,
    /// Time the server gets to start
    pub delay: Duration,
    pub settings: ClientSettings,
}

impl SubProcessLauncher {
    pub fn new<S: Into<String>>(name: S) -> Self {
        SubProcessLauncher {
            name: name.into(),
            program: PathBuf::from(RUN_BMI_SERVER),
            path: None,
            args: vec![],
            capture_logs: true,
            delay: Duration::from_secs(1),
            settings: ClientSettings::default(),
        }
    }

    fn command_args(&self, port: u16) -> Vec<String> {
        let mut args = vec![
            "--name".to_string(),
            self.name.clone(),
            "--port".to_string(),
            port.to_string(),
        ];
        if let Some(path) = &self.path {
            args.push("--path".to_string());
            args.push(path.display().to_string());
        }
        args.extend(self.args.iter().cloned());
        args
    }

    /// Start the server and connect to it.
    pub fn launch(self) -> BmiResult<LaunchedBmiClient<ChildProcess>> {
        let port = free_port(LOCALHOST)?;
        let mut command = Command::new(&self.program);
        command.args(self.command_args(port));
        event!(Level::INFO, name = %self.name, port, "starting BMI server subprocess");
        let process = ChildProcess::spawn(command, self.capture_logs)?;

        let program = self.program.display().to_string();
        connect(process, port, self.delay, self.settings, |exit_code, _| {
            format!(
                "{} prematurely exited with code {}",
                program, exit_code
            )
        })
    }
}

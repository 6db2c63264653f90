//! Apptainer and Singularity launcher.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use semver::Version;
use tracing::{event, Level};

use super::{connect, ChildProcess, LaunchedBmiClient, ServerDirs, LOCALHOST};
use crate::bmi::BmiResult;
use crate::client::{free_port, ClientSettings};
use crate::error::BmiError;

/// Container engine
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Engine {
    Apptainer,
    Singularity,
}

impl Engine {
    /// Name of the engine executable.
    pub fn program(self) -> &'static str {
        match self {
            Engine::Apptainer => "apptainer",
            Engine::Singularity => "singularity",
        }
    }

    /// Oldest supported version.
    pub fn supported_version(self) -> &'static str {
        match self {
            Engine::Apptainer => "1.0.0-rc.2",
            Engine::Singularity => "3.6.0",
        }
    }

    /// Check the output of `<engine> --version`.
    ///
    /// The version is the last word of the output, compared by semver precedence.
    pub fn check_version_string(self, output: &str) -> BmiResult<()> {
        let found = output.trim();
        let version = found.split_whitespace().last().unwrap_or_default();
        let version = Version::parse(version.trim_start_matches('v'))?;
        let supported = Version::parse(self.supported_version())?;
        if version < supported {
            return Err(BmiError::UnsupportedVersion {
                program: self.program(),
                found: found.to_string(),
                supported: self.supported_version(),
            });
        }
        Ok(())
    }

    /// Check the version of the installed engine.
    pub fn check_version(self) -> BmiResult<()> {
        let output = Command::new(self.program()).arg("--version").output()?;
        if !output.status.success() {
            return Err(BmiError::Launcher(format!(
                "Unable to determine {} version",
                self.program()
            )));
        }
        self.check_version_string(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Options for launching a BMI server with Apptainer or Singularity
#[derive(Clone, Debug)]
pub struct ApptainerLauncher {
    pub engine: Engine,
    /// Image that runs a BMI server, for example `docker://ewatercycle/walrus-grpc4bmi:v0.2.0`
    pub image: String,
    /// Read-only input directories
    pub input_dirs: Vec<PathBuf>,
    /// Read-write working directory of the server
    pub work_dir: PathBuf,
    /// Collect the container output for [LaunchedBmiClient::logs]
    pub capture_logs: bool,
    /// Time the server gets to start
    pub delay: Duration,
    pub settings: ClientSettings,
}

impl ApptainerLauncher {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(engine: Engine, image: S, work_dir: P) -> Self {
        ApptainerLauncher {
            engine,
            image: image.into(),
            input_dirs: vec![],
            work_dir: work_dir.into(),
            capture_logs: true,
            delay: Duration::ZERO,
            settings: ClientSettings::default(),
        }
    }

    /// Arguments of `<engine> run`.
    fn run_args(&self, dirs: &ServerDirs, port: u16) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--contain".to_string(),
            "--env".to_string(),
            format!("BMI_PORT={}", port),
        ];
        for dir in &dirs.input_dirs {
            args.push("--bind".to_string());
            args.push(format!("{}:{}:ro", dir.display(), dir.display()));
        }
        args.push("--bind".to_string());
        args.push(format!(
            "{}:{}:rw",
            dirs.work_dir.display(),
            dirs.work_dir.display()
        ));
        args.push("--pwd".to_string());
        args.push(dirs.work_dir.display().to_string());
        args.push(self.image.clone());
        args
    }

    /// Start the container and connect to it.
    pub fn launch(self) -> BmiResult<LaunchedBmiClient<ChildProcess>> {
        let dirs = ServerDirs::new(&self.input_dirs, &self.work_dir)?;
        self.engine.check_version()?;
        let port = free_port(LOCALHOST)?;
        let mut command = Command::new(self.engine.program());
        command.args(self.run_args(&dirs, port));
        event!(Level::INFO, image = %self.image, port, "starting {} container", self.engine.program());
        let process = ChildProcess::spawn(command, self.capture_logs)?;

        let program = self.engine.program();
        let image = self.image;
        connect(process, port, self.delay, self.settings, |exit_code, _| {
            format!(
                "{} container {} prematurely exited with code {}",
                program, image, exit_code
            )
        })
    }
}

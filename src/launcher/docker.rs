//! Docker launcher.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::{event, Level};
use uuid::Uuid;

use super::{connect, LaunchedBmiClient, ServerDirs, ServerProcess, LOCALHOST};
use crate::bmi::BmiResult;
use crate::client::{free_port, ClientSettings};
use crate::error::BmiError;

/// Port the server inside an image listens on by default.
pub const DEFAULT_IMAGE_PORT: u16 = 50051;

/// Run a command and return its stdout, failing on a non-zero exit.
fn docker(args: &[String]) -> BmiResult<String> {
    let output = Command::new("docker").args(args).output()?;
    if !output.status.success() {
        return Err(BmiError::Launcher(format!(
            "docker {} failed: {}",
            args.first().map(String::as_str).unwrap_or_default(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// A BMI server running in a Docker container.
#[derive(Debug)]
pub struct DockerContainer {
    name: String,
    remove: bool,
}

impl DockerContainer {
    /// Returns the container name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ServerProcess for DockerContainer {
    fn exit_code(&mut self) -> BmiResult<Option<i32>> {
        // Removed containers cannot be inspected once they exit.
        if self.remove {
            return Ok(None);
        }
        let state = docker(&[
            "inspect".to_string(),
            "--format".to_string(),
            "{{.State.Running}} {{.State.ExitCode}}".to_string(),
            self.name.clone(),
        ])?;
        parse_state(&state)
    }

    fn logs(&self) -> BmiResult<String> {
        let output = Command::new("docker")
            .args(["logs", &self.name])
            .output()?;
        Ok(format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ))
    }

    fn stop(&mut self) -> BmiResult<()> {
        event!(Level::DEBUG, name = %self.name, "stopping container");
        docker(&["stop".to_string(), self.name.clone()])?;
        Ok(())
    }
}

/// Parse `docker inspect` output of the form `<running> <exit code>`.
fn parse_state(state: &str) -> BmiResult<Option<i32>> {
    let mut fields = state.split_whitespace();
    match (fields.next(), fields.next().map(str::parse::<i32>)) {
        (Some("true"), _) => Ok(None),
        (Some("false"), Some(Ok(exit_code))) => Ok(Some(exit_code)),
        _ => Err(BmiError::Launcher(format!(
            "unexpected container state {:?}",
            state.trim()
        ))),
    }
}

/// Options for launching a BMI server with Docker
#[derive(Clone, Debug)]
pub struct DockerLauncher {
    /// Docker image that runs a BMI server
    pub image: String,
    /// Port the server inside the image listens on
    pub image_port: u16,
    /// Read-only input directories
    pub input_dirs: Vec<PathBuf>,
    /// Read-write working directory of the server
    pub work_dir: PathBuf,
    /// `uid:gid` to run as. Defaults to the owner of the work directory.
    pub user: Option<String>,
    /// Remove the container when it stops
    pub remove: bool,
    /// Time the server gets to start
    pub delay: Duration,
    pub settings: ClientSettings,
}

impl DockerLauncher {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(image: S, work_dir: P) -> Self {
        DockerLauncher {
            image: image.into(),
            image_port: DEFAULT_IMAGE_PORT,
            input_dirs: vec![],
            work_dir: work_dir.into(),
            user: None,
            remove: false,
            delay: Duration::from_secs(5),
            settings: ClientSettings::default(),
        }
    }

    /// Arguments of `docker run`.
    fn run_args(&self, dirs: &ServerDirs, name: &str, port: u16, user: &str) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--detach".to_string(),
            "--name".to_string(),
            name.to_string(),
            "--publish".to_string(),
            format!("{}:{}:{}", LOCALHOST, port, self.image_port),
            "--user".to_string(),
            user.to_string(),
        ];
        for dir in &dirs.input_dirs {
            args.push("--volume".to_string());
            args.push(format!("{}:{}:ro", dir.display(), dir.display()));
        }
        args.push("--volume".to_string());
        args.push(format!(
            "{}:{}:rw",
            dirs.work_dir.display(),
            dirs.work_dir.display()
        ));
        args.push("--workdir".to_string());
        args.push(dirs.work_dir.display().to_string());
        if self.remove {
            args.push("--rm".to_string());
        }
        args.push(self.image.clone());
        args
    }

    /// Start the container and connect to it.
    pub fn launch(self) -> BmiResult<LaunchedBmiClient<DockerContainer>> {
        let dirs = ServerDirs::new(&self.input_dirs, &self.work_dir)?;
        let user = match &self.user {
            Some(user) => user.clone(),
            None => owner(&dirs.work_dir)?,
        };
        let port = free_port(LOCALHOST)?;
        let name = format!("bmi-relay-{}", Uuid::new_v4());
        event!(Level::INFO, image = %self.image, %name, port, "starting container");
        docker(&self.run_args(&dirs, &name, port, &user))?;

        let container = DockerContainer {
            name,
            remove: self.remove,
        };
        let image = self.image;
        connect(container, port, self.delay, self.settings, |_, logs| {
            format!(
                "Failed to start Docker container with image {}, Container log: {}",
                image, logs
            )
        })
    }
}

/// Returns `uid:gid` of the owner of `path`.
#[cfg(unix)]
fn owner(path: &Path) -> BmiResult<String> {
    use std::os::unix::fs::MetadataExt;

    let metadata = std::fs::metadata(path)?;
    Ok(format!("{}:{}", metadata.uid(), metadata.gid()))
}

#[cfg(not(unix))]
fn owner(_path: &Path) -> BmiResult<String> {
    Err(BmiError::InvalidArgument(
        "a user must be given on this platform".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::launcher::tests::temp_dir;

    #[test]
    fn run_args() {
        let work_dir = temp_dir();
        let input_dir = temp_dir();
        let mut launcher = DockerLauncher::new("ewatercycle/walrus-grpc4bmi:v0.2.0", &work_dir);
        launcher.input_dirs.push(input_dir.clone());
        launcher.remove = true;
        let dirs = ServerDirs::new(&launcher.input_dirs, &launcher.work_dir).unwrap();
        let args = launcher.run_args(&dirs, "bmi-relay-test", 55555, "1000:1000");
        let input = input_dir.display().to_string();
        let work = work_dir.display().to_string();
        assert_eq!(
            vec![
                "run".to_string(),
                "--detach".to_string(),
                "--name".to_string(),
                "bmi-relay-test".to_string(),
                "--publish".to_string(),
                "127.0.0.1:55555:50051".to_string(),
                "--user".to_string(),
                "1000:1000".to_string(),
                "--volume".to_string(),
                format!("{}:{}:ro", input, input),
                "--volume".to_string(),
                format!("{}:{}:rw", work, work),
                "--workdir".to_string(),
                work,
                "--rm".to_string(),
                "ewatercycle/walrus-grpc4bmi:v0.2.0".to_string(),
            ],
            args
        );
        std::fs::remove_dir(input_dir).unwrap();
        std::fs::remove_dir(work_dir).unwrap();
    }

    #[test]
    fn defaults() {
        let launcher = DockerLauncher::new("image", "/tmp");
        assert_eq!(50051, launcher.image_port);
        assert_eq!(Duration::from_secs(5), launcher.delay);
        assert!(!launcher.remove);
        assert_eq!(None, launcher.user);
    }

    #[cfg(unix)]
    #[test]
    fn owner_of_dir() {
        let dir = temp_dir();
        let owner = owner(&dir).unwrap();
        let re = regex::Regex::new(r"^\d+:\d+$").unwrap();
        assert!(re.is_match(&owner), "{}", owner);
        std::fs::remove_dir(dir).unwrap();
    }

    #[test]
    fn state() {
        assert_eq!(None, parse_state("true 0\n").unwrap());
        assert_eq!(Some(25), parse_state("false 25\n").unwrap());
        assert!(matches!(parse_state(""), Err(BmiError::Launcher(_))));
        let err = parse_state("paused").unwrap_err();
        assert_eq!("unexpected container state \"paused\"", err.to_string());
    }

    #[test]
    fn launch_missing_work_dir() {
        let launcher = DockerLauncher::new("image", "/dirthatdoesnotexist");
        let err = launcher.launch().err().unwrap();
        assert!(err.to_string().contains("dirthatdoesnotexist"), "{}", err);
    }
}

//! Clients that launch their own BMI server.
//!
//! A launcher starts a server in a container or subprocess on a free port, gives it a moment to
//! start, and connects a [BmiClient] to it. The server is stopped when the
//! [LaunchedBmiClient] is dropped.

use std::io::{self, BufRead, BufReader, Read};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use expanduser::expanduser;
use tracing::{event, Level};

use crate::bmi::BmiResult;
use crate::client::{BmiClient, ClientSettings};
use crate::error::BmiError;

pub mod apptainer;
pub mod docker;
pub mod subprocess;

/// Host launched servers are reached on.
pub const LOCALHOST: &str = "127.0.0.1";

/// A running BMI server process or container.
pub trait ServerProcess {
    /// Returns the exit code if the server has exited.
    fn exit_code(&mut self) -> BmiResult<Option<i32>>;

    /// Returns what the server wrote to stdout and stderr.
    fn logs(&self) -> BmiResult<String>;

    /// Stop the server.
    fn stop(&mut self) -> BmiResult<()>;
}

/// A [BmiClient] connected to a server it launched.
///
/// Derefs to the [BmiClient], so it can be used wherever a [Bmi](crate::bmi::Bmi) is expected.
pub struct LaunchedBmiClient<P: ServerProcess> {
    client: BmiClient,
    process: P,
}

impl<P: ServerProcess> LaunchedBmiClient<P> {
    /// Returns the server logs.
    pub fn logs(&self) -> BmiResult<String> {
        self.process.logs()
    }

    pub fn process(&self) -> &P {
        &self.process
    }
}

impl<P: ServerProcess> Deref for LaunchedBmiClient<P> {
    type Target = BmiClient;

    fn deref(&self) -> &BmiClient {
        &self.client
    }
}

impl<P: ServerProcess> DerefMut for LaunchedBmiClient<P> {
    fn deref_mut(&mut self) -> &mut BmiClient {
        &mut self.client
    }
}

impl<P: ServerProcess> Drop for LaunchedBmiClient<P> {
    fn drop(&mut self) {
        if let Err(err) = self.process.stop() {
            event!(Level::WARN, "failed to stop BMI server: {}", err);
        }
    }
}

/// Wait for a launched server, then connect to it.
///
/// Sleeps for `delay` and checks once whether the server has exited. A dead server results in
/// [BmiError::DeadContainer] with the message returned by `dead_message` for the exit code and
/// logs. The server is stopped whenever no client is returned.
///
/// # Arguments
///
/// * `process`: The launched server
/// * `port`: Port the server listens on
/// * `delay`: Time the server gets to start
/// * `settings`: Client settings
/// * `dead_message`: Builds the error message for a dead server
pub fn connect<P, F>(
    mut process: P,
    port: u16,
    delay: Duration,
    settings: ClientSettings,
    dead_message: F,
) -> BmiResult<LaunchedBmiClient<P>>
where
    P: ServerProcess,
    F: FnOnce(i32, &str) -> String,
{
    std::thread::sleep(delay);
    let result = match process.exit_code() {
        Ok(Some(exit_code)) => process.logs().and_then(|logs| {
            Err(BmiError::DeadContainer {
                message: dead_message(exit_code, &logs),
                exit_code,
                logs,
            })
        }),
        Ok(None) => BmiClient::connect_with(LOCALHOST, port, settings),
        Err(err) => Err(err),
    };
    match result {
        Ok(client) => {
            event!(Level::INFO, port, "connected to launched BMI server");
            Ok(LaunchedBmiClient { client, process })
        }
        Err(err) => {
            if let Err(stop_err) = process.stop() {
                event!(Level::WARN, "failed to stop BMI server: {}", stop_err);
            }
            Err(err)
        }
    }
}

/// Returns `path` as an absolute path to an existing directory.
fn absolute_dir(path: &Path) -> BmiResult<PathBuf> {
    let path = match path.to_str() {
        Some(path) => expanduser(path)?,
        None => path.to_path_buf(),
    };
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    if !path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not an existing directory", path.display()),
        )
        .into());
    }
    Ok(path)
}

/// Directories shared with a launched server
#[derive(Clone, Debug, PartialEq)]
pub struct ServerDirs {
    /// Read-only input directories
    pub input_dirs: Vec<PathBuf>,
    /// Read-write working directory
    pub work_dir: PathBuf,
}

impl ServerDirs {
    /// Validate input and work directories.
    ///
    /// All directories are made absolute and must exist. The work directory must not also be an
    /// input directory.
    pub fn new<I, P>(input_dirs: I, work_dir: &Path) -> BmiResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let input_dirs = input_dirs
            .into_iter()
            .map(|dir| absolute_dir(dir.as_ref()))
            .collect::<BmiResult<Vec<_>>>()?;
        let work_dir = absolute_dir(work_dir)?;
        if input_dirs.contains(&work_dir) {
            return Err(BmiError::InvalidArgument(
                "Found work_dir equal to one of the input directories. Please drop that input dir."
                    .to_string(),
            ));
        }
        Ok(ServerDirs {
            input_dirs,
            work_dir,
        })
    }
}

/// A server running as a child process.
///
/// Stdout and stderr are drained into a shared log buffer when captured, and discarded
/// otherwise.
pub struct ChildProcess {
    child: Child,
    logs: Arc<Mutex<String>>,
    readers: Vec<JoinHandle<()>>,
}

fn drain<R: Read + Send + 'static>(reader: R, logs: Arc<Mutex<String>>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for line in BufReader::new(reader).lines() {
            let Ok(line) = line else { break };
            if let Ok(mut logs) = logs.lock() {
                logs.push_str(&line);
                logs.push('\n');
            }
        }
    })
}

impl ChildProcess {
    /// Spawn `command`.
    ///
    /// # Arguments
    ///
    /// * `command`: Command to run
    /// * `capture_logs`: Whether to collect stdout and stderr
    pub fn spawn(mut command: Command, capture_logs: bool) -> BmiResult<Self> {
        let output = || {
            if capture_logs {
                Stdio::piped()
            } else {
                Stdio::null()
            }
        };
        command.stdin(Stdio::null()).stdout(output()).stderr(output());
        event!(Level::DEBUG, ?command, "spawning BMI server");
        let mut child = command.spawn()?;
        let logs = Arc::new(Mutex::new(String::new()));
        let mut readers = vec![];
        if let Some(stdout) = child.stdout.take() {
            readers.push(drain(stdout, logs.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(drain(stderr, logs.clone()));
        }
        Ok(ChildProcess {
            child,
            logs,
            readers,
        })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Wait for the log readers to see the end of output.
    fn join_readers(&mut self) {
        for reader in self.readers.drain(..) {
            if reader.join().is_err() {
                event!(Level::WARN, "log reader thread panicked");
            }
        }
    }
}

impl ServerProcess for ChildProcess {
    fn exit_code(&mut self) -> BmiResult<Option<i32>> {
        match self.child.try_wait()? {
            Some(status) => {
                self.join_readers();
                Ok(Some(status.code().unwrap_or(-1)))
            }
            None => Ok(None),
        }
    }

    fn logs(&self) -> BmiResult<String> {
        self.logs
            .lock()
            .map(|logs| logs.clone())
            .map_err(|_| BmiError::Poisoned)
    }

    fn stop(&mut self) -> BmiResult<()> {
        if self.child.try_wait()?.is_none() {
            event!(Level::DEBUG, pid = self.child.id(), "stopping BMI server");
            self.child.kill()?;
        }
        self.child.wait()?;
        self.join_readers();
        Ok(())
    }
}

//! Command Line Interface (CLI) arguments.

use byte_unit::Byte;
use clap::Parser;

use crate::registry::BmiVersion;

/// Parse a size such as `4 MiB` or `65536` into bytes.
fn parse_size(size: &str) -> Result<usize, String> {
    let bytes = Byte::parse_str(size, /* ignore case */ true)
        .map_err(|err| err.to_string())?
        .as_u64();
    usize::try_from(bytes).map_err(|err| err.to_string())
}

/// BMI server command line interface
///
/// Serves a BMI model over HTTP so that it can be driven from other processes.
#[derive(Clone, Debug, Parser)]
#[command(name = "run-bmi-server", version)]
pub struct CommandLineArgs {
    /// Full name of the BMI implementation, `module.Class`. Falls back to the BMI_MODULE and
    /// BMI_CLASS environment variables.
    #[arg(short, long, value_name = "MODULE.CLASS")]
    pub name: Option<String>,
    /// The port to which the server should bind. 0 lets the OS choose a free port.
    #[arg(short, long, default_value_t = 0, env = "BMI_PORT")]
    pub port: u16,
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "BMI_HOST")]
    pub host: String,
    /// Directory to work in. Relative paths given to the model resolve against it.
    #[arg(short = 'd', long, env = "BMI_PATH")]
    pub path: Option<String>,
    /// Version of the BMI interface implemented by the model
    #[arg(long, value_enum, default_value = "2.0")]
    pub bmi_version: BmiVersion,
    /// Log at debug level and return stack traces in error responses
    #[arg(long, default_value_t = false)]
    pub debug: bool,
    /// Maximum size of a request or response payload
    #[arg(long, default_value = "4 MiB", value_parser = parse_size, env = "BMI_MAX_MESSAGE_SIZE")]
    pub max_message_size: usize,
    /// Number of threads serving requests
    #[arg(long, default_value_t = 10, env = "BMI_WORKERS")]
    pub workers: usize,
    /// Maximum time in seconds to wait for calls to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "BMI_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use seatalk_bus::{Bus, BusConfig, ResyncPolicy};
use seatalk_messages::{Message, Registry, RegistryConfig};
use seatalk_transport::BusStream;

use crate::exit::{bus_error, CliError, CliResult, DATA_INVALID, USAGE};
use crate::output::OutputFormat;

pub mod autopilot;
pub mod decode;
pub mod encode;
pub mod kinds;
pub mod listen;
pub mod replay;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode frames given as hex.
    Decode(DecodeArgs),
    /// Encode a JSON message to a frame.
    Encode(EncodeArgs),
    /// Read and print messages from a bus.
    Listen(ListenArgs),
    /// Send one message.
    Send(SendArgs),
    /// Serve a hex capture on a bridge socket.
    Replay(ReplayArgs),
    /// Drive the autopilot with remote key presses.
    Autopilot(AutopilotArgs),
    /// List registered message kinds.
    Kinds(KindsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Replay(args) => replay::run(args),
        Command::Autopilot(args) => autopilot::run(args, format),
        Command::Kinds(args) => kinds::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Resync {
    /// Drop one byte and retry.
    Byte,
    /// Drop the whole rejected frame.
    Frame,
}

/// Dispatch and resynchronization flags shared by commands that read a bus.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Where to restart after an unknown or malformed frame.
    #[arg(long, value_enum, default_value = "byte")]
    pub resync: Resync,
    /// Give up after this many consecutive discarded bytes.
    #[arg(long, value_name = "N")]
    pub max_discards: Option<usize>,
    /// Reject frames whose attribute nibble disagrees with their length.
    #[arg(long)]
    pub strict: bool,
}

impl SessionArgs {
    pub fn registry(&self) -> Arc<Registry> {
        Arc::new(Registry::with_config(RegistryConfig {
            strict_length_nibble: self.strict,
            ..RegistryConfig::default()
        }))
    }

    pub fn bus_config(&self, read_timeout: Option<Duration>) -> BusConfig {
        let mut config = BusConfig {
            resync: match self.resync {
                Resync::Byte => ResyncPolicy::DiscardByte,
                Resync::Frame => ResyncPolicy::DiscardFrame,
            },
            max_consecutive_discards: self.max_discards,
            ..BusConfig::default()
        };
        config.frame.read_timeout = read_timeout;
        config
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex bytes; spaces are allowed inside an argument.
    #[arg(required = true, value_name = "HEX")]
    pub hex: Vec<String>,
    /// Treat every argument as exactly one frame instead of one byte stream.
    #[arg(long)]
    pub frame: bool,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Message as JSON, e.g. '{"kind":"deadband","mode":"minimal"}'.
    pub json: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Device node, or bridge socket path with --socket.
    pub path: PathBuf,
    /// Connect to a bridge socket instead of opening a device.
    #[arg(long)]
    pub socket: bool,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Print tracked autopilot state instead of individual messages.
    #[arg(long)]
    pub autopilot: bool,
    /// How often to wake up when the bus is idle (socket only, e.g. 1s, 250ms).
    #[arg(long, default_value = "1s")]
    pub poll: String,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Device node, or bridge socket path with --socket.
    pub path: PathBuf,
    /// Connect to a bridge socket instead of opening a device.
    #[arg(long)]
    pub socket: bool,
    /// Message as JSON.
    #[arg(long, conflicts_with = "hex", required_unless_present = "hex")]
    pub json: Option<String>,
    /// Raw frame as hex, sent without encoding.
    #[arg(long)]
    pub hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Bridge socket path to bind.
    pub socket: PathBuf,
    /// Capture file: hex bytes, one chunk per line, `#` starts a comment.
    #[arg(long)]
    pub file: PathBuf,
    /// Pause between capture lines (e.g. 100ms).
    #[arg(long)]
    pub delay: Option<String>,
}

#[derive(Args, Debug)]
pub struct AutopilotArgs {
    /// Device node, or bridge socket path with --socket.
    pub path: PathBuf,
    /// Connect to a bridge socket instead of opening a device.
    #[arg(long)]
    pub socket: bool,
    /// How long each command may take (e.g. 3s, 500ms; at most 6s).
    #[arg(long, default_value = "3s")]
    pub timeout: String,
    #[command(subcommand)]
    pub action: AutopilotAction,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Subcommand, Debug)]
pub enum AutopilotAction {
    /// Print the autopilot state once it reports in.
    Show,
    /// Switch the operating mode.
    Status {
        #[arg(value_enum)]
        mode: ModeArg,
        /// Confirm the course change track mode asks for.
        #[arg(long, value_enum)]
        confirm: Option<TurnArg>,
    },
    /// Change the desired heading.
    Turn {
        /// New desired heading in degrees.
        #[arg(long, conflicts_with = "by", required_unless_present = "by")]
        to: Option<f64>,
        /// Degrees to turn, negative to port.
        #[arg(long, allow_negative_numbers = true)]
        by: Option<f64>,
        /// Turn direction for --to; defaults to the shorter turn.
        #[arg(long, value_enum, requires = "to")]
        direction: Option<TurnArg>,
    },
    /// Switch the deadband (only while steering).
    Deadband {
        #[arg(value_enum)]
        mode: DeadbandArg,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Auto,
    Standby,
    Wind,
    Track,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TurnArg {
    Port,
    Starboard,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DeadbandArg {
    Automatic,
    Minimal,
}

#[derive(Args, Debug, Default)]
pub struct KindsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn open_bus(
    path: &Path,
    socket: bool,
    registry: Arc<Registry>,
    config: BusConfig,
) -> CliResult<Bus<BusStream, BusStream>> {
    let result = if socket {
        connect_socket(path, registry, config)
    } else {
        Bus::open(path, registry, config)
    };
    result.map_err(|err| bus_error("open failed", err))
}

#[cfg(unix)]
fn connect_socket(
    path: &Path,
    registry: Arc<Registry>,
    config: BusConfig,
) -> seatalk_bus::Result<Bus<BusStream, BusStream>> {
    Bus::connect(path, registry, config)
}

#[cfg(not(unix))]
fn connect_socket(
    _path: &Path,
    _registry: Arc<Registry>,
    _config: BusConfig,
) -> seatalk_bus::Result<Bus<BusStream, BusStream>> {
    Err(seatalk_transport::TransportError::Io(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "bridge sockets need unix domain sockets",
    ))
    .into())
}

/// Parse hex bytes, ignoring whitespace and an optional `0x` prefix.
pub(crate) fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&digits).map_err(|err| CliError::new(USAGE, format!("invalid hex {input:?}: {err}")))
}

/// Parse a message from its JSON form. Malformed JSON is a usage error;
/// well-formed JSON with values the wire cannot carry is invalid data.
pub(crate) fn parse_message(json: &str) -> CliResult<Message> {
    serde_json::from_str(json).map_err(|err| {
        let code = if err.is_data() { DATA_INVALID } else { USAGE };
        CliError::new(code, format!("invalid message JSON: {err}"))
    })
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_accepts_spaces_and_prefix() {
        assert_eq!(parse_hex("86 01 02 fd").unwrap(), vec![0x86, 0x01, 0x02, 0xFD]);
        assert_eq!(parse_hex("0x870002").unwrap(), vec![0x87, 0x00, 0x02]);
        assert_eq!(parse_hex("  ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn parse_hex_rejects_odd_digits() {
        let err = parse_hex("86 0").unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn message_json_errors_are_classified() {
        assert_eq!(parse_message("{not json").unwrap_err().code, USAGE);
        assert_eq!(
            parse_message(r#"{"kind":"deadband","mode":"sideways"}"#)
                .unwrap_err()
                .code,
            DATA_INVALID
        );
        assert!(parse_message(r#"{"kind":"deadband","mode":"minimal"}"#).is_ok());
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn session_flags_build_registry_and_config() {
        let session = SessionArgs {
            resync: Resync::Frame,
            max_discards: Some(8),
            strict: true,
        };
        assert!(session.registry().config().strict_length_nibble);

        let config = session.bus_config(Some(Duration::from_millis(250)));
        assert_eq!(config.resync, ResyncPolicy::DiscardFrame);
        assert_eq!(config.max_consecutive_discards, Some(8));
        assert_eq!(config.frame.read_timeout, Some(Duration::from_millis(250)));
    }
}

use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use seatalk_bus::{AutopilotState, Received};
use seatalk_frame::{command_name, Frame};
use seatalk_messages::{Descriptor, Message};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    frame: String,
    command: String,
    command_name: &'a str,
    length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a Message>,
}

impl<'a> FrameOutput<'a> {
    fn new(frame: &'a Frame, message: Option<&'a Message>) -> Self {
        Self {
            frame: hex::encode_upper(frame.as_bytes()),
            command: format!("0x{:02X}", frame.command()),
            command_name: command_name(frame.command()),
            length: frame.len(),
            message,
        }
    }
}

#[derive(Serialize)]
struct KindOutput {
    name: &'static str,
    kind: String,
    command: String,
    length: usize,
}

pub fn print_received(received: &Received, format: OutputFormat) {
    let Received { frame, message } = received;
    match format {
        OutputFormat::Json => print_json(&FrameOutput::new(frame, Some(message))),
        OutputFormat::Table => {
            let mut table = new_table(vec!["KIND", "FRAME", "MESSAGE"]);
            table.add_row(vec![
                message.kind().to_string(),
                frame.to_string(),
                message_preview(message),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{:<22} [{frame}] {}",
                message.kind().as_str(),
                message_preview(message)
            );
        }
        OutputFormat::Raw => print_raw(frame.as_bytes()),
    }
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&FrameOutput::new(frame, None)),
        OutputFormat::Table => {
            let mut table = new_table(vec!["COMMAND", "LENGTH", "FRAME"]);
            table.add_row(vec![
                format!("0x{:02X} {}", frame.command(), command_name(frame.command())),
                frame.len().to_string(),
                frame.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{frame}"),
        OutputFormat::Raw => print_raw(frame.as_bytes()),
    }
}

pub fn print_kinds(descriptors: &[Descriptor], format: OutputFormat) {
    let rows: Vec<KindOutput> = descriptors
        .iter()
        .map(|d| KindOutput {
            name: d.name,
            kind: d.kind.to_string(),
            command: format!("0x{:02X}", d.command_byte),
            length: d.expected_length,
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = new_table(vec!["COMMAND", "LENGTH", "KIND", "NAME"]);
            for row in rows {
                table.add_row(vec![
                    row.command,
                    row.length.to_string(),
                    row.kind,
                    row.name.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in rows {
                println!("{} {:>2}  {:<22} {}", row.command, row.length, row.kind, row.name);
            }
        }
    }
}

pub fn print_autopilot(state: &AutopilotState, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(state),
        OutputFormat::Table => {
            let na = |v: Option<String>| v.unwrap_or_else(|| "N/A".to_string());
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            table
                .add_row(vec![
                    "status".to_string(),
                    na(state.status().map(|s| format!("{s:?}"))),
                ])
                .add_row(vec![
                    "heading".to_string(),
                    na(state.heading().map(|a| a.to_string())),
                ])
                .add_row(vec![
                    "desired heading".to_string(),
                    na(state.desired_heading().map(|a| a.to_string())),
                ])
                .add_row(vec![
                    "rudder".to_string(),
                    na(state.rudder().map(|a| a.to_string())),
                ])
                .add_row(vec!["deadband".to_string(), format!("{:?}", state.deadband())])
                .add_row(vec!["alarms".to_string(), state.alarms().to_string()])
                .add_row(vec!["warnings".to_string(), state.warnings().to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => println!("{state}"),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Message fields without the `kind` tag, as compact JSON.
fn message_preview(message: &Message) -> String {
    match serde_json::to_value(message) {
        Ok(serde_json::Value::Object(mut fields)) => {
            fields.remove("kind");
            serde_json::Value::Object(fields).to_string()
        }
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

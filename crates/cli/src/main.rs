mod render;

use std::fs;
use std::io::Read;
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use cmdlink_core::{ParsedCmd, Tokenizer, TokenizerConfig};
use cmdlink_diagnostics::{self as diag, Diagnostic, Severity};
use cmdlink_link_client::{Feed, LineAccumulator};

use crate::render::{Format, print_summary, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cmdlink",
    version,
    about = "cmdlink — tokenize command lines and listen on serial command links"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Tokenize one command line and print its command, parameters, and
    /// diagnostics.
    Tokenize {
        /// The command line. When omitted, the line is read from --file or
        /// stdin.
        line: Option<String>,

        /// Read the line from this file instead of the argument.
        #[arg(long, conflicts_with = "line")]
        file: Option<String>,

        #[command(flatten)]
        tokenizer: TokenizerOpts,

        /// Probe a KEY=value pair after tokenizing (repeatable).
        #[arg(long = "key")]
        keys: Vec<String>,
    },

    /// Listen on a serial port, accumulate framed lines, and tokenize each
    /// one as it completes.
    #[cfg(feature = "serial")]
    Listen {
        /// Serial port path, e.g. /dev/ttyUSB0 or COM3.
        port: String,

        /// Baud rate.
        #[arg(long, default_value_t = 9600)]
        baud: u32,

        /// Line buffer capacity in bytes.
        #[arg(long, default_value_t = 64)]
        capacity: usize,

        /// Required start marker character.
        #[arg(long)]
        start: Option<String>,

        /// How many consecutive start markers are required.
        #[arg(long, default_value_t = 1, requires = "start")]
        start_count: u8,

        /// Device-ID character required immediately after the start
        /// sequence.
        #[arg(long)]
        id: Option<String>,

        /// End-of-line marker.
        #[arg(long, value_parser = ["lf", "cr"], default_value = "lf")]
        end: String,

        /// Echo received bytes back to the link.
        #[arg(long)]
        echo: bool,

        /// Give up when no line completes within this many milliseconds.
        /// Omit to wait unboundedly.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Stop after this many lines. Omit to listen forever.
        #[arg(long)]
        count: Option<usize>,

        #[command(flatten)]
        tokenizer: TokenizerOpts,
    },

    /// List serial ports available on this system.
    #[cfg(feature = "serial")]
    Ports,

    /// Explain a diagnostic ID (e.g. CMD1201).
    Explain { id: String },
}

/// Tokenizer options shared by `tokenize` and `listen`.
#[derive(Args, Debug)]
struct TokenizerOpts {
    /// Token separator character.
    #[arg(long, default_value = " ")]
    separator: String,

    /// Treat quote characters as ordinary bytes.
    #[arg(long)]
    no_quotes: bool,

    /// Two-character open/close pair for parenthesis grouping, e.g. "()".
    #[arg(long)]
    parens: Option<String>,
}

impl TokenizerOpts {
    fn build(&self) -> Result<Tokenizer> {
        let separator = single_byte(&self.separator, "--separator")?;
        let parens = match self.parens.as_deref() {
            Some(p) => {
                let bytes = p.as_bytes();
                if bytes.len() != 2 {
                    bail!("--parens wants exactly two characters, e.g. \"()\"");
                }
                Some((bytes[0], bytes[1]))
            }
            None => None,
        };
        Ok(Tokenizer::with_config(TokenizerConfig {
            separator,
            ignore_quote: self.no_quotes,
            parens,
            key_value: false,
        }))
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Tokenize {
            line,
            file,
            tokenizer,
            keys,
        } => cmd_tokenize(line.as_deref(), file.as_deref(), &tokenizer, &keys, format)?,
        #[cfg(feature = "serial")]
        Cmd::Listen {
            port,
            baud,
            capacity,
            start,
            start_count,
            id,
            end,
            echo,
            timeout_ms,
            count,
            tokenizer,
        } => listen::run(&listen::Opts {
            port,
            baud,
            capacity,
            start,
            start_count,
            id,
            end,
            echo,
            timeout_ms,
            count,
            tokenizer,
            format,
        })?,
        #[cfg(feature = "serial")]
        Cmd::Ports => cmd_ports(format),
        Cmd::Explain { id } => cmd_explain(&id, format)?,
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_tokenize(
    line: Option<&str>,
    file: Option<&str>,
    opts: &TokenizerOpts,
    keys: &[String],
    format: Format,
) -> Result<()> {
    let input = read_line_input(line, file)?;
    let tokenizer = opts.build()?;

    let mut buffer = input.clone().into_bytes();
    let mut cmd = tokenizer
        .parse_cmd(&mut buffer)
        .with_context(|| format!("cannot tokenize {input:?}"))?;

    let key_values: Vec<(String, Option<String>)> = keys
        .iter()
        .map(|k| {
            let v = cmd
                .value_of_key(k)
                .map(|v| String::from_utf8_lossy(v).into_owned());
            (k.clone(), v)
        })
        .collect();

    let diagnostics: Vec<Diagnostic>;
    match format {
        Format::Json => {
            let summary = cmd.summary();
            diagnostics = summary.diagnostics.clone();
            let mut out = serde_json::to_value(&summary)?;
            if !key_values.is_empty() {
                let map: serde_json::Map<String, serde_json::Value> = key_values
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                    .collect();
                out.as_object_mut()
                    .expect("summary serializes to an object")
                    .insert("keys".into(), serde_json::Value::Object(map));
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            print_parsed(&mut cmd);
            for (key, value) in &key_values {
                match value {
                    Some(v) => println!("key {key} = {v}"),
                    None => println!("key {key} = (absent)"),
                }
            }
            diagnostics = cmd.diagnostics().iter().cloned().collect();
            render_diagnostics(&input, "<line>", &diagnostics, format);
            print_summary(&diagnostics);
        }
    }

    exit_on_errors(&diagnostics);
    Ok(())
}

#[cfg(feature = "serial")]
mod listen {
    use std::time::Duration;

    use anyhow::{Context, Result};
    use cmdlink_link_client::{
        AccumulatorConfig, CHAR_CR, CHAR_LF, LineAccumulator, SerialLink, StartSequence,
    };

    use super::{Format, TokenizerOpts, print_parsed, render, single_byte};

    pub(crate) struct Opts {
        pub(crate) port: String,
        pub(crate) baud: u32,
        pub(crate) capacity: usize,
        pub(crate) start: Option<String>,
        pub(crate) start_count: u8,
        pub(crate) id: Option<String>,
        pub(crate) end: String,
        pub(crate) echo: bool,
        pub(crate) timeout_ms: Option<u64>,
        pub(crate) count: Option<usize>,
        pub(crate) tokenizer: TokenizerOpts,
        pub(crate) format: Format,
    }

    pub(crate) fn run(opts: &Opts) -> Result<()> {
        let start = match opts.start.as_deref() {
            Some(s) => Some(StartSequence {
                marker: single_byte(s, "--start")?,
                count: opts.start_count,
            }),
            None => None,
        };
        let id_filter = match opts.id.as_deref() {
            Some(s) => Some(single_byte(s, "--id")?),
            None => None,
        };
        let end_char = if opts.end == "cr" { CHAR_CR } else { CHAR_LF };

        let config = AccumulatorConfig {
            end_char,
            start,
            id_filter,
            echo: opts.echo,
            ..AccumulatorConfig::default()
        };

        let tokenizer = opts.tokenizer.build()?;
        let mut acc = LineAccumulator::with_config(opts.capacity, config);
        let mut link = SerialLink::open(&opts.port, opts.baud)
            .with_context(|| format!("cannot open serial port {}", opts.port))?;
        let timeout = opts.timeout_ms.map(Duration::from_millis);

        let mut seen = 0usize;
        loop {
            acc.read_line(&mut link, timeout)
                .with_context(|| format!("no line from {}", opts.port))?;
            let line = String::from_utf8_lossy(acc.line()).into_owned();

            match tokenizer.parse_cmd(acc.buffer_mut()) {
                Ok(mut cmd) => match opts.format {
                    Format::Json => {
                        let out = serde_json::json!({
                            "line": line,
                            "parsed": cmd.summary(),
                        });
                        println!("{out}");
                    }
                    Format::Pretty => {
                        println!("line: {line}");
                        print_parsed(&mut cmd);
                        let diagnostics: Vec<_> = cmd.diagnostics().iter().cloned().collect();
                        render::render_diagnostics(&line, "<link>", &diagnostics, opts.format);
                    }
                },
                // Empty lines arrive as a bare end marker; skip them.
                Err(_) => continue,
            }

            seen += 1;
            if let Some(limit) = opts.count
                && seen >= limit
            {
                return Ok(());
            }
        }
    }
}

#[cfg(feature = "serial")]
fn cmd_ports(format: Format) {
    let ports = cmdlink_link_client::SerialLink::list_ports();
    match format {
        Format::Json => {
            let out = serde_json::json!({ "ports": ports });
            println!("{out}");
        }
        Format::Pretty => {
            if ports.is_empty() {
                eprintln!("no serial ports found");
            }
            for p in ports {
                println!("{p}");
            }
        }
    }
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let text = diag::explain(id);
            let out = serde_json::json!({
                "id": id,
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Explanation is the expected output — write to stdout, not stderr.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{}: (no explanation available)", id);
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Print the command word and parameters of a parsed line to stdout.
fn print_parsed(cmd: &mut ParsedCmd<'_>) {
    match cmd.param_str(0) {
        Some(word) => println!("command: {word}"),
        None => println!("command: (none)"),
    }
    for idx in 1..=cmd.param_count() {
        match cmd.param_str(idx) {
            Some(tok) => println!("param {idx}: {tok}"),
            None => println!("param {idx}: (invalid utf-8)"),
        }
    }
}

/// Resolve the tokenize input. A positional argument is taken verbatim;
/// file and stdin bytes run through a line accumulator, so backspace and
/// control bytes receive the same treatment as on a live link and only the
/// first completed line is kept.
fn read_line_input(line: Option<&str>, file: Option<&str>) -> Result<String> {
    if let Some(l) = line {
        return Ok(l.to_string());
    }

    let bytes = match file {
        Some(path) => fs::read(path).with_context(|| format!("cannot read {path}"))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("cannot read stdin")?;
            buf
        }
    };

    let mut acc = LineAccumulator::new(bytes.len().max(1));
    for &b in &bytes {
        if let Feed::LineReady = acc.feed_byte(b) {
            break;
        }
    }
    Ok(String::from_utf8_lossy(acc.line()).into_owned())
}

/// Exit with code 1 if any diagnostic is an error.
/// Warnings do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}

/// Parse a single-byte character argument.
fn single_byte(s: &str, flag: &str) -> Result<u8> {
    let bytes = s.as_bytes();
    if bytes.len() != 1 {
        bail!("{flag} wants exactly one ASCII character, got {s:?}");
    }
    Ok(bytes[0])
}

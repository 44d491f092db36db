// scanlib test application -- CLI tool for exercising the serial and UDP
// bridges, the status decoder and the command vocabulary against a real
// SDS-series scanner.
//
// Usage:
//   scanlib-test-app --port /dev/ttyACM0 model
//   scanlib-test-app --host 192.168.1.50 status
//   scanlib-test-app --host 192.168.1.50 monitor --duration 60
//   scanlib-test-app --port COM3 --baud 115200 send "GLT,FL"
//   scanlib-test-app --port /dev/ttyACM0 key M --action long
//   scanlib-test-app --host 192.168.1.50 mute on
//   scanlib-test-app --host 192.168.1.50 tune 154.28

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use scanlib::transport::{DEFAULT_BAUD_RATE, DEFAULT_UDP_PORT};
use scanlib::uniden::{
    commands, ContactLogEntry, KeyAction, PollOutcome, ScannerBuilder, ScreenKind, StatusPoller,
    TrafficLog,
};
use scanlib::{format_freq_mhz, Reply, ScannerBridge, ScannerStatus};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// scanlib test application -- drives an SDS-series scanner from the command line.
#[derive(Parser)]
#[command(name = "scanlib-test-app", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyACM0, COM3).
    #[arg(long, conflicts_with = "host")]
    port: Option<String>,

    /// Serial baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Scanner IP address or host name for a network connection.
    #[arg(long)]
    host: Option<String>,

    /// Scanner UDP port.
    #[arg(long, default_value_t = DEFAULT_UDP_PORT)]
    udp_port: u16,

    /// Reply timeout in milliseconds. XML commands wait at least a few
    /// seconds regardless.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Query the scanner model (MDL).
    Model,

    /// Send a raw command and print the reply.
    Send {
        /// Command text, e.g. "GSI,0" or "GLT,FL".
        command: String,
    },

    /// Poll the status once and print it.
    Status,

    /// Poll the status in a loop and print each new signal lock.
    Monitor {
        /// Duration in seconds (0 = run until Ctrl-C).
        #[arg(long, default_value_t = 0)]
        duration: u64,

        /// Delay between polls in milliseconds.
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,

        /// Also print every command sent and message received.
        #[arg(long)]
        traffic: bool,
    },

    /// Simulate a keypress.
    Key {
        /// Key code, e.g. M (menu), H (hold), S (scan), or a digit.
        code: String,

        #[arg(long, value_enum, default_value_t = KeyActionArg::Press)]
        action: KeyActionArg,
    },

    /// Mute or unmute audio.
    Mute {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Start or stop recording.
    Record {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Tune directly to a frequency.
    Tune {
        /// Frequency in MHz (e.g. 154.28).
        mhz: f64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn is_on(self) -> bool {
        matches!(self, Toggle::On)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KeyActionArg {
    Press,
    Long,
    Hold,
    Release,
}

impl From<KeyActionArg> for KeyAction {
    fn from(arg: KeyActionArg) -> Self {
        match arg {
            KeyActionArg::Press => KeyAction::Press,
            KeyActionArg::Long => KeyAction::Long,
            KeyActionArg::Hold => KeyAction::Hold,
            KeyActionArg::Release => KeyAction::Release,
        }
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

async fn connect(cli: &Cli) -> Result<Box<dyn ScannerBridge>> {
    let builder = match (&cli.port, &cli.host) {
        (Some(port), None) => ScannerBuilder::serial(port).baud_rate(cli.baud),
        (None, Some(host)) => ScannerBuilder::udp(host).udp_port(cli.udp_port),
        _ => bail!("specify exactly one of --port or --host"),
    };

    let scanner = builder.build().await.context("failed to connect to scanner")?;

    match (&cli.port, &cli.host) {
        (Some(port), _) => println!("Connected to {port} at {} baud", cli.baud),
        (_, Some(host)) if scanner.is_connected() => {
            println!("Connected to {host}:{}", cli.udp_port)
        }
        (_, Some(host)) => {
            warn!(host = %host, "scanner did not answer the probe");
            println!("Opened {host}:{} (no probe reply yet)", cli.udp_port);
        }
        _ => {}
    }
    Ok(scanner)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Print a reply, or a warning for either sentinel.
fn print_reply(command: &str, reply: &Reply) {
    match reply {
        Reply::Response(text) => println!("{text}"),
        Reply::Timeout => println!("[warning] {command}: no reply before the timeout"),
        Reply::Disconnected => println!("[warning] {command}: scanner is not connected"),
    }
}

async fn cmd_send(scanner: &dyn ScannerBridge, command: &str, timeout: Duration) {
    let reply = scanner.send_and_receive(command, timeout).await;
    print_reply(command, &reply);
}

async fn cmd_fire(scanner: &dyn ScannerBridge, command: &str) {
    match scanner.send_command(command).await {
        Ok(()) => println!("Sent {command}"),
        Err(e) => println!("[warning] {command}: {e}"),
    }
}

async fn cmd_status(scanner: &dyn ScannerBridge, timeout: Duration) {
    let mut poller = StatusPoller::new().with_timeout(timeout);
    match poller.poll(scanner).await {
        PollOutcome::Updated { .. } => print_status(poller.status()),
        PollOutcome::Unrecognized => println!("[warning] status reply was not a status document"),
        PollOutcome::Timeout => println!("[warning] no status reply before the timeout"),
        PollOutcome::Disconnected => println!("[warning] scanner is not connected"),
    }
}

async fn cmd_monitor(
    scanner: &dyn ScannerBridge,
    timeout: Duration,
    duration_secs: u64,
    interval: Duration,
    show_traffic: bool,
) {
    let mut poller = StatusPoller::new().with_timeout(timeout);
    let mut traffic = show_traffic.then(|| TrafficLog::new(scanner.subscribe()));
    let started = Instant::now();
    let deadline = (duration_secs > 0).then(|| started + Duration::from_secs(duration_secs));
    let mut last_outcome_warned = false;

    println!("Monitoring (Ctrl-C to stop)...");

    loop {
        if deadline.is_some_and(|dl| Instant::now() >= dl) {
            println!("Monitor duration elapsed.");
            break;
        }

        let outcome = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            outcome = poller.poll(scanner) => outcome,
        };

        if let Some(log) = traffic.as_mut() {
            let added = log.drain();
            for line in log.lines().skip(log.len() - added.min(log.len())) {
                println!("    {line}");
            }
        }

        match outcome {
            PollOutcome::Updated { new_contact } => {
                last_outcome_warned = false;
                if let Some(entry) = new_contact {
                    println!("[{:>7.1}s] {}", started.elapsed().as_secs_f64(), contact_line(&entry));
                }
            }
            other => {
                // One warning per outage, not one per poll.
                if !last_outcome_warned {
                    println!("[warning] poll: {other:?}");
                    last_outcome_warned = true;
                }
            }
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    let contacts = poller.tracker().len();
    println!("{contacts} contact(s) logged.");
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// The talkgroup as shown to a user. The scanner sometimes reports the
/// literal placeholder "TGID", which is hidden here.
fn display_tgid(tgid: &str) -> Option<&str> {
    match tgid {
        "" | "---" | "TGID" => None,
        other => Some(other),
    }
}

fn contact_line(entry: &ContactLogEntry) -> String {
    let mut line = format!(
        "{} {:<4} {} / {}",
        format_freq_mhz(entry.frequency_mhz),
        entry.modulation,
        entry.system_name,
        entry.channel_name
    );
    if let Some(tgid) = display_tgid(&entry.talkgroup_id) {
        line.push_str(&format!("  TGID {tgid}"));
    }
    line.push_str(&format!("  {}", entry.rssi_label));
    line
}

fn print_status(status: &ScannerStatus) {
    let kind = ScreenKind::parse(&status.screen_kind);

    println!("Scanner Status");
    println!("  Mode:         {} ({})", status.mode, status.screen_kind);
    println!("  System:       {}", status.system_name);
    println!("  Department:   {}", status.department_name);
    if kind.is_trunked() {
        println!("  Site:         {}", status.site_name);
        println!(
            "  Talkgroup:    {}",
            display_tgid(&status.talkgroup_id).unwrap_or("---")
        );
        println!("  Unit ID:      {}", status.unit_id);
    }
    println!("  Channel:      {}", status.channel_name);
    println!(
        "  Frequency:    {} {}",
        format_freq_mhz(status.frequency_mhz),
        status.modulation
    );
    if kind.is_search() {
        println!("  Range:        {} - {}", status.range_lower, status.range_upper);
        println!("  Hits:         {}", status.hit_count);
    }
    if kind == ScreenKind::ToneOut {
        println!("  Tones:        {} / {}", status.tone_a, status.tone_b);
    }
    println!("  Monitor list: {}", status.monitor_list_name);
    println!(
        "  Signal:       {} (VOL {}, SQL {})",
        status.rssi_label, status.volume, status.squelch
    );
    println!(
        "  Audio:        {}, Att {}, Rec {}, Hold {}",
        status.mute, status.attenuator, status.recording, status.hold
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Build commands that take user input before touching the scanner.
    let prepared = match &cli.command {
        Command::Key { code, action } => Some(commands::key(code, (*action).into())?),
        Command::Tune { mhz } => Some(commands::direct_frequency(*mhz)?),
        Command::Mute { state } => Some(commands::mute(state.is_on())),
        Command::Record { state } => Some(commands::record(state.is_on())),
        _ => None,
    };

    let mut scanner = connect(&cli).await?;
    let timeout = Duration::from_millis(cli.timeout_ms);

    match &cli.command {
        Command::Model => cmd_send(scanner.as_ref(), &commands::model(), timeout).await,
        Command::Send { command } => cmd_send(scanner.as_ref(), command, timeout).await,
        Command::Status => cmd_status(scanner.as_ref(), timeout).await,
        Command::Monitor {
            duration,
            interval_ms,
            traffic,
        } => {
            cmd_monitor(
                scanner.as_ref(),
                timeout,
                *duration,
                Duration::from_millis(*interval_ms),
                *traffic,
            )
            .await
        }
        Command::Key { .. } | Command::Mute { .. } | Command::Record { .. } | Command::Tune { .. } => {
            if let Some(command) = &prepared {
                cmd_fire(scanner.as_ref(), command).await;
            }
        }
    }

    scanner.dispose().await;
    Ok(())
}

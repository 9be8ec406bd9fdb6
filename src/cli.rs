use crate::engine::ActionEngine;
use crate::model::{Action, ActionEvent, ActionReport, Outcome, PrefixSet, RunConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use tokio::sync::mpsc;

/// Output line routing for the stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "augment-cli",
    version,
    about = "Channel-tree augmentation client with optional TUI form"
)]
pub struct Cli {
    /// Base URL of the augmentation service
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub base_url: String,

    /// Print the action report as JSON (one-shot mode only)
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Augment a channel with prefixes taken from the flag values
    Augment {
        channel: String,
        #[arg(long, default_value = "")]
        first: String,
        #[arg(long, default_value = "")]
        middle: String,
        #[arg(long, default_value = "")]
        last: String,
    },
    /// Augment a channel with the default tree glyphs
    QuickAugment { channel: String },
    /// Change the prefixes of an existing augmentation
    ChangePrefix {
        channel: String,
        #[arg(long, default_value = "")]
        first: String,
        #[arg(long, default_value = "")]
        middle: String,
        #[arg(long, default_value = "")]
        last: String,
    },
    /// Collapse an augmentation back to its plain channel
    Abridge { channel: String },
    /// Remove an augmentation via the channel-list route
    Remove { channel: String },
}

impl Command {
    fn into_action(self) -> Action {
        match self {
            Command::Augment {
                channel,
                first,
                middle,
                last,
            } => Action::Augment {
                channel,
                prefix: PrefixSet::new(first, middle, last),
            },
            Command::QuickAugment { channel } => Action::QuickAugment { channel },
            Command::ChangePrefix {
                channel,
                first,
                middle,
                last,
            } => Action::ChangePrefix {
                channel,
                prefix: PrefixSet::new(first, middle, last),
            },
            Command::Abridge { channel } => Action::Abridge { channel },
            Command::Remove { channel } => Action::Remove { channel },
        }
    }
}

pub async fn run(args: Cli) -> Result<()> {
    match args.command.clone() {
        Some(cmd) => run_action(&args, cmd).await,
        None => {
            #[cfg(feature = "tui")]
            {
                crate::tui::run(args).await
            }
            #[cfg(not(feature = "tui"))]
            {
                Err(anyhow::anyhow!(
                    "no action given; pass a subcommand or build with the tui feature"
                ))
            }
        }
    }
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        base_url: args.base_url.clone(),
        user_agent: format!("augment-cli/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Run a single action, streaming its events to stderr and the final
/// report to stdout. Exits nonzero when the service reported a failure.
async fn run_action(args: &Cli, cmd: Command) -> Result<()> {
    let cfg = build_config(args);
    let engine = ActionEngine::new(cfg)?;
    let action = cmd.into_action();

    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<ActionEvent>();

    let handle = tokio::spawn(async move { engine.run(action, &evt_tx).await });

    while let Some(ev) = evt_rx.recv().await {
        match ev {
            ActionEvent::Dispatched { kind, channel } => {
                let _ = out_tx.send(OutputLine::Stderr(format!("== {kind} {channel} ==")));
            }
            ActionEvent::OutcomeReceived { .. } => {}
            ActionEvent::Alert { text } => {
                // The alert analog: the failure text, verbatim.
                let _ = out_tx.send(OutputLine::Stderr(text));
            }
            ActionEvent::ViewRefreshed { path } => {
                let _ = out_tx.send(OutputLine::Stderr(format!("View refreshed: {path}")));
            }
        }
    }

    let report = handle
        .await
        .context("dispatch task failed")?
        .context("action failed")?;

    let failed = !report.outcome.is_success();
    let _ = out_tx.send(OutputLine::Stdout(render_report(args, &report)?));

    drop(out_tx);
    let _ = out_handle.await;

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn render_report(args: &Cli, report: &ActionReport) -> Result<String> {
    if args.json {
        return serde_json::to_string_pretty(report).context("failed to serialize report");
    }
    Ok(match &report.outcome {
        Outcome::Success => format!("{} {}: Success", report.action, report.channel),
        Outcome::Failure(text) => format!("{} {}: {}", report.action, report.channel, text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_shot_subcommands() {
        let cli = Cli::try_parse_from([
            "augment-cli",
            "augment",
            "lobby",
            "--first",
            "+ ",
            "--middle",
            "| ",
            "--last",
            "` ",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Augment {
                channel,
                first,
                middle,
                last,
            }) => {
                assert_eq!(channel, "lobby");
                assert_eq!((first.as_str(), middle.as_str(), last.as_str()), ("+ ", "| ", "` "));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn prefix_flags_default_to_empty_strings() {
        let cli = Cli::try_parse_from(["augment-cli", "change-prefix", "lobby"]).unwrap();
        match cli.command {
            Some(Command::ChangePrefix {
                first,
                middle,
                last,
                ..
            }) => {
                assert!(first.is_empty() && middle.is_empty() && last.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_means_interactive_mode() {
        let cli = Cli::try_parse_from(["augment-cli"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn commands_map_to_their_actions() {
        let action = Command::Remove {
            channel: "general".into(),
        }
        .into_action();
        assert!(matches!(action, Action::Remove { ref channel } if channel == "general"));

        let action = Command::QuickAugment {
            channel: "lobby".into(),
        }
        .into_action();
        assert!(matches!(action, Action::QuickAugment { ref channel } if channel == "lobby"));
    }
}

use std::fs;
use std::path::PathBuf;

use anyhow::{ensure, Context};
use buzzr_core::{
    decode_all, encode_settings, request_all_button_data, save_frames, ConfigManager,
    SysexConfig, SysexMessage,
};
use clap::{Args, Parser, Subcommand};

/// Settings file generator for the buzzr button board.
#[derive(Parser, Debug)]
#[command(name = "buzzr")]
#[command(about = "Build SysEx settings files for the buzzr button board")]
struct Cli {
    /// JSON settings file (defaults to ./buzzr.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default button settings file
    Generate(OutputArgs),
    /// Write a file requesting every button's settings from the board
    Request(OutputArgs),
    /// Decode a .syx file and list its messages
    Verify {
        /// File to decode
        path: PathBuf,

        /// Number of boards the file was built for
        #[arg(short, long)]
        boards: Option<usize>,
    },
}

#[derive(Args, Debug, Default)]
struct OutputArgs {
    /// Number of 16-button boards
    #[arg(short, long)]
    boards: Option<usize>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut manager = ConfigManager::new(cli.config.clone());
    manager
        .load()
        .with_context(|| format!("loading {}", manager.config_path().display()))?;

    match cli.command {
        None => generate(&manager, OutputArgs::default()),
        Some(Command::Generate(args)) => generate(&manager, args),
        Some(Command::Request(args)) => request(&manager, args),
        Some(Command::Verify { path, boards }) => verify(&manager, path, boards),
    }
}

fn sysex_config(manager: &ConfigManager, boards: Option<usize>) -> anyhow::Result<SysexConfig> {
    let num_boards = boards.unwrap_or(manager.settings().num_boards);
    Ok(SysexConfig::new(num_boards)?)
}

fn generate(manager: &ConfigManager, args: OutputArgs) -> anyhow::Result<()> {
    let config = sysex_config(manager, args.boards)?;
    let output = args.output.unwrap_or_else(|| manager.settings().output.clone());

    let buttons = manager.button_settings(&config)?;
    let bytes = encode_settings(&config, &buttons)?;
    let written = save_frames(&output, &bytes)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Wrote {} button messages ({} bytes) for {} board(s) to {}",
        buttons.len(),
        written,
        config.num_boards(),
        output.display()
    );
    Ok(())
}

fn request(manager: &ConfigManager, args: OutputArgs) -> anyhow::Result<()> {
    let config = sysex_config(manager, args.boards)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from("request_buttons.syx"));

    let bytes = request_all_button_data(&config)?;
    save_frames(&output, &bytes).with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Wrote {} button data requests to {}",
        config.button_count(),
        output.display()
    );
    Ok(())
}

fn verify(manager: &ConfigManager, path: PathBuf, boards: Option<usize>) -> anyhow::Result<()> {
    let config = sysex_config(manager, boards)?;
    let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let messages =
        decode_all(&config, &bytes).with_context(|| format!("decoding {}", path.display()))?;

    for message in &messages {
        match message {
            SysexMessage::SetButtonData(setting) | SysexMessage::ButtonData(setting) => {
                println!(
                    "button {:3}: channel {:2} cc {:3} flags {:#04x} color up {:03b} down {:03b}",
                    setting.index,
                    setting.channel,
                    setting.cc,
                    setting.flags.bits(),
                    setting.color.up.bits(),
                    setting.color.down.bits()
                );
            }
            other => println!("{:?}", other),
        }
    }
    for (index, expected) in misplaced_buttons(&messages) {
        log::warn!(
            "Button {} appears where button {} was expected",
            index,
            expected
        );
    }

    ensure!(!messages.is_empty(), "{} holds no SysEx frames", path.display());
    println!("{} messages OK", messages.len());
    Ok(())
}

/// Button data messages whose index does not follow the previous one, as
/// `(index, expected)` pairs.
fn misplaced_buttons(messages: &[SysexMessage]) -> Vec<(u8, usize)> {
    let mut misplaced = Vec::new();
    let mut next_index = 0usize;
    for message in messages {
        if let SysexMessage::SetButtonData(setting) | SysexMessage::ButtonData(setting) = message {
            if setting.index as usize != next_index {
                misplaced.push((setting.index, next_index));
            }
            next_index = setting.index as usize + 1;
        }
    }
    misplaced
}

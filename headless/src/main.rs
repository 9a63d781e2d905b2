use std::path::PathBuf;
use std::process::ExitCode;

use bevy::app::AppExit;
use clap::{Parser, ValueEnum};
use undertow_headless::{init, RunOptions};
use undertow_sim::water::SeaPreset;
use undertow_sim::{GameConfig, DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PresetArg {
    Still,
    Calm,
    Choppy,
    Storm,
}

impl From<PresetArg> for SeaPreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Still => SeaPreset::Still,
            PresetArg::Calm => SeaPreset::Calm,
            PresetArg::Choppy => SeaPreset::Choppy,
            PresetArg::Storm => SeaPreset::Storm,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// RON game config; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value_t = 3600)]
    ticks: u64,

    /// Overrides the config seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Sea preset, ignored when a config file is given
    #[arg(short, long, value_enum, default_value_t = PresetArg::Choppy)]
    preset: PresetArg,

    /// Ticks between scripted swipes, 0 disables them
    #[arg(long, default_value_t = 90)]
    swipe_interval: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        },
        None => GameConfig::with_preset(args.preset.into(), DEFAULT_SCREEN_WIDTH, DEFAULT_SCREEN_HEIGHT),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let options = RunOptions {
        ticks: args.ticks,
        swipe_interval: args.swipe_interval,
    };
    match init(config, options) {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(_) => ExitCode::FAILURE,
    }
}

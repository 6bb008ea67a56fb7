//! # Command Line Interface
//!
//! Argument definitions for the `puzzlelayers` binary, kept separate from
//! `main` so `build_cli` can be unit-tested and so a `--help` smoke test
//! can construct it without side effects.

use clap::{arg, crate_version, Command};

pub const DEFAULT_SAMPLES_PER_LAYER: usize = 1 << 20;

pub fn build_cli() -> Command {
    let long_help = "puzzlelayers enumerates, layer by layer, the number of distinct \
configurations of the 24-puzzle at each BFS distance from the solved state.

Each layer's frontier is expanded, radix-sorted, and coalesced entirely on \
disk; `shuffledir` names the prefix used for the temporary bucket files \
created along the way. Set RUST_LOG to control logging verbosity \
(trace,debug,info,warn,error).

Example:
  puzzlelayers -l 6 /tmp/puzzle-shuffle";

    Command::new("puzzlelayers")
        .version(crate_version!())
        .about("Enumerate 24-puzzle BFS layers via disk-backed radix sort")
        .long_about(long_help)
        .arg(
            arg!(-f --sample <PATH> "enable sampling, write samples to this path")
                .required(false),
        )
        .arg(
            arg!(-l --limit <LAYERS> "stop after this many BFS layers")
                .value_parser(clap::value_parser!(usize))
                .required(false),
        )
        .arg(
            arg!(-n --samples <COUNT> "number of samples to draw per layer when -f is set")
                .value_parser(clap::value_parser!(usize))
                .required(false),
        )
        .arg(
            arg!(-s --seed <SEED> "random seed for sampling")
                .value_parser(clap::value_parser!(u64))
                .required(false),
        )
        .arg(arg!(<shuffledir> "bucket-file prefix used for this run's temporary files"))
}

//! # `puzzlelayers`
//!
//! CLI entry point: enumerates 24-puzzle BFS layers via the disk-backed
//! expand/radix-sort/coalesce pipeline in `puzzle24::driver`, printing
//! one report line per layer to stdout and optionally sampling each
//! layer to a file.

use std::path::PathBuf;

use log::info;

use puzzle24::cli::{build_cli, DEFAULT_SAMPLES_PER_LAYER};
use puzzle24::driver::{self, CONFIG_COUNT_STR};
use puzzle24::rng::SeedSource;
use puzzle24::sampling::sample_layer;
use puzzle24::StdResult;

fn main() -> StdResult {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = build_cli().get_matches();

    let shuffledir = matches.get_one::<String>("shuffledir").expect("required by clap").clone();
    let limit = matches.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    let sample_path = matches.get_one::<String>("sample").map(PathBuf::from);
    let n_samples = matches.get_one::<usize>("samples").copied().unwrap_or(DEFAULT_SAMPLES_PER_LAYER);
    let mut seed_source = match matches.get_one::<u64>("seed") {
        Some(&seed) => SeedSource::from_seed(seed),
        None => SeedSource::from_entropy(),
    };

    println!("{CONFIG_COUNT_STR}");
    println!();

    let mut current = tempfile::tempfile()?;
    let size = driver::write_layer_zero(&mut current)?;
    println!("{}", driver::format_layer_report(0, size));
    if let Some(path) = &sample_path {
        current.sync_all()?;
        sample_layer(path, 0, &mut current, n_samples, seed_source.rng_mut())?;
    }

    let mut layer_size = size;
    let mut layer_index = 1usize;
    while layer_index <= limit && layer_size > 0 {
        let dir = format!("{shuffledir}-{layer_index:03}");
        info!("expanding layer {layer_index} using bucket prefix {dir}");

        let mut next = tempfile::tempfile()?;
        layer_size = driver::expand_layer(&dir, &mut current, &mut next)?;
        println!("{}", driver::format_layer_report(layer_index, layer_size));

        if let Some(path) = &sample_path {
            sample_layer(path, layer_index as u32, &mut next, n_samples, seed_source.rng_mut())?;
        }

        current = next;
        layer_index += 1;
    }

    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use cachesim_wb::processor::Processor;
use cachesim_wb::{utils, Cache, CacheSpec, Memory, PrintLog};

#[macro_use]
extern crate log;

/// Runs an LC-2K memory image on a processor with a write-back set-associative cache.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Memory image, one decimal word per line
    #[arg(short = 'f', long = "file")]
    file: PathBuf,
    /// Block size in words
    #[arg(short = 'b', long = "block-size")]
    block_size: u32,
    /// Number of sets
    #[arg(short = 's', long = "sets")]
    num_sets: u32,
    /// Ways per set
    #[arg(short = 'a', long = "assoc")]
    assoc: u32,
    /// Give up after this many instructions
    #[arg(long)]
    max_instructions: Option<u64>,
}

fn main() -> ExitCode {
    // logging
    let env = Env::default()
        .filter_or("CACHESIM_LOG", "warn")
        .write_style_or("CACHESIM_LOG_STYLE", "auto");
    env_logger::init_from_env(env);

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let spec = CacheSpec::new(args.block_size, args.num_sets, args.assoc)
        .context("invalid cache configuration")?;
    info!("cache: {:?}", spec);

    let image = utils::read_memory_image(&args.file)?;
    let mem = Memory::from_image(&image)?;
    let mut proc = Processor::new(mem, Cache::new(spec)?)?;

    let summary = proc.run(&mut PrintLog, args.max_instructions)?;

    // print stats
    println!("machine halted");
    println!("total of {} instructions executed", summary.instructions);
    println!("Hits: {}", summary.stats.hits);
    println!("Misses: {}", summary.stats.misses);
    Ok(())
}

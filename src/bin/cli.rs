use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use pagesim::memory::{MemoryManager, MemoryManagerConfig, MemoryStats, ReplacementPolicy};
use pagesim::trace::{generate, parse_line, Trace, WorkloadConfig};

const HISTORY_FILE: &str = ".pagesim_history";

#[derive(Parser)]
#[command(author, version, about = "Pagesim - demand paging simulator for page replacement policies")]
struct Cli {
    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a trace under one policy
    Run {
        #[command(flatten)]
        memory: MemoryArgs,

        /// Replacement policy (fifo, lru, random)
        #[arg(short, long, default_value = "fifo")]
        policy: ReplacementPolicy,

        /// Check frame and page table bookkeeping after the replay
        #[arg(long)]
        verify: bool,

        /// Trace file
        trace: String,
    },

    /// Replay a trace under every policy
    Compare {
        #[command(flatten)]
        memory: MemoryArgs,

        /// Trace file
        trace: String,
    },

    /// Write a synthetic workload trace
    Generate {
        /// Number of processes
        #[arg(long, default_value_t = 4)]
        processes: u32,

        /// Pages per process
        #[arg(long, default_value_t = 64)]
        pages: usize,

        /// Working set size per process
        #[arg(long, default_value_t = 8)]
        working_set: usize,

        /// References per process
        #[arg(long, default_value_t = 1_000)]
        references: usize,

        /// Probability that a reference hits the working set
        #[arg(long, default_value_t = 0.9, value_parser = parse_locality)]
        locality: f64,

        /// Seed for the generator
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Start an interactive shell
    Shell {
        #[command(flatten)]
        memory: MemoryArgs,

        /// Replacement policy (fifo, lru, random)
        #[arg(short, long, default_value = "fifo")]
        policy: ReplacementPolicy,
    },
}

#[derive(Args)]
struct MemoryArgs {
    /// Number of physical frames
    #[arg(short, long, default_value_t = 16)]
    frames: usize,

    /// Seed for the random policy
    #[arg(short, long)]
    seed: Option<u64>,
}

impl MemoryArgs {
    fn config(&self, policy: ReplacementPolicy) -> MemoryManagerConfig {
        MemoryManagerConfig {
            frame_count: self.frames,
            policy,
            seed: self.seed,
        }
    }
}

/// Minimal stderr sink for the `log` facade
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn parse_locality(s: &str) -> Result<f64, String> {
    let locality: f64 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if (0.0..=1.0).contains(&locality) {
        Ok(locality)
    } else {
        Err(format!("locality must be between 0 and 1, got {}", s))
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(filter))
        .map_err(|err| anyhow!("Failed to install logger: {}", err))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Run { memory, policy, verify, trace } => {
            let trace = load_trace(&trace)?;
            let mut manager = MemoryManager::with_config(memory.config(policy))?;
            let stats = trace.replay(&mut manager)?;
            if verify {
                manager.verify()?;
                println!("Bookkeeping verified");
            }
            print_header(&trace, memory.frames);
            print_report(policy, &stats);
        }
        Commands::Compare { memory, trace } => {
            let trace = load_trace(&trace)?;
            print_header(&trace, memory.frames);
            for policy in ReplacementPolicy::ALL {
                let mut manager = MemoryManager::with_config(memory.config(policy))?;
                let stats = trace.replay(&mut manager)?;
                print_report(policy, &stats);
            }
        }
        Commands::Generate { processes, pages, working_set, references, locality, seed, output } => {
            let config = WorkloadConfig {
                processes,
                pages_per_process: pages,
                working_set_size: working_set,
                references_per_process: references,
                locality,
            };
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let trace = generate(&config, &mut rng);
            match output {
                Some(path) => std::fs::write(&path, trace.to_string())
                    .with_context(|| format!("Failed to write trace {}", path))?,
                None => print!("{}", trace),
            }
        }
        Commands::Shell { memory, policy } => {
            let mut manager = MemoryManager::with_config(memory.config(policy))?;
            run_shell(&mut manager)?;
        }
    }

    Ok(())
}

fn load_trace(path: &str) -> Result<Trace> {
    Trace::from_file(path).with_context(|| format!("Failed to load trace {}", path))
}

fn run_shell(manager: &mut MemoryManager) -> Result<()> {
    println!(
        "Pagesim shell: {} frames, {} policy. Type 'help' for assistance or 'exit' to quit.",
        manager.frame_count(),
        manager.policy()
    );

    let mut rl = Editor::<(), DefaultHistory>::new()?;
    if let Err(err) = rl.load_history(HISTORY_FILE) {
        if !err.to_string().contains("No such file or directory") {
            println!("Error loading history: {}", err);
        }
    }

    loop {
        match rl.readline("pagesim> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match line.to_lowercase().as_str() {
                    "exit" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => print_help(),
                    "stats" => print_report(manager.policy(), &manager.stats()),
                    "frames" => print_frames(manager),
                    "verify" => match manager.verify() {
                        Ok(()) => println!("OK"),
                        Err(err) => println!("Error: {}", err),
                    },
                    _ => match parse_line(line, 1) {
                        Ok(Some(event)) => match event.apply(manager) {
                            Ok(Some(outcome)) => println!("{:?}", outcome),
                            Ok(None) => println!("OK"),
                            Err(err) => println!("Error: {}", err),
                        },
                        Ok(None) => {}
                        Err(err) => println!("Error: {}", err),
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        }
    }

    if let Err(err) = rl.save_history(HISTORY_FILE) {
        println!("Error saving history: {}", err);
    }
    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!("  start <pid> <pages>           - Create an address space");
    println!("  ref <pid> <page>              - Reference a page (pages start at 1)");
    println!("  terminate <pid>               - Release a process and its frames");
    println!();
    println!("Other commands:");
    println!("  stats                         - Show reference and fault counters");
    println!("  frames                        - Show the frame table");
    println!("  verify                        - Check frame and page table bookkeeping");
    println!("  help                          - Display this help message");
    println!("  exit                          - Exit the shell");
}

fn print_frames(manager: &MemoryManager) {
    println!("| {:<6} | {:<8} | {:<6} | {:<6} |", "Frame", "Process", "Page", "Age");
    println!("| {:-<6} | {:-<8} | {:-<6} | {:-<6} |", "-", "-", "-", "-");
    for (frame_id, frame) in manager.frames().iter() {
        let owner = frame.owner.map_or_else(|| "-".to_string(), |pid| pid.to_string());
        let page = frame.page.map_or_else(|| "-".to_string(), |page| (page + 1).to_string());
        println!("| {:<6} | {:<8} | {:<6} | {:<6} |", frame_id.index(), owner, page, frame.age);
    }
}

fn print_header(trace: &Trace, frames: usize) {
    print_row_header("## Conditions");
    print_row("Frame count", &frames);
    print_row("Trace events", &trace.len());
    print_row("Trace references", &trace.reference_count());
    println!();
}

fn print_report(policy: ReplacementPolicy, stats: &MemoryStats) {
    print_row_header(&format!("## Stats for the `{}` policy", policy));
    print_row("References", &stats.references);
    print_row("Invalid references", &stats.invalid_references);
    print_row("Hits", &stats.hits());
    print_row("Page faults", &stats.faults);
    print_row("Evictions", &stats.evictions);
    print_row("Fault rate", &format!("{:.2}%", stats.fault_rate()));
    println!();
}

fn print_row_header(title: &str) {
    println!("{}", title);
    println!("| {:<20} | {:<20} |", "Metric", "Value");
    println!("| {:-<20} | {:-<20} |", "-", "-");
}

fn print_row(label: &str, value: &dyn std::fmt::Display) {
    println!("| {:<20} | {:<20} |", label, value);
}

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use ringq::config::Config;
use ringq::script::{self, Outcome, Replay};
use ringq::util::report::Report;
use ringq::OverflowPolicy;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ringq", about = "Replay operations against a fixed-capacity ring buffer", version = "0.1")]
struct Cli {
    /// Operations to run after the script file, one per argument (e.g. "write 1" read)
    ops: Vec<String>,

    /// Buffer capacity (defaults to the config value)
    #[arg(short, long)]
    capacity: Option<usize>,

    /// What `push` does on a full buffer: reject, overwrite
    #[arg(short, long)]
    policy: Option<OverflowPolicy>,

    /// Read operations from a script file ("-" for stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print a JSON report instead of one line per operation
    #[arg(long)]
    json: bool,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<clap_complete::Shell>,

    /// Log every operation to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "ringq", &mut io::stdout());
        return Ok(());
    }

    let cfg = Config::load();
    if cli.config {
        return run_print_config(&cfg);
    }

    let capacity = cli.capacity.unwrap_or(cfg.buffer.capacity);
    let policy = cli.policy.unwrap_or(cfg.buffer.overflow);
    if capacity == 0 {
        warn!("capacity is 0: every write and read will fail");
    }

    let text = cli.file.as_ref().map(|p| read_script(p)).transpose()?;
    let ops = script::collect_ops(text.as_deref(), &cli.ops).context("invalid operation script")?;
    debug!(capacity, %policy, ops = ops.len(), "replaying");

    let mut replay = Replay::new(capacity, policy);
    let outcomes = replay.run(&ops);

    if cli.json {
        print_json(capacity, policy, &outcomes, replay.buffer.len(), cfg.output.json_pretty)
    } else {
        for o in &outcomes {
            println!("{}", o);
        }
        println!("final length: {}/{}", replay.buffer.len(), capacity);
        Ok(())
    }
}

fn read_script(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).context("reading script from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))
}

fn print_json(
    capacity: usize,
    policy: OverflowPolicy,
    outcomes: &[Outcome],
    final_len: usize,
    pretty: bool,
) -> Result<()> {
    let report = Report::new(capacity, policy, outcomes, final_len);
    println!("{}", report.to_json(pretty)?);
    Ok(())
}

fn run_print_config(cfg: &Config) -> Result<()> {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("Config: {}", path);
    println!();
    println!("[buffer]");
    println!("  capacity    = {}", cfg.buffer.capacity);
    println!("  overflow    = {}", cfg.buffer.overflow);
    println!();
    println!("[output]");
    println!("  json_pretty = {}", cfg.output.json_pretty);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}

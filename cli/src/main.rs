use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use log::{debug, LevelFilter};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use volprobe_core::{LfnMode, Operation, Outcome, ScanOptions};
use volprobe_filesystems::execute;

#[derive(Parser)]
#[command(name = "volprobe")]
#[command(about = "Inspect, search and unlink files on raw EXT2 and FAT16 images", long_about = None)]
struct Cli {
    /// Operation to run: info, find or delete (/info, /find, /delete also accepted)
    operation: Operation,
    /// Path to the disk image
    volume: PathBuf,
    /// File name to find or delete
    file: Option<String>,
    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
    /// Deepest directory level searched below the root
    #[arg(long, default_value_t = 64)]
    max_depth: usize,
    /// How FAT16 long file names are reconstructed
    #[arg(long, value_enum, default_value_t = LfnArg::Chain)]
    lfn: LfnArg,
    /// Delete without asking for confirmation
    #[arg(short, long)]
    yes: bool,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LfnArg {
    /// Validate and join every long-name fragment
    Chain,
    /// Read only the slot right before the short entry
    PrecedingSlot,
}

impl From<LfnArg> for LfnMode {
    fn from(arg: LfnArg) -> Self {
        match arg {
            LfnArg::Chain => LfnMode::Chain,
            LfnArg::PrecedingSlot => LfnMode::PrecedingSlot,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn open_volume(path: &Path, writable: bool) -> anyhow::Result<File> {
    let file = if writable {
        OpenOptions::new().read(true).write(true).open(path)
    } else {
        File::open(path)
    };
    file.with_context(|| format!("Cannot open volume image {}", path.display()))
}

fn confirm_delete(volume: &Path, file: &str) -> anyhow::Result<bool> {
    println!("WARNING: This will unlink '{}' on {}!", file, volume.display());
    print!("Type 'yes' to continue: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim() == "yes")
}

fn exit_code(outcome: &Outcome) -> i32 {
    match outcome {
        Outcome::MetadataReport(_) | Outcome::FileSizeFound(_) | Outcome::Deleted => 0,
        Outcome::NotFound => 1,
        Outcome::UnrecognizedFormat => 2,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = ScanOptions {
        max_depth: cli.max_depth,
        lfn_mode: cli.lfn.into(),
    };
    let target = cli.file.as_deref();
    if cli.operation.requires_target() && target.map_or(true, str::is_empty) {
        anyhow::bail!("'{}' needs a file name", cli.operation);
    }

    if cli.operation.is_destructive() && !cli.yes && !confirm_delete(&cli.volume, target.unwrap_or_default())? {
        println!("Delete cancelled.");
        return Ok(());
    }

    let mut volume = open_volume(&cli.volume, cli.operation.is_destructive())?;
    debug!("Opened {} for {}", cli.volume.display(), cli.operation);

    let outcome = execute(cli.operation, target, &mut volume, &options)
        .with_context(|| format!("{} failed on {}", cli.operation, cli.volume.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome);
    }

    let code = exit_code(&outcome);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};

use clap::{ArgAction, Parser};
use fixed_json::constants::DEFAULT_CAPACITY;
use fixed_json::{Context, DefaultIndex, DuplicateKeys, ParseOptions, Slot};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fixed-json", version, about = "Parse JSON into a fixed node arena and print it back")]
struct Args {
    /// Input file path. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Number of node slots in the arena.
    #[arg(long, value_name = "nodes", default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Keep only the last value of a repeated key.
    #[arg(long = "overwrite-duplicates")]
    overwrite_duplicates: bool,

    /// Accept a comma before a closing bracket.
    #[arg(long = "trailing-commas")]
    trailing_commas: bool,

    /// Accept exponents in numbers (1e5).
    #[arg(long)]
    exponents: bool,

    /// Print only the value at this path, e.g. items/0/name. Implies
    /// --overwrite-duplicates.
    #[arg(long, value_name = "path")]
    get: Option<String>,

    /// Pretty-print the output. Implies --overwrite-duplicates, since the
    /// pretty printer keeps one value per key.
    #[arg(long)]
    pretty: bool,

    /// Print node and size statistics to stderr.
    #[arg(long)]
    stats: bool,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    if let Err(err) = run(&args) {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let input = read_input(args.input.as_deref())?;
    let options = parse_options(args);

    let mut slots = vec![Slot::<DefaultIndex>::VACANT; args.capacity];
    let mut ctx = Context::new(&mut slots)?.with_options(options);
    ctx.parse(&input)?;
    info!(nodes = ctx.node_count(), capacity = ctx.capacity(), "parsed");

    let root = ctx.root().ok_or("document has no root")?;
    let target = match args.get.as_deref() {
        Some(path) => ctx
            .get_path(root, path)
            .ok_or_else(|| format!("no value at path \"{path}\""))?,
        None => root,
    };

    let mut rendered = if args.pretty {
        serde_json::to_vec_pretty(&ctx.value(target))?
    } else if target == root {
        ctx.to_vec()?
    } else {
        serde_json::to_vec(&ctx.value(target))?
    };
    rendered.push(b'\n');

    if args.stats {
        eprintln!(
            "nodes: {}/{}  compact size: {} bytes  input: {} bytes",
            ctx.node_count(),
            ctx.capacity(),
            ctx.dump_size()?,
            input.len()
        );
    }

    write_output(args.output.as_deref(), &rendered)
}

fn parse_options(args: &Args) -> ParseOptions {
    // Pretty and path output render through serde_json, which holds one
    // value per key; parse the same way so the tree matches what is printed.
    let duplicate_keys = if args.overwrite_duplicates || args.pretty || args.get.is_some() {
        DuplicateKeys::OverwriteLast
    } else {
        DuplicateKeys::KeepAll
    };
    ParseOptions::new()
        .with_duplicate_keys(duplicate_keys)
        .with_trailing_commas(args.trailing_commas)
        .with_exponents(args.exponents)
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(fs::read(path)?),
    }
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) if path != "-" => fs::write(path, data)?,
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(data)?;
        }
    }
    Ok(())
}

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;

use fastqube::{
    fastq, CompressOptions, FastqubeWriterBuilder, FileHeader, MmapReader, Policy, RecordLayout,
    DEFAULT_ID_CAPACITY,
};

#[derive(Parser)]
#[command(name = "fastqube", version)]
#[command(about = "Pack FASTQ reads into a compact fixed-width binary stream", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a FASTQ file (plain or compressed)
    Compress(CompressArgs),
    /// Unpack a packed stream back to FASTQ
    Decompress(DecompressArgs),
    /// Print the header of a packed stream
    Inspect(InspectArgs),
}

#[derive(Parser)]
struct CompressArgs {
    /// Input FASTQ file, `-` for stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file [default: stdout]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pack bases with 2 bits; ambiguous bases become G
    #[arg(short = '2', long = "two-bit")]
    two_bit: bool,

    /// Quantize qualities into 5 blocks stored with 3 bits
    #[arg(short = 'b', long = "block-quals")]
    block_quals: bool,

    /// Bytes reserved per read ID, 0 to drop IDs
    #[arg(short = 'B', long = "id-bytes", default_value_t = DEFAULT_ID_CAPACITY)]
    id_bytes: usize,

    /// Omit the per-record length prefix (the output cannot be decompressed)
    #[arg(long)]
    bare: bool,

    /// Skip reads that cannot be packed instead of aborting
    #[arg(long)]
    skip_invalid: bool,
}

#[derive(Parser)]
struct DecompressArgs {
    /// Packed input file, `-` for stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output FASTQ file [default: stdout]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct InspectArgs {
    /// Packed input file, `-` for stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,
}

fn is_stdio(path: &Path) -> bool {
    path == Path::new("-")
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let handle: Box<dyn Write> = match path {
        Some(path) if !is_stdio(path) => Box::new(BufWriter::new(File::create(path)?)),
        _ => Box::new(BufWriter::new(io::stdout().lock())),
    };
    Ok(handle)
}

fn open_packed(path: &Path) -> Result<Box<dyn io::Read>> {
    let handle: Box<dyn io::Read> = if is_stdio(path) {
        Box::new(BufReader::new(io::stdin().lock()))
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };
    Ok(handle)
}

fn compress(args: &CompressArgs) -> Result<()> {
    let options = CompressOptions::builder()
        .bits_per_base(if args.two_bit { 2 } else { 3 })
        .bits_per_qual(if args.block_quals { 3 } else { 6 })
        .id_capacity(args.id_bytes)
        .layout(if args.bare {
            RecordLayout::Bare
        } else {
            RecordLayout::LengthPrefixed
        })
        .build()?;
    let policy = if args.skip_invalid {
        Policy::Skip
    } else {
        Policy::Abort
    };

    let input = fastq::open_input(&args.input)?;
    let mut writer = FastqubeWriterBuilder::default()
        .options(options)
        .policy(policy)
        .build(open_output(args.output.as_deref())?)?;
    let summary = fastq::compress(input, &mut writer)?;

    info!(
        "Packed {} reads from {} ({} skipped, lossless: {})",
        summary.records,
        args.input.display(),
        summary.skipped,
        options.is_lossless()
    );
    Ok(())
}

fn decompress(args: &DecompressArgs) -> Result<()> {
    let input = open_packed(&args.input)?;
    let output = open_output(args.output.as_deref())?;
    let summary = fastq::decompress(input, output)?;
    info!(
        "Unpacked {} reads from {}",
        summary.records,
        args.input.display()
    );
    Ok(())
}

fn inspect(args: &InspectArgs) -> Result<()> {
    let header = FileHeader::from_reader(&mut open_packed(&args.input)?)?;
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", header.render())?;

    // only framed files can be walked
    if !is_stdio(&args.input) && header.options.layout == RecordLayout::LengthPrefixed {
        let reader = MmapReader::new(&args.input)?;
        writeln!(stdout, "Records: {}", reader.num_records()?)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Compress(args) => compress(args),
        Commands::Decompress(args) => decompress(args),
        Commands::Inspect(args) => inspect(args),
    }
}

//! panelmark - mark pack boundaries on floor-panel PDF diagrams
//!
//! Reads each input PDF, finds the panel labels on its 2 x 4 grid and writes
//! a copy with red seams between packs and circles around stray labels.
//! Files are processed independently; one bad file does not stop the batch.

mod logger;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use memmap2::Mmap;
use panelmark_core::high_level::{Analysis, ProcessOptions, analyze_pdf, process_pdf};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info};

/// File name prefix of marked copies.
const DEFAULT_PREFIX: &str = "床パネル書込済_";

/// Marks pack boundaries and stray panel labels on floor-panel PDFs.
#[derive(Parser, Debug)]
#[command(name = "panelmark")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more paths to PDF files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory for marked copies (default: next to each input)
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Prefix prepended to each output file name
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Print the planned marks as JSON lines instead of writing PDFs
    #[arg(long, action = ArgAction::SetTrue)]
    plan: bool,

    /// Number of files processed in parallel (0 = one per CPU)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

/// What a successfully processed file produced.
#[derive(Debug)]
enum Outcome {
    Written { path: PathBuf, bytes: usize },
    Planned(Analysis),
}

#[derive(Serialize)]
struct PlanLine<'a> {
    file: &'a Path,
    analysis: &'a Analysis,
}

/// Where the marked copy of `input` goes.
fn output_path(input: &Path, output_dir: Option<&Path>, prefix: &str) -> Result<PathBuf> {
    let name = input
        .file_name()
        .with_context(|| format!("{} has no file name", input.display()))?;
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let mut file_name = prefix.to_owned();
    file_name.push_str(&name.to_string_lossy());
    Ok(dir.join(file_name))
}

/// True when `output` names the same file as `input` once both are resolved.
///
/// The output file may not exist yet, so only its parent is canonicalized.
fn is_same_file(input: &Path, output: &Path) -> Result<bool> {
    let input = fs::canonicalize(input)
        .with_context(|| format!("cannot resolve {}", input.display()))?;
    let Some(name) = output.file_name() else {
        return Ok(false);
    };
    let parent = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let Ok(parent) = fs::canonicalize(parent) else {
        return Ok(false);
    };
    Ok(parent.join(name) == input)
}

fn map_input(path: &Path) -> Result<Mmap> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    // SAFETY: the mapping is read-only and dropped before this file is
    // written again; concurrent external truncation is not guarded against.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("cannot map {}", path.display()))?;
    Ok(mmap)
}

/// Processes a single PDF file.
fn process_file(path: &Path, args: &Args, options: &ProcessOptions) -> Result<Outcome> {
    let data = map_input(path)?;

    if args.plan {
        let analysis = analyze_pdf(&data, Some(options.clone()))
            .with_context(|| format!("cannot analyze {}", path.display()))?;
        return Ok(Outcome::Planned(analysis));
    }

    let out_path = output_path(path, args.output_dir.as_deref(), &args.prefix)?;
    if is_same_file(path, &out_path)? {
        bail!(
            "output would overwrite {}; set --prefix or --output-dir",
            path.display()
        );
    }

    let marked = process_pdf(&data, Some(options.clone()))
        .with_context(|| format!("cannot mark {}", path.display()))?;
    drop(data);

    fs::write(&out_path, &marked)
        .with_context(|| format!("cannot write {}", out_path.display()))?;
    Ok(Outcome::Written {
        path: out_path,
        bytes: marked.len(),
    })
}

fn print_plan(out: &mut impl Write, path: &Path, analysis: &Analysis) -> Result<()> {
    let line = PlanLine {
        file: path,
        analysis,
    };
    serde_json::to_writer(&mut *out, &line)?;
    writeln!(out)?;
    Ok(())
}

fn run(args: &Args) -> Result<usize> {
    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    }
    if args.jobs > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.jobs)
            .build_global()
            .context("cannot configure worker threads")?;
    }

    let options = ProcessOptions::default();
    let results: Vec<(&PathBuf, Result<Outcome>)> = args
        .files
        .par_iter()
        .map(|path| {
            debug!(file = %path.display(), "processing");
            (path, process_file(path, args, &options))
        })
        .collect();

    let mut stdout = BufWriter::new(io::stdout().lock());
    let mut failed = 0;
    for (path, result) in results {
        match result {
            Ok(Outcome::Written { path: out, bytes }) => {
                info!(file = %path.display(), output = %out.display(), bytes, "marked");
            }
            Ok(Outcome::Planned(analysis)) => {
                info!(
                    file = %path.display(),
                    cells = analysis.sequence.len(),
                    marks = analysis.plan.marks.len(),
                    "planned"
                );
                print_plan(&mut stdout, path, &analysis)?;
            }
            Err(e) => {
                error!(file = %path.display(), "{e:#}");
                failed += 1;
            }
        }
    }
    stdout.flush()?;
    Ok(failed)
}

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init_cli_logger(args.debug);

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            error!(failed, total = args.files.len(), "some files could not be processed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

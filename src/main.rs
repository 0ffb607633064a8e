use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};

use findany::matcher::{self, MatchOptions};
use findany::needles;
use findany::progress::Progress;
use findany::reader::LineReader;
use findany::trie::Trie;

#[derive(Parser, Debug)]
#[command(name = "findany")]
#[command(version)]
#[command(about = "Find any substring from SUBSTRINGS in all lines of FILE and print the ones that contain at least one")]
#[command(
    long_about = "Find any substring from SUBSTRINGS in all lines of FILE and print the ones \
that contain at least one. SUBSTRINGS is a file with one substring per line; dictionaries with \
millions of entries are fine. Reads standard input if FILE is missing."
)]
#[command(after_help = "\
EXAMPLES:
    findany words.txt app.log              Lines of app.log containing any word
    findany -i words.txt app.log           Same, ASCII-case-insensitively
    findany -v words.txt app.log           Lines containing none of the words
    findany -s foo -s bar app.log          Needles from the command line
    zcat big.gz | findany -o hits words.txt    Progress bar while filtering to a file
")]
struct Cli {
    /// File with one substring per line (becomes FILE when -s is used)
    #[arg(value_name = "SUBSTRINGS")]
    first: Option<PathBuf>,

    /// Input file; standard input when missing
    #[arg(value_name = "FILE")]
    second: Option<PathBuf>,

    /// Perform a case-insensitive search (byte-wise ASCII)
    #[arg(short = 'i', long = "case-insensitive")]
    case_insensitive: bool,

    /// Print the lines that contain none of the substrings
    #[arg(short = 'v', long = "invert")]
    invert: bool,

    /// Redirect output to OUTPUT instead of standard output; enables a
    /// progress bar
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Take one substring from the command line instead of a file;
    /// repeatable. Must not be combined with the SUBSTRINGS argument.
    #[arg(short = 's', long = "substring", value_name = "SUBSTRING")]
    substrings: Vec<String>,

    /// Phase-timing diagnostics on stderr
    #[arg(long = "verbose")]
    verbose: bool,
}

/// Where the needle set comes from.
enum NeedleSource {
    File(PathBuf),
    Args(Vec<String>),
}

/// Resolve the positional grammar: with `-s`, the only allowed positional
/// is FILE; without it, the first positional is the dictionary and the
/// optional second is FILE.
fn resolve_inputs(cli: &Cli) -> Result<(NeedleSource, Option<PathBuf>)> {
    if !cli.substrings.is_empty() {
        if cli.second.is_some() {
            bail!("the SUBSTRINGS argument must not be combined with -s/--substring");
        }
        return Ok((NeedleSource::Args(cli.substrings.clone()), cli.first.clone()));
    }
    match &cli.first {
        Some(dictionary) => Ok((NeedleSource::File(dictionary.clone()), cli.second.clone())),
        None => bail!("either the SUBSTRINGS argument or -s/--substring is required"),
    }
}

fn main() -> Result<()> {
    // Bare invocation prints the short usage and exits cleanly; the full
    // help text stays behind -h/--help.
    if env::args_os().len() < 2 {
        println!("{}", Cli::command().render_usage());
        println!("Try findany --help for more information");
        return Ok(());
    }

    let cli = Cli::parse();
    let verbose = cli.verbose;
    let (needle_source, input_path) = resolve_inputs(&cli)?;

    let mut phase = Instant::now();
    let (trie, needle_count): (Trie, usize) = match needle_source {
        NeedleSource::File(path) => needles::build_from_file(&path, cli.case_insensitive)?,
        NeedleSource::Args(substrings) => {
            needles::build_from_args(&substrings, cli.case_insensitive)
        }
    };
    if verbose {
        eprintln!(
            "[startup]   needle index: {} needles, {} nodes in {:.1?}",
            needle_count,
            trie.node_count(),
            phase.elapsed()
        );
    }

    // Input: named file or stdin. The size feeds the progress bar; 0 means
    // unknown.
    let (input, input_size): (Box<dyn Read>, u64) = match &input_path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("No access to file {}", path.display()))?;
            let size = file.metadata().map(|m| m.len()).unwrap_or(0);
            (Box::new(file), size)
        }
        None => (Box::new(io::stdin().lock()), 0),
    };

    // Output: named file (create/truncate) or stdout. The progress bar is
    // only wanted when output was redirected away from stdout.
    let progress_enabled = cli.output.is_some();
    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("No access to file {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = BufWriter::new(sink);

    let mut reader = LineReader::new(input);
    let mut progress = if progress_enabled {
        Some(Progress::new(input_size))
    } else {
        None
    };
    let opts = MatchOptions {
        case_insensitive: cli.case_insensitive,
        invert: cli.invert,
    };

    phase = Instant::now();
    let processed = matcher::run(&trie, &mut reader, &mut sink, opts, progress.as_mut())?;
    if verbose {
        eprintln!(
            "[stream]    {} bytes in {:.1?}",
            processed,
            phase.elapsed()
        );
    }

    Ok(())
}

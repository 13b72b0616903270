// dbdiff - compare two versions of a database-export workbook, sheet by sheet

mod exit_codes;
mod trail;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use dbdiff_config::{load_key_map, LoadStatus, Settings};
use dbdiff_engine::{output_file_name, run, CompareOptions, Labels, RunLog};
use dbdiff_io::{ExcelSource, IoError, XlsxReport};

use exit_codes::{EXIT_ERROR, EXIT_OPEN, EXIT_SKIPPED, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE};

#[derive(Parser)]
#[command(name = "dbdiff")]
#[command(about = "Compare two workbooks sheet by sheet and write the differences to a new workbook")]
#[command(version)]
#[command(after_help = "\
Every sheet present in both files is compared. Sheets listed in the index map
are matched on their key column(s); all others are matched by row position.

Output: <outdir>/<YYMMDD>_<name1>_<name2>_db_differences.xlsx
  <sheet>_same   changed cells, one row per changed record
  <sheet>_diff   rows present in only one file, tagged in column 'Different'

Index map (YAML):
  Items: id
  Orders: [region, order_no]
  Notes: ~              # compared by position

Examples:
  dbdiff --file1 old.xlsx --file2 new.xlsx --name1 v1.0 --name2 v1.1 --index-map index.yaml
  dbdiff --file1 a.xlsx --file2 b.xlsx --name1 a --name2 b --index-map keys.toml --skiprows 0 --doc-prefix ''
  dbdiff ... --json --strict       # JSON run log on stdout; exit 3 if any sheet was skipped

Defaults for --skiprows, --doc-prefix and --outdir can be set in
~/.config/dbdiff/settings.toml (or the file named by DBDIFF_SETTINGS).")]
struct Cli {
    /// First workbook
    #[arg(long, value_name = "PATH")]
    file1: PathBuf,

    /// Second workbook
    #[arg(long, value_name = "PATH")]
    file2: PathBuf,

    /// Label for file1, used in column headers and the output file name
    #[arg(long, value_name = "LABEL")]
    name1: String,

    /// Label for file2
    #[arg(long, value_name = "LABEL")]
    name2: String,

    /// Sheet name -> key column(s). YAML, or TOML/JSON by extension
    #[arg(long = "index-map", value_name = "PATH")]
    index_map: PathBuf,

    /// Rows above the header row [default: 3]
    #[arg(long, value_name = "N")]
    skiprows: Option<usize>,

    /// Sheets starting with this prefix are not compared; '' compares all [default: (DOC)]
    #[arg(long = "doc-prefix", value_name = "PREFIX", allow_hyphen_values = true)]
    doc_prefix: Option<String>,

    /// Directory for the output workbook, created if missing [default: .]
    #[arg(long, value_name = "DIR", env = "DBDIFF_OUTDIR")]
    outdir: Option<PathBuf>,

    /// Print the run log as JSON on stdout instead of the console trail
    #[arg(long)]
    json: bool,

    /// Suppress the console trail
    #[arg(long, short)]
    quiet: bool,

    /// Exit with code 3 when any sheet was skipped
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match cmd_compare(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Diagnostics go to stderr. `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_WRITE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn open(err: IoError, flag: &str) -> Self {
        let hint = match &err {
            IoError::NotFound(_) => Some(format!("check the {} path", flag)),
            IoError::Open { .. } => Some("expected an .xlsx, .xlsm, .xlsb, .xls or .ods workbook".to_string()),
            IoError::Write { .. } => None,
        };
        Self { code: EXIT_OPEN, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// compare
// ============================================================================

/// `--json` payload: the run log plus where the report went and how the index map loaded.
#[derive(Serialize)]
struct JsonOutput<'a> {
    output: &'a Path,
    index_map: &'a LoadStatus,
    #[serde(flatten)]
    log: &'a RunLog,
}

fn cmd_compare(cli: Cli) -> Result<(), CliError> {
    validate_label("--name1", &cli.name1)?;
    validate_label("--name2", &cli.name2)?;

    // Flags override the settings file, which overrides built-in defaults.
    let mut settings = Settings::load();
    if let Some(n) = cli.skiprows {
        settings.skip_rows = n;
    }
    if let Some(prefix) = cli.doc_prefix {
        settings.doc_prefix = prefix;
    }
    if let Some(dir) = cli.outdir {
        settings.outdir = dir;
    }

    let labels = Labels::new(cli.name1, cli.name2);
    let mut options = CompareOptions::new(labels.clone());
    options.skip_rows = settings.skip_rows;
    options.exclude_prefix = settings.exclude_prefix().map(str::to_string);

    // A missing or malformed map is logged by the loader and leaves every sheet positional.
    let keys = load_key_map(&cli.index_map);
    options.keys = keys.map;

    let mut left = ExcelSource::open(&cli.file1).map_err(|e| CliError::open(e, "--file1"))?;
    let mut right = ExcelSource::open(&cli.file2).map_err(|e| CliError::open(e, "--file2"))?;

    let outdir = settings.outdir;
    fs::create_dir_all(&outdir).map_err(|e| {
        CliError::write(format!("cannot create {}: {}", outdir.display(), e))
    })?;
    let out_path = outdir.join(output_file_name(chrono::Local::now().date_naive(), &labels));
    log::info!("comparing {} and {} into {}", cli.file1.display(), cli.file2.display(), out_path.display());

    let mut report = XlsxReport::create(&out_path);
    let log = run(&mut left, &mut right, &options, &mut report)
        .map_err(|e| CliError::write(e.to_string()))?;
    let out_path = report
        .finalize()
        .map_err(|e| CliError::write(e.to_string()).with_hint("is the file open in another program?"))?;

    if cli.json {
        let payload = JsonOutput {
            output: &out_path,
            index_map: &keys.status,
            log: &log,
        };
        let json = serde_json::to_string_pretty(&payload)
            .map_err(|e| CliError::general(format!("cannot serialize run log: {}", e)))?;
        println!("{}", json);
    } else if !cli.quiet {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(trail::render(&log, &out_path).as_bytes())
            .map_err(|e| CliError::general(e.to_string()))?;
    }

    let skipped = log.skipped();
    if cli.strict && skipped > 0 {
        return Err(CliError {
            code: EXIT_SKIPPED,
            message: format!("{} sheet(s) skipped", skipped),
            hint: Some("the report was written for the remaining sheets".to_string()),
        });
    }

    Ok(())
}

/// Labels end up in column headers and the output file name.
fn validate_label(flag: &str, label: &str) -> Result<(), CliError> {
    if label.trim().is_empty() {
        return Err(CliError::usage(format!("{} must not be empty", flag)));
    }
    if label.contains(['/', '\\']) {
        return Err(CliError::usage(format!("{} must not contain path separators: \"{}\"", flag, label))
            .with_hint("labels become part of the output file name"));
    }
    Ok(())
}

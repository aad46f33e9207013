//dashgrid/src/main.rs
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use dashgrid::kernel::services::adapters::{
    export_to_path, load_settings, write_rows, JsonChangeLog, JsonPageSource, TokioExecutor,
};
use dashgrid::kernel::services::ports::{ChangeSink, CollaboratorError, Delimiter, Settings};
use dashgrid::kernel::services::InteractiveContext;
use dashgrid::kernel::{Action, GridSession};
use dashgrid::models::{CellValue, ChangeSet, GridError};

mod logging;

use logging::LogTarget;

const USAGE: &str = "usage: dashgrid <pages.json> [--page N] [--set ROW:COLUMN=VALUE]... \
[--add COLUMN=VALUE,...]... [--delete ROW]... [--pin a,b] [--hide c] \
[--format tsv|csv] [--output PATH] [--save OUT.json] [--log-stderr]";

const TASK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
struct CliArgs {
    pages: PathBuf,
    page: Option<u32>,
    sets: Vec<(usize, String, CellValue)>,
    adds: Vec<Vec<(String, CellValue)>>,
    deletes: Vec<usize>,
    pin: Option<Vec<String>>,
    hide: Option<Vec<String>>,
    format: Option<Delimiter>,
    output: Option<PathBuf>,
    save: Option<PathBuf>,
    log: LogTarget,
}

#[derive(Debug)]
enum CliError {
    Usage(String),
    Grid(GridError),
    Io(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}\n{}", msg, USAGE),
            CliError::Grid(e) => write!(f, "{}", e),
            CliError::Io(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<GridError> for CliError {
    fn from(e: GridError) -> Self {
        CliError::Grid(e)
    }
}

impl From<CollaboratorError> for CliError {
    fn from(e: CollaboratorError) -> Self {
        CliError::Io(e.message)
    }
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let _logging = logging::init(args.log);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "dashgrid failed");
            eprintln!("dashgrid: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), CliError> {
    let mut settings = load_settings().unwrap_or_default();
    apply_overrides(&mut settings, &args);

    let executor = TokioExecutor::new(settings.runtime.worker_threads)
        .map_err(|e| CliError::Io(format!("cannot start worker runtime: {}", e)))?;
    let ctx = Rc::new(InteractiveContext::init(Arc::new(executor)));

    let source = Arc::new(JsonPageSource::from_path(&args.pages)?);
    let sink: Arc<dyn ChangeSink> = match &args.save {
        Some(path) => Arc::new(JsonChangeLog::new(path.clone())),
        None => Arc::new(|_: &ChangeSet| -> Result<(), CollaboratorError> {
            Err(CollaboratorError::new("no --save target given"))
        }),
    };
    let session = GridSession::new(Rc::clone(&ctx), &settings, source, sink);

    session.open()?;
    settle(&session)?;
    if let Some(page) = args.page {
        session.go_to(page)?;
        settle(&session)?;
    }

    for (row, column, value) in &args.sets {
        session.dispatch(Action::SetCell {
            row: *row,
            column: column.clone(),
            value: value.clone(),
        })?;
    }
    if !args.deletes.is_empty() {
        session.dispatch(Action::RemoveRows(args.deletes.clone()))?;
    }
    for fields in &args.adds {
        session.dispatch(Action::AddRow)?;
        let row = session.with_state(|s| s.model.row_count()) - 1;
        for (column, value) in fields {
            session.dispatch(Action::SetCell {
                row,
                column: column.clone(),
                value: value.clone(),
            })?;
        }
    }

    let changes = session.diff();
    let json = serde_json::to_string_pretty(&changes)
        .map_err(|e| CliError::Io(format!("cannot encode change set: {}", e)))?;
    eprintln!("{}", json);

    let rows = session.export_rows();
    let delimiter = settings.export.delimiter;
    let exported = match &args.output {
        Some(path) => export_to_path(&rows, delimiter, path),
        None => write_rows(&rows, delimiter, std::io::stdout().lock()),
    };
    exported.map_err(|e| CliError::Io(format!("export failed: {}", e)))?;

    if args.save.is_some() {
        session.save()?;
        settle(&session)?;
    }

    ctx.teardown();
    Ok(())
}

/// Wait for outstanding tasks and surface their failure.
fn settle(session: &GridSession) -> Result<(), CliError> {
    if !session.wait_idle(TASK_TIMEOUT) {
        return Err(CliError::Io("timed out waiting for background task".to_string()));
    }
    match session.last_error() {
        Some(e) => Err(CliError::Grid(e)),
        None => Ok(()),
    }
}

fn apply_overrides(settings: &mut Settings, args: &CliArgs) {
    if let Some(pin) = &args.pin {
        settings.grid.pinned = pin.clone();
    }
    if let Some(hide) = &args.hide {
        settings.grid.hidden = hide.clone();
    }
    if let Some(format) = args.format {
        settings.export.delimiter = format;
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, CliError> {
    let mut out = CliArgs::default();
    let mut pages = None;
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .ok_or_else(|| CliError::Usage(format!("{} needs a value", flag)))
        };
        match arg.as_str() {
            "--page" => {
                let v = value("--page")?;
                out.page = Some(
                    v.parse()
                        .map_err(|_| CliError::Usage(format!("invalid page: {}", v)))?,
                );
            }
            "--set" => out.sets.push(parse_set(&value("--set")?)?),
            "--add" => out.adds.push(parse_fields(&value("--add")?)?),
            "--delete" => {
                let v = value("--delete")?;
                out.deletes.push(
                    v.parse()
                        .map_err(|_| CliError::Usage(format!("invalid row: {}", v)))?,
                );
            }
            "--pin" => out.pin = Some(split_names(&value("--pin")?)),
            "--hide" => out.hide = Some(split_names(&value("--hide")?)),
            "--format" => {
                out.format = Some(match value("--format")?.as_str() {
                    "tsv" => Delimiter::Tab,
                    "csv" => Delimiter::Comma,
                    other => {
                        return Err(CliError::Usage(format!("unknown format: {}", other)))
                    }
                })
            }
            "--output" => out.output = Some(PathBuf::from(value("--output")?)),
            "--save" => out.save = Some(PathBuf::from(value("--save")?)),
            "--log-stderr" => out.log = LogTarget::Stderr,
            "-h" | "--help" => return Err(CliError::Usage(String::new())),
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown option: {}", flag)))
            }
            path => {
                if pages.replace(PathBuf::from(path)).is_some() {
                    return Err(CliError::Usage("only one pages file may be given".to_string()));
                }
            }
        }
    }

    out.pages = pages.ok_or_else(|| CliError::Usage("missing pages file".to_string()))?;
    Ok(out)
}

/// `ROW:COLUMN=VALUE`
fn parse_set(spec: &str) -> Result<(usize, String, CellValue), CliError> {
    let invalid = || CliError::Usage(format!("invalid --set: {}", spec));
    let (row, rest) = spec.split_once(':').ok_or_else(invalid)?;
    let (column, value) = rest.split_once('=').ok_or_else(invalid)?;
    let row = row.trim().parse().map_err(|_| invalid())?;
    Ok((row, column.trim().to_string(), parse_value(value)))
}

/// `COLUMN=VALUE,COLUMN=VALUE`
fn parse_fields(spec: &str) -> Result<Vec<(String, CellValue)>, CliError> {
    spec.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (column, value) = part
                .split_once('=')
                .ok_or_else(|| CliError::Usage(format!("invalid --add: {}", spec)))?;
            Ok((column.trim().to_string(), parse_value(value)))
        })
        .collect()
}

/// JSON scalars keep their type; anything else is text.
fn parse_value(raw: &str) -> CellValue {
    serde_json::from_str(raw).unwrap_or_else(|_| CellValue::from(raw))
}

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "../tests/unit/main.rs"]
mod tests;

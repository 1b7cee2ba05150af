use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod rules;

pub use rules::{treatment_tables, RuleTable, ARGUMENT_MODE, GENERAL_PARAMETERS, MUTATION_RATE, PROBLEM};

pub const RUN_LOG_FILE: &str = "run.log";
const RUN_ID_SEPARATOR: &str = "__";

/// A run directory named `<run_name>__<run_id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDir {
    pub path: PathBuf,
    pub dir_name: String,
    pub run_name: String,
    pub run_id: String,
}

impl RunDir {
    /// Returns `None` for entries that carry no run id separator.
    pub fn from_entry_name(data_dir: &Path, name: &str) -> Option<Self> {
        if !name.contains(RUN_ID_SEPARATOR) {
            return None;
        }
        let mut parts: Vec<&str> = name.split(RUN_ID_SEPARATOR).collect();
        let run_id = parts.pop()?.to_string();
        Some(Self {
            path: data_dir.join(name),
            dir_name: name.to_string(),
            run_name: parts.join(RUN_ID_SEPARATOR),
            run_id,
        })
    }

    pub fn display_name(&self) -> String {
        format!("{}_{}", self.run_name, self.run_id)
    }

    pub fn log_path(&self) -> PathBuf {
        self.path.join(RUN_LOG_FILE)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunLogError {
    #[error("run_log_missing: {}", .path.display())]
    Missing { path: PathBuf },
    #[error("run_log_unreadable: {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Compliant,
    NonCompliant(Vec<&'static str>),
    Unreadable(String),
}

impl RunOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            RunOutcome::Compliant => "compliant",
            RunOutcome::NonCompliant(_) => "noncompliant",
            RunOutcome::Unreadable(_) => "unreadable",
        }
    }
}

pub struct RunReport {
    pub run: RunDir,
    pub outcome: RunOutcome,
}

impl RunReport {
    /// The console line for this run; compliant runs print nothing.
    pub fn render_line(&self) -> Option<String> {
        match &self.outcome {
            RunOutcome::Compliant => None,
            RunOutcome::NonCompliant(missing) => Some(format!(
                "{} is not compliant with: {}",
                self.run.display_name(),
                python_list_literal(missing)
            )),
            RunOutcome::Unreadable(reason) => Some(format!(
                "{} could not be checked: {}",
                self.run.display_name(),
                reason
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationSummary {
    pub compliant: usize,
    pub noncompliant: usize,
    pub unreadable: usize,
}

impl VerificationSummary {
    pub fn record(&mut self, outcome: &RunOutcome) {
        match outcome {
            RunOutcome::Compliant => self.compliant += 1,
            RunOutcome::NonCompliant(_) => self.noncompliant += 1,
            RunOutcome::Unreadable(_) => self.unreadable += 1,
        }
    }

    /// Runs whose log was examined. Unreadable runs are tallied separately.
    pub fn total_runs(&self) -> usize {
        self.compliant + self.noncompliant
    }

    pub fn render_line(&self) -> String {
        let mut line = format!(
            "# Compliant runs = {}; # Non-compliant runs = {}; Total runs: {}",
            self.compliant,
            self.noncompliant,
            self.total_runs()
        );
        if self.unreadable > 0 {
            line.push_str(&format!("; # Unreadable runs = {}", self.unreadable));
        }
        line
    }
}

pub struct VerificationReport {
    pub data_dir: PathBuf,
    pub checked_at: DateTime<Utc>,
    pub runs: Vec<RunReport>,
    pub summary: VerificationSummary,
}

pub fn verify_directory(data_dir: &Path) -> Result<VerificationReport> {
    let runs = discover_runs(data_dir)?;
    let mut summary = VerificationSummary::default();
    let mut reports = Vec::with_capacity(runs.len());
    for run in runs {
        let outcome = check_run(&run);
        summary.record(&outcome);
        reports.push(RunReport { run, outcome });
    }
    info!(
        data_dir = %data_dir.display(),
        compliant = summary.compliant,
        noncompliant = summary.noncompliant,
        unreadable = summary.unreadable,
        "parameter verification finished"
    );
    Ok(VerificationReport {
        data_dir: data_dir.to_path_buf(),
        checked_at: Utc::now(),
        runs: reports,
        summary,
    })
}

/// Immediate entries of `data_dir` that look like runs, sorted by entry name.
pub fn discover_runs(data_dir: &Path) -> Result<Vec<RunDir>> {
    if !data_dir.is_dir() {
        return Err(anyhow!(
            "data_dir_not_found: {} is not a directory",
            data_dir.display()
        ));
    }
    let walker = walkdir::WalkDir::new(data_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    let mut runs = Vec::new();
    for entry in walker {
        let entry =
            entry.with_context(|| format!("failed to list data directory {}", data_dir.display()))?;
        let Some(name) = entry.file_name().to_str() else {
            warn!(entry = ?entry.file_name(), "skipping non-utf8 entry");
            continue;
        };
        match RunDir::from_entry_name(data_dir, name) {
            Some(run) => runs.push(run),
            None => debug!(entry = name, "skipping entry without run id"),
        }
    }
    Ok(runs)
}

pub fn read_run_log(run_path: &Path) -> Result<String, RunLogError> {
    let path = run_path.join(RUN_LOG_FILE);
    match fs::read_to_string(&path) {
        Ok(data) => Ok(data.trim().to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RunLogError::Missing { path }),
        Err(source) => Err(RunLogError::Unreadable { path, source }),
    }
}

pub fn check_run(run: &RunDir) -> RunOutcome {
    let log = match read_run_log(&run.path) {
        Ok(log) => log,
        Err(err) => {
            warn!(run = %run.dir_name, error = %err, "run log could not be read");
            return RunOutcome::Unreadable(err.to_string());
        }
    };
    let missing = missing_parameters(&run.run_name, &log);
    debug!(
        run = %run.dir_name,
        labels = ?matched_labels(&run.run_name),
        missing = missing.len(),
        "checked run"
    );
    if missing.is_empty() {
        RunOutcome::Compliant
    } else {
        RunOutcome::NonCompliant(missing)
    }
}

/// Required strings absent from `log`, in rule order. Every matched entry
/// contributes, so a string required twice is reported twice.
pub fn missing_parameters(run_name: &str, log: &str) -> Vec<&'static str> {
    let mut missing: Vec<&'static str> = GENERAL_PARAMETERS
        .iter()
        .copied()
        .filter(|param| !log.contains(*param))
        .collect();
    for table in treatment_tables() {
        for (_, required) in table.matching(run_name) {
            missing.extend(
                required
                    .iter()
                    .copied()
                    .filter(|param| !log.contains(*param)),
            );
        }
    }
    missing
}

pub fn matched_labels(run_name: &str) -> Vec<&'static str> {
    treatment_tables()
        .into_iter()
        .flat_map(|table| table.matching(run_name).map(|(label, _)| label))
        .collect()
}

/// Renders `items` the way a Python list of strings prints.
pub fn python_list_literal(items: &[&str]) -> String {
    let inner: Vec<String> = items.iter().map(|s| python_str_literal(s)).collect();
    format!("[{}]", inner.join(", "))
}

fn python_str_literal(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

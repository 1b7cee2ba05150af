use anyhow::Result;
use clap::Parser;
use lab_verify::{RunOutcome, RunReport, VerificationReport, VerificationSummary};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "verify-params",
    version = "0.3.0",
    about = "Check that run logs set the parameters their treatment labels require"
)]
struct Cli {
    /// Target experiment directory.
    data_directory: PathBuf,
    #[arg(long)]
    json: bool,
    #[arg(long, env = "LAB_VERIFY_LOG", default_value = "warn")]
    log: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);
    match run_verify(&cli) {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            if cli.json {
                emit_json(&json_error(
                    "verify_failed",
                    err.to_string(),
                    json!({ "data_dir": cli.data_directory.display().to_string() }),
                ));
                std::process::exit(1);
            }
            Err(err)
        }
    }
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the process exit code: non-zero when some run could not be checked.
fn run_verify(cli: &Cli) -> Result<i32> {
    let report = lab_verify::verify_directory(&cli.data_directory)?;
    if cli.json {
        emit_json(&report_to_json(&report));
    } else {
        for run in &report.runs {
            if let Some(line) = run.render_line() {
                println!("{}", line);
            }
        }
        println!("{}", report.summary.render_line());
    }
    Ok(if report.summary.unreadable > 0 { 1 } else { 0 })
}

fn emit_json(value: &Value) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{}", s),
        Err(_) => println!(
            "{{\"ok\":false,\"error\":{{\"code\":\"serialization_error\",\"message\":\"failed to serialize JSON payload\",\"details\":{{}}}}}}"
        ),
    }
}

fn json_error(code: &str, message: String, details: Value) -> Value {
    json!({
        "ok": false,
        "error": {
            "code": code,
            "message": message,
            "details": details
        }
    })
}

fn report_to_json(report: &VerificationReport) -> Value {
    json!({
        "ok": report.summary.unreadable == 0,
        "command": "verify-params",
        "data_dir": report.data_dir.display().to_string(),
        "checked_at": report.checked_at.to_rfc3339(),
        "summary": summary_to_json(&report.summary),
        "runs": report.runs.iter().map(run_report_to_json).collect::<Vec<_>>(),
    })
}

fn summary_to_json(summary: &VerificationSummary) -> Value {
    json!({
        "compliant": summary.compliant,
        "noncompliant": summary.noncompliant,
        "unreadable": summary.unreadable,
        "total_runs": summary.total_runs(),
    })
}

fn run_report_to_json(report: &RunReport) -> Value {
    let mut value = json!({
        "dir_name": report.run.dir_name,
        "run_name": report.run.run_name,
        "run_id": report.run.run_id,
        "display_name": report.run.display_name(),
        "log_path": report.run.log_path().display().to_string(),
        "status": report.outcome.status(),
    });
    match &report.outcome {
        RunOutcome::Compliant => {}
        RunOutcome::NonCompliant(missing) => {
            value["missing"] = json!(missing);
        }
        RunOutcome::Unreadable(reason) => {
            value["reason"] = json!(reason);
        }
    }
    value
}

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};

use jscope::cli::args::{CliArgs, OutputFormat};
use jscope::cli::driver;
use jscope::cli::reporter::{Reporter, render_json};

const EXIT_SUCCESS: i32 = 0;
/// At least one error diagnostic (parse error or duplicate declaration).
const EXIT_DIAGNOSTICS_PRESENT: i32 = 1;
/// Only with `--unresolved-only`: some name did not resolve.
const EXIT_UNRESOLVED_PRESENT: i32 = 2;

fn main() -> Result<()> {
    // JSCOPE_LOG / RUST_LOG enable tracing; JSCOPE_LOG_FORMAT picks text, tree or json.
    jscope::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let reports = driver::run(&args)?;

    let output = match args.format {
        OutputFormat::Json => render_json(&reports).context("failed to serialize report")?,
        OutputFormat::Text => {
            let color = !args.no_color && std::io::stdout().is_terminal();
            Reporter::new(color).render_reports(&reports)
        }
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}").context("failed to write report")?;
    stdout.flush().context("failed to write report")?;

    let code = if reports.iter().any(|r| r.has_errors()) {
        EXIT_DIAGNOSTICS_PRESENT
    } else if args.unresolved_only && reports.iter().any(|r| r.unresolved > 0) {
        EXIT_UNRESOLVED_PRESENT
    } else {
        EXIT_SUCCESS
    };
    std::process::exit(code);
}

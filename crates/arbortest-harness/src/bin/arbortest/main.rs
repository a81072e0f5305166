//! Flagless driver: runs every registered test exactly once, prints one
//! diagnostic line per failing test plus a summary, and exits with the
//! number of failed tests.

use std::io;
use std::process::ExitCode;

use arbortest_harness::run_log::{LogEmitter, RunLogEntry};
use arbortest_harness::{TestRegistry, TestRunner, config, install_memory_instrumentation, report};

mod document;
mod memory;
mod query;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("arbortest: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> io::Result<ExitCode> {
    install_memory_instrumentation();

    let mut registry = TestRegistry::new();
    // Cross-module execution order is fixed by this list; order inside a
    // module is its own registration sequence.
    let modules: [fn(&mut TestRegistry); 3] =
        [memory::register, document::register, query::register];
    for register in modules {
        register(&mut registry);
    }

    let runner = TestRunner::new();
    let (reports, summary) = runner.run_all(&registry);

    let stdout = io::stdout();
    report::render(&reports, &summary, &mut stdout.lock())?;

    if let Some(path) = config::run_log_path() {
        let mut emitter = LogEmitter::create(path)?;
        for test_report in &reports {
            emitter.emit(&RunLogEntry::from_report(test_report))?;
        }
        emitter.finish()?;
    }

    Ok(ExitCode::from(
        u8::try_from(summary.failed()).unwrap_or(u8::MAX),
    ))
}

use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic sensor driver for the sailing navigation core")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 10)]
    cycles: usize,
    #[arg(long, default_value_t = 500)]
    cycle_ms: u64,
    /// Number of synthetic AIS contacts
    #[arg(long, default_value_t = 6)]
    contacts: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Append one JSON line per decision cycle to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Keep deciding until Ctrl+C instead of stopping after `--cycles`
    #[arg(long, default_value_t = false)]
    live: bool,
}

fn summarize(result: &WorkflowResult) {
    let decided = result
        .records
        .iter()
        .filter(|record| record.recommended_course.is_some())
        .count();
    let last_course = result
        .records
        .last()
        .and_then(|record| record.recommended_course);
    println!(
        "Run -> cycles {}, decided {}, last course {:?}, contacts expired {}, frames {}",
        result.records.len(),
        decided,
        last_course,
        result.counters.contacts_expired,
        result.counters.visual_frames
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.cycles, args.cycle_ms, args.contacts, args.seed)
    };
    if args.live {
        workflow_config.cycles = 0;
    }
    workflow_config.validate()?;

    let mut runner = Runner::new(workflow_config);
    if let Some(path) = args.report {
        runner = runner.with_report(path);
    }
    let stop = Arc::new(AtomicBool::new(false));

    if args.live {
        let worker = {
            let runner = runner.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || runner.execute(stop))
        };
        println!("Deciding continuously (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
        stop.store(true, Ordering::SeqCst);
        let result = worker
            .join()
            .map_err(|_| anyhow!("decision thread panicked"))??;
        summarize(&result);
    } else {
        let result = runner.execute(stop)?;
        summarize(&result);
    }

    Ok(())
}

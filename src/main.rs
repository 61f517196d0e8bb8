// src/main.rs

use masscan_worker::types::TaskStatus;
use masscan_worker::{cli, logging, run};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(Some(TaskStatus::Aborted)) => 1,
        Ok(_) => 0,
        Err(err) => {
            eprintln!("masscan-worker error: {err:?}");
            1
        }
    };
    // Exit explicitly: the stdin control reader may still be parked in a
    // blocking read that would otherwise hold up runtime shutdown.
    std::process::exit(code);
}

async fn run_main() -> anyhow::Result<Option<TaskStatus>> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}

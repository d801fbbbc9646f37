// src/main.rs

use std::process::ExitCode;

use dagrun::errors::DispatchError;
use dagrun::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("dagrun error: {err:?}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dagrun error: {err:?}");
            exit_code_for(&err)
        }
    }
}

/// 130 for an interrupted run (shell convention for SIGINT), 1 otherwise.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<DispatchError>() {
        Some(DispatchError::Stopped { .. }) => ExitCode::from(130),
        _ => ExitCode::FAILURE,
    }
}

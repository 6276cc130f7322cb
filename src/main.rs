// src/main.rs

use companion_launcher::errors::LauncherError;
use companion_launcher::{cli, logging, run};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("companion-launcher error: {err:#}");
            err.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run_main() -> Result<i32, LauncherError> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}

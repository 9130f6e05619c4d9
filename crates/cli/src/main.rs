//! Entry point: parses the flag stream, then hands the built state to
//! the runner.

use std::process::ExitCode;

use semsketch::runner::Runner;
use semsketch::ui;
use tracing::level_filters::LevelFilter;

fn main() -> anyhow::Result<ExitCode> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        println!("{}", ui::help());
        return Ok(ExitCode::SUCCESS);
    }
    if args.iter().any(|arg| arg == "--bash-completion") {
        print!("{}", ui::bash_completion());
        return Ok(ExitCode::SUCCESS);
    }

    let state = match semsketch::parse(&args) {
        Ok(state) => state,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!();
            eprintln!("{}", ui::help());
            return Ok(ExitCode::from(2));
        }
    };

    let level = if state.settings().debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let runner = Runner::new(state)?;
    match runner.run()? {
        Some(status) if !status.success() => {
            let code = status
                .code()
                .and_then(|c| u8::try_from(c).ok())
                .unwrap_or(1);
            Ok(ExitCode::from(code))
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

use algos::commands::{store, text, Cli, Commands};
use algos::io::StdinReader;
use algos::utils::logger::init_logger;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_command();

    if let Err(err) = init_logger(cli.log_level.as_deref(), cli.log_file.clone()) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::from(1);
    }

    match main_impl(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn main_impl(command: Commands) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Text { action } => text::run(action, &mut StdinReader::stdin(), &mut out),
        Commands::Store {
            backend,
            dir,
            action,
        } => store::run(backend.as_deref(), dir, action, &mut out),
    }
}

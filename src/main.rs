use clap::Parser;
use tasklist::cli::commands::Cli;
use tasklist::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = handlers::resolve_data_dir(cli.data_dir.as_deref())
        .map_err(Into::into)
        .and_then(|dir| match cli.command {
            // No subcommand → launch TUI
            None => tasklist::tui::run(&dir),
            Some(cmd) => handlers::dispatch(cmd, &dir, cli.json),
        });

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

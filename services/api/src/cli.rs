use crate::demo::{run_catalog, run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use servisai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "servisai.lt intake",
    about = "Serve and demonstrate the repair-request intake page backend",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the category catalog, mock offers, and activity feed
    Catalog,
    /// Walk one intake session through browse, edit, and submit
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Catalog => {
            run_catalog();
            Ok(())
        }
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["servisai-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_serve_overrides_and_demo_flags() {
        let cli = Cli::try_parse_from(["servisai-api", "serve", "--port", "8080"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.host.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["servisai-api", "demo", "--fail"]).expect("parses");
        assert!(matches!(cli.command, Some(Command::Demo(DemoArgs { fail: true, .. }))));
    }
}

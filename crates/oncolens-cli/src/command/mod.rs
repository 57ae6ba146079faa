use clap::{ArgAction, Parser, Subcommand};

use self::{expression::ExpressionArg, survival::SurvivalArg};

mod expression;
mod survival;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Which pipeline to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Clinical survival analysis by metastasis status
    Survival(#[clap(flatten)] SurvivalArg),
    /// Differential expression analysis between sample groups
    Expression(#[clap(flatten)] ExpressionArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);

    match args.mode {
        Mode::Survival(arg) => survival::run(&arg)?,
        Mode::Expression(arg) => expression::run(&arg)?,
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("oncolens started with verbosity level: {verbose}");
}

mod cli;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "irchecker",
    version,
    about = "Check compiler pass dumps against CHECK annotations in test sources"
)]
struct Cli {
    #[command(flatten)]
    check: cli::check::CheckArgs,
}

fn main() {
    cli::init_logging();
    let cli = Cli::parse();
    cli::check::cmd_check(cli.check);
}

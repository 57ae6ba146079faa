mod command;
mod config;
mod plot;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}

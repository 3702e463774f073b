use anyhow::Result;
use clap::Parser;
use wikiwym::cli::{Cli, Command, ConfigCommand};
use wikiwym::commands::build::{self, BuildArgs};
use wikiwym::commands::config;
use wikiwym::commands::init::{self, InitArgs};
use wikiwym::commands::render::{self, RenderArgs};
use wikiwym::commands::toc::{self, TocArgs};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            input,
            output,
            no_warnings,
            standalone,
            format,
        } => {
            render::execute(RenderArgs {
                input,
                output,
                no_warnings,
                standalone,
                format,
            })?;
        }
        Command::Toc {
            input,
            max_depth,
            format,
        } => {
            toc::execute(TocArgs {
                input,
                max_depth,
                format,
            })?;
        }
        Command::Build { source, output } => {
            build::execute(BuildArgs { source, output })?;
        }
        Command::Init(args) => {
            init::run(InitArgs {
                force: args.force,
                working_dir: None,
            })?;
        }
        Command::Config(cmd) => match cmd {
            ConfigCommand::Get { key } => {
                config::get(&key)?;
            }
            ConfigCommand::Set { key, value } => {
                config::set(&key, &value)?;
            }
            ConfigCommand::List => {
                config::list()?;
            }
            ConfigCommand::Path => {
                config::path()?;
            }
        },
    }

    Ok(())
}

use clap::Parser;
use color_eyre::eyre::WrapErr;
use std::process;

use bumpver::{cli::Args, command::bump, result::Result};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("bumpver")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli_args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            // clap exits usage errors with 2
            err.print().wrap_err("failed to print usage")?;
            process::exit(code);
        }
    };

    initialize_logger(cli_args.debug)?;

    bump::execute(&cli_args)
        .await
        .wrap_err_with(|| format!("failed to bump {}", cli_args.name))
}

use clap::Parser;

mod cli;

fn initialize_logger(debug: bool) -> branchsmith::Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("branchsmith")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    match cli_args.command {
        cli::Command::Reconcile {
            config,
            repo,
            out_file,
        } => cli::reconcile::execute(&config, &repo, out_file).await?,
        cli::Command::Handlers => cli::show::handlers()?,
        cli::Command::Schema { out_file } => cli::show::schema(out_file).await?,
    }

    Ok(())
}

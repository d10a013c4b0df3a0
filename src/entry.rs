use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app;
use crate::args::LoadArgs;
use crate::config::{LoadTestConfig, apply_config, load_config};
use crate::error::AppResult;

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;

    if let Some(config_file) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config_file)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color, args.log_level.as_deref());

    let config = LoadTestConfig::from_args(&args)?;
    tracing::debug!("Resolved run configuration: {:?}", config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run_local(config, args.export_json.as_deref()))?;
    Ok(())
}

fn parse_args() -> AppResult<(LoadArgs, ArgMatches)> {
    let matches = LoadArgs::command().get_matches();
    let args = LoadArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

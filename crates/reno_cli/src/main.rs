use clap::Parser;
use log::warn;
use reno_cli::app::{self, build_context, is_informational, normalize_parse_error};
use reno_cli::cli::Cli;
use reno_cli::shell;
use reno_core::config::{Config, load_config_with_fallback};
use reno_core::error::AppError;
use reno_core::logging;

fn start_logging(config: &Config, load_error: Option<&AppError>) {
    if let Err(err) =
        logging::resolve_level(config.log_level.as_deref()).and_then(logging::init_logging)
    {
        eprintln!("WARNING: logging disabled: {err}");
    }

    if let Some(err) = load_error {
        warn!(
            "event=config_load module=cli status=fallback code={} message={}",
            err.code(),
            err.message()
        );
    }
}

fn run_once(cli: Cli, base: &Config, load_error: Option<&AppError>) -> Result<(), AppError> {
    let ctx = build_context(&cli, base)?;
    start_logging(&ctx.config, load_error);
    app::execute(cli.command, &ctx)
}

fn fail(err: AppError) -> ! {
    eprintln!("ERROR: {err}");
    std::process::exit(1);
}

fn main() {
    let loaded = load_config_with_fallback();
    let base = loaded.config.with_env();

    if std::env::args_os().len() <= 1 {
        start_logging(&base, loaded.error.as_ref());
        if let Err(err) = shell::run(std::io::stdin().lock(), &base) {
            fail(err);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_informational(&err) => {
            print!("{err}");
            return;
        }
        Err(err) => fail(normalize_parse_error(err)),
    };

    if let Err(err) = run_once(cli, &base, loaded.error.as_ref()) {
        fail(err);
    }
}

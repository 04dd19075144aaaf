use crate::app::args::Args;
use crate::app::simulation;
use clap::error::ErrorKind;
use clap::Parser;
use tunnelq::core::error_handling::log_error_with_context;
use tunnelq::core::logging::init_logging;
use tunnelq::core::version::long_version;
use tunnelq::queue::QueueConfig;

const EXIT_OK: i32 = 0;
/// Exit code when the configuration or arguments are unusable
const EXIT_CONFIG: i32 = 1;
/// Exit code when packets went missing or pool objects leaked
const EXIT_LEAK: i32 = 2;

/// Initialize application startup
pub fn startup() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_error_exit_code(&e));
        }
    };
    let use_color = args.use_color();
    colored::control::set_override(use_color);

    let log_file = args.log_file.as_ref().map(|p| p.to_string_lossy().to_string());
    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Failed to initialise logging: {}", e);
        std::process::exit(EXIT_CONFIG);
    }

    log::info!("tunnelq {} starting", long_version());

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("FATAL: could not start async runtime: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let code = runtime.block_on(run(args));
    std::process::exit(code);
}

/// Help and version requests succeed; every other parse failure is an
/// argument error, kept distinct from the leak exit code
fn parse_error_exit_code(error: &clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
        _ => EXIT_CONFIG,
    }
}

async fn run(args: Args) -> i32 {
    let config = match QueueConfig::load_or_default(args.config_file.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Loading queue configuration");
            return EXIT_CONFIG;
        }
    };
    if let Err(e) = args.validate() {
        log_error_with_context(&e, "Validating arguments");
        return EXIT_CONFIG;
    }
    log::debug!("Queue configuration: {:?}", config);

    let settings = args.settings();
    log::info!(
        "Running {} producer(s) x {} packet(s) with {} worker(s)",
        settings.producers,
        settings.packets_per_producer,
        settings.consumers
    );

    let report = simulation::run(&config, &settings).await;
    report.log_summary();

    if report.is_clean() {
        EXIT_OK
    } else {
        EXIT_LEAK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_failure(argv: &[&str]) -> clap::Error {
        match Args::try_parse_from(argv.iter().copied()) {
            Ok(args) => panic!("expected a parse error, got {:?}", args),
            Err(e) => e,
        }
    }

    #[test]
    fn test_bad_flag_values_exit_with_config_code() {
        let cases: [&[&str]; 3] = [
            &["tunnelq", "--log-format", "xml"],
            &["tunnelq", "--packets", "notanumber"],
            &["tunnelq", "--no-such-flag"],
        ];
        for argv in cases {
            let code = parse_error_exit_code(&parse_failure(argv));
            assert_eq!(code, EXIT_CONFIG, "argv {:?}", argv);
            assert_ne!(code, EXIT_LEAK);
        }
    }

    #[test]
    fn test_help_and_version_exit_cleanly() {
        assert_eq!(parse_error_exit_code(&parse_failure(&["tunnelq", "--help"])), EXIT_OK);
        assert_eq!(parse_error_exit_code(&parse_failure(&["tunnelq", "--version"])), EXIT_OK);
    }
}

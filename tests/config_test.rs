use action_capture::config::{LogFormat, TelemetryConfig};

// Both cases touch the same process-wide variables, so they run in one test.
#[test]
fn config_from_env_reads_logging_vars() {
    unsafe {
        std::env::set_var("LOG_LEVEL", "action_capture=trace");
        std::env::set_var("LOG_FORMAT", "JSON");
    }

    let config = TelemetryConfig::from_env().unwrap();
    assert_eq!(config.log_level, "action_capture=trace");
    assert_eq!(config.log_format, LogFormat::Json);

    unsafe {
        std::env::set_var("LOG_FORMAT", "pretty");
    }
    let result = TelemetryConfig::from_env();
    assert!(result.is_err());

    unsafe {
        std::env::remove_var("LOG_LEVEL");
        std::env::remove_var("LOG_FORMAT");
    }

    let config = TelemetryConfig::from_env().unwrap();
    assert_eq!(config.log_level, "info");
    assert_eq!(config.log_format, LogFormat::Compact);
}

#[test]
fn log_format_parses_case_insensitively() {
    assert_eq!(" Compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
    assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    assert!("yaml".parse::<LogFormat>().is_err());
}

use miette::Diagnostic;
use modkit_util::errors::ModkitError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = ModkitError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_registry_error_has_help() {
    let err = ModkitError::Registry {
        message: "expected array".to_string(),
    };
    assert_eq!(err.to_string(), "Registry error: expected array");
    let help = err.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("JSON arrays"), "got: {help}");
}

#[test]
fn test_config_error_display() {
    let err = ModkitError::Config {
        message: "bad syntax".to_string(),
    };
    assert_eq!(err.to_string(), "Configuration error: bad syntax");
}

#[test]
fn test_resolution_error_display() {
    let err = ModkitError::Resolution {
        message: "X is not part of the resolution".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Relationship resolution failed: X is not part of the resolution"
    );
}

#[test]
fn test_generic_error_is_bare_message() {
    let err = ModkitError::Generic {
        message: "something went wrong".to_string(),
    };
    assert_eq!(err.to_string(), "something went wrong");
}

#[test]
fn test_into_miette_report() {
    let result: miette::Result<()> = Err(ModkitError::Generic {
        message: "boxed".to_string(),
    }
    .into());
    assert_eq!(result.unwrap_err().to_string(), "boxed");
}

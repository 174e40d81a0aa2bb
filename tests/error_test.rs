use std::io;

use scaffold::error::Error;
use scaffold::renderer::{MiniJinjaRenderer, TemplateRenderer};
use scaffold::vars::Vars;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config.");

    let err = Error::AlreadyExistsError { path: "proj/main.go".to_string() };
    assert_eq!(err.to_string(), "'proj/main.go' already exists and no-clobber is enabled.");
    assert!(err.is_already_exists());

    let err = Error::MarkerNotFoundError {
        name: "routes".to_string(),
        path: "proj/routes.go".to_string(),
        marker: "// here".to_string(),
    };
    assert_eq!(err.to_string(), "Inject 'routes': marker '// here' not found in 'proj/routes.go'.");
    assert!(!err.is_already_exists());
}

#[test]
fn test_filesystem_error_keeps_source() {
    let err = Error::fs("proj/a.txt", io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
    assert_eq!(err.to_string(), "Filesystem error at 'proj/a.txt': denied.");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_template_error_from_render() {
    let engine = MiniJinjaRenderer::new();
    let err = engine.render("{{ Project | nosuchfilter }}", &Vars::new()).unwrap_err();

    match err {
        Error::TemplateError(terr) => {
            assert!(terr.message.contains("nosuchfilter") || terr.message.contains("unknown filter"));
            assert!(std::error::Error::source(&terr).is_some());
        }
        other => panic!("Expected TemplateError, got {other:?}"),
    }
}

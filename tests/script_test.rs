//! Script runner tests.

mod common;

use common::Fixture;
use rust_nsi::console::ConsoleCall;
use rust_nsi::{Command, ConsoleValue, NsiError, ScriptRunner};

#[test]
fn test_run_passes_full_path() {
    let fixture = Fixture::new(1);
    let session = fixture.open();
    let script = fixture.touch("HelloWorld.bas");

    ScriptRunner::new(&session).run(&script).unwrap();
    assert_eq!(
        fixture.console.calls(),
        vec![ConsoleCall::Invoke(
            Command::RunScriptFile,
            vec![ConsoleValue::Text(script.to_string_lossy().into_owned())],
        )]
    );
}

#[test]
fn test_missing_script_never_reaches_console() {
    let fixture = Fixture::new(1);
    let session = fixture.open();
    let script = fixture.missing("Absent.bas");

    let err = ScriptRunner::new(&session).run(&script).unwrap_err();
    assert!(matches!(err, NsiError::NotFound { ref path } if *path == script));
    assert!(fixture.console.calls().is_empty());
}

#[test]
fn test_interpreter_failure_names_script() {
    let fixture = Fixture::new(1);
    let session = fixture.open();
    let script = fixture.touch("Broken.bas");
    fixture.console.fail_command(Command::RunScriptFile);

    let err = ScriptRunner::new(&session).run(&script).unwrap_err();
    assert!(err.is_external());
    assert!(err.to_string().contains("Broken.bas"));
}

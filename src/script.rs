//! Runner for NSI2000 automation scripts.
//!
//! Covers anything the typed façades do not: the script file is handed to the
//! vendor's interpreter by path and its contents are never inspected here.

use std::path::Path;

use tracing::info;

use crate::console::{Command, ConsoleValue};
use crate::error::{AppResult, NsiError};
use crate::session::Session;

/// Script runner bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct ScriptRunner<'a> {
    session: &'a Session,
}

impl<'a> ScriptRunner<'a> {
    /// Bind to `session`.
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Run the script at `path` (full path, typically a `.bas` file).
    ///
    /// # Errors
    ///
    /// - `NotFound` if `path` does not exist; nothing is sent to the console
    /// - `ExternalCallFailed` naming the script if the interpreter fails
    pub fn run(&self, path: &Path) -> AppResult<()> {
        if !path.exists() {
            return Err(NsiError::not_found(path));
        }
        self.session.invoke(
            &format!("run script {}", path.display()),
            Command::RunScriptFile,
            &[ConsoleValue::from(path.to_string_lossy().into_owned())],
        )?;
        info!("Script '{}' completed", path.display());
        Ok(())
    }
}

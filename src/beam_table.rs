//! Beam (frequency) table operations.
//!
//! The console has no property for the number of beams. The count is
//! obtained by running the vendor's export script, which writes it to a
//! `<measurement>_BeamCount.txt` sidecar next to the measurement file. The
//! sidecar is read once and removed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::console::{Command, ConsoleValue, Property};
use crate::error::{AppResult, NsiError};
use crate::session::{Session, BEAM_COUNT_SUFFIX};

/// Beam table of the measurement bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct BeamTable<'a> {
    session: &'a Session,
}

impl<'a> BeamTable<'a> {
    /// Bind to `session`.
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Sidecar file the export script writes.
    pub fn sidecar_path(&self) -> PathBuf {
        self.session.derived_path(BEAM_COUNT_SUFFIX)
    }

    /// Number of beams (frequencies) in the table.
    ///
    /// # Errors
    ///
    /// - `ExternalCallFailed` if the export script fails
    /// - `NotFound` if the script did not produce the sidecar
    /// - `MalformedExternalOutput` if its first line is not an integer
    pub fn count(&self) -> AppResult<u32> {
        let script = &self.session.settings().scripts.beam_count;
        self.session.invoke(
            "export beam count",
            Command::RunScriptFile,
            &[ConsoleValue::from(script.to_string_lossy().into_owned())],
        )?;

        let sidecar = self.sidecar_path();
        let contents = read_sidecar(&sidecar)?;
        fs::remove_file(&sidecar)?;
        debug!("Removed beam count sidecar '{}'", sidecar.display());

        let count = parse_beam_count(&sidecar, &contents)?;
        info!("Beam table holds {} beam(s)", count);
        Ok(count)
    }

    /// Select a beam by its 1-based table index.
    ///
    /// Out-of-range indices are rejected by the vendor, and that failure is
    /// returned as `ExternalCallFailed`.
    pub fn select_beam(&self, beam: u32) -> AppResult<()> {
        let index = i32::try_from(beam)
            .map_err(|_| NsiError::InvalidArgument(format!("Beam number {beam} too large")))?;
        self.session.invoke(
            &format!("select beam {beam}"),
            Command::SelectBeam,
            &[ConsoleValue::Int(index)],
        )
    }

    /// 1-based index of the selected beam.
    pub fn current_beam(&self) -> AppResult<u32> {
        let index = self
            .session
            .read_i32("read beam number", Property::BeamNumber)?;
        index
            .checked_add(1)
            .filter(|beam| *beam >= 1)
            .and_then(|beam| u32::try_from(beam).ok())
            .ok_or_else(|| NsiError::MalformedExternalOutput {
                path: PathBuf::from(Property::BeamNumber.name()),
                detail: format!("beam index {index} out of range"),
            })
    }
}

fn read_sidecar(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => NsiError::not_found(path),
        _ => NsiError::Io(e),
    })
}

fn parse_beam_count(path: &Path, contents: &str) -> AppResult<u32> {
    let first = contents.lines().next().map(str::trim).unwrap_or_default();
    first
        .parse::<u32>()
        .map_err(|e| NsiError::MalformedExternalOutput {
            path: path.to_path_buf(),
            detail: format!("expected beam count on first line, found {first:?} ({e})"),
        })
}

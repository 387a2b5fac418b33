use tracing::{debug, warn};

use super::{points_to_console, write_points, Resolution};
use crate::console::Property;
use crate::error::AppResult;
use crate::session::Session;

/// Temporarily overrides the far-field resolution.
///
/// The raw `FF_HPTS`/`FF_VPTS` values are captured before anything is
/// written and put back verbatim, whatever the console reported.
/// [`ResolutionGuard::restore`] reports restore failures; if the guard is
/// dropped without it (an early `?` return), `Drop` restores and logs instead.
#[must_use = "dropping the guard immediately restores the previous resolution"]
pub(crate) struct ResolutionGuard<'a> {
    session: &'a Session,
    saved: (i32, i32),
    armed: bool,
}

impl<'a> ResolutionGuard<'a> {
    pub(crate) fn apply(session: &'a Session, temporary: Resolution) -> AppResult<Self> {
        let hpts = points_to_console(temporary.hpts)?;
        let vpts = points_to_console(temporary.vpts)?;
        let op = "save resolution";
        let saved = (
            session.read_i32(op, Property::FfHpts)?,
            session.read_i32(op, Property::FfVpts)?,
        );
        let guard = Self {
            session,
            saved,
            armed: true,
        };
        debug!(
            "Resolution {}x{} -> {}x{} (scoped)",
            saved.0, saved.1, hpts, vpts
        );
        write_points(session, "apply temporary resolution", hpts, vpts)?;
        Ok(guard)
    }

    pub(crate) fn restore(mut self) -> AppResult<()> {
        self.armed = false;
        self.write_saved()
    }

    fn write_saved(&self) -> AppResult<()> {
        write_points(self.session, "restore resolution", self.saved.0, self.saved.1)
    }
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.write_saved() {
            warn!(
                "Failed to restore far-field resolution {}x{}: {}",
                self.saved.0, self.saved.1, e
            );
        }
    }
}

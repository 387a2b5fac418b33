//! Measurement session.
//!
//! A [`Session`] owns the console handle and the path of the one measurement
//! file bound to it. The façades ([`crate::BeamTable`], [`crate::FarField`],
//! [`crate::ScriptRunner`]) borrow a session and forward every call through
//! the helpers defined here, which label console failures with the operation
//! that issued them.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Settings;
use crate::console::{Command, Console, ConsoleValue, Property};
use crate::error::{AppResult, NsiError};

/// Required measurement file extension, compared case-insensitively.
pub const MEASUREMENT_EXTENSION: &str = "nsi";

/// Suffix of the sidecar written by the beam count export script.
pub const BEAM_COUNT_SUFFIX: &str = "_BeamCount.txt";

/// `MEAS_FREQUENCY` is reported in GHz.
const GHZ: f64 = 1e9;

/// Path next to `file` whose name is the file stem followed by `suffix`.
///
/// `C:\Data\pla11.nsi` with `_BeamCount.txt` gives `C:\Data\pla11_BeamCount.txt`.
pub fn derived_path(file: &Path, suffix: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    file.with_file_name(format!("{stem}{suffix}"))
}

fn has_measurement_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MEASUREMENT_EXTENSION))
}

/// A console handle bound to one measurement file.
pub struct Session {
    console: Box<dyn Console>,
    file: PathBuf,
    settings: Settings,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("console", &self.console.describe())
            .field("file", &self.file)
            .finish()
    }
}

impl Session {
    /// Open `path` in the vendor application, or bind the active file when
    /// `path` is `None`. Uses default settings.
    pub fn open(console: impl Console + 'static, path: Option<&Path>) -> AppResult<Self> {
        Self::open_with_settings(console, path, Settings::default())
    }

    /// Like [`Session::open`] with explicit settings.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `path` does not have the `.nsi` extension
    ///   (checked first, whether or not the file exists), or if no path is
    ///   given and the vendor has no active file
    /// - `NotFound` if `path` does not exist
    /// - `ExternalCallFailed` if the console rejects the file
    pub fn open_with_settings(
        console: impl Console + 'static,
        path: Option<&Path>,
        settings: Settings,
    ) -> AppResult<Self> {
        let console: Box<dyn Console> = Box::new(console);

        let file = match path {
            Some(path) => {
                if !has_measurement_extension(path) {
                    return Err(NsiError::InvalidArgument(format!(
                        "Filename must be a valid .NSI file: {}",
                        path.display()
                    )));
                }
                if !path.exists() {
                    return Err(NsiError::not_found(path));
                }
                console
                    .put(
                        Property::DataFilename,
                        ConsoleValue::from(path.to_string_lossy().into_owned()),
                    )
                    .map_err(|e| NsiError::external(format!("open {}", path.display()), e))?;
                path.to_path_buf()
            }
            None => {
                let active = console
                    .get(Property::DataFilename)
                    .and_then(|value| value.expect_text(Property::DataFilename.name()))
                    .map_err(|e| NsiError::external("bind active measurement", e))?;
                if active.trim().is_empty() {
                    return Err(NsiError::InvalidArgument(
                        "No measurement file is active in NSI2000".to_string(),
                    ));
                }
                PathBuf::from(active)
            }
        };

        info!(
            "Session bound to '{}' via {}",
            file.display(),
            console.describe()
        );
        Ok(Self {
            console,
            file,
            settings,
        })
    }

    /// Connect to the NSI2000 server named in `settings` and open a session.
    #[cfg(all(windows, feature = "com"))]
    pub fn connect(path: Option<&Path>, settings: Settings) -> AppResult<Self> {
        let console = crate::console::ComConsole::connect(&settings.server.prog_id)
            .map_err(|e| NsiError::external("connect", e))?;
        Self::open_with_settings(console, path, settings)
    }

    /// Bound measurement file.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Settings this session was opened with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The underlying console.
    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    /// Sibling path of the measurement file with `suffix` replacing its extension.
    pub fn derived_path(&self, suffix: &str) -> PathBuf {
        derived_path(&self.file, suffix)
    }

    /// Beam frequency in Hz.
    pub fn frequency(&self) -> AppResult<f64> {
        let ghz = self.read_f64("read frequency", Property::MeasFrequency)?;
        Ok(ghz * GHZ)
    }

    /// Close every plot window.
    pub fn clear_all_plots(&self) -> AppResult<()> {
        self.invoke("clear all plots", Command::ClearAllPlots, &[])
    }

    /// NSI2000 software version.
    pub fn application_version(&self) -> AppResult<String> {
        self.console
            .application_version()
            .map_err(|e| NsiError::external("read application version", e))
    }

    pub(crate) fn read(&self, operation: &str, property: Property) -> AppResult<ConsoleValue> {
        let value = self
            .console
            .get(property)
            .map_err(|e| NsiError::external(operation, e))?;
        debug!("{}: {} -> {}", operation, property, value);
        Ok(value)
    }

    pub(crate) fn read_f64(&self, operation: &str, property: Property) -> AppResult<f64> {
        self.read(operation, property)?
            .expect_f64(property.name())
            .map_err(|e| NsiError::external(operation, e))
    }

    pub(crate) fn read_i32(&self, operation: &str, property: Property) -> AppResult<i32> {
        self.read(operation, property)?
            .expect_i32(property.name())
            .map_err(|e| NsiError::external(operation, e))
    }

    pub(crate) fn read_bool(&self, operation: &str, property: Property) -> AppResult<bool> {
        self.read(operation, property)?
            .expect_bool(property.name())
            .map_err(|e| NsiError::external(operation, e))
    }

    pub(crate) fn write(
        &self,
        operation: &str,
        property: Property,
        value: impl Into<ConsoleValue>,
    ) -> AppResult<()> {
        let value = value.into();
        debug!("{}: {} = {}", operation, property, value);
        self.console
            .put(property, value)
            .map_err(|e| NsiError::external(operation, e))
    }

    pub(crate) fn invoke(
        &self,
        operation: &str,
        command: Command,
        args: &[ConsoleValue],
    ) -> AppResult<()> {
        debug!("{}: {}({} args)", operation, command, args.len());
        self.console
            .invoke(command, args)
            .map(|_| ())
            .map_err(|e| NsiError::external(operation, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ConsoleCall, MockConsole};
    use std::rc::Rc;

    #[test]
    fn test_derived_path() {
        assert_eq!(
            derived_path(Path::new("data/pla11.nsi"), BEAM_COUNT_SUFFIX),
            PathBuf::from("data/pla11_BeamCount.txt")
        );
        assert_eq!(
            derived_path(Path::new("data/PLA11.NSI"), "_Beam2.txt"),
            PathBuf::from("data/PLA11_Beam2.txt")
        );
    }

    #[test]
    fn test_extension_check() {
        assert!(has_measurement_extension(Path::new("a.nsi")));
        assert!(has_measurement_extension(Path::new("a.NSI")));
        assert!(has_measurement_extension(Path::new("a.Nsi")));
        assert!(!has_measurement_extension(Path::new("a.nsi.bak")));
        assert!(!has_measurement_extension(Path::new("nsi")));
    }

    #[test]
    fn test_bind_active_file() {
        let console =
            Rc::new(MockConsole::new().with_property(Property::DataFilename, "C:/Data/horn.nsi"));
        let session = Session::open(console.clone(), None).unwrap();
        assert_eq!(session.file(), Path::new("C:/Data/horn.nsi"));
        assert_eq!(console.calls(), vec![ConsoleCall::Get(Property::DataFilename)]);
    }

    #[test]
    fn test_bind_without_active_file() {
        let console = MockConsole::new().with_property(Property::DataFilename, "");
        let err = Session::open(console, None).unwrap_err();
        assert!(matches!(err, NsiError::InvalidArgument(_)));
    }

    #[test]
    fn test_frequency_scaled_to_hz() {
        let console = MockConsole::new()
            .with_property(Property::DataFilename, "pla11.nsi")
            .with_property(Property::MeasFrequency, 9.5);
        let session = Session::open(console, None).unwrap();
        assert_eq!(session.frequency().unwrap(), 9.5e9);
    }

    #[test]
    fn test_failures_carry_operation() {
        let console = MockConsole::new().with_property(Property::DataFilename, "pla11.nsi");
        console.fail_command(Command::ClearAllPlots);
        let session = Session::open(console, None).unwrap();

        let err = session.clear_all_plots().unwrap_err();
        assert!(err.is_external());
        assert!(err.to_string().contains("clear all plots"));
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let console = MockConsole::new()
            .with_property(Property::DataFilename, "pla11.nsi")
            .with_property(Property::MeasFrequency, "9.5 GHz");
        let session = Session::open(console, None).unwrap();
        let err = session.frequency().unwrap_err();
        assert!(err.to_string().contains("expected float"));
    }
}

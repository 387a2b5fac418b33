//! Common test utilities for rust_nsi integration tests
//!
//! Builds an on-disk measurement layout (measurement file, beam count export
//! script) in a temporary directory and a shared [`MockConsole`] to drive it.

#![allow(dead_code)] // Utilities may not all be used by every test binary

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use rust_nsi::{MockConsole, Property, Session, Settings};
use tempfile::TempDir;

/// Temporary measurement directory plus the console that serves it.
pub struct Fixture {
    pub dir: TempDir,
    pub measurement: PathBuf,
    pub export_script: PathBuf,
    pub console: Rc<MockConsole>,
}

impl Fixture {
    /// Fixture whose beam table holds `beams` entries.
    pub fn new(beams: u32) -> Self {
        Self::with_console(beams, MockConsole::new())
    }

    /// Fixture around a pre-configured mock; the beam table is added here.
    pub fn with_console(beams: u32, console: MockConsole) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let measurement = dir.path().join("pla11.nsi");
        fs::write(&measurement, b"NSI2000 measurement").unwrap();
        let export_script = dir.path().join("ExportBeamCount.bas");
        fs::write(&export_script, b"' export beam count").unwrap();

        let console = Rc::new(console.with_beam_table(beams, export_script.clone()));
        Self {
            dir,
            measurement,
            export_script,
            console,
        }
    }

    /// Settings pointing the beam count export at this fixture's script.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.scripts.beam_count = self.export_script.clone();
        settings
    }

    /// Open the fixture's measurement file and clear the journal.
    pub fn open(&self) -> Session {
        let session = Session::open_with_settings(
            self.console.clone(),
            Some(self.measurement.as_path()),
            self.settings(),
        )
        .unwrap();
        self.console.clear_calls();
        session
    }

    /// Create an empty file in the fixture directory.
    pub fn touch(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    /// Path in the fixture directory that does not exist.
    pub fn missing(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Mock preloaded with the results NSI2000 publishes after processing.
pub fn processed_console() -> MockConsole {
    MockConsole::new()
        .with_property(Property::MeasFrequency, 9.5)
        .with_property(Property::FfDirectivity, 14.5)
        .with_property(Property::FfCalculatedComparisonGain, 12.0)
        .with_property(Property::FfPeakH, 0.25)
        .with_property(Property::FfPeakV, -0.5)
        .with_property(Property::FfBeamwidthVal1, 18.75)
        .with_property(Property::FfSidelobeLeftLoc, -24.0)
        .with_property(Property::FfSidelobeLeftVal, -13.2)
        .with_property(Property::FfSidelobeRightLoc, 23.5)
        .with_property(Property::FfSidelobeRightVal, -13.6)
        .with_processed_peak(-0.8, -0.6)
}

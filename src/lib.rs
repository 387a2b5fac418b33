//! Core library for the rust_nsi automation façade.
//!
//! This library wraps the NSI2000 antenna measurement console in typed
//! operations: binding a measurement file, walking its beam table, driving
//! far-field processing and reading back the results. All computation happens
//! in the vendor application; the crate only forwards parameters and reads
//! scalar results.
//!
//! ```rust,ignore
//! use rust_nsi::{BeamTable, FarField, OewgProbeType, Resolution, Session};
//!
//! let session = Session::connect(Some(Path::new(r"C:\NSI2000\Data\pla11.nsi")), settings)?;
//! let far_field = FarField::new(&session);
//! far_field.set_resolution(Resolution::square(481))?;
//! far_field.set_oewg_type(OewgProbeType::WR90)?;
//!
//! let beams = BeamTable::new(&session);
//! for beam in 1..=beams.count()? {
//!     beams.select_beam(beam)?;
//!     far_field.process_no_plot()?;
//!     println!("efficiency {:.3} dB", far_field.efficiency()?);
//! }
//! ```

pub mod beam_table;
pub mod config;
pub mod console;
pub mod error;
pub mod far_field;
pub mod report;
pub mod script;
pub mod session;

pub use beam_table::BeamTable;
pub use config::Settings;
pub use console::{Command, Console, ConsoleError, ConsoleValue, MockConsole, Property};
pub use error::{AppResult, NsiError};
pub use far_field::{
    CoordinateSystem, Cut, DisplayPolarization, FarField, OewgProbeType, PolarizationBasis,
    PolarizationSense, ProbeType, Resolution, Sidelobes,
};
pub use script::ScriptRunner;
pub use session::Session;

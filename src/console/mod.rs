//! Console adapter implementations
//!
//! The NSI2000 server exposes its automation surface as a flat set of
//! late-bound properties and methods on the `ScriptCommands` object. This
//! module names that surface as two closed vocabularies ([`Property`] and
//! [`Command`]) and abstracts the transport behind the [`Console`] trait, so
//! the façades in this crate can run against either the real COM binding or
//! the in-memory [`MockConsole`].
//!
//! ```text
//! Console trait
//!     ├── ComConsole  (Windows, `com` feature, IDispatch late binding)
//!     └── MockConsole (in-memory, call journal, failure injection)
//! ```

#[cfg(all(windows, feature = "com"))]
pub mod com;
pub mod mock;
mod value;

#[cfg(all(windows, feature = "com"))]
pub use com::ComConsole;
pub use mock::{ConsoleCall, MockConsole};
pub use value::ConsoleValue;

use thiserror::Error;

/// Error raised by a console transport.
///
/// Carries the vendor member that failed. The façade layer wraps it in
/// [`crate::error::NsiError::ExternalCallFailed`] together with the operation
/// that issued the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    /// The automation server could not be reached or created.
    #[error("NSI2000 server unavailable: {0}")]
    Unavailable(String),

    /// A property read, property write or method call raised an error.
    #[error("{member} failed: {message}")]
    Call {
        /// Vendor member name, e.g. `FF_PEAK`.
        member: String,
        /// Description reported by the server.
        message: String,
    },

    /// The server returned a value of an unexpected type.
    #[error("{member} returned {found}, expected {expected}")]
    Type {
        /// Vendor member name.
        member: String,
        /// Expected value kind.
        expected: &'static str,
        /// Value kind actually returned.
        found: &'static str,
    },
}

impl ConsoleError {
    /// Build a [`ConsoleError::Call`].
    pub fn call(member: impl Into<String>, message: impl Into<String>) -> Self {
        ConsoleError::Call {
            member: member.into(),
            message: message.into(),
        }
    }
}

/// Result type used at the console seam.
pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

/// Capability set of the NSI2000 automation console.
///
/// Implementations forward each call to the vendor exactly once. No retries,
/// no batching: the vendor state is authoritative and several commands are
/// not idempotent.
///
/// Methods take `&self`; the console is a single shared resource aliased by
/// every façade bound to a session, and callers serialise access.
pub trait Console {
    /// Read a property.
    fn get(&self, property: Property) -> ConsoleResult<ConsoleValue>;

    /// Write a property.
    fn put(&self, property: Property, value: ConsoleValue) -> ConsoleResult<()>;

    /// Invoke a method with positional arguments.
    fn invoke(&self, command: Command, args: &[ConsoleValue]) -> ConsoleResult<ConsoleValue>;

    /// Version string of the vendor application (`AppConnection.Version`).
    fn application_version(&self) -> ConsoleResult<String>;

    /// Short human-readable identification for logs.
    fn describe(&self) -> String;
}

impl<C: Console + ?Sized> Console for Box<C> {
    fn get(&self, property: Property) -> ConsoleResult<ConsoleValue> {
        (**self).get(property)
    }

    fn put(&self, property: Property, value: ConsoleValue) -> ConsoleResult<()> {
        (**self).put(property, value)
    }

    fn invoke(&self, command: Command, args: &[ConsoleValue]) -> ConsoleResult<ConsoleValue> {
        (**self).invoke(command, args)
    }

    fn application_version(&self) -> ConsoleResult<String> {
        (**self).application_version()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<C: Console + ?Sized> Console for std::rc::Rc<C> {
    fn get(&self, property: Property) -> ConsoleResult<ConsoleValue> {
        (**self).get(property)
    }

    fn put(&self, property: Property, value: ConsoleValue) -> ConsoleResult<()> {
        (**self).put(property, value)
    }

    fn invoke(&self, command: Command, args: &[ConsoleValue]) -> ConsoleResult<ConsoleValue> {
        (**self).invoke(command, args)
    }

    fn application_version(&self) -> ConsoleResult<String> {
        (**self).application_version()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Properties of `ScriptCommands` used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Property {
    DataFilename,
    MeasFrequency,
    BeamNumber,
    FfHpts,
    FfVpts,
    FfTau,
    FfAutoTauAtPeak,
    FfReferencePolMatchesMeasPol1,
    FfProbeOewgType,
    FfPeak,
    FfPeakH,
    FfPeakV,
    FfBeamwidthDb1,
    FfBeamwidthVal1,
    FfSidelobeLeftLoc,
    FfSidelobeLeftVal,
    FfSidelobeRightLoc,
    FfSidelobeRightVal,
    FfUpdateCalFromCalFile,
    FfCalFilename,
    FfUpdateGainFromGainTableFile,
    FfGainTableFilename,
    FfDirectivity,
    FfCalculatedComparisonGain,
}

impl Property {
    /// Vendor identifier as exposed on the automation object.
    pub fn name(self) -> &'static str {
        match self {
            Property::DataFilename => "DATA_FILENAME",
            Property::MeasFrequency => "MEAS_FREQUENCY",
            Property::BeamNumber => "BEAM_NUMBER",
            Property::FfHpts => "FF_HPTS",
            Property::FfVpts => "FF_VPTS",
            Property::FfTau => "FF_TAU",
            Property::FfAutoTauAtPeak => "FF_AUTO_TAU_AT_PEAK",
            Property::FfReferencePolMatchesMeasPol1 => "FF_REFERENCE_POL_MATCHES_MEASPOL1",
            Property::FfProbeOewgType => "FF_PROBE_OEWG_TYPE",
            Property::FfPeak => "FF_PEAK",
            Property::FfPeakH => "FF_PEAK_H",
            Property::FfPeakV => "FF_PEAK_V",
            Property::FfBeamwidthDb1 => "FF_BEAMWIDTH_DB1",
            Property::FfBeamwidthVal1 => "FF_BEAMWIDTH_VAL1",
            Property::FfSidelobeLeftLoc => "FF_SIDELOBE_LEFT_LOC",
            Property::FfSidelobeLeftVal => "FF_SIDELOBE_LEFT_VAL",
            Property::FfSidelobeRightLoc => "FF_SIDELOBE_RIGHT_LOC",
            Property::FfSidelobeRightVal => "FF_SIDELOBE_RIGHT_VAL",
            Property::FfUpdateCalFromCalFile => "FF_UPDATE_CAL_FROM_CAL_FILE",
            Property::FfCalFilename => "FF_CAL_FILENAME",
            Property::FfUpdateGainFromGainTableFile => "FF_UPDATE_GAIN_FROM_GAIN_TABLE_FILE",
            Property::FfGainTableFilename => "FF_GAIN_TABLE_FILENAME",
            Property::FfDirectivity => "FF_DIRECTIVITY",
            Property::FfCalculatedComparisonGain => "FF_CALCULATED_COMPARISON_GAIN",
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Methods of `ScriptCommands` used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Command {
    ClearAllPlots,
    RunScriptFile,
    SelectBeam,
    FfEprinc,
    FfEcross,
    FfResetCenter,
    FfAutoHCenterOn,
    FfAutoHCenterOff,
    FfAutoVCenterOn,
    FfAutoVCenterOff,
    FfAzOverEl,
    FfElOverAz,
    FfThph,
    FfLinearPol,
    FfRhcp,
    FfLhcp,
    FfL2AzOverEl,
    FfL2ElOverAz,
    FfL2EthEph,
    FfLudwig3,
    FfPcOewg,
    FfNoPlot,
    FfHcut,
    FfVcut,
    FfListingToFile,
}

impl Command {
    /// Vendor identifier as exposed on the automation object.
    pub fn name(self) -> &'static str {
        match self {
            Command::ClearAllPlots => "CLEAR_ALL_PLOTS",
            Command::RunScriptFile => "RunScriptFile",
            Command::SelectBeam => "SELECT_BEAM",
            Command::FfEprinc => "FF_EPRINC",
            Command::FfEcross => "FF_ECROSS",
            Command::FfResetCenter => "FF_RESET_CENTER",
            Command::FfAutoHCenterOn => "FF_AUTO_H_CENTER_ON",
            Command::FfAutoHCenterOff => "FF_AUTO_H_CENTER_OFF",
            Command::FfAutoVCenterOn => "FF_AUTO_V_CENTER_ON",
            Command::FfAutoVCenterOff => "FF_AUTO_V_CENTER_OFF",
            Command::FfAzOverEl => "FF_AZ_OVER_EL",
            Command::FfElOverAz => "FF_EL_OVER_AZ",
            Command::FfThph => "FF_THPH",
            Command::FfLinearPol => "FF_LINEAR_POL",
            Command::FfRhcp => "FF_RHCP",
            Command::FfLhcp => "FF_LHCP",
            Command::FfL2AzOverEl => "FF_L2_AZ_OVER_EL",
            Command::FfL2ElOverAz => "FF_L2_EL_OVER_AZ",
            Command::FfL2EthEph => "FF_L2_ETH_EPH",
            Command::FfLudwig3 => "FF_LUDWIG3",
            Command::FfPcOewg => "FF_PC_OEWG",
            Command::FfNoPlot => "FF_NO_PLOT",
            Command::FfHcut => "FF_HCUT",
            Command::FfVcut => "FF_VCUT",
            Command::FfListingToFile => "FF_LISTING_TO_FILE",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

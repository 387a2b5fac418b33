//! Mock Console Implementation
//!
//! Provides a simulated NSI2000 console for testing without the vendor
//! application. The mock keeps an in-memory property store, records every
//! call in a journal and can be told to fail specific members.
//!
//! # Simulated vendor behaviour
//!
//! - `SELECT_BEAM(n)` accepts `1..=beam_count` and sets `BEAM_NUMBER = n - 1`
//! - `RunScriptFile(<beam count script>)` writes the `_BeamCount.txt` sidecar
//!   next to the bound measurement file, like `ExportBeamCount.bas` does
//! - `FF_NO_PLOT` recomputes `FF_PEAK` from the configured peak table when
//!   one is set, so fast-mode peak reads depend on the resolution in effect
//! - reading a property that was never set fails like an unknown member
//!
//! # Example
//!
//! ```rust,ignore
//! let console = MockConsole::new().with_property(Property::MeasFrequency, 9.5);
//! let session = Session::open(console, None)?;
//! assert_eq!(session.frequency()?, 9.5e9);
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Command, Console, ConsoleError, ConsoleResult, ConsoleValue, Property};
use crate::session::{derived_path, BEAM_COUNT_SUFFIX};

/// One entry of the mock's call journal.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCall {
    /// Property read.
    Get(Property),
    /// Property write.
    Put(Property, ConsoleValue),
    /// Method call.
    Invoke(Command, Vec<ConsoleValue>),
    /// `AppConnection.Version` read.
    Version,
}

#[derive(Debug, Default)]
struct MockState {
    properties: BTreeMap<Property, ConsoleValue>,
    journal: Vec<ConsoleCall>,
    failing_gets: BTreeSet<Property>,
    failing_puts: BTreeSet<Property>,
    failing_commands: BTreeSet<Command>,
    beam_count: u32,
    beam_count_script: Option<PathBuf>,
    sidecar_override: Option<String>,
    processed_peak: Option<(f64, f64)>,
    version: String,
}

/// In-memory NSI2000 console.
///
/// Interior mutability lets the same instance be shared (for example through
/// `Rc`) between the session under test and the assertions.
#[derive(Debug)]
pub struct MockConsole {
    state: RefCell<MockState>,
}

impl Default for MockConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConsole {
    /// Create a mock with plausible factory defaults for the far-field settings.
    pub fn new() -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(Property::BeamNumber, ConsoleValue::Int(0));
        properties.insert(Property::FfHpts, ConsoleValue::Int(181));
        properties.insert(Property::FfVpts, ConsoleValue::Int(181));
        properties.insert(Property::FfTau, ConsoleValue::Float(0.0));
        properties.insert(Property::FfAutoTauAtPeak, ConsoleValue::Bool(false));
        properties.insert(Property::FfReferencePolMatchesMeasPol1, ConsoleValue::Bool(true));
        properties.insert(Property::FfUpdateCalFromCalFile, ConsoleValue::Bool(false));
        properties.insert(Property::FfUpdateGainFromGainTableFile, ConsoleValue::Bool(false));

        Self {
            state: RefCell::new(MockState {
                properties,
                beam_count: 1,
                version: "NSI2000 Mock 5.0".to_string(),
                ..MockState::default()
            }),
        }
    }

    /// Preset a property value.
    pub fn with_property(self, property: Property, value: impl Into<ConsoleValue>) -> Self {
        self.set_property(property, value);
        self
    }

    /// Number of beams the simulated beam table holds, and the script path
    /// that exports the count.
    pub fn with_beam_table(self, beam_count: u32, export_script: impl Into<PathBuf>) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.beam_count = beam_count;
            state.beam_count_script = Some(export_script.into());
        }
        self
    }

    /// Replace the sidecar body written by the export script, for malformed
    /// output tests.
    pub fn with_sidecar_contents(self, contents: impl Into<String>) -> Self {
        self.state.borrow_mut().sidecar_override = Some(contents.into());
        self
    }

    /// Peak values `FF_NO_PLOT` publishes: `coarse` at 2x2 resolution and
    /// `full` otherwise.
    pub fn with_processed_peak(self, coarse: f64, full: f64) -> Self {
        self.state.borrow_mut().processed_peak = Some((coarse, full));
        self
    }

    /// Application version string.
    pub fn with_version(self, version: impl Into<String>) -> Self {
        self.state.borrow_mut().version = version.into();
        self
    }

    /// Set a property directly, bypassing the journal.
    pub fn set_property(&self, property: Property, value: impl Into<ConsoleValue>) {
        self.state
            .borrow_mut()
            .properties
            .insert(property, value.into());
    }

    /// Current value of a property, bypassing the journal.
    pub fn property(&self, property: Property) -> Option<ConsoleValue> {
        self.state.borrow().properties.get(&property).cloned()
    }

    /// Make every read of `property` fail.
    pub fn fail_get(&self, property: Property) {
        self.state.borrow_mut().failing_gets.insert(property);
    }

    /// Make every write of `property` fail.
    pub fn fail_put(&self, property: Property) {
        self.state.borrow_mut().failing_puts.insert(property);
    }

    /// Make every invocation of `command` fail.
    pub fn fail_command(&self, command: Command) {
        self.state.borrow_mut().failing_commands.insert(command);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        let mut state = self.state.borrow_mut();
        state.failing_gets.clear();
        state.failing_puts.clear();
        state.failing_commands.clear();
    }

    /// Snapshot of the call journal.
    pub fn calls(&self) -> Vec<ConsoleCall> {
        self.state.borrow().journal.clone()
    }

    /// Commands invoked so far, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.state
            .borrow()
            .journal
            .iter()
            .filter_map(|call| match call {
                ConsoleCall::Invoke(command, _) => Some(*command),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls; state and failures are kept.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().journal.clear();
    }

    fn simulate(state: &mut MockState, command: Command, args: &[ConsoleValue]) -> ConsoleResult<()> {
        match command {
            Command::SelectBeam => {
                let beam = args
                    .first()
                    .and_then(ConsoleValue::as_i32)
                    .ok_or_else(|| ConsoleError::call(command.name(), "missing beam argument"))?;
                if beam < 1 || beam as u32 > state.beam_count {
                    return Err(ConsoleError::call(
                        command.name(),
                        format!("beam {} outside 1..={}", beam, state.beam_count),
                    ));
                }
                state
                    .properties
                    .insert(Property::BeamNumber, ConsoleValue::Int(beam - 1));
            }
            Command::RunScriptFile => {
                let script = args
                    .first()
                    .and_then(ConsoleValue::as_str)
                    .ok_or_else(|| ConsoleError::call(command.name(), "missing script argument"))?;
                if state.beam_count_script.as_deref() == Some(Path::new(script)) {
                    Self::export_beam_count(state)?;
                }
            }
            Command::FfNoPlot => {
                if let Some((coarse, full)) = state.processed_peak {
                    let fast = state.properties.get(&Property::FfHpts) == Some(&ConsoleValue::Int(2))
                        && state.properties.get(&Property::FfVpts) == Some(&ConsoleValue::Int(2));
                    let peak = if fast { coarse } else { full };
                    state
                        .properties
                        .insert(Property::FfPeak, ConsoleValue::Float(peak));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn export_beam_count(state: &MockState) -> ConsoleResult<()> {
        let data_file = state
            .properties
            .get(&Property::DataFilename)
            .and_then(ConsoleValue::as_str)
            .ok_or_else(|| ConsoleError::call("RunScriptFile", "no measurement file loaded"))?;
        let sidecar = derived_path(Path::new(data_file), BEAM_COUNT_SUFFIX);
        let body = state
            .sidecar_override
            .clone()
            .unwrap_or_else(|| format!("{}\n", state.beam_count));
        std::fs::write(&sidecar, body)
            .map_err(|e| ConsoleError::call("RunScriptFile", format!("{}: {}", sidecar.display(), e)))?;
        debug!("MockConsole: exported beam count to {}", sidecar.display());
        Ok(())
    }
}

impl Console for MockConsole {
    fn get(&self, property: Property) -> ConsoleResult<ConsoleValue> {
        let mut state = self.state.borrow_mut();
        state.journal.push(ConsoleCall::Get(property));
        if state.failing_gets.contains(&property) {
            return Err(ConsoleError::call(property.name(), "injected failure"));
        }
        state
            .properties
            .get(&property)
            .cloned()
            .ok_or_else(|| ConsoleError::call(property.name(), "value not available"))
    }

    fn put(&self, property: Property, value: ConsoleValue) -> ConsoleResult<()> {
        let mut state = self.state.borrow_mut();
        state.journal.push(ConsoleCall::Put(property, value.clone()));
        if state.failing_puts.contains(&property) {
            return Err(ConsoleError::call(property.name(), "injected failure"));
        }
        debug!("MockConsole: {} = {}", property, value);
        state.properties.insert(property, value);
        Ok(())
    }

    fn invoke(&self, command: Command, args: &[ConsoleValue]) -> ConsoleResult<ConsoleValue> {
        let mut state = self.state.borrow_mut();
        state
            .journal
            .push(ConsoleCall::Invoke(command, args.to_vec()));
        if state.failing_commands.contains(&command) {
            return Err(ConsoleError::call(command.name(), "injected failure"));
        }
        Self::simulate(&mut state, command, args)?;
        Ok(ConsoleValue::Empty)
    }

    fn application_version(&self) -> ConsoleResult<String> {
        let mut state = self.state.borrow_mut();
        state.journal.push(ConsoleCall::Version);
        Ok(state.version.clone())
    }

    fn describe(&self) -> String {
        "MockConsole".to_string()
    }
}

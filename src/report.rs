//! Per-beam far-field summary.
//!
//! Runs the operator's standard measurement sequence against a session and
//! gathers the results into a serialisable [`BeamReport`]: frequency, global
//! peak, directivity, comparison gain, efficiency, peak position, and the
//! beamwidth and sidelobes of the H- and V-cuts.
//!
//! The cut passes follow the centering convention used at the range: auto
//! V-centering on for the H-cut, both off for the V-cut, with a center reset
//! before each sidelobe pass.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::beam_table::BeamTable;
use crate::config::ProcessingConfig;
use crate::error::AppResult;
use crate::far_field::{Cut, FarField, Sidelobes};
use crate::session::Session;

/// Options of a report run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOptions {
    /// Beamwidth threshold in dB below peak.
    pub beamwidth_level_db: f64,
    /// Search the global peak on a 2x2 grid before the full processing pass.
    pub fast_peak: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            beamwidth_level_db: crate::far_field::DEFAULT_BEAMWIDTH_LEVEL_DB,
            fast_peak: false,
        }
    }
}

impl From<&ProcessingConfig> for ReportOptions {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            beamwidth_level_db: config.beamwidth_level_db,
            fast_peak: config.fast_peak,
        }
    }
}

/// Results of one cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutReport {
    /// Beamwidth at the configured level.
    pub beamwidth: f64,
    /// Sidelobes nearest the main peak.
    pub sidelobes: Sidelobes,
}

/// Far-field summary of one beam.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeamReport {
    /// 1-based beam number.
    pub beam: u32,
    /// Beam frequency in Hz.
    pub frequency_hz: f64,
    /// Global peak of both polarizations.
    pub peak: f64,
    /// Directivity in dBi.
    pub directivity_dbi: f64,
    /// Comparison gain in dBi.
    pub gain_dbi: f64,
    /// Gain minus directivity in dB.
    pub efficiency_db: f64,
    /// H-axis peak position.
    pub peak_h: f64,
    /// V-axis peak position.
    pub peak_v: f64,
    /// Horizontal cut.
    pub h_cut: CutReport,
    /// Vertical cut.
    pub v_cut: CutReport,
}

impl fmt::Display for BeamReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Beam #{}", self.beam)?;
        writeln!(f, "- Frequency: {:.1} MHz", self.frequency_hz / 1e6)?;
        writeln!(f, "- Peak value: {:.3}", self.peak)?;
        writeln!(f, "- Directivity: {:.3}", self.directivity_dbi)?;
        writeln!(f, "- Gain: {:.3}", self.gain_dbi)?;
        writeln!(f, "- Efficiency: {:.3}", self.efficiency_db)?;
        writeln!(f, "- Peak position (H-cut): {:.3}", self.peak_h)?;
        writeln!(f, "- Peak position (V-cut): {:.3}", self.peak_v)?;
        writeln!(f, "- Beamwidth (H-cut): {:.3}", self.h_cut.beamwidth)?;
        writeln!(f, "- Beamwidth (V-cut): {:.3}", self.v_cut.beamwidth)?;
        writeln!(f, "- Sidelobes (H-cut): {}", self.h_cut.sidelobes)?;
        write!(f, "- Sidelobes (V-cut): {}", self.v_cut.sidelobes)
    }
}

/// Apply the configured processing options. Unset options are left alone.
pub fn prepare(far_field: &FarField<'_>, processing: &ProcessingConfig) -> AppResult<()> {
    if let Some(system) = processing.coordinate_system {
        far_field.set_coordinate_system(system)?;
    }
    if let Some(basis) = processing.polarization_basis {
        far_field.set_polarization_basis(basis)?;
    }
    if let Some(hpts) = processing.hpts {
        far_field.set_hpts(hpts)?;
    }
    if let Some(vpts) = processing.vpts {
        far_field.set_vpts(vpts)?;
    }
    match (processing.probe, processing.oewg_type) {
        (_, Some(size)) => far_field.set_oewg_type(size)?,
        (Some(probe), None) => far_field.set_probe_model(probe)?,
        (None, None) => {}
    }
    Ok(())
}

fn cut_pass(far_field: &FarField<'_>, cut: Cut, reset_center: bool) -> AppResult<()> {
    if reset_center {
        far_field.reset_center()?;
    }
    far_field.set_auto_h_center(false)?;
    far_field.set_auto_v_center(matches!(cut, Cut::Horizontal))?;
    far_field.cut(cut)
}

fn measure_cut(far_field: &FarField<'_>, cut: Cut, level_db: f64) -> AppResult<CutReport> {
    cut_pass(far_field, cut, false)?;
    let beamwidth = far_field.beamwidth(level_db)?;
    cut_pass(far_field, cut, true)?;
    let sidelobes = far_field.sidelobes()?;
    Ok(CutReport {
        beamwidth,
        sidelobes,
    })
}

/// Select `beam` and collect its report.
pub fn collect_beam(session: &Session, beam: u32, options: ReportOptions) -> AppResult<BeamReport> {
    let beam_table = BeamTable::new(session);
    let far_field = FarField::new(session);

    beam_table.select_beam(beam)?;
    let frequency_hz = session.frequency()?;

    // The fast search leaves coarse data behind, so it runs before the full pass.
    let peak = if options.fast_peak {
        let peak = far_field.peak(true)?;
        far_field.process_no_plot()?;
        peak
    } else {
        far_field.process_no_plot()?;
        far_field.peak(false)?
    };

    let directivity_dbi = far_field.directivity()?;
    let gain_dbi = far_field.comparison_gain()?;
    let efficiency_db = far_field.efficiency()?;
    let peak_h = far_field.peak_h()?;
    let peak_v = far_field.peak_v()?;

    let h_cut = measure_cut(&far_field, Cut::Horizontal, options.beamwidth_level_db)?;
    let v_cut = measure_cut(&far_field, Cut::Vertical, options.beamwidth_level_db)?;

    info!(
        "Beam #{} at {:.1} MHz: peak {:.3}, directivity {:.3} dBi",
        beam,
        frequency_hz / 1e6,
        peak,
        directivity_dbi
    );
    Ok(BeamReport {
        beam,
        frequency_hz,
        peak,
        directivity_dbi,
        gain_dbi,
        efficiency_db,
        peak_h,
        peak_v,
        h_cut,
        v_cut,
    })
}

/// Collect a report for every beam in the table, in order.
pub fn collect_all(session: &Session, options: ReportOptions) -> AppResult<Vec<BeamReport>> {
    let count = BeamTable::new(session).count()?;
    (1..=count)
        .map(|beam| collect_beam(session, beam, options))
        .collect()
}

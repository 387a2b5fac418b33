//! Far-field processing façade.
//!
//! [`FarField`] exposes the processing options and derived results of the
//! NSI2000 far-field module for the measurement bound to a [`Session`]. It
//! holds no state of its own: the selected coordinate system, polarization,
//! probe model and the "last computed cut" all live in the vendor process.
//!
//! # Cut-dependent queries
//!
//! [`FarField::peak_h`], [`FarField::peak_v`], [`FarField::beamwidth`] and
//! [`FarField::sidelobes`] report on whichever cut the vendor computed last.
//! Issue [`FarField::h_cut`] or [`FarField::v_cut`] first:
//!
//! ```rust,ignore
//! let far_field = FarField::new(&session);
//! far_field.set_auto_h_center(false)?;
//! far_field.set_auto_v_center(true)?;
//! far_field.h_cut()?;
//! let h_beamwidth = far_field.beamwidth_3db()?;
//! let h_lobes = far_field.sidelobes()?;
//! ```

mod guard;
mod types;

pub use types::{
    CoordinateSystem, Cut, DisplayPolarization, OewgProbeType, PolarizationBasis,
    PolarizationSense, ProbeType, Resolution, Sidelobes,
};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::beam_table::BeamTable;
use crate::console::{Command, ConsoleValue, Property};
use crate::error::{AppResult, NsiError};
use crate::session::Session;
use guard::ResolutionGuard;

/// Default beamwidth threshold, dB below peak.
pub const DEFAULT_BEAMWIDTH_LEVEL_DB: f64 = -3.0;

fn points_to_console(points: u32) -> AppResult<i32> {
    if points == 0 {
        return Err(NsiError::InvalidArgument(
            "Far-field point count must be at least 1".to_string(),
        ));
    }
    i32::try_from(points)
        .map_err(|_| NsiError::InvalidArgument(format!("Far-field point count {points} too large")))
}

fn points_from_console(property: Property, raw: i32) -> AppResult<u32> {
    u32::try_from(raw).map_err(|_| NsiError::MalformedExternalOutput {
        path: PathBuf::from(property.name()),
        detail: format!("negative point count {raw}"),
    })
}

/// Write both raw point counts. The second write is attempted even if the
/// first fails, so a restore leaves as much as possible in place.
fn write_points(session: &Session, operation: &str, hpts: i32, vpts: i32) -> AppResult<()> {
    let h = session.write(operation, Property::FfHpts, hpts);
    let v = session.write(operation, Property::FfVpts, vpts);
    h.and(v)
}

/// Far-field controller bound to one session.
#[derive(Debug, Clone, Copy)]
pub struct FarField<'a> {
    session: &'a Session,
}

impl<'a> FarField<'a> {
    /// Bind to `session`.
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// The session this controller forwards to.
    pub fn session(&self) -> &'a Session {
        self.session
    }

    /// Select the co-pol or cross-pol display flag.
    pub fn set_display_polarization(&self, polarization: DisplayPolarization) -> AppResult<()> {
        self.session
            .invoke("select display polarization", polarization.command(), &[])
    }

    /// Number of H-cut points.
    pub fn hpts(&self) -> AppResult<u32> {
        let raw = self.session.read_i32("read hpts", Property::FfHpts)?;
        points_from_console(Property::FfHpts, raw)
    }

    /// Number of V-cut points.
    pub fn vpts(&self) -> AppResult<u32> {
        let raw = self.session.read_i32("read vpts", Property::FfVpts)?;
        points_from_console(Property::FfVpts, raw)
    }

    /// Set the number of H-cut points (at least 1).
    pub fn set_hpts(&self, points: u32) -> AppResult<()> {
        let raw = points_to_console(points)?;
        self.session.write("set hpts", Property::FfHpts, raw)
    }

    /// Set the number of V-cut points (at least 1).
    pub fn set_vpts(&self, points: u32) -> AppResult<()> {
        let raw = points_to_console(points)?;
        self.session.write("set vpts", Property::FfVpts, raw)
    }

    /// Both point counts.
    pub fn resolution(&self) -> AppResult<Resolution> {
        Ok(Resolution {
            hpts: self.hpts()?,
            vpts: self.vpts()?,
        })
    }

    /// Set both point counts. Nothing is written unless both are valid.
    pub fn set_resolution(&self, resolution: Resolution) -> AppResult<()> {
        let hpts = points_to_console(resolution.hpts)?;
        let vpts = points_to_console(resolution.vpts)?;
        self.session.write("set hpts", Property::FfHpts, hpts)?;
        self.session.write("set vpts", Property::FfVpts, vpts)
    }

    /// Force the H- and V-centers to 0.0.
    pub fn reset_center(&self) -> AppResult<()> {
        self.session
            .invoke("reset center", Command::FfResetCenter, &[])
    }

    /// Enable or disable moving the H-peak position into the H-center.
    pub fn set_auto_h_center(&self, enabled: bool) -> AppResult<()> {
        let command = if enabled {
            Command::FfAutoHCenterOn
        } else {
            Command::FfAutoHCenterOff
        };
        self.session.invoke("set auto H center", command, &[])
    }

    /// Enable or disable moving the V-peak position into the V-center.
    pub fn set_auto_v_center(&self, enabled: bool) -> AppResult<()> {
        let command = if enabled {
            Command::FfAutoVCenterOn
        } else {
            Command::FfAutoVCenterOff
        };
        self.session.invoke("set auto V center", command, &[])
    }

    /// Select the coordinate system.
    pub fn set_coordinate_system(&self, system: CoordinateSystem) -> AppResult<()> {
        self.session
            .invoke("select coordinate system", system.command(), &[])
    }

    /// Select the polarization basis.
    pub fn set_polarization_basis(&self, basis: PolarizationBasis) -> AppResult<()> {
        self.session
            .invoke("select polarization basis", basis.command(), &[])
    }

    /// Far-field Tau angle.
    pub fn tau(&self) -> AppResult<f64> {
        self.session.read_f64("read tau", Property::FfTau)
    }

    /// Set the far-field Tau angle.
    pub fn set_tau(&self, tau: f64) -> AppResult<()> {
        self.session.write("set tau", Property::FfTau, tau)
    }

    /// Whether Tau is computed at the peak.
    pub fn auto_tau_at_peak(&self) -> AppResult<bool> {
        self.session
            .read_bool("read auto tau at peak", Property::FfAutoTauAtPeak)
    }

    /// Let the vendor compute Tau at the peak.
    pub fn set_auto_tau_at_peak(&self, enabled: bool) -> AppResult<()> {
        self.session
            .write("set auto tau at peak", Property::FfAutoTauAtPeak, enabled)
    }

    /// Whether the reference polarization follows measurement Pol-1.
    pub fn reference_pol_matches_meas_pol1(&self) -> AppResult<bool> {
        self.session.read_bool(
            "read reference pol flag",
            Property::FfReferencePolMatchesMeasPol1,
        )
    }

    /// Force the reference polarization to follow measurement Pol-1.
    pub fn set_reference_pol_matches_meas_pol1(&self, enabled: bool) -> AppResult<()> {
        self.session.write(
            "set reference pol flag",
            Property::FfReferencePolMatchesMeasPol1,
            enabled,
        )
    }

    /// Select the reference sense.
    ///
    /// The vendor reads `FF_REFERENCE_POL_MATCHES_MEASPOL1` when the sense
    /// command runs, so the flag is written first: `true` for linear, `false`
    /// for either circular sense.
    pub fn set_polarization_sense(&self, sense: PolarizationSense) -> AppResult<()> {
        self.set_reference_pol_matches_meas_pol1(sense.matches_meas_pol1())?;
        self.session
            .invoke("select polarization sense", sense.command(), &[])
    }

    /// Select the open-ended waveguide probe correction model.
    pub fn enable_oewg(&self) -> AppResult<()> {
        self.session
            .invoke("enable OEWG probe correction", Command::FfPcOewg, &[])
    }

    /// Currently configured waveguide size.
    pub fn oewg_type(&self) -> AppResult<OewgProbeType> {
        let code = self
            .session
            .read_i32("read OEWG probe type", Property::FfProbeOewgType)?;
        OewgProbeType::try_from(code)
    }

    /// Select OEWG correction, then the waveguide size.
    pub fn set_oewg_type(&self, size: OewgProbeType) -> AppResult<()> {
        self.enable_oewg()?;
        self.session
            .write("set OEWG probe type", Property::FfProbeOewgType, size.code())
    }

    /// Select a probe correction model.
    ///
    /// Only the OEWG model can be selected through the automation console.
    pub fn set_probe_model(&self, probe: ProbeType) -> AppResult<()> {
        match probe {
            ProbeType::Oewg => self.enable_oewg(),
            other => Err(NsiError::InvalidArgument(format!(
                "Probe model '{other}' cannot be selected through the console"
            ))),
        }
    }

    /// Compute far-field data without making a plot.
    pub fn process_no_plot(&self) -> AppResult<()> {
        self.session
            .invoke("process far field", Command::FfNoPlot, &[])
    }

    /// Global peak: the maximum of both polarizations regardless of
    /// normalization.
    ///
    /// With `fast`, the far field is recomputed on a 2x2 grid before reading
    /// and the previous resolution is restored afterwards, on error paths too.
    pub fn peak(&self, fast: bool) -> AppResult<f64> {
        if !fast {
            return self.session.read_f64("read global peak", Property::FfPeak);
        }

        let guard = ResolutionGuard::apply(self.session, Resolution::FAST_PEAK)?;
        self.process_no_plot()?;
        let peak = self.session.read_f64("read global peak", Property::FfPeak)?;
        guard.restore()?;

        debug!("Fast global peak {} (resolution restored)", peak);
        Ok(peak)
    }

    /// Make a far-field cut.
    pub fn cut(&self, cut: Cut) -> AppResult<()> {
        self.session.invoke("compute cut", cut.command(), &[])
    }

    /// Make a far-field H-cut.
    pub fn h_cut(&self) -> AppResult<()> {
        self.cut(Cut::Horizontal)
    }

    /// Make a far-field V-cut.
    pub fn v_cut(&self) -> AppResult<()> {
        self.cut(Cut::Vertical)
    }

    /// H-axis peak position of the last cut.
    pub fn peak_h(&self) -> AppResult<f64> {
        self.session.read_f64("read H peak position", Property::FfPeakH)
    }

    /// V-axis peak position of the last cut.
    pub fn peak_v(&self) -> AppResult<f64> {
        self.session.read_f64("read V peak position", Property::FfPeakV)
    }

    /// Beamwidth of the last cut at `level_db` below peak.
    pub fn beamwidth(&self, level_db: f64) -> AppResult<f64> {
        self.session
            .write("set beamwidth level", Property::FfBeamwidthDb1, level_db)?;
        self.session
            .read_f64("read beamwidth", Property::FfBeamwidthVal1)
    }

    /// Half-power (-3 dB) beamwidth of the last cut.
    pub fn beamwidth_3db(&self) -> AppResult<f64> {
        self.beamwidth(DEFAULT_BEAMWIDTH_LEVEL_DB)
    }

    /// Sidelobes of the last cut.
    pub fn sidelobes(&self) -> AppResult<Sidelobes> {
        let op = "read sidelobes";
        Ok(Sidelobes {
            left_position: self.session.read_f64(op, Property::FfSidelobeLeftLoc)?,
            left_value: self.session.read_f64(op, Property::FfSidelobeLeftVal)?,
            right_position: self.session.read_f64(op, Property::FfSidelobeRightLoc)?,
            right_value: self.session.read_f64(op, Property::FfSidelobeRightVal)?,
        })
    }

    /// Update the SGA peak from the calibration file on the next process.
    pub fn set_update_cal_from_cal_file(&self, enabled: bool) -> AppResult<()> {
        self.session.write(
            "set update cal from cal file",
            Property::FfUpdateCalFromCalFile,
            enabled,
        )
    }

    /// Use `path` (an `.ncl` gain reference file) and enable updating from it.
    pub fn set_cal_filename(&self, path: &Path) -> AppResult<()> {
        if !path.exists() {
            return Err(NsiError::not_found(path));
        }
        self.session.write(
            "set cal filename",
            Property::FfCalFilename,
            path.to_string_lossy().into_owned(),
        )?;
        self.set_update_cal_from_cal_file(true)?;
        info!("Calibration file set to '{}'", path.display());
        Ok(())
    }

    /// Update gain from the gain table file on the next process.
    pub fn set_update_gain_from_gain_table_file(&self, enabled: bool) -> AppResult<()> {
        self.session.write(
            "set update gain from gain table",
            Property::FfUpdateGainFromGainTableFile,
            enabled,
        )
    }

    /// Use `path` (an `.ngt` gain table) and enable updating from it.
    pub fn set_gain_table_filename(&self, path: &Path) -> AppResult<()> {
        if !path.exists() {
            return Err(NsiError::not_found(path));
        }
        self.session.write(
            "set gain table filename",
            Property::FfGainTableFilename,
            path.to_string_lossy().into_owned(),
        )?;
        self.set_update_gain_from_gain_table_file(true)?;
        info!("Gain table set to '{}'", path.display());
        Ok(())
    }

    /// Directivity in dBi.
    pub fn directivity(&self) -> AppResult<f64> {
        self.session
            .read_f64("read directivity", Property::FfDirectivity)
    }

    /// Gain in dBi, calculated by comparison against the gain reference.
    pub fn comparison_gain(&self) -> AppResult<f64> {
        self.session
            .read_f64("read comparison gain", Property::FfCalculatedComparisonGain)
    }

    /// Total efficiency in dB: comparison gain minus directivity.
    pub fn efficiency(&self) -> AppResult<f64> {
        let gain = self.comparison_gain()?;
        let directivity = self.directivity()?;
        Ok(gain - directivity)
    }

    /// Listing file for the currently selected beam, `<stem>_Beam<n>.txt`.
    pub fn listing_path(&self) -> AppResult<PathBuf> {
        let beam = BeamTable::new(self.session).current_beam()?;
        Ok(self.session.derived_path(&format!("_Beam{beam}.txt")))
    }

    /// Write far-field data for both polarizations to [`FarField::listing_path`].
    pub fn listing_to_file(&self) -> AppResult<()> {
        let path = self.listing_path()?;
        self.session.invoke(
            "write far-field listing",
            Command::FfListingToFile,
            &[
                ConsoleValue::from(path.to_string_lossy().into_owned()),
                ConsoleValue::Bool(true),
            ],
        )?;
        info!("Far-field listing written to '{}'", path.display());
        Ok(())
    }
}

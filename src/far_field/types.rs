//! Value types of the far-field vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::console::Command;
use crate::error::NsiError;

/// Probe correction model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ProbeType {
    None = 0,
    Cosine = 1,
    Oewg = 2,
    PatternFile = 3,
}

impl ProbeType {
    /// All models, in vendor code order.
    pub const ALL: [ProbeType; 4] = [
        ProbeType::None,
        ProbeType::Cosine,
        ProbeType::Oewg,
        ProbeType::PatternFile,
    ];

    /// Vendor code.
    pub fn code(self) -> i32 {
        self as i32
    }

    fn name(self) -> &'static str {
        match self {
            ProbeType::None => "none",
            ProbeType::Cosine => "cosine",
            ProbeType::Oewg => "oewg",
            ProbeType::PatternFile => "pattern_file",
        }
    }
}

impl TryFrom<i32> for ProbeType {
    type Error = NsiError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        ProbeType::ALL
            .into_iter()
            .find(|probe| probe.code() == code)
            .ok_or_else(|| NsiError::InvalidArgument(format!("Unknown probe type code {code}")))
    }
}

impl fmt::Display for ProbeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProbeType {
    type Err = NsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProbeType::ALL
            .into_iter()
            .find(|probe| probe.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NsiError::InvalidArgument(format!("Unknown probe type '{s}'")))
    }
}

/// Standard open-ended waveguide sizes known to the OEWG probe model.
///
/// Discriminants are the vendor's `FF_PROBE_OEWG_TYPE` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum OewgProbeType {
    WR1500 = 0,
    WR975 = 1,
    WR770 = 2,
    WR650 = 3,
    WR510 = 4,
    WR430 = 5,
    WR340 = 6,
    WR284 = 7,
    WR229 = 8,
    WR187 = 9,
    WR159 = 10,
    WR137 = 11,
    WR112 = 12,
    WR90 = 13,
    WR75 = 14,
    WR62 = 15,
    WR51 = 16,
    WR42 = 17,
    WR34 = 18,
    WR28 = 19,
    WR22 = 20,
    WR19 = 21,
    WR15 = 22,
    WR12 = 23,
}

impl OewgProbeType {
    /// All sizes, largest waveguide first (vendor code order).
    pub const ALL: [OewgProbeType; 24] = [
        OewgProbeType::WR1500,
        OewgProbeType::WR975,
        OewgProbeType::WR770,
        OewgProbeType::WR650,
        OewgProbeType::WR510,
        OewgProbeType::WR430,
        OewgProbeType::WR340,
        OewgProbeType::WR284,
        OewgProbeType::WR229,
        OewgProbeType::WR187,
        OewgProbeType::WR159,
        OewgProbeType::WR137,
        OewgProbeType::WR112,
        OewgProbeType::WR90,
        OewgProbeType::WR75,
        OewgProbeType::WR62,
        OewgProbeType::WR51,
        OewgProbeType::WR42,
        OewgProbeType::WR34,
        OewgProbeType::WR28,
        OewgProbeType::WR22,
        OewgProbeType::WR19,
        OewgProbeType::WR15,
        OewgProbeType::WR12,
    ];

    /// Vendor code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// EIA designation, e.g. `"WR90"`.
    pub fn name(self) -> &'static str {
        match self {
            OewgProbeType::WR1500 => "WR1500",
            OewgProbeType::WR975 => "WR975",
            OewgProbeType::WR770 => "WR770",
            OewgProbeType::WR650 => "WR650",
            OewgProbeType::WR510 => "WR510",
            OewgProbeType::WR430 => "WR430",
            OewgProbeType::WR340 => "WR340",
            OewgProbeType::WR284 => "WR284",
            OewgProbeType::WR229 => "WR229",
            OewgProbeType::WR187 => "WR187",
            OewgProbeType::WR159 => "WR159",
            OewgProbeType::WR137 => "WR137",
            OewgProbeType::WR112 => "WR112",
            OewgProbeType::WR90 => "WR90",
            OewgProbeType::WR75 => "WR75",
            OewgProbeType::WR62 => "WR62",
            OewgProbeType::WR51 => "WR51",
            OewgProbeType::WR42 => "WR42",
            OewgProbeType::WR34 => "WR34",
            OewgProbeType::WR28 => "WR28",
            OewgProbeType::WR22 => "WR22",
            OewgProbeType::WR19 => "WR19",
            OewgProbeType::WR15 => "WR15",
            OewgProbeType::WR12 => "WR12",
        }
    }
}

impl TryFrom<i32> for OewgProbeType {
    type Error = NsiError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|index| OewgProbeType::ALL.get(index).copied())
            .ok_or_else(|| {
                NsiError::InvalidArgument(format!("Unknown OEWG probe type code {code}"))
            })
    }
}

impl fmt::Display for OewgProbeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OewgProbeType {
    type Err = NsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OewgProbeType::ALL
            .into_iter()
            .find(|size| size.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NsiError::InvalidArgument(format!("Unknown OEWG probe type '{s}'")))
    }
}

/// Displayed polarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayPolarization {
    /// Co-pol (Pol-1)
    Copolar,
    /// Cross-pol (Pol-2)
    Crosspolar,
}

impl DisplayPolarization {
    pub(crate) fn command(self) -> Command {
        match self {
            DisplayPolarization::Copolar => Command::FfEprinc,
            DisplayPolarization::Crosspolar => Command::FfEcross,
        }
    }
}

/// Far-field coordinate system. Selecting one deselects the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum CoordinateSystem {
    AzOverEl,
    ElOverAz,
    ThetaPhi,
}

impl CoordinateSystem {
    pub(crate) fn command(self) -> Command {
        match self {
            CoordinateSystem::AzOverEl => Command::FfAzOverEl,
            CoordinateSystem::ElOverAz => Command::FfElOverAz,
            CoordinateSystem::ThetaPhi => Command::FfThph,
        }
    }
}

/// Far-field polarization basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarizationBasis {
    /// Ludwig-2 Eaz/Eel
    L2AzOverEl,
    /// Ludwig-2 Eal/Eep
    L2ElOverAz,
    /// Ludwig-2 Eth/Eph
    L2EthEph,
    /// Ludwig-3
    Ludwig3,
}

impl PolarizationBasis {
    pub(crate) fn command(self) -> Command {
        match self {
            PolarizationBasis::L2AzOverEl => Command::FfL2AzOverEl,
            PolarizationBasis::L2ElOverAz => Command::FfL2ElOverAz,
            PolarizationBasis::L2EthEph => Command::FfL2EthEph,
            PolarizationBasis::Ludwig3 => Command::FfLudwig3,
        }
    }
}

/// Far-field reference sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum PolarizationSense {
    Linear,
    Rhcp,
    Lhcp,
}

impl PolarizationSense {
    /// Value `FF_REFERENCE_POL_MATCHES_MEASPOL1` must hold when the sense
    /// command executes.
    pub(crate) fn matches_meas_pol1(self) -> bool {
        matches!(self, PolarizationSense::Linear)
    }

    pub(crate) fn command(self) -> Command {
        match self {
            PolarizationSense::Linear => Command::FfLinearPol,
            PolarizationSense::Rhcp => Command::FfRhcp,
            PolarizationSense::Lhcp => Command::FfLhcp,
        }
    }
}

/// Pattern cut direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Cut {
    Horizontal,
    Vertical,
}

impl Cut {
    pub(crate) fn command(self) -> Command {
        match self {
            Cut::Horizontal => Command::FfHcut,
            Cut::Vertical => Command::FfVcut,
        }
    }
}

/// Far-field output resolution in cut points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Horizontal cut points
    pub hpts: u32,
    /// Vertical cut points
    pub vpts: u32,
}

impl Resolution {
    /// Coarsest grid the vendor accepts, used for fast global peak search.
    pub const FAST_PEAK: Resolution = Resolution { hpts: 2, vpts: 2 };

    /// Square grid of `points` x `points`.
    pub fn square(points: u32) -> Self {
        Self {
            hpts: points,
            vpts: points,
        }
    }
}

/// The two sidelobes nearest the main peak of the last computed cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sidelobes {
    /// Left sidelobe position
    pub left_position: f64,
    /// Left sidelobe level
    pub left_value: f64,
    /// Right sidelobe position
    pub right_position: f64,
    /// Right sidelobe level
    pub right_value: f64,
}

impl From<Sidelobes> for (f64, f64, f64, f64) {
    fn from(s: Sidelobes) -> Self {
        (s.left_position, s.left_value, s.right_position, s.right_value)
    }
}

impl fmt::Display for Sidelobes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3}, {:.3}, {:.3}, {:.3}",
            self.left_position, self.left_value, self.right_position, self.right_value
        )
    }
}

//! Far-field controller tests against the mock console.

mod common;

use common::{processed_console, Fixture};
use rust_nsi::console::ConsoleCall;
use rust_nsi::{
    Command, ConsoleValue, CoordinateSystem, Cut, DisplayPolarization, FarField, MockConsole,
    NsiError, OewgProbeType, PolarizationBasis, Property, Resolution, Sidelobes,
};

#[test]
fn test_resolution_round_trip_through_console() {
    let fixture = Fixture::new(1);
    let session = fixture.open();
    let far_field = FarField::new(&session);

    assert_eq!(far_field.resolution().unwrap(), Resolution::square(181));
    far_field.set_resolution(Resolution { hpts: 481, vpts: 361 }).unwrap();
    assert_eq!(far_field.hpts().unwrap(), 481);
    assert_eq!(far_field.vpts().unwrap(), 361);
}

#[test]
fn test_fast_peak_restores_resolution() {
    let fixture = Fixture::with_console(1, processed_console());
    let session = fixture.open();
    let far_field = FarField::new(&session);
    far_field.set_resolution(Resolution::square(481)).unwrap();
    fixture.console.clear_calls();

    assert_eq!(far_field.peak(true).unwrap(), -0.8);
    assert_eq!(far_field.resolution().unwrap(), Resolution::square(481));

    let calls = fixture.console.calls();
    let no_plot = calls
        .iter()
        .position(|call| *call == ConsoleCall::Invoke(Command::FfNoPlot, vec![]))
        .unwrap();
    assert!(calls[..no_plot].contains(&ConsoleCall::Put(Property::FfHpts, ConsoleValue::Int(2))));
    assert!(calls[..no_plot].contains(&ConsoleCall::Put(Property::FfVpts, ConsoleValue::Int(2))));
    assert!(calls[no_plot..].contains(&ConsoleCall::Put(Property::FfHpts, ConsoleValue::Int(481))));
    assert!(calls[no_plot..].contains(&ConsoleCall::Put(Property::FfVpts, ConsoleValue::Int(481))));
}

#[test]
fn test_fast_peak_restores_resolution_when_read_fails() {
    let fixture = Fixture::with_console(1, processed_console());
    let session = fixture.open();
    let far_field = FarField::new(&session);
    far_field.set_resolution(Resolution { hpts: 361, vpts: 241 }).unwrap();
    fixture.console.fail_get(Property::FfPeak);

    let err = far_field.peak(true).unwrap_err();
    assert!(err.is_external());
    assert_eq!(
        fixture.console.property(Property::FfHpts),
        Some(ConsoleValue::Int(361))
    );
    assert_eq!(
        fixture.console.property(Property::FfVpts),
        Some(ConsoleValue::Int(241))
    );
}

#[test]
fn test_fast_peak_restores_resolution_when_processing_fails() {
    let fixture = Fixture::with_console(1, processed_console());
    let session = fixture.open();
    let far_field = FarField::new(&session);
    fixture.console.fail_command(Command::FfNoPlot);

    assert!(far_field.peak(true).is_err());
    assert_eq!(far_field.resolution().unwrap(), Resolution::square(181));
}

#[test]
fn test_normal_peak_reads_only() {
    let fixture = Fixture::with_console(1, processed_console());
    let session = fixture.open();
    let far_field = FarField::new(&session);
    far_field.process_no_plot().unwrap();
    fixture.console.clear_calls();

    assert_eq!(far_field.peak(false).unwrap(), -0.6);
    assert_eq!(fixture.console.calls(), vec![ConsoleCall::Get(Property::FfPeak)]);
}

#[test]
fn test_efficiency_is_gain_minus_directivity() {
    let fixture = Fixture::with_console(1, processed_console());
    let session = fixture.open();
    let far_field = FarField::new(&session);

    let efficiency = far_field.efficiency().unwrap();
    assert_eq!(efficiency, -2.5);
    assert_eq!(
        efficiency,
        far_field.comparison_gain().unwrap() - far_field.directivity().unwrap()
    );
}

#[test]
fn test_set_oewg_type_matches_enable_then_write() {
    let fixture = Fixture::new(1);
    let session = fixture.open();
    FarField::new(&session)
        .set_oewg_type(OewgProbeType::WR90)
        .unwrap();
    let via_setter = fixture.console.calls();

    let manual = Fixture::new(1);
    let session = manual.open();
    FarField::new(&session).enable_oewg().unwrap();
    manual
        .console
        .set_property(Property::FfProbeOewgType, OewgProbeType::WR90.code());

    assert_eq!(
        via_setter,
        vec![
            ConsoleCall::Invoke(Command::FfPcOewg, vec![]),
            ConsoleCall::Put(Property::FfProbeOewgType, ConsoleValue::Int(13)),
        ]
    );
    assert_eq!(
        fixture.console.property(Property::FfProbeOewgType),
        manual.console.property(Property::FfProbeOewgType)
    );
    assert_eq!(FarField::new(&session).oewg_type().unwrap(), OewgProbeType::WR90);
}

#[test]
fn test_oewg_type_getter_does_not_reselect_model() {
    let fixture = Fixture::with_console(
        1,
        MockConsole::new().with_property(Property::FfProbeOewgType, 6),
    );
    let session = fixture.open();

    assert_eq!(
        FarField::new(&session).oewg_type().unwrap(),
        OewgProbeType::WR340
    );
    assert!(fixture.console.commands().is_empty());
}

#[test]
fn test_missing_cal_file_leaves_flag() {
    let fixture = Fixture::new(1);
    let session = fixture.open();
    let far_field = FarField::new(&session);

    let err = far_field
        .set_cal_filename(&fixture.missing("gain.ncl"))
        .unwrap_err();
    assert!(matches!(err, NsiError::NotFound { .. }));
    let err = far_field
        .set_gain_table_filename(&fixture.missing("table.ngt"))
        .unwrap_err();
    assert!(matches!(err, NsiError::NotFound { .. }));

    assert!(fixture.console.calls().is_empty());
    assert_eq!(
        fixture.console.property(Property::FfUpdateCalFromCalFile),
        Some(ConsoleValue::Bool(false))
    );
    assert_eq!(
        fixture.console.property(Property::FfUpdateGainFromGainTableFile),
        Some(ConsoleValue::Bool(false))
    );
}

#[test]
fn test_cal_file_sets_name_then_flag() {
    let fixture = Fixture::new(1);
    let session = fixture.open();
    let cal = fixture.touch("gain.ncl");
    let table = fixture.touch("table.ngt");
    let far_field = FarField::new(&session);

    far_field.set_cal_filename(&cal).unwrap();
    far_field.set_gain_table_filename(&table).unwrap();
    assert_eq!(
        fixture.console.calls(),
        vec![
            ConsoleCall::Put(
                Property::FfCalFilename,
                ConsoleValue::Text(cal.to_string_lossy().into_owned())
            ),
            ConsoleCall::Put(Property::FfUpdateCalFromCalFile, ConsoleValue::Bool(true)),
            ConsoleCall::Put(
                Property::FfGainTableFilename,
                ConsoleValue::Text(table.to_string_lossy().into_owned())
            ),
            ConsoleCall::Put(
                Property::FfUpdateGainFromGainTableFile,
                ConsoleValue::Bool(true)
            ),
        ]
    );
}

#[test]
fn test_view_commands() {
    let fixture = Fixture::new(1);
    let session = fixture.open();
    let far_field = FarField::new(&session);

    far_field
        .set_display_polarization(DisplayPolarization::Crosspolar)
        .unwrap();
    far_field.set_coordinate_system(CoordinateSystem::ThetaPhi).unwrap();
    far_field.set_polarization_basis(PolarizationBasis::Ludwig3).unwrap();
    far_field.reset_center().unwrap();
    far_field.set_auto_h_center(false).unwrap();
    far_field.set_auto_v_center(true).unwrap();
    far_field.h_cut().unwrap();
    far_field.cut(Cut::Vertical).unwrap();

    assert_eq!(
        fixture.console.commands(),
        vec![
            Command::FfEcross,
            Command::FfThph,
            Command::FfLudwig3,
            Command::FfResetCenter,
            Command::FfAutoHCenterOff,
            Command::FfAutoVCenterOn,
            Command::FfHcut,
            Command::FfVcut,
        ]
    );
}

#[test]
fn test_copolar_display_selects_eprinc() {
    let fixture = Fixture::new(1);
    let session = fixture.open();

    FarField::new(&session)
        .set_display_polarization(DisplayPolarization::Copolar)
        .unwrap();
    assert_eq!(fixture.console.commands(), vec![Command::FfEprinc]);
}

#[test]
fn test_tau_and_flags() {
    let fixture = Fixture::new(1);
    let session = fixture.open();
    let far_field = FarField::new(&session);

    assert_eq!(far_field.tau().unwrap(), 0.0);
    far_field.set_tau(45.0).unwrap();
    assert_eq!(far_field.tau().unwrap(), 45.0);

    assert!(!far_field.auto_tau_at_peak().unwrap());
    far_field.set_auto_tau_at_peak(true).unwrap();
    assert!(far_field.auto_tau_at_peak().unwrap());

    assert!(far_field.reference_pol_matches_meas_pol1().unwrap());
    far_field.set_reference_pol_matches_meas_pol1(false).unwrap();
    assert!(!far_field.reference_pol_matches_meas_pol1().unwrap());
}

#[test]
fn test_beamwidth_writes_level_first() {
    let fixture = Fixture::with_console(1, processed_console());
    let session = fixture.open();
    let far_field = FarField::new(&session);

    assert_eq!(far_field.beamwidth_3db().unwrap(), 18.75);
    far_field.beamwidth(-10.0).unwrap();
    assert_eq!(
        fixture.console.calls(),
        vec![
            ConsoleCall::Put(Property::FfBeamwidthDb1, ConsoleValue::Float(-3.0)),
            ConsoleCall::Get(Property::FfBeamwidthVal1),
            ConsoleCall::Put(Property::FfBeamwidthDb1, ConsoleValue::Float(-10.0)),
            ConsoleCall::Get(Property::FfBeamwidthVal1),
        ]
    );
}

#[test]
fn test_sidelobes_in_vendor_order() {
    let fixture = Fixture::with_console(1, processed_console());
    let session = fixture.open();

    let lobes = FarField::new(&session).sidelobes().unwrap();
    assert_eq!(
        lobes,
        Sidelobes {
            left_position: -24.0,
            left_value: -13.2,
            right_position: 23.5,
            right_value: -13.6,
        }
    );
    assert_eq!(
        fixture.console.calls(),
        vec![
            ConsoleCall::Get(Property::FfSidelobeLeftLoc),
            ConsoleCall::Get(Property::FfSidelobeLeftVal),
            ConsoleCall::Get(Property::FfSidelobeRightLoc),
            ConsoleCall::Get(Property::FfSidelobeRightVal),
        ]
    );
}

#[test]
fn test_peak_positions() {
    let fixture = Fixture::with_console(1, processed_console());
    let session = fixture.open();
    let far_field = FarField::new(&session);

    assert_eq!(far_field.peak_h().unwrap(), 0.25);
    assert_eq!(far_field.peak_v().unwrap(), -0.5);
}

#[test]
fn test_listing_to_file_names_current_beam() {
    let fixture = Fixture::new(3);
    let session = fixture.open();
    rust_nsi::BeamTable::new(&session).select_beam(3).unwrap();
    fixture.console.clear_calls();

    FarField::new(&session).listing_to_file().unwrap();
    let listing = fixture.dir.path().join("pla11_Beam3.txt");
    assert_eq!(
        fixture.console.calls(),
        vec![
            ConsoleCall::Get(Property::BeamNumber),
            ConsoleCall::Invoke(
                Command::FfListingToFile,
                vec![
                    ConsoleValue::Text(listing.to_string_lossy().into_owned()),
                    ConsoleValue::Bool(true),
                ],
            ),
        ]
    );
}

#[test]
fn test_wrong_type_from_console_is_external() {
    let fixture = Fixture::with_console(
        1,
        MockConsole::new().with_property(Property::FfDirectivity, "n/a"),
    );
    let session = fixture.open();

    let err = FarField::new(&session).directivity().unwrap_err();
    assert!(err.is_external());
    assert!(err.to_string().contains("FF_DIRECTIVITY"));
}

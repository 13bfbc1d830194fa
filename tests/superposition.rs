//! End-to-end behaviour of orientation control, the contribution ledger and
//! cube builds, exercised through the public API only.

use std::collections::BTreeMap;

use glam::{DQuat, DVec3};
use kmap_lib::cube::{
    build_datacube, DatacubeBuilder, FnKernel, KernelError, OrbitalKernel, SweepAxis, SweepGrid,
    SweepPoint,
};
use kmap_lib::ledger::ContributionLedger;
use kmap_lib::models::{OrbitalId, Orientation};
use kmap_lib::rotation::{forward_rotation, BondSegment, IsoMesh, IsoSign, OrientationController};
use kmap_lib::ErrorKind;
use ndarray::Array2;

const ENERGIES: [f64; 5] = [20.0, 40.0, 60.0, 80.0, 100.0];

fn same_pose(a: DQuat, b: DQuat) -> bool {
    a.abs_diff_eq(b, 1e-9) || a.abs_diff_eq(-b, 1e-9)
}

fn energy_grid() -> SweepGrid {
    SweepGrid::new(vec![SweepAxis::new("photon_energy", ENERGIES.to_vec()).unwrap()]).unwrap()
}

/// Distinct, orbital- and energy-dependent 3x4 maps.
fn raw_map(orbital: &OrbitalId, point: &SweepPoint) -> Array2<f64> {
    let seed = orbital.as_str().bytes().map(f64::from).sum::<f64>();
    let energy = point.get("photon_energy").unwrap_or(0.0);
    Array2::from_shape_fn((3, 4), |(r, c)| {
        (seed * 0.37 + energy * 1.3 + (r * 4 + c) as f64 * 0.11).sin()
    })
}

fn kernel() -> impl OrbitalKernel {
    FnKernel::new((3, 4), |orbital: &OrbitalId, _: &Orientation, point: &SweepPoint| {
        Ok::<_, KernelError>(raw_map(orbital, point))
    })
}

#[test]
fn early_and_late_primitives_share_the_final_pose() {
    let sequence = [
        Orientation::new(30.0, 10.0, -20.0).unwrap(),
        Orientation::new(-75.0, 60.0, 5.0).unwrap(),
        Orientation::new(12.5, -89.0, 45.0).unwrap(),
        Orientation::new(0.0, 90.0, -90.0).unwrap(),
    ];

    for late_after in 0..sequence.len() {
        let mut controller = OrientationController::new();
        let early = controller.add_primitive(Box::new(IsoMesh::new(
            vec![DVec3::new(1.0, 2.0, 3.0)],
            vec![],
            IsoSign::Plus,
        )));
        let mut late = None;
        for (k, o) in sequence.iter().enumerate() {
            controller.reorient(o.phi, o.theta, o.psi).unwrap();
            if k == late_after {
                late = Some(controller.add_primitive(Box::new(BondSegment::new(DVec3::ZERO, DVec3::X))));
            }
        }

        let last = sequence[sequence.len() - 1];
        let expected = forward_rotation(&last);
        let early_pose = controller.get(early).unwrap().rotation();
        let late_pose = controller.get(late.unwrap()).unwrap().rotation();
        assert!(same_pose(early_pose, expected), "early member off after {late_after}");
        assert!(same_pose(late_pose, expected), "late member off after {late_after}");
    }
}

#[test]
fn repeated_reorient_is_a_no_op() {
    let mut controller = OrientationController::new();
    let id = controller.add_primitive(Box::new(BondSegment::new(DVec3::ZERO, DVec3::Y)));
    controller.reorient(40.0, -30.0, 15.0).unwrap();
    let first = controller.get(id).unwrap().rotation();
    controller.reorient(40.0, -30.0, 15.0).unwrap();
    let second = controller.get(id).unwrap().rotation();
    assert_eq!(first.to_array().map(f64::to_bits), second.to_array().map(f64::to_bits));
}

#[test]
fn out_of_range_reorient_changes_nothing() {
    let mut controller = OrientationController::new();
    let id = controller.add_primitive(Box::new(BondSegment::new(DVec3::ZERO, DVec3::Z)));
    controller.reorient(10.0, 20.0, 30.0).unwrap();
    let before = controller.get(id).unwrap().rotation();
    let orientation = controller.orientation();

    for (phi, theta, psi) in [(91.0, 0.0, 0.0), (0.0, -90.1, 0.0), (0.0, 0.0, f64::NAN)] {
        let err = controller.reorient(phi, theta, psi).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }
    assert_eq!(controller.orientation(), orientation);
    let after = controller.get(id).unwrap().rotation();
    assert_eq!(before.to_array().map(f64::to_bits), after.to_array().map(f64::to_bits));
}

#[test]
fn duplicate_identity_then_re_add_after_remove() {
    let mut ledger = ContributionLedger::new();
    let a = ledger.add(OrbitalId::new("A"), Orientation::IDENTITY).unwrap();
    let err = ledger.add(OrbitalId::new("A"), Orientation::IDENTITY).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);
    ledger.remove(a).unwrap();
    assert!(ledger.add(OrbitalId::new("A"), Orientation::IDENTITY).is_ok());
}

#[test]
fn single_unit_contribution_reproduces_kernel_output() {
    let mut ledger = ContributionLedger::new();
    ledger.add(OrbitalId::new("homo"), Orientation::IDENTITY).unwrap();
    let grid = energy_grid();
    let cube = build_datacube(&grid, &BTreeMap::new(), &ledger.list_enabled(), &kernel()).unwrap();

    for (i, point) in grid.points(&BTreeMap::new()).iter().enumerate() {
        let expected = raw_map(&OrbitalId::new("homo"), point);
        assert_eq!(cube.slice_from_index(i as i64).unwrap(), expected.view());
    }
}

#[test]
fn weighted_sum_of_two_contributions() {
    let mut ledger = ContributionLedger::new();
    let a = ledger.add(OrbitalId::new("A"), Orientation::IDENTITY).unwrap();
    let b = ledger.add(OrbitalId::new("B"), Orientation::IDENTITY).unwrap();
    ledger.set_weight(a, 2.0).unwrap();
    ledger.set_weight(b, 3.0).unwrap();
    let grid = energy_grid();
    let cube = build_datacube(&grid, &BTreeMap::new(), &ledger.list_enabled(), &kernel()).unwrap();

    let points = grid.points(&BTreeMap::new());
    let map_a = raw_map(&OrbitalId::new("A"), &points[2]);
    let map_b = raw_map(&OrbitalId::new("B"), &points[2]);
    let slice = cube.slice_from_index(2).unwrap();
    for ((r, c), value) in slice.indexed_iter() {
        let expected = 2.0 * map_a[[r, c]] + 3.0 * map_b[[r, c]];
        assert!((value - expected).abs() <= 1e-12, "pixel ({r}, {c})");
    }
}

#[test]
fn slice_index_bounds_on_five_point_sweep() {
    let mut ledger = ContributionLedger::new();
    ledger.add(OrbitalId::new("A"), Orientation::IDENTITY).unwrap();
    let cube =
        build_datacube(&energy_grid(), &BTreeMap::new(), &ledger.list_enabled(), &kernel()).unwrap();

    for i in 0..5 {
        assert!(cube.slice_from_index(i).is_ok());
    }
    for bad in [5, -1] {
        assert_eq!(cube.slice_from_index(bad).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
    }
}

#[test]
fn disable_then_re_enable_restores_identical_output() {
    let mut ledger = ContributionLedger::new();
    ledger.add(OrbitalId::new("A"), Orientation::IDENTITY).unwrap();
    let b = ledger.add(OrbitalId::new("B"), Orientation::new(0.0, 30.0, 0.0).unwrap()).unwrap();
    ledger.set_weight(b, 0.75).unwrap();
    let kernel = kernel();
    let mut builder = DatacubeBuilder::new(energy_grid(), BTreeMap::new());

    let both = builder.build(&ledger.list_enabled(), &kernel).unwrap();

    ledger.set_enabled(b, false).unwrap();
    assert_eq!(ledger.len(), 2);
    let only_a = builder.build(&ledger.list_enabled(), &kernel).unwrap();
    let points = energy_grid().points(&BTreeMap::new());
    for (i, point) in points.iter().enumerate() {
        let expected = raw_map(&OrbitalId::new("A"), point);
        assert_eq!(only_a.slice_from_index(i as i64).unwrap(), expected.view());
    }

    ledger.set_enabled(b, true).unwrap();
    let restored = builder.build(&ledger.list_enabled(), &kernel).unwrap();
    for i in 0..5 {
        assert_eq!(
            restored.slice_from_index(i).unwrap(),
            both.slice_from_index(i).unwrap()
        );
    }
}

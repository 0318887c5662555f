//! Integration tests for ClothMesh construction and stepping.

use drape_math::DVec3;
use drape_solver::{ClothConfig, ClothMesh, CollisionProbe, PinPolicy};
use drape_types::{DrapeError, ParticleId, SpringId};

const H: f64 = 1.0 / 60.0;
const GRAVITY: DVec3 = DVec3::new(0.0, -9.81, 0.0);

/// Horizontal unit sheet at height `y`.
fn sheet(rows: usize, cols: usize, y: f64, mass: f64, stiffness: f64) -> ClothConfig {
    ClothConfig::new(
        rows,
        cols,
        [[0.0, y, 0.0], [1.0, y, 0.0], [0.0, y, 1.0], [1.0, y, 1.0]],
        mass,
        stiffness,
    )
}

fn assert_finite(cloth: &ClothMesh) {
    for p in cloth.particles() {
        assert!(p.position().is_finite(), "position {:?}", p.position());
        assert!(p.velocity().is_finite(), "velocity {:?}", p.velocity());
    }
}

// ─── Construction Tests ───────────────────────────────────────

#[test]
fn single_row_is_rejected() {
    let err = ClothMesh::new(&sheet(1, 4, 0.0, 1.0, 10.0)).unwrap_err();
    assert!(matches!(err, DrapeError::InvalidConfig(_)));
}

#[test]
fn single_column_is_rejected() {
    let err = ClothMesh::new(&sheet(4, 1, 0.0, 1.0, 10.0)).unwrap_err();
    assert!(matches!(err, DrapeError::InvalidConfig(_)));
}

#[test]
fn zero_mass_is_rejected() {
    let err = ClothMesh::new(&sheet(3, 3, 0.0, 0.0, 10.0)).unwrap_err();
    assert!(matches!(err, DrapeError::InvalidConfig(_)));
}

#[test]
fn non_positive_stiffness_is_rejected() {
    for k in [0.0, -5.0, f64::NAN] {
        let err = ClothMesh::new(&sheet(3, 3, 0.0, 1.0, k)).unwrap_err();
        assert!(matches!(err, DrapeError::InvalidConfig(_)), "stiffness {k}");
    }
}

#[test]
fn collapsed_corners_are_degenerate() {
    let config = ClothConfig::new(3, 3, [[1.0, 2.0, 3.0]; 4], 1.0, 10.0);
    let err = ClothMesh::new(&config).unwrap_err();
    assert!(matches!(err, DrapeError::DegenerateGeometry(_)));
}

#[test]
fn from_corners_matches_config() {
    let cloth = ClothMesh::from_corners(
        3,
        4,
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
        1.2,
        10.0,
    )
    .unwrap();
    assert_eq!(cloth.rows(), 3);
    assert_eq!(cloth.cols(), 4);
    assert_eq!(cloth.particles().len(), 12);
    assert!((cloth.particles()[0].mass() - 0.1).abs() < 1e-15);
}

#[test]
fn default_pins_are_last_row_corners() {
    let cloth = ClothMesh::new(&sheet(4, 5, 0.0, 1.0, 10.0)).unwrap();
    let pinned: Vec<usize> = cloth
        .particles()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_pinned())
        .map(|(k, _)| k)
        .collect();
    assert_eq!(pinned, vec![15, 19]);
    assert!(cloth.particles()[15].global_index().is_none());
}

#[test]
fn free_dof_indices_are_contiguous() {
    let cloth = ClothMesh::new(&sheet(4, 5, 0.0, 1.0, 10.0)).unwrap();
    assert_eq!(cloth.dofs(), 3 * 18);
    let indices: Vec<usize> = cloth
        .particles()
        .iter()
        .filter_map(|p| p.global_index())
        .collect();
    let expected: Vec<usize> = (0..18).map(|i| 3 * i).collect();
    assert_eq!(indices, expected);
}

#[test]
fn initial_configuration_is_stress_free() {
    let cloth = ClothMesh::new(&sheet(5, 6, 0.3, 1.0, 10.0)).unwrap();
    for s in cloth.springs() {
        let x0 = cloth.particles()[s.p0.index()].position();
        let x1 = cloth.particles()[s.p1.index()].position();
        assert_eq!(s.rest_length, (x1 - x0).length());
    }
    assert_eq!(cloth.elastic_energy(), 0.0);
}

#[test]
fn springs_are_addressable_by_id() {
    let cloth = ClothMesh::new(&sheet(3, 3, 0.0, 1.0, 10.0)).unwrap();
    let count = cloth.springs().len();
    let first = cloth.spring(SpringId(0)).unwrap();
    assert_eq!(first, &cloth.springs()[0]);
    assert_eq!(
        cloth.spring(SpringId(count as u32 - 1)),
        cloth.springs().last()
    );
    assert!(cloth.spring(SpringId(count as u32)).is_none());
}

// ─── Step Tests ───────────────────────────────────────────────

#[test]
fn position_integrates_new_velocity_exactly() {
    let mut cloth = ClothMesh::new(&sheet(4, 4, 1.0, 1.0, 50.0)).unwrap();
    for _ in 0..3 {
        let before: Vec<DVec3> = cloth.positions();
        cloth.step(H, GRAVITY, &[]).unwrap();
        for (p, old) in cloth.particles().iter().zip(before) {
            if p.is_pinned() {
                continue;
            }
            assert_eq!(p.position(), old + p.velocity() * H);
        }
    }
}

#[test]
fn pinned_particles_never_move() {
    let config = sheet(5, 5, 1.0, 1.0, 100.0).with_pins(PinPolicy::TopCorners);
    let mut cloth = ClothMesh::new(&config).unwrap();
    let initial: Vec<(DVec3, DVec3)> = cloth
        .particles()
        .iter()
        .map(|p| (p.position(), p.velocity()))
        .collect();

    for _ in 0..100 {
        cloth.step(H, GRAVITY, &[]).unwrap();
    }

    for (p, (x, v)) in cloth.particles().iter().zip(initial) {
        if p.is_pinned() {
            assert_eq!(p.position().to_array().map(f64::to_bits), x.to_array().map(f64::to_bits));
            assert_eq!(p.velocity().to_array().map(f64::to_bits), v.to_array().map(f64::to_bits));
        }
    }
    // The free part of the sheet did fall.
    assert!(cloth.particles()[12].position().y < 1.0);
}

#[test]
fn free_sheet_conserves_momentum() {
    let config = sheet(2, 2, 0.0, 1.0, 10.0).with_pins(PinPolicy::None);
    let mut cloth = ClothMesh::new(&config).unwrap();
    cloth
        .set_particle_state(ParticleId(3), DVec3::new(1.3, 0.0, 1.3), DVec3::ZERO)
        .unwrap();
    let initial_elastic = cloth.elastic_energy();
    assert!(initial_elastic > 0.0);

    let mut moved = false;
    for _ in 0..200 {
        cloth.step(H, DVec3::ZERO, &[]).unwrap();
        assert!(cloth.momentum().length() < 1e-9, "momentum {:?}", cloth.momentum());
        moved |= cloth.kinetic_energy() > 0.0;
    }
    assert!(moved);
    // Implicit Euler dissipates; the stretch relaxes.
    assert!(cloth.elastic_energy() < initial_elastic);
}

#[test]
fn stiff_sheet_stays_bounded() {
    // 8×8 sheet hung from its four corners. k h² / m ≈ 14, far beyond the
    // ω h < 2 limit of an explicit integrator.
    let config = sheet(8, 8, 1.0, 1.28, 1.0e3).with_pins(PinPolicy::Explicit {
        cells: vec![[0, 0], [0, 7], [7, 0], [7, 7]],
    });
    let mut cloth = ClothMesh::new(&config).unwrap();
    let m = cloth.particles()[1].mass();
    assert!(1.0e3 * H * H / m > 4.0);

    for step in 0..1000 {
        cloth
            .step(H, GRAVITY, &[])
            .unwrap_or_else(|e| panic!("step {step} failed: {e}"));
    }
    assert_finite(&cloth);
    for p in cloth.particles() {
        let x = p.position();
        assert!(x.y > -1.0 && x.y < 1.2, "particle escaped: {x:?}");
        assert!(x.x > -0.5 && x.x < 1.5 && x.z > -0.5 && x.z < 1.5);
    }
}

#[test]
fn falling_particle_is_stopped_by_probe() {
    fn max_penetration(collision_stiffness: f64) -> f64 {
        // One free particle of mass 1 directly above a sphere at the origin;
        // its three neighbors are pinned and its springs are negligible.
        let config = ClothConfig::new(
            2,
            2,
            [[0.0, 0.52, 0.0], [1.0, 0.52, 0.0], [0.0, 0.52, 1.0], [1.0, 0.52, 1.0]],
            4.0,
            1.0e-6,
        )
        .with_collision_stiffness(collision_stiffness)
        .with_pins(PinPolicy::Explicit {
            cells: vec![[0, 1], [1, 0], [1, 1]],
        });
        let mut cloth = ClothMesh::new(&config).unwrap();
        let probe = CollisionProbe::new(DVec3::ZERO, 0.5);
        let contact_distance = 0.5 + cloth.particles()[0].radius();

        let mut deepest = 0.0_f64;
        for _ in 0..60 {
            cloth.step(H, GRAVITY, &[probe]).unwrap();
            let x = cloth.particles()[0].position();
            assert!(x.y > 0.3, "particle passed into the probe: {x:?}");
            deepest = deepest.max(contact_distance - x.length());
        }
        deepest
    }

    let soft = max_penetration(1.0e3);
    let stiff = max_penetration(8.0e3);
    assert!(soft > 0.0);
    assert!(soft < 0.1, "soft overlap {soft}");
    assert!(stiff < soft, "stiff {stiff} vs soft {soft}");
}

#[test]
fn singular_step_leaves_state_untouched() {
    // Free particle deep inside a probe with an overwhelming penalty constant:
    // M - h² K loses positive definiteness.
    let config = ClothConfig::new(
        2,
        2,
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0]],
        4.0,
        10.0,
    )
    .with_collision_stiffness(1.0e6)
    .with_pins(PinPolicy::Explicit {
        cells: vec![[0, 1], [1, 0], [1, 1]],
    });
    let mut cloth = ClothMesh::new(&config).unwrap();
    let probe = CollisionProbe::new(DVec3::new(0.0, -0.22, 0.0), 0.5);

    let before = cloth.particles().to_vec();
    let buffers_before = cloth.buffers().clone();
    let err = cloth.step(H, GRAVITY, &[probe]).unwrap_err();
    assert!(matches!(err, DrapeError::SingularSystem { dofs: 3, .. }), "{err}");
    assert!(err.is_recoverable());
    assert_eq!(cloth.particles(), &before[..]);
    assert_eq!(cloth.buffers(), &buffers_before);

    // A much smaller timestep keeps the system definite.
    let report = cloth.step(1.0e-4, GRAVITY, &[probe]).unwrap();
    assert_eq!(report.contact_count, 1);
    assert!(cloth.particles()[0].velocity().y > 0.0);
}

#[test]
fn zero_length_spring_fails_step() {
    let config = sheet(2, 2, 0.0, 1.0, 10.0).with_pins(PinPolicy::None);
    let mut cloth = ClothMesh::new(&config).unwrap();
    let x0 = cloth.particles()[0].position();
    cloth
        .set_particle_state(ParticleId(1), x0, DVec3::ZERO)
        .unwrap();
    let before = cloth.particles().to_vec();
    let err = cloth.step(H, GRAVITY, &[]).unwrap_err();
    assert!(matches!(err, DrapeError::DegenerateStep(_)));
    assert_eq!(cloth.particles(), &before[..]);
}

#[test]
fn particle_at_probe_center_fails_step() {
    let mut cloth = ClothMesh::new(&sheet(2, 2, 0.0, 1.0, 10.0)).unwrap();
    let probe = CollisionProbe::new(cloth.particles()[0].position(), 0.1);
    let err = cloth.step(H, GRAVITY, &[probe]).unwrap_err();
    assert!(matches!(err, DrapeError::DegenerateStep(_)));
}

#[test]
fn invalid_step_inputs_are_rejected() {
    let mut cloth = ClothMesh::new(&sheet(3, 3, 0.0, 1.0, 10.0)).unwrap();
    for h in [0.0, -H, f64::NAN, f64::INFINITY] {
        let err = cloth.step(h, GRAVITY, &[]).unwrap_err();
        assert!(matches!(err, DrapeError::InvalidInput(_)), "h = {h}");
    }
    let err = cloth
        .step(H, DVec3::new(0.0, f64::NAN, 0.0), &[])
        .unwrap_err();
    assert!(matches!(err, DrapeError::InvalidInput(_)));
    let bad_probe = CollisionProbe::new(DVec3::ZERO, -1.0);
    let err = cloth.step(H, GRAVITY, &[bad_probe]).unwrap_err();
    assert!(matches!(err, DrapeError::InvalidInput(_)));
}

#[test]
fn fully_pinned_sheet_is_inert() {
    let config = sheet(2, 2, 0.0, 1.0, 10.0).with_pins(PinPolicy::Explicit {
        cells: vec![[0, 0], [0, 1], [1, 0], [1, 1]],
    });
    let mut cloth = ClothMesh::new(&config).unwrap();
    assert_eq!(cloth.dofs(), 0);
    let before = cloth.positions();
    let report = cloth.step(H, GRAVITY, &[]).unwrap();
    assert_eq!(report.free_dofs, 0);
    assert_eq!(report.nonzeros, 0);
    assert_eq!(cloth.positions(), before);
}

#[test]
fn step_report_counts_contacts() {
    let config = sheet(3, 3, 0.0, 1.0, 10.0).with_pins(PinPolicy::None);
    let mut cloth = ClothMesh::new(&config).unwrap();
    // Sphere just under the center particle only.
    let probe = CollisionProbe::new(DVec3::new(0.5, -0.1, 0.5), 0.105);
    let report = cloth.step(H, DVec3::ZERO, &[probe]).unwrap();
    assert_eq!(report.contact_count, 1);
    assert!((report.max_penetration - 0.015).abs() < 1e-12);
    assert_eq!(report.free_dofs, 27);
    assert!(report.nonzeros > 27);
    // Pushed upward.
    assert!(cloth.particles()[4].velocity().y > 0.0);
}

// ─── Tare / Reset Tests ───────────────────────────────────────

#[test]
fn tare_then_reset_is_identity() {
    let mut cloth = ClothMesh::new(&sheet(4, 4, 1.0, 1.0, 50.0)).unwrap();
    for _ in 0..10 {
        cloth.step(H, GRAVITY, &[]).unwrap();
    }
    cloth.tare();
    let particles = cloth.particles().to_vec();
    let buffers = cloth.buffers().clone();
    cloth.reset();
    assert_eq!(cloth.particles(), &particles[..]);
    assert_eq!(cloth.buffers(), &buffers);
}

#[test]
fn reset_restores_last_tare() {
    let mut cloth = ClothMesh::new(&sheet(4, 4, 1.0, 1.0, 50.0)).unwrap();
    let initial = cloth.particles().to_vec();
    let initial_buffers = cloth.buffers().clone();
    for _ in 0..20 {
        cloth.step(H, GRAVITY, &[]).unwrap();
    }
    assert_ne!(cloth.particles(), &initial[..]);
    cloth.reset();
    assert_eq!(cloth.particles(), &initial[..]);
    assert_eq!(cloth.buffers(), &initial_buffers);
    // Springs keep their construction rest lengths.
    assert_eq!(cloth.elastic_energy(), 0.0);
}

#[test]
fn set_particle_state_rejects_pinned_and_out_of_range() {
    let mut cloth = ClothMesh::new(&sheet(3, 3, 0.0, 1.0, 10.0)).unwrap();
    let err = cloth
        .set_particle_state(ParticleId(6), DVec3::ZERO, DVec3::ZERO)
        .unwrap_err();
    assert!(matches!(err, DrapeError::InvalidInput(_)));
    let err = cloth
        .set_particle_state(ParticleId(99), DVec3::ZERO, DVec3::ZERO)
        .unwrap_err();
    assert!(matches!(err, DrapeError::InvalidInput(_)));
}

// ─── Render Buffer Tests ──────────────────────────────────────

#[test]
fn buffers_follow_particles() {
    let mut cloth = ClothMesh::new(&sheet(3, 4, 1.0, 1.0, 50.0)).unwrap();
    for _ in 0..5 {
        cloth.step(H, GRAVITY, &[]).unwrap();
    }
    let buffers = cloth.buffers();
    assert_eq!(buffers.vertex_count(), 12);
    assert_eq!(buffers.indices.len(), 2 * 4 * 2);
    for (k, p) in cloth.particles().iter().enumerate() {
        let x = p.position();
        assert_eq!(buffers.position(k), [x.x as f32, x.y as f32, x.z as f32]);
        let n = buffers.normal(k);
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
    }
}

// ─── Concurrency Tests ────────────────────────────────────────

#[test]
fn cloth_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClothMesh>();
}

#[test]
fn independent_meshes_step_in_parallel() {
    let config = sheet(5, 5, 1.0, 1.0, 80.0);
    let mut reference = ClothMesh::new(&config).unwrap();
    for _ in 0..30 {
        reference.step(H, GRAVITY, &[]).unwrap();
    }

    let mut meshes: Vec<ClothMesh> = (0..4).map(|_| ClothMesh::new(&config).unwrap()).collect();
    std::thread::scope(|scope| {
        for cloth in &mut meshes {
            scope.spawn(move || {
                for _ in 0..30 {
                    cloth.step(H, GRAVITY, &[]).unwrap();
                }
            });
        }
    });

    for cloth in &meshes {
        for (a, b) in cloth.positions().iter().zip(reference.positions()) {
            assert!((*a - b).length() < 1e-12);
        }
    }
}

use super::*;
use crate::core::Vec2;
use crate::domain::config::EngineConfig;
use crate::domain::host::{HostId, HostProfile};

fn engine() -> EngineCore {
    EngineCore::default()
}

fn quiet_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.collision.enabled = false;
    config.cursor.enabled = false;
    config
}

fn assert_contained(engine: &EngineCore) {
    for p in engine.particles() {
        let shape = engine.host(p.host).unwrap().shape;
        assert!(
            shape.contains(p.pos.x, p.pos.y, p.size),
            "particle {:?} (size {}) escaped at {:?}",
            p.id,
            p.size,
            p.pos
        );
    }
}

/// (count, size classes in spawn order) per host
fn batch_stats(engine: &EngineCore) -> Vec<(usize, Vec<u8>)> {
    engine
        .hosts()
        .ids()
        .into_iter()
        .map(|id| {
            let classes: Vec<u8> = engine.particles_of(id).map(|p| p.size_class).collect();
            (classes.len(), classes)
        })
        .collect()
}

#[test]
fn added_host_gets_inactive_contained_batch() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::primary()).unwrap();

    let count = engine.particles_of(host).count();
    assert!(count > 0 && count <= 24, "count {}", count);
    assert!(engine.particles().iter().all(|p| !p.is_active));
    assert!(engine.is_running());
    assert_contained(&engine);

    assert_eq!(engine.sink_mut().take_spawned().len(), count);
    assert_eq!(engine.sink().live_count(), count);
}

#[test]
fn batches_keep_minimum_spacing() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::secondary()).unwrap();
    let spacing = engine.config().placement.spacing;
    let batch: Vec<_> = engine.particles_of(host).collect();
    let max_size = batch.iter().map(|p| p.size).fold(0.0f32, f32::max);

    for (i, a) in batch.iter().enumerate() {
        for b in &batch[i + 1..] {
            assert!((a.pos - b.pos).length() >= max_size + spacing - 1e-4);
        }
    }
}

#[test]
fn disabled_engine_allocates_nothing() {
    let mut config = EngineConfig::default();
    config.enabled = false;
    let mut engine = EngineCore::new(config);

    let host = engine.on_host_added(HostProfile::primary()).unwrap();
    assert_eq!(engine.particle_count(), 0);
    assert_eq!(engine.spawn_batch(host, 10), 0);
    assert_eq!(engine.reinitialize(host), 0);
    assert_eq!(engine.initialize(), 0);
    assert!(!engine.is_running());

    engine.tick(16.0);
    assert_eq!(engine.frame_count(), 0);
    assert!(engine.sink_mut().take_spawned().is_empty());
}

#[test]
fn enabling_spawns_hosts_registered_while_disabled() {
    let mut config = EngineConfig::default();
    config.enabled = false;
    let mut engine = EngineCore::new(config);
    let host = engine.register_host(HostProfile::icon()).unwrap();

    engine.set_enabled(true);
    assert!(engine.particles_of(host).count() > 0);
    assert!(engine.is_running());
    assert!(engine.config().enabled);
}

#[test]
fn disabling_tears_down_and_stops() {
    let mut engine = engine();
    engine.on_host_added(HostProfile::primary()).unwrap();
    engine.arm_frame(FrameHandle(4));
    engine.sink_mut().take_spawned();

    engine.set_enabled(false);
    assert!(!engine.is_running());
    assert_eq!(engine.particle_count(), 0);
    assert_eq!(engine.sink().live_count(), 0);
    assert_eq!(engine.take_cancelled_frames(), vec![FrameHandle(4)]);
    assert!(!engine.frame(32.0));
}

#[test]
fn reinitialize_replaces_the_batch() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::primary()).unwrap();
    let old: Vec<u32> = engine.particles_of(host).map(|p| p.id.0).collect();
    engine.sink_mut().take_spawned();

    let spawned = engine.reinitialize(host) as usize;
    let new: Vec<u32> = engine.particles_of(host).map(|p| p.id.0).collect();

    assert_eq!(new.len(), spawned);
    assert!(new.iter().all(|id| !old.contains(id)));
    let mut released = engine.sink_mut().take_released();
    released.sort_unstable();
    let mut expected = old.clone();
    expected.sort_unstable();
    assert_eq!(released, expected);
}

#[test]
fn batches_stay_contiguous_per_host() {
    let mut engine = engine();
    let a = engine.on_host_added(HostProfile::primary()).unwrap();
    let b = engine.on_host_added(HostProfile::secondary()).unwrap();
    engine.reinitialize(a);
    engine.on_host_added(HostProfile::icon()).unwrap();
    engine.reinitialize(b);

    let runs = engine.particles.chunk_by(|x, y| x.host == y.host).count();
    assert_eq!(runs, 3);
}

#[test]
fn spawn_batch_replaces_the_existing_batch() {
    let mut engine = engine();
    let a = engine.on_host_added(HostProfile::primary()).unwrap();
    let b = engine.on_host_added(HostProfile::secondary()).unwrap();
    let old: Vec<u32> = engine.particles_of(a).map(|p| p.id.0).collect();
    let others = engine.particles_of(b).count();

    let spawned = engine.spawn_batch(a, 20);
    assert!(spawned > 0 && spawned <= 20);
    assert_eq!(engine.particles_of(a).count() as u32, spawned);
    assert!(engine.particles_of(a).all(|p| !old.contains(&p.id.0)));
    assert_eq!(engine.particles_of(b).count(), others);

    let runs = engine.particles.chunk_by(|x, y| x.host == y.host).count();
    assert_eq!(runs, 2);

    // one placement pass: no pair overlaps
    let batch: Vec<_> = engine.particles_of(a).collect();
    for (i, p) in batch.iter().enumerate() {
        for q in &batch[i + 1..] {
            assert!((p.center() - q.center()).length() >= p.radius() + q.radius());
        }
    }
    assert_eq!(engine.sink().live_count(), engine.particle_count());
}

#[test]
fn prune_drops_detached_hosts_and_their_visuals() {
    let mut engine = engine();
    let keep = engine.on_host_added(HostProfile::primary()).unwrap();
    let gone = engine.on_host_added(HostProfile::secondary()).unwrap();
    engine.sink_mut().take_spawned();
    let gone_ids: Vec<u32> = engine.particles_of(gone).map(|p| p.id.0).collect();
    let total = engine.particle_count();

    // detached but not yet pruned: keeps simulating
    assert!(engine.detach_host(gone));
    engine.tick(16.0);
    assert_eq!(engine.particle_count(), total);

    assert_eq!(engine.prune() as usize, gone_ids.len());
    assert_eq!(engine.particles_of(gone).count(), 0);
    assert!(engine.host(gone).is_none());
    assert!(engine.host(keep).is_some());

    let mut released = engine.sink_mut().take_released();
    released.sort_unstable();
    let mut expected = gone_ids.clone();
    expected.sort_unstable();
    assert_eq!(released, expected);

    engine.tick(32.0);
    let frame_ids = engine.sink().frame_ids();
    assert!(gone_ids.iter().all(|id| !frame_ids.contains(id)));
    assert_eq!(frame_ids.len(), engine.particle_count());
}

#[test]
fn removed_host_is_pruned_immediately() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::icon()).unwrap();
    let count = engine.particles_of(host).count() as u32;

    assert_eq!(engine.on_host_removed(host), count);
    assert_eq!(engine.particle_count(), 0);
    assert_eq!(engine.host_count(), 0);

    // stale id is harmless
    assert!(!engine.pointer_enter(host));
    assert_eq!(engine.reinitialize(host), 0);
}

#[test]
fn full_reset_is_idempotent() {
    let mut engine = engine();
    engine.on_host_added(HostProfile::primary()).unwrap();
    engine.on_host_added(HostProfile::secondary()).unwrap();
    engine.on_host_added(HostProfile::icon()).unwrap();
    let hosts = engine.host_count();

    engine.full_reset();
    let once = batch_stats(&engine);
    let count_once = engine.particle_count();

    engine.full_reset();
    let twice = batch_stats(&engine);

    assert_eq!(once, twice);
    assert_eq!(engine.particle_count(), count_once);
    assert_eq!(engine.host_count(), hosts);
    assert_eq!(engine.sink().live_count(), engine.particle_count());
}

#[test]
fn teardown_cancels_pending_frame_once() {
    let mut engine = engine();
    engine.on_host_added(HostProfile::primary()).unwrap();
    assert!(engine.take_start_request());
    engine.arm_frame(FrameHandle(9));

    engine.teardown();
    assert!(!engine.is_running());
    assert_eq!(engine.particle_count(), 0);
    assert_eq!(engine.take_cancelled_frames(), vec![FrameHandle(9)]);

    engine.teardown();
    assert!(engine.take_cancelled_frames().is_empty());
    // hosts survive a teardown
    assert_eq!(engine.host_count(), 1);
    assert!(engine.initialize() > 0);
}

#[test]
fn frame_ticks_only_while_running() {
    let mut engine = engine();
    assert!(!engine.frame(0.0));
    assert_eq!(engine.frame_count(), 0);

    engine.initialize();
    assert!(engine.take_start_request());
    engine.arm_frame(FrameHandle(1));
    assert!(engine.frame(16.0));
    assert_eq!(engine.frame_count(), 1);

    engine.teardown();
    assert!(!engine.frame(32.0));
    assert_eq!(engine.frame_count(), 1);
}

#[test]
fn hover_engages_then_lingers_then_settles() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::primary()).unwrap();

    engine.pointer_enter(host);
    engine.tick(16.0);
    assert!(engine.particles().iter().all(|p| p.is_active && !p.return_to_origin));

    engine.pointer_leave(host);
    engine.tick(100.0);
    assert!(engine.host(host).unwrap().engaged);
    assert!(engine.particles().iter().all(|p| p.is_active && !p.return_to_origin));

    engine.tick(200.0);
    assert!(!engine.host(host).unwrap().engaged);
    assert!(engine.particles().iter().all(|p| p.return_to_origin || !p.is_active));

    let mut now = 200.0;
    for _ in 0..600 {
        now += 16.0;
        engine.tick(now);
        if engine.particles().iter().all(|p| !p.is_active) {
            break;
        }
    }
    assert!(engine.particles().iter().all(|p| !p.is_active && !p.return_to_origin));
    assert_contained(&engine);
}

#[test]
fn pointer_input_is_sanitized() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::primary()).unwrap();

    assert!(!engine.pointer_move(host, f32::NAN, 10.0));
    assert!(!engine.pointer_move(host, 10.0, f32::INFINITY));
    assert_eq!(engine.host(host).unwrap().hover.pointer, None);

    assert!(engine.pointer_move(host, 150.0, -3.0));
    let shape = engine.host(host).unwrap().shape;
    assert_eq!(engine.host(host).unwrap().hover.pointer, Some(Vec2::new(shape.width(), 0.0)));

    assert!(engine.pointer_move(host, 50.0, 50.0));
    assert_eq!(
        engine.host(host).unwrap().hover.pointer,
        Some(Vec2::new(shape.width() * 0.5, shape.height() * 0.5))
    );
}

#[test]
fn cursor_force_needs_hover() {
    let mut config = EngineConfig::default();
    config.collision.enabled = false;
    config.physics.jitter = 0.0;
    let mut engine = EngineCore::new(config);
    let host = engine.on_host_added(HostProfile::primary()).unwrap();

    // engaged through processing, no pointer
    engine.set_host_processing(host, true);
    engine.tick(16.0);
    assert!(engine.particles().iter().all(|p| p.is_active));
    assert_eq!(engine.get_perf_stats().cursor_pushes(), 0);

    engine.pointer_enter(host);
    engine.pointer_move(host, 50.0, 50.0);
    engine.tick(32.0);
    assert!(engine.get_perf_stats().cursor_pushes() > 0);
}

#[test]
fn particles_stay_inside_over_many_ticks() {
    let mut engine = engine();
    let hosts = [
        engine.on_host_added(HostProfile::primary()).unwrap(),
        engine.on_host_added(HostProfile::secondary()).unwrap(),
        engine.on_host_added(HostProfile::icon()).unwrap(),
    ];
    for &h in &hosts {
        engine.pointer_enter(h);
    }

    let mut now = 0.0;
    for i in 0..1500 {
        now += 16.0;
        for &h in &hosts {
            let t = i as f32 * 0.05;
            engine.pointer_move(h, 50.0 + 45.0 * t.cos(), 50.0 + 45.0 * t.sin());
        }
        // toggle hover now and then to exercise the return path
        if i % 300 == 150 {
            engine.pointer_leave(hosts[0]);
        } else if i % 300 == 0 {
            engine.pointer_enter(hosts[0]);
        }
        engine.tick(now);
        assert_contained(&engine);
    }
    assert!(engine.get_perf_stats().particle_count() > 0);
}

#[test]
fn total_speed_decays_without_cursor_and_collisions() {
    let mut engine = EngineCore::new(quiet_config());
    let host = engine.on_host_added(HostProfile::primary()).unwrap();
    engine.set_host_processing(host, true);
    engine.tick(16.0);

    let n = engine.particle_count() as f32;
    let jitter = engine.config().physics.jitter;
    let tolerance = n * jitter * std::f32::consts::SQRT_2 + 1e-4;
    let total_speed = |e: &EngineCore| e.particles().iter().map(|p| p.speed()).sum::<f32>();

    let mut previous = total_speed(&engine);
    let mut now = 16.0;
    for _ in 0..300 {
        now += 16.0;
        engine.tick(now);
        let current = total_speed(&engine);
        assert!(current <= previous + tolerance, "{} -> {}", previous, current);
        previous = current;
    }
}

#[test]
fn non_finite_particle_is_recovered() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::primary()).unwrap();
    engine.set_host_processing(host, true);
    engine.tick(16.0);

    engine.particles[0].pos = Vec2::new(f32::NAN, f32::NAN);
    engine.tick(32.0);
    assert_eq!(engine.get_perf_stats().recovered(), 1);
    assert!(engine.particles().iter().all(|p| p.pos.is_finite() && p.vel.is_finite()));
    assert_contained(&engine);
}

#[test]
fn vanished_visual_is_tolerated() {
    let mut engine = engine();
    engine.on_host_added(HostProfile::primary()).unwrap();
    let total = engine.particle_count();
    let victim = engine.particles()[0].id;

    assert!(engine.sink_mut().detach_visual(victim.0));
    assert!(!engine.sink().is_live(victim));
    engine.tick(16.0);

    let stats = engine.get_perf_stats();
    assert_eq!(stats.missing_visuals(), 1);
    assert_eq!(engine.sink().frame_len(), total - 1);
    assert_eq!(engine.particle_count(), total);
}

#[test]
fn sync_writes_percent_rows_for_every_particle() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::primary()).unwrap();
    engine.tick(16.0);

    let shape = engine.host(host).unwrap().shape;
    for p in engine.particles() {
        let row = engine.sink().row(p.id).unwrap();
        assert!((row[0] - p.pos.x / shape.width() * 100.0).abs() < 1e-4);
        assert!((row[1] - p.pos.y / shape.height() * 100.0).abs() < 1e-4);
        // idle particles are hidden
        assert_eq!(row[3], 0.0);
    }
}

#[test]
fn trails_follow_engaged_particles() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::primary()).unwrap();
    let trail_len = engine.host(host).unwrap().profile.trail_length as usize;
    assert!(trail_len > 0);

    engine.pointer_enter(host);
    for i in 1..=10 {
        engine.tick(i as f64 * 16.0);
    }
    let count = engine.particle_count();
    assert_eq!(engine.sink().trail_ids().len(), count * trail_len);
    assert_eq!(engine.get_perf_stats().trail_followers() as usize, count * trail_len);
}

#[test]
fn clear_transient_visual_state_only_touches_processing() {
    let mut engine = engine();
    let a = engine.on_host_added(HostProfile::primary()).unwrap();
    let b = engine.on_host_added(HostProfile::secondary()).unwrap();
    engine.set_host_processing(a, true);
    engine.set_host_processing(b, true);
    let count = engine.particle_count();

    assert_eq!(engine.clear_transient_visual_state(), 2);
    let mut cleared = engine.sink_mut().take_processing_cleared();
    cleared.sort_unstable();
    let mut expected = vec![a.to_raw(), b.to_raw()];
    expected.sort_unstable();
    assert_eq!(cleared, expected);

    assert!(!engine.host(a).unwrap().processing);
    assert_eq!(engine.particle_count(), count);
    assert_eq!(engine.clear_transient_visual_state(), 0);
}

#[test]
fn engaged_host_respawns_awake() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::primary()).unwrap();
    engine.set_host_processing(host, true);
    engine.tick(16.0);

    engine.reinitialize(host);
    assert!(engine.particles_of(host).all(|p| p.is_active));
}

#[test]
fn placement_shortfall_is_not_an_error() {
    let mut engine = engine();
    let host = engine.register_host(HostProfile::icon()).unwrap();
    let spawned = engine.spawn_batch(host, 500);
    assert!(spawned > 0 && spawned < 500);
    assert_eq!(engine.particles_of(host).count() as u32, spawned);
    assert_contained(&engine);
}

#[test]
fn apply_config_resets_with_new_seed_and_margins() {
    let mut engine = engine();
    let host = engine.on_host_added(HostProfile::primary()).unwrap();

    let mut config = EngineConfig::default();
    config.seed = 99;
    config.physics.margin = 6.0;
    engine.apply_config(config);

    assert_eq!(engine.host(host).unwrap().shape.margins().base, 6.0);
    assert!(engine.particles_of(host).count() > 0);
    assert_contained(&engine);

    let mut off = engine.config().clone();
    off.enabled = false;
    engine.apply_config(off);
    assert!(!engine.is_enabled());
    assert_eq!(engine.particle_count(), 0);
}

#[test]
fn unfit_size_classes_are_skipped() {
    let mut engine = engine();
    let mut profile = HostProfile::secondary();
    profile.size_classes.push(crate::domain::host::SizeClass { size: 40.0, weight: 100.0 });
    let host = engine.on_host_added(profile).unwrap();

    assert!(engine.particles_of(host).count() > 0);
    assert!(engine.particles_of(host).all(|p| p.size < 40.0));
}

#[test]
fn stale_host_id_from_other_generation_does_not_resolve() {
    let mut engine = engine();
    let a = engine.on_host_added(HostProfile::icon()).unwrap();
    engine.on_host_removed(a);
    let b = engine.on_host_added(HostProfile::icon()).unwrap();

    assert_eq!(a.index(), b.index());
    assert!(!engine.set_host_processing(a, true));
    assert!(engine.set_host_processing(b, true));
    assert_eq!(HostId::from_raw(b.to_raw()), b);
}

#[test]
fn zero_spacing_with_tiny_sizes_places_safely() {
    let mut config = EngineConfig::default();
    config.placement.spacing = 0.0;
    let mut engine = EngineCore::new(config);

    let mut tiny_only = HostProfile::primary();
    tiny_only.size_classes = vec![crate::domain::host::SizeClass { size: 1e-4, weight: 1.0 }];
    let empty = engine.on_host_added(tiny_only).unwrap();
    assert_eq!(engine.particles_of(empty).count(), 0);

    let mut mixed = HostProfile::icon();
    mixed.size_classes.push(crate::domain::host::SizeClass { size: 1e-4, weight: 50.0 });
    let host = engine.on_host_added(mixed).unwrap();
    assert!(engine.particles_of(host).count() > 0);
    assert!(engine.particles_of(host).all(|p| p.size >= crate::domain::host::MIN_PARTICLE_SIZE));
    assert_contained(&engine);
}

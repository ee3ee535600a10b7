// ABOUTME: End-to-end engine behavior driven by injected timestamps.
// ABOUTME: Draw calls are checked through the command-recording surface.

use std::ops::ControlFlow;

use glitch_core::{
    Color, ColorRole, Config, ProfileStyles, RecordingSurface, StyleResolver, SurfaceOp, Toggle,
    ToggleState,
};
use glitch_engine::{Command, Effect, FrameScheduler, GlitchEngine, ManualScheduler};
use glitch_layout::Side;

const CHAR_W: f32 = 5.0;

fn engine_with(toggles: ToggleState) -> GlitchEngine<RecordingSurface> {
    let config = Config {
        toggles,
        ..Config::default()
    };
    let mut engine = GlitchEngine::new(
        &config,
        RecordingSurface::new(CHAR_W),
        Box::new(ProfileStyles::default()),
        42,
    );
    engine.set_texts("AB\nCD", "X");
    engine.resize(400.0, 1.0);
    engine
}

fn base_only() -> ToggleState {
    ToggleState {
        glitch: false,
        statik: false,
        scan: false,
        swell: false,
        segments: false,
        orbit: false,
        fps: false,
        ..ToggleState::default()
    }
}

fn all_on() -> ToggleState {
    ToggleState {
        orbit: true,
        fps: true,
        ..ToggleState::default()
    }
}

fn texts(ops: &[SurfaceOp]) -> Vec<(String, f32, f32)> {
    ops.iter()
        .filter_map(|op| match op {
            SurfaceOp::FillText { text, x, y, .. } => Some((text.clone(), *x, *y)),
            _ => None,
        })
        .collect()
}

#[test]
fn two_line_scenario_builds_aligned_grids_and_atlas() {
    let engine = engine_with(base_only());
    let model = engine.model();
    assert_eq!((model.rows(), model.cols()), (2, 2));
    assert_eq!(model.row(Side::Left, 0), "AB");
    assert_eq!(model.row(Side::Left, 1), "CD");
    assert_eq!(model.row(Side::Right, 0), "X ");
    assert_eq!(model.row(Side::Right, 1), "  ");

    let row_h = engine.layout().row_height_px;
    let (_, atlas_h) = engine.atlas().css_size();
    assert!(engine.atlas().is_ready());
    assert!(atlas_h >= 2.0 * row_h + 4.0);
}

#[test]
fn base_text_lands_at_column_origins() {
    let mut engine = engine_with(base_only());
    let report = engine.frame(0.0);
    assert!(report.drew);

    let row_h = engine.layout().row_height_px;
    let drawn = texts(engine.surface().last_frame());
    assert_eq!(
        drawn,
        vec![
            ("AB".to_string(), 0.0, 0.0),
            ("CD".to_string(), 0.0, row_h),
            ("X ".to_string(), 200.0, 0.0),
            ("  ".to_string(), 200.0, row_h),
        ]
    );

    let base = ProfileStyles::default().color(ColorRole::TextBase);
    assert!(engine.surface().last_frame().iter().all(|op| match op {
        SurfaceOp::FillText { color, .. } => *color == base,
        _ => true,
    }));
}

#[test]
fn clean_frames_do_not_redraw() {
    let mut engine = engine_with(base_only());
    assert!(engine.frame(0.0).drew);
    for i in 1..20 {
        assert!(!engine.frame(i as f64 * 16.0).drew);
    }
    engine.handle(Command::CycleProfile(1), 400.0);
    assert!(engine.frame(416.0).drew);
    assert!(!engine.frame(432.0).drew);
}

#[test]
fn master_off_leaves_canvas_blank() {
    let mut engine = engine_with(all_on());
    let mut now = 0.0;
    for _ in 0..90 {
        engine.frame(now);
        now += 16.0;
    }

    engine.handle(Command::ToggleMaster, now);
    let report = engine.frame(now + 16.0);
    assert!(report.drew);
    assert_eq!(engine.surface().last_frame(), &[SurfaceOp::Clear]);

    for toggle in Toggle::ALL {
        engine.handle(Command::Toggle(toggle), now + 20.0);
        engine.frame(now + 32.0);
        assert_eq!(engine.surface().last_frame(), &[SurfaceOp::Clear]);
    }
}

#[test]
fn disabling_resets_every_effect() {
    let mut engine = engine_with(all_on());
    engine.set_texts(&"#### ####\n".repeat(30), &"@@@@@@@@@@\n".repeat(30));
    let mut now = 0.0;
    for _ in 0..240 {
        engine.frame(now);
        now += 16.0;
    }

    engine.handle(Command::ToggleMaster, now);
    for effect in engine.effects().iter() {
        assert!(!effect.is_running(), "{:?} still running", effect.toggle());
        assert!(effect.is_neutral(), "{:?} not neutral", effect.toggle());
    }
    assert_eq!(engine.effects().orbit.base_offset(Side::Left), (0.0, 0.0));
    assert_eq!(engine.effects().swell.scale(3), 1.0);
    assert_eq!(engine.effects().scan.shift_at(Side::Right, 3, now), 0.0);
    assert_eq!(engine.effects().segments.active_count(), 0);
    assert_eq!(engine.overlay_signals().static_opacity, 0.0);
}

#[test]
fn stopping_twice_changes_nothing() {
    let mut engine = engine_with(all_on());
    for i in 0..60 {
        engine.frame(i as f64 * 16.0);
    }
    for effect in engine.effects_mut().in_update_order() {
        effect.stop();
        assert!(effect.is_neutral());
        effect.stop();
        assert!(effect.is_neutral());
        assert!(!effect.is_running());
    }
}

#[test]
fn scan_freeze_skips_updates_and_drawing() {
    let mut engine = engine_with(ToggleState {
        scan: true,
        ..base_only()
    });
    engine.frame(0.0);
    engine.effects_mut().scan.arm_freeze(2);
    engine.request_render();

    let first = engine.frame(16.0);
    let second = engine.frame(32.0);
    assert!(first.frozen && !first.drew);
    assert!(second.frozen && !second.drew);
    assert!(engine.is_dirty());

    let third = engine.frame(48.0);
    assert!(!third.frozen);
    assert!(third.drew);
}

#[test]
fn scan_freeze_pauses_every_engine() {
    let mut engine = engine_with(ToggleState {
        scan: true,
        swell: true,
        segments: true,
        orbit: true,
        ..base_only()
    });
    let mut now = 0.0;
    for _ in 0..30 {
        engine.frame(now);
        now += 16.0;
    }
    engine.effects_mut().swell.bump(0, 3, 0.5);
    engine.effects_mut().scan.arm_freeze(2);

    let snapshot = |engine: &GlitchEngine<RecordingSurface>| {
        let effects = engine.effects();
        (
            effects.swell.scale(1),
            effects.orbit.drift(),
            effects.orbit.base_offset(Side::Left),
            effects.segments.segments(Side::Left).to_vec(),
            effects.segments.segments(Side::Right).to_vec(),
        )
    };
    let before = snapshot(&engine);
    assert!(before.0 > 1.4);
    assert!(engine.effects().segments.active_count() > 0);

    for _ in 0..2 {
        let report = engine.frame(now);
        now += 16.0;
        assert!(report.frozen && !report.drew);
        assert_eq!(snapshot(&engine), before);
    }

    let report = engine.frame(now);
    now += 16.0;
    assert!(!report.frozen);
    let after = snapshot(&engine);
    assert!(after.0 < before.0);
    assert_ne!(after.1, before.1);
    assert_ne!(after.2, before.2);

    let spawned = engine.effects().segments.active_count();
    for _ in 0..20 {
        engine.frame(now);
        now += 16.0;
    }
    assert!(engine.effects().segments.active_count() > spawned);
}

#[test]
fn oversized_text_keeps_running_without_atlas() {
    let mut engine = engine_with(all_on());
    let huge = vec!["x".repeat(300); 30_000].join("\n");
    engine.set_texts(&huge, "");
    engine.resize(1000.0, 3.0);

    assert!(engine.layout().is_ready());
    assert!(!engine.atlas().is_ready());

    let report = engine.frame(0.0);
    assert!(report.drew);
    engine.frame(16.0);
}

#[test]
fn row_shift_moves_only_that_row() {
    let mut engine = engine_with(ToggleState {
        scan: true,
        ..base_only()
    });
    engine.frame(0.0);
    engine
        .effects_mut()
        .scan
        .apply_shift(Side::Left, 1, -7.0, 10.0, 100.0);
    engine.request_render();
    engine.frame(16.0);

    let row_h = engine.layout().row_height_px;
    let drawn = texts(engine.surface().last_frame());
    assert!(drawn.contains(&("AB".to_string(), 0.0, 0.0)));
    assert!(drawn.contains(&("CD".to_string(), -7.0, row_h)));

    // Expired by the next redraw
    engine.request_render();
    engine.frame(200.0);
    let drawn = texts(engine.surface().last_frame());
    assert!(drawn.contains(&("CD".to_string(), 0.0, row_h)));
}

#[test]
fn swollen_rows_are_scaled_vertically_in_place() {
    let mut engine = engine_with(ToggleState {
        swell: true,
        ..base_only()
    });
    engine.set_texts("a\nb\nc", "");
    engine.frame(0.0);
    engine.effects_mut().swell.bump(0, 3, 0.5);
    engine.request_render();
    engine.frame(1.0);

    let row_h = engine.layout().row_height_px;
    let ops = engine.surface().last_frame();
    let translate = ops
        .iter()
        .position(|op| *op == SurfaceOp::Translate(0.0, row_h))
        .expect("row 1 is translated to its origin");
    assert_eq!(ops[translate - 1], SurfaceOp::Save);
    match &ops[translate + 1] {
        SurfaceOp::Scale(sx, sy) => {
            assert_eq!(*sx, 1.0);
            assert!(*sy > 1.4 && *sy <= 1.5);
        }
        other => panic!("expected scale, got {other:?}"),
    }
    match &ops[translate + 2] {
        SurfaceOp::FillText { text, x, y, .. } => {
            assert_eq!(text, "b");
            assert_eq!((*x, *y), (0.0, 0.0));
        }
        other => panic!("expected text, got {other:?}"),
    }
    assert_eq!(ops[translate + 3], SurfaceOp::Restore);
}

#[test]
fn segments_blit_from_atlas_over_base_text() {
    let mut engine = engine_with(ToggleState {
        segments: true,
        ..base_only()
    });
    engine.set_texts(&"#".repeat(60), &"%".repeat(60));

    let mut now = 0.0;
    for _ in 0..40 {
        engine.frame(now);
        now += 16.0;
    }

    let ops = engine.surface().last_frame();
    let blits: Vec<_> = ops
        .iter()
        .enumerate()
        .filter_map(|(i, op)| match op {
            SurfaceOp::DrawBitmap { src, dst, .. } => Some((i, *src, *dst)),
            _ => None,
        })
        .collect();
    assert!(!blits.is_empty());

    let atlas_size = engine.atlas().side(Side::Left).map(|a| (a.hot.width(), a.hot.height()));
    let row_h = engine.layout().row_height_px;
    for (i, src, dst) in &blits {
        assert_eq!(dst.y, -2.0, "single row sits at y 0 minus top pad");
        assert!((dst.height - (row_h + 4.0)).abs() < 1e-4);
        assert_eq!(src.y, 0);
        assert!(dst.x == src.x as f32 || dst.x == 200.0 + src.x as f32);
        let (w, _) = atlas_size.expect("atlas ready");
        assert!(src.x + src.width <= w);

        // Dim blits are preceded by a black darkening rectangle
        if let SurfaceOp::Restore = ops[*i - 1] {
            match &ops[*i - 2] {
                SurfaceOp::FillRect { rect, color } => {
                    assert_eq!(*color, Color::BLACK);
                    assert_eq!(rect, dst);
                }
                other => panic!("expected darkening rect, got {other:?}"),
            }
        }
    }
}

#[test]
fn profile_cycle_wraps_and_rebuilds_atlas() {
    let mut engine = engine_with(base_only());
    let rebuilds = engine.atlas().rebuilds();

    for step in 1..=4 {
        engine.handle(Command::CycleProfile(1), step as f64);
    }
    assert_eq!(engine.toggles().profile_index, 0);
    assert_eq!(engine.atlas().rebuilds(), rebuilds + 4);

    engine.handle(Command::CycleProfile(-1), 10.0);
    assert_eq!(engine.toggles().profile_index, 3);
    assert_eq!(engine.styles().active_profile(), 3);
    assert_eq!(engine.profile_name(), "blue");

    let readout = engine.hud_readout(10.0).expect("hud shown after change");
    assert!(readout.text.contains("PROFILE   : BLUE"));
}

#[test]
fn overlay_signals_follow_toggles() {
    let mut engine = engine_with(ToggleState::default());
    let signals = engine.overlay_signals();
    assert!(signals.glitch_visible);
    assert!(signals.static_visible);
    assert_eq!(signals.static_opacity, 0.05);
    assert!(signals.scanlines_visible);
    assert!(!signals.fps_visible);

    engine.handle(Command::Toggle(Toggle::GlitchOverlay), 0.0);
    engine.handle(Command::Toggle(Toggle::FpsCounter), 0.0);
    let signals = engine.overlay_signals();
    assert!(!signals.glitch_visible);
    assert!(signals.fps_visible);

    engine.handle(Command::ToggleMaster, 0.0);
    let signals = engine.overlay_signals();
    assert!(!signals.static_visible && !signals.scanlines_visible && !signals.fps_visible);
}

#[test]
fn hud_fades_after_last_change() {
    let mut engine = engine_with(base_only());
    engine.handle(Command::Toggle(Toggle::Orbit), 5000.0);
    assert_eq!(engine.hud_readout(6000.0).map(|r| r.opacity), Some(1.0));
    assert!(engine.hud_readout(7500.0).is_some_and(|r| r.opacity < 1.0));
    assert!(engine.hud_readout(8000.0).is_none());
}

#[test]
fn manual_scheduler_drives_fps_readout() {
    let mut engine = engine_with(ToggleState {
        fps: true,
        ..base_only()
    });
    let mut scheduler = ManualScheduler::fixed_rate(0.0, 1000.0 / 60.0, 120);
    let mut published = Vec::new();
    scheduler.run_forever(&mut |now: f64| {
        if let Some(fps) = engine.frame(now).fps {
            published.push(fps);
        }
        ControlFlow::Continue(())
    });
    // The opening window also counts the zero-length first frame
    assert!(published.contains(&60));
    assert_eq!(engine.fps_label().as_deref(), Some("FPS: 60"));
}

#[test]
fn unsized_container_degrades_quietly() {
    let config = Config::default();
    let mut engine = GlitchEngine::new(
        &config,
        RecordingSurface::new(CHAR_W),
        Box::new(ProfileStyles::default()),
        1,
    );
    engine.set_texts("hello\nworld", "");
    assert!(!engine.layout().is_ready());
    assert!(!engine.atlas().is_ready());
    for i in 0..30 {
        engine.frame(i as f64 * 16.0);
    }
    assert_eq!(engine.effects().segments.active_count(), 0);

    engine.resize(300.0, 2.0);
    assert!(engine.atlas().is_ready());
}

use hydration_reminder::animation::EffectKind;
use hydration_reminder::config_file::ReminderConfig;
use hydration_reminder::geometry::{Extent, Rect};
use hydration_reminder::monitor::{self, Anchor, Monitor, MonitorSelector, StaticMonitors};
use hydration_reminder::overlay::{LifecycleState, OverlayController};
use hydration_reminder::scheduler::ReminderScheduler;
use hydration_reminder::sprite::DirectoryAssets;
use hydration_reminder::surface::{RecordingSurface, SurfaceEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use LifecycleState::*;

fn controller(cfg: ReminderConfig, monitors: StaticMonitors) -> OverlayController<RecordingSurface> {
    OverlayController::new(
        cfg,
        RecordingSurface::new(),
        Box::new(monitors),
        Box::new(DirectoryAssets::default()),
        ReminderScheduler::with_rng(StdRng::seed_from_u64(42)),
    )
}

fn base_config(effect: EffectKind) -> ReminderConfig {
    ReminderConfig {
        entry_animation: effect,
        auto_hide_ms: 15_000,
        show_preview_on_launch: false,
        asset_directory: PathBuf::from("/nonexistent/hydration-assets"),
        ..ReminderConfig::default()
    }
}

/// Fire every timer due up to `end`, returning the instant of the last fire
fn advance(c: &mut OverlayController<RecordingSurface>, mut now: Instant, end: Instant) -> Instant {
    while let Some(deadline) = c.next_deadline() {
        if deadline > end {
            break;
        }
        now = deadline.max(now);
        c.tick(now);
    }
    now
}

fn exit_duration(effect: EffectKind) -> Duration {
    match effect {
        EffectKind::Fade => Duration::from_millis(200),
        EffectKind::Slide => Duration::from_millis(240),
        EffectKind::Pop => Duration::from_millis(200),
        EffectKind::None => Duration::ZERO,
    }
}

#[test]
fn test_auto_hide_runs_full_cycle_for_every_effect() {
    for effect in EffectKind::ALL {
        let t0 = Instant::now();
        let mut c = controller(base_config(effect), StaticMonitors::single(1920, 1080));
        c.start(t0);
        c.show_now(t0);

        let hide_at = t0 + Duration::from_millis(15_000);
        advance(&mut c, t0, hide_at - Duration::from_millis(1));
        assert_eq!(c.state(), Visible, "{effect}: visible before auto-hide");

        advance(&mut c, t0, hide_at);
        let expected = if effect == EffectKind::None { Idle } else { Hiding };
        assert_eq!(c.state(), expected, "{effect}: state right after auto-hide");

        let idle_at = hide_at + exit_duration(effect);
        if effect != EffectKind::None {
            advance(&mut c, hide_at, idle_at - Duration::from_millis(1));
            assert_eq!(c.state(), Hiding, "{effect}: still hiding before exit ends");
        }
        advance(&mut c, hide_at, idle_at);
        assert_eq!(c.state(), Idle, "{effect}: idle once exit completes");

        let transitions = c.surface().transitions();
        let hides = transitions
            .iter()
            .filter(|&&t| t == (Visible, Hiding))
            .count();
        assert_eq!(hides, 1, "{effect}: exactly one Visible -> Hiding");
        assert_eq!(
            transitions,
            vec![(Idle, Entering), (Entering, Visible), (Visible, Hiding), (Hiding, Idle)],
            "{effect}"
        );

        // A manual show leaves the pending schedule untouched
        assert_eq!(c.fires_at(), Some(t0 + Duration::from_secs(45 * 60)));
    }
}

#[test]
fn test_raise_topmost_once_per_show() {
    let t0 = Instant::now();
    let mut c = controller(base_config(EffectKind::Fade), StaticMonitors::single(1920, 1080));
    c.start(t0);

    c.show_now(t0);
    advance(&mut c, t0, t0 + Duration::from_secs(16));
    c.show_now(t0 + Duration::from_secs(20));

    assert_eq!(c.surface().count(&SurfaceEvent::Raise), 2);
    assert_eq!(c.surface().count(&SurfaceEvent::Show), 2);
    assert_eq!(c.surface().count(&SurfaceEvent::Hide), 1);
}

#[test]
fn test_dismissal_rearms_immediately_and_once() {
    let t0 = Instant::now();
    let cfg = ReminderConfig {
        reminder_interval_ms: 5 * 60 * 1000,
        random_offset_ms: 30_000,
        ..base_config(EffectKind::Fade)
    };
    let mut c = controller(cfg, StaticMonitors::single(1920, 1080));
    c.start(t0);
    c.show_now(t0);
    advance(&mut c, t0, t0 + Duration::from_secs(3));

    let dismissed_at = t0 + Duration::from_secs(3);
    c.dismiss(dismissed_at);
    let fires_at = c.fires_at().expect("armed on dismissal");
    assert!(fires_at >= dismissed_at + Duration::from_secs(300));
    assert!(fires_at <= dismissed_at + Duration::from_secs(330));

    advance(&mut c, dismissed_at, dismissed_at + Duration::from_secs(1));
    assert_eq!(c.state(), Idle);
    assert_eq!(c.fires_at(), Some(fires_at), "exit completion keeps the dismissal schedule");

    // A second dismiss in Idle changes nothing
    c.dismiss(dismissed_at + Duration::from_secs(2));
    assert_eq!(c.fires_at(), Some(fires_at));
}

#[test]
fn test_reminder_cycles_repeat() {
    let t0 = Instant::now();
    let cfg = ReminderConfig {
        reminder_interval_ms: 60_000,
        auto_hide_ms: 2_000,
        ..base_config(EffectKind::None)
    };
    let mut c = controller(cfg, StaticMonitors::single(1920, 1080));
    c.start(t0);

    advance(&mut c, t0, t0 + Duration::from_secs(60 * 5 + 30));
    // Each cycle lasts interval + auto-hide, so five fits in 5.5 minutes
    assert_eq!(c.shows(), 5);
}

#[test]
fn test_overlay_lands_on_named_monitor() {
    let t0 = Instant::now();
    let monitors = StaticMonitors::new(vec![
        Monitor::new("left", Rect::new(0, 0, 1920, 1080)),
        Monitor::new("right", Rect::new(1920, 0, 2560, 1440)),
    ])
    .with_pointer_on(0);
    let cfg = ReminderConfig {
        monitor_id: MonitorSelector::parse("right"),
        ..base_config(EffectKind::None)
    };
    let mut c = controller(cfg, monitors);
    c.start(t0);
    c.show_now(t0);

    assert_eq!(c.surface().geometry, Some(Rect::new(1920 + 2560 - 360 - 16, 1440 - 180 - 16, 360, 180)));
}

#[test]
fn test_resolve_scenario() {
    let screen = Rect::new(0, 0, 1920, 1080);
    let pos = monitor::resolve(&screen, Extent::new(360, 180), Anchor::BottomRight, 16, 16);
    assert_eq!(pos, (1544, 884));
}

#[test]
fn test_resolve_stays_on_screen() {
    let screens = [
        Rect::new(0, 0, 1920, 1080),
        Rect::new(-1280, 200, 1280, 1024),
        Rect::new(1920, -300, 800, 600),
    ];
    let overlays = [Extent::new(360, 180), Extent::new(900, 700), Extent::new(180, 120)];
    let margins = [0, 16, 500, 5000];

    for screen in &screens {
        for &overlay in &overlays {
            for anchor in Anchor::ALL {
                for &margin in &margins {
                    let (x, y) = monitor::resolve(screen, overlay, anchor, margin, margin);
                    let max_x = (screen.x + screen.width as i32 - overlay.width as i32).max(screen.x);
                    let max_y = (screen.y + screen.height as i32 - overlay.height as i32).max(screen.y);
                    assert!(
                        (screen.x..=max_x).contains(&x) && (screen.y..=max_y).contains(&y),
                        "{:?} {:?} {} margin {} -> ({}, {})",
                        screen,
                        overlay,
                        anchor,
                        margin,
                        x,
                        y
                    );
                }
            }
        }
    }
}

#[test]
fn test_jitter_stays_within_ceiling() {
    let mut scheduler = ReminderScheduler::with_rng(StdRng::seed_from_u64(99));
    let interval = Duration::from_secs(60);
    let ceiling = Duration::from_secs(30);
    let now = Instant::now();

    for _ in 0..500 {
        let fires_at = scheduler.arm(now, interval, ceiling);
        assert!(fires_at >= now + interval);
        assert!(fires_at <= now + interval + ceiling);
    }
    assert_eq!(scheduler.arm(now, interval, Duration::ZERO), now + interval);
}

// Hydration Reminder CLI - runs the reminder engine in the terminal
// Reminders are delivered as desktop notifications; stdin accepts commands

use anyhow::{Context, Result};
use clap::Parser;
use hydration_reminder::animation::EffectKind;
use hydration_reminder::config_file::ReminderConfig;
use hydration_reminder::constants::{
    JITTER_MAX_SECONDS, OPACITY_MAX, OPACITY_MIN, OVERLAY_HEIGHT_MIN_PX, OVERLAY_WIDTH_MIN_PX,
};
use hydration_reminder::geometry::Rect;
use hydration_reminder::monitor::{Anchor, Monitor, MonitorSelector, StaticMonitors};
use hydration_reminder::overlay::OverlayController;
use hydration_reminder::scheduler::ReminderScheduler;
use hydration_reminder::sprite::DirectoryAssets;
use hydration_reminder::surface::NotificationSurface;
use hydration_reminder::{config, ReminderCore, ReminderHandle};
use log::{info, warn};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

/// Periodic hydration reminder with jittered scheduling
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Periodic hydration reminder with jittered scheduling",
    long_about = "Shows a short hydration reminder every few minutes, hides it again after a
configurable delay and re-arms itself with optional random jitter.

Settings are read from config.toml in the platform config directory
(e.g. ~/.config/hydration-reminder/config.toml), then overridden by the
HYDRATION_* environment variables, then by the flags below. The effective
configuration is written back on start.

COMMANDS (type on stdin while running):
  show      Show the reminder now
  dismiss   Dismiss the reminder and restart the schedule
  status    Print state and time until the next reminder
  reload    Re-read config.toml and apply it
  quit      Exit"
)]
struct Args {
    /// Reminder interval in minutes (minimum 1)
    #[arg(long)]
    interval: Option<f64>,

    /// Auto-hide delay in seconds (minimum 1)
    #[arg(long)]
    autohide: Option<f64>,

    /// Sprite animation interval in seconds (minimum 0.05)
    #[arg(long)]
    animation_speed: Option<f64>,

    /// Skip the initial preview reminder
    #[arg(long)]
    no_preview: bool,

    /// Screen corner to anchor the overlay to
    #[arg(long, value_name = "CORNER")]
    position: Option<Anchor>,

    /// Horizontal margin from the screen edge in pixels
    #[arg(long)]
    margin_x: Option<u32>,

    /// Vertical margin from the screen edge in pixels
    #[arg(long)]
    margin_y: Option<u32>,

    /// Random delay ceiling in seconds added to each interval (maximum 3600)
    #[arg(long)]
    random: Option<u64>,

    /// Overlay width in pixels (minimum 180)
    #[arg(long)]
    width: Option<u32>,

    /// Overlay height in pixels (minimum 120)
    #[arg(long)]
    height: Option<u32>,

    /// Overlay opacity 0.1-1.0
    #[arg(long)]
    opacity: Option<f64>,

    /// Monitor name to force the overlay onto ("auto" follows the pointer)
    #[arg(long)]
    monitor: Option<String>,

    /// Entry/exit effect: fade, slide, pop or none
    #[arg(long, value_name = "EFFECT")]
    entry_animation: Option<EffectKind>,

    /// Screen layout as WxH, repeat for more monitors (placed left to right)
    #[arg(long, value_name = "WxH", value_parser = parse_screen)]
    screen: Vec<(u32, u32)>,

    /// Movie played when the asset directory has no usable files
    #[arg(long, value_name = "PATH")]
    fallback_movie: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_screen(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{}'", value))?;
    let w = w.parse::<u32>().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h = h.parse::<u32>().map_err(|e| format!("bad height '{}': {}", h, e))?;
    if w == 0 || h == 0 {
        return Err("screen extent must be nonzero".to_string());
    }
    Ok((w, h))
}

/// Apply command-line overrides, clamped the same way the settings form would
fn apply_cli_overrides(mut cfg: ReminderConfig, args: &Args) -> ReminderConfig {
    if let Some(minutes) = args.interval {
        cfg.reminder_interval_ms = (minutes.max(1.0) * 60_000.0) as u64;
    }
    if let Some(seconds) = args.autohide {
        cfg.auto_hide_ms = (seconds.max(1.0) * 1000.0) as u64;
    }
    if let Some(seconds) = args.animation_speed {
        cfg.animation_interval_ms = (seconds.max(0.05) * 1000.0) as u64;
    }
    if args.no_preview {
        cfg.show_preview_on_launch = false;
    }
    if let Some(anchor) = args.position {
        cfg.position = anchor;
    }
    if let Some(margin) = args.margin_x {
        cfg.margin_x = margin;
    }
    if let Some(margin) = args.margin_y {
        cfg.margin_y = margin;
    }
    if let Some(seconds) = args.random {
        cfg.random_offset_ms = seconds.min(JITTER_MAX_SECONDS) * 1000;
    }
    if let Some(width) = args.width {
        cfg.overlay_width = width.max(OVERLAY_WIDTH_MIN_PX);
    }
    if let Some(height) = args.height {
        cfg.overlay_height = height.max(OVERLAY_HEIGHT_MIN_PX);
    }
    if let Some(opacity) = args.opacity {
        cfg.overlay_opacity = opacity.clamp(OPACITY_MIN, OPACITY_MAX);
    }
    if let Some(ref name) = args.monitor {
        cfg.monitor_id = MonitorSelector::parse(name);
    }
    if let Some(effect) = args.entry_animation {
        cfg.entry_animation = effect;
    }
    cfg
}

fn monitors_from_args(screens: &[(u32, u32)]) -> StaticMonitors {
    let mut x = 0i32;
    let monitors = screens
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            let monitor = Monitor::new(format!("display-{}", i + 1), Rect::new(x, 0, w, h));
            x = x.saturating_add(i32::try_from(w).unwrap_or(i32::MAX));
            monitor
        })
        .collect();
    StaticMonitors::new(monitors)
}

/// Read commands from stdin until EOF or quit
fn run_command_reader(handle: ReminderHandle, config_path: PathBuf) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read command: {}", e);
                break;
            }
        };

        let result = match line.trim() {
            "" => Ok(()),
            "show" => handle.show_now(),
            "dismiss" => handle.dismiss(),
            "status" => {
                let now = Instant::now();
                println!(
                    "state: {}, next reminder in {}, shown {} times",
                    handle.lifecycle(),
                    handle.countdown_text(now),
                    handle.shows()
                );
                Ok(())
            }
            "reload" => ReminderConfig::load_from_path(&config_path)
                .map(config::apply_env_overrides)
                .and_then(|cfg| handle.apply_config(cfg)),
            "quit" | "exit" => {
                let _ = handle.quit();
                break;
            }
            other => {
                println!("Unknown command '{}'. Try show, dismiss, status, reload or quit.", other);
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!("Command failed: {:#}", e);
        }
    }
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logger (RUST_LOG overrides the default level)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Load configuration (precedence: CLI arg > env var > config file)
    let config_path = ReminderConfig::config_path();
    let (file_cfg, first_run) = ReminderConfig::load_or_default(&config_path);
    if first_run {
        info!("First run, a default configuration will be created");
    }
    let cfg = apply_cli_overrides(config::apply_env_overrides(file_cfg), &args).sanitized();

    if args.print_config {
        let rendered = toml::to_string_pretty(&cfg).context("Failed to render configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    if let Err(e) = cfg.save_to_path(&config_path) {
        warn!("Could not save configuration: {:#}", e);
    }

    info!(
        "Starting Hydration Reminder: every {}, {} effect, anchored {}",
        hydration_reminder::utils::format_interval(cfg.reminder_interval_ms),
        cfg.entry_animation,
        cfg.position
    );

    let controller = OverlayController::new(
        cfg,
        NotificationSurface::new("Hydration Reminder"),
        Box::new(monitors_from_args(&args.screen)),
        Box::new(DirectoryAssets::new(args.fallback_movie.clone())),
        ReminderScheduler::from_entropy(),
    );
    let mut core = ReminderCore::new(controller);

    let handle = core.handle();
    thread::Builder::new()
        .name("command-reader".to_string())
        .spawn(move || run_command_reader(handle, config_path))
        .context("Failed to start command reader")?;

    info!("Hydration Reminder is running - type 'quit' or press Ctrl+C to exit");
    core.run();

    info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(argv: &[&str]) -> ReminderConfig {
        let args = Args::try_parse_from(argv).unwrap();
        apply_cli_overrides(ReminderConfig::default(), &args)
    }

    #[test]
    fn test_random_is_capped() {
        let cfg = overrides(&["hydration-reminder", "--random", "18446744073709551615"]);
        assert_eq!(cfg.random_offset_ms, JITTER_MAX_SECONDS * 1000);

        let cfg = overrides(&["hydration-reminder", "--random", "90"]);
        assert_eq!(cfg.random_offset_ms, 90_000);
    }

    #[test]
    fn test_interval_and_autohide_floors() {
        let cfg = overrides(&["hydration-reminder", "--interval", "0.2", "--autohide", "0"]);
        assert_eq!(cfg.reminder_interval_ms, 60_000);
        assert_eq!(cfg.auto_hide_ms, 1000);
    }

    #[test]
    fn test_parse_screen() {
        assert_eq!(parse_screen("2560x1440"), Ok((2560, 1440)));
        assert!(parse_screen("0x100").is_err());
        assert!(parse_screen("wide").is_err());
    }
}

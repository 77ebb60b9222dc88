mod console;

use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{select, tick, unbounded};
use sysinfo::System;

use region_sounds::config::{Settings, SOUNDS_FILE};
use region_sounds::geometry::{Location, WorldId};
use region_sounds::playback::LoggingAudioHost;
use region_sounds::region::{JsonRegionStore, RegionRegistry};
use region_sounds::trigger::{Trigger, TriggerEvent};
use region_sounds::{AppResult, SoundDispatcher};

use console::{Console, Flow};

const LOG_TARGET_STARTUP: &str = "region_sounds::startup";

fn initialize_tracing(default_filter: &str) {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join(region_sounds::config::APP_DIR_NAME).join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "region-sounds.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    // In debug builds, also log to the console
    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());
    let architecture = std::env::consts::ARCH;

    tracing::info!(target: LOG_TARGET_STARTUP, "Starting Region Sounds v{} on ({})", version, architecture);
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
}

fn main() -> AppResult<()> {
    println!("===========================================");
    println!("  Region Sounds - Trigger Sound Dispatcher");
    println!("===========================================\n");

    let settings_dir = Settings::config_dir().context("Failed to locate the config directory")?;
    let settings = match Settings::load_from(&settings_dir) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("✗ Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    initialize_tracing(&settings.log_filter);
    log_runtime_environment();

    let data_dir = settings.data_path(&settings_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data folder {}", data_dir.display()))?;

    println!("✓ Configuration loaded");
    println!("  Data folder: {}", data_dir.display());
    println!("  Tick: {}ms\n", settings.tick_ms);

    if !data_dir.join(SOUNDS_FILE).exists() {
        println!("  No {} yet, every trigger is idle", SOUNDS_FILE);
    }

    let registry = Arc::new(RegionRegistry::new());
    let dispatcher = Arc::new(SoundDispatcher::new(Arc::new(LoggingAudioHost::new()), registry));
    let console = Console::new(
        Arc::clone(&dispatcher),
        JsonRegionStore::new(settings.regions_path(&settings_dir)),
        data_dir,
    );
    console.reload();

    println!(
        "✓ {} region(s), {} listening trigger(s)",
        dispatcher.regions().len(),
        dispatcher.listeners().listening().len()
    );

    let spawn = Location::new(WorldId::new("world"), 0.0, 64.0, 0.0);
    dispatcher.dispatch(&TriggerEvent::new(Trigger::ServerStart, spawn));

    let (line_tx, line_rx) = unbounded::<String>();
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("Failed to spawn the console input thread")?;

    println!("\nType 'help' for commands.\n");

    let ticker = tick(Duration::from_millis(settings.tick_ms));
    loop {
        select! {
            recv(ticker) -> _ => {
                dispatcher.advance();
            }
            recv(line_rx) -> line => {
                let Ok(line) = line else {
                    tracing::info!("Console input closed");
                    break;
                };
                match console.execute(&line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => eprintln!("✗ {:#}", e),
                }
            }
        }
    }

    tracing::info!("Shutting down with {} pending sound(s)", dispatcher.pending());
    println!("✓ Stopped");
    Ok(())
}

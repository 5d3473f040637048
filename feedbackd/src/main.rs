//! Daemon entry point: CLI parsing, logging init, and the bootstrap
//! sequence that wires `feedbackd-core`'s `Orchestrator` to the D-Bus
//! transport on a single-threaded `LocalSet` (§4.9).

mod cli;

use std::cell::RefCell;
use std::fs::File;
use std::rc::Rc;

use feedbackd_core::config::Settings;
use feedbackd_core::device::Devices;
use feedbackd_core::orchestrator::Orchestrator;
use feedbackd_core::theme::ThemeStore;

use cli::ParsedArgs;

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let log_path = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("feedbackd")
        .join("feedbackd.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = File::create(&log_path)
        .unwrap_or_else(|_| File::create("/tmp/feedbackd.log").expect("cannot create log file"));

    WriteLogger::init(log_level, Config::default(), log_file).expect("failed to initialize logger");

    log::info!("feedbackd starting (log level: {:?})", log_level);
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match cli::parse(&args) {
        ParsedArgs::Run(cli) => cli,
        ParsedArgs::PrintVersionAndExit => {
            println!("feedbackd {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        ParsedArgs::UnrecognizedFlag(flag) => {
            eprintln!("feedbackd: unrecognized flag '{}'", flag);
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose);

    let settings = Settings::load();
    let theme = match ThemeStore::load() {
        Ok(theme) => theme,
        Err(e) => {
            log::error!(target: "orchestrator", "no usable theme found, cannot start: {}", e);
            eprintln!("feedbackd: {}", e);
            std::process::exit(1);
        }
    };
    let devices = Devices::discover();
    let orchestrator = Rc::new(RefCell::new(Orchestrator::new(settings, theme, devices)));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");
    let local = tokio::task::LocalSet::new();

    local.block_on(&runtime, async move {
        spawn_reload_watcher(orchestrator.clone());

        let shutdown = async {
            let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            let mut int = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
                .expect("failed to install SIGINT handler");
            tokio::select! {
                _ = term.recv() => log::info!(target: "orchestrator", "received SIGTERM"),
                _ = int.recv() => log::info!(target: "orchestrator", "received SIGINT"),
            }
        };

        if let Err(e) = feedbackd_bus::run(orchestrator, cli.replace, shutdown).await {
            log::error!(target: "orchestrator", "bus service exited with error: {}", e);
            eprintln!("feedbackd: {}", e);
            std::process::exit(1);
        }
    });

    Ok(())
}

/// SIGHUP reloads the active theme in place; in-flight events are
/// unaffected since they already hold their own `Feedback` instances.
fn spawn_reload_watcher(orchestrator: Rc<RefCell<Orchestrator>>) {
    tokio::task::spawn_local(async move {
        let mut hup = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup()) {
            Ok(h) => h,
            Err(e) => {
                log::warn!(target: "orchestrator", "could not install SIGHUP handler: {}", e);
                return;
            }
        };
        loop {
            hup.recv().await;
            log::info!(target: "orchestrator", "SIGHUP received, reloading theme");
            if let Err(e) = orchestrator.borrow_mut().reload_theme() {
                log::warn!(target: "orchestrator", "theme reload failed, keeping previous theme: {}", e);
            }
        }
    });
}

use clap::Parser;
use std::error::Error;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use photobooth::booth::{Booth, Collaborators};
use photobooth::bridge::{
    event_queue, spawn_listener, BoothEvent, MailDispatcher, DEFAULT_QUEUE_CAPACITY,
};
use photobooth::camera::{CameraDriver, GphotoCamera};
use photobooth::cli::Args;
use photobooth::compositor::{StripCompositor, StripTemplate};
use photobooth::config::{BoothConfig, ConfigError, SMTP_PASSWORD_ENV};
use photobooth::event_loop;
use photobooth::permissions;
use photobooth::session::FileNaming;
use photobooth::terminal::{console_prompt, TerminalRenderer};

/// How long queued strip emails may keep the process alive after quitting.
const MAIL_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Load .env file so the SMTP password can live next to the booth.
///
/// Does not override existing environment variables.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

/// Route `log` records through a tracing fmt subscriber on stderr.
///
/// Defaults to `info`; override with `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_template(config: &BoothConfig) -> Result<StripTemplate, ConfigError> {
    let slot_size = config
        .template
        .slot_dimensions()
        .map_err(|e| ConfigError::Invalid(format!("template.slot_size: {}", e)))?;
    let slots = StripTemplate::uniform_slots(&config.template.slots, slot_size);
    StripTemplate::load(&config.template.path, slots, config.template.rotation).map_err(|e| {
        ConfigError::Template {
            path: config.template.path.clone(),
            source: e,
        }
    })
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = BoothConfig::load(None)?;
    if let Some(serial) = args.serial {
        config.serial.device = serial;
    }

    permissions::check_preview_dir(&config)?;
    permissions::ensure_store_dir(&config)?;
    let template = load_template(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("mailer")
        .build()?;

    let (events, receiver) = event_queue(DEFAULT_QUEUE_CAPACITY);
    let quit = events.clone();
    ctrlc::set_handler(move || {
        quit.post(BoothEvent::Quit);
    })?;
    if let Err(e) = spawn_listener(config.serial.device.clone(), config.serial.baud_rate, events) {
        log::error!("Could not start serial listener: {}", e);
    }

    let mut camera = GphotoCamera::new(&config.camera.gphoto_binary, &config.preview_path);
    if let Err(e) = camera.capture_preview() {
        log::warn!("Camera preview not available yet: {}", e);
    }

    let naming = FileNaming::new(
        &config.store_dir,
        &config.save_prefix,
        &config.strip_suffix,
        process::id(),
    );
    let mailer = MailDispatcher::new(
        config.mail.clone(),
        std::env::var(SMTP_PASSWORD_ENV).ok(),
        runtime.handle().clone(),
    );
    let parts = Collaborators {
        camera: Box::new(camera),
        prompt: Box::new(console_prompt()),
        mailer: Box::new(mailer),
    };
    let mut booth = Booth::new(&config, StripCompositor::new(template), naming, parts);

    let mut renderer = TerminalRenderer::new()?;
    let result = event_loop::run(&mut booth, &mut renderer, &receiver);
    // Restore the terminal before anything else is printed
    drop(renderer);

    log::info!("Waiting for outstanding emails");
    runtime.shutdown_timeout(MAIL_DRAIN_TIMEOUT);
    result?;
    Ok(())
}

fn main() {
    // Load .env file before anything else
    load_env();
    init_logging();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

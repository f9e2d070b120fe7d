//! `pbooth` - CLI for photobooth
//!
//! This binary lists filters, filters image files and takes snapshots from the
//! built-in test-pattern camera.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use chrono::Utc;
use clap::Parser;
use tracing::info;

use photobooth::cli::{ApplyCommand, Cli, Command, ConfigCommand, SnapshotCommand};
use photobooth::device::pattern::PatternCamera;
use photobooth::encoder::NoEncoder;
use photobooth::export::{decode_photo, export_photo};
use photobooth::{
    apply_filter, init_logging, ArtifactSink, CaptureSession, Config, DirectorySink, FacingMode,
    FilterKind,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Filters(filters_cmd) => handle_filters(filters_cmd.json),
        Command::Apply(apply_cmd) => handle_apply(&apply_cmd),
        Command::Snapshot(snapshot_cmd) => handle_snapshot(&config, snapshot_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn handle_filters(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let filters: Vec<_> = FilterKind::ALL
            .iter()
            .map(|kind| {
                serde_json::json!({
                    "name": kind.name(),
                    "label": kind.label(),
                    "spatial": kind.is_spatial(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&filters)?);
    } else {
        for kind in FilterKind::ALL {
            println!("{:<12} {}", kind.name(), kind.label());
        }
    }
    Ok(())
}

fn handle_apply(cmd: &ApplyCommand) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&cmd.input)?;
    let mut frame = decode_photo(&bytes)?;
    if cmd.mirror {
        frame = frame.mirrored();
    }
    apply_filter(&mut frame, cmd.filter);

    let artifact = export_photo(&frame, Utc::now())?;
    std::fs::write(&cmd.output, &artifact.bytes)?;
    info!(
        input = %cmd.input.display(),
        output = %cmd.output.display(),
        filter = %cmd.filter,
        "Image filtered"
    );
    println!(
        "{} -> {} ({}x{}, {})",
        cmd.input.display(),
        cmd.output.display(),
        frame.width(),
        frame.height(),
        cmd.filter
    );
    Ok(())
}

fn handle_snapshot(config: &Config, cmd: SnapshotCommand) -> Result<(), Box<dyn std::error::Error>> {
    let facing = cmd.facing.map_or(config.camera.facing_mode, FacingMode::from);
    let filter = cmd.filter.unwrap_or(config.filter.default);
    let output_dir = cmd.output_dir.unwrap_or_else(|| config.output_dir());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let path = runtime.block_on(async {
        let camera = PatternCamera::new().with_pattern(cmd.pattern.into());
        let mut session = CaptureSession::new(camera, NoEncoder, config);
        session.set_filter(filter);
        session.open(facing, false).await?;

        let artifact = session.take_photo()?;
        session.close();

        DirectorySink::new(&output_dir).deliver(&artifact)
    })?;

    println!("{}", path.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Camera]");
                println!("  Facing mode:        {}", config.camera.facing_mode);
                println!("  Audio:              {}", config.camera.audio_enabled);
                println!(
                    "  Ideal resolution:   {}x{}",
                    config.camera.ideal_width, config.camera.ideal_height
                );
                println!(
                    "  Echo cancellation:  {}",
                    config.camera.echo_cancellation
                );
                println!();
                println!("[Recording]");
                println!(
                    "  Formats:            {}",
                    config.recording.codec_preferences.join(" | ")
                );
                println!("  Timeslice (ms):     {}", config.recording.timeslice_ms);
                println!("  Tick (ms):          {}", config.recording.tick_interval_ms);
                println!();
                println!("[Filter]");
                println!("  Default:            {}", config.filter.default);
                println!();
                println!("[Export]");
                println!("  Output directory:   {}", config.output_dir().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

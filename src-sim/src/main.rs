//! Hotspot Simulator
//!
//! Walks a virtual observer toward the first hotspot, lets the media play
//! through (or exits early on request) and prints the final session snapshot.
//!
//! Run with: `RUST_LOG=hotspot=debug cargo run -p hotspot_sim -- --help`

mod collaborators;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use hotspot_core::{
    AudioChannel, ChannelGroup, CrossfadeEngine, ExperienceConfig, FrameScheduler,
    HasAudioChannel, ObserverSample, Point3, SessionEvent, SessionMode, TransitionOrchestrator,
    VirtualResource,
};
use tokio::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hotspot-sim")]
#[command(about = "Headless walk-through of an exploration/media session")]
#[command(version)]
struct Cli {
    /// Experience config (default: platform config dir, else built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective config to this path and continue
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Distance from the hotspot where the walk starts
    #[arg(long, default_value = "8.0")]
    start_distance: f32,

    /// Walking speed in scene units per second
    #[arg(long, default_value = "2.0")]
    walk_speed: f32,

    /// How long the media plays before it ends on its own
    #[arg(long, default_value = "4")]
    media_secs: u64,

    /// Press the exit button this many seconds into the media instead
    #[arg(long)]
    exit_after_secs: Option<u64>,

    /// Report an immersive session for the whole run
    #[arg(long)]
    immersive: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hotspot=debug")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExperienceConfig::load_from(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ExperienceConfig::load(),
    };
    if let Some(path) = &cli.save_config {
        config.save_to(path)?;
    }
    let Some(hotspot) = config.hotspots.first().cloned() else {
        bail!("config has no hotspots to walk to");
    };
    if cli.walk_speed <= 0.0 {
        bail!("walk speed must be positive");
    }

    info!(hotspot = %hotspot.id, "Starting Hotspot simulator");

    // Scene entities; only some of them carry sound
    let sky = SceneEntity::silent("sky");
    let village = SceneEntity::sounding("ambient-spatial");
    let village_flat = SceneEntity::sounding("ambient-fallback");
    let screen = SceneEntity::sounding("soundtrack");

    let ambient = ChannelGroup::from_sources(
        "ambient",
        [&sky as &dyn HasAudioChannel, &village, &village_flat],
        config.ambient.to_cue()?,
    );
    let media = ChannelGroup::from_sources(
        "media",
        [&screen as &dyn HasAudioChannel],
        config.media.to_cue()?,
    );
    let audio = CrossfadeEngine::new(config.fade_engine(), ambient, media);

    let stage = collaborators::logging_stage(Duration::from_secs(cli.media_secs));
    let (orchestrator, events, session) = TransitionOrchestrator::new(&config, stage, audio);
    let monitor = orchestrator.proximity_monitor();
    let orchestrator = tokio::spawn(orchestrator.run());

    if cli.immersive {
        events.send(SessionEvent::ImmersiveEntered)?;
    }
    events.send(SessionEvent::SceneLoaded)?;

    // Walk in a straight line, stopping once a media session has come and gone
    let target = hotspot.position;
    let start = Point3::new(target.x, target.y, target.z + cli.start_distance);
    let walk_time = cli.start_distance / cli.walk_speed;
    let began = Instant::now();
    let walker_session = session.clone();
    let immersive = cli.immersive;
    let mut visited = false;
    let walker = move || {
        match walker_session.mode() {
            SessionMode::Exploring if visited => return None,
            SessionMode::Exploring => {}
            _ => visited = true,
        }
        let t = (began.elapsed().as_secs_f32() / walk_time).min(1.0);
        let position = start.lerp(&target, t);
        Some(if immersive {
            ObserverSample::tracked(position)
        } else {
            ObserverSample::camera(position)
        })
    };
    let scheduler = tokio::spawn(FrameScheduler::new(monitor, config.frame_interval()).run(walker));

    if let Some(secs) = cli.exit_after_secs {
        let mut waiter = session.clone();
        if waiter.wait_for_mode(SessionMode::MediaActive).await {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            info!("Exit button pressed");
            events.send(SessionEvent::UserExitRequested)?;
        }
    }

    let frames = scheduler.await?;
    events.send(SessionEvent::Shutdown)?;
    orchestrator.await?;

    info!(frames, "Simulation finished");
    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}

/// Something placed in the scene, optionally with a sound attached
struct SceneEntity {
    name: &'static str,
    sound: Option<AudioChannel>,
}

impl SceneEntity {
    fn silent(name: &'static str) -> Self {
        Self { name, sound: None }
    }

    fn sounding(name: &'static str) -> Self {
        let resource = Arc::new(VirtualResource::new(name));
        Self {
            name,
            sound: Some(AudioChannel::new(name, resource, 0.0)),
        }
    }
}

impl HasAudioChannel for SceneEntity {
    fn audio_channel(&self) -> Option<AudioChannel> {
        if self.sound.is_none() {
            debug!(entity = self.name, "No sound attached");
        }
        self.sound.clone()
    }
}

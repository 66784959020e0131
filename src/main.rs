//! Orbit engine headless runner.
//!
//! Loads a JSON scene into a [`MemoryStore`], registers every non-group
//! element with a [`MotionSystem`] and drives it at a fixed frame rate for a
//! number of simulated seconds. Render writes travel over a crossbeam channel
//! and are tallied; notifications are logged.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --scene demos/scene.json --splay 1 --side 1
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info};

use orbitengine::components::activeelement::ElementId;
use orbitengine::resources::memorystore::MemoryStore;
use orbitengine::resources::motionconfig::MotionConfig;
use orbitengine::resources::rendertarget::{
    ChannelRenderTarget, Notification, RenderCmd, render_channel,
};
use orbitengine::resources::store::{AngleMode, Composure, EntityStore};
use orbitengine::{ElementSpawn, MotionSystem};

const TRANSITION_SECONDS: f32 = 0.6;

/// Headless orbit engine runner
#[derive(Parser)]
#[command(version, about = "Runs an orbit engine scene without a renderer.")]
struct Cli {
    /// JSON scene to load.
    #[arg(long, value_name = "PATH")]
    scene: PathBuf,

    /// INI file with motion tunables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Simulated seconds to run.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,

    /// Host frames per second.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Splay this group a quarter of the way in and retract it at half time.
    #[arg(long, value_name = "GROUP")]
    splay: Option<u64>,

    /// Switch this group to the side angle mode at three quarters.
    #[arg(long, value_name = "GROUP")]
    side: Option<u64>,
}

#[derive(Default)]
struct Tally {
    positions: usize,
    transforms: usize,
    opacities: usize,
    crossings: usize,
    cues: usize,
}

impl Tally {
    fn record(&mut self, cmd: RenderCmd) {
        match cmd {
            RenderCmd::Position { .. } => self.positions += 1,
            RenderCmd::Transform { .. } => self.transforms += 1,
            RenderCmd::Opacity { .. } => self.opacities += 1,
            RenderCmd::Notify(Notification::EventPointCrossed {
                element,
                action,
                angle,
            }) => {
                self.crossings += 1;
                info!("{} crossed {:.1}° ({:?})", element, angle, action);
            }
            RenderCmd::Notify(Notification::TransitionCue { element, to_state }) => {
                self.cues += 1;
                info!("{} cue -> '{}'", element, to_state);
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MotionConfig::with_path(path),
        None => MotionConfig::new(),
    };
    if cli.config.is_some() {
        if let Err(e) = config.load_from_file() {
            error!("{e}");
            process::exit(1);
        }
    }

    let store = match MemoryStore::load(&cli.scene) {
        Ok(store) => store,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let (tx, rx) = render_channel();
    let mut motion = MotionSystem::new(config).with_store(store.clone());
    let scene = store.scene();
    for record in scene.elements.iter().filter(|r| r.group.is_none()) {
        let target = ChannelRenderTarget::new(record.id, tx.clone());
        motion.add_element(record.id, Box::new(target), ElementSpawn::default());
    }
    info!(
        "loaded {} elements, {} active",
        scene.elements.len(),
        motion.active_count()
    );

    let fps = cli.fps.max(1.0);
    let dt = 1.0 / fps;
    let frames = (cli.seconds.max(0.0) * fps) as u32;
    let splay_at = frames / 4;
    let retract_at = frames / 2;
    let side_at = frames * 3 / 4;

    let mut tally = Tally::default();
    for frame in 0..frames {
        if let Some(group) = cli.splay.map(ElementId) {
            if frame == splay_at {
                let ok = motion.transition_composure(
                    group,
                    Composure::Retracted,
                    Composure::Splayed,
                    TRANSITION_SECONDS,
                );
                info!("splay {}: {}", group, ok);
            } else if frame == retract_at {
                let ok = motion.transition_composure(
                    group,
                    Composure::Splayed,
                    Composure::Retracted,
                    TRANSITION_SECONDS,
                );
                info!("retract {}: {}", group, ok);
            }
        }
        if let Some(group) = cli.side.map(ElementId) {
            if frame == side_at {
                let ok = motion.transition_angle_mode(
                    group,
                    AngleMode::Flat,
                    AngleMode::Side,
                    TRANSITION_SECONDS,
                );
                // The store owns the group's configuration.
                store.modify_group(group, |g| g.angle_mode = AngleMode::Side);
                info!("side {}: {}", group, ok);
            }
        }

        motion.advance(dt);
        for cmd in rx.try_iter() {
            tally.record(cmd);
        }
    }

    info!(
        "{} ticks, {} position / {} transform / {} opacity writes, {} crossings, {} cues, {} commits",
        motion.ticks(),
        tally.positions,
        tally.transforms,
        tally.opacities,
        tally.crossings,
        tally.cues,
        store.update_count()
    );
    for record in &scene.elements {
        let Some(clock) = motion.clock_position(record.id) else {
            continue;
        };
        let state = store
            .get_element(record.id)
            .and_then(|r| r.current_state_id().map(String::from))
            .unwrap_or_else(|| "-".into());
        info!("{} at {:.1}° in state '{}'", record.id, clock, state);
    }
}

//! Motion configuration resource.
//!
//! Tunables of the simulation, loaded from an INI file. Every value has a
//! default that produces the standard decorative orbit, so a missing file or
//! missing key is never an error for the simulation itself.
//!
//! # Configuration File Format
//!
//! ```ini
//! [tick]
//! rate = 60
//! max_catch_up = 5
//!
//! [orbit]
//! xy_ease = 0.1
//! z_ease = 0.05
//! depth_window = 40
//! side_radius = 60
//!
//! [containment]
//! margin = 20
//! nudge = 0.05
//!
//! [events]
//! debounce_degrees = 3
//! commit_delay = 0.3
//!
//! [transitions]
//! settle_margin = 0.05
//! column_spacing = 120
//! row_spacing = 60
//!
//! [seed]
//! salt = 0
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

const DEFAULT_TICK_RATE: f32 = 60.0;
const DEFAULT_MAX_CATCH_UP: u32 = 5;
const DEFAULT_XY_EASE: f32 = 0.1;
const DEFAULT_Z_EASE: f32 = 0.05;
const DEFAULT_DEPTH_WINDOW: f32 = 40.0;
const DEFAULT_SIDE_RADIUS: f32 = 60.0;
const DEFAULT_FLAT_DEPTH_LIFT: f32 = 0.25;
const DEFAULT_SIDE_DEPTH_LIFT: f32 = 0.6;
const DEFAULT_BIAS_WAVE_AMPLITUDE: f32 = 2.0;
const DEFAULT_BIAS_WAVE_RATE: f32 = 0.02;
const DEFAULT_OPACITY_FLOOR: f32 = 0.35;
const DEFAULT_CONTAINMENT_MARGIN: f32 = 20.0;
const DEFAULT_CONTAINMENT_NUDGE: f32 = 0.05;
const DEFAULT_DEBOUNCE_DEGREES: f32 = 3.0;
const DEFAULT_COMMIT_DELAY: f32 = 0.3;
const DEFAULT_SETTLE_MARGIN: f32 = 0.05;
const DEFAULT_COLUMN_SPACING: f32 = 120.0;
const DEFAULT_ROW_SPACING: f32 = 60.0;
const DEFAULT_CONFIG_PATH: &str = "./motion.ini";

/// Simulation tunables.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MotionConfig {
    /// Ticks per second.
    pub tick_rate: f32,
    /// Most ticks run for a single host frame.
    pub max_catch_up: u32,
    /// Per-tick easing factor toward the target on x and y.
    pub xy_ease: f32,
    /// Per-tick easing factor toward the target on z.
    pub z_ease: f32,
    /// Half-height of the z range mapped onto `[min_scale, max_scale]`.
    pub depth_window: f32,
    /// Horizontal swing radius in the side angle mode.
    pub side_radius: f32,
    /// How much depth lifts the top coordinate in the flat mode.
    pub flat_depth_lift: f32,
    /// How much depth lifts the top coordinate in the side mode.
    pub side_depth_lift: f32,
    pub bias_wave_amplitude: f32,
    /// Radians per tick.
    pub bias_wave_rate: f32,
    /// Opacity of an element at its minimum scale.
    pub opacity_floor: f32,
    /// Distance inside a bound the base anchor is recalled to.
    pub containment_margin: f32,
    /// Fraction of the remaining distance recalled per tick.
    pub containment_nudge: f32,
    /// Minimum clock movement, in degrees, before crossings are checked.
    pub debounce_degrees: f32,
    /// Seconds between a transition cue and its commit.
    pub commit_delay: f32,
    /// Seconds added to an angle transition before it is cleared.
    pub settle_margin: f32,
    pub column_spacing: f32,
    pub row_spacing: f32,
    /// Mixed into every element's orbit seed.
    pub seed_salt: u64,
    pub config_path: PathBuf,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionConfig {
    /// Create a configuration with the default values.
    pub fn new() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            max_catch_up: DEFAULT_MAX_CATCH_UP,
            xy_ease: DEFAULT_XY_EASE,
            z_ease: DEFAULT_Z_EASE,
            depth_window: DEFAULT_DEPTH_WINDOW,
            side_radius: DEFAULT_SIDE_RADIUS,
            flat_depth_lift: DEFAULT_FLAT_DEPTH_LIFT,
            side_depth_lift: DEFAULT_SIDE_DEPTH_LIFT,
            bias_wave_amplitude: DEFAULT_BIAS_WAVE_AMPLITUDE,
            bias_wave_rate: DEFAULT_BIAS_WAVE_RATE,
            opacity_floor: DEFAULT_OPACITY_FLOOR,
            containment_margin: DEFAULT_CONTAINMENT_MARGIN,
            containment_nudge: DEFAULT_CONTAINMENT_NUDGE,
            debounce_degrees: DEFAULT_DEBOUNCE_DEGREES,
            commit_delay: DEFAULT_COMMIT_DELAY,
            settle_margin: DEFAULT_SETTLE_MARGIN,
            column_spacing: DEFAULT_COLUMN_SPACING,
            row_spacing: DEFAULT_ROW_SPACING,
            seed_salt: 0,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a configuration reading from a custom file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load values from the INI file. Missing keys keep their current values.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply_ini(&config);

        info!(
            "Loaded motion config: {} ticks/s, ease {}/{}, debounce {}°, commit delay {}s",
            self.tick_rate, self.xy_ease, self.z_ease, self.debounce_degrees, self.commit_delay
        );
        Ok(())
    }

    /// Load values from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply_ini(&config);
        Ok(())
    }

    fn apply_ini(&mut self, config: &Ini) {
        let float = |section: &str, key: &str, slot: &mut f32| {
            if let Some(v) = config.getfloat(section, key).ok().flatten() {
                *slot = v as f32;
            }
        };

        // [tick]
        float("tick", "rate", &mut self.tick_rate);
        if let Some(n) = config.getuint("tick", "max_catch_up").ok().flatten() {
            self.max_catch_up = n as u32;
        }

        // [orbit]
        float("orbit", "xy_ease", &mut self.xy_ease);
        float("orbit", "z_ease", &mut self.z_ease);
        float("orbit", "depth_window", &mut self.depth_window);
        float("orbit", "side_radius", &mut self.side_radius);
        float("orbit", "flat_depth_lift", &mut self.flat_depth_lift);
        float("orbit", "side_depth_lift", &mut self.side_depth_lift);
        float("orbit", "bias_wave_amplitude", &mut self.bias_wave_amplitude);
        float("orbit", "bias_wave_rate", &mut self.bias_wave_rate);
        float("orbit", "opacity_floor", &mut self.opacity_floor);

        // [containment]
        float("containment", "margin", &mut self.containment_margin);
        float("containment", "nudge", &mut self.containment_nudge);

        // [events]
        float("events", "debounce_degrees", &mut self.debounce_degrees);
        float("events", "commit_delay", &mut self.commit_delay);

        // [transitions]
        float("transitions", "settle_margin", &mut self.settle_margin);
        float("transitions", "column_spacing", &mut self.column_spacing);
        float("transitions", "row_spacing", &mut self.row_spacing);

        // [seed]
        if let Some(salt) = config.getuint("seed", "salt").ok().flatten() {
            self.seed_salt = salt;
        }
    }

    /// Save the current values to the INI file.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("tick", "rate", Some(self.tick_rate.to_string()));
        config.set("tick", "max_catch_up", Some(self.max_catch_up.to_string()));

        config.set("orbit", "xy_ease", Some(self.xy_ease.to_string()));
        config.set("orbit", "z_ease", Some(self.z_ease.to_string()));
        config.set("orbit", "depth_window", Some(self.depth_window.to_string()));
        config.set("orbit", "side_radius", Some(self.side_radius.to_string()));
        config.set("orbit", "flat_depth_lift", Some(self.flat_depth_lift.to_string()));
        config.set("orbit", "side_depth_lift", Some(self.side_depth_lift.to_string()));
        config.set(
            "orbit",
            "bias_wave_amplitude",
            Some(self.bias_wave_amplitude.to_string()),
        );
        config.set("orbit", "bias_wave_rate", Some(self.bias_wave_rate.to_string()));
        config.set("orbit", "opacity_floor", Some(self.opacity_floor.to_string()));

        config.set("containment", "margin", Some(self.containment_margin.to_string()));
        config.set("containment", "nudge", Some(self.containment_nudge.to_string()));

        config.set("events", "debounce_degrees", Some(self.debounce_degrees.to_string()));
        config.set("events", "commit_delay", Some(self.commit_delay.to_string()));

        config.set("transitions", "settle_margin", Some(self.settle_margin.to_string()));
        config.set("transitions", "column_spacing", Some(self.column_spacing.to_string()));
        config.set("transitions", "row_spacing", Some(self.row_spacing.to_string()));

        config.set("seed", "salt", Some(self.seed_salt.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved motion config to {:?}", self.config_path);
        Ok(())
    }
}

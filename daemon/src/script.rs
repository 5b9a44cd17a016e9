//! Simulation scripts: TOML descriptions of the capabilities a scripted
//! verification run is wired to.
//!
//! ```toml
//! sessions = 2
//!
//! [camera]
//! grant_delay_ms = 300
//!
//! [detector]
//! latency_ms = 40
//! fallback = { kind = "absent" }
//! ticks = [
//!     { kind = "absent" },
//!     { kind = "present", opening = 10.0 },
//!     { kind = "present", opening = 6.0 },
//! ]
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use blinkgate_nullables::{NullCamera, NullDetector, NullFrameDecoder, NullSurface, ScriptedTick};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationScript {
    /// Number of back-to-back invocations on the same orchestrator.
    #[serde(default = "default_sessions")]
    pub sessions: u32,

    /// Dismiss the surface as soon as this status line is shown.
    #[serde(default)]
    pub dismiss_on: Option<String>,

    #[serde(default)]
    pub camera: CameraScript,

    #[serde(default)]
    pub detector: DetectorScript,

    #[serde(default)]
    pub decoder: DecoderScript,
}

fn default_sessions() -> u32 {
    1
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraScript {
    /// Deny the permission request with this reason.
    pub deny: Option<String>,
    #[serde(default)]
    pub grant_delay_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorScript {
    /// Fail model loading with this message.
    pub load_error: Option<String>,
    #[serde(default)]
    pub latency_ms: u64,
    /// Returned once `ticks` runs out. Defaults to no face.
    pub fallback: Option<ScriptedTick>,
    #[serde(default)]
    pub ticks: Vec<ScriptedTick>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecoderScript {
    #[serde(default = "default_frame_width")]
    pub width: u32,
    #[serde(default = "default_frame_height")]
    pub height: u32,
    /// Fail every decode with this message.
    pub fail: Option<String>,
}

fn default_frame_width() -> u32 {
    64
}

fn default_frame_height() -> u32 {
    48
}

impl Default for DecoderScript {
    fn default() -> Self {
        Self {
            width: default_frame_width(),
            height: default_frame_height(),
            fail: None,
        }
    }
}

impl SimulationScript {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing script {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let script: Self = toml::from_str(s)?;
        anyhow::ensure!(script.sessions > 0, "sessions must be at least 1");
        Ok(script)
    }

    pub fn camera(&self) -> NullCamera {
        let camera = match &self.camera.deny {
            Some(reason) => NullCamera::denying(reason.clone()),
            None => NullCamera::granting(),
        };
        camera.with_grant_delay(Duration::from_millis(self.camera.grant_delay_ms))
    }

    pub fn detector(&self) -> NullDetector {
        let detector = match &self.detector.load_error {
            Some(message) => NullDetector::failing_load(message.clone()),
            None => NullDetector::new(self.detector.ticks.clone()),
        };
        let detector = match &self.detector.fallback {
            Some(tick) => detector.then(tick.clone()),
            None => detector,
        };
        detector.with_latency(Duration::from_millis(self.detector.latency_ms))
    }

    pub fn decoder(&self) -> NullFrameDecoder {
        match &self.decoder.fail {
            Some(message) => NullFrameDecoder::failing(message.clone()),
            None => NullFrameDecoder::new(self.decoder.width, self.decoder.height),
        }
    }

    pub fn surface(&self) -> NullSurface {
        let surface = NullSurface::new();
        if let Some(status) = &self.dismiss_on {
            surface.dismiss_on_status(status.clone());
        }
        surface
    }
}

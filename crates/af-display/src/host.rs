//! Scene host contract
//!
//! Everything a controller asks of the rendering side: tints, models,
//! audio, video, clickables and overlay snapshots. `RecordingHost` is the
//! headless implementation used by the cabinet runner and the tests.

use std::collections::{BTreeMap, HashMap};

use af_core::{ChannelId, Rgb, Tier};
use af_tween::{PropertyKey, PropertyStore, Value};

/// Handle to a live overlay snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

/// Frozen copy of a display surface, blurred behind transitions
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSnapshot {
    pub display: ChannelId,
    pub visible: bool,
    /// Property values, keyed by debug name
    pub properties: Vec<(String, Value)>,
    /// Highlighted (row, tier) cells
    pub highlights: Vec<(usize, Tier)>,
    /// Named text fields
    pub texts: Vec<(String, String)>,
}

impl SurfaceSnapshot {
    pub fn of(display: ChannelId) -> Self {
        Self {
            display,
            visible: false,
            properties: Vec::new(),
            highlights: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn properties<K: PropertyKey>(mut self, store: &PropertyStore<K>) -> Self {
        self.properties = store
            .snapshot()
            .into_iter()
            .map(|(k, v)| (format!("{k:?}"), v))
            .collect();
        self
    }

    pub fn highlights(mut self, highlights: Vec<(usize, Tier)>) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.texts.push((name.into(), value.into()));
        self
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }
}

/// Rendering-side collaborator
pub trait SceneHost {
    fn play_audio(&mut self, cue: &str);

    fn set_tint(&mut self, target: &str, color: Rgb);

    /// Show or hide a model, optionally with its own animation
    fn set_model_visible(&mut self, model: &str, visible: bool, animated: bool);

    fn register_clickable(&mut self, element: &str);

    fn play_video(&mut self, video: &str, rate: f32);

    fn create_overlay(&mut self, snapshot: &SurfaceSnapshot) -> OverlayId;

    fn discard_overlay(&mut self, id: OverlayId);
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDING HOST
// ═══════════════════════════════════════════════════════════════════════════════

/// One recorded host call
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    PlayAudio(String),
    SetTint { target: String, color: Rgb },
    SetModelVisible { model: String, visible: bool, animated: bool },
    RegisterClickable(String),
    PlayVideo { video: String, rate: f32 },
    CreateOverlay(OverlayId),
    DiscardOverlay(OverlayId),
}

/// Calls a `RecordingHost` keeps; the older half is dropped when full
pub const CALL_LOG_LIMIT: usize = 4096;

/// Headless host that records every call
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    overlays: BTreeMap<OverlayId, SurfaceSnapshot>,
    next_overlay: u64,
    tints: HashMap<String, Rgb>,
    models: HashMap<String, bool>,
    clickables: Vec<String>,
    started_videos: Vec<(String, f32)>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls, oldest first; at most `CALL_LOG_LIMIT`
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    fn record(&mut self, call: HostCall) {
        if self.calls.len() >= CALL_LOG_LIMIT {
            self.calls.drain(..CALL_LOG_LIMIT / 2);
        }
        self.calls.push(call);
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Overlays created and not yet discarded
    pub fn live_overlays(&self) -> usize {
        self.overlays.len()
    }

    /// Most recent live overlay
    pub fn latest_overlay(&self) -> Option<&SurfaceSnapshot> {
        self.overlays.values().next_back()
    }

    pub fn tint(&self, target: &str) -> Option<Rgb> {
        self.tints.get(target).copied()
    }

    pub fn model_visible(&self, model: &str) -> Option<bool> {
        self.models.get(model).copied()
    }

    pub fn clickables(&self) -> &[String] {
        &self.clickables
    }

    pub fn audio_cues(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::PlayAudio(cue) => Some(cue.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Videos started since the last call
    pub fn take_started_videos(&mut self) -> Vec<(String, f32)> {
        std::mem::take(&mut self.started_videos)
    }
}

impl SceneHost for RecordingHost {
    fn play_audio(&mut self, cue: &str) {
        log::debug!("[Host] audio '{cue}'");
        self.record(HostCall::PlayAudio(cue.to_string()));
    }

    fn set_tint(&mut self, target: &str, color: Rgb) {
        log::debug!("[Host] tint '{target}' {color}");
        self.tints.insert(target.to_string(), color);
        self.record(HostCall::SetTint {
            target: target.to_string(),
            color,
        });
    }

    fn set_model_visible(&mut self, model: &str, visible: bool, animated: bool) {
        log::debug!("[Host] model '{model}' visible={visible} animated={animated}");
        self.models.insert(model.to_string(), visible);
        self.record(HostCall::SetModelVisible {
            model: model.to_string(),
            visible,
            animated,
        });
    }

    fn register_clickable(&mut self, element: &str) {
        self.clickables.push(element.to_string());
        self.record(HostCall::RegisterClickable(element.to_string()));
    }

    fn play_video(&mut self, video: &str, rate: f32) {
        log::debug!("[Host] video '{video}' at {rate}x");
        self.started_videos.push((video.to_string(), rate));
        self.record(HostCall::PlayVideo {
            video: video.to_string(),
            rate,
        });
    }

    fn create_overlay(&mut self, snapshot: &SurfaceSnapshot) -> OverlayId {
        self.next_overlay += 1;
        let id = OverlayId(self.next_overlay);
        self.overlays.insert(id, snapshot.clone());
        self.record(HostCall::CreateOverlay(id));
        id
    }

    fn discard_overlay(&mut self, id: OverlayId) {
        if self.overlays.remove(&id).is_none() {
            log::warn!("[Host] discard of unknown overlay {id:?}");
        }
        self.record(HostCall::DiscardOverlay(id));
    }
}

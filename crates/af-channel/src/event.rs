//! Event catalog
//!
//! Every event a display can send or receive, with its typed payload.
//! Wire names are kebab-case (`update-combi`, `wheel-lock`, ...).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use af_core::{Multiplier, Rgb};

use crate::error::{ChannelError, ChannelResult};

// ═══════════════════════════════════════════════════════════════════════════════
// PAYLOADS
// ═══════════════════════════════════════════════════════════════════════════════

/// `show` / `hide`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Visibility {
    /// Skip easing
    pub immediate: bool,
}

impl Visibility {
    pub const IMMEDIATE: Visibility = Visibility { immediate: true };
    pub const ANIMATED: Visibility = Visibility { immediate: false };
}

/// `update-combi`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombiUpdate {
    pub symbol: String,
    /// Tier label: "x1", "x2" (alias of x1), "x3", "x4", "x5"
    pub value: String,
}

/// `jackpot`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackpotInfo {
    pub symbol: String,
    #[serde(default)]
    pub count: u8,
}

/// Where a message is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSize {
    /// Inside the display frame
    #[default]
    Inner,
    /// Over the whole display
    Fullscreen,
}

/// `show-message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
    #[serde(default)]
    pub size: MessageSize,
    /// Style modifiers (e.g. "red", "blink")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifier: Vec<String>,
}

impl Message {
    pub fn inner(text: impl Into<String>) -> Self {
        Self {
            message: text.into(),
            size: MessageSize::Inner,
            modifier: Vec::new(),
        }
    }

    pub fn fullscreen(text: impl Into<String>) -> Self {
        Self {
            message: text.into(),
            size: MessageSize::Fullscreen,
            modifier: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier.push(modifier.into());
        self
    }
}

/// `button`, `shooter-hit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPress {
    pub index: usize,
}

/// `update-*` numeric texts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: i64,
}

/// `update-spin-tokens`: absolute, or relative when sent as `"+N"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTokenUpdate", into = "RawTokenUpdate")]
pub enum TokenUpdate {
    Set(i64),
    Add(i64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawTokenValue {
    Number(i64),
    Text(String),
}

#[derive(Serialize, Deserialize)]
struct RawTokenUpdate {
    value: RawTokenValue,
}

impl TryFrom<RawTokenUpdate> for TokenUpdate {
    type Error = String;

    fn try_from(raw: RawTokenUpdate) -> Result<Self, Self::Error> {
        match raw.value {
            RawTokenValue::Number(n) => Ok(TokenUpdate::Set(n)),
            RawTokenValue::Text(text) => {
                let trimmed = text.trim();
                if let Some(delta) = trimmed.strip_prefix('+') {
                    delta
                        .parse()
                        .map(TokenUpdate::Add)
                        .map_err(|_| format!("bad relative value '{text}'"))
                } else {
                    trimmed
                        .parse()
                        .map(TokenUpdate::Set)
                        .map_err(|_| format!("bad token value '{text}'"))
                }
            }
        }
    }
}

impl From<TokenUpdate> for RawTokenUpdate {
    fn from(update: TokenUpdate) -> Self {
        let value = match update {
            TokenUpdate::Set(n) => RawTokenValue::Number(n),
            TokenUpdate::Add(n) => RawTokenValue::Text(format!("+{n}")),
        };
        RawTokenUpdate { value }
    }
}

impl TokenUpdate {
    /// Apply to a current count
    pub fn apply(&self, current: i64) -> i64 {
        match self {
            TokenUpdate::Set(n) => *n,
            TokenUpdate::Add(n) => current + n,
        }
    }
}

/// `button-lights-enabled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonLights {
    pub value: bool,
    /// Button index, -1 for all
    #[serde(default = "ButtonLights::all_index")]
    pub index: i32,
}

impl ButtonLights {
    pub const ALL: i32 = -1;

    fn all_index() -> i32 {
        Self::ALL
    }

    pub fn all(value: bool) -> Self {
        Self {
            value,
            index: Self::ALL,
        }
    }
}

/// `wheel-blink` / `wheel-lock`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelSignal {
    pub index: usize,
    pub value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

/// `outer-leds-color`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorArg {
    pub color: Rgb,
}

/// `complete-round`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundInfo {
    pub index: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT
// ═══════════════════════════════════════════════════════════════════════════════

/// A typed event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // Visibility / paytable
    Show(Visibility),
    Hide(Visibility),
    Reset,
    ResetCombi,
    UpdateCombi(CombiUpdate),
    Jackpot(JackpotInfo),
    JackpotEnd,
    Farkle,
    LoseFinal,
    ShowMessage(Message),
    HideMessage,

    // Player input
    Button(ButtonPress),
    Lever,
    ButtonCollect,

    // Score texts
    UpdateCollectedPoints(Amount),
    UpdateRollingPoints(Amount),
    UpdateSpinTokens(TokenUpdate),
    UpdateRounds(Amount),
    UpdateQuota(Amount),

    // Physical panel
    ButtonLightsEnabled(ButtonLights),
    ResetButtonsLight,

    // Machine LEDs
    WheelBlink(WheelSignal),
    WheelLock(WheelSignal),
    LedsOn,
    LedsOff,
    OuterLedsColor(ColorArg),
    MachineOut,
    MachineIn,
    MachineBack,
    MachineFront,

    // Bulbs
    Bulb(Multiplier),

    // Lifecycle
    StartRound,
    CompleteRound(RoundInfo),
    StartShooter,
    EndShooter,
    ShooterHit(ButtonPress),
}

/// Every wire name the catalog accepts
pub const EVENT_NAMES: &[&str] = &[
    "show",
    "hide",
    "reset",
    "reset-combi",
    "update-combi",
    "jackpot",
    "jackpot-end",
    "farkle",
    "lose-final",
    "show-message",
    "hide-message",
    "button",
    "lever",
    "button-collect",
    "update-collected-points",
    "update-rolling-points",
    "update-spin-tokens",
    "update-rounds",
    "update-quota",
    "button-lights-enabled",
    "reset-buttons-light",
    "wheel-blink",
    "wheel-lock",
    "leds-on",
    "leds-off",
    "outer-leds-color",
    "machine-out",
    "machine-in",
    "machine-back",
    "machine-front",
    "x1",
    "x3",
    "x4",
    "x5",
    "start-round",
    "complete-round",
    "start-shooter",
    "end-shooter",
    "shooter-hit",
];

fn optional<T: DeserializeOwned + Default>(
    event: &str,
    data: Option<serde_json::Value>,
) -> ChannelResult<T> {
    match data {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(value) => decode(event, value),
    }
}

fn required<T: DeserializeOwned>(event: &str, data: Option<serde_json::Value>) -> ChannelResult<T> {
    match data {
        None | Some(serde_json::Value::Null) => Err(ChannelError::InvalidPayload {
            event: event.to_string(),
            reason: "missing data".into(),
        }),
        Some(value) => decode(event, value),
    }
}

fn decode<T: DeserializeOwned>(event: &str, value: serde_json::Value) -> ChannelResult<T> {
    serde_json::from_value(value).map_err(|e| ChannelError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })
}

fn encode<T: Serialize>(payload: &T) -> Option<serde_json::Value> {
    serde_json::to_value(payload).ok()
}

impl Event {
    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            Event::Show(_) => "show",
            Event::Hide(_) => "hide",
            Event::Reset => "reset",
            Event::ResetCombi => "reset-combi",
            Event::UpdateCombi(_) => "update-combi",
            Event::Jackpot(_) => "jackpot",
            Event::JackpotEnd => "jackpot-end",
            Event::Farkle => "farkle",
            Event::LoseFinal => "lose-final",
            Event::ShowMessage(_) => "show-message",
            Event::HideMessage => "hide-message",
            Event::Button(_) => "button",
            Event::Lever => "lever",
            Event::ButtonCollect => "button-collect",
            Event::UpdateCollectedPoints(_) => "update-collected-points",
            Event::UpdateRollingPoints(_) => "update-rolling-points",
            Event::UpdateSpinTokens(_) => "update-spin-tokens",
            Event::UpdateRounds(_) => "update-rounds",
            Event::UpdateQuota(_) => "update-quota",
            Event::ButtonLightsEnabled(_) => "button-lights-enabled",
            Event::ResetButtonsLight => "reset-buttons-light",
            Event::WheelBlink(_) => "wheel-blink",
            Event::WheelLock(_) => "wheel-lock",
            Event::LedsOn => "leds-on",
            Event::LedsOff => "leds-off",
            Event::OuterLedsColor(_) => "outer-leds-color",
            Event::MachineOut => "machine-out",
            Event::MachineIn => "machine-in",
            Event::MachineBack => "machine-back",
            Event::MachineFront => "machine-front",
            Event::Bulb(m) => m.event_name(),
            Event::StartRound => "start-round",
            Event::CompleteRound(_) => "complete-round",
            Event::StartShooter => "start-shooter",
            Event::EndShooter => "end-shooter",
            Event::ShooterHit(_) => "shooter-hit",
        }
    }

    /// Build a typed event from a wire name and optional payload
    ///
    /// Unit events ignore any payload they are given.
    pub fn from_wire(name: &str, data: Option<serde_json::Value>) -> ChannelResult<Event> {
        let event = match name {
            "show" => Event::Show(optional(name, data)?),
            "hide" => Event::Hide(optional(name, data)?),
            "reset" => Event::Reset,
            "reset-combi" => Event::ResetCombi,
            "update-combi" => Event::UpdateCombi(required(name, data)?),
            "jackpot" => Event::Jackpot(required(name, data)?),
            "jackpot-end" => Event::JackpotEnd,
            "farkle" => Event::Farkle,
            "lose-final" => Event::LoseFinal,
            "show-message" => Event::ShowMessage(required(name, data)?),
            "hide-message" => Event::HideMessage,
            "button" => Event::Button(required(name, data)?),
            "lever" => Event::Lever,
            "button-collect" => Event::ButtonCollect,
            "update-collected-points" => Event::UpdateCollectedPoints(required(name, data)?),
            "update-rolling-points" => Event::UpdateRollingPoints(required(name, data)?),
            "update-spin-tokens" => Event::UpdateSpinTokens(required(name, data)?),
            "update-rounds" => Event::UpdateRounds(required(name, data)?),
            "update-quota" => Event::UpdateQuota(required(name, data)?),
            "button-lights-enabled" => Event::ButtonLightsEnabled(required(name, data)?),
            "reset-buttons-light" => Event::ResetButtonsLight,
            "wheel-blink" => Event::WheelBlink(required(name, data)?),
            "wheel-lock" => Event::WheelLock(required(name, data)?),
            "leds-on" => Event::LedsOn,
            "leds-off" => Event::LedsOff,
            "outer-leds-color" => Event::OuterLedsColor(required(name, data)?),
            "machine-out" => Event::MachineOut,
            "machine-in" => Event::MachineIn,
            "machine-back" => Event::MachineBack,
            "machine-front" => Event::MachineFront,
            "start-round" => Event::StartRound,
            "complete-round" => Event::CompleteRound(optional(name, data)?),
            "start-shooter" => Event::StartShooter,
            "end-shooter" => Event::EndShooter,
            "shooter-hit" => Event::ShooterHit(required(name, data)?),
            other => match Multiplier::from_event_name(other) {
                Some(m) => Event::Bulb(m),
                None => return Err(ChannelError::UnknownEvent(other.to_string())),
            },
        };
        Ok(event)
    }

    /// Wire payload, `None` for unit events
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            Event::Show(v) | Event::Hide(v) => encode(v),
            Event::UpdateCombi(p) => encode(p),
            Event::Jackpot(p) => encode(p),
            Event::ShowMessage(p) => encode(p),
            Event::Button(p) | Event::ShooterHit(p) => encode(p),
            Event::UpdateCollectedPoints(p)
            | Event::UpdateRollingPoints(p)
            | Event::UpdateRounds(p)
            | Event::UpdateQuota(p) => encode(p),
            Event::UpdateSpinTokens(p) => encode(p),
            Event::ButtonLightsEnabled(p) => encode(p),
            Event::WheelBlink(p) | Event::WheelLock(p) => encode(p),
            Event::OuterLedsColor(p) => encode(p),
            Event::CompleteRound(p) => encode(p),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_name_parses() {
        for name in EVENT_NAMES {
            let data = match *name {
                "update-combi" => Some(json!({"symbol": "🍒", "value": "x3"})),
                "jackpot" => Some(json!({"symbol": "7", "count": 5})),
                "show-message" => Some(json!({"message": "hi"})),
                "button" | "shooter-hit" => Some(json!({"index": 2})),
                "update-spin-tokens" => Some(json!({"value": "+1"})),
                n if n.starts_with("update-") => Some(json!({"value": 3})),
                "button-lights-enabled" => Some(json!({"value": true, "index": -1})),
                "wheel-blink" | "wheel-lock" => Some(json!({"index": 0, "value": true})),
                "outer-leds-color" => Some(json!({"color": "#ff0000"})),
                _ => None,
            };
            let event = Event::from_wire(name, data).unwrap();
            assert_eq!(event.name(), *name);
        }
    }

    #[test]
    fn test_optional_payload_defaults() {
        assert_eq!(
            Event::from_wire("show", None).unwrap(),
            Event::Show(Visibility::ANIMATED)
        );
        assert_eq!(
            Event::from_wire("hide", Some(json!({"immediate": true}))).unwrap(),
            Event::Hide(Visibility::IMMEDIATE)
        );
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            Event::from_wire("spin", None),
            Err(ChannelError::UnknownEvent("spin".into()))
        );
        assert!(matches!(
            Event::from_wire("x2", None),
            Err(ChannelError::UnknownEvent(_))
        ));
        assert!(matches!(
            Event::from_wire("update-combi", None),
            Err(ChannelError::InvalidPayload { .. })
        ));
        assert!(matches!(
            Event::from_wire("button", Some(json!({"index": "two"}))),
            Err(ChannelError::InvalidPayload { .. })
        ));
        assert!(matches!(
            Event::from_wire("outer-leds-color", Some(json!({"color": "red"}))),
            Err(ChannelError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_spin_tokens_relative() {
        let event = Event::from_wire("update-spin-tokens", Some(json!({"value": "+2"}))).unwrap();
        assert_eq!(event, Event::UpdateSpinTokens(TokenUpdate::Add(2)));
        assert_eq!(event.data(), Some(json!({"value": "+2"})));

        let absolute = Event::from_wire("update-spin-tokens", Some(json!({"value": 7}))).unwrap();
        assert_eq!(absolute, Event::UpdateSpinTokens(TokenUpdate::Set(7)));
        assert_eq!(TokenUpdate::Add(2).apply(3), 5);
        assert!(Event::from_wire("update-spin-tokens", Some(json!({"value": "+x"}))).is_err());
    }

    #[test]
    fn test_button_lights_default_index_is_all() {
        let event = Event::from_wire("button-lights-enabled", Some(json!({"value": false}))).unwrap();
        assert_eq!(event, Event::ButtonLightsEnabled(ButtonLights::all(false)));
    }

    #[test]
    fn test_wheel_signal_color() {
        let event = Event::from_wire(
            "wheel-blink",
            Some(json!({"index": 2, "value": true, "color": "#00ff00"})),
        )
        .unwrap();
        let Event::WheelBlink(signal) = event else {
            panic!("expected wheel-blink");
        };
        assert_eq!(signal.color.map(|c| c.to_hex()), Some("#00ff00".to_string()));
    }
}

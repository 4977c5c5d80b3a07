//! Machine LEDs
//!
//! Inner wheel lock LEDs (one per wheel, each with a blink and a lock
//! sub-state), the inner/outer/separator LED groups and the inner machine
//! slides.

use af_channel::{ChannelClient, Event, WheelSignal};
use af_core::{Rgb, WHEEL_COUNT};
use af_tween::{Animator, Ease, Repeat, Timeline, TransitionToken};

use crate::display::Display;
use crate::host::SceneHost;

pub const MACHINE_MODEL: &str = "machine";
/// Lock color when none is given
pub const DEFAULT_LOCK_COLOR: Rgb = Rgb::new(1.0, 225.0 / 255.0, 97.0 / 255.0);
/// Length of the `machine-out` slide
pub const MACHINE_OUT_SECS: f32 = 1.6;

/// Machine-side jackpot color keyed by symbol
pub fn jackpot_color(symbol: &str) -> Rgb {
    let packed = match symbol {
        "🍋" => 0xb3ffb3,
        "🍒" => 0xff66b3,
        "🍊" => 0xffb366,
        "🍇" => 0xb366ff,
        "red" => 0xff0000,
        _ => return DEFAULT_LOCK_COLOR,
    };
    Rgb::from_u32(packed)
}

/// Animated properties of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MachineProperty {
    InnerLeds,
    OuterLeds,
    SeparatorLeds,
    OuterColor,
    WheelOpacity(u8),
    WheelColor(u8),
    InnerY,
    InnerZ,
}

/// Per-wheel lock state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelLock {
    pub locked: bool,
    /// Running indefinite blink, if any
    pub blink: Option<TransitionToken>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// FLICKER PATTERNS
// ═══════════════════════════════════════════════════════════════════════════════

/// (value, position, duration)
type Flicker = [(f32, f32, f32)];

fn flicker(
    timeline: Timeline<MachineProperty, ()>,
    key: MachineProperty,
    pattern: &Flicker,
) -> Timeline<MachineProperty, ()> {
    pattern.iter().fold(timeline, |tl, &(value, at, duration)| {
        let ease = if value > 0.0 {
            Ease::Power1Out
        } else {
            Ease::Power1In
        };
        tl.to_at(key, value, duration, ease, at)
    })
}

fn inner_leds_off(timeline: Timeline<MachineProperty, ()>) -> Timeline<MachineProperty, ()> {
    let timeline = flicker(
        timeline,
        MachineProperty::InnerLeds,
        &[(0.0, 0.0, 0.01), (1.0, 0.09, 0.02), (0.0, 0.14, 0.01)],
    );
    flicker(
        timeline,
        MachineProperty::SeparatorLeds,
        &[(0.0, 0.06, 0.03), (1.0, 0.13, 0.02), (0.0, 0.18, 0.01)],
    )
}

fn inner_leds_on(
    timeline: Timeline<MachineProperty, ()>,
    offset: f32,
) -> Timeline<MachineProperty, ()> {
    let timeline = flicker(
        timeline,
        MachineProperty::InnerLeds,
        &[
            (1.0, offset, 0.025),
            (0.0, offset + 0.09, 0.025),
            (1.0, offset + 0.14, 0.025),
        ],
    );
    flicker(
        timeline,
        MachineProperty::SeparatorLeds,
        &[
            (1.0, offset + 0.06, 0.025),
            (0.0, offset + 0.13, 0.025),
            (1.0, offset + 0.18, 0.025),
        ],
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// MACHINE DISPLAY
// ═══════════════════════════════════════════════════════════════════════════════

pub struct MachineDisplay<H: SceneHost> {
    client: ChannelClient,
    host: H,
    animator: Animator<MachineProperty, ()>,
    wheels: [WheelLock; WHEEL_COUNT],
}

impl<H: SceneHost> MachineDisplay<H> {
    pub fn new(client: ChannelClient, host: H) -> Self {
        let mut animator = Animator::new()
            .with_value(MachineProperty::InnerLeds, 1.0)
            .with_value(MachineProperty::OuterLeds, 1.0)
            .with_value(MachineProperty::SeparatorLeds, 1.0)
            .with_value(MachineProperty::OuterColor, Rgb::WHITE)
            .with_value(MachineProperty::InnerY, 0.0)
            .with_value(MachineProperty::InnerZ, 0.0);
        for i in 0..WHEEL_COUNT as u8 {
            animator = animator
                .with_value(MachineProperty::WheelOpacity(i), 0.0)
                .with_value(MachineProperty::WheelColor(i), DEFAULT_LOCK_COLOR);
        }

        Self {
            client,
            host,
            animator,
            wheels: [WheelLock::default(); WHEEL_COUNT],
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn value(&self, property: MachineProperty) -> f32 {
        self.animator.scalar(property)
    }

    pub fn color(&self, property: MachineProperty) -> Option<Rgb> {
        self.animator.color(property)
    }

    pub fn wheel(&self, index: usize) -> Option<&WheelLock> {
        self.wheels.get(index)
    }

    pub fn wheel_opacity(&self, index: usize) -> f32 {
        self.value(MachineProperty::WheelOpacity(index as u8))
    }

    pub fn is_blinking(&self, index: usize) -> bool {
        self.wheels
            .get(index)
            .and_then(|w| w.blink)
            .is_some_and(|token| self.animator.is_active(token))
    }

    /// No LED transition is running
    pub fn is_idle(&self) -> bool {
        self.animator.is_idle()
    }

    fn wheel_slot(&self, index: usize) -> Option<u8> {
        if index < WHEEL_COUNT {
            Some(index as u8)
        } else {
            log::warn!("[Machine] Wheel index {index} out of range");
            None
        }
    }

    fn stop_blink(&mut self, index: usize) {
        if let Some(token) = self.wheels[index].blink.take() {
            self.animator.cancel(token);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wheel LEDs
    // ─────────────────────────────────────────────────────────────────────────

    pub fn animate_wheel_blink(&mut self, signal: &WheelSignal) {
        let Some(slot) = self.wheel_slot(signal.index) else {
            return;
        };
        self.stop_blink(signal.index);

        if !signal.value {
            self.animator.set(MachineProperty::WheelOpacity(slot), 0.0);
            return;
        }

        self.animator.set(
            MachineProperty::WheelColor(slot),
            signal.color.unwrap_or(DEFAULT_LOCK_COLOR),
        );
        let token = self.animator.start(
            Timeline::new()
                .from_to(
                    MachineProperty::WheelOpacity(slot),
                    0.0,
                    1.0,
                    0.5,
                    Ease::Power2InOut,
                )
                .repeat(Repeat::Forever)
                .yoyo(true),
        );
        self.wheels[signal.index].blink = Some(token);
    }

    pub fn animate_wheel_lock(&mut self, signal: &WheelSignal) {
        let Some(slot) = self.wheel_slot(signal.index) else {
            return;
        };

        // a white lock request while blinking is a reset attempt: keep the blink
        let white = signal.color.is_some_and(|c| c.same_as(&Rgb::WHITE));
        if self.is_blinking(signal.index) && white {
            return;
        }
        self.stop_blink(signal.index);
        self.wheels[signal.index].locked = signal.value;

        let opacity = MachineProperty::WheelOpacity(slot);
        let target = if signal.value { 1.0 } else { 0.0 };
        if !self.animator.is_driven(opacity) && self.animator.scalar(opacity) == target {
            return;
        }

        let color_at = if signal.value { 0.09 } else { 0.04 };
        self.animator.start(
            Timeline::new()
                .to_at(opacity, target, 0.04, Ease::Power1Out, 0.0)
                .set_at(
                    MachineProperty::WheelColor(slot),
                    signal.color.unwrap_or(DEFAULT_LOCK_COLOR),
                    color_at,
                )
                .to_at(opacity, 1.0 - target, 0.04, Ease::Power1In, 0.10)
                .to_at(opacity, target, 0.04, Ease::Power1Out, 0.15),
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // LED groups
    // ─────────────────────────────────────────────────────────────────────────

    pub fn leds_on(&mut self) {
        if self.value(MachineProperty::OuterLeds) == 1.0 {
            return;
        }
        let timeline = flicker(
            Timeline::new(),
            MachineProperty::InnerLeds,
            &[(1.0, 0.0, 0.025), (0.0, 0.1, 0.025), (1.0, 0.15, 0.025)],
        );
        let timeline = flicker(
            timeline,
            MachineProperty::OuterLeds,
            &[(1.0, 0.05, 0.025), (0.0, 0.12, 0.025), (1.0, 0.17, 0.025)],
        );
        let timeline = flicker(
            timeline,
            MachineProperty::SeparatorLeds,
            &[(1.0, 0.08, 0.025), (0.0, 0.14, 0.025), (1.0, 0.19, 0.025)],
        );
        self.animator.start(timeline);
    }

    pub fn leds_off(&mut self) {
        if self.value(MachineProperty::SeparatorLeds) == 0.0 {
            return;
        }
        self.animator.start(
            Timeline::new()
                .to(MachineProperty::InnerLeds, 0.0, 0.1, Ease::Linear)
                .to(MachineProperty::OuterLeds, 0.0, 0.1, Ease::Linear)
                .to(MachineProperty::SeparatorLeds, 0.0, 0.1, Ease::Linear),
        );
    }

    pub fn inner_leds_off(&mut self) {
        if self.value(MachineProperty::SeparatorLeds) == 0.0 {
            return;
        }
        self.animator.start(inner_leds_off(Timeline::new()));
    }

    pub fn inner_leds_on(&mut self) {
        if self.value(MachineProperty::SeparatorLeds) == 1.0 {
            return;
        }
        self.animator.start(inner_leds_on(Timeline::new(), 0.0));
    }

    fn outer_flicker(timeline: Timeline<MachineProperty, ()>) -> Timeline<MachineProperty, ()> {
        timeline
            .to(MachineProperty::OuterLeds, 0.0, 0.05, Ease::Power1Out)
            .wait(0.5)
            .to(MachineProperty::OuterLeds, 1.0, 0.1, Ease::Power1Out)
    }

    pub fn outer_leds_color(&mut self, color: Rgb) {
        let timeline = Self::outer_flicker(Timeline::new()).set(MachineProperty::OuterColor, color);
        self.animator.start(Self::outer_flicker(timeline));
    }

    /// Accelerating outer blink in the symbol's color
    pub fn jackpot(&mut self, symbol: &str) {
        let mut timeline = Timeline::new()
            .to(MachineProperty::OuterLeds, 0.0, 0.15, Ease::Power2InOut)
            .set(MachineProperty::OuterColor, jackpot_color(symbol));
        for i in 0..20 {
            let duration = 0.005 * i as f32;
            timeline = timeline
                .to(MachineProperty::OuterLeds, 1.0, duration, Ease::Power1Out)
                .to(MachineProperty::OuterLeds, 0.0, duration, Ease::Power1Out);
        }
        timeline = timeline
            .set(MachineProperty::OuterColor, Rgb::WHITE)
            .to(MachineProperty::OuterLeds, 1.0, 0.3, Ease::Power1Out);
        self.animator.start(timeline);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Slides
    // ─────────────────────────────────────────────────────────────────────────

    pub fn machine_out(&mut self) {
        self.animator.start(
            inner_leds_off(Timeline::new())
                .wait(0.2)
                .to(MachineProperty::InnerZ, -0.3, 0.3, Ease::Linear)
                .wait(0.5)
                .to(MachineProperty::InnerY, -0.5, 0.4, Ease::Power1Out),
        );
    }

    pub fn machine_in(&mut self) {
        let timeline = Timeline::new()
            .to(MachineProperty::InnerY, 0.0, 0.4, Ease::Power1Out)
            .wait(0.5)
            .to(MachineProperty::InnerZ, 0.0, 0.4, Ease::Power1Out);
        self.animator.start(inner_leds_on(timeline, 0.9));
    }

    pub fn machine_back(&mut self) {
        self.animator
            .start(Timeline::new().to(MachineProperty::InnerZ, -0.35, 1.0, Ease::Power1Out));
    }

    pub fn machine_front(&mut self) {
        self.animator
            .start(Timeline::new().to(MachineProperty::InnerZ, 0.0, 0.8, Ease::Power1Out));
    }
}

impl<H: SceneHost> Display for MachineDisplay<H> {
    fn client(&self) -> &ChannelClient {
        &self.client
    }

    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Show(v) => self.host.set_model_visible(MACHINE_MODEL, true, !v.immediate),
            Event::Hide(v) => self.host.set_model_visible(MACHINE_MODEL, false, !v.immediate),
            Event::WheelBlink(signal) => self.animate_wheel_blink(signal),
            Event::WheelLock(signal) => self.animate_wheel_lock(signal),
            Event::LedsOn => self.leds_on(),
            Event::LedsOff => self.leds_off(),
            Event::OuterLedsColor(arg) => self.outer_leds_color(arg.color),
            Event::Jackpot(info) => self.jackpot(&info.symbol),
            Event::MachineOut => self.machine_out(),
            Event::MachineIn => self.machine_in(),
            Event::MachineBack => self.machine_back(),
            Event::MachineFront => self.machine_front(),
            other => log::trace!("[Machine] Ignoring '{}'", other.name()),
        }
    }

    fn advance(&mut self, dt: f32) {
        self.animator.advance(dt);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

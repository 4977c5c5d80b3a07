//! Physical debug panel
//!
//! On-screen stand-in for the cabinet hardware: five LED buttons, the
//! lever and the collect button. Clicks and key presses become player
//! input events on the machine channel; the top screens mirror the score.

use af_channel::{ButtonLights, ButtonPress, ChannelClient, Event};
use af_core::{ChannelId, Rgb, WHEEL_COUNT};
use af_tween::{Animator, Ease, Repeat, Timeline};

use crate::display::Display;
use crate::host::SceneHost;
use crate::score::ScoreBoard;

pub const LEVER_ELEMENT: &str = "lever";
pub const COLLECT_ELEMENT: &str = "collect";

/// Lit color of each LED button
pub const LED_COLORS: [u32; WHEEL_COUNT] = [0xffff00, 0xff0000, 0x0000ff, 0x008000, 0xff00f0];
const COLLECT_FLASH: u32 = 0x008000;
/// Lever pulls closer together than this are ignored
pub const LEVER_DEBOUNCE_SECS: f32 = 1.0;
/// Lines the right screen can show
pub const CONSOLE_LINES: usize = 24;

pub fn led_element(index: usize) -> String {
    format!("led-{index}")
}

/// Keyboard shortcut for each control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKey {
    Button(usize),
    Collect,
    Lever,
}

impl PanelKey {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "f" => Some(PanelKey::Button(0)),
            "g" => Some(PanelKey::Button(1)),
            "h" => Some(PanelKey::Button(2)),
            "j" => Some(PanelKey::Button(3)),
            "k" => Some(PanelKey::Button(4)),
            "Enter" => Some(PanelKey::Collect),
            " " | "Space" => Some(PanelKey::Lever),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelProperty {
    LeverRotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCue {
    SendLever,
    LeverReady,
    CollectRelease,
}

/// One LED button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedButton {
    pub enabled: bool,
    pub white: bool,
}

impl Default for LedButton {
    fn default() -> Self {
        Self {
            enabled: false,
            white: true,
        }
    }
}

pub struct PhysicalDisplay<H: SceneHost> {
    client: ChannelClient,
    host: H,
    animator: Animator<PanelProperty, PanelCue>,
    leds: [LedButton; WHEEL_COUNT],
    lever_busy: bool,
    board: ScoreBoard,
    console: Vec<String>,
}

impl<H: SceneHost> PhysicalDisplay<H> {
    /// Register the controls as clickables
    pub fn new(client: ChannelClient, mut host: H) -> Self {
        host.register_clickable(LEVER_ELEMENT);
        host.register_clickable(COLLECT_ELEMENT);
        for i in 0..WHEEL_COUNT {
            host.register_clickable(&led_element(i));
            host.set_tint(&led_element(i), Rgb::WHITE);
        }

        Self {
            client,
            host,
            animator: Animator::new().with_value(PanelProperty::LeverRotation, 0.0),
            leds: [LedButton::default(); WHEEL_COUNT],
            lever_busy: false,
            board: ScoreBoard::default(),
            console: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    pub fn led(&self, index: usize) -> Option<&LedButton> {
        self.leds.get(index)
    }

    pub fn lever_rotation(&self) -> f32 {
        self.animator.scalar(PanelProperty::LeverRotation)
    }

    /// Lines printed on the right screen
    pub fn console(&self) -> &[String] {
        &self.console
    }

    pub fn print(&mut self, line: impl Into<String>) {
        if self.console.len() >= CONSOLE_LINES {
            self.console.remove(0);
        }
        self.console.push(line.into());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// Send `button{index}` to the machine and shooter
    ///
    /// Returns false for an out-of-range index.
    pub fn send_button(&mut self, index: usize) -> bool {
        if index >= WHEEL_COUNT {
            log::warn!("[Physical] Button index {index} out of range");
            return false;
        }
        self.client.send(
            [ChannelId::Machine, ChannelId::Shooter],
            Event::Button(ButtonPress { index }),
        );
        true
    }

    /// Clicked LED: send the press and toggle its light
    pub fn press_button(&mut self, index: usize) {
        if !self.send_button(index) {
            return;
        }

        let led = &mut self.leds[index];
        if led.enabled {
            led.white = !led.white;
            let color = if led.white {
                Rgb::WHITE
            } else {
                Rgb::from_u32(LED_COLORS[index])
            };
            self.host.set_tint(&led_element(index), color);
        }
    }

    pub fn pull_lever(&mut self) {
        if self.lever_busy {
            log::debug!("[Physical] Lever still moving");
            return;
        }
        self.lever_busy = true;

        self.animator.start(
            Timeline::new()
                .to(PanelProperty::LeverRotation, -1.5, 0.5, Ease::Power1InOut)
                .repeat(Repeat::Times(1))
                .yoyo(true),
        );
        self.animator.delayed_call(0.15, PanelCue::SendLever);
        self.animator
            .delayed_call(LEVER_DEBOUNCE_SECS, PanelCue::LeverReady);
    }

    pub fn press_collect(&mut self) {
        self.host
            .set_tint(COLLECT_ELEMENT, Rgb::from_u32(COLLECT_FLASH));
        self.animator.delayed_call(0.1, PanelCue::CollectRelease);
        self.client.send(ChannelId::Machine, Event::ButtonCollect);
    }

    /// Host callback: a registered element was clicked
    pub fn on_click(&mut self, element: &str) {
        match element {
            LEVER_ELEMENT => self.pull_lever(),
            COLLECT_ELEMENT => self.press_collect(),
            other => match other
                .strip_prefix("led-")
                .and_then(|i| i.parse::<usize>().ok())
            {
                Some(index) => self.press_button(index),
                None => log::warn!("[Physical] Unknown element '{other}'"),
            },
        }
    }

    /// Host callback: a key went down
    ///
    /// Button keys only send the press; lights follow clicks.
    pub fn on_key(&mut self, key: &str) {
        match PanelKey::from_key(key) {
            Some(PanelKey::Button(index)) => {
                self.send_button(index);
            }
            Some(PanelKey::Collect) => self.press_collect(),
            Some(PanelKey::Lever) => self.pull_lever(),
            None => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lights
    // ─────────────────────────────────────────────────────────────────────────

    fn reset_lights(&mut self) {
        for (i, led) in self.leds.iter_mut().enumerate() {
            led.white = true;
            self.host.set_tint(&led_element(i), Rgb::WHITE);
        }
    }

    pub fn button_lights_enabled(&mut self, lights: &ButtonLights) {
        log::debug!("[Physical] Button lights enabled {} {}", lights.value, lights.index);
        if lights.index == ButtonLights::ALL {
            self.leds.iter_mut().for_each(|led| led.enabled = lights.value);
            self.reset_lights();
            return;
        }
        match usize::try_from(lights.index).ok().and_then(|i| self.leds.get_mut(i)) {
            Some(led) => led.enabled = lights.value,
            None => log::warn!("[Physical] Button index {} out of range", lights.index),
        }
    }
}

impl<H: SceneHost> Display for PhysicalDisplay<H> {
    fn client(&self) -> &ChannelClient {
        &self.client
    }

    fn handle_event(&mut self, event: &Event) {
        if self.board.apply(event) {
            return;
        }
        match event {
            Event::ButtonLightsEnabled(lights) => self.button_lights_enabled(lights),
            Event::ResetButtonsLight => self.reset_lights(),
            Event::ShowMessage(message) => self.print(message.message.clone()),
            other => log::trace!("[Physical] Ignoring '{}'", other.name()),
        }
    }

    fn advance(&mut self, dt: f32) {
        for cue in self.animator.advance(dt) {
            match cue {
                PanelCue::SendLever => {
                    self.client.send(ChannelId::Machine, Event::Lever);
                }
                PanelCue::LeverReady => self.lever_busy = false,
                PanelCue::CollectRelease => self.host.set_tint(COLLECT_ELEMENT, Rgb::WHITE),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use af_channel::Router;

    struct Rig {
        panel: PhysicalDisplay<RecordingHost>,
        machine: ChannelClient,
        shooter: ChannelClient,
        _router: Router,
    }

    fn rig() -> Rig {
        let router = Router::new();
        Rig {
            panel: PhysicalDisplay::new(
                router.register(ChannelId::PhysicalDebug),
                RecordingHost::new(),
            ),
            machine: router.register(ChannelId::Machine),
            shooter: router.register(ChannelId::Shooter),
            _router: router,
        }
    }

    fn run(panel: &mut PhysicalDisplay<RecordingHost>, secs: f32) {
        for _ in 0..(secs * 100.0).round() as usize {
            panel.advance(0.01);
        }
    }

    #[test]
    fn test_registers_clickables() {
        let rig = rig();
        let clickables = rig.panel.host().clickables();
        assert_eq!(clickables.len(), 7);
        assert!(clickables.contains(&"led-4".to_string()));
    }

    #[test]
    fn test_button_reaches_machine_and_shooter() {
        let mut rig = rig();
        rig.panel.on_key("h");
        let expected = Event::Button(ButtonPress { index: 2 });
        assert_eq!(rig.machine.try_recv().unwrap().event, expected);
        assert_eq!(rig.shooter.try_recv().unwrap().event, expected);
    }

    #[test]
    fn test_light_toggles_only_when_enabled() {
        let mut rig = rig();
        rig.panel.press_button(1);
        assert!(rig.panel.led(1).unwrap().white);

        rig.panel
            .handle_event(&Event::ButtonLightsEnabled(ButtonLights { value: true, index: 1 }));
        rig.panel.press_button(1);
        assert!(!rig.panel.led(1).unwrap().white);
        assert_eq!(rig.panel.host().tint("led-1"), Some(Rgb::from_u32(0xff0000)));

        rig.panel.handle_event(&Event::ResetButtonsLight);
        assert!(rig.panel.led(1).unwrap().white);
        assert_eq!(rig.panel.host().tint("led-1"), Some(Rgb::WHITE));
    }

    #[test]
    fn test_key_sends_without_toggling_light() {
        let mut rig = rig();
        rig.panel
            .handle_event(&Event::ButtonLightsEnabled(ButtonLights::all(true)));
        rig.panel.on_key("g");
        assert_eq!(
            rig.machine.try_recv().unwrap().event,
            Event::Button(ButtonPress { index: 1 })
        );
        assert!(rig.panel.led(1).unwrap().white);

        rig.panel.on_click("led-1");
        assert!(!rig.panel.led(1).unwrap().white);
    }

    #[test]
    fn test_console_keeps_last_screen() {
        let mut rig = rig();
        for i in 0..CONSOLE_LINES + 10 {
            rig.panel.print(format!("line {i}"));
        }
        assert_eq!(rig.panel.console().len(), CONSOLE_LINES);
        assert_eq!(rig.panel.console()[0], "line 10");
    }

    #[test]
    fn test_all_lights_toggle() {
        let mut rig = rig();
        rig.panel
            .handle_event(&Event::ButtonLightsEnabled(ButtonLights::all(true)));
        assert!((0..WHEEL_COUNT).all(|i| rig.panel.led(i).unwrap().enabled));
    }

    #[test]
    fn test_lever_is_delayed_and_debounced() {
        let mut rig = rig();
        rig.panel.on_key(" ");
        rig.panel.on_key("Space");
        assert_eq!(rig.machine.pending(), 0);

        run(&mut rig.panel, 0.2);
        assert_eq!(rig.machine.drain().len(), 1);
        assert!(rig.panel.lever_rotation() < 0.0);

        rig.panel.pull_lever();
        run(&mut rig.panel, 1.0);
        assert_eq!(rig.machine.pending(), 0);
        assert_eq!(rig.panel.lever_rotation(), 0.0);

        rig.panel.pull_lever();
        run(&mut rig.panel, 0.2);
        assert_eq!(rig.machine.drain().len(), 1);
    }

    #[test]
    fn test_collect_flashes_green() {
        let mut rig = rig();
        rig.panel.on_click(COLLECT_ELEMENT);
        assert_eq!(rig.machine.try_recv().unwrap().event, Event::ButtonCollect);
        assert_eq!(rig.panel.host().tint(COLLECT_ELEMENT), Some(Rgb::from_u32(0x008000)));
        run(&mut rig.panel, 0.15);
        assert_eq!(rig.panel.host().tint(COLLECT_ELEMENT), Some(Rgb::WHITE));
    }

    #[test]
    fn test_texts_mirror_score() {
        let mut rig = rig();
        rig.panel
            .handle_event(&Event::UpdateSpinTokens(af_channel::TokenUpdate::Set(4)));
        rig.panel
            .handle_event(&Event::UpdateSpinTokens(af_channel::TokenUpdate::Add(1)));
        assert_eq!(rig.panel.board().spin_tokens, 5);
    }
}

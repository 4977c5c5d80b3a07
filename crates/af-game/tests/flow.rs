//! Orchestrator driving real displays through the router

use af_channel::*;
use af_core::{CabinetConfig, ChannelId, Rgb, Tier};
use af_display::*;
use af_game::*;

const FRAME: f32 = 1.0 / 60.0;

struct Cabinet {
    game: Orchestrator<RecordingHost>,
    combi: CombiDisplay<RecordingHost>,
    score: ScoreDisplay<RecordingHost>,
    machine: MachineDisplay<RecordingHost>,
    panel: PhysicalDisplay<RecordingHost>,
    shooter: ShooterDisplay<RecordingHost>,
}

impl Cabinet {
    fn new() -> Self {
        let router = Router::new();
        let config = CabinetConfig::default();
        Self {
            combi: CombiDisplay::new(router.register(ChannelId::Combi), RecordingHost::new(), &config),
            score: ScoreDisplay::new(router.register(ChannelId::Score), RecordingHost::new()),
            machine: MachineDisplay::new(router.register(ChannelId::Machine), RecordingHost::new()),
            panel: PhysicalDisplay::new(
                router.register(ChannelId::PhysicalDebug),
                RecordingHost::new(),
            ),
            shooter: ShooterDisplay::new(
                router.register(ChannelId::Shooter),
                RecordingHost::new(),
                &config,
            ),
            game: Orchestrator::new(&router, RecordingHost::new(), config, 42).unwrap(),
        }
    }

    fn run(&mut self, secs: f32) {
        for _ in 0..(secs / FRAME).round() as usize {
            self.game.pump(FRAME);
            self.combi.pump(FRAME);
            self.score.pump(FRAME);
            self.machine.pump(FRAME);
            self.panel.pump(FRAME);
            self.shooter.pump(FRAME);
        }
    }

    fn started() -> Self {
        let mut cabinet = Self::new();
        cabinet.game.start_skip_intro();
        cabinet.run(2.5);
        cabinet
    }
}

#[test]
fn test_intro_reaches_every_board() {
    let cab = Cabinet::started();
    assert!(cab.combi.is_visible());
    assert!(cab.score.is_visible());
    assert_eq!(cab.score.board().spin_tokens, 10);
    assert_eq!(cab.panel.board().quota, 200);
    assert!(cab.panel.led(0).unwrap().enabled);
}

#[test]
fn test_spin_highlights_paytable() {
    let mut cab = Cabinet::started();
    cab.game.spin_wheels([3, 3, 3, 3, 5]).unwrap();
    cab.run(0.1);

    assert_eq!(cab.combi.highlight_of("🍊"), Some(Tier::X4));
    assert_eq!(cab.combi.highlight_of("🍋"), Some(Tier::X1));
    assert_eq!(cab.score.board().rolling, 33);
    assert!(cab.machine.is_blinking(0));
    assert!(!cab.machine.is_blinking(4));
}

#[test]
fn test_panel_hold_locks_machine_wheel() {
    let mut cab = Cabinet::started();
    cab.game.spin_wheels([3, 3, 3, 3, 5]).unwrap();
    cab.run(0.1);

    cab.panel.on_click("led-0");
    cab.run(0.5);
    assert!(cab.game.state().held[0]);
    assert!(cab.machine.wheel(0).unwrap().locked);
    assert_eq!(cab.machine.wheel_opacity(0), 1.0);
    assert!(!cab.panel.led(0).unwrap().white);

    cab.panel.on_click("led-0");
    cab.run(0.5);
    assert!(!cab.game.state().held[0]);
    assert_eq!(cab.machine.wheel_opacity(0), 0.0);
}

#[test]
fn test_farkle_flashes_combi() {
    let mut cab = Cabinet::started();
    cab.game.spin_wheels([1, 1, 1, 2, 2]).unwrap();
    cab.run(1.0);
    assert!(cab.combi.is_alert());
    assert_eq!(cab.combi.host().tint(COMBI_MODEL), Some(ALERT_COLOR));
    cab.run(3.0);
    assert!(!cab.combi.is_alert());
}

#[test]
fn test_quota_to_shooter_and_back() {
    let mut cab = Cabinet::started();
    cab.game.set_rolling_points(210);
    cab.panel.press_collect();
    cab.run(2.0);

    assert_eq!(cab.game.state().phase, GamePhase::Shooter);
    assert!(cab.shooter.is_active());
    assert_eq!(cab.score.message().unwrap().message, SHOOTER_MESSAGE);
    assert!(!cab.panel.led(2).unwrap().enabled);

    for key in ["f", "g", "h", "j", "k"] {
        cab.panel.on_key(key);
        cab.run(0.1);
    }
    cab.run(0.5);

    let state = cab.game.state();
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.spin_tokens, 15);
    assert_eq!(state.quota, 600);
    assert_eq!(state.round, 2);
    assert!(!cab.shooter.is_active());
    assert!(cab.score.message().is_none());
}

#[test]
fn test_lose_final_reaches_combi_and_machine() {
    let mut cab = Cabinet::started();
    cab.game.lose();
    cab.run(3.5);
    cab.game.lose();
    cab.run(3.0);

    assert_eq!(cab.game.state().phase, GamePhase::Lost);
    assert_eq!(cab.combi.phase(), CombiPhase::LoseFinal);
    assert_eq!(
        cab.machine.color(MachineProperty::OuterColor),
        Some(Rgb::from_u32(0xff0000))
    );
    assert_eq!(cab.machine.value(MachineProperty::SeparatorLeds), 0.0);
    assert_eq!(cab.combi.host().live_overlays(), 1);
}

#[test]
fn test_lever_through_panel_spends_token() {
    let mut cab = Cabinet::started();
    cab.panel.pull_lever();
    cab.run(0.5);
    assert_eq!(cab.game.stats().spins, 1);
    assert_eq!(cab.score.board().spin_tokens, cab.game.state().spin_tokens);
}

#[test]
fn test_wire_lever_reaches_game() {
    let mut cab = Cabinet::started();
    let router = cab.panel.client().router().clone();
    router
        .send_wire(r#"{"event":"lever","receiver":"machine"}"#)
        .unwrap();
    cab.run(FRAME);
    assert_eq!(cab.game.stats().spins, 1);
}

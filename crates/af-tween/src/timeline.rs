//! Timelines
//!
//! A timeline is an ordered list of tweens and sets positioned on a local
//! clock, plus cues that fire when the playhead passes them. Evaluation is
//! a pure function of the playhead: every step that has started is
//! re-applied in start order, so the latest step on a key wins.

use crate::ease::Ease;
use crate::store::{PropertyKey, PropertyStore};
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════════════
// REPEAT
// ═══════════════════════════════════════════════════════════════════════════════

/// How many extra times a timeline plays after the first pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Never,
    Times(u32),
    Forever,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEPS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum StepKind {
    Tween {
        /// Explicit start value (`from_to`); otherwise captured on first render
        from: Option<Value>,
        to: Value,
        duration: f32,
        ease: Ease,
    },
    Set {
        value: Value,
    },
}

#[derive(Debug, Clone)]
struct Step<K> {
    key: K,
    at: f32,
    kind: StepKind,
    captured: Option<Value>,
}

impl<K> Step<K> {
    fn end(&self) -> f32 {
        match &self.kind {
            StepKind::Tween { duration, .. } => self.at + duration,
            StepKind::Set { .. } => self.at,
        }
    }
}

#[derive(Debug, Clone)]
struct CuePoint<C> {
    at: f32,
    cue: C,
    fired: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIMELINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Sequence of property steps and cues
///
/// `C` is the cue type a controller receives back from the animator when
/// the playhead crosses a cue point or the timeline completes.
#[derive(Debug, Clone)]
pub struct Timeline<K, C> {
    steps: Vec<Step<K>>,
    cues: Vec<CuePoint<C>>,
    on_complete: Option<C>,
    repeat: Repeat,
    yoyo: bool,
    /// Insertion point for sequenced steps (end of timeline)
    cursor: f32,
    /// Minimum total duration
    hold: f32,
    elapsed: f32,
    iteration: u32,
}

impl<K: PropertyKey, C> Default for Timeline<K, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PropertyKey, C> Timeline<K, C> {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cues: Vec::new(),
            on_complete: None,
            repeat: Repeat::Never,
            yoyo: false,
            cursor: 0.0,
            hold: 0.0,
            elapsed: 0.0,
            iteration: 0,
        }
    }

    /// Empty timeline that completes with `cue` after `delay` seconds
    pub fn delayed(delay: f32, cue: C) -> Self {
        Self::new().hold(delay).on_complete(cue)
    }

    fn push(mut self, step: Step<K>) -> Self {
        self.cursor = self.cursor.max(step.end());
        let at = step.at;
        let index = self.steps.partition_point(|s| s.at <= at);
        self.steps.insert(index, step);
        self
    }

    /// Tween from the current value, appended at the end
    pub fn to(self, key: K, to: impl Into<Value>, duration: f32, ease: Ease) -> Self {
        let at = self.cursor;
        self.to_at(key, to, duration, ease, at)
    }

    /// Tween from the current value, at an absolute position
    pub fn to_at(self, key: K, to: impl Into<Value>, duration: f32, ease: Ease, at: f32) -> Self {
        self.push(Step {
            key,
            at: at.max(0.0),
            kind: StepKind::Tween {
                from: None,
                to: to.into(),
                duration: duration.max(0.0),
                ease,
            },
            captured: None,
        })
    }

    /// Tween between explicit values, appended at the end
    ///
    /// Renders `from` before it starts unless an earlier step already
    /// drives the key.
    pub fn from_to(
        self,
        key: K,
        from: impl Into<Value>,
        to: impl Into<Value>,
        duration: f32,
        ease: Ease,
    ) -> Self {
        let at = self.cursor;
        self.from_to_at(key, from, to, duration, ease, at)
    }

    pub fn from_to_at(
        self,
        key: K,
        from: impl Into<Value>,
        to: impl Into<Value>,
        duration: f32,
        ease: Ease,
        at: f32,
    ) -> Self {
        self.push(Step {
            key,
            at: at.max(0.0),
            kind: StepKind::Tween {
                from: Some(from.into()),
                to: to.into(),
                duration: duration.max(0.0),
                ease,
            },
            captured: None,
        })
    }

    /// Instant set, appended at the end
    pub fn set(self, key: K, value: impl Into<Value>) -> Self {
        let at = self.cursor;
        self.set_at(key, value, at)
    }

    pub fn set_at(self, key: K, value: impl Into<Value>, at: f32) -> Self {
        self.push(Step {
            key,
            at: at.max(0.0),
            kind: StepKind::Set {
                value: value.into(),
            },
            captured: None,
        })
    }

    /// Move the insertion point forward
    pub fn wait(mut self, secs: f32) -> Self {
        self.cursor += secs.max(0.0);
        self.hold = self.hold.max(self.cursor);
        self
    }

    /// Cue at the insertion point
    pub fn cue(self, cue: C) -> Self {
        let at = self.cursor;
        self.cue_at(at, cue)
    }

    pub fn cue_at(mut self, at: f32, cue: C) -> Self {
        self.cues.push(CuePoint {
            at: at.max(0.0),
            cue,
            fired: false,
        });
        self
    }

    /// Stretch the timeline to at least `secs`
    pub fn hold(mut self, secs: f32) -> Self {
        self.hold = self.hold.max(secs);
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Play odd iterations backwards
    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Cue delivered once when the last iteration ends
    pub fn on_complete(mut self, cue: C) -> Self {
        self.on_complete = Some(cue);
        self
    }

    /// Current end of the timeline (where `to`/`set` would append)
    pub fn end(&self) -> f32 {
        self.cursor
    }

    /// Length of one iteration
    pub fn duration(&self) -> f32 {
        let steps = self.steps.iter().map(Step::end).fold(0.0, f32::max);
        let cues = self.cues.iter().map(|c| c.at).fold(0.0, f32::max);
        steps.max(cues).max(self.hold)
    }

    /// Every property this timeline drives, without duplicates
    pub fn keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.steps.iter().map(|s| s.key).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Drop every step driving one of `keys`
    ///
    /// Remaining steps and cues keep their positions and the iteration
    /// length is unchanged. Returns false once no property is left.
    pub(crate) fn release(&mut self, keys: &[K]) -> bool {
        self.hold = self.hold.max(self.duration());
        self.steps.retain(|s| !keys.contains(&s.key));
        !self.steps.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.cues.is_empty()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// (iteration, local time, finished)
    fn locate(&self, total: f32) -> (u32, f32, bool) {
        match self.repeat {
            Repeat::Never => (0, self.elapsed.min(total), self.elapsed >= total),
            _ if total <= 0.0 => (0, 0.0, true),
            Repeat::Times(n) => {
                let iterations = n.saturating_add(1);
                let i = (self.elapsed / total).floor() as u32;
                if i >= iterations {
                    (iterations - 1, total, true)
                } else {
                    (i, self.elapsed - i as f32 * total, false)
                }
            }
            Repeat::Forever => {
                let i = (self.elapsed / total).floor() as u32;
                (i, self.elapsed - i as f32 * total, false)
            }
        }
    }

    fn apply(&mut self, playhead: f32, store: &mut PropertyStore<K>) {
        let mut touched: Vec<K> = Vec::with_capacity(self.steps.len());

        for step in &mut self.steps {
            if playhead < step.at {
                if let StepKind::Tween { from: Some(from), .. } = step.kind {
                    if !touched.contains(&step.key) {
                        store.insert(step.key, from);
                        touched.push(step.key);
                    }
                }
                continue;
            }

            match step.kind {
                StepKind::Tween {
                    from,
                    to,
                    duration,
                    ease,
                } => {
                    let start = match step.captured {
                        Some(v) => v,
                        None => {
                            let v = from.or_else(|| store.get(&step.key)).unwrap_or(to);
                            step.captured = Some(v);
                            v
                        }
                    };
                    let progress = if duration <= 0.0 {
                        1.0
                    } else {
                        ((playhead - step.at) / duration).clamp(0.0, 1.0)
                    };
                    store.insert(step.key, start.lerp(&to, ease.evaluate(progress)));
                }
                StepKind::Set { value } => store.insert(step.key, value),
            }
            touched.push(step.key);
        }
    }
}

impl<K: PropertyKey, C: Clone> Timeline<K, C> {
    /// Advance the local clock and render into `store`
    ///
    /// Crossed cues (and the completion cue) are pushed onto `fired`.
    /// Returns true once the timeline has finished.
    pub(crate) fn advance(
        &mut self,
        dt: f32,
        store: &mut PropertyStore<K>,
        fired: &mut Vec<C>,
    ) -> bool {
        self.elapsed += dt.max(0.0);
        let total = self.duration();
        let (iteration, local, finished) = self.locate(total);

        if iteration != self.iteration {
            self.iteration = iteration;
            for cue in &mut self.cues {
                cue.fired = false;
            }
        }

        let reversed = self.yoyo && iteration % 2 == 1;
        let playhead = if reversed { total - local } else { local };
        self.apply(playhead, store);

        for point in &mut self.cues {
            let crossed = if reversed {
                playhead <= point.at
            } else {
                playhead >= point.at
            };
            if crossed && !point.fired {
                point.fired = true;
                fired.push(point.cue.clone());
            }
        }

        if finished {
            if let Some(cue) = self.on_complete.take() {
                fired.push(cue);
            }
        } else if self.repeat == Repeat::Forever && total > 0.0 {
            // keep the clock within one yoyo period
            let period = if self.yoyo { 2.0 * total } else { total };
            if self.elapsed >= period {
                self.elapsed %= period;
                self.iteration = (self.elapsed / total).floor() as u32;
            }
        }
        finished
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    enum Prop {
        A,
        B,
    }

    fn run(
        tl: &mut Timeline<Prop, &'static str>,
        store: &mut PropertyStore<Prop>,
        dt: f32,
    ) -> (Vec<&'static str>, bool) {
        let mut fired = Vec::new();
        let done = tl.advance(dt, store, &mut fired);
        (fired, done)
    }

    #[test]
    fn test_sequenced_positions() {
        let tl: Timeline<Prop, ()> = Timeline::new()
            .to(Prop::A, 1.0, 0.5, Ease::Linear)
            .to(Prop::B, 1.0, 0.25, Ease::Linear)
            .wait(0.5)
            .set(Prop::A, 0.0);
        assert_relative_eq!(tl.end(), 1.25);
        assert_relative_eq!(tl.duration(), 1.25);
        assert_eq!(tl.keys(), vec![Prop::A, Prop::B]);
    }

    #[test]
    fn test_to_captures_current_value_lazily() {
        let mut store = PropertyStore::new();
        store.insert(Prop::A, Value::Scalar(0.5));
        let mut tl = Timeline::new().to_at(Prop::A, 1.0, 1.0, Ease::Linear, 1.0);

        // not started yet: untouched
        run(&mut tl, &mut store, 0.5);
        assert_eq!(store.scalar(&Prop::A), 0.5);

        store.insert(Prop::A, Value::Scalar(0.0));
        run(&mut tl, &mut store, 1.0);
        assert_relative_eq!(store.scalar(&Prop::A), 0.5);
        let (_, done) = run(&mut tl, &mut store, 0.5);
        assert!(done);
        assert_eq!(store.scalar(&Prop::A), 1.0);
    }

    #[test]
    fn test_from_to_renders_from_before_start() {
        let mut store = PropertyStore::new();
        store.insert(Prop::A, Value::Scalar(1.0));
        let mut tl =
            Timeline::<Prop, &str>::new().from_to_at(Prop::A, 0.0, 1.0, 1.0, Ease::Linear, 1.0);
        run(&mut tl, &mut store, 0.1);
        assert_eq!(store.scalar(&Prop::A), 0.0);
    }

    #[test]
    fn test_latest_step_wins() {
        let mut store = PropertyStore::new();
        let mut tl = Timeline::new()
            .to_at(Prop::A, 1.0, 0.04, Ease::Power1Out, 0.0)
            .to_at(Prop::A, 0.0, 0.04, Ease::Power1Out, 0.10)
            .to_at(Prop::A, 1.0, 0.04, Ease::Power1Out, 0.15);

        run(&mut tl, &mut store, 0.05);
        assert_relative_eq!(store.scalar(&Prop::A), 1.0);
        run(&mut tl, &mut store, 0.09);
        assert_relative_eq!(store.scalar(&Prop::A), 0.0, epsilon = 1e-5);
        let (_, done) = run(&mut tl, &mut store, 0.1);
        assert!(done);
        assert_relative_eq!(store.scalar(&Prop::A), 1.0);
    }

    #[test]
    fn test_cues_and_completion_fire_once() {
        let mut store = PropertyStore::new();
        let mut tl = Timeline::new()
            .to(Prop::A, 1.0, 1.0, Ease::Linear)
            .cue_at(0.5, "half")
            .on_complete("done");

        let (fired, _) = run(&mut tl, &mut store, 0.6);
        assert_eq!(fired, vec!["half"]);
        let (fired, done) = run(&mut tl, &mut store, 0.6);
        assert_eq!(fired, vec!["done"]);
        assert!(done);
        let (fired, _) = run(&mut tl, &mut store, 0.6);
        assert!(fired.is_empty());
    }

    #[test]
    fn test_delayed_call() {
        let mut store = PropertyStore::new();
        let mut tl = Timeline::<Prop, &str>::delayed(3.0, "revert");
        assert!(tl.keys().is_empty());
        let (fired, done) = run(&mut tl, &mut store, 2.9);
        assert!(fired.is_empty() && !done);
        let (fired, done) = run(&mut tl, &mut store, 0.2);
        assert_eq!(fired, vec!["revert"]);
        assert!(done);
    }

    #[test]
    fn test_forever_yoyo() {
        let mut store = PropertyStore::new();
        let mut tl = Timeline::<Prop, &str>::new()
            .from_to(Prop::A, 0.0, 1.0, 0.5, Ease::Linear)
            .repeat(Repeat::Forever)
            .yoyo(true);

        run(&mut tl, &mut store, 0.25);
        assert_relative_eq!(store.scalar(&Prop::A), 0.5);
        // second iteration runs backwards
        run(&mut tl, &mut store, 0.375);
        assert_relative_eq!(store.scalar(&Prop::A), 0.75, epsilon = 1e-5);
        let (_, done) = run(&mut tl, &mut store, 100.0);
        assert!(!done);
    }

    #[test]
    fn test_forever_clock_stays_bounded() {
        let mut store = PropertyStore::new();
        let mut tl = Timeline::<Prop, &str>::new()
            .from_to(Prop::A, 0.0, 1.0, 0.5, Ease::Linear)
            .cue_at(0.4, "peak")
            .repeat(Repeat::Forever)
            .yoyo(true);

        run(&mut tl, &mut store, 86_400.25);
        assert!(tl.elapsed() < 1.0);
        assert_relative_eq!(store.scalar(&Prop::A), 0.5, epsilon = 1e-3);

        // backwards pass still reaches the top
        run(&mut tl, &mut store, 0.25);
        assert_relative_eq!(store.scalar(&Prop::A), 1.0, epsilon = 1e-3);

        // cues keep firing once per pass after the wrap
        let (fired, _) = run(&mut tl, &mut store, 0.2);
        assert_eq!(fired, vec!["peak"]);
        let (fired, _) = run(&mut tl, &mut store, 0.05);
        assert!(fired.is_empty());
    }

    #[test]
    fn test_release_keeps_other_steps_in_place() {
        let mut tl = Timeline::<Prop, &str>::new()
            .to_at(Prop::A, 1.0, 1.0, Ease::Linear, 0.0)
            .to_at(Prop::B, 1.0, 0.2, Ease::Linear, 0.0);
        assert!(tl.release(&[Prop::A]));
        assert_eq!(tl.keys(), vec![Prop::B]);
        assert_relative_eq!(tl.duration(), 1.0);
        assert!(!tl.release(&[Prop::B]));
    }

    #[test]
    fn test_times_yoyo_returns_to_start() {
        let mut store = PropertyStore::new();
        let mut tl = Timeline::<Prop, &str>::new()
            .from_to(Prop::B, 0.0, -1.5, 0.5, Ease::Power1InOut)
            .repeat(Repeat::Times(1))
            .yoyo(true)
            .on_complete("back");
        let (fired, done) = run(&mut tl, &mut store, 1.5);
        assert!(done);
        assert_eq!(fired, vec!["back"]);
        assert_eq!(store.scalar(&Prop::B), 0.0);
    }

    #[test]
    fn test_zero_length_repeat_finishes() {
        let mut store = PropertyStore::new();
        let mut tl = Timeline::<Prop, &str>::new()
            .set(Prop::A, 1.0)
            .repeat(Repeat::Forever);
        let (_, done) = run(&mut tl, &mut store, 0.016);
        assert!(done);
    }
}

//! Animator
//!
//! Owns a property store and the transitions driving it. Every property
//! has at most one owning transition: starting a timeline takes each key
//! it drives away from the previous owner. The previous owner keeps
//! running its other keys and is cancelled once it has none left.
//!
//! Cancelling stops a transition where it is. Values are never snapped
//! to a final state; a caller replacing an animation sets or animates
//! the end state itself.

use std::collections::{BTreeMap, HashMap};

use af_core::Rgb;

use crate::store::{PropertyKey, PropertyStore};
use crate::timeline::Timeline;
use crate::value::Value;

/// Handle to a started transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionToken(u64);

impl TransitionToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Key type for animators that only schedule delayed calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoProperty {}

/// Delayed-call scheduler (an animator with no properties)
pub type Scheduler<C> = Animator<NoProperty, C>;

/// Property-keyed transition runner
#[derive(Debug)]
pub struct Animator<K, C> {
    store: PropertyStore<K>,
    /// Running transitions, in start order
    active: BTreeMap<TransitionToken, Timeline<K, C>>,
    owners: HashMap<K, TransitionToken>,
    next_token: u64,
}

impl<K: PropertyKey, C: Clone> Default for Animator<K, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PropertyKey, C: Clone> Animator<K, C> {
    pub fn new() -> Self {
        Self {
            store: PropertyStore::new(),
            active: BTreeMap::new(),
            owners: HashMap::new(),
            next_token: 1,
        }
    }

    /// Builder: initial property value
    pub fn with_value(mut self, key: K, value: impl Into<Value>) -> Self {
        self.store.insert(key, value.into());
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Values
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    pub fn get(&self, key: K) -> Option<Value> {
        self.store.get(&key)
    }

    /// Scalar value, 0.0 when unset
    #[inline]
    pub fn scalar(&self, key: K) -> f32 {
        self.store.scalar(&key)
    }

    #[inline]
    pub fn color(&self, key: K) -> Option<Rgb> {
        self.store.color(&key)
    }

    pub fn store(&self) -> &PropertyStore<K> {
        &self.store
    }

    /// Hard set: takes the key from its owner, then writes
    pub fn set(&mut self, key: K, value: impl Into<Value>) {
        if let Some(owner) = self.owners.remove(&key) {
            self.release_from(owner, &[key]);
        }
        self.store.insert(key, value.into());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a timeline, taking over every key it drives
    pub fn start(&mut self, timeline: Timeline<K, C>) -> TransitionToken {
        let token = TransitionToken(self.next_token);
        self.next_token += 1;

        let mut taken: BTreeMap<TransitionToken, Vec<K>> = BTreeMap::new();
        for key in timeline.keys() {
            if let Some(previous) = self.owners.insert(key, token) {
                taken.entry(previous).or_default().push(key);
            }
        }
        for (previous, keys) in taken {
            log::trace!("[Animator] {keys:?}: {previous:?} replaced by {token:?}");
            self.release_from(previous, &keys);
        }

        self.active.insert(token, timeline);
        token
    }

    /// Strip `keys` from a running timeline; cancel it when nothing is left
    ///
    /// The caller has already moved ownership of `keys` elsewhere.
    fn release_from(&mut self, token: TransitionToken, keys: &[K]) {
        let emptied = self
            .active
            .get_mut(&token)
            .is_some_and(|timeline| !timeline.release(keys));
        if emptied {
            self.cancel(token);
        }
    }

    /// Fire `cue` after `delay` seconds; drives no properties
    pub fn delayed_call(&mut self, delay: f32, cue: C) -> TransitionToken {
        self.start(Timeline::delayed(delay, cue))
    }

    /// Stop a transition where it is
    ///
    /// Returns false if the token is unknown or already finished.
    pub fn cancel(&mut self, token: TransitionToken) -> bool {
        match self.active.remove(&token) {
            Some(timeline) => {
                self.release_keys(token, &timeline);
                true
            }
            None => false,
        }
    }

    /// Cancel whatever drives `key`
    pub fn cancel_key(&mut self, key: K) -> bool {
        match self.owners.get(&key).copied() {
            Some(token) => self.cancel(token),
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.active.clear();
        self.owners.clear();
    }

    fn release_keys(&mut self, token: TransitionToken, timeline: &Timeline<K, C>) {
        for key in timeline.keys() {
            if self.owners.get(&key) == Some(&token) {
                self.owners.remove(&key);
            }
        }
    }

    #[inline]
    pub fn is_active(&self, token: TransitionToken) -> bool {
        self.active.contains_key(&token)
    }

    /// Whether some transition currently drives `key`
    #[inline]
    pub fn is_driven(&self, key: K) -> bool {
        self.owners.contains_key(&key)
    }

    pub fn owner(&self, key: K) -> Option<TransitionToken> {
        self.owners.get(&key).copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Advance every transition by `dt` seconds
    ///
    /// Returns the cues fired this tick in start order. Finished
    /// transitions are released.
    pub fn advance(&mut self, dt: f32) -> Vec<C> {
        let mut fired = Vec::new();
        let mut finished = Vec::new();

        for (token, timeline) in self.active.iter_mut() {
            if timeline.advance(dt, &mut self.store, &mut fired) {
                finished.push(*token);
            }
        }

        for token in finished {
            self.cancel(token);
        }
        fired
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ease::Ease;
    use crate::timeline::Repeat;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    enum Prop {
        Opacity,
        Tint,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Cue {
        Done(u8),
        Later,
    }

    fn tick(animator: &mut Animator<Prop, Cue>, secs: f32) -> Vec<Cue> {
        let mut fired = Vec::new();
        let steps = (secs / 0.01).round() as usize;
        for _ in 0..steps {
            fired.extend(animator.advance(0.01));
        }
        fired
    }

    #[test]
    fn test_start_cancels_previous_owner() {
        let mut animator = Animator::new().with_value(Prop::Opacity, 0.0);
        let first = animator.start(Timeline::new().to(Prop::Opacity, 1.0, 1.0, Ease::Linear));
        tick(&mut animator, 0.5);
        let second = animator.start(
            Timeline::new()
                .to(Prop::Opacity, 0.0, 0.2, Ease::Linear)
                .on_complete(Cue::Done(2)),
        );

        assert!(!animator.is_active(first));
        assert_eq!(animator.owner(Prop::Opacity), Some(second));
        let fired = tick(&mut animator, 0.3);
        assert_eq!(fired, vec![Cue::Done(2)]);
        // replacement target, never a blend with the cancelled tween
        assert_eq!(animator.scalar(Prop::Opacity), 0.0);
        assert!(animator.is_idle());
    }

    #[test]
    fn test_cancel_leaves_value_in_place() {
        let mut animator: Animator<Prop, Cue> = Animator::new().with_value(Prop::Opacity, 0.0);
        let token = animator.start(Timeline::new().to(Prop::Opacity, 1.0, 1.0, Ease::Linear));
        tick(&mut animator, 0.4);
        let mid = animator.scalar(Prop::Opacity);
        assert_relative_eq!(mid, 0.4, epsilon = 1e-4);

        assert!(animator.cancel(token));
        tick(&mut animator, 1.0);
        assert_eq!(animator.scalar(Prop::Opacity), mid);
        assert!(!animator.is_driven(Prop::Opacity));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut animator: Animator<Prop, Cue> = Animator::new();
        let token = animator.start(Timeline::new().set(Prop::Tint, Rgb::WHITE));
        tick(&mut animator, 0.02);
        assert!(!animator.is_active(token));
        assert!(!animator.cancel(token));
        assert!(!animator.cancel(token));
        assert!(!animator.cancel_key(Prop::Tint));
    }

    #[test]
    fn test_set_cancels_owner() {
        let mut animator: Animator<Prop, Cue> = Animator::new();
        let token = animator.start(
            Timeline::new()
                .from_to(Prop::Opacity, 0.0, 1.0, 0.5, Ease::Power2InOut)
                .repeat(Repeat::Forever)
                .yoyo(true),
        );
        tick(&mut animator, 0.3);
        animator.set(Prop::Opacity, 0.0);
        assert!(!animator.is_active(token));
        tick(&mut animator, 1.0);
        assert_eq!(animator.scalar(Prop::Opacity), 0.0);
    }

    #[test]
    fn test_taking_one_key_leaves_the_rest_running() {
        let mut animator: Animator<Prop, Cue> = Animator::new().with_value(Prop::Opacity, 0.0);
        let both = animator.start(
            Timeline::new()
                .to(Prop::Opacity, 1.0, 1.0, Ease::Linear)
                .to_at(Prop::Tint, Rgb::BLACK, 1.0, Ease::Linear, 0.0)
                .on_complete(Cue::Done(1)),
        );
        tick(&mut animator, 0.3);
        let tint = animator.start(Timeline::new().set(Prop::Tint, Rgb::WHITE));

        assert!(animator.is_active(both));
        assert_eq!(animator.owner(Prop::Opacity), Some(both));
        assert_eq!(animator.owner(Prop::Tint), Some(tint));

        let fired = tick(&mut animator, 0.8);
        assert_eq!(fired, vec![Cue::Done(1)]);
        assert_eq!(animator.scalar(Prop::Opacity), 1.0);
        assert_eq!(animator.color(Prop::Tint), Some(Rgb::WHITE));
        assert!(animator.is_idle());
    }

    #[test]
    fn test_timeline_cancelled_once_every_key_is_taken() {
        let mut animator: Animator<Prop, Cue> = Animator::new();
        let both = animator.start(
            Timeline::new()
                .to(Prop::Opacity, 1.0, 1.0, Ease::Linear)
                .to_at(Prop::Tint, Rgb::BLACK, 1.0, Ease::Linear, 0.0)
                .on_complete(Cue::Done(1)),
        );
        animator.start(Timeline::new().set(Prop::Tint, Rgb::WHITE));
        animator.set(Prop::Opacity, 0.5);
        assert!(!animator.is_active(both));
        assert!(!animator.is_driven(Prop::Opacity));

        // the cancelled completion never fires
        assert!(tick(&mut animator, 1.2).is_empty());
        assert_eq!(animator.scalar(Prop::Opacity), 0.5);
    }

    #[test]
    fn test_delayed_calls_are_independent() {
        let mut animator: Animator<Prop, Cue> = Animator::new();
        animator.delayed_call(0.5, Cue::Later);
        animator.start(Timeline::new().to(Prop::Opacity, 1.0, 0.1, Ease::Linear));
        animator.start(Timeline::new().to(Prop::Opacity, 0.0, 0.1, Ease::Linear));
        let fired = tick(&mut animator, 0.6);
        assert_eq!(fired, vec![Cue::Later]);
    }

    #[test]
    fn test_scheduler_alias() {
        let mut scheduler: Scheduler<&'static str> = Scheduler::new();
        let token = scheduler.delayed_call(1.0, "go");
        assert!(scheduler.is_active(token));
        assert!(scheduler.advance(0.5).is_empty());
        assert_eq!(scheduler.advance(0.5), vec!["go"]);
        assert!(scheduler.is_idle());
    }
}

/// Per-trigger listening state, recomputed every time a configuration is published.
use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::TriggerKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerState {
    #[default]
    Idle,
    Listening,
}

#[derive(Debug, Default)]
pub struct Listeners {
    states: Mutex<BTreeMap<TriggerKind, ListenerState>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move every kind to `Listening` or `Idle` and return how many listen.
    pub fn apply(&self, is_enabled: impl Fn(TriggerKind) -> bool) -> usize {
        let mut states = self.states.lock();
        let mut listening = 0;

        for kind in TriggerKind::ALL {
            let next = if is_enabled(kind) {
                listening += 1;
                ListenerState::Listening
            } else {
                ListenerState::Idle
            };

            let previous = states.insert(kind, next).unwrap_or_default();
            match (previous, next) {
                (ListenerState::Idle, ListenerState::Listening) => {
                    tracing::info!("Listening for {}", kind)
                }
                (ListenerState::Listening, ListenerState::Idle) => {
                    tracing::info!("Stopped listening for {}", kind)
                }
                _ => {}
            }
        }

        listening
    }

    pub fn state(&self, kind: TriggerKind) -> ListenerState {
        self.states.lock().get(&kind).copied().unwrap_or_default()
    }

    pub fn is_listening(&self, kind: TriggerKind) -> bool {
        self.state(kind) == ListenerState::Listening
    }

    pub fn listening(&self) -> Vec<TriggerKind> {
        self.states
            .lock()
            .iter()
            .filter(|(_, s)| **s == ListenerState::Listening)
            .map(|(k, _)| *k)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_counts_and_transitions() {
        let listeners = Listeners::new();
        assert_eq!(listeners.state(TriggerKind::Join), ListenerState::Idle);

        let count = listeners.apply(|k| matches!(k, TriggerKind::Join | TriggerKind::PlayerSwing));
        assert_eq!(count, 2);
        assert!(listeners.is_listening(TriggerKind::Join));
        assert_eq!(listeners.listening(), vec![TriggerKind::Join, TriggerKind::PlayerSwing]);

        let count = listeners.apply(|k| k == TriggerKind::PlayerSwing);
        assert_eq!(count, 1);
        assert!(!listeners.is_listening(TriggerKind::Join));
    }
}

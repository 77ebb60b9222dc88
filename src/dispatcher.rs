/// Sound dispatch: turns trigger events into host play calls.
///
/// The dispatcher owns the published sound configuration. Every evaluation
/// works on one snapshot taken at its start, so a reload that lands midway
/// never mixes two configuration generations.
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{DispatchWarning, LoadReport, RegionError, SoundConfigError};
use crate::geometry::Location;
use crate::messaging::{DispatchEvent, EventBus};
use crate::playback::{
    final_location, AudioHost, HookDecision, PlayRequest, PlaybackScheduler, PrePlayHook,
    SoundToggles, Subject,
};
use crate::region::{region_transitions, RegionRegistry, SoundRegion};
use crate::sound::{SoundCategory, SoundDescriptor, SoundId, SoundSnapshot, DEFAULT_PITCH, DEFAULT_VOLUME};
use crate::trigger::{Listeners, Trigger, TriggerEvent, TriggerKind};

/// What one dispatch did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Configuration generation the event was evaluated against.
    pub generation: u64,
    /// Sounds that passed gating and availability, in dispatch order.
    pub resolved: Vec<SoundId>,
    /// Delivered to the host during this call.
    pub played: usize,
    /// Queued for a later tick.
    pub scheduled: usize,
    /// Gated out, unavailable, cancelled by a hook or muted by the subject.
    pub dropped: usize,
}

pub struct SoundDispatcher {
    snapshot: RwLock<Arc<SoundSnapshot>>,
    generation: AtomicU64,
    listeners: Listeners,
    scheduler: PlaybackScheduler,
    regions: Arc<RegionRegistry>,
    toggles: SoundToggles,
    hooks: RwLock<Vec<Arc<dyn PrePlayHook>>>,
    host: Arc<dyn AudioHost>,
    events: EventBus,
}

impl SoundDispatcher {
    pub fn new(host: Arc<dyn AudioHost>, regions: Arc<RegionRegistry>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(SoundSnapshot::empty(0))),
            generation: AtomicU64::new(0),
            listeners: Listeners::new(),
            scheduler: PlaybackScheduler::new(),
            regions,
            toggles: SoundToggles::new(),
            hooks: RwLock::new(Vec::new()),
            host,
            events: EventBus::new(),
        }
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Currently published configuration.
    pub fn snapshot(&self) -> Arc<SoundSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Reserve the number of the next configuration generation.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Atomically replace the configuration and update listener states.
    ///
    /// A snapshot older than the published one is discarded. Returns the
    /// number of listening trigger kinds.
    pub fn publish(&self, snapshot: SoundSnapshot, failures: usize) -> usize {
        let snapshot = Arc::new(snapshot);
        let listening = {
            let mut current = self.snapshot.write();
            if snapshot.generation() <= current.generation() {
                tracing::warn!(
                    "Discarding sound configuration #{}, #{} is already published",
                    snapshot.generation(),
                    current.generation()
                );
                return self.listeners.listening().len();
            }

            *current = Arc::clone(&snapshot);
            self.listeners.apply(|kind| snapshot.is_enabled(kind))
        };

        tracing::info!(
            "Published sound configuration #{} ({} listening triggers)",
            snapshot.generation(),
            listening
        );
        self.events.publish(DispatchEvent::ConfigReloaded {
            generation: snapshot.generation(),
            listening,
            failures,
        });

        listening
    }

    /// Rebuild the configuration from `dir` off to the side, then publish it.
    pub fn reload(&self, dir: &Path) -> LoadReport {
        let generation = self.next_generation();
        let (snapshot, report) = SoundSnapshot::load(dir, generation);

        report.log("trigger sound configurations");
        self.publish(snapshot, report.failures.len());
        report
    }

    /// Resolve, gate and play or schedule the sounds of one event.
    pub fn dispatch(&self, event: &TriggerEvent) -> DispatchOutcome {
        let snapshot = self.snapshot();
        let mut outcome = DispatchOutcome {
            generation: snapshot.generation(),
            ..DispatchOutcome::default()
        };

        let kind = event.trigger.kind();
        let Some(rich) = snapshot.get(kind) else {
            return outcome;
        };

        let descriptors = rich.resolve(event.trigger.discriminator(), event.cancelled);
        tracing::debug!(
            "{} ({:?}, cancelled={}) resolved {} sound(s) from #{}",
            kind,
            event.trigger.discriminator(),
            event.cancelled,
            descriptors.len(),
            snapshot.generation()
        );

        let mut inside: Option<Vec<Arc<SoundRegion>>> = None;

        for descriptor in descriptors {
            if !descriptor.options.regions.is_empty() {
                let inside =
                    inside.get_or_insert_with(|| self.regions.find_containing(&event.location));
                if !in_named_region(inside, &descriptor.options.regions) {
                    tracing::debug!("{} gated out: not inside {:?}", descriptor.sound, descriptor.options.regions);
                    outcome.dropped += 1;
                    continue;
                }
            }

            let Some(native) = self.resolve_native(&descriptor.sound, kind) else {
                outcome.dropped += 1;
                continue;
            };

            let request = build_request(descriptor, native, event);
            outcome.resolved.push(descriptor.sound.clone());

            if descriptor.delay == 0 {
                if self.deliver(request) {
                    outcome.played += 1;
                } else {
                    outcome.dropped += 1;
                }
            } else {
                self.scheduler.schedule(request, descriptor.delay);
                outcome.scheduled += 1;
            }
        }

        outcome
    }

    /// Play a sound right away to each subject, at the subject's location.
    ///
    /// Returns how many subjects it was delivered to.
    pub fn play_now(
        &self,
        sound: &str,
        subjects: &[Subject],
        volume: Option<f32>,
        pitch: Option<f32>,
    ) -> Result<usize, SoundConfigError> {
        let sound = SoundId::parse(sound).map_err(|reason| SoundConfigError::invalid("play", reason))?;

        let Some(native) = self.host.resolve_sound(&sound) else {
            let warning = DispatchWarning::UnavailableSound {
                sound: sound.to_string(),
            };
            tracing::warn!("{}", warning);
            return Ok(0);
        };

        let mut delivered = 0;
        for subject in subjects {
            let request = PlayRequest {
                sound: sound.clone(),
                native: native.clone(),
                category: SoundCategory::Master,
                volume: volume.unwrap_or(DEFAULT_VOLUME),
                pitch: pitch.unwrap_or(DEFAULT_PITCH),
                radius: 0.0,
                location: subject.location.clone(),
                listener: Some(subject.id),
                ignores_disabled: false,
            };
            if self.deliver(request) {
                delivered += 1;
            }
        }

        Ok(delivered)
    }

    /// Dispatch region leave/enter triggers for a subject moving `from` -> `to`.
    pub fn handle_movement(&self, subject: &Subject, from: &Location, to: &Location) -> Vec<DispatchOutcome> {
        let transitions = region_transitions(&self.regions, from, to);

        let left = transitions.left.iter().map(|r| Trigger::RegionLeave {
            region: r.name().to_string(),
        });
        let entered = transitions.entered.iter().map(|r| Trigger::RegionEnter {
            region: r.name().to_string(),
        });

        left.chain(entered)
            .map(|trigger| {
                let event = TriggerEvent::new(trigger, to.clone()).with_subject(subject.clone());
                self.dispatch(&event)
            })
            .collect()
    }

    /// Advance the scheduler by one tick, delivering every due request.
    pub fn advance(&self) -> usize {
        self.scheduler.advance(|request| {
            self.deliver(request);
        })
    }

    pub fn add_hook(&self, hook: impl PrePlayHook + 'static) {
        self.hooks.write().push(Arc::new(hook));
    }

    pub fn add_region(&self, region: SoundRegion) -> Result<Arc<SoundRegion>, RegionError> {
        let region = self.regions.add(region)?;
        self.events.publish(DispatchEvent::RegionAdded {
            id: region.id(),
            name: region.name().to_string(),
        });
        Ok(region)
    }

    pub fn remove_region(&self, id: Uuid) -> Option<Arc<SoundRegion>> {
        let region = self.regions.remove(id)?;
        self.events.publish(DispatchEvent::RegionRemoved {
            id,
            name: region.name().to_string(),
        });
        Some(region)
    }

    pub fn regions(&self) -> &Arc<RegionRegistry> {
        &self.regions
    }

    pub fn toggles(&self) -> &SoundToggles {
        &self.toggles
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn pending(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn current_tick(&self) -> u64 {
        self.scheduler.current_tick()
    }

    fn resolve_native(&self, sound: &SoundId, trigger: TriggerKind) -> Option<String> {
        let native = self.host.resolve_sound(sound);
        if native.is_none() {
            let warning = DispatchWarning::UnavailableSound {
                sound: sound.to_string(),
            };
            tracing::warn!("{} ({})", warning, trigger);
            self.events.publish(DispatchEvent::SoundUnavailable {
                sound: sound.to_string(),
                trigger,
            });
        }
        native
    }

    /// Run hooks and the subject's toggle, then hand the request to the host.
    fn deliver(&self, mut request: PlayRequest) -> bool {
        let hooks = self.hooks.read().clone();
        for hook in hooks {
            if hook.before_play(&mut request) == HookDecision::Cancel {
                tracing::debug!("{} cancelled by a pre-play hook", request.native);
                self.events.publish(DispatchEvent::SoundCancelled {
                    sound: request.native,
                });
                return false;
            }
        }

        if let Some(listener) = request.listener {
            if !request.ignores_disabled && !self.toggles.is_enabled(listener) {
                tracing::debug!("{} muted: {} turned sounds off", request.native, listener);
                return false;
            }
        }

        self.host.play(&request);
        self.events.publish(DispatchEvent::SoundPlayed {
            sound: request.native,
            location: request.location,
            listener: request.listener,
        });
        true
    }
}

fn in_named_region(inside: &[Arc<SoundRegion>], names: &[String]) -> bool {
    inside
        .iter()
        .any(|r| names.iter().any(|n| n.eq_ignore_ascii_case(r.name())))
}

fn build_request(descriptor: &SoundDescriptor, native: String, event: &TriggerEvent) -> PlayRequest {
    PlayRequest {
        sound: descriptor.sound.clone(),
        native,
        category: descriptor.category,
        volume: descriptor.volume,
        pitch: descriptor.pitch,
        radius: descriptor.options.radius,
        location: final_location(descriptor, event.subject.as_ref(), &event.location),
        listener: event.subject.as_ref().map(|s| s.id),
        ignores_disabled: descriptor.options.ignores_disabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSection;
    use crate::geometry::WorldId;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    #[derive(Default)]
    struct RecordingHost {
        played: Mutex<Vec<PlayRequest>>,
    }

    impl RecordingHost {
        fn names(&self) -> Vec<String> {
            self.played.lock().iter().map(|r| r.native.clone()).collect()
        }
    }

    impl AudioHost for RecordingHost {
        fn resolve_sound(&self, sound: &SoundId) -> Option<String> {
            match sound.as_str() {
                "MISSING" => None,
                name => Some(name.to_string()),
            }
        }

        fn play(&self, request: &PlayRequest) {
            self.played.lock().push(request.clone());
        }
    }

    fn world() -> WorldId {
        WorldId::new("w")
    }

    fn at(x: f64, y: f64, z: f64) -> Location {
        Location::new(world(), x, y, z)
    }

    fn setup(sounds: Value, criteria: Value) -> (SoundDispatcher, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let dispatcher = SoundDispatcher::new(host.clone(), Arc::new(RegionRegistry::new()));

        let mut report = LoadReport::new();
        let sounds = ConfigSection::from_value("sounds.json", sounds).unwrap();
        let criteria = ConfigSection::from_value("criteria", criteria).unwrap();
        let snapshot = SoundSnapshot::from_sections(
            dispatcher.next_generation(),
            Some(&sounds),
            |kind| (kind == TriggerKind::PlayerSwing).then(|| criteria.clone()),
            &mut report,
        );
        assert!(report.is_clean(), "{:?}", report.failures);
        dispatcher.publish(snapshot, 0);

        (dispatcher, host)
    }

    fn swing(held: &str) -> TriggerEvent {
        TriggerEvent::new(
            Trigger::PlayerSwing {
                held: held.to_string(),
            },
            at(0.5, 64.0, 0.5),
        )
    }

    fn section(sounds: Value) -> Value {
        json!({ "Enabled": true, "Sounds": sounds })
    }

    #[test]
    fn test_dispatch_plays_criteria_then_default() {
        let (dispatcher, host) = setup(
            json!({ "Player Swing": section(json!({ "0": { "Sound": "DEFAULT" } })) }),
            json!({ "DIAMOND_SWORD": section(json!({ "0": { "Sound": "SWORD" } })) }),
        );

        let outcome = dispatcher.dispatch(&swing("DIAMOND_SWORD"));
        assert_eq!(outcome.played, 2);
        assert_eq!(host.names(), vec!["SWORD", "DEFAULT"]);
        assert!(dispatcher.listeners().is_listening(TriggerKind::PlayerSwing));
        assert!(!dispatcher.listeners().is_listening(TriggerKind::Join));
    }

    #[test]
    fn test_unconfigured_trigger_does_nothing() {
        let (dispatcher, host) = setup(json!({}), json!({}));
        let outcome = dispatcher.dispatch(&TriggerEvent::new(Trigger::Join, at(0.0, 0.0, 0.0)));
        assert_eq!(outcome, DispatchOutcome { generation: 1, ..Default::default() });
        assert!(host.names().is_empty());
    }

    #[test]
    fn test_unavailable_sound_is_dropped_alone() {
        let (dispatcher, host) = setup(
            json!({ "Join Server": section(json!({
                "0": { "Sound": "MISSING" },
                "1": { "Sound": "FOUND" }
            })) }),
            json!({}),
        );
        let (rx, _) = dispatcher.events().subscribe();

        let outcome = dispatcher.dispatch(&TriggerEvent::new(Trigger::Join, at(0.0, 0.0, 0.0)));
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.played, 1);
        assert_eq!(host.names(), vec!["FOUND"]);
        assert!(rx
            .try_iter()
            .any(|e| matches!(e, DispatchEvent::SoundUnavailable { .. })));
    }

    #[test]
    fn test_delayed_sound_fires_on_later_tick() {
        let (dispatcher, host) = setup(
            json!({ "Join Server": section(json!({
                "now": { "Sound": "NOW" },
                "later": { "Sound": "LATER", "Delay": 2 }
            })) }),
            json!({}),
        );

        let outcome = dispatcher.dispatch(&TriggerEvent::new(Trigger::Join, at(0.0, 0.0, 0.0)));
        assert_eq!(outcome.played, 1);
        assert_eq!(outcome.scheduled, 1);
        assert_eq!(host.names(), vec!["NOW"]);

        assert_eq!(dispatcher.advance(), 0);
        assert_eq!(dispatcher.advance(), 1);
        assert_eq!(host.names(), vec!["NOW", "LATER"]);
        assert_eq!(dispatcher.advance(), 0);
    }

    #[test]
    fn test_region_gating() {
        let (dispatcher, host) = setup(
            json!({ "Join Server": section(json!({
                "0": { "Sound": "SPAWN_ONLY", "Options": { "Regions": ["Spawn"] } }
            })) }),
            json!({}),
        );
        dispatcher
            .add_region(SoundRegion::new("spawn", &at(-5.0, 60.0, -5.0), &at(5.0, 70.0, 5.0), None, None).unwrap())
            .unwrap();

        let outside = dispatcher.dispatch(&TriggerEvent::new(Trigger::Join, at(50.0, 64.0, 0.0)));
        assert_eq!(outside.dropped, 1);
        assert!(host.names().is_empty());

        let inside = dispatcher.dispatch(&TriggerEvent::new(Trigger::Join, at(1.0, 64.0, 1.0)));
        assert_eq!(inside.played, 1);
        assert_eq!(host.names(), vec!["SPAWN_ONLY"]);
    }

    #[test]
    fn test_toggles_and_ignores_disabled() {
        let (dispatcher, host) = setup(
            json!({ "Join Server": section(json!({
                "0": { "Sound": "POLITE" },
                "1": { "Sound": "LOUD", "Options": { "Ignores Disabled": true } }
            })) }),
            json!({}),
        );
        let subject = Subject::new(Uuid::new_v4(), at(0.0, 64.0, 0.0));
        dispatcher.toggles().set(subject.id, false);

        let event = TriggerEvent::new(Trigger::Join, at(0.0, 64.0, 0.0)).with_subject(subject);
        let outcome = dispatcher.dispatch(&event);

        assert_eq!(outcome.played, 1);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(host.names(), vec!["LOUD"]);
    }

    #[test]
    fn test_hook_can_cancel_and_move() {
        let (dispatcher, host) = setup(
            json!({ "Join Server": section(json!({
                "0": { "Sound": "KEEP" },
                "1": { "Sound": "BLOCKED" }
            })) }),
            json!({}),
        );
        dispatcher.add_hook(|request: &mut PlayRequest| {
            if request.native == "BLOCKED" {
                return HookDecision::Cancel;
            }
            request.location.y = 100.0;
            HookDecision::Continue
        });

        dispatcher.dispatch(&TriggerEvent::new(Trigger::Join, at(0.0, 64.0, 0.0)));

        let played = host.played.lock();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].native, "KEEP");
        assert_eq!(played[0].location.y, 100.0);
    }

    #[test]
    fn test_play_now_defaults() {
        let (dispatcher, host) = setup(json!({}), json!({}));
        let subjects = vec![
            Subject::new(Uuid::new_v4(), at(1.0, 2.0, 3.0)),
            Subject::new(Uuid::new_v4(), at(4.0, 5.0, 6.0)),
        ];

        assert_eq!(dispatcher.play_now("ENTITY_CAT_PURR", &subjects, None, Some(0.5)).unwrap(), 2);
        {
            let played = host.played.lock();
            assert_eq!(played[0].volume, DEFAULT_VOLUME);
            assert_eq!(played[0].pitch, 0.5);
            assert_eq!(played[0].category, SoundCategory::Master);
            assert_eq!(played[1].location, at(4.0, 5.0, 6.0));
        }

        assert_eq!(dispatcher.play_now("MISSING", &subjects, None, None).unwrap(), 0);
        assert!(dispatcher.play_now("not a sound", &subjects, None, None).is_err());
    }

    #[test]
    fn test_stale_snapshot_is_not_published() {
        let (dispatcher, _host) = setup(json!({}), json!({}));
        let stale = SoundSnapshot::empty(1);
        dispatcher.publish(stale, 0);
        assert_eq!(dispatcher.snapshot().generation(), 1);

        let newer = SoundSnapshot::empty(dispatcher.next_generation());
        dispatcher.publish(newer, 0);
        assert_eq!(dispatcher.snapshot().generation(), 2);
    }

    #[test]
    fn test_movement_triggers_region_sounds() {
        let (dispatcher, host) = setup(
            json!({
                "Region Enter": section(json!({ "0": { "Sound": "HELLO" } })),
                "Region Leave": section(json!({ "0": { "Sound": "BYE" } }))
            }),
            json!({}),
        );
        dispatcher
            .add_region(SoundRegion::new("shop", &at(0.0, 0.0, 0.0), &at(3.0, 3.0, 3.0), None, None).unwrap())
            .unwrap();
        let subject = Subject::new(Uuid::new_v4(), at(5.0, 1.0, 1.0));

        dispatcher.handle_movement(&subject, &at(5.0, 1.0, 1.0), &at(2.0, 1.0, 1.0));
        dispatcher.handle_movement(&subject, &at(2.0, 1.0, 1.0), &at(2.5, 1.0, 1.0));
        dispatcher.handle_movement(&subject, &at(2.0, 1.0, 1.0), &at(9.0, 1.0, 1.0));

        assert_eq!(host.names(), vec!["HELLO", "BYE"]);
    }
}

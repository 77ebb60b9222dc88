/// Messaging module for dispatch notifications
///
/// The dispatcher publishes a [`DispatchEvent`] for everything observable it
/// does (sounds played, dropped or cancelled, configuration published, regions
/// changed). Observers subscribe to the [`EventBus`] and receive events on a
/// crossbeam channel.
///
/// ## Usage
///
/// ```rust,ignore
/// let bus = EventBus::new();
/// let (rx, _id) = bus.subscribe();
///
/// let dispatcher = SoundDispatcher::new(host, regions).with_event_bus(bus.clone());
/// dispatcher.dispatch(&event);
///
/// while let Ok(event) = rx.try_recv() {
///     println!("{}", event.description());
/// }
/// ```

pub mod bus;
pub mod events;

// Re-export commonly used types
pub use bus::{EventBus, SubscriberId};
pub use events::DispatchEvent;

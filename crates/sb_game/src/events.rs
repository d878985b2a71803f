//! Game events for presentation layers.
//!
//! The session owns an `EventBus`. Observers are registered explicitly and
//! receive events in publication order when the session flushes at the end of
//! a step. Nothing here is global: two sessions never share observers.

use std::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged { score: u32 },
    PassengerCountChanged { count: u32, capacity: u32 },
    BonusAwarded { amount: u32 },
    GameOver { final_score: u32 },
    SessionReset,
}

pub trait EventObserver {
    fn on_event(&mut self, event: &GameEvent);
}

/// Forward events over a channel, e.g. to a UI thread or a test.
impl EventObserver for Sender<GameEvent> {
    fn on_event(&mut self, event: &GameEvent) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.send(*event);
    }
}

/// Observer that writes every event to the log.
#[derive(Debug, Default)]
pub struct LogObserver;

impl EventObserver for LogObserver {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ScoreChanged { score } => log::info!("Score: {}", score),
            GameEvent::PassengerCountChanged { count, capacity } => {
                log::info!("Passengers: {}/{}", count, capacity)
            }
            GameEvent::BonusAwarded { amount } => log::info!("Full bus bonus: +{}", amount),
            GameEvent::GameOver { final_score } => {
                log::info!("GAME OVER (final score {})", final_score)
            }
            GameEvent::SessionReset => log::info!("Session reset"),
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn EventObserver>>,
    pending: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn EventObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Queue an event for the next `flush`.
    pub fn publish(&mut self, event: GameEvent) {
        self.pending.push(event);
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }

    /// Deliver queued events to every observer, oldest first.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        for event in self.pending.drain(..) {
            for observer in &mut self.observers {
                observer.on_event(&event);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("pending", &self.pending)
            .finish()
    }
}

//! Scoped подписки на event sources
//!
//! `Subscriptions::subscribe` возвращает `SubscriptionGuard`; пока guard жив,
//! системы источника работают (run condition `subscribed`). Drop guard'а
//! отписывает на любом пути выхода — scene switch, panic unwinding, teardown.

use bevy::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::logger;

/// Внешние источники событий, на которые подписывается core
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// Image tracking: TrackedAnchorsChanged
    TrackedImages,
    /// Plane detection: PlacementTap / ObjectPlaced
    Placement,
    /// Кнопки UI (tint / rotate / play-stop)
    UiActions,
}

#[derive(Resource, Debug, Default)]
pub struct Subscriptions {
    counters: HashMap<EventSource, Arc<AtomicUsize>>,
}

impl Subscriptions {
    pub fn subscribe(&mut self, source: EventSource) -> SubscriptionGuard {
        let counter = self.counters.entry(source).or_default().clone();
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            logger::log(&format!("Subscribed to {:?}", source));
        }
        SubscriptionGuard { source, counter }
    }

    pub fn is_active(&self, source: EventSource) -> bool {
        self.counters
            .get(&source)
            .is_some_and(|counter| counter.load(Ordering::SeqCst) > 0)
    }
}

/// Живая подписка. Отписка — в Drop.
#[derive(Debug)]
pub struct SubscriptionGuard {
    source: EventSource,
    counter: Arc<AtomicUsize>,
}

impl SubscriptionGuard {
    pub fn source(&self) -> EventSource {
        self.source
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            logger::log(&format!("Unsubscribed from {:?}", self.source));
        }
    }
}

/// Run condition: система источника работает только пока есть подписка
pub fn subscribed(source: EventSource) -> impl Fn(Option<Res<Subscriptions>>) -> bool + Clone {
    move |subscriptions: Option<Res<Subscriptions>>| {
        subscriptions.is_some_and(|subscriptions| subscriptions.is_active(source))
    }
}

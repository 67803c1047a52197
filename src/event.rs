//! Events - an audit trail of everything observable that happens
//!
//! Executors and the day hook record `GameEvent`s into the simulation's
//! `EventLog`, which stamps IDs and keeps a bounded ring. The game loop then
//! hands each new event to the `EventBus`, whose listeners filter by type or
//! subtype.

use std::collections::VecDeque;
use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::clock::TimeOfDay;
use crate::core::types::{EntityId, Plot};

// ============================================================================
// EVENT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Economic,
    Social,
    Agricultural,
    Environmental,
    Time,
    System,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Economic,
        EventType::Social,
        EventType::Agricultural,
        EventType::Environmental,
        EventType::Time,
        EventType::System,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EventType::Economic => "Economic",
            EventType::Social => "Social",
            EventType::Agricultural => "Agricultural",
            EventType::Environmental => "Environmental",
            EventType::Time => "Time",
            EventType::System => "System",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Specific event kinds; each belongs to exactly one `EventType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSubtype {
    // Economic
    TradeOffered,
    TradeAccepted,
    TradeDeclined,
    CurrencyGained,
    CurrencySpent,
    PriceChanged,

    // Social
    ConversationStarted,
    ConversationEnded,
    RelationshipChanged,
    GiftGiven,
    HelpRequested,
    HelpProvided,

    // Agricultural
    CropPlanted,
    CropWatered,
    CropHarvested,
    CropWithered,
    CropGrowthStage,

    // Environmental
    WeatherChanged,
    TimeAdvanced,
    SeasonChanged,
    DayStarted,

    // Time
    MorningStarted,
    AfternoonStarted,
    EveningStarted,
    NightStarted,
    NewDay,
    NewSeason,
    NewYear,

    // System
    EntityCreated,
    EntityDestroyed,
    EntityMoved,
    GameSaved,
    GameLoaded,
}

impl EventSubtype {
    pub fn event_type(&self) -> EventType {
        use EventSubtype::*;
        match self {
            TradeOffered | TradeAccepted | TradeDeclined | CurrencyGained | CurrencySpent
            | PriceChanged => EventType::Economic,
            ConversationStarted | ConversationEnded | RelationshipChanged | GiftGiven
            | HelpRequested | HelpProvided => EventType::Social,
            CropPlanted | CropWatered | CropHarvested | CropWithered | CropGrowthStage => {
                EventType::Agricultural
            }
            WeatherChanged | TimeAdvanced | SeasonChanged | DayStarted => EventType::Environmental,
            MorningStarted | AfternoonStarted | EveningStarted | NightStarted | NewDay
            | NewSeason | NewYear => EventType::Time,
            EntityCreated | EntityDestroyed | EntityMoved | GameSaved | GameLoaded => {
                EventType::System
            }
        }
    }

    /// The subtype announcing the start of `time_of_day`
    pub fn period_started(time_of_day: TimeOfDay) -> Self {
        match time_of_day {
            TimeOfDay::Morning => EventSubtype::MorningStarted,
            TimeOfDay::Afternoon => EventSubtype::AfternoonStarted,
            TimeOfDay::Evening => EventSubtype::EveningStarted,
            TimeOfDay::Night => EventSubtype::NightStarted,
        }
    }
}

impl fmt::Display for EventSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// EVENTS
// ============================================================================

/// Structured payload for the subtypes that carry one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventData {
    Trade {
        item_name: String,
        quantity: u32,
        price: u32,
        accepted: bool,
        reason: String,
    },
    Relationship {
        before: i32,
        after: i32,
        reason: String,
    },
    Crop {
        crop_type: String,
        plot: Plot,
    },
    Weather {
        from: String,
        to: String,
    },
    Currency {
        amount: u32,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// 0 until the event log assigns one
    pub id: u64,
    pub event_type: EventType,
    pub subtype: EventSubtype,
    pub day: u32,
    pub time_of_day: TimeOfDay,
    pub source: Option<EntityId>,
    pub target: Option<EntityId>,
    pub location: Option<String>,
    pub description: String,
    pub data: Option<EventData>,
}

impl GameEvent {
    pub fn new(subtype: EventSubtype, source: Option<EntityId>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            event_type: subtype.event_type(),
            subtype,
            day: 1,
            time_of_day: TimeOfDay::Morning,
            source,
            target: None,
            location: None,
            description: description.into(),
            data: None,
        }
    }

    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn trade(
        source: EntityId,
        item_name: &str,
        price: u32,
        accepted: bool,
        reason: impl Into<String>,
    ) -> Self {
        let subtype = if accepted {
            EventSubtype::TradeAccepted
        } else {
            EventSubtype::TradeDeclined
        };
        let reason = reason.into();
        let description = if accepted {
            format!("Traded {} for {}", item_name, price)
        } else {
            format!("Trade for {} declined: {}", item_name, reason)
        };
        Self::new(subtype, Some(source), description).with_data(EventData::Trade {
            item_name: item_name.to_string(),
            quantity: 1,
            price,
            accepted,
            reason,
        })
    }

    pub fn relationship_change(source: EntityId, target: EntityId, before: i32, after: i32, reason: &str) -> Self {
        Self::new(
            EventSubtype::RelationshipChanged,
            Some(source),
            format!("Affection {} -> {} ({})", before, after, reason),
        )
        .with_target(target)
        .with_data(EventData::Relationship {
            before,
            after,
            reason: reason.to_string(),
        })
    }

    pub fn crop_action(subtype: EventSubtype, source: EntityId, crop_type: &str, plot: Plot) -> Self {
        let verb = match subtype {
            EventSubtype::CropPlanted => "Planted",
            EventSubtype::CropWatered => "Watered",
            EventSubtype::CropHarvested => "Harvested",
            _ => "Tended",
        };
        Self::new(subtype, Some(source), format!("{} {} at {}", verb, crop_type, plot)).with_data(EventData::Crop {
            crop_type: crop_type.to_string(),
            plot,
        })
    }

    pub fn weather_change(from: &str, to: &str) -> Self {
        Self::new(
            EventSubtype::WeatherChanged,
            None,
            format!("Weather changed from {} to {}", from, to),
        )
        .with_data(EventData::Weather {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    pub fn currency(entity: EntityId, amount: u32, gained: bool, reason: impl Into<String>) -> Self {
        let (subtype, verb) = if gained {
            (EventSubtype::CurrencyGained, "Gained")
        } else {
            (EventSubtype::CurrencySpent, "Spent")
        };
        let reason = reason.into();
        Self::new(subtype, Some(entity), format!("{} {} ({})", verb, amount, reason))
            .with_data(EventData::Currency { amount, reason })
    }

    /// Whether `entity` caused or was affected by this event
    pub fn involves(&self, entity: EntityId) -> bool {
        self.source == Some(entity) || self.target == Some(entity)
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event #{}: [{}/{}] {}",
            self.id, self.event_type, self.subtype, self.description
        )
    }
}

// ============================================================================
// FILTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventFilter {
    All,
    Type(EventType),
    Subtype(EventSubtype),
}

impl EventFilter {
    pub fn matches(&self, event: &GameEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Type(kind) => event.event_type == *kind,
            EventFilter::Subtype(subtype) => event.subtype == *subtype,
        }
    }
}

// ============================================================================
// EVENT LOG
// ============================================================================

/// Bounded ring of recorded events with per-type counts
///
/// Counts and `total_logged` cover every event ever recorded, including
/// those the ring has since dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    events: VecDeque<GameEvent>,
    capacity: usize,
    next_id: u64,
    total_logged: u64,
    by_type: AHashMap<EventType, u64>,
    #[serde(skip)]
    unpublished: Vec<GameEvent>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 1,
            total_logged: 0,
            by_type: AHashMap::new(),
            unpublished: Vec::new(),
        }
    }

    /// Assign the next ID and store the event, dropping the oldest when full
    pub fn record(&mut self, mut event: GameEvent) -> u64 {
        event.id = self.next_id;
        self.next_id += 1;
        self.total_logged += 1;
        *self.by_type.entry(event.event_type).or_insert(0) += 1;

        tracing::debug!(id = event.id, subtype = %event.subtype, "{}", event.description);
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.unpublished.push(event.clone());
        self.events.push_back(event);
        self.next_id - 1
    }

    /// Events recorded since the last call, oldest first
    pub fn take_unpublished(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.unpublished)
    }

    /// Up to `count` events, newest first
    pub fn recent(&self, count: usize) -> Vec<&GameEvent> {
        self.events.iter().rev().take(count).collect()
    }

    /// Retained events matching `filter`, newest first
    pub fn matching(&self, filter: EventFilter) -> Vec<&GameEvent> {
        self.events.iter().rev().filter(|e| filter.matches(e)).collect()
    }

    pub fn by_type(&self, kind: EventType) -> Vec<&GameEvent> {
        self.matching(EventFilter::Type(kind))
    }

    pub fn by_subtype(&self, subtype: EventSubtype) -> Vec<&GameEvent> {
        self.matching(EventFilter::Subtype(subtype))
    }

    /// Events `entity` caused or was affected by, newest first
    pub fn by_entity(&self, entity: EntityId) -> Vec<&GameEvent> {
        self.events.iter().rev().filter(|e| e.involves(entity)).collect()
    }

    pub fn by_day(&self, day: u32) -> Vec<&GameEvent> {
        self.events.iter().rev().filter(|e| e.day == day).collect()
    }

    pub fn count_by_type(&self, kind: EventType) -> u64 {
        self.by_type.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_logged(&self) -> u64 {
        self.total_logged
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop retained events and statistics; IDs keep counting up
    pub fn clear(&mut self) {
        self.events.clear();
        self.unpublished.clear();
        self.by_type.clear();
        self.total_logged = 0;
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(10_000)
    }
}

// ============================================================================
// EVENT BUS
// ============================================================================

pub type SubscriberId = usize;

type Callback = Box<dyn FnMut(&GameEvent)>;

struct Subscriber {
    id: SubscriberId,
    filter: EventFilter,
    callback: Callback,
}

/// Publish/subscribe fan-out of recorded events
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_subscriber: SubscriberId,
    max_subscribers: usize,
    published: u64,
}

impl EventBus {
    pub fn new(max_subscribers: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            next_subscriber: 1,
            max_subscribers,
            published: 0,
        }
    }

    /// Register a listener; `None` when the bus is full
    pub fn subscribe(&mut self, filter: EventFilter, callback: impl FnMut(&GameEvent) + 'static) -> Option<SubscriberId> {
        if self.subscribers.len() >= self.max_subscribers {
            tracing::warn!(max = self.max_subscribers, "event bus full");
            return None;
        }
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push(Subscriber {
            id,
            filter,
            callback: Box::new(callback),
        });
        Some(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every matching listener in subscription order,
    /// returning how many received it
    pub fn publish(&mut self, event: &GameEvent) -> usize {
        self.published += 1;
        let mut delivered = 0;
        for subscriber in &mut self.subscribers {
            if subscriber.filter.matches(event) {
                (subscriber.callback)(event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("published", &self.published)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn talk(source: u32) -> GameEvent {
        GameEvent::new(EventSubtype::ConversationStarted, Some(EntityId(source)), "chat")
    }

    #[test]
    fn test_subtypes_map_to_types() {
        assert_eq!(EventSubtype::TradeDeclined.event_type(), EventType::Economic);
        assert_eq!(EventSubtype::GiftGiven.event_type(), EventType::Social);
        assert_eq!(EventSubtype::CropWithered.event_type(), EventType::Agricultural);
        assert_eq!(EventSubtype::WeatherChanged.event_type(), EventType::Environmental);
        assert_eq!(EventSubtype::NewYear.event_type(), EventType::Time);
        assert_eq!(EventSubtype::EntityMoved.event_type(), EventType::System);
        assert_eq!(
            EventSubtype::period_started(TimeOfDay::Evening),
            EventSubtype::EveningStarted
        );
    }

    #[test]
    fn test_log_assigns_ids_and_drops_oldest() {
        let mut log = EventLog::new(3);
        for source in 1..=5 {
            log.record(talk(source));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.total_logged(), 5);
        assert_eq!(log.count_by_type(EventType::Social), 5);

        let ids: Vec<u64> = log.recent(10).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
        assert!(log.by_entity(EntityId(1)).is_empty());
    }

    #[test]
    fn test_log_subtype_filter() {
        let mut log = EventLog::default();
        log.record(talk(1));
        log.record(GameEvent::currency(EntityId(1), 6, false, "Bought Bread"));
        log.record(GameEvent::trade(EntityId(1), "Bread", 6, true, "purchase"));
        log.record(GameEvent::currency(EntityId(2), 3, true, "Sold Wheat"));

        let spent = log.by_subtype(EventSubtype::CurrencySpent);
        assert_eq!(spent.len(), 1);
        assert_eq!(spent[0].description, "Spent 6 (Bought Bread)");
        assert_eq!(log.by_type(EventType::Economic).len(), 3);
        assert_eq!(log.by_entity(EntityId(1)).len(), 3);
        assert_eq!(log.by_day(1).len(), 4);
        assert!(log.by_day(2).is_empty());
    }

    #[test]
    fn test_unpublished_drains_once() {
        let mut log = EventLog::default();
        log.record(talk(1));
        log.record(talk(2));
        let pending = log.take_unpublished();
        assert_eq!(pending.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(log.take_unpublished().is_empty());
    }

    #[test]
    fn test_bus_filters_and_unsubscribes() {
        let mut bus = EventBus::new(2);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let social = bus
            .subscribe(EventFilter::Type(EventType::Social), move |e| {
                sink.borrow_mut().push(e.subtype)
            })
            .unwrap();
        let sink = Rc::clone(&seen);
        bus.subscribe(EventFilter::Subtype(EventSubtype::WeatherChanged), move |e| {
            sink.borrow_mut().push(e.subtype)
        })
        .unwrap();
        assert!(bus.subscribe(EventFilter::All, |_| {}).is_none());

        assert_eq!(bus.publish(&talk(1)), 1);
        assert_eq!(bus.publish(&GameEvent::weather_change("Sunny", "Rainy")), 1);
        assert_eq!(bus.publish(&GameEvent::currency(EntityId(1), 1, true, "x")), 0);
        assert!(bus.unsubscribe(social));
        assert!(!bus.unsubscribe(social));
        assert_eq!(bus.publish(&talk(2)), 0);

        assert_eq!(
            *seen.borrow(),
            vec![EventSubtype::ConversationStarted, EventSubtype::WeatherChanged]
        );
        assert_eq!(bus.published(), 4);
    }
}

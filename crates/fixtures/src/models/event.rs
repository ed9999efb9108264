use chrono::Duration;
use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

use super::user::UserFactory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub organizer_id: RecordId,
    pub title: String,
    pub city: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: u32,
}

impl_has_id!(Event);

#[derive(Debug, Clone, Default)]
pub struct EventFactory {
    builder: FactoryBuilder<Event>,
}

impl EventFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Factory for EventFactory {
    type Model = Event;
    const KIND: &'static str = "Event";

    fn builder(&self) -> &FactoryBuilder<Event> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<Event> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Event> {
        let organizer_id = ctx.foreign_key("organizer_id", UserFactory::new())?;

        let rng = ctx.rng();
        let starts_at = rng.future_date_time(90);
        let ends_at = starts_at + Duration::hours(rng.int_between(2, 72));

        Ok(Event {
            id: None,
            organizer_id,
            title: rng.sentence(2, 5),
            city: rng.city(),
            starts_at,
            ends_at,
            capacity: rng.int_between(20, 500) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_window() {
        let mut rng = SeededRandom::new(5);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        for event in EventFactory::new().make_many(10, &mut ctx).unwrap() {
            let hours = (event.ends_at - event.starts_at).num_hours();
            assert!((2..=72).contains(&hours));
            assert!((20..=500).contains(&event.capacity));
        }
    }
}

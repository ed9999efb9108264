use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

use super::saved_search::SavedSearchFactory;
use super::user::UserFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFrequency {
    Instant,
    Daily,
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchAlert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user_id: RecordId,
    pub saved_search_id: RecordId,
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub frequency: AlertFrequency,
    pub is_active: bool,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub matches_count: u32,
}

impl_has_id!(SearchAlert);

#[derive(Debug, Clone, Default)]
pub struct SearchAlertFactory {
    builder: FactoryBuilder<SearchAlert>,
}

impl SearchAlertFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instant(self) -> Self {
        self.state(frequency("instant", AlertFrequency::Instant))
    }

    pub fn daily(self) -> Self {
        self.state(frequency("daily", AlertFrequency::Daily))
    }

    pub fn weekly(self) -> Self {
        self.state(frequency("weekly", AlertFrequency::Weekly))
    }

    pub fn inactive(self) -> Self {
        self.state(inactive())
    }

    pub fn high_volume(self) -> Self {
        self.state(high_volume())
    }
}

fn frequency(name: &'static str, frequency: AlertFrequency) -> State<SearchAlert> {
    State::new(name, move |alert: &mut SearchAlert, _ctx: &mut FactoryContext<'_>| {
        alert.frequency = frequency;
        Ok(())
    })
}

fn inactive() -> State<SearchAlert> {
    State::new("inactive", |alert: &mut SearchAlert, _ctx: &mut FactoryContext<'_>| {
        alert.is_active = false;
        Ok(())
    })
}

fn high_volume() -> State<SearchAlert> {
    State::new("highVolume", |alert: &mut SearchAlert, ctx: &mut FactoryContext<'_>| {
        alert.matches_count = ctx.rng().int_between(200, 1_000) as u32;
        Ok(())
    })
}

impl Factory for SearchAlertFactory {
    type Model = SearchAlert;
    const KIND: &'static str = "SearchAlert";

    fn builder(&self) -> &FactoryBuilder<SearchAlert> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<SearchAlert> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<SearchAlert> {
        let user_id = ctx.foreign_key("user_id", UserFactory::new())?;
        // The saved search belongs to the alert's owner
        let saved_search_id = ctx.foreign_key(
            "saved_search_id",
            SavedSearchFactory::new().with("user_id", user_id),
        )?;

        let rng = ctx.rng();
        Ok(SearchAlert {
            id: None,
            user_id,
            saved_search_id,
            keywords: rng.words(1, 4),
            location: rng.optional(0.7, |r| r.city()),
            frequency: *rng.element(&[
                AlertFrequency::Instant,
                AlertFrequency::Daily,
                AlertFrequency::Weekly,
            ]),
            is_active: rng.chance(0.9),
            last_sent_at: rng.optional(0.5, |r| r.past_date_time(14)),
            matches_count: rng.int_between(0, 50) as u32,
        })
    }

    fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<SearchAlert>> {
        match name {
            "instant" => Ok(frequency("instant", AlertFrequency::Instant)),
            "daily" => Ok(frequency("daily", AlertFrequency::Daily)),
            "weekly" => Ok(frequency("weekly", AlertFrequency::Weekly)),
            "inactive" => Ok(inactive()),
            "highVolume" => Ok(high_volume()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["instant", "daily", "weekly", "inactive", "highVolume"]
    }
}

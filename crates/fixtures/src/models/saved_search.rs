use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserFactory;

const CATEGORIES: &[&str] = &["events", "scholarships", "posts", "people", "jobs"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SavedSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user_id: RecordId,
    pub name: String,
    pub query: String,
    pub filters: JsonValue,
    pub share_token: Uuid,
    pub notify: bool,
    pub use_count: u32,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl_has_id!(SavedSearch);

#[derive(Debug, Clone, Default)]
pub struct SavedSearchFactory {
    builder: FactoryBuilder<SavedSearch>,
}

impl SavedSearchFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifications(self) -> Self {
        self.state(with_notifications())
    }

    pub fn frequently_used(self) -> Self {
        self.state(frequently_used())
    }
}

fn with_notifications() -> State<SavedSearch> {
    State::new("withNotifications", |search: &mut SavedSearch, _ctx: &mut FactoryContext<'_>| {
        search.notify = true;
        Ok(())
    })
}

fn frequently_used() -> State<SavedSearch> {
    State::new("frequentlyUsed", |search: &mut SavedSearch, ctx: &mut FactoryContext<'_>| {
        let rng = ctx.rng();
        search.use_count = rng.int_between(50, 500) as u32;
        search.last_used_at = Some(rng.past_date_time(7));
        Ok(())
    })
}

impl Factory for SavedSearchFactory {
    type Model = SavedSearch;
    const KIND: &'static str = "SavedSearch";

    fn builder(&self) -> &FactoryBuilder<SavedSearch> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<SavedSearch> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<SavedSearch> {
        let user_id = ctx.foreign_key("user_id", UserFactory::new())?;

        let rng = ctx.rng();
        let query = rng.words(1, 4).join(" ");
        let filters = json!({
            "category": *rng.element(CATEGORIES),
            "location": rng.optional(0.5, |r| r.city()),
            "posted_within_days": *rng.element(&[7, 30, 90]),
        });

        Ok(SavedSearch {
            id: None,
            user_id,
            name: format!("{} search", rng.word()),
            query,
            filters,
            share_token: rng.uuid(),
            notify: rng.chance(0.5),
            use_count: rng.int_between(0, 20) as u32,
            last_used_at: rng.optional(0.7, |r| r.past_date_time(30)),
        })
    }

    fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<SavedSearch>> {
        match name {
            "withNotifications" => Ok(with_notifications()),
            "frequentlyUsed" => Ok(frequently_used()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["withNotifications", "frequentlyUsed"]
    }
}

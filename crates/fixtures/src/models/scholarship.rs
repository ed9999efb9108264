use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scholarship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    pub amount: f64,
    pub deadline: DateTime<Utc>,
    pub is_open: bool,
}

impl_has_id!(Scholarship);

#[derive(Debug, Clone, Default)]
pub struct ScholarshipFactory {
    builder: FactoryBuilder<Scholarship>,
}

impl ScholarshipFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closed(self) -> Self {
        self.state(closed())
    }
}

/// No longer accepting applications; the deadline has passed
fn closed() -> State<Scholarship> {
    State::new("closed", |scholarship: &mut Scholarship, ctx: &mut FactoryContext<'_>| {
        scholarship.is_open = false;
        scholarship.deadline = ctx.rng().past_date_time(30);
        Ok(())
    })
}

impl Factory for ScholarshipFactory {
    type Model = Scholarship;
    const KIND: &'static str = "Scholarship";

    fn builder(&self) -> &FactoryBuilder<Scholarship> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<Scholarship> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Scholarship> {
        let rng = ctx.rng();
        Ok(Scholarship {
            id: None,
            title: format!("{} Scholarship", rng.company_name()),
            amount: rng.float_between(500.0, 20_000.0, 2),
            deadline: rng.future_date_time(180),
            is_open: rng.chance(0.8),
        })
    }

    fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<Scholarship>> {
        match name {
            "closed" => Ok(closed()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["closed"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_and_closed_state() {
        let mut rng = SeededRandom::new(8);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let scholarship = ScholarshipFactory::new().make(&mut ctx).unwrap();
        assert!((500.0..=20_000.0).contains(&scholarship.amount));
        assert_eq!((scholarship.amount * 100.0).round() / 100.0, scholarship.amount);

        let closed = ScholarshipFactory::new().closed().make(&mut ctx).unwrap();
        assert!(!closed.is_open);
        assert!(closed.deadline <= Utc::now());
    }
}

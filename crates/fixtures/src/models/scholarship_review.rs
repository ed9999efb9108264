use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

use super::scholarship::ScholarshipFactory;
use super::user::UserFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StronglyRecommend,
    Recommend,
    Neutral,
    DoNotRecommend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScholarshipReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub scholarship_id: RecordId,
    pub reviewer_id: RecordId,
    pub rating: u8,
    pub score: f64,
    pub comments: String,
    pub recommendation: Recommendation,
    pub status: ReviewStatus,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl_has_id!(ScholarshipReview);

#[derive(Debug, Clone, Default)]
pub struct ScholarshipReviewFactory {
    builder: FactoryBuilder<ScholarshipReview>,
}

impl ScholarshipReviewFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(self) -> Self {
        self.state(unfinished("pending", ReviewStatus::Pending))
    }

    pub fn in_progress(self) -> Self {
        self.state(unfinished("inProgress", ReviewStatus::InProgress))
    }

    pub fn completed(self) -> Self {
        self.state(completed())
    }

    pub fn highly_rated(self) -> Self {
        self.state(highly_rated())
    }
}

fn unfinished(name: &'static str, status: ReviewStatus) -> State<ScholarshipReview> {
    State::new(name, move |review: &mut ScholarshipReview, _ctx: &mut FactoryContext<'_>| {
        review.status = status;
        review.reviewed_at = None;
        Ok(())
    })
}

fn completed() -> State<ScholarshipReview> {
    State::new("completed", |review: &mut ScholarshipReview, ctx: &mut FactoryContext<'_>| {
        review.status = ReviewStatus::Completed;
        review.reviewed_at = Some(ctx.rng().past_date_time(14));
        Ok(())
    })
}

fn highly_rated() -> State<ScholarshipReview> {
    State::new("highlyRated", |review: &mut ScholarshipReview, ctx: &mut FactoryContext<'_>| {
        review.rating = 5;
        review.score = ctx.rng().float_between(90.0, 100.0, 2);
        review.recommendation = Recommendation::StronglyRecommend;
        Ok(())
    })
}

impl Factory for ScholarshipReviewFactory {
    type Model = ScholarshipReview;
    const KIND: &'static str = "ScholarshipReview";

    fn builder(&self) -> &FactoryBuilder<ScholarshipReview> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<ScholarshipReview> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<ScholarshipReview> {
        let scholarship_id = ctx.foreign_key("scholarship_id", ScholarshipFactory::new())?;
        let reviewer_id = ctx.foreign_key("reviewer_id", UserFactory::new())?;

        let rng = ctx.rng();
        Ok(ScholarshipReview {
            id: None,
            scholarship_id,
            reviewer_id,
            rating: rng.int_between(1, 5) as u8,
            score: rng.float_between(0.0, 100.0, 2),
            comments: rng.paragraph(1, 4),
            recommendation: *rng.element(&[
                Recommendation::StronglyRecommend,
                Recommendation::Recommend,
                Recommendation::Neutral,
                Recommendation::DoNotRecommend,
            ]),
            status: ReviewStatus::Pending,
            reviewed_at: None,
        })
    }

    fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<ScholarshipReview>> {
        match name {
            "pending" => Ok(unfinished("pending", ReviewStatus::Pending)),
            "inProgress" => Ok(unfinished("inProgress", ReviewStatus::InProgress)),
            "completed" => Ok(completed()),
            "highlyRated" => Ok(highly_rated()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["pending", "inProgress", "completed", "highlyRated"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_states() {
        let mut rng = SeededRandom::new(31);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let review = ScholarshipReviewFactory::new().make(&mut ctx).unwrap();
        assert!((1..=5).contains(&review.rating));
        assert!((0.0..=100.0).contains(&review.score));
        assert_eq!(review.status, ReviewStatus::Pending);

        let done = ScholarshipReviewFactory::new()
            .completed()
            .highly_rated()
            .make(&mut ctx)
            .unwrap();
        assert_eq!(done.status, ReviewStatus::Completed);
        assert!(done.reviewed_at.is_some());
        assert_eq!(done.rating, 5);
        assert!(done.score >= 90.0);

        let reopened = ScholarshipReviewFactory::new()
            .completed()
            .in_progress()
            .make(&mut ctx)
            .unwrap();
        assert_eq!(reopened.status, ReviewStatus::InProgress);
        assert!(reopened.reviewed_at.is_none());
    }
}

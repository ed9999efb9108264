//! # elif-fixtures
//!
//! Model factories for every entity kind of the application, built on
//! [`elif_factory`]. Use the typed factories directly:
//!
//! ```rust,no_run
//! use elif_factory::prelude::*;
//! use elif_fixtures::models::AbTestFactory;
//!
//! let mut rng = SeededRandom::new(42);
//! let mut store = InMemoryStore::new();
//! let mut ctx = FactoryContext::new(&mut rng, &mut store);
//!
//! let test = AbTestFactory::new().completed().create(&mut ctx)?;
//! assert!(test.started_at <= test.ended_at);
//! # Ok::<(), FactoryError>(())
//! ```
//!
//! or go through [`registry()`] by kind name and override names.

pub mod models;
pub mod seeders;

use elif_factory::FactoryRegistry;

use crate::models::*;

/// Registry holding a factory for every entity kind
pub fn registry() -> FactoryRegistry {
    FactoryRegistry::new()
        .with(UserFactory::new())
        .with(PostFactory::new())
        .with(EventFactory::new())
        .with(ScholarshipFactory::new())
        .with(AbTestFactory::new())
        .with(BrandTemplateFactory::new())
        .with(CommentFactory::new())
        .with(SocialConnectionFactory::new())
        .with(EventConnectionFactory::new())
        .with(PostEngagementFactory::new())
        .with(SavedSearchFactory::new())
        .with(ScholarshipReviewFactory::new())
        .with(SearchAlertFactory::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_kind() {
        let registry = registry();

        assert_eq!(registry.factory_count(), 13);
        assert_eq!(
            registry.kinds(),
            vec![
                "ABTest",
                "BrandTemplate",
                "Comment",
                "Event",
                "EventConnection",
                "Post",
                "PostEngagement",
                "SavedSearch",
                "Scholarship",
                "ScholarshipReview",
                "SearchAlert",
                "SocialConnection",
                "User",
            ]
        );
        assert_eq!(
            registry.states("ABTest").unwrap(),
            &["active", "completed", "draft", "paused", "twoVariants", "variantCount"]
        );
    }
}

//! One typed model and factory per entity kind

/// Implements `HasId` for models carrying `id: Option<RecordId>`
macro_rules! impl_has_id {
    ($($model:ty),+ $(,)?) => {
        $(
            impl ::elif_factory::HasId for $model {
                fn id(&self) -> Option<::elif_factory::RecordId> {
                    self.id
                }

                fn set_id(&mut self, id: ::elif_factory::RecordId) {
                    self.id = Some(id);
                }
            }
        )+
    };
}

pub mod brand_template;
pub mod comment;
pub mod event;
pub mod event_connection;
pub mod post;
pub mod post_engagement;
pub mod saved_search;
pub mod scholarship;
pub mod scholarship_review;
pub mod search_alert;
pub mod social_connection;
pub mod user;

pub use ab_test::{AbTest, AbTestFactory, AbTestStatus, TargetMetric, TestType};
pub use brand_template::{BrandTemplate, BrandTemplateFactory, TemplateCategory};
pub use comment::{Comment, CommentFactory};
pub use event::{Event, EventFactory};
pub use event_connection::{ConnectionStatus, EventConnection, EventConnectionFactory};
pub use post::{Post, PostFactory, PostStatus};
pub use post_engagement::{EngagementPlatform, EngagementType, PostEngagement, PostEngagementFactory};
pub use saved_search::{SavedSearch, SavedSearchFactory};
pub use scholarship::{Scholarship, ScholarshipFactory};
pub use scholarship_review::{
    Recommendation, ReviewStatus, ScholarshipReview, ScholarshipReviewFactory,
};
pub use search_alert::{AlertFrequency, SearchAlert, SearchAlertFactory};
pub use social_connection::{Provider, SocialConnection, SocialConnectionFactory};
pub use user::{User, UserFactory, UserRole};

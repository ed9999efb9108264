//! Default seeding plan

use elif_factory::prelude::*;
use elif_factory::{Environment, FactorySeeder, SeededIds, Seeder, SeederManager};

use crate::models::*;

/// Seeds a post with a comment thread: top-level comments, a reply to each,
/// and mentions on the first reply. Authors are drawn from `users`.
pub struct CommentThreadSeeder {
    comments: usize,
    users: SeededIds,
}

impl CommentThreadSeeder {
    pub fn new(comments: usize, users: &SeededIds) -> Self {
        Self {
            comments,
            users: users.clone(),
        }
    }
}

impl Seeder for CommentThreadSeeder {
    fn name(&self) -> &str {
        "comment_threads"
    }

    fn dependencies(&self) -> Vec<String> {
        vec!["users".to_string(), "posts".to_string()]
    }

    fn run(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<()> {
        let author = self.users.pick("user_id", &[], ctx)?;
        let post = PostFactory::new().published().with("user_id", author).create(ctx)?;
        let post_id = post.id.ok_or_else(|| FactoryError::MissingIdentifier {
            kind: PostFactory::KIND.to_string(),
        })?;

        for i in 0..self.comments {
            let commenter = self.users.pick("user_id", &[], ctx)?;
            let parent = CommentFactory::new()
                .with("post_id", post_id)
                .with("user_id", commenter)
                .create(ctx)?;

            let replier = self.users.pick("user_id", &[commenter], ctx)?;
            let mut reply = CommentFactory::new().reply(&parent)?.with("user_id", replier);
            if i == 0 {
                reply = reply.with_mentions(Vec::<String>::new());
            }
            reply.create(ctx)?;
        }

        tracing::info!(seeder = self.name(), post_id, threads = self.comments, "seeder completed");
        Ok(())
    }
}

/// Seeders for development and testing databases, in dependency order.
/// Records reference the users, posts, events and scholarships seeded before them.
pub fn database_seeder() -> SeederManager {
    let everywhere = vec![
        Environment::Development,
        Environment::Testing,
        Environment::Staging,
    ];
    let users = SeededIds::new();
    let posts = SeededIds::new();
    let events = SeededIds::new();
    let scholarships = SeededIds::new();

    SeederManager::new()
        .add(
            FactorySeeder::new("users", UserFactory::new(), 10)
                .environments(everywhere.clone())
                .with_priority(10)
                .collect_ids(&users),
        )
        .add(
            FactorySeeder::new("admins", UserFactory::new().admin(), 1)
                .environments(vec![
                    Environment::Development,
                    Environment::Testing,
                    Environment::Staging,
                    Environment::Production,
                ])
                .with_priority(10),
        )
        .add(
            FactorySeeder::new("posts", PostFactory::new(), 10)
                .assign("user_id", &users)
                .collect_ids(&posts)
                .depends_on(["users"]),
        )
        .add(
            FactorySeeder::new("events", EventFactory::new(), 5)
                .assign("organizer_id", &users)
                .collect_ids(&events)
                .depends_on(["users"]),
        )
        .add(
            FactorySeeder::new("scholarships", ScholarshipFactory::new(), 5)
                .with_priority(20)
                .collect_ids(&scholarships),
        )
        .add(
            FactorySeeder::new("ab_tests", AbTestFactory::new().active(), 3)
                .assign("created_by", &users)
                .depends_on(["users"]),
        )
        .add(
            FactorySeeder::new("brand_templates", BrandTemplateFactory::new(), 5)
                .assign("user_id", &users)
                .depends_on(["users"]),
        )
        .add(CommentThreadSeeder::new(3, &users))
        .add(
            FactorySeeder::new("social_connections", SocialConnectionFactory::new(), 5)
                .assign("user_id", &users)
                .depends_on(["users"]),
        )
        .add(
            FactorySeeder::new("event_connections", EventConnectionFactory::new(), 5)
                .assign("event_id", &events)
                .assign("requester_id", &users)
                .assign("recipient_id", &users)
                .depends_on(["users", "events"]),
        )
        .add(
            FactorySeeder::new("post_engagements", PostEngagementFactory::new(), 20)
                .assign("post_id", &posts)
                .assign("user_id", &users)
                .depends_on(["users", "posts"]),
        )
        .add(
            FactorySeeder::new("saved_searches", SavedSearchFactory::new(), 5)
                .assign("user_id", &users)
                .depends_on(["users"]),
        )
        .add(
            FactorySeeder::new("scholarship_reviews", ScholarshipReviewFactory::new().completed(), 5)
                .assign("scholarship_id", &scholarships)
                .assign("reviewer_id", &users)
                .depends_on(["users", "scholarships"]),
        )
        .add(
            FactorySeeder::new("search_alerts", SearchAlertFactory::new(), 5)
                .assign("user_id", &users)
                .depends_on(["users"]),
        )
}

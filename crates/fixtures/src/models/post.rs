use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

use super::user::UserFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user_id: RecordId,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
}

impl_has_id!(Post);

#[derive(Debug, Clone, Default)]
pub struct PostFactory {
    builder: FactoryBuilder<Post>,
}

impl PostFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(self) -> Self {
        self.state(published())
    }

    pub fn draft(self) -> Self {
        self.state(draft())
    }
}

fn published() -> State<Post> {
    State::new("published", |post: &mut Post, ctx: &mut FactoryContext<'_>| {
        post.status = PostStatus::Published;
        if post.published_at.is_none() {
            post.published_at = Some(ctx.rng().past_date_time(30));
        }
        Ok(())
    })
}

fn draft() -> State<Post> {
    State::new("draft", |post: &mut Post, _ctx: &mut FactoryContext<'_>| {
        post.status = PostStatus::Draft;
        post.published_at = None;
        Ok(())
    })
}

impl Factory for PostFactory {
    type Model = Post;
    const KIND: &'static str = "Post";

    fn builder(&self) -> &FactoryBuilder<Post> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<Post> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Post> {
        let user_id = ctx.foreign_key("user_id", UserFactory::new())?;

        let rng = ctx.rng();
        let title = rng.sentence(3, 8);
        let slug = title
            .trim_end_matches('.')
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        let status = *rng.weighted(&[(PostStatus::Published, 7), (PostStatus::Draft, 3)]);
        let published_at = match status {
            PostStatus::Published => Some(rng.past_date_time(90)),
            PostStatus::Draft => None,
        };

        Ok(Post {
            id: None,
            user_id,
            title,
            slug,
            body: rng.paragraph(2, 5),
            status,
            published_at,
        })
    }

    fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<Post>> {
        match name {
            "published" => Ok(published()),
            "draft" => Ok(draft()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["published", "draft"]
    }
}

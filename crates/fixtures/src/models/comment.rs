//! Comments on posts, including threaded replies and `@mentions`

use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

use super::post::PostFactory;
use super::user::UserFactory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub post_id: RecordId,
    pub user_id: RecordId,
    pub parent_id: Option<RecordId>,
    pub content: String,
    pub mentions: Vec<String>,
    pub likes_count: u32,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
}

impl_has_id!(Comment);

#[derive(Debug, Clone, Default)]
pub struct CommentFactory {
    builder: FactoryBuilder<Comment>,
}

impl CommentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mention `usernames`, or one to three random users when empty
    pub fn with_mentions<S: Into<String>>(self, usernames: impl IntoIterator<Item = S>) -> Self {
        let usernames = usernames.into_iter().map(Into::into).collect();
        self.state(with_mentions(usernames))
    }

    /// Reply to a persisted comment, on the same post
    pub fn reply(self, parent: &Comment) -> FactoryResult<Self> {
        Ok(self.state(reply(parent)?))
    }

    pub fn popular(self) -> Self {
        self.state(popular())
    }

    pub fn edited(self) -> Self {
        self.state(edited())
    }
}

fn with_mentions(usernames: Vec<String>) -> State<Comment> {
    State::new("withMentions", move |comment: &mut Comment, ctx: &mut FactoryContext<'_>| {
        let names = if usernames.is_empty() {
            let rng = ctx.rng();
            let count = rng.int_between(1, 3);
            (0..count).map(|_| rng.user_name()).collect()
        } else {
            usernames.clone()
        };

        let tags = names
            .iter()
            .map(|name| format!("@{}", name))
            .collect::<Vec<_>>()
            .join(" ");
        comment.content = if comment.content.is_empty() {
            tags
        } else {
            format!("{} {}", comment.content, tags)
        };
        comment.mentions.extend(names);
        Ok(())
    })
}

fn reply(parent: &Comment) -> FactoryResult<State<Comment>> {
    let parent_id = parent.id.ok_or_else(|| FactoryError::MissingIdentifier {
        kind: CommentFactory::KIND.to_string(),
    })?;
    let post_id = parent.post_id;

    let state = State::new("reply", move |comment: &mut Comment, _ctx: &mut FactoryContext<'_>| {
        comment.parent_id = Some(parent_id);
        comment.post_id = post_id;
        Ok(())
    });
    Ok(state.bind("post_id", post_id))
}

fn popular() -> State<Comment> {
    State::new("popular", |comment: &mut Comment, ctx: &mut FactoryContext<'_>| {
        comment.likes_count = ctx.rng().int_between(100, 1_000) as u32;
        Ok(())
    })
}

fn edited() -> State<Comment> {
    State::new("edited", |comment: &mut Comment, ctx: &mut FactoryContext<'_>| {
        comment.is_edited = true;
        comment.edited_at = Some(ctx.rng().past_date_time(7));
        Ok(())
    })
}

impl Factory for CommentFactory {
    type Model = Comment;
    const KIND: &'static str = "Comment";

    fn builder(&self) -> &FactoryBuilder<Comment> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<Comment> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Comment> {
        let post_id = ctx.foreign_key("post_id", PostFactory::new())?;
        let user_id = ctx.foreign_key("user_id", UserFactory::new())?;

        let rng = ctx.rng();
        let is_edited = rng.chance(0.1);
        let edited_at = if is_edited {
            Some(rng.past_date_time(7))
        } else {
            None
        };

        Ok(Comment {
            id: None,
            post_id,
            user_id,
            parent_id: None,
            content: rng.paragraph(1, 3),
            mentions: Vec::new(),
            likes_count: rng.int_between(0, 50) as u32,
            is_edited,
            edited_at,
        })
    }

    fn named_state(name: &str, params: &StateParams) -> FactoryResult<State<Comment>> {
        match name {
            "withMentions" => {
                let usernames: Option<Vec<String>> = params.get(name, "usernames")?;
                Ok(with_mentions(usernames.unwrap_or_default()))
            }
            "reply" => {
                let parent: Comment = params.require(name, "parent")?;
                reply(&parent)
            }
            "popular" => Ok(popular()),
            "edited" => Ok(edited()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["withMentions", "reply", "popular", "edited"]
    }
}

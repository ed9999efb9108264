use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

use super::post::PostFactory;
use super::user::UserFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementType {
    Like,
    Share,
    Save,
    View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementPlatform {
    Web,
    Ios,
    Android,
    Email,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostEngagement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub post_id: RecordId,
    pub user_id: RecordId,
    pub engagement_type: EngagementType,
    pub platform: EngagementPlatform,
    /// Only recorded for views
    pub duration_seconds: Option<u32>,
    pub engaged_at: DateTime<Utc>,
}

impl_has_id!(PostEngagement);

#[derive(Debug, Clone, Default)]
pub struct PostEngagementFactory {
    builder: FactoryBuilder<PostEngagement>,
}

impl PostEngagementFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn like(self) -> Self {
        self.engagement_type(EngagementType::Like)
    }

    pub fn share(self) -> Self {
        self.engagement_type(EngagementType::Share)
    }

    pub fn save(self) -> Self {
        self.engagement_type(EngagementType::Save)
    }

    pub fn view(self) -> Self {
        self.engagement_type(EngagementType::View)
    }

    pub fn engagement_type(self, engagement_type: EngagementType) -> Self {
        self.state(of_type(state_name(engagement_type), engagement_type))
    }
}

fn state_name(engagement_type: EngagementType) -> &'static str {
    match engagement_type {
        EngagementType::Like => "like",
        EngagementType::Share => "share",
        EngagementType::Save => "save",
        EngagementType::View => "view",
    }
}

fn view_duration(rng: &mut dyn RandomSource) -> u32 {
    rng.int_between(5, 600) as u32
}

fn of_type(name: &'static str, engagement_type: EngagementType) -> State<PostEngagement> {
    State::new(name, move |engagement: &mut PostEngagement, ctx: &mut FactoryContext<'_>| {
        engagement.engagement_type = engagement_type;
        engagement.duration_seconds = match (engagement_type, engagement.duration_seconds) {
            (EngagementType::View, Some(seconds)) => Some(seconds),
            (EngagementType::View, None) => Some(view_duration(ctx.rng())),
            _ => None,
        };
        Ok(())
    })
}

impl Factory for PostEngagementFactory {
    type Model = PostEngagement;
    const KIND: &'static str = "PostEngagement";

    fn builder(&self) -> &FactoryBuilder<PostEngagement> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<PostEngagement> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<PostEngagement> {
        let post_id = ctx.foreign_key("post_id", PostFactory::new())?;
        let user_id = ctx.foreign_key("user_id", UserFactory::new())?;

        let rng = ctx.rng();
        let engagement_type = *rng.weighted(&[
            (EngagementType::View, 5),
            (EngagementType::Like, 3),
            (EngagementType::Save, 1),
            (EngagementType::Share, 1),
        ]);
        let duration_seconds = match engagement_type {
            EngagementType::View => Some(view_duration(rng)),
            _ => None,
        };

        Ok(PostEngagement {
            id: None,
            post_id,
            user_id,
            engagement_type,
            platform: *rng.element(&[
                EngagementPlatform::Web,
                EngagementPlatform::Ios,
                EngagementPlatform::Android,
                EngagementPlatform::Email,
            ]),
            duration_seconds,
            engaged_at: rng.past_date_time(30),
        })
    }

    fn named_state(name: &str, params: &StateParams) -> FactoryResult<State<PostEngagement>> {
        match name {
            "like" => Ok(of_type("like", EngagementType::Like)),
            "share" => Ok(of_type("share", EngagementType::Share)),
            "save" => Ok(of_type("save", EngagementType::Save)),
            "view" => Ok(of_type("view", EngagementType::View)),
            "engagementType" => Ok(of_type("engagementType", params.require(name, "type")?)),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["like", "share", "save", "view", "engagementType"]
    }
}

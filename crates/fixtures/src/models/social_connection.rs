use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

use super::user::UserFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Twitter,
    Facebook,
    Instagram,
    Linkedin,
    Tiktok,
    Youtube,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::Twitter,
        Provider::Facebook,
        Provider::Instagram,
        Provider::Linkedin,
        Provider::Tiktok,
        Provider::Youtube,
    ];

    /// Public profile URL for `username` on this provider
    pub fn profile_url(&self, username: &str) -> String {
        match self {
            Provider::Twitter => format!("https://twitter.com/{}", username),
            Provider::Facebook => format!("https://facebook.com/{}", username),
            Provider::Instagram => format!("https://instagram.com/{}", username),
            Provider::Linkedin => format!("https://linkedin.com/in/{}", username),
            Provider::Tiktok => format!("https://tiktok.com/@{}", username),
            Provider::Youtube => format!("https://youtube.com/@{}", username),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub user_id: RecordId,
    pub provider: Provider,
    pub provider_user_id: String,
    pub username: String,
    pub profile_url: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub followers_count: u32,
    pub is_active: bool,
    pub connected_at: DateTime<Utc>,
}

impl_has_id!(SocialConnection);

#[derive(Debug, Clone, Default)]
pub struct SocialConnectionFactory {
    builder: FactoryBuilder<SocialConnection>,
}

impl SocialConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expired(self) -> Self {
        self.state(expired())
    }

    pub fn inactive(self) -> Self {
        self.state(inactive())
    }

    pub fn provider(self, provider: Provider) -> Self {
        self.state(with_provider(provider))
    }

    pub fn influencer(self) -> Self {
        self.state(influencer())
    }
}

fn expired() -> State<SocialConnection> {
    State::new("expired", |connection: &mut SocialConnection, ctx: &mut FactoryContext<'_>| {
        connection.token_expires_at = Some(ctx.rng().past_date_time(30));
        Ok(())
    })
}

fn inactive() -> State<SocialConnection> {
    State::new("inactive", |connection: &mut SocialConnection, _ctx: &mut FactoryContext<'_>| {
        connection.is_active = false;
        Ok(())
    })
}

fn with_provider(provider: Provider) -> State<SocialConnection> {
    State::new("provider", move |connection: &mut SocialConnection, _ctx: &mut FactoryContext<'_>| {
        connection.provider = provider;
        connection.profile_url = provider.profile_url(&connection.username);
        Ok(())
    })
}

fn influencer() -> State<SocialConnection> {
    State::new("influencer", |connection: &mut SocialConnection, ctx: &mut FactoryContext<'_>| {
        connection.followers_count = ctx.rng().int_between(100_000, 1_000_000) as u32;
        Ok(())
    })
}

impl Factory for SocialConnectionFactory {
    type Model = SocialConnection;
    const KIND: &'static str = "SocialConnection";

    fn builder(&self) -> &FactoryBuilder<SocialConnection> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<SocialConnection> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<SocialConnection> {
        let user_id = ctx.foreign_key("user_id", UserFactory::new())?;

        let rng = ctx.rng();
        let provider = *rng.element(&Provider::ALL);
        let username = rng.user_name();

        Ok(SocialConnection {
            id: None,
            user_id,
            provider,
            provider_user_id: rng.digits(12),
            profile_url: provider.profile_url(&username),
            username,
            access_token: rng.token(40),
            refresh_token: rng.optional(0.5, |r| r.token(40)),
            token_expires_at: rng.optional(0.8, |r| r.future_date_time(60)),
            followers_count: rng.int_between(0, 10_000) as u32,
            is_active: rng.chance(0.9),
            connected_at: rng.past_date_time(365),
        })
    }

    fn named_state(name: &str, params: &StateParams) -> FactoryResult<State<SocialConnection>> {
        match name {
            "expired" => Ok(expired()),
            "inactive" => Ok(inactive()),
            "provider" => Ok(with_provider(params.require(name, "provider")?)),
            "influencer" => Ok(influencer()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["expired", "inactive", "provider", "influencer"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_connection_defaults() {
        let mut rng = SeededRandom::new(17);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let connection = SocialConnectionFactory::new().make(&mut ctx).unwrap();
        assert_eq!(connection.access_token.len(), 40);
        assert_eq!(connection.provider_user_id.len(), 12);
        assert!(connection.profile_url.ends_with(&connection.username));
        assert!(connection.followers_count <= 10_000);
    }

    #[test]
    fn test_provider_state_rewrites_profile_url() {
        let mut rng = SeededRandom::new(17);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let connection = SocialConnectionFactory::new()
            .provider(Provider::Linkedin)
            .influencer()
            .expired()
            .make(&mut ctx)
            .unwrap();

        assert_eq!(connection.provider, Provider::Linkedin);
        assert!(connection.profile_url.starts_with("https://linkedin.com/in/"));
        assert!(connection.followers_count >= 100_000);
        assert!(connection.token_expires_at.unwrap() <= Utc::now());
    }

    #[test]
    fn test_provider_parameter_is_validated() {
        let params = StateParams::new().with("provider", "myspace");
        let err = SocialConnectionFactory::named_state("provider", &params).unwrap_err();
        assert!(matches!(err, FactoryError::InvalidOverrideParameter { .. }));

        let params = StateParams::new().with("provider", "tiktok");
        assert!(SocialConnectionFactory::named_state("provider", &params).is_ok());
    }
}

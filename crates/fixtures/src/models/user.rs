use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: UserRole,
}

impl_has_id!(User);

#[derive(Debug, Clone, Default)]
pub struct UserFactory {
    builder: FactoryBuilder<User>,
}

impl UserFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admin(self) -> Self {
        self.state(admin())
    }
}

fn admin() -> State<User> {
    State::new("admin", |user: &mut User, _ctx: &mut FactoryContext<'_>| {
        user.role = UserRole::Admin;
        Ok(())
    })
}

impl Factory for UserFactory {
    type Model = User;
    const KIND: &'static str = "User";

    fn builder(&self) -> &FactoryBuilder<User> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<User> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<User> {
        let rng = ctx.rng();
        Ok(User {
            id: None,
            name: rng.name(),
            email: rng.safe_email(),
            username: rng.user_name(),
            role: UserRole::Member,
        })
    }

    fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<User>> {
        match name {
            "admin" => Ok(admin()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["admin"]
    }
}

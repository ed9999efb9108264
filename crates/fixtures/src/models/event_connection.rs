use elif_factory::prelude::*;
use serde::{Deserialize, Serialize};

use super::event::EventFactory;
use super::user::UserFactory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Declined,
}

/// A networking request between two attendees of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub event_id: RecordId,
    pub requester_id: RecordId,
    pub recipient_id: RecordId,
    pub status: ConnectionStatus,
    pub message: Option<String>,
    pub meeting_scheduled_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl_has_id!(EventConnection);

#[derive(Debug, Clone, Default)]
pub struct EventConnectionFactory {
    builder: FactoryBuilder<EventConnection>,
}

impl EventConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(self) -> Self {
        self.state(pending())
    }

    pub fn accepted(self) -> Self {
        self.state(responded("accepted", ConnectionStatus::Accepted))
    }

    pub fn declined(self) -> Self {
        self.state(responded("declined", ConnectionStatus::Declined))
    }

    pub fn with_meeting(self) -> Self {
        self.state(with_meeting())
    }
}

fn pending() -> State<EventConnection> {
    State::new("pending", |connection: &mut EventConnection, _ctx: &mut FactoryContext<'_>| {
        connection.status = ConnectionStatus::Pending;
        connection.responded_at = None;
        connection.meeting_scheduled_at = None;
        Ok(())
    })
}

fn responded(name: &'static str, status: ConnectionStatus) -> State<EventConnection> {
    State::new(name, move |connection: &mut EventConnection, ctx: &mut FactoryContext<'_>| {
        connection.status = status;
        if connection.responded_at.is_none() {
            connection.responded_at = Some(ctx.rng().past_date_time(7));
        }
        if status == ConnectionStatus::Declined {
            connection.meeting_scheduled_at = None;
        }
        Ok(())
    })
}

/// Accepted, with a meeting booked in the next month
fn with_meeting() -> State<EventConnection> {
    State::new("withMeeting", |connection: &mut EventConnection, ctx: &mut FactoryContext<'_>| {
        let rng = ctx.rng();
        connection.status = ConnectionStatus::Accepted;
        if connection.responded_at.is_none() {
            connection.responded_at = Some(rng.past_date_time(7));
        }
        connection.meeting_scheduled_at = Some(rng.future_date_time(30));
        Ok(())
    })
}

impl Factory for EventConnectionFactory {
    type Model = EventConnection;
    const KIND: &'static str = "EventConnection";

    fn builder(&self) -> &FactoryBuilder<EventConnection> {
        &self.builder
    }

    fn builder_mut(&mut self) -> &mut FactoryBuilder<EventConnection> {
        &mut self.builder
    }

    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<EventConnection> {
        let event_id = ctx.foreign_key("event_id", EventFactory::new())?;
        let requester_id = ctx.foreign_key("requester_id", UserFactory::new())?;
        let recipient_id = ctx.foreign_key("recipient_id", UserFactory::new())?;

        let rng = ctx.rng();
        Ok(EventConnection {
            id: None,
            event_id,
            requester_id,
            recipient_id,
            status: ConnectionStatus::Pending,
            message: rng.optional(0.6, |r| r.sentence(6, 16)),
            meeting_scheduled_at: None,
            responded_at: None,
        })
    }

    fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<EventConnection>> {
        match name {
            "pending" => Ok(pending()),
            "accepted" => Ok(responded("accepted", ConnectionStatus::Accepted)),
            "declined" => Ok(responded("declined", ConnectionStatus::Declined)),
            "withMeeting" => Ok(with_meeting()),
            other => Err(FactoryError::unknown_override(Self::KIND, other)),
        }
    }

    fn state_names() -> &'static [&'static str] {
        &["pending", "accepted", "declined", "withMeeting"]
    }
}

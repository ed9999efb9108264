//! # elif-factory: Model Factories for elif.rs
//!
//! Factories describe how to synthesize a plausible random row for one
//! entity kind. A factory is refined with named [`State`]s and pinned
//! attributes, then asked to `make` (build only) or `create` (build and
//! insert through a [`RecordStore`]) a record.
//!
//! ```text
//! definition()  ->  foreign keys  ->  states (in order)  ->  pinned attributes
//!   random base      pinned id or        last write wins       always win
//!                    fresh related
//! ```
//!
//! Randomness comes from the [`RandomSource`] in the [`FactoryContext`];
//! nothing in this crate keeps global state, so a seeded source gives
//! reproducible data.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod config;
pub mod context;
pub mod error;
pub mod fake_data;
pub mod logging;
pub mod record;
pub mod registry;
pub mod seeder;
pub mod states;
pub mod store;

pub use config::{Environment, FactoryConfig};
pub use context::FactoryContext;
pub use error::{FactoryError, FactoryResult};
pub use fake_data::{RandomSource, RandomSourceExt, SeededRandom};
pub use record::{merge_attributes, Attributes, ForeignKey, HasId, RecordId, SynthesizedRecord};
pub use registry::FactoryRegistry;
pub use seeder::{FactorySeeder, SeededIds, Seeder, SeederManager};
pub use states::{Override, State, StateParams};
pub use store::{InMemoryStore, RecordStore, Savepoint, Sequence};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Attributes, Factory, FactoryBuilder, FactoryContext, FactoryError, FactoryRegistry,
        FactoryResult, HasId, InMemoryStore, Override, RandomSource, RandomSourceExt, RecordId,
        RecordStore, SeededRandom, State, StateParams, SynthesizedRecord,
    };

    pub use chrono::{DateTime, Utc};
    pub use serde_json::{json, Value as JsonValue};
}

/// Core factory trait that all model factories implement
pub trait Factory: Clone + Send + Sync + 'static {
    /// Model produced by this factory
    type Model: Serialize + DeserializeOwned + HasId + Clone + fmt::Debug + Send;

    /// Entity kind name used by the registry and the record store
    const KIND: &'static str;

    fn builder(&self) -> &FactoryBuilder<Self::Model>;

    fn builder_mut(&mut self) -> &mut FactoryBuilder<Self::Model>;

    /// Default attributes for the model
    fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Self::Model>;

    /// Look up a state by name, as requested through the registry
    fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<Self::Model>> {
        Err(FactoryError::unknown_override(Self::KIND, name))
    }

    /// Names accepted by [`Factory::named_state`]
    fn state_names() -> &'static [&'static str] {
        &[]
    }

    /// Apply a factory state
    fn state(mut self, state: State<Self::Model>) -> Self {
        self.builder_mut().push_state(state);
        self
    }

    /// Apply a state by name
    fn apply(self, name: &str, params: &StateParams) -> FactoryResult<Self> {
        let state = Self::named_state(name, params)?;
        Ok(self.state(state))
    }

    /// Pin an attribute; pinned values are applied after every state
    fn with<V: Serialize>(mut self, key: &str, value: V) -> Self {
        self.builder_mut().set(key, value);
        self
    }

    /// Pin several attributes
    fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.builder_mut().extend(attributes);
        self
    }

    /// Build a model without persisting it.
    ///
    /// Related records referenced through foreign keys are still created
    /// unless their id was pinned. If building fails they are rolled back.
    fn make(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Self::Model> {
        let builder = self.builder();
        builder.check_pins(Self::KIND)?;

        ctx.atomic(|ctx| {
            let mut ctx = ctx.scoped(Self::KIND, builder.pins())?;

            let mut model = self.definition(&mut ctx)?;
            for state in builder.states() {
                state.apply(&mut model, &mut ctx)?;
            }
            merge_attributes(Self::KIND, &mut model, builder.attributes())?;

            tracing::debug!(
                kind = Self::KIND,
                depth = ctx.depth(),
                states = ?builder.state_names(),
                "synthesized record"
            );
            Ok(model)
        })
    }

    /// Build a model and insert it through the context's store
    fn create(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Self::Model> {
        ctx.atomic(|ctx| {
            let mut model = self.make(ctx)?;
            let record = SynthesizedRecord::from_model(Self::KIND, &model)?;
            let id = ctx.store().insert(Self::KIND, &record)?;
            model.set_id(id);

            tracing::debug!(kind = Self::KIND, id, "created record");
            Ok(model)
        })
    }

    /// Build multiple models without persisting
    fn make_many(&self, count: usize, ctx: &mut FactoryContext<'_>) -> FactoryResult<Vec<Self::Model>> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.make(ctx)?);
        }
        Ok(results)
    }

    /// Create multiple models
    fn create_many(&self, count: usize, ctx: &mut FactoryContext<'_>) -> FactoryResult<Vec<Self::Model>> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.create(ctx)?);
        }
        Ok(results)
    }

    /// Build a model and return it as a field mapping
    fn make_record(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<SynthesizedRecord> {
        SynthesizedRecord::from_model(Self::KIND, &self.make(ctx)?)
    }

    /// Create a model and return it as a field mapping (including `id`)
    fn create_record(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<SynthesizedRecord> {
        SynthesizedRecord::from_model(Self::KIND, &self.create(ctx)?)
    }
}

/// States and pinned attributes accumulated by a factory
pub struct FactoryBuilder<M> {
    attributes: Attributes,
    states: Vec<State<M>>,
    rejected: Vec<(String, String)>,
}

impl<M> FactoryBuilder<M> {
    pub fn new() -> Self {
        Self {
            attributes: Attributes::new(),
            states: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Set an attribute value. A value that cannot be serialized is kept
    /// as an error and reported by [`FactoryBuilder::check_pins`].
    pub fn set<V: Serialize>(&mut self, key: &str, value: V) {
        match serde_json::to_value(value) {
            Ok(json_value) => {
                self.rejected.retain(|(rejected, _)| rejected != key);
                self.attributes.insert(key.to_string(), json_value);
            }
            Err(error) => {
                self.attributes.remove(key);
                self.rejected.push((key.to_string(), error.to_string()));
            }
        }
    }

    /// Fails if any pinned value could not be serialized
    pub fn check_pins(&self, kind: &str) -> FactoryResult<()> {
        match self.rejected.first() {
            None => Ok(()),
            Some((key, message)) => Err(FactoryError::Serialization(serde::ser::Error::custom(
                format!("pinned attribute `{}` of {} is not serializable: {}", key, kind, message),
            ))),
        }
    }

    /// Set multiple attributes
    pub fn extend(&mut self, attributes: Attributes) {
        self.rejected.retain(|(key, _)| !attributes.contains_key(key));
        self.attributes.extend(attributes);
    }

    pub fn push_state(&mut self, state: State<M>) {
        self.states.push(state);
    }

    /// Get the pinned attributes
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn states(&self) -> &[State<M>] {
        &self.states
    }

    pub fn state_names(&self) -> Vec<&str> {
        self.states.iter().map(State::name).collect()
    }

    /// Foreign key pins: state bindings in order, then pinned attributes
    pub fn pins(&self) -> Attributes {
        let mut pins = Attributes::new();
        for state in &self.states {
            for (field, id) in state.bindings() {
                pins.insert(field.clone(), serde_json::Value::from(*id));
            }
        }
        for (key, value) in &self.attributes {
            pins.insert(key.clone(), value.clone());
        }
        pins
    }
}

impl<M> Default for FactoryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for FactoryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            states: self.states.clone(),
            rejected: self.rejected.clone(),
        }
    }
}

impl<M> fmt::Debug for FactoryBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryBuilder")
            .field("attributes", &self.attributes)
            .field("states", &self.state_names())
            .field("rejected", &self.rejected)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Minimal factories shared by the unit tests of this crate

    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct Author {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub id: Option<RecordId>,
        pub name: String,
    }

    impl HasId for Author {
        fn id(&self) -> Option<RecordId> {
            self.id
        }

        fn set_id(&mut self, id: RecordId) {
            self.id = Some(id);
        }
    }

    #[derive(Clone, Default)]
    pub struct AuthorFactory {
        builder: FactoryBuilder<Author>,
    }

    impl Factory for AuthorFactory {
        type Model = Author;
        const KIND: &'static str = "Author";

        fn builder(&self) -> &FactoryBuilder<Author> {
            &self.builder
        }

        fn builder_mut(&mut self) -> &mut FactoryBuilder<Author> {
            &mut self.builder
        }

        fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Author> {
            Ok(Author {
                id: None,
                name: ctx.rng().name(),
            })
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct Note {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub id: Option<RecordId>,
        pub author_id: RecordId,
        pub body: String,
        pub status: String,
        pub pinned_at: Option<DateTimeUtc>,
    }

    pub type DateTimeUtc = chrono::DateTime<chrono::Utc>;

    impl HasId for Note {
        fn id(&self) -> Option<RecordId> {
            self.id
        }

        fn set_id(&mut self, id: RecordId) {
            self.id = Some(id);
        }
    }

    #[derive(Clone, Default)]
    pub struct NoteFactory {
        builder: FactoryBuilder<Note>,
    }

    impl NoteFactory {
        pub fn pinned() -> State<Note> {
            State::new("pinned", |note: &mut Note, ctx: &mut FactoryContext<'_>| {
                note.status = "pinned".to_string();
                note.pinned_at = Some(ctx.rng().past_date_time(7));
                Ok(())
            })
        }
    }

    impl Factory for NoteFactory {
        type Model = Note;
        const KIND: &'static str = "Note";

        fn builder(&self) -> &FactoryBuilder<Note> {
            &self.builder
        }

        fn builder_mut(&mut self) -> &mut FactoryBuilder<Note> {
            &mut self.builder
        }

        fn definition(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Note> {
            let author_id = ctx.foreign_key("author_id", AuthorFactory::default())?;
            let rng = ctx.rng();
            Ok(Note {
                id: None,
                author_id,
                body: rng.sentence(3, 8),
                status: "open".to_string(),
                pinned_at: None,
            })
        }

        fn named_state(name: &str, _params: &StateParams) -> FactoryResult<State<Note>> {
            match name {
                "pinned" => Ok(Self::pinned()),
                other => Err(FactoryError::unknown_override(Self::KIND, other)),
            }
        }

        fn state_names() -> &'static [&'static str] {
            &["pinned"]
        }
    }
}

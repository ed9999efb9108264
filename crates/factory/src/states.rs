//! Factory states: named, composable modifications applied after the
//! default definition

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::record::{merge_attributes, Attributes, RecordId};

type ApplyFn<M> = dyn Fn(&mut M, &mut FactoryContext<'_>) -> FactoryResult<()> + Send + Sync;

/// A named modification of a model.
///
/// States run in the order they were added to a factory and see the model
/// as left by the definition and every earlier state. A state may also bind
/// foreign keys so the definition reuses an existing record instead of
/// creating a fresh one.
pub struct State<M> {
    name: Cow<'static, str>,
    apply: Arc<ApplyFn<M>>,
    bindings: Vec<(String, RecordId)>,
}

impl<M> State<M> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, apply: F) -> Self
    where
        F: Fn(&mut M, &mut FactoryContext<'_>) -> FactoryResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            apply: Arc::new(apply),
            bindings: Vec::new(),
        }
    }

    /// Reuse `id` for the foreign key `field` unless the caller pinned it
    pub fn bind(mut self, field: impl Into<String>, id: RecordId) -> Self {
        self.bindings.push((field.into(), id));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bindings(&self) -> &[(String, RecordId)] {
        &self.bindings
    }

    pub fn apply(&self, model: &mut M, ctx: &mut FactoryContext<'_>) -> FactoryResult<()> {
        (self.apply)(model, ctx)
    }
}

impl<M> State<M>
where
    M: Serialize + DeserializeOwned,
{
    /// State that merges a fixed partial mapping into the model
    pub fn attributes(name: impl Into<Cow<'static, str>>, attributes: Attributes) -> Self {
        let name = name.into();
        let kind = name.to_string();
        Self::new(name, move |model: &mut M, _ctx: &mut FactoryContext<'_>| {
            merge_attributes(&kind, model, &attributes)
        })
    }
}

impl<M> Clone for State<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            apply: Arc::clone(&self.apply),
            bindings: self.bindings.clone(),
        }
    }
}

impl<M> fmt::Debug for State<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("bindings", &self.bindings)
            .finish()
    }
}

/// Parameters passed to a state requested by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateParams {
    values: Map<String, Value>,
}

impl StateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Deserialize an optional parameter for the state `state`
    pub fn get<T: DeserializeOwned>(&self, state: &str, key: &str) -> FactoryResult<Option<T>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| FactoryError::invalid_parameter(state, key, e.to_string())),
        }
    }

    /// Deserialize a parameter the state `state` cannot run without
    pub fn require<T: DeserializeOwned>(&self, state: &str, key: &str) -> FactoryResult<T> {
        self.get(state, key)?
            .ok_or_else(|| FactoryError::invalid_parameter(state, key, "parameter is required"))
    }
}

impl From<Map<String, Value>> for StateParams {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// A state requested by name, as used by the dynamic registry
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub name: String,
    pub params: StateParams,
}

impl Override {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: StateParams::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params = self.params.with(key, value);
        self
    }
}

impl From<&str> for Override {
    fn from(name: &str) -> Self {
        Override::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_data::SeededRandom;
    use crate::store::InMemoryStore;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Task {
        status: String,
        progress: u8,
    }

    #[test]
    fn test_attribute_state_merges_fields() {
        let state = State::<Task>::attributes(
            "completed",
            Attributes::from_iter([
                ("status".to_string(), json!("completed")),
                ("progress".to_string(), json!(100)),
            ]),
        );

        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);
        let mut task = Task {
            status: "pending".to_string(),
            progress: 10,
        };

        state.apply(&mut task, &mut ctx).unwrap();

        assert_eq!(task.status, "completed");
        assert_eq!(task.progress, 100);
        assert_eq!(state.name(), "completed");
    }

    #[test]
    fn test_closure_state_reads_current_model() {
        let state = State::<Task>::new("bump", |task, _ctx| {
            task.progress = task.progress.saturating_add(5);
            Ok(())
        })
        .bind("project_id", 7);

        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);
        let mut task = Task {
            status: "pending".to_string(),
            progress: 10,
        };

        state.apply(&mut task, &mut ctx).unwrap();
        state.apply(&mut task, &mut ctx).unwrap();

        assert_eq!(task.progress, 20);
        assert_eq!(state.bindings(), &[("project_id".to_string(), 7)]);
    }

    #[test]
    fn test_state_params() {
        let params = StateParams::new()
            .with("count", 3)
            .with("usernames", json!(["amy", "bo"]));

        assert_eq!(params.require::<usize>("variantCount", "count").unwrap(), 3);
        assert_eq!(
            params.get::<Vec<String>>("withMentions", "usernames").unwrap(),
            Some(vec!["amy".to_string(), "bo".to_string()])
        );
        assert_eq!(params.get::<String>("provider", "provider").unwrap(), None);

        let err = params.require::<String>("provider", "provider").unwrap_err();
        assert!(matches!(err, FactoryError::InvalidOverrideParameter { .. }));

        let err = params.get::<String>("variantCount", "count").unwrap_err();
        assert!(matches!(err, FactoryError::InvalidOverrideParameter { .. }));
    }

    #[test]
    fn test_override_builder() {
        let o = Override::new("withMentions").param("usernames", json!(["amy"]));
        assert_eq!(o.name, "withMentions");
        assert!(o.params.contains("usernames"));
        assert!(Override::from("active").params.is_empty());
    }
}

//! Factory registry for synthesizing records by entity kind name

use std::collections::HashMap;

use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::record::{Attributes, SynthesizedRecord};
use crate::states::Override;
use crate::Factory;

/// Object-safe view of a [`Factory`], used by the registry
pub trait DynFactory: Send + Sync {
    fn kind(&self) -> &'static str;

    fn state_names(&self) -> &'static [&'static str];

    /// Apply `overrides` then `explicit`, and build (or create) one record
    fn synthesize(
        &self,
        overrides: &[Override],
        explicit: &Attributes,
        ctx: &mut FactoryContext<'_>,
        persist: bool,
    ) -> FactoryResult<SynthesizedRecord>;
}

impl<F: Factory> DynFactory for F {
    fn kind(&self) -> &'static str {
        F::KIND
    }

    fn state_names(&self) -> &'static [&'static str] {
        <F as Factory>::state_names()
    }

    fn synthesize(
        &self,
        overrides: &[Override],
        explicit: &Attributes,
        ctx: &mut FactoryContext<'_>,
        persist: bool,
    ) -> FactoryResult<SynthesizedRecord> {
        // Overrides are resolved before anything is generated. Failures after
        // that point are rolled back inside `create`/`make`.
        let mut factory = self.clone();
        for o in overrides {
            factory = factory.apply(&o.name, &o.params)?;
        }
        let factory = factory.with_attributes(explicit.clone());

        if persist {
            factory.create_record(ctx)
        } else {
            factory.make_record(ctx)
        }
    }
}

/// Factory registry for managing all model factories
#[derive(Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, Box<dyn DynFactory>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its entity kind, replacing any previous one
    pub fn register<F: Factory>(&mut self, factory: F) {
        tracing::trace!(kind = F::KIND, "registering factory");
        self.factories.insert(F::KIND.to_string(), Box::new(factory));
    }

    /// Builder-style [`FactoryRegistry::register`]
    pub fn with<F: Factory>(mut self, factory: F) -> Self {
        self.register(factory);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered entity kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Get the number of registered factories
    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    /// Named states accepted for `kind`
    pub fn states(&self, kind: &str) -> FactoryResult<&'static [&'static str]> {
        Ok(self.get(kind)?.state_names())
    }

    /// Build one record of `kind` without persisting it
    pub fn synthesize(
        &self,
        kind: &str,
        overrides: &[Override],
        explicit: Attributes,
        ctx: &mut FactoryContext<'_>,
    ) -> FactoryResult<SynthesizedRecord> {
        self.get(kind)?.synthesize(overrides, &explicit, ctx, false)
    }

    /// Build one record of `kind` and insert it through the context's store
    pub fn create(
        &self,
        kind: &str,
        overrides: &[Override],
        explicit: Attributes,
        ctx: &mut FactoryContext<'_>,
    ) -> FactoryResult<SynthesizedRecord> {
        self.get(kind)?.synthesize(overrides, &explicit, ctx, true)
    }

    /// Create `count` records of `kind`
    pub fn create_many(
        &self,
        kind: &str,
        count: usize,
        overrides: &[Override],
        explicit: Attributes,
        ctx: &mut FactoryContext<'_>,
    ) -> FactoryResult<Vec<SynthesizedRecord>> {
        let factory = self.get(kind)?;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(factory.synthesize(overrides, &explicit, ctx, true)?);
        }
        Ok(records)
    }

    fn get(&self, kind: &str) -> FactoryResult<&dyn DynFactory> {
        self.factories
            .get(kind)
            .map(|f| f.as_ref())
            .ok_or_else(|| FactoryError::UnknownEntityKind {
                kind: kind.to_string(),
            })
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

//! Per-call synthesis context

use crate::config::FactoryConfig;
use crate::error::{FactoryError, FactoryResult};
use crate::fake_data::RandomSource;
use crate::record::{Attributes, ForeignKey, HasId, RecordId};
use crate::store::RecordStore;
use crate::Factory;

/// Default limit for nested related-record creation
pub const DEFAULT_MAX_RELATION_DEPTH: usize = 8;

/// Everything a factory needs while it builds one record: the random
/// source, the store used for related records, and the foreign keys the
/// caller (or an applied state) already fixed.
pub struct FactoryContext<'a> {
    rng: &'a mut dyn RandomSource,
    store: &'a mut dyn RecordStore,
    kind: Option<&'static str>,
    pinned: Attributes,
    depth: usize,
    max_depth: usize,
}

impl<'a> FactoryContext<'a> {
    pub fn new(rng: &'a mut dyn RandomSource, store: &'a mut dyn RecordStore) -> Self {
        Self {
            rng,
            store,
            kind: None,
            pinned: Attributes::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_RELATION_DEPTH,
        }
    }

    /// Context honouring the configured relation depth limit
    pub fn from_config(
        config: &FactoryConfig,
        rng: &'a mut dyn RandomSource,
        store: &'a mut dyn RecordStore,
    ) -> Self {
        Self::new(rng, store).with_max_depth(config.max_relation_depth)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn rng(&mut self) -> &mut dyn RandomSource {
        &mut *self.rng
    }

    pub fn store(&mut self) -> &mut dyn RecordStore {
        &mut *self.store
    }

    /// Number of records currently being built in this chain (0 outside any factory)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Entity kind whose record this context is building
    pub fn kind(&self) -> Option<&'static str> {
        self.kind
    }

    /// How the foreign key `field` will be resolved
    pub fn foreign_key_source(&self, field: &str) -> FactoryResult<ForeignKey> {
        ForeignKey::from_attribute(self.kind.unwrap_or_default(), field, self.pinned.get(field))
    }

    /// Resolve a foreign key: a pinned id wins, otherwise `factory` creates
    /// a fresh related record through the store.
    pub fn foreign_key<F: Factory>(&mut self, field: &str, factory: F) -> FactoryResult<RecordId> {
        match self.foreign_key_source(field)? {
            ForeignKey::Existing(id) => Ok(id),
            ForeignKey::Create => {
                let related = factory.create(self)?;
                related.id().ok_or_else(|| FactoryError::MissingIdentifier {
                    kind: F::KIND.to_string(),
                })
            }
        }
    }

    /// Run `build` and undo every insert it made if it fails
    pub fn atomic<T, B>(&mut self, build: B) -> FactoryResult<T>
    where
        B: FnOnce(&mut Self) -> FactoryResult<T>,
    {
        let savepoint = self.store.savepoint();
        let result = build(self);
        if result.is_err() {
            if let Err(error) = self.store.rollback_to(savepoint) {
                tracing::warn!(%error, "failed to roll back partial synthesis");
            }
        }
        result
    }

    /// Child context for building one record of `kind` with its own pins
    pub(crate) fn scoped(&mut self, kind: &'static str, pinned: Attributes) -> FactoryResult<FactoryContext<'_>> {
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(FactoryError::RelationDepthExceeded {
                kind: kind.to_string(),
                limit: self.max_depth,
            });
        }

        Ok(FactoryContext {
            rng: &mut *self.rng,
            store: &mut *self.store,
            kind: Some(kind),
            pinned,
            depth,
            max_depth: self.max_depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_data::SeededRandom;
    use crate::record::SynthesizedRecord;
    use crate::store::InMemoryStore;
    use serde_json::json;

    #[test]
    fn test_foreign_key_source_follows_pins() {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        assert_eq!(ctx.foreign_key_source("user_id").unwrap(), ForeignKey::Create);
        assert_eq!(ctx.depth(), 0);

        let pins = Attributes::from_iter([
            ("user_id".to_string(), json!(5)),
            ("editor_id".to_string(), json!(null)),
        ]);
        let scoped = ctx.scoped("Post", pins).unwrap();
        assert_eq!(scoped.kind(), Some("Post"));
        assert_eq!(scoped.foreign_key_source("user_id").unwrap(), ForeignKey::Existing(5));
        assert!(matches!(
            scoped.foreign_key_source("editor_id"),
            Err(FactoryError::InvalidAttribute { kind, .. }) if kind == "Post"
        ));
        assert_eq!(scoped.depth(), 1);
    }

    #[test]
    fn test_atomic_rolls_back_on_error() {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let kept = ctx
            .atomic(|ctx| ctx.store().insert("User", &SynthesizedRecord::new("User", Attributes::new())))
            .unwrap();
        let err = ctx
            .atomic(|ctx| -> FactoryResult<()> {
                ctx.store().insert("User", &SynthesizedRecord::new("User", Attributes::new()))?;
                ctx.store().insert("Post", &SynthesizedRecord::new("Post", Attributes::new()))?;
                Err(FactoryError::seeding("boom"))
            })
            .unwrap_err();

        assert!(matches!(err, FactoryError::Seeding { .. }));
        assert_eq!(kept, 1);
        assert_eq!(store.count("User"), 1);
        assert_eq!(store.count("Post"), 0);
    }

    #[test]
    fn test_scoped_depth_limit() {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store).with_max_depth(1);

        let mut first = ctx.scoped("Comment", Attributes::new()).unwrap();
        let err = first.scoped("Post", Attributes::new()).err().unwrap();

        assert!(matches!(
            err,
            FactoryError::RelationDepthExceeded { limit: 1, .. }
        ));
    }
}

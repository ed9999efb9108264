//! Seeding with environment controls and dependency ordering

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::Environment;
use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::fake_data::RandomSourceExt;
use crate::record::{HasId, RecordId};
use crate::Factory;

/// A unit of seeding work
pub trait Seeder: Send + Sync {
    /// Seeder name used for logging and dependency references
    fn name(&self) -> &str;

    /// Environments where this seeder should run
    fn environments(&self) -> Vec<Environment> {
        vec![Environment::Development, Environment::Testing]
    }

    fn should_run(&self, env: &Environment) -> bool {
        self.environments().contains(env)
    }

    fn run(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<()>;

    /// Lower numbers run first among seeders whose dependencies are met
    fn priority(&self) -> i32 {
        100
    }

    /// Names of seeders that must run first
    fn dependencies(&self) -> Vec<String> {
        vec![]
    }
}

/// Ids created by one seeder, handed to the seeders that reference them.
/// Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct SeededIds {
    ids: Arc<Mutex<Vec<RecordId>>>,
}

impl SeededIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn extend(&self, ids: impl IntoIterator<Item = RecordId>) {
        self.lock().extend(ids);
    }

    /// Draw one id for `field`, avoiding `taken` while other ids remain
    pub fn pick(
        &self,
        field: &str,
        taken: &[RecordId],
        ctx: &mut FactoryContext<'_>,
    ) -> FactoryResult<RecordId> {
        let ids = self.ids();
        if ids.is_empty() {
            return Err(FactoryError::seeding(format!(
                "no seeded ids to assign to '{}'",
                field
            )));
        }

        let free: Vec<RecordId> = ids.iter().copied().filter(|id| !taken.contains(id)).collect();
        let candidates = if free.is_empty() { &ids } else { &free };
        Ok(*ctx.rng().element(candidates))
    }

    /// Whether both handles share one id list
    pub fn shares(&self, other: &SeededIds) -> bool {
        Arc::ptr_eq(&self.ids, &other.ids)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordId>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates `count` records with a factory
pub struct FactorySeeder<F: Factory> {
    name: String,
    factory: F,
    count: usize,
    environments: Vec<Environment>,
    priority: i32,
    dependencies: Vec<String>,
    assigned: Vec<(String, SeededIds)>,
    collect: Option<SeededIds>,
}

impl<F: Factory> FactorySeeder<F> {
    pub fn new(name: impl Into<String>, factory: F, count: usize) -> Self {
        Self {
            name: name.into(),
            factory,
            count,
            environments: vec![Environment::Development, Environment::Testing],
            priority: 100,
            dependencies: vec![],
            assigned: vec![],
            collect: None,
        }
    }

    pub fn environments(mut self, envs: Vec<Environment>) -> Self {
        self.environments = envs;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn depends_on<S: Into<String>>(mut self, dependencies: impl IntoIterator<Item = S>) -> Self {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Fill the foreign key `field` of every record with an id from `ids`
    pub fn assign(mut self, field: impl Into<String>, ids: &SeededIds) -> Self {
        self.assigned.push((field.into(), ids.clone()));
        self
    }

    /// Append the ids of the created records to `ids`
    pub fn collect_ids(mut self, ids: &SeededIds) -> Self {
        self.collect = Some(ids.clone());
        self
    }
}

impl<F: Factory> Seeder for FactorySeeder<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn environments(&self) -> Vec<Environment> {
        self.environments.clone()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }

    fn run(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<()> {
        let mut created = Vec::with_capacity(self.count);
        for _ in 0..self.count {
            let mut factory = self.factory.clone();
            let mut picked: Vec<(&SeededIds, RecordId)> = Vec::with_capacity(self.assigned.len());
            for (field, ids) in &self.assigned {
                // Two fields filled from the same ids get different records
                let taken: Vec<RecordId> = picked
                    .iter()
                    .filter(|(other, _)| other.shares(ids))
                    .map(|(_, id)| *id)
                    .collect();
                let id = ids.pick(field, &taken, ctx)?;
                picked.push((ids, id));
                factory = factory.with(field, id);
            }
            created.extend(factory.create(ctx)?.id());
        }

        if let Some(ids) = &self.collect {
            ids.extend(created.iter().copied());
        }
        tracing::info!(
            seeder = %self.name,
            kind = F::KIND,
            count = created.len(),
            "seeder completed"
        );
        Ok(())
    }
}

/// Runs a set of seeders in dependency order
#[derive(Default)]
pub struct SeederManager {
    seeders: Vec<Box<dyn Seeder>>,
}

impl SeederManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Seeder + 'static>(mut self, seeder: S) -> Self {
        self.seeders.push(Box::new(seeder));
        self
    }

    pub fn add_factory<F: Factory>(self, name: impl Into<String>, factory: F, count: usize) -> Self {
        self.add(FactorySeeder::new(name, factory, count))
    }

    pub fn len(&self) -> usize {
        self.seeders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeders.is_empty()
    }

    /// Run the seeders registered for `env`, returning their names in run order.
    ///
    /// Environments that are not safe for seeding are refused; use
    /// [`SeederManager::run_production_force`] to opt in.
    pub fn run_for_environment(
        &self,
        ctx: &mut FactoryContext<'_>,
        env: &Environment,
    ) -> FactoryResult<Vec<String>> {
        if !env.is_safe_for_seeding() {
            return Err(FactoryError::seeding(format!(
                "environment '{}' is not safe for automatic seeding, use an explicit opt-in",
                env
            )));
        }

        let applicable: Vec<&dyn Seeder> = self
            .seeders
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| s.should_run(env))
            .collect();

        tracing::info!(environment = %env, seeders = applicable.len(), "running seeders");
        self.run_ordered(ctx, applicable, false)
    }

    /// Run the seeders that list production among their environments
    pub fn run_production_force(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Vec<String>> {
        let applicable: Vec<&dyn Seeder> = self
            .seeders
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| s.should_run(&Environment::Production))
            .collect();

        tracing::warn!(seeders = applicable.len(), "force running seeders in production");
        self.run_ordered(ctx, applicable, true)
    }

    /// Run seeders for the environment named by `ELIF_ENV`/`ENV`/`ENVIRONMENT`
    pub fn run(&self, ctx: &mut FactoryContext<'_>) -> FactoryResult<Vec<String>> {
        self.run_for_environment(ctx, &Environment::current())
    }

    fn run_ordered(
        &self,
        ctx: &mut FactoryContext<'_>,
        seeders: Vec<&dyn Seeder>,
        production: bool,
    ) -> FactoryResult<Vec<String>> {
        let ordered = resolve_dependencies(seeders)?;
        let mut executed = Vec::with_capacity(ordered.len());

        for seeder in ordered {
            if production {
                tracing::warn!(seeder = seeder.name(), "running production seeder");
            } else {
                tracing::info!(seeder = seeder.name(), "running seeder");
            }
            seeder.run(ctx)?;
            executed.push(seeder.name().to_string());
        }
        Ok(executed)
    }
}

impl std::fmt::Debug for SeederManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.seeders.iter().map(|s| s.name()).collect();
        f.debug_struct("SeederManager").field("seeders", &names).finish()
    }
}

/// Kahn's algorithm; among ready seeders the lowest priority runs first,
/// then registration order.
fn resolve_dependencies(seeders: Vec<&dyn Seeder>) -> FactoryResult<Vec<&dyn Seeder>> {
    let index: HashMap<&str, usize> = seeders
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name(), i))
        .collect();

    let mut in_degree = vec![0usize; seeders.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); seeders.len()];

    for (i, seeder) in seeders.iter().enumerate() {
        for dep in seeder.dependencies() {
            let Some(&j) = index.get(dep.as_str()) else {
                return Err(FactoryError::seeding(format!(
                    "seeder '{}' depends on '{}', which was not found",
                    seeder.name(),
                    dep
                )));
            };
            in_degree[i] += 1;
            dependents[j].push(i);
        }
    }

    let mut ready: Vec<usize> = (0..seeders.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut done = HashSet::new();
    let mut ordered = Vec::with_capacity(seeders.len());

    while !ready.is_empty() {
        let pos = (0..ready.len())
            .min_by_key(|&p| (seeders[ready[p]].priority(), ready[p]))
            .unwrap_or(0);
        let current = ready.remove(pos);

        done.insert(current);
        ordered.push(seeders[current]);

        for &dependent in &dependents[current] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
    }

    if ordered.len() != seeders.len() {
        let cyclic: Vec<&str> = seeders
            .iter()
            .enumerate()
            .filter(|(i, _)| !done.contains(i))
            .map(|(_, s)| s.name())
            .collect();
        return Err(FactoryError::seeding(format!(
            "circular dependency detected in seeders: {}",
            cyclic.join(", ")
        )));
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_data::SeededRandom;
    use crate::store::InMemoryStore;
    use crate::test_support::{AuthorFactory, NoteFactory};

    struct NamedSeeder {
        name: &'static str,
        priority: i32,
        dependencies: Vec<String>,
    }

    impl NamedSeeder {
        fn new(name: &'static str, priority: i32, dependencies: &[&str]) -> Self {
            Self {
                name,
                priority,
                dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            }
        }
    }

    impl Seeder for NamedSeeder {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn dependencies(&self) -> Vec<String> {
            self.dependencies.clone()
        }

        fn run(&self, _ctx: &mut FactoryContext<'_>) -> FactoryResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dependencies_run_first() {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let manager = SeederManager::new()
            .add(NamedSeeder::new("comments", 1, &["posts"]))
            .add(NamedSeeder::new("posts", 50, &["users"]))
            .add(NamedSeeder::new("users", 100, &[]))
            .add(NamedSeeder::new("settings", 10, &[]));

        let order = manager
            .run_for_environment(&mut ctx, &Environment::Development)
            .unwrap();

        assert_eq!(order, vec!["settings", "users", "posts", "comments"]);
    }

    #[test]
    fn test_missing_and_circular_dependencies() {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let missing = SeederManager::new().add(NamedSeeder::new("posts", 100, &["users"]));
        let err = missing.run_for_environment(&mut ctx, &Environment::Testing).unwrap_err();
        assert!(err.to_string().contains("'users'"));

        let circular = SeederManager::new()
            .add(NamedSeeder::new("a", 100, &["b"]))
            .add(NamedSeeder::new("b", 100, &["a"]));
        let err = circular.run_for_environment(&mut ctx, &Environment::Testing).unwrap_err();
        assert!(err.to_string().contains("circular dependency"));
    }

    #[test]
    fn test_production_requires_force() {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let manager = SeederManager::new()
            .add(
                FactorySeeder::new("authors", AuthorFactory::default(), 2)
                    .environments(vec![Environment::Production]),
            )
            .add_factory("notes", NoteFactory::default(), 3);

        let err = manager
            .run_for_environment(&mut ctx, &Environment::Production)
            .unwrap_err();
        assert!(matches!(err, FactoryError::Seeding { .. }));

        let order = manager.run_production_force(&mut ctx).unwrap();
        assert_eq!(order, vec!["authors"]);
        assert_eq!(store.count("Author"), 2);
        assert_eq!(store.count("Note"), 0);
    }

    #[test]
    fn test_factory_seeder_creates_records() {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let manager = SeederManager::new()
            .add_factory("notes", NoteFactory::default(), 3)
            .add(FactorySeeder::new("authors", AuthorFactory::default(), 1).with_priority(1));

        manager
            .run_for_environment(&mut ctx, &Environment::Testing)
            .unwrap();

        assert_eq!(store.count("Note"), 3);
        assert_eq!(store.count("Author"), 4);
    }

    #[test]
    fn test_assigned_ids_come_from_earlier_seeder() {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);
        let authors = SeededIds::new();

        let manager = SeederManager::new()
            .add(
                FactorySeeder::new("notes", NoteFactory::default(), 5)
                    .assign("author_id", &authors)
                    .depends_on(["authors"]),
            )
            .add(FactorySeeder::new("authors", AuthorFactory::default(), 2).collect_ids(&authors));

        manager
            .run_for_environment(&mut ctx, &Environment::Testing)
            .unwrap();

        assert_eq!(authors.ids(), vec![1, 2]);
        assert_eq!(store.count("Author"), 2);
        assert!(store
            .records("Note")
            .iter()
            .all(|note| matches!(note.get("author_id").and_then(|v| v.as_u64()), Some(1 | 2))));
    }

    #[test]
    fn test_assign_from_empty_ids_fails() {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);

        let err = FactorySeeder::new("notes", NoteFactory::default(), 1)
            .assign("author_id", &SeededIds::new())
            .run(&mut ctx)
            .unwrap_err();

        assert!(matches!(err, FactoryError::Seeding { .. }));
        assert_eq!(store.total(), 0);
    }

    #[test]
    fn test_pick_avoids_taken_ids() {
        let mut rng = SeededRandom::new(3);
        let mut store = InMemoryStore::new();
        let mut ctx = FactoryContext::new(&mut rng, &mut store);
        let users = SeededIds::new();
        users.extend([4, 9]);

        for _ in 0..10 {
            assert_eq!(users.pick("recipient_id", &[4], &mut ctx).unwrap(), 9);
        }
        let id = users.pick("recipient_id", &[4, 9], &mut ctx).unwrap();
        assert!([4, 9].contains(&id));
    }
}

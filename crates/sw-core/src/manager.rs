//! Migration manager: resolves the next step from the recorded version and
//! drives single-step transitions until a target version is reached.
//!
//! Every step is a separate store round-trip that is durably recorded before
//! the next one is resolved, so an interrupted run leaves the database at a
//! well-defined recorded version.

use crate::definition::{Direction, MigrationDefinition};
use crate::error::{CoreError, CoreResult};
use crate::logging::{LogFacade, MigrationLog};
use crate::registry::VersionRegistry;
use crate::store::MigrationStore;
use crate::version::{Version, SENTINEL_VERSION};

/// A single resolved transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub direction: Direction,
    /// Version recorded before the step
    pub from: Version,
    /// Version recorded by the step
    pub to: Version,
    /// Script executed by the step
    pub script: String,
}

/// Outcome of an `up` or `down` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub direction: Direction,
    pub from: Version,
    pub to: Version,
    /// Versions recorded by each applied step, in order
    pub steps: Vec<Version>,
}

impl MigrationReport {
    /// Returns true if no step was applied.
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Orchestrates step resolution and execution against a [`MigrationStore`].
///
/// The manager owns the [`VersionRegistry`] and borrows the store, which owns
/// all durable state.
pub struct MigrationManager<'s, S: MigrationStore + ?Sized> {
    store: &'s S,
    registry: VersionRegistry,
    log: Box<dyn MigrationLog + 's>,
}

impl<'s, S: MigrationStore + ?Sized> MigrationManager<'s, S> {
    /// Create a manager that logs through the `log` facade.
    pub fn new(store: &'s S) -> Self {
        Self::with_log(store, LogFacade)
    }

    /// Create a manager with a custom logging port.
    pub fn with_log(store: &'s S, log: impl MigrationLog + 's) -> Self {
        Self {
            store,
            registry: VersionRegistry::new(),
            log: Box::new(log),
        }
    }

    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    /// Registered versions in ascending order.
    pub fn registered_versions(&self) -> &[Version] {
        self.registry.versions()
    }

    /// Add a parsed definition to the registry.
    ///
    /// The sentinel version is rejected: it always stands for the empty
    /// schema and can never be the destination of a step.
    pub fn register_definition(&mut self, definition: MigrationDefinition) -> CoreResult<()> {
        if definition.version.is_sentinel() {
            return Err(CoreError::InvalidDefinitionFormat {
                name: format!("{}.{}", definition.version, definition.direction),
                reason: format!("version '{SENTINEL_VERSION}' is reserved for the empty schema"),
            });
        }
        self.log.debug(&format!(
            "Registering {} script for version {}",
            definition.direction, definition.version
        ));
        self.registry.register(
            definition.version,
            definition.direction,
            definition.script,
        );
        Ok(())
    }

    /// Register every definition, stopping at the first rejected one.
    pub fn register_all(
        &mut self,
        definitions: impl IntoIterator<Item = MigrationDefinition>,
    ) -> CoreResult<()> {
        for definition in definitions {
            self.register_definition(definition)?;
        }
        Ok(())
    }

    pub fn initialize_database(&self) -> CoreResult<()> {
        self.log.debug(&format!(
            "Initializing {} migration store",
            self.store.store_type()
        ));
        self.store.initialize()?;
        Ok(())
    }

    pub fn current_version(&self) -> CoreResult<Version> {
        Ok(self.store.current_version()?)
    }

    pub fn lowest_available(&self) -> CoreResult<Version> {
        self.registry.lowest().cloned()
    }

    pub fn highest_available(&self) -> CoreResult<Version> {
        self.registry.highest().cloned()
    }

    /// Resolve the next upward step from the recorded version.
    pub fn next_step_up(&self) -> CoreResult<Step> {
        let current = self.current_version()?;
        self.step_up_from(&current)
    }

    /// Resolve the next downward step from the recorded version.
    pub fn next_step_down(&self) -> CoreResult<Step> {
        let current = self.current_version()?;
        self.step_down_from(&current)
    }

    /// Apply upward steps until `target` is the recorded version.
    pub fn up(&self, target: &Version) -> CoreResult<MigrationReport> {
        self.migrate(Direction::Up, target)
    }

    /// Apply downward steps until `target` is the recorded version.
    pub fn down(&self, target: &Version) -> CoreResult<MigrationReport> {
        self.migrate(Direction::Down, target)
    }

    /// Steps `up(target)` would apply, without touching the store.
    pub fn plan_up(&self, target: &Version) -> CoreResult<Vec<Step>> {
        self.plan(Direction::Up, target)
    }

    /// Steps `down(target)` would apply, without touching the store.
    pub fn plan_down(&self, target: &Version) -> CoreResult<Vec<Step>> {
        self.plan(Direction::Down, target)
    }

    fn migrate(&self, direction: Direction, target: &Version) -> CoreResult<MigrationReport> {
        let from = self.current_version()?;
        self.check_target(direction, &from, target)?;

        let mut current = from.clone();
        let mut steps = Vec::new();
        // Each step moves strictly toward the target, so the registry size
        // bounds the number of iterations.
        for _ in 0..=self.registry.len() {
            if current == *target {
                if steps.is_empty() {
                    self.log.info(&format!("Schema is already at version {target}"));
                } else {
                    self.log.info(&format!(
                        "Migrated {direction} from {from} to {target} in {} step(s)",
                        steps.len()
                    ));
                }
                return Ok(MigrationReport {
                    direction,
                    from,
                    to: current,
                    steps,
                });
            }

            let step = self.resolve_step(direction, &current)?;
            self.log.info(&format!(
                "Migrating {direction}: {} -> {}",
                step.from, step.to
            ));
            if let Err(e) = self.store.apply_step(&step.to, &step.script) {
                self.log
                    .error(&format!("Migration to version {} failed: {e}", step.to));
                return Err(e.into());
            }
            steps.push(step.to);

            current = self.current_version()?;
        }

        Err(CoreError::NoNextStep {
            version: current.into_inner(),
            direction,
        })
    }

    fn plan(&self, direction: Direction, target: &Version) -> CoreResult<Vec<Step>> {
        let mut current = self.current_version()?;
        self.check_target(direction, &current, target)?;

        let mut steps = Vec::new();
        for _ in 0..=self.registry.len() {
            if current == *target {
                return Ok(steps);
            }
            let step = self.resolve_step(direction, &current)?;
            current = step.to.clone();
            steps.push(step);
        }

        Err(CoreError::NoNextStep {
            version: current.into_inner(),
            direction,
        })
    }

    /// Fail fast on targets the step chain can never reach.
    fn check_target(
        &self,
        direction: Direction,
        current: &Version,
        target: &Version,
    ) -> CoreResult<()> {
        if current == target {
            return Ok(());
        }

        let target_index = self.registry.index_of(target)?;
        let reachable = match direction {
            Direction::Up => {
                current.is_sentinel() || self.registry.index_of(current)? < target_index
            }
            Direction::Down => {
                !current.is_sentinel() && self.registry.index_of(current)? > target_index
            }
        };

        if reachable {
            Ok(())
        } else {
            Err(CoreError::NoNextStep {
                version: current.to_string(),
                direction,
            })
        }
    }

    fn resolve_step(&self, direction: Direction, current: &Version) -> CoreResult<Step> {
        let step = match direction {
            Direction::Up => self.step_up_from(current)?,
            Direction::Down => self.step_down_from(current)?,
        };
        self.log.debug(&format!(
            "Resolved next {direction} step: {} -> {}",
            step.from, step.to
        ));
        Ok(step)
    }

    fn step_up_from(&self, current: &Version) -> CoreResult<Step> {
        let next_index = if current.is_sentinel() {
            0
        } else {
            self.registry.index_of(current)? + 1
        };

        let next = match self.registry.at(next_index) {
            Some(next) => next,
            None if self.registry.is_empty() => return Err(CoreError::EmptyRegistry),
            None => {
                return Err(CoreError::NoNextStep {
                    version: current.to_string(),
                    direction: Direction::Up,
                })
            }
        };

        let script = next
            .script(Direction::Up)
            .ok_or_else(|| CoreError::MissingScript {
                version: next.version.to_string(),
                direction: Direction::Up,
            })?;

        Ok(Step {
            direction: Direction::Up,
            from: current.clone(),
            to: next.version.clone(),
            script: script.to_string(),
        })
    }

    /// Moving down from V to its predecessor W runs V's down-script and
    /// records W.
    fn step_down_from(&self, current: &Version) -> CoreResult<Step> {
        let no_step = || CoreError::NoNextStep {
            version: current.to_string(),
            direction: Direction::Down,
        };

        if current.is_sentinel() {
            return Err(no_step());
        }

        let index = self.registry.index_of(current)?;
        if index == 0 {
            return Err(no_step());
        }

        let (Some(departing), Some(destination)) =
            (self.registry.at(index), self.registry.at(index - 1))
        else {
            return Err(no_step());
        };

        let script = departing
            .script(Direction::Down)
            .ok_or_else(|| CoreError::MissingScript {
                version: departing.version.to_string(),
                direction: Direction::Down,
            })?;

        Ok(Step {
            direction: Direction::Down,
            from: current.clone(),
            to: destination.version.clone(),
            script: script.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;

//! Resource registration and ability building.
//!
//! Resources are registered once, each with a schema and the declaration
//! logic that turns a context into rules:
//!
//! ```text
//! RegistryBuilder ──build()──▶ Registry<C> ──ability(&ctx)──▶ Ability
//!   register / declare          (immutable)    runs every          (immutable,
//!                                               declaration once)   queryable)
//! ```
//!
//! All registration problems (duplicates, a resource with no declaration
//! logic, declarations for unregistered resources) surface from
//! [`RegistryBuilder::build`], never at query time.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::ability::Ability;
use crate::condition::Condition;
use crate::config::EngineConfig;
use crate::error::{ConfigurationError, DeclarationError};
use crate::resource::{Action, ActionList, Resource, ResourceType};
use crate::rules::{Effect, RuleId, RuleStore};
use crate::schema::{Schema, TypedSchema, ValidationError};

type DeclareFn<C> =
    Box<dyn Fn(&mut RuleStore, &C) -> Result<(), DeclarationError> + Send + Sync>;
type ContextValidator<C> = Box<dyn Fn(&C) -> Result<(), ValidationError> + Send + Sync>;

// ============================================================================
// Resource Table
// ============================================================================

/// Schema and action set of one registered resource.
pub(crate) struct ResourceEntry {
    pub(crate) resource: ResourceType,
    pub(crate) actions: Vec<&'static str>,
    pub(crate) schema: Box<dyn Schema>,
}

impl ResourceEntry {
    /// Resolves an action name against this resource's action set.
    pub(crate) fn action(&self, name: &str) -> Result<&'static str, ConfigurationError> {
        self.actions
            .iter()
            .copied()
            .find(|action| *action == name)
            .ok_or_else(|| ConfigurationError::UnknownAction {
                resource: self.resource,
                action: name.to_string(),
            })
    }
}

/// Registration data shared by every ability built from one registry.
pub(crate) struct ResourceTable {
    entries: HashMap<&'static str, ResourceEntry>,
    pub(crate) config: EngineConfig,
}

impl ResourceTable {
    pub(crate) fn entry(&self, name: &str) -> Result<&ResourceEntry, ConfigurationError> {
        self.entries
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownResource(name.to_string()))
    }
}

impl fmt::Debug for ResourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut resources: Vec<&&str> = self.entries.keys().collect();
        resources.sort();
        f.debug_struct("ResourceTable")
            .field("resources", &resources)
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// Declaration Handle
// ============================================================================

/// Rule declaration handle passed to a resource's declaration logic.
///
/// Rules are appended in call order; that order decides precedence.
pub struct Rules<'a, A> {
    store: &'a mut RuleStore,
    resource: ResourceType,
    _actions: PhantomData<fn(A)>,
}

impl<'a, A: Action> Rules<'a, A> {
    fn new(store: &'a mut RuleStore, resource: ResourceType) -> Self {
        Self {
            store,
            resource,
            _actions: PhantomData,
        }
    }

    /// The resource these rules are scoped to.
    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    /// Allows `actions` on every instance.
    pub fn grant(&mut self, actions: impl Into<ActionList<A>>) -> RuleRef<'_> {
        self.push(Effect::Allow, &actions.into(), None)
    }

    /// Allows `actions` on instances matching `condition`.
    pub fn grant_when(
        &mut self,
        actions: impl Into<ActionList<A>>,
        condition: Condition,
    ) -> RuleRef<'_> {
        self.push(Effect::Allow, &actions.into(), Some(condition))
    }

    /// Denies `actions` on every instance.
    pub fn deny(&mut self, actions: impl Into<ActionList<A>>) -> RuleRef<'_> {
        self.push(Effect::Deny, &actions.into(), None)
    }

    /// Denies `actions` on instances matching `condition`.
    pub fn deny_when(
        &mut self,
        actions: impl Into<ActionList<A>>,
        condition: Condition,
    ) -> RuleRef<'_> {
        self.push(Effect::Deny, &actions.into(), Some(condition))
    }

    fn push(
        &mut self,
        effect: Effect,
        actions: &ActionList<A>,
        condition: Option<Condition>,
    ) -> RuleRef<'_> {
        let actions = actions.names();
        trace!(
            resource = %self.resource,
            effect = ?effect,
            actions = ?actions,
            conditional = condition.is_some(),
            "Rule declared"
        );
        let id = self.store.push(self.resource, effect, actions, condition);
        RuleRef {
            store: &mut *self.store,
            id,
        }
    }
}

/// The rule just declared, for attaching a reason.
pub struct RuleRef<'a> {
    store: &'a mut RuleStore,
    id: RuleId,
}

impl RuleRef<'_> {
    /// Id of the declared rule.
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Attaches the reason reported when this rule denies access.
    pub fn because(self, reason: impl Into<String>) -> RuleId {
        self.store.set_reason(self.id, reason.into());
        self.id
    }
}

// ============================================================================
// Registry Builder
// ============================================================================

struct Declaration<C> {
    resource: ResourceType,
    declare: DeclareFn<C>,
}

/// Collects resource registrations for a [`Registry`].
pub struct RegistryBuilder<C> {
    entries: Vec<ResourceEntry>,
    declarations: Vec<Declaration<C>>,
    context_validator: Option<ContextValidator<C>>,
    config: EngineConfig,
}

impl<C: 'static> RegistryBuilder<C> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            declarations: Vec::new(),
            context_validator: None,
            config: EngineConfig::default(),
        }
    }

    /// Registers `R`, validating its data by deserializing into `R::Data`.
    pub fn register<R: Resource>(self) -> Self {
        self.register_with_schema::<R>(TypedSchema::<R::Data>::new())
    }

    /// Registers `R` with a custom schema.
    pub fn register_with_schema<R: Resource>(mut self, schema: impl Schema + 'static) -> Self {
        self.entries.push(ResourceEntry {
            resource: R::resource_type(),
            actions: R::Action::ALL.iter().map(|action| action.name()).collect(),
            schema: Box::new(schema),
        });
        self
    }

    /// Attaches declaration logic to `R`.
    ///
    /// The logic runs once per [`Registry::ability`] call, with the context
    /// the ability is built for.
    pub fn declare<R: Resource>(
        mut self,
        declare: impl Fn(&mut Rules<'_, R::Action>, &C) -> Result<(), DeclarationError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        let resource = R::resource_type();
        self.declarations.push(Declaration {
            resource,
            declare: Box::new(move |store: &mut RuleStore, context: &C| {
                let mut rules = Rules::<R::Action>::new(store, resource);
                declare(&mut rules, context)
            }),
        });
        self
    }

    /// Registers `R` with its default schema and attaches declaration logic.
    pub fn resource<R: Resource>(
        self,
        declare: impl Fn(&mut Rules<'_, R::Action>, &C) -> Result<(), DeclarationError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.register::<R>().declare::<R>(declare)
    }

    /// Rejects contexts before any declaration logic runs.
    pub fn validate_context(
        mut self,
        validator: impl Fn(&C) -> Result<(), ValidationError> + Send + Sync + 'static,
    ) -> Self {
        self.context_validator = Some(Box::new(validator));
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Disables audit events (for testing).
    pub fn without_audit(mut self) -> Self {
        self.config.audit.enabled = false;
        self
    }

    /// Checks the registrations and freezes them.
    pub fn build(self) -> Result<Registry<C>, ConfigurationError> {
        let mut entries: HashMap<&'static str, ResourceEntry> = HashMap::new();
        let mut order: Vec<ResourceType> = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            let resource = entry.resource;
            if entries.insert(resource.as_str(), entry).is_some() {
                return Err(ConfigurationError::DuplicateResource(resource));
            }
            order.push(resource);
        }

        let mut declared: Vec<ResourceType> = Vec::with_capacity(self.declarations.len());
        for declaration in &self.declarations {
            let resource = declaration.resource;
            if !entries.contains_key(resource.as_str()) {
                return Err(ConfigurationError::UnknownResource(resource.to_string()));
            }
            if declared.contains(&resource) {
                return Err(ConfigurationError::DuplicateDeclaration(resource));
            }
            declared.push(resource);
        }

        if let Some(missing) = order.iter().find(|resource| !declared.contains(resource)) {
            return Err(ConfigurationError::MissingDeclaration(*missing));
        }

        // Declarations run in registration order.
        let mut declarations = self.declarations;
        declarations.sort_by_key(|declaration| {
            order
                .iter()
                .position(|resource| *resource == declaration.resource)
        });

        debug!(resources = order.len(), "Registry built");

        Ok(Registry {
            table: Arc::new(ResourceTable {
                entries,
                config: self.config,
            }),
            declarations,
            context_validator: self.context_validator,
        })
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Frozen set of resource registrations. Builds one [`Ability`] per context.
pub struct Registry<C> {
    table: Arc<ResourceTable>,
    declarations: Vec<Declaration<C>>,
    context_validator: Option<ContextValidator<C>>,
}

impl<C: 'static> Registry<C> {
    pub fn builder() -> RegistryBuilder<C> {
        RegistryBuilder::new()
    }
}

impl<C> Registry<C> {
    /// Builds the ability for `context`.
    ///
    /// Runs every resource's declaration logic exactly once, in registration
    /// order. A failing declaration aborts the whole build.
    pub fn ability(&self, context: &C) -> Result<Ability, ConfigurationError> {
        if let Some(validate) = &self.context_validator {
            validate(context).map_err(ConfigurationError::InvalidContext)?;
        }

        let mut rules = RuleStore::new();
        for declaration in &self.declarations {
            (declaration.declare)(&mut rules, context).map_err(|source| {
                ConfigurationError::DeclarationFailed {
                    resource: declaration.resource,
                    source,
                }
            })?;
        }

        if self.table.config.audit.enabled {
            debug!(rules = rules.len(), "Ability built");
        }

        Ok(Ability::new(Arc::clone(&self.table), rules))
    }

    /// Registered resource types, in registration order.
    pub fn resources(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.declarations.iter().map(|declaration| declaration.resource)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.table.config
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("table", &self.table)
            .field("context_validator", &self.context_validator.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

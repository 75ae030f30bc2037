//! Ability definitions paired with their implementations, built once per
//! session and shared by reference.

use core::fmt;

use super::catalog::{builtin_definitions, implementation_for, AbilityKind};
use super::definition::AbilityDefinition;

/// Construction-time faults. These are configuration bugs, never player
/// input errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// An ability id with no registered implementation.
    UnknownImplementation(String),
    /// Two definitions share an id.
    DuplicateId(String),
    /// A definition lacks the effect descriptor its implementation reads.
    MalformedDefinition { id: String, reason: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownImplementation(id) => {
                write!(f, "No implementation registered for ability '{}'", id)
            }
            RegistryError::DuplicateId(id) => write!(f, "Ability '{}' is defined twice", id),
            RegistryError::MalformedDefinition { id, reason } => {
                write!(f, "Ability '{}' is malformed: {}", id, reason)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Debug, Clone)]
struct Entry {
    definition: AbilityDefinition,
    kind: AbilityKind,
}

#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    entries: Vec<Entry>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in ability.
    pub fn builtin() -> Self {
        match Self::from_definitions(builtin_definitions()) {
            Ok(registry) => registry,
            Err(e) => {
                log::error!("built-in ability table rejected: {}", e);
                Self::default()
            }
        }
    }

    /// Build from definitions, resolving each id against the built-in
    /// implementation table.
    pub fn from_definitions(defs: Vec<AbilityDefinition>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for def in defs {
            let kind = implementation_for(&def.id)
                .ok_or_else(|| RegistryError::UnknownImplementation(def.id.clone()))?;
            registry.register(def, kind)?;
        }
        Ok(registry)
    }

    /// Register a definition with an explicit implementation.
    pub fn register(&mut self, definition: AbilityDefinition, kind: AbilityKind) -> Result<(), RegistryError> {
        if self.get(&definition.id).is_some() {
            return Err(RegistryError::DuplicateId(definition.id));
        }
        if definition.effect(kind.effect_type()).is_none() {
            return Err(RegistryError::MalformedDefinition {
                reason: format!("missing a {:?} effect descriptor", kind.effect_type()),
                id: definition.id,
            });
        }
        if definition.ability_type == super::definition::AbilityType::Triggered
            && definition.triggers.is_empty()
        {
            return Err(RegistryError::MalformedDefinition {
                reason: "triggered ability without triggers".to_string(),
                id: definition.id,
            });
        }
        self.entries.push(Entry { definition, kind });
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&AbilityDefinition> {
        self.entries.iter().find(|e| e.definition.id == id).map(|e| &e.definition)
    }

    pub fn kind(&self, id: &str) -> Option<AbilityKind> {
        self.entries.iter().find(|e| e.definition.id == id).map(|e| e.kind)
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.entries.iter().map(|e| &e.definition)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

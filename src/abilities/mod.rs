//! Ship special abilities: immutable definitions, the implementation table,
//! per-ship instances and the processor that drives their lifecycle.

pub mod catalog;
pub mod definition;
pub mod effects;
pub mod factory;
pub mod instance;
pub mod processor;
pub mod registry;

pub use catalog::{builtin_definitions, implementation_for, square_area, AbilityKind, EffectOutcome};
pub use definition::{
    AbilityCategory, AbilityDefinition, AbilityRequirements, AbilityType, EffectDescriptor, EffectType,
    TargetType, Trigger,
};
pub use effects::{ActiveEffect, EffectSource, EffectTarget, Expiry};
pub use factory::AbilityFactory;
pub use instance::{AbilityInstance, AbilityInstanceId, AbilityState, AbilityUsageStats};
pub use processor::{
    AbilityContext, AbilityExecutionResult, AbilityProcessor, AbilitySettings, ProcessorState, ReadyAbility,
};
pub use registry::{AbilityRegistry, RegistryError};

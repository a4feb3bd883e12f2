//! Game object module
//!
//! Game objects are entities: an immutable identity plus a set of
//! capability parts, keyed by part type with at most one part per type.
//! Concrete part types (health, movement, ownership, ...) are defined by
//! the game-rules crate; the core only provides the registry.
//!
//! Part removal is deliberately unsupported.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::error::EntityError;
use crate::game::id::ObjectId;

/// A typed unit of entity state or behavior.
///
/// Implementors supply the `as_any` accessors so the registry can
/// downcast stored parts back to their concrete type.
pub trait GamePart: Any + Send + Sync {
    /// Upcast for downcasting to the concrete part type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A game entity: immutable id plus capability parts
pub struct GameObject {
    id: ObjectId,
    parts: HashMap<TypeId, Box<dyn GamePart>>,
}

impl GameObject {
    /// Create an entity with the given id and no parts.
    ///
    /// Ids come from the object `IdGenerator` owned by `GameMechanics`;
    /// see `GameMechanics::create_object`.
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            parts: HashMap::new(),
        }
    }

    /// Get the entity's immutable identity
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Register a part, replacing any existing part of the same type
    pub fn add_part<T: GamePart>(&mut self, part: T) {
        self.parts.insert(TypeId::of::<T>(), Box::new(part));
    }

    /// Get the part of type `T`, if present.
    ///
    /// Absence is a normal case here; callers that treat presence as a
    /// precondition should use `claim_part`.
    pub fn get_part<T: GamePart>(&self) -> Option<&T> {
        self.parts
            .get(&TypeId::of::<T>())
            .and_then(|part| part.as_any().downcast_ref::<T>())
    }

    /// Get the part of type `T` mutably, if present
    pub fn get_part_mut<T: GamePart>(&mut self) -> Option<&mut T> {
        self.parts
            .get_mut(&TypeId::of::<T>())
            .and_then(|part| part.as_any_mut().downcast_mut::<T>())
    }

    /// Get the part of type `T`, failing if it is missing.
    ///
    /// A missing part is a bug in the caller, not a runtime condition:
    /// the returned `EntityError::PartMissing` names the entity and the
    /// part type to make the offending call site easy to find.
    pub fn claim_part<T: GamePart>(&self) -> Result<&T, EntityError> {
        self.get_part::<T>().ok_or(EntityError::PartMissing {
            object: self.id,
            part: type_name::<T>(),
        })
    }

    /// Mutable variant of `claim_part`
    pub fn claim_part_mut<T: GamePart>(&mut self) -> Result<&mut T, EntityError> {
        let id = self.id;
        self.get_part_mut::<T>().ok_or(EntityError::PartMissing {
            object: id,
            part: type_name::<T>(),
        })
    }

    /// Whether a part of type `T` is registered
    pub fn has_part<T: GamePart>(&self) -> bool {
        self.parts.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered parts
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("parts", &self.parts.len())
            .finish()
    }
}

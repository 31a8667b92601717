//! Entity registry: name-indexed records plus a role-ownership index.
//!
//! Phrase lists are kept in a separate namespace and never take part in
//! name/role disjointness.

use crate::ast::Provenance;
use crate::error::{ErrorCode, LuError};
use crate::model::{EntityKind, EntityRecord, RoleSet};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A violated registry invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("entity '{name}' is already defined as a {existing} entity and cannot be redefined as {requested}")]
    DuplicateEntity {
        name: String,
        existing: EntityKind,
        requested: EntityKind,
    },

    #[error("'{name}' is already used as a role of entity '{owner}' and cannot be an entity name")]
    NameIsRole { name: String, owner: String },

    #[error("role '{role}' of entity '{entity}' collides with an entity of the same name")]
    RoleIsName { role: String, entity: String },

    #[error("role '{role}' of entity '{entity}' is already a role of entity '{owner}'")]
    RoleTaken {
        role: String,
        entity: String,
        owner: String,
    },
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::DuplicateEntity { .. } => ErrorCode::DuplicateEntityDefinition,
            _ => ErrorCode::RoleNameCollision,
        }
    }

    /// Locate the violation at a declaration or utterance.
    pub fn at(&self, prov: &Provenance) -> LuError {
        LuError::at(self.code(), prov, self.to_string())
    }
}

#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: IndexMap<String, EntityRecord>,
    phrase_lists: IndexMap<String, EntityRecord>,
    /// role → owning entity name
    role_owners: HashMap<String, String>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lookups ────────────────────────────────────────────────────────

    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        self.entities.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<EntityKind> {
        self.entities.get(name).map(EntityRecord::kind)
    }

    /// Entity that declares `role`, if any.
    pub fn role_owner(&self, role: &str) -> Option<&str> {
        self.role_owners.get(role).map(String::as_str)
    }

    pub fn phrase_list(&self, name: &str) -> Option<&EntityRecord> {
        self.phrase_lists.get(name)
    }

    /// Non-phrase-list records in first-declared order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.entities.values()
    }

    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntityRecord> {
        self.entities.values().filter(move |e| e.kind() == kind)
    }

    pub fn phrase_lists(&self) -> impl Iterator<Item = &EntityRecord> {
        self.phrase_lists.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    // ── Mutation ───────────────────────────────────────────────────────

    /// Insert an empty `kind` record or merge `roles` into the existing
    /// one. A record of a different kind is left untouched and reported;
    /// promotion is the calling handler's decision.
    pub fn upsert(
        &mut self,
        kind: EntityKind,
        name: &str,
        roles: &RoleSet,
    ) -> Result<&mut EntityRecord, RegistryError> {
        if let Some(existing) = self.kind_of(name) {
            if existing != kind {
                return Err(RegistryError::DuplicateEntity {
                    name: name.to_owned(),
                    existing,
                    requested: kind,
                });
            }
        }
        let record = self
            .entities
            .entry(name.to_owned())
            .or_insert_with(|| EntityRecord::new(kind, name));
        if let Some(existing_roles) = record.roles_mut() {
            existing_roles.extend(roles);
        }
        Ok(record)
    }

    /// Remove the record if it is of `kind`, returning its roles.
    pub(crate) fn remove_kind(&mut self, name: &str, kind: EntityKind) -> Option<RoleSet> {
        if self.kind_of(name) != Some(kind) {
            return None;
        }
        self.entities
            .shift_remove(name)
            .map(|record| record.roles().clone())
    }

    /// Pop a transient pattern-any record so a concrete declaration can
    /// take over its name and roles.
    pub fn remove_pattern_any(&mut self, name: &str) -> Option<RoleSet> {
        self.remove_kind(name, EntityKind::PatternAny)
    }

    /// Check that `name` (as `kind`) and `roles` keep names and roles
    /// disjoint across the registry; on success record role ownership.
    pub fn assert_name_role_disjoint(
        &mut self,
        name: &str,
        roles: &RoleSet,
        kind: EntityKind,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.kind_of(name) {
            if existing != kind {
                return Err(RegistryError::DuplicateEntity {
                    name: name.to_owned(),
                    existing,
                    requested: kind,
                });
            }
        }
        if let Some(owner) = self.role_owners.get(name) {
            if owner != name {
                return Err(RegistryError::NameIsRole {
                    name: name.to_owned(),
                    owner: owner.clone(),
                });
            }
        }
        for role in roles {
            if role != name && self.entities.contains_key(role) {
                return Err(RegistryError::RoleIsName {
                    role: role.clone(),
                    entity: name.to_owned(),
                });
            }
            if let Some(owner) = self.role_owners.get(role) {
                if owner != name {
                    return Err(RegistryError::RoleTaken {
                        role: role.clone(),
                        entity: name.to_owned(),
                        owner: owner.clone(),
                    });
                }
            }
        }
        for role in roles {
            self.role_owners.insert(role.clone(), name.to_owned());
        }
        Ok(())
    }

    /// Get or create a phrase list. The caller validates the
    /// interchangeable flag before calling.
    pub fn upsert_phrase_list(&mut self, name: &str, interchangeable: bool) -> &mut EntityRecord {
        self.phrase_lists
            .entry(name.to_owned())
            .or_insert_with(|| EntityRecord::PhraseList {
                name: name.to_owned(),
                values: Vec::new(),
                interchangeable,
            })
    }
}

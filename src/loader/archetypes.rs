//! # Archetypes
//!
//! A flat table of entity templates, resolved once at load time.
//!
//! Each row names a category and may override any attribute. Attributes a
//! row leaves out fall back to the category's defaults. Rows never inherit
//! from each other.

use crate::{ActionHandle, Category, Entity, MoveRange, WayfarerError, WayfarerResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the archetype table, as written in a world document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDef {
    /// Key used by maps and spawns
    pub name: String,
    pub category: Category,
    /// Name given to spawned entities; defaults to `name`
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub walkable: Option<bool>,
    /// Image key; defaults to `name`
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default)]
    pub range: Option<MoveRange>,
    #[serde(default)]
    pub actions: Vec<ActionHandle>,
}

impl ArchetypeDef {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            display_name: None,
            walkable: None,
            sprite: None,
            range: None,
            actions: Vec::new(),
        }
    }

    pub fn walkable(mut self, walkable: bool) -> Self {
        self.walkable = Some(walkable);
        self
    }

    pub fn range(mut self, range: MoveRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Fills every missing attribute from the category defaults.
    pub fn resolve(&self) -> Archetype {
        Archetype {
            name: self.name.clone(),
            display_name: self.display_name.clone().unwrap_or_else(|| self.name.clone()),
            category: self.category,
            walkable: self.walkable.unwrap_or(self.category.default_walkable()),
            sprite: self.sprite.clone().unwrap_or_else(|| self.name.clone()),
            range: self.range.unwrap_or_default(),
            actions: self.actions.clone(),
        }
    }
}

/// A fully resolved, immutable entity template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archetype {
    pub name: String,
    pub display_name: String,
    pub category: Category,
    pub walkable: bool,
    pub sprite: String,
    pub range: MoveRange,
    pub actions: Vec<ActionHandle>,
}

impl Archetype {
    /// Creates a fresh entity from this template.
    pub fn spawn(&self) -> Entity {
        let mut entity = Entity::new(self.display_name.clone(), self.category)
            .with_walkable(self.walkable)
            .with_sprite(self.sprite.clone())
            .with_range(self.range);
        entity.actions = self.actions.clone();
        entity
    }
}

/// Lookup table of resolved archetypes, keyed by name.
///
/// # Examples
///
/// ```
/// use wayfarer::{ArchetypeDef, ArchetypeRegistry, Category};
///
/// let registry = ArchetypeRegistry::from_defs(vec![
///     ArchetypeDef::new("wall", Category::Terrain).walkable(false),
///     ArchetypeDef::new("grass", Category::Terrain),
/// ])
/// .unwrap();
///
/// assert!(!registry.spawn("wall").unwrap().walkable);
/// assert!(registry.spawn("grass").unwrap().walkable);
/// assert!(registry.spawn("lava").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    archetypes: HashMap<String, Archetype>,
}

impl ArchetypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a table of definitions. Names must be unique.
    pub fn from_defs(defs: Vec<ArchetypeDef>) -> WayfarerResult<Self> {
        let mut registry = Self::new();
        for def in defs {
            registry.register(&def)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, def: &ArchetypeDef) -> WayfarerResult<()> {
        if self.archetypes.contains_key(&def.name) {
            return Err(WayfarerError::InvalidState(format!(
                "Archetype {} is defined twice",
                def.name
            )));
        }
        let archetype = def.resolve();
        debug!(
            "Archetype {} ({}, walkable: {})",
            archetype.name, archetype.category, archetype.walkable
        );
        self.archetypes.insert(def.name.clone(), archetype);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Archetype> {
        self.archetypes.get(name)
    }

    /// Spawns an entity of the named archetype.
    pub fn spawn(&self, name: &str) -> WayfarerResult<Entity> {
        self.get(name)
            .map(Archetype::spawn)
            .ok_or_else(|| WayfarerError::UnknownArchetype(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

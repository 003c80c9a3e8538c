use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;

use crate::error::{RegistryError, Result};

/// Numeric block id to lower-case canonical name. Reads are lock-free;
/// registration is serialized so a check-then-insert cannot interleave.
#[derive(Debug, Default)]
pub struct PersistenceNames {
    names: DashMap<u32, String>,
    write: Mutex<()>,
}

impl PersistenceNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` for `id`. Re-registering the same name in any case is
    /// a no-op; a different name is a conflict.
    pub fn register(&self, id: u32, name: &str) -> Result<()> {
        let name = name.to_lowercase();
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let existing = self.names.get(&id).map(|n| n.value().clone());
        match existing {
            Some(existing) if existing == name => Ok(()),
            Some(existing) => Err(RegistryError::PersistenceNameConflict {
                id,
                existing,
                requested: name,
            }),
            None => {
                self.names.insert(id, name);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: u32) -> Option<String> {
        self.names.get(&id).map(|n| n.value().clone())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All names, ordered by id.
    pub fn snapshot(&self) -> Vec<(u32, String)> {
        let mut out: Vec<(u32, String)> = self
            .names
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        out.sort_unstable_by_key(|(id, _)| *id);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_in_any_case_is_accepted() {
        let names = PersistenceNames::new();
        names.register(1, "minecraft:stone").unwrap();
        names.register(1, "Minecraft:STONE").unwrap();
        assert_eq!(names.get(1).as_deref(), Some("minecraft:stone"));
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn different_name_conflicts_and_keeps_the_first() {
        let names = PersistenceNames::new();
        names.register(1, "minecraft:stone").unwrap();
        let err = names.register(1, "minecraft:granite").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::PersistenceNameConflict { id: 1, .. }
        ));
        assert_eq!(names.get(1).as_deref(), Some("minecraft:stone"));
    }

    #[test]
    fn registration_lowercases() {
        let names = PersistenceNames::new();
        names.register(5, "Minecraft:Planks").unwrap();
        assert_eq!(names.snapshot(), vec![(5, "minecraft:planks".to_string())]);
    }
}

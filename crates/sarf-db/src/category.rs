// Category interning: name-to-id and id-to-name mapping.

use hashbrown::HashMap;

/// Interned handle for a prefix, stem or suffix category name.
///
/// Only meaningful for the database that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(u32);

impl CategoryId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Category names seen while building a database.
///
/// All three slots share one table; a name used for both a prefix and a
/// suffix category maps to the same id, which is harmless because the
/// relations are stored per slot.
#[derive(Debug, Default, Clone)]
pub struct CategoryTable {
    names: Vec<String>,
    index: HashMap<String, CategoryId>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, allocating a new one on first use.
    pub fn intern(&mut self, name: &str) -> CategoryId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = CategoryId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    /// Look up an existing name without allocating.
    pub fn get(&self, name: &str) -> Option<CategoryId> {
        self.index.get(name).copied()
    }

    /// Name for an id issued by this table.
    ///
    /// Ids from another table that fall out of range yield an empty name.
    pub fn name(&self, id: CategoryId) -> &str {
        self.names.get(id.index()).map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let mut table = CategoryTable::new();
        let a = table.intern("PV");
        let b = table.intern("IV_Pref");
        assert_ne!(a, b);
        assert_eq!(table.intern("PV"), a);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn name_and_get() {
        let mut table = CategoryTable::new();
        let id = table.intern("Suff-0");
        assert_eq!(table.name(id), "Suff-0");
        assert_eq!(table.get("Suff-0"), Some(id));
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn foreign_id_has_empty_name() {
        let mut other = CategoryTable::new();
        other.intern("a");
        let foreign = other.intern("b");
        let table = CategoryTable::new();
        assert_eq!(table.name(foreign), "");
        assert!(table.is_empty());
    }
}

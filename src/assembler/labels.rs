//! Scoped label table.
//!
//! Labels live in a stack of scopes, innermost last. Lookups search from the
//! innermost scope outward, so an inner scope may shadow an outer label. A
//! name may be defined only once per scope, which lets the same labelled
//! routine be loaded several times, each copy in its own scope.

use std::collections::BTreeMap;

use super::LabelError;

/// Stack of name-to-address scopes.
///
/// # Examples
///
/// ```
/// use sim6502::LabelTable;
///
/// let mut labels = LabelTable::new();
/// labels.define("start", 0x0200).unwrap();
///
/// labels.push_scope();
/// labels.define("start", 0x0300).unwrap();
/// assert_eq!(labels.lookup("start"), Some(0x0300));
///
/// labels.pop_scope();
/// assert_eq!(labels.lookup("start"), Some(0x0200));
/// ```
#[derive(Debug, Clone)]
pub struct LabelTable {
    scopes: Vec<BTreeMap<String, u16>>,
}

impl LabelTable {
    /// Creates a table with one empty scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![BTreeMap::new()],
        }
    }

    /// Records `name` at `address` in the innermost scope.
    pub fn define(&mut self, name: &str, address: u16) -> Result<(), LabelError> {
        let scope = self.innermost_mut();
        if let Some(&existing) = scope.get(name) {
            return Err(LabelError::Duplicate {
                name: name.to_string(),
                existing,
            });
        }
        scope.insert(name.to_string(), address);
        Ok(())
    }

    /// Resolves `name`, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Finds a visible label at `address`, for annotating disassembly.
    ///
    /// When several names share an address, the innermost scope wins, then
    /// alphabetical order.
    pub fn name_of(&self, address: u16) -> Option<&str> {
        self.scopes.iter().rev().find_map(|scope| {
            scope
                .iter()
                .find(|&(name, &addr)| addr == address && self.lookup(name) == Some(addr))
                .map(|(name, _)| name.as_str())
        })
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(BTreeMap::new());
    }

    /// Discards the innermost scope. The outermost scope is never popped;
    /// use [`clear`](Self::clear) to empty it.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Drops every scope and label, leaving one empty scope.
    pub fn clear(&mut self) {
        self.scopes.truncate(1);
        self.innermost_mut().clear();
    }

    /// Number of scopes, at least 1.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Labels visible from the innermost scope, sorted by name.
    pub fn visible(&self) -> BTreeMap<&str, u16> {
        let mut visible = BTreeMap::new();
        for scope in &self.scopes {
            for (name, &addr) in scope {
                visible.insert(name.as_str(), addr);
            }
        }
        visible
    }

    fn innermost_mut(&mut self) -> &mut BTreeMap<String, u16> {
        if self.scopes.is_empty() {
            self.scopes.push(BTreeMap::new());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_lookup() {
        let mut labels = LabelTable::new();

        assert!(labels.define("START", 0x8000).is_ok());
        assert!(labels.define("LOOP", 0x8010).is_ok());

        assert_eq!(labels.lookup("START"), Some(0x8000));
        assert_eq!(labels.lookup("LOOP"), Some(0x8010));
        assert_eq!(labels.lookup("UNDEFINED"), None);
    }

    #[test]
    fn test_duplicate_in_same_scope_is_rejected() {
        let mut labels = LabelTable::new();
        labels.define("START", 0x8000).unwrap();

        let err = labels.define("START", 0x9000).unwrap_err();
        assert_eq!(
            err,
            LabelError::Duplicate {
                name: "START".to_string(),
                existing: 0x8000
            }
        );
        assert_eq!(labels.lookup("START"), Some(0x8000));
    }

    #[test]
    fn test_inner_scope_shadows_and_pops() {
        let mut labels = LabelTable::new();
        labels.define("a", 0x0001).unwrap();
        labels.define("b", 0x0002).unwrap();

        labels.push_scope();
        labels.define("a", 0x0010).unwrap();
        assert_eq!(labels.depth(), 2);
        assert_eq!(labels.lookup("a"), Some(0x0010));
        assert_eq!(labels.lookup("b"), Some(0x0002));

        labels.pop_scope();
        assert_eq!(labels.lookup("a"), Some(0x0001));
    }

    #[test]
    fn test_pop_on_last_scope_keeps_labels() {
        let mut labels = LabelTable::new();
        labels.define("keep", 0x1234).unwrap();

        labels.pop_scope();
        assert_eq!(labels.depth(), 1);
        assert_eq!(labels.lookup("keep"), Some(0x1234));

        labels.clear();
        assert_eq!(labels.lookup("keep"), None);
    }

    #[test]
    fn test_name_of_skips_shadowed_labels() {
        let mut labels = LabelTable::new();
        labels.define("outer", 0x0200).unwrap();
        labels.push_scope();
        labels.define("outer", 0x0300).unwrap();

        assert_eq!(labels.name_of(0x0300), Some("outer"));
        assert_eq!(labels.name_of(0x0200), None);
    }
}

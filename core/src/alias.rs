//! Field qualification against the root and join acronyms of a query scope.
//!
//! Both backends register every join under its acronym and then resolve field
//! references through the same rule: in `"x.y"`, `x` selects a join (or a
//! root) when it names one of the scope chain's acronyms; otherwise the whole
//! string is a property path on the default source.

use hashbrown::HashMap;

use crate::error::{AnvilError, Result};

/// Acronym table for one query scope, chained to its enclosing scopes.
///
/// `H` is whatever a backend uses to address a source: a node handle for the
/// structured backend, the acronym text for the textual one.
#[derive(Debug, Clone)]
pub struct AliasResolver<H> {
    root_acronym: String,
    root: H,
    parent_root: Option<H>,
    local: HashMap<String, H>,
    inherited: HashMap<String, H>,
}

impl<H: Clone> AliasResolver<H> {
    pub fn new(root_acronym: impl Into<String>, root: H) -> Self {
        Self {
            root_acronym: root_acronym.into(),
            root,
            parent_root: None,
            local: HashMap::new(),
            inherited: HashMap::new(),
        }
    }

    /// Scope of a subquery. Every acronym visible here stays visible there,
    /// and may be shadowed by the subquery's own root or joins.
    pub fn child(&self, root_acronym: impl Into<String>, root: H) -> Self {
        let mut inherited = self.inherited.clone();
        inherited.insert(self.root_acronym.clone(), self.root.clone());
        inherited.extend(self.local.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            root_acronym: root_acronym.into(),
            root,
            parent_root: Some(self.root.clone()),
            local: HashMap::new(),
            inherited,
        }
    }

    /// Registers a join of this scope. Acronyms must be unique within a scope.
    pub fn register(&mut self, acronym: impl Into<String>, handle: H) -> Result<()> {
        let acronym = acronym.into();
        if acronym == self.root_acronym || self.local.contains_key(&acronym) {
            return Err(AnvilError::query(format!(
                "duplicate join alias `{acronym}`"
            )));
        }
        self.local.insert(acronym, handle);
        Ok(())
    }

    pub fn root(&self) -> &H {
        &self.root
    }

    pub fn root_acronym(&self) -> &str {
        &self.root_acronym
    }

    /// Root of the enclosing query, if this is a subquery scope
    pub fn parent_root(&self) -> Option<&H> {
        self.parent_root.as_ref()
    }

    pub fn lookup(&self, acronym: &str) -> Option<&H> {
        if let Some(handle) = self.local.get(acronym) {
            return Some(handle);
        }
        if acronym == self.root_acronym {
            return Some(&self.root);
        }
        self.inherited.get(acronym)
    }

    /// Whether `handle` already addresses a source visible from this scope
    pub fn has_handle<Q: ?Sized>(&self, handle: &Q) -> bool
    where
        H: PartialEq<Q>,
    {
        self.root.eq(handle)
            || self.local.values().any(|h| h.eq(handle))
            || self.inherited.values().any(|h| h.eq(handle))
    }

    /// Resolves against the root by default
    pub fn resolve<'a, 'f>(&'a self, field: &'f str) -> (&'a H, &'f str) {
        self.resolve_from(field, &self.root)
    }

    /// Resolves a field, falling back to `default` for unqualified paths
    pub fn resolve_from<'a, 'f>(&'a self, field: &'f str, default: &'a H) -> (&'a H, &'f str) {
        if let Some((head, rest)) = field.split_once('.')
            && let Some(handle) = self.lookup(head)
        {
            return (handle, rest);
        }
        (default, field)
    }

    /// Resolves the right-hand side of a field comparison: inside a subquery
    /// an unqualified path refers to the enclosing root.
    pub fn resolve_correlated<'a, 'f>(&'a self, field: &'f str) -> (&'a H, &'f str) {
        match &self.parent_root {
            Some(parent) if !field.contains('.') => (parent, field),
            _ => self.resolve(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> AliasResolver<&'static str> {
        let mut resolver = AliasResolver::new("user", "root");
        resolver.register("p", "pets-join").unwrap();
        resolver
    }

    #[test]
    fn test_alias_precedence() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("p.name"), (&"pets-join", "name"));
        assert_eq!(resolver.resolve("pets.name"), (&"root", "pets.name"));
        assert_eq!(resolver.resolve("name"), (&"root", "name"));
    }

    #[test]
    fn test_root_acronym_resolves_to_root() {
        assert_eq!(resolver().resolve("user.id"), (&"root", "id"));
    }

    #[test]
    fn test_duplicate_acronym_rejected() {
        let mut resolver = resolver();
        assert!(matches!(
            resolver.register("p", "other"),
            Err(AnvilError::Query(_))
        ));
        assert!(resolver.register("user", "other").is_err());
    }

    #[test]
    fn test_child_scope_sees_parent_and_shadows() {
        let parent = resolver();
        let mut child = parent.child("pet", "sub-root");
        child.register("p", "sub-join").unwrap();

        assert_eq!(child.resolve("user.id"), (&"root", "id"));
        assert_eq!(child.resolve("p.name"), (&"sub-join", "name"));
        assert_eq!(child.resolve("name"), (&"sub-root", "name"));
        assert_eq!(child.resolve_correlated("id"), (&"root", "id"));
        assert_eq!(child.resolve_correlated("pet.owner_id"), (&"sub-root", "owner_id"));
        assert_eq!(parent.resolve_correlated("id"), (&"root", "id"));
    }

    #[test]
    fn test_has_handle_spans_scope_chain() {
        let parent = resolver();
        let child = parent.child("user", "sub-root");
        assert!(child.has_handle(&"root"));
        assert!(child.has_handle(&"pets-join"));
        assert!(child.has_handle(&"sub-root"));
        assert!(!parent.has_handle(&"sub-root"));
    }

    #[test]
    fn test_resolve_from_default() {
        let resolver = resolver();
        assert_eq!(resolver.resolve_from("name", &"pets-join"), (&"pets-join", "name"));
        assert_eq!(resolver.resolve_from("user.name", &"pets-join"), (&"root", "name"));
    }
}

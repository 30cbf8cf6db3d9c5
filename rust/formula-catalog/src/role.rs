use std::collections::HashSet;

/// Realm roles held by a caller, compared case-insensitively.
///
/// Roles are folded to upper case once when the set is built; lookups fold
/// the queried role the same way. Folding maps one character to one
/// character: a character whose upper case expands to several (`ß`) is kept
/// as is, so `ß` and `ss` are different roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    folded: HashSet<String>,
}

impl RoleSet {
    /// Build a role set from role names
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        roles.into_iter().collect()
    }

    /// Whether `role` is held, ignoring case
    pub fn contains(&self, role: &str) -> bool {
        self.folded.contains(&fold(role))
    }

    /// Whether at least one of `roles` is held
    pub fn intersects<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|role| self.contains(role.as_ref()))
    }

    /// Number of distinct roles after folding
    pub fn len(&self) -> usize {
        self.folded.len()
    }

    /// Whether no role is held
    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for RoleSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            folded: iter.into_iter().map(|role| fold(role.as_ref())).collect(),
        }
    }
}

fn fold(role: &str) -> String {
    role.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_matches_roles_ignoring_case() {
        let roles = RoleSet::new(["ADMIN", "developer"]);

        assert!(roles.contains("admin"));
        assert!(roles.contains("Admin"));
        assert!(roles.contains("DEVELOPER"));
        assert!(!roles.contains("ops"));
    }

    #[test]
    fn it_intersects_when_any_role_matches() {
        let roles = RoleSet::new(["ops"]);

        assert!(roles.intersects(&["admin", "OPS"]));
        assert!(!roles.intersects(&["admin", "security"]));
        assert!(!roles.intersects::<&str>(&[]));
    }

    #[test]
    fn it_collapses_roles_that_differ_only_in_case() {
        let roles: RoleSet = ["Admin", "ADMIN", "admin"].into_iter().collect();
        assert_eq!(roles.len(), 1);
    }

    #[test]
    fn it_folds_each_character_to_a_single_character() {
        let roles = RoleSet::new(["straße", "ärzte"]);

        assert!(roles.contains("STRAßE"));
        assert!(roles.contains("ÄRZTE"));
        assert!(!roles.contains("STRASSE"));
        assert!(!RoleSet::new(["ß"]).contains("ss"));
    }

    #[test]
    fn it_starts_empty() {
        let roles = RoleSet::default();
        assert!(roles.is_empty());
        assert!(!roles.contains(""));
    }
}

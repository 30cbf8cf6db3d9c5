use formula_catalog::{Command, RoleSet, Tree};

/// Derive the tree a caller holding `roles` may see.
///
/// Commands without role requirements are always kept. A restricted command
/// is kept when any one of its roles is held. Surviving commands keep their
/// source order, and the version is copied unchanged. When `replace_repo_url`
/// is a non-empty URL it overrides every non-empty `repoUrl` among the kept
/// formulas. The source tree is never modified.
pub fn filter_tree(tree: &Tree, roles: &RoleSet, replace_repo_url: Option<&str>) -> Tree {
    let replacement = replace_repo_url.filter(|url| !url.is_empty());

    let commands = tree
        .commands
        .iter()
        .filter(|command| is_visible(command, roles))
        .map(|command| {
            let mut command = command.clone();
            if let (Some(url), Some(formula)) = (replacement, command.formula.as_mut()) {
                if !formula.repo_url.is_empty() {
                    formula.repo_url = url.to_string();
                }
            }
            command
        })
        .collect();

    Tree::new(tree.version.clone(), commands)
}

/// Whether a caller holding `roles` may see `command`
pub fn is_visible(command: &Command, roles: &RoleSet) -> bool {
    command.is_public() || roles.intersects(&command.roles)
}

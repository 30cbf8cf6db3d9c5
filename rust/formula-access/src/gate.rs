use formula_catalog::Tree;

/// Path prefix under which formula files are requested
pub const FORMULAS_PREFIX: &str = "/formulas/";

/// The formula directory key a file request path refers to.
///
/// The first `/formulas/` is removed and then the file's own name is dropped:
/// `/formulas/scripts/deploy/run.sh` yields `scripts/deploy`. A remainder
/// with no `/` is returned whole.
///
/// Returns `None` for paths that could resolve outside the directory the key
/// names: dot segments (plain or percent-encoded), backslashes and encoded
/// separators.
pub fn formula_key(path: &str) -> Option<String> {
    let rest = path.replacen(FORMULAS_PREFIX, "", 1);
    if !is_confined(&rest) {
        return None;
    }

    match rest.rsplit_once('/') {
        Some((directory, _)) => Some(directory.to_string()),
        None => Some(rest),
    }
}

fn is_confined(path: &str) -> bool {
    let lowered = path.to_ascii_lowercase();
    if lowered.contains('\\') || lowered.contains("%2f") || lowered.contains("%5c") {
        return false;
    }

    lowered
        .split('/')
        .map(|segment| segment.replace("%2e", "."))
        .all(|segment| segment != "." && segment != "..")
}

/// Whether some command in `tree` carries a formula located at `key`
pub fn grants(tree: &Tree, key: &str) -> bool {
    tree.formulas().any(|formula| formula.path == key)
}

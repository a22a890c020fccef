/// Author for a new post: the given name, then the configured one, then the OS user.
pub fn resolve_author(name: Option<&str>, configured: Option<&str>) -> String {
    let explicit = name.or(configured)
        .map(str::trim)
        .filter(|n| !n.is_empty());
    if let Some(name) = explicit {
        return name.to_string();
    }

    let name = whoami::realname();
    if name.trim().is_empty() {
        return whoami::username();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_author() {
        assert_eq!(resolve_author(Some("Flag Name"), Some("Config Name")), "Flag Name");
        assert_eq!(resolve_author(None, Some("Config Name")), "Config Name");
    }
}

//! Rust identifiers derived from logical names.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Strict and reserved keywords of edition 2024.
const RESERVED: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Lower snake case identifier for `name`.
pub fn snake_ident(name: &str) -> String {
    static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
    let lowered = name.to_ascii_lowercase();
    let ident = NON_WORD.replace_all(&lowered, "_");
    let ident = ident.trim_matches('_');

    let ident = if ident.is_empty() {
        "target".to_string()
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", ident)
    } else {
        ident.to_string()
    };

    if RESERVED.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// Hands out unique identifiers in call order: a repeated base gets `_2`,
/// `_3` and so on.
#[derive(Default)]
pub struct IdentAllocator {
    taken: HashSet<String>,
}

impl IdentAllocator {
    pub fn allocate(&mut self, name: &str) -> String {
        self.allocate_with(name, &[])
    }

    /// Allocate an identifier together with every `prefix + ident` name
    /// derived from it. The suffix is bumped until the whole group is free.
    pub fn allocate_with(&mut self, name: &str, prefixes: &[&str]) -> String {
        let base = snake_ident(name);
        let mut ident = base.clone();
        let mut n = 2;
        while !self.group_is_free(&ident, prefixes) {
            ident = format!("{}_{}", base, n);
            n += 1;
        }
        for prefix in prefixes {
            self.taken.insert(format!("{}{}", prefix, ident));
        }
        self.taken.insert(ident.clone());
        ident
    }

    fn group_is_free(&self, ident: &str, prefixes: &[&str]) -> bool {
        !self.taken.contains(ident)
            && prefixes
                .iter()
                .all(|prefix| !self.taken.contains(&format!("{}{}", prefix, ident)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_ident() {
        assert_eq!(snake_ident("email input"), "email_input");
        assert_eq!(snake_ident("/auth/login"), "auth_login");
        assert_eq!(snake_ident("/users/{id}"), "users_id");
        assert_eq!(snake_ident("2FA code"), "_2fa_code");
        assert_eq!(snake_ident("Log-In Button!"), "log_in_button");
        assert_eq!(snake_ident("type"), "type_");
        assert_eq!(snake_ident("try"), "try_");
        assert_eq!(snake_ident("gen"), "gen_");
        assert_eq!(snake_ident("Box"), "box_");
        assert_eq!(snake_ident("yield"), "yield_");
        assert_eq!(snake_ident("///"), "target");
    }

    #[test]
    fn test_allocator_suffixes_collisions() {
        let mut alloc = IdentAllocator::default();
        assert_eq!(alloc.allocate("email input"), "email_input");
        assert_eq!(alloc.allocate("Email-Input"), "email_input_2");
        assert_eq!(alloc.allocate("email_input"), "email_input_3");
        assert_eq!(alloc.allocate("email input 2"), "email_input_2_2");
        assert_eq!(alloc.allocate("password"), "password");
    }

    #[test]
    fn test_allocator_reserves_derived_names() {
        let mut alloc = IdentAllocator::default();
        assert_eq!(alloc.allocate_with("submit", &["click_"]), "submit");
        // `click_submit` already belongs to the first entry's action.
        assert_eq!(alloc.allocate_with("click submit", &["click_"]), "click_submit_2");

        let mut alloc = IdentAllocator::default();
        assert_eq!(alloc.allocate_with("click submit", &["click_"]), "click_submit");
        assert_eq!(alloc.allocate_with("submit", &["click_"]), "submit_2");
    }
}

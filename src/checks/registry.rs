//! Check registry
//!
//! Central registry of all available checks. New checks should be registered here.
//!
//! Registration order is execution order: the success server is checked
//! before the error server.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

use super::traits::Check;
use super::{ErrorCheck, SuccessCheck};

/// Global registry of all available checks
pub static CHECKS: Lazy<IndexMap<&'static str, Arc<dyn Check>>> = Lazy::new(|| {
    let mut m: IndexMap<&'static str, Arc<dyn Check>> = IndexMap::new();
    m.insert("success", Arc::new(SuccessCheck));
    m.insert("error", Arc::new(ErrorCheck));
    m
});

/// Get a check by name
pub fn get_check(name: &str) -> Option<Arc<dyn Check>> {
    CHECKS.get(name).cloned()
}

/// List all available check names, in execution order
pub fn list_checks() -> Vec<&'static str> {
    CHECKS.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks_registered() {
        assert!(CHECKS.contains_key("success"));
        assert!(CHECKS.contains_key("error"));
    }

    #[test]
    fn test_get_check() {
        let check = get_check("success");
        assert!(check.is_some());
        assert_eq!(check.unwrap().name(), "success");

        assert!(get_check("nope").is_none());
    }

    #[test]
    fn test_registry_keys_match_names() {
        for (key, check) in CHECKS.iter() {
            assert_eq!(*key, check.name());
        }
    }

    #[test]
    fn test_success_runs_before_error() {
        assert_eq!(list_checks(), vec!["success", "error"]);
    }
}

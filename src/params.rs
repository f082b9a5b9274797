//! Query-parameter propagation policy.
//!
//! Decides which keys of the *incoming* request's query string are carried
//! forward onto a newly built link. Keys written directly in the link target
//! (`"params?a=A"`) are not governed by the policy; they always win.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

type PredicateFn = Arc<dyn Fn(&str, &str) -> bool + Send + Sync + 'static>;

/// Which incoming query parameters propagate onto built links.
///
/// ```rust
/// use tsu::ParamsPolicy;
///
/// let none = ParamsPolicy::None;
/// let all = ParamsPolicy::All;
/// let some = ParamsPolicy::allow_list(["page", "sort"]);
/// let keep = ParamsPolicy::predicate(|name, _value| name.starts_with("keep"));
/// # let _ = (none, all, some, keep);
/// ```
#[derive(Clone, Default)]
pub enum ParamsPolicy {
    /// Propagate nothing.
    #[default]
    None,
    /// Propagate every incoming parameter.
    All,
    /// Propagate only the named parameters, when the request carries them.
    AllowList(BTreeSet<String>),
    /// Propagate parameters for which the function returns `true`.
    Predicate(PredicateFn),
}

impl ParamsPolicy {
    pub fn allow_list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllowList(names.into_iter().map(Into::into).collect())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Returns the subset of `incoming` this policy carries forward.
    pub fn select(&self, incoming: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        match self {
            Self::None => BTreeMap::new(),
            Self::All => incoming.clone(),
            Self::AllowList(names) => names
                .iter()
                .filter_map(|name| incoming.get_key_value(name))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Self::Predicate(keep) => incoming
                .iter()
                .filter(|(k, v)| keep(k.as_str(), v.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl fmt::Debug for ParamsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::All => f.write_str("All"),
            Self::AllowList(names) => f.debug_tuple("AllowList").field(names).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Parses `none`, `all`, or `allow:<name>[,<name>...]`.
///
/// Predicates have no textual form; construct them in code.
impl FromStr for ParamsPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") {
            return Ok(Self::None);
        }
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let Some(list) = s.strip_prefix("allow:") else {
            return Err(Error::invalid(format!(
                "unknown params policy `{s}` (expected none, all or allow:<names>)"
            )));
        };
        let names: BTreeSet<String> = list
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
            .collect();
        if names.is_empty() {
            return Err(Error::invalid("params allow-list names no parameters"));
        }
        Ok(Self::AllowList(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incoming() -> BTreeMap<String, String> {
        [("a", "Ape"), ("c", "Cheetah"), ("keepD", "Duck")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    fn keys(map: &BTreeMap<String, String>) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn none_selects_nothing() {
        assert!(ParamsPolicy::None.select(&incoming()).is_empty());
    }

    #[test]
    fn all_selects_everything() {
        assert_eq!(ParamsPolicy::All.select(&incoming()), incoming());
    }

    #[test]
    fn allow_list_ignores_names_missing_from_request() {
        let picked = ParamsPolicy::allow_list(["c", "zebra"]).select(&incoming());
        assert_eq!(keys(&picked), ["c"]);
        assert_eq!(picked["c"], "Cheetah");
    }

    #[test]
    fn predicate_sees_name_and_value() {
        let by_name = ParamsPolicy::predicate(|k, _| k.starts_with("keep"));
        assert_eq!(keys(&by_name.select(&incoming())), ["keepD"]);

        let by_value = ParamsPolicy::predicate(|_, v| v.len() > 4);
        assert_eq!(keys(&by_value.select(&incoming())), ["c"]);
    }

    #[test]
    fn parses_textual_forms() {
        assert!(matches!("none".parse::<ParamsPolicy>(), Ok(ParamsPolicy::None)));
        assert!(matches!(" ALL ".parse::<ParamsPolicy>(), Ok(ParamsPolicy::All)));
        match "allow:c, page ,".parse::<ParamsPolicy>() {
            Ok(ParamsPolicy::AllowList(names)) => {
                assert_eq!(names.into_iter().collect::<Vec<_>>(), ["c", "page"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_policies() {
        for bad in ["true", "allow:", "allow: , ", "deny:a", ""] {
            assert!(
                matches!(bad.parse::<ParamsPolicy>(), Err(Error::InvalidConfiguration(_))),
                "{bad:?} should not parse",
            );
        }
    }
}

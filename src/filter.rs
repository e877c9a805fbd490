use std::env;

/// Environment fallback consulted when no explicit filter tag is set.
pub const TAG_ENV_VAR: &str = "TRIAL_TAG";

/// Active tag filter for a run: the explicit tag if given, else the
/// `TRIAL_TAG` environment variable, else no filter.
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    tag: Option<String>,
}

impl TagFilter {
    pub fn resolve(explicit: Option<&str>) -> Self {
        let tag = explicit
            .map(str::to_owned)
            .or_else(|| env::var(TAG_ENV_VAR).ok())
            .filter(|tag| !tag.is_empty());
        Self { tag }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// True when `tags` does not rule the carrier out: no active filter,
    /// an untagged carrier, or any tag matching case-insensitively.
    pub fn admits(&self, tags: &[String]) -> bool {
        match &self.tag {
            None => true,
            Some(filter) => {
                tags.is_empty() || tags.iter().any(|tag| tag.eq_ignore_ascii_case(filter))
            }
        }
    }

    /// Reason recorded on a case the filter skipped.
    pub(crate) fn skip_message(&self) -> String {
        format!("No matching tag '{}'", self.tag.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn no_filter_admits_everything() {
        let filter = TagFilter::default();
        assert!(filter.admits(&[]));
        assert!(filter.admits(&tags(&["integration"])));
    }

    #[test]
    fn untagged_carriers_always_pass() {
        let filter = TagFilter::resolve(Some("unit"));
        assert!(filter.admits(&[]));
    }

    #[test]
    fn matching_is_ascii_case_insensitive() {
        let filter = TagFilter::resolve(Some("Unit"));
        assert!(filter.admits(&tags(&["unit"])));
        assert!(filter.admits(&tags(&["slow", "UNIT"])));
        assert!(!filter.admits(&tags(&["integration"])));
    }

    #[test]
    fn skip_message_names_the_tag() {
        let filter = TagFilter::resolve(Some("nightly"));
        assert_eq!(filter.skip_message(), "No matching tag 'nightly'");
    }

    // All environment handling lives in this one test; `set_var` is racy
    // across threads.
    #[test]
    fn environment_is_the_fallback_not_the_override() {
        unsafe { env::set_var(TAG_ENV_VAR, "nightly") };

        let fallback = TagFilter::resolve(None);
        assert_eq!(fallback.tag(), Some("nightly"));

        let explicit = TagFilter::resolve(Some("unit"));
        assert_eq!(explicit.tag(), Some("unit"));

        unsafe { env::remove_var(TAG_ENV_VAR) };
    }
}

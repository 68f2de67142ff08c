//! Three-tier selection resolution.
//!
//! Content and community selections come from, in order: the argument of a
//! single call, the default stored on the analyzer instance, and finally
//! every known key.

/// Return the first present value: `explicit`, then `instance_default`,
/// then `fallback_all`.
///
/// `fallback_all` is only evaluated when both earlier tiers are absent.
pub fn resolve<T>(
    explicit: Option<T>,
    instance_default: Option<T>,
    fallback_all: impl FnOnce() -> T,
) -> T {
    explicit.or(instance_default).unwrap_or_else(fallback_all)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_wins() {
        assert_eq!(resolve(Some("a"), Some("b"), || "c"), "a");
    }

    #[test]
    fn instance_default_second() {
        assert_eq!(resolve(None, Some("b"), || "c"), "b");
    }

    #[test]
    fn fallback_last() {
        assert_eq!(resolve::<&str>(None, None, || "c"), "c");
    }

    #[test]
    fn empty_selection_is_still_present() {
        let chosen: Vec<String> = resolve(Some(Vec::new()), Some(vec!["x".into()]), Vec::new);
        assert!(chosen.is_empty());
    }

    #[test]
    fn fallback_not_evaluated_when_unused() {
        let out = resolve(Some(1), None, || -> i32 { panic!("fallback evaluated") });
        assert_eq!(out, 1);
    }
}

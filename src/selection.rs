use generation_client::ProjectFile;

/// Re-resolves the viewed-file pointer after an artifact-set replacement.
///
/// An exact path match keeps the selection (pointing at the new file of the
/// same path); otherwise the first file in the new order is selected;
/// otherwise nothing. Runs synchronously with the replacement, so the
/// pointer never references a file absent from the current set.
#[must_use]
pub fn resolve_active_path(prior: Option<&str>, files: &[ProjectFile]) -> Option<String> {
    if let Some(prior) = prior {
        if files.iter().any(|file| file.name == prior) {
            return Some(prior.to_string());
        }
    }

    files.first().map(|file| file.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> ProjectFile {
        ProjectFile {
            name: name.to_string(),
            language: "text".to_string(),
            content: String::new(),
        }
    }

    #[test]
    fn prior_path_present_in_new_set_is_kept() {
        let files = vec![file("a.ts"), file("b.ts"), file("c.ts")];
        assert_eq!(
            resolve_active_path(Some("b.ts"), &files).as_deref(),
            Some("b.ts")
        );
    }

    #[test]
    fn prior_path_absent_falls_back_to_first_file() {
        let files = vec![file("a.ts"), file("b.ts")];
        assert_eq!(
            resolve_active_path(Some("gone.ts"), &files).as_deref(),
            Some("a.ts")
        );
    }

    #[test]
    fn no_prior_selection_picks_first_file() {
        let files = vec![file("main.rs")];
        assert_eq!(
            resolve_active_path(None, &files).as_deref(),
            Some("main.rs")
        );
    }

    #[test]
    fn empty_set_resolves_to_nothing() {
        assert_eq!(resolve_active_path(Some("a.ts"), &[]), None);
        assert_eq!(resolve_active_path(None, &[]), None);
    }

    #[test]
    fn match_is_exact_not_prefix_or_case_insensitive() {
        let files = vec![file("src/App.tsx"), file("src/app.tsx")];
        assert_eq!(
            resolve_active_path(Some("src/App.tsx"), &files).as_deref(),
            Some("src/App.tsx")
        );
        assert_eq!(
            resolve_active_path(Some("src/App"), &files).as_deref(),
            Some("src/App.tsx"),
            "prefix only falls back to the first file"
        );
    }
}

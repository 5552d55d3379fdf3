use crate::error::Result;
use crate::hold;
use crate::types::{Project, Snapshot};
use crate::view::{ViewDefinition, ViewSet};
use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// A view applied to a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredView {
    pub visible: Vec<Project>,
    /// Projects hidden by the viewer's own holds, counted before any other
    /// filter runs.
    pub held_count: usize,
}

fn date_in_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Any separator character is accepted on purpose: `3/4`, `3-4`, `3.4/25`.
    RE.get_or_init(|| Regex::new(r"\d{1,2}.\d{1,2}(.\d{1,4})?").expect("date pattern is valid"))
}

pub fn has_date_in_name(project: &Project) -> bool {
    date_in_name().is_match(&project.name)
}

/// Whole-word, case-insensitive matcher for a view's notes keyword.
pub fn keyword_matcher(keyword: &str) -> Option<Regex> {
    match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(keyword, error = %e, "keyword pattern rejected");
            None
        }
    }
}

pub fn has_keyword(project: &Project, matcher: &Regex) -> bool {
    !project.notes.is_empty() && matcher.is_match(&project.notes)
}

impl ViewSet {
    /// Derive `view` from `snapshot` for the reviewer `viewer` on `today`.
    ///
    /// Holds are removed first, then the color selection (or the complement
    /// of every other view's colors), then the date and keyword requirements.
    /// Output keeps snapshot order unless the view sorts by creation time.
    pub fn apply(
        &self,
        snapshot: &Snapshot,
        view: &ViewDefinition,
        viewer: Option<&str>,
        today: NaiveDate,
    ) -> FilteredView {
        let (held, mut visible): (Vec<&Project>, Vec<&Project>) = snapshot
            .projects
            .iter()
            .partition(|p| hold::is_held(p, viewer, today));

        if view.is_other {
            let used = self.colors_used_elsewhere(&view.key);
            visible.retain(|p| p.color.as_deref().map_or(true, |c| !used.contains(c)));
        } else if !view.colors.is_empty() {
            visible.retain(|p| {
                p.color
                    .as_deref()
                    .is_some_and(|c| view.internal_colors().any(|ic| ic == c))
            });
        }

        if view.with_dates {
            visible.retain(|p| has_date_in_name(p));
        }

        if let Some(keyword) = &view.keyword {
            match keyword_matcher(keyword) {
                Some(matcher) => visible.retain(|p| has_keyword(p, &matcher)),
                None => visible.clear(),
            }
        }

        if view.sort_by_creation {
            visible.sort_by_key(|p| p.created_at);
        }

        FilteredView {
            visible: visible.into_iter().cloned().collect(),
            held_count: held.len(),
        }
    }

    pub fn apply_named(
        &self,
        snapshot: &Snapshot,
        key: &str,
        viewer: Option<&str>,
        today: NaiveDate,
    ) -> Result<FilteredView> {
        let view = self.get(key)?;
        Ok(self.apply(snapshot, view, viewer, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriageError;
    use crate::palette::PaletteColor;
    use crate::types::ProjectId;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn project(id: &str, name: &str, color: Option<&str>, notes: &str) -> Project {
        Project {
            gid: ProjectId::from(id),
            name: name.into(),
            color: color.map(String::from),
            notes: notes.into(),
            created_at: None,
            permalink_url: Some(format!("https://app.asana.com/0/{id}")),
        }
    }

    fn snapshot(projects: Vec<Project>) -> Snapshot {
        Snapshot::new(projects, Utc::now())
    }

    fn ids(view: &FilteredView) -> Vec<&str> {
        view.visible.iter().map(|p| p.gid.as_str()).collect()
    }

    fn abc_views() -> ViewSet {
        ViewSet::new(vec![
            ViewDefinition::new("a", "A", &[PaletteColor::Coral]),
            ViewDefinition::new("b", "B", &[PaletteColor::Blue]),
            ViewDefinition::complement("c", "C"),
        ])
        .unwrap()
    }

    #[test]
    fn held_projects_are_excluded_and_counted() {
        let views = ViewSet::default();
        let snap = snapshot(vec![
            project("1", "Held", Some("light-purple"), "hold 01/31/30 AJP"),
            project("2", "Open", Some("light-purple"), ""),
        ]);
        let view = views.get("needs-scheduling").unwrap();

        let out = views.apply(&snap, view, Some("AJP"), today());
        assert_eq!(ids(&out), vec!["2"]);
        assert_eq!(out.held_count, 1);

        let other_viewer = views.apply(&snap, view, Some("XYZ"), today());
        assert_eq!(ids(&other_viewer), vec!["1", "2"]);
        assert_eq!(other_viewer.held_count, 0);
    }

    #[test]
    fn held_count_includes_projects_outside_the_view() {
        let views = ViewSet::default();
        let snap = snapshot(vec![project("1", "x", Some("dark-orange"), "hold 12/31/2099 AJP")]);
        let out = views.apply_named(&snap, "needs-scheduling", Some("AJP"), today()).unwrap();
        assert!(out.visible.is_empty());
        assert_eq!(out.held_count, 1);
    }

    #[test]
    fn complement_view_takes_unclaimed_colors() {
        let views = abc_views();
        let snap = snapshot(vec![
            project("red", "r", Some("light-red"), ""),
            project("blue", "b", Some("light-blue"), ""),
            project("green", "g", Some("light-green"), ""),
            project("none", "n", None, ""),
        ]);
        let a = views.apply_named(&snap, "a", None, today()).unwrap();
        let b = views.apply_named(&snap, "b", None, today()).unwrap();
        let c = views.apply_named(&snap, "c", None, today()).unwrap();
        assert_eq!(ids(&a), vec!["red"]);
        assert_eq!(ids(&b), vec!["blue"]);
        assert_eq!(ids(&c), vec!["green", "none"]);
    }

    #[test]
    fn colors_match_internal_identifier_not_user_name() {
        let views = ViewSet::default();
        // "blue" is the user-facing name; the API stores "light-blue".
        let snap = snapshot(vec![
            project("1", "x", Some("light-blue"), ""),
            project("2", "y", Some("blue"), ""),
        ]);
        let out = views.apply_named(&snap, "andrew", None, today()).unwrap();
        assert_eq!(ids(&out), vec!["1"]);
    }

    #[test]
    fn date_pattern_requirement() {
        let views = ViewSet::default();
        let snap = snapshot(vec![
            project("1", "Smith, John 3/4", Some("light-purple"), ""),
            project("2", "Smith, John", Some("light-purple"), ""),
            project("3", "Doe 12-01-2025", Some("dark-purple"), ""),
        ]);
        let out = views.apply_named(&snap, "deadlines", None, today()).unwrap();
        assert_eq!(ids(&out), vec!["1", "3"]);
    }

    #[test]
    fn keyword_requirement_is_whole_word_case_insensitive() {
        let views = ViewSet::default();
        let snap = snapshot(vec![
            project("1", "a", Some("light-purple"), "needs ifsp review"),
            project("2", "b", Some("light-purple"), "IFSPS are elsewhere"),
            project("3", "c", Some("light-purple"), ""),
            project("4", "d", Some("dark-purple"), "Line\nIFSP: done"),
        ]);
        let out = views.apply_named(&snap, "ifsp", None, today()).unwrap();
        assert_eq!(ids(&out), vec!["1", "4"]);
    }

    #[test]
    fn sort_by_creation_is_stable() {
        let at = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        let mut p1 = project("1", "a", Some("dark-orange"), "");
        let mut p2 = project("2", "b", Some("dark-orange"), "");
        let mut p3 = project("3", "c", Some("dark-orange"), "");
        p1.created_at = Some(at(5));
        p2.created_at = Some(at(1));
        p3.created_at = Some(at(5));
        let snap = snapshot(vec![p1, p2, p3]);

        let mut view = ViewDefinition::new("o", "O", &[PaletteColor::Orange]);
        view.sort_by_creation = true;
        let views = ViewSet::new(vec![view.clone()]).unwrap();

        let out = views.apply(&snap, &view, None, today());
        assert_eq!(ids(&out), vec!["2", "1", "3"]);
    }

    #[test]
    fn applying_twice_is_identical() {
        let views = ViewSet::default();
        let snap = snapshot(vec![
            project("1", "z 1/2", Some("light-purple"), "IFSP"),
            project("2", "y", Some("dark-teal"), "hold 1/1/2099 AJP"),
            project("3", "x", Some("light-green"), ""),
        ]);
        for view in views.iter() {
            let first = views.apply(&snap, view, Some("AJP"), today());
            let second = views.apply(&snap, view, Some("AJP"), today());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn unknown_view_key_is_error() {
        let snap = snapshot(vec![]);
        let err = ViewSet::default().apply_named(&snap, "missing", None, today()).unwrap_err();
        assert!(matches!(err, TriageError::InvalidView(_)));
    }

    #[test]
    fn keyword_with_regex_metacharacters_is_literal() {
        let dots = keyword_matcher("c..").unwrap();
        assert!(!has_keyword(&project("1", "a", None, "see c++ notes"), &dots));
        let abbrev = keyword_matcher("A.B").unwrap();
        assert!(has_keyword(&project("2", "b", None, "A.B. done"), &abbrev));
        assert!(!has_keyword(&project("3", "c", None, ""), &abbrev));
    }
}

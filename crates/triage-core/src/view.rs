//! Named view definitions.
//!
//! A view is a declarative filter over the snapshot: a color set, an optional
//! date-in-name requirement, an optional notes keyword, or the complement of
//! every other view's colors. The set is validated once when it is built and
//! is read-only afterwards.

use crate::error::{Result, TriageError};
use crate::palette::PaletteColor;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// ViewKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// All matching projects at once.
    List,
    /// One project at a time, with note and hold actions.
    Review,
}

// ---------------------------------------------------------------------------
// ViewDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewDefinition {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub colors: Vec<PaletteColor>,
    #[serde(default = "default_kinds")]
    pub kinds: Vec<ViewKind>,
    /// Keep only projects whose name carries a date such as `3/4`.
    #[serde(default)]
    pub with_dates: bool,
    /// Keep only projects whose notes contain this word.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Complement view: projects whose color no other view claims.
    #[serde(default)]
    pub is_other: bool,
    /// Reviewer initials this view is reserved for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default)]
    pub sort_by_creation: bool,
}

fn default_kinds() -> Vec<ViewKind> {
    vec![ViewKind::List]
}

impl ViewDefinition {
    pub fn new(key: &str, title: &str, colors: &[PaletteColor]) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            colors: colors.to_vec(),
            kinds: default_kinds(),
            with_dates: false,
            keyword: None,
            is_other: false,
            users: Vec::new(),
            sort_by_creation: false,
        }
    }

    pub fn complement(key: &str, title: &str) -> Self {
        Self {
            is_other: true,
            ..Self::new(key, title, &[])
        }
    }

    pub fn has_kind(&self, kind: ViewKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_for(&self, initials: &str) -> bool {
        self.users.iter().any(|u| u.eq_ignore_ascii_case(initials))
    }

    pub fn internal_colors(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.colors.iter().map(|c| c.internal())
    }

    fn with_kinds(mut self, kinds: &[ViewKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    fn with_users(mut self, users: &[&str]) -> Self {
        self.users = users.iter().map(|u| u.to_string()).collect();
        self
    }
}

// ---------------------------------------------------------------------------
// ViewSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViewSet {
    views: Vec<ViewDefinition>,
}

impl ViewSet {
    /// Validate and wrap `views`. Keys must be unique and non-empty, keywords
    /// non-blank, and a complement view may not name colors of its own.
    pub fn new(views: Vec<ViewDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for view in &views {
            if view.key.trim().is_empty() {
                return Err(TriageError::InvalidView("view key is empty".into()));
            }
            if !seen.insert(view.key.as_str()) {
                return Err(TriageError::InvalidView(format!(
                    "duplicate view key '{}'",
                    view.key
                )));
            }
            if view.is_other && !view.colors.is_empty() {
                return Err(TriageError::InvalidView(format!(
                    "'{}' is a complement view and cannot list colors",
                    view.key
                )));
            }
            if view.keyword.as_deref().is_some_and(|k| k.trim().is_empty()) {
                return Err(TriageError::InvalidView(format!(
                    "'{}' has a blank keyword",
                    view.key
                )));
            }
        }
        Ok(Self { views })
    }

    /// Parse a YAML list of view definitions. Unknown fields and color names
    /// are rejected here rather than when the view is used.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let views: Vec<ViewDefinition> = serde_yaml::from_str(yaml)?;
        Self::new(views)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewDefinition> {
        self.views.iter()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, key: &str) -> Result<&ViewDefinition> {
        self.views
            .iter()
            .find(|v| v.key == key)
            .ok_or_else(|| TriageError::InvalidView(key.to_string()))
    }

    /// Internal colors claimed by every non-complement view except `exclude`.
    pub fn colors_used_elsewhere(&self, exclude: &str) -> HashSet<&'static str> {
        self.views
            .iter()
            .filter(|v| v.key != exclude && !v.is_other)
            .flat_map(|v| v.internal_colors())
            .collect()
    }

    /// Views offered to a reviewer. Someone named in any view's `users` sees
    /// only the views reserved for them; everyone else sees all views.
    pub fn visible_for(&self, initials: Option<&str>) -> Vec<&ViewDefinition> {
        let reserved = initials
            .filter(|i| !i.is_empty())
            .filter(|i| self.views.iter().any(|v| v.is_for(i)));
        match reserved {
            Some(i) => self.views.iter().filter(|v| v.is_for(i)).collect(),
            None => self.views.iter().collect(),
        }
    }
}

impl Default for ViewSet {
    fn default() -> Self {
        Self {
            views: default_views(),
        }
    }
}

fn default_views() -> Vec<ViewDefinition> {
    use PaletteColor::*;
    use ViewKind::{List, Review};

    vec![
        ViewDefinition::new("andrew", "Andrew", &[Blue])
            .with_kinds(&[List, Review])
            .with_users(&["AJP"]),
        ViewDefinition::new("babynet", "BabyNet", &[Orange]),
        ViewDefinition::new("barbara", "Barbara and New Referrals", &[Yellow]),
        ViewDefinition {
            with_dates: true,
            ..ViewDefinition::new("deadlines", "Deadlines", &[Purple, DarkPurple])
        },
        ViewDefinition {
            keyword: Some("IFSP".to_string()),
            ..ViewDefinition::new("ifsp", "IFSP Purples", &[Purple, DarkPurple])
        },
        ViewDefinition::new("insurance", "Insurance", &[HotPink, LightPink]),
        ViewDefinition::new("needs-scheduling", "Needs to Be Scheduled", &[Purple, DarkPurple]),
        ViewDefinition::new("questionnaires", "Questionnaires", &[LightBlue, Coral])
            .with_kinds(&[List, Review]),
        ViewDefinition::complement("other", "Other Projects"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_set_is_valid() {
        let set = ViewSet::default();
        assert_eq!(set.len(), 9);
        assert!(ViewSet::new(default_views()).is_ok());
        assert!(set.get("other").unwrap().is_other);
        assert_eq!(set.get("ifsp").unwrap().keyword.as_deref(), Some("IFSP"));
    }

    #[test]
    fn unknown_view_is_invalid_view() {
        let err = ViewSet::default().get("nope").unwrap_err();
        assert!(matches!(err, TriageError::InvalidView(ref k) if k == "nope"));
    }

    #[test]
    fn colors_used_elsewhere_skips_self_and_complements() {
        let set = ViewSet::default();
        let used = set.colors_used_elsewhere("other");
        assert!(used.contains("light-blue"));
        assert!(used.contains("dark-brown"));
        assert!(used.contains("light-red"));
        assert!(!used.contains("light-green"));
        assert!(!used.contains("light-teal"));
    }

    #[test]
    fn visible_for_reserved_reviewer() {
        let set = ViewSet::default();
        let keys: Vec<_> = set.visible_for(Some("ajp")).iter().map(|v| v.key.clone()).collect();
        assert_eq!(keys, vec!["andrew"]);
        assert_eq!(set.visible_for(Some("XYZ")).len(), 9);
        assert_eq!(set.visible_for(None).len(), 9);
    }

    #[test]
    fn yaml_views_parse_with_defaults() {
        let yaml = r#"
- key: red
  title: Reds
  colors: [coral]
- key: rest
  title: Everything else
  is_other: true
  kinds: [list, review]
"#;
        let set = ViewSet::from_yaml(yaml).unwrap();
        let red = set.get("red").unwrap();
        assert_eq!(red.colors, vec![PaletteColor::Coral]);
        assert_eq!(red.kinds, vec![ViewKind::List]);
        assert!(set.get("rest").unwrap().has_kind(ViewKind::Review));
    }

    #[test]
    fn yaml_rejects_unknown_color() {
        let yaml = "- key: g\n  title: Greens\n  colors: [green]\n";
        assert!(matches!(ViewSet::from_yaml(yaml), Err(TriageError::Yaml(_))));
    }

    #[test]
    fn yaml_rejects_unknown_field() {
        let yaml = "- key: g\n  title: G\n  colour: [coral]\n";
        assert!(matches!(ViewSet::from_yaml(yaml), Err(TriageError::Yaml(_))));
    }

    #[test]
    fn duplicate_keys_rejected() {
        let views = vec![
            ViewDefinition::new("a", "A", &[PaletteColor::Blue]),
            ViewDefinition::new("a", "A again", &[PaletteColor::Orange]),
        ];
        assert!(matches!(ViewSet::new(views), Err(TriageError::InvalidView(_))));
    }

    #[test]
    fn complement_with_colors_rejected() {
        let mut other = ViewDefinition::complement("other", "Other");
        other.colors.push(PaletteColor::Blue);
        assert!(matches!(ViewSet::new(vec![other]), Err(TriageError::InvalidView(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("views.yaml");
        std::fs::write(&path, "- key: o\n  title: Oranges\n  colors: [orange]\n").unwrap();
        let set = ViewSet::load(&path).unwrap();
        assert_eq!(set.get("o").unwrap().title, "Oranges");
    }
}

//! Hold directives embedded in project notes.
//!
//! A reviewer hides a project from their own views by writing a line such as
//! `hold 01/31/30 ///AJP` into the notes. Notes are hand-edited, so the
//! scanner is forgiving: a directive whose date cannot be resolved is logged
//! and skipped, and directives for other reviewers are ignored.

use crate::types::Project;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

fn hold_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bhold\s+(\d{1,2}/\d{1,2}(?:/\d{2,4})?)\s+/*(\w+)/*")
            .expect("hold pattern is valid")
    })
}

/// One `hold <date> <initials>` occurrence found in notes text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldDirective {
    pub raw_date: String,
    pub initials: String,
    pub resolved: Option<NaiveDate>,
}

impl HoldDirective {
    pub fn belongs_to(&self, viewer: &str) -> bool {
        self.initials.eq_ignore_ascii_case(viewer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldMatch {
    Matched { date: NaiveDate, initials: String },
    NoMatch,
}

/// Every hold directive in `notes`, left to right.
pub fn scan(notes: &str, today: NaiveDate) -> Vec<HoldDirective> {
    hold_pattern()
        .captures_iter(notes)
        .map(|caps| {
            let raw_date = caps[1].to_string();
            let resolved = parse_hold_date(&raw_date, today);
            HoldDirective {
                raw_date,
                initials: caps[2].to_string(),
                resolved,
            }
        })
        .collect()
}

/// Resolve a `M/D`, `M/D/YY` or `M/D/YYYY` token.
///
/// `M/D` takes the year of `today`. Two-digit years use chrono's `%y` rule:
/// 00-69 map to 2000-2069 and 70-99 to 1970-1999. Any other year width, or a
/// date that does not exist, is unresolved.
pub fn parse_hold_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split('/').collect();
    match parts.as_slice() {
        [month, day] => {
            NaiveDate::from_ymd_opt(today.year(), month.parse().ok()?, day.parse().ok()?)
        }
        [_, _, year] if year.len() == 4 => NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok(),
        [_, _, year] if year.len() == 2 => NaiveDate::parse_from_str(raw, "%m/%d/%y").ok(),
        _ => None,
    }
}

/// The first resolvable directive in `notes` that belongs to `viewer`.
pub fn match_viewer(notes: &str, viewer: &str, today: NaiveDate) -> HoldMatch {
    for directive in scan(notes, today) {
        if !directive.belongs_to(viewer) {
            continue;
        }
        match directive.resolved {
            Some(date) => {
                return HoldMatch::Matched {
                    date,
                    initials: directive.initials,
                }
            }
            None => {
                tracing::warn!(date = %directive.raw_date, "invalid date format in hold entry");
            }
        }
    }
    HoldMatch::NoMatch
}

/// True if the viewer's own hold on `project` runs through `today` or later.
pub fn is_held(project: &Project, viewer: Option<&str>, today: NaiveDate) -> bool {
    let Some(viewer) = viewer.filter(|v| !v.is_empty()) else {
        return false;
    };
    if project.notes.is_empty() {
        return false;
    }
    match match_viewer(&project.notes, viewer, today) {
        HoldMatch::Matched { date, .. } => date >= today,
        HoldMatch::NoMatch => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectId;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project(notes: &str) -> Project {
        Project {
            gid: ProjectId::from("1"),
            name: "p".into(),
            color: None,
            notes: notes.into(),
            created_at: None,
            permalink_url: None,
        }
    }

    #[test]
    fn future_hold_for_viewer_is_held() {
        let p = project("hold 01/31/30 AJP");
        assert!(is_held(&p, Some("AJP"), day(2026, 10, 16)));
        assert!(is_held(&p, Some("ajp"), day(2026, 10, 16)));
    }

    #[test]
    fn hold_for_other_reviewer_is_ignored() {
        let p = project("hold 01/31/30 AJP");
        assert!(!is_held(&p, Some("XYZ"), day(2026, 10, 16)));
    }

    #[test]
    fn hold_through_today_is_held_but_past_is_not() {
        let p = project("hold 3/4/2026 AJP");
        assert!(is_held(&p, Some("AJP"), day(2026, 3, 4)));
        assert!(!is_held(&p, Some("AJP"), day(2026, 3, 5)));
    }

    #[test]
    fn no_viewer_means_nothing_is_held() {
        let p = project("hold 01/31/30 AJP");
        assert!(!is_held(&p, None, day(2026, 1, 1)));
        assert!(!is_held(&p, Some(""), day(2026, 1, 1)));
    }

    #[test]
    fn attribution_slashes_around_initials() {
        let p = project("10/16 hold 01/31/30 ///AJP\nolder line");
        assert!(is_held(&p, Some("AJP"), day(2026, 10, 16)));
    }

    #[test]
    fn first_directive_for_viewer_decides() {
        // The later hold would still be active, but the first one has expired.
        let p = project("hold 1/1/2020 AJP\nhold 1/1/2099 AJP");
        assert!(!is_held(&p, Some("AJP"), day(2026, 10, 16)));
    }

    #[test]
    fn other_reviewers_are_skipped_before_viewer_match() {
        let p = project("hold 1/1/2020 XYZ\nhold 1/1/2099 AJP");
        assert!(is_held(&p, Some("AJP"), day(2026, 10, 16)));
    }

    #[test]
    fn unparseable_date_is_skipped_not_fatal() {
        let p = project("hold 13/45/30 AJP\nhold 12/1/2099 AJP");
        assert!(is_held(&p, Some("AJP"), day(2026, 10, 16)));
        let only_bad = project("hold 2/30 AJP");
        assert!(!is_held(&only_bad, Some("AJP"), day(2026, 1, 1)));
    }

    #[test]
    fn keyword_is_case_insensitive_and_word_bounded() {
        assert_eq!(scan("HOLD 1/2 abc", day(2026, 1, 1)).len(), 1);
        assert_eq!(scan("Hold 1/2 abc", day(2026, 1, 1)).len(), 1);
        assert!(scan("withhold 1/2 abc", day(2026, 1, 1)).is_empty());
        assert!(scan("hold on 1/2 abc", day(2026, 1, 1)).is_empty());
    }

    #[test]
    fn month_day_uses_current_year() {
        let today = day(2026, 10, 16);
        assert_eq!(parse_hold_date("12/25", today), Some(day(2026, 12, 25)));
        assert_eq!(parse_hold_date("1/2", today), Some(day(2026, 1, 2)));
    }

    #[test]
    fn four_digit_year() {
        assert_eq!(parse_hold_date("3/4/2031", day(2026, 1, 1)), Some(day(2031, 3, 4)));
    }

    #[test]
    fn two_digit_year_uses_chrono_pivot() {
        let today = day(2026, 1, 1);
        assert_eq!(parse_hold_date("01/31/30", today), Some(day(2030, 1, 31)));
        assert_eq!(parse_hold_date("1/1/69", today), Some(day(2069, 1, 1)));
        assert_eq!(parse_hold_date("1/1/70", today), Some(day(1970, 1, 1)));
        assert_eq!(parse_hold_date("12/31/99", today), Some(day(1999, 12, 31)));
    }

    #[test]
    fn three_digit_year_is_unresolved() {
        assert_eq!(parse_hold_date("1/1/203", day(2026, 1, 1)), None);
        let found = scan("hold 1/1/203 AJP", day(2026, 1, 1));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].resolved, None);
    }

    #[test]
    fn match_viewer_reports_date_and_initials() {
        let m = match_viewer("note\nhold 2/3/27 ///ajp", "AJP", day(2026, 1, 1));
        assert_eq!(
            m,
            HoldMatch::Matched {
                date: day(2027, 2, 3),
                initials: "ajp".into()
            }
        );
        assert_eq!(match_viewer("nothing here", "AJP", day(2026, 1, 1)), HoldMatch::NoMatch);
    }
}

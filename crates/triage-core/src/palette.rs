//! Static mapping between the color names people use and the color
//! identifiers the API stores on a project.

use crate::error::TriageError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaletteColor {
    Purple,
    DarkPurple,
    Yellow,
    Orange,
    Blue,
    LightBlue,
    LightTeal,
    Coral,
    HotPink,
    LightPink,
}

impl PaletteColor {
    pub fn all() -> &'static [PaletteColor] {
        &[
            PaletteColor::Purple,
            PaletteColor::DarkPurple,
            PaletteColor::Yellow,
            PaletteColor::Orange,
            PaletteColor::Blue,
            PaletteColor::LightBlue,
            PaletteColor::LightTeal,
            PaletteColor::Coral,
            PaletteColor::HotPink,
            PaletteColor::LightPink,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            PaletteColor::Purple => "purple",
            PaletteColor::DarkPurple => "dark-purple",
            PaletteColor::Yellow => "yellow",
            PaletteColor::Orange => "orange",
            PaletteColor::Blue => "blue",
            PaletteColor::LightBlue => "light-blue",
            PaletteColor::LightTeal => "light-teal",
            PaletteColor::Coral => "coral",
            PaletteColor::HotPink => "hot-pink",
            PaletteColor::LightPink => "light-pink",
        }
    }

    /// The identifier stored in a project's `color` field.
    pub fn internal(self) -> &'static str {
        match self {
            PaletteColor::Purple => "light-purple",
            PaletteColor::DarkPurple => "dark-purple",
            PaletteColor::Yellow => "dark-brown",
            PaletteColor::Orange => "dark-orange",
            PaletteColor::Blue => "light-blue",
            PaletteColor::LightBlue => "dark-teal",
            PaletteColor::LightTeal => "light-teal",
            PaletteColor::Coral => "light-red",
            PaletteColor::HotPink => "dark-pink",
            PaletteColor::LightPink => "light-pink",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            PaletteColor::Purple => "#CD95EA",
            PaletteColor::DarkPurple => "#9E97E7",
            PaletteColor::Yellow => "#F8DF72",
            PaletteColor::Orange => "#EC8D71",
            PaletteColor::Blue => "#4573D2",
            PaletteColor::LightBlue => "#9EE7E3",
            PaletteColor::LightTeal => "#4ECBC4",
            PaletteColor::Coral => "#FC979A",
            PaletteColor::HotPink => "#F26FB2",
            PaletteColor::LightPink => "#F9AAEF",
        }
    }

    pub fn from_internal(internal: &str) -> Option<PaletteColor> {
        Self::all().iter().copied().find(|c| c.internal() == internal)
    }
}

impl fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PaletteColor {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| TriageError::InvalidColor(s.to_string()))
    }
}

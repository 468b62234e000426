use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Dev-server technology a service runs on.
///
/// The tag only matters for picking a preferred port range. Tags this build
/// does not know about are preserved verbatim in [`Framework::Unknown`] so a
/// registry written by another version round-trips unchanged; their
/// [`FrameworkInfo`] resolves to the `generic` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Framework {
    NextJs,
    Nuxt,
    Vite,
    VueCli,
    ReactCra,
    FastApi,
    Django,
    Express,
    Rails,
    Flask,
    #[default]
    Generic,
    Unknown(String),
}

/// Static port conventions for a framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameworkInfo {
    pub default_port: u16,
    pub port_start: u16,
    pub port_end: u16,
    /// Informational only; allocation ignores it.
    pub needs_hmr: bool,
}

impl FrameworkInfo {
    const fn new(default_port: u16, port_start: u16, port_end: u16, needs_hmr: bool) -> Self {
        Self {
            default_port,
            port_start,
            port_end,
            needs_hmr,
        }
    }

    /// Preferred range, inclusive on both ends.
    pub fn port_range(&self) -> RangeInclusive<u16> {
        self.port_start..=self.port_end
    }
}

static KNOWN: [Framework; 11] = [
    Framework::NextJs,
    Framework::Nuxt,
    Framework::Vite,
    Framework::VueCli,
    Framework::ReactCra,
    Framework::FastApi,
    Framework::Django,
    Framework::Express,
    Framework::Rails,
    Framework::Flask,
    Framework::Generic,
];

impl Framework {
    /// Every known framework, in display order.
    pub fn all() -> &'static [Framework] {
        &KNOWN
    }

    /// The tag string used on disk and on the command line.
    pub fn as_str(&self) -> &str {
        match self {
            Framework::Unknown(tag) => tag,
            known => known.known_tag().unwrap_or("generic"),
        }
    }

    fn known_tag(&self) -> Option<&'static str> {
        let tag = match self {
            Framework::NextJs => "nextjs",
            Framework::Nuxt => "nuxt",
            Framework::Vite => "vite",
            Framework::VueCli => "vue-cli",
            Framework::ReactCra => "react-cra",
            Framework::FastApi => "fastapi",
            Framework::Django => "django",
            Framework::Express => "express",
            Framework::Rails => "rails",
            Framework::Flask => "flask",
            Framework::Generic => "generic",
            Framework::Unknown(_) => return None,
        };
        Some(tag)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Framework::Unknown(_))
    }

    /// Port conventions for this framework. Never fails: unknown tags get the
    /// `generic` entry.
    pub fn info(&self) -> FrameworkInfo {
        match self {
            Framework::NextJs => FrameworkInfo::new(3000, 3000, 3099, true),
            Framework::Nuxt => FrameworkInfo::new(3000, 3100, 3199, true),
            Framework::Vite => FrameworkInfo::new(5173, 5173, 5272, true),
            Framework::VueCli => FrameworkInfo::new(8080, 8080, 8099, true),
            Framework::ReactCra => FrameworkInfo::new(3000, 3200, 3299, true),
            Framework::FastApi => FrameworkInfo::new(8000, 8000, 8079, false),
            Framework::Django => FrameworkInfo::new(8000, 8100, 8179, false),
            Framework::Express => FrameworkInfo::new(3000, 4000, 4099, false),
            Framework::Rails => FrameworkInfo::new(3000, 4100, 4199, false),
            Framework::Flask => FrameworkInfo::new(5000, 5000, 5099, false),
            Framework::Generic | Framework::Unknown(_) => {
                FrameworkInfo::new(8080, 9000, 9099, false)
            }
        }
    }
}

/// Tag strings of every known framework, for help text and validation.
pub fn valid_frameworks() -> Vec<&'static str> {
    KNOWN.iter().filter_map(Framework::known_tag).collect()
}

impl From<String> for Framework {
    fn from(tag: String) -> Self {
        match KNOWN.iter().find(|f| f.known_tag() == Some(tag.as_str())) {
            Some(known) => known.clone(),
            None => Framework::Unknown(tag),
        }
    }
}

impl From<&str> for Framework {
    fn from(tag: &str) -> Self {
        Framework::from(tag.to_string())
    }
}

impl From<Framework> for String {
    fn from(framework: Framework) -> Self {
        match framework {
            Framework::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Framework {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Framework::from(s))
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Navigation surface: nine static pages, one per route.

use med_core::Category;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Home,
    Sepsis,
    DkaHhs,
    Autoimmune,
    Infections,
    Toxicology,
    Dermatology,
    Cases,
    Assessment,
}

impl Page {
    /// Navigation order.
    pub const ALL: [Page; 9] = [
        Page::Home,
        Page::Sepsis,
        Page::DkaHhs,
        Page::Autoimmune,
        Page::Infections,
        Page::Toxicology,
        Page::Dermatology,
        Page::Cases,
        Page::Assessment,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Sepsis => "/sepsis",
            Page::DkaHhs => "/dka-hhs",
            Page::Autoimmune => "/autoimmune",
            Page::Infections => "/infections",
            Page::Toxicology => "/toxicology",
            Page::Dermatology => "/dermatology",
            Page::Cases => "/cases",
            Page::Assessment => "/assessment",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Sepsis => "Sepsis",
            Page::DkaHhs => "DKA/HHS",
            Page::Autoimmune => "Autoimmune",
            Page::Infections => "Infections",
            Page::Toxicology => "Toxicology",
            Page::Dermatology => "Dermatology",
            Page::Cases => "Cases",
            Page::Assessment => "Assessment",
        }
    }

    /// Exact path match. Query strings and trailing slashes are not routes.
    pub fn from_path(path: &str) -> Option<Page> {
        Self::ALL.into_iter().find(|page| page.path() == path)
    }

    /// Content category a topic page draws from, if any.
    pub fn category(self) -> Option<Category> {
        match self {
            Page::Sepsis => Some(Category::Sepsis),
            Page::DkaHhs => Some(Category::Endocrine),
            Page::Autoimmune => Some(Category::Autoimmune),
            Page::Infections => Some(Category::Infectious),
            Page::Toxicology => Some(Category::Toxicology),
            Page::Dermatology => Some(Category::Dermatologic),
            Page::Home | Page::Cases | Page::Assessment => None,
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.path())
    }
}

//! Fixed option lists offered during onboarding and their display labels.

/// A selectable option: stable id plus human label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// Id of the free-text entry in both catalogues
pub const OTHER: &str = "other";

pub const PURPOSES: &[CatalogEntry] = &[
    CatalogEntry { id: "find-work", label: "Find freelance work", description: "Looking for projects and clients" },
    CatalogEntry { id: "build-network", label: "Build professional network", description: "Connect with other professionals" },
    CatalogEntry { id: "showcase-skills", label: "Showcase my skills", description: "Display portfolio and expertise" },
    CatalogEntry { id: "learn-grow", label: "Learn and grow", description: "Develop new skills and knowledge" },
    CatalogEntry { id: OTHER, label: "Other", description: "Something else in mind" },
];

pub const BUSINESS_TYPES: &[CatalogEntry] = &[
    CatalogEntry { id: "startup", label: "Startup", description: "Early-stage innovative company" },
    CatalogEntry { id: "small-business", label: "Small Business", description: "Local or regional business" },
    CatalogEntry { id: "enterprise", label: "Enterprise", description: "Large established corporation" },
    CatalogEntry { id: "agency", label: "Agency", description: "Creative or marketing agency" },
    CatalogEntry { id: "nonprofit", label: "Non-profit", description: "Non-profit organization" },
    CatalogEntry { id: "freelancer", label: "Solo Freelancer", description: "Individual looking to hire others" },
    CatalogEntry { id: OTHER, label: "Other", description: "Different type of business" },
];

/// Label for a purpose id; unknown ids are shown as-is
pub fn purpose_label(id: &str) -> &str {
    lookup(PURPOSES, id)
}

/// Label for a business type id; unknown ids are shown as-is
pub fn business_type_label(id: &str) -> &str {
    lookup(BUSINESS_TYPES, id)
}

fn lookup<'a>(entries: &'static [CatalogEntry], id: &'a str) -> &'a str {
    match entries.iter().find(|e| e.id == id) {
        Some(entry) => entry.label,
        None => id,
    }
}

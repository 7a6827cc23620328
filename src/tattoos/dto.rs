use lazy_static::lazy_static;
use serde::Deserialize;

use super::repo_types::TattooFields;
use crate::validation::{Chain, Check, Rule, Validated};

pub const STYLES: &[&str] = &[
    "traditional",
    "neo-traditional",
    "realism",
    "blackwork",
    "watercolor",
    "japanese",
    "tribal",
    "minimalist",
    "other",
];

lazy_static! {
    static ref TATTOO_CHAIN: Chain = Chain::new(
        "tattoo",
        vec![
            Rule::new("title", Check::IsString, "Title must be a string"),
            Rule::new("title", Check::MinLength(3), "Enter a title of at least 3 characters")
                .trimmed(),
            Rule::new("title", Check::MaxLength(120), "Title must be at most 120 characters")
                .trimmed(),
            Rule::new("description", Check::IsString, "Description must be a string"),
            Rule::new(
                "description",
                Check::MinLength(3),
                "Enter a description of at least 3 characters"
            )
            .trimmed(),
            Rule::new("style", Check::OneOf(STYLES), "Unknown tattoo style").optional(),
            Rule::new("imageUrl", Check::IsString, "Invalid image reference").optional(),
        ],
    );
}

/// Body of POST /tattoos and PATCH /tattoos/:id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TattooRequest {
    pub title: String,
    pub description: String,
    pub style: Option<String>,
    pub image_url: Option<String>,
}

impl Validated for TattooRequest {
    fn chain() -> &'static Chain {
        &TATTOO_CHAIN
    }
}

impl From<TattooRequest> for TattooFields {
    fn from(r: TattooRequest) -> Self {
        Self {
            title: r.title.trim().to_string(),
            description: r.description.trim().to_string(),
            style: r.style,
            image_url: r.image_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::services::validator::{Constraint, FieldSpec};

/// Blog record
///
/// `id` is server-assigned on the read path and ignored on the write path.
/// All fields default on decode so that an absent field surfaces as a
/// validation failure ("required") rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub article: String,
}

impl BlogRecord {
    /// Declared constraints per field, in the order violations are reported.
    pub fn field_specs(&self, bounds: &ValidationConfig) -> Vec<FieldSpec<'_>> {
        vec![
            FieldSpec {
                name: "Title",
                value: &self.title,
                constraints: vec![
                    Constraint::Required,
                    Constraint::Length {
                        min: bounds.title_min,
                        max: bounds.title_max,
                    },
                ],
            },
            FieldSpec {
                name: "Article",
                value: &self.article,
                constraints: vec![Constraint::Required],
            },
        ]
    }
}

/// Seeded records served by the listing endpoint.
pub fn sample_blogs() -> Vec<BlogRecord> {
    vec![
        BlogRecord {
            id: 1,
            title: "so".to_string(),
            article: "ok".to_string(),
        },
        BlogRecord {
            id: 2,
            title: "ao".to_string(),
            article: "ak".to_string(),
        },
    ]
}

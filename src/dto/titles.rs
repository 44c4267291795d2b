use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Title;

/// Write shape for titles: catalog references travel as slugs, not ids.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct TitleList {
    #[schema(value_type = Vec<Title>)]
    pub items: Vec<Title>,
}

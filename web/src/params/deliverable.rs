use domain::BrandConfig;
use serde::Deserialize;
use utoipa::ToSchema;

/// Body for generating a deliverable from a caller-supplied transcript.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct GenerateParams {
    /// Raw transcript text to summarize.
    pub(crate) transcript: String,
    /// Client or session name used in the deliverable header.
    pub(crate) client_name: String,
    /// Brand overrides; defaults apply for anything omitted.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub(crate) brand: BrandConfig,
}

use chrono::NaiveDate;
use domain::gateway::zoom::ListRecordingsParams;
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for listing a user's cloud recordings.
///
/// All fields are optional; the domain layer fills in the trailing
/// 30-day window and default page size.
#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) from: Option<NaiveDate>,
    pub(crate) to: Option<NaiveDate>,
    pub(crate) page_size: Option<u32>,
    pub(crate) page_number: Option<u32>,
}

impl From<IndexParams> for ListRecordingsParams {
    fn from(params: IndexParams) -> Self {
        ListRecordingsParams {
            from: params.from,
            to: params.to,
            page_size: params.page_size,
            page_number: params.page_number,
        }
    }
}

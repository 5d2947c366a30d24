use serde::Deserialize;

/// Body for creating or replacing a deal.
#[derive(Debug, Deserialize)]
pub struct DealRequest {
    pub title: String,
    pub content: String,
}

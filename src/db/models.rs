use serde::{Deserialize, Serialize};

use crate::civic::votes::VoteTally;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub title: String,
    pub text: String,
    pub benefit: String,
    pub author_id: String,
    pub created_at: String,
}

/// Validated input for a new bill. Fields are already trimmed.
#[derive(Debug, Clone)]
pub struct NewBill {
    pub title: String,
    pub text: String,
    pub benefit: String,
}

/// A bill with its live vote counts.
#[derive(Debug, Clone, Serialize)]
pub struct BillSummary {
    #[serde(flatten)]
    pub bill: Bill,
    pub up: i64,
    pub down: i64,
    pub ratio: i64,
}

impl BillSummary {
    pub fn new(bill: Bill, tally: VoteTally) -> Self {
        Self {
            bill,
            up: tally.up,
            down: tally.down,
            ratio: tally.ratio(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BillDetail {
    #[serde(flatten)]
    pub summary: BillSummary,
    pub comments: Vec<Comment>,
}

/// Row of the "my bills" dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct MyBill {
    pub id: String,
    pub title: String,
    pub agree: i64,
    pub disagree: i64,
    pub ratio: i64,
}

impl From<BillSummary> for MyBill {
    fn from(summary: BillSummary) -> Self {
        Self {
            id: summary.bill.id,
            title: summary.bill.title,
            agree: summary.up,
            disagree: summary.down,
            ratio: summary.ratio,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub bill_id: String,
    pub content: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub uploader_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub url: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: String,
}

impl Video {
    /// Public path a stored video file is served under.
    pub fn url_for(file_name: &str) -> String {
        format!("/uploads/videos/{}", file_name)
    }
}

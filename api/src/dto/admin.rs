use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_actor() -> String {
    "admin".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExportQuery {
    #[validate(length(min = 1, max = 100))]
    pub tenant_name: String,

    /// Who asked, for the audit line
    #[serde(default = "default_actor")]
    #[validate(length(min = 1, max = 100))]
    pub actor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ImportQuery {
    #[validate(length(min = 1, max = 100))]
    pub tenant_name: String,

    /// Name of the uploaded file; must end in `.db`
    #[validate(length(min = 1, max = 255))]
    pub filename: String,

    #[serde(default = "default_actor")]
    #[validate(length(min = 1, max = 100))]
    pub actor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub message: String,
    pub row_count: u64,
    /// File name of the backup taken of the replaced ledger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_file: Option<String>,
}

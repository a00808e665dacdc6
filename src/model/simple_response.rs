use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleResponse {
    pub message: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            message: "OK".into(),
        }
    }
}

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use checkout::StoreUrl;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenData {
    pub store_url: String,
    pub session_token: String,
}

fn token_path(work_dir: &Path, store_url: &StoreUrl) -> PathBuf {
    let store_url = store_url.to_string().replace(['/', ':'], "_");
    work_dir.join(format!("session_token_{store_url}"))
}

/// Stores the latest session token for a store in the work directory
pub async fn save_token(work_dir: &Path, store_url: &StoreUrl, session_token: &str) -> Result<()> {
    let token_data = TokenData {
        store_url: store_url.to_string(),
        session_token: session_token.to_string(),
    };

    let json = serde_json::to_string_pretty(&token_data)?;
    let mut file = File::create(token_path(work_dir, store_url))?;
    file.write_all(json.as_bytes())?;

    Ok(())
}

/// Gets the stored session token for a store from the work directory
pub async fn get_token_for_store(
    work_dir: &Path,
    store_url: &StoreUrl,
) -> Result<Option<TokenData>> {
    let file_path = token_path(work_dir, store_url);

    if !file_path.exists() {
        return Ok(None);
    }

    let mut file = File::open(file_path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let token_data: TokenData = serde_json::from_str(&contents)?;

    if token_data.store_url == store_url.to_string() {
        Ok(Some(token_data))
    } else {
        Ok(None)
    }
}

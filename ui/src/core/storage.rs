//! Local persistence for the few settings that survive a page reload.
//!
//! Only the OpenAI credential is stored, and only in the browser build
//! (`localStorage`). Native builds read it from the environment at startup
//! and keep edits in memory.

pub const API_KEY_STORAGE_KEY: &str = "druglens.openai_api_key";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("local storage rejected the write")]
    WriteRejected,
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .ok_or(StorageError::Unavailable)
}

pub fn load_api_key() -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        local_storage()
            .ok()
            .and_then(|storage| storage.get_item(API_KEY_STORAGE_KEY).ok().flatten())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

/// Persist (or clear, when `value` is blank) the credential.
pub fn store_api_key(value: &str) -> Result<(), StorageError> {
    #[cfg(target_arch = "wasm32")]
    {
        let storage = local_storage()?;
        let trimmed = value.trim();
        let outcome = if trimmed.is_empty() {
            storage.remove_item(API_KEY_STORAGE_KEY)
        } else {
            storage.set_item(API_KEY_STORAGE_KEY, trimmed)
        };
        outcome.map_err(|_| StorageError::WriteRejected)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = value;
        Ok(())
    }
}

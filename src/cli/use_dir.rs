use std::path::PathBuf;

use crate::error::{BankflowError, Result};
use crate::settings::{load_settings, save_settings, shellexpand_path, Layout};

pub fn run(path: &str) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(path));
    if !resolved.is_dir() {
        return Err(BankflowError::Settings(format!(
            "No such directory: {}",
            resolved.display()
        )));
    }

    let bronze = Layout::new(&resolved, None).bronze_dir;
    if !bronze.is_dir() {
        println!("Note: {} does not exist yet.", bronze.display());
    }

    let mut settings = load_settings();
    settings.data_dir = resolved.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!("Switched to {}", resolved.display());
    Ok(())
}

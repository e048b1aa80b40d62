/*
[INPUT]:  Operator keyboard input
[OUTPUT]: Credentials and confirmations gathered with dialoguer
[POS]:    CLI interactive prompts
[UPDATE]: When adding prompts for new commands
*/

use anyhow::Result;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};
use tracing::warn;

pub fn prompt_text(label: &str) -> Result<String> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(label)
        .interact_text()?;
    Ok(value)
}

pub fn prompt_password() -> Result<String> {
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .interact()?;
    Ok(password)
}

/// New-account password, asked twice
pub fn prompt_new_password() -> Result<String> {
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;
    Ok(password)
}

/// Yes/no question defaulting to no; a broken terminal counts as no
pub fn confirm(prompt: &str) -> bool {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or_else(|err| {
            warn!(error = %err, "confirmation prompt failed");
            false
        })
}

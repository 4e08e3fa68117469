//! Environment variable access, under the shared error convention.

use crate::error::{Error, Result};
use std::env;

/// Read the value of the environment variable `name`.
///
/// Fails with [`Error::Key`] if the variable is undefined, and with
/// [`Error::Invalid`] if its value is not valid UTF-8.
pub fn get_env_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => {
            Err(Error::Key("environment variable undefined".to_string()))
        }
        Err(env::VarError::NotUnicode(_)) => Err(Error::Invalid(format!(
            "environment variable '{}' has a non-UTF-8 value",
            name
        ))),
    }
}

/// Set the environment variable `name` to `value`, replacing any previous
/// value.
pub fn set_env_var(name: &str, value: &str) -> Result<()> {
    if name.is_empty() || name.contains(['\0', '=']) || value.contains('\0') {
        return Err(Error::Invalid(
            "failed setting environment variable".to_string(),
        ));
    }
    env::set_var(name, value);
    Ok(())
}

/// Delete the environment variable `name`. Deleting an undefined variable
/// is not an error.
pub fn del_env_var(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['\0', '=']) {
        return Err(Error::Invalid(
            "failed deleting environment variable".to_string(),
        ));
    }
    env::remove_var(name);
    Ok(())
}

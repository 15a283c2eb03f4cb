// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot operator commands: `keygen`, `encrypt`, `decrypt`, `hash-password`.
//!
//! Results go to stdout so they can be piped; prompts go to the terminal.

use secrecy::{ExposeSecret, SecretString};
use sentinel_config::SentinelConfig;
use sentinel_core::SentinelError;
use sentinel_gate::CredentialHasher;
use sentinel_vault::{KeyMaterial, SecretVault};

/// Fresh master key and signing secret, ready to paste into configuration.
pub struct GeneratedKeys {
    pub master_key: SecretString,
    pub jwt_secret: SecretString,
}

pub fn generate_keys() -> Result<GeneratedKeys, SentinelError> {
    Ok(GeneratedKeys {
        master_key: SecretString::from(KeyMaterial::generate()?.to_encoded()),
        jwt_secret: SecretString::from(sentinel_gate::generate_secret()?),
    })
}

pub fn run_keygen() -> Result<(), SentinelError> {
    let keys = generate_keys()?;
    println!("[vault]");
    println!("master_key = \"{}\"", keys.master_key.expose_secret());
    println!();
    println!("[auth]");
    println!("jwt_secret = \"{}\"", keys.jwt_secret.expose_secret());
    Ok(())
}

pub fn run_encrypt(config: &SentinelConfig, secret: Option<String>) -> Result<(), SentinelError> {
    let vault = SecretVault::from_config(&config.vault)?;
    let secret = match secret {
        Some(s) => SecretString::from(s),
        None => prompt("Secret to encrypt: ")?,
    };
    println!("{}", vault.encrypt(secret.expose_secret())?);
    Ok(())
}

pub fn run_decrypt(config: &SentinelConfig, payload: &str) -> Result<(), SentinelError> {
    let vault = SecretVault::from_config(&config.vault)?;
    println!("{}", vault.decrypt(payload)?);
    Ok(())
}

pub fn run_hash_password(config: &SentinelConfig) -> Result<(), SentinelError> {
    let hasher = CredentialHasher::from_config(&config.hashing)?;
    let password = prompt("Password: ")?;
    let confirm = prompt("Confirm password: ")?;
    if password.expose_secret() != confirm.expose_secret() {
        return Err(SentinelError::Validation("passwords do not match".to_string()));
    }
    println!("{}", hasher.hash(password.expose_secret())?.as_str());
    Ok(())
}

fn prompt(label: &str) -> Result<SecretString, SentinelError> {
    rpassword::prompt_password(label)
        .map(SecretString::from)
        .map_err(|e| SentinelError::Internal(format!("failed to read from terminal: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_load_back() {
        let keys = generate_keys().unwrap();
        let key = KeyMaterial::from_encoded(keys.master_key.expose_secret()).unwrap();
        assert_eq!(key.to_encoded(), keys.master_key.expose_secret());
        assert!(keys.jwt_secret.expose_secret().len() >= 32);
        assert_ne!(keys.master_key.expose_secret(), keys.jwt_secret.expose_secret());
    }

    #[test]
    fn encrypt_without_key_is_missing_key() {
        let err = run_encrypt(&SentinelConfig::default(), Some("x".into())).unwrap_err();
        assert!(matches!(err, SentinelError::MissingKey { .. }));
    }
}

//! Password encryption matching the portal's front-end scheme.
//!
//! The login page ships a JavaScript helper that AES-CBC-encrypts the
//! password under a server-issued salt before submission. The server
//! decrypts with complementary logic, so the output here must match the
//! front-end byte for byte: a 64-character random prefix is prepended to
//! the password, the whole message is padded with PKCS7 and encrypted
//! under a random 16-character IV, and the raw ciphertext is base64
//! encoded. The IV is not transmitted — the server throws away the first
//! 64 decrypted characters, so the corruption an unknown IV causes in the
//! first block lands entirely inside the discarded prefix.
//!
//! Prefix and IV characters come from a fixed alphabet that excludes
//! visually ambiguous glyphs. The front-end draws them from `Math.random`;
//! here they come from an OS-seeded CSPRNG instead.

use aes::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::Rng;
use thiserror::Error;
use tracing::warn;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Alphabet for random padding material, matching the portal script.
pub const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTWXYZabcdefhijkmnprstwxyz2345678";

/// Length of the random prefix prepended to the password.
pub const PREFIX_LEN: usize = 64;

/// Length of the random initialization vector (one AES block).
pub const IV_LEN: usize = 16;

/// Failures inside the encryption transform. Never escape this module:
/// [`encrypt_password`] degrades to the plaintext password instead.
#[derive(Debug, Error)]
enum CipherError {
    #[error("unsupported key length {0} (expected 16, 24, or 32 bytes)")]
    KeyLength(usize),
    #[error("bad IV length {0} (expected {IV_LEN} bytes)")]
    IvLength(usize),
}

/// Generate a random string of `len` characters from [`PASSWORD_ALPHABET`].
fn random_string(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..PASSWORD_ALPHABET.len());
            PASSWORD_ALPHABET[idx] as char
        })
        .collect()
}

/// AES-CBC encrypt `message` under `key`/`iv` with PKCS7 padding.
///
/// The key length selects the AES variant (16/24/32 bytes), like the
/// portal back-end does.
fn aes_cbc_encrypt(message: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>, CipherError> {
    let bad_iv = |_| CipherError::IvLength(iv.len());
    let ciphertext = match key.len() {
        16 => Aes128CbcEnc::new_from_slices(key, iv)
            .map_err(bad_iv)?
            .encrypt_padded_vec_mut::<Pkcs7>(message),
        24 => Aes192CbcEnc::new_from_slices(key, iv)
            .map_err(bad_iv)?
            .encrypt_padded_vec_mut::<Pkcs7>(message),
        32 => Aes256CbcEnc::new_from_slices(key, iv)
            .map_err(bad_iv)?
            .encrypt_padded_vec_mut::<Pkcs7>(message),
        n => return Err(CipherError::KeyLength(n)),
    };
    Ok(ciphertext)
}

/// Encrypt `password` under the server-issued `salt`.
///
/// An empty salt (after trimming) bypasses encryption and returns the
/// password unchanged — the portal accepts plaintext when it issues no
/// salt. Any cipher failure also falls back to the plaintext password,
/// logged but never raised, matching the front-end behavior.
#[must_use]
pub fn encrypt_password(password: &str, salt: &str) -> String {
    let salt = salt.trim();
    if salt.is_empty() {
        return password.to_string();
    }

    let prefix = random_string(PREFIX_LEN);
    let iv = random_string(IV_LEN);
    let message = format!("{prefix}{password}");

    match aes_cbc_encrypt(message.as_bytes(), salt.as_bytes(), iv.as_bytes()) {
        Ok(ciphertext) => STANDARD.encode(ciphertext),
        Err(e) => {
            warn!("password encryption failed ({e}), submitting plaintext");
            password.to_string()
        }
    }
}

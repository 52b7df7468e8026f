use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use anyhow::{Result, anyhow};

// AES Key size for AES256-GCM
const KEY_SIZE: usize = 32; // 256 bits
const NONCE_SIZE: usize = 12; // 96 bits for GCM

/// Symmetric key used to seal session cookies.
///
/// Sealed values are `base64url(nonce || ciphertext)`, so they can be stored in a
/// cookie without further escaping. A fresh nonce is drawn for every seal.
#[derive(Clone)]
pub struct SessionKey([u8; KEY_SIZE]);

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

impl SessionKey {
    // Generates a new random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        SessionKey(key)
    }

    // Decodes a key from standard base64 (the format used in SESSION_KEY)
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = decode_base64(encoded.trim())?;
        let key: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| anyhow!("Invalid session key size: expected {} bytes, got {}", KEY_SIZE, b.len()))?;
        Ok(SessionKey(key))
    }

    // Encrypts data using AES-GCM and encodes nonce + ciphertext
    pub fn seal(&self, data: &[u8]) -> Result<String> {
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| anyhow!("Failed to create AES cipher: {}", e))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher.encrypt(nonce, data)
            .map_err(|e| anyhow!("Failed to encrypt data: {}", e))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(general_purpose::URL_SAFE_NO_PAD.encode(sealed))
    }

    // Decrypts a value produced by `seal`
    pub fn open(&self, sealed: &str) -> Result<Vec<u8>> {
        let bytes = general_purpose::URL_SAFE_NO_PAD.decode(sealed)
            .map_err(|e| anyhow!("Failed to decode sealed value: {}", e))?;
        if bytes.len() <= NONCE_SIZE {
            return Err(anyhow!("Sealed value too short"));
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);

        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| anyhow!("Failed to create AES cipher: {}", e))?;
        let nonce = Nonce::from_slice(nonce_bytes);

        cipher.decrypt(nonce, ciphertext)
            .map_err(|e| anyhow!("Failed to decrypt data: {}", e))
    }

    pub fn to_base64(&self) -> String {
        encode_base64(&self.0)
    }
}

// Encode bytes to base64
pub fn encode_base64(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

// Decode base64 to bytes
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD.decode(data)
        .map_err(|e| anyhow!("Failed to decode base64: {}", e))
}

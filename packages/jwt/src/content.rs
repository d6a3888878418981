//! JWE content encryption (AES-GCM with detached tag)

use crate::algorithms::ContentEncryptionAlgorithm;
use crate::error::{JwtError, JwtResult};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use rand::Rng;
use zeroize::Zeroizing;

const IV_LEN: usize = ContentEncryptionAlgorithm::IV_LEN;
const TAG_LEN: usize = ContentEncryptionAlgorithm::TAG_LEN;

/// Output of [`seal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Random initialization vector used for this message
    pub iv: [u8; IV_LEN],
    /// Ciphertext, same length as the plaintext
    pub ciphertext: Vec<u8>,
    /// Authentication tag
    pub tag: Vec<u8>,
}

/// Fresh random content encryption key, wiped on drop.
#[must_use]
pub fn generate_cek(enc: ContentEncryptionAlgorithm) -> Zeroizing<Vec<u8>> {
    let mut cek = Zeroizing::new(vec![0u8; enc.key_len()]);
    rand::rng().fill_bytes(&mut cek[..]);
    cek
}

/// Encrypt `plaintext` under `cek` with a fresh random IV, authenticating `aad`.
///
/// # Errors
/// [`JwtError::EncryptionError`] if the key length does not match `enc` or
/// the plaintext exceeds the AES-GCM message limit.
pub fn seal(
    enc: ContentEncryptionAlgorithm,
    cek: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> JwtResult<Sealed> {
    if cek.len() != enc.key_len() {
        return Err(JwtError::encryption("content key has the wrong length"));
    }

    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);

    let mut buffer = plaintext.to_vec();
    let tag = match enc {
        ContentEncryptionAlgorithm::A256Gcm => seal_with::<Aes256Gcm>(cek, &iv, aad, &mut buffer)?,
        ContentEncryptionAlgorithm::A128Gcm => seal_with::<Aes128Gcm>(cek, &iv, aad, &mut buffer)?,
    };

    Ok(Sealed {
        iv,
        ciphertext: buffer,
        tag,
    })
}

/// Authenticate and decrypt.
///
/// The tag is checked before any plaintext is released.
///
/// # Errors
/// - [`JwtError::MalformedToken`] if the IV is not 96 bits
/// - [`JwtError::IntegrityError`] if the tag is not 128 bits or does not match
/// - [`JwtError::DecryptionError`] if the key length does not match `enc`
pub fn open(
    enc: ContentEncryptionAlgorithm,
    cek: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> JwtResult<Vec<u8>> {
    if iv.len() != IV_LEN {
        return Err(JwtError::malformed("initialization vector must be 96 bits"));
    }
    if tag.len() != TAG_LEN {
        return Err(JwtError::integrity("authentication tag must be 128 bits"));
    }
    if cek.len() != enc.key_len() {
        return Err(JwtError::decryption("content key has the wrong length"));
    }

    let mut buffer = ciphertext.to_vec();
    match enc {
        ContentEncryptionAlgorithm::A256Gcm => open_with::<Aes256Gcm>(cek, iv, aad, &mut buffer, tag)?,
        ContentEncryptionAlgorithm::A128Gcm => open_with::<Aes128Gcm>(cek, iv, aad, &mut buffer, tag)?,
    }
    Ok(buffer)
}

fn seal_with<C>(cek: &[u8], iv: &[u8], aad: &[u8], buffer: &mut Vec<u8>) -> JwtResult<Vec<u8>>
where
    C: KeyInit + AeadInPlace,
{
    let cipher =
        C::new_from_slice(cek).map_err(|_| JwtError::encryption("content key has the wrong length"))?;
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(iv), aad, buffer.as_mut_slice())
        .map_err(|_| JwtError::encryption("content exceeds AES-GCM limits"))?;
    Ok(tag.to_vec())
}

fn open_with<C>(cek: &[u8], iv: &[u8], aad: &[u8], buffer: &mut Vec<u8>, tag: &[u8]) -> JwtResult<()>
where
    C: KeyInit + AeadInPlace,
{
    let cipher =
        C::new_from_slice(cek).map_err(|_| JwtError::decryption("content key has the wrong length"))?;
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(iv),
            aad,
            buffer.as_mut_slice(),
            GenericArray::from_slice(tag),
        )
        .map_err(|_| JwtError::integrity("authentication tag mismatch"))
}

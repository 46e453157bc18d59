//! PKCS#7 signature validation over PDF byte ranges

use openssl::nid::Nid;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509;
use thiserror::Error;

use super::SignatureValidator;
use crate::container::pdf::EmbeddedSignature;

/// Result of a completed validation attempt
#[derive(Debug, Clone)]
pub struct SignatureVerification {
    /// Trust chain verified against the system store
    pub trusted: bool,
    /// Digest matches the signed byte ranges
    pub intact: bool,
    /// Common name of the signing certificate, when recoverable
    pub signer: Option<String>,
    pub detail: String,
}

#[derive(Error, Debug)]
pub enum ValidationError {
    /// The byte range does not cover the document, so content integrity
    /// cannot be established even though a signature exists
    #[error("signature byte range does not cover the document")]
    ByteRangeUnverifiable,

    #[error("validation failed: {0}")]
    Machinery(String),
}

/// Validator backed by the system trust store
pub struct Pkcs7Validator;

impl Pkcs7Validator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Pkcs7Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles the signed regions described by `/ByteRange`.
///
/// The range must start at offset zero and the only gap must be the
/// `/Contents` hex area; any other layout is unverifiable.
fn signed_regions(file_bytes: &[u8], byte_range: &[i64]) -> Result<Vec<u8>, ValidationError> {
    if byte_range.len() != 4 {
        return Err(ValidationError::ByteRangeUnverifiable);
    }
    let (o1, l1, o2, l2) = (byte_range[0], byte_range[1], byte_range[2], byte_range[3]);
    if o1 < 0 || l1 < 0 || o2 < 0 || l2 < 0 {
        return Err(ValidationError::ByteRangeUnverifiable);
    }
    let (o1, l1, o2, l2) = (o1 as usize, l1 as usize, o2 as usize, l2 as usize);

    let covers_file = o1 == 0 && o2 >= l1 && o2 + l2 == file_bytes.len();
    if !covers_file || o2 + l2 > file_bytes.len() {
        return Err(ValidationError::ByteRangeUnverifiable);
    }

    let mut data = Vec::with_capacity(l1 + l2);
    data.extend_from_slice(&file_bytes[o1..o1 + l1]);
    data.extend_from_slice(&file_bytes[o2..o2 + l2]);
    Ok(data)
}

fn signer_common_name(pkcs7: &Pkcs7, certs: &Stack<X509>) -> Option<String> {
    let signers = pkcs7.signers(certs, Pkcs7Flags::empty()).ok()?;
    let cert = signers.iter().next()?;
    let entry = cert.subject_name().entries_by_nid(Nid::COMMONNAME).next()?;
    entry.data().as_utf8().ok().map(|s| s.to_string())
}

impl SignatureValidator for Pkcs7Validator {
    fn verify(
        &self,
        file_bytes: &[u8],
        signature: &EmbeddedSignature,
    ) -> Result<SignatureVerification, ValidationError> {
        let data = signed_regions(file_bytes, &signature.byte_range)?;

        // /Contents is zero-padded to its reserved size
        let der_len = signature
            .contents
            .iter()
            .rposition(|b| *b != 0)
            .map(|p| p + 1)
            .unwrap_or(0);
        if der_len == 0 {
            return Err(ValidationError::Machinery("empty /Contents".into()));
        }

        let pkcs7 = Pkcs7::from_der(&signature.contents[..der_len])
            .map_err(|e| ValidationError::Machinery(format!("DER parse: {e}")))?;
        let certs = Stack::<X509>::new()
            .map_err(|e| ValidationError::Machinery(format!("cert stack: {e}")))?;
        let mut store_builder = X509StoreBuilder::new()
            .map_err(|e| ValidationError::Machinery(format!("trust store: {e}")))?;
        store_builder
            .set_default_paths()
            .map_err(|e| ValidationError::Machinery(format!("trust store: {e}")))?;
        let store = store_builder.build();

        let intact = pkcs7
            .verify(&certs, &store, Some(&data), None, Pkcs7Flags::NOVERIFY)
            .is_ok();
        let trusted = pkcs7
            .verify(&certs, &store, Some(&data), None, Pkcs7Flags::empty())
            .is_ok();
        let signer = signer_common_name(&pkcs7, &certs);

        let detail = match (trusted, intact) {
            (true, true) => "trust chain and content digest verified".to_string(),
            (false, true) => "content digest verified, trust chain not established".to_string(),
            (true, false) => "trust chain verified, content digest mismatch".to_string(),
            (false, false) => "neither trust chain nor content digest verified".to_string(),
        };

        Ok(SignatureVerification {
            trusted,
            intact,
            signer,
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(byte_range: Vec<i64>) -> EmbeddedSignature {
        EmbeddedSignature {
            signer: None,
            signing_time: None,
            byte_range,
            contents: vec![0x30, 0x00],
            sub_filter: None,
        }
    }

    #[test]
    fn full_coverage_accepted() {
        let file = vec![0u8; 100];
        // [0,40] gap [60,40] covers 0..100 with one gap
        let data = signed_regions(&file, &[0, 40, 60, 40]).unwrap();
        assert_eq!(data.len(), 80);
    }

    #[test]
    fn partial_coverage_is_unverifiable() {
        let file = vec![0u8; 100];
        // range stops short of the end of the file
        let err = signed_regions(&file, &[0, 40, 60, 30]).unwrap_err();
        assert!(matches!(err, ValidationError::ByteRangeUnverifiable));
    }

    #[test]
    fn nonzero_start_is_unverifiable() {
        let file = vec![0u8; 100];
        let err = signed_regions(&file, &[10, 30, 60, 40]).unwrap_err();
        assert!(matches!(err, ValidationError::ByteRangeUnverifiable));
    }

    #[test]
    fn malformed_range_is_unverifiable() {
        let file = vec![0u8; 100];
        let validator = Pkcs7Validator::new();
        let err = validator.verify(&file, &signature(vec![0, 40])).unwrap_err();
        assert!(matches!(err, ValidationError::ByteRangeUnverifiable));
    }
}

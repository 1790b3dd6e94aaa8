//! HMAC-SHA256 signatures over event payloads.
//!
//! The signature covers the payload's canonical JSON (object keys sorted)
//! and travels next to the payload fields as `signature`, hex-encoded.

use {
    crate::error::{Error, Result},
    hmac::{Hmac, Mac},
    serde::{Deserialize, Serialize},
    sha2::Sha256,
};

type HmacSha256 = Hmac<Sha256>;

/// A payload with its signature flattened alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signed<T> {
    #[serde(flatten)]
    pub payload: T,
    pub signature: String,
}

fn canonical_bytes(payload: &impl Serialize) -> Result<Vec<u8>> {
    // `Value` objects are BTreeMap-backed, so keys come out sorted.
    let value = serde_json::to_value(payload)?;
    Ok(serde_json::to_vec(&value)?)
}

fn mac(secret: &[u8], payload: &impl Serialize) -> Result<HmacSha256> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| Error::InvalidKey(e.to_string()))?;
    mac.update(&canonical_bytes(payload)?);
    Ok(mac)
}

/// Sign `payload` with `secret`.
pub fn sign<T: Serialize>(payload: T, secret: &[u8]) -> Result<Signed<T>> {
    let signature = hex::encode(mac(secret, &payload)?.finalize().into_bytes());
    Ok(Signed { payload, signature })
}

/// Check a signed payload against `secret` in constant time.
///
/// Malformed signatures verify as `false`.
pub fn verify<T: Serialize>(signed: &Signed<T>, secret: &[u8]) -> bool {
    let Ok(expected) = hex::decode(&signed.signature) else {
        return false;
    };
    match mac(secret, &signed.payload) {
        Ok(mac) => mac.verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::payloads::{BoundaryIntroduction, Platform},
        serde_json::json,
    };

    const SECRET: &[u8] = b"hub-shared-secret";

    fn intro() -> BoundaryIntroduction {
        BoundaryIntroduction {
            os: "linux".into(),
            platform: Platform::Discord,
            role: "boundary".into(),
            name: "dc-1".into(),
        }
    }

    #[test]
    fn signature_is_flattened_into_payload() {
        let signed = sign(intro(), SECRET).unwrap();
        let value = serde_json::to_value(&signed).unwrap();
        assert_eq!(value["OS"], json!("linux"));
        assert_eq!(value["name"], json!("dc-1"));
        assert_eq!(value["signature"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn signatures_are_deterministic() {
        let a = sign(intro(), SECRET).unwrap();
        let b = sign(intro(), SECRET).unwrap();
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn valid_signature_verifies() {
        let signed = sign(intro(), SECRET).unwrap();
        assert!(verify(&signed, SECRET));
    }

    #[test]
    fn signature_survives_the_wire() {
        let text = serde_json::to_string(&sign(intro(), SECRET).unwrap()).unwrap();
        let received: Signed<BoundaryIntroduction> = serde_json::from_str(&text).unwrap();
        assert_eq!(received.payload, intro());
        assert!(verify(&received, SECRET));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let mut signed = sign(intro(), SECRET).unwrap();
        signed.payload.name = "impostor".into();
        assert!(!verify(&signed, SECRET));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signed = sign(intro(), SECRET).unwrap();
        assert!(!verify(&signed, b"other-secret"));
    }

    #[test]
    fn malformed_signature_is_rejected() {
        let mut signed = sign(intro(), SECRET).unwrap();
        signed.signature = "not-hex".into();
        assert!(!verify(&signed, SECRET));
        signed.signature = "abcd".into();
        assert!(!verify(&signed, SECRET));
    }
}

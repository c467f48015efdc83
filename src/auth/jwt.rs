use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims the backend puts in its session token.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Reads the token's claims without checking its signature.
///
/// The signing key belongs to the backend, which still validates the token
/// on every authenticated call; the client only needs the user id.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::error!("Failed to decode session token: {:?}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn reads_user_id_from_backend_token() {
        let claims = Claims {
            user_id: "resp-42".into(),
            exp: Some(1),
            iat: None,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"backend-only-secret"),
        )
        .unwrap();

        let decoded = decode_claims(&token).unwrap();
        assert_eq!(decoded.user_id, "resp-42");
    }

    #[test]
    fn garbage_token_yields_none() {
        assert!(decode_claims("not.a.token").is_none());
        assert!(decode_claims("").is_none());
    }
}

//! AWS SigV2 request signing (§4.2).
//!
//! Only the GET and PUT SigV2 paths are implemented. A SigV4 PUT builder is described
//! in the design this crate is built from, but its own authors never got it working
//! with session tokens and left it disabled; this crate does not implement it either
//! (see `DESIGN.md`).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::credential::Credential;

type HmacSha1 = Hmac<Sha1>;

/// Headers produced by a signing pass, ready to be laid onto an HTTP request builder.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub date: String,
    pub security_token: Option<String>,
    pub authorization: Option<String>,
}

impl SignedHeaders {
    pub fn apply(&self, mut builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        builder = builder.header("Date", &self.date);
        if let Some(token) = &self.security_token {
            builder = builder.header("x-amz-security-token", token);
        }
        if let Some(auth) = &self.authorization {
            builder = builder.header("Authorization", auth);
        }
        builder
    }
}

/// Builds the `x-amz-security-token:<token>` header-line text embedded in the
/// string-to-sign, or an empty line when there is no session token. The signature
/// must cover the literal header line, not the bare token value — a signer that
/// spliced in the bare token would compute a signature the service never matches.
fn security_token_header_line(session_token: &Option<String>) -> String {
    match session_token {
        Some(token) => format!("x-amz-security-token:{token}"),
        None => String::new(),
    }
}

fn hmac_sha1_base64(secret: &str, string_to_sign: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts key of any length");
    mac.update(string_to_sign.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Signs a GET range request for `bucket`/`key` against `credential`, dated `now`.
///
/// String-to-sign: `GET\n\n\n<Date>\n<security-token-header-line>\n/<bucket>/<key>`.
/// When `credential.provided` is false, no `Authorization` or `x-amz-security-token`
/// header is produced and the request proceeds anonymously — this is the
/// `NoCredentials` case of §7, which is not itself an error.
pub fn sign_get(bucket: &str, key: &str, credential: &Credential, date: &str) -> SignedHeaders {
    if !credential.provided {
        return SignedHeaders {
            date: date.to_string(),
            security_token: None,
            authorization: None,
        };
    }

    let security_token_line = security_token_header_line(&credential.session_token);
    let string_to_sign = format!("GET\n\n\n{date}\n{security_token_line}\n/{bucket}/{key}");
    let signature = hmac_sha1_base64(&credential.secret_access_key, &string_to_sign);

    SignedHeaders {
        date: date.to_string(),
        security_token: credential.session_token.clone(),
        authorization: Some(format!("AWS {}:{}", credential.access_key_id, signature)),
    }
}

/// Signs a PUT upload of `content_length` bytes to `bucket`/`key`.
///
/// String-to-sign: `PUT\n\n<ContentType>\n<Date>\n<security-token-header-line>\n/<bucket>/<key>`.
pub fn sign_put(
    bucket: &str,
    key: &str,
    content_length: u64,
    credential: &Credential,
    date: &str,
) -> SignedHeaders {
    const CONTENT_TYPE: &str = "application/octet-stream";

    if !credential.provided {
        return SignedHeaders {
            date: date.to_string(),
            security_token: None,
            authorization: None,
        };
    }

    let security_token_line = security_token_header_line(&credential.session_token);
    let string_to_sign = format!("PUT\n\n{CONTENT_TYPE}\n{date}\n{security_token_line}\n/{bucket}/{key}");
    let signature = hmac_sha1_base64(&credential.secret_access_key, &string_to_sign);

    let _ = content_length; // carried by the caller as a separate Content-Length header
    SignedHeaders {
        date: date.to_string(),
        security_token: credential.session_token.clone(),
        authorization: Some(format!("AWS {}:{}", credential.access_key_id, signature)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_credential_produces_no_authorization() {
        let headers = sign_get("bkt", "key", &Credential::anonymous(), "20241107T234251Z");
        assert!(headers.authorization.is_none());
        assert!(headers.security_token.is_none());
    }

    #[test]
    fn get_signature_is_deterministic_for_same_inputs() {
        let credential = Credential::new("AKIAEXAMPLE", "secretkey", None, None);
        let a = sign_get("bkt", "key", &credential, "20241107T234251Z");
        let b = sign_get("bkt", "key", &credential, "20241107T234251Z");
        assert_eq!(a.authorization, b.authorization);
    }

    #[test]
    fn different_dates_produce_different_signatures() {
        let credential = Credential::new("AKIAEXAMPLE", "secretkey", None, None);
        let a = sign_get("bkt", "key", &credential, "20241107T234251Z");
        let b = sign_get("bkt", "key", &credential, "20241108T000000Z");
        assert_ne!(a.authorization, b.authorization);
    }

    #[test]
    fn get_signature_matches_hand_computed_value_with_session_token() {
        // Hand-computed HMAC-SHA1/base64 over the literal string-to-sign
        // "GET\n\n\n20241107T234251Z\nx-amz-security-token:sessiontoken123\n/bkt/key",
        // confirming the signature covers the full header-line text and not the bare
        // token value.
        let credential = Credential::new(
            "AKIAEXAMPLE",
            "secretkey",
            Some("sessiontoken123".to_string()),
            None,
        );
        let headers = sign_get("bkt", "key", &credential, "20241107T234251Z");
        assert_eq!(
            headers.authorization.as_deref(),
            Some("AWS AKIAEXAMPLE:teffloYws92NC/n6FD74bxG2Aww=")
        );
    }

    #[test]
    fn put_signature_matches_hand_computed_value_with_session_token() {
        let credential = Credential::new(
            "AKIAEXAMPLE",
            "secretkey",
            Some("sessiontoken123".to_string()),
            None,
        );
        let headers = sign_put("bkt", "key", 5, &credential, "20241107T234251Z");
        assert_eq!(
            headers.authorization.as_deref(),
            Some("AWS AKIAEXAMPLE:FyZeCFI3vwzmyEski1J2Y37Z6sk=")
        );
    }

    #[test]
    fn session_token_is_echoed_into_signature() {
        let with_token = Credential::new(
            "AKIAEXAMPLE",
            "secretkey",
            Some("sessiontoken123".to_string()),
            None,
        );
        let without_token = Credential::new("AKIAEXAMPLE", "secretkey", None, None);
        let a = sign_get("bkt", "key", &with_token, "20241107T234251Z");
        let b = sign_get("bkt", "key", &without_token, "20241107T234251Z");
        assert_ne!(a.authorization, b.authorization);
        assert_eq!(a.security_token.as_deref(), Some("sessiontoken123"));
    }
}

//! Token entities: signed claim sets and the persisted record of every issued token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Default issuer tag written into `iss`
pub const DEFAULT_ISSUER: &str = "keyward@auth_service";

/// Intended use of a token, carried in the `type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived credential authorizing API requests
    Access,
    /// Long-lived, single-use credential that mints a new pair
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenType::Access),
            "refresh" => Ok(TokenType::Refresh),
            other => Err(format!("Unknown token type: {}", other)),
        }
    }
}

/// Claims structure for the JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,

    /// Subject (user ID)
    pub sub: String,

    /// Token type
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// JWT ID, the revocation key
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp, absent for unlimited tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Device session the token belongs to
    pub device_id: String,
}

impl Claims {
    /// Builds a claim set issued at `now`. `exp` is `nbf + ttl` when a TTL is given.
    pub fn new(
        issuer: impl Into<String>,
        subject: Uuid,
        token_type: TokenType,
        jti: impl Into<String>,
        device_id: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> Self {
        let issued_at = now.timestamp();
        Self {
            iss: issuer.into(),
            sub: subject.to_string(),
            token_type,
            jti: jti.into(),
            iat: issued_at,
            nbf: issued_at,
            exp: ttl.map(|ttl| issued_at.saturating_add(ttl.num_seconds())),
            device_id: device_id.into(),
        }
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| now.timestamp() >= exp)
    }

    /// Checks if the claims are within their validity window at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.nbf && !self.is_expired_at(now)
    }

    /// Absolute expiry, if any
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Persisted record of one issued token.
///
/// `revoked` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// JWT ID, primary key
    pub jti: String,

    /// Owning user
    pub subject_id: Uuid,

    /// Device session grouping an access/refresh pair
    pub device_id: String,

    /// Kind of token this row tracks
    pub token_type: TokenType,

    /// Whether the token has been revoked
    pub revoked: bool,

    /// Absolute expiry, `None` for unlimited tokens
    pub expires_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub issued_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Row describing freshly minted claims.
    ///
    /// Fails when `iat` or a present `exp` is not a representable instant,
    /// so a finite token is never recorded as unlimited.
    pub fn from_claims(claims: &Claims, subject_id: Uuid) -> Result<Self, DomainError> {
        let expires_at = match claims.exp {
            Some(exp) => Some(DateTime::from_timestamp(exp, 0).ok_or_else(|| {
                DomainError::internal(format!("Token expiry out of range: {}", exp))
            })?),
            None => None,
        };
        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or_else(|| {
            DomainError::internal(format!("Token issue time out of range: {}", claims.iat))
        })?;

        Ok(Self {
            jti: claims.jti.clone(),
            subject_id,
            device_id: claims.device_id.clone(),
            token_type: claims.token_type,
            revoked: false,
            expires_at,
            issued_at,
        })
    }

    /// Checks if the token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Usable iff not revoked and not expired
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }

    /// Revokes the token
    pub fn revoke(&mut self) {
        self.revoked = true;
    }
}

/// A signed token together with the record that must be stored for it
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// Compact signed form handed to the client
    pub token: String,
    /// Decoded claims
    pub claims: Claims,
    /// Row to persist
    pub record: IssuedToken,
}

/// Access and refresh tokens signed together but not yet persisted
#[derive(Debug, Clone)]
pub struct MintedPair {
    pub access: MintedToken,
    pub refresh: MintedToken,
}

impl MintedPair {
    /// Rows to persist, access first
    pub fn records(&self) -> [IssuedToken; 2] {
        [self.access.record.clone(), self.refresh.record.clone()]
    }

    /// Client-facing pair with lifetimes in seconds
    pub fn into_token_pair(self, access_ttl: Duration, refresh_ttl: Duration) -> TokenPair {
        TokenPair {
            device_id: self.access.claims.device_id.clone(),
            access_token: self.access.token,
            refresh_token: self.refresh.token,
            access_expires_in: access_ttl.num_seconds(),
            refresh_expires_in: refresh_ttl.num_seconds(),
        }
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Device session both tokens belong to
    pub device_id: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_access_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(
            DEFAULT_ISSUER,
            user_id,
            TokenType::Access,
            "jti-1",
            "device-1",
            fixed_now(),
            Some(Duration::minutes(15)),
        );

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, DEFAULT_ISSUER);
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.exp, Some(claims.iat + 900));
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert!(claims.is_valid_at(fixed_now()));
    }

    #[test]
    fn test_unlimited_claims_never_expire() {
        let claims = Claims::new(
            DEFAULT_ISSUER,
            Uuid::new_v4(),
            TokenType::Access,
            "jti-2",
            "device-1",
            fixed_now(),
            None,
        );

        assert_eq!(claims.exp, None);
        assert_eq!(claims.expires_at(), None);
        assert!(!claims.is_expired_at(fixed_now() + Duration::days(3650)));

        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("exp").is_none());
        assert_eq!(json["type"], "access");
    }

    #[test]
    fn test_claims_expiration_boundary() {
        let claims = Claims::new(
            DEFAULT_ISSUER,
            Uuid::new_v4(),
            TokenType::Refresh,
            "jti-3",
            "device-1",
            fixed_now(),
            Some(Duration::seconds(60)),
        );

        assert!(!claims.is_expired_at(fixed_now() + Duration::seconds(59)));
        assert!(claims.is_expired_at(fixed_now() + Duration::seconds(60)));
        assert!(!claims.is_valid_at(fixed_now() - Duration::seconds(1)));
    }

    #[test]
    fn test_issued_token_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(
            DEFAULT_ISSUER,
            user_id,
            TokenType::Refresh,
            "jti-4",
            "device-9",
            fixed_now(),
            Some(Duration::days(30)),
        );
        let mut record = IssuedToken::from_claims(&claims, user_id).unwrap();

        assert_eq!(record.jti, "jti-4");
        assert_eq!(record.device_id, "device-9");
        assert_eq!(record.token_type, TokenType::Refresh);
        assert_eq!(record.issued_at, fixed_now());
        assert_eq!(record.expires_at, Some(fixed_now() + Duration::days(30)));
        assert!(record.is_usable_at(fixed_now()));
        assert!(!record.is_usable_at(fixed_now() + Duration::days(30)));

        record.revoke();
        assert!(!record.is_usable_at(fixed_now()));
    }

    #[test]
    fn test_issued_token_rejects_unrepresentable_expiry() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(
            DEFAULT_ISSUER,
            user_id,
            TokenType::Refresh,
            "jti-5",
            "device-9",
            fixed_now(),
            Some(Duration::seconds(10_000_000_000_000)),
        );

        assert_eq!(claims.expires_at(), None);
        assert!(matches!(
            IssuedToken::from_claims(&claims, user_id),
            Err(DomainError::Internal { .. })
        ));

        let unlimited = Claims::new(
            DEFAULT_ISSUER,
            user_id,
            TokenType::Access,
            "jti-6",
            "device-9",
            fixed_now(),
            None,
        );
        let record = IssuedToken::from_claims(&unlimited, user_id).unwrap();
        assert_eq!(record.expires_at, None);
    }

    #[test]
    fn test_token_type_parsing() {
        assert_eq!("access".parse::<TokenType>().unwrap(), TokenType::Access);
        assert_eq!("refresh".parse::<TokenType>().unwrap(), TokenType::Refresh);
        assert!("Access".parse::<TokenType>().is_err());
        assert_eq!(TokenType::Refresh.to_string(), "refresh");
    }
}

use crate::config::TokenConfig;

/// A credential set accepted by the token endpoint. Exactly one kind per
/// exchange; the presence of a wallet signature selects the wallet grant,
/// otherwise the SMS grant applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// SMS OTP challenge-response.
    Sms { phone: String, code: String },
    /// Wallet signature over a server-issued challenge text.
    Wallet {
        address: String,
        signature: String,
        text: String,
    },
    /// Exchange a refresh token for a new access token.
    Refresh { refresh_token: String },
}

impl TokenGrant {
    pub fn grant_type(&self) -> &'static str {
        match self {
            TokenGrant::Sms { .. } => "sms",
            TokenGrant::Wallet { .. } => "wallet",
            TokenGrant::Refresh { .. } => "refresh_token",
        }
    }

    /// Selects the grant kind from loose optional credentials, as received
    /// by the token route. Mixing credential kinds is rejected.
    pub fn from_credentials(
        phone: Option<String>,
        code: Option<String>,
        address: Option<String>,
        signature: Option<String>,
        text: Option<String>,
    ) -> Result<Self, String> {
        if signature.is_some() && phone.is_some() {
            return Err("Supply either SMS or wallet credentials, not both".to_string());
        }
        if let Some(signature) = signature {
            let address = address.ok_or("Missing wallet address")?;
            let text = text.ok_or("Missing signed challenge text")?;
            return Ok(TokenGrant::Wallet {
                address,
                signature,
                text,
            });
        }
        let phone = phone.ok_or("Missing credentials")?;
        let code = code.ok_or("Missing SMS code")?;
        Ok(TokenGrant::Sms { phone, code })
    }

    /// The form fields sent to the token endpoint, including the client
    /// identity from configuration.
    pub fn form_fields(&self, config: &TokenConfig) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("grant_type", self.grant_type().to_string()),
            ("client_id", config.client_id.clone()),
            ("client_secret", config.client_secret.clone()),
            ("device_id", config.device_id.clone()),
        ];
        match self {
            TokenGrant::Sms { phone, code } => {
                fields.push(("phone", phone.clone()));
                fields.push(("code", code.clone()));
            }
            TokenGrant::Wallet {
                address,
                signature,
                text,
            } => {
                fields.push(("address", address.clone()));
                fields.push(("signature", signature.clone()));
                fields.push(("text", text.clone()));
            }
            TokenGrant::Refresh { refresh_token } => {
                fields.push(("refresh_token", refresh_token.clone()));
            }
        }
        fields
    }

    /// The `application/x-www-form-urlencoded` exchange body.
    pub fn to_body(&self, config: &TokenConfig) -> String {
        serde_urlencoded::to_string(self.form_fields(config))
            .expect("form fields are always encodable")
    }
}

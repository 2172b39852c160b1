use async_trait::async_trait;

use crate::{
    ProviderError,
    spotify::{SpotifyClient, TokenEndpoint, check, parse_json},
    types::{ClientCredentials, Token},
};

#[async_trait]
impl TokenEndpoint for SpotifyClient {
    async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<Token, ProviderError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await?;

        parse_json(check(response).await?).await
    }

    async fn refresh(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<Token, ProviderError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        parse_json(check(response).await?).await
    }
}

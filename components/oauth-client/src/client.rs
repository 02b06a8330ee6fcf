// Copyright (c) 2018 Chef Software Inc. and/or applicable contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use url::Url;

use crate::{config::OAuth2Cfg,
            error::Result,
            http_client::{header_map,
                          HttpClient},
            types::*};

/// Generic OAuth2 authorization-code client.
///
/// Holds the resolved provider configuration, the transport used to reach the
/// provider and the host's verify callback.
pub struct OAuth2Client<V> {
    config:    OAuth2Cfg,
    transport: Box<dyn Transport>,
    verify:    V,
}

impl<V> OAuth2Client<V> {
    /// The proxy, if any, is picked for the host of `token_url` and then
    /// used for every request, including GETs to other hosts. Supply a
    /// `Transport` through `with_transport` when endpoints need different
    /// proxies.
    pub fn new(config: OAuth2Cfg, verify: V) -> Result<Self> {
        let headers = header_map(&config.custom_headers)?;
        let client = HttpClient::new(&config.token_url, headers)?;
        Ok(Self::with_transport(config, verify, Box::new(client)))
    }

    pub fn with_transport(config: OAuth2Cfg, verify: V, transport: Box<dyn Transport>) -> Self {
        OAuth2Client { config,
                       transport,
                       verify }
    }

    pub fn config(&self) -> &OAuth2Cfg { &self.config }

    /// Bearer-authenticated GET, returning the raw response body.
    pub async fn get(&self, url: &str, access_token: &str) -> Result<String> {
        self.transport.get(url, access_token).await
    }

    /// URL the user agent is sent to in order to grant access.
    pub fn authorization_url(&self, state: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.config.authorization_url)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("response_type", "code")
                 .append_pair("client_id", &self.config.client_id);
            if let Some(ref redirect_url) = self.config.redirect_url {
                query.append_pair("redirect_uri", redirect_url);
            }
            if !self.config.scope.is_empty() {
                query.append_pair("scope", &self.config.joined_scope());
            }
            if let Some(state) = state {
                query.append_pair("state", state);
            }
        }
        Ok(url)
    }

    /// Trades an authorization code for tokens at the token endpoint.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuth2Tokens> {
        let mut params = vec![("grant_type", "authorization_code"),
                              ("code", code),
                              ("client_id", self.config.client_id.as_str()),
                              ("client_secret", self.config.client_secret.as_str()),];
        if let Some(ref redirect_url) = self.config.redirect_url {
            params.push(("redirect_uri", redirect_url.as_str()));
        }

        let body = self.transport
                       .post_form(&self.config.token_url, &params)
                       .await?;
        let tokens = serde_json::from_str::<OAuth2Tokens>(&body)?;
        Ok(tokens)
    }

    /// Exchanges `code`, looks up the user through `provider` and hands both
    /// to the verify callback.
    pub async fn authenticate<P>(&self,
                                 code: &str,
                                 provider: &P)
                                 -> ::std::result::Result<(OAuth2Tokens, V::User), P::Error>
        where P: UserProfile,
              V: Verify<P::Profile>
    {
        let tokens = self.exchange_code(code).await?;
        let profile = provider.user_profile(&tokens.access_token).await?;
        let user = self.verify.verify(&tokens, profile).await?;
        Ok((tokens, user))
    }
}

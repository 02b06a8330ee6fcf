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


use async_trait::async_trait;

use crate::error::{Error,
                   Result};

/// Tokens returned by a provider's token endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OAuth2Tokens {
    pub access_token:  String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// The HTTP calls an `OAuth2Client` needs to make.
///
/// `HttpClient` is the production implementation. Both methods resolve to the
/// raw response body; a transport failure or a non-2xx status is an error.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url`, signed with `access_token` as a bearer token.
    async fn get(&self, url: &str, access_token: &str) -> Result<String>;

    /// POST `params` to `url` as an `application/x-www-form-urlencoded` body.
    async fn post_form(&self, url: &str, params: &[(&str, &str)]) -> Result<String>;
}

/// Implemented by provider strategies to look up the identity behind an
/// access token.
#[async_trait]
pub trait UserProfile: Sync + Send {
    type Profile: Send + 'static;
    type Error: From<Error> + Send;

    async fn user_profile(&self,
                          access_token: &str)
                          -> ::std::result::Result<Self::Profile, Self::Error>;
}

/// Host-supplied verify callback.
///
/// Maps the tokens and the fetched profile to the host's own user record.
/// Return `Error::Verify` to reject the login.
#[async_trait]
pub trait Verify<P: Send + 'static>: Sync + Send {
    type User: Send;

    async fn verify(&self, tokens: &OAuth2Tokens, profile: P) -> Result<Self::User>;
}

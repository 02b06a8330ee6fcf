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


use std::collections::BTreeMap;

/// Separator used to join scopes when a provider does not configure one.
pub const DEFAULT_SCOPE_SEPARATOR: &str = " ";

/// Endpoint, credential and header settings for a single OAuth2 provider.
///
/// Provider strategies fill this in from their own defaults; the client
/// treats every field as already resolved.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OAuth2Cfg {
    pub client_id:         String,
    pub client_secret:     String,
    pub authorization_url: String,
    pub token_url:         String,
    pub redirect_url:      Option<String>,
    pub scope:             Vec<String>,
    pub scope_separator:   String,
    /// Sent as default headers on every request made by the client.
    pub custom_headers:    BTreeMap<String, String>,
}

impl OAuth2Cfg {
    /// Scopes as they are sent on the wire.
    pub fn joined_scope(&self) -> String { self.scope.join(&self.scope_separator) }
}

impl Default for OAuth2Cfg {
    fn default() -> Self {
        OAuth2Cfg { client_id:         String::new(),
                    client_secret:     String::new(),
                    authorization_url: String::new(),
                    token_url:         String::new(),
                    redirect_url:      None,
                    scope:             Vec::new(),
                    scope_separator:   DEFAULT_SCOPE_SEPARATOR.to_string(),
                    custom_headers:    BTreeMap::new(), }
    }
}

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


//! Options accepted by the Coding.net strategy and the resolved configuration
//! derived from them.

use std::{collections::BTreeMap,
          fs,
          path::Path};

use oauth_client::config::OAuth2Cfg;

use crate::error::{Error,
                   Result};

/// URL to the Coding.net authorization page
pub const DEFAULT_AUTHORIZATION_URL: &str = "https://coding.net/oauth_authorize.html";
/// URL to the Coding.net token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://coding.net/api/oauth/access_token";
/// URL to the Coding.net current user endpoint
pub const DEFAULT_USER_PROFILE_URL: &str = "https://coding.net/api/current_user";
/// URL to the Coding.net account email endpoint
pub const DEFAULT_USER_EMAIL_URL: &str = "https://coding.net/api/account/email";
pub const DEFAULT_SCOPE_SEPARATOR: &str = ",";
/// User-Agent sent when neither `custom_headers` nor `user_agent` provide one.
pub const DEFAULT_USER_AGENT: &str = "coding-strategy";
/// Registry key the host framework looks the strategy up by.
pub const DEFAULT_NAME: &str = "coding";

pub const USER_SCOPE: &str = "user";
/// Scope that makes the strategy look up the account email.
pub const EMAIL_SCOPE: &str = "user:email";

pub const USER_AGENT_HEADER: &str = "User-Agent";

/// Options as supplied by the host. Anything left unset falls back to the
/// Coding.net defaults when resolved.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyOptions {
    pub client_id:         String,
    pub client_secret:     String,
    /// Redirect URI registered for the application.
    pub callback_url:      Option<String>,
    pub authorization_url: Option<String>,
    pub token_url:         Option<String>,
    pub user_profile_url:  Option<String>,
    pub user_email_url:    Option<String>,
    /// Valid scopes include `user`, `user:email`, `project` and `social`.
    pub scope:             Option<Vec<String>>,
    pub scope_separator:   Option<String>,
    pub custom_headers:    Option<BTreeMap<String, String>>,
    /// Shortcut for a `User-Agent` entry in `custom_headers`. An explicit
    /// header always wins.
    pub user_agent:        Option<String>,
    pub name:              Option<String>,
}

impl StrategyOptions {
    pub fn new<T, U>(client_id: T, client_secret: U) -> Self
        where T: Into<String>,
              U: Into<String>
    {
        StrategyOptions { client_id: client_id.into(),
                          client_secret: client_secret.into(),
                          ..Default::default() }
    }

    pub fn from_raw(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("{}", e)))
    }

    pub fn from_file<T>(path: T) -> Result<Self>
        where T: AsRef<Path>
    {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
                                                  Error::Config(format!("{}, {}",
                                                                        path.display(),
                                                                        e))
                                              })?;
        Self::from_raw(&content)
    }
}

/// Fully defaulted strategy configuration. Never changes after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyCfg {
    pub client_id:         String,
    pub client_secret:     String,
    pub callback_url:      Option<String>,
    pub authorization_url: String,
    pub token_url:         String,
    pub user_profile_url:  String,
    pub user_email_url:    String,
    pub scope:             Vec<String>,
    pub scope_separator:   String,
    /// Always holds a `User-Agent` entry.
    pub custom_headers:    BTreeMap<String, String>,
    pub name:              String,
}

impl StrategyCfg {
    /// Applies the Coding.net defaults to `options`. The options themselves
    /// are left untouched.
    pub fn resolve(options: &StrategyOptions) -> Self {
        let or_default = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };

        StrategyCfg { client_id:         options.client_id.clone(),
                      client_secret:     options.client_secret.clone(),
                      callback_url:      options.callback_url.clone(),
                      authorization_url: or_default(&options.authorization_url,
                                                    DEFAULT_AUTHORIZATION_URL),
                      token_url:         or_default(&options.token_url, DEFAULT_TOKEN_URL),
                      user_profile_url:  or_default(&options.user_profile_url,
                                                    DEFAULT_USER_PROFILE_URL),
                      user_email_url:    or_default(&options.user_email_url,
                                                    DEFAULT_USER_EMAIL_URL),
                      scope:             options.scope.clone().unwrap_or_else(default_scope),
                      scope_separator:   or_default(&options.scope_separator,
                                                    DEFAULT_SCOPE_SEPARATOR),
                      custom_headers:    resolve_headers(options.custom_headers.as_ref(),
                                                         options.user_agent.as_deref()),
                      name:              or_default(&options.name, DEFAULT_NAME), }
    }

    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::MissingCredential("client_id"));
        }
        if self.client_secret.is_empty() {
            return Err(Error::MissingCredential("client_secret"));
        }
        Ok(())
    }

    /// Whether the account email should be looked up after the profile.
    pub fn wants_email(&self) -> bool { self.scope.iter().any(|s| s == EMAIL_SCOPE) }

    pub fn user_agent(&self) -> Option<&str> {
        self.custom_headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(USER_AGENT_HEADER))
            .map(|(_, value)| value.as_str())
    }

    /// Settings handed to the OAuth2 client.
    pub fn oauth2_cfg(&self) -> OAuth2Cfg {
        OAuth2Cfg { client_id:         self.client_id.clone(),
                    client_secret:     self.client_secret.clone(),
                    authorization_url: self.authorization_url.clone(),
                    token_url:         self.token_url.clone(),
                    redirect_url:      self.callback_url.clone(),
                    scope:             self.scope.clone(),
                    scope_separator:   self.scope_separator.clone(),
                    custom_headers:    self.custom_headers.clone(), }
    }
}

fn default_scope() -> Vec<String> { vec![USER_SCOPE.to_string(), EMAIL_SCOPE.to_string()] }

fn resolve_headers(custom_headers: Option<&BTreeMap<String, String>>,
                   user_agent: Option<&str>)
                   -> BTreeMap<String, String> {
    let mut headers = custom_headers.cloned().unwrap_or_default();

    let explicit = headers.iter().any(|(name, value)| {
                                     name.eq_ignore_ascii_case(USER_AGENT_HEADER)
                                     && !value.is_empty()
                                 });
    if !explicit {
        headers.retain(|name, _| !name.eq_ignore_ascii_case(USER_AGENT_HEADER));
        let value = match user_agent {
            Some(ua) if !ua.is_empty() => ua,
            _ => DEFAULT_USER_AGENT,
        };
        headers.insert(USER_AGENT_HEADER.to_string(), value.to_string());
    }

    headers
}

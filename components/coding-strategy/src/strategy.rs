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
use url::Url;

use oauth_client::{client::OAuth2Client,
                   types::{OAuth2Tokens,
                           Transport,
                           UserProfile,
                           Verify}};

use crate::{config::{StrategyCfg,
                     StrategyOptions},
            error::{Error,
                    Result},
            profile::{unwrap_envelope,
                      Profile}};

/// The Coding.net calls made while fetching a profile.
#[derive(Clone, Copy, Debug)]
enum Lookup {
    CurrentUser,
    Email,
}

impl Lookup {
    fn transport_message(self) -> &'static str {
        match self {
            Lookup::CurrentUser => "failed to get current user profile",
            Lookup::Email => "failed to fetch user emails",
        }
    }

    fn parse_error(self) -> fn(serde_json::Error) -> Error {
        match self {
            Lookup::CurrentUser => Error::ProfileParse,
            Lookup::Email => Error::EmailParse,
        }
    }
}

/// Authenticates requests by delegating to Coding.net over OAuth 2.0.
///
/// The strategy owns an `OAuth2Client` configured with the Coding.net
/// endpoints and the host's verify callback `V`. Each profile fetch is
/// independent; nothing is cached between calls.
pub struct CodingStrategy<V> {
    oauth2:           OAuth2Client<V>,
    name:             String,
    user_profile_url: String,
    user_email_url:   String,
    scope:            Vec<String>,
    wants_email:      bool,
}

impl<V> CodingStrategy<V> {
    /// Resolves `options` and builds the OAuth2 client. No network I/O
    /// happens here.
    pub fn new(options: &StrategyOptions, verify: V) -> Result<Self> {
        let cfg = resolve(options)?;
        let oauth2 = OAuth2Client::new(cfg.oauth2_cfg(), verify)?;
        Ok(Self::from_parts(cfg, oauth2))
    }

    /// Like `new`, but every request goes through `transport`.
    pub fn with_transport(options: &StrategyOptions,
                          verify: V,
                          transport: Box<dyn Transport>)
                          -> Result<Self> {
        let cfg = resolve(options)?;
        let oauth2 = OAuth2Client::with_transport(cfg.oauth2_cfg(), verify, transport);
        Ok(Self::from_parts(cfg, oauth2))
    }

    fn from_parts(cfg: StrategyCfg, oauth2: OAuth2Client<V>) -> Self {
        debug!("Configured {} strategy, user_profile_url={}, user_email_url={}, scope={:?}",
               cfg.name, cfg.user_profile_url, cfg.user_email_url, cfg.scope);

        CodingStrategy { oauth2,
                         wants_email: cfg.wants_email(),
                         name: cfg.name,
                         user_profile_url: cfg.user_profile_url,
                         user_email_url: cfg.user_email_url,
                         scope: cfg.scope }
    }

    /// Key the host framework registers this strategy under.
    pub fn name(&self) -> &str { &self.name }

    pub fn scope(&self) -> &[String] { &self.scope }

    pub fn user_profile_url(&self) -> &str { &self.user_profile_url }

    pub fn user_email_url(&self) -> &str { &self.user_email_url }

    pub fn oauth2(&self) -> &OAuth2Client<V> { &self.oauth2 }

    pub fn authorization_url(&self, state: Option<&str>) -> Result<Url> {
        Ok(self.oauth2.authorization_url(state)?)
    }

    /// Fetches the Coding.net user behind `access_token`.
    ///
    /// The account email is looked up as well when the `user:email` scope was
    /// requested. Any failure along the way fails the whole fetch.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
        let body = self.lookup(Lookup::CurrentUser, &self.user_profile_url, access_token)
                       .await?;
        let data = unwrap_envelope(&body, Lookup::CurrentUser.parse_error())?;
        let mut profile = Profile::from_user_data(&body, data)?;

        if self.wants_email {
            let body = self.lookup(Lookup::Email, &self.user_email_url, access_token)
                           .await?;
            let email = unwrap_envelope(&body, Lookup::Email.parse_error())?;
            profile.email = Some(email);
        }

        Ok(profile)
    }

    /// Exchanges an authorization code, fetches the profile and passes both
    /// to the verify callback.
    pub async fn authenticate(&self, code: &str) -> Result<(OAuth2Tokens, V::User)>
        where V: Verify<Profile>
    {
        self.oauth2.authenticate(code, self).await
    }

    async fn lookup(&self, lookup: Lookup, url: &str, access_token: &str) -> Result<String> {
        let body = self.oauth2
                       .get(url, access_token)
                       .await
                       .map_err(|source| {
                           Error::UpstreamTransport { message: lookup.transport_message(),
                                                      source }
                       })?;
        debug!("Coding {:?} response body: {}", lookup, body);
        Ok(body)
    }
}

#[async_trait]
impl<V> UserProfile for CodingStrategy<V> where V: Sync + Send
{
    type Error = Error;
    type Profile = Profile;

    async fn user_profile(&self, access_token: &str) -> Result<Profile> {
        self.fetch_profile(access_token).await
    }
}

fn resolve(options: &StrategyOptions) -> Result<StrategyCfg> {
    let cfg = StrategyCfg::resolve(options);
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth_client::error::{Error as OAuth2Error,
                              Result as OAuth2Result};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::{collections::{BTreeMap,
                            HashMap},
              sync::{Arc,
                     Mutex}};

    const PROFILE_URL: &str = "https://coding.net/api/current_user";
    const EMAIL_URL: &str = "https://coding.net/api/account/email";
    const PROFILE_BODY: &str = r#"{"code": 0, "data":{ "provider": "coding","id": 1,"name": "test","avatar": "avatar_url","path": "profile_url","others":"others"}}"#;
    const EMAIL_BODY: &str = r#"{"code":0,"data":"user@example.com"}"#;

    enum Reply {
        Body(&'static str),
        Status(u16, &'static str),
    }

    type Calls = Arc<Mutex<Vec<(String, String)>>>;

    struct StubTransport {
        replies: HashMap<&'static str, Reply>,
        calls:   Calls,
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(&self, url: &str, access_token: &str) -> OAuth2Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), access_token.to_string()));
            match self.replies.get(url) {
                Some(Reply::Body(body)) => Ok(body.to_string()),
                Some(Reply::Status(code, body)) => {
                    Err(OAuth2Error::HttpResponse(StatusCode::from_u16(*code).unwrap(),
                                                  body.to_string()))
                }
                None => Err(OAuth2Error::HttpResponse(StatusCode::NOT_FOUND, String::new())),
            }
        }

        async fn post_form(&self, _url: &str, params: &[(&str, &str)]) -> OAuth2Result<String> {
            let code = params.iter()
                             .find(|(k, _)| *k == "code")
                             .map(|(_, v)| v.to_string())
                             .unwrap_or_default();
            Ok(format!(r#"{{"access_token":"token-for-{}"}}"#, code))
        }
    }

    /// Accepts every login, mapping it to the Coding.net username.
    struct Accept;

    #[async_trait]
    impl Verify<Profile> for Accept {
        type User = String;

        async fn verify(&self, _tokens: &OAuth2Tokens, profile: Profile) -> OAuth2Result<String> {
            Ok(profile.username.unwrap_or_default())
        }
    }

    fn options(scope: &[&str]) -> StrategyOptions {
        let mut options = StrategyOptions::new("ABC123", "secret");
        options.scope = Some(scope.iter().map(|s| s.to_string()).collect());
        options
    }

    fn strategy(options: &StrategyOptions,
                replies: Vec<(&'static str, Reply)>)
                -> (CodingStrategy<Accept>, Calls) {
        let calls = Calls::default();
        let transport = StubTransport { replies: replies.into_iter().collect(),
                                        calls:   calls.clone(), };
        let strategy = CodingStrategy::with_transport(options, Accept, Box::new(transport)).unwrap();
        (strategy, calls)
    }

    fn urls(calls: &Calls) -> Vec<String> {
        calls.lock()
             .unwrap()
             .iter()
             .map(|(url, _)| url.clone())
             .collect()
    }

    #[test]
    fn default_name() {
        let strategy = CodingStrategy::new(&StrategyOptions::new("ABC123", "secret"), Accept).unwrap();
        assert_eq!(strategy.name(), "coding");
        assert_eq!(strategy.scope(), &["user".to_string(), "user:email".to_string()][..]);
        assert_eq!(strategy.user_profile_url(), PROFILE_URL);
        assert_eq!(strategy.user_email_url(), EMAIL_URL);
    }

    #[test]
    fn custom_name() {
        let mut options = StrategyOptions::new("ABC123", "secret");
        options.name = Some("coding-cn".to_string());
        let strategy = CodingStrategy::new(&options, Accept).unwrap();
        assert_eq!(strategy.name(), "coding-cn");
    }

    #[test]
    fn default_user_agent_reaches_client() {
        let strategy = CodingStrategy::new(&StrategyOptions::new("ABC123", "secret"), Accept).unwrap();
        assert_eq!(strategy.oauth2().config().custom_headers["User-Agent"],
                   "coding-strategy");
    }

    #[test]
    fn user_agent_precedence_reaches_client() {
        let mut options = StrategyOptions::new("ABC123", "secret");
        options.user_agent = Some("example.net".to_string());
        let strategy = CodingStrategy::new(&options, Accept).unwrap();
        assert_eq!(strategy.oauth2().config().custom_headers["User-Agent"],
                   "example.net");

        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), "example.org".to_string());
        options.custom_headers = Some(headers);
        let strategy = CodingStrategy::new(&options, Accept).unwrap();
        assert_eq!(strategy.oauth2().config().custom_headers["User-Agent"],
                   "example.org");
    }

    #[test]
    fn missing_credentials() {
        match CodingStrategy::new(&StrategyOptions::new("", "secret"), Accept) {
            Err(Error::MissingCredential("client_id")) => (),
            Err(e) => panic!("expected MissingCredential, got {}", e),
            Ok(_) => panic!("expected MissingCredential, got a strategy"),
        }
    }

    #[test]
    fn invalid_custom_header() {
        let mut options = StrategyOptions::new("ABC123", "secret");
        let mut headers = BTreeMap::new();
        headers.insert("Bad Header".to_string(), "x".to_string());
        options.custom_headers = Some(headers);

        match CodingStrategy::new(&options, Accept) {
            Err(Error::OAuth2(OAuth2Error::InvalidHeader(_))) => (),
            Err(e) => panic!("expected InvalidHeader, got {}", e),
            Ok(_) => panic!("expected InvalidHeader, got a strategy"),
        }
    }

    #[test]
    fn authorization_url_uses_comma_separator() {
        let (strategy, calls) = strategy(&options(&["user", "user:email"]), vec![]);
        let url = strategy.authorization_url(Some("s1")).unwrap();
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert!(url.as_str()
                   .starts_with("https://coding.net/oauth_authorize.html?"));
        assert_eq!(query["client_id"], "ABC123");
        assert_eq!(query["scope"], "user,user:email");
        assert_eq!(query["state"], "s1");
        assert!(urls(&calls).is_empty());
    }

    #[tokio::test]
    async fn profile_without_email_scope() {
        let (strategy, calls) = strategy(&options(&["user"]),
                                         vec![(PROFILE_URL, Reply::Body(PROFILE_BODY))]);

        let profile = strategy.fetch_profile("access-token").await.unwrap();
        assert_eq!(profile.provider, "coding");
        assert_eq!(profile.id, json!(1));
        assert_eq!(profile.username.as_deref(), Some("test"));
        assert_eq!(profile.avatar.as_deref(), Some("avatar_url"));
        assert_eq!(profile.profile_url, "https://coding.net/profile_url");
        assert_eq!(profile.email, None);
        assert_eq!(profile.raw, PROFILE_BODY);
        assert_eq!(profile.json["others"], "others");
        assert_eq!(profile.json["path"], "profile_url");

        let calls = calls.lock().unwrap();
        assert_eq!(*calls,
                   vec![(PROFILE_URL.to_string(), "access-token".to_string())]);
    }

    #[tokio::test]
    async fn profile_with_email_scope() {
        let (strategy, calls) = strategy(&options(&["user", "user:email"]),
                                         vec![(PROFILE_URL, Reply::Body(PROFILE_BODY)),
                                              (EMAIL_URL, Reply::Body(EMAIL_BODY)),]);

        let profile = strategy.fetch_profile("access-token").await.unwrap();
        assert_eq!(profile.username.as_deref(), Some("test"));
        assert_eq!(profile.email, Some(json!("user@example.com")));

        let calls = calls.lock().unwrap();
        assert_eq!(*calls,
                   vec![(PROFILE_URL.to_string(), "access-token".to_string()),
                        (EMAIL_URL.to_string(), "access-token".to_string()),]);
    }

    #[tokio::test]
    async fn email_structure_is_passed_through() {
        let body = r#"{"code":0,"data":{"email":"user@example.com","verified":true}}"#;
        let (strategy, _) = strategy(&options(&["user:email"]),
                                     vec![(PROFILE_URL, Reply::Body(PROFILE_BODY)),
                                          (EMAIL_URL, Reply::Body(body)),]);

        let profile = strategy.fetch_profile("t").await.unwrap();
        assert_eq!(profile.email,
                   Some(json!({"email": "user@example.com", "verified": true})));
    }

    #[tokio::test]
    async fn email_null_is_passed_through() {
        let (strategy, _) = strategy(&options(&["user", "user:email"]),
                                     vec![(PROFILE_URL, Reply::Body(PROFILE_BODY)),
                                          (EMAIL_URL, Reply::Body(r#"{"code":0,"data":null}"#)),]);

        let profile = strategy.fetch_profile("t").await.unwrap();
        assert_eq!(profile.email, Some(serde_json::Value::Null));
    }

    #[tokio::test]
    async fn email_scope_is_read_once_at_construction() {
        let mut options = options(&["user"]);
        let (strategy, calls) = strategy(&options,
                                         vec![(PROFILE_URL, Reply::Body(PROFILE_BODY))]);
        options.scope = Some(vec!["user:email".to_string()]);

        let profile = strategy.fetch_profile("t").await.unwrap();
        assert_eq!(profile.email, None);
        assert_eq!(urls(&calls), vec![PROFILE_URL.to_string()]);
    }

    #[tokio::test]
    async fn null_avatar_still_logs_in() {
        let body = r#"{"code":0,"data":{"id":7,"name":"n","avatar":null,"path":"/u/n"}}"#;
        let (strategy, _) = strategy(&options(&["user"]), vec![(PROFILE_URL, Reply::Body(body))]);

        let profile = strategy.fetch_profile("t").await.unwrap();
        assert_eq!(profile.avatar, None);
        assert_eq!(profile.profile_url, "https://coding.net/u/n");
    }

    #[tokio::test]
    async fn string_code_is_provider_error() {
        let body = r#"{"code":"1","msg":{"a":"x"}}"#;
        let (strategy, _) = strategy(&options(&["user"]), vec![(PROFILE_URL, Reply::Body(body))]);

        match strategy.fetch_profile("t").await {
            Err(Error::ProviderApplication(msg)) => assert_eq!(msg, "x"),
            other => panic!("expected ProviderApplication, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn profile_transport_failure() {
        let (strategy, calls) = strategy(&options(&["user", "user:email"]),
                                         vec![(PROFILE_URL, Reply::Status(502, "bad gateway"))]);

        match strategy.fetch_profile("access-token").await {
            Err(Error::UpstreamTransport { message, source }) => {
                assert_eq!(message, "failed to get current user profile");
                match source {
                    OAuth2Error::HttpResponse(status, body) => {
                        assert_eq!(status, StatusCode::BAD_GATEWAY);
                        assert_eq!(body, "bad gateway");
                    }
                    e => panic!("unexpected source {}", e),
                }
            }
            other => panic!("expected UpstreamTransport, got {:?}", other),
        }
        assert_eq!(urls(&calls), vec![PROFILE_URL.to_string()]);
    }

    #[tokio::test]
    async fn profile_parse_failure() {
        let (strategy, _) = strategy(&options(&["user"]),
                                     vec![(PROFILE_URL, Reply::Body("<html></html>"))]);

        match strategy.fetch_profile("t").await {
            Err(e @ Error::ProfileParse(_)) => {
                assert!(e.to_string().starts_with("failed to parse user profile"))
            }
            other => panic!("expected ProfileParse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn profile_application_error() {
        let body = r#"{"code":1,"msg":{"a":"bad","b":"request"}}"#;
        let (strategy, calls) = strategy(&options(&["user", "user:email"]),
                                         vec![(PROFILE_URL, Reply::Body(body))]);

        match strategy.fetch_profile("t").await {
            Err(Error::ProviderApplication(msg)) => {
                assert!(msg.contains("bad"));
                assert!(msg.contains("request"));
                assert_eq!(msg, "bad request");
            }
            other => panic!("expected ProviderApplication, got {:?}", other),
        }
        assert_eq!(urls(&calls), vec![PROFILE_URL.to_string()]);
    }

    #[tokio::test]
    async fn email_transport_failure_fails_fetch() {
        let (strategy, calls) = strategy(&options(&["user", "user:email"]),
                                         vec![(PROFILE_URL, Reply::Body(PROFILE_BODY)),
                                              (EMAIL_URL, Reply::Status(500, "boom")),]);

        match strategy.fetch_profile("t").await {
            Err(Error::UpstreamTransport { message, .. }) => {
                assert_eq!(message, "failed to fetch user emails")
            }
            other => panic!("expected UpstreamTransport, got {:?}", other),
        }
        assert_eq!(urls(&calls),
                   vec![PROFILE_URL.to_string(), EMAIL_URL.to_string()]);
    }

    #[tokio::test]
    async fn email_parse_failure_fails_fetch() {
        let (strategy, _) = strategy(&options(&["user", "user:email"]),
                                     vec![(PROFILE_URL, Reply::Body(PROFILE_BODY)),
                                          (EMAIL_URL, Reply::Body("not json")),]);

        match strategy.fetch_profile("t").await {
            Err(e @ Error::EmailParse(_)) => {
                assert!(e.to_string().starts_with("failed to parse email"))
            }
            other => panic!("expected EmailParse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn email_application_error_fails_fetch() {
        let body = r#"{"code":1000,"msg":{"user_not_login":"user not logged in"}}"#;
        let (strategy, _) = strategy(&options(&["user", "user:email"]),
                                     vec![(PROFILE_URL, Reply::Body(PROFILE_BODY)),
                                          (EMAIL_URL, Reply::Body(body)),]);

        match strategy.fetch_profile("t").await {
            Err(Error::ProviderApplication(msg)) => assert_eq!(msg, "user not logged in"),
            other => panic!("expected ProviderApplication, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn custom_endpoints_are_used() {
        let mut options = options(&["user", "user:email"]);
        options.user_profile_url = Some("https://e.coding.net/api/me".to_string());
        options.user_email_url = Some("https://e.coding.net/api/me/email".to_string());
        let (strategy, calls) = strategy(&options,
                                         vec![("https://e.coding.net/api/me",
                                               Reply::Body(PROFILE_BODY)),
                                              ("https://e.coding.net/api/me/email",
                                               Reply::Body(EMAIL_BODY)),]);

        strategy.fetch_profile("t").await.unwrap();
        assert_eq!(urls(&calls),
                   vec!["https://e.coding.net/api/me".to_string(),
                        "https://e.coding.net/api/me/email".to_string()]);
    }

    #[tokio::test]
    async fn repeated_fetches_are_equal() {
        let (strategy, calls) = strategy(&options(&["user", "user:email"]),
                                         vec![(PROFILE_URL, Reply::Body(PROFILE_BODY)),
                                              (EMAIL_URL, Reply::Body(EMAIL_BODY)),]);

        let first = strategy.fetch_profile("t").await.unwrap();
        let second = strategy.fetch_profile("t").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(urls(&calls).len(), 4);
    }

    #[tokio::test]
    async fn user_profile_delegates_to_fetch() {
        let (strategy, _) = strategy(&options(&["user"]),
                                     vec![(PROFILE_URL, Reply::Body(PROFILE_BODY))]);

        let profile = strategy.user_profile("t").await.unwrap();
        assert_eq!(profile.username.as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn authenticate_exchanges_code_and_verifies() {
        let (strategy, calls) = strategy(&options(&["user"]),
                                         vec![(PROFILE_URL, Reply::Body(PROFILE_BODY))]);

        let (tokens, user) = strategy.authenticate("abc").await.unwrap();
        assert_eq!(tokens.access_token, "token-for-abc");
        assert_eq!(user, "test");

        let calls = calls.lock().unwrap();
        assert_eq!(*calls,
                   vec![(PROFILE_URL.to_string(), "token-for-abc".to_string())]);
    }

    #[tokio::test]
    async fn authenticate_surfaces_profile_errors() {
        let (strategy, _) = strategy(&options(&["user"]),
                                     vec![(PROFILE_URL, Reply::Status(401, "unauthorized"))]);

        match strategy.authenticate("abc").await {
            Err(Error::UpstreamTransport { .. }) => (),
            other => panic!("expected UpstreamTransport, got {:?}", other.map(|(t, _)| t)),
        }
    }
}

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


use serde_json::Value;
use url::Url;

use crate::{error::{Error,
                    Result},
            PROVIDER};

/// Base that profile paths returned by Coding.net are relative to.
pub const PROFILE_BASE_URL: &str = "https://coding.net";

/// Normalized Coding.net identity handed to the verify callback.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Always `coding`.
    pub provider:    String,
    /// Passed through exactly as Coding.net returned it.
    pub id:          Value,
    pub username:    Option<String>,
    pub avatar:      Option<String>,
    pub profile_url: String,
    /// Only set when the `user:email` scope was requested. Holds the email
    /// response's `data` as sent, `null` included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email:       Option<Value>,
    /// Body of the `current_user` response, verbatim.
    #[serde(rename = "_raw")]
    pub raw:         String,
    /// The `data` object of the `current_user` response.
    #[serde(rename = "_json")]
    pub json:        Value,
}

/// Fields read from a `current_user` payload. Only `path` is required, since
/// the profile url cannot be built without it.
#[derive(Deserialize)]
struct User {
    #[serde(default)]
    id:     Value,
    #[serde(default)]
    name:   Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    path:   String,
}

impl Profile {
    /// Builds a profile from the `data` object of a `current_user` response.
    pub fn from_user_data(raw: &str, data: Value) -> Result<Self> {
        let user = serde_json::from_value::<User>(data.clone()).map_err(Error::ProfileParse)?;
        let profile_url = Url::parse(PROFILE_BASE_URL)?.join(&user.path)?;

        Ok(Profile { provider:    PROVIDER.to_string(),
                     id:          user.id,
                     username:    user.name,
                     avatar:      user.avatar,
                     profile_url: profile_url.to_string(),
                     email:       None,
                     raw:         raw.to_string(),
                     json:        data, })
    }
}

/// The `{ code, data, msg }` wrapper around every Coding.net API response.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    code: Value,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    msg:  Value,
}

/// Returns the `data` payload of a response body, or the provider's error
/// when `code` is anything but the number `0`. `parse_err` picks the error
/// kind for bodies that are not a JSON object.
pub fn unwrap_envelope(body: &str, parse_err: fn(serde_json::Error) -> Error) -> Result<Value> {
    let envelope = serde_json::from_str::<Envelope>(body).map_err(parse_err)?;
    if envelope.code.as_f64() != Some(0.0) {
        return Err(Error::ProviderApplication(join_messages(&envelope.msg)));
    }
    Ok(envelope.data)
}

/// Joins every entry of an envelope's `msg` object with single spaces, in the
/// order the provider sent them.
pub fn join_messages(msg: &Value) -> String {
    match *msg {
        Value::Object(ref entries) => {
            entries.values()
                   .map(|value| {
                       match *value {
                           Value::String(ref s) => s.clone(),
                           ref other => other.to_string(),
                       }
                   })
                   .collect::<Vec<_>>()
                   .join(" ")
        }
        Value::String(ref s) => s.clone(),
        _ => String::new(),
    }
}

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


use std::{error,
          fmt};

use oauth_client::error::Error as OAuth2Error;

#[derive(Debug)]
pub enum Error {
    Config(String),
    EmailParse(serde_json::Error),
    MissingCredential(&'static str),
    OAuth2(OAuth2Error),
    ProfileParse(serde_json::Error),
    ProfileUrl(url::ParseError),
    /// The provider answered but reported a non-zero `code`.
    ProviderApplication(String),
    /// The provider could not be reached, or answered with a non-2xx status.
    UpstreamTransport {
        message: &'static str,
        source:  OAuth2Error,
    },
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match *self {
            Error::Config(ref e) => format!("Failed to load strategy options, {}", e),
            Error::EmailParse(ref e) => format!("failed to parse email, {}", e),
            Error::MissingCredential(field) => format!("Missing required option {}", field),
            Error::OAuth2(ref e) => format!("{}", e),
            Error::ProfileParse(ref e) => format!("failed to parse user profile, {}", e),
            Error::ProfileUrl(ref e) => format!("failed to resolve profile url, {}", e),
            Error::ProviderApplication(ref e) => e.to_string(),
            Error::UpstreamTransport { message, ref source } => format!("{}, {}", message, source),
        };
        write!(f, "{}", msg)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::EmailParse(ref e) => Some(e),
            Error::OAuth2(ref e) => Some(e),
            Error::ProfileParse(ref e) => Some(e),
            Error::ProfileUrl(ref e) => Some(e),
            Error::UpstreamTransport { ref source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<OAuth2Error> for Error {
    fn from(err: OAuth2Error) -> Error { Error::OAuth2(err) }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error { Error::ProfileUrl(err) }
}

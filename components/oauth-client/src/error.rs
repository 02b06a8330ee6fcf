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

#[derive(Debug)]
pub enum Error {
    HttpClient(reqwest::Error),
    HttpResponse(reqwest::StatusCode, String),
    InvalidHeader(String),
    InvalidUrl(url::ParseError),
    Serialization(serde_json::Error),
    Verify(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match *self {
            Error::HttpClient(ref e) => format!("{}", e),
            Error::HttpResponse(ref code, ref response) => {
                format!("Received a non-200 response, status={}, response={}",
                        code, response)
            }
            Error::InvalidHeader(ref e) => format!("Invalid request header, {}", e),
            Error::InvalidUrl(ref e) => format!("Invalid endpoint url, {}", e),
            Error::Serialization(ref e) => format!("{}", e),
            Error::Verify(ref e) => format!("Verification failed, {}", e),
        };
        write!(f, "{}", msg)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::HttpClient(ref e) => Some(e),
            Error::InvalidUrl(ref e) => Some(e),
            Error::Serialization(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error { Error::HttpClient(err) }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error { Error::Serialization(err) }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error { Error::InvalidUrl(err) }
}

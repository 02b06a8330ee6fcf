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

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod types;

pub use crate::{client::OAuth2Client,
                config::OAuth2Cfg,
                error::{Error,
                        Result},
                http_client::HttpClient,
                types::{OAuth2Tokens,
                        Transport,
                        UserProfile,
                        Verify}};

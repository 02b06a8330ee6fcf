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


//! Coding.net authentication strategy.
//!
//! Configures the shared OAuth2 client for Coding.net and turns the
//! provider's `current_user` and `account/email` responses into a normalized
//! [`Profile`].

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod error;
pub mod profile;
pub mod strategy;

pub use crate::{config::{StrategyCfg,
                         StrategyOptions},
                error::{Error,
                        Result},
                profile::Profile,
                strategy::CodingStrategy};

/// Provider literal carried by every profile.
pub const PROVIDER: &str = "coding";

// Copyright 2026 Daniel Pelikan
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

//! Send an access token to a paired Bluetooth serial peripheral.
//!
//! The [`coordinator::Coordinator`] owns the connection lifecycle and talks
//! to the peripheral through a [`bluetooth::Transport`]. A per-install
//! identifier from [`identity::IdentityStore`] travels with every token.

pub mod bluetooth;
pub mod config;
pub mod console;
pub mod coordinator;
pub mod identity;
pub mod notice;
pub mod state;
pub mod storage;

pub use coordinator::{Coordinator, CoordinatorError};
pub use state::{ConnectionStatus, Snapshot};

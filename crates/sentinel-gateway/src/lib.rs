// SPDX-FileCopyrightText: 2026 SentinelCloud Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the SentinelCloud credential service.
//!
//! Serves the vault (encrypt, decrypt, status) and the access gate
//! (register, login, token introspection) over a JSON API, plus a host
//! health report. Vault and identity routes sit behind bearer-token
//! middleware backed by the gate.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ApiJson, ErrorResponse};
pub use server::{router, start_server, AppState, HealthState};

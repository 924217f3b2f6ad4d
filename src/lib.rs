// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // collaborator implementations
pub mod config;        // config + registry + runtime wiring
pub mod engine;        // router, transactions, workers, adaptor
pub mod errors;        // error handling
pub mod message;       // unit-of-work envelope
pub mod observability;
pub mod routing;       // kind hierarchy + topology
pub mod traits;        // capability traits

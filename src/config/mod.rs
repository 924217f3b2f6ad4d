// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod registry;
mod runtime;
mod validation;

pub mod consts;

pub use loader::{
    load_and_validate_config, load_config, parse_toml, parse_yaml, Config, ErrorKindConfig,
    ErrorRouteConfig, NodeConfig, NodeRoleConfig, ProducerConfig, RouteConfig, RunConfig,
};
pub use registry::build_registry;
pub use runtime::RuntimeBuilder;
pub use validation::{build_kind_hierarchy, build_topology, validate_config};

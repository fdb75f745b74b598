// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration, errors and the pipeline traits shared by every stage.

/// The `config` module provides configuration handling
pub mod config;

/// The `error` module provides error handling
pub mod error;

/// The `traits` module provides the pipeline traits
pub mod traits;

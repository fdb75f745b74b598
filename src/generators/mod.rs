// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Output Generators Module
//!
//! Writers for rendered pages. Each generator implements
//! [`Generator`](crate::core::traits::Generator).
//!
//! ## Available Generators
//!
//! - [`html`]: writes HTML files, optionally minified

/// HTML file output.
pub mod html;

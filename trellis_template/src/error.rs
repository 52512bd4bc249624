// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;
use trellis_layout::{NodeId, TreeError};

/// Failure to build or splice a template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    /// No template is registered under the placeholder's name.
    #[error("no template named `{name}` (placeholder {placeholder:?})")]
    Missing {
        /// The name looked up.
        name: String,
        /// The placeholder that asked for it.
        placeholder: NodeId,
    },
    /// Templates kept producing placeholders past the depth limit.
    #[error("template `{name}` is nested deeper than {max_depth} levels")]
    Recursion {
        /// The first name found at the limit.
        name: String,
        /// The configured limit.
        max_depth: usize,
    },
    /// A tree operation failed while building or splicing.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

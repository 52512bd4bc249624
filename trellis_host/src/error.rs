// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;
use trellis_binding::BindError;
use trellis_layout::TreeError;
use trellis_template::TemplateError;

use crate::loader::LoadError;

/// Why a [`Host`](crate::Host) load failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The loader failed.
    #[error("load failed: {0}")]
    Load(#[from] LoadError),
    /// A declared binding could not be set up.
    #[error("binding failed: {0}")]
    Bind(#[from] BindError),
    /// Template inflation failed.
    #[error("template failed: {0}")]
    Template(#[from] TemplateError),
    /// A tree edit failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

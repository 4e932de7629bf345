// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

use super::OberonDriver;
use crate::backend::hash::HashState;
use crate::driver::HashDriver;
use crate::operation::HashContext;
use psa_common::{Algorithm, PsaResult};

/// Oberon hash operation
#[derive(Clone)]
pub struct OberonHash {
    pub(crate) state: HashState,
}

impl HashDriver for OberonDriver {
    fn hash_setup(&self, alg: Algorithm) -> PsaResult<HashContext> {
        Ok(HashContext::Oberon(OberonHash {
            state: HashState::new(alg)?,
        }))
    }
}

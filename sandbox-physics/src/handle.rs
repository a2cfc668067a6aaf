// Copyright 2025 John Brosnihan
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
//! Generational handles
//!
//! Bodies and forces are owned by the [`Scene`](crate::scene::Scene) and
//! referred to by lightweight handles. Each handle carries a generation so a
//! handle to a removed object never aliases whatever reuses its slot.

use std::fmt;

/// Raw slot index paired with the generation it was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Index {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl Index {
    pub(crate) fn new(slot: u32, generation: u32) -> Self {
        Index { slot, generation }
    }
}

/// Handle to a body owned by a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) Index);

impl BodyHandle {
    /// Slot number of this body
    pub fn slot(&self) -> u32 {
        self.0.slot
    }

    /// Generation of the slot when this handle was issued
    pub fn generation(&self) -> u32 {
        self.0.generation
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({}, gen: {})", self.0.slot, self.0.generation)
    }
}

/// Handle to a force generator registered with a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForceHandle(pub(crate) Index);

impl ForceHandle {
    /// Slot number of this force
    pub fn slot(&self) -> u32 {
        self.0.slot
    }

    /// Generation of the slot when this handle was issued
    pub fn generation(&self) -> u32 {
        self.0.generation
    }
}

impl fmt::Display for ForceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Force({}, gen: {})", self.0.slot, self.0.generation)
    }
}

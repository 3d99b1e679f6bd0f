// Copyright (C) 2025 The Android Open Source Project
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

//! # Device Policy Cache
//!
//! This crate holds the latest device policy facts pushed by the device policy
//! manager (screen capture restrictions, password quality, permission and
//! content protection policies, launcher shortcut overrides and the sensors
//! permission grant flag) and serves them to concurrent readers.
//!
//! The cache is an explicitly constructed object. Create one per process,
//! usually through `DevicePolicyEngine`, and hand the `Arc` to every component
//! that reads policy.

/// Defines policy value types and the read and write traits.
pub mod common;
/// Implements the lock-guarded policy cache.
pub mod cache;
/// Indentation-aware text sink used for dumps.
pub mod dump;
/// Provides the main public-facing API for the policy authority.
pub mod policy_engine;
/// Applies queued policy updates to the cache on a background task.
pub mod updater;

pub use cache::{DevicePolicyCacheImpl, EmptyDevicePolicyCache};
pub use common::{
    ContentProtectionPolicy, DevicePolicyCache, PasswordQuality, PermissionPolicy, PolicyControl,
    UserId,
};
pub use policy_engine::DevicePolicyEngine;
pub use updater::{CacheUpdater, PolicyUpdate};

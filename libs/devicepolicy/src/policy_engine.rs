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

//! # Policy Engine
//!
//! This module provides the main public-facing API for the policy authority.
//!
//! The `DevicePolicyEngine` struct owns the process's `DevicePolicyCacheImpl`.
//! Its `PolicyControl` setters write to the cache before returning, so a reader
//! calling after a setter returns sees the update. Readers get the cache
//! through `DevicePolicyEngine::cache`. Batches produced off-thread can be
//! queued with `try_push` and are applied by a `CacheUpdater` task.

use crate::cache::DevicePolicyCacheImpl;
use crate::common::{
    ContentProtectionPolicy, PasswordQuality, PermissionPolicy, PolicyControl, UserId,
};
use crate::updater::{CacheUpdater, PolicyUpdate, DEFAULT_QUEUE_SIZE};
use anyhow::{anyhow, Context, Result};
use log::error;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// The main engine that owns the cache and the task draining queued updates.
///
/// Must not be created, flushed or dropped from inside an async context.
pub struct DevicePolicyEngine {
    cache: Arc<DevicePolicyCacheImpl>,
    /// Taken on drop and shut down while the runtime is still alive.
    updater: Option<CacheUpdater>,
    /// The Tokio runtime for the CacheUpdater's task.
    runtime: Runtime,
}

impl DevicePolicyEngine {
    /// Create a new DevicePolicyEngine with an empty cache.
    pub fn new() -> Result<Self> {
        Self::with_queue_size(DEFAULT_QUEUE_SIZE)
    }

    /// Same as ::new() with a custom queue size for `try_push`.
    pub fn with_queue_size(queue_size: usize) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("devicepolicy-updater")
            .enable_all()
            .build()
            .context("Failed to create Tokio runtime for DevicePolicyEngine")?;
        let cache = Arc::new(DevicePolicyCacheImpl::new());
        let updater = {
            let _guard = runtime.enter();
            CacheUpdater::with_queue_size(cache.clone(), queue_size)
        };

        Ok(Self { cache, updater: Some(updater), runtime })
    }

    /// Returns the shared cache handle to pass to policy readers.
    pub fn cache(&self) -> Arc<DevicePolicyCacheImpl> {
        self.cache.clone()
    }

    fn updater(&self) -> Result<&CacheUpdater> {
        self.updater.as_ref().ok_or_else(|| anyhow!("CacheUpdater already shut down"))
    }

    /// Queues `update` for the background task.
    ///
    /// Fails if the queue is full; the update is then not applied. Queued
    /// updates become visible after `flush`.
    pub fn try_push(&self, update: PolicyUpdate) -> Result<()> {
        self.updater()?.try_push(update)
    }

    /// Blocks until every update queued so far is visible in the cache.
    pub fn flush(&self) -> Result<()> {
        self.runtime.block_on(self.updater()?.sync())
    }
}

impl PolicyControl for DevicePolicyEngine {
    fn set_screen_capture_disallowed_user(&self, user: UserId) {
        self.cache.set_screen_capture_disallowed_user(user);
    }

    fn set_screen_capture_disallowed(&self, user: UserId, disallowed: bool) {
        self.cache.set_screen_capture_disallowed(user, disallowed);
    }

    fn set_password_quality(&self, user: UserId, quality: PasswordQuality) {
        self.cache.set_password_quality(user, quality);
    }

    fn set_permission_policy(&self, user: UserId, policy: PermissionPolicy) {
        self.cache.set_permission_policy(user, policy);
    }

    fn set_content_protection_policy(&self, user: UserId, policy: Option<ContentProtectionPolicy>) {
        self.cache.set_content_protection_policy(user, policy);
    }

    fn set_admin_can_grant_sensors_permissions(&self, can_grant: bool) {
        self.cache.set_admin_can_grant_sensors_permissions(can_grant);
    }

    fn set_launcher_shortcut_overrides(&self, overrides: &BTreeMap<String, String>) {
        self.cache.set_launcher_shortcut_overrides(overrides);
    }

    fn on_user_removed(&self, user: UserId) {
        self.cache.on_user_removed(user);
    }
}

impl Drop for DevicePolicyEngine {
    fn drop(&mut self) {
        if let Some(updater) = self.updater.take() {
            if let Err(e) = self.runtime.block_on(updater.shutdown()) {
                error!("Failed to shut down CacheUpdater: {:#}", e);
            }
        }
    }
}

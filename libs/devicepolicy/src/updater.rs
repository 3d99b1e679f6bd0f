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

use crate::cache::DevicePolicyCacheImpl;
use crate::common::{
    ContentProtectionPolicy, PasswordQuality, PermissionPolicy, PolicyControl, UserId,
};
use anyhow::{anyhow, bail, Context, Result};
use log::info;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Default message queue size.
pub const DEFAULT_QUEUE_SIZE: usize = 64;

/// A single change pushed by the policy authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyUpdate {
    ScreenCaptureDisallowedUser(UserId),
    ScreenCaptureDisallowed { user: UserId, disallowed: bool },
    PasswordQuality { user: UserId, quality: PasswordQuality },
    PermissionPolicy { user: UserId, policy: PermissionPolicy },
    ContentProtectionPolicy { user: UserId, policy: Option<ContentProtectionPolicy> },
    AdminCanGrantSensorsPermissions(bool),
    LauncherShortcutOverrides(BTreeMap<String, String>),
    UserRemoved(UserId),
}

impl PolicyUpdate {
    /// Applies this update to `cache`.
    pub fn apply_to(self, cache: &DevicePolicyCacheImpl) {
        match self {
            PolicyUpdate::ScreenCaptureDisallowedUser(user) => {
                cache.set_screen_capture_disallowed_user(user)
            }
            PolicyUpdate::ScreenCaptureDisallowed { user, disallowed } => {
                cache.set_screen_capture_disallowed(user, disallowed)
            }
            PolicyUpdate::PasswordQuality { user, quality } => {
                cache.set_password_quality(user, quality)
            }
            PolicyUpdate::PermissionPolicy { user, policy } => {
                cache.set_permission_policy(user, policy)
            }
            PolicyUpdate::ContentProtectionPolicy { user, policy } => {
                cache.set_content_protection_policy(user, policy)
            }
            PolicyUpdate::AdminCanGrantSensorsPermissions(can_grant) => {
                cache.set_admin_can_grant_sensors_permissions(can_grant)
            }
            PolicyUpdate::LauncherShortcutOverrides(overrides) => {
                cache.set_launcher_shortcut_overrides(&overrides)
            }
            PolicyUpdate::UserRemoved(user) => cache.on_user_removed(user),
        }
    }
}

/// Event sent from CacheUpdater to CacheUpdaterTask.
#[derive(Debug)]
enum UpdaterEvent {
    Update(PolicyUpdate),
    Sync(oneshot::Sender<()>),
    Shutdown,
}

/// Internal task that applies queued updates to the cache in order.
struct CacheUpdaterTask {
    cache: Arc<DevicePolicyCacheImpl>,
    event_receiver: mpsc::Receiver<UpdaterEvent>,
}

impl CacheUpdaterTask {
    /// Handles a received event. Returns true if the task should continue running.
    fn handle_event(&mut self, event: UpdaterEvent) -> bool {
        match event {
            UpdaterEvent::Update(update) => update.apply_to(&self.cache),
            UpdaterEvent::Sync(done) => {
                // The waiter may have given up; nothing to do then.
                let _ = done.send(());
            }
            UpdaterEvent::Shutdown => return false,
        }
        true
    }

    /// Runs the event loop.
    async fn run(mut self) {
        info!("CacheUpdaterTask started.");
        while let Some(event) = self.event_receiver.recv().await {
            if !self.handle_event(event) {
                info!("Shutdown event received.");
                return;
            }
        }
        info!("Event channel closed. Shutting down.");
    }
}

/// Queues policy updates for a background task that applies them to the cache.
///
/// Queued updates are applied later and in queue order. Writers that need
/// read-after-write visibility call `PolicyControl` on the cache directly.
/// Dropping the updater closes the queue; the task applies what is left and exits.
///
/// Must be created inside a Tokio runtime.
pub struct CacheUpdater {
    event_sender: mpsc::Sender<UpdaterEvent>,
    task_handle: JoinHandle<()>,
}

impl CacheUpdater {
    /// Creates a new CacheUpdater feeding `cache`.
    pub fn new(cache: Arc<DevicePolicyCacheImpl>) -> Self {
        Self::with_queue_size(cache, DEFAULT_QUEUE_SIZE)
    }

    /// Creates a new CacheUpdater whose queue holds at most `queue_size` pending events.
    pub fn with_queue_size(cache: Arc<DevicePolicyCacheImpl>, queue_size: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_size.max(1));
        let task = CacheUpdaterTask { cache, event_receiver: rx };
        let task_handle = tokio::spawn(task.run());

        Self { event_sender: tx, task_handle }
    }

    /// Queues `update`. Fails if the queue is full or the task has stopped.
    ///
    /// A rejected update is not applied; the caller decides whether to retry.
    pub fn try_push(&self, update: PolicyUpdate) -> Result<()> {
        match self.event_sender.try_send(UpdaterEvent::Update(update)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => bail!("Event channel full"),
            Err(mpsc::error::TrySendError::Closed(_)) => bail!("Event channel closed"),
        }
    }

    /// Waits until every update queued before this call has been applied.
    pub async fn sync(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.event_sender
            .send(UpdaterEvent::Sync(tx))
            .await
            .map_err(|_| anyhow!("Event channel closed"))?;
        rx.await.map_err(|_| anyhow!("CacheUpdaterTask stopped before sync"))
    }

    /// Applies everything already queued, then stops the task and waits for it to exit.
    pub async fn shutdown(self) -> Result<()> {
        let Self { event_sender, task_handle } = self;
        if event_sender.send(UpdaterEvent::Shutdown).await.is_err() {
            info!("CacheUpdaterTask already stopped.");
        }
        task_handle.await.context("CacheUpdaterTask did not exit cleanly")
    }
}

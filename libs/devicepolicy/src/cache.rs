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

//! # Policy Cache
//!
//! `DevicePolicyCacheImpl` is the store the policy authority pushes into.
//! A single reader/writer lock guards every field except the sensors grant
//! flag, which is an independent atomic and is not kept consistent with the
//! locked fields.

use crate::common::{
    ContentProtectionPolicy, DevicePolicyCache, PasswordQuality, PermissionPolicy, PolicyControl,
    UserId,
};
use crate::dump::{IndentingWriter, MapDisplay, SetDisplay};
use log::{debug, trace};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Fields guarded by `DevicePolicyCacheImpl::state`.
struct CacheState {
    /// Legacy screen capture user. `UserId::NULL`, `UserId::ALL` or a concrete user.
    screen_capture_disallowed_user: UserId,
    /// Users on which screen capture is disallowed. `UserId::ALL` covers everyone.
    screen_capture_disallowed_users: BTreeSet<UserId>,
    password_quality: BTreeMap<UserId, PasswordQuality>,
    permission_policy: BTreeMap<UserId, PermissionPolicy>,
    content_protection_policy: BTreeMap<UserId, ContentProtectionPolicy>,
    launcher_shortcut_overrides: BTreeMap<String, String>,
}

impl Default for CacheState {
    fn default() -> Self {
        Self {
            screen_capture_disallowed_user: UserId::NULL,
            screen_capture_disallowed_users: BTreeSet::new(),
            password_quality: BTreeMap::new(),
            permission_policy: BTreeMap::new(),
            content_protection_policy: BTreeMap::new(),
            launcher_shortcut_overrides: BTreeMap::new(),
        }
    }
}

/// Thread-safe cache of the device policy facts pushed by the policy authority.
#[derive(Default)]
pub struct DevicePolicyCacheImpl {
    state: RwLock<CacheState>,
    /// Maps to the admin's "can grant sensors permissions" flag.
    can_grant_sensors_permissions: AtomicBool,
}

impl DevicePolicyCacheImpl {
    /// Creates an empty cache where every lookup returns its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the legacy single user on which screen capture is disallowed.
    ///
    /// This field is independent of the set consulted by
    /// `is_screen_capture_allowed`.
    pub fn screen_capture_disallowed_user(&self) -> UserId {
        self.state.read().screen_capture_disallowed_user
    }

    /// Renders every field under a single read lock.
    pub fn dump_into<W: Write>(&self, pw: &mut IndentingWriter<W>) -> fmt::Result {
        let state = self.state.read();
        pw.println("Device policy cache:")?;
        pw.increase_indent();
        writeln!(
            pw,
            "Screen capture disallowed users: {}",
            SetDisplay(&state.screen_capture_disallowed_users)
        )?;
        writeln!(pw, "Password quality: {}", MapDisplay(&state.password_quality))?;
        writeln!(pw, "Permission policy: {}", MapDisplay(&state.permission_policy))?;
        writeln!(
            pw,
            "Content protection policy: {}",
            MapDisplay(&state.content_protection_policy)
        )?;
        writeln!(
            pw,
            "Admin can grant sensors permission: {}",
            self.can_grant_sensors_permissions.load(Ordering::Acquire)
        )?;
        writeln!(pw, "Shortcuts overrides: {}", MapDisplay(&state.launcher_shortcut_overrides))?;
        pw.decrease_indent();
        Ok(())
    }

    /// Returns the dump as a string.
    pub fn dump(&self) -> String {
        let mut pw = IndentingWriter::new(String::new());
        // Writing into a String cannot fail.
        let _ = self.dump_into(&mut pw);
        pw.into_inner()
    }
}

impl DevicePolicyCache for DevicePolicyCacheImpl {
    fn is_screen_capture_allowed(&self, user: UserId) -> bool {
        // Only correct while "strictest applies" is the resolution mechanism.
        let state = self.state.read();
        !state.screen_capture_disallowed_users.contains(&user)
            && !state.screen_capture_disallowed_users.contains(&UserId::ALL)
    }

    fn password_quality(&self, user: UserId) -> PasswordQuality {
        self.state.read().password_quality.get(&user).copied().unwrap_or_default()
    }

    fn permission_policy(&self, user: UserId) -> PermissionPolicy {
        self.state.read().permission_policy.get(&user).copied().unwrap_or_default()
    }

    fn content_protection_policy(&self, user: UserId) -> ContentProtectionPolicy {
        self.state.read().content_protection_policy.get(&user).copied().unwrap_or_default()
    }

    fn can_admin_grant_sensors_permissions(&self) -> bool {
        self.can_grant_sensors_permissions.load(Ordering::Acquire)
    }

    fn launcher_shortcut_overrides(&self) -> BTreeMap<String, String> {
        self.state.read().launcher_shortcut_overrides.clone()
    }
}

impl PolicyControl for DevicePolicyCacheImpl {
    fn set_screen_capture_disallowed_user(&self, user: UserId) {
        trace!("set_screen_capture_disallowed_user {}", user);
        self.state.write().screen_capture_disallowed_user = user;
    }

    fn set_screen_capture_disallowed(&self, user: UserId, disallowed: bool) {
        trace!("set_screen_capture_disallowed {} = {}", user, disallowed);
        let mut state = self.state.write();
        if disallowed {
            state.screen_capture_disallowed_users.insert(user);
        } else {
            state.screen_capture_disallowed_users.remove(&user);
        }
    }

    fn set_password_quality(&self, user: UserId, quality: PasswordQuality) {
        trace!("set_password_quality {} = {}", user, quality);
        self.state.write().password_quality.insert(user, quality);
    }

    fn set_permission_policy(&self, user: UserId, policy: PermissionPolicy) {
        trace!("set_permission_policy {} = {}", user, policy);
        self.state.write().permission_policy.insert(user, policy);
    }

    fn set_content_protection_policy(&self, user: UserId, policy: Option<ContentProtectionPolicy>) {
        trace!("set_content_protection_policy {} = {:?}", user, policy);
        let mut state = self.state.write();
        match policy {
            Some(policy) => {
                state.content_protection_policy.insert(user, policy);
            }
            None => {
                state.content_protection_policy.remove(&user);
            }
        }
    }

    fn set_admin_can_grant_sensors_permissions(&self, can_grant: bool) {
        trace!("set_admin_can_grant_sensors_permissions {}", can_grant);
        self.can_grant_sensors_permissions.store(can_grant, Ordering::Release);
    }

    fn set_launcher_shortcut_overrides(&self, overrides: &BTreeMap<String, String>) {
        debug!("Replacing {} launcher shortcut overrides", overrides.len());
        let overrides = overrides.clone();
        self.state.write().launcher_shortcut_overrides = overrides;
    }

    fn on_user_removed(&self, user: UserId) {
        debug!("Purging cached policies of removed user {}", user);
        let mut state = self.state.write();
        state.password_quality.remove(&user);
        state.permission_policy.remove(&user);
        state.content_protection_policy.remove(&user);
    }
}

/// Cache used when no policy authority is running. Every lookup returns its default.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyDevicePolicyCache;

impl DevicePolicyCache for EmptyDevicePolicyCache {
    fn is_screen_capture_allowed(&self, _user: UserId) -> bool {
        true
    }

    fn password_quality(&self, _user: UserId) -> PasswordQuality {
        PasswordQuality::UNSPECIFIED
    }

    fn permission_policy(&self, _user: UserId) -> PermissionPolicy {
        PermissionPolicy::PROMPT
    }

    fn content_protection_policy(&self, _user: UserId) -> ContentProtectionPolicy {
        ContentProtectionPolicy::DISABLED
    }

    fn can_admin_grant_sensors_permissions(&self) -> bool {
        false
    }

    fn launcher_shortcut_overrides(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

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

//! # Common
//!
//! This module contains the value types and traits shared across the crate.
//!
//! The values are owned by the device policy manager. The cache stores them
//! verbatim and only substitutes a default when nothing was stored, so every
//! type is a thin wrapper around the raw integer and accepts unknown values.

use std::collections::BTreeMap;
use std::fmt;

/// Declares an `i32` newtype with `Display` and raw conversions.
macro_rules! raw_i32_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub i32);

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

raw_i32_type!(
    /// Identifier of an OS user profile.
    UserId
);

impl UserId {
    /// Refers to every user on the device.
    pub const ALL: UserId = UserId(-1);
    /// Refers to the user currently in the foreground.
    pub const CURRENT: UserId = UserId(-2);
    /// Refers to no user at all.
    pub const NULL: UserId = UserId(-10000);
    /// The system user.
    pub const SYSTEM: UserId = UserId(0);
}

raw_i32_type!(
    /// Minimum password quality required for a user.
    PasswordQuality
);

impl PasswordQuality {
    /// No requirement.
    pub const UNSPECIFIED: PasswordQuality = PasswordQuality(0);
    /// Weak biometric such as face unlock.
    pub const BIOMETRIC_WEAK: PasswordQuality = PasswordQuality(0x8000);
    /// Some kind of password is required.
    pub const SOMETHING: PasswordQuality = PasswordQuality(0x10000);
    /// Numeric characters.
    pub const NUMERIC: PasswordQuality = PasswordQuality(0x20000);
    /// Numeric without repeating or ordered sequences.
    pub const NUMERIC_COMPLEX: PasswordQuality = PasswordQuality(0x30000);
    /// Alphabetic (or other symbol) characters.
    pub const ALPHABETIC: PasswordQuality = PasswordQuality(0x40000);
    /// Both numeric and alphabetic characters.
    pub const ALPHANUMERIC: PasswordQuality = PasswordQuality(0x50000);
    /// Complexity requirements set separately.
    pub const COMPLEX: PasswordQuality = PasswordQuality(0x60000);
    /// Managed by an external application.
    pub const MANAGED: PasswordQuality = PasswordQuality(0x80000);
}

impl Default for PasswordQuality {
    fn default() -> Self {
        Self::UNSPECIFIED
    }
}

raw_i32_type!(
    /// How runtime permission requests are answered for a user.
    PermissionPolicy
);

impl PermissionPolicy {
    /// Ask the user.
    pub const PROMPT: PermissionPolicy = PermissionPolicy(0);
    /// Grant without asking.
    pub const AUTO_GRANT: PermissionPolicy = PermissionPolicy(1);
    /// Deny without asking.
    pub const AUTO_DENY: PermissionPolicy = PermissionPolicy(2);
}

impl Default for PermissionPolicy {
    fn default() -> Self {
        Self::PROMPT
    }
}

raw_i32_type!(
    /// Content protection setting for a user.
    ContentProtectionPolicy
);

impl ContentProtectionPolicy {
    /// The admin does not control content protection.
    pub const NOT_CONTROLLED_BY_POLICY: ContentProtectionPolicy = ContentProtectionPolicy(0);
    /// Content protection is off.
    pub const DISABLED: ContentProtectionPolicy = ContentProtectionPolicy(1);
    /// Content protection is on.
    pub const ENABLED: ContentProtectionPolicy = ContentProtectionPolicy(2);
}

impl Default for ContentProtectionPolicy {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Read-only view of device policy handed to policy consumers.
///
/// Lookups never fail. A user without a stored value resolves to the type's
/// default.
pub trait DevicePolicyCache: Send + Sync {
    /// Returns false if screen capture is disallowed for `user` or for all users.
    fn is_screen_capture_allowed(&self, user: UserId) -> bool;

    /// Returns the password quality for `user`.
    fn password_quality(&self, user: UserId) -> PasswordQuality;

    /// Returns the permission policy for `user`.
    fn permission_policy(&self, user: UserId) -> PermissionPolicy;

    /// Returns the content protection policy for `user`.
    fn content_protection_policy(&self, user: UserId) -> ContentProtectionPolicy;

    /// Returns whether an admin may grant sensors-related permissions.
    fn can_admin_grant_sensors_permissions(&self) -> bool;

    /// Returns a copy of the launcher shortcut overrides.
    fn launcher_shortcut_overrides(&self) -> BTreeMap<String, String>;
}

/// The write-side API used by the policy authority.
///
/// Every call is applied to the cache before it returns, so a reader calling
/// afterwards observes it.
pub trait PolicyControl {
    /// Sets the legacy single user on which screen capture is disallowed.
    fn set_screen_capture_disallowed_user(&self, user: UserId);

    /// Adds `user` to, or removes it from, the screen capture disallowed set.
    fn set_screen_capture_disallowed(&self, user: UserId, disallowed: bool);

    /// Updates the password quality for `user`.
    fn set_password_quality(&self, user: UserId, quality: PasswordQuality);

    /// Updates the permission policy for `user`.
    fn set_permission_policy(&self, user: UserId, policy: PermissionPolicy);

    /// Updates the content protection policy for `user`. `None` clears it.
    fn set_content_protection_policy(&self, user: UserId, policy: Option<ContentProtectionPolicy>);

    /// Sets admin control over sensors permission grants.
    fn set_admin_can_grant_sensors_permissions(&self, can_grant: bool);

    /// Replaces the launcher shortcut overrides with a copy of `overrides`.
    fn set_launcher_shortcut_overrides(&self, overrides: &BTreeMap<String, String>);

    /// Drops every per-user value stored for `user`.
    fn on_user_removed(&self, user: UserId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_manager() {
        assert_eq!(PasswordQuality::default(), PasswordQuality::UNSPECIFIED);
        assert_eq!(PermissionPolicy::default(), PermissionPolicy::PROMPT);
        assert_eq!(ContentProtectionPolicy::default(), ContentProtectionPolicy::DISABLED);
    }

    #[test]
    fn raw_values_pass_through() {
        assert_eq!(i32::from(UserId::from(10)), 10);
        assert_eq!(PasswordQuality::from(0x1234), PasswordQuality(0x1234));
        assert_eq!(UserId::NULL.to_string(), "-10000");
        assert_eq!(PasswordQuality::NUMERIC.to_string(), "131072");
    }
}

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

#[cfg(test)]
mod updater_tests {
    use devicepolicy::{
        CacheUpdater, ContentProtectionPolicy, DevicePolicyCache, DevicePolicyCacheImpl,
        DevicePolicyEngine, PasswordQuality, PermissionPolicy, PolicyControl, PolicyUpdate, UserId,
    };
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::thread;

    const SMALL_QUEUE_SIZE: usize = 4;
    const BURST_SIZE: i32 = 200;

    #[tokio::test]
    async fn test_updates_visible_after_sync() {
        let _ = env_logger::try_init();
        let cache = Arc::new(DevicePolicyCacheImpl::new());
        let updater = CacheUpdater::new(cache.clone());
        let user = UserId(10);
        let overrides = BTreeMap::from([("com.a".to_string(), "com.b".to_string())]);

        let updates = [
            PolicyUpdate::PasswordQuality { user, quality: PasswordQuality::NUMERIC_COMPLEX },
            PolicyUpdate::PermissionPolicy { user, policy: PermissionPolicy::AUTO_GRANT },
            PolicyUpdate::ContentProtectionPolicy {
                user,
                policy: Some(ContentProtectionPolicy::ENABLED),
            },
            PolicyUpdate::ScreenCaptureDisallowed { user, disallowed: true },
            PolicyUpdate::ScreenCaptureDisallowedUser(user),
            PolicyUpdate::AdminCanGrantSensorsPermissions(true),
            PolicyUpdate::LauncherShortcutOverrides(overrides.clone()),
        ];
        for update in updates {
            updater.try_push(update).expect("queue has room");
        }
        updater.sync().await.expect("sync");

        assert_eq!(cache.password_quality(user), PasswordQuality::NUMERIC_COMPLEX);
        assert_eq!(cache.permission_policy(user), PermissionPolicy::AUTO_GRANT);
        assert_eq!(cache.content_protection_policy(user), ContentProtectionPolicy::ENABLED);
        assert!(!cache.is_screen_capture_allowed(user));
        assert_eq!(cache.screen_capture_disallowed_user(), user);
        assert!(cache.can_admin_grant_sensors_permissions());
        assert_eq!(cache.launcher_shortcut_overrides(), overrides);

        updater.try_push(PolicyUpdate::UserRemoved(user)).expect("queue has room");
        updater.sync().await.expect("sync");
        assert_eq!(cache.password_quality(user), PasswordQuality::UNSPECIFIED);
        assert_eq!(cache.permission_policy(user), PermissionPolicy::PROMPT);
        assert_eq!(cache.content_protection_policy(user), ContentProtectionPolicy::DISABLED);
    }

    #[tokio::test]
    async fn test_updates_applied_in_push_order() {
        let _ = env_logger::try_init();
        let cache = Arc::new(DevicePolicyCacheImpl::new());
        let updater = CacheUpdater::new(cache.clone());
        let user = UserId(4);

        let qualities =
            [PasswordQuality::SOMETHING, PasswordQuality::ALPHABETIC, PasswordQuality::MANAGED];
        for quality in qualities {
            updater
                .try_push(PolicyUpdate::PasswordQuality { user, quality })
                .expect("queue has room");
        }
        let enabled = Some(ContentProtectionPolicy::ENABLED);
        updater
            .try_push(PolicyUpdate::ContentProtectionPolicy { user, policy: enabled })
            .expect("queue has room");
        updater
            .try_push(PolicyUpdate::ContentProtectionPolicy { user, policy: None })
            .expect("queue has room");
        updater.sync().await.expect("sync");

        assert_eq!(cache.password_quality(user), PasswordQuality::MANAGED);
        assert_eq!(cache.content_protection_policy(user), ContentProtectionPolicy::DISABLED);
    }

    #[tokio::test]
    async fn test_shutdown_applies_queued_updates() {
        let _ = env_logger::try_init();
        let cache = Arc::new(DevicePolicyCacheImpl::new());
        let updater = CacheUpdater::new(cache.clone());

        updater
            .try_push(PolicyUpdate::AdminCanGrantSensorsPermissions(true))
            .expect("queue has room");
        updater.shutdown().await.expect("task exits cleanly");

        assert!(cache.can_admin_grant_sensors_permissions(), "Queued update lost on shutdown");
    }

    #[test]
    fn test_engine_setters_visible_before_return() {
        let _ = env_logger::try_init();
        let engine = DevicePolicyEngine::new().expect("Failed to create DevicePolicyEngine");
        let reader = engine.cache();

        let mut stale = 0;
        for id in 0..50 {
            engine.set_screen_capture_disallowed(UserId(id), true);
            if reader.is_screen_capture_allowed(UserId(id)) {
                stale += 1;
            }
        }
        assert_eq!(stale, 0, "Reads after a setter returned must see the update");

        engine.set_password_quality(UserId::SYSTEM, PasswordQuality::COMPLEX);
        let observed = thread::spawn(move || reader.password_quality(UserId::SYSTEM))
            .join()
            .expect("Reader thread panicked");
        assert_eq!(observed, PasswordQuality::COMPLEX);
    }

    #[test]
    fn test_engine_setter_burst_larger_than_queue() {
        let _ = env_logger::try_init();
        let engine = DevicePolicyEngine::with_queue_size(SMALL_QUEUE_SIZE)
            .expect("Failed to create DevicePolicyEngine");

        for id in 0..BURST_SIZE {
            engine.set_password_quality(UserId(id), PasswordQuality::COMPLEX);
        }

        let cache = engine.cache();
        let lost = (0..BURST_SIZE)
            .filter(|id| cache.password_quality(UserId(*id)) != PasswordQuality::COMPLEX)
            .count();
        assert_eq!(lost, 0, "Lost {} of {} writes", lost, BURST_SIZE);
    }

    #[test]
    fn test_engine_try_push_burst_reports_overflow() {
        let _ = env_logger::try_init();
        let engine = DevicePolicyEngine::with_queue_size(SMALL_QUEUE_SIZE)
            .expect("Failed to create DevicePolicyEngine");

        let accepted: Vec<i32> = (0..BURST_SIZE)
            .filter(|id| {
                let quality = PasswordQuality::MANAGED;
                engine
                    .try_push(PolicyUpdate::PasswordQuality { user: UserId(*id), quality })
                    .is_ok()
            })
            .collect();
        engine.flush().expect("flush");

        assert!(accepted.len() >= SMALL_QUEUE_SIZE, "Queue accepted only {}", accepted.len());
        let cache = engine.cache();
        for id in 0..BURST_SIZE {
            let expected = if accepted.contains(&id) {
                PasswordQuality::MANAGED
            } else {
                PasswordQuality::UNSPECIFIED
            };
            assert_eq!(cache.password_quality(UserId(id)), expected, "User {}", id);
        }
    }

    #[test]
    fn test_engine_flush_and_shared_cache() {
        let _ = env_logger::try_init();
        let engine = DevicePolicyEngine::new().expect("Failed to create DevicePolicyEngine");
        let reader = engine.cache();

        let disallow_all =
            PolicyUpdate::ScreenCaptureDisallowed { user: UserId::ALL, disallowed: true };
        engine.try_push(disallow_all).expect("queue has room");
        engine.flush().expect("flush");

        // Readers on other threads observe the flushed state through the same handle.
        let observed = thread::spawn(move || reader.is_screen_capture_allowed(UserId(99)))
            .join()
            .expect("Reader thread panicked");
        assert!(!observed);

        engine.set_screen_capture_disallowed(UserId::ALL, false);
        assert!(engine.cache().is_screen_capture_allowed(UserId(99)));
    }

    #[test]
    fn test_engine_drop_applies_queued_updates() {
        let _ = env_logger::try_init();
        let engine = DevicePolicyEngine::with_queue_size(SMALL_QUEUE_SIZE)
            .expect("Failed to create DevicePolicyEngine");
        let cache = engine.cache();
        engine
            .try_push(PolicyUpdate::AdminCanGrantSensorsPermissions(true))
            .expect("queue has room");

        // Drop joins the updater task, which drains the queue first.
        drop(engine);
        assert!(cache.can_admin_grant_sensors_permissions());
    }
}

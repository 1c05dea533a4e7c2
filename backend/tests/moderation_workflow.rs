use artisan_connect_backend::{
    repositories::AuditLogFilters,
    models::{
        artisan::{ArtisanStatus, VerificationMethod},
        review::ReviewStatus,
    },
    services::{audit_log::ClientMetadata, moderation::ModerationError},
};

mod support;

use support::{admin, artisan_user, buyer, make_artisan, make_review, test_config, MemoryStore};

fn meta() -> ClientMetadata {
    ClientMetadata {
        ip: Some("203.0.113.9".to_string()),
        user_agent: Some("moderation-test".to_string()),
        request_id: Some("req-moderation".to_string()),
    }
}

#[tokio::test]
async fn approving_a_pending_artisan_verifies_and_audits() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let pending = make_artisan(ArtisanStatus::Pending, "Plumber");
    store.insert_artisan(pending.clone());
    let admin = admin();

    let approved = state
        .moderation
        .approve_artisan(&admin, pending.id, VerificationMethod::PhoneCall, &meta())
        .await
        .expect("approve artisan");

    assert_eq!(approved.status, ArtisanStatus::Active);
    assert!(approved.is_verified);
    assert_eq!(approved.verification_method, Some(VerificationMethod::PhoneCall));
    assert_eq!(approved.verified_by, Some(admin.id));
    assert!(approved.verified_at.is_some());

    let logs = store.audit_logs();
    assert_eq!(logs.len(), 1);
    let log = &logs[0];
    assert_eq!(log.actor_id, admin.id);
    assert_eq!(log.action_type, "approve_artisan");
    assert_eq!(log.target_type.as_deref(), Some("artisan"));
    assert_eq!(log.target_id, Some(pending.id.to_string()));
    assert_eq!(log.detail_str("name"), Some(pending.business_name.as_str()));
    assert_eq!(log.detail_str("verification_method"), Some("phone_call"));
    assert_eq!(log.ip.as_deref(), Some("203.0.113.9"));
    assert_eq!(log.request_id.as_deref(), Some("req-moderation"));
}

#[tokio::test]
async fn rejecting_records_the_reason() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let pending = make_artisan(ArtisanStatus::Pending, "Tailor");
    store.insert_artisan(pending.clone());

    let rejected = state
        .moderation
        .reject_artisan(&admin(), pending.id, Some("Duplicate listing".into()), &meta())
        .await
        .expect("reject artisan");

    assert_eq!(rejected.status, ArtisanStatus::Suspended);
    assert!(!rejected.is_verified);
    let logs = store.audit_logs();
    assert_eq!(logs[0].action_type, "reject_artisan");
    assert_eq!(logs[0].detail_str("reason"), Some("Duplicate listing"));
}

#[tokio::test]
async fn approving_twice_conflicts_and_writes_one_audit_row() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let pending = make_artisan(ArtisanStatus::Pending, "Plumber");
    store.insert_artisan(pending.clone());
    let admin = admin();

    state
        .moderation
        .approve_artisan(&admin, pending.id, VerificationMethod::Nin, &meta())
        .await
        .expect("first approval");
    let second = state
        .moderation
        .approve_artisan(&admin, pending.id, VerificationMethod::Nin, &meta())
        .await;

    assert!(matches!(
        second,
        Err(ModerationError::InvalidTransition { .. })
    ));
    assert_eq!(store.audit_logs().len(), 1);
}

#[tokio::test]
async fn suspend_then_activate_round_trips_status() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let active = make_artisan(ArtisanStatus::Active, "Carpenter");
    store.insert_artisan(active.clone());
    let admin = admin();

    let suspended = state
        .moderation
        .suspend_artisan(&admin, active.id, Some("Customer complaints".into()), &meta())
        .await
        .expect("suspend");
    assert_eq!(suspended.status, ArtisanStatus::Suspended);

    let activated = state
        .moderation
        .activate_artisan(&admin, active.id, &meta())
        .await
        .expect("activate");
    assert_eq!(activated.status, ArtisanStatus::Active);

    let actions: Vec<String> = store
        .audit_logs()
        .into_iter()
        .map(|log| log.action_type)
        .collect();
    assert_eq!(actions.len(), 2);
    assert!(actions.contains(&"suspend_artisan".to_string()));
    assert!(actions.contains(&"activate_artisan".to_string()));
}

#[tokio::test]
async fn activating_an_active_artisan_is_rejected() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let active = make_artisan(ArtisanStatus::Active, "Carpenter");
    store.insert_artisan(active.clone());

    let result = state
        .moderation
        .activate_artisan(&admin(), active.id, &meta())
        .await;

    assert!(matches!(
        result,
        Err(ModerationError::InvalidTransition { .. })
    ));
    assert_eq!(store.artisan(active.id).expect("artisan").status, ArtisanStatus::Active);
    assert!(store.audit_logs().is_empty());
}

#[tokio::test]
async fn non_admins_cannot_moderate() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let pending = make_artisan(ArtisanStatus::Pending, "Plumber");
    store.insert_artisan(pending.clone());

    let result = state
        .moderation
        .approve_artisan(&buyer(), pending.id, VerificationMethod::Nin, &meta())
        .await;

    assert!(matches!(result, Err(ModerationError::Forbidden(_))));
    assert_eq!(
        store.artisan(pending.id).expect("artisan").status,
        ArtisanStatus::Pending
    );
    assert!(store.audit_logs().is_empty());
}

#[tokio::test]
async fn missing_artisan_is_not_found() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());

    let result = state
        .moderation
        .approve_artisan(
            &admin(),
            artisan_connect_backend::types::ArtisanId::new(),
            VerificationMethod::Nin,
            &meta(),
        )
        .await;

    assert!(matches!(result, Err(ModerationError::NotFound { .. })));
}

#[tokio::test]
async fn failed_update_leaves_status_and_audit_trail_untouched() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let pending = make_artisan(ArtisanStatus::Pending, "Plumber");
    store.insert_artisan(pending.clone());
    store.set_updates_failing(true);

    let result = state
        .moderation
        .approve_artisan(&admin(), pending.id, VerificationMethod::InPerson, &meta())
        .await;

    assert!(matches!(result, Err(ModerationError::Store(_))));
    let unchanged = store.artisan(pending.id).expect("artisan");
    assert_eq!(unchanged.status, ArtisanStatus::Pending);
    assert!(!unchanged.is_verified);
    assert!(store.audit_logs().is_empty());
}

#[tokio::test]
async fn owner_can_pause_and_resume_availability() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let owner = artisan_user();
    let mut artisan = make_artisan(ArtisanStatus::Active, "Electrician");
    artisan.user_id = owner.id;
    store.insert_artisan(artisan.clone());

    let paused = state
        .moderation
        .set_availability(&owner, artisan.id, false, &meta())
        .await
        .expect("pause");
    assert_eq!(paused.status, ArtisanStatus::Paused);

    let resumed = state
        .moderation
        .set_availability(&owner, artisan.id, true, &meta())
        .await
        .expect("resume");
    assert_eq!(resumed.status, ArtisanStatus::Active);

    let logs = store.audit_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|log| log.actor_id == owner.id));
}

#[tokio::test]
async fn availability_is_owner_only() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let artisan = make_artisan(ArtisanStatus::Active, "Electrician");
    store.insert_artisan(artisan.clone());

    let result = state
        .moderation
        .set_availability(&artisan_user(), artisan.id, false, &meta())
        .await;

    assert!(matches!(result, Err(ModerationError::Forbidden(_))));
    assert_eq!(
        store.artisan(artisan.id).expect("artisan").status,
        ArtisanStatus::Active
    );
}

#[tokio::test]
async fn review_moderation_is_one_way() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let artisan = make_artisan(ArtisanStatus::Active, "Plumber");
    store.insert_artisan(artisan.clone());
    let review = make_review(artisan.id, ReviewStatus::Pending, 4);
    store.insert_review(review.clone());
    let admin = admin();

    let approved = state
        .moderation
        .approve_review(&admin, review.id, &meta())
        .await
        .expect("approve review");
    assert_eq!(approved.status, ReviewStatus::Approved);
    assert_eq!(approved.moderated_by, Some(admin.id));

    let reject = state
        .moderation
        .reject_review(&admin, review.id, Some("Spam".into()), &meta())
        .await;
    assert!(matches!(
        reject,
        Err(ModerationError::InvalidTransition { .. })
    ));

    let logs = store.audit_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action_type, "approve_review");
    assert_eq!(logs[0].target_type.as_deref(), Some("review"));
    assert_eq!(logs[0].detail_str("name"), Some(artisan.business_name.as_str()));
    assert_eq!(logs[0].details.0["rating"], 4);
}

#[tokio::test]
async fn approval_is_findable_by_target() {
    let store = MemoryStore::new();
    let state = store.app_state(test_config());
    let pending = make_artisan(ArtisanStatus::Pending, "Plumber");
    let other = make_artisan(ArtisanStatus::Pending, "Tailor");
    store.insert_artisan(pending.clone());
    store.insert_artisan(other.clone());
    let admin = admin();

    for id in [pending.id, other.id] {
        state
            .moderation
            .approve_artisan(&admin, id, VerificationMethod::PhoneCall, &meta())
            .await
            .expect("approve artisan");
    }

    let filters = AuditLogFilters {
        target_id: Some(pending.id.to_string()),
        ..AuditLogFilters::default()
    };
    let page = state
        .audit
        .search_logs(&filters, None, None)
        .await
        .expect("search");

    assert_eq!(page.total_count, 1);
    assert_eq!(page.rows[0].action_type, "approve_artisan");
    assert_eq!(
        page.rows[0].detail_str("verification_method"),
        Some("phone_call")
    );
}

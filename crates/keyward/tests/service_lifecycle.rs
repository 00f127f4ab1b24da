//! End-to-end lifecycle flows through the public service surface.

use keyward::{
    Curve25519Engine, GenerateKeyOpts, KdfParams, KeyRefMap, KeyRefs, KeyService, ParsedKeys,
    ServiceError, UserId,
};

fn service() -> KeyService {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    KeyService::with_engine(Curve25519Engine::with_kdf_params(KdfParams::interactive()))
}

fn unlocked_opts() -> GenerateKeyOpts {
    GenerateKeyOpts {
        users: vec![UserId::with_name("Alice", "alice@example.org")],
        unlocked: true,
        ..GenerateKeyOpts::default()
    }
}

#[tokio::test]
async fn generate_sign_verify_round_trip() {
    let service = service();
    let key = service.generate_key("pw", unlocked_opts()).await.unwrap();

    let signed = service.sign(&key, "hello world").await.unwrap();
    let text = service.verify(&key, &signed).await.unwrap();
    assert_eq!(text, "hello world");
}

#[tokio::test]
async fn export_then_reimport_yields_one_proxy() {
    let service = service();
    let key = service.generate_key("pw", unlocked_opts()).await.unwrap();

    let armor = service.export_key(&key).await.unwrap();
    let parsed = service.keys_from_armor(&armor).await.unwrap();

    let ParsedKeys::One(reimported) = parsed else {
        panic!("one-key armor must yield a single proxy");
    };
    // Same key material, fresh handle.
    assert_ne!(reimported.handle(), key.handle());
    assert_eq!(
        reimported.blueprint().primary().unwrap().fingerprint,
        key.blueprint().primary().unwrap().fingerprint
    );

    // The reimported copy works like the original.
    let signed = service.sign(&reimported, "again").await.unwrap();
    assert_eq!(service.verify(&reimported, &signed).await.unwrap(), "again");
}

#[tokio::test]
async fn lock_consumes_the_old_handle_and_the_backup_recovers() {
    let service = service();
    let unlocked = service.generate_key("pw", unlocked_opts()).await.unwrap();
    let backup = service.export_key(&unlocked).await.unwrap();

    let locked = service.lock(&unlocked, "vault-pass").await.unwrap();
    assert!(locked.is_locked());

    // The consumed handle rejects everything, even read-only export.
    for result in [
        service.sign(&unlocked, "x").await,
        service.export_key(&unlocked).await,
    ] {
        assert!(matches!(result, Err(ServiceError::InvalidOrStaleReference)));
    }

    // The successor unseals under the new passphrase.
    let reopened = service.unlock(&locked, "vault-pass").await.unwrap();
    assert!(!reopened.is_locked());

    // And the armored backup restores the pre-lock state.
    let restored = service.keys_from_armor(&backup).await.unwrap();
    let restored = restored.single().unwrap();
    assert!(!restored.is_locked());
}

#[tokio::test]
async fn unlock_is_non_destructive() {
    let service = service();
    let locked = service
        .generate_key(
            "pw",
            GenerateKeyOpts {
                users: vec![UserId::new("bob@example.org")],
                ..GenerateKeyOpts::default()
            },
        )
        .await
        .unwrap();

    let unlocked = service.unlock(&locked, "pw").await.unwrap();

    // Both handles resolve; states differ.
    assert!(service.export_key(&locked).await.is_ok());
    assert!(service.export_key(&unlocked).await.is_ok());
    assert!(locked.is_locked());
    assert!(!unlocked.is_locked());
}

#[tokio::test]
async fn encrypt_decrypt_between_two_parties() {
    let service = service();
    let alice = service.generate_key("pw-a", unlocked_opts()).await.unwrap();
    let bob = service
        .generate_key(
            "pw-b",
            GenerateKeyOpts {
                users: vec![UserId::with_name("Bob", "bob@example.org")],
                unlocked: true,
                ..GenerateKeyOpts::default()
            },
        )
        .await
        .unwrap();

    // Alice signs and encrypts to Bob.
    let cipher = service
        .encrypt(KeyRefMap::new(&alice, &bob), "the plan")
        .await
        .unwrap();
    assert!(cipher.starts_with("-----BEGIN KEYWARD MESSAGE-----"));

    // Bob decrypts and verifies Alice's signature.
    let plain = service
        .decrypt(KeyRefMap::new(&alice, &bob), &cipher)
        .await
        .unwrap();
    assert_eq!(plain, "the plan");
}

#[tokio::test]
async fn encrypt_refuses_locked_signing_keys() {
    let service = service();
    let locked_signer = service
        .generate_key("pw", GenerateKeyOpts::default())
        .await
        .unwrap();
    let recipient = service.generate_key("pw", unlocked_opts()).await.unwrap();

    let result = service
        .encrypt(KeyRefMap::new(&locked_signer, &recipient), "secret")
        .await;
    assert!(matches!(result, Err(ServiceError::PrivateKeyNotUnlocked)));
}

#[tokio::test]
async fn empty_reference_batches_are_rejected() {
    let service = service();
    let result = service.verify(KeyRefs::default(), "some armor").await;
    assert!(matches!(result, Err(ServiceError::NoKeyReferences)));
}

#[tokio::test]
async fn stale_reference_in_a_batch_fails_the_whole_call() {
    let service = service();
    let valid = service.generate_key("pw", unlocked_opts()).await.unwrap();
    let signed = service.sign(&valid, "msg").await.unwrap();

    let mut refs = KeyRefs::from("stale-handle");
    refs.push(&valid);
    let result = service.verify(refs, &signed).await;
    assert!(matches!(result, Err(ServiceError::InvalidOrStaleReference)));
}

#[tokio::test]
async fn multi_key_armor_yields_proxies_in_parse_order() {
    use keyward_engine::armor::{ArmorKind, enarmor};
    use keyward_engine::{CryptoEngine, GenerateRequest};

    let engine = Curve25519Engine::with_kdf_params(KdfParams::interactive());
    let request = GenerateRequest {
        passphrase: "pw".into(),
        unlocked: true,
        ..GenerateRequest::default()
    };
    let first = engine.generate_key(&request).unwrap();
    let second = engine.generate_key(&request).unwrap();
    let payload = serde_json::to_vec(&vec![first.clone(), second.clone()]).unwrap();
    let block = enarmor(ArmorKind::PrivateKey, &payload);

    let service = service();
    let parsed = service.keys_from_armor(&block).await.unwrap();
    let ParsedKeys::Many(proxies) = parsed else {
        panic!("a two-key block must yield the full sequence");
    };
    assert_eq!(proxies.len(), 2);

    use keyward::EngineKey;
    assert_eq!(
        proxies[0].blueprint().primary().unwrap().fingerprint,
        first.primary_packet().fingerprint
    );
    assert_eq!(
        proxies[1].blueprint().primary().unwrap().fingerprint,
        second.primary_packet().fingerprint
    );
}

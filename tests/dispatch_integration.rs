use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wallet_signer::algo::TX_PREFIX;
use wallet_signer::{
    Account, AccountKind, Address, ErrorCode, HardwareSession, HardwareTransport, InMemoryAccounts, InMemoryKeyStore,
    MultisigParams, Notifier, SecretKey, SignedTransaction, SignerConfig, SigningDispatcher, SigningError,
    SigningResult, Transaction,
};

fn key(n: u8) -> SecretKey {
    SecretKey::from_seed(&[n; 32])
}

fn payment(sender: Address) -> Transaction {
    Transaction {
        sender,
        receiver: Address::from_public_key([0x42; 32]),
        amount: 250_000,
        fee: 1_000,
        first_valid: 100,
        last_valid: 1_100,
        genesis_id: "testnet-v1.0".to_string(),
        genesis_hash: [0x22; 32],
        note: Vec::new(),
        rekey_to: None,
    }
}

/// Device stand-in that signs with a fixed key and tracks session lifetimes
#[derive(Clone)]
struct MockDevice {
    key: SecretKey,
    fail: bool,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl MockDevice {
    fn new(key: SecretKey) -> Self {
        Self {
            key,
            fail: false,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
            paths: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(key: SecretKey) -> Self {
        Self { fail: true, ..Self::new(key) }
    }
}

struct MockSession {
    device: MockDevice,
}

#[async_trait]
impl HardwareTransport for MockDevice {
    async fn open(&self) -> SigningResult<Box<dyn HardwareSession>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession { device: self.clone() }))
    }
}

#[async_trait]
impl HardwareSession for MockSession {
    async fn sign(&mut self, path: &str, payload_hex: &str) -> SigningResult<Vec<u8>> {
        self.device.paths.lock().unwrap().push(path.to_string());
        if self.device.fail {
            return Err(SigningError::hardware("Transaction rejected on device"));
        }

        let payload = hex::decode(payload_hex)?;
        Transaction::decode_unsigned(&payload)?;

        let mut message = TX_PREFIX.to_vec();
        message.extend_from_slice(&payload);

        let mut response = self.device.key.sign(&message).to_vec();
        response.extend_from_slice(&[0x90, 0x00]);
        Ok(response)
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.device.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct RecordingNotifier {
    errors: Mutex<Vec<SigningError>>,
}

impl Notifier for RecordingNotifier {
    fn report_error(&self, error: &SigningError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

fn dispatcher(accounts: Vec<Account>, keys: Vec<SecretKey>) -> SigningDispatcher {
    let store = keys.into_iter().fold(InMemoryKeyStore::new(), InMemoryKeyStore::with_key);
    SigningDispatcher::new(Arc::new(InMemoryAccounts::new(accounts)), Arc::new(store))
}

fn decode(bytes: &[u8]) -> SignedTransaction {
    SignedTransaction::decode(bytes).unwrap()
}

// =============================================================================
// Key signing and rekey
// =============================================================================

#[tokio::test]
async fn key_account_signature_matches_direct_signing() {
    let sk = key(1);
    let from = sk.address();
    let tx = payment(from);
    let dispatcher = dispatcher(vec![Account::new(from, AccountKind::Key)], vec![sk.clone()]);

    let signed = dispatcher.dispatch_sign(&from, &from, &tx).await.unwrap();
    assert_eq!(signed, tx.sign(&sk).unwrap());
    assert!(decode(&signed).verify().unwrap());
}

#[tokio::test]
async fn rekeyed_account_signs_with_target_key() {
    let (sk2, sk3) = (key(2), key(3));
    let (addr2, addr3) = (sk2.address(), sk3.address());
    let tx = payment(addr2);

    // Only the rekey target's key is held
    let dispatcher = dispatcher(
        vec![
            Account::new(addr2, AccountKind::Key).rekeyed(addr3),
            Account::new(addr3, AccountKind::Key),
        ],
        vec![sk3.clone()],
    );

    let signed = dispatcher.dispatch_sign(&addr2, &addr2, &tx).await.unwrap();
    assert_eq!(signed, tx.sign(&sk3).unwrap());

    let stx = decode(&signed);
    assert_eq!(stx.sgnr, Some(addr3));
    assert!(stx.verify().unwrap());
}

#[tokio::test]
async fn missing_key_is_key_not_found() {
    let from = key(4).address();
    let dispatcher = dispatcher(vec![Account::new(from, AccountKind::Key)], vec![]);

    let err = dispatcher.dispatch_sign(&from, &from, &payment(from)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::KeyNotFound);
}

#[tokio::test]
async fn unknown_sender_and_missing_rekey_target() {
    let known = key(5).address();
    let ghost = key(6).address();
    let dispatcher = dispatcher(vec![Account::new(known, AccountKind::Key).rekeyed(ghost)], vec![key(5)]);

    let err = dispatcher.dispatch_sign(&ghost, &ghost, &payment(ghost)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AccountNotFound);

    let err = dispatcher.dispatch_sign(&known, &known, &payment(known)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AccountNotFound);
}

#[tokio::test]
async fn watch_only_account_is_unsupported() {
    let from = key(7).address();
    let dispatcher = dispatcher(vec![Account::new(from, AccountKind::WatchOnly)], vec![]);

    let err = dispatcher.dispatch_sign(&from, &from, &payment(from)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedAccountKind);
}

// =============================================================================
// Hardware signing
// =============================================================================

#[tokio::test]
async fn ledger_account_signs_on_device_at_slot_path() {
    let device = MockDevice::new(key(8));
    let from = device.key.address();
    let tx = payment(from);

    let dispatcher = dispatcher(vec![Account::new(from, AccountKind::Ledger { slot: 5 })], vec![])
        .with_hardware(Arc::new(device.clone()));

    let signed = dispatcher.dispatch_sign(&from, &from, &tx).await.unwrap();
    assert_eq!(signed, tx.sign(&device.key).unwrap());

    assert_eq!(*device.paths.lock().unwrap(), vec!["44'/283'/5'/0/0".to_string()]);
    assert_eq!(device.opened.load(Ordering::SeqCst), 1);
    assert_eq!(device.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn direct_ledger_signing_of_unknown_address() {
    let device = MockDevice::new(key(13));
    let unknown = device.key.address();
    let dispatcher = dispatcher(vec![], vec![]).with_hardware(Arc::new(device.clone()));

    let err = dispatcher.sign_by_ledger(&unknown, &payment(unknown)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AccountNotFound);
    assert_eq!(device.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn account_rekeyed_to_ledger_records_device_as_signer() {
    let device = MockDevice::new(key(9));
    let ledger = device.key.address();
    let rekeyed = key(10).address();
    let tx = payment(rekeyed);

    let dispatcher = dispatcher(
        vec![
            Account::new(rekeyed, AccountKind::Key).rekeyed(ledger),
            Account::new(ledger, AccountKind::Ledger { slot: 1 }),
        ],
        vec![],
    )
    .with_hardware(Arc::new(device.clone()));

    let stx = decode(&dispatcher.dispatch_sign(&rekeyed, &rekeyed, &tx).await.unwrap());
    assert_eq!(stx.sgnr, Some(ledger));
    assert!(stx.verify().unwrap());
}

#[tokio::test]
async fn device_error_propagates_and_session_is_released() {
    let device = MockDevice::failing(key(11));
    let from = device.key.address();

    let dispatcher = dispatcher(vec![Account::new(from, AccountKind::Ledger { slot: 0 })], vec![])
        .with_hardware(Arc::new(device.clone()));

    let err = dispatcher.dispatch_sign(&from, &from, &payment(from)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::HardwareError);
    assert_eq!(device.opened.load(Ordering::SeqCst), 1);
    assert_eq!(device.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ledger_without_transport_fails() {
    let from = key(12).address();
    let dispatcher = dispatcher(vec![Account::new(from, AccountKind::Ledger { slot: 0 })], vec![]);

    let err = dispatcher.dispatch_sign(&from, &from, &payment(from)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::HardwareError);
}

// =============================================================================
// Multisig
// =============================================================================

struct MultisigWallet {
    members: Vec<SecretKey>,
    address: Address,
    dispatcher: SigningDispatcher,
}

fn multisig_wallet(threshold: u8) -> MultisigWallet {
    let members: Vec<SecretKey> = (20..23).map(key).collect();
    let params = MultisigParams::new(threshold, members.iter().map(SecretKey::address).collect()).unwrap();
    let address = params.address().unwrap();

    let mut accounts = vec![Account::new(address, AccountKind::Multisig { params })];
    accounts.extend(members.iter().map(|m| Account::new(m.address(), AccountKind::Key)));

    MultisigWallet {
        dispatcher: dispatcher(accounts, members.clone()),
        members,
        address,
    }
}

#[tokio::test]
async fn cosigners_fill_their_own_slots() {
    let wallet = multisig_wallet(2);
    let tx = payment(wallet.address);
    let envelope = wallet.dispatcher.create_multisig_transaction(&tx).unwrap();

    let second = wallet.members[1].address();
    let first = wallet.members[0].address();

    let once = wallet.dispatcher.sign_multisig(&envelope, &second, None).await.unwrap();
    let partial = decode(&once);
    assert!(!partial.verify_multisig().unwrap());

    let twice = wallet.dispatcher.sign_multisig(&once, &first, Some(&tx)).await.unwrap();
    let stx = decode(&twice);
    let msig = stx.msig.as_ref().unwrap();

    assert!(msig.subsigs[0].signature.is_some());
    assert!(msig.subsigs[1].signature.is_some());
    assert!(msig.subsigs[2].signature.is_none());
    assert!(stx.verify_multisig().unwrap());
}

#[tokio::test]
async fn dispatch_to_multisig_adds_signator_signature() {
    let wallet = multisig_wallet(2);
    let tx = payment(wallet.address);
    let signator = wallet.members[2].address();

    let stx = decode(&wallet.dispatcher.dispatch_sign(&wallet.address, &signator, &tx).await.unwrap());
    let msig = stx.msig.unwrap();

    assert_eq!(msig.signature_count(), 1);
    assert!(msig.subsigs[2].signature.is_some());
    assert_eq!(stx.txn, tx);
    assert_eq!(stx.sig, None);
}

#[tokio::test]
async fn non_member_signator_is_multisig_key_missing() {
    let wallet = multisig_wallet(2);
    let tx = payment(wallet.address);
    let envelope = wallet.dispatcher.create_multisig_transaction(&tx).unwrap();

    // Outsider has an account and a key, but no slot in the envelope
    let outsider = key(30);
    let accounts = vec![
        Account::new(outsider.address(), AccountKind::Key),
        wallet.dispatcher.resolve(&wallet.address).unwrap(),
    ];
    let dispatcher = dispatcher(accounts, vec![outsider.clone()]);

    let err = dispatcher
        .sign_multisig(&envelope, &outsider.address(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MultisigKeyMissing);
}

#[tokio::test]
async fn unknown_signator_is_signator_not_found() {
    let wallet = multisig_wallet(2);
    let tx = payment(wallet.address);
    let envelope = wallet.dispatcher.create_multisig_transaction(&tx).unwrap();

    let err = wallet
        .dispatcher
        .sign_multisig(&envelope, &key(31).address(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SignatorNotFound);
}

#[tokio::test]
async fn mismatched_transaction_is_rejected() {
    let wallet = multisig_wallet(2);
    let tx = payment(wallet.address);
    let envelope = wallet.dispatcher.create_multisig_transaction(&tx).unwrap();

    let other = Transaction { amount: 1, ..tx };
    let err = wallet
        .dispatcher
        .sign_multisig(&envelope, &wallet.members[0].address(), Some(&other))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransaction);
}

#[tokio::test]
async fn create_for_single_key_sender_is_not_multisig() {
    let sk = key(32);
    let dispatcher = dispatcher(vec![Account::new(sk.address(), AccountKind::Key)], vec![sk.clone()]);

    let err = dispatcher.create_multisig_transaction(&payment(sk.address())).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotMultisig);
}

#[tokio::test]
async fn create_for_unknown_sender_is_account_not_found() {
    let member = key(33);
    let dispatcher = dispatcher(vec![Account::new(member.address(), AccountKind::Key)], vec![member.clone()]);

    let unknown = key(34).address();
    let err = dispatcher.create_multisig_transaction(&payment(unknown)).unwrap_err();
    assert_eq!(err.code, ErrorCode::AccountNotFound);
}

#[tokio::test]
async fn cosign_with_unknown_envelope_sender_is_account_not_found() {
    let wallet = multisig_wallet(2);
    let envelope = wallet
        .dispatcher
        .create_multisig_transaction(&payment(wallet.address))
        .unwrap();

    // Member wallet that never recorded the multisig account itself
    let member = wallet.members[0].clone();
    let dispatcher = dispatcher(vec![Account::new(member.address(), AccountKind::Key)], vec![member.clone()]);

    let err = dispatcher
        .sign_multisig(&envelope, &member.address(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AccountNotFound);
}

#[tokio::test]
async fn cosign_without_member_key_is_key_not_found() {
    let wallet = multisig_wallet(2);
    let envelope = wallet
        .dispatcher
        .create_multisig_transaction(&payment(wallet.address))
        .unwrap();

    let member = wallet.members[1].address();
    let accounts = vec![
        wallet.dispatcher.resolve(&wallet.address).unwrap(),
        Account::new(member, AccountKind::Key),
    ];
    let dispatcher = dispatcher(accounts, vec![]);

    let err = dispatcher.sign_multisig(&envelope, &member, None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::KeyNotFound);
}

#[tokio::test]
async fn hardware_member_cosigns_envelope() {
    let device = MockDevice::new(key(40));
    let soft = key(41);
    let params = MultisigParams::new(2, vec![device.key.address(), soft.address()]).unwrap();
    let address = params.address().unwrap();

    let dispatcher = dispatcher(
        vec![
            Account::new(address, AccountKind::Multisig { params }),
            Account::new(device.key.address(), AccountKind::Ledger { slot: 2 }),
            Account::new(soft.address(), AccountKind::Key),
        ],
        vec![soft.clone()],
    )
    .with_hardware(Arc::new(device.clone()));

    let tx = payment(address);
    let envelope = dispatcher.create_multisig_transaction(&tx).unwrap();
    let once = dispatcher.sign_multisig(&envelope, &device.key.address(), None).await.unwrap();
    let twice = dispatcher.sign_multisig(&once, &soft.address(), None).await.unwrap();

    assert!(decode(&twice).verify_multisig().unwrap());
    assert_eq!(*device.paths.lock().unwrap(), vec!["44'/283'/2'/0/0".to_string()]);
    assert_eq!(device.closed.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Notifying entry point
// =============================================================================

#[tokio::test]
async fn sign_transaction_reports_errors_to_notifier() {
    let notifier = Arc::new(RecordingNotifier::default());
    let from = key(50).address();
    let dispatcher = dispatcher(vec![], vec![]).with_notifier(notifier.clone());

    assert!(dispatcher.sign_transaction(&from, &from, &payment(from)).await.is_none());

    let errors = notifier.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::AccountNotFound);
}

#[tokio::test]
async fn sign_transaction_success_is_silent() {
    let notifier = Arc::new(RecordingNotifier::default());
    let sk = key(51);
    let from = sk.address();
    let dispatcher =
        dispatcher(vec![Account::new(from, AccountKind::Key)], vec![sk.clone()]).with_notifier(notifier.clone());

    let signed = dispatcher.sign_transaction(&from, &from, &payment(from)).await;
    assert_eq!(signed, Some(payment(from).sign(&sk).unwrap()));
    assert!(notifier.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn error_reporting_can_be_disabled() {
    let notifier = Arc::new(RecordingNotifier::default());
    let from = key(52).address();
    let config = SignerConfig {
        report_errors: false,
        ..SignerConfig::default()
    };
    let dispatcher = dispatcher(vec![], vec![])
        .with_notifier(notifier.clone())
        .with_config(config);

    assert!(dispatcher.sign_transaction(&from, &from, &payment(from)).await.is_none());
    assert!(notifier.errors.lock().unwrap().is_empty());
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wordguard_core::db::open_db_in_memory;
use wordguard_core::{
    BackInterception, HapticFeedback, HapticPulse, ListController, MirrorAddress, MirrorError,
    MirrorRecord, MirrorRegistry, MirrorStore, ReconciliationEngine, RepoError, RepoResult,
    SqliteWordRepository, Word, WordFeed, WordId, WordRepository,
};

pub const AUTHORITY: &str = "test.provider";

pub fn address() -> MirrorAddress {
    MirrorAddress::new(AUTHORITY, "words").unwrap()
}

pub fn sqlite_store() -> Arc<SqliteWordRepository> {
    Arc::new(SqliteWordRepository::try_new(open_db_in_memory().unwrap()).unwrap())
}

pub fn engine_for(
    store: Arc<dyn WordRepository>,
    mirror: Option<Arc<dyn MirrorStore>>,
) -> Arc<ReconciliationEngine> {
    let mut registry = MirrorRegistry::new();
    if let Some(mirror) = mirror {
        registry.register(mirror).unwrap();
    }
    Arc::new(ReconciliationEngine::new(store, registry, address()))
}

pub fn texts(words: &[Word]) -> Vec<String> {
    words.iter().map(|word| word.text.clone()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorCall {
    Insert(String),
    Wipe,
    Fetch,
}

/// In-memory mirror that records every call.
pub struct RecordingMirror {
    records: Mutex<Vec<MirrorRecord>>,
    calls: Mutex<Vec<MirrorCall>>,
    fail_fetch: AtomicBool,
    fail_insert: AtomicBool,
    supports_wipe: bool,
}

impl RecordingMirror {
    pub fn new() -> Self {
        Self::with_wipe_support(true)
    }

    pub fn with_wipe_support(supports_wipe: bool) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
            supports_wipe,
        }
    }

    pub fn set_records(&self, records: Vec<MirrorRecord>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn records(&self) -> Vec<MirrorRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<MirrorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }
}

impl MirrorStore for RecordingMirror {
    fn authority(&self) -> &str {
        AUTHORITY
    }

    fn insert(&self, record: &MirrorRecord) -> Result<(), MirrorError> {
        self.calls
            .lock()
            .unwrap()
            .push(MirrorCall::Insert(record.text.clone()));
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(MirrorError::WriteFailed("simulated insert failure".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        records.retain(|existing| record.id.is_none() || existing.id != record.id);
        records.push(record.clone());
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<MirrorRecord>, MirrorError> {
        self.calls.lock().unwrap().push(MirrorCall::Fetch);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(MirrorError::FetchFailed("simulated fetch failure".to_string()));
        }
        Ok(self.records())
    }

    fn wipe(&self) -> Result<(), MirrorError> {
        self.calls.lock().unwrap().push(MirrorCall::Wipe);
        self.records.lock().unwrap().clear();
        Ok(())
    }

    fn supports_wipe(&self) -> bool {
        self.supports_wipe
    }
}

/// Store decorator able to fail selected mutations.
pub struct FlakyStore {
    inner: Arc<SqliteWordRepository>,
    fail_delete: AtomicBool,
    fail_update: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<SqliteWordRepository>) -> Self {
        Self {
            inner,
            fail_delete: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
        }
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }
}

fn simulated(operation: &str) -> RepoError {
    RepoError::InvalidData(format!("simulated {operation} failure"))
}

impl WordRepository for FlakyStore {
    fn insert(&self, word: &Word) -> RepoResult<WordId> {
        self.inner.insert(word)
    }

    fn update(&self, word: &Word) -> RepoResult<()> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(simulated("update"));
        }
        self.inner.update(word)
    }

    fn delete(&self, words: &[Word]) -> RepoResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(simulated("delete"));
        }
        self.inner.delete(words)
    }

    fn delete_all(&self) -> RepoResult<()> {
        self.inner.delete_all()
    }

    fn replace_all(&self, words: &[Word]) -> RepoResult<usize> {
        self.inner.replace_all(words)
    }

    fn list_all(&self) -> RepoResult<Vec<Word>> {
        self.inner.list_all()
    }

    fn list_matched(&self) -> RepoResult<Vec<Word>> {
        self.inner.list_matched()
    }

    fn observe_all(&self) -> WordFeed {
        self.inner.observe_all()
    }
}

#[derive(Default)]
pub struct RecordingHaptics {
    pulses: Mutex<Vec<HapticPulse>>,
    fail: AtomicBool,
}

impl RecordingHaptics {
    pub fn failing() -> Self {
        Self {
            pulses: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    pub fn pulses(&self) -> Vec<HapticPulse> {
        self.pulses.lock().unwrap().clone()
    }
}

impl HapticFeedback for RecordingHaptics {
    fn pulse(&self, pulse: HapticPulse) -> Result<(), String> {
        self.pulses.lock().unwrap().push(pulse);
        if self.fail.load(Ordering::SeqCst) {
            return Err("vibrator unavailable".to_string());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingBack {
    installed: AtomicBool,
    installs: AtomicUsize,
    uninstalls: AtomicUsize,
}

impl RecordingBack {
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn uninstalls(&self) -> usize {
        self.uninstalls.load(Ordering::SeqCst)
    }
}

impl BackInterception for RecordingBack {
    fn install(&self) {
        self.installed.store(true, Ordering::SeqCst);
        self.installs.fetch_add(1, Ordering::SeqCst);
    }

    fn uninstall(&self) {
        self.installed.store(false, Ordering::SeqCst);
        self.uninstalls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Controller wired to a flaky store, a recording mirror and recording hooks.
pub struct Harness {
    pub sqlite: Arc<SqliteWordRepository>,
    pub store: Arc<FlakyStore>,
    pub mirror: Arc<RecordingMirror>,
    pub haptics: Arc<RecordingHaptics>,
    pub back: Arc<RecordingBack>,
    pub controller: ListController,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_haptics(Arc::new(RecordingHaptics::default()))
    }

    pub fn with_haptics(haptics: Arc<RecordingHaptics>) -> Self {
        let sqlite = sqlite_store();
        let store = Arc::new(FlakyStore::new(Arc::clone(&sqlite)));
        let mirror = Arc::new(RecordingMirror::new());
        let engine = engine_for(store.clone(), Some(mirror.clone() as Arc<dyn MirrorStore>));
        let back = Arc::new(RecordingBack::default());
        let controller = ListController::new(store.clone(), engine)
            .with_haptics(haptics.clone(), HapticPulse::default())
            .with_back_interception(back.clone());

        Self {
            sqlite,
            store,
            mirror,
            haptics,
            back,
            controller,
        }
    }

    pub fn stored_texts(&self) -> Vec<String> {
        texts(&self.sqlite.list_all().unwrap())
    }
}

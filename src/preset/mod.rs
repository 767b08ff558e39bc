pub mod builtin;
pub mod format;

use std::io;
use std::path::{Path, PathBuf};

use crate::controller::Controller;
use crate::midi::Transport;
use crate::state::ControllerState;

/// Description given to presets saved without one.
pub const USER_DESCRIPTION: &str = "User Preset";

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("preset name is empty")]
    EmptyName,

    #[error("preset storage: {0}")]
    Io(#[from] io::Error),

    #[error("preset document: {0}")]
    Format(#[from] serde_json::Error),
}

/// A named snapshot of the whole surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preset {
    pub description: String,
    pub state: ControllerState,
}

impl Preset {
    pub fn new(description: &str, state: ControllerState) -> Self {
        Preset {
            description: description.to_string(),
            state,
        }
    }
}

/// Where the preset document lives. One writer, whole-document reads and writes.
pub trait Storage {
    /// The stored document, or `None` if nothing was ever written.
    fn read(&self) -> io::Result<Option<String>>;

    fn write(&mut self, contents: &str) -> io::Result<()>;
}

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        // Write-then-rename so a crash never leaves a half-written document.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)
    }
}

/// In-memory document, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
    contents: Option<String>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn with_contents(contents: &str) -> Self {
        MemoryStorage {
            contents: Some(contents.to_string()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> io::Result<()> {
        self.contents = Some(contents.to_string());
        Ok(())
    }
}

/// Named presets in insertion order, persisted through a [`Storage`] after
/// every change.
pub struct PresetStore<S> {
    storage: S,
    entries: Vec<(String, Preset)>,
}

impl<S: Storage> PresetStore<S> {
    /// Read and migrate whatever the storage holds. Absent means empty.
    pub fn open(storage: S) -> Result<Self, PresetError> {
        let entries = match storage.read()? {
            Some(text) if !text.trim().is_empty() => format::parse_document(&text)?,
            _ => Vec::new(),
        };
        log::debug!("Opened preset store with {} preset(s)", entries.len());
        Ok(PresetStore { storage, entries })
    }

    /// Populate an empty store with the built-in set. Returns whether anything
    /// was added; a store that already holds presets is left alone.
    pub fn seed_defaults(&mut self) -> Result<bool, PresetError> {
        if !self.entries.is_empty() {
            return Ok(false);
        }
        self.entries = builtin::presets();
        self.persist()?;
        log::info!("Seeded {} built-in preset(s)", self.entries.len());
        Ok(true)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Preset names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Preset)> {
        self.entries.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    /// Store an independent copy of `state` under the trimmed `name`,
    /// replacing a preset of the same name in place.
    pub fn save(
        &mut self,
        name: &str,
        description: &str,
        state: &ControllerState,
    ) -> Result<(), PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::EmptyName);
        }
        let description = if description.trim().is_empty() {
            USER_DESCRIPTION
        } else {
            description.trim()
        };
        self.upsert(name.to_string(), Preset::new(description, state.clone()));
        self.persist()?;
        log::info!("Saved preset '{name}'");
        Ok(())
    }

    /// Recall preset `name` into `controller`, replaying it to the device.
    /// Returns false, changing nothing, if there is no such preset.
    pub fn load<T: Transport>(&self, name: &str, controller: &mut Controller<T>) -> bool {
        match self.get(name) {
            Some(preset) => {
                controller.recall(&preset.state);
                log::info!("Loaded preset '{name}'");
                true
            }
            None => {
                log::debug!("No preset named '{name}'");
                false
            }
        }
    }

    /// Remove `name` if it exists and `confirm` agrees. `confirm` is only
    /// asked about presets that exist. Returns whether a preset was removed.
    pub fn delete(
        &mut self,
        name: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<bool, PresetError> {
        let Some(index) = self.position(name) else {
            return Ok(false);
        };
        if !confirm(name) {
            return Ok(false);
        }
        self.entries.remove(index);
        self.persist()?;
        log::info!("Deleted preset '{name}'");
        Ok(true)
    }

    /// Merge every entry of another preset document (either shape),
    /// overwriting same-named presets. Returns how many were merged.
    pub fn import(&mut self, document: &str) -> Result<usize, PresetError> {
        let incoming = format::parse_document(document)?;
        let count = incoming.len();
        for (name, preset) in incoming {
            self.upsert(name, preset);
        }
        if count > 0 {
            self.persist()?;
        }
        Ok(count)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    fn upsert(&mut self, name: String, preset: Preset) {
        match self.position(&name) {
            Some(i) => self.entries[i].1 = preset,
            None => self.entries.push((name, preset)),
        }
    }

    fn persist(&mut self) -> Result<(), PresetError> {
        let text = format::render_document(&self.entries)?;
        self.storage.write(&text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::CcMessage;

    fn empty_store() -> PresetStore<MemoryStorage> {
        PresetStore::open(MemoryStorage::default()).unwrap()
    }

    fn names<S: Storage>(store: &PresetStore<S>) -> Vec<String> {
        store.names().map(String::from).collect()
    }

    #[test]
    fn absent_document_opens_empty() {
        let store = empty_store();
        assert!(store.is_empty());
        assert!(store.storage().contents().is_none());
    }

    #[test]
    fn save_then_load_round_trips_and_stays_independent() {
        let mut controller = Controller::new(Vec::<CcMessage>::new());
        controller.select_effect(0, 21).unwrap();
        controller.set_knob(0, 1, 99).unwrap();
        controller.remap_knob(0, 3, 5).unwrap();
        let saved = controller.state().clone();

        let mut store = empty_store();
        store.save("X", "", controller.state()).unwrap();

        controller.set_knob(0, 1, 5).unwrap();
        controller.select_effect(2, 7).unwrap();
        assert_eq!(store.get("X").unwrap().state, saved);

        assert!(store.load("X", &mut controller));
        assert_eq!(*controller.state(), saved);
    }

    #[test]
    fn saved_presets_survive_reopen() {
        let mut store = empty_store();
        let mut state = ControllerState::default();
        state.buses[4].effect_index = 3;
        store.save("  Vocals  ", "harmony on input", &state).unwrap();

        let storage = MemoryStorage::with_contents(store.storage().contents().unwrap());
        let reopened = PresetStore::open(storage).unwrap();
        let preset = reopened.get("Vocals").unwrap();
        assert_eq!(preset.description, "harmony on input");
        assert_eq!(preset.state, state);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut store = empty_store();
        let state = ControllerState::default();
        assert!(matches!(store.save("", "", &state), Err(PresetError::EmptyName)));
        assert!(matches!(store.save("   ", "", &state), Err(PresetError::EmptyName)));
        assert!(store.is_empty());
        assert!(store.storage().contents().is_none());
    }

    #[test]
    fn default_description_for_user_presets() {
        let mut store = empty_store();
        store.save("Mine", " ", &ControllerState::default()).unwrap();
        assert_eq!(store.get("Mine").unwrap().description, USER_DESCRIPTION);
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut store = empty_store();
        let mut state = ControllerState::default();
        store.save("A", "", &state).unwrap();
        store.save("B", "", &state).unwrap();
        state.buses[0].knobs[0] = 1;
        store.save("A", "again", &state).unwrap();
        assert_eq!(names(&store), ["A", "B"]);
        assert_eq!(store.get("A").unwrap().state.buses[0].knobs[0], 1);
    }

    #[test]
    fn load_of_missing_preset_is_a_no_op() {
        let store = empty_store();
        let mut controller = Controller::new(Vec::<CcMessage>::new());
        controller.set_knob(0, 0, 12).unwrap();
        let before = controller.state().clone();
        assert!(!store.load("nope", &mut controller));
        assert_eq!(*controller.state(), before);
        assert_eq!(controller.transport().len(), 1);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut store = empty_store();
        store.save("Keep", "", &ControllerState::default()).unwrap();
        assert!(!store.delete("Keep", |_| false).unwrap());
        assert_eq!(names(&store), ["Keep"]);
        assert!(store.delete("Keep", |n| n == "Keep").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn deleting_unknown_name_changes_nothing() {
        let mut store = empty_store();
        store.seed_defaults().unwrap();
        let before = names(&store);
        let mut asked = false;
        assert!(!store.delete("Not There", |_| {
            asked = true;
            true
        })
        .unwrap());
        assert!(!asked);
        assert_eq!(names(&store), before);
    }

    #[test]
    fn seeding_is_idempotent() {
        let mut once = empty_store();
        assert!(once.seed_defaults().unwrap());

        let mut twice = empty_store();
        twice.seed_defaults().unwrap();
        assert!(!twice.seed_defaults().unwrap());

        assert_eq!(names(&once), names(&twice));
        assert_eq!(once.len(), builtin::presets().len());
    }

    #[test]
    fn seeding_never_touches_user_presets() {
        let mut store = empty_store();
        store.save("Mine", "", &ControllerState::default()).unwrap();
        assert!(!store.seed_defaults().unwrap());
        assert_eq!(names(&store), ["Mine"]);
    }

    #[test]
    fn emptied_document_is_seeded_again() {
        let mut store = PresetStore::open(MemoryStorage::with_contents("{}")).unwrap();
        assert!(store.is_empty());
        assert!(store.seed_defaults().unwrap());
        assert_eq!(store.len(), builtin::presets().len());

        // A document the user emptied by deleting everything counts as empty too.
        let mut emptied = PresetStore::open(MemoryStorage::default()).unwrap();
        emptied.save("Only", "", &ControllerState::default()).unwrap();
        assert!(emptied.delete("Only", |_| true).unwrap());
        let mut reopened =
            PresetStore::open(MemoryStorage::with_contents(emptied.storage().contents().unwrap()))
                .unwrap();
        assert!(reopened.seed_defaults().unwrap());
        assert_eq!(names(&reopened), names(&store));
    }

    #[test]
    fn seeding_persists() {
        let mut store = empty_store();
        store.seed_defaults().unwrap();
        let reopened =
            PresetStore::open(MemoryStorage::with_contents(store.storage().contents().unwrap()))
                .unwrap();
        assert_eq!(names(&reopened), names(&store));
    }

    #[test]
    fn import_merges_legacy_documents() {
        let mut store = empty_store();
        store.save("Vinyl Sim Classic", "old", &ControllerState::default()).unwrap();
        store.save("Other", "", &ControllerState::default()).unwrap();

        let legacy = r#"{
            "Vinyl Sim Classic": { "buses": [
                { "effectIndex": 21, "knobs": [63, 80, 50, 63, 63, 63] },
                { "effectIndex": 40, "knobs": [80, 63, 90, 100, 63, 63] },
                { "effectIndex": 1, "knobs": [63, 63, 63, 63, 63, 63] },
                { "effectIndex": 1, "knobs": [63, 63, 63, 63, 63, 63] },
                { "effectIndex": 1, "knobs": [63, 63, 63, 63, 63, 63] }
            ]},
            "Slicer Mincer": { "buses": [
                { "effectIndex": 31, "knobs": [63, 80, 100, 63, 63, 127] }
            ]}
        }"#;
        assert_eq!(store.import(legacy).unwrap(), 2);
        assert_eq!(names(&store), ["Vinyl Sim Classic", "Other", "Slicer Mincer"]);
        let vinyl = store.get("Vinyl Sim Classic").unwrap();
        assert_eq!(vinyl.state.buses[0].effect_index, 21);
        assert_eq!(vinyl.state.buses[1].knobs, [80, 63, 90, 100, 63, 63]);
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("presets.json");

        let mut store = PresetStore::open(FileStorage::new(&path)).unwrap();
        assert!(store.is_empty());
        store.seed_defaults().unwrap();
        store.save("Mine", "", &ControllerState::default()).unwrap();
        assert!(path.exists());

        let reopened = PresetStore::open(FileStorage::new(&path)).unwrap();
        assert_eq!(names(&reopened), names(&store));
        assert_eq!(reopened.storage().path(), path);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PresetStore::open(FileStorage::new(&path)),
            Err(PresetError::Format(_))
        ));
    }
}

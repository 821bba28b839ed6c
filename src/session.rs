//! In-memory conversational and per-guild preference state.
//!
//! Nothing here survives a restart. Each key owns its own lock, so two
//! interactions for the same user serialize while different users never
//! contend beyond the brief map lookup.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::aggregator::{ChatTurn, Role};

/// Turns kept per key; the oldest turn goes first.
pub const HISTORY_CAP: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionKey {
    User(u64),
    Guild(u64),
}

impl SessionKey {
    /// Guild-wide settings live on the guild; in DMs they fall back to the user.
    pub fn scope(guild_id: Option<u64>, user_id: u64) -> Self {
        guild_id.map_or(Self::User(user_id), Self::Guild)
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub history: VecDeque<ChatTurn>,
    pub image_model: Option<String>,
    pub allowed_channels: BTreeSet<u64>,
}

pub struct SessionStore {
    default_image_model: String,
    entries: RwLock<HashMap<SessionKey, Arc<Mutex<SessionState>>>>,
}

impl SessionStore {
    pub fn new(default_image_model: impl Into<String>) -> Self {
        Self {
            default_image_model: default_image_model.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn entry(&self, key: SessionKey) -> Arc<Mutex<SessionState>> {
        if let Some(state) = self.entries.read().get(&key) {
            return Arc::clone(state);
        }
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(key).or_default())
    }

    fn existing(&self, key: SessionKey) -> Option<Arc<Mutex<SessionState>>> {
        self.entries.read().get(&key).cloned()
    }

    fn peek<T>(&self, key: SessionKey, f: impl FnOnce(&SessionState) -> T) -> Option<T> {
        let state = self.existing(key)?;
        let guard = state.lock();
        Some(f(&guard))
    }

    pub fn append_turn(&self, key: SessionKey, role: Role, content: impl Into<String>) {
        let state = self.entry(key);
        let mut state = state.lock();
        state.history.push_back(ChatTurn::new(role, content));
        while state.history.len() > HISTORY_CAP {
            state.history.pop_front();
        }
    }

    pub fn get_history(&self, key: SessionKey) -> Vec<ChatTurn> {
        self.peek(key, |s| s.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns whether there was anything to clear.
    pub fn clear_history(&self, key: SessionKey) -> bool {
        let Some(state) = self.existing(key) else {
            return false;
        };
        let mut state = state.lock();
        let had_any = !state.history.is_empty();
        state.history.clear();
        had_any
    }

    pub fn set_image_model(&self, key: SessionKey, model: impl Into<String>) {
        self.entry(key).lock().image_model = Some(model.into());
    }

    pub fn get_image_model(&self, key: SessionKey) -> String {
        self.peek(key, |s| s.image_model.clone())
            .flatten()
            .unwrap_or_else(|| self.default_image_model.clone())
    }

    /// Returns `false` if the channel was already on the list.
    pub fn allow_channel(&self, key: SessionKey, channel_id: u64) -> bool {
        self.entry(key).lock().allowed_channels.insert(channel_id)
    }

    /// Returns `false` if the channel was not on the list.
    pub fn disallow_channel(&self, key: SessionKey, channel_id: u64) -> bool {
        self.existing(key)
            .is_some_and(|state| state.lock().allowed_channels.remove(&channel_id))
    }

    pub fn clear_allowed_channels(&self, key: SessionKey) {
        if let Some(state) = self.existing(key) {
            state.lock().allowed_channels.clear();
        }
    }

    pub fn get_allowed_channels(&self, key: SessionKey) -> Vec<u64> {
        self.peek(key, |s| s.allowed_channels.iter().copied().collect())
            .unwrap_or_default()
    }

    /// An empty or missing allow-list means every channel is allowed.
    pub fn is_channel_allowed(&self, key: SessionKey, channel_id: u64) -> bool {
        self.peek(key, |s| {
            s.allowed_channels.is_empty() || s.allowed_channels.contains(&channel_id)
        })
        .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_last_ten_in_order() {
        let store = SessionStore::new("flux");
        let key = SessionKey::User(1);
        for i in 1..=12 {
            store.append_turn(key, Role::User, format!("turn {i}"));
        }

        let history = store.get_history(key);
        assert_eq!(history.len(), HISTORY_CAP);
        let texts: Vec<&str> = history.iter().map(|t| t.content.as_str()).collect();
        let expected: Vec<String> = (3..=12).map(|i| format!("turn {i}")).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_history_never_exceeds_cap() {
        let store = SessionStore::new("flux");
        let key = SessionKey::User(2);
        for i in 0..57 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            store.append_turn(key, role, "x");
            assert!(store.get_history(key).len() <= HISTORY_CAP);
        }
    }

    #[test]
    fn test_clear_history() {
        let store = SessionStore::new("flux");
        let key = SessionKey::User(3);
        assert!(!store.clear_history(key));

        store.append_turn(key, Role::User, "hello");
        assert!(store.clear_history(key));
        assert!(store.get_history(key).is_empty());
        assert!(!store.clear_history(key));
    }

    #[test]
    fn test_image_model_default_and_override() {
        let store = SessionStore::new("flux");
        let guild = SessionKey::Guild(10);
        assert_eq!(store.get_image_model(guild), "flux");

        store.set_image_model(guild, "dall-e-3");
        assert_eq!(store.get_image_model(guild), "dall-e-3");
        assert_eq!(store.get_image_model(SessionKey::Guild(11)), "flux");
    }

    #[test]
    fn test_empty_allow_list_allows_everything() {
        let store = SessionStore::new("flux");
        let guild = SessionKey::Guild(20);
        assert!(store.is_channel_allowed(guild, 1));
        assert!(store.is_channel_allowed(guild, 999));

        store.allow_channel(guild, 5);
        store.clear_allowed_channels(guild);
        assert!(store.is_channel_allowed(guild, 999));
    }

    #[test]
    fn test_allow_list_add_remove() {
        let store = SessionStore::new("flux");
        let guild = SessionKey::Guild(30);

        assert!(store.allow_channel(guild, 7));
        assert!(!store.allow_channel(guild, 7));
        assert!(store.allow_channel(guild, 3));
        assert_eq!(store.get_allowed_channels(guild), vec![3, 7]);

        assert!(store.is_channel_allowed(guild, 7));
        assert!(!store.is_channel_allowed(guild, 8));

        assert!(store.disallow_channel(guild, 7));
        assert!(!store.disallow_channel(guild, 7));
        assert!(!store.disallow_channel(SessionKey::Guild(31), 7));
        assert_eq!(store.get_allowed_channels(guild), vec![3]);
    }

    #[test]
    fn test_keys_are_isolated() {
        let store = SessionStore::new("flux");
        store.append_turn(SessionKey::User(1), Role::User, "a");
        store.allow_channel(SessionKey::Guild(1), 42);

        assert!(store.get_history(SessionKey::Guild(1)).is_empty());
        assert_eq!(store.get_history(SessionKey::User(1)).len(), 1);
        assert!(store.is_channel_allowed(SessionKey::Guild(2), 1));
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(SessionStore::new("flux"));
        let key = SessionKey::User(99);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.append_turn(key, Role::User, "t"))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.get_history(key).len(), 8);
    }

    #[test]
    fn test_scope_key() {
        assert_eq!(SessionKey::scope(Some(5), 9), SessionKey::Guild(5));
        assert_eq!(SessionKey::scope(None, 9), SessionKey::User(9));
    }
}

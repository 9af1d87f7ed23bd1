use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

/// Process-wide list of revoked token ids
///
/// # Example
/// ```rust
/// use trainer_hub_domain::auth::token_blacklist;
///
/// if token_blacklist::blacklist().is_revoked("some-jti") {
///     println!("Token is revoked");
/// }
/// ```
static TOKEN_BLACKLIST: Lazy<TokenBlacklist> = Lazy::new(TokenBlacklist::new);

type Entries = HashMap<String, (SystemTime, SystemTime)>;

/// Revoked tokens, keyed by JWT id
///
/// Entries are kept until the token would have expired on its own. The list is
/// bounded: when full, expired entries are dropped first, then the oldest half.
pub struct TokenBlacklist {
    /// jti -> (expiration, revocation time)
    revoked_tokens: Mutex<Entries>,

    /// Maximum size of the blacklist before aggressive pruning
    max_size: usize,
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBlacklist {
    /// Create a blacklist holding up to 10,000 tokens
    pub fn new() -> Self {
        Self::with_max_size(10_000)
    }

    /// Create a blacklist with a custom capacity
    ///
    /// ```rust
    /// use trainer_hub_domain::auth::token_blacklist::TokenBlacklist;
    ///
    /// let blacklist = TokenBlacklist::with_max_size(5000);
    /// assert_eq!(blacklist.size(), 0);
    /// ```
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            revoked_tokens: Mutex::new(HashMap::new()),
            max_size: max_size.max(1),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        // The map stays consistent even if a holder panicked
        self.revoked_tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a token to the blacklist until `expiration`
    ///
    /// ```rust
    /// use std::time::{Duration, SystemTime};
    /// use trainer_hub_domain::auth::token_blacklist::TokenBlacklist;
    ///
    /// let blacklist = TokenBlacklist::new();
    /// blacklist.revoke_token("jti-456", SystemTime::now() + Duration::from_secs(3600));
    /// assert!(blacklist.is_revoked("jti-456"));
    /// ```
    pub fn revoke_token(&self, token_id: &str, expiration: SystemTime) {
        let revocation_time = SystemTime::now();
        let mut tokens = self.entries();

        if tokens.len() >= self.max_size {
            warn!("Token blacklist reached max size ({}), performing aggressive cleanup", self.max_size);
            cleanup_expired(&mut tokens);

            if tokens.len() >= self.max_size {
                remove_oldest_entries(&mut tokens, (self.max_size / 2).max(1));
            }
        }

        tokens.insert(token_id.to_string(), (expiration, revocation_time));
        info!("Token revoked: {}", token_id);
    }

    /// Whether the token has been revoked
    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.entries().contains_key(token_id)
    }

    /// Number of tokens in the blacklist
    pub fn size(&self) -> usize {
        self.entries().len()
    }

    /// Remove expired tokens, returning how many were dropped
    pub fn cleanup_expired_tokens(&self) -> usize {
        cleanup_expired(&mut self.entries())
    }
}

fn cleanup_expired(tokens: &mut Entries) -> usize {
    let now = SystemTime::now();
    let before_count = tokens.len();

    tokens.retain(|_, (expiration, _)| *expiration > now);

    let removed = before_count - tokens.len();
    if removed > 0 {
        debug!("Removed {} expired tokens from blacklist", removed);
    }
    removed
}

fn remove_oldest_entries(tokens: &mut Entries, count: usize) {
    let mut by_age: Vec<(String, SystemTime)> = tokens
        .iter()
        .map(|(k, (_, revoked_at))| (k.clone(), *revoked_at))
        .collect();
    by_age.sort_by(|a, b| a.1.cmp(&b.1));

    for (key, _) in by_age.into_iter().take(count) {
        tokens.remove(&key);
    }

    debug!("Removed {} oldest entries from token blacklist", count);
}

/// The global token blacklist
pub fn blacklist() -> &'static TokenBlacklist {
    &TOKEN_BLACKLIST
}

/// Spawn a task that prunes expired entries every hour
#[cfg(feature = "with-tokio")]
pub fn start_cleanup_task() -> tokio::task::JoinHandle<()> {
    use std::time::Duration;
    use tokio::time;

    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(3600));

        loop {
            interval.tick().await;
            debug!("Running scheduled token blacklist cleanup");
            let removed = blacklist().cleanup_expired_tokens();
            debug!("Removed {} expired tokens, {} remain in blacklist", removed, blacklist().size());
        }
    })
}

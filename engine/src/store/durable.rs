use super::IndexStore;
use crate::term_counter::TermCounter;
use anyhow::{anyhow, bail, Context, Result};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

const TERM_COUNTER_PREFIX: &str = "TermCounter:";
const URL_SET_PREFIX: &str = "URLSet:";

/// Durable index store backed by a sled key-value tree.
///
/// Two key families share the tree: `TermCounter:<url>` holds the
/// bincode-encoded term counts of a document, `URLSet:<term>` the set of
/// URLs containing the term. A push updates both families inside one sled
/// transaction, so the store is never observed half-applied. Contents
/// survive process restart.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)
            .with_context(|| format!("opening index store at {}", path.display()))?;
        Ok(Self { db })
    }

    fn term_counter_key(url: &str) -> String {
        format!("{TERM_COUNTER_PREFIX}{url}")
    }

    fn url_set_key(term: &str) -> String {
        format!("{URL_SET_PREFIX}{term}")
    }

    fn read_counts(&self, url: &str) -> Result<Option<BTreeMap<String, u64>>> {
        match self.db.get(Self::term_counter_key(url))? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();
        for key in self.db.scan_prefix(prefix.as_bytes()).keys() {
            let key = key?;
            let key = String::from_utf8_lossy(&key);
            keys.insert(key[prefix.len()..].to_string());
        }
        Ok(keys)
    }

    fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let keys: Vec<sled::IVec> = self
            .db
            .scan_prefix(prefix.as_bytes())
            .keys()
            .collect::<Result<_, _>>()?;
        for key in keys {
            self.db.remove(key)?;
        }
        self.db.flush().context("flushing index store")?;
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(raw: &[u8]) -> Result<T> {
    bincode::deserialize(raw).context("decoding index store entry")
}

impl IndexStore for SledStore {
    fn is_indexed(&self, url: &str) -> Result<bool> {
        Ok(self.db.contains_key(Self::term_counter_key(url))?)
    }

    fn push_term_counter(&mut self, tc: &TermCounter) -> Result<()> {
        let url = tc.label().to_string();
        let counts: BTreeMap<String, u64> =
            tc.counts().iter().map(|(t, c)| (t.clone(), *c)).collect();
        let fwd_key = Self::term_counter_key(&url);
        let fwd_bytes = bincode::serialize(&counts).context("encoding term counts")?;

        let result = self.db.transaction(|tx| {
            let abort = |e: bincode::Error| ConflictableTransactionError::Abort(e.to_string());

            // drop the URL from sets of terms that disappeared since the
            // previous push
            if let Some(raw) = tx.get(fwd_key.as_bytes())? {
                let old: BTreeMap<String, u64> =
                    bincode::deserialize(&raw).map_err(abort)?;
                for term in old.keys().filter(|t| !counts.contains_key(*t)) {
                    let set_key = Self::url_set_key(term);
                    if let Some(raw_set) = tx.get(set_key.as_bytes())? {
                        let mut urls: BTreeSet<String> =
                            bincode::deserialize(&raw_set).map_err(abort)?;
                        urls.remove(&url);
                        if urls.is_empty() {
                            tx.remove(set_key.as_bytes())?;
                        } else {
                            tx.insert(
                                set_key.as_bytes(),
                                bincode::serialize(&urls).map_err(abort)?,
                            )?;
                        }
                    }
                }
            }

            tx.insert(fwd_key.as_bytes(), fwd_bytes.clone())?;
            for term in counts.keys() {
                let set_key = Self::url_set_key(term);
                let mut urls: BTreeSet<String> = match tx.get(set_key.as_bytes())? {
                    Some(raw_set) => bincode::deserialize(&raw_set).map_err(abort)?,
                    None => BTreeSet::new(),
                };
                urls.insert(url.clone());
                tx.insert(
                    set_key.as_bytes(),
                    bincode::serialize(&urls).map_err(abort)?,
                )?;
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                self.db.flush().context("flushing index store")?;
                Ok(())
            }
            Err(TransactionError::Abort(msg)) => {
                Err(anyhow!("index store entry corrupted: {msg}"))
            }
            Err(TransactionError::Storage(e)) => {
                Err(e).with_context(|| format!("pushing term counts for {url}"))
            }
        }
    }

    fn get_urls(&self, term: &str) -> Result<BTreeSet<String>> {
        match self.db.get(Self::url_set_key(term))? {
            Some(raw) => decode(&raw),
            None => Ok(BTreeSet::new()),
        }
    }

    fn get_url_to_term_count(&self, term: &str) -> Result<HashMap<String, u64>> {
        let mut map = HashMap::new();
        for url in self.get_urls(term)? {
            if let Some(counts) = self.read_counts(&url)? {
                if let Some(count) = counts.get(term) {
                    map.insert(url, *count);
                }
            }
        }
        Ok(map)
    }

    fn get_total_term_count(&self, url: &str) -> Result<u64> {
        match self.read_counts(url)? {
            Some(counts) => Ok(counts.values().sum()),
            None => bail!("total term count requested for unindexed url {url}"),
        }
    }

    fn get_count(&self, url: &str, term: &str) -> Result<Option<u64>> {
        Ok(self
            .read_counts(url)?
            .and_then(|counts| counts.get(term).copied()))
    }

    fn url_set_keys(&self) -> Result<BTreeSet<String>> {
        self.keys_with_prefix(URL_SET_PREFIX)
    }

    fn term_counter_keys(&self) -> Result<BTreeSet<String>> {
        self.keys_with_prefix(TERM_COUNTER_PREFIX)
    }

    fn delete_url_sets(&mut self) -> Result<()> {
        self.delete_prefix(URL_SET_PREFIX)
    }

    fn delete_term_counters(&mut self) -> Result<()> {
        self.delete_prefix(TERM_COUNTER_PREFIX)
    }

    fn delete_all_keys(&mut self) -> Result<()> {
        self.db.clear().context("clearing index store")?;
        self.db.flush().context("flushing index store")?;
        Ok(())
    }
}

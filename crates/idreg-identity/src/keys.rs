//! Signing keys bound to fids

use crate::config::KeyRegistryConfig;
use crate::error::{KeyError, KeyResult};
use crate::events::KeyEvent;
use crate::registry::IdRegistry;
use idreg_core::{AccessControl, CallContext, EventEnvelope, Fid, Journal, MetadataValidator, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Lifecycle of a key under one fid. Moves only forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyState {
    /// Never added
    #[default]
    Null,
    /// Active
    Added,
    /// Retired; cannot be added again
    Removed,
}

/// Stored state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyData {
    /// Lifecycle state
    pub state: KeyState,
    /// Key type the key was added with
    pub key_type: u32,
}

type ValidatorSlot = (u32, u8);

/// Keys per fid with pluggable metadata validation.
#[derive(Clone)]
pub struct KeyRegistry {
    access: AccessControl,
    validators: BTreeMap<ValidatorSlot, Arc<dyn MetadataValidator>>,
    keys: BTreeMap<Fid, BTreeMap<Vec<u8>, KeyData>>,
    max_keys_per_fid: u32,
    journal: Journal<KeyEvent>,
}

impl fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .field("fids", &self.keys.len())
            .field("max_keys_per_fid", &self.max_keys_per_fid)
            .finish_non_exhaustive()
    }
}

impl KeyRegistry {
    /// Empty registry with no validators installed
    pub fn new(config: &KeyRegistryConfig, access: AccessControl) -> Self {
        Self {
            access,
            validators: BTreeMap::new(),
            keys: BTreeMap::new(),
            max_keys_per_fid: config.max_keys_per_fid,
            journal: Journal::new(),
        }
    }

    /// Add `key` to the caller's fid
    pub fn add(
        &mut self,
        ctx: &CallContext,
        ids: &IdRegistry,
        key_type: u32,
        key: &[u8],
        metadata_type: u8,
        metadata: &[u8],
    ) -> KeyResult<()> {
        let fid = ids
            .id_of(&ctx.caller)
            .ok_or(KeyError::HasNoId { address: ctx.caller })?;

        let current = self.key_data_of(fid, key);
        if current.state != KeyState::Null {
            return Err(KeyError::InvalidState {
                expected: KeyState::Null,
                actual: current.state,
            });
        }
        if self.total_keys(fid, KeyState::Added) >= self.max_keys_per_fid as usize {
            return Err(KeyError::ExceedsMaximum {
                max: self.max_keys_per_fid,
            });
        }
        let validator = self
            .validators
            .get(&(key_type, metadata_type))
            .ok_or(KeyError::ValidatorNotFound {
                key_type,
                metadata_type,
            })?;
        if !validator.validate(fid, key, metadata) {
            tracing::debug!(fid = %fid, key_type, metadata_type, "key metadata rejected");
            return Err(KeyError::InvalidMetadata);
        }

        self.keys.entry(fid).or_default().insert(
            key.to_vec(),
            KeyData {
                state: KeyState::Added,
                key_type,
            },
        );
        self.journal.record(
            ctx.block,
            KeyEvent::Add {
                fid,
                key_type,
                key: key.to_vec(),
                metadata_type,
                metadata: metadata.to_vec(),
            },
        );
        tracing::info!(fid = %fid, key_type, "key added");
        Ok(())
    }

    /// Retire `key` from the caller's fid
    pub fn remove(&mut self, ctx: &CallContext, ids: &IdRegistry, key: &[u8]) -> KeyResult<()> {
        let fid = ids
            .id_of(&ctx.caller)
            .ok_or(KeyError::HasNoId { address: ctx.caller })?;
        let actual = self.key_data_of(fid, key).state;
        if actual != KeyState::Added {
            return Err(KeyError::InvalidState {
                expected: KeyState::Added,
                actual,
            });
        }
        if let Some(data) = self.keys.get_mut(&fid).and_then(|keys| keys.get_mut(key)) {
            data.state = KeyState::Removed;
        }
        self.journal.record(
            ctx.block,
            KeyEvent::Remove {
                fid,
                key: key.to_vec(),
            },
        );
        tracing::info!(fid = %fid, "key removed");
        Ok(())
    }

    /// Install (`Some`) or remove (`None`) the validator for a type pair
    pub fn set_validator(
        &mut self,
        ctx: &CallContext,
        key_type: u32,
        metadata_type: u8,
        validator: Option<Arc<dyn MetadataValidator>>,
    ) -> KeyResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        let installed = validator.is_some();
        match validator {
            Some(validator) => {
                self.validators.insert((key_type, metadata_type), validator);
            }
            None => {
                self.validators.remove(&(key_type, metadata_type));
            }
        }
        self.journal.record(
            ctx.block,
            KeyEvent::SetValidator {
                key_type,
                metadata_type,
                installed,
            },
        );
        Ok(())
    }

    /// Raise the per-fid key limit
    pub fn set_max_keys_per_fid(&mut self, ctx: &CallContext, max: u32) -> KeyResult<()> {
        self.access.require(&ctx.caller, Role::Owner)?;
        if max <= self.max_keys_per_fid {
            return Err(KeyError::InvalidMaxKeys {
                current: self.max_keys_per_fid,
                requested: max,
            });
        }
        let old = std::mem::replace(&mut self.max_keys_per_fid, max);
        self.journal
            .record(ctx.block, KeyEvent::SetMaxKeysPerFid { old, new: max });
        Ok(())
    }

    /// State of `key` under `fid`
    pub fn key_data_of(&self, fid: Fid, key: &[u8]) -> KeyData {
        self.keys
            .get(&fid)
            .and_then(|keys| keys.get(key))
            .copied()
            .unwrap_or_default()
    }

    /// Keys of `fid` in `state`, in byte order
    pub fn keys_of(&self, fid: Fid, state: KeyState) -> Vec<Vec<u8>> {
        self.keys
            .get(&fid)
            .map(|keys| {
                keys.iter()
                    .filter(|(_, data)| data.state == state)
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of keys of `fid` in `state`
    pub fn total_keys(&self, fid: Fid, state: KeyState) -> usize {
        self.keys
            .get(&fid)
            .map(|keys| keys.values().filter(|data| data.state == state).count())
            .unwrap_or(0)
    }

    /// Per-fid key limit
    pub fn max_keys_per_fid(&self) -> u32 {
        self.max_keys_per_fid
    }

    /// Key events
    pub fn journal(&self) -> &Journal<KeyEvent> {
        &self.journal
    }

    /// Hand off held key events
    pub fn drain_envelopes(&mut self) -> Result<Vec<EventEnvelope>, serde_json::Error> {
        self.journal.drain_envelopes()
    }
}

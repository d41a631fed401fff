use std::fs::File;
use std::hash::Hash;
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::prelude::{Action, ModelActionType, QlError};

/// Sparse state-action value table.
///
/// Rows are created lazily: reading an unknown state yields an all-zero row without storing it,
/// while writing access inserts a zero-initialized row first.
/// The table only grows; rows are never evicted.
#[derive(Clone, Debug)]
pub struct QTable<K, A> {
    rows: FxHashMap<K, Vec<f32>>,
    zero_row: Vec<f32>,
    _phantom: PhantomData<A>,
}

impl<K, A> QTable<K, A>
where
    K: Clone + Hash + Eq,
    A: Action,
{
    pub fn new() -> Self {
        Self {
            rows: FxHashMap::default(),
            zero_row: vec![0.0; A::ACTION_SPACE as usize],
            _phantom: PhantomData,
        }
    }

    /// Number of stored rows (visited states)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(
        &self,
        state: &K,
    ) -> bool {
        self.rows.contains_key(state)
    }

    /// Action values of `state`; an all-zero row for states not seen so far
    pub fn action_values(
        &self,
        state: &K,
    ) -> &[f32] {
        self.rows.get(state).unwrap_or(&self.zero_row)
    }

    /// Mutable action values of `state`; inserts a zero-initialized row for states not seen so far
    pub fn action_values_mut(
        &mut self,
        state: &K,
    ) -> &mut [f32] {
        let zero_row = &self.zero_row;
        self.rows
            .entry(state.clone())
            .or_insert_with(|| zero_row.clone())
    }

    pub fn max_value(
        &self,
        state: &K,
    ) -> f32 {
        let values = self.action_values(state);
        values[index_of_max(values)]
    }

    /// Action with the highest value for `state`.
    /// Among equal maximal values the action with the lowest numeric value wins.
    pub fn best_action(
        &self,
        state: &K,
    ) -> Result<A> {
        let idx = index_of_max(self.action_values(state));
        A::try_from_numeric(idx as ModelActionType)
    }
}

impl<K, A> Default for QTable<K, A>
where
    K: Clone + Hash + Eq,
    A: Action,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, A> PartialEq for QTable<K, A> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.rows == other.rows
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedQTable<K> {
    action_space: ModelActionType,
    entries: Vec<PersistedRow<K>>,
}

#[derive(Serialize, Deserialize)]
struct PersistedRow<K> {
    state: K,
    values: Vec<f32>,
}

impl<K, A> QTable<K, A>
where
    K: Clone + Hash + Eq + Serialize + DeserializeOwned,
    A: Action,
{
    pub fn save(
        &self,
        file: &Path,
    ) -> Result<()> {
        let persisted = PersistedQTable {
            action_space: A::ACTION_SPACE,
            entries: self
                .rows
                .iter()
                .map(|(state, values)| PersistedRow {
                    state: state.clone(),
                    values: values.clone(),
                })
                .collect(),
        };

        let f = File::create(file).with_context(|| format!("failed to create Q-table file '{}'", file.display()))?;
        let mut writer = BufWriter::new(f);
        serde_json::to_writer(&mut writer, &persisted)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(file: &Path) -> Result<Self> {
        let f = File::open(file).with_context(|| format!("Q-table file '{}' not found or not readable", file.display()))?;
        let persisted: PersistedQTable<K> = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("Q-table file '{}' is malformed", file.display()))?;

        if persisted.action_space != A::ACTION_SPACE {
            return Err(QlError(format!(
                "Q-table file '{}' was written for an action space of {}, expected {}",
                file.display(),
                persisted.action_space,
                A::ACTION_SPACE
            ))
            .into());
        }

        let mut table = Self::new();
        for row in persisted.entries {
            if row.values.len() != A::ACTION_SPACE as usize {
                return Err(QlError(format!(
                    "Q-table file '{}' contains a row with {} values, expected {}",
                    file.display(),
                    row.values.len(),
                    A::ACTION_SPACE
                ))
                .into());
            }
            table.rows.insert(row.state, row.values);
        }
        Ok(table)
    }
}

/// Index of the first maximum
fn index_of_max(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold(0, |best, (i, &v)| if v > values[best] { i } else { best })
}

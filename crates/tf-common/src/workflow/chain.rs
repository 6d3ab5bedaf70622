use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::workflow::phase::{phase_name, CustomField, Phase, PhaseStatus, PhaseType};

/// Ordered list of phases. Every operation is a pure transformation
/// returning a new chain; the input chain is never mutated.
///
/// Invariant: for every index i > 0, phase i's candidates are a subset of
/// phase i-1's. A candidate can only advance, never be invented
/// mid-pipeline, so violations are rejected rather than repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseChain(Vec<Phase>);

impl PhaseChain {
    /// Chain with a single entry phase seeded from an external candidate
    /// selection.
    pub fn seeded(initial_candidates: Vec<i64>) -> Self {
        Self(vec![Phase::new(0, initial_candidates)])
    }

    /// Rebuild a chain from raw phases (e.g. an update payload), rejecting
    /// any subset violation and renormalizing numbering.
    pub fn from_phases(phases: Vec<Phase>) -> Result<Self, CoreError> {
        if phases.is_empty() {
            return Err(CoreError::invariant(0, "a workflow needs at least one phase"));
        }
        let mut chain = Self(phases);
        for phase in &mut chain.0 {
            let candidates = phase.candidates.clone();
            phase.replace_candidates(candidates);
            let fields = std::mem::take(&mut phase.custom_fields);
            phase.replace_custom_fields(fields);
        }
        chain.renumber();
        chain.validate()?;
        Ok(chain)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> &Phase {
        // A chain is never empty: construction requires one phase and
        // remove refuses to delete the last one.
        self.0.last().expect("chain is never empty")
    }

    fn get(&self, index: usize) -> Result<&Phase, CoreError> {
        self.0
            .get(index)
            .ok_or_else(|| CoreError::not_found(format!("phase {index}")))
    }

    fn renumber(&mut self) {
        for (index, phase) in self.0.iter_mut().enumerate() {
            phase.phase_number = index;
            // Custom names do not survive structural edits; the name is
            // rederived from the position.
            phase.phase_name = phase_name(index);
        }
    }

    fn check_subset(&self, index: usize, candidates: &[i64]) -> Result<(), CoreError> {
        if index == 0 {
            return Ok(());
        }
        let previous: BTreeSet<i64> = self.0[index - 1].candidates.iter().copied().collect();
        let strays: Vec<i64> = candidates
            .iter()
            .copied()
            .filter(|id| !previous.contains(id))
            .collect();
        if strays.is_empty() {
            Ok(())
        } else {
            Err(CoreError::invariant(
                index,
                format!(
                    "candidates {strays:?} are not present in phase {}",
                    index - 1
                ),
            ))
        }
    }

    /// Full adjacency check, used when an entire chain arrives at once.
    pub fn validate(&self) -> Result<(), CoreError> {
        for index in 1..self.0.len() {
            self.check_subset(index, &self.0[index].candidates)?;
        }
        Ok(())
    }

    /// Append a phase whose initial candidate set mirrors the current last
    /// phase.
    pub fn append(&self) -> PhaseChain {
        let mut next = self.clone();
        let inherited = next.last().candidates.clone();
        next.0.push(Phase::new(next.0.len(), inherited));
        next.renumber();
        next
    }

    /// Remove a phase. The chain must keep at least one phase.
    pub fn remove(&self, index: usize) -> Result<PhaseChain, CoreError> {
        self.get(index)?;
        if self.0.len() == 1 {
            return Err(CoreError::invariant(
                index,
                "cannot remove the only phase of a workflow",
            ));
        }
        let mut next = self.clone();
        next.0.remove(index);
        next.renumber();
        next.validate()?;
        Ok(next)
    }

    /// Replace a phase's candidate set. Phase 0 accepts any set (it is the
    /// externally seeded entry point); later phases must draw from their
    /// predecessor.
    pub fn set_candidates(&self, index: usize, candidates: Vec<i64>) -> Result<PhaseChain, CoreError> {
        self.get(index)?;
        self.check_subset(index, &candidates)?;
        let mut next = self.clone();
        next.0[index].replace_candidates(candidates);
        // Shrinking a phase may strand candidates downstream.
        next.validate()?;
        Ok(next)
    }

    /// Fill the phase from its eligible pool: the external roster for
    /// phase 0, the previous phase for everything after it.
    pub fn select_all(&self, index: usize, roster: &[i64]) -> Result<PhaseChain, CoreError> {
        self.get(index)?;
        let eligible = if index == 0 {
            roster.to_vec()
        } else {
            self.0[index - 1].candidates.clone()
        };
        self.set_candidates(index, eligible)
    }

    pub fn deselect_all(&self, index: usize) -> Result<PhaseChain, CoreError> {
        self.set_candidates(index, Vec::new())
    }

    pub fn set_type(&self, index: usize, phase_type: PhaseType) -> Result<PhaseChain, CoreError> {
        self.get(index)?;
        let mut next = self.clone();
        next.0[index].phase_type = phase_type;
        Ok(next)
    }

    pub fn set_status(&self, index: usize, status: PhaseStatus) -> Result<PhaseChain, CoreError> {
        self.get(index)?;
        let mut next = self.clone();
        next.0[index].status = status;
        Ok(next)
    }

    pub fn set_custom_fields(
        &self,
        index: usize,
        fields: Vec<CustomField>,
    ) -> Result<PhaseChain, CoreError> {
        self.get(index)?;
        let mut next = self.clone();
        next.0[index].replace_custom_fields(fields);
        Ok(next)
    }

    /// Union suggested candidates (a matching query or the job's applicant
    /// list) into a phase, silently de-duplicating already-present ids.
    /// The subset invariant is re-validated rather than trusted to the
    /// caller.
    pub fn add_suggested(&self, index: usize, candidate_ids: &[i64]) -> Result<PhaseChain, CoreError> {
        let current = self.get(index)?;
        let mut merged = current.candidates.clone();
        for id in candidate_ids {
            if !merged.contains(id) {
                merged.push(*id);
            }
        }
        self.set_candidates(index, merged)
    }
}

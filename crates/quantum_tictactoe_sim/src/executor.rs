//! In-process executor backed by a dense register.

use crate::Register;
use derive_getters::Getters;
use quantum_tictactoe::{Basis, Bitstring, Executor, ExecutorError, Operation, Qubit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Default register limit.
pub const DEFAULT_MAX_QUBITS: usize = 20;

/// Samples one shot per request from an exact state vector.
///
/// Only qubits named by the request or its operations are simulated. Qubits
/// joined by controlled rotations share a register; every other group is
/// simulated and sampled on its own, so the limit applies per group.
#[derive(Debug, Getters)]
pub struct StateVectorExecutor {
    #[getter(skip)]
    rng: Mutex<StdRng>,
    max_qubits: usize,
}

impl StateVectorExecutor {
    /// Creates an executor seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }

    /// Creates a reproducible executor.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }

    /// Sets the register limit.
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    fn draw(&self) -> Result<f64, ExecutorError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| ExecutorError::new(format!("Sampler lock poisoned: {}", e)))?;
        Ok(rng.random::<f64>())
    }
}

impl Default for StateVectorExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits qubits into groups joined by controlled rotations.
///
/// Returns each group's qubits in first-seen order.
fn linked_groups(operations: &[Operation], qubits: &[Qubit]) -> Vec<Vec<Qubit>> {
    let mut index = BTreeMap::new();
    let mut order = Vec::new();
    for qubit in qubits
        .iter()
        .copied()
        .chain(operations.iter().flat_map(Operation::qubits))
    {
        index.entry(qubit).or_insert_with(|| {
            order.push(qubit);
            order.len() - 1
        });
    }

    let mut parent: Vec<usize> = (0..order.len()).collect();
    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }
    for op in operations {
        if let Operation::ControlledRotation {
            control, target, ..
        } = *op
        {
            let a = root(&mut parent, index[&control]);
            let b = root(&mut parent, index[&target]);
            parent[b] = a;
        }
    }

    let mut groups: BTreeMap<usize, Vec<Qubit>> = BTreeMap::new();
    for (i, qubit) in order.into_iter().enumerate() {
        let r = root(&mut parent, i);
        groups.entry(r).or_default().push(qubit);
    }
    groups.into_values().collect()
}

#[async_trait::async_trait]
impl Executor for StateVectorExecutor {
    #[instrument(skip(self, operations, qubits), fields(operations = operations.len(), qubits = qubits.len()))]
    async fn execute(
        &self,
        operations: &[Operation],
        qubits: &[Qubit],
        basis: Basis,
    ) -> Result<Bitstring, ExecutorError> {
        let groups = linked_groups(operations, qubits);
        if let Some(largest) = groups.iter().find(|g| g.len() > self.max_qubits) {
            return Err(ExecutorError::new(format!(
                "Linked group needs {} qubits, limit is {}",
                largest.len(),
                self.max_qubits
            )));
        }

        let mut outcome: BTreeMap<Qubit, bool> = BTreeMap::new();
        for group in &groups {
            let local: BTreeMap<Qubit, usize> =
                group.iter().enumerate().map(|(i, &q)| (q, i)).collect();

            let mut register = Register::new(local.len());
            for op in operations {
                match *op {
                    Operation::Rotation { axis, angle, qubit } => {
                        if let Some(&k) = local.get(&qubit) {
                            register.rotate(axis, angle, k);
                        }
                    }
                    Operation::ControlledRotation {
                        axis,
                        angle,
                        control,
                        target,
                    } => {
                        if let (Some(&c), Some(&t)) = (local.get(&control), local.get(&target)) {
                            register.controlled_rotate(axis, angle, c, t);
                        }
                    }
                }
            }
            let requested: Vec<Qubit> = qubits
                .iter()
                .copied()
                .filter(|q| local.contains_key(q))
                .collect();
            if requested.is_empty() {
                continue;
            }
            if basis == Basis::Symbol {
                for qubit in &requested {
                    register.hadamard(local[qubit]);
                }
            }

            let sample = register.sample(self.draw()?);
            for qubit in requested {
                outcome.insert(qubit, sample & (1 << local[&qubit]) != 0);
            }
        }

        let bits: Vec<bool> = qubits
            .iter()
            .map(|q| outcome.get(q).copied().unwrap_or(false))
            .collect();
        let bits = Bitstring::new(bits);
        debug!(%basis, %bits, groups = groups.len(), "Sampled");
        Ok(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantum_tictactoe::Axis;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[tokio::test]
    async fn test_no_operations_measures_zero() {
        let executor = StateVectorExecutor::seeded(7);
        let bits = executor
            .execute(&[], &[Qubit(3), Qubit(40)], Basis::Existence)
            .await
            .expect("Sampled");
        assert_eq!(bits.bits(), &[false, false]);
    }

    #[tokio::test]
    async fn test_rx_pi_measures_one() {
        let executor = StateVectorExecutor::seeded(7);
        let ops = [Operation::Rotation {
            axis: Axis::X,
            angle: PI,
            qubit: Qubit(4),
        }];
        let bits = executor
            .execute(&ops, &[Qubit(4), Qubit(5)], Basis::Existence)
            .await
            .expect("Sampled");
        assert_eq!(bits.bits(), &[true, false]);
    }

    #[tokio::test]
    async fn test_symbol_basis_reads_phase() {
        let executor = StateVectorExecutor::seeded(7);
        let plus = [Operation::Rotation {
            axis: Axis::Y,
            angle: FRAC_PI_2,
            qubit: Qubit(0),
        }];
        let minus = [Operation::Rotation {
            axis: Axis::Y,
            angle: -FRAC_PI_2,
            qubit: Qubit(0),
        }];
        let o = executor.execute(&plus, &[Qubit(0)], Basis::Symbol).await;
        let x = executor.execute(&minus, &[Qubit(0)], Basis::Symbol).await;
        assert_eq!(o.expect("Sampled").bits(), &[false]);
        assert_eq!(x.expect("Sampled").bits(), &[true]);
    }

    #[tokio::test]
    async fn test_controlled_rotation_across_boards() {
        let executor = StateVectorExecutor::seeded(7);
        let ops = [
            Operation::Rotation {
                axis: Axis::X,
                angle: PI,
                qubit: Qubit(0),
            },
            Operation::ControlledRotation {
                axis: Axis::X,
                angle: PI,
                control: Qubit(0),
                target: Qubit(13),
            },
        ];
        let bits = executor
            .execute(&ops, &[Qubit(0), Qubit(13)], Basis::Existence)
            .await
            .expect("Sampled");
        assert_eq!(bits.bits(), &[true, true]);
    }

    fn link(control: usize, target: usize) -> Operation {
        Operation::ControlledRotation {
            axis: Axis::X,
            angle: PI,
            control: Qubit(control),
            target: Qubit(target),
        }
    }

    #[tokio::test]
    async fn test_limit_applies_to_linked_group() {
        let executor = StateVectorExecutor::seeded(7).with_max_qubits(2);
        assert_eq!(*executor.max_qubits(), 2);

        let unlinked = executor
            .execute(&[], &[Qubit(0), Qubit(1), Qubit(2)], Basis::Existence)
            .await
            .expect("Three single-qubit groups");
        assert_eq!(unlinked.bits(), &[false, false, false]);

        let err = executor
            .execute(
                &[link(0, 1), link(1, 2)],
                &[Qubit(0), Qubit(1), Qubit(2)],
                Basis::Existence,
            )
            .await
            .unwrap_err();
        assert!(err.message.contains("needs 3 qubits, limit is 2"));
    }

    #[tokio::test]
    async fn test_independent_qubits_beyond_limit() {
        let executor = StateVectorExecutor::seeded(7);
        let qubits: Vec<Qubit> = (0..25).map(|i| Qubit(i * 3)).collect();
        let ops: Vec<Operation> = qubits
            .iter()
            .map(|&qubit| Operation::Rotation {
                axis: Axis::X,
                angle: PI,
                qubit,
            })
            .collect();

        let bits = executor
            .execute(&ops, &qubits, Basis::Existence)
            .await
            .expect("Every qubit is its own group");
        assert_eq!(bits.bits(), vec![true; 25].as_slice());
    }

    #[test]
    fn test_linked_groups_follow_controlled_rotations() {
        let ops = [link(0, 13), link(40, 41), link(13, 20)];
        let groups = linked_groups(&ops, &[Qubit(41), Qubit(0), Qubit(7)]);
        assert_eq!(groups.len(), 3);
        assert!(groups.contains(&vec![Qubit(41), Qubit(40)]));
        assert!(groups.contains(&vec![Qubit(0), Qubit(13), Qubit(20)]));
        assert!(groups.contains(&vec![Qubit(7)]));
    }
}

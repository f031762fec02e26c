//! Dense state-vector register.

use quantum_tictactoe::Axis;
use std::ops::{Add, Mul};

/// Complex amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// Creates an amplitude.
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Squared magnitude.
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// 2x2 unitary, row-major.
type Gate = [[Complex; 2]; 2];

fn rotation_gate(axis: Axis, angle: f64) -> Gate {
    let (s, c) = (angle / 2.0).sin_cos();
    let zero = Complex::default();
    match axis {
        Axis::X => [
            [Complex::new(c, 0.0), Complex::new(0.0, -s)],
            [Complex::new(0.0, -s), Complex::new(c, 0.0)],
        ],
        Axis::Y => [
            [Complex::new(c, 0.0), Complex::new(-s, 0.0)],
            [Complex::new(s, 0.0), Complex::new(c, 0.0)],
        ],
        Axis::Z => [
            [Complex::new(c, -s), zero],
            [zero, Complex::new(c, s)],
        ],
    }
}

fn hadamard() -> Gate {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    [
        [Complex::new(h, 0.0), Complex::new(h, 0.0)],
        [Complex::new(h, 0.0), Complex::new(-h, 0.0)],
    ]
}

/// Register of `n` qubits, starting in |0...0>.
///
/// Local qubit `k` is bit `k` of the basis index.
#[derive(Debug, Clone)]
pub struct Register {
    amplitudes: Vec<Complex>,
}

impl Register {
    /// Creates a register of `qubits` qubits.
    pub fn new(qubits: usize) -> Self {
        let mut amplitudes = vec![Complex::default(); 1 << qubits];
        amplitudes[0] = Complex::new(1.0, 0.0);
        Self { amplitudes }
    }

    /// Rotates qubit `target`.
    pub fn rotate(&mut self, axis: Axis, angle: f64, target: usize) {
        self.apply(&rotation_gate(axis, angle), target, None);
    }

    /// Rotates `target` on the branch where `control` is 1.
    pub fn controlled_rotate(&mut self, axis: Axis, angle: f64, control: usize, target: usize) {
        if control == target {
            return;
        }
        self.apply(&rotation_gate(axis, angle), target, Some(control));
    }

    /// Applies a Hadamard to `target`.
    pub fn hadamard(&mut self, target: usize) {
        self.apply(&hadamard(), target, None);
    }

    fn apply(&mut self, gate: &Gate, target: usize, control: Option<usize>) {
        let bit = 1 << target;
        for index in 0..self.amplitudes.len() {
            if index & bit != 0 || control.is_some_and(|c| index & (1 << c) == 0) {
                continue;
            }
            let (a0, a1) = (self.amplitudes[index], self.amplitudes[index | bit]);
            self.amplitudes[index] = gate[0][0] * a0 + gate[0][1] * a1;
            self.amplitudes[index | bit] = gate[1][0] * a0 + gate[1][1] * a1;
        }
    }

    /// Probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Picks the basis state whose cumulative probability first exceeds `r`.
    ///
    /// `r` is expected in `[0, 1)`; rounding leftovers fall to the last state
    /// with non-zero probability.
    pub fn sample(&self, r: f64) -> usize {
        let mut cumulative = 0.0;
        let mut last = 0;
        for (index, p) in self.probabilities().into_iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            cumulative += p;
            last = index;
            if r < cumulative {
                return index;
            }
        }
        last
    }
}

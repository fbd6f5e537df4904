use num_traits::Float;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

/// A point (or free vector) in N-dimensional real space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealVectorState<F: Float, const N: usize> {
    values: [F; N],
}

impl<F: Float, const N: usize> RealVectorState<F, N> {
    pub fn new(values: [F; N]) -> Self {
        Self { values }
    }

    /// The origin.
    pub fn zeros() -> Self {
        Self {
            values: [F::zero(); N],
        }
    }

    pub fn values(&self) -> &[F; N] {
        &self.values
    }

    pub fn euclidean_distance_squared(&self, other: &Self) -> F {
        self.values
            .iter()
            .zip(other.values.iter())
            .fold(F::zero(), |acc, (&a, &b)| acc + (a - b) * (a - b))
    }

    pub fn euclidean_distance(&self, other: &Self) -> F {
        self.euclidean_distance_squared(other).sqrt()
    }

    pub fn dot(&self, other: &Self) -> F {
        self.values
            .iter()
            .zip(other.values.iter())
            .fold(F::zero(), |acc, (&a, &b)| acc + a * b)
    }

    pub fn norm(&self) -> F {
        self.dot(self).sqrt()
    }

    /// Distance in the first two axes only.
    pub fn planar_distance(&self, other: &Self) -> F {
        let dx = self.values[0] - other.values[0];
        let dy = if N > 1 {
            self.values[1] - other.values[1]
        } else {
            F::zero()
        };
        dx.hypot(dy)
    }

    /// Linear interpolation, `t = 0` gives `self` and `t = 1` gives `other`.
    pub fn lerp(&self, other: &Self, t: F) -> Self {
        let mut values = self.values;
        for (i, v) in values.iter_mut().enumerate() {
            *v = *v + (other.values[i] - *v) * t;
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Index<usize> for RealVectorState<F, N> {
    type Output = F;

    fn index(&self, index: usize) -> &F {
        &self.values[index]
    }
}

impl<F: Float, const N: usize> IndexMut<usize> for RealVectorState<F, N> {
    fn index_mut(&mut self, index: usize) -> &mut F {
        &mut self.values[index]
    }
}

impl<F: Float, const N: usize> Add for RealVectorState<F, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut values = self.values;
        for (v, r) in values.iter_mut().zip(rhs.values.iter()) {
            *v = *v + *r;
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Sub for RealVectorState<F, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut values = self.values;
        for (v, r) in values.iter_mut().zip(rhs.values.iter()) {
            *v = *v - *r;
        }
        Self { values }
    }
}

impl<'a, F: Float, const N: usize> Add<&'a RealVectorState<F, N>> for &'a RealVectorState<F, N> {
    type Output = RealVectorState<F, N>;

    fn add(self, rhs: Self) -> RealVectorState<F, N> {
        *self + *rhs
    }
}

impl<'a, F: Float, const N: usize> Sub<&'a RealVectorState<F, N>> for &'a RealVectorState<F, N> {
    type Output = RealVectorState<F, N>;

    fn sub(self, rhs: Self) -> RealVectorState<F, N> {
        *self - *rhs
    }
}

impl<F: Float, const N: usize> Mul<F> for RealVectorState<F, N> {
    type Output = Self;

    fn mul(self, scalar: F) -> Self {
        let mut values = self.values;
        for v in values.iter_mut() {
            *v = *v * scalar;
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Div<F> for RealVectorState<F, N> {
    type Output = Self;

    fn div(self, scalar: F) -> Self {
        let mut values = self.values;
        for v in values.iter_mut() {
            *v = *v / scalar;
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> fmt::Display for RealVectorState<F, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.3}", v.to_f64().unwrap_or(f64::NAN))?;
        }
        write!(f, ")")
    }
}

// serde only covers fixed array lengths, so coordinates go through a plain sequence.
impl<F: Float + Serialize, const N: usize> Serialize for RealVectorState<F, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.as_slice().serialize(serializer)
    }
}

impl<'de, F: Float + Deserialize<'de>, const N: usize> Deserialize<'de> for RealVectorState<F, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<F>::deserialize(deserializer)?;
        let len = values.len();
        let values: [F; N] = values
            .try_into()
            .map_err(|_| D::Error::invalid_length(len, &"one value per dimension"))?;
        Ok(Self { values })
    }
}

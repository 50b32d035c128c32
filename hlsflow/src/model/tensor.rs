//! Weight tensors carried by graph nodes.
//!
//! The element count of a tensor is always derived from its shape, never
//! cached: `assign` swaps shape and data in one operation and rejects any
//! mismatch, so a stale length cannot be observed.
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

/// A weight tensor: a shape and a flat row-major buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl WeightTensor {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let mut tensor = Self {
            shape: Vec::new(),
            data: Vec::new(),
        };
        tensor.assign(shape, data)?;
        Ok(tensor)
    }

    /// Replace shape and data together, keeping the length invariant.
    pub fn assign(&mut self, shape: Vec<usize>, data: Vec<f64>) -> Result<()> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            bail!(
                "tensor shape {:?} implies {} elements but buffer holds {}",
                shape,
                expected,
                data.len()
            );
        }
        self.shape = shape;
        self.data = data;
        Ok(())
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Element count, always the product of the current shape.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Element at a multi-dimensional index.
    pub fn at(&self, index: &[usize]) -> Result<f64> {
        if index.len() != self.rank() {
            bail!(
                "index rank {} does not match tensor rank {}",
                index.len(),
                self.rank()
            );
        }
        let mut flat = 0usize;
        for (dim, (&i, &extent)) in index.iter().zip(self.shape.iter()).enumerate() {
            if i >= extent {
                bail!("index {} out of bounds for axis {} (extent {})", i, dim, extent);
            }
            flat = flat * extent + i;
        }
        Ok(self.data[flat])
    }

    /// Reorder axes, producing a new tensor. `axes[d]` names the source axis
    /// that becomes destination axis `d`.
    pub fn permute(&self, axes: &[usize]) -> Result<WeightTensor> {
        let rank = self.rank();
        if axes.len() != rank {
            bail!("permutation {:?} does not match tensor rank {}", axes, rank);
        }
        let mut seen = vec![false; rank];
        for &axis in axes {
            if axis >= rank || seen[axis] {
                bail!("invalid permutation {:?} for rank {}", axes, rank);
            }
            seen[axis] = true;
        }

        let old_strides = row_major_strides(&self.shape);
        let new_shape: Vec<usize> = axes.iter().map(|&a| self.shape[a]).collect();
        let new_strides = row_major_strides(&new_shape);

        let mut data = vec![0.0; self.data.len()];
        for (flat, slot) in data.iter_mut().enumerate() {
            let mut src = 0usize;
            let mut rem = flat;
            for d in 0..rank {
                let idx = rem / new_strides[d];
                rem %= new_strides[d];
                src += idx * old_strides[axes[d]];
            }
            *slot = self.data[src];
        }
        WeightTensor::new(new_shape, data)
    }

    /// Expand a rank-2 tensor `[a, b]` to the rank-4 convention `[1, 1, a, b]`.
    pub fn expand_to_rank4(&self) -> Result<WeightTensor> {
        let (a, b) = match self.shape.as_slice() {
            [a, b] => (*a, *b),
            other => bail!("cannot expand shape {:?} to rank 4", other),
        };
        WeightTensor::new(vec![1, 1, a, b], self.data.clone())
    }

    /// Transpose a rank-2 tensor.
    pub fn transpose2d(&self) -> Result<WeightTensor> {
        if self.rank() != 2 {
            return Err(anyhow!("transpose2d requires rank 2, got {:?}", self.shape));
        }
        self.permute(&[1, 0])
    }
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for d in (0..shape.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }
    strides
}

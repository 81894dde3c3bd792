use crate::error::{FlowError, Result};
use crate::global_variables::*;

pub const D: usize = 2;

// Fields are stored flat with `i` running fastest: `(i, j)` lives at `i + nx * j`.
#[derive(Clone, Debug)]
pub struct GridState {
    pub nx: usize,
    pub ny: usize,
    pub dx: Float,
    pub dy: Float,
    pub u: Vec<Float>,
    pub v: Vec<Float>,
    pub p: Vec<Float>,
}

pub fn number_of_nodes(nx: usize, ny: usize) -> Result<usize> {
    if nx < MIN_GRID_POINTS || ny < MIN_GRID_POINTS {
        return Err(FlowError::InvalidDimension { nx, ny });
    }
    nx.checked_mul(ny)
        .filter(|nodes| {
            nodes
                .checked_mul(std::mem::size_of::<Float>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or(FlowError::InvalidDimension { nx, ny })
}

#[inline]
pub fn is_boundary(c: usize, nx: usize, ny: usize) -> bool {
    let (i, j) = (c % nx, c / nx);
    i == 0 || j == 0 || i == nx - 1 || j == ny - 1
}

pub fn node_coordinates(
    nx: usize,
    ny: usize,
    dx: Float,
    dy: Float,
) -> impl Iterator<Item = [Float; D]> {
    (0..ny).flat_map(move |j| (0..nx).map(move |i| [(i as Float) * dx, (j as Float) * dy]))
}

impl GridState {
    pub fn allocate(nx: usize, ny: usize, dx: Float, dy: Float) -> Result<Self> {
        let number_of_nodes = number_of_nodes(nx, ny)?;
        Ok(Self {
            nx,
            ny,
            dx,
            dy,
            u: vec![0.0; number_of_nodes],
            v: vec![0.0; number_of_nodes],
            p: vec![0.0; number_of_nodes],
        })
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nx * self.ny
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i + self.nx * j
    }

    pub fn checked_index(&self, i: usize, j: usize) -> Result<usize> {
        if i >= self.nx || j >= self.ny {
            return Err(FlowError::OutOfRange {
                i,
                j,
                nx: self.nx,
                ny: self.ny,
            });
        }
        Ok(self.index(i, j))
    }

    pub fn coordinates(&self) -> impl Iterator<Item = [Float; D]> {
        node_coordinates(self.nx, self.ny, self.dx, self.dy)
    }
}

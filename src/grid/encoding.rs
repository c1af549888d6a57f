use crate::{PoolError, Result};

/// Physical representation of one grid row.
///
/// Columns here are physical: column 0 is the left border cell and
/// column `physical_cols - 1` the right one. Both strategies must agree on
/// the logical value of every cell, so the update kernel never needs to know
/// which one it is working with.
pub trait Encoding: Send + Sync + 'static {
    type Unit: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static;

    const NAME: &'static str;

    /// Number of storage units backing a row of `physical_cols` cells.
    fn row_units(physical_cols: usize) -> Result<usize>;

    fn get(row: &[Self::Unit], col: usize) -> bool;

    fn set(row: &mut [Self::Unit], col: usize, state: bool);
}

/// One `bool` per cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dense;

impl Encoding for Dense {
    type Unit = bool;

    const NAME: &'static str = "dense";

    fn row_units(physical_cols: usize) -> Result<usize> {
        Ok(physical_cols)
    }

    #[inline]
    fn get(row: &[bool], col: usize) -> bool {
        row[col]
    }

    #[inline]
    fn set(row: &mut [bool], col: usize, state: bool) {
        row[col] = state;
    }
}

/// Eight cells per byte, least significant bit first.
///
/// The physical row (border included) has to fill whole bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Packed;

impl Packed {
    pub const CELLS_IN_BYTE: usize = 8;
}

impl Encoding for Packed {
    type Unit = u8;

    const NAME: &'static str = "packed";

    fn row_units(physical_cols: usize) -> Result<usize> {
        if physical_cols % Self::CELLS_IN_BYTE != 0 {
            return Err(PoolError::RowNotByteAligned {
                physical_cols,
                factor: Self::CELLS_IN_BYTE,
            });
        }
        Ok(physical_cols / Self::CELLS_IN_BYTE)
    }

    #[inline]
    fn get(row: &[u8], col: usize) -> bool {
        row[col / Self::CELLS_IN_BYTE] >> (col % Self::CELLS_IN_BYTE) & 1 == 1
    }

    #[inline]
    fn set(row: &mut [u8], col: usize, state: bool) {
        let mask = 1 << (col % Self::CELLS_IN_BYTE);
        let byte = &mut row[col / Self::CELLS_IN_BYTE];
        if state {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

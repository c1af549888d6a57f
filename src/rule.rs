/// Next state of a cell under B3/S23.
///
/// A live cell survives with two or three live neighbours, a dead cell is
/// born with exactly three; everything else is dead.
#[inline]
pub fn next_state(alive: bool, neighbours: u8) -> bool {
    if alive {
        neighbours == 2 || neighbours == 3
    } else {
        neighbours == 3
    }
}

#[cfg(test)]
mod tests {
    use super::next_state;

    #[test]
    fn test_survival() {
        for n in 0..=8 {
            assert_eq!(next_state(true, n), n == 2 || n == 3, "n={}", n);
        }
    }

    #[test]
    fn test_birth() {
        for n in 0..=8 {
            assert_eq!(next_state(false, n), n == 3, "n={}", n);
        }
    }
}

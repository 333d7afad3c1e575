//! Mixed-radix counter enumerating one choice per group.

/// Yields every index combination for groups of the given sizes. The last
/// digit advances first; iteration ends when the first digit wraps.
///
/// ```
/// use sadm_flatten::Odometer;
/// let all: Vec<_> = Odometer::new(vec![2, 2]).collect();
/// assert_eq!(all, [[0, 0], [0, 1], [1, 0], [1, 1]]);
/// ```
#[derive(Debug, Clone)]
pub struct Odometer {
    sizes: Vec<usize>,
    cursor: Vec<usize>,
    exhausted: bool,
}

impl Odometer {
    pub fn new(sizes: Vec<usize>) -> Self {
        let exhausted = sizes.is_empty() || sizes.contains(&0);
        Self {
            cursor: vec![0; sizes.len()],
            sizes,
            exhausted,
        }
    }

    /// Number of combinations left to yield from a fresh odometer.
    pub fn combinations(&self) -> usize {
        if self.sizes.is_empty() {
            return 0;
        }
        self.sizes.iter().product()
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let current = self.cursor.clone();
        let mut digit = self.cursor.len();
        loop {
            if digit == 0 {
                self.exhausted = true;
                break;
            }
            digit -= 1;
            self.cursor[digit] += 1;
            if self.cursor[digit] < self.sizes[digit] {
                break;
            }
            self.cursor[digit] = 0;
        }
        Some(current)
    }
}

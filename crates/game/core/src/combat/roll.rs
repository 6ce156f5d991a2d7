use std::collections::VecDeque;

/// Source of uniform random draws in `[0, 1)`.
///
/// The core never owns randomness; the runtime plugs in a seeded RNG and
/// tests plug in [`SequenceRolls`].
pub trait RollSource {
    /// Next draw in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Uniform index in `0..len`. Returns 0 for an empty range.
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.roll() * len as f64).floor() as usize).min(len - 1)
    }
}

impl<R: RollSource + ?Sized> RollSource for &mut R {
    fn roll(&mut self) -> f64 {
        (**self).roll()
    }

    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}

/// Scripted rolls: yields the given values in order, then repeats the last
/// one forever (0.5 when constructed empty).
#[derive(Clone, Debug)]
pub struct SequenceRolls {
    queue: VecDeque<f64>,
    last: f64,
}

impl SequenceRolls {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            queue: values.into_iter().collect(),
            last: 0.5,
        }
    }

    pub fn empty() -> Self {
        Self::new([])
    }

    /// Draws not yet consumed from the script.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl RollSource for SequenceRolls {
    fn roll(&mut self) -> f64 {
        if let Some(value) = self.queue.pop_front() {
            self.last = value;
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_repeats_last_value() {
        let mut rolls = SequenceRolls::new([0.1, 0.9]);
        assert_eq!(rolls.roll(), 0.1);
        assert_eq!(rolls.roll(), 0.9);
        assert_eq!(rolls.roll(), 0.9);
        assert_eq!(rolls.remaining(), 0);
    }

    #[test]
    fn pick_stays_in_range() {
        let mut rolls = SequenceRolls::new([0.0, 0.5, 0.999_999]);
        assert_eq!(rolls.pick(4), 0);
        assert_eq!(rolls.pick(4), 2);
        assert_eq!(rolls.pick(4), 3);
        assert_eq!(rolls.pick(0), 0);
    }
}

use std::collections::VecDeque;

use num_traits::Float;

/// Keeps the most recent `max_len` episode rewards
pub struct RewardHistory<T> {
    max_len: usize,
    buffer: VecDeque<T>,
}

impl<T> RewardHistory<T> {
    pub fn new(max_len: usize) -> Self {
        assert!(max_len > 0);
        Self {
            max_len,
            buffer: VecDeque::with_capacity(max_len),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn add(
        &mut self,
        element: T,
    ) {
        if self.buffer.len() == self.max_len {
            self.buffer.pop_front();
        }
        self.buffer.push_back(element);
    }
}

impl<T: Float> RewardHistory<T> {
    pub fn mean(&self) -> Option<T> {
        if self.buffer.is_empty() {
            return None;
        }
        let sum = self.buffer.iter().fold(T::zero(), |sum, &e| sum + e);
        T::from(self.buffer.len()).map(|len| sum / len)
    }

    pub fn min(&self) -> Option<T> {
        self.buffer.iter().copied().reduce(T::min)
    }

    pub fn max(&self) -> Option<T> {
        self.buffer.iter().copied().reduce(T::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_most_recent() {
        let mut history = RewardHistory::new(3);
        assert!(history.is_empty());
        assert_eq!(history.mean(), None);

        for r in [1.0_f32, 2.0, 3.0, 4.0, 5.0] {
            history.add(r);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.mean(), Some(4.0));
        assert_eq!(history.min(), Some(3.0));
        assert_eq!(history.max(), Some(5.0));
    }

    #[test]
    fn test_negative_rewards() {
        let mut history = RewardHistory::new(10);
        history.add(-100.0_f32);
        history.add(200.0);
        assert_eq!(history.mean(), Some(50.0));
        assert_eq!(history.min(), Some(-100.0));
    }
}

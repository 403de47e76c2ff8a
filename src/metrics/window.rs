use std::collections::VecDeque;

/// 定长滑动窗口，只在窗口内恰好有 `capacity` 个非空观测时才产出统计量
/// （exact-count，不接受不满的窗口）。
#[derive(Debug, Clone)]
pub struct RollingWindow {
    slots: VecDeque<Option<f64>>,
    capacity: usize,
    present: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: VecDeque::with_capacity(capacity),
            capacity,
            present: 0,
        }
    }

    pub fn push(&mut self, value: Option<f64>) {
        if self.capacity == 0 {
            return;
        }
        if self.slots.len() == self.capacity {
            if let Some(Some(_)) = self.slots.pop_front() {
                self.present -= 1;
            }
        }
        if value.is_some() {
            self.present += 1;
        }
        self.slots.push_back(value);
    }

    pub fn is_complete(&self) -> bool {
        self.capacity > 0 && self.present == self.capacity
    }

    pub fn mean(&self) -> Option<f64> {
        if !self.is_complete() {
            return None;
        }
        Some(self.values().sum::<f64>() / self.capacity as f64)
    }

    /// 总体标准差（分母 N）
    pub fn population_std(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self
            .values()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / self.capacity as f64;
        Some(variance.sqrt())
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.slots.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_until_full() {
        let mut w = RollingWindow::new(3);
        w.push(Some(1.0));
        w.push(Some(2.0));
        assert!(w.mean().is_none());
        w.push(Some(3.0));
        assert_eq!(w.mean(), Some(2.0));
    }

    #[test]
    fn null_inside_window_blocks_until_evicted() {
        let mut w = RollingWindow::new(3);
        w.push(Some(1.0));
        w.push(None);
        w.push(Some(3.0));
        assert!(!w.is_complete());
        w.push(Some(4.0));
        assert!(!w.is_complete());
        w.push(Some(5.0));
        assert_eq!(w.mean(), Some(4.0));
    }

    #[test]
    fn population_std_known_values() {
        let mut w = RollingWindow::new(8);
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            w.push(Some(v));
        }
        let std = w.population_std().unwrap();
        assert!((std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_capacity_never_completes() {
        let mut w = RollingWindow::new(0);
        w.push(Some(1.0));
        assert!(w.mean().is_none());
    }
}

//! Difference-equation filtering
//!
//! Transposed direct form II over the z⁻¹ form of a transfer function:
//! y[n] = b0·x[n] + s0, s_k = b_(k+1)·x[n] - a_(k+1)·y[n] + s_(k+1)

use super::analysis::TransferFunction;
use crate::error::DspResult;

/// Stateful IIR/FIR filter processor
pub struct LinearFilter {
    /// Numerator in powers of z⁻¹, normalized by a[0]
    b: Vec<f64>,

    /// Denominator in powers of z⁻¹, normalized so a[0] = 1
    a: Vec<f64>,

    /// Delay line, one entry per filter order
    state: Vec<f64>,
}

impl LinearFilter {
    /// Create a filter for a transfer function
    ///
    /// # Errors
    /// * `DivisionByZero` when a[0] is zero
    /// * `InvalidArgument` for a non-causal transfer function
    pub fn new(tf: &TransferFunction) -> DspResult<Self> {
        // delay_form rejects a[0] == 0
        let (b, a) = tf.delay_form()?;
        let a0 = a[0];

        let b: Vec<f64> = b.iter().map(|c| c / a0).collect();
        let a: Vec<f64> = a.iter().map(|c| c / a0).collect();
        let order = a.len() - 1;

        Ok(Self {
            b,
            a,
            state: vec![0.0; order],
        })
    }

    /// Process single sample
    ///
    /// # Arguments
    /// * `input` - Input sample x[n]
    ///
    /// # Returns
    /// Filtered output sample y[n]
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let order = self.state.len();
        if order == 0 {
            return self.b[0] * input;
        }

        let output = self.b[0] * input + self.state[0];

        for k in 0..order - 1 {
            self.state[k] = self.b[k + 1] * input - self.a[k + 1] * output + self.state[k + 1];
        }
        self.state[order - 1] = self.b[order] * input - self.a[order] * output;

        output
    }

    /// Process a block of samples
    ///
    /// # Returns
    /// Filtered output samples (same length as input)
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Reset filter state (clear delay line)
    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }

    /// Filter order (number of delay elements)
    pub fn order(&self) -> usize {
        self.state.len()
    }
}

/// Filter a sequence from rest
pub fn lfilter(tf: &TransferFunction, x: &[f64]) -> DspResult<Vec<f64>> {
    let mut filter = LinearFilter::new(tf)?;
    Ok(filter.process_block(x))
}

/// First `length` samples of the impulse response
pub fn impulse_response(tf: &TransferFunction, length: usize) -> DspResult<Vec<f64>> {
    let mut impulse = vec![0.0; length];
    if let Some(first) = impulse.first_mut() {
        *first = 1.0;
    }
    lfilter(tf, &impulse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DspError;

    fn delay_form(b: &[f64], a: &[f64]) -> TransferFunction {
        TransferFunction::from_delay_form(b.to_vec(), a.to_vec()).unwrap()
    }

    #[test]
    fn test_moving_average() {
        // Simple 3-tap moving average: [1/3, 1/3, 1/3]
        let tf = delay_form(&[1.0 / 3.0; 3], &[1.0]);
        let mut filter = LinearFilter::new(&tf).unwrap();

        let output1 = filter.process_sample(3.0);
        let output2 = filter.process_sample(0.0);
        let output3 = filter.process_sample(0.0);
        let output4 = filter.process_sample(0.0);

        assert!((output1 - 1.0).abs() < 1e-10);
        assert!((output2 - 1.0).abs() < 1e-10);
        assert!((output3 - 1.0).abs() < 1e-10);
        assert!(output4.abs() < 1e-10);
    }

    #[test]
    fn test_block_processing() {
        let tf = delay_form(&[0.5, 0.5], &[1.0]);
        let output = lfilter(&tf, &[1.0, 2.0, 3.0, 4.0]).unwrap();

        let expected = [0.5, 1.5, 2.5, 3.5];
        assert_eq!(output.len(), 4);
        for (y, e) in output.iter().zip(expected.iter()) {
            assert!((y - e).abs() < 1e-10);
        }
    }

    #[test]
    fn test_one_pole_impulse_response() {
        let tf = delay_form(&[1.0], &[1.0, -0.5]);
        let h = impulse_response(&tf, 10).unwrap();

        for (n, value) in h.iter().enumerate() {
            assert!((value - 0.5f64.powi(n as i32)).abs() < 1e-12, "n = {}", n);
        }
    }

    #[test]
    fn test_descending_form_delays_output() {
        // 1 / (z - 0.9) = z⁻¹ / (1 - 0.9 z⁻¹)
        let tf = TransferFunction::new(vec![1.0], vec![1.0, -0.9]).unwrap();
        let h = impulse_response(&tf, 5).unwrap();

        let expected = [0.0, 1.0, 0.9, 0.81, 0.729];
        for (value, e) in h.iter().zip(expected.iter()) {
            assert!((value - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_a0_normalization() {
        let tf = delay_form(&[2.0], &[2.0, -1.0]);
        let h = impulse_response(&tf, 4).unwrap();
        assert!((h[0] - 1.0).abs() < 1e-12);
        assert!((h[3] - 0.125).abs() < 1e-12);

        let tf = delay_form(&[1.0], &[0.0, 1.0]);
        assert!(matches!(lfilter(&tf, &[1.0]), Err(DspError::DivisionByZero(_))));
    }

    #[test]
    fn test_reset() {
        let tf = delay_form(&[1.0, 1.0], &[1.0]);
        let mut filter = LinearFilter::new(&tf).unwrap();

        filter.process_sample(1.0);
        filter.process_sample(2.0);
        filter.reset();

        let output = filter.process_sample(1.0);
        assert!((output - 1.0).abs() < 1e-10);
        assert_eq!(filter.order(), 1);
    }

    #[test]
    fn test_empty_impulse() {
        let tf = delay_form(&[1.0], &[1.0]);
        assert!(impulse_response(&tf, 0).unwrap().is_empty());
    }
}

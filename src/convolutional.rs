//! Convolutional Code
//!
//! A rate 1/n feed-forward convolutional encoder with constraint length K, given by n generator
//! polynomials in the usual octal notation, e.g. `(7, 5)` for the K = 3 code of the textbooks.
//! Every message is terminated with K - 1 zero tail bits so the trellis ends in state 0.
//! Decoding is hard-decision Viterbi with the Hamming distance as branch metric.
//!

use crate::error::*;
use crate::util::*;
use serde::Serialize;

/// keeps the trellis within `2^(MAX_CONSTRAINT_LENGTH - 1)` states
pub const MAX_CONSTRAINT_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvolutionalCode {
    /// generator taps, bit `K - 1` multiplies the current input and bit 0 the oldest stored input
    generators: Vec<usize>,
    constraint_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViterbiResult {
    #[serde(serialize_with = "serialize_bits")]
    pub message: Vec<Bit>,
    /// Hamming distance between the received sequence and the re-encoded message
    pub path_metric: usize,
}

fn parity(value: usize) -> Bit {
    value.count_ones() % 2 == 1
}

impl ConvolutionalCode {
    pub fn new(generators: Vec<usize>, constraint_length: usize) -> KernelResult<Self> {
        if !(2..=MAX_CONSTRAINT_LENGTH).contains(&constraint_length) {
            return Err(KernelError::InvalidParameter(format!(
                "constraint length must be within 2..={MAX_CONSTRAINT_LENGTH}, got {constraint_length}"
            )));
        }
        if generators.is_empty() {
            return Err(KernelError::InvalidParameter("at least one generator is required".to_string()));
        }
        for &generator in generators.iter() {
            if generator == 0 || generator >> constraint_length != 0 {
                return Err(KernelError::InvalidParameter(format!(
                    "generator {generator:o} does not fit constraint length {constraint_length}"
                )));
            }
        }
        Ok(Self {
            generators,
            constraint_length,
        })
    }

    /// generators written in octal, e.g. `["7", "5"]`
    pub fn from_octal<S: AsRef<str>>(generators: &[S], constraint_length: usize) -> KernelResult<Self> {
        let generators = generators
            .iter()
            .map(|generator| {
                let generator = generator.as_ref().trim();
                usize::from_str_radix(generator, 8)
                    .map_err(|_| KernelError::InvalidParameter(format!("generator `{generator}` is not octal")))
            })
            .collect::<KernelResult<Vec<_>>>()?;
        Self::new(generators, constraint_length)
    }

    pub fn generators(&self) -> &[usize] {
        &self.generators
    }

    pub fn constraint_length(&self) -> usize {
        self.constraint_length
    }

    /// output bits per input bit
    pub fn outputs(&self) -> usize {
        self.generators.len()
    }

    pub fn states(&self) -> usize {
        1 << (self.constraint_length - 1)
    }

    pub fn tail_length(&self) -> usize {
        self.constraint_length - 1
    }

    /// `(next state, output bits)` of feeding `input` into the encoder in `state`
    fn step(&self, state: usize, input: Bit) -> (usize, impl Iterator<Item = Bit> + '_) {
        let window = ((input as usize) << (self.constraint_length - 1)) | state;
        (window >> 1, self.generators.iter().map(move |&generator| parity(window & generator)))
    }

    pub fn encode(&self, message: &[Bit]) -> Vec<Bit> {
        let mut encoded = Vec::with_capacity((message.len() + self.tail_length()) * self.outputs());
        let mut state = 0;
        let tail = std::iter::repeat(false).take(self.tail_length());
        for input in message.iter().cloned().chain(tail) {
            let (next, output) = self.step(state, input);
            encoded.extend(output);
            state = next;
        }
        encoded
    }

    pub fn decode(&self, received: &[Bit]) -> KernelResult<ViterbiResult> {
        let outputs = self.outputs();
        if received.len() % outputs != 0 {
            return Err(KernelError::ShapeMismatch(format!(
                "received {} bits, not a multiple of {outputs} output bits per step",
                received.len()
            )));
        }
        let steps = received.len() / outputs;
        if steps < self.tail_length() {
            return Err(KernelError::ShapeMismatch(format!(
                "received {steps} steps, shorter than the {} tail steps",
                self.tail_length()
            )));
        }
        let message_length = steps - self.tail_length();
        let states = self.states();
        let mut metrics: Vec<Option<usize>> = vec![None; states];
        metrics[0] = Some(0);
        // survivors[t][state] = (predecessor, input bit) of the best path into `state` after step t
        let mut survivors: Vec<Vec<Option<(usize, Bit)>>> = Vec::with_capacity(steps);
        for (t, symbol) in received.chunks(outputs).enumerate() {
            let inputs: &[Bit] = if t < message_length { &[false, true] } else { &[false] };
            let mut next_metrics: Vec<Option<usize>> = vec![None; states];
            let mut step_survivors = vec![None; states];
            for (state, metric) in metrics.iter().enumerate() {
                let Some(metric) = *metric else { continue };
                for &input in inputs.iter() {
                    let (next, output) = self.step(state, input);
                    let branch = output.zip(symbol.iter()).filter(|&(bit, &expected)| bit != expected).count();
                    let candidate = metric + branch;
                    // strict comparison keeps the lower predecessor state on ties
                    if next_metrics[next].map_or(true, |best| candidate < best) {
                        next_metrics[next] = Some(candidate);
                        step_survivors[next] = Some((state, input));
                    }
                }
            }
            metrics = next_metrics;
            survivors.push(step_survivors);
        }
        let path_metric = metrics[0].ok_or_else(|| {
            KernelError::InvalidParameter("no trellis path terminates in state 0".to_string())
        })?;
        let mut message = Vec::with_capacity(steps);
        let mut state = 0;
        for step_survivors in survivors.iter().rev() {
            let (previous, input) = step_survivors[state]
                .ok_or_else(|| KernelError::InvalidParameter("broken survivor path".to_string()))?;
            message.push(input);
            state = previous;
        }
        message.reverse();
        message.truncate(message_length);
        tracing::debug!("Viterbi decoded {message_length} bits with path metric {path_metric}");
        Ok(ViterbiResult { message, path_metric })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use test_case::test_case;

    fn textbook_code() -> ConvolutionalCode {
        ConvolutionalCode::from_octal(&["7", "5"], 3).unwrap()
    }

    #[test]
    fn convolutional_encode_textbook_vector() {
        // cargo test convolutional_encode_textbook_vector -- --nocapture
        let code = textbook_code();
        assert_eq!(code.states(), 4);
        let encoded = code.encode(&parse_bits("1011").unwrap());
        assert_eq!(bits_to_string(&encoded), "111000010111");
        assert_eq!(bits_to_string(&code.encode(&[])), "0000");
    }

    #[test_case(vec![0], 3; "zero generator")]
    #[test_case(vec![0o17], 3; "generator longer than constraint")]
    #[test_case(vec![], 3; "no generator")]
    #[test_case(vec![1], 1; "constraint too short")]
    #[test_case(vec![1], 17; "constraint too long")]
    fn convolutional_invalid_code(generators: Vec<usize>, constraint_length: usize) {
        // cargo test convolutional_invalid_code -- --nocapture
        assert!(matches!(
            ConvolutionalCode::new(generators, constraint_length),
            Err(KernelError::InvalidParameter(_))
        ));
    }

    #[test]
    fn convolutional_octal_parsing() {
        // cargo test convolutional_octal_parsing -- --nocapture
        let code = ConvolutionalCode::from_octal(&["171", "133"], 7).unwrap();
        assert_eq!(code.generators(), &[0o171, 0o133]);
        assert_eq!(code.outputs(), 2);
        assert!(ConvolutionalCode::from_octal(&["8"], 3).is_err());
    }

    #[test]
    fn convolutional_decode_clean_and_corrupted() {
        // cargo test convolutional_decode_clean_and_corrupted -- --nocapture
        let code = textbook_code();
        let message = parse_bits("1011").unwrap();
        let mut received = code.encode(&message);
        let result = code.decode(&received).unwrap();
        assert_eq!(result.message, message);
        assert_eq!(result.path_metric, 0);
        received[3] = !received[3];
        let result = code.decode(&received).unwrap();
        assert_eq!(result.message, message);
        assert_eq!(result.path_metric, 1);
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"message": "1011", "path_metric": 1}));
    }

    #[test]
    fn convolutional_decode_corrects_any_single_error() {
        // cargo test convolutional_decode_corrects_any_single_error -- --nocapture
        let mut rng = SmallRng::seed_from_u64(5);
        for code in [textbook_code(), ConvolutionalCode::from_octal(&["171", "133"], 7).unwrap()] {
            for _ in 0..20 {
                let length = rng.gen_range(1..24);
                let message: Vec<Bit> = (0..length).map(|_| rng.gen()).collect();
                let encoded = code.encode(&message);
                for position in 0..encoded.len() {
                    let mut received = encoded.clone();
                    received[position] = !received[position];
                    let result = code.decode(&received).unwrap();
                    assert_eq!(result.message, message, "error at {position}");
                    assert_eq!(result.path_metric, 1);
                }
            }
        }
    }

    #[test]
    fn convolutional_decode_rejects_bad_lengths() {
        // cargo test convolutional_decode_rejects_bad_lengths -- --nocapture
        let code = textbook_code();
        assert!(matches!(code.decode(&[true; 5]), Err(KernelError::ShapeMismatch(_))));
        assert!(matches!(code.decode(&[true; 2]), Err(KernelError::ShapeMismatch(_))));
        let result = code.decode(&[false; 4]).unwrap();
        assert!(result.message.is_empty());
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CTC (Connectionist Temporal Classification) greedy decoding
//!
//! Both recognizers emit a `[1, T, C]` (or `[T, C]`) score matrix. Greedy
//! decoding takes the best class per timestep, collapses repeats and drops
//! the blank class at index 0.

use anyhow::Result;
use ndarray::{ArrayViewD, Axis, Ix2};

/// Greedy decode output
#[derive(Debug, Clone, PartialEq)]
pub struct CtcDecoded {
    pub text: String,
    /// Max score of every emitted character
    pub char_scores: Vec<f32>,
    /// Max score of every non-blank timestep, including collapsed repeats
    pub non_blank_scores: Vec<f32>,
}

impl CtcDecoded {
    /// Arithmetic mean of the emitted character scores
    pub fn mean_score(&self) -> f32 {
        if self.char_scores.is_empty() {
            0.0
        } else {
            self.char_scores.iter().sum::<f32>() / self.char_scores.len() as f32
        }
    }
}

/// Decode a score matrix against `charset`, where `charset[i]` is the label of class `i`
///
/// Index 0 is the blank. Classes outside `charset` are skipped.
pub fn greedy_decode(scores: ArrayViewD<f32>, charset: &[char]) -> Result<CtcDecoded> {
    let matrix = match scores.ndim() {
        3 => scores.index_axis_move(Axis(0), 0),
        2 => scores,
        _ => anyhow::bail!("Unexpected recognizer output shape: {:?}", scores.shape()),
    };
    let matrix = matrix.into_dimensionality::<Ix2>()?;

    let mut decoded = CtcDecoded {
        text: String::new(),
        char_scores: Vec::new(),
        non_blank_scores: Vec::new(),
    };
    let mut prev_index = 0usize;

    for row in matrix.outer_iter() {
        let (index, score) = row
            .iter()
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |best, (i, &v)| {
                if v > best.1 {
                    (i, v)
                } else {
                    best
                }
            });

        if index != 0 {
            decoded.non_blank_scores.push(score);
            if index != prev_index {
                if let Some(&ch) = charset.get(index) {
                    decoded.text.push(ch);
                    decoded.char_scores.push(score);
                }
            }
        }
        prev_index = index;
    }

    Ok(decoded)
}

/// Row-wise softmax over the last axis of a `[.., T, C]` logit array
pub fn softmax_last_axis(logits: &mut ndarray::ArrayD<f32>) {
    let last = Axis(logits.ndim().saturating_sub(1));
    for mut lane in logits.lanes_mut(last) {
        let max = lane.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        lane.mapv_inplace(|v| (v - max).exp());
        let sum: f32 = lane.sum();
        if sum > 0.0 {
            lane.mapv_inplace(|v| v / sum);
        }
    }
}

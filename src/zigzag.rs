//! Zigzag reordering of block coefficients.
//!
//! The scan walks anti-diagonals in alternating direction, starting at the
//! DC cell and ending at the highest frequency cell. It clusters the large
//! low-frequency coefficients at the front of the sequence, which is what
//! gives the entropy coder its long zero runs.

/// Linear block indices in zigzag visiting order for an N*N block.
/// `order[k]` is the row-major index of the k-th scanned cell.
pub fn scan_order(block_size: usize) -> Vec<usize> {
    let n = block_size;
    let mut order = Vec::with_capacity(n * n);
    for diag in 0..(2 * n - 1) {
        let start = diag.saturating_sub(n - 1);
        let end = diag.min(n - 1);
        if diag % 2 == 0 {
            // Even diagonal: walk from the bottom-left end upwards.
            for i in (start..=end).rev() {
                let j = diag - i;
                order.push(i * n + j);
            }
        } else {
            // Odd diagonal: walk back down.
            for i in start..=end {
                let j = diag - i;
                order.push(i * n + j);
            }
        }
    }
    order
}

/// Reads `block` in zigzag order into `output`.
pub fn flatten(block: &[i32], order: &[usize], output: &mut [i32]) {
    debug_assert_eq!(block.len(), order.len());
    debug_assert_eq!(block.len(), output.len());
    for (k, &idx) in order.iter().enumerate() {
        output[k] = block[idx];
    }
}

/// Scatters a zigzag-ordered `sequence` back into row-major `output`.
/// Mutual inverse of [`flatten`].
pub fn unflatten(sequence: &[i32], order: &[usize], output: &mut [i32]) {
    debug_assert_eq!(sequence.len(), order.len());
    debug_assert_eq!(sequence.len(), output.len());
    for (k, &idx) in order.iter().enumerate() {
        output[idx] = sequence[k];
    }
}

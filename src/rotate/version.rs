//! Generation counter comparison

/// Is `value` newer than `best` for a pool of `pool_size` sectors?
///
/// Counters are 8-bit and wrap, and live copies only span `pool_size`
/// consecutive values. Using `split = pool_size - 1` as the threshold, a low
/// value below the split beats a high best above it (the counter wrapped),
/// and a high value above the split loses to a low best below it. Otherwise
/// plain magnitude decides.
///
/// Only sound while live counters differ by less than `pool_size`.
pub fn is_newer(best: u8, value: u8, pool_size: u8) -> bool {
    let split = pool_size.saturating_sub(1);
    if value < split && split < best {
        true
    } else if best < split && split < value {
        false
    } else {
        value > best
    }
}

//! Byte-digit radix sort keyed on Morton codes.
//!
//! Four stable counting passes of 8 bits each, ping-ponging between the
//! primary array and a scratch buffer of equal capacity. An even number of
//! passes lands the result back in the primary array, so no final copy is
//! needed. O(n) per pass, sequential access only.

const RADIX: usize = 256;

/// Records orderable by their cached Morton key.
pub trait MortonKeyed {
    fn morton_key(&self) -> u32;
}

/// One stable counting pass over the byte at `shift`.
fn radix_pass<T: MortonKeyed + Copy>(src: &[T], dst: &mut [T], shift: u32) {
    let mut hist = [0u32; RADIX];
    for item in src {
        hist[((item.morton_key() >> shift) & 0xFF) as usize] += 1;
    }

    let mut sum = 0u32;
    for slot in hist.iter_mut() {
        let count = *slot;
        *slot = sum;
        sum += count;
    }

    for item in src {
        let digit = ((item.morton_key() >> shift) & 0xFF) as usize;
        dst[hist[digit] as usize] = *item;
        hist[digit] += 1;
    }
}

/// Sort `primary` by ascending Morton key, using `scratch` as the alternate
/// buffer. Both slices must have the same length.
pub fn radix_sort_by_morton<T: MortonKeyed + Copy>(primary: &mut [T], scratch: &mut [T]) {
    debug_assert_eq!(primary.len(), scratch.len());
    if primary.len() <= 1 {
        return;
    }

    radix_pass(primary, scratch, 0);
    radix_pass(scratch, primary, 8);
    radix_pass(primary, scratch, 16);
    radix_pass(scratch, primary, 24);
}

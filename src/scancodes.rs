use evdev::KeyCode;
use indexmap::IndexSet;

/// Scancodes of a view as one flat sequence, addressed per key by start index
/// and count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FlatScancodes {
    pub codes: Vec<KeyCode>,
    /// Start index into `codes` per key, -1 for keys without scancodes
    pub idxs: Vec<i32>,
    pub nums: Vec<usize>,
}

impl FlatScancodes {
    /// Scancodes of the key at `index`
    pub fn key(&self, index: usize) -> &[KeyCode] {
        match usize::try_from(self.idxs[index]) {
            Ok(start) => &self.codes[start..start + self.nums[index]],
            Err(_) => &[],
        }
    }
}

/// Flatten per row, per key scancode sequences in row-major, key-major order.
pub(crate) fn flatten(rows: &[Vec<Vec<KeyCode>>]) -> FlatScancodes {
    let mut flat = FlatScancodes::default();
    let mut next = 0;

    for codes in rows.iter().flatten() {
        flat.idxs.push(if codes.is_empty() { -1 } else { next as i32 });
        flat.nums.push(codes.len());
        flat.codes.extend_from_slice(codes);
        next += codes.len();
    }

    flat
}

/// Every scancode used across a run, deduplicated in order of first appearance
#[derive(Debug, Clone, Default)]
pub(crate) struct UniqueScancodes(IndexSet<KeyCode>);

impl UniqueScancodes {
    pub fn extend(&mut self, codes: &[KeyCode]) {
        self.0.extend(codes.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyCode> {
        self.0.iter()
    }
}
